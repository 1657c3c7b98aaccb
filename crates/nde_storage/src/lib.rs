use async_trait::async_trait;
use nde_core::{ArticleStorage, Logger, Result, StorageConfig, StorageKind};
use std::sync::Arc;

pub mod backends;

pub use backends::*;

/// Construction side of a backend. Query and write operations live on
/// [`nde_core::ArticleStorage`].
#[async_trait]
pub trait StorageBackend: ArticleStorage + Sized {
    fn get_error_message() -> &'static str;
    async fn connect(config: &StorageConfig, logger: Logger) -> Result<Self>;
}

async fn open<T: StorageBackend + 'static>(config: &StorageConfig, logger: Logger) -> Result<Arc<dyn ArticleStorage>> {
    match T::connect(config, logger.clone()).await {
        Ok(storage) => Ok(Arc::new(storage)),
        Err(e) => {
            logger.error(&format!("{} ({})", e, T::get_error_message()));
            Err(e)
        }
    }
}

/// Opens the backend selected by `config.kind`. A single attempt; callers decide on retries.
pub async fn create_storage(config: &StorageConfig, logger: Logger) -> Result<Arc<dyn ArticleStorage>> {
    let logger = logger.with_prefix("storage");
    let storage = match config.kind {
        StorageKind::Memory => open::<InMemoryStorage>(config, logger.clone()).await?,
        StorageKind::File => open::<FileStorage>(config, logger.clone()).await?,
        #[cfg(feature = "postgres")]
        StorageKind::Postgres => open::<PostgresStorage>(config, logger.clone()).await?,
        #[cfg(not(feature = "postgres"))]
        StorageKind::Postgres => {
            return Err(nde_core::Error::Config(
                "postgres storage is not compiled in; rebuild with `--features postgres`".to_string(),
            ))
        }
    };
    logger.info(&format!("Opened {} storage", storage.name()));
    Ok(storage)
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, StorageBackend};
}
