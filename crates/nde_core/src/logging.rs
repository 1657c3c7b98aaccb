use std::sync::{Arc, Once};
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Logging handle handed to each component at construction. Messages are emitted through
/// `tracing` with the handle's scope prefixes, e.g. `[pipeline] [feeds] Parsed 12 entries`.
#[derive(Debug, Clone, Default)]
pub struct Logger {
    prefixes: Arc<Vec<String>>,
}

impl Logger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A child handle with `prefix` appended to this handle's scope.
    pub fn with_prefix(&self, prefix: impl Into<String>) -> Self {
        let mut prefixes = (*self.prefixes).clone();
        prefixes.push(prefix.into());
        Self { prefixes: Arc::new(prefixes) }
    }

    /// A handle scoped only to `prefix`.
    pub fn with_new_prefixes(&self, prefix: impl Into<String>) -> Self {
        Self { prefixes: Arc::new(vec![prefix.into()]) }
    }

    pub fn scope(&self) -> String {
        self.prefixes.iter().map(|p| format!("[{}] ", p)).collect()
    }

    pub fn info(&self, message: &str) {
        tracing::info!("{}{}", self.scope(), message);
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!("{}{}", self.scope(), message);
    }

    pub fn error(&self, message: &str) {
        tracing::error!("{}{}", self.scope(), message);
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!("{}{}", self.scope(), message);
    }
}

/// Installs the global subscriber once. `RUST_LOG` wins over `default_filter`.
pub fn init_logging(default_filter: &str) -> Logger {
    if !tracing::dispatcher::has_been_set() {
        INIT.call_once(|| {
            let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .init();
        });
    }
    Logger::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes() {
        let root = Logger::new();
        assert_eq!(root.scope(), "");
        let feeds = root.with_prefix("pipeline").with_prefix("feeds");
        assert_eq!(feeds.scope(), "[pipeline] [feeds] ");
        assert_eq!(root.scope(), "");
        assert_eq!(feeds.with_new_prefixes("storage").scope(), "[storage] ");
    }
}
