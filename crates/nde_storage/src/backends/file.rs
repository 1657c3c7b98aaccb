use async_trait::async_trait;
use nde_core::storage::{merge_upsert, prepare_for_save};
use nde_core::{
    derive_id, Article, ArticleFilter, ArticleQuery, ArticleStorage, Error, LabelCount, Logger, Result, SaveStatus,
    StorageConfig,
};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

use crate::StorageBackend;

const LOCK_STRIPES: usize = 64;
const MAX_PLAIN_ID_LEN: usize = 200;

/// One pretty-printed JSON document per article under `<data_dir>/articles/<article_id>.json`.
/// Identifiers that are not plain file names are stored as `~<digest>.json` instead.
/// Writes to the same identifier are serialized through a striped lock table; files are
/// replaced by rename so readers never observe a partial document.
#[derive(Debug)]
pub struct FileStorage {
    articles_dir: PathBuf,
    locks: Vec<Mutex<()>>,
    logger: Logger,
}

impl FileStorage {
    pub async fn open(data_dir: impl AsRef<Path>, logger: Logger) -> Result<Self> {
        let articles_dir = data_dir.as_ref().join("articles");
        fs::create_dir_all(&articles_dir).await?;
        logger.info(&format!("File storage initialized at {}", data_dir.as_ref().display()));
        Ok(Self {
            articles_dir,
            locks: (0..LOCK_STRIPES).map(|_| Mutex::new(())).collect(),
            logger,
        })
    }

    pub fn articles_dir(&self) -> &Path {
        &self.articles_dir
    }

    fn lock_for(&self, article_id: &str) -> &Mutex<()> {
        let mut hasher = DefaultHasher::new();
        article_id.hash(&mut hasher);
        &self.locks[(hasher.finish() as usize) % self.locks.len()]
    }

    fn path_for(&self, article_id: &str) -> PathBuf {
        self.articles_dir.join(format!("{}.json", file_stem(article_id)))
    }

    async fn read_article(&self, path: &Path) -> Result<Option<Article>> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Like `read_article`, but a document that no longer parses is logged and treated as
    /// absent, matching how `load_all` skips it.
    async fn read_existing(&self, path: &Path) -> Result<Option<Article>> {
        match self.read_article(path).await {
            Err(Error::Serialization(e)) => {
                self.logger.warn(&format!("Ignoring unreadable {}: {}", path.display(), e));
                Ok(None)
            }
            other => other,
        }
    }

    async fn write_article(&self, article_id: &str, path: &Path, article: &Article) -> Result<()> {
        let tmp = self.articles_dir.join(format!(".{}.json.tmp", file_stem(article_id)));
        fs::write(&tmp, serde_json::to_vec_pretty(article)?).await?;
        fs::rename(&tmp, path).await?;
        Ok(())
    }

    /// Every stored document. Unreadable files are logged and skipped.
    async fn load_all(&self) -> Result<Vec<Article>> {
        let mut articles = Vec::new();
        let mut entries = fs::read_dir(&self.articles_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_document = path.extension().map_or(false, |ext| ext == "json")
                && !entry.file_name().to_string_lossy().starts_with('.');
            if !is_document {
                continue;
            }
            match self.read_article(&path).await {
                Ok(Some(article)) => articles.push(article),
                Ok(None) => {}
                Err(e) => self.logger.warn(&format!("Skipping unreadable {}: {}", path.display(), e)),
            }
        }
        Ok(articles)
    }
}

fn is_plain_id(article_id: &str) -> bool {
    !article_id.is_empty()
        && article_id.len() <= MAX_PLAIN_ID_LEN
        && !article_id.starts_with('.')
        && article_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}

/// File name for `article_id`. `~` never occurs in a plain id, so digested names cannot
/// collide with plain ones.
fn file_stem(article_id: &str) -> String {
    if is_plain_id(article_id) {
        article_id.to_string()
    } else {
        format!("~{}", derive_id(article_id))
    }
}

#[async_trait]
impl StorageBackend for FileStorage {
    fn get_error_message() -> &'static str {
        "The data directory should be writable"
    }

    async fn connect(config: &StorageConfig, logger: Logger) -> Result<Self> {
        Self::open(&config.data_dir, logger).await
    }
}

#[async_trait]
impl ArticleStorage for FileStorage {
    fn name(&self) -> &str {
        "file"
    }

    async fn save(&self, article: &Article) -> Result<SaveStatus> {
        let (id, record) = prepare_for_save(article).map_err(|e| {
            self.logger.warn(&format!("Cannot save \"{}\": {}", article.title, e));
            e
        })?;
        let path = self.path_for(&id);

        let _guard = self.lock_for(&id).lock().await;
        let existing = self.read_existing(&path).await?;
        let (merged, status) = merge_upsert(existing.as_ref(), record);
        if status != SaveStatus::Unchanged {
            self.write_article(&id, &path, &merged).await?;
        }
        self.logger.debug(&format!("{:?} {}", status, id));
        Ok(status)
    }

    async fn get_by_id(&self, article_id: &str) -> Result<Option<Article>> {
        if article_id.is_empty() {
            return Ok(None);
        }
        let article = self.read_existing(&self.path_for(article_id)).await?;
        // a digested name only ever holds the id it was derived from, but be exact
        Ok(article.filter(|a| a.article_id.as_deref() == Some(article_id)))
    }

    async fn query(&self, query: &ArticleQuery) -> Result<Vec<Article>> {
        let articles = self.load_all().await?;
        Ok(query.apply(&articles))
    }

    async fn count(&self, filter: &ArticleFilter) -> Result<usize> {
        let articles = self.load_all().await?;
        Ok(articles.iter().filter(|a| filter.matches(a)).count())
    }

    async fn topics_summary(&self) -> Result<Vec<LabelCount>> {
        let articles = self.load_all().await?;
        Ok(LabelCount::tally(articles.iter().flat_map(|a| a.topics.iter())))
    }

    async fn sources_summary(&self) -> Result<Vec<LabelCount>> {
        let articles = self.load_all().await?;
        Ok(LabelCount::tally(articles.iter().map(|a| a.source.as_str())))
    }
}
