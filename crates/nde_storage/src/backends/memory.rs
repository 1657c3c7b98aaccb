use async_trait::async_trait;
use nde_core::storage::{merge_upsert, prepare_for_save};
use nde_core::{
    Article, ArticleFilter, ArticleQuery, ArticleStorage, LabelCount, Logger, Result, SaveStatus, StorageConfig,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::StorageBackend;

#[derive(Debug, Default)]
struct MemoryStore {
    articles: BTreeMap<String, Article>,
}

impl MemoryStore {
    fn upsert(&mut self, id: String, record: Article) -> SaveStatus {
        let (merged, status) = merge_upsert(self.articles.get(&id), record);
        if status != SaveStatus::Unchanged {
            self.articles.insert(id, merged);
        }
        status
    }
}

/// Process-local store. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
    logger: Logger,
}

impl InMemoryStorage {
    pub fn new(logger: Logger) -> Self {
        Self {
            store: Arc::new(RwLock::new(MemoryStore::default())),
            logger,
        }
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.articles.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl StorageBackend for InMemoryStorage {
    fn get_error_message() -> &'static str {
        "Memory storage should always be available"
    }

    async fn connect(_config: &StorageConfig, logger: Logger) -> Result<Self> {
        Ok(Self::new(logger))
    }
}

#[async_trait]
impl ArticleStorage for InMemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    async fn save(&self, article: &Article) -> Result<SaveStatus> {
        let (id, record) = prepare_for_save(article).map_err(|e| {
            self.logger.warn(&format!("Cannot save \"{}\": {}", article.title, e));
            e
        })?;
        let status = self.store.write().await.upsert(id.clone(), record);
        self.logger.debug(&format!("{:?} {}", status, id));
        Ok(status)
    }

    async fn get_by_id(&self, article_id: &str) -> Result<Option<Article>> {
        Ok(self.store.read().await.articles.get(article_id).cloned())
    }

    async fn query(&self, query: &ArticleQuery) -> Result<Vec<Article>> {
        let store = self.store.read().await;
        Ok(query.apply(store.articles.values()))
    }

    async fn count(&self, filter: &ArticleFilter) -> Result<usize> {
        let store = self.store.read().await;
        Ok(store.articles.values().filter(|a| filter.matches(a)).count())
    }

    async fn topics_summary(&self) -> Result<Vec<LabelCount>> {
        let store = self.store.read().await;
        Ok(LabelCount::tally(store.articles.values().flat_map(|a| a.topics.iter())))
    }

    async fn sources_summary(&self) -> Result<Vec<LabelCount>> {
        let store = self.store.read().await;
        Ok(LabelCount::tally(store.articles.values().map(|a| a.source.as_str())))
    }
}
