use async_trait::async_trait;
use chrono::SubsecRound;

use crate::types::{Article, ArticleFilter, ArticleQuery, LabelCount};
use crate::{Error, Result};

/// What an upsert did to the stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Inserted,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveFailure {
    pub article_id: Option<String>,
    pub title: String,
    pub reason: String,
}

/// Outcome of a batch save. `saved` counts every article that reached storage, including
/// unchanged ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    pub saved: usize,
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failures: Vec<SaveFailure>,
}

impl SaveReport {
    pub fn record(&mut self, article: &Article, result: Result<SaveStatus>) {
        match result {
            Ok(status) => {
                self.saved += 1;
                match status {
                    SaveStatus::Inserted => self.inserted += 1,
                    SaveStatus::Updated => self.updated += 1,
                    SaveStatus::Unchanged => self.unchanged += 1,
                }
            }
            Err(e) => self.failures.push(SaveFailure {
                article_id: article.article_id.clone(),
                title: article.title.clone(),
                reason: e.to_string(),
            }),
        }
    }

    pub fn attempted(&self) -> usize {
        self.saved + self.failures.len()
    }
}

/// Persistence contract shared by every backend. Writes are upserts keyed on `article_id`;
/// nothing is ever deleted.
#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// Short backend name used in logs.
    fn name(&self) -> &str;

    /// Inserts or updates `article`. Fails only when the article has no identifier or the
    /// backend itself faults.
    async fn save(&self, article: &Article) -> Result<SaveStatus>;

    /// Saves every article independently; one failure never aborts the rest.
    async fn save_many(&self, articles: &[Article]) -> SaveReport {
        let mut report = SaveReport::default();
        for article in articles {
            let result = self.save(article).await;
            report.record(article, result);
        }
        report
    }

    async fn get_by_id(&self, article_id: &str) -> Result<Option<Article>>;

    async fn query(&self, query: &ArticleQuery) -> Result<Vec<Article>>;

    async fn count(&self, filter: &ArticleFilter) -> Result<usize>;

    async fn topics_summary(&self) -> Result<Vec<LabelCount>>;

    async fn sources_summary(&self) -> Result<Vec<LabelCount>>;
}

/// Validates the save precondition and normalizes the record the way every backend stores
/// it. Returns the identifier alongside the record to persist.
pub fn prepare_for_save(article: &Article) -> Result<(String, Article)> {
    let id = article.id().ok_or(Error::MissingArticleId)?.to_string();
    let mut record = article.clone();
    record.scraped_at = record.scraped_at.trunc_subsecs(6);
    Ok((id, record))
}

/// Merges an incoming record over the stored one. The first `scraped_at` is kept; every
/// other field takes the incoming value.
pub fn merge_upsert(existing: Option<&Article>, mut incoming: Article) -> (Article, SaveStatus) {
    match existing {
        None => (incoming, SaveStatus::Inserted),
        Some(stored) => {
            incoming.scraped_at = stored.scraped_at;
            if &incoming == stored {
                (incoming, SaveStatus::Unchanged)
            } else {
                (incoming, SaveStatus::Updated)
            }
        }
    }
}
