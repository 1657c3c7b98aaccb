use crate::types::{Article, Entities};

/// Topic and entity enrichment. Implementations are pure functions of the article and
/// the policy they were built with.
pub trait ArticleClassifier: Send + Sync {
    fn name(&self) -> &str;

    /// Up to the configured maximum of topic labels, or the fallback label when nothing
    /// clears the threshold.
    fn classify_topic(&self, article: &Article) -> Vec<String>;

    /// Never fails: problems degrade to a partially filled map.
    fn extract_named_entities(&self, text: &str) -> Entities;

    /// Returns a copy of `article` with `topics` and `entities` filled in.
    fn process_article(&self, article: &Article) -> Article {
        let mut enriched = article.clone();
        enriched.entities = self.extract_named_entities(article.content_text());
        enriched.topics = self.classify_topic(article);
        enriched
    }
}
