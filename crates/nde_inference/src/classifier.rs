use nde_core::{Article, ArticleClassifier, Entities, Logger, TopicPolicy};

use crate::entities::EntityExtractor;
use crate::topics::{TopicScore, TopicScorer};

/// Keyword-weighted topic classifier paired with the heuristic entity tagger.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    policy: TopicPolicy,
    scorer: TopicScorer,
    extractor: EntityExtractor,
    logger: Logger,
}

impl KeywordClassifier {
    pub fn new(policy: TopicPolicy, logger: Logger) -> Self {
        let logger = logger.with_prefix("classifier");
        let scorer = TopicScorer::new(&policy);
        let extractor = EntityExtractor::new(logger.clone());
        Self { policy, scorer, extractor, logger }
    }

    pub fn policy(&self) -> &TopicPolicy {
        &self.policy
    }

    pub fn scores(&self, article: &Article) -> Vec<TopicScore> {
        self.scorer.scores(article)
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(TopicPolicy::default(), Logger::new())
    }
}

impl ArticleClassifier for KeywordClassifier {
    fn name(&self) -> &str {
        "keyword"
    }

    fn classify_topic(&self, article: &Article) -> Vec<String> {
        let topics = self.scorer.classify(article);
        self.logger.debug(&format!("{} -> {:?}", article.title, topics));
        topics
    }

    fn extract_named_entities(&self, text: &str) -> Entities {
        self.extractor.extract(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nde_core::EntityCategory;

    #[test]
    fn test_process_article_enriches_copy() {
        let classifier = KeywordClassifier::default();
        let stub = Article::stub("Fed raises interest rates", "https://news.example.com/fed", "Example")
            .with_published("Wed, 01 May 2024 10:00:00 GMT")
            .with_content("The Federal Reserve said the bank would act. Economic data from Washington was mixed.");

        let enriched = classifier.process_article(&stub);
        assert!(enriched.topics.contains(&"business".to_string()));
        assert_eq!(enriched.entities.get(EntityCategory::Organization), ["Federal Reserve"]);
        assert_eq!(enriched.entities.get(EntityCategory::Gpe), ["Washington"]);
        assert_eq!(enriched.title, stub.title);
        assert_eq!(enriched.published, stub.published);
        assert_eq!(enriched.article_id, stub.article_id);
        assert_eq!(enriched.content, stub.content);
        assert!(stub.topics.is_empty());
    }

    #[test]
    fn test_missing_content_gives_empty_entities() {
        let classifier = KeywordClassifier::default();
        let stub = Article::stub("Election results announced", "https://news.example.com/vote", "Example");
        let enriched = classifier.process_article(&stub);
        assert!(enriched.entities.is_empty());
        assert_eq!(enriched.entities.iter().count(), EntityCategory::ALL.len());
        assert_eq!(enriched.topics, vec!["politics"]);
    }

    #[test]
    fn test_custom_policy_is_used() {
        let policy = TopicPolicy {
            rules: vec![nde_core::TopicRule::new("weather", &["storm", "rain"])],
            fallback_label: "misc".into(),
            ..TopicPolicy::default()
        };
        let classifier = KeywordClassifier::new(policy, Logger::new());
        let a = Article::stub("Storm warning", "https://x.example/1", "X").with_content("Heavy rain expected.");
        assert_eq!(classifier.classify_topic(&a), vec!["weather"]);
        let b = Article::stub("Quiet day", "https://x.example/2", "X");
        assert_eq!(classifier.classify_topic(&b), vec!["misc"]);
    }
}
