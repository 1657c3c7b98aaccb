use std::collections::HashSet;

use nde_core::{Article, ScoringWeights, TopicPolicy};

use crate::text;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicScore {
    pub label: String,
    pub score: u32,
}

#[derive(Debug, Clone)]
struct CompiledRule {
    label: String,
    /// Single-word keywords, normalized the same way article tokens are.
    terms: HashSet<String>,
    /// Multi-word keywords, lowercased.
    phrases: Vec<String>,
    /// Every keyword, lowercased, for matching an article's own keyword list.
    keywords: HashSet<String>,
}

impl CompiledRule {
    fn score(&self, title_tokens: &[String], body_tokens: &[String], haystack: &str, article_keywords: &[String], weights: &ScoringWeights) -> u32 {
        let title_hits = title_tokens.iter().filter(|t| self.terms.contains(*t)).count() as u32;
        let body_hits = body_tokens.iter().filter(|t| self.terms.contains(*t)).count() as u32;
        let phrase_hits = self.phrases.iter().filter(|p| haystack.contains(p.as_str())).count() as u32;
        let keyword_hits = article_keywords.iter().filter(|k| self.keywords.contains(*k)).count() as u32;

        title_hits * weights.title
            + body_hits * weights.body
            + phrase_hits * weights.phrase
            + keyword_hits * weights.keyword
    }
}

/// Weighted keyword scorer compiled from a [`TopicPolicy`].
#[derive(Debug, Clone)]
pub struct TopicScorer {
    rules: Vec<CompiledRule>,
    weights: ScoringWeights,
    min_score: u32,
    max_topics: usize,
    fallback_label: String,
}

impl TopicScorer {
    pub fn new(policy: &TopicPolicy) -> Self {
        let rules = policy
            .rules
            .iter()
            .map(|rule| {
                let mut terms = HashSet::new();
                let mut phrases = Vec::new();
                let mut keywords = HashSet::new();
                for keyword in &rule.keywords {
                    let lowered = keyword.trim().to_lowercase();
                    if lowered.is_empty() {
                        continue;
                    }
                    if lowered.split_whitespace().count() > 1 {
                        phrases.push(lowered.split_whitespace().collect::<Vec<_>>().join(" "));
                    } else {
                        terms.insert(text::lemmatize(&lowered));
                    }
                    keywords.insert(lowered);
                }
                CompiledRule { label: rule.label.clone(), terms, phrases, keywords }
            })
            .collect();

        Self {
            rules,
            weights: policy.weights,
            min_score: policy.min_score,
            max_topics: policy.max_topics,
            fallback_label: policy.fallback_label.clone(),
        }
    }

    /// Raw score per configured topic, in configured order.
    pub fn scores(&self, article: &Article) -> Vec<TopicScore> {
        let body = article.content_text();
        let title_tokens = text::preprocess(&article.title);
        let body_tokens = text::preprocess(body);
        let haystack = format!("{} {}", article.title, body).to_lowercase();
        let article_keywords: Vec<String> = article.keywords.iter().map(|k| k.trim().to_lowercase()).collect();

        self.rules
            .iter()
            .map(|rule| TopicScore {
                label: rule.label.clone(),
                score: rule.score(&title_tokens, &body_tokens, &haystack, &article_keywords, &self.weights),
            })
            .collect()
    }

    /// The highest-scoring relevant topics, or the fallback label alone.
    pub fn classify(&self, article: &Article) -> Vec<String> {
        let mut ranked: Vec<TopicScore> = self
            .scores(article)
            .into_iter()
            .filter(|s| s.score > self.min_score)
            .collect();
        // stable: equal scores keep configured order
        ranked.sort_by(|a, b| b.score.cmp(&a.score));

        let topics: Vec<String> = ranked.into_iter().take(self.max_topics).map(|s| s.label).collect();
        if topics.is_empty() {
            vec![self.fallback_label.clone()]
        } else {
            topics
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nde_core::TopicRule;

    fn policy(rules: Vec<TopicRule>) -> TopicPolicy {
        TopicPolicy { rules, ..TopicPolicy::default() }
    }

    fn article(title: &str, content: &str) -> Article {
        Article::stub(title, "https://example.com/a", "Test").with_content(content)
    }

    fn score_of(scorer: &TopicScorer, article: &Article, label: &str) -> u32 {
        scorer
            .scores(article)
            .into_iter()
            .find(|s| s.label == label)
            .map(|s| s.score)
            .unwrap()
    }

    #[test]
    fn test_zero_matches_falls_back() {
        let scorer = TopicScorer::new(&TopicPolicy::default());
        assert_eq!(scorer.classify(&article("", "")), vec!["general"]);
        assert_eq!(scorer.classify(&article("Quiet afternoon", "Nothing happened at all.")), vec!["general"]);
    }

    #[test]
    fn test_title_weighs_three_times_body() {
        let scorer = TopicScorer::new(&policy(vec![TopicRule::new("finance", &["bank"])]));
        assert_eq!(score_of(&scorer, &article("Bank news", ""), "finance"), 3);
        assert_eq!(score_of(&scorer, &article("News", "The bank and other banks."), "finance"), 2);
        assert_eq!(score_of(&scorer, &article("Banks", "bank"), "finance"), 4);
    }

    #[test]
    fn test_phrase_bonus_counts_once() {
        let scorer = TopicScorer::new(&policy(vec![TopicRule::new("tech", &["machine learning"])]));
        let a = article("Machine Learning today", "More machine   learning and machine learning.");
        // counted once, however often it appears
        assert_eq!(score_of(&scorer, &a, "tech"), 2);
    }

    #[test]
    fn test_article_keywords_bonus() {
        let scorer = TopicScorer::new(&policy(vec![TopicRule::new("tech", &["AI", "cloud"])]));
        let mut a = article("Update", "");
        a.keywords = vec!["ai".into(), "Cloud".into(), "weather".into()];
        assert_eq!(score_of(&scorer, &a, "tech"), 8);
        assert_eq!(scorer.classify(&a), vec!["tech"]);
    }

    #[test]
    fn test_threshold_is_strict() {
        let scorer = TopicScorer::new(&policy(vec![TopicRule::new("finance", &["bank"])]));
        assert_eq!(scorer.classify(&article("News", "A bank.")), vec!["general"]);
        assert_eq!(scorer.classify(&article("News", "A bank. Another bank.")), vec!["finance"]);
    }

    #[test]
    fn test_top_two_and_ties_keep_configured_order() {
        let scorer = TopicScorer::new(&policy(vec![
            TopicRule::new("a", &["alpha"]),
            TopicRule::new("b", &["beta"]),
            TopicRule::new("c", &["gamma"]),
        ]));
        let a = article("", "alpha alpha beta beta gamma gamma gamma");
        assert_eq!(scorer.classify(&a), vec!["c", "a"]);
        let tied = article("", "alpha alpha beta beta gamma gamma");
        assert_eq!(scorer.classify(&tied), vec!["a", "b"]);
    }

    #[test]
    fn test_business_headline() {
        let scorer = TopicScorer::new(&TopicPolicy::default());
        let a = article(
            "Fed raises interest rates",
            "The central bank said the economic outlook remained uncertain.",
        );
        let topics = scorer.classify(&a);
        assert!(topics.contains(&"business".to_string()));
        assert!(topics.len() <= 2);
    }

    #[test]
    fn test_deterministic() {
        let scorer = TopicScorer::new(&TopicPolicy::default());
        let a = article(
            "Election campaign heats up",
            "The president and the senate debated the new law while the stock market fell.",
        );
        let first = scorer.classify(&a);
        for _ in 0..5 {
            assert_eq!(scorer.classify(&a), first);
        }
        assert_eq!(first[0], "politics");
    }
}
