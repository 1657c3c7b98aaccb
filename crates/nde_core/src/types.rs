use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::identity::derive_id;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub article_id: Option<String>,
    pub title: String,
    pub link: String,
    /// Raw timestamp string as published upstream.
    #[serde(default)]
    pub published: String,
    #[serde(default)]
    pub summary: String,
    pub source: String,
    #[serde(with = "timestamp")]
    pub scraped_at: DateTime<Utc>,
    /// `None` until the body has been fetched; `Some("")` is a fetched, empty body.
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub entities: Entities,
    #[serde(default)]
    pub top_image: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
}

impl Article {
    /// Builds a stub: feed metadata only, identity derived from `link`.
    pub fn stub(title: impl Into<String>, link: impl Into<String>, source: impl Into<String>) -> Self {
        let link = link.into();
        Self {
            article_id: Some(derive_id(&link)),
            title: title.into(),
            link,
            published: String::new(),
            summary: String::new(),
            source: source.into(),
            scraped_at: now(),
            content: None,
            keywords: Vec::new(),
            topics: Vec::new(),
            entities: Entities::default(),
            top_image: None,
            authors: Vec::new(),
        }
    }

    pub fn with_published(mut self, published: impl Into<String>) -> Self {
        self.published = published.into();
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// The identifier, if present and non-empty.
    pub fn id(&self) -> Option<&str> {
        self.article_id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn content_text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

/// Current time at the precision every backend persists.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed textual timestamp format used for persisted datetimes.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

    pub fn format(value: &DateTime<Utc>) -> String {
        value.format(FORMAT).to_string()
    }

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        NaiveDateTime::parse_from_str(raw, FORMAT)
            .map(|naive| naive.and_utc())
            .or_else(|e| DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc)).map_err(|_| e))
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityCategory {
    Person,
    Organization,
    Location,
    Gpe,
    Date,
    Money,
}

impl EntityCategory {
    pub const ALL: [EntityCategory; 6] = [
        EntityCategory::Person,
        EntityCategory::Organization,
        EntityCategory::Location,
        EntityCategory::Gpe,
        EntityCategory::Date,
        EntityCategory::Money,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EntityCategory::Person => "PERSON",
            EntityCategory::Organization => "ORGANIZATION",
            EntityCategory::Location => "LOCATION",
            EntityCategory::Gpe => "GPE",
            EntityCategory::Date => "DATE",
            EntityCategory::Money => "MONEY",
        }
    }
}

impl fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Named entities grouped by category. Every category is always present; values keep
/// insertion order and are unique by exact string match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entities(BTreeMap<EntityCategory, Vec<String>>);

impl Default for Entities {
    fn default() -> Self {
        Self(EntityCategory::ALL.iter().map(|c| (*c, Vec::new())).collect())
    }
}

impl Entities {
    /// Adds `value` under `category` unless it is already there. Returns whether it was added.
    pub fn insert(&mut self, category: EntityCategory, value: impl Into<String>) -> bool {
        let value = value.into();
        let bucket = self.0.entry(category).or_default();
        if value.is_empty() || bucket.contains(&value) {
            return false;
        }
        bucket.push(value);
        true
    }

    pub fn get(&self, category: EntityCategory) -> &[String] {
        self.0.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityCategory, &[String])> {
        self.0.iter().map(|(c, v)| (*c, v.as_slice()))
    }
}

/// Equality filters accepted by storage queries. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleFilter {
    /// Matches articles whose `topics` contain this label.
    pub topic: Option<String>,
    pub source: Option<String>,
}

impl ArticleFilter {
    pub fn topic(topic: impl Into<String>) -> Self {
        Self { topic: Some(topic.into()), ..Self::default() }
    }

    pub fn source(source: impl Into<String>) -> Self {
        Self { source: Some(source.into()), ..Self::default() }
    }

    pub fn matches(&self, article: &Article) -> bool {
        let topic_ok = self.topic.as_ref().map_or(true, |t| article.topics.iter().any(|a| a == t));
        let source_ok = self.source.as_ref().map_or(true, |s| &article.source == s);
        topic_ok && source_ok
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    ScrapedAt,
    Published,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: SortField,
    pub descending: bool,
}

impl Default for Sort {
    fn default() -> Self {
        Self { field: SortField::ScrapedAt, descending: true }
    }
}

impl Sort {
    /// Total order used by scanning backends: the sort field, then ascending `article_id`.
    pub fn compare(&self, a: &Article, b: &Article) -> std::cmp::Ordering {
        let primary = match self.field {
            SortField::ScrapedAt => a.scraped_at.cmp(&b.scraped_at),
            SortField::Published => a.published.cmp(&b.published),
            SortField::Title => a.title.cmp(&b.title),
        };
        let primary = if self.descending { primary.reverse() } else { primary };
        primary.then_with(|| a.article_id.cmp(&b.article_id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleQuery {
    pub filter: ArticleFilter,
    pub limit: usize,
    pub skip: usize,
    pub sort: Sort,
}

impl Default for ArticleQuery {
    fn default() -> Self {
        Self {
            filter: ArticleFilter::default(),
            limit: 50,
            skip: 0,
            sort: Sort::default(),
        }
    }
}

impl ArticleQuery {
    pub fn new(filter: ArticleFilter) -> Self {
        Self { filter, ..Self::default() }
    }

    pub fn page(mut self, limit: usize, skip: usize) -> Self {
        self.limit = limit;
        self.skip = skip;
        self
    }

    pub fn sorted_by(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    /// Applies filter, sort and pagination to an in-memory corpus.
    pub fn apply<'a>(&self, articles: impl IntoIterator<Item = &'a Article>) -> Vec<Article> {
        let mut matching: Vec<&Article> = articles.into_iter().filter(|a| self.filter.matches(a)).collect();
        matching.sort_by(|a, b| self.sort.compare(a, b));
        matching.into_iter().skip(self.skip).take(self.limit).cloned().collect()
    }
}

/// One row of a frequency aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

impl LabelCount {
    /// Group-by-count over `labels`, sorted by descending count then ascending label.
    pub fn tally<I, S>(labels: I) -> Vec<LabelCount>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for label in labels {
            *counts.entry(label.as_ref().to_string()).or_insert(0) += 1;
        }
        let mut rows: Vec<LabelCount> = counts.into_iter().map(|(label, count)| LabelCount { label, count }).collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
        rows
    }
}
