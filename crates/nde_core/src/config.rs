//! Runtime configuration.
//!
//! Settings come from built-in defaults, optionally overlaid by a YAML file, then by
//! environment variables. The CLI applies its own flags last.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub feeds: Vec<FeedSource>,
    pub fetch: FetchConfig,
    pub pipeline: PipelineConfig,
    pub storage: StorageConfig,
    pub topics: TopicPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            feeds: FeedSource::defaults(),
            fetch: FetchConfig::default(),
            pipeline: PipelineConfig::default(),
            storage: StorageConfig::default(),
            topics: TopicPolicy::default(),
        }
    }
}

impl Settings {
    /// Defaults, overlaid by `path` when given, then by the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        settings.apply_env(|key| env::var(key).ok())?;
        Ok(settings)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let mut settings: Settings = serde_yaml::from_str(raw)?;
        if settings.feeds.is_empty() {
            settings.feeds = FeedSource::defaults();
        }
        settings.topics.validate()?;
        Ok(settings)
    }

    /// Applies `NDE_STORAGE`, `NDE_DATA_DIR`, `DATABASE_URL`, `NDE_UPDATE_INTERVAL` and
    /// `NDE_REQUEST_TIMEOUT` from `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(kind) = lookup("NDE_STORAGE") {
            self.storage.kind = kind.parse()?;
        }
        if let Some(dir) = lookup("NDE_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.storage.database_url = Some(url);
        }
        if let Some(secs) = lookup("NDE_UPDATE_INTERVAL") {
            self.pipeline.run_interval_secs = parse_secs("NDE_UPDATE_INTERVAL", &secs)?;
        }
        if let Some(secs) = lookup("NDE_REQUEST_TIMEOUT") {
            self.fetch.timeout_secs = parse_secs("NDE_REQUEST_TIMEOUT", &secs)?;
        }
        Ok(())
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} must be a number of seconds, got {:?}", key, raw)))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

impl FeedSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self { name: name.into(), url: url.into() }
    }

    pub fn defaults() -> Vec<FeedSource> {
        vec![
            FeedSource::new("BBC News", "http://feeds.bbci.co.uk/news/rss.xml"),
            FeedSource::new("CNN", "http://rss.cnn.com/rss/edition.rss"),
            FeedSource::new("Reuters", "http://feeds.reuters.com/reuters/topNews"),
            FeedSource::new("New York Times", "https://rss.nytimes.com/services/xml/rss/nyt/HomePage.xml"),
        ]
    }
}

/// HTTP behaviour shared by feed and page requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Extra request headers sent with every request.
    pub headers: BTreeMap<String, String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
            headers: BTreeMap::new(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Pause between consecutive content fetches.
    pub fetch_delay_ms: u64,
    /// Delay between the end of one scheduled run and the start of the next.
    pub run_interval_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fetch_delay_ms: 500,
            run_interval_secs: 3600,
        }
    }
}

impl PipelineConfig {
    pub fn fetch_delay(&self) -> Duration {
        Duration::from_millis(self.fetch_delay_ms)
    }

    pub fn run_interval(&self) -> Duration {
        Duration::from_secs(self.run_interval_secs)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Memory,
    #[default]
    File,
    Postgres,
}

impl FromStr for StorageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(StorageKind::Memory),
            "file" | "files" => Ok(StorageKind::File),
            "postgres" | "postgresql" | "pg" => Ok(StorageKind::Postgres),
            other => Err(Error::Config(format!("Unknown storage backend: {}", other))),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StorageKind::Memory => "memory",
            StorageKind::File => "file",
            StorageKind::Postgres => "postgres",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub kind: StorageKind,
    /// Root directory of the file store.
    pub data_dir: PathBuf,
    pub database_url: Option<String>,
    pub connect_timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            kind: StorageKind::File,
            data_dir: PathBuf::from("data"),
            database_url: None,
            connect_timeout_secs: 10,
        }
    }
}

impl StorageConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Score contributions used by keyword topic classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub body: u32,
    pub title: u32,
    pub phrase: u32,
    pub keyword: u32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self { body: 1, title: 3, phrase: 2, keyword: 4 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRule {
    pub label: String,
    pub keywords: Vec<String>,
}

impl TopicRule {
    pub fn new(label: &str, keywords: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Classification policy: ordered topic keyword table plus scoring parameters. Rule order
/// is the tie-break order between equal scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicPolicy {
    pub rules: Vec<TopicRule>,
    pub weights: ScoringWeights,
    /// A topic is relevant when its score is strictly greater than this.
    pub min_score: u32,
    pub max_topics: usize,
    pub fallback_label: String,
}

impl TopicPolicy {
    pub fn validate(&self) -> Result<()> {
        if self.fallback_label.trim().is_empty() {
            return Err(Error::Config("topics.fallback_label must not be empty".to_string()));
        }
        if self.max_topics == 0 {
            return Err(Error::Config("topics.max_topics must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.label.as_str())
    }
}

impl Default for TopicPolicy {
    fn default() -> Self {
        Self {
            rules: vec![
                TopicRule::new("politics", &[
                    "government", "president", "election", "vote", "policy", "minister",
                    "parliament", "senate", "congress", "democrat", "republican", "law",
                    "legislation", "political", "campaign", "candidate", "party", "bill",
                    "constitution", "diplomat", "foreign policy", "domestic policy",
                ]),
                TopicRule::new("business", &[
                    "economy", "market", "stock", "trade", "company", "industry", "investment",
                    "finance", "bank", "dollar", "euro", "profit", "revenue", "economic",
                    "corporate", "CEO", "startup", "investor", "business", "commercial",
                    "enterprise", "merger", "acquisition", "IPO", "shares", "venture capital",
                ]),
                TopicRule::new("technology", &[
                    "tech", "software", "hardware", "internet", "app", "digital", "computer",
                    "AI", "artificial intelligence", "robot", "smartphone", "cyber", "code",
                    "innovation", "startup", "algorithm", "data", "technology", "silicon valley",
                    "programming", "developer", "cloud", "machine learning", "neural network",
                    "automation", "computing", "interface", "platform", "Google", "Microsoft",
                    "Apple", "Facebook", "Amazon", "Tesla", "engineering",
                ]),
                TopicRule::new("health", &[
                    "medical", "doctor", "hospital", "patient", "disease", "treatment", "drug",
                    "vaccine", "healthcare", "virus", "pandemic", "medicine", "health", "symptom",
                    "clinical", "therapy", "diagnosis", "surgery", "physician", "nurse", "cancer",
                    "diabetes", "heart disease", "mental health", "psychiatry", "wellness",
                ]),
                TopicRule::new("science", &[
                    "research", "scientist", "study", "discovery", "experiment", "space",
                    "physics", "biology", "chemistry", "astronomy", "climate", "environment",
                    "laboratory", "theory", "scientific", "academic", "journal", "hypothesis",
                    "evidence", "data", "analysis", "quantum", "molecular", "ecosystem",
                    "evolution", "genetics", "particle", "NASA", "SpaceX",
                ]),
                TopicRule::new("sports", &[
                    "team", "player", "game", "match", "tournament", "championship", "score",
                    "win", "lose", "football", "soccer", "basketball", "baseball", "tennis",
                    "olympic", "athlete", "coach", "league", "sports", "competition", "fitness",
                    "stadium", "race", "medal", "victory", "defeat", "NHL", "NBA", "NFL", "MLB",
                ]),
                TopicRule::new("entertainment", &[
                    "movie", "film", "actor", "actress", "director", "music", "song",
                    "celebrity", "star", "TV", "show", "award", "performance", "concert",
                    "festival", "album", "Hollywood", "entertainment", "streaming", "Netflix",
                    "Disney", "HBO", "theater", "premiere", "box office", "Grammy", "Oscar",
                    "Emmy", "artist", "band", "singer", "producer",
                ]),
            ],
            weights: ScoringWeights::default(),
            min_score: 1,
            max_topics: 2,
            fallback_label: "general".to_string(),
        }
    }
}
