pub mod config;
pub mod error;
pub mod identity;
pub mod inference;
pub mod logging;
pub mod storage;
pub mod types;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;

pub use config::{FeedSource, FetchConfig, PipelineConfig, ScoringWeights, Settings, StorageConfig, StorageKind, TopicPolicy, TopicRule};
pub use identity::derive_id;
pub use inference::ArticleClassifier;
pub use logging::Logger;
pub use storage::{ArticleStorage, SaveFailure, SaveReport, SaveStatus};
pub use types::{Article, ArticleFilter, ArticleQuery, Entities, EntityCategory, LabelCount, Sort, SortField};
