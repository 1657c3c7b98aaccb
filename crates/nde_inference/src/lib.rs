use std::sync::Arc;

use nde_core::{ArticleClassifier, Logger, Result, TopicPolicy};

pub mod classifier;
pub mod entities;
pub mod gazetteer;
pub mod text;
pub mod topics;

pub use classifier::KeywordClassifier;

/// Validates `policy` and builds the classifier the pipeline runs with.
pub fn create_classifier(policy: TopicPolicy, logger: Logger) -> Result<Arc<dyn ArticleClassifier>> {
    policy.validate()?;
    Ok(Arc::new(KeywordClassifier::new(policy, logger)))
}

pub mod prelude {
    pub use super::create_classifier;
    pub use super::KeywordClassifier;
    pub use nde_core::{Article, ArticleClassifier, Entities, EntityCategory, Error, Result};
}
