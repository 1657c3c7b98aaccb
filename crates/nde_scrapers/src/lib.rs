pub mod cli;
pub mod csv_import;
pub mod feeds;
pub mod manager;
pub mod scrapers;

pub use cli::{handle_command, PipelineCommand};
pub use feeds::{ArticleSource, FeedAcquirer, FeedBatch, FeedFailure};
pub use manager::{PipelineManager, RunReport};
pub use scrapers::{ContentFetcher, FetchOutcome, FetchStatus, HttpContentFetcher};

use nde_core::{Error, FetchConfig, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// HTTP client shared by feed and page requests, built from the configured timeout,
/// user agent and extra headers.
pub fn build_client(fetch: &FetchConfig) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    for (name, value) in &fetch.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::Config(format!("Invalid header name {:?}: {}", name, e)))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| Error::Config(format!("Invalid value for header {:?}: {}", name, e)))?;
        headers.insert(header_name, header_value);
    }

    Ok(reqwest::Client::builder()
        .user_agent(fetch.user_agent.as_str())
        .default_headers(headers)
        .timeout(fetch.timeout())
        .build()?)
}

pub mod prelude {
    pub use super::feeds::ArticleSource;
    pub use super::scrapers::ContentFetcher;
    pub use super::{PipelineManager, RunReport};
    pub use nde_core::{Article, Error, Result};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_client_rejects_bad_headers() {
        let mut fetch = FetchConfig::default();
        assert!(build_client(&fetch).is_ok());

        fetch.headers.insert("Accept-Language".into(), "en-US".into());
        assert!(build_client(&fetch).is_ok());

        fetch.headers.insert("bad header".into(), "x".into());
        assert!(matches!(build_client(&fetch), Err(Error::Config(_))));
    }
}
