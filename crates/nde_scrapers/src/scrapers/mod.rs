use async_trait::async_trait;
use nde_core::Article;

pub mod article;
pub mod extract;
pub mod jsonld;

pub use article::HttpContentFetcher;
pub use extract::{extract_page, ExtractedPage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    Fetched,
    Skipped(String),
    Failed(String),
}

/// The article handed back by a fetcher. On anything but `Fetched` it is the stub that
/// went in, untouched.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub article: Article,
    pub status: FetchStatus,
}

impl FetchOutcome {
    pub fn fetched(article: Article) -> Self {
        Self { article, status: FetchStatus::Fetched }
    }

    pub fn skipped(article: Article, reason: impl Into<String>) -> Self {
        Self { article, status: FetchStatus::Skipped(reason.into()) }
    }

    pub fn failed(article: Article, reason: impl Into<String>) -> Self {
        Self { article, status: FetchStatus::Failed(reason.into()) }
    }

    pub fn is_fetched(&self) -> bool {
        self.status == FetchStatus::Fetched
    }
}

#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Enriches a stub with the page body, authors, top image and keywords. Never fails:
    /// problems are reported through the outcome status.
    async fn fetch_content(&self, article: Article) -> FetchOutcome;
}

/// Common utilities for page extraction
pub(crate) mod utils {
    use nde_core::{Error, Result};
    use scraper::{ElementRef, Html, Selector};
    use url::Url;

    pub fn parse_url(url: &str) -> Result<Url> {
        Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))
    }

    pub fn selector(css: &str) -> Result<Selector> {
        Selector::parse(css).map_err(|e| Error::Scraping(format!("Invalid selector {:?}: {}", css, e)))
    }

    /// Element text with whitespace runs collapsed to single spaces.
    pub fn clean_text(element: ElementRef<'_>) -> String {
        element.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
    }

    pub fn extract_texts(document: &Html, css: &str) -> Result<Vec<String>> {
        let selector = selector(css)?;
        Ok(document
            .select(&selector)
            .map(clean_text)
            .filter(|text| !text.is_empty())
            .collect())
    }

    /// First non-empty value of `attr` among the elements matching `css`.
    pub fn extract_attr(document: &Html, css: &str, attr: &str) -> Result<Option<String>> {
        let selector = selector(css)?;
        Ok(document
            .select(&selector)
            .filter_map(|el| el.value().attr(attr))
            .map(str::trim)
            .find(|value| !value.is_empty())
            .map(str::to_string))
    }

    /// Resolves `href` against `base` when it is relative.
    pub fn absolutize(href: &str, base: Option<&Url>) -> String {
        match base {
            Some(base) => base.join(href).map(String::from).unwrap_or_else(|_| href.to_string()),
            None => href.to_string(),
        }
    }
}
