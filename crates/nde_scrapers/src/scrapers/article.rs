use async_trait::async_trait;
use nde_core::{Article, Error, FetchConfig, Logger, Result};
use nde_inference::text::extract_keywords;
use reqwest::Client;
use std::time::Duration;

use super::{extract_page, utils, ContentFetcher, FetchOutcome};
use crate::build_client;

const KEYWORD_LIMIT: usize = 10;

/// Downloads article pages and fills in body text, authors, top image and keywords.
pub struct HttpContentFetcher {
    client: Client,
    timeout: Duration,
    logger: Logger,
}

impl HttpContentFetcher {
    pub fn new(fetch: &FetchConfig, logger: Logger) -> Result<Self> {
        Ok(Self {
            client: build_client(fetch)?,
            timeout: fetch.timeout(),
            logger: logger.with_prefix("fetcher"),
        })
    }

    async fn download(&self, url: &str) -> Result<String> {
        let url = utils::parse_url(url)?;
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl ContentFetcher for HttpContentFetcher {
    async fn fetch_content(&self, mut article: Article) -> FetchOutcome {
        if article.link.is_empty() {
            self.logger.warn(&format!("No URL provided for article: {}", article.title));
            return FetchOutcome::skipped(article, "no link");
        }

        let html = match tokio::time::timeout(self.timeout, self.download(&article.link)).await {
            Ok(Ok(html)) => html,
            Ok(Err(e)) => {
                self.logger.warn(&format!("Error scraping {}: {}", article.link, e));
                return FetchOutcome::failed(article, e.to_string());
            }
            Err(_) => {
                let e = Error::Timeout(self.timeout);
                self.logger.warn(&format!("Error scraping {}: {}", article.link, e));
                return FetchOutcome::failed(article, e.to_string());
            }
        };

        let base = utils::parse_url(&article.link).ok();
        let page = extract_page(&html, base.as_ref());
        if article.title.is_empty() {
            article.title = page.title;
        }
        article.keywords = extract_keywords(&article.title, &page.text, KEYWORD_LIMIT);
        article.content = Some(page.text);
        if !page.authors.is_empty() {
            article.authors = page.authors;
        }
        if page.top_image.is_some() {
            article.top_image = page.top_image;
        }

        self.logger.info(&format!("Successfully scraped content for: {}", article.title));
        FetchOutcome::fetched(article)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::FetchStatus;
    use crate::test_support::serve;

    fn fetcher() -> HttpContentFetcher {
        HttpContentFetcher::new(&FetchConfig { timeout_secs: 5, ..FetchConfig::default() }, Logger::new()).unwrap()
    }

    #[tokio::test]
    async fn test_empty_link_is_skipped() {
        let stub = Article::stub("No link", "", "Test");
        let outcome = fetcher().fetch_content(stub.clone()).await;
        assert!(matches!(outcome.status, FetchStatus::Skipped(_)));
        assert_eq!(outcome.article, stub);
    }

    #[tokio::test]
    async fn test_unreachable_host_returns_stub() {
        let stub = Article::stub("Down", "http://127.0.0.1:9/story", "Test");
        let outcome = fetcher().fetch_content(stub.clone()).await;
        assert!(matches!(outcome.status, FetchStatus::Failed(_)));
        assert_eq!(outcome.article, stub);
        assert!(outcome.article.content.is_none());
    }

    #[tokio::test]
    async fn test_error_status_returns_stub() {
        let base = serve(404, "text/html", "<p>gone</p>".to_string()).await;
        let stub = Article::stub("Gone", format!("{}/gone", base), "Test");
        let outcome = fetcher().fetch_content(stub.clone()).await;
        assert!(matches!(outcome.status, FetchStatus::Failed(_)));
        assert_eq!(outcome.article, stub);
    }

    #[tokio::test]
    async fn test_page_is_extracted() {
        let html = r#"<html><head>
            <meta name="author" content="Jane Doe">
            <meta property="og:image" content="/lead.jpg">
        </head><body><article>
            <p>Inflation inflation inflation pressures kept the central bank busy.</p>
            <p>Markets watched the bank closely.</p>
        </article></body></html>"#;
        let base = serve(200, "text/html; charset=utf-8", html.to_string()).await;
        let stub = Article::stub("Bank holds rates", format!("{}/story", base), "Test");

        let outcome = fetcher().fetch_content(stub.clone()).await;
        assert!(outcome.is_fetched());
        let article = outcome.article;
        assert_eq!(article.article_id, stub.article_id);
        assert_eq!(article.title, "Bank holds rates");
        assert_eq!(
            article.content.as_deref(),
            Some("Inflation inflation inflation pressures kept the central bank busy.\n\nMarkets watched the bank closely.")
        );
        assert_eq!(article.authors, vec!["Jane Doe"]);
        assert_eq!(article.top_image, Some(format!("{}/lead.jpg", base)));
        assert_eq!(article.keywords.first().map(String::as_str), Some("bank"));
        assert!(article.keywords.contains(&"inflation".to_string()));
        assert!(article.keywords.len() <= 10);
    }
}
