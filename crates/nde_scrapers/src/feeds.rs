use async_trait::async_trait;
use futures::future::join_all;
use nde_core::{Article, Error, FeedSource, FetchConfig, Logger, Result};
use reqwest::Client;

use crate::build_client;

/// A source that could not be fetched or parsed during one acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedFailure {
    pub source: String,
    pub url: String,
    pub reason: String,
}

/// Stubs from every source that answered, in source order then entry order.
#[derive(Debug, Clone, Default)]
pub struct FeedBatch {
    pub articles: Vec<Article>,
    pub failures: Vec<FeedFailure>,
}

#[async_trait]
pub trait ArticleSource: Send + Sync {
    fn name(&self) -> &str;

    /// Never fails as a whole: unreachable sources are reported in the batch.
    async fn acquire(&self) -> FeedBatch;
}

pub struct FeedAcquirer {
    client: Client,
    feeds: Vec<FeedSource>,
    logger: Logger,
}

impl FeedAcquirer {
    pub fn new(feeds: Vec<FeedSource>, fetch: &FetchConfig, logger: Logger) -> Result<Self> {
        Ok(Self {
            client: build_client(fetch)?,
            feeds,
            logger: logger.with_prefix("feeds"),
        })
    }

    pub fn feeds(&self) -> &[FeedSource] {
        &self.feeds
    }

    pub async fn fetch_feed(&self, feed: &FeedSource) -> Result<Vec<Article>> {
        let response = self.client.get(&feed.url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        parse_feed(&bytes, &feed.name)
    }
}

#[async_trait]
impl ArticleSource for FeedAcquirer {
    fn name(&self) -> &str {
        "feeds"
    }

    async fn acquire(&self) -> FeedBatch {
        // sources are independent; join_all keeps their configured order
        let results = join_all(self.feeds.iter().map(|feed| async move {
            self.logger.info(&format!("Fetching {} from {}", feed.name, feed.url));
            (feed, self.fetch_feed(feed).await)
        }))
        .await;

        let mut batch = FeedBatch::default();
        for (feed, result) in results {
            match result {
                Ok(articles) => {
                    self.logger.info(&format!("Parsed {} entries from {}", articles.len(), feed.name));
                    batch.articles.extend(articles);
                }
                Err(e) => {
                    self.logger.warn(&format!("Error parsing feed {}: {}", feed.name, e));
                    batch.failures.push(FeedFailure {
                        source: feed.name.clone(),
                        url: feed.url.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        batch
    }
}

/// Parses an RSS 2.0 document, falling back to Atom. Every entry becomes a stub attributed
/// to `source`; absent fields become empty strings.
pub fn parse_feed(bytes: &[u8], source: &str) -> Result<Vec<Article>> {
    if let Ok(channel) = rss::Channel::read_from(bytes) {
        return Ok(from_rss(&channel, source));
    }
    match atom_syndication::Feed::read_from(bytes) {
        Ok(feed) => Ok(from_atom(&feed, source)),
        Err(e) => Err(Error::Feed(format!("{} is neither RSS nor Atom: {}", source, e))),
    }
}

fn from_rss(channel: &rss::Channel, source: &str) -> Vec<Article> {
    channel
        .items()
        .iter()
        .map(|item| {
            Article::stub(item.title().unwrap_or_default(), item.link().unwrap_or_default(), source)
                .with_published(item.pub_date().unwrap_or_default())
                .with_summary(item.description().unwrap_or_default())
        })
        .collect()
}

fn from_atom(feed: &atom_syndication::Feed, source: &str) -> Vec<Article> {
    feed.entries()
        .iter()
        .map(|entry| {
            let link = entry
                .links()
                .iter()
                .find(|l| l.rel() == "alternate")
                .or_else(|| entry.links().first())
                .map(|l| l.href())
                .unwrap_or_default();
            let published = entry.published().unwrap_or_else(|| entry.updated()).to_rfc3339();
            let summary = entry.summary().map(|s| s.as_str()).unwrap_or_default();
            Article::stub(entry.title().as_str(), link, source)
                .with_published(published)
                .with_summary(summary)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve;
    use nde_core::derive_id;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>World</title>
    <link>https://news.example.com</link>
    <description>Top stories</description>
    <item>
      <title>Fed raises interest rates</title>
      <link>https://news.example.com/fed</link>
      <pubDate>Mon, 04 Mar 2024 10:00:00 GMT</pubDate>
      <description><![CDATA[<p>The central bank moved.</p>]]></description>
    </item>
    <item>
      <title>Untitled wire item</title>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Science</title>
  <id>urn:uuid:60a76c80-d399-11d9-b93C-0003939e0af6</id>
  <updated>2024-03-05T12:00:00Z</updated>
  <entry>
    <title>Telescope spots new comet</title>
    <id>urn:uuid:1225c695-cfb8-4ebb-aaaa-80da344efa6a</id>
    <link rel="related" href="https://science.example.org/related"/>
    <link rel="alternate" href="https://science.example.org/comet"/>
    <updated>2024-03-05T12:00:00Z</updated>
    <summary>Astronomers were surprised.</summary>
  </entry>
  <entry>
    <title>Quiet day</title>
    <id>urn:uuid:1225c695-cfb8-4ebb-aaaa-80da344efa6b</id>
    <link href="https://science.example.org/quiet"/>
    <published>2024-03-04T08:30:00+01:00</published>
    <updated>2024-03-05T12:00:00Z</updated>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_rss() {
        let articles = parse_feed(RSS.as_bytes(), "Example News").unwrap();
        assert_eq!(articles.len(), 2);

        let first = &articles[0];
        assert_eq!(first.title, "Fed raises interest rates");
        assert_eq!(first.link, "https://news.example.com/fed");
        assert_eq!(first.published, "Mon, 04 Mar 2024 10:00:00 GMT");
        assert_eq!(first.summary, "<p>The central bank moved.</p>");
        assert_eq!(first.source, "Example News");
        assert_eq!(first.article_id.as_deref(), Some(derive_id("https://news.example.com/fed").as_str()));
        assert!(first.content.is_none());
        assert!(first.topics.is_empty() && first.keywords.is_empty());

        let second = &articles[1];
        assert_eq!(second.link, "");
        assert_eq!(second.published, "");
        assert_eq!(second.summary, "");
    }

    #[test]
    fn test_parse_atom() {
        let articles = parse_feed(ATOM.as_bytes(), "Science Daily").unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].link, "https://science.example.org/comet");
        assert_eq!(articles[0].published, "2024-03-05T12:00:00+00:00");
        assert_eq!(articles[0].summary, "Astronomers were surprised.");
        assert_eq!(articles[1].link, "https://science.example.org/quiet");
        assert_eq!(articles[1].published, "2024-03-04T08:30:00+01:00");
        assert_eq!(articles[1].summary, "");
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(parse_feed(b"<html>nope</html>", "Broken"), Err(Error::Feed(_))));
    }

    #[tokio::test]
    async fn test_unreachable_source_is_reported() {
        let base = serve(200, "application/rss+xml", RSS.to_string()).await;
        let acquirer = FeedAcquirer::new(
            vec![
                FeedSource::new("Down", "http://127.0.0.1:9/rss.xml"),
                FeedSource::new("Up", format!("{}/rss.xml", base)),
            ],
            &FetchConfig { timeout_secs: 5, ..FetchConfig::default() },
            Logger::new(),
        )
        .unwrap();

        let batch = acquirer.acquire().await;
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].source, "Down");
        assert_eq!(batch.articles.len(), 2);
        assert!(batch.articles.iter().all(|a| a.source == "Up"));
    }

    #[tokio::test]
    async fn test_error_status_is_a_failure() {
        let base = serve(503, "text/plain", "unavailable".to_string()).await;
        let acquirer = FeedAcquirer::new(
            vec![FeedSource::new("Flaky", format!("{}/feed", base))],
            &FetchConfig::default(),
            Logger::new(),
        )
        .unwrap();
        let batch = acquirer.acquire().await;
        assert!(batch.articles.is_empty());
        assert_eq!(batch.failures.len(), 1);
    }
}
