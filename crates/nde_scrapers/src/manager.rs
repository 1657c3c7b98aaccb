use nde_core::{Article, ArticleClassifier, ArticleStorage, Error, Logger, PipelineConfig, Result};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Mutex};
use tokio::time::sleep;

use crate::feeds::ArticleSource;
use crate::scrapers::{utils, ContentFetcher, FetchStatus};

/// Counts for one pass through the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub acquired: usize,
    pub fetched: usize,
    pub fetch_failed: usize,
    /// Articles dropped before storage, e.g. for lacking a link.
    pub skipped: usize,
    pub saved: usize,
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub save_failed: usize,
    pub source_failures: usize,
    pub elapsed: Duration,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} acquired, {} fetched, {} fetch failures, {} skipped, {} saved ({} new, {} updated, {} unchanged), {} save failures, {} source failures in {:.1}s",
            self.acquired,
            self.fetched,
            self.fetch_failed,
            self.skipped,
            self.saved,
            self.inserted,
            self.updated,
            self.unchanged,
            self.save_failed,
            self.source_failures,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Acquire, fetch, classify, store. One run at a time.
pub struct PipelineManager {
    source: Arc<dyn ArticleSource>,
    fetcher: Arc<dyn ContentFetcher>,
    classifier: Arc<dyn ArticleClassifier>,
    storage: Arc<dyn ArticleStorage>,
    config: PipelineConfig,
    run_guard: Mutex<()>,
    logger: Logger,
}

impl PipelineManager {
    pub fn new(
        source: Arc<dyn ArticleSource>,
        fetcher: Arc<dyn ContentFetcher>,
        classifier: Arc<dyn ArticleClassifier>,
        storage: Arc<dyn ArticleStorage>,
        config: PipelineConfig,
        logger: Logger,
    ) -> Self {
        Self {
            source,
            fetcher,
            classifier,
            storage,
            config,
            run_guard: Mutex::new(()),
            logger: logger.with_prefix("pipeline"),
        }
    }

    pub fn storage(&self) -> &Arc<dyn ArticleStorage> {
        &self.storage
    }

    pub async fn run_once(&self) -> Result<RunReport> {
        let _guard = self.run_guard.lock().await;
        let started = Instant::now();
        self.logger.info(&format!("Starting run: acquiring from {}", self.source.name()));

        let batch = self.source.acquire().await;
        let mut report = RunReport {
            acquired: batch.articles.len(),
            source_failures: batch.failures.len(),
            ..RunReport::default()
        };
        self.logger.info(&format!("Found {} articles from {}", report.acquired, self.source.name()));

        let result = self.process(batch.articles, &mut report).await;
        report.elapsed = started.elapsed();
        result.map(|_| report)
    }

    /// Runs articles that did not come from the configured source: content is fetched
    /// only when missing.
    pub async fn ingest(&self, articles: Vec<Article>) -> Result<RunReport> {
        let _guard = self.run_guard.lock().await;
        let started = Instant::now();
        let mut report = RunReport { acquired: articles.len(), ..RunReport::default() };
        let result = self.process(articles, &mut report).await;
        report.elapsed = started.elapsed();
        result.map(|_| report)
    }

    /// Ingests a single page, attributed to its host.
    pub async fn fetch_url(&self, url: &str) -> Result<RunReport> {
        let parsed = utils::parse_url(url)?;
        let source = parsed.host_str().unwrap_or("Unknown").to_string();
        self.ingest(vec![Article::stub("", url, source)]).await
    }

    async fn process(&self, articles: Vec<Article>, report: &mut RunReport) -> Result<()> {
        let mut ready = Vec::with_capacity(articles.len());
        let mut fetched_any = false;

        for article in articles {
            if article.link.is_empty() {
                self.logger.warn(&format!("Skipping \"{}\": no link", article.title));
                report.skipped += 1;
                continue;
            }

            let article = if article.content.is_none() {
                if fetched_any {
                    sleep(self.config.fetch_delay()).await;
                }
                fetched_any = true;
                let outcome = self.fetcher.fetch_content(article).await;
                match &outcome.status {
                    FetchStatus::Fetched => report.fetched += 1,
                    FetchStatus::Failed(_) => report.fetch_failed += 1,
                    FetchStatus::Skipped(reason) => {
                        self.logger.warn(&format!("Skipping \"{}\": {}", outcome.article.title, reason));
                        report.skipped += 1;
                        continue;
                    }
                }
                outcome.article
            } else {
                article
            };

            ready.push(self.classifier.process_article(&article));
        }

        self.logger.info(&format!("Saving {} articles to {}", ready.len(), self.storage.name()));
        let saves = self.storage.save_many(&ready).await;
        report.saved = saves.saved;
        report.inserted = saves.inserted;
        report.updated = saves.updated;
        report.unchanged = saves.unchanged;
        report.save_failed = saves.failures.len();
        for failure in &saves.failures {
            self.logger.warn(&format!("Failed to save \"{}\": {}", failure.title, failure.reason));
        }

        if !ready.is_empty() && saves.saved == 0 {
            let reason = saves.failures.first().map(|f| f.reason.as_str()).unwrap_or("unknown error");
            return Err(Error::Storage(format!(
                "none of {} articles could be saved: {}",
                ready.len(),
                reason
            )));
        }
        self.logger.info(&format!("Successfully saved {} articles", saves.saved));
        Ok(())
    }

    /// Runs until `shutdown` turns true, waiting `interval` after each run finishes. Failed
    /// runs are logged and retried on the next tick. Returns the number of runs made.
    pub async fn run_scheduled(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) -> usize {
        self.logger.info(&format!("Starting scheduled pipeline, will update every {:?}", interval));
        let mut runs = 0;

        loop {
            if *shutdown.borrow() {
                break;
            }
            runs += 1;
            match self.run_once().await {
                Ok(report) => self.logger.info(&format!(
                    "Run {} completed: {}. Waiting {:?} until next update.",
                    runs, report, interval
                )),
                Err(e) => self.logger.error(&format!(
                    "Run {} failed: {}. Will retry in {:?}.",
                    runs, e, interval
                )),
            }

            if !self.wait(interval, &mut shutdown).await {
                break;
            }
        }

        self.logger.info(&format!("Scheduled pipeline stopped after {} runs", runs));
        runs
    }

    /// Sleeps for `interval`. False when shutdown was requested meanwhile.
    async fn wait(&self, interval: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
        let deadline = sleep(interval);
        tokio::pin!(deadline);
        loop {
            tokio::select! {
                _ = &mut deadline => return true,
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        // nobody left to signal
                        (&mut deadline).await;
                        return true;
                    }
                    if *shutdown.borrow() {
                        return false;
                    }
                }
            }
        }
    }
}
