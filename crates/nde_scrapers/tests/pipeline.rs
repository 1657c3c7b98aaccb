use async_trait::async_trait;
use nde_core::{
    Article, ArticleClassifier, ArticleFilter, ArticleQuery, ArticleStorage, EntityCategory, Error, LabelCount, Logger,
    PipelineConfig, Result, SaveStatus, TopicPolicy,
};
use nde_inference::KeywordClassifier;
use nde_scrapers::{
    handle_command, ArticleSource, ContentFetcher, FeedBatch, FeedFailure, FetchOutcome, PipelineCommand,
    PipelineManager,
};
use nde_storage::InMemoryStorage;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::watch;

struct StaticSource {
    articles: Vec<Article>,
    failures: Vec<FeedFailure>,
    calls: AtomicUsize,
}

impl StaticSource {
    fn new(articles: Vec<Article>) -> Self {
        Self { articles, failures: Vec::new(), calls: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl ArticleSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn acquire(&self) -> FeedBatch {
        self.calls.fetch_add(1, Ordering::SeqCst);
        FeedBatch { articles: self.articles.clone(), failures: self.failures.clone() }
    }
}

/// Serves canned bodies by link; unknown links fail like an unreachable host.
#[derive(Default)]
struct CannedFetcher {
    pages: HashMap<String, String>,
    seen: Mutex<Vec<String>>,
}

impl CannedFetcher {
    fn with_page(mut self, link: &str, body: &str) -> Self {
        self.pages.insert(link.to_string(), body.to_string());
        self
    }
}

#[async_trait]
impl ContentFetcher for CannedFetcher {
    async fn fetch_content(&self, mut article: Article) -> FetchOutcome {
        self.seen.lock().unwrap().push(article.link.clone());
        match self.pages.get(&article.link) {
            Some(body) => {
                article.content = Some(body.clone());
                FetchOutcome::fetched(article)
            }
            None => FetchOutcome::failed(article, "connection refused"),
        }
    }
}

/// A store whose writes always fail.
struct BrokenStorage;

#[async_trait]
impl ArticleStorage for BrokenStorage {
    fn name(&self) -> &str {
        "broken"
    }

    async fn save(&self, _article: &Article) -> Result<SaveStatus> {
        Err(Error::Database("connection reset".to_string()))
    }

    async fn get_by_id(&self, _article_id: &str) -> Result<Option<Article>> {
        Ok(None)
    }

    async fn query(&self, _query: &ArticleQuery) -> Result<Vec<Article>> {
        Ok(Vec::new())
    }

    async fn count(&self, _filter: &ArticleFilter) -> Result<usize> {
        Ok(0)
    }

    async fn topics_summary(&self) -> Result<Vec<LabelCount>> {
        Ok(Vec::new())
    }

    async fn sources_summary(&self) -> Result<Vec<LabelCount>> {
        Ok(Vec::new())
    }
}

fn classifier() -> Arc<dyn ArticleClassifier> {
    Arc::new(KeywordClassifier::new(TopicPolicy::default(), Logger::new()))
}

fn fast() -> PipelineConfig {
    PipelineConfig { fetch_delay_ms: 0, run_interval_secs: 0 }
}

fn manager(source: StaticSource, fetcher: CannedFetcher, storage: Arc<dyn ArticleStorage>) -> PipelineManager {
    PipelineManager::new(Arc::new(source), Arc::new(fetcher), classifier(), storage, fast(), Logger::new())
}

const FED_LINK: &str = "https://news.example.com/business/fed-rates";
const FED_BODY: &str = "The Federal Reserve raised interest rates on Wednesday. Chair Jerome Powell said \
the economic outlook for the market remained uncertain and the central bank would watch inflation.";

#[tokio::test]
async fn test_end_to_end_business_article() {
    let storage = Arc::new(InMemoryStorage::new(Logger::new()));
    let stub = Article::stub("Fed raises interest rates", FED_LINK, "Example News");
    let id = stub.article_id.clone().unwrap();
    let pipeline = manager(
        StaticSource::new(vec![stub]),
        CannedFetcher::default().with_page(FED_LINK, FED_BODY),
        storage.clone(),
    );

    let report = pipeline.run_once().await.unwrap();
    assert_eq!(report.acquired, 1);
    assert_eq!(report.fetched, 1);
    assert_eq!(report.saved, 1);
    assert_eq!(report.inserted, 1);

    let stored = storage.get_by_id(&id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Fed raises interest rates");
    assert!(stored.topics.contains(&"business".to_string()), "{:?}", stored.topics);
    assert!(stored.entities.get(EntityCategory::Person).contains(&"Jerome Powell".to_string()));
    assert!(stored.entities.get(EntityCategory::Organization).contains(&"Federal Reserve".to_string()));

    // rerun lands on the same record
    let again = pipeline.run_once().await.unwrap();
    assert_eq!(again.unchanged, 1);
    assert_eq!(storage.len().await, 1);
}

#[tokio::test]
async fn test_fetch_failure_still_stores_stub() {
    let storage = Arc::new(InMemoryStorage::new(Logger::new()));
    let pipeline = manager(
        StaticSource::new(vec![
            Article::stub("Reachable", "https://a.example.com/1", "A"),
            Article::stub("Unreachable", "https://down.example.com/2", "A"),
        ]),
        CannedFetcher::default().with_page("https://a.example.com/1", "Plain words."),
        storage.clone(),
    );

    let report = pipeline.run_once().await.unwrap();
    assert_eq!(report.fetched, 1);
    assert_eq!(report.fetch_failed, 1);
    assert_eq!(report.saved, 2);

    let down = Article::stub("", "https://down.example.com/2", "A");
    let stored = storage.get_by_id(down.id().unwrap()).await.unwrap().unwrap();
    assert_eq!(stored.content, None);
    assert_eq!(stored.topics, vec!["general"]);
    assert!(stored.entities.is_empty());
}

#[tokio::test]
async fn test_empty_links_are_skipped() {
    let storage = Arc::new(InMemoryStorage::new(Logger::new()));
    let fetcher = CannedFetcher::default();
    let pipeline = PipelineManager::new(
        Arc::new(StaticSource::new(vec![
            Article::stub("No link", "", "A"),
            Article::stub("Linked", "https://a.example.com/1", "A"),
        ])),
        Arc::new(fetcher),
        classifier(),
        storage.clone(),
        fast(),
        Logger::new(),
    );

    let report = pipeline.run_once().await.unwrap();
    assert_eq!(report.acquired, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.saved, 1);
    assert_eq!(storage.len().await, 1);
}

#[tokio::test]
async fn test_source_failures_are_reported() {
    let mut source = StaticSource::new(vec![Article::stub("One", "https://a.example.com/1", "A")]);
    source.failures.push(FeedFailure {
        source: "Down".into(),
        url: "http://127.0.0.1:9/rss".into(),
        reason: "connection refused".into(),
    });
    let pipeline = manager(source, CannedFetcher::default(), Arc::new(InMemoryStorage::new(Logger::new())));
    let report = pipeline.run_once().await.unwrap();
    assert_eq!(report.source_failures, 1);
    assert_eq!(report.saved, 1);
}

#[tokio::test]
async fn test_storage_fault_fails_the_run() {
    let pipeline = manager(
        StaticSource::new(vec![Article::stub("One", "https://a.example.com/1", "A")]),
        CannedFetcher::default(),
        Arc::new(BrokenStorage),
    );
    assert!(matches!(pipeline.run_once().await, Err(Error::Storage(_))));

    // an empty batch is not a storage fault
    let empty = manager(StaticSource::new(Vec::new()), CannedFetcher::default(), Arc::new(BrokenStorage));
    assert_eq!(empty.run_once().await.unwrap().saved, 0);
}

#[tokio::test]
async fn test_ingest_fetches_only_missing_content() {
    let storage = Arc::new(InMemoryStorage::new(Logger::new()));
    let fetcher = Arc::new(CannedFetcher::default().with_page("https://b.example.com/2", "Fetched body."));
    let pipeline = PipelineManager::new(
        Arc::new(StaticSource::new(Vec::new())),
        fetcher.clone(),
        classifier(),
        storage.clone(),
        fast(),
        Logger::new(),
    );

    let with_content = Article::stub("Has body", "https://a.example.com/1", "A").with_content("Already here.");
    let without = Article::stub("Needs body", "https://b.example.com/2", "B");
    let report = pipeline.ingest(vec![with_content, without]).await.unwrap();

    assert_eq!(report.saved, 2);
    assert_eq!(report.fetched, 1);
    assert_eq!(*fetcher.seen.lock().unwrap(), vec!["https://b.example.com/2".to_string()]);
}

fn paced(fetcher: Arc<CannedFetcher>, storage: Arc<dyn ArticleStorage>, fetch_delay_ms: u64) -> PipelineManager {
    PipelineManager::new(
        Arc::new(StaticSource::new(Vec::new())),
        fetcher,
        classifier(),
        storage,
        PipelineConfig { fetch_delay_ms, run_interval_secs: 0 },
        Logger::new(),
    )
}

#[tokio::test]
async fn test_fetches_are_spaced_by_delay() {
    let delay = Duration::from_millis(60);
    let fetcher = Arc::new(CannedFetcher::default().with_page(FED_LINK, FED_BODY));
    let pipeline = paced(fetcher.clone(), Arc::new(InMemoryStorage::new(Logger::new())), 60);
    let stubs = vec![
        Article::stub("Fed raises interest rates", FED_LINK, "Example News"),
        Article::stub("Unreachable one", "https://down.example.com/1", "Down"),
        Article::stub("Unreachable two", "https://down.example.com/2", "Down"),
    ];

    let started = Instant::now();
    let report = pipeline.ingest(stubs).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(report.fetched, 1);
    assert_eq!(report.fetch_failed, 2);
    assert_eq!(fetcher.seen.lock().unwrap().len(), 3);
    // no pause before the first fetch, one before each later one
    assert!(elapsed >= delay * 2, "{:?}", elapsed);
    assert!(report.elapsed >= delay * 2, "{:?}", report.elapsed);
}

#[tokio::test]
async fn test_no_delay_for_prefilled_or_linkless_articles() {
    let fetcher = Arc::new(CannedFetcher::default().with_page(FED_LINK, FED_BODY));
    let pipeline = paced(fetcher.clone(), Arc::new(InMemoryStorage::new(Logger::new())), 500);
    let batch = vec![
        Article::stub("Has body", "https://a.example.com/1", "A").with_content("Already here."),
        Article::stub("No link", "", "Wire"),
        Article::stub("Fed raises interest rates", FED_LINK, "Example News"),
        Article::stub("Also has body", "https://a.example.com/2", "A").with_content("Also here."),
    ];

    let started = Instant::now();
    let report = pipeline.ingest(batch).await.unwrap();

    assert!(started.elapsed() < Duration::from_millis(500), "{:?}", started.elapsed());
    assert_eq!(report.skipped, 1);
    assert_eq!(report.fetched, 1);
    assert_eq!(report.saved, 3);
    assert_eq!(*fetcher.seen.lock().unwrap(), vec![FED_LINK.to_string()]);
}

#[tokio::test]
async fn test_fetch_url_uses_host_as_source() {
    let storage = Arc::new(InMemoryStorage::new(Logger::new()));
    let link = "https://www.example.org/story";
    let pipeline = manager(
        StaticSource::new(Vec::new()),
        CannedFetcher::default().with_page(link, "Story body."),
        storage.clone(),
    );
    let report = pipeline.fetch_url(link).await.unwrap();
    assert_eq!(report.saved, 1);

    let stored = storage.query(&ArticleQuery::default()).await.unwrap();
    assert_eq!(stored[0].source, "www.example.org");
    assert_eq!(stored[0].content.as_deref(), Some("Story body."));

    assert!(matches!(pipeline.fetch_url("not a url").await, Err(Error::InvalidUrl(_))));
}

#[tokio::test]
async fn test_scheduled_runs_survive_failures_and_stop_on_shutdown() {
    let source = Arc::new(StaticSource::new(vec![Article::stub("One", "https://a.example.com/1", "A")]));
    let pipeline = Arc::new(PipelineManager::new(
        source.clone(),
        Arc::new(CannedFetcher::default()),
        classifier(),
        Arc::new(BrokenStorage),
        fast(),
        Logger::new(),
    ));

    let (tx, rx) = watch::channel(false);
    let runner = {
        let pipeline = pipeline.clone();
        tokio::spawn(async move { pipeline.run_scheduled(Duration::from_millis(20), rx).await })
    };

    tokio::time::sleep(Duration::from_millis(150)).await;
    tx.send(true).unwrap();
    let runs = tokio::time::timeout(Duration::from_secs(5), runner).await.unwrap().unwrap();

    assert!(runs >= 2, "only {} runs", runs);
    assert_eq!(source.calls.load(Ordering::SeqCst), runs);
}

#[tokio::test]
async fn test_shutdown_before_first_run() {
    let source = Arc::new(StaticSource::new(Vec::new()));
    let pipeline = PipelineManager::new(
        source.clone(),
        Arc::new(CannedFetcher::default()),
        classifier(),
        Arc::new(InMemoryStorage::new(Logger::new())),
        fast(),
        Logger::new(),
    );
    let (_tx, rx) = watch::channel(true);
    assert_eq!(pipeline.run_scheduled(Duration::from_secs(3600), rx).await, 0);
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_recent_and_summary_commands() {
    let storage = Arc::new(InMemoryStorage::new(Logger::new()));
    let pipeline = manager(
        StaticSource::new(vec![Article::stub("Fed raises interest rates", FED_LINK, "Example News")]),
        CannedFetcher::default().with_page(FED_LINK, FED_BODY),
        storage.clone(),
    );
    let (_tx, rx) = watch::channel(false);

    handle_command(PipelineCommand::Run { schedule: None }, &pipeline, rx.clone()).await.unwrap();
    handle_command(
        PipelineCommand::Recent { filter: ArticleFilter::topic("business"), limit: 5, skip: 0 },
        &pipeline,
        rx.clone(),
    )
    .await
    .unwrap();
    handle_command(PipelineCommand::Summary, &pipeline, rx).await.unwrap();
    assert_eq!(storage.count(&ArticleFilter::topic("business")).await.unwrap(), 1);
}

#[tokio::test]
async fn test_import_command() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("articles.csv");
    std::fs::write(
        &path,
        "title,url,content,source\n\
         Fed raises interest rates,https://news.example.com/fed,The central bank raised rates as the economy and the stock market slowed.,Wire\n\
         No link,,Body,Wire\n",
    )
    .unwrap();

    let storage = Arc::new(InMemoryStorage::new(Logger::new()));
    let fetcher = Arc::new(CannedFetcher::default());
    let pipeline = PipelineManager::new(
        Arc::new(StaticSource::new(Vec::new())),
        fetcher.clone(),
        classifier(),
        storage.clone(),
        fast(),
        Logger::new(),
    );
    let (_tx, rx) = watch::channel(false);
    handle_command(PipelineCommand::Import { csv: path }, &pipeline, rx).await.unwrap();

    assert_eq!(storage.len().await, 1);
    assert!(fetcher.seen.lock().unwrap().is_empty());
    let stored = storage.query(&ArticleQuery::default()).await.unwrap();
    assert_eq!(stored[0].source, "Wire");
    assert!(stored[0].topics.contains(&"business".to_string()));
}
