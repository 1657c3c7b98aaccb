use clap::Parser;
use nde_core::logging::init_logging;
use nde_core::{ArticleFilter, ArticleStorage, Logger, Result, Settings, StorageConfig, StorageKind};
use nde_scrapers::{handle_command, FeedAcquirer, HttpContentFetcher, PipelineCommand, PipelineManager};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

const STORAGE_ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_unit = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                let unit = match c {
                    's' => 1,
                    'm' => 60,
                    'h' => 3600,
                    'd' => 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                };
                total_seconds = num
                    .checked_mul(unit)
                    .and_then(|secs| total_seconds.checked_add(secs))
                    .ok_or_else(|| "Duration too large".to_string())?;
                current_number.clear();
                has_unit = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // A trailing bare number is seconds
        if !current_number.is_empty() {
            match current_number.parse::<u64>() {
                Ok(num) => {
                    total_seconds = total_seconds.checked_add(num).ok_or_else(|| "Duration too large".to_string())?;
                    has_unit = true;
                }
                Err(_) => return Err("Invalid number in duration".to_string()),
            }
        }

        if !has_unit {
            return Err("Duration must include a number".to_string());
        }
        if total_seconds == 0 {
            return Err("Duration must be positive".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(name = "nde", author, version, about = "News ingestion, enrichment and storage", long_about = None)]
struct Cli {
    /// Storage backend: memory, file or postgres
    #[arg(long, env = "NDE_STORAGE")]
    storage: Option<StorageKind>,
    /// Connection URL for the postgres backend
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
    /// Root directory of the file backend
    #[arg(long, env = "NDE_DATA_DIR")]
    data_dir: Option<PathBuf>,
    /// YAML settings file
    #[arg(long, short)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Acquire feeds, fetch, classify and store. Runs once unless --schedule is given.
    Run {
        #[arg(long, conflicts_with = "schedule")]
        once: bool,
        #[arg(long)]
        schedule: bool,
        /// Delay between scheduled runs (e.g. 1h, 30m, 1h15m30s). Defaults to the configured interval.
        #[arg(long, requires = "schedule")]
        interval: Option<HumanDuration>,
    },
    /// Fetch, classify and store a single article URL
    Fetch { url: String },
    /// Import articles from a CSV export
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Print stored articles, newest first
    Recent {
        #[arg(long)]
        topic: Option<String>,
        #[arg(long)]
        source: Option<String>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        skip: usize,
    },
    /// Print article counts per topic and per source
    Summary,
}

impl Cli {
    /// Settings file and environment, then explicit flags.
    fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::load(self.config.as_deref())?;
        if let Some(kind) = self.storage {
            settings.storage.kind = kind;
        }
        if let Some(url) = &self.database_url {
            settings.storage.database_url = Some(url.clone());
        }
        if let Some(dir) = &self.data_dir {
            settings.storage.data_dir = dir.clone();
        }
        Ok(settings)
    }
}

fn pipeline_command(command: Option<Commands>, settings: &Settings) -> PipelineCommand {
    match command.unwrap_or(Commands::Run { once: true, schedule: false, interval: None }) {
        Commands::Run { schedule: false, .. } => PipelineCommand::Run { schedule: None },
        Commands::Run { schedule: true, interval, .. } => PipelineCommand::Run {
            schedule: Some(interval.map(|i| i.0).unwrap_or_else(|| settings.pipeline.run_interval())),
        },
        Commands::Fetch { url } => PipelineCommand::Fetch { url },
        Commands::Import { csv } => PipelineCommand::Import { csv },
        Commands::Recent { topic, source, limit, skip } => PipelineCommand::Recent {
            filter: ArticleFilter { topic, source },
            limit,
            skip,
        },
        Commands::Summary => PipelineCommand::Summary,
    }
}

async fn check_storage(storage: &Arc<dyn ArticleStorage>, logger: &Logger) -> Result<()> {
    let count = storage.count(&ArticleFilter::default()).await?;
    logger.info(&format!(
        "🏦 Storage backend initialized successfully (using {}, {} articles)",
        storage.name(),
        count
    ));
    Ok(())
}

async fn check_storage_with_retry(
    storage: &Arc<dyn ArticleStorage>,
    max_retries: u32,
    timeout: Duration,
    retry_delay: Duration,
    logger: &Logger,
) -> Result<()> {
    let mut retries = 0;
    let mut last_error = None;

    while retries < max_retries {
        let error = match tokio::time::timeout(timeout, check_storage(storage, logger)).await {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(e)) => e,
            Err(_) => nde_core::Error::Timeout(timeout),
        };
        logger.warn(&format!("Storage health check failed: {}", error));
        last_error = Some(error);
        retries += 1;
        if retries < max_retries {
            logger.info(&format!("Retrying storage health check {}/{}...", retries, max_retries));
            tokio::time::sleep(retry_delay).await;
        }
    }

    Err(last_error
        .unwrap_or_else(|| nde_core::Error::Storage("Storage health check failed after all retries".to_string())))
}

/// Opens the configured backend, retrying transient failures. Health checks are separate.
async fn create_storage(
    config: &StorageConfig,
    retry_delay: Duration,
    logger: &Logger,
) -> Result<Arc<dyn ArticleStorage>> {
    let mut retries = STORAGE_ATTEMPTS;
    let mut last_error = None;

    while retries > 0 {
        match nde_storage::create_storage(config, logger.clone()).await {
            Ok(storage) => return Ok(storage),
            Err(nde_core::Error::Config(msg)) => return Err(nde_core::Error::Config(msg)),
            Err(e) => {
                last_error = Some(e);
                retries -= 1;
                if retries > 0 {
                    logger.info(&format!(
                        "Storage initialization failed, retrying {}/{}...",
                        STORAGE_ATTEMPTS - retries,
                        STORAGE_ATTEMPTS
                    ));
                    tokio::time::sleep(retry_delay).await;
                }
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| nde_core::Error::Storage("Storage initialization failed after all retries".to_string())))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let logger = init_logging("info");
    let cli = Cli::parse();
    let settings = cli.settings()?;

    logger.info(&format!("💾 Opening {} storage...", settings.storage.kind));
    let storage = create_storage(&settings.storage, RETRY_DELAY, &logger).await?;
    check_storage_with_retry(
        &storage,
        STORAGE_ATTEMPTS,
        settings.storage.connect_timeout(),
        RETRY_DELAY,
        &logger,
    )
    .await?;

    let classifier = nde_inference::create_classifier(settings.topics.clone(), logger.clone())?;
    logger.info(&format!("🧠 Classifier initialized (using {})", classifier.name()));

    let source = Arc::new(FeedAcquirer::new(settings.feeds.clone(), &settings.fetch, logger.clone())?);
    let fetcher = Arc::new(HttpContentFetcher::new(&settings.fetch, logger.clone())?);
    logger.info(&format!("🦗 {} feeds configured", source.feeds().len()));

    let manager = PipelineManager::new(source, fetcher, classifier, storage, settings.pipeline.clone(), logger.clone());

    let command = pipeline_command(cli.command, &settings);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    if matches!(command, PipelineCommand::Run { schedule: Some(_) }) {
        let logger = logger.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                logger.info("Shutdown requested, stopping after the current run");
                let _ = shutdown_tx.send(true);
            }
        });
    }

    handle_command(command, &manager, shutdown_rx).await?;
    Ok(())
}
