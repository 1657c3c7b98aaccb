use nde_core::{Article, ArticleFilter, ArticleQuery, LabelCount, Result};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;

use crate::csv_import;
use crate::manager::{PipelineManager, RunReport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineCommand {
    /// One pass, or a fixed-delay loop when an interval is given.
    Run { schedule: Option<Duration> },
    Fetch { url: String },
    Import { csv: PathBuf },
    Recent { filter: ArticleFilter, limit: usize, skip: usize },
    Summary,
}

pub async fn handle_command(
    command: PipelineCommand,
    manager: &PipelineManager,
    shutdown: watch::Receiver<bool>,
) -> Result<()> {
    match command {
        PipelineCommand::Run { schedule: None } => {
            let report = manager.run_once().await?;
            print_report(&report);
        }
        PipelineCommand::Run { schedule: Some(interval) } => {
            let runs = manager.run_scheduled(interval, shutdown).await;
            println!("Stopped after {} runs", runs);
        }
        PipelineCommand::Fetch { url } => {
            let report = manager.fetch_url(&url).await?;
            print_report(&report);
        }
        PipelineCommand::Import { csv } => {
            let logger = nde_core::Logger::new().with_prefix("import");
            let import = csv_import::read_articles_from_path(&csv, &logger)?;
            println!("Read {} articles from {} ({} rows skipped)", import.articles.len(), csv.display(), import.skipped);
            let report = manager.ingest(import.articles).await?;
            print_report(&report);
        }
        PipelineCommand::Recent { filter, limit, skip } => {
            let storage = manager.storage();
            let articles = storage.query(&ArticleQuery::new(filter.clone()).page(limit, skip)).await?;
            let total = storage.count(&filter).await?;
            if articles.is_empty() {
                println!("No articles found");
            }
            for article in &articles {
                print_article(article);
            }
            println!("Showing {} of {} articles", articles.len(), total);
        }
        PipelineCommand::Summary => {
            let storage = manager.storage();
            print_counts("Topics", &storage.topics_summary().await?);
            print_counts("Sources", &storage.sources_summary().await?);
        }
    }
    Ok(())
}

fn print_report(report: &RunReport) {
    println!("✅ {}", report);
}

fn print_article(article: &Article) {
    println!("📰 {}", article.title);
    println!("   Source: {} | Published: {}", article.source, article.published);
    println!("   Topics: {}", article.topics.join(", "));
    if !article.keywords.is_empty() {
        println!("   Keywords: {}", article.keywords.join(", "));
    }
    for (category, values) in article.entities.iter().filter(|(_, values)| !values.is_empty()) {
        println!("   {}: {}", category.label(), values.join(", "));
    }
    println!("   {}", article.link);
    println!();
}

fn print_counts(heading: &str, counts: &[LabelCount]) {
    println!("{}:", heading);
    if counts.is_empty() {
        println!("  (none)");
    }
    for row in counts {
        println!("  {:<20} {}", row.label, row.count);
    }
}
