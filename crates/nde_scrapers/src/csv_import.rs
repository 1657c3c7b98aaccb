//! Bulk import of previously collected articles from CSV exports.
//!
//! Column names vary between exports, so each field is looked up under a few aliases.

use nde_core::{Article, Error, Logger, Result};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use url::Url;

const TITLE: &[&str] = &["title", "Title"];
const LINK: &[&str] = &["link", "url", "Link"];
const PUBLISHED: &[&str] = &["published", "Published", "pubDate"];
const SUMMARY: &[&str] = &["summary", "Summary", "description"];
const CONTENT: &[&str] = &["content", "Content"];
const SOURCE: &[&str] = &["source", "Source"];

#[derive(Debug, Clone, Default)]
pub struct CsvImport {
    pub articles: Vec<Article>,
    /// Rows without a link or that could not be decoded.
    pub skipped: usize,
}

type Row = HashMap<String, String>;

fn field<'a>(row: &'a Row, names: &[&str]) -> &'a str {
    names
        .iter()
        .filter_map(|name| row.get(*name))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .unwrap_or("")
}

/// The host part of `link`, or `Unknown`.
fn host_name(link: &str) -> String {
    Url::parse(link)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Maps one CSV row onto an article. Returns `None` when the row has no link.
pub fn row_to_article(row: &Row) -> Option<Article> {
    let link = field(row, LINK);
    if link.is_empty() {
        return None;
    }

    let summary = field(row, SUMMARY);
    let content = match field(row, CONTENT) {
        "" => summary,
        content => content,
    };
    let source = match field(row, SOURCE) {
        "" => host_name(link),
        source => source.to_string(),
    };

    let mut article = Article::stub(field(row, TITLE), link, source)
        .with_published(field(row, PUBLISHED))
        .with_summary(summary);
    if !content.is_empty() {
        article.content = Some(content.to_string());
    }
    Some(article)
}

pub fn read_articles<R: Read>(reader: R, logger: &Logger) -> Result<CsvImport> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut import = CsvImport::default();

    for (i, record) in reader.deserialize::<Row>().enumerate() {
        // header is line 1
        let line = i + 2;
        match record {
            Ok(row) => match row_to_article(&row) {
                Some(article) => import.articles.push(article),
                None => {
                    logger.warn(&format!("Skipping CSV row {}: no link", line));
                    import.skipped += 1;
                }
            },
            Err(e) => {
                logger.warn(&format!("Skipping CSV row {}: {}", line, e));
                import.skipped += 1;
            }
        }
    }

    logger.info(&format!("Read {} articles from CSV ({} skipped)", import.articles.len(), import.skipped));
    Ok(import)
}

pub fn read_articles_from_path(path: &Path, logger: &Logger) -> Result<CsvImport> {
    let file = std::fs::File::open(path)
        .map_err(|e| Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", path.display(), e))))?;
    read_articles(file, logger)
}
