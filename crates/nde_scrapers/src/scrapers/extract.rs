use scraper::Html;
use url::Url;

use super::{jsonld, utils};

/// Body candidates, most specific first. The first one that yields any text wins.
const BODY_SELECTORS: &[&str] = &[
    "article p",
    "[itemprop='articleBody'] p, .article-body p, .story-body p, .entry-content p, main p, [role='main'] p, #content p",
    "p",
];

const TITLE_SELECTORS: &[(&str, Option<&str>)] = &[
    ("meta[property='og:title']", Some("content")),
    ("title", None),
    ("h1", None),
];

const IMAGE_SELECTORS: &[&str] = &["meta[property='og:image']", "meta[name='twitter:image'], meta[property='twitter:image']"];

/// What could be recovered from one article page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedPage {
    pub title: String,
    /// Paragraphs separated by blank lines.
    pub text: String,
    pub authors: Vec<String>,
    pub top_image: Option<String>,
}

pub fn extract_page(html: &str, base: Option<&Url>) -> ExtractedPage {
    let document = Html::parse_document(html);
    ExtractedPage {
        title: extract_title(&document),
        text: extract_body(&document),
        authors: extract_authors(&document),
        top_image: extract_top_image(&document, base),
    }
}

fn extract_title(document: &Html) -> String {
    for (css, attr) in TITLE_SELECTORS {
        let found = match attr {
            Some(attr) => utils::extract_attr(document, css, attr).unwrap_or_default(),
            None => utils::extract_texts(document, css).unwrap_or_default().into_iter().next(),
        };
        if let Some(title) = found {
            return title;
        }
    }
    String::new()
}

fn extract_body(document: &Html) -> String {
    BODY_SELECTORS
        .iter()
        .map(|css| utils::extract_texts(document, css).unwrap_or_default())
        .find(|paragraphs| !paragraphs.is_empty())
        .map(|paragraphs| paragraphs.join("\n\n"))
        .unwrap_or_default()
}

fn extract_authors(document: &Html) -> Vec<String> {
    let mut authors = jsonld::extract_authors(document);

    if authors.is_empty() {
        if let Ok(Some(meta)) = utils::extract_attr(document, "meta[name='author']", "content") {
            authors = split_byline(&meta);
        }
    }
    if authors.is_empty() {
        authors = utils::extract_texts(document, "a[rel='author'], [rel='author']").unwrap_or_default();
    }

    let mut unique: Vec<String> = Vec::new();
    for author in authors {
        let author = author.trim().trim_start_matches("By ").trim_start_matches("by ").trim().to_string();
        if !author.is_empty() && !unique.contains(&author) {
            unique.push(author);
        }
    }
    unique
}

/// "Jane Doe and John Roe" / "Jane Doe, John Roe" into separate names.
fn split_byline(byline: &str) -> Vec<String> {
    byline
        .split(',')
        .flat_map(|part| part.split(" and "))
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

fn extract_top_image(document: &Html, base: Option<&Url>) -> Option<String> {
    let from_meta = IMAGE_SELECTORS
        .iter()
        .find_map(|css| utils::extract_attr(document, css, "content").unwrap_or_default());
    let image = from_meta
        .or_else(|| jsonld::extract_image(document))
        .or_else(|| utils::extract_attr(document, "article img", "src").unwrap_or_default())?;
    Some(utils::absolutize(&image, base))
}
