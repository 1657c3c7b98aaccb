//! Tokenization helpers shared by topic scoring, entity tagging and keyword extraction.

use std::collections::{HashMap, HashSet};
use unicode_segmentation::UnicodeSegmentation;

lazy_static::lazy_static! {
    static ref STOPWORDS: HashSet<&'static str> = [
        "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
        "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his",
        "himself", "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself",
        "they", "them", "their", "theirs", "themselves", "what", "which", "who", "whom", "this",
        "that", "that'll", "these", "those", "am", "is", "are", "was", "were", "be", "been",
        "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an", "the",
        "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by", "for",
        "with", "about", "against", "between", "into", "through", "during", "before", "after",
        "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over", "under",
        "again", "further", "then", "once", "here", "there", "when", "where", "why", "how", "all",
        "any", "both", "each", "few", "more", "most", "other", "some", "such", "no", "nor", "not",
        "only", "own", "same", "so", "than", "too", "very", "s", "t", "can", "will", "just", "don",
        "don't", "should", "should've", "now", "d", "ll", "m", "o", "re", "ve", "y", "ain",
        "aren", "aren't", "couldn", "couldn't", "didn", "didn't", "doesn", "doesn't", "hadn",
        "hadn't", "hasn", "hasn't", "haven", "haven't", "isn", "isn't", "ma", "mightn",
        "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't", "shouldn",
        "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn", "wouldn't",
    ]
    .into_iter()
    .collect();

    static ref NOUN_EXCEPTIONS: HashMap<&'static str, &'static str> = [
        ("men", "man"), ("women", "woman"), ("children", "child"), ("mice", "mouse"),
        ("geese", "goose"), ("feet", "foot"), ("teeth", "tooth"), ("data", "data"),
        ("media", "media"), ("criteria", "criterion"), ("phenomena", "phenomenon"),
        ("analyses", "analysis"), ("crises", "crisis"), ("theses", "thesis"),
    ]
    .into_iter()
    .collect();
}

/// Abbreviations after which a sentence boundary is not real, e.g. `Mr. Smith`.
const NON_TERMINAL_ABBREVIATIONS: &[&str] = &[
    "Mr.", "Mrs.", "Ms.", "Dr.", "Prof.", "Sen.", "Rep.", "Gov.", "Gen.", "Lt.", "Col.",
    "Sgt.", "Capt.", "St.", "Jr.", "Sr.", "Mt.", "No.", "Inc.", "Corp.", "Co.", "Ltd.", "vs.",
];

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(word)
}

/// Noun lemma: irregular plurals from a small table, then plural suffix rules.
pub fn lemmatize(word: &str) -> String {
    if let Some(lemma) = NOUN_EXCEPTIONS.get(word) {
        return lemma.to_string();
    }
    if word.chars().count() <= 3 {
        return word.to_string();
    }
    for (suffix, replacement) in [("ies", "y"), ("sses", "ss"), ("shes", "sh"), ("ches", "ch"), ("xes", "x"), ("zes", "z")] {
        if let Some(stem) = word.strip_suffix(suffix) {
            return format!("{}{}", stem, replacement);
        }
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }
    match word.strip_suffix('s') {
        Some(stem) => stem.to_string(),
        None => word.to_string(),
    }
}

/// Lowercased, alphabetic-only, stopword-filtered, lemmatized tokens.
pub fn preprocess(text: &str) -> Vec<String> {
    text.unicode_words()
        .map(str::to_lowercase)
        .filter(|w| w.chars().all(char::is_alphabetic))
        .filter(|w| !is_stopword(w))
        .map(|w| lemmatize(&w))
        .collect()
}

/// Sentences by Unicode boundaries, re-joining splits that follow a known abbreviation.
pub fn sentences(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut glue = false;
    for sentence in text.unicode_sentences() {
        if glue {
            if let Some(last) = out.last_mut() {
                last.push_str(sentence);
            }
        } else {
            out.push(sentence.to_string());
        }
        let trimmed = sentence.trim_end();
        glue = NON_TERMINAL_ABBREVIATIONS
            .iter()
            .any(|abbr| trimmed.ends_with(abbr) && word_boundary_before(trimmed, abbr));
    }
    out.into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn word_boundary_before(text: &str, suffix: &str) -> bool {
    text[..text.len() - suffix.len()]
        .chars()
        .last()
        .map_or(true, |c| !c.is_alphanumeric())
}

/// Salient terms of an article: the most frequent non-stopword words of the body, with
/// words that also appear in the title counted extra. Ties keep first-seen order.
pub fn extract_keywords(title: &str, body: &str, limit: usize) -> Vec<String> {
    let candidates = |text: &str| -> Vec<String> {
        text.unicode_words()
            .map(str::to_lowercase)
            .filter(|w| w.chars().count() > 2 && w.chars().all(char::is_alphabetic) && !is_stopword(w))
            .collect()
    };

    let mut order: Vec<String> = Vec::new();
    let mut scores: HashMap<String, usize> = HashMap::new();
    for word in candidates(body) {
        let score = scores.entry(word.clone()).or_insert(0);
        if *score == 0 {
            order.push(word);
        }
        *score += 1;
    }
    for word in candidates(title) {
        if let Some(score) = scores.get_mut(&word) {
            *score += 2;
        }
    }

    let mut ranked: Vec<(usize, String)> = order.into_iter().enumerate().map(|(i, w)| (i, w)).collect();
    ranked.sort_by(|(ia, a), (ib, b)| scores[b].cmp(&scores[a]).then(ia.cmp(ib)));
    ranked.into_iter().take(limit).map(|(_, w)| w).collect()
}
