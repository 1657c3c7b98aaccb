//! Heuristic named-entity tagger: pattern matching for amounts and dates, then
//! capitalized-run chunking classified with gazetteers and name-shape rules.

use nde_core::{Entities, EntityCategory, Logger};
use regex::Regex;

use crate::gazetteer::{
    COUNTRIES_AND_PLACES, LOCATIONS, LOCATION_SUFFIXES, MONTHS, NAME_HEADS, NOT_ENTITIES,
    ORGANIZATIONS, ORG_SUFFIXES, PERSON_TITLES, SPEECH_VERBS, WEEKDAYS,
};
use crate::text;

lazy_static::lazy_static! {
    static ref TOKEN_RE: Option<Regex> =
        Regex::new(r"(?:[A-Z]\.){2,}|\p{L}[\p{L}\p{M}\d'’&\-]*|\d+(?:[.,]\d+)*|\S").ok();

    static ref MONEY_RE: Option<Regex> = Regex::new(concat!(
        r"[$€£]\s?(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?(?:\s(?:million|billion|trillion|thousand)\b|(?:bn|m|k)\b)?",
        r"|\b(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?\s(?:(?:million|billion|trillion|thousand)\s)?(?:dollars|euros|pounds|yen|yuan|rupees)\b",
    ))
    .ok();

    static ref DATE_RE: Option<Regex> = Regex::new(concat!(
        r"\b(?:Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|June?|July?|Aug(?:ust)?|Sept?(?:ember)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?)\.?\s+\d{1,2}(?:st|nd|rd|th)?(?:,?\s+\d{4})?\b",
        r"|\b\d{1,2}(?:st|nd|rd|th)?\s+(?:of\s+)?(?:January|February|March|April|May|June|July|August|September|October|November|December)(?:,?\s+\d{4})?\b",
        r"|\b(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{4}\b",
        r"|\b(?:Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sunday)\b",
        r"|\b\d{4}-\d{2}-\d{2}\b",
    ))
    .ok();

    static ref YEAR_RE: Option<Regex> =
        Regex::new(r"\b(?:in|since|by|until|during|from)\s+((?:19|20)\d{2})\b").ok();
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    text: &'a str,
    start: usize,
}

/// A token with any possessive ending removed; `end` is the byte offset of the trimmed word.
#[derive(Debug, Clone, Copy)]
struct Word<'a> {
    text: &'a str,
    start: usize,
    end: usize,
}

impl<'a> Token<'a> {
    fn possessive(&self) -> bool {
        self.text.ends_with("'s") || self.text.ends_with("’s")
    }

    fn word(&self) -> Word<'a> {
        let text = self
            .text
            .strip_suffix("'s")
            .or_else(|| self.text.strip_suffix("’s"))
            .unwrap_or(self.text);
        Word { text, start: self.start, end: self.start + text.len() }
    }
}

#[derive(Debug, Clone)]
pub struct EntityExtractor {
    logger: Logger,
}

impl EntityExtractor {
    pub fn new(logger: Logger) -> Self {
        for (name, pattern) in [("token", &*TOKEN_RE), ("money", &*MONEY_RE), ("date", &*DATE_RE), ("year", &*YEAR_RE)] {
            if pattern.is_none() {
                logger.warn(&format!("The {} pattern failed to compile; its entities will be missing", name));
            }
        }
        Self { logger }
    }

    /// Tags `text` sentence by sentence. Every category is present in the result; values
    /// are deduplicated in order of first appearance.
    pub fn extract(&self, text: &str) -> Entities {
        let mut entities = Entities::default();
        if text.trim().is_empty() {
            return entities;
        }
        let sentences = text::sentences(text);
        for sentence in &sentences {
            tag_sentence(sentence, &mut entities);
        }
        self.logger.debug(&format!(
            "Tagged {} entities across {} sentences",
            entities.len(),
            sentences.len()
        ));
        entities
    }
}

fn tag_sentence(sentence: &str, entities: &mut Entities) {
    let mut covered: Vec<(usize, usize)> = Vec::new();

    if let Some(re) = MONEY_RE.as_ref() {
        for m in re.find_iter(sentence) {
            entities.insert(EntityCategory::Money, m.as_str());
            covered.push((m.start(), m.end()));
        }
    }
    if let Some(re) = DATE_RE.as_ref() {
        for m in re.find_iter(sentence) {
            if overlaps(&covered, m.start(), m.end()) {
                continue;
            }
            entities.insert(EntityCategory::Date, m.as_str());
            covered.push((m.start(), m.end()));
        }
    }
    if let Some(re) = YEAR_RE.as_ref() {
        for caps in re.captures_iter(sentence) {
            if let Some(year) = caps.get(1) {
                if !overlaps(&covered, year.start(), year.end()) {
                    entities.insert(EntityCategory::Date, year.as_str());
                    covered.push((year.start(), year.end()));
                }
            }
        }
    }

    let Some(token_re) = TOKEN_RE.as_ref() else {
        return;
    };
    let tokens: Vec<Token> = token_re
        .find_iter(sentence)
        .map(|m| Token { text: m.as_str(), start: m.start() })
        .collect();

    let mut i = 0;
    while i < tokens.len() {
        if !is_name_token(&tokens[i], &covered) {
            i += 1;
            continue;
        }
        let start = i;
        let mut end = i + 1;
        while end < tokens.len() && !tokens[end - 1].possessive() {
            let prev = tokens[end - 1].text;
            let next_is_name = tokens.get(end + 1).map_or(false, |t| is_name_token(t, &covered));
            if is_name_token(&tokens[end], &covered) {
                end += 1;
            } else if tokens[end].text == "." && PERSON_TITLES.contains(&prev) && next_is_name {
                end += 2;
            } else if is_connector(tokens[end].text, prev) && next_is_name {
                end += 2;
            } else {
                break;
            }
        }

        let words: Vec<Word> = tokens[start..end]
            .iter()
            .filter(|t| t.text != ".")
            .map(Token::word)
            .collect();
        let sentence_initial = tokens[..start]
            .iter()
            .all(|t| !t.text.chars().any(char::is_alphanumeric) || text::is_stopword(&t.text.to_lowercase()));
        let next = tokens.get(end).map(|t| t.text);
        classify_chunk(sentence, &words, sentence_initial, next, entities);
        i = end;
    }
}

fn overlaps(covered: &[(usize, usize)], start: usize, end: usize) -> bool {
    covered.iter().any(|&(s, e)| start < e && s < end)
}

fn is_name_token(token: &Token, covered: &[(usize, usize)]) -> bool {
    let word = token.word().text;
    let Some(first) = word.chars().next() else {
        return false;
    };
    first.is_uppercase()
        && !text::is_stopword(&word.to_lowercase())
        && !MONTHS.contains(&word)
        && !WEEKDAYS.contains(&word)
        && !covered.iter().any(|&(s, e)| token.start >= s && token.start < e)
}

fn is_connector(token: &str, prev: &str) -> bool {
    match token {
        "&" | "de" | "van" | "von" | "bin" => true,
        "of" | "for" => NAME_HEADS.contains(&prev),
        _ => false,
    }
}

fn is_acronym(word: &str) -> bool {
    word.chars().filter(|c| c.is_alphabetic()).count() >= 2
        && word.chars().all(|c| c.is_uppercase() || c == '.' || c == '&')
}

fn classify_chunk(
    sentence: &str,
    words: &[Word],
    sentence_initial: bool,
    next: Option<&str>,
    entities: &mut Entities,
) {
    let (Some(first), Some(last)) = (words.first(), words.last()) else {
        return;
    };
    let surface = &sentence[first.start..last.end];
    if NOT_ENTITIES.contains(&surface) {
        return;
    }

    if ORGANIZATIONS.contains(surface) {
        entities.insert(EntityCategory::Organization, surface);
        return;
    }
    if COUNTRIES_AND_PLACES.contains(surface) {
        entities.insert(EntityCategory::Gpe, surface);
        return;
    }
    if LOCATIONS.contains(surface) {
        entities.insert(EntityCategory::Location, surface);
        return;
    }

    if words.len() >= 2 {
        if ORG_SUFFIXES.contains(&last.text) {
            entities.insert(EntityCategory::Organization, surface);
            return;
        }
        if LOCATION_SUFFIXES.contains(&last.text) {
            entities.insert(EntityCategory::Location, surface);
            return;
        }
        if NAME_HEADS.contains(&first.text) && words.iter().any(|w| w.text == "of" || w.text == "for") {
            let category = if LOCATION_SUFFIXES.contains(&first.text) {
                EntityCategory::Location
            } else {
                EntityCategory::Organization
            };
            entities.insert(category, surface);
            return;
        }
    }

    let titles = words.iter().take_while(|w| PERSON_TITLES.contains(&w.text)).count();
    if titles > 0 {
        let name = &words[titles..];
        if let (Some(f), Some(l)) = (name.first(), name.last()) {
            entities.insert(EntityCategory::Person, &sentence[f.start..l.end]);
        }
        return;
    }

    // "Federal Reserve Chair Jerome Powell": an office inside the run starts a new name.
    if let Some(k) = (1..words.len().saturating_sub(1)).find(|&k| PERSON_TITLES.contains(&words[k].text)) {
        classify_chunk(sentence, &words[..k], sentence_initial, Some(words[k].text), entities);
        classify_chunk(sentence, &words[k..], false, next, entities);
        return;
    }

    if words.len() == 1 {
        if is_acronym(first.text) {
            entities.insert(EntityCategory::Organization, surface);
        } else if next.map_or(false, |n| SPEECH_VERBS.contains(&n)) {
            entities.insert(EntityCategory::Person, surface);
        }
        return;
    }

    let name_shaped = words.iter().all(|w| {
        let mut chars = w.text.chars();
        chars.next().map_or(false, char::is_uppercase) && chars.all(|c| c.is_lowercase() || c == '-' || c == '\'')
    });
    if (2..=3).contains(&words.len()) && name_shaped {
        entities.insert(EntityCategory::Person, surface);
    } else if !sentence_initial && words.len() >= 2 && words.iter().any(|w| is_acronym(w.text)) {
        entities.insert(EntityCategory::Organization, surface);
    }
}
