use scraper::Html;
use serde_json::Value;

use super::utils;

/// Every JSON-LD object in the document, flattening top-level arrays and `@graph` lists.
fn objects(document: &Html) -> Vec<Value> {
    let selector = match utils::selector("script[type='application/ld+json']") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    let mut objects = Vec::new();
    for script in document.select(&selector) {
        let raw = script.text().collect::<String>();
        let Ok(json) = serde_json::from_str::<Value>(raw.trim()) else {
            continue;
        };
        let mut pending = vec![json];
        while let Some(value) = pending.pop() {
            match value {
                Value::Array(items) => pending.extend(items.into_iter().rev()),
                Value::Object(mut map) => {
                    if let Some(graph) = map.remove("@graph") {
                        pending.push(graph);
                    }
                    objects.push(Value::Object(map));
                }
                _ => {}
            }
        }
    }
    objects
}

fn names(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Array(items) => items.iter().for_each(|item| names(item, out)),
        Value::Object(obj) => {
            if let Some(name) = obj.get("name").and_then(|n| n.as_str()) {
                out.push(name.trim().to_string());
            }
        }
        Value::String(s) => out.push(s.trim().to_string()),
        _ => {}
    }
}

/// Extracts authors from JSON-LD metadata in the HTML document.
pub fn extract_authors(document: &Html) -> Vec<String> {
    let mut authors = Vec::new();
    for object in objects(document) {
        if let Some(author) = object.get("author") {
            names(author, &mut authors);
        }
    }
    authors.retain(|a| !a.is_empty());
    authors
}

/// The first JSON-LD `image`, given as a string, an `ImageObject` or a list of either.
pub fn extract_image(document: &Html) -> Option<String> {
    fn url_of(value: &Value) -> Option<String> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Object(obj) => obj.get("url").and_then(url_of),
            Value::Array(items) => items.iter().find_map(url_of),
            _ => None,
        }
    }

    objects(document).iter().filter_map(|object| object.get("image")).find_map(url_of)
}
