use std::fs;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::deck::store::DEFAULT_CATEGORY;

/// A card as parsed from user input, before it is merged into the deck.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawCard {
    pub front: String,
    pub back: String,
    pub categories: Vec<String>,
}

impl RawCard {
    pub fn new(front: &str, back: &str, category: &str) -> Self {
        Self {
            front: front.trim().to_string(),
            back: back.trim().to_string(),
            categories: vec![category_or_default(category)],
        }
    }

    fn is_complete(&self) -> bool {
        !self.front.is_empty() && !self.back.is_empty()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImportError {
    #[error("Invalid format. Use JSON or 'Category > Front : Back'.")]
    InvalidFormat,
    #[error("Failed to read {name}: {reason}")]
    Unreadable { name: String, reason: String },
}

fn category_or_default(category: &str) -> String {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        DEFAULT_CATEGORY.to_string()
    } else {
        trimmed.to_string()
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Parse pasted text: a JSON array/object, or `Category > Front : Back` lines.
/// Blank input parses to nothing.
pub fn parse_input(input: &str) -> Result<Vec<RawCard>, ImportError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        let parsed: Value = serde_json::from_str(trimmed).map_err(|_| ImportError::InvalidFormat)?;
        return parse_json(&parsed);
    }
    Ok(parse_lines(trimmed))
}

pub fn parse_json(value: &Value) -> Result<Vec<RawCard>, ImportError> {
    match value {
        Value::Array(items) => items.iter().map(parse_json_item).collect(),
        // A full export file wraps its cards.
        Value::Object(map) if map.get("cards").is_some_and(Value::is_array) => {
            parse_json(&map["cards"])
        }
        Value::Object(map) => Ok(map
            .iter()
            .map(|(key, value)| RawCard::new(key, &value_text(value), DEFAULT_CATEGORY))
            .filter(RawCard::is_complete)
            .collect()),
        _ => Err(ImportError::InvalidFormat),
    }
}

fn parse_json_item(item: &Value) -> Result<RawCard, ImportError> {
    let map = item.as_object().ok_or(ImportError::InvalidFormat)?;
    let (first_key, first_value) = map.iter().next().ok_or(ImportError::InvalidFormat)?;

    let front = ["front", "word"]
        .iter()
        .find_map(|k| map.get(*k).map(value_text))
        .unwrap_or_else(|| first_key.trim().to_string());
    let back = ["back", "meaning"]
        .iter()
        .find_map(|k| map.get(*k).map(value_text))
        .unwrap_or_else(|| value_text(first_value));

    let mut categories: Vec<String> = match map.get("categories") {
        Some(Value::Array(list)) => list
            .iter()
            .map(value_text)
            .filter(|c| !c.is_empty())
            .collect(),
        _ => Vec::new(),
    };
    if categories.is_empty() {
        let single = map.get("category").map(value_text).unwrap_or_default();
        categories.push(category_or_default(&single));
    }

    let card = RawCard {
        front,
        back,
        categories,
    };
    if card.is_complete() {
        Ok(card)
    } else {
        Err(ImportError::InvalidFormat)
    }
}

fn parse_lines(text: &str) -> Vec<RawCard> {
    text.lines()
        .filter(|line| line.contains(':'))
        .filter_map(|line| {
            let (category, rest) = match line.split_once('>') {
                Some((category, rest)) => (category, rest),
                None => (DEFAULT_CATEGORY, line),
            };
            let (front, back) = rest.split_once(':')?;
            let card = RawCard::new(front, back, category);
            card.is_complete().then_some(card)
        })
        .collect()
}

/// Parse a word-list file. Each line holding a `,` or `:` is split at the
/// earliest separator; the file stem becomes the category.
pub fn parse_file_contents(category: &str, contents: &str) -> Vec<RawCard> {
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let idx = line.find([',', ':'])?;
            let card = RawCard::new(&line[..idx], &line[idx + 1..], category);
            card.is_complete().then_some(card)
        })
        .collect()
}

pub fn read_file(path: &Path) -> Result<Vec<RawCard>, ImportError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    let contents = fs::read_to_string(path).map_err(|e| ImportError::Unreadable {
        name: name.clone(),
        reason: e.to_string(),
    })?;
    let category = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or(name);

    let trimmed = contents.trim_start();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        parse_input(&contents)
    } else {
        Ok(parse_file_contents(&category, &contents))
    }
}

/// Read several files; the first unreadable file aborts the whole import.
pub fn read_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<RawCard>, ImportError> {
    let mut cards = Vec::new();
    for path in paths {
        cards.extend(read_file(path.as_ref())?);
    }
    Ok(cards)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn parses_category_lines() {
        let cards = parse_input("Food > apple : manzana\nbread: pan\nno separator here").unwrap();
        assert_eq!(
            cards,
            vec![
                RawCard::new("apple", "manzana", "Food"),
                RawCard::new("bread", "pan", "General"),
            ]
        );
    }

    #[test]
    fn parses_json_array_with_aliases() {
        let input = r#"[
            {"front": "one", "back": "uno", "category": "Numbers"},
            {"word": "two", "meaning": "dos"},
            {"three": "tres"}
        ]"#;
        let cards = parse_input(input).unwrap();
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].categories, vec!["Numbers".to_string()]);
        assert_eq!(cards[1].front, "two");
        assert_eq!(cards[1].categories, vec!["General".to_string()]);
        assert_eq!(cards[2].front, "three");
        assert_eq!(cards[2].back, "tres");
    }

    #[test]
    fn parses_exported_cards_with_category_lists() {
        let input = r#"[{"front": "sun", "back": "sol", "categories": ["Sky", "Nature"], "studyCount": 4}]"#;
        let cards = parse_input(input).unwrap();
        assert_eq!(cards[0].categories, vec!["Sky".to_string(), "Nature".to_string()]);
    }

    #[test]
    fn parses_full_export_files() {
        let input = r#"{"cardorbit_export_version": 1, "cards": [{"front": "moon", "back": "luna", "categories": ["Sky"], "studyCount": 2}]}"#;
        let cards = parse_input(input).unwrap();
        assert_eq!(cards, vec![RawCard::new("moon", "luna", "Sky")]);
    }

    #[test]
    fn parses_json_object_pairs() {
        let cards = parse_input(r#"{"hello": "hola", "four": 4}"#).unwrap();
        assert_eq!(cards.len(), 2);
        assert!(cards.iter().any(|c| c.front == "four" && c.back == "4"));
    }

    #[test]
    fn malformed_json_is_invalid_format() {
        assert_eq!(parse_input("[{\"front\": "), Err(ImportError::InvalidFormat));
        assert_eq!(parse_input("[1, 2]"), Err(ImportError::InvalidFormat));
        assert_eq!(
            ImportError::InvalidFormat.to_string(),
            "Invalid format. Use JSON or 'Category > Front : Back'."
        );
    }

    #[test]
    fn blank_input_is_empty() {
        assert_eq!(parse_input("   \n "), Ok(Vec::new()));
    }

    #[test]
    fn file_lines_split_at_earliest_separator() {
        let cards = parse_file_contents("Verbs", "to be, ser: estar\ncomer:to eat\n\n");
        assert_eq!(cards[0].front, "to be");
        assert_eq!(cards[0].back, "ser: estar");
        assert_eq!(cards[1].front, "comer");
        assert_eq!(cards[1].categories, vec!["Verbs".to_string()]);
    }

    #[test]
    fn read_file_uses_stem_as_category() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("Colors.txt");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "red,rojo").unwrap();
        let cards = read_files(&[path]).unwrap();
        assert_eq!(cards, vec![RawCard::new("red", "rojo", "Colors")]);

        let missing = dir.path().join("missing.txt");
        assert!(matches!(
            read_file(&missing),
            Err(ImportError::Unreadable { .. })
        ));
    }
}
