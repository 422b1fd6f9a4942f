use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Config;
use crate::deck::Card;

const SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeckData {
    pub schema_version: u32,
    pub cards: Vec<Card>,
}

impl Default for DeckData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            cards: Vec::new(),
        }
    }
}

impl DeckData {
    pub fn new(cards: Vec<Card>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            cards,
        }
    }

    pub fn needs_reset(&self) -> bool {
        self.schema_version > SCHEMA_VERSION
    }
}

/// The settings blob shared with the HTTP backend. Every field is optional;
/// keys this build does not know about are carried through untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fade_time: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_orbit_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_reversed: Option<bool>,
    #[serde(default, alias = "front", skip_serializing_if = "Option::is_none")]
    pub front_lang: Option<String>,
    #[serde(default, alias = "back", skip_serializing_if = "Option::is_none")]
    pub back_lang: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One card in the portable `{front, back, categories, studyCount}` shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardExport {
    pub front: String,
    pub back: String,
    pub categories: Vec<String>,
    pub study_count: u32,
}

pub const EXPORT_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportData {
    pub cardorbit_export_version: u32,
    pub exported_at: DateTime<Utc>,
    pub config: Config,
    pub cards: Vec<CardExport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_blob_accepts_legacy_language_keys() {
        let json = r#"{"fadeTime": 1500, "front": "vi_VN", "back": "de_DE", "customFlag": true}"#;
        let settings: BackendSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.fade_time, Some(1500));
        assert_eq!(settings.front_lang.as_deref(), Some("vi_VN"));
        assert_eq!(settings.back_lang.as_deref(), Some("de_DE"));
        assert_eq!(settings.extra.get("customFlag"), Some(&Value::Bool(true)));
    }

    #[test]
    fn settings_blob_serializes_camel_case_and_keeps_extras() {
        let mut settings = BackendSettings {
            max_orbit_size: Some(12),
            ..BackendSettings::default()
        };
        settings
            .extra
            .insert("selectedCategories".to_string(), Value::Array(Vec::new()));
        let value = serde_json::to_value(&settings).unwrap();
        assert_eq!(value["maxOrbitSize"], 12);
        assert!(value.get("fadeTime").is_none());
        assert!(value.get("selectedCategories").is_some());
    }

    #[test]
    fn export_card_uses_study_count_key() {
        let card = CardExport {
            front: "one".into(),
            back: "uno".into(),
            categories: vec!["Numbers".into()],
            study_count: 3,
        };
        let value = serde_json::to_value(&card).unwrap();
        assert_eq!(value["studyCount"], 3);
    }
}
