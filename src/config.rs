use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::deck::LanguagePair;
use crate::session::SessionSettings;
use crate::store::schema::BackendSettings;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Local,
    Http,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_fade_time_ms", alias = "fadeTime")]
    pub fade_time_ms: u64,
    #[serde(default = "default_theme", alias = "themeKey")]
    pub theme: String,
    #[serde(default = "default_card_speed", alias = "cardSpeed")]
    pub card_speed: f64,
    #[serde(default = "default_card_width", alias = "cardWidth")]
    pub card_width: u32,
    #[serde(default = "default_card_height", alias = "cardHeight")]
    pub card_height: u32,
    #[serde(default = "default_max_orbit_size", alias = "maxOrbitSize")]
    pub max_orbit_size: usize,
    #[serde(default, alias = "isReversed")]
    pub is_reversed: bool,
    #[serde(default = "default_front_lang", alias = "front", alias = "frontLang")]
    pub front_lang: String,
    #[serde(default = "default_back_lang", alias = "back", alias = "backLang")]
    pub back_lang: String,
    #[serde(default = "default_learn_delay_secs", alias = "learnDelay")]
    pub learn_delay_secs: u64,
    #[serde(default, alias = "isTtsEnabled")]
    pub tts_enabled: bool,
    #[serde(default = "default_tts_command")]
    pub tts_command: String,
    #[serde(default = "default_auto_random_next")]
    pub auto_random_next: bool,
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub tts_voices: BTreeMap<String, String>,
}

fn default_fade_time_ms() -> u64 {
    3000
}
fn default_theme() -> String {
    "slate".to_string()
}
fn default_card_speed() -> f64 {
    1.0
}
fn default_card_width() -> u32 {
    128
}
fn default_card_height() -> u32 {
    80
}
fn default_max_orbit_size() -> usize {
    50
}
fn default_front_lang() -> String {
    "en_US".to_string()
}
fn default_back_lang() -> String {
    "es_ES".to_string()
}
fn default_learn_delay_secs() -> u64 {
    2
}
fn default_tts_command() -> String {
    "espeak-ng".to_string()
}
fn default_auto_random_next() -> bool {
    false
}
fn default_api_base() -> String {
    "http://localhost:3001".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fade_time_ms: default_fade_time_ms(),
            theme: default_theme(),
            card_speed: default_card_speed(),
            card_width: default_card_width(),
            card_height: default_card_height(),
            max_orbit_size: default_max_orbit_size(),
            is_reversed: false,
            front_lang: default_front_lang(),
            back_lang: default_back_lang(),
            learn_delay_secs: default_learn_delay_secs(),
            tts_enabled: false,
            tts_voices: BTreeMap::new(),
            tts_command: default_tts_command(),
            auto_random_next: default_auto_random_next(),
            backend: BackendKind::default(),
            api_base: default_api_base(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cardorbit")
            .join("config.toml")
    }

    /// Clamp values into usable ranges. Call after loading or merging
    /// settings from elsewhere.
    pub fn validate(&mut self) {
        self.fade_time_ms = self.fade_time_ms.clamp(200, 30_000);
        if !self.card_speed.is_finite() {
            self.card_speed = default_card_speed();
        }
        self.card_speed = self.card_speed.clamp(0.0, 10.0);
        self.card_width = self.card_width.clamp(40, 400);
        self.card_height = self.card_height.clamp(24, 300);
        self.max_orbit_size = self.max_orbit_size.clamp(1, 200);
        self.learn_delay_secs = self.learn_delay_secs.clamp(1, 30);
        if self.front_lang.trim().is_empty() {
            self.front_lang = default_front_lang();
        }
        if self.back_lang.trim().is_empty() {
            self.back_lang = default_back_lang();
        }
        if self.theme.trim().is_empty() {
            self.theme = default_theme();
        }
    }

    pub fn langs(&self) -> LanguagePair {
        LanguagePair::new(&self.front_lang, &self.back_lang)
    }

    pub fn fade_time(&self) -> Duration {
        Duration::from_millis(self.fade_time_ms)
    }

    pub fn learn_delay(&self) -> Duration {
        Duration::from_secs(self.learn_delay_secs)
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            max_orbit_size: self.max_orbit_size,
            card_speed: self.card_speed,
            fade_time: self.fade_time(),
            is_reversed: self.is_reversed,
            learn_delay: self.learn_delay(),
            tts_enabled: self.tts_enabled,
            auto_random_next: self.auto_random_next,
            langs: self.langs(),
            card_width: f64::from(self.card_width),
            card_height: f64::from(self.card_height),
        }
    }

    /// Overlay whatever the backend had stored; absent keys keep local values.
    pub fn apply_backend_settings(&mut self, remote: &BackendSettings) {
        if let Some(v) = remote.fade_time {
            self.fade_time_ms = v;
        }
        if let Some(v) = &remote.theme_key {
            self.theme = v.clone();
        }
        if let Some(v) = remote.card_speed {
            self.card_speed = v;
        }
        if let Some(v) = remote.card_width {
            self.card_width = v;
        }
        if let Some(v) = remote.card_height {
            self.card_height = v;
        }
        if let Some(v) = remote.max_orbit_size {
            self.max_orbit_size = v;
        }
        if let Some(v) = remote.is_reversed {
            self.is_reversed = v;
        }
        if let Some(v) = &remote.front_lang {
            self.front_lang = v.clone();
        }
        if let Some(v) = &remote.back_lang {
            self.back_lang = v.clone();
        }
        self.validate();
    }

    /// The settings blob to send back, keeping keys other clients wrote.
    pub fn backend_settings(&self, previous: &BackendSettings) -> BackendSettings {
        BackendSettings {
            fade_time: Some(self.fade_time_ms),
            theme_key: Some(self.theme.clone()),
            card_speed: Some(self.card_speed),
            card_width: Some(self.card_width),
            card_height: Some(self.card_height),
            max_orbit_size: Some(self.max_orbit_size),
            is_reversed: Some(self.is_reversed),
            front_lang: Some(self.front_lang.clone()),
            back_lang: Some(self.back_lang.clone()),
            extra: previous.extra.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.fade_time_ms, 3000);
        assert_eq!(config.theme, "slate");
        assert_eq!(config.max_orbit_size, 50);
        assert_eq!(config.langs(), LanguagePair::new("en_US", "es_ES"));
        assert_eq!(config.backend, BackendKind::Local);
        assert!(!config.auto_random_next);
    }

    #[test]
    fn test_config_partial_file_keeps_other_defaults() {
        let toml_str = r#"
theme = "midnight"
max_orbit_size = 8
backend = "http"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.theme, "midnight");
        assert_eq!(config.max_orbit_size, 8);
        assert_eq!(config.backend, BackendKind::Http);
        assert_eq!(config.card_width, 128);
    }

    #[test]
    fn test_config_accepts_camel_case_settings_blob() {
        let json = r#"{"fadeTime": 1200, "isReversed": true, "front": "vi_VN", "maxOrbitSize": 5}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.fade_time_ms, 1200);
        assert!(config.is_reversed);
        assert_eq!(config.front_lang, "vi_VN");
        assert_eq!(config.max_orbit_size, 5);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let mut config = Config::default();
        config.tts_voices.insert("es_ES".into(), "es+f2".into());
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config.tts_voices, deserialized.tts_voices);
        assert_eq!(config.api_base, deserialized.api_base);
    }

    #[test]
    fn test_validate_clamps_values() {
        let mut config = Config {
            fade_time_ms: 0,
            card_speed: f64::NAN,
            max_orbit_size: 0,
            learn_delay_secs: 500,
            back_lang: "  ".into(),
            ..Config::default()
        };
        config.validate();
        assert_eq!(config.fade_time_ms, 200);
        assert_eq!(config.card_speed, 1.0);
        assert_eq!(config.max_orbit_size, 1);
        assert_eq!(config.learn_delay_secs, 30);
        assert_eq!(config.back_lang, "es_ES");
    }

    #[test]
    fn test_backend_settings_overlay_and_roundtrip() {
        let mut config = Config::default();
        let remote = BackendSettings {
            card_speed: Some(2.0),
            back_lang: Some("de_DE".into()),
            ..BackendSettings::default()
        };
        config.apply_backend_settings(&remote);
        assert_eq!(config.card_speed, 2.0);
        assert_eq!(config.back_lang, "de_DE");
        assert_eq!(config.fade_time_ms, 3000);

        let blob = config.backend_settings(&remote);
        assert_eq!(blob.fade_time, Some(3000));
        assert_eq!(blob.back_lang.as_deref(), Some("de_DE"));
    }

    #[test]
    fn test_session_settings_follow_config() {
        let config = Config {
            is_reversed: true,
            learn_delay_secs: 5,
            ..Config::default()
        };
        let settings = config.session_settings();
        assert!(settings.is_reversed);
        assert_eq!(settings.learn_delay, Duration::from_secs(5));
        assert_eq!(settings.card_width, 128.0);
    }
}
