use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};

use crate::config::Config;
use crate::deck::Card;
use crate::store::schema::{BackendSettings, CardExport, DeckData, EXPORT_VERSION, ExportData};

const DECK_FILE: &str = "deck.json";
const SETTINGS_FILE: &str = "settings.json";

/// Local persistence under `<data_dir>/cardorbit`.
pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(Self::default_dir())
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)
            .with_context(|| format!("creating {}", base_dir.display()))?;
        Ok(Self { base_dir })
    }

    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cardorbit")
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    /// `Ok(None)` when the file does not exist yet.
    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let path = self.file_path(name);
        if !path.exists() {
            return Ok(None);
        }
        let content =
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        let data = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(Some(data))
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        write_atomic(&self.file_path(name), data)
    }

    pub fn load_deck(&self) -> Result<Option<Vec<Card>>> {
        let Some(data) = self.load::<DeckData>(DECK_FILE)? else {
            return Ok(None);
        };
        if data.needs_reset() {
            anyhow::bail!(
                "{DECK_FILE} was written by a newer version (schema {})",
                data.schema_version
            );
        }
        Ok(Some(data.cards))
    }

    pub fn save_deck(&self, cards: &[Card]) -> Result<()> {
        self.save(DECK_FILE, &DeckData::new(cards.to_vec()))
    }

    pub fn load_settings(&self) -> Result<BackendSettings> {
        Ok(self.load(SETTINGS_FILE)?.unwrap_or_default())
    }

    pub fn save_settings(&self, settings: &BackendSettings) -> Result<()> {
        self.save(SETTINGS_FILE, settings)
    }

    pub fn export_all(&self, config: &Config, cards: Vec<CardExport>) -> ExportData {
        ExportData {
            cardorbit_export_version: EXPORT_VERSION,
            exported_at: Utc::now(),
            config: config.clone(),
            cards,
        }
    }

    /// Write an export next to the deck and return where it went.
    pub fn write_export(&self, data: &ExportData) -> Result<PathBuf> {
        let name = format!(
            "cardorbit-export-{}.json",
            data.exported_at.format("%Y%m%d-%H%M%S")
        );
        let path = self.file_path(&name);
        write_atomic(&path, data)?;
        Ok(path)
    }
}

/// Write to a sibling `.tmp` file, sync, then rename over the target.
pub fn write_atomic<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let tmp_path = path.with_extension("tmp");

    let json = serde_json::to_string_pretty(data)?;
    let mut file = fs::File::create(&tmp_path)
        .with_context(|| format!("creating {}", tmp_path.display()))?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;

    fs::rename(&tmp_path, path)?;
    Ok(())
}
