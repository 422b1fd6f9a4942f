use std::time::{Duration, Instant};

use anyhow::Result;

use crate::config::{BackendKind, Config};
use crate::deck::Card;
use crate::store::json_store::JsonStore;
use crate::store::schema::BackendSettings;

pub const SAVE_DEBOUNCE: Duration = Duration::from_millis(500);

/// Where the deck and the settings blob live.
pub trait DeckBackend {
    fn name(&self) -> &'static str;
    /// `Ok(None)` means nothing has been stored yet.
    fn load_deck(&self) -> Result<Option<Vec<Card>>>;
    /// Full replace.
    fn save_deck(&self, cards: &[Card]) -> Result<()>;
    fn load_settings(&self) -> Result<BackendSettings>;
    fn save_settings(&self, settings: &BackendSettings) -> Result<()>;
}

impl DeckBackend for JsonStore {
    fn name(&self) -> &'static str {
        "local"
    }

    fn load_deck(&self) -> Result<Option<Vec<Card>>> {
        JsonStore::load_deck(self)
    }

    fn save_deck(&self, cards: &[Card]) -> Result<()> {
        JsonStore::save_deck(self, cards)
    }

    fn load_settings(&self) -> Result<BackendSettings> {
        JsonStore::load_settings(self)
    }

    fn save_settings(&self, settings: &BackendSettings) -> Result<()> {
        JsonStore::save_settings(self, settings)
    }
}

#[cfg(feature = "network")]
pub struct HttpBackend {
    base: String,
    client: reqwest::blocking::Client,
}

#[cfg(feature = "network")]
impl HttpBackend {
    pub fn new(api_base: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            base: api_base.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{path}", self.base)
    }
}

#[cfg(feature = "network")]
impl DeckBackend for HttpBackend {
    fn name(&self) -> &'static str {
        "http"
    }

    fn load_deck(&self) -> Result<Option<Vec<Card>>> {
        let cards: Vec<Card> = self
            .client
            .get(self.url("deck"))
            .send()?
            .error_for_status()?
            .json()?;
        // The server answers an empty list before anything was saved.
        Ok((!cards.is_empty()).then_some(cards))
    }

    fn save_deck(&self, cards: &[Card]) -> Result<()> {
        self.client
            .post(self.url("deck"))
            .json(cards)
            .send()?
            .error_for_status()?;
        Ok(())
    }

    fn load_settings(&self) -> Result<BackendSettings> {
        Ok(self
            .client
            .get(self.url("settings"))
            .send()?
            .error_for_status()?
            .json()?)
    }

    fn save_settings(&self, settings: &BackendSettings) -> Result<()> {
        self.client
            .post(self.url("settings"))
            .json(settings)
            .send()?
            .error_for_status()?;
        Ok(())
    }
}

pub fn open_backend(config: &Config) -> Result<Box<dyn DeckBackend>> {
    match config.backend {
        BackendKind::Local => Ok(Box::new(JsonStore::new()?)),
        #[cfg(feature = "network")]
        BackendKind::Http => Ok(Box::new(HttpBackend::new(&config.api_base)?)),
        #[cfg(not(feature = "network"))]
        BackendKind::Http => {
            log::warn!("built without the network feature, using the local store");
            Ok(Box::new(JsonStore::new()?))
        }
    }
}

/// Collapses bursts of changes into one write after things settle.
#[derive(Clone, Debug)]
pub struct SaveDebouncer {
    delay: Duration,
    dirty_since: Option<Instant>,
}

impl Default for SaveDebouncer {
    fn default() -> Self {
        Self::new(SAVE_DEBOUNCE)
    }
}

impl SaveDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            dirty_since: None,
        }
    }

    /// Record a change. Each change restarts the quiet period.
    pub fn mark(&mut self, now: Instant) {
        self.dirty_since = Some(now);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty_since.is_some()
    }

    /// True once, when the quiet period has passed since the last change.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.dirty_since {
            Some(since) if now.duration_since(since) >= self.delay => {
                self.dirty_since = None;
                true
            }
            _ => false,
        }
    }

    /// Flush regardless of timing, e.g. on exit.
    pub fn take_pending(&mut self) -> bool {
        self.dirty_since.take().is_some()
    }
}
