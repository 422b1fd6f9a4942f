use std::collections::BTreeMap;
use std::process::{Child, Command, Stdio};

use crate::deck::LanguagePair;

/// One request to the speech backend.
#[derive(Clone, Debug, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub lang_tag: String,
    pub voice: Option<String>,
    pub rate: f32,
}

pub trait Speaker {
    /// Stop whatever is currently being spoken.
    fn cancel(&mut self);
    fn speak(&mut self, utterance: &Utterance);
}

/// Speaker used when narration is disabled or no TTS command is available.
#[derive(Debug, Default)]
pub struct SilentSpeaker;

impl Speaker for SilentSpeaker {
    fn cancel(&mut self) {}
    fn speak(&mut self, _utterance: &Utterance) {}
}

/// Speaks by spawning an external TTS program (`espeak-ng` by default).
#[derive(Debug)]
pub struct CommandSpeaker {
    program: String,
    child: Option<Child>,
}

impl CommandSpeaker {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            child: None,
        }
    }

    fn words_per_minute(rate: f32) -> u32 {
        (175.0 * rate).round().max(80.0) as u32
    }
}

impl Speaker for CommandSpeaker {
    fn cancel(&mut self) {
        if let Some(mut child) = self.child.take() {
            // The process may have exited already.
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    fn speak(&mut self, utterance: &Utterance) {
        self.cancel();
        let voice = utterance
            .voice
            .clone()
            .unwrap_or_else(|| utterance.lang_tag.to_lowercase());
        let spawned = Command::new(&self.program)
            .arg("-v")
            .arg(&voice)
            .arg("-s")
            .arg(Self::words_per_minute(utterance.rate).to_string())
            .arg(&utterance.text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(child) => self.child = Some(child),
            Err(e) => log::warn!("failed to start {}: {e}", self.program),
        }
    }
}

impl Drop for CommandSpeaker {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Turns card text into utterances in the right language.
pub struct Narrator {
    speaker: Box<dyn Speaker>,
    enabled: bool,
    langs: LanguagePair,
    voices: BTreeMap<String, String>,
    rate: f32,
}

impl Narrator {
    pub fn new(speaker: Box<dyn Speaker>, langs: LanguagePair) -> Self {
        Self {
            speaker,
            enabled: false,
            langs,
            voices: BTreeMap::new(),
            rate: 0.9,
        }
    }

    pub fn with_voices(mut self, voices: BTreeMap<String, String>) -> Self {
        self.voices = voices;
        self
    }

    pub fn silent() -> Self {
        Self::new(Box::new(SilentSpeaker), LanguagePair::default())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.speaker.cancel();
        }
    }

    pub fn set_langs(&mut self, langs: LanguagePair) {
        self.langs = langs;
    }

    /// `is_target` selects the back language, otherwise the front language.
    pub fn utterance(&self, text: &str, is_target: bool) -> Utterance {
        let code = if is_target {
            &self.langs.back
        } else {
            &self.langs.front
        };
        Utterance {
            text: text.to_string(),
            lang_tag: LanguagePair::tag(code),
            voice: self.voices.get(code).cloned(),
            rate: self.rate,
        }
    }

    pub fn narrate(&mut self, text: &str, is_target: bool) {
        if !self.enabled || text.trim().is_empty() {
            return;
        }
        let utterance = self.utterance(text, is_target);
        log::debug!("narrating {:?} in {}", utterance.text, utterance.lang_tag);
        self.speaker.cancel();
        self.speaker.speak(&utterance);
    }

    pub fn cancel(&mut self) {
        self.speaker.cancel();
    }
}
