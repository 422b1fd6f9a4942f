use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::engine::normalize::normalize_text;

pub type CardId = u64;

/// Keys used by decks saved before per-language columns existed.
const LEGACY_FRONT: &str = "front";
const LEGACY_BACK: &str = "back";

/// Which side of a card is facing the learner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Face {
    Front,
    Back,
}

impl Face {
    pub fn flipped(self) -> Self {
        match self {
            Face::Front => Face::Back,
            Face::Back => Face::Front,
        }
    }
}

/// The language codes that make up a card's front and back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LanguagePair {
    pub front: String,
    pub back: String,
}

impl LanguagePair {
    pub fn new(front: &str, back: &str) -> Self {
        Self {
            front: front.to_string(),
            back: back.to_string(),
        }
    }

    /// BCP-47 style tag for a stored language code (`es_ES` -> `es-ES`).
    pub fn tag(code: &str) -> String {
        code.replace('_', "-")
    }
}

impl Default for LanguagePair {
    fn default() -> Self {
        Self::new("en_US", "es_ES")
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    #[serde(default)]
    pub categories: BTreeSet<String>,
    #[serde(default)]
    pub study_count: u32,
    #[serde(flatten)]
    pub translations: BTreeMap<String, String>,
}

impl Card {
    pub fn new(id: CardId, langs: &LanguagePair, front: &str, back: &str, category: &str) -> Self {
        let mut translations = BTreeMap::new();
        translations.insert(langs.front.clone(), front.to_string());
        translations.insert(langs.back.clone(), back.to_string());
        let mut categories = BTreeSet::new();
        if !category.is_empty() {
            categories.insert(category.to_string());
        }
        Self {
            id,
            categories,
            study_count: 0,
            translations,
        }
    }

    pub fn text(&self, lang: &str) -> &str {
        self.translations.get(lang).map(String::as_str).unwrap_or("")
    }

    pub fn front(&self, langs: &LanguagePair) -> &str {
        self.text(&langs.front)
    }

    pub fn back(&self, langs: &LanguagePair) -> &str {
        self.text(&langs.back)
    }

    /// Text shown for `face`. Reversed decks show the back language first.
    pub fn face_text(&self, face: Face, langs: &LanguagePair, reversed: bool) -> &str {
        let show_back = (face == Face::Back) != reversed;
        if show_back {
            self.back(langs)
        } else {
            self.front(langs)
        }
    }

    /// The text a learner has to produce when recalling this card.
    pub fn recall_target(&self, langs: &LanguagePair, reversed: bool) -> &str {
        self.face_text(Face::Back, langs, reversed)
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.contains(category)
    }

    /// True when front and back normalize to the same text as `front`/`back`.
    pub fn same_content(&self, langs: &LanguagePair, front: &str, back: &str) -> bool {
        normalize_text(self.front(langs)) == normalize_text(front)
            && normalize_text(self.back(langs)) == normalize_text(back)
    }

    /// Move legacy `front`/`back` keys onto the configured language codes and
    /// drop blank translations and categories.
    pub fn migrate_legacy(&mut self, langs: &LanguagePair) {
        for (legacy, code) in [(LEGACY_FRONT, &langs.front), (LEGACY_BACK, &langs.back)] {
            if let Some(text) = self.translations.remove(legacy) {
                let missing = self
                    .translations
                    .get(code.as_str())
                    .is_none_or(|t| t.trim().is_empty());
                if missing {
                    self.translations.insert(code.clone(), text);
                }
            }
        }
        self.translations.retain(|_, text| !text.trim().is_empty());
        self.categories.retain(|c| !c.trim().is_empty());
    }
}
