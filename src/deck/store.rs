use std::collections::BTreeSet;
use std::fmt;
use std::time::{Duration, Instant};

use crate::deck::card::{Card, CardId, LanguagePair};
use crate::deck::import::{self, RawCard};
use crate::store::schema::CardExport;

pub const DEFAULT_CATEGORY: &str = "General";
pub const NUMBERS_CATEGORY: &str = "Numbers";
pub const UNDO_WINDOW: Duration = Duration::from_secs(5);

const NUMBERS_DECK: &str = include_str!("../../assets/decks/numbers.json");

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub added: usize,
    pub merged: usize,
}

impl fmt::Display for MergeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Processed: {} new, {} category updates.",
            self.added, self.merged
        )
    }
}

#[derive(Clone, Debug)]
struct DeletedCard {
    card: Card,
    deleted_at: Instant,
}

/// The master deck. Every mutation bumps `revision` so persistence can tell
/// when a snapshot is stale.
#[derive(Clone, Debug, Default)]
pub struct CardStore {
    cards: Vec<Card>,
    langs: LanguagePair,
    last_deleted: Option<DeletedCard>,
    revision: u64,
}

impl CardStore {
    pub fn new(langs: LanguagePair) -> Self {
        Self {
            langs,
            ..Self::default()
        }
    }

    pub fn from_cards(cards: Vec<Card>, langs: LanguagePair) -> Self {
        let mut cards = cards;
        for card in &mut cards {
            card.migrate_legacy(&langs);
        }
        Self {
            cards,
            langs,
            last_deleted: None,
            revision: 0,
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn langs(&self) -> &LanguagePair {
        &self.langs
    }

    pub fn set_langs(&mut self, langs: LanguagePair) {
        self.langs = langs;
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    pub fn increment_study_count(&mut self, id: CardId) -> bool {
        let Some(card) = self.cards.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        card.study_count = card.study_count.saturating_add(1);
        self.touch();
        true
    }

    /// Bulk reset: the only operation allowed to lower a study count.
    pub fn reset_all_progress(&mut self) {
        for card in &mut self.cards {
            card.study_count = 0;
        }
        self.touch();
    }

    /// Remove a card, keeping it in a single-slot undo buffer.
    pub fn delete(&mut self, id: CardId, now: Instant) -> bool {
        let Some(idx) = self.cards.iter().position(|c| c.id == id) else {
            return false;
        };
        let card = self.cards.remove(idx);
        self.last_deleted = Some(DeletedCard {
            card,
            deleted_at: now,
        });
        self.touch();
        true
    }

    pub fn undo_delete(&mut self, now: Instant) -> bool {
        self.expire_undo(now);
        match self.last_deleted.take() {
            Some(deleted) => {
                self.cards.push(deleted.card);
                self.touch();
                true
            }
            None => false,
        }
    }

    pub fn pending_undo(&self, now: Instant) -> Option<&Card> {
        self.last_deleted
            .as_ref()
            .filter(|d| now.duration_since(d.deleted_at) < UNDO_WINDOW)
            .map(|d| &d.card)
    }

    pub fn expire_undo(&mut self, now: Instant) {
        if self
            .last_deleted
            .as_ref()
            .is_some_and(|d| now.duration_since(d.deleted_at) >= UNDO_WINDOW)
        {
            self.last_deleted = None;
        }
    }

    pub fn available_categories(&self) -> Vec<String> {
        let cats: BTreeSet<&String> = self.cards.iter().flat_map(|c| &c.categories).collect();
        cats.into_iter().cloned().collect()
    }

    fn max_id(&self) -> CardId {
        self.cards
            .iter()
            .chain(self.last_deleted.iter().map(|d| &d.card))
            .map(|c| c.id)
            .max()
            .unwrap_or(0)
    }

    /// Merge parsed cards: content-equal cards gain the new categories,
    /// everything else becomes a new card with a fresh id.
    pub fn merge_raw_cards(&mut self, raw: &[RawCard]) -> MergeReport {
        let mut report = MergeReport::default();
        let base_id = self.max_id();

        for rc in raw {
            let existing = self
                .cards
                .iter_mut()
                .find(|c| c.same_content(&self.langs, &rc.front, &rc.back));
            match existing {
                Some(card) => {
                    let mut changed = false;
                    for cat in &rc.categories {
                        changed |= card.categories.insert(cat.clone());
                    }
                    if changed {
                        report.merged += 1;
                    }
                }
                None => {
                    let id = base_id + report.added as CardId + 1;
                    let mut card = Card::new(id, &self.langs, &rc.front, &rc.back, "");
                    card.categories = rc.categories.iter().cloned().collect();
                    if card.categories.is_empty() {
                        card.categories.insert(DEFAULT_CATEGORY.to_string());
                    }
                    self.cards.push(card);
                    report.added += 1;
                }
            }
        }

        if report.added > 0 || report.merged > 0 {
            self.touch();
        }
        report
    }

    /// Merge the bundled numbers deck.
    pub fn seed_defaults(&mut self) -> MergeReport {
        match import::parse_input(NUMBERS_DECK) {
            Ok(mut raw) => {
                for rc in &mut raw {
                    rc.categories = vec![NUMBERS_CATEGORY.to_string()];
                }
                self.merge_raw_cards(&raw)
            }
            Err(e) => {
                log::error!("bundled numbers deck is unreadable: {e}");
                MergeReport::default()
            }
        }
    }

    pub fn export_cards(&self) -> Vec<CardExport> {
        self.cards
            .iter()
            .map(|c| CardExport {
                front: c.front(&self.langs).to_string(),
                back: c.back(&self.langs).to_string(),
                categories: c.categories.iter().cloned().collect(),
                study_count: c.study_count,
            })
            .collect()
    }
}
