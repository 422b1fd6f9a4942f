use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent};
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use ratatui::layout::Rect;

use cardorbit::config::{BackendKind, Config};
use cardorbit::deck::import::{self, ImportError};
use cardorbit::deck::store::MergeReport;
use cardorbit::deck::{CardId, CardStore};
use cardorbit::engine::filter::CategoryFilter;
use cardorbit::engine::narration::{CommandSpeaker, Narrator};
use cardorbit::engine::physics::Bounds;
use cardorbit::session::{SessionEvent, StudyMode, StudySession};
use cardorbit::store::backend::{self, DeckBackend, SaveDebouncer};
use cardorbit::store::json_store::JsonStore;
use cardorbit::store::schema::BackendSettings;

use crate::ui::components::menu::{Menu, MenuAction};
use crate::ui::components::orbit_board;
use crate::ui::layout::{AppLayout, orbit_bounds};
use crate::ui::line_input::{InputResult, LineInput, PATH_LIST_SEPARATOR};
use crate::ui::theme::Theme;

/// One physics step per ~60 Hz frame.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);
/// Catch-up cap after a stall, so cards never jump across the screen.
const MAX_FRAMES_PER_UPDATE: u32 = 4;

pub const SETTINGS_COUNT: usize = 11;

const LANGUAGES: [&str; 12] = [
    "en_US", "es_ES", "fr_FR", "de_DE", "it_IT", "pt_BR", "nl_NL", "pl_PL", "vi_VN", "ja_JP",
    "ko_KR", "zh_CN",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    Study,
    Deck,
    Import,
    Settings,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuFocus {
    Modes,
    Categories,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportField {
    Text,
    Files,
}

pub struct App {
    pub screen: AppScreen,
    pub menu: Menu<'static>,
    pub menu_focus: MenuFocus,
    pub theme: &'static Theme,
    pub config: Config,
    pub store: CardStore,
    pub filter: CategoryFilter,
    pub category_selected: usize,
    pub session: Option<StudySession>,
    pub narrator: Narrator,
    pub viewport: Rect,
    pub hovered: Option<CardId>,
    pub focused: Option<CardId>,
    pub answer_input: LineInput,
    pub import_text: LineInput,
    pub import_files: LineInput,
    pub import_field: ImportField,
    pub import_message: Option<String>,
    pub deck_selected: usize,
    pub confirm_reset: bool,
    pub settings_selected: usize,
    pub status: Option<String>,
    pub should_quit: bool,
    backend: Option<Box<dyn DeckBackend>>,
    exports: Option<JsonStore>,
    remote_settings: BackendSettings,
    deck_writable: bool,
    deck_saves: SaveDebouncer,
    settings_saves: SaveDebouncer,
    observed_revision: u64,
    last_update: Instant,
    frame_debt: Duration,
    rng: SmallRng,
}

impl App {
    pub fn new(mut config: Config) -> Self {
        let backend = match backend::open_backend(&config) {
            Ok(b) => Some(b),
            Err(e) => {
                log::error!("could not open the {:?} backend: {e:#}", config.backend);
                None
            }
        };
        let exports = JsonStore::new()
            .inspect_err(|e| log::warn!("exports disabled: {e:#}"))
            .ok();

        let mut remote_settings = BackendSettings::default();
        if let Some(b) = &backend {
            match b.load_settings() {
                Ok(settings) => {
                    config.apply_backend_settings(&settings);
                    remote_settings = settings;
                }
                Err(e) => log::warn!("loading settings from {} failed: {e:#}", b.name()),
            }
        }

        let mut store = CardStore::new(config.langs());
        let mut deck_writable = true;
        let mut seeded = false;
        match backend.as_ref().map(|b| b.load_deck()) {
            Some(Ok(Some(cards))) => {
                log::info!("loaded {} cards", cards.len());
                store = CardStore::from_cards(cards, config.langs());
            }
            Some(Ok(None)) | None => {
                let report = store.seed_defaults();
                log::info!("seeded the default deck. {report}");
                seeded = true;
            }
            Some(Err(e)) => {
                // Never overwrite a deck we failed to read.
                log::error!("loading the deck failed, changes will not be saved: {e:#}");
                deck_writable = false;
                store.seed_defaults();
            }
        }

        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));

        let mut narrator = Narrator::new(
            Box::new(CommandSpeaker::new(config.tts_command.clone())),
            config.langs(),
        )
        .with_voices(config.tts_voices.clone());
        narrator.set_enabled(config.tts_enabled);

        let now = Instant::now();
        let mut deck_saves = SaveDebouncer::default();
        if seeded {
            deck_saves.mark(now);
        }

        Self {
            screen: AppScreen::Menu,
            menu: Menu::new(theme),
            menu_focus: MenuFocus::Modes,
            theme,
            observed_revision: store.revision(),
            store,
            filter: CategoryFilter::default(),
            category_selected: 0,
            session: None,
            narrator,
            viewport: Rect::default(),
            hovered: None,
            focused: None,
            answer_input: LineInput::new(""),
            import_text: LineInput::new(""),
            import_files: LineInput::for_paths(""),
            import_field: ImportField::Text,
            import_message: None,
            deck_selected: 0,
            confirm_reset: false,
            settings_selected: 0,
            status: None,
            should_quit: false,
            config,
            backend,
            exports,
            remote_settings,
            deck_writable,
            deck_saves,
            settings_saves: SaveDebouncer::default(),
            last_update: now,
            frame_debt: Duration::ZERO,
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn set_theme(&mut self, name: &str) -> bool {
        let Some(theme) = Theme::load(name) else {
            return false;
        };
        let theme: &'static Theme = Box::leak(Box::new(theme));
        self.theme = theme;
        self.menu.theme = theme;
        self.config.theme = name.to_string();
        true
    }

    // --- screen flow ---

    pub fn go_to_menu(&mut self) {
        self.stop_session();
        self.confirm_reset = false;
        self.screen = AppScreen::Menu;
    }

    pub fn go_to_deck(&mut self) {
        self.deck_selected = self.deck_selected.min(self.store.len().saturating_sub(1));
        self.confirm_reset = false;
        self.status = None;
        self.screen = AppScreen::Deck;
    }

    pub fn go_to_import(&mut self) {
        self.import_field = ImportField::Text;
        self.import_message = None;
        self.screen = AppScreen::Import;
    }

    pub fn go_to_settings(&mut self) {
        self.settings_selected = 0;
        self.screen = AppScreen::Settings;
    }

    pub fn leave_settings(&mut self) {
        if let Err(e) = self.config.save() {
            log::error!("saving config failed: {e:#}");
        }
        self.settings_saves.mark(Instant::now());
        self.go_to_menu();
    }

    pub fn run_menu_action(&mut self, action: MenuAction) {
        match action {
            MenuAction::Learn => self.start_session(StudyMode::Learn),
            MenuAction::Blitz => self.start_session(StudyMode::Blitz),
            MenuAction::Challenge => self.start_session(StudyMode::Challenge),
            MenuAction::Deck => self.go_to_deck(),
            MenuAction::Import => self.go_to_import(),
            MenuAction::Settings => self.go_to_settings(),
        }
    }

    // --- categories ---

    pub fn categories(&self) -> Vec<String> {
        self.store.available_categories()
    }

    pub fn category_next(&mut self) {
        let count = self.categories().len();
        if count > 0 {
            self.category_selected = (self.category_selected + 1) % count;
        }
    }

    pub fn category_prev(&mut self) {
        let count = self.categories().len();
        if count > 0 {
            self.category_selected = (self.category_selected + count - 1) % count;
        }
    }

    pub fn toggle_selected_category(&mut self) {
        if let Some(category) = self.categories().get(self.category_selected) {
            self.filter.toggle(category);
        }
    }

    pub fn toggle_menu_focus(&mut self) {
        self.menu_focus = match self.menu_focus {
            MenuFocus::Modes => MenuFocus::Categories,
            MenuFocus::Categories => MenuFocus::Modes,
        };
        self.menu.focused = self.menu_focus == MenuFocus::Modes;
    }

    /// Cards the current filter lets through.
    pub fn filtered_count(&self) -> usize {
        self.filter.filter_cards(self.store.cards()).len()
    }

    // --- study sessions ---

    pub fn study_area(&self) -> Rect {
        AppLayout::new(self.viewport).main
    }

    fn study_bounds(&self) -> Bounds {
        orbit_bounds(
            self.study_area(),
            f64::from(self.config.card_width),
            f64::from(self.config.card_height),
        )
    }

    pub fn set_viewport(&mut self, area: Rect) {
        if area == self.viewport {
            return;
        }
        self.viewport = area;
        let bounds = self.study_bounds();
        if let Some(session) = self.session.as_mut() {
            session.resize(bounds);
        }
    }

    pub fn start_session(&mut self, mode: StudyMode) {
        self.stop_session();
        let rng = SmallRng::seed_from_u64(self.rng.next_u64());
        let session = StudySession::start(
            mode,
            &self.store,
            &self.filter,
            self.config.session_settings(),
            self.study_bounds(),
            rng,
        );
        log::info!(
            "starting {} with {} cards ({})",
            mode.label(),
            session.remaining(),
            self.filter.label()
        );
        self.session = Some(session);
        self.frame_debt = Duration::ZERO;
        self.status = None;
        self.screen = AppScreen::Study;
    }

    pub fn restart_session(&mut self) {
        if let Some(mode) = self.session.as_ref().map(StudySession::mode) {
            self.start_session(mode);
        }
    }

    fn stop_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.stop();
        }
        self.narrator.cancel();
        self.hovered = None;
        self.focused = None;
        self.answer_input.clear();
    }

    pub fn prompt_open(&self) -> bool {
        self.session
            .as_ref()
            .and_then(StudySession::challenge)
            .is_some_and(|c| c.active_card().is_some())
    }

    pub fn study_primary(&mut self, target: Option<CardId>) {
        if let Some(session) = self.session.as_mut() {
            session.primary(&mut self.store, target);
        }
        self.sync_answer_input();
    }

    pub fn study_secondary(&mut self, target: Option<CardId>) {
        if let Some(session) = self.session.as_mut() {
            session.secondary(target);
        }
    }

    pub fn with_session(&mut self, f: impl FnOnce(&mut StudySession)) {
        if let Some(session) = self.session.as_mut() {
            f(session);
        }
    }

    pub fn toggle_narration(&mut self) {
        self.config.tts_enabled = !self.config.tts_enabled;
        self.narrator.set_enabled(self.config.tts_enabled);
        let enabled = self.config.tts_enabled;
        self.with_session(|s| s.set_narration(enabled));
        self.settings_saves.mark(Instant::now());
    }

    pub fn card_at(&self, column: u16, row: u16) -> Option<CardId> {
        let session = self.session.as_ref()?;
        orbit_board::card_at(session.queue(), self.study_area(), column, row)
    }

    /// Pointer moved. Leaving a card counts as a pointer-leave on it.
    pub fn hover(&mut self, column: u16, row: u16) {
        let under = self.card_at(column, row);
        if under == self.hovered {
            return;
        }
        if let Some(prev) = self.hovered.take() {
            self.with_session(|s| s.pointer_leave(prev));
        }
        self.hovered = under;
    }

    /// Keyboard stand-in for the pointer: move focus across the active cards.
    /// Moving off a card acts like the pointer leaving it.
    pub fn cycle_focus(&mut self, forward: bool) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let ids: Vec<CardId> = session.queue().active().iter().map(|qc| qc.id()).collect();
        if ids.is_empty() {
            self.focused = None;
            return;
        }
        let current = self.focused.and_then(|id| ids.iter().position(|&i| i == id));
        let next = match current {
            Some(idx) if forward => (idx + 1) % ids.len(),
            Some(idx) => (idx + ids.len() - 1) % ids.len(),
            None => 0,
        };
        if let Some(prev) = self.focused.replace(ids[next]) {
            if prev != ids[next] {
                self.with_session(|s| s.pointer_leave(prev));
            }
        }
    }

    /// Focus is dropped once its card leaves the active set.
    fn validate_focus(&mut self) {
        let active = |id: CardId, session: &StudySession| session.queue().is_active(id);
        if let Some(session) = self.session.as_ref() {
            if self.focused.is_some_and(|id| !active(id, session)) {
                self.focused = None;
            }
            if self.hovered.is_some_and(|id| !active(id, session)) {
                self.hovered = None;
            }
        }
    }

    /// Keys typed into the open challenge prompt.
    pub fn handle_answer_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab => self.with_session(StudySession::skip),
            KeyCode::Esc => self.with_session(StudySession::dismiss),
            _ => match self.answer_input.handle(key) {
                InputResult::Submit => self.with_session(StudySession::submit),
                InputResult::Cancel => self.with_session(StudySession::dismiss),
                InputResult::Continue => {
                    let answer = self.answer_input.value().to_string();
                    self.with_session(|s| s.set_answer(&answer));
                }
            },
        }
        self.sync_answer_input();
    }

    /// The machine owns the answer; the input only mirrors it.
    fn sync_answer_input(&mut self) {
        let Some(challenge) = self.session.as_ref().and_then(StudySession::challenge) else {
            return;
        };
        let answer = if challenge.active_card().is_some() {
            challenge.answer()
        } else {
            ""
        };
        if answer != self.answer_input.value() {
            self.answer_input.set_value(answer);
        }
    }

    // --- per-tick work ---

    pub fn update(&mut self, now: Instant) {
        let dt = now.saturating_duration_since(self.last_update);
        self.last_update = now;

        if let Some(session) = self.session.as_mut() {
            session.advance(dt, &mut self.store);

            if let Some(token) = session.frame_token() {
                self.frame_debt += dt;
                let mut steps = 0;
                while self.frame_debt >= FRAME_INTERVAL {
                    self.frame_debt -= FRAME_INTERVAL;
                    if steps < MAX_FRAMES_PER_UPDATE {
                        session.frame(token);
                        steps += 1;
                    }
                }
            } else {
                self.frame_debt = Duration::ZERO;
            }

            for event in session.drain_events() {
                match event {
                    SessionEvent::Narrate { text, is_target } => {
                        self.narrator.narrate(&text, is_target)
                    }
                    SessionEvent::Finished => {
                        log::info!("{} session finished", session.mode().label())
                    }
                }
            }
        }

        self.validate_focus();
        self.sync_answer_input();
        self.store.expire_undo(now);
        self.track_deck_changes(now);
        if self.deck_saves.take_due(now) {
            self.save_deck();
        }
        if self.settings_saves.take_due(now) {
            self.save_settings();
        }
    }

    fn track_deck_changes(&mut self, now: Instant) {
        let revision = self.store.revision();
        if revision != self.observed_revision {
            self.observed_revision = revision;
            self.deck_saves.mark(now);
        }
    }

    /// Write whatever is still waiting on the debouncers.
    pub fn flush(&mut self) {
        self.track_deck_changes(Instant::now());
        if self.deck_saves.take_pending() {
            self.save_deck();
        }
        if self.settings_saves.take_pending() {
            self.save_settings();
        }
    }

    fn save_deck(&self) {
        if !self.deck_writable {
            log::warn!("not saving: the stored deck could not be read at startup");
            return;
        }
        let Some(backend) = &self.backend else {
            return;
        };
        match backend.save_deck(self.store.cards()) {
            Ok(()) => log::info!("saved {} cards to the {} backend", self.store.len(), backend.name()),
            Err(e) => log::error!("saving the deck to {} failed: {e:#}", backend.name()),
        }
    }

    fn save_settings(&mut self) {
        let Some(backend) = &self.backend else {
            return;
        };
        let blob = self.config.backend_settings(&self.remote_settings);
        match backend.save_settings(&blob) {
            Ok(()) => self.remote_settings = blob,
            Err(e) => log::error!("saving settings to {} failed: {e:#}", backend.name()),
        }
    }

    // --- deck management ---

    pub fn deck_next(&mut self) {
        if !self.store.is_empty() {
            self.deck_selected = (self.deck_selected + 1).min(self.store.len() - 1);
        }
    }

    pub fn deck_prev(&mut self) {
        self.deck_selected = self.deck_selected.saturating_sub(1);
    }

    pub fn delete_selected(&mut self) {
        let Some(card) = self.store.cards().get(self.deck_selected) else {
            return;
        };
        let (id, front) = (card.id, card.front(self.store.langs()).to_string());
        if self.store.delete(id, Instant::now()) {
            self.status = Some(format!("Deleted \"{front}\". Press u to undo."));
            self.deck_selected = self.deck_selected.min(self.store.len().saturating_sub(1));
        }
    }

    pub fn undo_delete(&mut self) {
        self.status = if self.store.undo_delete(Instant::now()) {
            Some("Card restored.".to_string())
        } else {
            Some("Nothing to undo.".to_string())
        };
    }

    pub fn reset_progress(&mut self) {
        self.store.reset_all_progress();
        self.confirm_reset = false;
        self.status = Some("All study counts reset.".to_string());
    }

    pub fn export(&mut self) {
        let Some(exports) = &self.exports else {
            self.status = Some("Export unavailable: no data directory.".to_string());
            return;
        };
        let data = exports.export_all(&self.config, self.store.export_cards());
        self.status = Some(match exports.write_export(&data) {
            Ok(path) => {
                log::info!("exported {} cards to {}", data.cards.len(), path.display());
                format!("Exported to {}", path.display())
            }
            Err(e) => {
                log::error!("export failed: {e:#}");
                format!("Export failed: {e}")
            }
        });
    }

    // --- import ---

    pub fn import_field_toggle(&mut self) {
        self.import_field = match self.import_field {
            ImportField::Text => ImportField::Files,
            ImportField::Files => ImportField::Text,
        };
    }

    pub fn handle_import_key(&mut self, key: KeyEvent) {
        let input = match self.import_field {
            ImportField::Text => &mut self.import_text,
            ImportField::Files => &mut self.import_files,
        };
        match input.handle(key) {
            InputResult::Submit => self.submit_import(),
            InputResult::Cancel => self.go_to_menu(),
            InputResult::Continue => {}
        }
    }

    fn submit_import(&mut self) {
        let result = match self.import_field {
            ImportField::Text => import::parse_input(self.import_text.value()),
            ImportField::Files => import::read_files(&split_paths(self.import_files.value())),
        };
        match self.merge_import(result) {
            Ok(report) => {
                self.import_message = Some(report.to_string());
                match self.import_field {
                    ImportField::Text => self.import_text.clear(),
                    ImportField::Files => self.import_files.clear(),
                }
            }
            Err(e) => self.import_message = Some(e.to_string()),
        }
    }

    pub fn import_paths(&mut self, paths: &[PathBuf]) -> Result<MergeReport, ImportError> {
        self.merge_import(import::read_files(paths))
    }

    fn merge_import(
        &mut self,
        parsed: Result<Vec<import::RawCard>, ImportError>,
    ) -> Result<MergeReport, ImportError> {
        let raw = parsed?;
        let report = self.store.merge_raw_cards(&raw);
        log::info!("import: {report}");
        Ok(report)
    }

    // --- settings ---

    pub fn settings_rows(&self) -> Vec<(&'static str, String)> {
        let on_off = |b: bool| if b { "on" } else { "off" }.to_string();
        let backend = match self.config.backend {
            BackendKind::Local => "local".to_string(),
            BackendKind::Http => format!("http ({})", self.config.api_base),
        };
        vec![
            ("Theme", self.config.theme.clone()),
            ("Orbit size", self.config.max_orbit_size.to_string()),
            ("Card speed", format!("{:.2}", self.config.card_speed)),
            ("Fade time", format!("{} ms", self.config.fade_time_ms)),
            ("Learn autoplay delay", format!("{} s", self.config.learn_delay_secs)),
            ("Reversed", on_off(self.config.is_reversed)),
            ("Front language", self.config.front_lang.clone()),
            ("Back language", self.config.back_lang.clone()),
            ("Narration", on_off(self.config.tts_enabled)),
            ("Auto next challenge card", on_off(self.config.auto_random_next)),
            ("Backend (restart to apply)", backend),
        ]
    }

    pub fn settings_cycle_forward(&mut self) {
        self.settings_cycle(true);
    }

    pub fn settings_cycle_backward(&mut self) {
        self.settings_cycle(false);
    }

    fn settings_cycle(&mut self, forward: bool) {
        let step = |x: i64| if forward { x } else { -x };
        let config = &mut self.config;
        match self.settings_selected {
            0 => {
                let themes = Theme::available_themes();
                let idx = themes.iter().position(|t| *t == config.theme);
                if let Some(name) = cycle(&themes, idx, forward).cloned() {
                    self.set_theme(&name);
                }
            }
            1 => config.max_orbit_size = offset(config.max_orbit_size as i64, step(1)) as usize,
            2 => config.card_speed += step(1) as f64 * 0.25,
            3 => config.fade_time_ms = offset(config.fade_time_ms as i64, step(250)) as u64,
            4 => config.learn_delay_secs = offset(config.learn_delay_secs as i64, step(1)) as u64,
            5 => config.is_reversed = !config.is_reversed,
            6 | 7 => {
                let lang = if self.settings_selected == 6 {
                    &mut config.front_lang
                } else {
                    &mut config.back_lang
                };
                let idx = LANGUAGES.iter().position(|l| *l == lang.as_str());
                if let Some(next) = cycle(&LANGUAGES, idx, forward) {
                    *lang = next.to_string();
                }
                self.store.set_langs(config.langs());
                self.narrator.set_langs(config.langs());
            }
            8 => {
                config.tts_enabled = !config.tts_enabled;
                self.narrator.set_enabled(config.tts_enabled);
            }
            9 => config.auto_random_next = !config.auto_random_next,
            10 => {
                config.backend = match config.backend {
                    BackendKind::Local => BackendKind::Http,
                    BackendKind::Http => BackendKind::Local,
                }
            }
            _ => {}
        }
        self.config.validate();
        self.settings_saves.mark(Instant::now());
    }
}

fn offset(value: i64, delta: i64) -> i64 {
    (value + delta).max(0)
}

/// Next (or previous) entry after `current`, wrapping; the first entry when
/// nothing is current.
fn cycle<T>(items: &[T], current: Option<usize>, forward: bool) -> Option<&T> {
    if items.is_empty() {
        return None;
    }
    let len = items.len();
    let idx = match current {
        Some(i) if forward => (i + 1) % len,
        Some(i) => (i + len - 1) % len,
        None => 0,
    };
    items.get(idx)
}

fn split_paths(value: &str) -> Vec<PathBuf> {
    value
        .split(PATH_LIST_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_wraps_and_starts_at_first() {
        let items = ["a", "b", "c"];
        assert_eq!(cycle(&items, Some(2), true), Some(&"a"));
        assert_eq!(cycle(&items, Some(0), false), Some(&"c"));
        assert_eq!(cycle(&items, None, false), Some(&"a"));
        assert_eq!(cycle::<&str>(&[], None, true), None);
    }

    #[test]
    fn path_lists_split_on_separator() {
        let paths = split_paths(" a.txt ; ;dir/b.csv;");
        assert_eq!(paths, vec![PathBuf::from("a.txt"), PathBuf::from("dir/b.csv")]);
    }

    #[test]
    fn offsets_never_go_negative() {
        assert_eq!(offset(0, -250), 0);
        assert_eq!(offset(3000, 250), 3250);
    }
}
