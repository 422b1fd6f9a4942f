use std::path::MAIN_SEPARATOR;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Separates several paths in one import field.
pub const PATH_LIST_SEPARATOR: char = ';';

const SCAN_LIMIT: usize = 1000;
const CANDIDATE_LIMIT: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputResult {
    Continue,
    Submit,
    Cancel,
}

/// Tab-completion state for file path fields.
#[derive(Debug, Default)]
struct PathCompletion {
    candidates: Vec<String>,
    index: Option<usize>,
    /// Everything before the path segment being completed.
    head: String,
    failed: bool,
}

impl PathCompletion {
    fn reset(&mut self) {
        self.candidates.clear();
        self.index = None;
        self.head.clear();
        self.failed = false;
    }
}

/// Single-line text field used for answers, pasted cards and file paths.
#[derive(Debug, Default)]
pub struct LineInput {
    text: String,
    /// Char index; 0 is before the first char.
    cursor: usize,
    completion: Option<PathCompletion>,
}

impl LineInput {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            cursor: text.chars().count(),
            completion: None,
        }
    }

    /// A field whose last `;`-separated segment completes against the
    /// filesystem on Tab.
    pub fn for_paths(text: &str) -> Self {
        Self {
            completion: Some(PathCompletion::default()),
            ..Self::new(text)
        }
    }

    pub fn value(&self) -> &str {
        &self.text
    }

    pub fn set_value(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.len();
        self.reset_completion();
    }

    pub fn clear(&mut self) {
        self.set_value("");
    }

    pub fn completion_failed(&self) -> bool {
        self.completion.as_ref().is_some_and(|c| c.failed)
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Text before the cursor, the char under it, and the rest.
    pub fn render_parts(&self) -> (&str, Option<char>, &str) {
        let at = self.byte_at(self.cursor);
        match self.text[at..].chars().next() {
            Some(ch) => (&self.text[..at], Some(ch), &self.text[at + ch.len_utf8()..]),
            None => (&self.text, None, ""),
        }
    }

    pub fn handle(&mut self, key: KeyEvent) -> InputResult {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if !matches!(key.code, KeyCode::Tab | KeyCode::BackTab) {
            self.reset_completion();
        }
        match key.code {
            KeyCode::Esc => return InputResult::Cancel,
            KeyCode::Enter => return InputResult::Submit,
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.len(),
            KeyCode::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                self.remove_at(self.cursor);
            }
            KeyCode::Delete => self.remove_at(self.cursor),
            KeyCode::Tab => self.complete(true),
            KeyCode::BackTab => self.complete(false),
            KeyCode::Char('a') if ctrl => self.cursor = 0,
            KeyCode::Char('e') if ctrl => self.cursor = self.len(),
            KeyCode::Char('u') if ctrl => {
                self.text.clear();
                self.cursor = 0;
            }
            KeyCode::Char('w') if ctrl => self.delete_word_back(),
            KeyCode::Char(ch) if !ctrl => {
                let at = self.byte_at(self.cursor);
                self.text.insert(at, ch);
                self.cursor += 1;
            }
            _ => {}
        }
        InputResult::Continue
    }

    fn byte_at(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map_or(self.text.len(), |(b, _)| b)
    }

    fn remove_at(&mut self, char_idx: usize) {
        let at = self.byte_at(char_idx);
        if let Some(ch) = self.text[at..].chars().next() {
            self.text.replace_range(at..at + ch.len_utf8(), "");
        }
    }

    fn delete_word_back(&mut self) {
        let chars: Vec<char> = self.text.chars().collect();
        let mut pos = self.cursor;
        while pos > 0 && chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
        while pos > 0 && !chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
        let (start, end) = (self.byte_at(pos), self.byte_at(self.cursor));
        self.text.replace_range(start..end, "");
        self.cursor = pos;
    }

    fn reset_completion(&mut self) {
        if let Some(c) = self.completion.as_mut() {
            c.reset();
        }
    }

    fn complete(&mut self, forward: bool) {
        if self.cursor < self.len() {
            return;
        }
        let Some(state) = self.completion.as_mut() else {
            return;
        };

        let next = match state.index {
            None => {
                let (head, segment) = match self.text.rfind(PATH_LIST_SEPARATOR) {
                    Some(pos) => self.text.split_at(pos + 1),
                    None => ("", self.text.as_str()),
                };
                state.head = head.to_string();
                match scan_dir(segment) {
                    Some(candidates) => state.candidates = candidates,
                    None => {
                        state.failed = true;
                        return;
                    }
                }
                if state.candidates.is_empty() {
                    return;
                }
                0
            }
            Some(idx) => {
                let count = state.candidates.len();
                if forward { (idx + 1) % count } else { (idx + count - 1) % count }
            }
        };
        state.index = Some(next);
        self.text = format!("{}{}", state.head, state.candidates[next]);
        self.cursor = self.len();
    }
}

/// Candidates for a partially typed path, directories first. `None` when the
/// directory cannot be read.
fn scan_dir(segment: &str) -> Option<Vec<String>> {
    let trimmed = segment.trim_start();
    let lead = &segment[..segment.len() - trimmed.len()];
    let (dir, partial) = match trimmed.rfind(['/', '\\']) {
        Some(pos) => trimmed.split_at(pos + 1),
        None => ("", trimmed),
    };

    let lookup = match dir.strip_prefix('~') {
        Some(rest) => dirs::home_dir()
            .map(|home| format!("{}{rest}", home.display()))
            .unwrap_or_else(|| dir.to_string()),
        None if dir.is_empty() => ".".to_string(),
        None => dir.to_string(),
    };

    let entries = std::fs::read_dir(&lookup).ok()?.map(|entry| {
        entry.map(|e| {
            let is_dir = e.file_type().map(|t| t.is_dir()).unwrap_or(false);
            (e.file_name().to_string_lossy().to_string(), is_dir)
        })
    });
    let found = rank_candidates(entries, partial)?;
    Some(
        found
            .into_iter()
            .map(|(name, is_dir)| {
                let suffix = if is_dir { MAIN_SEPARATOR.to_string() } else { String::new() };
                format!("{lead}{dir}{name}{suffix}")
            })
            .collect(),
    )
}

fn rank_candidates(
    entries: impl Iterator<Item = std::io::Result<(String, bool)>>,
    partial: &str,
) -> Option<Vec<(String, bool)>> {
    let show_hidden = partial.starts_with('.');
    let mut found = Vec::new();
    for entry in entries.take(SCAN_LIMIT) {
        let (name, is_dir) = entry.ok()?;
        if (show_hidden || !name.starts_with('.')) && name.starts_with(partial) {
            found.push((name, is_dir));
        }
    }
    found.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    found.truncate(CANDIDATE_LIMIT);
    Some(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    fn type_str(input: &mut LineInput, s: &str) {
        for ch in s.chars() {
            input.handle(key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn typing_accented_text_keeps_cursor_in_chars() {
        let mut input = LineInput::new("");
        type_str(&mut input, "niño");
        assert_eq!(input.value(), "niño");
        input.handle(key(KeyCode::Left));
        input.handle(key(KeyCode::Backspace));
        assert_eq!(input.value(), "nio");
        assert_eq!(input.render_parts(), ("ni", Some('o'), ""));
    }

    #[test]
    fn delete_and_backspace_at_edges_are_safe() {
        let mut input = LineInput::new("ab");
        input.handle(key(KeyCode::Delete));
        assert_eq!(input.value(), "ab");
        input.handle(key(KeyCode::Home));
        input.handle(key(KeyCode::Backspace));
        input.handle(key(KeyCode::Delete));
        assert_eq!(input.value(), "b");
        assert_eq!(input.render_parts(), ("", Some('b'), ""));
    }

    #[test]
    fn control_keys_edit_the_line() {
        let mut input = LineInput::new("buenos días  ");
        input.handle(ctrl('w'));
        assert_eq!(input.value(), "buenos ");
        input.handle(ctrl('a'));
        assert_eq!(input.render_parts().0, "");
        input.handle(ctrl('u'));
        assert_eq!(input.value(), "");
    }

    #[test]
    fn submit_and_cancel() {
        let mut input = LineInput::new("gato");
        assert_eq!(input.handle(key(KeyCode::Enter)), InputResult::Submit);
        assert_eq!(input.handle(key(KeyCode::Esc)), InputResult::Cancel);
        assert_eq!(input.value(), "gato");
    }

    #[test]
    fn plain_fields_ignore_tab() {
        let mut input = LineInput::new("/");
        input.handle(key(KeyCode::Tab));
        assert_eq!(input.value(), "/");
        assert!(!input.completion_failed());
    }

    #[test]
    fn path_completion_cycles_dirs_first() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("animals.txt"), "").unwrap();
        std::fs::write(dir.path().join("colors.txt"), "").unwrap();
        std::fs::create_dir(dir.path().join("verbs")).unwrap();
        let mut input = LineInput::for_paths(&format!("{}/", dir.path().display()));

        input.handle(key(KeyCode::Tab));
        assert!(input.value().ends_with(&format!("verbs{MAIN_SEPARATOR}")));
        input.handle(key(KeyCode::Tab));
        assert!(input.value().ends_with("animals.txt"));
        input.handle(key(KeyCode::BackTab));
        assert!(input.value().ends_with(&format!("verbs{MAIN_SEPARATOR}")));
    }

    #[test]
    fn completion_applies_to_last_path_in_list() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("food.txt"), "").unwrap();
        let first = "first.txt;";
        let mut input = LineInput::for_paths(&format!("{first}{}/fo", dir.path().display()));
        input.handle(key(KeyCode::Tab));
        assert!(input.value().starts_with(first));
        assert!(input.value().ends_with("food.txt"));
    }

    #[test]
    fn unreadable_dir_flags_failure_until_next_key() {
        let mut input = LineInput::for_paths("/nonexistent_cardorbit_dir/");
        input.handle(key(KeyCode::Tab));
        assert!(input.completion_failed());
        input.handle(key(KeyCode::Char('x')));
        assert!(!input.completion_failed());
    }

    #[test]
    fn hidden_entries_need_a_dot_prefix() {
        let entries = || {
            vec![
                Ok((".secret".to_string(), false)),
                Ok(("public".to_string(), false)),
            ]
            .into_iter()
        };
        let found = rank_candidates(entries(), "").unwrap();
        assert_eq!(found, vec![("public".to_string(), false)]);
        let found = rank_candidates(entries(), ".s").unwrap();
        assert_eq!(found, vec![(".secret".to_string(), false)]);
    }

    #[test]
    fn read_error_aborts_ranking() {
        let entries = vec![
            Ok(("a".to_string(), false)),
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied")),
        ];
        assert!(rank_candidates(entries.into_iter(), "").is_none());
    }

    #[test]
    fn candidates_are_capped() {
        let entries = (0..300).map(|i| Ok((format!("deck_{i:03}"), false)));
        assert_eq!(rank_candidates(entries, "deck").unwrap().len(), CANDIDATE_LIMIT);
    }
}
