use icu_normalizer::ComposingNormalizerBorrowed;

/// Punctuation ignored when comparing answers.
const IGNORED: &[char] = &['.', ',', '!', '?', ';', ':', '\'', '"', '¿', '¡'];

/// Canonical form for answer comparison and duplicate detection.
///
/// Case, punctuation and runs of whitespace are ignored; accents are not.
/// Input is NFC-composed first so that precomposed and combining spellings of
/// the same accented letter compare equal.
pub fn normalize_text(text: &str) -> String {
    let composed = ComposingNormalizerBorrowed::new_nfc().normalize(text);
    let stripped: String = composed
        .to_lowercase()
        .chars()
        .filter(|ch| !IGNORED.contains(ch))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn answers_match(answer: &str, target: &str) -> bool {
    normalize_text(answer) == normalize_text(target)
}
