use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;
use unicode_normalization::{is_nfc, UnicodeNormalization};

/// Letters a token may contain: ASCII a-z plus the Spanish accented set.
pub const ALPHABET_EXTRA: &[char] = &['á', 'é', 'í', 'ó', 'ú', 'ñ', 'ü'];

lazy_static! {
    static ref WORD: Regex = Regex::new(r"[a-záéíóúñü]+").expect("valid regex");
    static ref WORD_ANY_CASE: Regex = Regex::new(r"(?i)[a-záéíóúñü]+").expect("valid regex");
}

/// Returns true if `c` belongs to the token alphabet (lowercase only).
pub fn is_token_char(c: char) -> bool {
    c.is_ascii_lowercase() || ALPHABET_EXTRA.contains(&c)
}

/// Compose combining accents so `e\u{301}` counts the same as `é`.
pub fn compose(text: &str) -> Cow<'_, str> {
    if is_nfc(text) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.nfc().collect())
    }
}

/// Tokenize text into (token, byte offset) pairs.
///
/// Offsets point into the NFC-composed form of `text`, which is `text` itself
/// for anything that went through [`crate::Page::new`].
pub fn tokenize_with_offsets(text: &str) -> Vec<(String, usize)> {
    let composed = compose(text);
    let mut tokens = Vec::new();
    for mat in WORD_ANY_CASE.find_iter(&composed) {
        let lower = mat.as_str().to_lowercase();
        // Case folding can map a matched letter outside the alphabet once lowercased.
        let same_width = lower.len() == mat.as_str().len();
        for part in WORD.find_iter(&lower) {
            let offset = if same_width { mat.start() + part.start() } else { mat.start() };
            tokens.push((part.as_str().to_string(), offset));
        }
    }
    tokens
}

/// Lowercase `text` and split it into maximal runs of the token alphabet.
pub fn normalize(text: &str) -> Vec<String> {
    tokenize_with_offsets(text).into_iter().map(|(t, _)| t).collect()
}
