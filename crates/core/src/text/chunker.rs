//! Length-bounded chunking of long documents
//!
//! A document longer than `max_characters` is cut at the last sentence
//! boundary inside the leading window, falling back to the last phrase
//! boundary and finally to a hard cut. All lengths are counted in
//! characters, not bytes.

use once_cell::sync::Lazy;
use regex::Regex;

/// Sentence-final marks, Latin and Japanese
static SENTENCE_BOUNDARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\. |\? |! |。|！|？|\n").expect("Failed to compile sentence boundary regex")
});

/// Phrase-level marks used when no sentence boundary fits in the window
static PHRASE_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r", |、 |\s").expect("Failed to compile phrase boundary regex"));

/// Splits `text` into ordered segments of at most `max_characters` characters
///
/// Segments are left-trimmed, so concatenating them gives back the input
/// apart from leading whitespace and whitespace at the split points.
///
/// # Examples
///
/// ```
/// use kpx_core::text::chunk;
///
/// let chunks = chunk("今日は晴れ。明日は雨。", 7);
/// assert_eq!(chunks, vec!["今日は晴れ。", "明日は雨。"]);
/// ```
pub fn chunk(text: &str, max_characters: usize) -> Vec<String> {
    let max_characters = max_characters.max(1);
    let mut chunks = Vec::new();
    let mut rest = text.trim_start();

    while rest.chars().count() > max_characters {
        let window_end = byte_offset(rest, max_characters);
        let window = &rest[..window_end];

        let split_at = last_match_end(&SENTENCE_BOUNDARY, window)
            .or_else(|| last_match_end(&PHRASE_BOUNDARY, window))
            .unwrap_or(window_end);

        chunks.push(rest[..split_at].to_string());
        rest = rest[split_at..].trim_start();
    }

    if !rest.is_empty() {
        chunks.push(rest.to_string());
    }

    chunks
}

fn last_match_end(pattern: &Regex, window: &str) -> Option<usize> {
    pattern
        .find_iter(window)
        .last()
        .map(|m| m.end())
        .filter(|&end| end > 0)
}

/// Byte offset of the `n`th character, or the string length
fn byte_offset(text: &str, n: usize) -> usize {
    text.char_indices()
        .nth(n)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len())
}
