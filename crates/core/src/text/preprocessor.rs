//! Text normalization applied before chunking and candidate generation
//!
//! The default pass is lossy but deterministic: whitespace is collapsed,
//! Unicode compatibility forms are folded (NFKC) and a Japanese-specific
//! pass unifies hyphens, long-vowel marks and repeated punctuation.
//! Strong normalization additionally lowercases and removes all whitespace;
//! it is meant for matching, never for display.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static CARRIAGE_RETURNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r\n?").expect("Failed to compile carriage return regex"));

static HORIZONTAL_SPACES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\u{3000}\t ]+").expect("Failed to compile space regex"));

static NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n+").expect("Failed to compile newline regex"));

static HYPHENS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\u{02D7}\u{058A}\u{2010}\u{2011}\u{2012}\u{2013}\u{2043}\u{207B}\u{208B}\u{2212}]+")
        .expect("Failed to compile hyphen regex")
});

static LONG_VOWELS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\u{FE63}\u{FF0D}\u{FF70}\u{2014}\u{2015}\u{2500}\u{2501}\u{30FC}]+")
        .expect("Failed to compile long vowel regex")
});

static TILDES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[~\u{223C}\u{223E}\u{301C}\u{3030}\u{FF5E}]")
        .expect("Failed to compile tilde regex")
});

static REPEATED_PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!{2,}|\?{2,}|。{2,}|、{2,}|,{2,}").expect("Failed to compile punctuation regex"));

/// Upper bound on fixed-point iterations for strong normalization
const MAX_STRONG_PASSES: usize = 8;

/// Normalizes raw Japanese text
///
/// # Examples
///
/// ```
/// use kpx_core::text::TextPreprocessor;
///
/// let pre = TextPreprocessor::new(false);
/// assert_eq!(pre.run("ｶﾀｶﾅ　と　漢字"), "カタカナと漢字");
///
/// let strong = TextPreprocessor::new(true);
/// assert_eq!(strong.run("Tokyo Tower"), "tokyotower");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextPreprocessor {
    strongly_normalize: bool,
}

impl TextPreprocessor {
    pub fn new(strongly_normalize: bool) -> Self {
        Self { strongly_normalize }
    }

    pub fn strongly_normalize(&self) -> bool {
        self.strongly_normalize
    }

    /// Runs the normalization pipeline over `text`
    pub fn run(&self, text: &str) -> String {
        if !self.strongly_normalize {
            return normalize(text);
        }

        let mut current = strong_pass(text);
        for _ in 0..MAX_STRONG_PASSES {
            let next = strong_pass(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }
}

/// Default normalization pass
pub fn normalize(text: &str) -> String {
    let text = CARRIAGE_RETURNS.replace_all(text, "\n");
    let text = HORIZONTAL_SPACES.replace_all(&text, " ");
    let text = NEWLINES.replace_all(&text, "\n");
    let text: String = text.nfkc().collect();
    normalize_japanese(&text)
}

fn strong_pass(text: &str) -> String {
    normalize(text)
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

fn normalize_japanese(text: &str) -> String {
    let text = HYPHENS.replace_all(text, "-");
    let text = LONG_VOWELS.replace_all(&text, "ー");
    let text = TILDES.replace_all(&text, "");
    let text = REPEATED_PUNCTUATION.replace_all(&text, |caps: &regex::Captures<'_>| {
        caps[0].chars().next().map(String::from).unwrap_or_default()
    });
    let text = HORIZONTAL_SPACES.replace_all(&text, " ");

    let lines: Vec<String> = text
        .split('\n')
        .map(|line| remove_spaces_around_japanese(line.trim()))
        .filter(|line| !line.is_empty())
        .collect();
    lines.join("\n")
}

/// Drops single spaces that separate Japanese from Japanese or ASCII text
fn remove_spaces_around_japanese(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::with_capacity(line.len());

    for (i, &c) in chars.iter().enumerate() {
        if c == ' ' && i > 0 && i + 1 < chars.len() {
            let prev = chars[i - 1];
            let next = chars[i + 1];
            let joins_japanese = (is_japanese(prev) && (is_japanese(next) || next.is_ascii_graphic()))
                || (prev.is_ascii_graphic() && is_japanese(next));
            if joins_japanese {
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Kana, CJK ideographs, CJK punctuation and full-width forms
pub(crate) fn is_japanese(c: char) -> bool {
    matches!(c,
        '\u{3000}'..='\u{303F}'
        | '\u{3040}'..='\u{309F}'
        | '\u{30A0}'..='\u{30FF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{4E00}'..='\u{9FFF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{FF00}'..='\u{FFEF}')
}
