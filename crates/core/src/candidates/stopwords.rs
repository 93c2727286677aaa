//! Stop-word sets excluded from standalone and n-gram candidates

use crate::error::Result;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Japanese stop words bundled with the crate, one per line
const JAPANESE_STOP_WORDS: &str = include_str!("../../data/stop_words_ja.txt");

/// A set of words that are never candidates on their own
///
/// # Examples
///
/// ```
/// use kpx_core::candidates::StopWords;
///
/// let words = StopWords::parse("これ\n\n  それ  \n");
/// assert_eq!(words.len(), 2);
/// assert!(words.contains("それ"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    /// An empty set
    pub fn empty() -> Self {
        Self::default()
    }

    /// The bundled Japanese list
    pub fn japanese() -> Self {
        Self::parse(JAPANESE_STOP_WORDS)
    }

    /// Parses line-delimited content; lines are trimmed and blanks skipped
    pub fn parse(content: &str) -> Self {
        Self::new(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty()),
        )
    }

    /// Loads a line-delimited stop-word file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let words = Self::parse(&content);
        debug!(
            "Loaded {} stop words from {}",
            words.len(),
            path.as_ref().display()
        );
        Ok(words)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
