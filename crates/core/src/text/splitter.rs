//! Sentence splitting for Japanese and mixed-script text
//!
//! Text is cut after newlines, after Japanese sentence-final marks and after
//! Latin sentence-final marks that are followed by whitespace. Pieces shorter
//! than the configured minimum are merged forward so that ranking never sees
//! degenerate one-character "sentences".

/// Japanese sentence-final marks
const JAPANESE_TERMINATORS: [char; 4] = ['。', '！', '？', '．'];

/// Latin sentence-final marks, only terminal when followed by whitespace
const LATIN_TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Sentence splitter that merges short sentences up to a minimum length
///
/// # Examples
///
/// ```
/// use kpx_core::text::SentenceSplitter;
///
/// let splitter = SentenceSplitter::new(5);
/// let sentences = splitter.split("東京は首都。大阪は都市。");
///
/// assert_eq!(sentences, vec!["東京は首都。", "大阪は都市。"]);
/// ```
#[derive(Debug, Clone)]
pub struct SentenceSplitter {
    /// Minimum length (in characters) of an emitted sentence
    minimum_characters: usize,
}

impl SentenceSplitter {
    /// Creates a splitter that merges sentences until they reach `minimum_characters`
    ///
    /// # Examples
    ///
    /// ```
    /// use kpx_core::text::SentenceSplitter;
    ///
    /// let splitter = SentenceSplitter::new(15);
    /// assert_eq!(splitter.minimum_characters(), 15);
    /// ```
    pub fn new(minimum_characters: usize) -> Self {
        Self { minimum_characters }
    }

    /// Returns the merge threshold
    pub fn minimum_characters(&self) -> usize {
        self.minimum_characters
    }

    /// Splits text into sentences, then merges short ones forward
    ///
    /// Merged sentences are joined with a newline. A trailing buffer shorter
    /// than the threshold is still emitted.
    ///
    /// # Examples
    ///
    /// ```
    /// use kpx_core::text::SentenceSplitter;
    ///
    /// let splitter = SentenceSplitter::new(10);
    /// let sentences = splitter.split("はい。そうです。東京は日本の首都である。");
    ///
    /// assert_eq!(sentences, vec!["はい。\nそうです。\n東京は日本の首都である。"]);
    /// ```
    pub fn split(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut buffer = String::new();

        for piece in split_raw(text) {
            if !buffer.is_empty() {
                buffer.push('\n');
            }
            buffer.push_str(&piece);

            if buffer.chars().count() >= self.minimum_characters {
                sentences.push(std::mem::take(&mut buffer));
            }
        }

        if !buffer.is_empty() {
            sentences.push(buffer);
        }

        sentences
    }
}

impl Default for SentenceSplitter {
    /// Creates a splitter with the default merge threshold of 10 characters
    fn default() -> Self {
        Self::new(10)
    }
}

/// Splits at boundaries without merging; pieces are trimmed and non-empty
pub fn split_raw(text: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        current.push(ch);

        let boundary = match ch {
            '\n' => true,
            c if JAPANESE_TERMINATORS.contains(&c) => true,
            c if LATIN_TERMINATORS.contains(&c) => match chars.peek() {
                Some(next) if next.is_whitespace() => {
                    if let Some(space) = chars.next() {
                        current.push(space);
                    }
                    true
                }
                _ => false,
            },
            _ => false,
        };

        if boundary {
            push_trimmed(&mut pieces, &current);
            current.clear();
        }
    }

    push_trimmed(&mut pieces, &current);
    pieces
}

fn push_trimmed(pieces: &mut Vec<String>, piece: &str) {
    let trimmed = piece.trim();
    if !trimmed.is_empty() {
        pieces.push(trimmed.to_string());
    }
}
