//! Tokenizer collaborator and a script-based fallback segmenter
//!
//! Candidate generation needs `(surface, part-of-speech)` pairs. Production
//! deployments plug a morphological analyzer in through [`Tokenizer`]; the
//! bundled [`ScriptTokenizer`] splits on Unicode script changes and tags runs
//! with coarse Universal Dependencies tags, which is enough to find noun runs
//! in typical Japanese prose.

use crate::error::{KpxError, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Universal Dependencies part-of-speech tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PosTag {
    Adj,
    Adp,
    Adv,
    Aux,
    Cconj,
    Det,
    Intj,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Sconj,
    Sym,
    Verb,
    X,
}

impl PosTag {
    /// All seventeen tags, in declaration order
    pub const ALL: [PosTag; 17] = [
        PosTag::Adj,
        PosTag::Adp,
        PosTag::Adv,
        PosTag::Aux,
        PosTag::Cconj,
        PosTag::Det,
        PosTag::Intj,
        PosTag::Noun,
        PosTag::Num,
        PosTag::Part,
        PosTag::Pron,
        PosTag::Propn,
        PosTag::Punct,
        PosTag::Sconj,
        PosTag::Sym,
        PosTag::Verb,
        PosTag::X,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Adj => "ADJ",
            Self::Adp => "ADP",
            Self::Adv => "ADV",
            Self::Aux => "AUX",
            Self::Cconj => "CCONJ",
            Self::Det => "DET",
            Self::Intj => "INTJ",
            Self::Noun => "NOUN",
            Self::Num => "NUM",
            Self::Part => "PART",
            Self::Pron => "PRON",
            Self::Propn => "PROPN",
            Self::Punct => "PUNCT",
            Self::Sconj => "SCONJ",
            Self::Sym => "SYM",
            Self::Verb => "VERB",
            Self::X => "X",
        }
    }
}

impl fmt::Display for PosTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PosTag {
    type Err = KpxError;

    fn from_str(s: &str) -> Result<Self> {
        PosTag::ALL
            .iter()
            .copied()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| KpxError::validation(format!("Unknown part-of-speech tag: {}", s)))
    }
}

/// A surface form with its part-of-speech tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub pos: PosTag,
}

impl Token {
    pub fn new<S: Into<String>>(text: S, pos: PosTag) -> Self {
        Self {
            text: text.into(),
            pos,
        }
    }
}

/// Splits text into part-of-speech tagged tokens
///
/// Failures are collaborator errors and propagate out of extraction.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Result<Vec<Token>>;
}

/// Hiragana function words recognised by [`ScriptTokenizer`]
static FUNCTION_WORDS: Lazy<HashMap<&'static str, PosTag>> = Lazy::new(|| {
    let entries: &[(&str, PosTag)] = &[
        ("について", PosTag::Adp),
        ("によって", PosTag::Adp),
        ("として", PosTag::Adp),
        ("から", PosTag::Adp),
        ("まで", PosTag::Adp),
        ("より", PosTag::Adp),
        ("には", PosTag::Adp),
        ("では", PosTag::Adp),
        ("とは", PosTag::Adp),
        ("への", PosTag::Adp),
        ("との", PosTag::Adp),
        ("での", PosTag::Adp),
        ("でも", PosTag::Adp),
        ("の", PosTag::Adp),
        ("は", PosTag::Adp),
        ("が", PosTag::Adp),
        ("を", PosTag::Adp),
        ("に", PosTag::Adp),
        ("で", PosTag::Adp),
        ("と", PosTag::Adp),
        ("も", PosTag::Adp),
        ("へ", PosTag::Adp),
        ("や", PosTag::Adp),
        ("である", PosTag::Aux),
        ("であり", PosTag::Aux),
        ("でした", PosTag::Aux),
        ("です", PosTag::Aux),
        ("ました", PosTag::Aux),
        ("ません", PosTag::Aux),
        ("ます", PosTag::Aux),
        ("だった", PosTag::Aux),
        ("だ", PosTag::Aux),
        ("なかった", PosTag::Aux),
        ("ない", PosTag::Aux),
        ("られる", PosTag::Aux),
        ("れる", PosTag::Aux),
        ("させる", PosTag::Aux),
        ("せる", PosTag::Aux),
        ("たい", PosTag::Aux),
        ("する", PosTag::Verb),
        ("した", PosTag::Verb),
        ("して", PosTag::Verb),
        ("します", PosTag::Verb),
        ("いる", PosTag::Verb),
        ("いた", PosTag::Verb),
        ("ある", PosTag::Verb),
        ("あった", PosTag::Verb),
        ("あり", PosTag::Verb),
        ("なる", PosTag::Verb),
        ("なった", PosTag::Verb),
        ("できる", PosTag::Verb),
        ("けれども", PosTag::Sconj),
        ("けれど", PosTag::Sconj),
        ("ながら", PosTag::Sconj),
        ("ので", PosTag::Sconj),
        ("および", PosTag::Cconj),
        ("または", PosTag::Cconj),
        ("そして", PosTag::Cconj),
        ("しかし", PosTag::Cconj),
        ("これ", PosTag::Pron),
        ("それ", PosTag::Pron),
        ("あれ", PosTag::Pron),
        ("どれ", PosTag::Pron),
        ("ここ", PosTag::Pron),
        ("そこ", PosTag::Pron),
        ("この", PosTag::Det),
        ("その", PosTag::Det),
        ("あの", PosTag::Det),
        ("とても", PosTag::Adv),
        ("すでに", PosTag::Adv),
        ("まだ", PosTag::Adv),
        ("もう", PosTag::Adv),
        ("よく", PosTag::Adv),
        ("か", PosTag::Part),
        ("ね", PosTag::Part),
        ("よ", PosTag::Part),
    ];
    entries.iter().copied().collect()
});

/// Longest entry in [`FUNCTION_WORDS`], in characters
const MAX_FUNCTION_WORD_CHARS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Script {
    Kanji,
    Hiragana,
    Katakana,
    Latin,
    Digit,
    Punctuation,
    Symbol,
    Space,
}

impl Script {
    fn of(c: char) -> Self {
        match c {
            c if c.is_whitespace() => Self::Space,
            '々' | '〆' | '\u{3400}'..='\u{4DBF}' | '\u{4E00}'..='\u{9FFF}' | '\u{F900}'..='\u{FAFF}' => {
                Self::Kanji
            }
            '\u{3041}'..='\u{309F}' => Self::Hiragana,
            '・' => Self::Punctuation,
            '\u{30A0}'..='\u{30FF}' | '\u{31F0}'..='\u{31FF}' => Self::Katakana,
            c if c.is_ascii_digit() => Self::Digit,
            c if c.is_alphabetic() && (c as u32) < 0x0250 => Self::Latin,
            '.' | ',' | '!' | '?' | ';' | ':' | '\'' | '"' | '(' | ')' | '[' | ']' | '{' | '}'
            | '-' | '！' | '？' | '（' | '）' | '，' | '．'
            | '\u{3001}'..='\u{3003}' | '\u{3008}'..='\u{3011}' | '\u{3014}'..='\u{301F}' => {
                Self::Punctuation
            }
            _ => Self::Symbol,
        }
    }

    /// Scripts whose consecutive characters form a single token
    fn groups(self) -> bool {
        matches!(self, Self::Kanji | Self::Katakana | Self::Latin | Self::Digit | Self::Hiragana)
    }
}

/// Dependency-free tokenizer that segments on script boundaries
///
/// # Examples
///
/// ```
/// use kpx_core::candidates::{PosTag, ScriptTokenizer, Tokenizer};
///
/// let tokens = ScriptTokenizer::new().tokenize("東京は首都").unwrap();
/// let tags: Vec<PosTag> = tokens.iter().map(|t| t.pos).collect();
///
/// assert_eq!(tags, vec![PosTag::Noun, PosTag::Adp, PosTag::Noun]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptTokenizer;

impl ScriptTokenizer {
    pub fn new() -> Self {
        Self
    }

    fn tag_run(script: Script, run: &str, tokens: &mut Vec<Token>) {
        match script {
            Script::Kanji | Script::Katakana => tokens.push(Token::new(run, PosTag::Noun)),
            Script::Latin => {
                let pos = if run.chars().next().is_some_and(char::is_uppercase) {
                    PosTag::Propn
                } else {
                    PosTag::Noun
                };
                tokens.push(Token::new(run, pos));
            }
            Script::Digit => tokens.push(Token::new(run, PosTag::Num)),
            Script::Hiragana => split_hiragana(run, tokens),
            Script::Punctuation => tokens.push(Token::new(run, PosTag::Punct)),
            Script::Symbol => tokens.push(Token::new(run, PosTag::Sym)),
            Script::Space => {}
        }
    }
}

impl Tokenizer for ScriptTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        let mut run = String::new();
        let mut run_script: Option<Script> = None;

        for c in text.chars() {
            let script = Script::of(c);
            let continues = run_script == Some(script) && script.groups();
            if !continues {
                if let Some(previous) = run_script {
                    Self::tag_run(previous, &run, &mut tokens);
                }
                run.clear();
                run_script = Some(script);
            }
            run.push(c);
        }
        if let Some(previous) = run_script {
            Self::tag_run(previous, &run, &mut tokens);
        }

        Ok(tokens)
    }
}

/// Greedy longest-match over function words; leftovers become `X` tokens
fn split_hiragana(run: &str, tokens: &mut Vec<Token>) {
    let chars: Vec<char> = run.chars().collect();
    let mut unknown = String::new();
    let mut i = 0;

    while i < chars.len() {
        let longest = (1..=MAX_FUNCTION_WORD_CHARS.min(chars.len() - i))
            .rev()
            .find_map(|len| {
                let candidate: String = chars[i..i + len].iter().collect();
                FUNCTION_WORDS.get(candidate.as_str()).map(|&pos| (candidate, pos))
            });

        match longest {
            Some((word, pos)) => {
                if !unknown.is_empty() {
                    tokens.push(Token::new(std::mem::take(&mut unknown), PosTag::X));
                }
                i += word.chars().count();
                tokens.push(Token::new(word, pos));
            }
            None => {
                unknown.push(chars[i]);
                i += 1;
            }
        }
    }

    if !unknown.is_empty() {
        tokens.push(Token::new(unknown, PosTag::X));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(text: &str) -> Vec<(String, PosTag)> {
        ScriptTokenizer::new()
            .tokenize(text)
            .unwrap()
            .into_iter()
            .map(|t| (t.text, t.pos))
            .collect()
    }

    #[test]
    fn test_tokenize_simple_sentence() {
        let tokens = pairs("東京は日本の首都である。");
        let expected = vec![
            ("東京", PosTag::Noun),
            ("は", PosTag::Adp),
            ("日本", PosTag::Noun),
            ("の", PosTag::Adp),
            ("首都", PosTag::Noun),
            ("である", PosTag::Aux),
            ("。", PosTag::Punct),
        ];
        let expected: Vec<(String, PosTag)> = expected
            .into_iter()
            .map(|(t, p)| (t.to_string(), p))
            .collect();
        assert_eq!(tokens, expected);
    }

    #[test]
    fn test_longest_function_word_wins() {
        let tokens = pairs("中心でもある");
        assert_eq!(
            tokens,
            vec![
                ("中心".to_string(), PosTag::Noun),
                ("でも".to_string(), PosTag::Adp),
                ("ある".to_string(), PosTag::Verb),
            ]
        );
    }

    #[test]
    fn test_mixed_scripts() {
        let tokens = pairs("Rustとカタカナ2024年");
        assert_eq!(
            tokens,
            vec![
                ("Rust".to_string(), PosTag::Propn),
                ("と".to_string(), PosTag::Adp),
                ("カタカナ".to_string(), PosTag::Noun),
                ("2024".to_string(), PosTag::Num),
                ("年".to_string(), PosTag::Noun),
            ]
        );
    }

    #[test]
    fn test_unknown_hiragana_is_tagged_x() {
        assert_eq!(pairs("ぽぽ"), vec![("ぽぽ".to_string(), PosTag::X)]);
        assert_eq!(
            pairs("ぽぽの"),
            vec![
                ("ぽぽ".to_string(), PosTag::X),
                ("の".to_string(), PosTag::Adp),
            ]
        );
    }

    #[test]
    fn test_whitespace_is_dropped_and_punctuation_is_split() {
        let tokens = pairs("a b。。");
        assert_eq!(
            tokens,
            vec![
                ("a".to_string(), PosTag::Noun),
                ("b".to_string(), PosTag::Noun),
                ("。".to_string(), PosTag::Punct),
                ("。".to_string(), PosTag::Punct),
            ]
        );
    }

    #[test]
    fn test_pos_tag_parsing() {
        assert_eq!("noun".parse::<PosTag>().unwrap(), PosTag::Noun);
        assert_eq!("PROPN".parse::<PosTag>().unwrap(), PosTag::Propn);
        assert!("NN".parse::<PosTag>().is_err());
        assert_eq!(PosTag::ALL.len(), 17);
    }

    #[test]
    fn test_pos_tag_serde_uses_upper_case() {
        let json = serde_json::to_string(&PosTag::Sconj).unwrap();
        assert_eq!(json, "\"SCONJ\"");
        let tag: PosTag = serde_json::from_str("\"ADP\"").unwrap();
        assert_eq!(tag, PosTag::Adp);
    }
}
