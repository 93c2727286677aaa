//! Rewriting candidate texts before they are embedded

/// Token that replaces a masked candidate
pub const MASK_TOKEN: &str = "[MASK]";

/// What is embedded for a candidate sentence or phrase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmbeddingTarget {
    /// The candidate text itself
    #[default]
    Plain,
    /// The source text with the candidate masked out
    Masked,
    /// The candidate quoted together with the source text
    WithSourceText,
}

impl EmbeddingTarget {
    /// Text to embed for `target` found in `source`
    pub fn rewrite(&self, source: &str, target: &str) -> String {
        match self {
            Self::Plain => target.to_string(),
            Self::Masked => mask_text(source, target),
            Self::WithSourceText => with_source_text(source, target),
        }
    }
}

/// Replaces every occurrence of `target` in `source` with mask tokens
///
/// The mask has `len / 2 + 1` tokens, `len` counted in characters.
///
/// # Examples
///
/// ```
/// use kpx_core::ranking::mask_text;
///
/// assert_eq!(mask_text("東京は首都", "東京"), "[MASK] [MASK]は首都");
/// ```
pub fn mask_text(source: &str, target: &str) -> String {
    if target.is_empty() {
        return source.to_string();
    }
    let count = target.chars().count() / 2 + 1;
    let mask = vec![MASK_TOKEN; count].join(" ");
    source.replace(target, &mask)
}

/// Wraps `target` in an instruction quoting its source text
pub fn with_source_text(source: &str, target: &str) -> String {
    format!("次の本文における「{}」の意味\n本文：\n{}", target, source)
}
