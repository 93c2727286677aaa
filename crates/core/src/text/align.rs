//! Recovering the original surface form of a tokenized candidate

use regex::RegexBuilder;

/// Finds `candidate` in `source` ignoring case and whitespace between tokens
///
/// Tokenizers join tokens with spaces ("東京 タワー") or change case, while
/// the keyphrase shown to users should match the source text ("東京タワー").
/// Returns the first matching span of `source`, trimmed, or the candidate
/// itself when there is no match.
///
/// # Examples
///
/// ```
/// use kpx_core::text::to_original_expression;
///
/// let source = "東京タワーに行った。Rust Lang も好き。";
/// assert_eq!(to_original_expression(source, "東京 タワー"), "東京タワー");
/// assert_eq!(to_original_expression(source, "rust lang"), "Rust Lang");
/// assert_eq!(to_original_expression(source, "大阪"), "大阪");
/// ```
pub fn to_original_expression(source: &str, candidate: &str) -> String {
    let words: Vec<String> = candidate.split_whitespace().map(regex::escape).collect();
    if words.is_empty() {
        return candidate.to_string();
    }

    let pattern = format!(r"\s*{}\s*", words.join(r"\s*"));
    let matched = RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .ok()
        .and_then(|re| re.find(source).map(|m| m.as_str().trim().to_string()));

    match matched {
        Some(span) if !span.is_empty() => span,
        _ => candidate.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restores_spacing_from_source() {
        assert_eq!(
            to_original_expression("機械学習モデルの評価", "機械 学習 モデル"),
            "機械学習モデル"
        );
    }

    #[test]
    fn test_restores_case_from_source() {
        assert_eq!(
            to_original_expression("We use OpenAI Embeddings here", "openai embeddings"),
            "OpenAI Embeddings"
        );
    }

    #[test]
    fn test_tolerates_extra_whitespace_in_source() {
        assert_eq!(
            to_original_expression("自然   言語\n処理", "自然 言語 処理"),
            "自然   言語\n処理"
        );
    }

    #[test]
    fn test_escapes_regex_metacharacters() {
        assert_eq!(to_original_expression("C++ と C#", "c++"), "C++");
        assert_eq!(to_original_expression("no match", "(a|b)*"), "(a|b)*");
    }

    #[test]
    fn test_first_occurrence_wins() {
        assert_eq!(to_original_expression("Data data DATA", "data"), "Data");
    }

    #[test]
    fn test_empty_candidate_is_returned_unchanged() {
        assert_eq!(to_original_expression("本文", ""), "");
        assert_eq!(to_original_expression("本文", "  "), "  ");
    }
}
