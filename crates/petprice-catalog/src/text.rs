//! Text folding and keyword primitives shared by the extractors.
//!
//! Every matcher in this crate works on *folded* text: lower-cased with
//! diacritics removed, so `"Cães"`, `"caes"` and `"CAES"` compare equal.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lower-cases `s` and strips combining marks (`"Ração Cães"` → `"racao caes"`).
#[must_use]
pub fn fold(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Collapses runs of whitespace into single spaces and trims the ends.
#[must_use]
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns `true` if `term` occurs in `folded` starting at a word boundary.
///
/// The end of the term is not anchored, so `"adult"` matches `"adultos"` and
/// `"castrad"` matches `"castrados"`. Both inputs must already be folded.
pub(crate) fn has_term(folded: &str, term: &str) -> bool {
    find_at_word_start(folded, term, false)
}

/// Like [`has_term`] but the match must also end at a word boundary.
pub(crate) fn has_word(folded: &str, word: &str) -> bool {
    find_at_word_start(folded, word, true)
}

/// Returns `true` if any of `terms` matches via [`has_term`].
pub(crate) fn has_any_term(folded: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| has_term(folded, t))
}

fn find_at_word_start(haystack: &str, needle: &str, anchor_end: bool) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(pos, _)| {
        let starts_clean = haystack[..pos]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let ends_clean = !anchor_end
            || haystack[pos + needle.len()..]
                .chars()
                .next()
                .is_none_or(|c| !c.is_alphanumeric());
        starts_clean && ends_clean
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_strips_accents_and_case() {
        assert_eq!(fold("Ração Cães Médio"), "racao caes medio");
        assert_eq!(fold("SELEÇÃO"), "selecao");
    }

    #[test]
    fn collapse_whitespace_normalizes_runs() {
        assert_eq!(collapse_whitespace("  Golden   Special \t Frango "), "Golden Special Frango");
    }

    #[test]
    fn has_term_requires_word_start() {
        assert!(has_term("racao caes adultos", "adult"));
        assert!(!has_term("racao caes adultos", "dult"));
        assert!(has_term("senior 7+ anos", "7+"));
    }

    #[test]
    fn has_word_requires_both_boundaries() {
        assert!(has_word("racao nd prime", "nd"));
        assert!(!has_word("racao nda prime", "nd"));
        assert!(!has_word("grande", "g"));
    }

    #[test]
    fn empty_needle_never_matches() {
        assert!(!has_term("anything", ""));
        assert!(!has_word("anything", ""));
    }
}
