//! Camel-case decomposition of identifiers into words.

use regex::Regex;
use std::sync::LazyLock;

// lowerUpper -> lower Upper
static LOWER_UPPER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([a-z])([A-Z])").unwrap());

// ACRONYMWord -> ACRONYM Word
static ACRONYM_WORD_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([A-Z])([A-Z])([a-z])").unwrap());

const BOUNDARY: char = ' ';

/// Split an identifier into its natural-language words.
///
/// ```
/// use diffspell_lib::words::decompose;
///
/// assert_eq!(decompose("HTTPRequestId"), vec!["HTTP", "Request", "Id"]);
/// assert_eq!(decompose("userId"), vec!["user", "Id"]);
/// assert_eq!(decompose("lower"), vec!["lower"]);
/// ```
///
/// Boundaries are inserted by two leftmost, non-overlapping passes: first
/// between a lowercase and an uppercase letter, then before the last capital
/// of an acronym that runs into a capitalized word. Tokens never contain the
/// boundary character, so the result is never empty for a non-empty token.
pub fn decompose(token: &str) -> Vec<String> {
    let marked = LOWER_UPPER_REGEX.replace_all(token, "${1} ${2}");
    let marked = ACRONYM_WORD_REGEX.replace_all(&marked, "${1} ${2}${3}");
    marked.split(BOUNDARY).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_acronym_followed_by_word() {
        assert_eq!(decompose("HTTPRequestId"), vec!["HTTP", "Request", "Id"]);
        assert_eq!(decompose("parseXMLDocument"), vec!["parse", "XML", "Document"]);
    }

    #[test]
    fn test_simple_camel_case() {
        assert_eq!(decompose("userId"), vec!["user", "Id"]);
        assert_eq!(decompose("UserAccountName"), vec!["User", "Account", "Name"]);
    }

    #[test]
    fn test_no_transitions() {
        assert_eq!(decompose("lower"), vec!["lower"]);
        assert_eq!(decompose("UPPER"), vec!["UPPER"]);
        assert_eq!(decompose("Capital"), vec!["Capital"]);
    }

    #[test]
    fn test_single_words_are_fixed_points() {
        for token in ["HTTPRequestId", "userId", "getURLForIndex", "aB"] {
            for word in decompose(token) {
                assert_eq!(decompose(&word), vec![word.clone()]);
            }
        }
    }

    #[test]
    fn test_single_letter_words() {
        assert_eq!(decompose("aB"), vec!["a", "B"]);
        assert_eq!(decompose("getX"), vec!["get", "X"]);
    }
}
