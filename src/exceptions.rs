//! Built-in exception list of common programming vocabulary.
//!
//! General-purpose dictionaries reject many words that are perfectly normal in
//! source code: abbreviations, framework names and web-platform jargon. These
//! are accepted before the dictionary engine is consulted. Entries are
//! lowercase; lookups lowercase the word first.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Lowercase words never reported as misspellings
pub const BUILTIN_WORDS: &[&str] = &[
    "accessor",
    "accessors",
    "admin",
    "ajax",
    "api",
    "args",
    "async",
    "auth",
    "autowired",
    "bool",
    "calc",
    "charset",
    "checkbox",
    "checkboxes",
    "concat",
    "config",
    "configs",
    "const",
    "csrf",
    "ctrl",
    "dedupe",
    "desc",
    "dirname",
    "doma",
    "draggable",
    "dropdown",
    "dropdowns",
    "enum",
    "enums",
    "eslint",
    "github",
    "href",
    "html",
    "https",
    "i18n",
    "impl",
    "init",
    "inline",
    "instanceof",
    "interop",
    "iterable",
    "javax",
    "jdbc",
    "json",
    "keydown",
    "keyup",
    "lombok",
    "metadata",
    "middleware",
    "mousedown",
    "mouseenter",
    "mouseleave",
    "mouseup",
    "mutex",
    "namespace",
    "nbsp",
    "nowrap",
    "nullable",
    "onclick",
    "param",
    "params",
    "plugin",
    "plugins",
    "prepend",
    "println",
    "readonly",
    "rect",
    "regex",
    "rgba",
    "seasar",
    "servlet",
    "stderr",
    "stdin",
    "stdout",
    "stringify",
    "struct",
    "structs",
    "stylesheet",
    "tbody",
    "textarea",
    "thead",
    "tooltip",
    "tooltips",
    "typeof",
    "updatable",
    "uuid",
    "util",
    "utils",
    "validator",
    "validators",
    "webkit",
    "webpack",
    "xsrf",
    "yyyy",
];

static BUILTIN_SET: LazyLock<HashSet<&'static str>> = LazyLock::new(|| BUILTIN_WORDS.iter().copied().collect());

/// Whether `word` (any case) is on the built-in exception list
pub fn is_builtin_exception(word: &str) -> bool {
    BUILTIN_SET.contains(word.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_words_are_lowercase_and_unique() {
        let mut seen = HashSet::new();
        for word in BUILTIN_WORDS {
            assert_eq!(*word, word.to_lowercase(), "{word} must be lowercase");
            assert!(seen.insert(*word), "{word} listed twice");
        }
    }

    #[test]
    fn test_lookup_ignores_case() {
        assert!(is_builtin_exception("Config"));
        assert!(is_builtin_exception("JSON"));
        assert!(is_builtin_exception("stringify"));
        assert!(!is_builtin_exception("wrod"));
    }
}
