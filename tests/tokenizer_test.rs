/// Property tests for tokenizing diff lines and splitting identifiers into words
use diffspell_lib::tokenizer::{is_delimiter, is_identifier, tokenize};
use diffspell_lib::words::decompose;
use proptest::prelude::*;

#[test]
fn test_typical_source_line() {
    let tokens: Vec<&str> = tokenize("    const userNmae = getUser(42).first_name;")
        .map(|t| t.text)
        .collect();
    assert_eq!(tokens, vec!["const", "userNmae", "getUser", "first", "name"]);
}

#[test]
fn test_decompose_mixed_case_identifiers() {
    assert_eq!(decompose("getUserName"), vec!["get", "User", "Name"]);
    assert_eq!(decompose("HTTPServer"), vec!["HTTP", "Server"]);
    assert_eq!(decompose("parseXMLDocument"), vec!["parse", "XML", "Document"]);
    assert_eq!(decompose("lowercase"), vec!["lowercase"]);
}

proptest! {
    #[test]
    fn tokens_are_identifiers_at_their_offsets(line in "[ -~]{0,80}") {
        let mut last_end = 0;
        for token in tokenize(&line) {
            prop_assert!(is_identifier(token.text), "{:?} is not an identifier", token.text);
            prop_assert_eq!(&line[token.offset..token.end()], token.text);
            prop_assert!(token.offset >= last_end, "tokens overlap in {:?}", line);
            prop_assert!(!token.text.contains('_'));
            last_end = token.end();
        }
    }

    #[test]
    fn tokens_are_bounded_by_delimiters(line in "[ -~]{0,80}") {
        for token in tokenize(&line) {
            let before = line[..token.offset].chars().next_back();
            let after = line[token.end()..].chars().next();
            prop_assert!(before.is_none_or(is_delimiter));
            prop_assert!(after.is_none_or(is_delimiter));
        }
    }

    #[test]
    fn decomposition_covers_the_token(token in "[a-zA-Z]{1,30}") {
        let words = decompose(&token);
        prop_assert!(words.iter().all(|w| !w.is_empty()));
        prop_assert_eq!(words.concat(), token);
    }
}
