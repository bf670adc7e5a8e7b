//! Shell-like tokenizer
//!
//! Splits one input line into tokens in a single left-to-right pass:
//!
//! - space, tab and newline separate tokens outside quotes
//! - `"` toggles quoted mode and is stripped from the output
//! - `\` makes the next character literal (a trailing lone `\` is dropped)
//! - an unterminated quote is closed implicitly at end of input
//!
//! Empty tokens are never produced, including for an empty quoted string.

use std::str::Chars;

use tracing::debug;

use crate::error::CommandError;

/// Streaming tokenizer over one input line
pub struct Tokenizer<'a> {
    chars: Chars<'a>,
    in_quotes: bool,
    current: String,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars(),
            in_quotes: false,
            current: String::new(),
        }
    }

    /// Tokenize an entire line
    ///
    /// Fails with [`CommandError::EmptyInput`] when the line is blank or
    /// yields no tokens at all.
    pub fn tokenize(input: &str) -> Result<Vec<String>, CommandError> {
        if input.trim().is_empty() {
            return Err(CommandError::EmptyInput);
        }

        let mut tokenizer = Tokenizer::new(input);
        let tokens: Vec<String> = tokenizer.by_ref().collect();

        if tokenizer.in_quotes {
            debug!(input, "unterminated quote closed at end of input");
        }
        if tokens.is_empty() {
            return Err(CommandError::EmptyInput);
        }

        Ok(tokens)
    }

    fn take_current(&mut self) -> Option<String> {
        if self.current.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.current))
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while let Some(c) = self.chars.next() {
            match c {
                '\\' => {
                    if let Some(escaped) = self.chars.next() {
                        self.current.push(escaped);
                    }
                }
                '"' => self.in_quotes = !self.in_quotes,
                c if is_separator(c) && !self.in_quotes => {
                    if let Some(token) = self.take_current() {
                        return Some(token);
                    }
                }
                c => self.current.push(c),
            }
        }

        self.take_current()
    }
}

/// Tokenize an entire line; see [`Tokenizer::tokenize`]
pub fn tokenize(input: &str) -> Result<Vec<String>, CommandError> {
    Tokenizer::tokenize(input)
}

fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_shell_like_line() {
        let tokens = tokenize(
            r#"tar -x -v --file="File 1.txt" --arg2 "Hello, \"World\"" Required\ argument"#,
        )
        .unwrap();
        assert_eq!(
            tokens,
            vec![
                "tar",
                "-x",
                "-v",
                "--file=File 1.txt",
                "--arg2",
                "Hello, \"World\"",
                "Required argument",
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(tokenize(""), Err(CommandError::EmptyInput));
        assert_eq!(tokenize(" \t\n "), Err(CommandError::EmptyInput));
        assert_eq!(tokenize(r#""""#), Err(CommandError::EmptyInput));
    }

    #[test]
    fn test_consecutive_whitespace() {
        let tokens = tokenize("  a \t\t b\n\nc  ").unwrap();
        assert_eq!(tokens, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_unterminated_quote_commits_pending() {
        let tokens = tokenize(r#"say "hello there"#).unwrap();
        assert_eq!(tokens, vec!["say", "hello there"]);
    }

    #[test]
    fn test_trailing_backslash_dropped() {
        let tokens = tokenize(r"echo abc\").unwrap();
        assert_eq!(tokens, vec!["echo", "abc"]);
    }

    #[test]
    fn test_escapes() {
        let tokens = tokenize(r#"a\\b \"q\" x\ y"#).unwrap();
        assert_eq!(tokens, vec![r"a\b", "\"q\"", "x y"]);
    }

    #[test]
    fn test_quote_inside_word_joins() {
        let tokens = tokenize(r#"pre"fix mid"post next"#).unwrap();
        assert_eq!(tokens, vec!["prefix midpost", "next"]);
    }

    #[test]
    fn test_escaped_quote_inside_quotes() {
        let tokens = tokenize(r#""a \" b""#).unwrap();
        assert_eq!(tokens, vec!["a \" b"]);
    }

    #[test]
    fn test_unicode_passthrough() {
        let tokens = tokenize("grüße \"für alle\"").unwrap();
        assert_eq!(tokens, vec!["grüße", "für alle"]);
    }

    #[test]
    fn test_iterator_is_lazy() {
        let mut tokenizer = Tokenizer::new("one two");
        assert_eq!(tokenizer.next().as_deref(), Some("one"));
        assert_eq!(tokenizer.next().as_deref(), Some("two"));
        assert_eq!(tokenizer.next(), None);
    }

    proptest! {
        #[test]
        fn plain_words_split_like_whitespace(words in prop::collection::vec("[a-zA-Z0-9_.=-]{1,8}", 1..8),
                                             seps in prop::collection::vec("[ \t\n]{1,3}", 8)) {
            let mut line = String::new();
            for (i, word) in words.iter().enumerate() {
                line.push_str(&seps[i]);
                line.push_str(word);
            }
            let tokens = tokenize(&line).unwrap();
            prop_assert_eq!(tokens, words);
        }

        #[test]
        fn never_yields_empty_tokens(line in ".{0,40}") {
            if let Ok(tokens) = tokenize(&line) {
                prop_assert!(!tokens.is_empty());
                prop_assert!(tokens.iter().all(|t| !t.is_empty()));
            }
        }

        #[test]
        fn quoted_text_is_one_token(text in "[a-z ]{0,12}[a-z][a-z ]{0,12}") {
            let tokens = tokenize(&format!("\"{}\"", text)).unwrap();
            prop_assert_eq!(tokens, vec![text]);
        }
    }
}
