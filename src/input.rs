//! Classification of the tokens that follow a command name
//!
//! ```text
//! deploy web prod -fv --region=eu --tag nightly
//!        └──┬───┘ └┬┘ └────┬────┘ └─────┬─────┘
//!     positionals flags  option       option (value taken from next token)
//! ```
//!
//! Positionals come first. The first `-`-prefixed token ends positional
//! collection for good; non-dash tokens after it are either consumed as an
//! option value or set aside in [`ParsedInput::ignored`].

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;

/// Positionals, options and flags of one evaluation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedInput {
    pub positionals: Vec<String>,
    /// Option name to value; `None` when given as a bare `--name`
    pub options: BTreeMap<String, Option<String>>,
    pub flags: BTreeSet<char>,
    /// Non-option tokens found after the first option or flag
    pub ignored: Vec<String>,
}

impl ParsedInput {
    /// Classify `tokens[start..]`
    pub fn build<S: AsRef<str>>(tokens: &[S], start: usize) -> Self {
        let tokens = tokens.get(start..).unwrap_or(&[]);
        let mut parsed = ParsedInput::default();
        let mut index = 0;

        while let Some(token) = tokens.get(index).map(|t| t.as_ref()) {
            if token.starts_with('-') {
                break;
            }
            parsed.positionals.push(token.to_string());
            index += 1;
        }

        while let Some(token) = tokens.get(index).map(|t| t.as_ref()) {
            index += 1;

            if let Some(option) = token.strip_prefix("--") {
                match option.split_once('=') {
                    Some((name, _)) if name.is_empty() => parsed.ignored.push(token.to_string()),
                    Some((name, value)) => {
                        parsed
                            .options
                            .insert(name.to_string(), Some(value.to_string()));
                    }
                    None if option.is_empty() => parsed.ignored.push(token.to_string()),
                    None => {
                        let value = match tokens.get(index).map(|t| t.as_ref()) {
                            Some(next) if !next.starts_with('-') => {
                                index += 1;
                                Some(next.to_string())
                            }
                            _ => None,
                        };
                        parsed.options.insert(option.to_string(), value);
                    }
                }
            } else if let Some(group) = token.strip_prefix('-') {
                parsed.flags.extend(group.chars());
            } else {
                parsed.ignored.push(token.to_string());
            }
        }

        if !parsed.ignored.is_empty() {
            debug!(ignored = ?parsed.ignored, "tokens after options are not bound");
        }

        parsed
    }

    /// True when nothing at all follows the command name, ignored tokens included
    pub fn is_empty(&self) -> bool {
        self.positionals.is_empty()
            && self.options.is_empty()
            && self.flags.is_empty()
            && self.ignored.is_empty()
    }

    /// `Some(None)` for a bare `--name`, `None` when the option is absent
    pub fn option(&self, name: &str) -> Option<Option<&str>> {
        self.options.get(name).map(|v| v.as_deref())
    }

    pub fn has_flag(&self, identifier: char) -> bool {
        self.flags.contains(&identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;
    use pretty_assertions::assert_eq;

    fn parse(line: &str, start: usize) -> ParsedInput {
        ParsedInput::build(&tokenize(line).unwrap(), start)
    }

    #[test]
    fn test_full_line() {
        let parsed = parse(
            r#"tar  Required\ argument  -x -v --file="File 1.txt" --arg2 "Hello, \"World\"""#,
            1,
        );

        assert_eq!(parsed.positionals, vec!["Required argument"]);
        assert_eq!(parsed.flags, BTreeSet::from(['x', 'v']));
        assert_eq!(
            parsed.options,
            BTreeMap::from([
                ("file".to_string(), Some("File 1.txt".to_string())),
                ("arg2".to_string(), Some("Hello, \"World\"".to_string())),
            ])
        );
        assert!(parsed.ignored.is_empty());
    }

    #[test]
    fn test_flag_group() {
        let parsed = parse("ls -xvz", 1);
        assert_eq!(parsed.flags, BTreeSet::from(['x', 'v', 'z']));
        assert!(parsed.positionals.is_empty());
    }

    #[test]
    fn test_dangling_option() {
        let parsed = parse("cmd --verbose --level 3", 1);
        assert_eq!(parsed.option("verbose"), Some(None));
        assert_eq!(parsed.option("level"), Some(Some("3")));
        assert_eq!(parsed.option("other"), None);
    }

    #[test]
    fn test_option_does_not_swallow_flag() {
        let parsed = parse("cmd --name -x", 1);
        assert_eq!(parsed.option("name"), Some(None));
        assert!(parsed.has_flag('x'));
    }

    #[test]
    fn test_equals_keeps_rest_of_value() {
        let parsed = parse("cmd --expr=a=b", 1);
        assert_eq!(parsed.option("expr"), Some(Some("a=b")));
    }

    #[test]
    fn test_trailing_positionals_are_not_resumed() {
        let parsed = parse("cmd a b -x c d", 1);
        assert_eq!(parsed.positionals, vec!["a", "b"]);
        assert!(parsed.has_flag('x'));
        assert_eq!(parsed.ignored, vec!["c", "d"]);
    }

    #[test]
    fn test_short_flag_never_takes_value() {
        let parsed = parse("test -x 200", 1);
        assert!(parsed.has_flag('x'));
        assert!(parsed.options.is_empty());
        assert_eq!(parsed.ignored, vec!["200"]);
    }

    #[test]
    fn test_empty_option_names_ignored() {
        let parsed = parse("cmd -- --=v", 1);
        assert!(parsed.options.is_empty());
        assert_eq!(parsed.ignored, vec!["--", "--=v"]);
    }

    #[test]
    fn test_ignored_tokens_make_input_non_empty() {
        let parsed = parse("ping -- extra junk", 1);
        assert!(parsed.positionals.is_empty());
        assert!(parsed.options.is_empty());
        assert!(parsed.flags.is_empty());
        assert_eq!(parsed.ignored, vec!["--", "extra", "junk"]);
        assert!(!parsed.is_empty());
    }

    #[test]
    fn test_start_past_end() {
        let parsed = parse("cmd", 1);
        assert!(parsed.is_empty());
        let parsed = ParsedInput::build(&["a"], 5);
        assert_eq!(parsed, ParsedInput::default());
    }

    #[test]
    fn test_last_option_wins() {
        let parsed = parse("cmd --n=1 --n=2", 1);
        assert_eq!(parsed.option("n"), Some(Some("2")));
    }
}
