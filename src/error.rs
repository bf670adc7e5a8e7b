//! Error types for command routing
//!
//! One enum per concern, following the layering of the pipeline:
//! registration problems are reported synchronously by `register`, evaluation
//! problems by `evaluate`, and handler failures are wrapped so they never
//! escape the dispatcher.

use cmdroute_types::{ArgType, TypeParseError};
use thiserror::Error;

/// Failure of a single `evaluate` call before a handler runs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("input is empty")]
    EmptyInput,

    #[error("unknown command '{input}'{}", did_you_mean(.suggestions))]
    UnknownCommand {
        input: String,
        suggestions: Vec<String>,
    },

    #[error("no overload of '{command}' accepts these arguments{}", list_rejections(.rejections))]
    NoEligibleOverload {
        command: String,
        rejections: Vec<OverloadRejection>,
    },
}

/// A handler body returned an error or panicked
#[derive(Error, Debug)]
#[error("command '{command}' failed: {source}")]
pub struct CommandExecutionError {
    pub command: String,
    #[source]
    pub source: anyhow::Error,
}

/// Schema construction or registration was rejected; registry state is unchanged
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("invalid command name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("positional parameter '{parameter}' of '{command}' is declared after an option or flag")]
    ParameterOrder { command: String, parameter: String },

    #[error("flag identifier '{identifier}' of '{command}' must be a single alphabetic character")]
    InvalidFlag { command: String, identifier: char },

    #[error("'{command}' declares '{name}' more than once")]
    DuplicateParameter { command: String, name: String },

    #[error("no handler was supplied for '{command}'")]
    MissingHandler { command: String },

    #[error("command '{name}' is already registered by '{owner}'")]
    NameClaimed { name: String, owner: String },

    #[error("'{command}' uses type '{ty}' which has no registered parser")]
    MissingTypeParser { command: String, ty: ArgType },
}

/// A handler asked for an argument that was not bound, or asked for the wrong type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("no argument named '{0}'")]
    Missing(String),

    #[error("argument '{name}' holds a {actual}, not a {expected}")]
    TypeMismatch {
        name: String,
        expected: String,
        actual: String,
    },
}

/// Converting argument text through the parser registry failed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("missing type parser for type '{0}'")]
    MissingTypeParser(ArgType),

    #[error(transparent)]
    Invalid(#[from] TypeParseError),
}

/// Why the binder disqualified one overload
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Rejection {
    #[error("expected {expected} argument(s), got {supplied}")]
    TooFewArguments { expected: usize, supplied: usize },

    #[error("expected {expected} argument(s), got {supplied}")]
    TooManyArguments { expected: usize, supplied: usize },

    #[error("takes no arguments")]
    UnexpectedInput,

    #[error("missing type parser for type '{0}'")]
    MissingTypeParser(ArgType),

    #[error("invalid value for '{parameter}': {source}")]
    InvalidValue {
        parameter: String,
        source: TypeParseError,
    },

    #[error("disabled after an earlier missing type parser")]
    Disabled,
}

/// A rejected overload, identified by registration index and usage line
#[derive(Debug, Clone, PartialEq)]
pub struct OverloadRejection {
    pub index: usize,
    pub usage: String,
    pub reason: Rejection,
}

fn did_you_mean(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        return String::new();
    }
    let quoted: Vec<String> = suggestions.iter().map(|s| format!("'{}'", s)).collect();
    format!("; did you mean {}?", quoted.join(", "))
}

fn list_rejections(rejections: &[OverloadRejection]) -> String {
    rejections
        .iter()
        .map(|r| format!("\n  {}: {}", r.usage, r.reason))
        .collect()
}
