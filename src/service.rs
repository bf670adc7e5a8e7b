//! Command service: the dispatcher
//!
//! ```text
//! evaluate("config show --all", sender)
//!     │
//!     ├─ tokenize            ["config", "show", "--all"]
//!     ├─ registry.resolve    "config show", 2 tokens consumed
//!     ├─ ParsedInput::build  options {all: None}
//!     ├─ binder::bind        best overload + BoundArgs
//!     └─ invoke handler      Ok / Err / panic  ->  Outcome
//! ```
//!
//! Failures before the handler runs are returned as [`CommandError`].
//! Failures inside the handler are caught, reported once, and returned as
//! [`Outcome::Failed`], so the service stays usable for the next call.

use std::cmp::Ordering;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::anyhow;
use tracing::{debug, warn};

use crate::binder;
use crate::config::ServiceConfig;
use crate::error::{CommandError, CommandExecutionError, RegistrationError};
use crate::help::{render_help, CommandInfo};
use crate::input::ParsedInput;
use crate::parsers::TypeParsers;
use crate::registry::{Command, CommandRegistry, OwnerId};
use crate::schema::{BoundArgs, HandlerSchema};
use crate::sender::Sender;
use crate::tokenizer::tokenize;

/// How the handler invocation ended
#[derive(Debug)]
pub enum Outcome {
    Completed,
    Failed(CommandExecutionError),
}

impl Outcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed)
    }

    pub fn error(&self) -> Option<&CommandExecutionError> {
        match self {
            Outcome::Completed => None,
            Outcome::Failed(err) => Some(err),
        }
    }
}

/// Result of a call that reached a handler
#[derive(Debug)]
pub struct Dispatched {
    pub command: String,
    /// Registration index of the overload that ran
    pub overload: usize,
    pub score: f64,
    pub outcome: Outcome,
}

/// Registry, parsers and configuration behind `evaluate`
///
/// Not `Sync`: registration and evaluation on one instance must be serialized
/// by the caller.
pub struct CommandService {
    registry: CommandRegistry,
    parsers: Arc<TypeParsers>,
    config: ServiceConfig,
}

impl Default for CommandService {
    fn default() -> Self {
        Self::new(Arc::new(TypeParsers::with_defaults()))
    }
}

impl CommandService {
    pub fn new(parsers: Arc<TypeParsers>) -> Self {
        Self::with_config(parsers, ServiceConfig::default())
    }

    pub fn with_config(parsers: Arc<TypeParsers>, config: ServiceConfig) -> Self {
        Self {
            registry: CommandRegistry::new(),
            parsers,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn parsers(&self) -> &Arc<TypeParsers> {
        &self.parsers
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    // ========================================================================
    // REGISTRATION
    // ========================================================================

    /// Register overloads on behalf of `owner`; returns how many were added
    pub fn register(
        &mut self,
        owner: impl Into<OwnerId>,
        schemas: Vec<HandlerSchema>,
    ) -> Result<usize, RegistrationError> {
        let owner = owner.into();
        let parsers = self.config.strict_type_checks.then_some(&*self.parsers);
        self.registry.register(&owner, schemas, parsers).map_err(|err| {
            warn!(%owner, error = %err, "registration rejected");
            err
        })
    }

    /// Remove everything `owner` registered; returns how many overloads were removed
    pub fn deregister(&mut self, owner: impl Into<OwnerId>) -> usize {
        self.registry.deregister(&owner.into())
    }

    // ========================================================================
    // EVALUATION
    // ========================================================================

    /// Parse `input`, pick an overload and run it
    pub fn evaluate(&self, input: &str, sender: &dyn Sender) -> Result<Dispatched, CommandError> {
        let result = self.dispatch(input, sender);
        if let Err(err) = &result {
            debug!(input, error = %err, "evaluation failed");
            self.report(sender, &err.to_string());
        }
        result
    }

    fn dispatch(&self, input: &str, sender: &dyn Sender) -> Result<Dispatched, CommandError> {
        let tokens = tokenize(input)?;

        let (command, consumed) =
            self.registry
                .resolve(&tokens)
                .ok_or_else(|| CommandError::UnknownCommand {
                    input: tokens.first().cloned().unwrap_or_default(),
                    suggestions: self.did_you_mean(&tokens),
                })?;

        let parsed = ParsedInput::build(&tokens, consumed);
        debug!(command = command.name(), consumed, ?parsed, "resolved command");

        let binding = binder::bind(command.name(), command.overloads(), &parsed, &self.parsers)?;
        debug!(
            command = command.name(),
            overload = binding.index,
            score = binding.score,
            "invoking handler"
        );

        let outcome = match self.invoke(binding.schema, sender, &binding.args) {
            Ok(()) => Outcome::Completed,
            Err(source) => {
                let err = CommandExecutionError {
                    command: command.name().to_string(),
                    source,
                };
                warn!(command = command.name(), error = %err.source, "handler failed");
                self.report(sender, &err.to_string());
                Outcome::Failed(err)
            }
        };

        Ok(Dispatched {
            command: command.name().to_string(),
            overload: binding.index,
            score: binding.score,
            outcome,
        })
    }

    fn invoke(
        &self,
        schema: &HandlerSchema,
        sender: &dyn Sender,
        args: &BoundArgs,
    ) -> anyhow::Result<()> {
        if !self.config.catch_panics {
            return schema.invoke(sender, args);
        }

        panic::catch_unwind(AssertUnwindSafe(|| schema.invoke(sender, args)))
            .unwrap_or_else(|payload| Err(anyhow!("handler panicked: {}", panic_message(&*payload))))
    }

    fn report(&self, sender: &dyn Sender, message: &str) {
        if self.config.report_to_sender {
            sender.send_message(message);
        }
    }

    /// Registered names closest to the front of `tokens`
    ///
    /// Each name is compared against as many leading tokens as it has words.
    fn did_you_mean(&self, tokens: &[String]) -> Vec<String> {
        if self.config.max_suggestions == 0 {
            return Vec::new();
        }

        let mut scored: Vec<(f64, &str)> = self
            .registry
            .names()
            .into_iter()
            .filter_map(|name| {
                let words = name.split(' ').count();
                let candidate = tokens
                    .iter()
                    .take(words)
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(" ");
                let similarity = strsim::jaro_winkler(&candidate, name);
                (similarity >= self.config.suggestion_threshold).then_some((similarity, name))
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        scored
            .into_iter()
            .take(self.config.max_suggestions)
            .map(|(_, name)| name.to_string())
            .collect()
    }

    // ========================================================================
    // INTROSPECTION
    // ========================================================================

    /// Every command, in name order of the trie
    pub fn commands(&self) -> Vec<&Command> {
        self.registry.commands()
    }

    pub fn commands_where<P>(&self, predicate: P) -> Vec<&Command>
    where
        P: FnMut(&Command) -> bool,
    {
        self.registry.commands_where(predicate)
    }

    /// Commands whose name starts with `prefix`
    pub fn suggestions(&self, prefix: &str) -> Vec<&Command> {
        self.registry.suggestions(prefix)
    }

    pub fn describe(&self) -> Vec<CommandInfo> {
        self.registry.commands().into_iter().map(CommandInfo::from).collect()
    }

    /// Rendered help for `name`, if it is registered
    pub fn help(&self, name: &str) -> Option<String> {
        self.registry.get(name).map(render_help)
    }
}

impl std::fmt::Debug for CommandService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandService")
            .field("commands", &self.registry.names())
            .field("parsers", &self.parsers)
            .field("config", &self.config)
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
