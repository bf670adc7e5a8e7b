//! Handler registry
//!
//! Commands are stored in a [`CommandTrie`] keyed by their full name. Each
//! command belongs to exactly one owner and keeps its overloads in
//! registration order, which the binder relies on for tie-breaking.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::RegistrationError;
use crate::parsers::TypeParsers;
use crate::schema::HandlerSchema;
use crate::trie::CommandTrie;

/// Identifies whoever registered a group of commands
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for OwnerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A named command and its overloads
#[derive(Debug)]
pub struct Command {
    name: String,
    owner: OwnerId,
    overloads: Vec<HandlerSchema>,
}

impl Command {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    /// Overloads in registration order
    pub fn overloads(&self) -> &[HandlerSchema] {
        &self.overloads
    }

    /// Number of words in the name
    pub fn word_count(&self) -> usize {
        self.name.split(' ').count()
    }
}

/// All registered commands
#[derive(Debug, Default)]
pub struct CommandRegistry {
    trie: CommandTrie<Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `schemas` on behalf of `owner`
    ///
    /// The whole batch is checked first; on error nothing is inserted. When
    /// `parsers` is given, every declared type must have a parser in it.
    pub fn register(
        &mut self,
        owner: &OwnerId,
        schemas: Vec<HandlerSchema>,
        parsers: Option<&TypeParsers>,
    ) -> Result<usize, RegistrationError> {
        for schema in &schemas {
            self.check(owner, schema, parsers)?;
        }

        let count = schemas.len();
        for schema in schemas {
            let name = schema.name().to_string();
            match self.trie.get_mut(&name) {
                Some(command) => command.overloads.push(schema),
                None => {
                    debug!(command = %name, %owner, "new command");
                    self.trie.insert(
                        name.clone(),
                        Command {
                            name,
                            owner: owner.clone(),
                            overloads: vec![schema],
                        },
                    );
                }
            }
        }

        info!(%owner, overloads = count, "registered handlers");
        Ok(count)
    }

    fn check(
        &self,
        owner: &OwnerId,
        schema: &HandlerSchema,
        parsers: Option<&TypeParsers>,
    ) -> Result<(), RegistrationError> {
        if let Some(existing) = self.trie.get(schema.name()) {
            if existing.owner != *owner {
                return Err(RegistrationError::NameClaimed {
                    name: schema.name().to_string(),
                    owner: existing.owner.to_string(),
                });
            }
        }

        if let Some(parsers) = parsers {
            if let Some(ty) = schema.declared_types().find(|ty| !parsers.contains(ty)) {
                return Err(RegistrationError::MissingTypeParser {
                    command: schema.name().to_string(),
                    ty: ty.clone(),
                });
            }
        }

        Ok(())
    }

    /// Remove every command `owner` registered; returns the number of overloads removed
    pub fn deregister(&mut self, owner: &OwnerId) -> usize {
        let names: Vec<String> = self
            .trie
            .values()
            .into_iter()
            .filter(|c| c.owner == *owner)
            .map(|c| c.name.clone())
            .collect();

        let removed: usize = names
            .iter()
            .filter_map(|name| self.trie.remove(name))
            .map(|command| command.overloads.len())
            .sum();

        if removed > 0 {
            info!(%owner, commands = names.len(), overloads = removed, "deregistered handlers");
        }
        removed
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.trie.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.trie.contains(name)
    }

    /// Longest registered command at the front of `tokens`
    pub fn resolve<S: AsRef<str>>(&self, tokens: &[S]) -> Option<(&Command, usize)> {
        self.trie.resolve_prefix(tokens)
    }

    /// Every command, in trie pre-order
    pub fn commands(&self) -> Vec<&Command> {
        self.trie.values()
    }

    pub fn commands_where<P>(&self, mut predicate: P) -> Vec<&Command>
    where
        P: FnMut(&Command) -> bool,
    {
        self.trie
            .values()
            .into_iter()
            .filter(|c| predicate(c))
            .collect()
    }

    /// Commands whose name starts with `prefix`
    pub fn suggestions(&self, prefix: &str) -> Vec<&Command> {
        self.trie.suggestions(prefix)
    }

    pub fn names(&self) -> Vec<&str> {
        self.trie.entries().into_iter().map(|(name, _)| name).collect()
    }

    /// Number of commands (not overloads)
    pub fn len(&self) -> usize {
        self.trie.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trie.is_empty()
    }
}
