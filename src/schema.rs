//! Handler schemas: one overload of a command
//!
//! A schema is the parameter shape of an overload plus the closure that runs
//! it. Schemas are assembled with [`HandlerSchemaBuilder`], which validates the
//! shape up front so registration never has to deal with a malformed one.
//!
//! ```text
//! HandlerSchema::builder("greet")
//!     .context()                       -> Context      (the sender)
//!     .positional("name", String)      -> Positional   (required, in order)
//!     .option("times", "t", I32)       -> Option       (--times / --t, zero value if absent)
//!     .flag('l', "loud")               -> Flag         (-l)
//!     .handler(|sender, args| ..)
//!     .build()?
//! ```

use std::cell::Cell;
use std::collections::HashSet;
use std::fmt;

use cmdroute_types::{ArgType, FromValue, Value};
use serde::Serialize;

use crate::error::{ArgumentError, RegistrationError};
use crate::sender::Sender;

/// The callable stored in a schema
pub type HandlerFn = Box<dyn Fn(&dyn Sender, &BoundArgs) -> anyhow::Result<()>>;

// ============================================================================
// PARAMETERS
// ============================================================================

/// One declared parameter of an overload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParameterSpec {
    /// The sender, injected by the dispatcher
    Context,
    Positional {
        name: String,
        ty: ArgType,
    },
    Option {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        short_name: Option<String>,
        ty: ArgType,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Flag {
        identifier: char,
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

impl ParameterSpec {
    /// Name the bound value is stored under; `None` for the context
    pub fn name(&self) -> Option<&str> {
        match self {
            ParameterSpec::Context => None,
            ParameterSpec::Positional { name, .. }
            | ParameterSpec::Option { name, .. }
            | ParameterSpec::Flag { name, .. } => Some(name),
        }
    }

    /// Type that must have a registered parser; flags and the context need none
    pub fn parsed_type(&self) -> Option<&ArgType> {
        match self {
            ParameterSpec::Positional { ty, .. } | ParameterSpec::Option { ty, .. } => Some(ty),
            ParameterSpec::Context | ParameterSpec::Flag { .. } => None,
        }
    }

    pub fn is_positional(&self) -> bool {
        matches!(self, ParameterSpec::Positional { .. })
    }

    fn usage_fragment(&self) -> Option<String> {
        match self {
            ParameterSpec::Context => None,
            ParameterSpec::Positional { name, .. } => Some(format!("<{}>", name)),
            ParameterSpec::Option {
                name,
                short_name,
                ty,
                ..
            } => Some(match short_name {
                Some(short) => format!("[--{}|--{} <{}>]", name, short, ty.friendly_name()),
                None => format!("[--{} <{}>]", name, ty.friendly_name()),
            }),
            ParameterSpec::Flag { identifier, .. } => Some(format!("[-{}]", identifier)),
        }
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

/// One overload of a command
pub struct HandlerSchema {
    name: String,
    parameters: Vec<ParameterSpec>,
    description: Option<String>,
    syntax: Option<String>,
    help_text: Option<String>,
    handler: HandlerFn,
    disabled: Cell<bool>,
}

impl HandlerSchema {
    pub fn builder(name: impl Into<String>) -> HandlerSchemaBuilder {
        HandlerSchemaBuilder::new(name)
    }

    /// Command name this overload is registered under
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn syntax(&self) -> Option<&str> {
        self.syntax.as_deref()
    }

    pub fn help_text(&self) -> Option<&str> {
        self.help_text.as_deref()
    }

    pub fn positional_count(&self) -> usize {
        self.parameters.iter().filter(|p| p.is_positional()).count()
    }

    /// Every type the binder will need a parser for
    pub fn declared_types(&self) -> impl Iterator<Item = &ArgType> {
        self.parameters.iter().filter_map(ParameterSpec::parsed_type)
    }

    /// Usage line: the explicit syntax if one was given, otherwise generated
    pub fn usage(&self) -> String {
        if let Some(syntax) = &self.syntax {
            return syntax.clone();
        }
        std::iter::once(self.name.clone())
            .chain(self.parameters.iter().filter_map(ParameterSpec::usage_fragment))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// A schema is disabled once binding finds one of its types has no parser
    pub fn is_disabled(&self) -> bool {
        self.disabled.get()
    }

    pub(crate) fn disable(&self) {
        self.disabled.set(true);
    }

    pub(crate) fn invoke(&self, sender: &dyn Sender, args: &BoundArgs) -> anyhow::Result<()> {
        (self.handler)(sender, args)
    }
}

impl fmt::Debug for HandlerSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerSchema")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("disabled", &self.disabled.get())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Assembles and validates a [`HandlerSchema`]
pub struct HandlerSchemaBuilder {
    name: String,
    parameters: Vec<ParameterSpec>,
    description: Option<String>,
    syntax: Option<String>,
    help_text: Option<String>,
    handler: Option<HandlerFn>,
}

impl HandlerSchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            description: None,
            syntax: None,
            help_text: None,
            handler: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Usage line shown in help instead of the generated one
    pub fn syntax(mut self, syntax: impl Into<String>) -> Self {
        self.syntax = Some(syntax.into());
        self
    }

    pub fn help_text(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = Some(help_text.into());
        self
    }

    pub fn context(mut self) -> Self {
        self.parameters.push(ParameterSpec::Context);
        self
    }

    pub fn positional(mut self, name: impl Into<String>, ty: ArgType) -> Self {
        self.parameters.push(ParameterSpec::Positional {
            name: name.into(),
            ty,
        });
        self
    }

    /// Optional named parameter; pass an empty `short_name` for none
    pub fn option(self, name: impl Into<String>, short_name: &str, ty: ArgType) -> Self {
        self.push_option(name.into(), short_name, ty, None)
    }

    pub fn option_with_description(
        self,
        name: impl Into<String>,
        short_name: &str,
        ty: ArgType,
        description: impl Into<String>,
    ) -> Self {
        self.push_option(name.into(), short_name, ty, Some(description.into()))
    }

    pub fn flag(mut self, identifier: char, name: impl Into<String>) -> Self {
        self.parameters.push(ParameterSpec::Flag {
            identifier,
            name: name.into(),
            description: None,
        });
        self
    }

    pub fn flag_with_description(
        mut self,
        identifier: char,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.parameters.push(ParameterSpec::Flag {
            identifier,
            name: name.into(),
            description: Some(description.into()),
        });
        self
    }

    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&dyn Sender, &BoundArgs) -> anyhow::Result<()> + 'static,
    {
        self.handler = Some(Box::new(handler));
        self
    }

    fn push_option(
        mut self,
        name: String,
        short_name: &str,
        ty: ArgType,
        description: Option<String>,
    ) -> Self {
        let short_name = (!short_name.is_empty()).then(|| short_name.to_string());
        self.parameters.push(ParameterSpec::Option {
            name,
            short_name,
            ty,
            description,
        });
        self
    }

    /// Validate and produce the schema
    pub fn build(self) -> Result<HandlerSchema, RegistrationError> {
        validate_command_name(&self.name)?;
        self.validate_parameters()?;

        let handler = self.handler.ok_or_else(|| RegistrationError::MissingHandler {
            command: self.name.clone(),
        })?;

        Ok(HandlerSchema {
            name: self.name,
            parameters: self.parameters,
            description: self.description,
            syntax: self.syntax,
            help_text: self.help_text,
            handler,
            disabled: Cell::new(false),
        })
    }

    fn validate_parameters(&self) -> Result<(), RegistrationError> {
        let mut seen_named = false;
        let mut names = HashSet::new();
        let mut option_names = HashSet::new();
        let mut identifiers = HashSet::new();

        for parameter in &self.parameters {
            if let Some(name) = parameter.name() {
                if !names.insert(name) {
                    return Err(self.duplicate(name));
                }
            }

            match parameter {
                ParameterSpec::Context => {}
                ParameterSpec::Positional { name, .. } => {
                    if seen_named {
                        return Err(RegistrationError::ParameterOrder {
                            command: self.name.clone(),
                            parameter: name.clone(),
                        });
                    }
                }
                ParameterSpec::Option {
                    name, short_name, ..
                } => {
                    seen_named = true;
                    for key in std::iter::once(name).chain(short_name.iter()) {
                        if key.is_empty() || !option_names.insert(key.as_str()) {
                            return Err(self.duplicate(key));
                        }
                    }
                }
                ParameterSpec::Flag { identifier, .. } => {
                    seen_named = true;
                    if !identifier.is_alphabetic() {
                        return Err(RegistrationError::InvalidFlag {
                            command: self.name.clone(),
                            identifier: *identifier,
                        });
                    }
                    if !identifiers.insert(*identifier) {
                        return Err(self.duplicate(&identifier.to_string()));
                    }
                }
            }
        }

        Ok(())
    }

    fn duplicate(&self, name: &str) -> RegistrationError {
        RegistrationError::DuplicateParameter {
            command: self.name.clone(),
            name: name.to_string(),
        }
    }
}

/// Command names are words joined by single spaces
pub(crate) fn validate_command_name(name: &str) -> Result<(), RegistrationError> {
    let invalid = |reason: &str| RegistrationError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.chars().any(|c| c.is_whitespace() && c != ' ') {
        return Err(invalid("words must be separated by single spaces"));
    }
    if name.split(' ').any(str::is_empty) {
        return Err(invalid("name has leading, trailing or repeated spaces"));
    }
    Ok(())
}

// ============================================================================
// BOUND ARGUMENTS
// ============================================================================

/// One bound parameter, in declaration order
#[derive(Debug, Clone, PartialEq)]
pub enum BoundArg {
    Context,
    Named { name: String, value: Value },
}

/// Arguments produced by the binder for one invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArgs {
    args: Vec<BoundArg>,
}

impl BoundArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_context(&mut self) {
        self.args.push(BoundArg::Context);
    }

    pub(crate) fn push(&mut self, name: impl Into<String>, value: Value) {
        self.args.push(BoundArg::Named {
            name: name.into(),
            value,
        });
    }

    /// Raw bound value
    pub fn value(&self, name: &str) -> Result<&Value, ArgumentError> {
        self.args
            .iter()
            .find_map(|arg| match arg {
                BoundArg::Named { name: n, value } if n == name => Some(value),
                _ => None,
            })
            .ok_or_else(|| ArgumentError::Missing(name.to_string()))
    }

    /// Typed bound value
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T, ArgumentError> {
        let value = self.value(name)?;
        T::from_value(value).ok_or_else(|| ArgumentError::TypeMismatch {
            name: name.to_string(),
            expected: T::expected().to_string(),
            actual: value.kind().to_string(),
        })
    }

    /// Flag state by parameter name
    pub fn flag(&self, name: &str) -> Result<bool, ArgumentError> {
        self.get::<bool>(name)
    }

    /// Payload of a custom-typed argument; `None` if it was left at its zero value
    pub fn custom<T>(&self, name: &str) -> Result<Option<std::sync::Arc<T>>, ArgumentError>
    where
        T: std::any::Any + Send + Sync,
    {
        let mismatch = |actual: &str| ArgumentError::TypeMismatch {
            name: name.to_string(),
            expected: std::any::type_name::<T>().to_string(),
            actual: actual.to_string(),
        };

        match self.value(name)? {
            Value::None => Ok(None),
            Value::Custom(custom) => custom.downcast::<T>().map(Some).ok_or_else(|| mismatch("custom")),
            other => Err(mismatch(other.kind())),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoundArg> {
        self.args.iter()
    }

    /// Named values only, in declaration order
    pub fn named(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.args.iter().filter_map(|arg| match arg {
            BoundArg::Named { name, value } => Some((name.as_str(), value)),
            BoundArg::Context => None,
        })
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}
