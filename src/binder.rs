//! Overload resolution
//!
//! Every overload of the resolved command is bound independently against the
//! parsed input and scored:
//!
//! ```text
//!              positional parameters bound
//!   score  =  -----------------------------      (-1 when disqualified)
//!               total parameter count
//! ```
//!
//! The overload with the strictly highest score wins, so among equal scores
//! the first registered one is kept. A zero-parameter overload given empty
//! input is chosen immediately without scoring.

use cmdroute_types::{ArgType, Value};
use tracing::{debug, warn};

use crate::error::{CommandError, ConversionError, OverloadRejection, Rejection};
use crate::input::ParsedInput;
use crate::parsers::TypeParsers;
use crate::schema::{BoundArgs, HandlerSchema, ParameterSpec};

/// The selected overload and the arguments bound for it
#[derive(Debug)]
pub struct Binding<'a> {
    pub schema: &'a HandlerSchema,
    /// Registration index among the command's overloads
    pub index: usize,
    pub args: BoundArgs,
    pub score: f64,
}

/// Pick the best overload of `command` for `parsed`
pub fn bind<'a>(
    command: &str,
    schemas: &'a [HandlerSchema],
    parsed: &ParsedInput,
    parsers: &TypeParsers,
) -> Result<Binding<'a>, CommandError> {
    let mut best: Option<Binding<'a>> = None;
    let mut rejections = Vec::new();

    for (index, schema) in schemas.iter().enumerate() {
        if schema.parameters().is_empty() && parsed.is_empty() {
            debug!(command, index, "zero-parameter overload matches empty input");
            return Ok(Binding {
                schema,
                index,
                args: BoundArgs::new(),
                score: 1.0,
            });
        }

        match bind_schema(schema, parsed, parsers) {
            Ok((args, score)) => {
                debug!(command, index, score, "overload qualifies");
                let better = best.as_ref().map_or(true, |b| score > b.score);
                if better {
                    best = Some(Binding {
                        schema,
                        index,
                        args,
                        score,
                    });
                }
            }
            Err(reason) => {
                debug!(command, index, %reason, "overload rejected");
                rejections.push(OverloadRejection {
                    index,
                    usage: schema.usage(),
                    reason,
                });
            }
        }
    }

    best.ok_or_else(|| CommandError::NoEligibleOverload {
        command: command.to_string(),
        rejections,
    })
}

/// Bind one overload, returning its arguments and score
fn bind_schema(
    schema: &HandlerSchema,
    parsed: &ParsedInput,
    parsers: &TypeParsers,
) -> Result<(BoundArgs, f64), Rejection> {
    if schema.is_disabled() {
        return Err(Rejection::Disabled);
    }

    let parameters = schema.parameters();
    if parameters.is_empty() {
        return Err(Rejection::UnexpectedInput);
    }

    let expected = schema.positional_count();
    let supplied = parsed.positionals.len();
    let mut positionals = parsed.positionals.iter();
    let mut args = BoundArgs::new();
    let mut bound_positionals = 0usize;

    for parameter in parameters {
        match parameter {
            ParameterSpec::Context => args.push_context(),

            ParameterSpec::Positional { name, ty } => {
                let text = positionals
                    .next()
                    .ok_or(Rejection::TooFewArguments { expected, supplied })?;
                let value = convert(schema, name, ty, text, parsers)?;
                args.push(name.clone(), value);
                bound_positionals += 1;
            }

            ParameterSpec::Option {
                name,
                short_name,
                ty,
                ..
            } => {
                let entry = parsed
                    .option(name)
                    .or_else(|| short_name.as_deref().and_then(|s| parsed.option(s)));
                let value = match entry {
                    Some(Some(text)) => convert(schema, name, ty, text, parsers)?,
                    Some(None) | None => ty.zero_value(),
                };
                args.push(name.clone(), value);
            }

            ParameterSpec::Flag {
                identifier, name, ..
            } => {
                args.push(name.clone(), parsed.has_flag(*identifier).into());
            }
        }
    }

    if positionals.next().is_some() {
        return Err(Rejection::TooManyArguments { expected, supplied });
    }

    Ok((args, bound_positionals as f64 / parameters.len() as f64))
}

fn convert(
    schema: &HandlerSchema,
    parameter: &str,
    ty: &ArgType,
    text: &str,
    parsers: &TypeParsers,
) -> Result<Value, Rejection> {
    parsers.parse(ty, text).map_err(|err| match err {
        ConversionError::MissingTypeParser(ty) => {
            warn!(command = schema.name(), %ty, "missing type parser; overload disabled");
            schema.disable();
            Rejection::MissingTypeParser(ty)
        }
        ConversionError::Invalid(source) => Rejection::InvalidValue {
            parameter: parameter.to_string(),
            source,
        },
    })
}
