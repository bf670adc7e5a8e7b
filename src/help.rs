//! Command descriptions for help output and tooling

use serde::Serialize;

use crate::registry::{Command, OwnerId};
use crate::schema::{HandlerSchema, ParameterSpec};

/// Serializable description of one command
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandInfo {
    pub name: String,
    pub owner: OwnerId,
    pub overloads: Vec<OverloadInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverloadInfo {
    pub usage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    pub parameters: Vec<ParameterSpec>,
}

impl From<&HandlerSchema> for OverloadInfo {
    fn from(schema: &HandlerSchema) -> Self {
        Self {
            usage: schema.usage(),
            description: schema.description().map(str::to_string),
            help_text: schema.help_text().map(str::to_string),
            parameters: schema.parameters().to_vec(),
        }
    }
}

impl From<&Command> for CommandInfo {
    fn from(command: &Command) -> Self {
        Self {
            name: command.name().to_string(),
            owner: command.owner().clone(),
            overloads: command.overloads().iter().map(OverloadInfo::from).collect(),
        }
    }
}

/// Full help for one command: every overload with its options and flags
pub fn render_help(command: &Command) -> String {
    let mut out = String::new();
    for schema in command.overloads() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("Usage: {}\n", schema.usage()));
        if let Some(description) = schema.description() {
            out.push_str(&format!("  {}\n", description));
        }
        if let Some(help_text) = schema.help_text() {
            for line in help_text.lines() {
                out.push_str(&format!("  {}\n", line));
            }
        }
        for parameter in schema.parameters() {
            match parameter {
                ParameterSpec::Option {
                    name,
                    short_name,
                    ty,
                    description,
                } => {
                    let names = match short_name {
                        Some(short) => format!("--{}, --{}", name, short),
                        None => format!("--{}", name),
                    };
                    out.push_str(&format!("    {:<20} {}", names, ty.friendly_name()));
                    if let Some(description) = description {
                        out.push_str(&format!("  {}", description));
                    }
                    out.push('\n');
                }
                ParameterSpec::Flag {
                    identifier,
                    name,
                    description,
                } => {
                    out.push_str(&format!(
                        "    {:<20} {}",
                        format!("-{}", identifier),
                        description.as_deref().unwrap_or(name)
                    ));
                    out.push('\n');
                }
                ParameterSpec::Context | ParameterSpec::Positional { .. } => {}
            }
        }
    }
    out
}

/// One line per command: name and the first description found
pub fn render_listing(commands: &[&Command]) -> String {
    let width = commands.iter().map(|c| c.name().len()).max().unwrap_or(0);
    commands
        .iter()
        .map(|command| {
            let description = command
                .overloads()
                .iter()
                .find_map(HandlerSchema::description)
                .unwrap_or("");
            format!("{:<width$}  {}", command.name(), description, width = width)
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CommandRegistry;
    use crate::schema::BoundArgs;
    use crate::sender::Sender;
    use cmdroute_types::ArgType;
    use pretty_assertions::assert_eq;

    fn noop(_: &dyn Sender, _: &BoundArgs) -> anyhow::Result<()> {
        Ok(())
    }

    fn registry() -> CommandRegistry {
        let mut registry = CommandRegistry::new();
        registry
            .register(
                &"core".into(),
                vec![
                    HandlerSchema::builder("greet")
                        .description("Say hello")
                        .positional("name", ArgType::String)
                        .option_with_description("times", "t", ArgType::I32, "repeat count")
                        .flag('l', "loud")
                        .handler(noop)
                        .build()
                        .unwrap(),
                    HandlerSchema::builder("quit").handler(noop).build().unwrap(),
                ],
                None,
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_render_help() {
        let registry = registry();
        let help = render_help(registry.get("greet").unwrap());
        assert_eq!(
            help,
            "Usage: greet <name> [--times|--t <integer>] [-l]\n  Say hello\n    --times, --t         integer  repeat count\n    -l                   loud\n"
        );
    }

    #[test]
    fn test_render_listing() {
        let registry = registry();
        assert_eq!(render_listing(&registry.commands()), "greet  Say hello\nquit");
    }

    #[test]
    fn test_command_info_serializes() {
        let registry = registry();
        let info = CommandInfo::from(registry.get("quit").unwrap());
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "quit",
                "owner": "core",
                "overloads": [{ "usage": "quit", "parameters": [] }]
            })
        );
    }
}
