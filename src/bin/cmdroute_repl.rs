//! Interactive command shell
//!
//! Registers a small demo command set and evaluates lines read from the
//! terminal (or a single `--command`).
//!
//! Usage:
//!   cargo run --features cli --bin cmdroute_repl
//!   cargo run --features cli --bin cmdroute_repl -- --command "add 2 40"
//!   cargo run --features cli --bin cmdroute_repl -- --describe
//!   CMDROUTE_CONFIG=cmdroute.yaml cargo run --features cli --bin cmdroute_repl -- -v

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cmdroute::help::render_listing;
use cmdroute::{
    ArgType, BoundArgs, CommandService, CommandTrie, ConfigLoader, ConsoleSender, HandlerSchema,
    RegistrationError, Sender, ServiceConfig, TypeParsers,
};

/// Interactive shell over the cmdroute dispatcher
#[derive(Parser, Debug)]
#[command(name = "cmdroute_repl")]
#[command(about = "Evaluate shell-like commands against a demo command set")]
struct Args {
    /// YAML service config (defaults to $CMDROUTE_CONFIG, then built-in defaults)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Evaluate one command and exit
    #[arg(long)]
    command: Option<String>,

    /// Print the registered commands as JSON and exit
    #[arg(long)]
    describe: bool,
}

/// Listing, help text and command names captured after registration
#[derive(Default)]
struct Catalog {
    listing: String,
    entries: Vec<(String, String)>,
    names: CommandTrie<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let loader = match args.config {
        Some(path) => ConfigLoader::new(path),
        None => ConfigLoader::from_env(),
    };
    let config = loader.load().context("Failed to load service config")?;

    let catalog = Rc::new(RefCell::new(Catalog::default()));
    let mut service =
        CommandService::with_config(Arc::new(TypeParsers::with_defaults()), config.clone());
    service.register("demo", demo_commands(&config, &catalog)?)?;

    {
        let mut catalog = catalog.borrow_mut();
        catalog.listing = render_listing(&service.commands());
        catalog.entries = service
            .commands()
            .iter()
            .filter_map(|c| service.help(c.name()).map(|h| (c.name().to_string(), h)))
            .collect();
        for command in service.suggestions("") {
            catalog.names.insert(command.name(), command.name().to_string());
        }
    }

    if args.describe {
        let json = serde_json::to_string_pretty(&service.describe())
            .context("Failed to serialize command descriptions")?;
        println!("{}", json);
        return Ok(());
    }

    let sender = ConsoleSender;

    if let Some(line) = args.command {
        let failed = match service.evaluate(&line, &sender) {
            Ok(dispatched) => !dispatched.outcome.is_completed(),
            Err(_) => true,
        };
        if failed {
            std::process::exit(1);
        }
        return Ok(());
    }

    run_repl(&service, &sender)
}

fn run_repl(service: &CommandService, sender: &ConsoleSender) -> Result<()> {
    let mut editor = DefaultEditor::new().context("Failed to initialise line editor")?;
    println!("{}", "cmdroute shell - type 'help' for commands, Ctrl-D to exit".bold());

    loop {
        match editor.readline(&format!("{} ", ">".cyan())) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                if let Err(err) = editor.add_history_entry(line.as_str()) {
                    debug!(%err, "history entry not recorded");
                }
                match service.evaluate(&line, sender) {
                    Ok(dispatched) => {
                        if let Some(err) = dispatched.outcome.error() {
                            eprintln!("{}", format!("{:#}", err.source).red());
                        }
                    }
                    Err(err) => eprintln!("{}", err.to_string().yellow()),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err).context("Failed to read input"),
        }
    }

    Ok(())
}

fn demo_commands(
    config: &ServiceConfig,
    catalog: &Rc<RefCell<Catalog>>,
) -> Result<Vec<HandlerSchema>, RegistrationError> {
    let rendered_config = serde_yaml::to_string(config).unwrap_or_default();
    let listing = Rc::clone(catalog);
    let details = Rc::clone(catalog);
    let prefixes = Rc::clone(catalog);
    let subcommands = Rc::clone(catalog);

    Ok(vec![
        HandlerSchema::builder("echo")
            .description("Print the argument back")
            .context()
            .positional("text", ArgType::String)
            .flag_with_description('u', "upper", "convert to upper case")
            .handler(|sender: &dyn Sender, args: &BoundArgs| {
                let text: String = args.get("text")?;
                if args.flag("upper")? {
                    sender.send_message(&text.to_uppercase());
                } else {
                    sender.send_message(&text);
                }
                Ok(())
            })
            .build()?,
        HandlerSchema::builder("add")
            .description("Add two integers")
            .positional("a", ArgType::I64)
            .positional("b", ArgType::I64)
            .handler(|sender: &dyn Sender, args: &BoundArgs| {
                let a: i64 = args.get("a")?;
                let b: i64 = args.get("b")?;
                let sum = a
                    .checked_add(b)
                    .ok_or_else(|| anyhow::anyhow!("{} + {} overflows", a, b))?;
                sender.send_message(&sum.to_string());
                Ok(())
            })
            .build()?,
        HandlerSchema::builder("add")
            .description("Add two numbers")
            .positional("a", ArgType::F64)
            .positional("b", ArgType::F64)
            .option_with_description("precision", "p", ArgType::U8, "decimal places")
            .handler(|sender: &dyn Sender, args: &BoundArgs| {
                let sum = args.get::<f64>("a")? + args.get::<f64>("b")?;
                let precision = usize::from(args.get::<u8>("precision")?);
                sender.send_message(&format!("{:.*}", precision.max(1), sum));
                Ok(())
            })
            .build()?,
        HandlerSchema::builder("div")
            .description("Integer division")
            .positional("a", ArgType::I64)
            .positional("b", ArgType::I64)
            .handler(|sender: &dyn Sender, args: &BoundArgs| {
                let a: i64 = args.get("a")?;
                let b: i64 = args.get("b")?;
                let quotient = a
                    .checked_div(b)
                    .ok_or_else(|| anyhow::anyhow!("cannot divide {} by {}", a, b))?;
                sender.send_message(&quotient.to_string());
                Ok(())
            })
            .build()?,
        HandlerSchema::builder("config")
            .description("List config subcommands")
            .handler(move |sender: &dyn Sender, _: &BoundArgs| {
                for name in subcommands.borrow().names.suggestions("config ") {
                    sender.send_message(name);
                }
                Ok(())
            })
            .build()?,
        HandlerSchema::builder("config show")
            .description("Print the active service configuration")
            .handler(move |sender: &dyn Sender, _: &BoundArgs| {
                sender.send_message(rendered_config.trim_end());
                Ok(())
            })
            .build()?,
        HandlerSchema::builder("help")
            .description("List commands")
            .handler(move |sender: &dyn Sender, _: &BoundArgs| {
                sender.send_message(&listing.borrow().listing);
                Ok(())
            })
            .build()?,
        HandlerSchema::builder("help")
            .description("Show usage for one command (quote multi-word names)")
            .positional("command", ArgType::String)
            .handler(move |sender: &dyn Sender, args: &BoundArgs| {
                let name: String = args.get("command")?;
                let catalog = details.borrow();
                let help = catalog
                    .entries
                    .iter()
                    .find(|(n, _)| *n == name)
                    .map(|(_, h)| h.trim_end())
                    .ok_or_else(|| anyhow::anyhow!("no command named '{}'", name))?;
                sender.send_message(help);
                Ok(())
            })
            .build()?,
        HandlerSchema::builder("suggest")
            .description("List commands starting with a prefix")
            .positional("prefix", ArgType::String)
            .handler(move |sender: &dyn Sender, args: &BoundArgs| {
                let prefix: String = args.get("prefix")?;
                let catalog = prefixes.borrow();
                for name in catalog.names.suggestions(&prefix) {
                    sender.send_message(name);
                }
                Ok(())
            })
            .build()?,
    ])
}
