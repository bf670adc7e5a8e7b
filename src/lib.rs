//! cmdroute - shell-like command routing with overload resolution
//!
//! Turns one line of free text into a call to the best-fitting handler
//! registered under a (possibly multi-word) command name.
//!
//! ## Pipeline
//!
//! ```text
//! input text
//!     │
//!     ▼
//! Tokenizer ──► tokens ──► CommandTrie (greedy longest match)
//!                                │
//!                    remaining tokens
//!                                ▼
//!                   ParsedInput {positionals, options, flags}
//!                                │
//!                                ▼
//!                   Binder (score every overload) ──► BoundArgs
//!                                │
//!                                ▼
//!                   handler(sender, args)  ──► Outcome
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use cmdroute::{ArgType, BufferedSender, CommandService, HandlerSchema};
//!
//! let mut service = CommandService::default();
//! service
//!     .register(
//!         "demo",
//!         vec![HandlerSchema::builder("add")
//!             .positional("a", ArgType::I64)
//!             .positional("b", ArgType::I64)
//!             .handler(|sender, args| {
//!                 let sum = args.get::<i64>("a")? + args.get::<i64>("b")?;
//!                 sender.send_message(&sum.to_string());
//!                 Ok(())
//!             })
//!             .build()?],
//!     )?;
//!
//! let sender = BufferedSender::new();
//! service.evaluate("add 2 40", &sender)?;
//! assert_eq!(sender.messages(), vec!["42"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Core error handling
pub mod error;

// Text pipeline
pub mod input;
pub mod tokenizer;
pub mod trie;

// Handler metadata and argument conversion
pub mod parsers;
pub mod schema;

// Overload resolution and dispatch
pub mod binder;
pub mod registry;
pub mod sender;
pub mod service;

// Ambient
pub mod config;
pub mod help;

pub use cmdroute_types::{ArgType, CustomValue, FromValue, TypeParseError, Value};

pub use config::{ConfigLoader, ServiceConfig};
pub use error::{
    ArgumentError, CommandError, CommandExecutionError, ConversionError, OverloadRejection,
    RegistrationError, Rejection,
};
pub use help::{CommandInfo, OverloadInfo};
pub use input::ParsedInput;
pub use parsers::{TypeParser, TypeParsers};
pub use registry::{Command, CommandRegistry, OwnerId};
pub use schema::{BoundArg, BoundArgs, HandlerSchema, HandlerSchemaBuilder, ParameterSpec};
pub use sender::{BufferedSender, ConsoleSender, Sender};
pub use service::{CommandService, Dispatched, Outcome};
pub use tokenizer::tokenize;
pub use trie::CommandTrie;
