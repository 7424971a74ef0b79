//! CLI - command trees, option binding and the invocation lifecycle
//!
//! A command line is resolved against a tree of [`CommandNode`]s into a
//! single [`Invocation`], which [`Cli`] then runs between four hooks under a
//! cancellation budget.
//!
//! # Architecture
//!
//! - `command` - the tree: terminal nodes and subcommand holders
//! - `options` - typed option groups, their flags and the [`OptionsSet`]
//! - `flags` - the per-level flag pass
//! - `parser` - recursive descent from the root to a terminal node
//! - `runner` - hooks, stage errors and cancellation around parse and execute
//!
//! # Example
//!
//! ```rust,ignore
//! use cmdkit::prelude::*;
//!
//! let root = CommandNode::branch("Manage things.")
//!     .with_options(RootOptions::default())?
//!     .subcommand("list", CommandNode::terminal("List things", ListCommand));
//!
//! let cli = Cli::new("cmd", root)?.with_hooks(Hooks::new().pre_execute(|inv| {
//!     tracing::info!(command = %inv.name(), "starting");
//!     Ok(())
//! }));
//!
//! cli.invoke(&CancellationToken::new(), std::env::args().collect()).await?;
//! ```

pub mod cancel;
pub mod command;
#[cfg(feature = "config")]
pub mod config;
pub mod error;
pub mod flags;
pub mod hooks;
pub mod invocation;
pub mod options;
pub mod parser;
pub mod runner;
pub mod usage;

#[cfg(test)]
pub mod test_utils;

// Re-exports for convenience
pub use cancel::{Budget, Interrupt};
pub use command::{command_fn, CommandNode, Execute, FnCommand, NodeKind};
#[cfg(feature = "config")]
pub use config::CliConfig;
pub use error::{
    CliError, CliResult, FlagError, ParseError, ParseResult, SchemaError, SourceError, TreeError,
};
pub use hooks::Hooks;
pub use invocation::{Context, Invocation};
pub use options::{Field, FieldDoc, FieldSet, OptionGroup, OptionsSet, Sources, Value, ValueKind};
pub use parser::{DefaultParser, Parser};
pub use runner::Cli;
