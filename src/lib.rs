//! cmdkit - nested subcommands with typed option groups
//!
//! cmdkit resolves a raw command line into one ready-to-execute invocation,
//! given a tree of nested subcommands that may each contribute an option
//! group, and runs it through a fixed hook lifecycle:
//!
//! - **Command tree** - terminal commands and subcommand holders, validated
//!   once when the [`cli::Cli`] is built
//! - **Option groups** - plain structs whose fields become flags, with
//!   defaults, descriptions and nested groups
//! - **Parsing** - Go-style flags at each level, left to right, until the
//!   first positional token
//! - **Lifecycle** - pre-parse, post-parse, pre-execute and post-execute
//!   hooks, with cooperative cancellation and deadlines
//!
//! # Features
//!
//! - **`config`** (default) - load option values, an env prefix and a
//!   timeout from a TOML file
//!
//! # Example
//!
//! ```ignore
//! use cmdkit::prelude::*;
//!
//! #[derive(Clone, Default)]
//! struct RootOptions {
//!     debug: bool,
//! }
//!
//! impl FieldSet for RootOptions {
//!     fn fields() -> Vec<Field<Self>> {
//!         vec![Field::value("debug", |o: &mut Self| &mut o.debug)]
//!     }
//! }
//!
//! impl OptionGroup for RootOptions {
//!     fn describe(field: &str) -> FieldDoc {
//!         match field {
//!             "debug" => FieldDoc::new("turn on debug logging"),
//!             _ => FieldDoc::default(),
//!         }
//!     }
//! }
//!
//! async fn example() -> anyhow::Result<()> {
//!     let list = command_fn(|ctx: Context, args: Vec<String>| async move {
//!         let debug = ctx.get::<RootOptions>().map(|o| o.debug).unwrap_or_default();
//!         println!("listing {:?} (debug: {})", args, debug);
//!         Ok(())
//!     });
//!
//!     let root = CommandNode::branch("Manage things.")
//!         .with_options(RootOptions::default())?
//!         .subcommand("list", CommandNode::terminal("List things", list));
//!
//!     let cli = Cli::new("cmd", root)?;
//!     cli.invoke(&CancellationToken::new(), std::env::args().collect()).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Command trees, option binding and the invocation lifecycle
pub mod cli;

/// Commonly used types
pub mod prelude {
    pub use crate::cli::{
        command_fn, Budget, Cli, CliError, CliResult, CommandNode, Context, Execute, Field,
        FieldDoc, FieldSet, Hooks, Interrupt, Invocation, OptionGroup, OptionsSet, ParseError,
    };
    #[cfg(feature = "config")]
    pub use crate::cli::CliConfig;
    pub use tokio_util::sync::CancellationToken;
}

pub use cli::{Cli, CliError, CliResult};
