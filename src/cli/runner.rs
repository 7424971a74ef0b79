//! CLI runner - hook orchestration around parse and execute
//!
//! [`Cli::invoke`] runs one invocation as a single unit of work on the
//! caller's task:
//!
//! pre-parse hook → parse → post-parse hook → pre-execute hook → execute →
//! post-execute hook
//!
//! A failing stage aborts the rest and is reported with the stage it came
//! from. Once execution has been attempted the post-execute hook always runs;
//! it sees the command's error and may replace or clear it. The cancellation
//! budget is checked between stages and raced against the command itself. An
//! interruption is returned as is: before execution it skips the remaining
//! stages, during execution the post-execute hook still observes it but cannot
//! override it.

use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[cfg(feature = "config")]
use crate::cli::config::CliConfig;
use crate::cli::cancel::Budget;
use crate::cli::command::CommandNode;
use crate::cli::error::{CliError, CliResult};
use crate::cli::hooks::Hooks;
use crate::cli::invocation::Invocation;
use crate::cli::options::Sources;
use crate::cli::parser::{DefaultParser, Parser};
use crate::cli::usage;

/// A validated command tree with its hooks and parser
pub struct Cli {
    name: String,
    root: CommandNode,
    hooks: Hooks,
    parser: Box<dyn Parser>,
    timeout: Option<Duration>,
}

impl Cli {
    /// Validate the tree rooted at `root` and wrap it
    ///
    /// `name` labels the root in validation errors and in [`Cli::usage`].
    pub fn new(name: impl Into<String>, root: CommandNode) -> CliResult<Self> {
        let name = name.into();
        root.validate(&name)?;
        Ok(Self {
            name,
            root,
            hooks: Hooks::default(),
            parser: Box::new(DefaultParser::new()),
            timeout: None,
        })
    }

    /// Register hooks
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Replace the parser
    pub fn with_parser(mut self, parser: impl Parser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    /// Use the default parser with extra option sources
    pub fn with_sources(self, sources: Sources) -> Self {
        self.with_parser(DefaultParser::with_sources(sources))
    }

    /// Give every invocation a deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Apply file-based configuration: option sources and timeout
    #[cfg(feature = "config")]
    pub fn with_config(self, config: &CliConfig) -> CliResult<Self> {
        let mut cli = self.with_sources(config.sources()?);
        if let Some(timeout) = config.timeout() {
            cli = cli.with_timeout(timeout);
        }
        Ok(cli)
    }

    /// Root label
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root of the command tree
    pub fn root(&self) -> &CommandNode {
        &self.root
    }

    /// Usage text of the root command
    pub fn usage(&self) -> String {
        usage::render(&self.name, &self.root)
    }

    /// Parse a command line without running any hook
    pub fn parse(&self, cmd_line: &[String], budget: &Budget) -> CliResult<Invocation> {
        Ok(self.parser.parse(&self.root, cmd_line, budget)?)
    }

    /// Run one invocation, cancelled by `token` and bounded by the configured
    /// timeout
    pub async fn invoke(&self, token: &CancellationToken, cmd_line: Vec<String>) -> CliResult<()> {
        let mut budget = Budget::new(token.clone());
        if let Some(timeout) = self.timeout {
            budget = budget.with_timeout(timeout);
        }
        self.invoke_with(&budget, cmd_line).await
    }

    /// Run one invocation under an explicit budget
    pub async fn invoke_with(&self, budget: &Budget, mut cmd_line: Vec<String>) -> CliResult<()> {
        budget.check()?;
        tracing::debug!("running pre-parse hook");
        self.hooks.run_pre_parse(&mut cmd_line)?;

        budget.check()?;
        tracing::debug!(args = ?cmd_line, "parsing command line");
        let invocation = self.parse(&cmd_line, budget)?;

        budget.check()?;
        tracing::debug!(command = %invocation.name(), "running post-parse hook");
        self.hooks.run_post_parse(&invocation)?;

        budget.check()?;
        tracing::debug!(command = %invocation.name(), "running pre-execute hook");
        self.hooks.run_pre_execute(&invocation)?;

        tracing::debug!(command = %invocation.name(), "executing");
        let mut error = match invocation.execute(budget).await {
            Ok(result) => result.err(),
            Err(interrupt) => {
                let mut error = Some(anyhow::Error::new(interrupt));
                tracing::debug!(command = %invocation.name(), %interrupt, "running post-execute hook");
                if let Err(err) = self.hooks.run_post_execute(&invocation, &mut error) {
                    tracing::warn!(command = %invocation.name(), error = %err, "post-execute hook failed after interruption");
                }
                return Err(CliError::Interrupted(interrupt));
            }
        };

        tracing::debug!(command = %invocation.name(), failed = error.is_some(), "running post-execute hook");
        self.hooks.run_post_execute(&invocation, &mut error)?;

        match error {
            Some(source) => Err(CliError::Execution {
                command: invocation.name(),
                source,
            }),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for Cli {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cli")
            .field("name", &self.name)
            .field("root", &self.root)
            .field("hooks", &self.hooks)
            .field("timeout", &self.timeout)
            .finish()
    }
}
