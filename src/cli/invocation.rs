//! Resolved invocation and the context handed to commands

use crate::cli::cancel::{Budget, Interrupt};
use crate::cli::command::Execute;
use crate::cli::options::OptionsSet;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// What a command sees while it runs
#[derive(Debug, Clone)]
pub struct Context {
    budget: Budget,
    options: Arc<OptionsSet>,
}

impl Context {
    /// Build a context from a budget and resolved options
    pub fn new(budget: Budget, options: Arc<OptionsSet>) -> Self {
        Self { budget, options }
    }

    /// Cancellation budget of the invocation
    pub fn budget(&self) -> &Budget {
        &self.budget
    }

    /// Token that fires when the invocation is cancelled
    pub fn token(&self) -> &CancellationToken {
        self.budget.token()
    }

    /// Every resolved option group
    pub fn options(&self) -> &OptionsSet {
        &self.options
    }

    /// A resolved option group by type
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.options.get::<T>()
    }
}

/// A command resolved from a command line, ready to execute
#[derive(Clone)]
pub struct Invocation {
    path: Vec<String>,
    target: Arc<dyn Execute>,
    args: Vec<String>,
    options: Arc<OptionsSet>,
}

impl Invocation {
    /// Create an invocation of `target`, reached through `path`
    pub fn new(
        path: Vec<String>,
        target: Arc<dyn Execute>,
        args: Vec<String>,
        options: OptionsSet,
    ) -> Self {
        Self {
            path,
            target,
            args,
            options: Arc::new(options),
        }
    }

    /// Names from the root to the target, root first
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Space-joined path, e.g. `cmd remote add`
    pub fn name(&self) -> String {
        self.path.join(" ")
    }

    /// Name of the target command
    pub fn command(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    /// Residual positional arguments, in command-line order
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Resolved option groups
    pub fn options(&self) -> &OptionsSet {
        &self.options
    }

    /// A resolved option group by type
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.options.get::<T>()
    }

    /// Run the target under `budget`
    ///
    /// The outer error reports an interruption, in which case the command's
    /// future has been dropped.
    pub async fn execute(&self, budget: &Budget) -> Result<anyhow::Result<()>, Interrupt> {
        budget.check()?;
        let ctx = Context::new(budget.clone(), self.options.clone());
        budget
            .run(self.target.execute(ctx, self.args.clone()))
            .await
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("path", &self.path)
            .field("args", &self.args)
            .field("options", &self.options)
            .finish()
    }
}
