//! Command tree
//!
//! Every node carries help text and is exactly one of a terminal command or a
//! holder of named subcommands. Either kind may also contribute an option
//! group. The shape is fixed when the node is built and checked once for the
//! whole tree by [`CommandNode::validate`].

use crate::cli::error::{SchemaError, TreeError};
use crate::cli::invocation::Context;
use crate::cli::options::binder::Contributor;
use crate::cli::options::{OptionContributor, OptionGroup};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// A command that can be the final target of an invocation
#[async_trait]
pub trait Execute: Send + Sync {
    /// Run the command with the resolved options and the residual arguments
    async fn execute(&self, ctx: Context, args: Vec<String>) -> anyhow::Result<()>;
}

/// Adapter running a closure as a command
pub struct FnCommand<F>(F);

/// Wrap an async closure as a command
pub fn command_fn<F, Fut>(f: F) -> FnCommand<F>
where
    F: Fn(Context, Vec<String>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    FnCommand(f)
}

#[async_trait]
impl<F, Fut> Execute for FnCommand<F>
where
    F: Fn(Context, Vec<String>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn execute(&self, ctx: Context, args: Vec<String>) -> anyhow::Result<()> {
        (self.0)(ctx, args).await
    }
}

/// What a node does when descent reaches it
pub enum NodeKind {
    /// Executable; residual tokens become its arguments
    Terminal(Arc<dyn Execute>),
    /// Selects a child by the next token
    Subcommands(BTreeMap<String, CommandNode>),
}

/// A node in the command tree
pub struct CommandNode {
    help: String,
    options: Option<Box<dyn OptionContributor>>,
    kind: NodeKind,
    conflicts: Vec<String>,
    duplicates: Vec<String>,
}

impl CommandNode {
    /// Terminal command
    pub fn terminal(help: impl Into<String>, command: impl Execute + 'static) -> Self {
        Self::with_kind(help, NodeKind::Terminal(Arc::new(command)))
    }

    /// Terminal command sharing an existing executor
    pub fn terminal_shared(help: impl Into<String>, command: Arc<dyn Execute>) -> Self {
        Self::with_kind(help, NodeKind::Terminal(command))
    }

    /// Holder of subcommands, to be filled with [`CommandNode::subcommand`]
    pub fn branch(help: impl Into<String>) -> Self {
        Self::with_kind(help, NodeKind::Subcommands(BTreeMap::new()))
    }

    fn with_kind(help: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            help: help.into(),
            options: None,
            kind,
            conflicts: Vec::new(),
            duplicates: Vec::new(),
        }
    }

    /// Add a named subcommand
    ///
    /// Adding to a terminal node, or reusing a name, is reported by
    /// [`CommandNode::validate`].
    pub fn subcommand(mut self, name: impl Into<String>, child: CommandNode) -> Self {
        let name = name.into();
        match &mut self.kind {
            NodeKind::Terminal(_) => self.conflicts.push(name),
            NodeKind::Subcommands(children) => {
                if children.contains_key(&name) {
                    self.duplicates.push(name);
                } else {
                    children.insert(name, child);
                }
            }
        }
        self
    }

    /// Attach an option group; its fields are compiled into flags here
    pub fn with_options<G: OptionGroup>(mut self, value: G) -> Result<Self, SchemaError> {
        self.options = Some(Box::new(Contributor::new(value)?));
        Ok(self)
    }

    /// Help text
    pub fn help(&self) -> &str {
        &self.help
    }

    /// Terminal or subcommand holder
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Option contributor, if the node binds flags
    pub fn options(&self) -> Option<&dyn OptionContributor> {
        self.options.as_deref()
    }

    /// Whether the node is executable
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, NodeKind::Terminal(_))
    }

    /// Subcommands, when the node holds any
    pub fn subcommands(&self) -> Option<&BTreeMap<String, CommandNode>> {
        match &self.kind {
            NodeKind::Subcommands(children) => Some(children),
            NodeKind::Terminal(_) => None,
        }
    }

    /// Child by exact name
    pub fn child(&self, name: &str) -> Option<&CommandNode> {
        self.subcommands().and_then(|children| children.get(name))
    }

    /// Check the shape of this node and everything below it
    ///
    /// `path` names this node in error messages.
    pub fn validate(&self, path: &str) -> Result<(), TreeError> {
        if let Some(child) = self.conflicts.first() {
            return Err(TreeError::ConflictingCapabilities {
                command: path.to_string(),
                child: child.clone(),
            });
        }
        if let Some(child) = self.duplicates.first() {
            return Err(TreeError::DuplicateSubcommand {
                command: path.to_string(),
                child: child.clone(),
            });
        }

        let NodeKind::Subcommands(children) = &self.kind else {
            return Ok(());
        };
        if children.is_empty() {
            return Err(TreeError::NoSubcommands {
                command: path.to_string(),
            });
        }
        for (name, child) in children {
            if !is_command_token(name) {
                return Err(TreeError::InvalidName {
                    command: path.to_string(),
                    child: name.clone(),
                });
            }
            child.validate(&format!("{} {}", path, name))?;
        }
        Ok(())
    }
}

/// Whether a name can be typed as a command token
pub fn is_command_token(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('-') && !name.chars().any(char::is_whitespace)
}

impl fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("CommandNode");
        s.field("help", &self.help)
            .field("options", &self.options.as_ref().map(|o| o.type_name()));
        match &self.kind {
            NodeKind::Terminal(_) => s.field("kind", &"terminal"),
            NodeKind::Subcommands(children) => s.field("subcommands", children),
        };
        s.finish()
    }
}
