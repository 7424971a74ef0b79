//! Recursive descent over the command tree
//!
//! Starting at the root, each visited node first binds and parses its own
//! flags from the front of the remaining tokens. A terminal node takes the
//! rest as its arguments; a subcommand holder consumes the next token as the
//! name of the child to visit. There is no backtracking and no token is read
//! twice.

use crate::cli::cancel::Budget;
use crate::cli::command::{is_command_token, CommandNode, NodeKind};
use crate::cli::error::{FlagError, ParseError, ParseResult};
use crate::cli::flags::{is_help_flag, parse_flags};
use crate::cli::invocation::Invocation;
use crate::cli::options::{OptionsSet, Sources};
use crate::cli::usage;

/// Turns a command line into an invocation
pub trait Parser: Send + Sync {
    /// Parse `cmd_line`, whose first element names the root command
    fn parse(
        &self,
        root: &CommandNode,
        cmd_line: &[String],
        budget: &Budget,
    ) -> ParseResult<Invocation>;
}

/// Parser binding option groups from defaults, configured sources and flags
#[derive(Debug, Clone, Default)]
pub struct DefaultParser {
    sources: Sources,
}

impl DefaultParser {
    /// Parser with no sources beyond defaults and the command line
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser that also reads configured values and environment variables
    pub fn with_sources(sources: Sources) -> Self {
        Self { sources }
    }

    /// Configured sources
    pub fn sources(&self) -> &Sources {
        &self.sources
    }
}

impl Parser for DefaultParser {
    fn parse(
        &self,
        root: &CommandNode,
        cmd_line: &[String],
        budget: &Budget,
    ) -> ParseResult<Invocation> {
        let (program, mut tokens) = cmd_line
            .split_first()
            .ok_or(ParseError::EmptyCommandLine)?;

        let mut node = root;
        let mut path = vec![program.clone()];
        let mut options = OptionsSet::new();

        loop {
            budget.check()?;
            let command = path.join(" ");
            tracing::debug!(command = %command, remaining = tokens.len(), "visiting command");

            if let Some(contributor) = node.options() {
                let mut target = contributor
                    .bind(&self.sources)
                    .map_err(|source| ParseError::Source {
                        command: command.clone(),
                        source,
                    })?;
                let consumed = match parse_flags(&mut *target, tokens) {
                    Ok(consumed) => consumed,
                    Err(FlagError::Help) => {
                        return Err(ParseError::Help {
                            usage: usage::render(&command, node),
                        })
                    }
                    Err(source) => return Err(ParseError::Flag { command, source }),
                };
                tokens = &tokens[consumed..];
                target.finish(&mut options);
            }

            let children = match node.kind() {
                NodeKind::Terminal(target) => {
                    tracing::debug!(command = %command, args = tokens.len(), "resolved invocation");
                    return Ok(Invocation::new(
                        path,
                        target.clone(),
                        tokens.to_vec(),
                        options,
                    ));
                }
                NodeKind::Subcommands(children) => children,
            };

            if children.is_empty() {
                return Err(ParseError::NoSubcommands(command));
            }
            let Some((next, rest)) = tokens.split_first() else {
                return Err(ParseError::Usage {
                    command,
                    help: node.help().to_string(),
                });
            };
            if is_help_flag(next) {
                return Err(ParseError::Help {
                    usage: usage::render(&command, node),
                });
            }
            let child = match children.get(next.as_str()) {
                Some(child) if is_command_token(next) => child,
                _ => return Err(ParseError::NotRecognised(next.clone())),
            };

            path.push(next.clone());
            node = child;
            tokens = rest;
        }
    }
}
