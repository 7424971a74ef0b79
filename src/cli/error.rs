//! Error types for command tree construction, parsing and invocation

use crate::cli::cancel::Interrupt;
use crate::cli::options::ValueKind;
use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Result type for command line parsing
pub type ParseResult<T> = Result<T, ParseError>;

/// Defects in an option group's declared fields, detected when the group is
/// attached to a command
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// Flag name is empty or not flag-shaped
    #[error("field {field}: invalid flag name {name:?}")]
    InvalidFlagName {
        /// Declared field name
        field: String,
        /// Offending flag name
        name: String,
    },

    /// Two fields of one command bind the same flag
    #[error("field {field}: flag -{name} is declared more than once")]
    DuplicateFlag {
        /// Declared field name
        field: String,
        /// Duplicated flag name
        name: String,
    },

    /// Declared default does not have the field's kind
    #[error("field {field}: default of kind {found} does not match field kind {expected}")]
    DefaultKind {
        /// Declared field name
        field: String,
        /// Kind of the field
        expected: ValueKind,
        /// Kind of the declared default
        found: ValueKind,
    },

    /// Declared default cannot be stored in the field
    #[error("field {field}: invalid default: {reason}")]
    InvalidDefault {
        /// Declared field name
        field: String,
        /// Why the default was rejected
        reason: String,
    },
}

/// Defects in the shape of a command tree
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// A subcommand holder without any subcommands
    #[error("command {command:?} has no subcommands")]
    NoSubcommands {
        /// Path of the command
        command: String,
    },

    /// A terminal command that was also given subcommands
    #[error("command {command:?} is terminal and cannot hold subcommand {child:?}")]
    ConflictingCapabilities {
        /// Path of the command
        command: String,
        /// Rejected subcommand name
        child: String,
    },

    /// The same subcommand name registered twice
    #[error("command {command:?} declares subcommand {child:?} more than once")]
    DuplicateSubcommand {
        /// Path of the command
        command: String,
        /// Duplicated subcommand name
        child: String,
    },

    /// A subcommand name that could never be typed as a command token
    #[error("command {command:?} has invalid subcommand name {child:?}")]
    InvalidName {
        /// Path of the command
        command: String,
        /// Offending subcommand name
        child: String,
    },
}

/// Errors from the flag pass at one command level
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlagError {
    /// Token starts like a flag but is malformed
    #[error("bad flag syntax: {0}")]
    BadSyntax(String),

    /// Flag not bound at this level
    #[error("flag provided but not defined: -{0}")]
    Undefined(String),

    /// Non-boolean flag at the end of the input
    #[error("flag needs an argument: -{0}")]
    MissingValue(String),

    /// Value could not be parsed for the flag's kind
    #[error("invalid value {value:?} for flag -{flag}: {reason}")]
    InvalidValue {
        /// Flag name
        flag: String,
        /// Raw value
        value: String,
        /// Parser message
        reason: String,
    },

    /// `-h` or `-help` without such a flag being bound
    #[error("help requested")]
    Help,
}

/// Errors from configuration sources feeding option fields
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SourceError {
    /// A configured value does not fit the field
    #[error("invalid value {value:?} for -{flag} from {origin}: {reason}")]
    Invalid {
        /// Flag name
        flag: String,
        /// Where the value came from
        origin: String,
        /// Configured value
        value: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Errors from descending the command tree
#[derive(Debug, Error)]
pub enum ParseError {
    /// Nothing to parse, not even a program name
    #[error("empty command line")]
    EmptyCommandLine,

    /// Token does not name a subcommand
    #[error("command {0:?} not recognised")]
    NotRecognised(String),

    /// A subcommand was expected but the input ended
    #[error("usage: {command} <command>")]
    Usage {
        /// Command that needs a subcommand
        command: String,
        /// Its help text
        help: String,
    },

    /// Descent reached a subcommand holder with no subcommands
    #[error("command {0:?} has no subcommands")]
    NoSubcommands(String),

    /// Flag pass failed at a command level
    #[error("{command}: {source}")]
    Flag {
        /// Command whose flags failed
        command: String,
        /// Underlying flag error
        source: FlagError,
    },

    /// A configuration source supplied an unusable value
    #[error("{command}: {source}")]
    Source {
        /// Command whose options failed
        command: String,
        /// Underlying source error
        source: SourceError,
    },

    /// Help was requested; carries the rendered usage
    #[error("{usage}")]
    Help {
        /// Rendered usage of the command
        usage: String,
    },

    /// Cancellation or deadline fired during parsing
    #[error(transparent)]
    Interrupted(#[from] Interrupt),
}

/// Errors from running a command invocation
///
/// Every pipeline stage wraps its failure so callers can tell where it
/// originated. Interruptions are surfaced unwrapped.
#[derive(Debug, Error)]
pub enum CliError {
    /// Command tree is malformed
    #[error("invalid command tree: {0}")]
    Tree(#[from] TreeError),

    /// Pre-parse hook failed
    #[error("running pre-parse hook: {0}")]
    PreParse(#[source] anyhow::Error),

    /// Command line could not be parsed
    #[error("parsing command line: {0}")]
    Parse(#[source] ParseError),

    /// Post-parse hook failed
    #[error("running post-parse hook: {0}")]
    PostParse(#[source] anyhow::Error),

    /// Pre-execute hook failed
    #[error("running pre-execute hook: {0}")]
    PreExecute(#[source] anyhow::Error),

    /// The command itself failed
    #[error("executing {command}: {source}")]
    Execution {
        /// Command path
        command: String,
        /// Error returned by the command
        source: anyhow::Error,
    },

    /// Post-execute hook failed
    #[error("running post-execute hook: {0}")]
    PostExecute(#[source] anyhow::Error),

    /// Cancellation or deadline fired
    #[error(transparent)]
    Interrupted(#[from] Interrupt),

    /// Configuration loading or validation error
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl From<ParseError> for CliError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Interrupted(interrupt) => CliError::Interrupted(interrupt),
            other => CliError::Parse(other),
        }
    }
}

impl CliError {
    /// The interruption behind this error, if any
    pub fn interrupt(&self) -> Option<Interrupt> {
        match self {
            CliError::Interrupted(interrupt) => Some(*interrupt),
            _ => None,
        }
    }

    /// The parse error behind this error, if any
    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            CliError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_wrappers() {
        let err = CliError::Parse(ParseError::NotRecognised("bogus".into()));
        assert_eq!(err.to_string(), "parsing command line: command \"bogus\" not recognised");

        let err = CliError::PreParse(anyhow::anyhow!("boom"));
        assert_eq!(err.to_string(), "running pre-parse hook: boom");
    }

    #[test]
    fn test_interrupt_is_not_wrapped() {
        let err: CliError = ParseError::Interrupted(Interrupt::Cancelled).into();
        assert_eq!(err.interrupt(), Some(Interrupt::Cancelled));
        assert_eq!(err.to_string(), "operation cancelled");
    }

    #[test]
    fn test_usage_message() {
        let err = ParseError::Usage {
            command: "cmd".into(),
            help: "root help".into(),
        };
        assert_eq!(err.to_string(), "usage: cmd <command>");
    }

    #[test]
    fn test_flag_error_carries_command() {
        let err = ParseError::Flag {
            command: "cmd".into(),
            source: FlagError::Undefined("verbose".into()),
        };
        assert_eq!(err.to_string(), "cmd: flag provided but not defined: -verbose");
    }
}
