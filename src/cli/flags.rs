//! Flag pass for one command level
//!
//! Flags are read left to right: `-name`, `--name`, `-name=value` and
//! `-name value`. Booleans never consume the following token. The pass stops
//! at the first token that is not flag-shaped, or after a `--` which it
//! consumes; everything from there on is left for the caller.

use crate::cli::error::FlagError;
use crate::cli::options::{FlagTarget, Value, ValueKind};

/// Whether a token is a request for help rather than a bound flag
pub fn is_help_flag(token: &str) -> bool {
    matches!(token, "-h" | "-help" | "--h" | "--help")
}

/// Parse flags from the front of `tokens` into `target`
///
/// Returns how many tokens were consumed.
pub fn parse_flags(target: &mut dyn FlagTarget, tokens: &[String]) -> Result<usize, FlagError> {
    let mut pos = 0;

    while pos < tokens.len() {
        let token = tokens[pos].as_str();
        if token.len() < 2 || !token.starts_with('-') {
            break;
        }

        let mut body = &token[1..];
        if let Some(rest) = body.strip_prefix('-') {
            if rest.is_empty() {
                // "--" terminates the flags
                pos += 1;
                break;
            }
            body = rest;
        }
        if body.is_empty() || body.starts_with('-') || body.starts_with('=') {
            return Err(FlagError::BadSyntax(token.to_string()));
        }
        pos += 1;

        let (name, inline) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };

        let Some(index) = target.specs().iter().position(|spec| spec.name == name) else {
            if name == "help" || name == "h" {
                return Err(FlagError::Help);
            }
            return Err(FlagError::Undefined(name.to_string()));
        };
        let kind = target.specs()[index].kind;

        let raw = match (kind, inline) {
            (_, Some(raw)) => raw,
            (ValueKind::Bool, None) => {
                set(target, index, name, "true", Value::Bool(true))?;
                continue;
            }
            (_, None) => match tokens.get(pos) {
                Some(next) => {
                    pos += 1;
                    next.as_str()
                }
                None => return Err(FlagError::MissingValue(name.to_string())),
            },
        };

        let value = Value::parse(kind, raw).map_err(|reason| FlagError::InvalidValue {
            flag: name.to_string(),
            value: raw.to_string(),
            reason,
        })?;
        set(target, index, name, raw, value)?;
    }

    Ok(pos)
}

fn set(
    target: &mut dyn FlagTarget,
    index: usize,
    name: &str,
    raw: &str,
    value: Value,
) -> Result<(), FlagError> {
    tracing::trace!(flag = name, value = raw, "flag set");
    target.set(index, value).map_err(|reason| FlagError::InvalidValue {
        flag: name.to_string(),
        value: raw.to_string(),
        reason,
    })
}
