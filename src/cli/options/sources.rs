//! Non-command-line sources for option values
//!
//! Fields that are not marked flag-only may also take their value from a
//! configuration file or from the environment. Precedence, lowest first:
//! declared default, configured value, environment variable, command line.

use super::binder::FlagSpec;
use super::value::{Value, ValueKind};
use crate::cli::error::SourceError;
use std::collections::HashMap;
use std::env::VarError;

/// A configured value, either already typed or still textual
#[derive(Debug, Clone, PartialEq)]
pub enum SourceValue {
    /// Text, parsed according to the flag's kind
    Text(String),
    /// Typed value, must match the flag's kind
    Typed(Value),
}

/// Configured values keyed by flag name, plus an optional environment prefix
#[derive(Debug, Clone, Default)]
pub struct Sources {
    values: HashMap<String, SourceValue>,
    env_prefix: Option<String>,
}

impl Sources {
    /// No sources: only defaults and the command line apply
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure a typed value for a flag
    pub fn with_value(mut self, flag: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values
            .insert(flag.into(), SourceValue::Typed(value.into()));
        self
    }

    /// Configure a textual value for a flag
    pub fn with_text(mut self, flag: impl Into<String>, raw: impl Into<String>) -> Self {
        self.values.insert(flag.into(), SourceValue::Text(raw.into()));
        self
    }

    /// Read `<PREFIX>_<FLAG>` environment variables
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Environment variable consulted for a flag, if any
    pub fn env_var(&self, flag: &str) -> Option<String> {
        self.env_prefix
            .as_ref()
            .map(|prefix| format!("{}_{}", prefix, flag).to_uppercase())
    }

    /// Whether no source is configured
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.env_prefix.is_none()
    }

    /// Value for a flag with the name of its origin, or `None` when no source
    /// applies
    pub(crate) fn lookup(&self, spec: &FlagSpec) -> Result<Option<(Value, String)>, SourceError> {
        if spec.flag_only {
            return Ok(None);
        }

        if let Some(var) = self.env_var(&spec.name) {
            match std::env::var(&var) {
                Ok(raw) => {
                    let origin = format!("environment variable {}", var);
                    let value =
                        Value::parse(spec.kind, &raw).map_err(|reason| SourceError::Invalid {
                            flag: spec.name.clone(),
                            origin: origin.clone(),
                            value: raw.clone(),
                            reason,
                        })?;
                    tracing::debug!(flag = %spec.name, %var, "option set from environment");
                    return Ok(Some((value, origin)));
                }
                Err(VarError::NotUnicode(raw)) => {
                    return Err(SourceError::Invalid {
                        flag: spec.name.clone(),
                        origin: format!("environment variable {}", var),
                        value: raw.to_string_lossy().into_owned(),
                        reason: "not valid unicode".to_string(),
                    })
                }
                Err(VarError::NotPresent) => {}
            }
        }

        let Some(configured) = self.values.get(&spec.name) else {
            return Ok(None);
        };
        let origin = "configuration".to_string();
        let value = match configured {
            SourceValue::Text(raw) => {
                Value::parse(spec.kind, raw).map_err(|reason| SourceError::Invalid {
                    flag: spec.name.clone(),
                    origin: origin.clone(),
                    value: raw.clone(),
                    reason,
                })?
            }
            SourceValue::Typed(value) if value.kind() == spec.kind => value.clone(),
            SourceValue::Typed(Value::Int(n)) if spec.kind == ValueKind::Uint && *n >= 0 => {
                Value::Uint(n.unsigned_abs())
            }
            SourceValue::Typed(value) => {
                return Err(SourceError::Invalid {
                    flag: spec.name.clone(),
                    origin,
                    value: value.to_string(),
                    reason: format!("expected {}, got {}", spec.kind, value.kind()),
                })
            }
        };
        tracing::debug!(flag = %spec.name, "option set from configuration");
        Ok(Some((value, origin)))
    }
}
