//! Option binder - compiles a group's fields into flag bindings
//!
//! Compilation happens once, when a group is attached to a command. Each
//! parse then clones the command's configuration value, writes defaults and
//! configured values into the clone, and lets the flag pass write the rest.

use super::schema::{Field, FieldDoc, OptionGroup, Register, Setter, Shape};
use super::set::OptionsSet;
use super::sources::Sources;
use super::value::{Value, ValueKind};
use crate::cli::error::{SchemaError, SourceError};
use std::collections::HashSet;

/// Public description of one bound flag
#[derive(Debug, Clone, PartialEq)]
pub struct FlagSpec {
    /// Flag name without the leading dash
    pub name: String,
    /// Dotted path of the field the flag writes
    pub field: String,
    /// Accepted value kind
    pub kind: ValueKind,
    /// Value the field holds when nothing else sets it
    pub default: Value,
    /// One-line description
    pub short: String,
    /// Longer description
    pub long: String,
    /// Only the command line may set this flag
    pub flag_only: bool,
}

/// Derive a flag name from a field name: lower-cased, underscores removed
pub fn flag_name(field: &str) -> String {
    field
        .chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

fn valid_flag_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('-')
        && !name.contains('=')
        && !name.chars().any(char::is_whitespace)
}

/// Compiled bindings of one option group
pub(crate) struct Compiled<G> {
    specs: Vec<FlagSpec>,
    setters: Vec<Setter<G>>,
    registers: Vec<Register<G>>,
}

impl<G: OptionGroup> Compiled<G> {
    pub(crate) fn new() -> Result<Self, SchemaError> {
        let mut compiled = Self {
            specs: Vec::new(),
            setters: Vec::new(),
            registers: Vec::new(),
        };
        compiled.walk(G::fields(), G::describe, "", false)?;

        let mut seen = HashSet::new();
        for spec in &compiled.specs {
            if !seen.insert(spec.name.as_str()) {
                return Err(SchemaError::DuplicateFlag {
                    field: spec.field.clone(),
                    name: spec.name.clone(),
                });
            }
        }
        Ok(compiled)
    }

    fn walk(
        &mut self,
        fields: Vec<Field<G>>,
        describe: fn(&str) -> FieldDoc,
        prefix: &str,
        flag_only: bool,
    ) -> Result<(), SchemaError> {
        for field in fields {
            if field.tag.ignore {
                continue;
            }
            let path = if prefix.is_empty() {
                field.name.to_string()
            } else {
                format!("{}.{}", prefix, field.name)
            };
            let flag_only = flag_only || field.tag.flag_only;

            match field.shape {
                Shape::Leaf { kind, set } => {
                    let name = field
                        .tag
                        .rename
                        .map(str::to_string)
                        .unwrap_or_else(|| flag_name(field.name));
                    if !valid_flag_name(&name) {
                        return Err(SchemaError::InvalidFlagName { field: path, name });
                    }

                    let doc = describe(field.name);
                    let default = match doc.default {
                        Some(value) if value.kind() == kind => value,
                        Some(value) => {
                            return Err(SchemaError::DefaultKind {
                                field: path,
                                expected: kind,
                                found: value.kind(),
                            })
                        }
                        None => kind.zero(),
                    };

                    tracing::trace!(flag = %name, field = %path, kind = %kind, "binding flag");
                    self.specs.push(FlagSpec {
                        name,
                        field: path,
                        kind,
                        default,
                        short: doc.short,
                        long: doc.long,
                        flag_only,
                    });
                    self.setters.push(set);
                }
                Shape::Flatten(inner) => {
                    self.walk(inner, describe, &path, flag_only)?;
                }
                Shape::Group {
                    describe: group_describe,
                    fields: inner,
                    register,
                    ..
                } => {
                    self.walk(inner, group_describe, &path, flag_only)?;
                    self.registers.push(register);
                }
            }
        }
        Ok(())
    }
}

/// The option-contributing capability of a command, type-erased
pub trait OptionContributor: Send + Sync {
    /// Type name of the contributed group
    fn type_name(&self) -> &'static str;

    /// Flags the group binds, in declaration order
    fn flags(&self) -> &[FlagSpec];

    /// Start a fresh binding for one parse
    fn bind(&self, sources: &Sources) -> Result<Box<dyn FlagTarget + '_>, SourceError>;
}

/// Mutable binding state written by the flag pass
pub trait FlagTarget {
    /// Bound flags
    fn specs(&self) -> &[FlagSpec];

    /// Write a value into the flag at `index`
    fn set(&mut self, index: usize, value: Value) -> Result<(), String>;

    /// Register the bound group and its nested groups
    fn finish(self: Box<Self>, options: &mut OptionsSet);
}

/// A configuration value together with its compiled bindings
pub(crate) struct Contributor<G: OptionGroup> {
    value: G,
    compiled: Compiled<G>,
}

impl<G: OptionGroup> Contributor<G> {
    pub(crate) fn new(value: G) -> Result<Self, SchemaError> {
        let compiled = Compiled::<G>::new()?;

        // defaults must fit their fields, e.g. a negative default for a u32
        let mut probe = value.clone();
        for (spec, set) in compiled.specs.iter().zip(&compiled.setters) {
            set(&mut probe, spec.default.clone()).map_err(|reason| SchemaError::InvalidDefault {
                field: spec.field.clone(),
                reason,
            })?;
        }

        Ok(Self { value, compiled })
    }
}

impl<G: OptionGroup> OptionContributor for Contributor<G> {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<G>()
    }

    fn flags(&self) -> &[FlagSpec] {
        &self.compiled.specs
    }

    fn bind(&self, sources: &Sources) -> Result<Box<dyn FlagTarget + '_>, SourceError> {
        let mut bound = Bound {
            value: self.value.clone(),
            compiled: &self.compiled,
        };

        for index in 0..self.compiled.specs.len() {
            let spec = &self.compiled.specs[index];
            let (value, origin) = match sources.lookup(spec)? {
                Some((value, origin)) => (value, Some(origin)),
                None => (spec.default.clone(), None),
            };
            let shown = value.to_string();
            bound.set(index, value).map_err(|reason| SourceError::Invalid {
                flag: spec.name.clone(),
                origin: origin.unwrap_or_else(|| "default".to_string()),
                value: shown,
                reason,
            })?;
        }

        Ok(Box::new(bound))
    }
}

struct Bound<'a, G> {
    value: G,
    compiled: &'a Compiled<G>,
}

impl<G: OptionGroup> FlagTarget for Bound<'_, G> {
    fn specs(&self) -> &[FlagSpec] {
        &self.compiled.specs
    }

    fn set(&mut self, index: usize, value: Value) -> Result<(), String> {
        let set = self
            .compiled
            .setters
            .get(index)
            .ok_or_else(|| format!("no flag at index {}", index))?;
        set(&mut self.value, value)
    }

    fn finish(self: Box<Self>, options: &mut OptionsSet) {
        for register in &self.compiled.registers {
            register(&self.value, options);
        }
        options.insert(self.value);
    }
}
