//! Typed option groups and their binding to flags
//!
//! An option group is a plain Rust structure that declares its bindable
//! fields once through [`FieldSet`] and describes them through
//! [`OptionGroup`]. Attaching a group to a command compiles its fields into
//! flag bindings; every parse binds a fresh copy of the group and registers
//! the result in an [`OptionsSet`].
//!
//! ```rust,ignore
//! #[derive(Clone, Default)]
//! struct RootOptions {
//!     debug: bool,
//!     config_file: String,
//! }
//!
//! impl FieldSet for RootOptions {
//!     fn fields() -> Vec<Field<Self>> {
//!         vec![
//!             Field::value("debug", |o: &mut Self| &mut o.debug),
//!             Field::value("config_file", |o: &mut Self| &mut o.config_file),
//!         ]
//!     }
//! }
//!
//! impl OptionGroup for RootOptions {
//!     fn describe(field: &str) -> FieldDoc {
//!         match field {
//!             "debug" => FieldDoc::new("turn on debug level logging"),
//!             "config_file" => FieldDoc::new("configuration file path")
//!                 .default_value("~/.config/app/config.toml"),
//!             _ => FieldDoc::default(),
//!         }
//!     }
//! }
//! ```

pub mod binder;
pub mod schema;
pub mod set;
pub mod sources;
pub mod value;

pub use binder::{flag_name, FlagSpec, FlagTarget, OptionContributor};
pub use schema::{Field, FieldDoc, FieldSet, FieldTag, OptionGroup};
pub use set::OptionsSet;
pub use sources::{SourceValue, Sources};
pub use value::{format_duration, parse_duration, FlagValue, Value, ValueKind};
