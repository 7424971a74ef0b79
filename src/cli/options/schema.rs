//! Field descriptors for option groups
//!
//! An option group declares its bindable fields once, in declaration order,
//! through [`FieldSet::fields`]. Leaf fields carry an accessor into the
//! group; nested fields either flatten their leaves into the parent or act
//! as an independent [`OptionGroup`] that is registered in the
//! [`OptionsSet`](super::OptionsSet) after parsing.

use super::set::OptionsSet;
use super::value::{FlagValue, Value, ValueKind};
use std::sync::Arc;

pub(crate) type Setter<G> = Arc<dyn Fn(&mut G, Value) -> Result<(), String> + Send + Sync>;
pub(crate) type Register<G> = Arc<dyn Fn(&G, &mut OptionsSet) + Send + Sync>;
type Getter<P, G> = Arc<dyn Fn(&P) -> &G + Send + Sync>;
type GetterMut<P, G> = Arc<dyn Fn(&mut P) -> &mut G + Send + Sync>;

fn getter<P, G, F>(f: F) -> Getter<P, G>
where
    F: Fn(&P) -> &G + Send + Sync + 'static,
{
    Arc::new(f)
}

fn getter_mut<P, G, F>(f: F) -> GetterMut<P, G>
where
    F: Fn(&mut P) -> &mut G + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Structural markers attached to a field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldTag {
    /// Explicit flag name instead of the derived one
    pub rename: Option<&'static str>,
    /// Only the command line may set this field
    pub flag_only: bool,
    /// Excluded from binding entirely
    pub ignore: bool,
}

/// Default value and descriptions of one field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldDoc {
    /// Default value; the kind's zero value when absent
    pub default: Option<Value>,
    /// One-line description
    pub short: String,
    /// Longer description
    pub long: String,
}

impl FieldDoc {
    /// Doc with a short description
    pub fn new(short: impl Into<String>) -> Self {
        Self {
            short: short.into(),
            ..Self::default()
        }
    }

    /// Set the default value
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Set the long description
    pub fn long(mut self, long: impl Into<String>) -> Self {
        self.long = long.into();
        self
    }
}

/// A structure whose fields can be bound to flags
pub trait FieldSet: Clone + Send + Sync + 'static {
    /// Bindable fields in declaration order
    fn fields() -> Vec<Field<Self>>;
}

/// A field set that is addressable on its own: it provides per-field
/// metadata and is registered in the options set under its own type
pub trait OptionGroup: FieldSet {
    /// Default value, short and long description of the named field
    fn describe(field: &str) -> FieldDoc;
}

/// One declared field of a [`FieldSet`]
pub struct Field<G> {
    pub(crate) name: &'static str,
    pub(crate) tag: FieldTag,
    pub(crate) shape: Shape<G>,
}

pub(crate) enum Shape<G> {
    Leaf {
        kind: ValueKind,
        set: Setter<G>,
    },
    Flatten(Vec<Field<G>>),
    Group {
        type_name: &'static str,
        describe: fn(&str) -> FieldDoc,
        fields: Vec<Field<G>>,
        register: Register<G>,
    },
}

impl<G: 'static> Field<G> {
    /// A leaf field of one of the supported value kinds
    ///
    /// ```rust,ignore
    /// Field::value("config_file", |o: &mut RootOptions| &mut o.config_file)
    /// ```
    pub fn value<T: FlagValue>(name: &'static str, access: fn(&mut G) -> &mut T) -> Self {
        let set: Setter<G> = Arc::new(move |group: &mut G, value: Value| {
            *access(group) = T::from_value(value)?;
            Ok(())
        });
        Self {
            name,
            tag: FieldTag::default(),
            shape: Shape::Leaf { kind: T::KIND, set },
        }
    }

    /// A nested structure whose leaves are exported as if declared here
    pub fn flatten<N: FieldSet>(
        name: &'static str,
        get: fn(&G) -> &N,
        get_mut: fn(&mut G) -> &mut N,
    ) -> Self {
        let get = getter(get);
        let get_mut = getter_mut(get_mut);
        let fields = N::fields()
            .into_iter()
            .map(|f| f.lift(&get, &get_mut))
            .collect();
        Self {
            name,
            tag: FieldTag::default(),
            shape: Shape::Flatten(fields),
        }
    }

    /// A nested option group, registered by copy after parsing
    pub fn group<N: OptionGroup>(
        name: &'static str,
        get: fn(&G) -> &N,
        get_mut: fn(&mut G) -> &mut N,
    ) -> Self {
        let register: Register<G> = Arc::new(move |group: &G, set: &mut OptionsSet| {
            set.insert(get(group).clone());
        });
        Self::nested_group::<N>(name, getter(get), getter_mut(get_mut), register)
    }

    /// A nested option group held behind an `Arc`, registered by reference
    ///
    /// Flags write through `Arc::make_mut`, so the stored configuration value
    /// is never modified.
    pub fn shared_group<N: OptionGroup>(
        name: &'static str,
        get: fn(&G) -> &Arc<N>,
        get_mut: fn(&mut G) -> &mut Arc<N>,
    ) -> Self {
        let register: Register<G> = Arc::new(move |group: &G, set: &mut OptionsSet| {
            set.insert_shared(Arc::clone(get(group)));
        });
        Self::nested_group::<N>(
            name,
            getter(move |group: &G| &**get(group)),
            getter_mut(move |group: &mut G| Arc::make_mut(get_mut(group))),
            register,
        )
    }

    fn nested_group<N: OptionGroup>(
        name: &'static str,
        get: Getter<G, N>,
        get_mut: GetterMut<G, N>,
        register: Register<G>,
    ) -> Self {
        let fields = N::fields()
            .into_iter()
            .map(|f| f.lift(&get, &get_mut))
            .collect();
        Self {
            name,
            tag: FieldTag::default(),
            shape: Shape::Group {
                type_name: std::any::type_name::<N>(),
                describe: N::describe,
                fields,
                register,
            },
        }
    }

    /// Re-root this field onto a parent structure
    fn lift<P: 'static>(self, get: &Getter<P, G>, get_mut: &GetterMut<P, G>) -> Field<P> {
        let shape = match self.shape {
            Shape::Leaf { kind, set } => {
                let get_mut = Arc::clone(get_mut);
                let set: Setter<P> =
                    Arc::new(move |parent: &mut P, value: Value| set(get_mut(parent), value));
                Shape::Leaf { kind, set }
            }
            Shape::Flatten(fields) => Shape::Flatten(
                fields.into_iter().map(|f| f.lift(get, get_mut)).collect(),
            ),
            Shape::Group {
                type_name,
                describe,
                fields,
                register,
            } => {
                let inner = Arc::clone(get);
                let register: Register<P> =
                    Arc::new(move |parent: &P, set: &mut OptionsSet| register(inner(parent), set));
                Shape::Group {
                    type_name,
                    describe,
                    fields: fields.into_iter().map(|f| f.lift(get, get_mut)).collect(),
                    register,
                }
            }
        };
        Field {
            name: self.name,
            tag: self.tag,
            shape,
        }
    }
}

impl<G> Field<G> {
    /// Bind under an explicit flag name
    pub fn rename(mut self, name: &'static str) -> Self {
        self.tag.rename = Some(name);
        self
    }

    /// Only the command line may set this field
    pub fn flag_only(mut self) -> Self {
        self.tag.flag_only = true;
        self
    }

    /// Exclude this field from binding
    pub fn ignore(mut self) -> Self {
        self.tag.ignore = true;
        self
    }

    /// Declared field name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Structural markers
    pub fn tag(&self) -> &FieldTag {
        &self.tag
    }
}

impl<G> std::fmt::Debug for Field<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shape = match &self.shape {
            Shape::Leaf { kind, .. } => kind.name().to_string(),
            Shape::Flatten(fields) => format!("flatten({} fields)", fields.len()),
            Shape::Group { type_name, .. } => format!("group({})", type_name),
        };
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .field("shape", &shape)
            .finish()
    }
}
