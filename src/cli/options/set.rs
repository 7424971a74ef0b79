//! Type-keyed collection of resolved option groups

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
struct Entry {
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

/// Option groups collected while descending the command tree
///
/// Holds at most one value per group type. A later insertion of the same type
/// replaces the earlier one, so a group bound at a deeper tree level wins
/// over the same group bound by an ancestor.
#[derive(Clone, Default)]
pub struct OptionsSet {
    groups: HashMap<TypeId, Entry>,
}

impl OptionsSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a group by value, replacing any group of the same type
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.insert_shared(Arc::new(value));
    }

    /// Insert a shared group, replacing any group of the same type
    pub fn insert_shared<T: Any + Send + Sync>(&mut self, value: Arc<T>) {
        let replaced = self.groups.insert(
            TypeId::of::<T>(),
            Entry {
                type_name: std::any::type_name::<T>(),
                value,
            },
        );
        if replaced.is_some() {
            tracing::trace!(group = std::any::type_name::<T>(), "option group replaced");
        }
    }

    /// Get a group by type
    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.groups
            .get(&TypeId::of::<T>())
            .and_then(|entry| (*entry.value).downcast_ref::<T>())
    }

    /// Get a shared handle to a group by type
    pub fn get_shared<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.groups
            .get(&TypeId::of::<T>())
            .and_then(|entry| Arc::clone(&entry.value).downcast::<T>().ok())
    }

    /// Whether a group of this type is present
    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.groups.contains_key(&TypeId::of::<T>())
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Apply every group of `other` over this set
    pub fn merge(&mut self, other: OptionsSet) {
        self.groups.extend(other.groups);
    }

    /// Type names of the groups, sorted
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.groups.values().map(|e| e.type_name).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for OptionsSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.type_names()).finish()
    }
}
