//! Per-type cache of data-object shapes.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use super::object::{DataObject, ObjectShape};

type Entry = Arc<dyn Any + Send + Sync>;

/// Shapes described so far, keyed by type.
///
/// A registry is owned by whoever builds the [`Binder`](super::Binder) and
/// may be shared between binders through `Arc`. Each type is described at
/// most once per registry, except when two threads race on the first
/// lookup, in which case the first stored shape wins.
#[derive(Default)]
pub struct ShapeRegistry {
    shapes: RwLock<HashMap<TypeId, Entry>>,
}

impl ShapeRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The shape of `T`, describing it on first use.
    #[must_use]
    pub fn shape<T: DataObject>(&self) -> Arc<ObjectShape<T>> {
        let id = TypeId::of::<T>();
        if let Some(shape) = self.lookup::<T>(id) {
            return shape;
        }
        let described: Arc<ObjectShape<T>> = Arc::new(T::describe());
        let mut shapes = self.shapes.write();
        let entry = shapes
            .entry(id)
            .or_insert_with(|| Arc::clone(&described) as Entry);
        Arc::clone(entry)
            .downcast::<ObjectShape<T>>()
            .unwrap_or(described)
    }

    fn lookup<T: DataObject>(&self, id: TypeId) -> Option<Arc<ObjectShape<T>>> {
        let shapes = self.shapes.read();
        let entry = shapes.get(&id)?;
        Arc::clone(entry).downcast::<ObjectShape<T>>().ok()
    }

    /// Whether `T` has been described.
    #[must_use]
    pub fn contains<T: DataObject>(&self) -> bool {
        self.shapes.read().contains_key(&TypeId::of::<T>())
    }

    /// Number of described types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.read().len()
    }

    /// Whether nothing has been described yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.read().is_empty()
    }
}

impl fmt::Debug for ShapeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShapeRegistry")
            .field("types", &self.len())
            .finish()
    }
}
