//! The [`Bind`] trait and its implementations for containers.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::{BuildHasher, Hash};
use std::ops::Deref;
use std::sync::Arc;

use super::Binder;
use super::context::BindContext;
use crate::BindResult;
use crate::convert::ConversionFailure;
use crate::name::PropertyName;
use crate::origin::{Origin, OriginProvider};
use crate::source::ConfigurationProperty;

/// How a type is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Converted from a single value.
    Scalar,
    /// A list-like collection bound from `name[0]`, `name[1]`, ...
    Indexed,
    /// A keyed collection bound from `name.<key>`.
    Map,
    /// A composite with named properties.
    DataObject,
}

/// A type that can be bound from configuration properties.
///
/// Scalars implement [`from_property`](Self::from_property); collections,
/// maps and data objects implement [`bind_composite`](Self::bind_composite).
/// Data objects normally come from `#[derive(DataObject)]`.
pub trait Bind: Sized + Send + 'static {
    /// How this type is bound.
    fn shape() -> Shape;

    /// Convert a single resolved value.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionFailure`] describing why the value is unusable.
    /// The default rejects every value.
    fn from_property(_property: &ConfigurationProperty) -> Result<Self, ConversionFailure> {
        Err(ConversionFailure::new(format!(
            "cannot be converted to {}",
            std::any::type_name::<Self>()
        )))
    }

    /// Bind from the properties below `name`.
    ///
    /// Must return `existing` unchanged when nothing was found.
    ///
    /// # Errors
    ///
    /// Returns any error raised by nested binds.
    fn bind_composite(
        _binder: &Binder,
        _name: &PropertyName,
        existing: Option<Self>,
        _context: &mut BindContext,
    ) -> BindResult<Option<Self>> {
        Ok(existing)
    }

    /// Create an instance without any properties, if the type allows it.
    ///
    /// # Errors
    ///
    /// Returns an error when creation was attempted and failed.
    fn create(_binder: &Binder, _name: &PropertyName) -> BindResult<Option<Self>> {
        Ok(None)
    }
}

impl<T: Bind> Bind for Option<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn from_property(property: &ConfigurationProperty) -> Result<Self, ConversionFailure> {
        T::from_property(property).map(Some)
    }

    fn bind_composite(
        binder: &Binder,
        name: &PropertyName,
        existing: Option<Self>,
        context: &mut BindContext,
    ) -> BindResult<Option<Self>> {
        let had_existing = existing.is_some();
        match T::bind_composite(binder, name, existing.flatten(), context)? {
            Some(value) => Ok(Some(Some(value))),
            None if had_existing => Ok(Some(None)),
            None => Ok(None),
        }
    }

    fn create(_binder: &Binder, _name: &PropertyName) -> BindResult<Option<Self>> {
        Ok(Some(None))
    }
}

impl<T: Bind> Bind for Box<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn from_property(property: &ConfigurationProperty) -> Result<Self, ConversionFailure> {
        T::from_property(property).map(Self::new)
    }

    fn bind_composite(
        binder: &Binder,
        name: &PropertyName,
        existing: Option<Self>,
        context: &mut BindContext,
    ) -> BindResult<Option<Self>> {
        T::bind_composite(binder, name, existing.map(|boxed| *boxed), context)
            .map(|bound| bound.map(Self::new))
    }

    fn create(binder: &Binder, name: &PropertyName) -> BindResult<Option<Self>> {
        T::create(binder, name).map(|created| created.map(Self::new))
    }
}

macro_rules! indexed_collection {
    ($collection:ident where E: $($bounds:tt)+) => {
        impl<E> Bind for $collection<E>
        where
            E: $($bounds)+,
        {
            fn shape() -> Shape {
                Shape::Indexed
            }

            fn bind_composite(
                binder: &Binder,
                name: &PropertyName,
                existing: Option<Self>,
                context: &mut BindContext,
            ) -> BindResult<Option<Self>> {
                Ok(binder
                    .bind_indexed::<E>(name, context)?
                    .map(|items| items.into_iter().collect())
                    .or(existing))
            }

            fn create(_binder: &Binder, _name: &PropertyName) -> BindResult<Option<Self>> {
                Ok(Some(Self::new()))
            }
        }
    };
}

indexed_collection!(Vec where E: Bind);
indexed_collection!(VecDeque where E: Bind);
indexed_collection!(BTreeSet where E: Bind + Ord);
indexed_collection!(HashSet where E: Bind + Eq + Hash);

impl<K, V> Bind for BTreeMap<K, V>
where
    K: Bind + Ord,
    V: Bind,
{
    fn shape() -> Shape {
        Shape::Map
    }

    fn bind_composite(
        binder: &Binder,
        name: &PropertyName,
        existing: Option<Self>,
        context: &mut BindContext,
    ) -> BindResult<Option<Self>> {
        Ok(merge_entries(binder.bind_entries::<K, V>(name, context)?, existing))
    }

    fn create(_binder: &Binder, _name: &PropertyName) -> BindResult<Option<Self>> {
        Ok(Some(Self::new()))
    }
}

impl<K, V, S> Bind for HashMap<K, V, S>
where
    K: Bind + Eq + Hash,
    V: Bind,
    S: BuildHasher + Default + Send + 'static,
{
    fn shape() -> Shape {
        Shape::Map
    }

    fn bind_composite(
        binder: &Binder,
        name: &PropertyName,
        existing: Option<Self>,
        context: &mut BindContext,
    ) -> BindResult<Option<Self>> {
        Ok(merge_entries(binder.bind_entries::<K, V>(name, context)?, existing))
    }

    fn create(_binder: &Binder, _name: &PropertyName) -> BindResult<Option<Self>> {
        Ok(Some(Self::default()))
    }
}

fn merge_entries<M, K, V>(bound: Option<Vec<(K, V)>>, existing: Option<M>) -> Option<M>
where
    M: Default + Extend<(K, V)>,
{
    let Some(entries) = bound else {
        return existing;
    };
    let mut map = existing.unwrap_or_default();
    map.extend(entries);
    Some(map)
}

/// A scalar bound together with where it came from.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use propbind::{Bindable, Binder, MapSource, PropertySource, SourceSet, Tracked};
///
/// let source = Arc::new(MapSource::new("defaults", [("port", "80")])) as Arc<dyn PropertySource>;
/// let binder = Binder::new(SourceSet::single(source));
/// let port: Tracked<u16> = binder.bind("port", Bindable::of()).unwrap().unwrap();
/// assert_eq!(*port, 80);
/// assert!(port.origin().is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Tracked<T> {
    value: T,
    name: PropertyName,
    origin: Option<Arc<Origin>>,
}

impl<T> Tracked<T> {
    /// The bound value.
    #[must_use]
    pub const fn value(&self) -> &T {
        &self.value
    }

    /// The name the value was bound under.
    #[must_use]
    pub const fn name(&self) -> &PropertyName {
        &self.name
    }

    /// Where the value came from.
    #[must_use]
    pub const fn origin(&self) -> Option<&Arc<Origin>> {
        self.origin.as_ref()
    }

    /// Discard the provenance.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> Deref for Tracked<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> OriginProvider for Tracked<T> {
    fn origin(&self) -> Option<&Arc<Origin>> {
        Self::origin(self)
    }
}

impl<T: Bind> Bind for Tracked<T> {
    fn shape() -> Shape {
        Shape::Scalar
    }

    fn from_property(property: &ConfigurationProperty) -> Result<Self, ConversionFailure> {
        Ok(Self {
            value: T::from_property(property)?,
            name: property.name().clone(),
            origin: property.origin().cloned(),
        })
    }
}
