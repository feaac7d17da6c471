//! Indexed collections and maps.
//!
//! A collection comes from exactly one source: the first that either holds a
//! comma-separated value at the collection's name or holds indexed children
//! below it. Maps merge keys from every source; for a duplicated key the
//! first source wins.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde_json::Value;

use super::bindable::Bindable;
use super::context::BindContext;
use super::target::{Bind, Shape};
use super::{Binder, conversion_error};
use crate::BindResult;
use crate::convert::ConversionFailure;
use crate::error::{BindError, UnboundProperty};
use crate::name::PropertyName;
use crate::source::{ConfigurationProperty, DescendantState, PropertySource};

impl Binder {
    /// Bind the elements of an indexed collection at `name`.
    ///
    /// Returns `Ok(None)` when no source supplies the collection.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::UnboundElements`] when indexed properties are
    /// not contiguous from zero, and any element bind error.
    pub fn bind_indexed<E: Bind>(
        &self,
        name: &PropertyName,
        context: &mut BindContext,
    ) -> BindResult<Option<Vec<E>>> {
        let sources = context.sources().clone();
        for source in &sources {
            if let Some(raw) = source.get(name) {
                let property = self.resolve_placeholders(raw, context)?;
                let items = split_scalar::<E>(&property)?;
                context.record_bound(property);
                context.record_aggregate(name);
                return Ok(Some(items));
            }
            let children = indexed_children(source.as_ref(), name);
            let items = context.with_source(Arc::clone(source), |scoped| {
                self.bind_elements::<E>(name, source.as_ref(), scoped)
            })?;
            let unbound: Vec<UnboundProperty> = children
                .range(items.len()..)
                .flat_map(|(_, names)| names)
                .map(|leftover| UnboundProperty {
                    name: leftover.clone(),
                    origin: source.get(leftover).and_then(|p| p.origin().cloned()),
                })
                .collect();
            if !unbound.is_empty() {
                return Err(Arc::new(BindError::UnboundElements {
                    name: name.clone(),
                    unbound,
                }));
            }
            if !items.is_empty() {
                tracing::trace!(name = %name, source = source.name(), count = items.len(), "bound indexed elements");
                context.record_aggregate(name);
                return Ok(Some(items));
            }
        }
        Ok(None)
    }

    fn bind_elements<E: Bind>(
        &self,
        name: &PropertyName,
        source: &dyn PropertySource,
        context: &mut BindContext,
    ) -> BindResult<Vec<E>> {
        let mut items = Vec::new();
        loop {
            let element = name.append_index(items.len());
            if source.get(&element).is_none()
                && source.contains_descendant_of(&element) == DescendantState::Absent
            {
                break;
            }
            match self.bind_name::<E>(&element, Bindable::of(), context)? {
                Some(item) => items.push(item),
                None => break,
            }
        }
        Ok(items)
    }

    /// Bind the entries of a map at `name`.
    ///
    /// Scalar values are keyed by the whole remainder of their name, so
    /// `map.a.b=1` yields the key `a.b`; composite values are keyed by the
    /// first element after `name`. Returns `Ok(None)` when no entry exists
    /// and no source holds an explicit empty value at `name`.
    ///
    /// # Errors
    ///
    /// Returns a conversion error for an unusable key and any value error.
    pub fn bind_entries<K: Bind, V: Bind>(
        &self,
        name: &PropertyName,
        context: &mut BindContext,
    ) -> BindResult<Option<Vec<(K, V)>>> {
        let sources = context.sources().clone();
        let mut entries = Vec::new();
        let mut seen = HashSet::new();
        let mut explicit_empty = false;
        for source in &sources {
            if let Some(marker) = source.get(name).filter(ConfigurationProperty::is_empty_marker) {
                if !explicit_empty {
                    context.record_bound(marker);
                    context.record_aggregate(name);
                }
                explicit_empty = true;
            }
            let Some(children) = source.descendant_names(name) else {
                continue;
            };
            for child in children {
                let entry = if V::shape() == Shape::Scalar {
                    child
                } else {
                    child.chop(name.len() + 1)
                };
                if !seen.insert(entry.clone()) {
                    continue;
                }
                let key_property = ConfigurationProperty::new(
                    entry.clone(),
                    entry.key_text(name.len()),
                    source.get(&entry).and_then(|p| p.origin().cloned()),
                    source.name(),
                );
                let key = K::from_property(&key_property)
                    .map_err(|failure| conversion_error::<K>(&key_property, &failure))?;
                if let Some(value) = self.bind_name::<V>(&entry, Bindable::of(), context)? {
                    entries.push((key, value));
                }
            }
        }
        if entries.is_empty() && !explicit_empty {
            return Ok(None);
        }
        Ok(Some(entries))
    }
}

fn split_scalar<E: Bind>(property: &ConfigurationProperty) -> BindResult<Vec<E>> {
    if property.is_empty_marker() {
        return Ok(Vec::new());
    }
    if E::shape() != Shape::Scalar {
        return Err(conversion_error::<Vec<E>>(
            property,
            &ConversionFailure::new("a single value cannot hold structured elements"),
        ));
    }
    let parts: Vec<Value> = match property.value() {
        Value::String(text) => text
            .split(',')
            .map(|part| Value::String(part.trim().to_owned()))
            .collect(),
        other => vec![other.clone()],
    };
    parts
        .into_iter()
        .enumerate()
        .map(|(index, part)| {
            let element = property
                .clone()
                .renamed(property.name().append_index(index))
                .with_value(part);
            E::from_property(&element).map_err(|failure| conversion_error::<E>(&element, &failure))
        })
        .collect()
}

fn indexed_children(
    source: &dyn PropertySource,
    name: &PropertyName,
) -> BTreeMap<usize, Vec<PropertyName>> {
    let mut children: BTreeMap<usize, Vec<PropertyName>> = BTreeMap::new();
    for child in source.descendant_names(name).unwrap_or_default() {
        if let Some(index) = child.element(name.len()).and_then(|e| e.index()) {
            children.entry(index).or_default().push(child);
        }
    }
    children
}
