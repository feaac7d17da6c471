//! Source over a nested `serde_json::Value` tree.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use camino::Utf8PathBuf;
use serde_json::Value;

use super::{ConfigurationProperty, PropertySource};
use crate::name::{Element, PropertyName};
use crate::origin::Origin;

/// How a [`StructuredSource`] describes where a value came from.
#[derive(Clone, Default)]
pub enum OriginStrategy {
    /// Name the source and the dotted key path.
    #[default]
    SourceKey,
    /// Point at a file, keyed by the dotted path.
    File {
        /// Path of the file the tree was parsed from.
        path: Utf8PathBuf,
        /// Origin of whatever caused the file to be loaded.
        parent: Option<Arc<Origin>>,
    },
    /// Ask a callback for the origin of a dotted key path.
    Custom(Arc<dyn Fn(&str) -> Option<Arc<Origin>> + Send + Sync>),
}

impl fmt::Debug for OriginStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceKey => f.write_str("SourceKey"),
            Self::File { path, parent } => f
                .debug_struct("File")
                .field("path", path)
                .field("parent", parent)
                .finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A source over nested objects and arrays.
///
/// The tree is walked per query rather than flattened up front. Object keys
/// may themselves contain dots or brackets and then match several name
/// elements at once; a key spelled exactly like the requested element is
/// preferred over relaxed matches. Empty arrays and objects resolve to an
/// empty value, which marks an explicitly empty collection.
///
/// # Examples
///
/// ```
/// use propbind::{PropertyName, PropertySource, StructuredSource};
/// use serde_json::json;
///
/// let source = StructuredSource::new(
///     "app.json",
///     json!({ "server": { "hosts": ["a", "b"] } }),
/// );
/// let host = source.get(&PropertyName::parse("server.hosts[1]").unwrap()).unwrap();
/// assert_eq!(host.text(), "b");
/// ```
#[derive(Debug)]
pub struct StructuredSource {
    name: Arc<str>,
    root: Value,
    origins: OriginStrategy,
}

impl StructuredSource {
    /// Wrap `root` under the given source name.
    pub fn new(name: impl Into<String>, root: Value) -> Self {
        Self {
            name: name.into().into(),
            root,
            origins: OriginStrategy::SourceKey,
        }
    }

    /// Choose how origins are reported.
    #[must_use]
    pub fn with_origins(mut self, origins: OriginStrategy) -> Self {
        self.origins = origins;
        self
    }

    /// The wrapped tree.
    #[must_use]
    pub const fn root(&self) -> &Value {
        &self.root
    }

    fn origin_for(&self, key: &str) -> Option<Arc<Origin>> {
        match &self.origins {
            OriginStrategy::SourceKey => Some(Arc::new(Origin::property_source(&*self.name, key))),
            OriginStrategy::File { path, parent } => {
                let origin = Origin::text_resource(path.clone()).with_key(key);
                Some(Arc::new(match parent {
                    Some(parent) => origin.with_parent(Arc::clone(parent)),
                    None => origin,
                }))
            }
            OriginStrategy::Custom(resolve) => resolve(key),
        }
    }
}

impl PropertySource for StructuredSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, name: &PropertyName) -> Option<ConfigurationProperty> {
        if name.is_empty() {
            return None;
        }
        let mut trail = Vec::new();
        let node = find_leaf(&self.root, name.elements(), &mut trail)?;
        let value = match node {
            Value::Array(_) | Value::Object(_) | Value::Null => Value::String(String::new()),
            other => other.clone(),
        };
        Some(ConfigurationProperty::new(
            name.clone(),
            value,
            self.origin_for(&trail.join(".")),
            Arc::clone(&self.name),
        ))
    }

    fn property_names(&self) -> Option<Vec<PropertyName>> {
        let mut out = Vec::new();
        flatten(&self.root, &PropertyName::empty(), &mut out);
        out.retain(|name| !name.is_empty());
        Some(dedupe(out))
    }

    fn descendant_names(&self, name: &PropertyName) -> Option<Vec<PropertyName>> {
        let mut out = Vec::new();
        collect(&self.root, &PropertyName::empty(), name.elements(), &mut out);
        out.retain(|candidate| name.is_ancestor_of(candidate));
        Some(dedupe(out))
    }
}

/// The name of an object key, or `None` when no name can spell it.
fn key_name(key: &str) -> Option<PropertyName> {
    let parsed = PropertyName::parse(key)
        .ok()
        .filter(|name| !name.is_empty());
    if parsed.is_some() {
        return parsed;
    }
    PropertyName::empty()
        .append_key(key)
        .inspect_err(|err| tracing::debug!(key = %key, error = %err, "skipping key"))
        .ok()
}

fn is_leaf(node: &Value) -> bool {
    match node {
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => true,
    }
}

fn find_leaf<'v>(node: &'v Value, remaining: &[Element], trail: &mut Vec<String>) -> Option<&'v Value> {
    let Some((head, tail)) = remaining.split_first() else {
        return is_leaf(node).then_some(node);
    };
    match node {
        Value::Array(items) => {
            let child = items.get(head.index()?)?;
            trail.push(head.original().to_owned());
            let found = find_leaf(child, tail, trail);
            if found.is_none() {
                trail.pop();
            }
            found
        }
        Value::Object(map) => {
            if let Some(child) = map.get(head.original()) {
                trail.push(head.original().to_owned());
                if let Some(found) = find_leaf(child, tail, trail) {
                    return Some(found);
                }
                trail.pop();
            }
            for (key, child) in map {
                let Some(parsed) = key_name(key) else {
                    continue;
                };
                let width = parsed.len();
                if width > remaining.len()
                    || remaining.get(..width) != Some(parsed.elements())
                {
                    continue;
                }
                trail.push(key.clone());
                let rest = remaining.get(width..).unwrap_or_default();
                if let Some(found) = find_leaf(child, rest, trail) {
                    return Some(found);
                }
                trail.pop();
            }
            None
        }
        _ => None,
    }
}

fn collect(node: &Value, consumed: &PropertyName, remaining: &[Element], out: &mut Vec<PropertyName>) {
    let Some(head) = remaining.first() else {
        flatten(node, consumed, out);
        return;
    };
    match node {
        Value::Array(items) => {
            if let Some(index) = head.index() {
                if let Some(child) = items.get(index) {
                    let rest = remaining.get(1..).unwrap_or_default();
                    collect(child, &consumed.append_index(index), rest, out);
                }
            }
        }
        Value::Object(map) => {
            for (key, child) in map {
                let Some(parsed) = key_name(key) else {
                    continue;
                };
                let elements = parsed.elements();
                let shared = elements.len().min(remaining.len());
                if elements.get(..shared) != remaining.get(..shared) {
                    continue;
                }
                let next = consumed.join(&parsed);
                match remaining.get(elements.len()..) {
                    Some(rest) => collect(child, &next, rest, out),
                    None => flatten(child, &next, out),
                }
            }
        }
        _ => {}
    }
}

fn flatten(node: &Value, name: &PropertyName, out: &mut Vec<PropertyName>) {
    match node {
        Value::Array(items) if !items.is_empty() => {
            for (index, child) in items.iter().enumerate() {
                flatten(child, &name.append_index(index), out);
            }
        }
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                if let Some(parsed) = key_name(key) {
                    flatten(child, &name.join(&parsed), out);
                }
            }
        }
        _ => out.push(name.clone()),
    }
}

fn dedupe(names: Vec<PropertyName>) -> Vec<PropertyName> {
    let mut seen = HashSet::with_capacity(names.len());
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}
