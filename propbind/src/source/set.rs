//! Ordered aggregates of sources.

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use super::{
    AliasedSource, ConfigurationProperty, DescendantState, FilteredSource, MapSource,
    PrefixedSource, PropertyNameAliases, PropertySource, combine_states,
};
use crate::name::{InvalidNameFormat, PropertyName};

/// An immutable, ordered list of sources. Earlier sources take precedence.
///
/// Every transformation returns a new set sharing the underlying sources, so
/// a set can be handed to many concurrent binds.
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    sources: Arc<[Arc<dyn PropertySource>]>,
}

impl SourceSet {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding one source.
    #[must_use]
    pub fn single(source: Arc<dyn PropertySource>) -> Self {
        Self {
            sources: Arc::from(vec![source]),
        }
    }

    /// Sources in precedence order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn PropertySource>> {
        self.sources.iter()
    }

    /// Number of sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether the set holds no sources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// The source called `name`, if any.
    #[must_use]
    pub fn get_source(&self, name: &str) -> Option<&Arc<dyn PropertySource>> {
        self.sources.iter().find(|s| s.name() == name)
    }

    /// A new set with `source` at highest precedence.
    #[must_use]
    pub fn with_first(&self, source: Arc<dyn PropertySource>) -> Self {
        std::iter::once(source)
            .chain(self.sources.iter().cloned())
            .collect()
    }

    /// A new set with `source` at lowest precedence.
    #[must_use]
    pub fn with_last(&self, source: Arc<dyn PropertySource>) -> Self {
        self.sources
            .iter()
            .cloned()
            .chain(std::iter::once(source))
            .collect()
    }

    /// A new set exposing only names accepted by `filter`.
    #[must_use]
    pub fn filtered<F>(&self, filter: F) -> Self
    where
        F: Fn(&PropertyName) -> bool + Send + Sync + 'static,
    {
        let shared: Arc<dyn Fn(&PropertyName) -> bool + Send + Sync> = Arc::new(filter);
        self.map(|source| {
            let accepts = Arc::clone(&shared);
            Arc::new(FilteredSource::new(source, move |name| accepts(name))) as Arc<dyn PropertySource>
        })
    }

    /// A new set viewing every source below `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidNameFormat`] when `prefix` does not parse.
    pub fn prefixed(&self, prefix: &str) -> Result<Self, InvalidNameFormat> {
        self.sources
            .iter()
            .map(|source| {
                PrefixedSource::new(Arc::clone(source), prefix)
                    .map(|view| Arc::new(view) as Arc<dyn PropertySource>)
            })
            .collect()
    }

    /// A new set falling back to `aliases` on every source.
    #[must_use]
    pub fn with_aliases(&self, aliases: PropertyNameAliases) -> Self {
        let shared = Arc::new(aliases);
        self.map(|source| {
            Arc::new(AliasedSource::new(source, Arc::clone(&shared))) as Arc<dyn PropertySource>
        })
    }

    fn map<F>(&self, wrap: F) -> Self
    where
        F: Fn(Arc<dyn PropertySource>) -> Arc<dyn PropertySource>,
    {
        self.sources
            .iter()
            .map(|source| wrap(Arc::clone(source)))
            .collect()
    }
}

impl FromIterator<Arc<dyn PropertySource>> for SourceSet {
    fn from_iter<I: IntoIterator<Item = Arc<dyn PropertySource>>>(iter: I) -> Self {
        Self {
            sources: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<Arc<dyn PropertySource>>> for SourceSet {
    fn from(sources: Vec<Arc<dyn PropertySource>>) -> Self {
        Self {
            sources: sources.into(),
        }
    }
}

impl<'a> IntoIterator for &'a SourceSet {
    type Item = &'a Arc<dyn PropertySource>;
    type IntoIter = std::slice::Iter<'a, Arc<dyn PropertySource>>;

    fn into_iter(self) -> Self::IntoIter {
        self.sources.iter()
    }
}

/// A live list of sources that may change while the process runs.
///
/// Reads work on a snapshot taken under a read lock, so a concurrent
/// [`add_first`](Self::add_first) or [`remove`](Self::remove) never tears a
/// lookup. Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct AttachedSources {
    state: Arc<RwLock<Attached>>,
}

#[derive(Debug, Default)]
struct Attached {
    sources: Vec<Arc<dyn PropertySource>>,
    /// Entries behind the current defaults source, newest first.
    defaults: Vec<(String, Value)>,
}

impl Attached {
    fn position(&self, name: &str) -> Option<usize> {
        self.sources.iter().position(|s| s.name() == name)
    }
}

impl AttachedSources {
    /// Source name reported for lookups through the attached list.
    pub const NAME: &'static str = "attached";

    /// Name of the source holding application defaults.
    pub const DEFAULTS_NAME: &'static str = "defaultProperties";

    /// An empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at highest precedence.
    pub fn add_first(&self, source: Arc<dyn PropertySource>) {
        self.state.write().sources.insert(0, source);
    }

    /// Insert at lowest precedence.
    pub fn add_last(&self, source: Arc<dyn PropertySource>) {
        self.state.write().sources.push(source);
    }

    /// Remove the first source called `name`.
    pub fn remove(&self, name: &str) -> Option<Arc<dyn PropertySource>> {
        let mut state = self.state.write();
        let index = state.position(name)?;
        Some(state.sources.remove(index))
    }

    /// Replace the first source called `name`. Returns whether one was found.
    pub fn replace(&self, name: &str, source: Arc<dyn PropertySource>) -> bool {
        let mut state = self.state.write();
        match state.sources.iter_mut().find(|s| s.name() == name) {
            Some(slot) => {
                *slot = source;
                true
            }
            None => false,
        }
    }

    /// Add application defaults at lowest precedence.
    ///
    /// When a [`DEFAULTS_NAME`](Self::DEFAULTS_NAME) source added here is
    /// still attached, `entries` are merged into it in place and override
    /// keys it already holds. Otherwise a new source is appended. Empty
    /// `entries` change nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use propbind::{AttachedSources, MapSource, PropertyName, PropertySource};
    ///
    /// let attached = AttachedSources::new();
    /// attached.add_or_merge_defaults([("port", "80"), ("host", "localhost")]);
    /// attached.add_or_merge_defaults([("port", "8080")]);
    /// attached.add_last(Arc::new(MapSource::new("file", [("host", "example.org")])));
    /// attached.move_defaults_to_end();
    ///
    /// let port = attached.get(&PropertyName::parse("port").unwrap()).unwrap();
    /// assert_eq!(port.text(), "8080");
    /// let host = attached.get(&PropertyName::parse("host").unwrap()).unwrap();
    /// assert_eq!(host.text(), "example.org");
    /// ```
    pub fn add_or_merge_defaults<I, K, V>(&self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut merged: Vec<(String, Value)> = entries
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        if merged.is_empty() {
            return;
        }
        let mut state = self.state.write();
        let existing = state.position(Self::DEFAULTS_NAME);
        if existing.is_some() {
            let kept: Vec<(String, Value)> = state
                .defaults
                .iter()
                .filter(|(key, _)| merged.iter().all(|(added, _)| added != key))
                .cloned()
                .collect();
            merged.extend(kept);
        }
        let source: Arc<dyn PropertySource> =
            Arc::new(MapSource::new(Self::DEFAULTS_NAME, merged.iter().cloned()));
        state.defaults = merged;
        match existing.and_then(|index| state.sources.get_mut(index)) {
            Some(slot) => *slot = source,
            None => state.sources.push(source),
        }
        tracing::debug!(entries = state.defaults.len(), "defaults attached");
    }

    /// Move the [`DEFAULTS_NAME`](Self::DEFAULTS_NAME) source to lowest
    /// precedence. Returns whether one was attached.
    pub fn move_defaults_to_end(&self) -> bool {
        let mut state = self.state.write();
        let Some(index) = state.position(Self::DEFAULTS_NAME) else {
            return false;
        };
        let defaults = state.sources.remove(index);
        state.sources.push(defaults);
        true
    }

    /// Number of sources currently attached.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().sources.len()
    }

    /// Whether nothing is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().sources.is_empty()
    }

    /// The current sources as an immutable set.
    #[must_use]
    pub fn snapshot(&self) -> SourceSet {
        self.state.read().sources.iter().cloned().collect()
    }
}

impl PropertySource for AttachedSources {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn get(&self, name: &PropertyName) -> Option<ConfigurationProperty> {
        self.snapshot().iter().find_map(|source| source.get(name))
    }

    fn contains_descendant_of(&self, name: &PropertyName) -> DescendantState {
        combine_states(
            self.snapshot()
                .iter()
                .map(|source| source.contains_descendant_of(name)),
        )
    }

    fn property_names(&self) -> Option<Vec<PropertyName>> {
        let mut out: Vec<PropertyName> = Vec::new();
        for source in &self.snapshot() {
            for name in source.property_names()? {
                if !out.contains(&name) {
                    out.push(name);
                }
            }
        }
        Some(out)
    }
}
