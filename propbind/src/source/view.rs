//! Composed views over another source: filtering, prefixing and aliasing.
//!
//! Views never modify the wrapped source, so any number of them can share
//! one underlying source.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{ConfigurationProperty, DescendantState, PropertySource};
use crate::name::{InvalidNameFormat, PropertyName};

type NameFilter = Arc<dyn Fn(&PropertyName) -> bool + Send + Sync>;

/// Only exposes names accepted by a predicate.
#[derive(Clone)]
pub struct FilteredSource {
    inner: Arc<dyn PropertySource>,
    filter: NameFilter,
}

impl FilteredSource {
    /// Wrap `inner`, keeping names for which `filter` returns `true`.
    pub fn new<F>(inner: Arc<dyn PropertySource>, filter: F) -> Self
    where
        F: Fn(&PropertyName) -> bool + Send + Sync + 'static,
    {
        Self {
            inner,
            filter: Arc::new(filter),
        }
    }
}

impl fmt::Debug for FilteredSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilteredSource")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl PropertySource for FilteredSource {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn get(&self, name: &PropertyName) -> Option<ConfigurationProperty> {
        if (self.filter)(name) {
            self.inner.get(name)
        } else {
            None
        }
    }

    fn contains_descendant_of(&self, name: &PropertyName) -> DescendantState {
        match self.descendant_names(name) {
            Some(names) if names.is_empty() => DescendantState::Absent,
            Some(_) => DescendantState::Present,
            None => match self.inner.contains_descendant_of(name) {
                DescendantState::Absent => DescendantState::Absent,
                _ => DescendantState::Unknown,
            },
        }
    }

    fn property_names(&self) -> Option<Vec<PropertyName>> {
        self.inner
            .property_names()
            .map(|names| names.into_iter().filter(|n| (self.filter)(n)).collect())
    }

    fn descendant_names(&self, name: &PropertyName) -> Option<Vec<PropertyName>> {
        self.inner
            .descendant_names(name)
            .map(|names| names.into_iter().filter(|n| (self.filter)(n)).collect())
    }
}

/// Exposes the part of a source below a prefix, with the prefix removed.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use propbind::{MapSource, PrefixedSource, PropertyName, PropertySource};
///
/// let base = Arc::new(MapSource::new("m", [("app.server.port", "80")]));
/// let view = PrefixedSource::new(base, "app.server").unwrap();
/// assert!(view.get(&PropertyName::parse("port").unwrap()).is_some());
/// ```
#[derive(Debug, Clone)]
pub struct PrefixedSource {
    inner: Arc<dyn PropertySource>,
    prefix: PropertyName,
}

impl PrefixedSource {
    /// Wrap `inner` under `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidNameFormat`] when `prefix` does not parse.
    pub fn new(inner: Arc<dyn PropertySource>, prefix: &str) -> Result<Self, InvalidNameFormat> {
        Ok(Self {
            inner,
            prefix: PropertyName::parse(prefix)?,
        })
    }
}

impl PropertySource for PrefixedSource {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn get(&self, name: &PropertyName) -> Option<ConfigurationProperty> {
        self.inner
            .get(&self.prefix.join(name))
            .map(|property| property.renamed(name.clone()))
    }

    fn contains_descendant_of(&self, name: &PropertyName) -> DescendantState {
        self.inner.contains_descendant_of(&self.prefix.join(name))
    }

    fn property_names(&self) -> Option<Vec<PropertyName>> {
        self.inner.descendant_names(&self.prefix).map(|names| {
            names
                .into_iter()
                .map(|n| n.sub_name(self.prefix.len()))
                .collect()
        })
    }

    fn descendant_names(&self, name: &PropertyName) -> Option<Vec<PropertyName>> {
        self.inner.descendant_names(&self.prefix.join(name)).map(|names| {
            names
                .into_iter()
                .map(|n| n.sub_name(self.prefix.len()))
                .collect()
        })
    }
}

/// Alternative names to try when a name has no value.
///
/// Aliases also apply below the aliased name: with `app.old` aliased to
/// `app.new`, a lookup of `app.old.port` falls back to `app.new.port`.
#[derive(Debug, Clone, Default)]
pub struct PropertyNameAliases {
    aliases: HashMap<PropertyName, Vec<PropertyName>>,
}

impl PropertyNameAliases {
    /// No aliases.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `aliases` for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidNameFormat`] when any name does not parse.
    pub fn add(&mut self, name: &str, aliases: &[&str]) -> Result<(), InvalidNameFormat> {
        let canonical = PropertyName::parse(name)?;
        let parsed = aliases
            .iter()
            .map(|alias| PropertyName::parse(alias))
            .collect::<Result<Vec<_>, _>>()?;
        self.aliases.entry(canonical).or_default().extend(parsed);
        Ok(())
    }

    /// Builder form of [`add`](Self::add).
    ///
    /// # Errors
    ///
    /// Returns [`InvalidNameFormat`] when any name does not parse.
    pub fn with(mut self, name: &str, aliases: &[&str]) -> Result<Self, InvalidNameFormat> {
        self.add(name, aliases)?;
        Ok(self)
    }

    /// Names to try in place of `name`.
    #[must_use]
    pub fn aliases_for(&self, name: &PropertyName) -> Vec<PropertyName> {
        let mut out = Vec::new();
        for (aliased, targets) in &self.aliases {
            if aliased == name {
                out.extend(targets.iter().cloned());
            } else if aliased.is_ancestor_of(name) {
                let tail = name.sub_name(aliased.len());
                out.extend(targets.iter().map(|t| t.join(&tail)));
            }
        }
        out
    }

    /// Names whose aliases point at or above `target`, mapped back.
    fn reverse(&self, target: &PropertyName) -> Vec<PropertyName> {
        let mut out = Vec::new();
        for (aliased, targets) in &self.aliases {
            for alias in targets {
                if alias == target {
                    out.push(aliased.clone());
                } else if alias.is_ancestor_of(target) {
                    out.push(aliased.join(&target.sub_name(alias.len())));
                }
            }
        }
        out
    }

    /// Whether no aliases are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// Falls back to aliased names when a lookup misses.
///
/// Returned properties keep the requested name and the origin of the value
/// actually found.
#[derive(Debug, Clone)]
pub struct AliasedSource {
    inner: Arc<dyn PropertySource>,
    aliases: Arc<PropertyNameAliases>,
}

impl AliasedSource {
    /// Wrap `inner` with `aliases`.
    #[must_use]
    pub fn new(inner: Arc<dyn PropertySource>, aliases: Arc<PropertyNameAliases>) -> Self {
        Self { inner, aliases }
    }
}

impl PropertySource for AliasedSource {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn get(&self, name: &PropertyName) -> Option<ConfigurationProperty> {
        self.inner.get(name).or_else(|| {
            self.aliases
                .aliases_for(name)
                .iter()
                .find_map(|alias| self.inner.get(alias))
                .map(|property| property.renamed(name.clone()))
        })
    }

    fn contains_descendant_of(&self, name: &PropertyName) -> DescendantState {
        let direct = self.inner.contains_descendant_of(name);
        if direct == DescendantState::Present {
            return direct;
        }
        let via_alias = super::combine_states(
            self.aliases
                .aliases_for(name)
                .iter()
                .map(|alias| self.inner.contains_descendant_of(alias)),
        );
        super::combine_states([direct, via_alias])
    }

    fn property_names(&self) -> Option<Vec<PropertyName>> {
        let names = self.inner.property_names()?;
        let mut out = names.clone();
        for name in &names {
            for aliased in self.aliases.reverse(name) {
                if !out.contains(&aliased) {
                    out.push(aliased);
                }
            }
        }
        Some(out)
    }
}
