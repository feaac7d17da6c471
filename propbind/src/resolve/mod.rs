//! Name and value resolution across an ordered source set.

mod placeholder;

pub use placeholder::PlaceholderResolver;

use crate::name::PropertyName;
use crate::source::{ConfigurationProperty, DescendantState, SourceSet, combine_states};

/// Outcome of resolving one name.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A value exists at the name.
    Found(ConfigurationProperty),
    /// No value, but something may exist below the name.
    HasDescendants(DescendantState),
    /// Nothing at or below the name.
    NotFound,
}

/// Looks names up in precedence order.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use propbind::{MapSource, PropertyName, PropertySource, Resolver, SourceSet};
///
/// let sources: SourceSet = vec![
///     Arc::new(MapSource::new("a", [("x", "1")])) as Arc<dyn PropertySource>,
///     Arc::new(MapSource::new("b", [("x", "2")])),
/// ]
/// .into();
/// let found = Resolver::new(&sources).find(&PropertyName::parse("x").unwrap()).unwrap();
/// assert_eq!(found.text(), "1");
/// assert_eq!(found.source_name(), "a");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'s> {
    sources: &'s SourceSet,
}

impl<'s> Resolver<'s> {
    /// Resolve against `sources`.
    #[must_use]
    pub const fn new(sources: &'s SourceSet) -> Self {
        Self { sources }
    }

    /// The first value for `name`.
    #[must_use]
    pub fn find(&self, name: &PropertyName) -> Option<ConfigurationProperty> {
        let found = self.sources.iter().find_map(|source| source.get(name));
        if let Some(property) = &found {
            tracing::trace!(name = %name, source = property.source_name(), "resolved property");
        }
        found
    }

    /// Combined descendant state of every source.
    #[must_use]
    pub fn descendant_state(&self, name: &PropertyName) -> DescendantState {
        combine_states(
            self.sources
                .iter()
                .map(|source| source.contains_descendant_of(name)),
        )
    }

    /// Classify `name` as a value, a branch or nothing.
    #[must_use]
    pub fn resolve(&self, name: &PropertyName) -> Resolution {
        if let Some(property) = self.find(name) {
            return Resolution::Found(property);
        }
        match self.descendant_state(name) {
            DescendantState::Absent => Resolution::NotFound,
            state => Resolution::HasDescendants(state),
        }
    }
}

#[cfg(test)]
mod tests;
