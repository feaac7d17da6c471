//! Property sources and their aggregation.
//!
//! A [`PropertySource`] answers two questions for a [`PropertyName`]: is there
//! a value here, and might there be values below here. Sources compose into an
//! ordered [`SourceSet`] where earlier sources win.

mod cli;
mod env;
mod figment_adapter;
mod map;
mod set;
mod structured;
mod view;

pub use cli::CommandLineSource;
pub use env::EnvironmentSource;
pub use figment_adapter::FigmentSource;
pub use map::MapSource;
pub use set::{AttachedSources, SourceSet};
pub use structured::{OriginStrategy, StructuredSource};
pub use view::{AliasedSource, FilteredSource, PrefixedSource, PropertyNameAliases};

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::name::PropertyName;
use crate::origin::{Origin, OriginProvider};

/// Whether a source holds anything below a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescendantState {
    /// At least one descendant exists.
    Present,
    /// No descendant exists.
    Absent,
    /// The source cannot tell cheaply; callers must assume one may exist.
    Unknown,
}

/// A resolved name, value and origin.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationProperty {
    name: PropertyName,
    value: Value,
    origin: Option<Arc<Origin>>,
    source: Arc<str>,
}

impl ConfigurationProperty {
    /// Build a property. `value` should be a scalar.
    #[must_use]
    pub fn new(
        name: PropertyName,
        value: impl Into<Value>,
        origin: Option<Arc<Origin>>,
        source: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            name,
            value: value.into(),
            origin,
            source: source.into(),
        }
    }

    /// Name the property was requested under.
    #[must_use]
    pub const fn name(&self) -> &PropertyName {
        &self.name
    }

    /// Raw value.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// Where the value came from.
    #[must_use]
    pub const fn origin(&self) -> Option<&Arc<Origin>> {
        self.origin.as_ref()
    }

    /// Name of the source that supplied the value.
    #[must_use]
    pub fn source_name(&self) -> &str {
        &self.source
    }

    /// The value as text. Null renders as the empty string.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        value_text(&self.value)
    }

    /// Whether the value is the explicit empty marker.
    #[must_use]
    pub fn is_empty_marker(&self) -> bool {
        self.text().trim().is_empty()
    }

    /// Replace the value, keeping name, origin and source.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    /// Rename the property, keeping everything else.
    #[must_use]
    pub fn renamed(mut self, name: PropertyName) -> Self {
        self.name = name;
        self
    }
}

impl OriginProvider for ConfigurationProperty {
    fn origin(&self) -> Option<&Arc<Origin>> {
        Self::origin(self)
    }
}

impl fmt::Display for ConfigurationProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.text())
    }
}

pub(crate) fn value_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(text) => Cow::Borrowed(text),
        Value::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}

/// A read-only view of configuration values keyed by [`PropertyName`].
///
/// Only [`name`](Self::name) and [`get`](Self::get) are mandatory. Sources
/// that can list their names should override
/// [`property_names`](Self::property_names) so that maps, collections and
/// unknown-field checks can discover descendants.
pub trait PropertySource: Send + Sync + fmt::Debug {
    /// Human-readable name used in origins and diagnostics.
    fn name(&self) -> &str;

    /// Look up a single value.
    fn get(&self, name: &PropertyName) -> Option<ConfigurationProperty>;

    /// Report whether anything exists below `name`.
    fn contains_descendant_of(&self, name: &PropertyName) -> DescendantState {
        match self.descendant_names(name) {
            Some(names) if names.is_empty() => DescendantState::Absent,
            Some(_) => DescendantState::Present,
            None => DescendantState::Unknown,
        }
    }

    /// Every name this source holds, or `None` when it cannot enumerate them.
    fn property_names(&self) -> Option<Vec<PropertyName>> {
        None
    }

    /// Names strictly below `name`, or `None` when unknown.
    fn descendant_names(&self, name: &PropertyName) -> Option<Vec<PropertyName>> {
        self.property_names().map(|names| {
            names
                .into_iter()
                .filter(|candidate| name.is_ancestor_of(candidate))
                .collect()
        })
    }
}

impl<S: PropertySource + ?Sized> PropertySource for Arc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn get(&self, name: &PropertyName) -> Option<ConfigurationProperty> {
        (**self).get(name)
    }

    fn contains_descendant_of(&self, name: &PropertyName) -> DescendantState {
        (**self).contains_descendant_of(name)
    }

    fn property_names(&self) -> Option<Vec<PropertyName>> {
        (**self).property_names()
    }

    fn descendant_names(&self, name: &PropertyName) -> Option<Vec<PropertyName>> {
        (**self).descendant_names(name)
    }
}

/// Combine descendant states from several sources.
///
/// Any `Present` wins, then any `Unknown`, otherwise `Absent`.
pub(crate) fn combine_states(states: impl IntoIterator<Item = DescendantState>) -> DescendantState {
    let mut unknown = false;
    for state in states {
        match state {
            DescendantState::Present => return DescendantState::Present,
            DescendantState::Unknown => unknown = true,
            DescendantState::Absent => {}
        }
    }
    if unknown {
        DescendantState::Unknown
    } else {
        DescendantState::Absent
    }
}

#[cfg(test)]
mod tests;
