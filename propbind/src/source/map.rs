//! Flat key/value source.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::Value;

use super::{ConfigurationProperty, PropertySource};
use crate::name::PropertyName;
use crate::origin::Origin;

#[derive(Debug)]
struct Entry {
    name: PropertyName,
    value: Value,
    origin: Arc<Origin>,
}

/// A source backed by flat `key = value` pairs.
///
/// Lookups try the key exactly as written first, then the relaxed form.
/// When several keys fold to the same name, the first one inserted wins.
/// Keys that do not parse as property names are skipped.
///
/// # Examples
///
/// ```
/// use propbind::{MapSource, PropertyName, PropertySource};
///
/// let source = MapSource::new("defaults", [("my-app.port", "8080")]);
/// let found = source.get(&PropertyName::parse("myApp.port").unwrap()).unwrap();
/// assert_eq!(found.text(), "8080");
/// ```
#[derive(Debug)]
pub struct MapSource {
    name: Arc<str>,
    entries: Vec<Entry>,
    exact: HashMap<String, usize>,
    relaxed: HashMap<PropertyName, usize>,
}

impl MapSource {
    /// Build a source whose origins name the source and key.
    pub fn new<I, K, V>(name: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let source_name: String = name.into();
        let tagged = entries.into_iter().map(|(key, value)| {
            let key_text: String = key.into();
            let origin = Arc::new(Origin::property_source(source_name.as_str(), key_text.as_str()));
            (key_text, value.into(), origin)
        });
        Self::with_origins(source_name.clone(), tagged)
    }

    /// Build a source with an explicit origin per entry.
    pub fn with_origins<I>(name: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Value, Arc<Origin>)>,
    {
        let mut source = Self {
            name: name.into().into(),
            entries: Vec::new(),
            exact: HashMap::new(),
            relaxed: HashMap::new(),
        };
        for (key, value, origin) in entries {
            match PropertyName::parse(&key) {
                Ok(parsed) => {
                    let index = source.entries.len();
                    source.exact.entry(key).or_insert(index);
                    source.relaxed.entry(parsed.clone()).or_insert(index);
                    source.entries.push(Entry {
                        name: parsed,
                        value,
                        origin,
                    });
                }
                Err(err) => {
                    tracing::debug!(source = %source.name, key = %key, error = %err, "skipping key");
                }
            }
        }
        source
    }

    /// Number of accepted entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries were accepted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PropertySource for MapSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, name: &PropertyName) -> Option<ConfigurationProperty> {
        let index = self
            .exact
            .get(&name.original_text())
            .or_else(|| self.relaxed.get(name))?;
        let entry = self.entries.get(*index)?;
        Some(ConfigurationProperty::new(
            name.clone(),
            entry.value.clone(),
            Some(Arc::clone(&entry.origin)),
            Arc::clone(&self.name),
        ))
    }

    fn property_names(&self) -> Option<Vec<PropertyName>> {
        let mut seen = HashSet::with_capacity(self.entries.len());
        Some(
            self.entries
                .iter()
                .filter(|entry| seen.insert(&entry.name))
                .map(|entry| entry.name.clone())
                .collect(),
        )
    }
}
