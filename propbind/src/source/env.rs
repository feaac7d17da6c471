//! Environment variable source.

use std::sync::Arc;

use uncased::UncasedStr;

use super::{ConfigurationProperty, PropertySource};
use crate::name::{ElementKind, Form, PropertyName};
use crate::origin::Origin;

/// A source over environment variables.
///
/// `my-app.servers[0].host` is looked up as `MYAPP_SERVERS_0_HOST` and then
/// as `MY_APP_SERVERS_0_HOST`, ignoring case. Names with non-numeric
/// bracketed elements cannot be expressed and never match. When a prefix is
/// set, only variables starting with `PREFIX_` are visible and the prefix is
/// stripped.
///
/// # Examples
///
/// ```
/// use propbind::{EnvironmentSource, PropertyName, PropertySource};
///
/// let source = EnvironmentSource::from_vars("env", [("MY_APP_PORT", "80")]);
/// let port = source.get(&PropertyName::parse("my-app.port").unwrap()).unwrap();
/// assert_eq!(port.text(), "80");
/// ```
#[derive(Debug, Clone)]
pub struct EnvironmentSource {
    name: Arc<str>,
    prefix: Option<String>,
    vars: Vec<(String, String)>,
}

impl EnvironmentSource {
    /// Name used for the process environment.
    pub const SYSTEM_NAME: &'static str = "systemEnvironment";

    /// Snapshot the current process environment.
    #[must_use]
    pub fn from_process() -> Self {
        Self::from_vars(Self::SYSTEM_NAME, std::env::vars())
    }

    /// Build a source from explicit variables.
    pub fn from_vars<I, K, V>(name: impl Into<String>, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.into().into(),
            prefix: None,
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Only expose variables starting with `prefix` followed by `_`.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let text: String = prefix.into();
        let trimmed = text.trim_end_matches('_');
        self.prefix = (!trimmed.is_empty()).then(|| trimmed.to_owned());
        self
    }

    fn full_name(&self, candidate: &str) -> String {
        match &self.prefix {
            Some(prefix) if candidate.is_empty() => prefix.clone(),
            Some(prefix) => format!("{prefix}_{candidate}"),
            None => candidate.to_owned(),
        }
    }

    fn lookup(&self, variable: &str) -> Option<&(String, String)> {
        let wanted = UncasedStr::new(variable);
        self.vars
            .iter()
            .find(|(key, _)| UncasedStr::new(key) == wanted)
    }

    /// Variable names stripped of the prefix.
    fn visible(&self) -> impl Iterator<Item = (&str, &(String, String))> {
        self.vars.iter().filter_map(move |entry| match &self.prefix {
            None => Some((entry.0.as_str(), entry)),
            Some(prefix) => strip_prefix_ignore_case(&entry.0, prefix)
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|rest| (rest, entry)),
        })
    }
}

/// Candidate variable names for `name`, most preferred first.
fn candidates(name: &PropertyName) -> Vec<String> {
    let mut compact = Vec::with_capacity(name.len());
    let mut legacy = Vec::with_capacity(name.len());
    for element in name.elements() {
        match element.kind() {
            ElementKind::Dotted => {
                compact.push(element.form(Form::Uniform).to_ascii_uppercase());
                legacy.push(element.form(Form::Dashed).replace('-', "_").to_ascii_uppercase());
            }
            ElementKind::NumericIndex => {
                compact.push(element.original().to_owned());
                legacy.push(element.original().to_owned());
            }
            ElementKind::Indexed => return Vec::new(),
        }
    }
    let compact_form = compact.join("_");
    let legacy_form = legacy.join("_");
    if compact_form == legacy_form {
        vec![compact_form]
    } else {
        vec![compact_form, legacy_form]
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if UncasedStr::new(head) == UncasedStr::new(prefix) {
        text.get(prefix.len()..)
    } else {
        None
    }
}

/// Map a variable name (without prefix) to a property name.
fn variable_name(variable: &str) -> Option<PropertyName> {
    let mut name = PropertyName::empty();
    for part in variable.split('_').filter(|part| !part.is_empty()) {
        if part.bytes().all(|b| b.is_ascii_digit()) {
            name = name.append_index(part.parse().ok()?);
        } else {
            name = name.append(&part.to_ascii_lowercase()).ok()?;
        }
    }
    (!name.is_empty()).then_some(name)
}

impl PropertySource for EnvironmentSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, name: &PropertyName) -> Option<ConfigurationProperty> {
        if name.is_empty() {
            return None;
        }
        candidates(name).into_iter().find_map(|candidate| {
            let (variable, value) = self.lookup(&self.full_name(&candidate))?;
            Some(ConfigurationProperty::new(
                name.clone(),
                value.clone(),
                Some(Arc::new(Origin::environment(variable.as_str()))),
                Arc::clone(&self.name),
            ))
        })
    }

    fn property_names(&self) -> Option<Vec<PropertyName>> {
        Some(
            self.visible()
                .filter_map(|(stripped, _)| variable_name(stripped))
                .collect(),
        )
    }

    fn descendant_names(&self, name: &PropertyName) -> Option<Vec<PropertyName>> {
        if name.is_empty() {
            return self.property_names();
        }
        let stems = candidates(name);
        let mut found: Vec<PropertyName> = Vec::new();
        for (stripped, _) in self.visible() {
            let remainder = stems.iter().find_map(|stem| {
                strip_prefix_ignore_case(stripped, stem).and_then(|rest| rest.strip_prefix('_'))
            });
            let Some(child) = remainder.and_then(variable_name) else {
                continue;
            };
            let full = name.join(&child);
            if !found.contains(&full) {
                found.push(full);
            }
        }
        Some(found)
    }
}
