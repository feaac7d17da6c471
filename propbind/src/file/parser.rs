//! Format-specific parsing of configuration files.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use camino::Utf8Path;
use serde_json::Value;

use super::error::{file_error, invalid_data};
use super::properties::{self, Entry};
use crate::BindResult;
use crate::origin::Origin;
use crate::source::{MapSource, OriginStrategy, PropertySource, StructuredSource};

const EXTENDS: &str = "extends";

/// A parsed file before it becomes a source.
#[derive(Debug)]
pub(super) enum ParsedFile {
    Properties(Vec<Entry>),
    Tree(serde_json::Map<String, Value>),
}

/// The `extends` entry of a file: target path and the origin of the entry.
pub(super) struct Extends {
    pub target: PathBuf,
    pub origin: Arc<Origin>,
}

/// Parse `data` according to the extension of `path`.
///
/// `.properties` and `.json` are recognised; everything else is read as
/// TOML.
///
/// # Errors
///
/// Returns a [`crate::BindError::File`] if the contents fail to parse, the
/// root of a structured file is not a table, or TOML support is disabled.
pub(super) fn parse_by_format(path: &Path, data: &str) -> BindResult<ParsedFile> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let root = match ext.as_deref() {
        Some("properties") => {
            return properties::parse(data)
                .map(ParsedFile::Properties)
                .map_err(|e| file_error(path, e));
        }
        Some("json") => serde_json::from_str(data).map_err(|e| file_error(path, e))?,
        _ => parse_toml(path, data)?,
    };
    match root {
        Value::Object(map) => Ok(ParsedFile::Tree(map)),
        _ => Err(invalid_data(path, "configuration root must be a table")),
    }
}

#[cfg(feature = "toml")]
fn parse_toml(path: &Path, data: &str) -> BindResult<Value> {
    toml::from_str::<toml::Value>(data)
        .map(toml_to_json)
        .map_err(|e| file_error(path, e))
}

#[cfg(not(feature = "toml"))]
fn parse_toml(path: &Path, _data: &str) -> BindResult<Value> {
    Err(file_error(
        path,
        std::io::Error::other("toml feature disabled: enable the 'toml' feature to read this file"),
    ))
}

/// Datetimes become strings; non-finite floats become their text.
#[cfg(feature = "toml")]
fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(text) => Value::String(text),
        toml::Value::Integer(number) => Value::from(number),
        toml::Value::Float(number) => serde_json::Number::from_f64(number)
            .map_or_else(|| Value::String(number.to_string()), Value::Number),
        toml::Value::Boolean(flag) => Value::Bool(flag),
        toml::Value::Datetime(datetime) => Value::String(datetime.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, toml_to_json(value)))
                .collect(),
        ),
    }
}

impl ParsedFile {
    /// Remove and validate the `extends` entry.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::BindError::File`] when the entry is not a
    /// non-empty string.
    pub(super) fn take_extends(
        &mut self,
        path: &Path,
        resource: &Utf8Path,
        importer: Option<&Arc<Origin>>,
    ) -> BindResult<Option<Extends>> {
        let (target, entry_origin) = match self {
            Self::Properties(entries) => {
                let Some(index) = entries.iter().position(|e| e.key == EXTENDS) else {
                    return Ok(None);
                };
                let entry = entries.remove(index);
                let located = Origin::text_resource(resource)
                    .at(entry.line, entry.column)
                    .with_key(EXTENDS);
                (entry.value.trim().to_owned(), located)
            }
            Self::Tree(map) => {
                let Some(value) = map.remove(EXTENDS) else {
                    return Ok(None);
                };
                let path_text = match value {
                    Value::String(text) => text,
                    other => {
                        return Err(invalid_data(
                            path,
                            format!("'{EXTENDS}' must be a string, but found {other}"),
                        ));
                    }
                };
                (path_text, Origin::text_resource(resource).with_key(EXTENDS))
            }
        };
        if target.is_empty() {
            return Err(invalid_data(path, format!("'{EXTENDS}' must be a non-empty string")));
        }
        Ok(Some(Extends {
            target: PathBuf::from(target),
            origin: Arc::new(imported(entry_origin, importer)),
        }))
    }

    /// Wrap the parsed contents as a source named after `resource`.
    pub(super) fn into_source(
        self,
        resource: &Utf8Path,
        importer: Option<Arc<Origin>>,
    ) -> Arc<dyn PropertySource> {
        let name = format!("config file [{resource}]");
        match self {
            Self::Properties(entries) => {
                let tagged = entries.into_iter().map(|entry| {
                    let origin = Origin::text_resource(resource).at(entry.line, entry.column);
                    let full = imported(origin, importer.as_ref());
                    (entry.key, Value::String(entry.value), Arc::new(full))
                });
                Arc::new(MapSource::with_origins(name, tagged))
            }
            Self::Tree(map) => Arc::new(
                StructuredSource::new(name, Value::Object(map)).with_origins(OriginStrategy::File {
                    path: resource.to_owned(),
                    parent: importer,
                }),
            ),
        }
    }
}

fn imported(origin: Origin, importer: Option<&Arc<Origin>>) -> Origin {
    let Some(parent) = importer else {
        return origin;
    };
    origin.with_parent(Arc::clone(parent))
}
