//! Provenance of configuration values.
//!
//! Every [`ConfigurationProperty`](crate::ConfigurationProperty) may carry an
//! [`Origin`] describing where its value was read. Origins can chain to a
//! parent, for example a file pulled in through `extends` points back at the
//! entry in the importing file.

use std::fmt;
use std::sync::Arc;

use camino::Utf8PathBuf;

/// Line and column of a value inside a text resource, both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    /// Line number.
    pub line: usize,
    /// Column number.
    pub column: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// What kind of place a value came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum OriginKind {
    /// A file or other text resource.
    TextResource {
        /// Path of the resource.
        resource: Utf8PathBuf,
        /// Position of the value, when the parser tracks it.
        location: Option<Location>,
        /// Key path inside structured resources.
        key: Option<String>,
    },
    /// A named property source without positional information.
    PropertySource {
        /// Name of the source.
        source: String,
        /// Key as written in the source.
        key: String,
    },
    /// A process environment variable.
    Environment {
        /// Variable name.
        variable: String,
    },
    /// A command-line argument.
    CommandLine {
        /// Argument as supplied.
        argument: String,
        /// Zero-based position among the arguments.
        position: usize,
    },
}

/// Where a configuration value came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin {
    kind: OriginKind,
    parent: Option<Arc<Origin>>,
}

impl Origin {
    /// Build an origin of the given kind with no parent.
    #[must_use]
    pub const fn new(kind: OriginKind) -> Self {
        Self { kind, parent: None }
    }

    /// A text resource with no position.
    #[must_use]
    pub fn text_resource(resource: impl Into<Utf8PathBuf>) -> Self {
        Self::new(OriginKind::TextResource {
            resource: resource.into(),
            location: None,
            key: None,
        })
    }

    /// A key in a named property source.
    #[must_use]
    pub fn property_source(source: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(OriginKind::PropertySource {
            source: source.into(),
            key: key.into(),
        })
    }

    /// An environment variable.
    #[must_use]
    pub fn environment(variable: impl Into<String>) -> Self {
        Self::new(OriginKind::Environment {
            variable: variable.into(),
        })
    }

    /// A command-line argument.
    #[must_use]
    pub fn command_line(argument: impl Into<String>, position: usize) -> Self {
        Self::new(OriginKind::CommandLine {
            argument: argument.into(),
            position,
        })
    }

    /// Attach a line and column. Only text resources carry a location.
    #[must_use]
    pub fn at(mut self, line: usize, column: usize) -> Self {
        if let OriginKind::TextResource { location, .. } = &mut self.kind {
            *location = Some(Location { line, column });
        }
        self
    }

    /// Attach a key path. Only text resources carry a key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        if let OriginKind::TextResource { key: slot, .. } = &mut self.kind {
            *slot = Some(key.into());
        }
        self
    }

    /// Chain this origin to the place that caused it to be loaded.
    #[must_use]
    pub fn with_parent(mut self, parent: Arc<Self>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// The kind of place.
    #[must_use]
    pub const fn kind(&self) -> &OriginKind {
        &self.kind
    }

    /// The immediate parent.
    #[must_use]
    pub const fn parent(&self) -> Option<&Arc<Self>> {
        self.parent.as_ref()
    }

    /// Every parent, nearest first.
    ///
    /// The walk stops when a place already visited reappears.
    #[must_use]
    pub fn parents(&self) -> Vec<Arc<Self>> {
        let mut chain: Vec<Arc<Self>> = Vec::new();
        let mut next = self.parent.clone();
        while let Some(current) = next {
            if current.kind == self.kind || chain.iter().any(|seen| seen.kind == current.kind) {
                break;
            }
            next = current.parent.clone();
            chain.push(current);
        }
        chain
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            OriginKind::TextResource {
                resource,
                location,
                key,
            } => {
                write!(f, "{resource}")?;
                if let Some(location) = location {
                    write!(f, " - {location}")?;
                }
                if let Some(key) = key {
                    write!(f, " [{key}]")?;
                }
                Ok(())
            }
            OriginKind::PropertySource { source, key } => {
                write!(f, "\"{key}\" from property source \"{source}\"")
            }
            OriginKind::Environment { variable } => {
                write!(f, "environment variable \"{variable}\"")
            }
            OriginKind::CommandLine { argument, position } => {
                write!(f, "command-line argument #{position} \"{argument}\"")
            }
        }
    }
}

/// Anything that can say where its value came from.
pub trait OriginProvider {
    /// The origin, when known.
    fn origin(&self) -> Option<&Arc<Origin>>;
}

impl OriginProvider for crate::BindError {
    fn origin(&self) -> Option<&Arc<Origin>> {
        Self::origin(self)
    }
}
