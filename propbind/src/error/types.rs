//! Primary error enum for binding flows.

use std::fmt;
use std::sync::Arc;

use figment::Error as FigmentError;
use thiserror::Error;

use super::aggregate::AggregatedErrors;
use crate::name::{InvalidNameFormat, PropertyName};
use crate::origin::Origin;

/// Errors that can occur while binding configuration properties.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BindError {
    /// A property name failed to parse.
    #[error(transparent)]
    InvalidName(#[from] InvalidNameFormat),

    /// A resolved value could not be converted into the target type.
    #[error("failed to convert '{value}' from '{source_name}' for '{name}' to {target_type}: {reason}{}", describe_origin(.origin.as_ref()))]
    TypeConversion {
        /// Name of the property being converted.
        name: PropertyName,
        /// Textual form of the offending value.
        value: String,
        /// Source that supplied the value.
        source_name: String,
        /// Type the value was being converted into.
        target_type: &'static str,
        /// Where the value came from, when known.
        origin: Option<Arc<Origin>>,
        /// Why the conversion failed.
        reason: String,
    },

    /// A required constructor parameter had no value.
    #[error("missing required parameter '{parameter}' for {target_type} at '{name}'")]
    MissingRequiredParameter {
        /// Name of the data object being constructed.
        name: PropertyName,
        /// Parameter that could not be supplied.
        parameter: String,
        /// Type being constructed.
        target_type: &'static str,
        /// Errors that prevented the parameter from binding.
        suppressed: Vec<Arc<BindError>>,
    },

    /// A property marked as required was never bound.
    #[error("missing required property '{name}' for {target_type}")]
    MissingRequiredProperty {
        /// Full name of the unbound property.
        name: PropertyName,
        /// Type owning the property.
        target_type: &'static str,
    },

    /// A data object is already being bound further up the stack.
    #[error("cyclic binding detected at '{name}': {chain}")]
    CyclicBind {
        /// Name at which the cycle closed.
        name: PropertyName,
        /// Names visited on the way into the cycle.
        chain: String,
    },

    /// A settable field received a value it could not accept.
    #[error("invalid value for field '{name}': {source}")]
    InvalidField {
        /// Full name of the field.
        name: PropertyName,
        /// Underlying conversion failure.
        #[source]
        source: Arc<BindError>,
    },

    /// Constructor parameters carry no names, so nothing can be bound to them.
    #[error("{target_type} exposes unnamed constructor parameters; cannot bind by name")]
    ParameterNamesUnavailable {
        /// Type whose constructor lacks names.
        target_type: &'static str,
    },

    /// A collection left indexed children unbound.
    #[error("elements under '{name}' were left unbound: {}", join(.unbound))]
    UnboundElements {
        /// Name of the collection.
        name: PropertyName,
        /// Children that were present but never bound.
        unbound: Vec<UnboundProperty>,
    },

    /// Properties under the bound prefix were not consumed by the target.
    #[error("properties under '{name}' were not bound: {}", join(.unbound))]
    UnboundProperties {
        /// Prefix that was bound.
        name: PropertyName,
        /// Properties the target ignored.
        unbound: Vec<UnboundProperty>,
    },

    /// No instance could be produced for the target type.
    #[error("cannot create {target_type} at '{name}': {reason}")]
    InstanceCreation {
        /// Name being bound.
        name: PropertyName,
        /// Type that could not be created.
        target_type: &'static str,
        /// Why creation failed.
        reason: String,
    },

    /// Error originating from a configuration file.
    #[error("configuration file error in '{path}': {source}")]
    File {
        /// Path that triggered the failure.
        path: std::path::PathBuf,
        /// Underlying error reported by the file loader.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Cycle detected while following `extends`.
    #[error("cyclic extends detected: {cycle}")]
    CyclicImport {
        /// Chain of files participating in the cycle.
        cycle: String,
    },

    /// Error while gathering values from a figment.
    #[error("failed to gather configuration: {0}")]
    Gathering(#[from] Box<FigmentError>),

    /// A command-line argument could not be understood.
    #[error("invalid command-line argument '{argument}': {reason}")]
    InvalidArgument {
        /// Argument text as supplied.
        argument: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Multiple errors occurred while binding.
    #[error("multiple binding errors:\n{0}")]
    Aggregate(Box<AggregatedErrors>),
}

/// A property that was present in a source but never consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnboundProperty {
    /// Name of the property.
    pub name: PropertyName,
    /// Where it came from.
    pub origin: Option<Arc<Origin>>,
}

impl fmt::Display for UnboundProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'{}", self.name, describe_origin(self.origin.as_ref()))
    }
}

fn describe_origin(origin: Option<&Arc<Origin>>) -> String {
    origin.map_or_else(String::new, |o| format!(" (from {o})"))
}

fn join(unbound: &[UnboundProperty]) -> String {
    unbound
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
