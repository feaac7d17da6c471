//! Several binding failures reported together.

use std::error::Error;
use std::fmt;
use std::slice;
use std::sync::Arc;

use super::BindError;

/// The failures of one composite bind, in the order they were raised.
///
/// Entries stay shared so that a caller can keep an individual cause after
/// the aggregate is dropped.
///
/// # Examples
///
/// ```
/// use propbind::{BindError, PropertyName};
/// let e = BindError::aggregate(vec![
///     BindError::MissingRequiredProperty {
///         name: PropertyName::parse("server.port").unwrap(),
///         target_type: "u16",
///     },
///     BindError::CyclicImport { cycle: "a.toml -> a.toml".into() },
/// ]);
/// let BindError::Aggregate(failures) = e else { unreachable!() };
/// assert_eq!(failures.len(), 2);
/// assert!(failures.to_string().starts_with("  - missing required property 'server.port'"));
/// ```
#[derive(Debug, Default)]
pub struct AggregatedErrors {
    failures: Vec<Arc<BindError>>,
}

impl AggregatedErrors {
    /// Wrap `failures`, keeping their order.
    #[must_use]
    pub const fn new(failures: Vec<Arc<BindError>>) -> Self {
        Self { failures }
    }

    /// The failures as shared handles.
    #[must_use]
    pub fn as_slice(&self) -> &[Arc<BindError>] {
        &self.failures
    }

    /// Iterate over the failures.
    pub fn iter(&self) -> slice::Iter<'_, Arc<BindError>> {
        self.failures.iter()
    }

    /// Number of failures.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.failures.len()
    }

    /// Whether no failure was recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for AggregatedErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = self.failures.iter().peekable();
        while let Some(failure) = lines.next() {
            write!(f, "  - {failure}")?;
            if lines.peek().is_some() {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl Error for AggregatedErrors {}

impl<'a> IntoIterator for &'a AggregatedErrors {
    type Item = &'a Arc<BindError>;
    type IntoIter = slice::Iter<'a, Arc<BindError>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for AggregatedErrors {
    type Item = Arc<BindError>;
    type IntoIter = std::vec::IntoIter<Arc<BindError>>;

    fn into_iter(self) -> Self::IntoIter {
        self.failures.into_iter()
    }
}
