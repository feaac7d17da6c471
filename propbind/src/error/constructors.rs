//! Constructors, aggregation and inspection helpers for `BindError`.

use std::sync::Arc;

use figment::Error as FigmentError;

use super::{AggregatedErrors, BindError};
use crate::origin::Origin;

impl BindError {
    /// Tries to build a [`BindError`] from an iterator of errors.
    ///
    /// The iterator is consumed eagerly. It returns:
    /// * `None` when no errors are supplied;
    /// * the inner error when a single [`Arc`] is uniquely owned;
    /// * [`Self::Aggregate`] containing that single [`Arc`] when the error is already shared; and
    /// * [`Self::Aggregate`] combining every error for two or more inputs.
    #[must_use]
    pub fn try_aggregate<I, E>(errors: I) -> Option<Self>
    where
        I: IntoIterator<Item = E>,
        E: Into<Arc<Self>>,
    {
        let mut arcs: Vec<Arc<Self>> = errors.into_iter().map(Into::into).collect();
        if arcs.is_empty() {
            return None;
        }
        Some(if arcs.len() == 1 {
            let last = arcs.pop()?;
            match Arc::try_unwrap(last) {
                Ok(err) => err,
                Err(shared) => Self::Aggregate(Box::new(AggregatedErrors::new(vec![shared]))),
            }
        } else {
            Self::Aggregate(Box::new(AggregatedErrors::new(arcs)))
        })
    }

    /// Build a [`BindError`] from at least one error.
    ///
    /// # Panics
    ///
    /// Panics if `errors` is empty. Use [`BindError::try_aggregate`] when the
    /// list may be empty.
    #[must_use]
    #[track_caller]
    pub fn aggregate<I, E>(errors: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Arc<Self>>,
    {
        Self::try_aggregate(errors).map_or_else(
            || panic!("aggregate requires at least one error"),
            |err| err,
        )
    }

    /// Collapse a list of shared errors into one shared error.
    ///
    /// Returns `None` for an empty list.
    #[must_use]
    pub fn collapse(errors: Vec<Arc<Self>>) -> Option<Arc<Self>> {
        if errors.len() == 1 {
            return errors.into_iter().next();
        }
        Self::try_aggregate(errors).map(Arc::new)
    }

    /// Construct a gathering error from a [`figment::Error`].
    ///
    /// # Examples
    ///
    /// ```
    /// use propbind::BindError;
    /// let fe = figment::Error::from("boom");
    /// let e = BindError::gathering(fe);
    /// assert!(matches!(e, BindError::Gathering(_)));
    /// ```
    #[must_use]
    pub fn gathering(source: FigmentError) -> Self {
        Self::Gathering(Box::new(source))
    }

    /// Whether this error reports a value that could not be converted.
    #[must_use]
    pub const fn is_conversion(&self) -> bool {
        matches!(self, Self::TypeConversion { .. })
    }

    /// Find the origin of the first value implicated in this error.
    ///
    /// Nested causes are searched depth first.
    #[must_use]
    pub fn origin(&self) -> Option<&Arc<Origin>> {
        match self {
            Self::TypeConversion { origin, .. } => origin.as_ref(),
            Self::InvalidField { source, .. } => source.origin(),
            Self::MissingRequiredParameter { suppressed, .. } => {
                suppressed.iter().find_map(|e| e.origin())
            }
            Self::UnboundElements { unbound, .. } | Self::UnboundProperties { unbound, .. } => {
                unbound.iter().find_map(|u| u.origin.as_ref())
            }
            Self::Aggregate(errors) => errors.iter().find_map(|error| error.origin()),
            _ => None,
        }
    }
}
