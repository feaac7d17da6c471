//! Extensions for mapping errors to `BindResult` concisely.
//!
//! These helpers reduce repetitive `.map_err(|e| Arc::new(BindError::from(e)))`
//! patterns when converting external error types into the crate's
//! `BindResult<T>` alias (`Result<T, Arc<BindError>>`).
//!
//! # Examples
//!
//! ```
//! use propbind::{BindResult, BindResultExt, PropertyName};
//!
//! fn parse() -> BindResult<PropertyName> {
//!     // InvalidNameFormat implements Into<BindError>
//!     PropertyName::parse("server.port").into_bind()
//! }
//! # assert!(parse().is_ok());
//! ```

use std::sync::Arc;

use crate::{BindError, BindResult};

/// Generic extension for mapping any `Result<T, E>` with `E: Into<BindError>`
/// into a `BindResult<T>`.
pub trait BindResultExt<T, E> {
    /// Convert `Result<T, E>` into `BindResult<T>` using `Into<BindError>`.
    ///
    /// # Errors
    ///
    /// Propagates the original error after conversion into `Arc<BindError>`.
    fn into_bind(self) -> BindResult<T>;
}

impl<T, E> BindResultExt<T, E> for Result<T, E>
where
    E: Into<BindError>,
{
    fn into_bind(self) -> BindResult<T> {
        self.map_err(|e| Arc::new(e.into()))
    }
}

/// Extension tailored to mapping `figment::Error` into a gathering failure.
pub trait BindGatherExt<T> {
    /// Convert `Result<T, figment::Error>` into `BindResult<T>` as a
    /// [`BindError::Gathering`].
    ///
    /// # Errors
    ///
    /// Returns a `BindError::Gathering` wrapped in `Arc` when the input is `Err`.
    fn into_bind_gathering(self) -> BindResult<T>;
}

impl<T> BindGatherExt<T> for Result<T, figment::Error> {
    fn into_bind_gathering(self) -> BindResult<T> {
        self.map_err(|e| Arc::new(BindError::gathering(e)))
    }
}
