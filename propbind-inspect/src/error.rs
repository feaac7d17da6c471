//! Error types for `propbind-inspect`.

use std::sync::Arc;

use propbind::{BindError, InvalidNameFormat};
use thiserror::Error;

/// Errors surfaced by the inspector.
#[derive(Debug, Error)]
pub enum InspectError {
    #[error(transparent)]
    Bind(#[from] Arc<BindError>),

    #[error(transparent)]
    InvalidName(#[from] InvalidNameFormat),

    #[error("no property named '{0}'")]
    NotFound(String),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}
