//! Error constructors shared by file loading helpers.

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use crate::BindError;

/// Construct a [`BindError::File`] for a configuration path.
pub(super) fn file_error(path: &Path, err: impl Into<Box<dyn Error + Send + Sync>>) -> Arc<BindError> {
    Arc::new(BindError::File {
        path: path.to_path_buf(),
        source: err.into(),
    })
}

pub(super) fn invalid_input(path: &Path, msg: impl Into<String>) -> Arc<BindError> {
    file_error(
        path,
        std::io::Error::new(std::io::ErrorKind::InvalidInput, msg.into()),
    )
}

pub(super) fn invalid_data(path: &Path, msg: impl Into<String>) -> Arc<BindError> {
    file_error(
        path,
        std::io::Error::new(std::io::ErrorKind::InvalidData, msg.into()),
    )
}

pub(super) fn not_found(path: &Path, msg: impl Into<String>) -> Arc<BindError> {
    file_error(
        path,
        std::io::Error::new(std::io::ErrorKind::NotFound, msg.into()),
    )
}
