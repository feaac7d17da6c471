//! Filesystem path helpers used while resolving `extends` relationships.

use std::path::{Path, PathBuf};

use camino::Utf8PathBuf;

use super::error::{file_error, invalid_input, not_found};
use crate::{BindError, BindResult};

/// Canonicalise `p` using platform-specific rules.
///
/// Returns an absolute, normalised path with symlinks resolved. On Windows
/// the `dunce` crate keeps UNC prefixes out of diagnostics.
///
/// # Errors
///
/// Returns a [`BindError::File`] if canonicalisation fails.
pub fn canonicalise(p: &Path) -> BindResult<PathBuf> {
    #[cfg(windows)]
    {
        dunce::canonicalize(p).map_err(|e| file_error(p, e))
    }
    #[cfg(not(windows))]
    {
        std::fs::canonicalize(p).map_err(|e| file_error(p, e))
    }
}

/// Key used for cycle detection; case-folded where the filesystem folds case.
pub(super) fn normalise_cycle_key(path: &Path) -> PathBuf {
    #[cfg(any(windows, target_os = "macos"))]
    {
        match path.to_str() {
            Some(text) => PathBuf::from(text.to_ascii_lowercase()),
            None => path.to_path_buf(),
        }
    }
    #[cfg(not(any(windows, target_os = "macos")))]
    {
        path.to_path_buf()
    }
}

/// Convert a canonical path to UTF-8, falling back to a lossy conversion.
pub(super) fn to_utf8_path(canonical: &Path) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(canonical.to_path_buf())
        .unwrap_or_else(|p| Utf8PathBuf::from(p.to_string_lossy().into_owned()))
}

/// Resolve an `extends` target relative to the importing file.
///
/// # Errors
///
/// Returns a not-found [`BindError::File`] naming both files when the target
/// does not exist.
pub(super) fn resolve_base_path(current_path: &Path, base: PathBuf) -> BindResult<PathBuf> {
    let parent = current_path.parent().ok_or_else(|| {
        invalid_input(
            current_path,
            "cannot determine parent directory when resolving 'extends'",
        )
    })?;
    let resolved_base = if base.is_absolute() {
        base
    } else {
        canonicalise(parent)?.join(base)
    };
    canonicalise(&resolved_base).map_err(|err| {
        let missing = matches!(
            err.as_ref(),
            BindError::File { source, .. }
                if source
                    .downcast_ref::<std::io::Error>()
                    .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
        );
        if missing {
            not_found(
                &resolved_base,
                format!(
                    "extended configuration file '{}' does not exist (referenced from '{}')",
                    resolved_base.display(),
                    current_path.display()
                ),
            )
        } else {
            err
        }
    })
}
