//! Loading a file and its `extends` ancestors.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::{file_error, invalid_input};
use super::helpers::read_to_string;
use super::parser::parse_by_format;
use super::path::{canonicalise, normalise_cycle_key, resolve_base_path, to_utf8_path};
use crate::origin::Origin;
use crate::source::PropertySource;
use crate::{BindError, BindResult};

/// Load `path` and every file it extends, most specific first.
///
/// Returns an empty list when `path` does not exist. Values read from an
/// extended file carry an origin whose parent is the `extends` entry that
/// pulled the file in.
///
/// # Examples
///
/// ```rust,no_run
/// use std::path::Path;
/// use propbind::{Bindable, Binder, SourceSet, load_config_file};
///
/// # fn run() -> propbind::BindResult<()> {
/// let sources = load_config_file(Path::new("app.toml"))?;
/// let binder = Binder::new(SourceSet::from(sources));
/// let port: Option<u16> = binder.bind("server.port", Bindable::of())?;
/// # let _ = port;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns a [`BindError::File`] if reading or parsing fails, or
/// [`BindError::CyclicImport`] when the `extends` chain loops.
pub fn load_config_file(path: &Path) -> BindResult<Vec<Arc<dyn PropertySource>>> {
    let mut visited = HashSet::new();
    let mut stack = Vec::new();
    let mut sources = Vec::new();
    if path.is_file() {
        load_chain(path, None, &mut visited, &mut stack, &mut sources)?;
    } else {
        tracing::debug!(path = %path.display(), "configuration file not found");
    }
    Ok(sources)
}

fn load_chain(
    path: &Path,
    importer: Option<Arc<Origin>>,
    visited: &mut HashSet<PathBuf>,
    stack: &mut Vec<PathBuf>,
    sources: &mut Vec<Arc<dyn PropertySource>>,
) -> BindResult<()> {
    let canonical = canonicalise(path)?;
    let normalised = normalise_cycle_key(&canonical);
    if !visited.insert(normalised.clone()) {
        let mut cycle: Vec<String> = stack.iter().map(|p| p.display().to_string()).collect();
        cycle.push(canonical.display().to_string());
        return Err(Arc::new(BindError::CyclicImport {
            cycle: cycle.join(" -> "),
        }));
    }
    stack.push(canonical.clone());
    let result = load_one(&canonical, importer, visited, stack, sources);
    visited.remove(&normalised);
    stack.pop();
    result
}

fn load_one(
    canonical: &Path,
    importer: Option<Arc<Origin>>,
    visited: &mut HashSet<PathBuf>,
    stack: &mut Vec<PathBuf>,
    sources: &mut Vec<Arc<dyn PropertySource>>,
) -> BindResult<()> {
    let resource = to_utf8_path(canonical);
    let data = read_to_string(&resource).map_err(|e| file_error(canonical, e))?;
    let mut parsed = parse_by_format(canonical, &data)?;
    let parent_entry = parsed.take_extends(canonical, &resource, importer.as_ref())?;
    tracing::debug!(path = %resource, extends = parent_entry.is_some(), "loaded configuration file");
    sources.push(parsed.into_source(&resource, importer));
    let Some(extends) = parent_entry else {
        return Ok(());
    };
    let base = resolve_base_path(canonical, extends.target)?;
    if !base.is_file() {
        return Err(invalid_input(&base, "extended path is not a regular file"));
    }
    load_chain(&base, Some(extends.origin), visited, stack, sources)
}
