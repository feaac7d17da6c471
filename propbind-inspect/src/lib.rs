//! Library behind the `propbind-inspect` binary.
//!
//! Sources are layered as command-line properties first, then the process
//! environment, then configuration files with the last `--file` winning.
//! Each file contributes itself and every file it `extends`.

pub mod cli;
pub mod error;
mod output;

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;

use propbind::{
    CommandLineSource, ConfigurationProperty, EnvironmentSource, PlaceholderResolver,
    PropertyName, PropertySource, Resolver, SourceSet, load_config_file,
};

use crate::cli::{Args, Command};
pub use crate::error::InspectError;

/// Assemble the source set described by `args`.
///
/// `env` is consulted unless `--no-env` was given; pass
/// [`EnvironmentSource::from_process`] for the real environment.
///
/// # Errors
///
/// Returns an error if a file cannot be loaded or an override is malformed.
pub fn build_sources(args: &Args, env: EnvironmentSource) -> Result<SourceSet, InspectError> {
    let mut sources: Vec<Arc<dyn PropertySource>> = Vec::new();
    let overrides = args.command.overrides();
    if !overrides.is_empty() {
        sources.push(Arc::new(CommandLineSource::parse(overrides.iter().cloned())?));
    }
    if !args.should_skip_env {
        let scoped = match &args.env_prefix {
            Some(prefix) => env.with_prefix(prefix.as_str()),
            None => env,
        };
        sources.push(Arc::new(scoped));
    }
    for path in args.files.iter().rev() {
        let loaded = load_config_file(path)?;
        tracing::debug!(path = %path.display(), sources = loaded.len(), "loaded config file");
        sources.extend(loaded);
    }
    Ok(sources.into())
}

/// Run the command in `args` against `sources`, writing to `out`.
///
/// # Errors
///
/// Returns an error if a name does not parse, `get` finds nothing, a
/// placeholder cycles or writing fails.
pub fn run(args: &Args, sources: &SourceSet, out: &mut impl Write) -> Result<(), InspectError> {
    match &args.command {
        Command::Get { name, .. } => get(sources, name, out),
        Command::List { prefix, .. } => list(sources, prefix.as_deref().unwrap_or_default(), out),
    }
}

fn expand(sources: &SourceSet, property: &ConfigurationProperty) -> Result<String, InspectError> {
    let resolver = Resolver::new(sources);
    Ok(PlaceholderResolver::new(resolver).resolve(&property.text())?)
}

fn get(sources: &SourceSet, name: &str, out: &mut impl Write) -> Result<(), InspectError> {
    let parsed = PropertyName::parse(name)?;
    let property = Resolver::new(sources)
        .find(&parsed)
        .ok_or_else(|| InspectError::NotFound(name.to_owned()))?;
    let resolved = expand(sources, &property)?;
    output::write_detail(out, &property, &resolved)?;
    Ok(())
}

fn list(sources: &SourceSet, prefix: &str, out: &mut impl Write) -> Result<(), InspectError> {
    let root = PropertyName::parse(prefix)?;
    let mut names: BTreeMap<String, PropertyName> = BTreeMap::new();
    for source in sources.iter() {
        let Some(found) = source.property_names() else {
            tracing::debug!(source = source.name(), "source cannot list its names");
            continue;
        };
        for candidate in found {
            if root.is_empty() || root == candidate || root.is_ancestor_of(&candidate) {
                names.entry(candidate.to_string()).or_insert(candidate);
            }
        }
    }
    let resolver = Resolver::new(sources);
    let mut rows = Vec::with_capacity(names.len());
    for candidate in names.values() {
        if let Some(property) = resolver.find(candidate) {
            let resolved = expand(sources, &property)?;
            rows.push((property, resolved));
        }
    }
    output::write_summary(out, &rows)?;
    Ok(())
}
