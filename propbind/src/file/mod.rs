//! Loading configuration files into property sources.
//!
//! `.properties`, `.json` and `.toml` files are supported; any other
//! extension is read as TOML. A file may name a parent with a top-level
//! `extends` entry. Every file in the chain becomes its own source, child
//! first, so the child takes precedence.

mod error;
mod helpers;
mod loader;
mod parser;
mod path;
mod properties;

pub use loader::load_config_file;
pub use path::canonicalise;
