//! Error types produced while resolving and binding configuration.

mod aggregate;
mod constructors;
mod types;

pub use aggregate::AggregatedErrors;
pub use types::{BindError, UnboundProperty};

#[cfg(test)]
mod tests;
