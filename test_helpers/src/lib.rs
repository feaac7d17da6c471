//! Test helpers shared across the propbind workspace.
//!
//! [`env`] serialises environment mutation so that binding tests reading the
//! process environment do not race each other. [`files`] creates throwaway
//! configuration files.

pub mod env;
pub mod files;
