//! Token generation for the derives.

pub(crate) mod config_enum;
pub(crate) mod crate_path;
pub(crate) mod data_object;
pub(crate) mod parse;
