//! Derive macros for `propbind`.
//!
//! `#[derive(DataObject)]` describes a struct's shape for the binder and
//! implements `Bind` for it. `#[derive(ConfigEnum)]` binds unit enums from
//! text, matching variant names relaxedly.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod derive;

/// Derive `propbind::DataObject` and `propbind::Bind` for a struct.
///
/// By default the struct is bound with setters: it must implement
/// `Default` and every bound field must implement `Clone`. With
/// `#[bind(constructor)]` every field is resolved first and the struct is
/// built once; `Option` fields are optional and all others are required
/// unless given a default.
///
/// Struct attributes: `constructor`, `crate = "path"`.
/// Field attributes: `rename = "name"`, `default` or `default = expr`,
/// `required`, `flatten`, `skip`.
#[proc_macro_derive(DataObject, attributes(bind))]
pub fn derive_data_object(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive::data_object::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Derive `propbind::Bind` for a unit-only enum.
///
/// Variant names match case- and separator-insensitively, so `ReadOnly`
/// accepts `read-only`, `READ_ONLY` and `readonly`. Use
/// `#[bind(rename = "...")]` on a variant to bind it from another name.
#[proc_macro_derive(ConfigEnum, attributes(bind))]
pub fn derive_config_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive::config_enum::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[cfg(test)]
mod tests;
