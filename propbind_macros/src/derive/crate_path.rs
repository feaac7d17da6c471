//! Crate path resolution for dependency aliasing support.
//!
//! Converts the optional `#[bind(crate = "...")]` attribute value into a
//! `TokenStream` that replaces hardcoded `propbind::` paths in generated
//! code.

use proc_macro2::TokenStream;
use quote::quote;

/// Resolve the crate path from the parsed struct attribute.
///
/// Defaults to `::propbind` when no override is present.
pub(crate) fn resolve(crate_path: Option<&syn::Path>) -> TokenStream {
    crate_path.map_or_else(|| quote! { ::propbind }, |path| quote! { #path })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::default(None, ":: propbind")]
    #[case::custom(Some("my_alias"), "my_alias")]
    #[case::nested(Some("deps::propbind"), "deps :: propbind")]
    fn resolve_produces_expected_tokens(#[case] input: Option<&str>, #[case] expected: &str) {
        let parsed = input.map(|s| syn::parse_str::<syn::Path>(s).expect("valid path"));
        let tokens = resolve(parsed.as_ref());
        assert_eq!(tokens.to_string(), expected);
    }
}
