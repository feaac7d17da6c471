//! Expansion of `#[derive(ConfigEnum)]`.

use std::collections::HashMap;

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields};

use super::crate_path;
use super::parse::{parse_container_attrs, parse_variant_rename, uniform_form};

pub(crate) fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let container = parse_container_attrs(&input.attrs)?;
    if container.constructor {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "`constructor` does not apply to enums",
        ));
    }
    let krate = crate_path::resolve(container.crate_path.as_ref());
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "ConfigEnum can only be derived for enums",
        ));
    };
    let mut seen: HashMap<String, String> = HashMap::new();
    let mut arms = Vec::new();
    let mut accepted = Vec::new();
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "ConfigEnum variants cannot carry data",
            ));
        }
        let name = parse_variant_rename(&variant.attrs)?.unwrap_or_else(|| variant.ident.to_string());
        let form = uniform_form(&name);
        if form.is_empty() {
            return Err(syn::Error::new_spanned(
                variant,
                "variant name must contain an alphanumeric character",
            ));
        }
        if let Some(previous) = seen.insert(form.clone(), name.clone()) {
            return Err(syn::Error::new_spanned(
                variant,
                format!("`{name}` matches the same text as `{previous}`"),
            ));
        }
        let ident = &variant.ident;
        arms.push(quote! { #form => ::core::result::Result::Ok(Self::#ident), });
        accepted.push(name);
    }
    let expected = accepted.join(", ");
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics #krate::Bind for #ident #ty_generics #where_clause {
            fn shape() -> #krate::Shape {
                #krate::Shape::Scalar
            }

            fn from_property(
                property: &#krate::ConfigurationProperty,
            ) -> ::core::result::Result<Self, #krate::ConversionFailure> {
                let text = property.text();
                let trimmed = text.trim();
                match #krate::name::uniform_form(trimmed).as_str() {
                    #( #arms )*
                    _ => ::core::result::Result::Err(#krate::ConversionFailure::new(
                        ::std::format!("'{}' is not one of: {}", trimmed, #expected),
                    )),
                }
            }
        }
    })
}
