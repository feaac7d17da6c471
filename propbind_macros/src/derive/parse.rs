//! Parsing of `#[bind(...)]` attributes.

use syn::ext::IdentExt;
use syn::meta::ParseNestedMeta;
use syn::{Attribute, Expr, Field, GenericArgument, LitStr, PathArguments, Type};

/// Struct- or enum-level options.
#[derive(Default)]
pub(crate) struct ContainerAttrs {
    pub constructor: bool,
    pub crate_path: Option<syn::Path>,
}

/// How a field obtains a value when nothing is bound.
pub(crate) enum FieldDefault {
    /// `Default::default()`.
    Trait,
    /// An explicit expression.
    Expr(Box<Expr>),
}

/// Field-level options.
#[derive(Default)]
pub(crate) struct FieldAttrs {
    pub rename: Option<String>,
    pub default: Option<FieldDefault>,
    pub required: bool,
    pub flatten: bool,
    pub skip: bool,
}

/// Iterate all `#[bind(...)]` attributes once and apply a callback.
fn parse_bind<F>(attrs: &[Attribute], mut f: F) -> syn::Result<()>
where
    F: FnMut(&ParseNestedMeta) -> syn::Result<()>,
{
    for attr in attrs.iter().filter(|a| a.path().is_ident("bind")) {
        attr.parse_nested_meta(|meta| f(&meta))?;
    }
    Ok(())
}

fn unknown(meta: &ParseNestedMeta) -> syn::Error {
    let key = meta
        .path
        .get_ident()
        .map_or_else(|| "?".to_owned(), ToString::to_string);
    meta.error(format!("unknown bind attribute `{key}`"))
}

pub(crate) fn parse_container_attrs(attrs: &[Attribute]) -> syn::Result<ContainerAttrs> {
    let mut out = ContainerAttrs::default();
    parse_bind(attrs, |meta| {
        if meta.path.is_ident("constructor") {
            out.constructor = true;
        } else if meta.path.is_ident("crate") {
            let path = meta.value()?.parse::<LitStr>()?;
            out.crate_path = Some(path.parse()?);
        } else {
            return Err(unknown(meta));
        }
        Ok(())
    })?;
    Ok(out)
}

pub(crate) fn parse_field_attrs(field: &Field) -> syn::Result<FieldAttrs> {
    let mut out = FieldAttrs::default();
    parse_bind(&field.attrs, |meta| {
        if meta.path.is_ident("rename") {
            out.rename = Some(meta.value()?.parse::<LitStr>()?.value());
        } else if meta.path.is_ident("default") {
            out.default = Some(if meta.input.peek(syn::Token![=]) {
                FieldDefault::Expr(Box::new(meta.value()?.parse::<Expr>()?))
            } else {
                FieldDefault::Trait
            });
        } else if meta.path.is_ident("required") {
            out.required = true;
        } else if meta.path.is_ident("flatten") {
            out.flatten = true;
        } else if meta.path.is_ident("skip") {
            out.skip = true;
        } else {
            return Err(unknown(meta));
        }
        Ok(())
    })?;
    if out.required && out.default.is_some() {
        return Err(syn::Error::new_spanned(
            field,
            "a field cannot be both `required` and have a `default`",
        ));
    }
    if out.skip && (out.required || out.flatten || out.rename.is_some()) {
        return Err(syn::Error::new_spanned(
            field,
            "`skip` cannot be combined with `required`, `flatten` or `rename`",
        ));
    }
    Ok(out)
}

pub(crate) fn parse_variant_rename(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut rename = None;
    parse_bind(attrs, |meta| {
        if meta.path.is_ident("rename") {
            rename = Some(meta.value()?.parse::<LitStr>()?.value());
            Ok(())
        } else {
            Err(unknown(meta))
        }
    })?;
    Ok(rename)
}

/// The name a field binds under: its rename, else its identifier.
pub(crate) fn field_name(field: &Field, attrs: &FieldAttrs) -> Option<String> {
    attrs
        .rename
        .clone()
        .or_else(|| field.ident.as_ref().map(|ident| ident.unraw().to_string()))
}

/// Extract `T` from `Option<T>`.
pub(crate) fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first() {
        Some(GenericArgument::Type(inner)) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}

/// Lowercase ASCII alphanumerics only.
pub(crate) fn uniform_form(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
