//! Expansion of `#[derive(DataObject)]`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, Index, Member};

use super::crate_path;
use super::parse::{
    FieldAttrs, FieldDefault, field_name, option_inner, parse_container_attrs, parse_field_attrs,
};

struct FieldSpec<'f> {
    field: &'f Field,
    member: Member,
    attrs: FieldAttrs,
}

pub(crate) fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let container = parse_container_attrs(&input.attrs)?;
    let krate = crate_path::resolve(container.crate_path.as_ref());
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "DataObject can only be derived for structs",
        ));
    };
    let fields = data
        .fields
        .iter()
        .enumerate()
        .map(|(index, field)| {
            Ok(FieldSpec {
                field,
                member: field
                    .ident
                    .clone()
                    .map_or_else(|| Member::Unnamed(Index::from(index)), Member::Named),
                attrs: parse_field_attrs(field)?,
            })
        })
        .collect::<syn::Result<Vec<_>>>()?;
    let shape = if container.constructor {
        constructor_shape(&krate, &data.fields, &fields)
    } else {
        setter_shape(&krate, &fields)?
    };
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics #krate::DataObject for #ident #ty_generics #where_clause {
            fn describe() -> #krate::ObjectShape<Self> {
                #shape
            }
        }

        impl #impl_generics #krate::Bind for #ident #ty_generics #where_clause {
            fn shape() -> #krate::Shape {
                #krate::Shape::DataObject
            }

            fn bind_composite(
                binder: &#krate::Binder,
                name: &#krate::PropertyName,
                existing: ::core::option::Option<Self>,
                context: &mut #krate::BindContext,
            ) -> #krate::BindResult<::core::option::Option<Self>> {
                binder.bind_data_object::<Self>(name, existing, context)
            }

            fn create(
                binder: &#krate::Binder,
                name: &#krate::PropertyName,
            ) -> #krate::BindResult<::core::option::Option<Self>> {
                binder.create_data_object::<Self>(name)
            }
        }
    })
}

fn default_value(default: Option<&FieldDefault>) -> TokenStream {
    match default {
        Some(FieldDefault::Expr(expr)) => quote! { #expr },
        Some(FieldDefault::Trait) | None => quote! { ::core::default::Default::default() },
    }
}

fn constructor_shape(krate: &TokenStream, shape: &Fields, fields: &[FieldSpec<'_>]) -> TokenStream {
    let mut parameters = Vec::new();
    let mut values = Vec::new();
    for spec in fields {
        let ty = &spec.field.ty;
        if spec.attrs.skip {
            values.push(default_value(spec.attrs.default.as_ref()));
            continue;
        }
        let index = parameters.len();
        let parameter = match (field_name(spec.field, &spec.attrs), &spec.attrs.default) {
            (None, _) => quote! { #krate::Parameter::unnamed::<#ty>() },
            (Some(name), Some(default)) => {
                let value = default_value(Some(default));
                quote! { #krate::Parameter::with_default::<#ty>(#name, || #value) }
            }
            (Some(name), None) => match option_inner(ty) {
                Some(inner) if !spec.attrs.required => {
                    quote! { #krate::Parameter::optional::<#inner>(#name) }
                }
                _ => quote! { #krate::Parameter::required::<#ty>(#name) },
            },
        };
        let flatten = spec.attrs.flatten.then(|| quote! { .flatten() });
        parameters.push(quote! { #parameter #flatten });
        values.push(quote! { arguments.take::<#ty>(#index)? });
    }
    let construct = match shape {
        Fields::Named(_) => {
            let members = fields.iter().map(|spec| &spec.member);
            quote! { Self { #( #members: #values ),* } }
        }
        Fields::Unnamed(_) => quote! { Self( #( #values ),* ) },
        Fields::Unit => quote! { Self },
    };
    let arguments = if parameters.is_empty() {
        quote! { _ }
    } else {
        quote! { arguments }
    };
    quote! {
        #krate::ObjectShape::new().with_constructor(#krate::ConstructorShape::new(
            ::std::vec![ #( #parameters ),* ],
            |#arguments: &mut #krate::Arguments| ::core::result::Result::Ok(#construct),
        ))
    }
}

fn setter_shape(krate: &TokenStream, fields: &[FieldSpec<'_>]) -> syn::Result<TokenStream> {
    let overrides: Vec<TokenStream> = fields
        .iter()
        .filter_map(|spec| match &spec.attrs.default {
            Some(FieldDefault::Expr(expr)) => {
                let member = &spec.member;
                Some(quote! { value.#member = #expr; })
            }
            _ => None,
        })
        .collect();
    let create = if overrides.is_empty() {
        quote! { <Self as ::core::default::Default>::default }
    } else {
        quote! {
            || {
                let mut value = <Self as ::core::default::Default>::default();
                #( #overrides )*
                value
            }
        }
    };
    let mut properties = Vec::new();
    for spec in fields.iter().filter(|spec| !spec.attrs.skip) {
        let Some(name) = field_name(spec.field, &spec.attrs) else {
            return Err(syn::Error::new_spanned(
                spec.field,
                "setter binding needs a field name; add #[bind(rename = \"...\")] or use #[bind(constructor)]",
            ));
        };
        let ty = &spec.field.ty;
        let member = &spec.member;
        let required = spec.attrs.required.then(|| quote! { .required() });
        let flatten = spec.attrs.flatten.then(|| quote! { .flatten() });
        properties.push(quote! {
            .with_property(
                #krate::Property::<Self>::new::<#ty>(#name, |target: &mut Self| &mut target.#member)
                    #required
                    #flatten
            )
        });
    }
    Ok(quote! {
        #krate::ObjectShape::new().with_setters(
            #krate::SetterShape::new(#create)
                #( #properties )*
        )
    })
}
