//! Unit tests for the derive expansions.

use anyhow::{Result, anyhow, ensure};
use rstest::rstest;
use syn::{DeriveInput, parse_quote};

use crate::derive::{config_enum, data_object};

fn expand_data_object(input: &DeriveInput) -> Result<String> {
    data_object::expand(input)
        .map(|tokens| tokens.to_string())
        .map_err(|err| anyhow!("{err}"))
}

fn data_object_error(input: &DeriveInput) -> Result<String> {
    match data_object::expand(input) {
        Ok(tokens) => Err(anyhow!("expected an error, got {tokens}")),
        Err(err) => Ok(err.to_string()),
    }
}

#[rstest]
fn setter_shape_lists_each_field() -> Result<()> {
    let input: DeriveInput = parse_quote! {
        #[derive(Default, Clone)]
        struct Server {
            #[bind(rename = "host-name")]
            host: String,
            #[bind(required)]
            port: u16,
            #[bind(skip)]
            cache: Vec<u8>,
        }
    };
    let tokens = expand_data_object(&input)?;
    ensure!(tokens.contains("with_setters"), "{tokens}");
    ensure!(tokens.contains("\"host-name\""), "{tokens}");
    ensure!(tokens.contains("\"port\""), "{tokens}");
    ensure!(tokens.contains(". required ()"), "{tokens}");
    ensure!(!tokens.contains("\"cache\""), "{tokens}");
    ensure!(tokens.contains("bind_data_object"), "{tokens}");
    Ok(())
}

#[rstest]
fn setter_defaults_override_the_default_instance() -> Result<()> {
    let input: DeriveInput = parse_quote! {
        struct Pool {
            #[bind(default = 8)]
            size: u32,
        }
    };
    let tokens = expand_data_object(&input)?;
    ensure!(tokens.contains("value . size = 8"), "{tokens}");
    Ok(())
}

#[rstest]
fn constructor_shape_classifies_parameters() -> Result<()> {
    let input: DeriveInput = parse_quote! {
        #[bind(constructor)]
        struct Client {
            name: String,
            timeout: Option<u64>,
            #[bind(default = 3)]
            retries: u8,
            #[bind(flatten)]
            tls: Tls,
        }
    };
    let tokens = expand_data_object(&input)?;
    ensure!(tokens.contains("Parameter :: required :: < String > (\"name\")"), "{tokens}");
    ensure!(tokens.contains("Parameter :: optional :: < u64 > (\"timeout\")"), "{tokens}");
    ensure!(tokens.contains("Parameter :: with_default :: < u8 > (\"retries\""), "{tokens}");
    ensure!(tokens.contains(". flatten ()"), "{tokens}");
    ensure!(tokens.contains("arguments . take :: < Option < u64 > > (1usize)"), "{tokens}");
    Ok(())
}

#[rstest]
fn tuple_constructor_parameters_are_unnamed() -> Result<()> {
    let input: DeriveInput = parse_quote! {
        #[bind(constructor)]
        struct Pair(String, #[bind(rename = "second")] u8);
    };
    let tokens = expand_data_object(&input)?;
    ensure!(tokens.contains("Parameter :: unnamed :: < String > ()"), "{tokens}");
    ensure!(tokens.contains("(\"second\")"), "{tokens}");
    Ok(())
}

#[rstest]
fn crate_path_can_be_overridden() -> Result<()> {
    let input: DeriveInput = parse_quote! {
        #[bind(crate = "deps::propbind")]
        #[derive(Default, Clone)]
        struct Empty {}
    };
    let tokens = expand_data_object(&input)?;
    ensure!(tokens.contains("deps :: propbind :: DataObject"), "{tokens}");
    Ok(())
}

#[rstest]
#[case::enum_input(parse_quote! { enum Mode { A } }, "only be derived for structs")]
#[case::tuple_setter(parse_quote! { struct Pair(String); }, "needs a field name")]
#[case::unknown_key(parse_quote! { struct S { #[bind(bogus)] a: u8 } }, "unknown bind attribute `bogus`")]
#[case::required_default(
    parse_quote! { struct S { #[bind(required, default)] a: u8 } },
    "cannot be both"
)]
#[case::skip_rename(
    parse_quote! { struct S { #[bind(skip, rename = "b")] a: u8 } },
    "`skip` cannot be combined"
)]
fn data_object_rejects_invalid_input(#[case] input: DeriveInput, #[case] message: &str) -> Result<()> {
    let err = data_object_error(&input)?;
    ensure!(err.contains(message), "{err}");
    Ok(())
}

#[rstest]
fn config_enum_matches_uniform_forms() -> Result<()> {
    let input: DeriveInput = parse_quote! {
        enum Mode {
            ReadOnly,
            #[bind(rename = "rw")]
            ReadWrite,
        }
    };
    let tokens = config_enum::expand(&input)
        .map_err(|err| anyhow!("{err}"))?
        .to_string();
    ensure!(tokens.contains("\"readonly\" =>"), "{tokens}");
    ensure!(tokens.contains("\"rw\" =>"), "{tokens}");
    ensure!(tokens.contains("\"ReadOnly, rw\""), "{tokens}");
    Ok(())
}

#[rstest]
#[case::data_variant(parse_quote! { enum E { A(u8) } }, "cannot carry data")]
#[case::duplicate(parse_quote! { enum E { ReadOnly, #[bind(rename = "read_only")] Other } }, "matches the same text")]
#[case::struct_input(parse_quote! { struct S; }, "only be derived for enums")]
fn config_enum_rejects_invalid_input(#[case] input: DeriveInput, #[case] message: &str) -> Result<()> {
    match config_enum::expand(&input) {
        Ok(tokens) => Err(anyhow!("expected an error, got {tokens}")),
        Err(err) => {
            ensure!(err.to_string().contains(message), "{err}");
            Ok(())
        }
    }
}
