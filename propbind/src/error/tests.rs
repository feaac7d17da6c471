//! Unit tests for error aggregation and origin lookup.

use rstest::rstest;
use std::sync::Arc;

use super::{BindError, UnboundProperty};
use crate::name::PropertyName;
use crate::origin::Origin;

fn name(text: &str) -> PropertyName {
    PropertyName::parse(text).expect("valid name")
}

fn missing(text: &str) -> BindError {
    BindError::MissingRequiredProperty {
        name: name(text),
        target_type: "u16",
    }
}

#[rstest]
fn single_owned_error_is_unwrapped() {
    let outcome = BindError::try_aggregate(vec![Arc::new(missing("a"))]);
    assert!(matches!(
        outcome,
        Some(BindError::MissingRequiredProperty { .. })
    ));
}

#[rstest]
fn single_shared_error_stays_aggregated() {
    let shared = Arc::new(missing("a"));
    let outcome = BindError::try_aggregate(vec![Arc::clone(&shared)]);
    match outcome {
        Some(BindError::Aggregate(aggregate)) => assert_eq!(aggregate.len(), 1),
        other => panic!("expected Aggregate, got {other:?}"),
    }
}

#[rstest]
fn empty_input_yields_none() {
    assert!(BindError::try_aggregate(Vec::<BindError>::new()).is_none());
    assert!(BindError::collapse(Vec::new()).is_none());
}

#[rstest]
fn aggregate_display_lists_each_failure() {
    let err = BindError::aggregate(vec![missing("a"), missing("b")]);
    let text = err.to_string();
    assert!(text.contains("\n  - missing required property 'a' for u16\n"), "{text}");
    assert!(text.ends_with("  - missing required property 'b' for u16"), "{text}");
}

#[rstest]
#[should_panic(expected = "aggregate requires at least one error")]
fn aggregate_panics_without_errors() {
    let _ = BindError::aggregate(Vec::<BindError>::new());
}

#[rstest]
fn origin_is_found_through_nested_causes() {
    let origin = Arc::new(Origin::environment("APP_PORT"));
    let conversion = Arc::new(BindError::TypeConversion {
        name: name("app.port"),
        value: "abc".into(),
        source_name: "env".into(),
        target_type: "u16",
        origin: Some(Arc::clone(&origin)),
        reason: "is not a number".into(),
    });
    let field = BindError::InvalidField {
        name: name("app.port"),
        source: conversion,
    };
    let outer = BindError::aggregate(vec![missing("app.host"), field]);
    assert_eq!(outer.origin(), Some(&origin));
}

#[rstest]
fn unbound_properties_list_origins() {
    let err = BindError::UnboundProperties {
        name: name("app"),
        unbound: vec![UnboundProperty {
            name: name("app.extra"),
            origin: Some(Arc::new(Origin::property_source("defaults", "app.extra"))),
        }],
    };
    let text = err.to_string();
    assert!(text.contains("'app.extra'"), "{text}");
    assert!(text.contains("defaults"), "{text}");
}
