//! Tests for precedence, descendant classification and placeholders.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::{PlaceholderResolver, Resolution, Resolver};
use crate::error::BindError;
use crate::name::PropertyName;
use crate::source::{DescendantState, MapSource, PropertySource, SourceSet};

fn name(text: &str) -> PropertyName {
    PropertyName::parse(text).expect("valid name")
}

#[derive(Debug)]
struct ExactOnly;

impl PropertySource for ExactOnly {
    fn name(&self) -> &str {
        "exact-only"
    }

    fn get(&self, _name: &PropertyName) -> Option<crate::ConfigurationProperty> {
        None
    }
}

#[fixture]
fn layered() -> SourceSet {
    vec![
        Arc::new(MapSource::new("A", [("x", "1"), ("greeting", "hello ${user.name:anon}")]))
            as Arc<dyn PropertySource>,
        Arc::new(MapSource::new(
            "B",
            [("x", "2"), ("user.name", "sam"), ("a", "${b}"), ("b", "${a}"), ("nested.key", "user.name")],
        )),
    ]
    .into()
}

#[rstest]
fn first_source_wins(layered: SourceSet) {
    let found = Resolver::new(&layered).find(&name("x")).expect("present");
    assert_eq!(found.text(), "1");
    assert_eq!(found.source_name(), "A");
    assert!(found.origin().is_some_and(|o| o.to_string().contains("\"A\"")));
}

#[rstest]
fn resolve_distinguishes_values_branches_and_absence(layered: SourceSet) {
    let resolver = Resolver::new(&layered);
    assert!(matches!(resolver.resolve(&name("x")), Resolution::Found(_)));
    assert_eq!(
        resolver.resolve(&name("user")),
        Resolution::HasDescendants(DescendantState::Present)
    );
    assert_eq!(resolver.resolve(&name("missing")), Resolution::NotFound);
}

#[rstest]
fn unknown_descendants_are_reported_conservatively() {
    let sources: SourceSet = vec![Arc::new(ExactOnly) as Arc<dyn PropertySource>].into();
    assert_eq!(
        Resolver::new(&sources).resolve(&name("anything")),
        Resolution::HasDescendants(DescendantState::Unknown)
    );
}

#[rstest]
#[case("${user.name}", "sam")]
#[case("${userName:x}", "x")]
#[case("${user-name.missing:fallback}", "fallback")]
#[case("${missing}", "${missing}")]
#[case("${missing:${user.name}}", "sam")]
#[case("${${nested.key}}", "sam")]
#[case("plain $ text {}", "plain $ text {}")]
#[case("${x}-${x}", "1-1")]
fn expands_placeholders(layered: SourceSet, #[case] input: &str, #[case] expected: &str) {
    let placeholders = PlaceholderResolver::new(Resolver::new(&layered));
    assert_eq!(placeholders.resolve(input).expect("expands"), expected);
}

#[rstest]
fn expands_placeholders_inside_resolved_values(layered: SourceSet) {
    let placeholders = PlaceholderResolver::new(Resolver::new(&layered));
    assert_eq!(placeholders.resolve("${greeting}").expect("expands"), "hello sam");
}

#[rstest]
fn cyclic_placeholders_fail(layered: SourceSet) {
    let placeholders = PlaceholderResolver::new(Resolver::new(&layered));
    let err = placeholders.resolve("${a}").expect_err("cycle");
    match &*err {
        BindError::CyclicBind { chain, .. } => assert_eq!(chain, "a -> b -> a"),
        other => panic!("unexpected error {other:?}"),
    }
}
