//! Tests for name parsing, relaxed equality and structural queries.

use std::collections::HashSet;

use rstest::rstest;

use super::{ElementKind, Form, PropertyName};

fn name(text: &str) -> PropertyName {
    PropertyName::parse(text).expect("valid name")
}

#[rstest]
#[case("my-app.name", "myApp.name")]
#[case("my-app.name", "my_app.name")]
#[case("MY_APP.NAME", "my-app.name")]
#[case("servers[0].host", "servers.0.host")]
#[case("servers[0]", "SERVERS[0]")]
fn relaxed_forms_are_equal(#[case] left: &str, #[case] right: &str) {
    assert_eq!(name(left), name(right));
    let set: HashSet<_> = [name(left)].into_iter().collect();
    assert!(set.contains(&name(right)));
}

#[rstest]
#[case("map[Key]", "map[key]")]
#[case("map[a.b]", "map.a.b")]
#[case("a.b", "a.b.c")]
fn different_names_are_not_equal(#[case] left: &str, #[case] right: &str) {
    assert_ne!(name(left), name(right));
}

#[rstest]
#[case("")]
#[case("server")]
#[case("myApp.serverName")]
#[case("my_app.servers[0].host")]
#[case("map[a.b][c]")]
#[case("map[x[1]].y")]
#[case("list.0.value")]
fn display_reparses_to_equal_name(#[case] text: &str) {
    let parsed = name(text);
    let rendered = parsed.to_string();
    assert_eq!(name(&rendered), parsed, "{rendered}");
}

#[rstest]
fn display_uses_dashed_form() {
    assert_eq!(name("myApp.serverName[Key]").to_string(), "my-app.server-name[Key]");
    assert_eq!(name("MY_APP").to_string(), "my-app");
}

#[rstest]
#[case("a..b")]
#[case(".a")]
#[case("a.")]
#[case("a[0")]
#[case("a]0")]
#[case("a[]")]
#[case("a[0]b")]
#[case("a.[0]")]
#[case("-a")]
#[case("a-")]
#[case("a b")]
#[case("a$b")]
fn rejects_malformed_text(#[case] text: &str) {
    let err = PropertyName::parse(text).expect_err("malformed");
    assert_eq!(err.text(), text);
}

#[rstest]
fn empty_text_is_root() {
    let root = name("");
    assert!(root.is_empty());
    assert_eq!(root, PropertyName::empty());
    assert!(root.parent().is_none());
    assert!(root.is_ancestor_of(&name("a")));
}

#[rstest]
fn ancestry_queries() {
    let parent = name("server");
    let child = name("server.ssl");
    let grandchild = name("server.ssl.enabled");
    assert!(parent.is_parent_of(&child));
    assert!(!parent.is_parent_of(&grandchild));
    assert!(parent.is_ancestor_of(&grandchild));
    assert!(!child.is_ancestor_of(&child));
    assert_eq!(grandchild.parent(), Some(child.clone()));
    assert_eq!(grandchild.chop(1), parent);
    assert_eq!(grandchild.sub_name(1), name("ssl.enabled"));
}

#[rstest]
fn append_operations() -> anyhow::Result<()> {
    let base = name("app");
    assert_eq!(base.append("servers[1]")?, name("app.servers[1]"));
    assert_eq!(base.append_index(3), name("app[3]"));
    assert_eq!(base.append_key("plain")?, name("app.plain"));
    assert_eq!(base.append_key("a.b")?, name("app[a.b]"));
    assert_eq!(base.append_key("a[b]")?, name("app[a[b]]"));
    assert!(base.append_key("a]b").is_err());
    assert!(base.append_key("").is_err());
    assert!(base.append("bad..name").is_err());
    Ok(())
}

#[rstest]
fn element_metadata() {
    let parsed = name("list[0].map[key].1");
    let kinds: Vec<_> = parsed.elements().iter().map(|e| e.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            ElementKind::Dotted,
            ElementKind::NumericIndex,
            ElementKind::Dotted,
            ElementKind::Indexed,
            ElementKind::Dotted,
        ]
    );
    assert!(parsed.is_numeric_index());
    assert_eq!(parsed.element(1).and_then(|e| e.index()), Some(0));
    assert_eq!(parsed.element(3).and_then(|e| e.index()), None);
}

#[rstest]
fn forms_and_key_text() {
    let parsed = name("myMap[Some.Key].sub_key");
    let last = parsed.last_element().expect("element");
    assert_eq!(last.form(Form::Original), "sub_key");
    assert_eq!(last.form(Form::Dashed), "sub-key");
    assert_eq!(last.form(Form::Uniform), "subkey");
    assert_eq!(parsed.key_text(1), "Some.Key.sub_key");
    assert_eq!(parsed.original_text(), "myMap[Some.Key].sub_key");
}
