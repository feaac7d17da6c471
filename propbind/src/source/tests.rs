//! Tests for the bundled property sources and source aggregates.

use std::sync::Arc;

use rstest::{fixture, rstest};
use serde_json::json;

use super::{
    AttachedSources, CommandLineSource, DescendantState, EnvironmentSource, FigmentSource,
    MapSource, PrefixedSource, PropertyNameAliases, PropertySource, SourceSet, StructuredSource,
};
use crate::name::PropertyName;
use crate::origin::OriginKind;

fn name(text: &str) -> PropertyName {
    PropertyName::parse(text).expect("valid name")
}

fn text_of(source: &dyn PropertySource, key: &str) -> Option<String> {
    source.get(&name(key)).map(|p| p.text().into_owned())
}

#[fixture]
fn tree() -> StructuredSource {
    StructuredSource::new(
        "tree",
        json!({
            "server": {
                "port": 8080,
                "hosts": ["alpha", "beta"],
                "ssl.enabled": true,
                "tags": [],
            },
            "my-app": { "name": "demo" },
            "myApp": { "name": "shadowed" },
            "empty": {},
        }),
    )
}

#[rstest]
#[case("my-app.name")]
#[case("myApp.name")]
#[case("my_app.name")]
#[case("MY-APP.NAME")]
fn map_source_matches_relaxed_names(#[case] lookup: &str) {
    let source = MapSource::new("m", [("my-app.name", "demo")]);
    assert_eq!(text_of(&source, lookup).as_deref(), Some("demo"));
}

#[rstest]
fn map_source_prefers_exact_spelling_then_first_entry() {
    let source = MapSource::new("m", [("my-app.name", "dashed"), ("myApp.name", "camel")]);
    assert_eq!(text_of(&source, "myApp.name").as_deref(), Some("camel"));
    assert_eq!(text_of(&source, "my-app.name").as_deref(), Some("dashed"));
    assert_eq!(text_of(&source, "my_app.name").as_deref(), Some("dashed"));
    assert_eq!(source.property_names().map(|n| n.len()), Some(1));
}

#[rstest]
fn map_source_skips_invalid_keys_and_reports_origin() {
    let source = MapSource::new("m", [("bad key", "x"), ("good", "y")]);
    assert_eq!(source.len(), 1);
    let found = source.get(&name("good")).expect("present");
    let origin = found.origin().expect("origin");
    assert!(matches!(
        origin.kind(),
        OriginKind::PropertySource { source, key } if source == "m" && key == "good"
    ));
}

#[rstest]
fn structured_source_walks_nested_values(tree: StructuredSource) {
    assert_eq!(text_of(&tree, "server.port").as_deref(), Some("8080"));
    assert_eq!(text_of(&tree, "server.hosts[1]").as_deref(), Some("beta"));
    assert_eq!(text_of(&tree, "server.hosts.0").as_deref(), Some("alpha"));
    assert_eq!(text_of(&tree, "server.ssl.enabled").as_deref(), Some("true"));
    assert_eq!(text_of(&tree, "server.hosts"), None);
    assert_eq!(text_of(&tree, "server.hosts[2]"), None);
}

#[rstest]
fn structured_source_prefers_exact_key(tree: StructuredSource) {
    assert_eq!(text_of(&tree, "myApp.name").as_deref(), Some("shadowed"));
    assert_eq!(text_of(&tree, "my-app.name").as_deref(), Some("demo"));
}

#[rstest]
fn structured_source_marks_empty_containers(tree: StructuredSource) {
    assert_eq!(text_of(&tree, "server.tags").as_deref(), Some(""));
    assert_eq!(text_of(&tree, "empty").as_deref(), Some(""));
}

#[rstest]
fn structured_source_reports_descendants(tree: StructuredSource) {
    let below = tree.descendant_names(&name("server")).expect("iterable");
    for expected in ["server.port", "server.hosts[0]", "server.hosts[1]", "server.ssl.enabled"] {
        assert!(below.contains(&name(expected)), "missing {expected}");
    }
    assert_eq!(tree.contains_descendant_of(&name("server.ssl")), DescendantState::Present);
    assert_eq!(tree.contains_descendant_of(&name("server.port")), DescendantState::Absent);
    assert_eq!(tree.contains_descendant_of(&name("missing")), DescendantState::Absent);
}

#[rstest]
fn structured_origin_names_key_path(tree: StructuredSource) {
    let found = tree.get(&name("server.hosts[1]")).expect("present");
    assert!(matches!(
        found.origin().map(|o| o.kind()),
        Some(OriginKind::PropertySource { key, .. }) if key == "server.hosts.1"
    ));
}

#[rstest]
fn structured_source_skips_keys_no_name_can_spell() {
    let source = StructuredSource::new("odd", json!({ "m": { "a]b": 1, "a[b]": 2, "": 3, "ok": 4 } }));
    let names = source.property_names().expect("iterable");
    assert_eq!(names.len(), 2, "{names:?}");
    for listed in &names {
        assert_eq!(&name(&listed.to_string()), listed);
    }
    assert_eq!(text_of(&source, "m[a[b]]").as_deref(), Some("2"));
    assert_eq!(text_of(&source, "m.ok").as_deref(), Some("4"));
}

#[rstest]
fn leaf_and_branch_can_share_a_name() {
    let source = MapSource::new("m", [("foo", "bar"), ("foo.baz", "qux")]);
    assert_eq!(text_of(&source, "foo").as_deref(), Some("bar"));
    assert_eq!(
        source.descendant_names(&name("foo")),
        Some(vec![name("foo.baz")])
    );
}

#[rstest]
#[case("MY_APP_PORT", "my-app.port")]
#[case("MYAPP_PORT", "my-app.port")]
#[case("my_app_port", "myApp.port")]
#[case("APP_SERVERS_0_HOST", "app.servers[0].host")]
fn environment_source_maps_variable_names(#[case] variable: &str, #[case] lookup: &str) {
    let source = EnvironmentSource::from_vars("env", [(variable, "v")]);
    assert_eq!(text_of(&source, lookup).as_deref(), Some("v"));
}

#[rstest]
fn environment_source_honours_prefix() {
    let source = EnvironmentSource::from_vars("env", [("DEMO_PORT", "1"), ("PORT", "2")])
        .with_prefix("DEMO_");
    assert_eq!(text_of(&source, "port").as_deref(), Some("1"));
    assert_eq!(source.property_names(), Some(vec![name("port")]));
}

#[rstest]
fn environment_source_lists_descendants() {
    let source = EnvironmentSource::from_vars(
        "env",
        [("MY_APP_SERVERS_0", "a"), ("MY_APP_SERVERS_1", "b"), ("OTHER", "c")],
    );
    let below = source.descendant_names(&name("my-app.servers")).expect("iterable");
    assert_eq!(below, vec![name("my-app.servers[0]"), name("my-app.servers[1]")]);
    let found = source.get(&name("my-app.servers[1]")).expect("present");
    assert!(matches!(
        found.origin().map(|o| o.kind()),
        Some(OriginKind::Environment { variable }) if variable == "MY_APP_SERVERS_1"
    ));
}

#[rstest]
fn environment_cannot_express_string_indices() {
    let source = EnvironmentSource::from_vars("env", [("MAP_KEY", "v")]);
    assert_eq!(text_of(&source, "map[key]"), None);
}

#[rstest]
fn command_line_source_parses_options() -> anyhow::Result<()> {
    let source = CommandLineSource::parse([
        "--server.port=9000",
        "--debug",
        "--tags=a",
        "--tags=b",
        "serve",
        "--",
        "--not-an-option",
    ])?;
    assert_eq!(text_of(&source, "server.port").as_deref(), Some("9000"));
    assert_eq!(text_of(&source, "debug").as_deref(), Some(""));
    assert_eq!(text_of(&source, "tags").as_deref(), Some("a,b"));
    assert_eq!(source.non_option_args(), ["serve", "--not-an-option"]);
    let origin = source
        .get(&name("server.port"))
        .and_then(|p| p.origin().cloned())
        .expect("origin");
    assert!(matches!(origin.kind(), OriginKind::CommandLine { position: 0, .. }));
    Ok(())
}

#[rstest]
fn command_line_source_rejects_empty_option_name() {
    assert!(CommandLineSource::parse(["--=oops"]).is_err());
}

#[rstest]
fn prefixed_view_strips_prefix() -> anyhow::Result<()> {
    let base: Arc<dyn PropertySource> =
        Arc::new(MapSource::new("m", [("app.server.port", "80"), ("other", "x")]));
    let view = PrefixedSource::new(base, "app")?;
    assert_eq!(text_of(&view, "server.port").as_deref(), Some("80"));
    assert_eq!(view.property_names(), Some(vec![name("server.port")]));
    Ok(())
}

#[rstest]
fn aliased_view_falls_back_and_keeps_origin() -> anyhow::Result<()> {
    let base: Arc<dyn PropertySource> = Arc::new(MapSource::new("m", [("app.new.port", "80")]));
    let aliases = PropertyNameAliases::new().with("app.old", &["app.new"])?;
    let set = SourceSet::single(base).with_aliases(aliases);
    let source = set.iter().next().expect("source");
    let found = source.get(&name("app.old.port")).expect("aliased");
    assert_eq!(found.name(), &name("app.old.port"));
    assert!(matches!(
        found.origin().map(|o| o.kind()),
        Some(OriginKind::PropertySource { key, .. }) if key == "app.new.port"
    ));
    assert_eq!(
        source.contains_descendant_of(&name("app.old")),
        DescendantState::Present
    );
    Ok(())
}

#[rstest]
fn filtered_set_hides_names() {
    let base: Arc<dyn PropertySource> = Arc::new(MapSource::new("m", [("a", "1"), ("b", "2")]));
    let set = SourceSet::single(base).filtered(|n| n.to_string() != "b");
    let source = set.iter().next().expect("source");
    assert_eq!(text_of(source.as_ref(), "a").as_deref(), Some("1"));
    assert_eq!(text_of(source.as_ref(), "b"), None);
}

#[rstest]
fn source_set_orders_by_precedence() {
    let low: Arc<dyn PropertySource> = Arc::new(MapSource::new("low", [("x", "1")]));
    let high: Arc<dyn PropertySource> = Arc::new(MapSource::new("high", [("x", "2")]));
    let set = SourceSet::single(low).with_first(high);
    let names: Vec<_> = set.iter().map(|s| s.name().to_owned()).collect();
    assert_eq!(names, ["high", "low"]);
    assert!(set.get_source("low").is_some());
}

#[rstest]
fn attached_sources_track_changes() {
    let attached = AttachedSources::new();
    let reader = attached.clone();
    attached.add_last(Arc::new(MapSource::new("base", [("x", "base")])));
    assert_eq!(text_of(&reader, "x").as_deref(), Some("base"));
    attached.add_first(Arc::new(MapSource::new("override", [("x", "override")])));
    assert_eq!(text_of(&reader, "x").as_deref(), Some("override"));
    assert!(attached.remove("override").is_some());
    assert!(attached.replace("base", Arc::new(MapSource::new("base", [("x", "new")]))));
    assert_eq!(text_of(&reader, "x").as_deref(), Some("new"));
    assert_eq!(reader.len(), 1);
}

#[rstest]
fn defaults_merge_in_place_with_newer_entries_winning() {
    let attached = AttachedSources::new();
    attached.add_or_merge_defaults([("port", "80"), ("host", "localhost")]);
    attached.add_first(Arc::new(MapSource::new("file", [("port", "9000")])));
    attached.add_or_merge_defaults([("host", "example.org"), ("debug", "true")]);
    attached.add_or_merge_defaults(Vec::<(&str, &str)>::new());

    let names: Vec<_> = attached.snapshot().iter().map(|s| s.name().to_owned()).collect();
    assert_eq!(names, ["file", AttachedSources::DEFAULTS_NAME]);
    assert_eq!(text_of(&attached, "port").as_deref(), Some("9000"));
    assert_eq!(text_of(&attached, "host").as_deref(), Some("example.org"));
    assert_eq!(text_of(&attached, "debug").as_deref(), Some("true"));
}

#[rstest]
fn defaults_start_fresh_once_removed() {
    let attached = AttachedSources::new();
    attached.add_or_merge_defaults([("a", "1")]);
    assert!(attached.remove(AttachedSources::DEFAULTS_NAME).is_some());
    attached.add_or_merge_defaults([("b", "2")]);
    assert_eq!(text_of(&attached, "a"), None);
    assert_eq!(text_of(&attached, "b").as_deref(), Some("2"));
}

#[rstest]
fn defaults_move_behind_later_sources() {
    let attached = AttachedSources::new();
    assert!(!attached.move_defaults_to_end());
    attached.add_or_merge_defaults([("x", "default")]);
    attached.add_last(Arc::new(MapSource::new("late", [("x", "late")])));
    assert_eq!(text_of(&attached, "x").as_deref(), Some("default"));
    assert!(attached.move_defaults_to_end());
    assert_eq!(text_of(&attached, "x").as_deref(), Some("late"));
    let last = attached.snapshot().iter().last().map(|s| s.name().to_owned());
    assert_eq!(last.as_deref(), Some(AttachedSources::DEFAULTS_NAME));
}

#[rstest]
fn attached_sources_survive_concurrent_mutation() {
    let attached = AttachedSources::new();
    attached.add_last(Arc::new(MapSource::new("base", [("x", "1")])));
    std::thread::scope(|scope| {
        let writer = attached.clone();
        scope.spawn(move || {
            for i in 0..200 {
                let source_name = format!("s{i}");
                writer.add_first(Arc::new(MapSource::new(source_name.clone(), [("y", "2")])));
                writer.remove(&source_name);
            }
        });
        for _ in 0..200 {
            assert_eq!(text_of(&attached, "x").as_deref(), Some("1"));
        }
    });
}

#[rstest]
fn figment_source_reports_file_origins() {
    use figment::providers::Format as _;
    figment::Jail::expect_with(|jail| {
        jail.create_file("app.toml", "[server]\nport = 7000\n")?;
        let figment = figment::Figment::from(figment::providers::Toml::file("app.toml"));
        let source = FigmentSource::new("figment", &figment)
            .map_err(|e| figment::Error::from(e.to_string()))?;
        let port = source
            .get(&name("server.port"))
            .ok_or_else(|| figment::Error::from("port missing"))?;
        assert_eq!(port.text(), "7000");
        match port.origin().map(|o| o.kind()) {
            Some(OriginKind::TextResource { resource, key, .. }) => {
                assert!(resource.as_str().ends_with("app.toml"));
                assert_eq!(key.as_deref(), Some("server.port"));
            }
            other => panic!("unexpected origin {other:?}"),
        }
        Ok(())
    });
}
