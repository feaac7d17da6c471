//! Binding through `#[derive(DataObject)]` and `#[derive(ConfigEnum)]`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow, ensure};
use propbind::{
    BindError, BindMethod, Bindable, Binder, ConfigEnum, DataObject, MapSource, PropertySource,
    SourceSet,
};
use rstest::rstest;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ConfigEnum)]
enum Mode {
    #[default]
    ReadOnly,
    ReadWrite,
    #[bind(rename = "off")]
    Disabled,
}

#[derive(Debug, Clone, Default, PartialEq, DataObject)]
struct Tls {
    enabled: bool,
    #[bind(rename = "cert")]
    certificate: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, DataObject)]
struct Server {
    host: String,
    #[bind(default = 8080)]
    port: u16,
    #[bind(rename = "max-connections")]
    max_connections: Option<u32>,
    mode: Mode,
    tls: Tls,
    #[bind(skip)]
    cache_hits: u64,
}

#[derive(Debug, PartialEq, DataObject)]
#[bind(constructor)]
struct Client {
    name: String,
    timeout: Option<Duration>,
    #[bind(default = 3)]
    retries: u8,
    #[bind(skip)]
    attempts: u32,
}

#[derive(Debug, PartialEq, DataObject)]
#[bind(constructor)]
struct Range(#[bind(rename = "min")] u32, #[bind(rename = "max")] u32);

#[derive(Debug, PartialEq, DataObject)]
#[bind(constructor)]
struct Point(i32, i32);

#[derive(Debug, Clone, Default, PartialEq, DataObject)]
struct Window {
    width: u32,
    height: u32,
}

#[derive(Debug, Clone, Default, PartialEq, DataObject)]
struct Pane {
    title: String,
    #[bind(flatten)]
    size: Window,
}

#[derive(Debug, Clone, Default, PartialEq, DataObject)]
struct Account {
    #[bind(required)]
    user: String,
    quota: u32,
}

fn binder(entries: &[(&str, &str)]) -> Binder {
    let source = Arc::new(MapSource::new("test", entries.iter().copied()));
    Binder::new(SourceSet::single(source as Arc<dyn PropertySource>))
}

#[rstest]
fn setter_derive_binds_nested_fields() -> Result<()> {
    let binder = binder(&[
        ("app.server.host", "example.org"),
        ("app.server.max-connections", "64"),
        ("app.server.mode", "read-write"),
        ("app.server.tls.enabled", "yes"),
        ("app.server.tls.cert", "/etc/cert.pem"),
    ]);
    let server: Server = binder
        .bind("app.server", Bindable::of())?
        .ok_or_else(|| anyhow!("server not bound"))?;
    ensure!(server.host == "example.org");
    ensure!(server.port == 8080, "default expression applies");
    ensure!(server.max_connections == Some(64));
    ensure!(server.mode == Mode::ReadWrite);
    ensure!(server.tls.enabled);
    ensure!(server.tls.certificate.as_deref() == Some("/etc/cert.pem"));
    ensure!(server.cache_hits == 0);
    Ok(())
}

#[rstest]
fn setter_derive_accepts_relaxed_field_names() -> Result<()> {
    let server: Server = binder(&[("APP.SERVER.MAXCONNECTIONS", "5"), ("app.server.HOST", "h")])
        .bind("app.server", Bindable::of())?
        .ok_or_else(|| anyhow!("server not bound"))?;
    ensure!(server.max_connections == Some(5));
    ensure!(server.host == "h");
    Ok(())
}

#[rstest]
fn setter_derive_merges_into_existing_instance() -> Result<()> {
    let existing = Server {
        host: "kept".into(),
        port: 1,
        ..Server::default()
    };
    let merged = binder(&[("server.port", "9")]).bind_into("server", existing)?;
    ensure!(merged.host == "kept");
    ensure!(merged.port == 9);
    Ok(())
}

#[rstest]
#[case::dashed("read-only", Mode::ReadOnly)]
#[case::screaming("READ_WRITE", Mode::ReadWrite)]
#[case::compact("readwrite", Mode::ReadWrite)]
#[case::renamed(" off ", Mode::Disabled)]
fn config_enum_matches_relaxedly(#[case] raw: &str, #[case] expected: Mode) -> Result<()> {
    let mode: Option<Mode> = binder(&[("mode", raw)]).bind("mode", Bindable::of())?;
    ensure!(mode == Some(expected), "{raw} bound as {mode:?}");
    Ok(())
}

#[rstest]
fn config_enum_lists_accepted_values() -> Result<()> {
    let Err(err) = binder(&[("mode", "maybe")]).bind::<Mode>("mode", Bindable::of()) else {
        return Err(anyhow!("'maybe' must not bind"));
    };
    let text = err.to_string();
    ensure!(text.contains("'maybe' is not one of: ReadOnly, ReadWrite, off"), "{text}");
    Ok(())
}

#[rstest]
fn constructor_derive_uses_defaults_and_optionals() -> Result<()> {
    let client: Client = binder(&[("client.name", "api"), ("client.timeout", "5s")])
        .bind("client", Bindable::of())?
        .ok_or_else(|| anyhow!("client not bound"))?;
    ensure!(
        client
            == Client {
                name: "api".into(),
                timeout: Some(Duration::from_secs(5)),
                retries: 3,
                attempts: 0,
            }
    );
    Ok(())
}

#[rstest]
fn constructor_derive_requires_name() -> Result<()> {
    let Err(err) = binder(&[("client.retries", "1")]).bind::<Client>("client", Bindable::of())
    else {
        return Err(anyhow!("name is required"));
    };
    match &*err {
        BindError::MissingRequiredParameter { parameter, .. } => {
            ensure!(parameter == "name");
            Ok(())
        }
        other => Err(anyhow!("unexpected error {other}")),
    }
}

#[rstest]
fn renamed_tuple_fields_bind_by_constructor() -> Result<()> {
    let range: Option<Range> = binder(&[("range.min", "1"), ("range.max", "9")])
        .bind("range", Bindable::of())?;
    ensure!(range == Some(Range(1, 9)));
    Ok(())
}

#[rstest]
fn unnamed_tuple_fields_cannot_bind() -> Result<()> {
    let Err(err) = binder(&[("point[0]", "1")]).bind::<Point>("point", Bindable::of()) else {
        return Err(anyhow!("tuple fields have no names"));
    };
    ensure!(matches!(&*err, BindError::ParameterNamesUnavailable { .. }), "{err}");
    Ok(())
}

#[rstest]
fn flattened_fields_bind_from_the_parent_prefix() -> Result<()> {
    let pane: Pane = binder(&[("pane.title", "main"), ("pane.width", "80"), ("pane.height", "24")])
        .bind("pane", Bindable::of())?
        .ok_or_else(|| anyhow!("pane not bound"))?;
    ensure!(pane.title == "main");
    ensure!(pane.size == Window { width: 80, height: 24 });
    Ok(())
}

#[rstest]
fn required_setter_field_must_be_bound() -> Result<()> {
    let Err(err) = binder(&[("account.quota", "10")]).bind::<Account>("account", Bindable::of())
    else {
        return Err(anyhow!("user is required"));
    };
    ensure!(matches!(&*err, BindError::MissingRequiredProperty { .. }), "{err}");

    let kept = binder(&[("account.quota", "10")]).bind_into(
        "account",
        Account {
            user: "root".into(),
            quota: 0,
        },
    )?;
    ensure!(kept.user == "root" && kept.quota == 10);
    Ok(())
}

#[rstest]
fn lists_of_derived_objects_bind_per_index() -> Result<()> {
    let windows: Vec<Window> = binder(&[
        ("layout[0].width", "1"),
        ("layout[0].height", "2"),
        ("layout[1].width", "3"),
    ])
    .bind("layout", Bindable::of())?
    .ok_or_else(|| anyhow!("layout not bound"))?;
    ensure!(
        windows
            == [
                Window { width: 1, height: 2 },
                Window { width: 3, height: 0 },
            ]
    );
    Ok(())
}

#[rstest]
fn setter_hint_on_constructor_type_is_rejected() -> Result<()> {
    let Err(err) = binder(&[("client.name", "x")])
        .bind::<Client>("client", Bindable::of().with_bind_method(BindMethod::Setter))
    else {
        return Err(anyhow!("constructor types have no setters"));
    };
    ensure!(matches!(&*err, BindError::InstanceCreation { .. }), "{err}");
    Ok(())
}
