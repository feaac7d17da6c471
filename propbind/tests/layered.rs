//! Binding from layered sources: files, environment and command line.

use std::sync::Arc;
use std::thread;

use anyhow::{Result, anyhow, ensure};
use figment::providers::Format as _;
use propbind::{
    AttachedSources, BindOptions, Bindable, Binder, CommandLineSource, DataObject,
    EnvironmentSource, FigmentSource, MapSource, OriginKind, PropertySource, SourceSet,
    load_config_file,
};
use rstest::{fixture, rstest};
use serial_test::serial;
use test_helpers::{env, files::ConfigDir};

#[derive(Debug, Clone, Default, PartialEq, DataObject)]
struct Database {
    url: String,
    pool: u32,
    replicas: Vec<String>,
}

#[fixture]
fn dir() -> ConfigDir {
    ConfigDir::new().expect("create config dir")
}

fn layered(layers: Vec<Arc<dyn PropertySource>>) -> Binder {
    Binder::new(SourceSet::from(layers))
}

#[rstest]
fn files_chain_through_extends(dir: ConfigDir) -> Result<()> {
    dir.write(
        "base.properties",
        "db.url=postgres://base\ndb.pool=4\ndb.replicas=r1, r2\n",
    )?;
    let app = dir.write("app.toml", "extends = \"base.properties\"\n\n[db]\npool = 16\n")?;
    let binder = layered(load_config_file(app.as_std_path())?);
    let outcome = binder.bind_traced::<Database>("db", Bindable::of(), BindOptions::default())?;
    let db = outcome.value.clone().ok_or_else(|| anyhow!("db not bound"))?;
    ensure!(db.url == "postgres://base");
    ensure!(db.pool == 16);
    ensure!(db.replicas == ["r1", "r2"]);

    let url_origin = outcome
        .origin_of("db.url")
        .ok_or_else(|| anyhow!("url has no origin"))?;
    let rendered = url_origin.to_string();
    ensure!(rendered.ends_with("base.properties - 1:8"), "{rendered}");
    let parent = url_origin
        .parent()
        .ok_or_else(|| anyhow!("base file should record its importer"))?;
    match parent.kind() {
        OriginKind::TextResource { resource, key, .. } => {
            ensure!(resource.as_str().ends_with("app.toml"));
            ensure!(key.as_deref() == Some("extends"));
        }
        other => return Err(anyhow!("unexpected parent origin {other:?}")),
    }
    Ok(())
}

#[rstest]
#[serial]
fn environment_overrides_files(dir: ConfigDir) -> Result<()> {
    let app = dir.write("app.json", r#"{ "db": { "url": "file", "pool": 2 } }"#)?;
    let _scope = env::scope_vars([("PBLAYER_DB_POOL", "32"), ("PBLAYER_DB_REPLICAS_0", "env-r")]);
    let mut layers: Vec<Arc<dyn PropertySource>> =
        vec![Arc::new(EnvironmentSource::from_process().with_prefix("PBLAYER"))];
    layers.extend(load_config_file(app.as_std_path())?);
    let db: Database = layered(layers)
        .bind("db", Bindable::of())?
        .ok_or_else(|| anyhow!("db not bound"))?;
    ensure!(db.url == "file");
    ensure!(db.pool == 32);
    ensure!(db.replicas == ["env-r"]);
    Ok(())
}

#[rstest]
#[serial]
fn command_line_overrides_environment() -> Result<()> {
    let _scope = env::scope_vars([("PBCLI_DB_URL", "env"), ("PBCLI_DB_POOL", "8")]);
    let cli = CommandLineSource::parse(["--db.url=cli", "--db.replicas=a", "--db.replicas=b", "serve"])?;
    ensure!(cli.non_option_args() == ["serve"]);
    let binder = layered(vec![
        Arc::new(cli) as Arc<dyn PropertySource>,
        Arc::new(EnvironmentSource::from_process().with_prefix("PBCLI")),
    ]);
    let db: Database = binder
        .bind("db", Bindable::of())?
        .ok_or_else(|| anyhow!("db not bound"))?;
    ensure!(db.url == "cli");
    ensure!(db.pool == 8);
    ensure!(db.replicas == ["a", "b"]);
    Ok(())
}

#[rstest]
fn missing_file_contributes_nothing(dir: ConfigDir) -> Result<()> {
    let sources = load_config_file(dir.path().join("absent.toml").as_std_path())?;
    ensure!(sources.is_empty());
    Ok(())
}

#[rstest]
fn unknown_file_keys_are_reported_on_request(dir: ConfigDir) -> Result<()> {
    let app = dir.write("app.toml", "[db]\nurl = \"x\"\npoool = 3\n")?;
    let binder = layered(load_config_file(app.as_std_path())?);
    let strict = BindOptions::new().with_ignore_unknown_fields(false);
    let Err(err) = binder.bind_with::<Database>("db", Bindable::of(), strict) else {
        return Err(anyhow!("misspelt key must be reported"));
    };
    let text = err.to_string();
    ensure!(text.contains("db.poool"), "{text}");
    ensure!(text.contains("app.toml"), "{text}");
    Ok(())
}

#[rstest]
fn attached_sources_see_later_additions() -> Result<()> {
    let attached = AttachedSources::new();
    attached.add_last(Arc::new(MapSource::new("defaults", [("db.pool", "1")])));
    let binder = Binder::new(SourceSet::single(Arc::new(attached.clone())));
    let before: Option<u32> = binder.bind("db.pool", Bindable::of())?;
    attached.add_first(Arc::new(MapSource::new("late", [("db.pool", "2")])));
    let after: Option<u32> = binder.bind("db.pool", Bindable::of())?;
    ensure!(before == Some(1) && after == Some(2));
    Ok(())
}

#[rstest]
fn binders_are_shared_across_threads() -> Result<()> {
    let defaults = MapSource::new("defaults", [("db.url", "shared"), ("db.pool", "3")]);
    let binder = layered(vec![Arc::new(defaults) as Arc<dyn PropertySource>]);
    let results: Vec<Option<Database>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| binder.bind::<Database>("db", Bindable::of())))
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                let bound = handle.join().map_err(|_| anyhow!("bind thread panicked"))?;
                bound.map_err(anyhow::Error::from)
            })
            .collect::<Result<_>>()
    })?;
    ensure!(results.len() == 4);
    ensure!(results.iter().all(|bound| bound.as_ref().is_some_and(|db| db.pool == 3)));
    ensure!(binder.registry().len() == 1);
    Ok(())
}

#[rstest]
#[serial]
fn figment_values_bind_with_file_origins() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("app.toml", "[db]\nurl = \"figment\"\npool = 5\n")?;
        jail.set_env("APP_DB_POOL", "6");
        let config = figment::Figment::from(figment::providers::Toml::file("app.toml"))
            .merge(figment::providers::Env::prefixed("APP_").split("_"));
        let source = FigmentSource::new("figment", &config)
            .map_err(|e| figment::Error::from(e.to_string()))?;
        let binder = layered(vec![Arc::new(source) as Arc<dyn PropertySource>]);
        let outcome = binder
            .bind_traced::<Database>("db", Bindable::of(), BindOptions::default())
            .map_err(|e| figment::Error::from(e.to_string()))?;
        let db = outcome
            .value
            .clone()
            .ok_or_else(|| figment::Error::from("db not bound".to_owned()))?;
        assert_eq!(db.url, "figment");
        assert_eq!(db.pool, 6);
        let origin = outcome
            .origin_of("db.url")
            .ok_or_else(|| figment::Error::from("url has no origin".to_owned()))?;
        assert!(origin.to_string().contains("app.toml"), "{origin}");
        Ok(())
    });
}
