use std::fs;
use std::path::PathBuf;

use serde_json::{Value, json};
use subconf_common::schema::{EXAMPLE_SCHEMA, SHOWCASE_SCHEMA};
use subconf_common::{DynamicSettings, SchemaRegistry};
use tempfile::TempDir;

fn create(schema: &str) -> DynamicSettings {
    SchemaRegistry::builtin().create(schema).unwrap()
}

#[test]
fn every_builtin_schema_survives_a_state_file() -> anyhow::Result<()> {
    let dir: TempDir = tempfile::tempdir()?;
    let registry = SchemaRegistry::builtin();

    for name in registry.names() {
        let path: PathBuf = dir.path().join(format!("{name}.json"));
        let original: DynamicSettings = registry.create(name)?;
        original.save(&path)?;

        let mut restored: DynamicSettings = registry.create(name)?;
        assert!(restored.load(&path)?, "State file for {name} was not found");
        assert_eq!(restored.serialize(), original.serialize(), "Schema {name} changed on reload");
    }
    Ok(())
}

#[test]
fn edited_showcase_values_are_restored() -> anyhow::Result<()> {
    let dir: TempDir = tempfile::tempdir()?;
    let path: PathBuf = dir.path().join("nested").join("showcase.json");

    let mut edited: DynamicSettings = create(SHOWCASE_SCHEMA);
    edited.set("mode", "thorough")?;
    edited.set("ratio", 0.75f64)?;
    edited.set("separator", ';')?;
    edited.list_push("tags", "gamma")?;
    edited.map_put("limits", "disk", 64i32)?;
    edited.save(&path)?;

    let mut restored: DynamicSettings = create(SHOWCASE_SCHEMA);
    assert!(restored.load(&path)?);

    assert_eq!(restored.get::<String>("mode")?, "thorough");
    assert_eq!(restored.get::<f64>("ratio")?, 0.75);
    assert_eq!(restored.get::<char>("separator")?, ';');
    assert_eq!(restored.list_get::<String>("tags", 2)?, "gamma");
    assert_eq!(restored.map_get::<i32>("limits", "disk")?, Some(64));
    Ok(())
}

#[test]
fn state_file_keeps_registration_order() -> anyhow::Result<()> {
    let dir: TempDir = tempfile::tempdir()?;
    let path: PathBuf = dir.path().join("example.json");
    create(EXAMPLE_SCHEMA).save(&path)?;

    let document: Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
    let keys: Vec<&str> = document
        .as_object()
        .map(|object| object.keys().map(String::as_str).collect())
        .unwrap_or_default();
    assert_eq!(keys, vec!["example1", "example2", "example3", "example4"]);
    Ok(())
}

#[test]
fn missing_state_file_keeps_defaults() -> anyhow::Result<()> {
    let dir: TempDir = tempfile::tempdir()?;
    let mut settings: DynamicSettings = create(EXAMPLE_SCHEMA);

    assert!(!settings.load(&dir.path().join("absent.json"))?);
    assert_eq!(settings.serialize(), create(EXAMPLE_SCHEMA).serialize());
    Ok(())
}

#[test]
fn partial_state_file_only_overrides_present_keys() -> anyhow::Result<()> {
    let dir: TempDir = tempfile::tempdir()?;
    let path: PathBuf = dir.path().join("partial.json");
    fs::write(&path, json!({ "example3": 9, "stale": true }).to_string())?;

    let mut settings: DynamicSettings = create(EXAMPLE_SCHEMA);
    assert!(settings.load(&path)?);

    assert_eq!(settings.get::<i32>("example3")?, 9);
    assert_eq!(settings.get::<String>("example2")?, "default");
    Ok(())
}
