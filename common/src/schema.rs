//! # Schema Registry
//!
//! The editor runs in a separate process and only receives a schema *name*.
//! This registry maps that name back to a constructor so both processes build
//! structurally identical settings.

use crate::error::{Result, SettingsError};
use crate::settings::{DynamicSettings, NumberKind, SettingKind};

pub const EXAMPLE_SCHEMA: &str = "example";
pub const SHOWCASE_SCHEMA: &str = "showcase";

/// Builds a settings object populated with defaults.
pub type SchemaConstructor = fn() -> Result<DynamicSettings>;

#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: Vec<(String, SchemaConstructor)>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every schema shipped with subconf.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.schemas.push((EXAMPLE_SCHEMA.to_string(), example));
        registry.schemas.push((SHOWCASE_SCHEMA.to_string(), showcase));
        registry
    }

    pub fn register(&mut self, name: &str, constructor: SchemaConstructor) -> Result<()> {
        if self.contains(name) {
            return Err(SettingsError::DuplicateSchema(name.to_string()));
        }
        self.schemas.push((name.to_string(), constructor));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.iter().any(|(known, _)| known == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.iter().map(|(name, _)| name.as_str())
    }

    /// Instantiates the schema `name` with its default values.
    pub fn create(&self, name: &str) -> Result<DynamicSettings> {
        let (_, constructor) = self
            .schemas
            .iter()
            .find(|(known, _)| known == name)
            .ok_or_else(|| SettingsError::UnknownSchema(name.to_string()))?;
        constructor()
    }
}

fn example() -> Result<DynamicSettings> {
    let mut settings = DynamicSettings::new(EXAMPLE_SCHEMA);
    settings
        .register_bool("example1", false)?
        .register_string("example2", "default")?
        .register_number("example3", 0i32)?
        .register_number("example4", 0.0f64)?;
    Ok(settings)
}

fn showcase() -> Result<DynamicSettings> {
    let mut settings = DynamicSettings::new(SHOWCASE_SCHEMA);
    settings
        .register_bool("enabled", true)?
        .register_string("title", "subconf")?
        .register_bounded_int("retries", 3, 0, 10)?
        .register_bounded_double("ratio", 0.5, 0.0, 1.0)?
        .register_char("separator", ',')?
        .register_enum("mode", &["fast", "balanced", "thorough"], "balanced")?
        .register_number("timeout_ms", 30_000i64)?
        .register_number("scale", 1.5f32)?
        .register_number("priority", 0i16)?
        .register_list("tags", SettingKind::String, vec!["alpha".to_string(), "beta".to_string()])?
        .register_map(
            "limits",
            SettingKind::Number(NumberKind::Int),
            vec![("cpu", 4i32), ("memory", 512i32)],
        )?;
    Ok(settings)
}
