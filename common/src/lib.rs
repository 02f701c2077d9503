//! Shared building blocks for subconf: the typed settings registry, the
//! schema registry that rebuilds settings by name, and run configuration.

pub mod config;
pub mod error;
pub mod schema;
pub mod settings;

pub use error::{Result, SettingsError};
pub use schema::SchemaRegistry;
pub use settings::{DynamicSettings, NumberKind, Setting, SettingKind, SettingType, SettingValue};
