use std::io;

use anyhow::Context;
use subconf_common::SchemaRegistry;
use subconf_core::{editor::SettingsEditor, protocol};
use tracing::debug;

use crate::terminal::editor::{self, Exit};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Closed,
    Discarded,
}

/// Editor side of a session: rebuild the settings named by `schema`, apply
/// `payload`, and stream every save to stdout.
pub fn edit(schema: &str, payload: &str) -> anyhow::Result<EditOutcome> {
    let mut settings = SchemaRegistry::builtin()
        .create(schema)
        .with_context(|| format!("building settings for schema `{schema}`"))?;
    settings
        .apply_json_str(payload)
        .context("applying the settings passed by the host")?;

    let mut form = SettingsEditor::new(settings);
    let stdout = io::stdout();
    let exit = editor::run(&mut form, |settings| {
        protocol::write_update(&mut stdout.lock(), settings).context("sending settings to the host")
    })?;

    debug!("Editor for `{}` finished: {:?}", schema, exit);
    Ok(match exit {
        Exit::Closed => EditOutcome::Closed,
        Exit::Discarded => EditOutcome::Discarded,
    })
}
