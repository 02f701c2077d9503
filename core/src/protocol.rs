//! # Update Protocol
//!
//! The host starts the editor as `<program> edit <schema> <settings-json>`.
//! The editor answers on stdout with one complete settings object per line,
//! compact JSON, newline terminated. Closing stdout ends the session; an
//! editor that was discarded exits with [`ABORTED_EXIT_CODE`].

use std::io::{self, Write};

use serde_json::Value;
use subconf_common::DynamicSettings;

use crate::error::{Result, SessionError};

/// Subcommand that puts the binary into editor mode.
pub const EDIT_COMMAND: &str = "edit";

/// Exit code of an editor that was closed without sending its final update.
/// Hosts treat it as a request to stop re-opening the editor.
pub const ABORTED_EXIT_CODE: i32 = 130;

/// Arguments appended after the launcher's own leading arguments.
pub fn editor_args(schema: &str, payload: &str) -> [String; 2] {
    [schema.to_string(), payload.to_string()]
}

pub fn encode_update(settings: &DynamicSettings) -> String {
    settings.to_json_line()
}

/// Writes one update line and flushes so the host sees it immediately.
pub fn write_update<W: Write>(writer: &mut W, settings: &DynamicSettings) -> io::Result<()> {
    writeln!(writer, "{}", encode_update(settings))?;
    writer.flush()
}

/// Decodes one line from the editor. Blank lines yield `None`.
pub fn decode_update(line: &str) -> Result<Option<Value>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let document: Value = serde_json::from_str(line)
        .map_err(|err| SessionError::MalformedUpdate(err.to_string()))?;
    if !document.is_object() {
        return Err(SessionError::MalformedUpdate(format!("expected an object, got `{line}`")));
    }
    Ok(Some(document))
}
