//! Errors raised while launching an editor or applying its updates.

use subconf_common::SettingsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("failed to launch editor `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("editor stdout was not captured")]
    MissingStdout,

    #[error("update is not a settings object: {0}")]
    MalformedUpdate(String),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("update reader stopped unexpectedly: {0}")]
    Reader(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
