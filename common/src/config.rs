use std::path::PathBuf;

/// Options for a host run, collected from the command line.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Output reduction level. `0` prints headers and summaries, anything
    /// above suppresses decoration.
    pub quiet: u8,
    /// Skips the startup banner.
    pub no_banner: bool,
    /// Stops the host loop after the first editor session.
    pub once: bool,
    /// JSON file the settings are loaded from before the first session
    /// and written back to after every session.
    pub state: Option<PathBuf>,
}
