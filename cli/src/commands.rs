pub mod edit;
pub mod run;
pub mod schemas;
pub mod show;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use subconf_common::config::Config;
use subconf_common::schema::EXAMPLE_SCHEMA;

#[derive(Parser)]
#[command(name = "subconf")]
#[command(about = "Edit typed settings in a separate editor process.")]
pub struct CommandLine {
    /// Reduce output; repeat for less
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,
    /// Do not print the startup banner
    #[arg(long, global = true)]
    pub no_banner: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Host a settings object and repeatedly open the editor on it
    #[command(alias = "r")]
    Run {
        /// Schema to instantiate
        #[arg(long, default_value = EXAMPLE_SCHEMA)]
        schema: String,
        /// Stop after the first editor session
        #[arg(long)]
        once: bool,
        /// Load settings from this file and save them after every session
        #[arg(long)]
        state: Option<PathBuf>,
    },
    /// Editor process started by `run`; prints updates on stdout
    #[command(hide = true)]
    Edit { schema: String, payload: String },
    /// Print a schema's settings as JSON
    #[command(alias = "s")]
    Show {
        schema: String,
        /// Apply values from this file first
        #[arg(long)]
        state: Option<PathBuf>,
    },
    /// List the built-in schemas
    #[command(alias = "ls")]
    Schemas,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn config(&self) -> Config {
        let (once, state) = match &self.command {
            Commands::Run { once, state, .. } => (*once, state.clone()),
            Commands::Show { state, .. } => (false, state.clone()),
            _ => (false, None),
        };
        Config {
            quiet: self.quiet,
            no_banner: self.no_banner,
            once,
            state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_defaults_to_example_schema() {
        let cli = CommandLine::try_parse_from(["subconf", "run"]).unwrap();
        assert!(matches!(&cli.command, Commands::Run { schema, once: false, state: None } if schema == EXAMPLE_SCHEMA));
    }

    #[test]
    fn global_flags_reach_config() {
        let cli = CommandLine::try_parse_from([
            "subconf", "run", "--once", "--state", "/tmp/s.json", "-qq", "--no-banner",
        ])
        .unwrap();
        let cfg = cli.config();
        assert_eq!(cfg.quiet, 2);
        assert!(cfg.no_banner);
        assert!(cfg.once);
        assert_eq!(cfg.state, Some(PathBuf::from("/tmp/s.json")));
    }

    #[test]
    fn edit_takes_schema_and_json_payload() {
        let cli = CommandLine::try_parse_from(["subconf", "edit", "example", r#"{"example1":true}"#]).unwrap();
        assert!(matches!(&cli.command, Commands::Edit { schema, payload } if schema == "example" && payload.starts_with('{')));
    }
}
