use std::path::Path;
use std::sync::PoisonError;
use std::time::{Duration, Instant};

use anyhow::Context;
use colored::*;
use subconf_common::{DynamicSettings, SchemaRegistry, config::Config};
use subconf_core::session::{self, ProcessLauncher, SessionSummary, SharedSettings};
use tracing::{info, warn};

use crate::mprint;
use crate::terminal::{colors, format, print};

/// Hosts the schema's settings and keeps re-opening the editor on them until
/// the editor is discarded, or after one session with `--once`.
pub async fn run(schema: &str, cfg: &Config) -> anyhow::Result<()> {
    let mut settings = SchemaRegistry::builtin().create(schema)?;

    if let Some(path) = &cfg.state {
        if settings
            .load(path)
            .with_context(|| format!("reading settings from {}", path.display()))?
        {
            info!("Loaded settings from {}", path.display());
        }
    }

    let settings: SharedSettings = session::shared(settings);
    let launcher = ProcessLauncher::current_exe().context("locating the subconf executable")?;

    loop {
        print::header("program opened, current settings", cfg.quiet);
        print_settings(&snapshot(&settings));
        info!("Waiting for settings...");

        let start_time: Instant = Instant::now();
        let summary: SessionSummary = session::open_config(settings.clone(), &launcher)
            .await?
            .wait()
            .await?;

        let current: DynamicSettings = snapshot(&settings);
        print::header("program closed, current settings", cfg.quiet);
        print_settings(&current);
        print_summary(&summary, start_time.elapsed(), cfg);

        if let Some(path) = &cfg.state {
            persist(&current, path)?;
        }

        if summary.aborted() {
            info!("Editor discarded, stopping");
            break;
        }
        if !summary.exited_cleanly() {
            if let Some(status) = summary.exit_status {
                warn!("Editor exited with {}", status);
            }
            break;
        }
        if cfg.once {
            break;
        }
        mprint!();
    }

    Ok(())
}

fn snapshot(settings: &SharedSettings) -> DynamicSettings {
    settings.read().unwrap_or_else(PoisonError::into_inner).clone()
}

fn print_settings(settings: &DynamicSettings) {
    print::as_tree_one_level(format::settings_to_detail(settings));
}

fn persist(settings: &DynamicSettings, path: &Path) -> anyhow::Result<()> {
    settings
        .save(path)
        .with_context(|| format!("writing settings to {}", path.display()))?;
    info!("Saved settings to {}", path.display());
    Ok(())
}

fn print_summary(summary: &SessionSummary, total_time: Duration, cfg: &Config) {
    let updates: ColoredString = format!("{} updates", summary.updates_applied).bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: String = format!(
        "{} {} received in {}",
        "Session complete:".color(colors::TEXT_DEFAULT),
        updates,
        total_time
    );

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output);
            if summary.updates_rejected > 0 {
                print::GLOBAL_KEY_WIDTH.set("rejected".len());
                print::aligned_line("rejected", summary.updates_rejected.to_string().red());
            }
        }
        _ => info!("{}", output),
    }
}
