use anyhow::Context;
use subconf_common::{SchemaRegistry, config::Config};
use tracing::info;

/// Prints the schema's settings, with `--state` applied, as pretty JSON on stdout.
pub fn show(schema: &str, cfg: &Config) -> anyhow::Result<()> {
    let mut settings = SchemaRegistry::builtin().create(schema)?;

    if let Some(path) = &cfg.state {
        let loaded = settings
            .load(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        if !loaded && cfg.quiet == 0 {
            info!("No state file at {}, showing defaults", path.display());
        }
    }

    println!("{}", settings.to_pretty_json()?);
    Ok(())
}
