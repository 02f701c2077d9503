mod commands;
mod terminal;

use commands::{CommandLine, Commands, edit, run, schemas, show};
use subconf_core::protocol::ABORTED_EXIT_CODE;
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();
    let cfg = commands.config();

    logging::init(logging::default_level(&commands.command, cfg.quiet));

    match commands.command {
        Commands::Run { schema, .. } => {
            print::banner(cfg.no_banner, cfg.quiet);
            print::header("starting host", cfg.quiet);
            run::run(&schema, &cfg).await
        }
        Commands::Edit { schema, payload } => {
            if edit::edit(&schema, &payload)? == edit::EditOutcome::Discarded {
                std::process::exit(ABORTED_EXIT_CODE);
            }
            Ok(())
        }
        Commands::Show { schema, .. } => show::show(&schema, &cfg),
        Commands::Schemas => {
            print::header("available schemas", cfg.quiet);
            schemas::schemas();
            Ok(())
        }
    }
}
