use clap::Parser;
use inspections::cli::{Cli, Commands, TriggerArg};
use inspections::runner::{self, Trigger};
use inspections::{info, init_logger, scheduler};
use std::path::Path;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    init_logger();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // the logger thread may not drain before exit; report directly
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let env_file = Path::new(&cli.env_file);
    let settings_path = Path::new(&cli.settings);

    match cli.command {
        Commands::Keepalive => {
            scheduler::keepalive();
            Ok(())
        }
        Commands::Preflight => {
            runner::preflight(env_file, settings_path)?;
            info!("preflight ok");
            Ok(())
        }
        Commands::Run { trigger } => {
            let ctx = runner::preflight(env_file, settings_path)?;
            let trigger = match trigger {
                TriggerArg::Manual => Trigger::Manual,
                TriggerArg::Push => Trigger::Push,
            };
            scheduler::dispatch(trigger, &ctx).await
        }
        Commands::Schedule => {
            let ctx = runner::preflight(env_file, settings_path)?;
            scheduler::run_daemon(&ctx).await
        }
    }
}
