// dqguard/src/main.rs

use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Setup Logging (Tracing)
    // RUST_LOG=debug dqguard run ... pour voir les détails
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            project_dir,
            input,
            defaults,
            auto_accept,
            no_suggestions,
        } => {
            let opts = commands::run::RunOptions {
                input,
                defaults,
                auto_accept,
                suggestions: !no_suggestions,
            };
            commands::run::execute(project_dir, opts).await?
        }
        Commands::Rules {
            project_dir,
            defaults,
        } => commands::rules::execute(project_dir, defaults)?,
        Commands::Baseline {
            project_dir,
            defaults,
        } => commands::baseline::execute(project_dir, defaults)?,
    }

    Ok(())
}
