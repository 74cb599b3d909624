use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about = "Development helpers for Radius apps", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure current app for local HTTPS development through puma-dev
    PumaDev {
        /// Add Puma-dev CA as trusted user cert to login keychain
        #[arg(long)]
        cert: bool,

        /// Force overwriting links and ENV settings
        #[arg(long)]
        force: bool,

        /// Initial puma-dev setup
        #[arg(long)]
        setup: bool,

        /// Print progress to standard out
        #[arg(long)]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::PumaDev {
            cert,
            force,
            setup,
            verbose,
        } => {
            commands::puma_dev::execute(cert, force, setup, verbose)?;
        }
    }

    Ok(())
}
