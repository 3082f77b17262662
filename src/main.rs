use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use countonme::commands::{
    ProductCommand, RegisterCommand, StatusCommand, SyncCommand, WeightCommand,
};
use countonme::config::Config;

#[derive(Parser)]
#[command(name = "com")]
#[command(version)]
#[command(about = "Offline-first nutrition tracking client", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register this device with a CountOnMe server
    Register(RegisterCommand),

    /// Show sync configuration and queue status
    Status(StatusCommand),

    /// Flush queued changes to the server
    Sync(SyncCommand),

    /// Track body weight
    Weight(WeightCommand),

    /// Browse the product catalog
    Product(ProductCommand),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load(cli.config)?;

    match &cli.command {
        Commands::Register(cmd) => cmd.run(&config)?,
        Commands::Status(cmd) => cmd.run(&config)?,
        Commands::Sync(cmd) => cmd.run(&config)?,
        Commands::Weight(cmd) => cmd.run(&config)?,
        Commands::Product(cmd) => cmd.run(&config)?,
    }

    Ok(())
}
