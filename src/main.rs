mod commands;
mod config;
mod creator;
mod error;
mod ledger;
mod metadata;
mod prompt;
mod spl_cli;
mod store;
mod upload;
mod utils;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;

#[derive(Parser, Debug)]
#[command(name = "spl-token-deployer")]
#[command(about = "Create, mint, view and update SPL tokens on Solana", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<commands::Commands>,

    // Without a subcommand, a new token is created.
    #[command(flatten)]
    create: commands::create::CreateArgs,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("{} {e:?}", "❌ Error:".red().bold());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::from_env()?;
    print_banner(&settings);

    match cli.command {
        Some(command) => commands::handle_command(command, &settings).await,
        None => commands::create::execute(cli.create, &settings).await,
    }
}

fn print_banner(settings: &Settings) {
    println!("{}", "═══ SPL Token Deployer ═══".bold().cyan());
    println!(
        "Network: {}  |  {}\n",
        settings.network.to_string().yellow(),
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
}
