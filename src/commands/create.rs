use std::{
    io::{BufRead, Write},
    path::{Path, PathBuf},
};

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use solana_sdk::signature::Signer;
use tracing::warn;

use crate::{
    config::Settings,
    creator::{self, CreationOutcome, CreationStrategy, Creator},
    ledger::RpcLedger,
    prompt::{Prompter, TokenSpec},
    spl_cli::{SplTokenCli, SystemRunner},
    store::TokenStore,
    upload::Uploader,
};

#[derive(Args, Debug, Default)]
pub struct CreateArgs {
    /// JSON file with name, symbol, decimals, initialSupply, description, imageUrl, imagePath
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Fabricate a mint address without touching the network or the wallet
    #[arg(short, long)]
    pub simulate: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    #[arg(long, value_enum, default_value_t = CreationStrategy::Auto)]
    pub strategy: CreationStrategy,

    #[arg(short, long)]
    pub wallet: Option<PathBuf>,
}

pub async fn execute(args: CreateArgs, settings: &Settings) -> Result<()> {
    println!("{}", "🪙 Creating a new SPL token...\n".bold());

    let Some(spec) = gather(&args, &mut Prompter::stdio())? else {
        println!("{}", "Token creation cancelled.".yellow());
        return Ok(());
    };

    let outcome = if args.simulate {
        println!("{}", "🧪 Simulation mode: nothing is sent to the network".yellow());
        creator::simulate(&spec, settings)
    } else {
        let wallet_path = settings.resolve_wallet_path(args.wallet.as_deref())?;
        let wallet = Settings::load_keypair(&wallet_path)?;
        println!("👛 Wallet: {}", wallet.pubkey().to_string().cyan());

        let cli = SplTokenCli::new(
            SystemRunner,
            settings.spl_token_bin.clone(),
            settings.rpc_url.clone(),
            wallet_path,
            wallet.pubkey(),
        );
        let uploader = Uploader::from_settings(settings);
        let ledger = RpcLedger::new(settings.rpc_client());
        Creator::new(cli, &uploader, &ledger, &wallet, settings)
            .create(&spec, args.strategy)
            .await?
    };

    print_outcome(&outcome);

    let store = TokenStore::new(&settings.token_output_dir);
    let path = store.save(&outcome.into_record(&spec))?;
    println!("\n💾 Token details saved to {}", path.display().to_string().cyan());
    Ok(())
}

fn gather<R: BufRead, W: Write>(
    args: &CreateArgs,
    prompter: &mut Prompter<R, W>,
) -> Result<Option<TokenSpec>> {
    let Some(spec) = load_spec(args.config.as_deref(), prompter)? else {
        return Ok(None);
    };
    spec.print_summary();
    if !args.yes && !prompter.confirm("Create this token?", true)? {
        return Ok(None);
    }
    Ok(Some(spec))
}

fn load_spec<R: BufRead, W: Write>(
    config: Option<&Path>,
    prompter: &mut Prompter<R, W>,
) -> Result<Option<TokenSpec>> {
    if let Some(path) = config {
        match TokenSpec::from_file(path) {
            Ok(spec) => return Ok(Some(spec)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unusable token config");
                println!(
                    "{}",
                    format!("⚠️  Could not use {}: {e:#}. Switching to interactive mode.", path.display())
                        .yellow()
                );
            }
        }
    }
    prompter.collect_token_spec()
}

fn print_outcome(outcome: &CreationOutcome) {
    println!("{}", "\n✅ Token created successfully!".green().bold());
    println!("  Mint: {}", outcome.mint.cyan());
    if let Some(sig) = &outcome.signature {
        println!("  Signature: {sig}");
    }
    if let Some(account) = &outcome.token_account {
        println!("  Token account: {account}");
    }
    if let Some(url) = &outcome.image_url {
        println!("  Image: {url}");
    }
    if let Some(uri) = &outcome.metadata_uri {
        println!("  Metadata URI: {uri}");
    }
    if let Some(address) = &outcome.metadata_address {
        println!("  Metadata account: {address}");
    }
    println!("  Explorer: {}", outcome.explorer_url.underline());
}
