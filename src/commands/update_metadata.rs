use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
};
use tracing::info;

use crate::{
    config::Settings,
    error::MetadataError,
    ledger::{Ledger, RpcLedger},
    metadata::{
        self, MetadataField, current_data, decode_metadata, find_metadata_address,
        update_metadata_instruction,
    },
    utils,
};

pub async fn update_field(
    ledger: &dyn Ledger,
    mint: &Pubkey,
    field: MetadataField,
    value: &str,
    wallet: &Keypair,
) -> Result<Signature> {
    let value = value.trim();
    if value.is_empty() {
        return Err(MetadataError::MissingValue(field.label()).into());
    }
    field.check(value)?;

    let address = find_metadata_address(mint);
    let account = ledger
        .account(&address)
        .await?
        .ok_or(MetadataError::NotFound(address))?;
    let current = decode_metadata(&address, &account.data)?;
    if !current.is_mutable {
        return Err(MetadataError::Immutable.into());
    }
    if current.update_authority != wallet.pubkey() {
        return Err(MetadataError::NotUpdateAuthority {
            expected: current.update_authority,
            actual: wallet.pubkey(),
        }
        .into());
    }

    let mut data = current_data(&current);
    metadata::set_field(&mut data, field, value);
    metadata::validate(&data)?;

    let instruction = update_metadata_instruction(&address, &wallet.pubkey(), data);
    info!(%mint, field = field.label(), "updating metadata");
    ledger.submit(&[instruction], wallet).await
}

pub async fn execute(
    field: MetadataField,
    mint: &str,
    words: &[String],
    wallet: Option<PathBuf>,
    settings: &Settings,
) -> Result<()> {
    let value = words.join(" ");
    println!("{}", format!("✏️  Updating token {}...\n", field.label()).bold());

    let mint = utils::parse_pubkey(mint)?;
    let wallet_path = settings.resolve_wallet_path(wallet.as_deref())?;
    let wallet = Settings::load_keypair(&wallet_path)?;
    let ledger = RpcLedger::new(settings.rpc_client());

    println!("  Mint: {}", mint.to_string().cyan());
    println!("  New {}: {}", field.label(), value.cyan());

    let signature = update_field(&ledger, &mint, field, &value, &wallet).await?;

    println!("{}", format!("✅ Token {} updated!", field.label()).green().bold());
    println!("   Signature: {signature}");
    println!(
        "   Explorer: {}",
        settings.explorer_tx_url(&signature.to_string()).underline()
    );
    Ok(())
}
