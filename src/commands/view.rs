use std::fmt::Write;

use anyhow::Result;
use colored::Colorize;

use crate::{
    config::Settings,
    error::StoreError,
    ledger::{Ledger, RpcLedger, TokenSupply},
    store::{TokenRecord, TokenStore},
    utils,
};

#[derive(Clone, Debug, PartialEq)]
pub struct TokenDetails {
    pub mint: String,
    pub record: Option<TokenRecord>,
    pub on_chain: Option<TokenSupply>,
    pub explorer_url: String,
}

pub async fn token_details(
    store: &TokenStore,
    ledger: &dyn Ledger,
    settings: &Settings,
    identifier: &str,
    simulate: bool,
) -> Result<TokenDetails> {
    let mint = store.resolve(identifier)?;
    let record = store.find_by_mint(&mint)?;

    let on_chain = if simulate {
        if record.is_none() {
            return Err(StoreError::UnknownMint(mint).into());
        }
        None
    } else {
        let address = utils::parse_pubkey(&mint)?;
        Some(ledger.token_supply(&address).await?)
    };

    let explorer_url = record
        .as_ref()
        .and_then(|r| r.explorer_url.clone())
        .unwrap_or_else(|| settings.explorer_address_url(&mint));
    Ok(TokenDetails {
        mint,
        record,
        on_chain,
        explorer_url,
    })
}

fn render(details: &TokenDetails) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "🔎 Token Details".bold());
    if details.on_chain.is_none() {
        let _ = writeln!(out, "{}", "  (local record only, not fetched from the network)".dimmed());
    }
    let _ = writeln!(out, "  Mint: {}", details.mint.cyan());

    match &details.record {
        Some(record) => {
            let _ = writeln!(out, "  Name: {}", record.name);
            let _ = writeln!(out, "  Symbol: {}", record.symbol);
        }
        None => {
            let _ = writeln!(out, "  {}", "No local record for this mint".yellow());
        }
    }

    match (&details.on_chain, &details.record) {
        (Some(supply), record) => {
            let _ = writeln!(out, "  Decimals: {}", supply.decimals);
            let _ = writeln!(out, "  Supply: {}", supply.ui_amount);
            let _ = writeln!(out, "  Supply (base units): {}", supply.amount);
            if let Some(record) = record {
                let _ = writeln!(out, "  Initial supply: {}", record.initial_supply);
            }
        }
        (None, Some(record)) => {
            let _ = writeln!(out, "  Decimals: {}", record.decimals);
            let _ = writeln!(out, "  Initial supply: {}", record.initial_supply);
        }
        (None, None) => {}
    }

    if let Some(record) = &details.record {
        let optional = [
            ("Description", &record.description),
            ("Image", &record.image_url),
            ("Metadata URI", &record.metadata_uri),
            ("Metadata account", &record.metadata_address),
            ("Transaction", &record.transaction),
        ];
        for (label, value) in optional {
            if let Some(value) = value {
                let _ = writeln!(out, "  {label}: {value}");
            }
        }
        let _ = writeln!(out, "  Created: {}", record.created_at.to_rfc3339());
        if record.simulated {
            let _ = writeln!(out, "  {}", "Created in simulation mode".yellow());
        }
    }
    let _ = writeln!(out, "  Explorer: {}", details.explorer_url.underline());
    out
}

pub async fn execute(identifier: &str, simulate: bool, settings: &Settings) -> Result<()> {
    let store = TokenStore::new(&settings.token_output_dir);
    let ledger = RpcLedger::new(settings.rpc_client());
    let details = token_details(&store, &ledger, settings, identifier, simulate).await?;
    print!("{}", render(&details));
    Ok(())
}
