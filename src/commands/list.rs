use std::fmt::Write;

use anyhow::Result;
use colored::Colorize;

use crate::{config::Settings, store::TokenRecord, store::TokenStore};

pub fn execute(verbose: bool, filter: Option<&str>, settings: &Settings) -> Result<()> {
    let store = TokenStore::new(&settings.token_output_dir);
    let records = store.numbered(filter)?;

    if records.is_empty() {
        match filter {
            Some(f) => println!("{}", format!("No tokens found matching '{f}'.").yellow()),
            None => println!(
                "{}",
                format!("No tokens found in {}.", store.dir().display()).yellow()
            ),
        }
        return Ok(());
    }

    println!("{}", format!("📋 Tokens ({})\n", records.len()).bold());
    print!("{}", render(&records, verbose));
    println!("Use `view <number>` or `view <mint>` for details.");
    Ok(())
}

fn render(records: &[(usize, TokenRecord)], verbose: bool) -> String {
    let mut out = String::new();
    for (number, record) in records {
        let marker = if record.simulated { " [simulated]" } else { "" };
        let _ = writeln!(
            out,
            "{}. {} ({}){}",
            number,
            record.name.bold(),
            record.symbol.cyan(),
            marker.dimmed()
        );
        let _ = writeln!(out, "   Mint: {}", record.mint);
        if verbose {
            let _ = writeln!(out, "   Decimals: {}", record.decimals);
            let _ = writeln!(out, "   Initial supply: {}", record.initial_supply);
            if let Some(desc) = &record.description {
                let _ = writeln!(out, "   Description: {desc}");
            }
            if let Some(image) = &record.image_url {
                let _ = writeln!(out, "   Image: {image}");
            }
            let _ = writeln!(out, "   Created: {}", record.created_at.to_rfc3339());
            if let Some(url) = &record.explorer_url {
                let _ = writeln!(out, "   Explorer: {url}");
            }
        }
        out.push('\n');
    }
    out
}
