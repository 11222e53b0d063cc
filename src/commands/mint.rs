use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
};
use spl_associated_token_account_client::{
    address::get_associated_token_address_with_program_id,
    instruction::create_associated_token_account_idempotent,
};
use tracing::info;

use crate::{
    config::Settings,
    error::MintError,
    ledger::{Ledger, RpcLedger, fetch_mint_state},
    utils,
};

#[derive(Clone, Debug, PartialEq)]
pub struct MintOutcome {
    pub signature: Signature,
    pub recipient: Pubkey,
    pub amount: u64,
    pub decimals: u8,
    pub supply_before: u64,
}

pub async fn mint_additional(
    ledger: &dyn Ledger,
    mint: &Pubkey,
    amount: &str,
    wallet: &Keypair,
) -> Result<MintOutcome> {
    let state = fetch_mint_state(ledger, mint).await?;
    let authority = wallet.pubkey();
    if state.mint_authority != Some(authority) {
        return Err(MintError::AuthorityMismatch {
            expected: state
                .mint_authority
                .map_or_else(|| "none".to_string(), |a| a.to_string()),
            actual: authority,
        }
        .into());
    }

    let base_units = utils::parse_amount(amount, state.decimals)?;
    let recipient = get_associated_token_address_with_program_id(&authority, mint, &state.program_id);
    let instructions = vec![
        create_associated_token_account_idempotent(&authority, &authority, mint, &state.program_id),
        spl_token_2022::instruction::mint_to_checked(
            &state.program_id,
            mint,
            &recipient,
            &authority,
            &[],
            base_units,
            state.decimals,
        )?,
    ];

    info!(%mint, base_units, %recipient, "minting");
    let signature = ledger.submit(&instructions, wallet).await?;
    Ok(MintOutcome {
        signature,
        recipient,
        amount: base_units,
        decimals: state.decimals,
        supply_before: state.supply,
    })
}

pub async fn execute(
    mint: &str,
    amount: &str,
    wallet: Option<PathBuf>,
    settings: &Settings,
) -> Result<()> {
    println!("{}", "🏭 Minting additional supply...\n".bold());

    let mint = utils::parse_pubkey(mint)?;
    let wallet_path = settings.resolve_wallet_path(wallet.as_deref())?;
    let wallet = Settings::load_keypair(&wallet_path)?;
    let ledger = RpcLedger::new(settings.rpc_client());

    println!("📋 Mint Details:");
    println!("  Mint: {}", mint.to_string().cyan());
    println!("  Authority: {}", wallet.pubkey());
    println!("  Amount: {amount}");

    println!("\n📤 Sending transaction...");
    let outcome = mint_additional(&ledger, &mint, amount, &wallet).await?;

    println!("{}", "✅ Tokens minted successfully!".green().bold());
    println!(
        "   Amount: {} ({} base units)",
        utils::format_amount(outcome.amount, outcome.decimals),
        outcome.amount
    );
    println!(
        "   Supply: {} -> {}",
        utils::format_amount(outcome.supply_before, outcome.decimals),
        utils::format_amount(outcome.supply_before.saturating_add(outcome.amount), outcome.decimals)
    );
    println!("   Recipient: {}", outcome.recipient);
    println!("   Signature: {}", outcome.signature);
    println!(
        "   Explorer: {}",
        settings.explorer_tx_url(&outcome.signature.to_string()).underline()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::AmountError, ledger::tests::FakeLedger};

    #[tokio::test]
    async fn mints_exact_base_units_to_ata() {
        let wallet = Keypair::new();
        let mint = Pubkey::new_unique();
        let ledger = FakeLedger::with_mint(mint, Some(wallet.pubkey()), 6);

        let outcome = mint_additional(&ledger, &mint, "12.345678", &wallet).await.unwrap();
        assert_eq!(outcome.amount, 12_345_678);
        assert_eq!(outcome.decimals, 6);
        assert_eq!(outcome.supply_before, 1_000);

        let submitted = ledger.submissions();
        assert_eq!(submitted.len(), 1);
        let ixs = &submitted[0];
        assert_eq!(ixs.len(), 2);
        assert_eq!(
            ixs[0].program_id,
            Pubkey::from_str_const("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL")
        );
        assert_eq!(ixs[1].program_id, crate::ledger::TOKEN_PROGRAM_ID);
        assert_eq!(ixs[1].accounts[1].pubkey, outcome.recipient);
        // MintToChecked: tag 14, then amount and decimals
        assert_eq!(ixs[1].data[0], 14);
        assert_eq!(&ixs[1].data[1..9], &12_345_678u64.to_le_bytes());
        assert_eq!(ixs[1].data[9], 6);
    }

    #[tokio::test]
    async fn wrong_authority_submits_nothing() {
        let wallet = Keypair::new();
        let mint = Pubkey::new_unique();
        let ledger = FakeLedger::with_mint(mint, Some(Pubkey::new_unique()), 9);

        let err = mint_additional(&ledger, &mint, "1", &wallet).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MintError>(),
            Some(MintError::AuthorityMismatch { .. })
        ));
        assert!(ledger.submissions().is_empty());
    }

    #[tokio::test]
    async fn fixed_supply_mint_is_rejected() {
        let wallet = Keypair::new();
        let mint = Pubkey::new_unique();
        let ledger = FakeLedger::with_mint(mint, None, 9);

        let err = mint_additional(&ledger, &mint, "1", &wallet).await.unwrap_err();
        assert!(err.to_string().contains("expected none"));
        assert!(ledger.submissions().is_empty());
    }

    #[tokio::test]
    async fn too_precise_amount_submits_nothing() {
        let wallet = Keypair::new();
        let mint = Pubkey::new_unique();
        let ledger = FakeLedger::with_mint(mint, Some(wallet.pubkey()), 2);

        let err = mint_additional(&ledger, &mint, "0.001", &wallet).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AmountError>(),
            Some(AmountError::TooPrecise { .. })
        ));
        assert!(ledger.submissions().is_empty());
    }
}
