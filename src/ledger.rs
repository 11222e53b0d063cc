use anyhow::{Context, Result};
use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};
use spl_token_2022::{extension::StateWithExtensions, state::Mint};
use tracing::debug;

use crate::error::MintError;

pub const TOKEN_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

#[derive(Clone, Debug)]
pub struct AccountData {
    pub owner: Pubkey,
    pub data: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TokenSupply {
    pub amount: String,
    pub ui_amount: String,
    pub decimals: u8,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MintState {
    pub program_id: Pubkey,
    pub decimals: u8,
    pub supply: u64,
    pub mint_authority: Option<Pubkey>,
}

#[async_trait]
pub trait Ledger: Send + Sync {
    async fn account(&self, address: &Pubkey) -> Result<Option<AccountData>>;

    async fn token_supply(&self, mint: &Pubkey) -> Result<TokenSupply>;

    async fn submit(&self, instructions: &[Instruction], signer: &Keypair) -> Result<Signature>;
}

pub struct RpcLedger {
    client: RpcClient,
}

impl RpcLedger {
    pub fn new(client: RpcClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Ledger for RpcLedger {
    async fn account(&self, address: &Pubkey) -> Result<Option<AccountData>> {
        let response = self
            .client
            .get_account_with_commitment(address, self.client.commitment())
            .await
            .with_context(|| format!("Failed to fetch account {address}"))?;
        Ok(response.value.map(|account| AccountData {
            owner: account.owner,
            data: account.data,
        }))
    }

    async fn token_supply(&self, mint: &Pubkey) -> Result<TokenSupply> {
        let supply = self
            .client
            .get_token_supply(mint)
            .await
            .with_context(|| format!("Failed to fetch token info for {mint}"))?;
        Ok(TokenSupply {
            amount: supply.amount,
            ui_amount: supply.ui_amount_string,
            decimals: supply.decimals,
        })
    }

    async fn submit(&self, instructions: &[Instruction], signer: &Keypair) -> Result<Signature> {
        let recent_blockhash = self.client.get_latest_blockhash().await?;
        let transaction = Transaction::new_signed_with_payer(
            instructions,
            Some(&signer.pubkey()),
            &[signer],
            recent_blockhash,
        );
        debug!(instructions = instructions.len(), "sending transaction");
        let signature = self
            .client
            .send_and_confirm_transaction(&transaction)
            .await
            .context("Transaction failed")?;
        Ok(signature)
    }
}

pub fn is_token_program(id: &Pubkey) -> bool {
    *id == TOKEN_PROGRAM_ID || *id == spl_token_2022::id()
}

pub async fn fetch_mint_state(ledger: &dyn Ledger, mint: &Pubkey) -> Result<MintState> {
    let account = ledger
        .account(mint)
        .await?
        .ok_or(MintError::MissingMint(*mint))?;
    if !is_token_program(&account.owner) {
        return Err(MintError::NotATokenProgram {
            mint: *mint,
            owner: account.owner,
        }
        .into());
    }

    let state = StateWithExtensions::<Mint>::unpack(&account.data)
        .map_err(|_| MintError::Unparsable(*mint))?;
    Ok(MintState {
        program_id: account.owner,
        decimals: state.base.decimals,
        supply: state.base.supply,
        mint_authority: Option::from(state.base.mint_authority),
    })
}
