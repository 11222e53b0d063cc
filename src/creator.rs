use anyhow::Result;
use chrono::Utc;
use clap::ValueEnum;
use serde_json::json;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use tracing::{info, warn};

use crate::{
    config::Settings,
    error::CommandError,
    ledger::Ledger,
    metadata::{self, create_metadata_instruction, find_metadata_address},
    prompt::TokenSpec,
    spl_cli::{CommandRunner, CreatedMint, OutputFormat, SplTokenCli},
    store::TokenRecord,
    upload::{UploadFile, Uploader},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum CreationStrategy {
    /// `spl-token --output json`, then image and metadata
    Json,
    /// Human-readable `spl-token` output, no metadata
    Plain,
    /// JSON first; plain output if that fails before a mint exists
    #[default]
    Auto,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CreationOutcome {
    pub mint: String,
    pub signature: Option<String>,
    pub token_account: Option<String>,
    pub metadata_address: Option<String>,
    pub metadata_uri: Option<String>,
    pub image_url: Option<String>,
    pub explorer_url: String,
    pub simulated: bool,
}

impl CreationOutcome {
    pub fn into_record(self, spec: &TokenSpec) -> TokenRecord {
        TokenRecord {
            name: spec.name.clone(),
            symbol: spec.symbol.clone(),
            decimals: spec.decimals,
            initial_supply: spec.initial_supply,
            description: spec.description.clone(),
            image_url: self.image_url,
            mint: self.mint,
            transaction: self.signature,
            created_at: Utc::now(),
            metadata_address: self.metadata_address,
            metadata_uri: self.metadata_uri,
            explorer_url: Some(self.explorer_url),
            simulated: self.simulated,
        }
    }
}

pub fn simulate(spec: &TokenSpec, settings: &Settings) -> CreationOutcome {
    let mint = bs58::encode(rand::random::<[u8; 32]>()).into_string();
    info!(%mint, "simulated token creation");
    CreationOutcome {
        explorer_url: settings.explorer_address_url(&mint),
        mint,
        image_url: spec.image_url.clone(),
        simulated: true,
        ..CreationOutcome::default()
    }
}

pub struct Creator<'a, R> {
    cli: SplTokenCli<R>,
    uploader: &'a Uploader,
    ledger: &'a dyn Ledger,
    wallet: &'a Keypair,
    settings: &'a Settings,
}

impl<'a, R: CommandRunner> Creator<'a, R> {
    pub fn new(
        cli: SplTokenCli<R>,
        uploader: &'a Uploader,
        ledger: &'a dyn Ledger,
        wallet: &'a Keypair,
        settings: &'a Settings,
    ) -> Self {
        Self {
            cli,
            uploader,
            ledger,
            wallet,
            settings,
        }
    }

    pub async fn create(&self, spec: &TokenSpec, strategy: CreationStrategy) -> Result<CreationOutcome> {
        match strategy {
            CreationStrategy::Json => {
                let created = self.cli.create_token(spec.decimals, OutputFormat::Json).await?;
                self.finish_json(spec, created).await
            }
            CreationStrategy::Plain => self.create_plain(spec).await,
            CreationStrategy::Auto => {
                // A parse failure means create-token succeeded; retrying would mint twice.
                let created = match self.cli.create_token(spec.decimals, OutputFormat::Json).await {
                    Ok(created) => created,
                    Err(e) if e.downcast_ref::<CommandError>().is_some() => {
                        warn!(error = %e, "JSON creation failed before a mint existed, retrying with plain output");
                        return self.create_plain(spec).await;
                    }
                    Err(e) => return Err(e),
                };
                self.finish_json(spec, created).await
            }
        }
    }

    async fn create_plain(&self, spec: &TokenSpec) -> Result<CreationOutcome> {
        let created = self.cli.create_token(spec.decimals, OutputFormat::Text).await?;
        let mint = created.address;
        let account = self.cli.create_account(&mint, OutputFormat::Text).await?;
        self.cli
            .mint_to(&mint, spec.initial_supply, &account, OutputFormat::Text)
            .await?;

        Ok(CreationOutcome {
            mint: mint.to_string(),
            signature: created.signature,
            token_account: Some(account.to_string()),
            image_url: spec.image_url.clone(),
            explorer_url: self.settings.explorer_address_url(&mint.to_string()),
            ..CreationOutcome::default()
        })
    }

    async fn finish_json(&self, spec: &TokenSpec, created: CreatedMint) -> Result<CreationOutcome> {
        let mint = created.address;
        info!(%mint, "mint created");
        let account = self.cli.create_account(&mint, OutputFormat::Json).await?;
        self.cli
            .mint_to(&mint, spec.initial_supply, &account, OutputFormat::Json)
            .await?;

        let image_url = self.resolve_image(spec).await;
        let metadata_uri = self.upload_metadata_document(spec, image_url.as_deref()).await;
        let uri = metadata_uri.as_deref().or(image_url.as_deref()).unwrap_or_default();

        let metadata_address = match self.create_metadata(&mint, spec, uri).await {
            Ok(address) => Some(address.to_string()),
            Err(e) => {
                warn!(%mint, error = %e, "on-chain metadata was not created");
                None
            }
        };

        Ok(CreationOutcome {
            mint: mint.to_string(),
            signature: created.signature,
            token_account: Some(account.to_string()),
            metadata_address,
            metadata_uri,
            image_url,
            explorer_url: self.settings.explorer_address_url(&mint.to_string()),
            simulated: false,
        })
    }

    async fn resolve_image(&self, spec: &TokenSpec) -> Option<String> {
        if spec.image_url.is_some() {
            return spec.image_url.clone();
        }
        let path = spec.image_path.as_deref()?;
        match self.uploader.upload_image(path).await {
            Ok(outcome) => Some(outcome.url),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "image upload failed");
                None
            }
        }
    }

    async fn upload_metadata_document(&self, spec: &TokenSpec, image: Option<&str>) -> Option<String> {
        if !self.uploader.is_configured() {
            return None;
        }
        let document = json!({
            "name": spec.name,
            "symbol": spec.symbol,
            "description": spec.description.as_deref().unwrap_or_default(),
            "image": image.unwrap_or_default(),
        });
        let file = UploadFile {
            file_name: format!("{}-metadata.json", spec.symbol.to_lowercase()),
            mime: "application/json".to_string(),
            bytes: document.to_string().into_bytes(),
        };
        match self.uploader.upload(&file).await {
            Ok(outcome) => Some(outcome.url),
            Err(e) => {
                warn!(error = %e, "metadata document upload failed");
                None
            }
        }
    }

    async fn create_metadata(&self, mint: &Pubkey, spec: &TokenSpec, uri: &str) -> Result<Pubkey> {
        let data = metadata::fungible_data(&spec.name, &spec.symbol, uri);
        metadata::validate(&data)?;
        let instruction = create_metadata_instruction(mint, &self.wallet.pubkey(), data);
        let signature = self.ledger.submit(&[instruction], self.wallet).await?;
        info!(%signature, "metadata account created");
        Ok(find_metadata_address(mint))
    }
}
