use std::{
    path::{Path, PathBuf},
    str::FromStr,
    sync::LazyLock,
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use solana_sdk::pubkey::Pubkey;
use spl_associated_token_account_client::address::get_associated_token_address_with_program_id;
use tokio::process::Command;
use tracing::{debug, info};

use crate::{
    error::{CommandError, ParseError},
    ledger::TOKEN_PROGRAM_ID,
};

static JSON_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""address"\s*:\s*"([1-9A-HJ-NP-Za-km-z]{32,44})""#).expect("valid regex")
});
static JSON_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""signature"\s*:\s*"([1-9A-HJ-NP-Za-km-z]{64,88})""#).expect("valid regex")
});
static TEXT_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:Address:|Creating token)\s+([1-9A-HJ-NP-Za-km-z]{32,44})")
        .expect("valid regex")
});
static TEXT_ACCOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Creating account\s+([1-9A-HJ-NP-Za-km-z]{32,44})").expect("valid regex")
});
static TEXT_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Signature:\s+([1-9A-HJ-NP-Za-km-z]{64,88})").expect("valid regex")
});

#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &Path, args: &[String]) -> Result<String, CommandError>;
}

pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, program: &Path, args: &[String]) -> Result<String, CommandError> {
        let program_name = program.display().to_string();
        let output = Command::new(program)
            .args(args)
            .output()
            .await
            .map_err(|source| CommandError::Spawn {
                program: program_name.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(CommandError::Failed {
                program: program_name,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

type Extractor<'a, T> = Box<dyn Fn(&str) -> Option<T> + 'a>;

pub struct ParseChain<'a, T> {
    what: &'static str,
    tiers: Vec<(&'static str, Extractor<'a, T>)>,
}

impl<'a, T> ParseChain<'a, T> {
    pub fn new(what: &'static str) -> Self {
        Self {
            what,
            tiers: Vec::new(),
        }
    }

    pub fn then(mut self, name: &'static str, extract: impl Fn(&str) -> Option<T> + 'a) -> Self {
        self.tiers.push((name, Box::new(extract)));
        self
    }

    pub fn parse(&self, output: &str) -> Result<T, ParseError> {
        for (name, extract) in &self.tiers {
            if let Some(value) = extract(output) {
                debug!(what = self.what, strategy = name, "parsed spl-token output");
                return Ok(value);
            }
            debug!(what = self.what, strategy = name, "strategy found nothing");
        }
        Err(ParseError::Exhausted {
            what: self.what,
            tried: self.tiers.iter().map(|(name, _)| *name).collect(),
        })
    }
}

pub fn json_string(output: &str, pointers: &[&str]) -> Option<String> {
    let start = output.find('{')?;
    let value: Value = serde_json::from_str(&output[start..]).ok()?;
    pointers
        .iter()
        .find_map(|p| value.pointer(p).and_then(Value::as_str))
        .map(str::to_string)
}

fn capture(re: &Regex, output: &str) -> Option<String> {
    re.captures(output).map(|c| c[1].to_string())
}

fn pubkey(s: String) -> Option<Pubkey> {
    Pubkey::from_str(&s).ok()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Text,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CreatedMint {
    pub address: Pubkey,
    pub signature: Option<String>,
}

pub struct SplTokenCli<R> {
    runner: R,
    program: PathBuf,
    rpc_url: String,
    wallet_path: PathBuf,
    owner: Pubkey,
}

impl<R: CommandRunner> SplTokenCli<R> {
    pub fn new(runner: R, program: PathBuf, rpc_url: String, wallet_path: PathBuf, owner: Pubkey) -> Self {
        Self {
            runner,
            program,
            rpc_url,
            wallet_path,
            owner,
        }
    }

    async fn invoke(&self, mut args: Vec<String>, format: OutputFormat) -> Result<String> {
        args.extend([
            "--url".to_string(),
            self.rpc_url.clone(),
            "--fee-payer".to_string(),
            self.wallet_path.display().to_string(),
        ]);
        if format == OutputFormat::Json {
            args.extend(["--output".to_string(), "json".to_string()]);
        }
        info!(program = %self.program.display(), args = %args.join(" "), "running");
        let output = self.runner.run(&self.program, &args).await?;
        debug!(%output, "command output");
        Ok(output)
    }

    pub async fn create_token(&self, decimals: u8, format: OutputFormat) -> Result<CreatedMint> {
        let args = vec![
            "create-token".to_string(),
            "--decimals".to_string(),
            decimals.to_string(),
            "--mint-authority".to_string(),
            self.owner.to_string(),
        ];
        let output = self.invoke(args, format).await?;

        let address = match format {
            OutputFormat::Json => ParseChain::new("mint address")
                .then("json", |out| {
                    json_string(out, &["/commandOutput/address", "/address"]).and_then(pubkey)
                })
                .then("regex", |out| {
                    capture(&JSON_ADDRESS, out)
                        .or_else(|| capture(&TEXT_ADDRESS, out))
                        .and_then(pubkey)
                }),
            OutputFormat::Text => ParseChain::new("mint address").then("regex", |out| {
                capture(&TEXT_ADDRESS, out).and_then(pubkey)
            }),
        }
        .parse(&output)
        .with_context(|| format!("spl-token create-token printed: {output}"))?;

        Ok(CreatedMint {
            address,
            signature: signature_chain().parse(&output).ok(),
        })
    }

    // create-account always creates the owner's ATA, so it doubles as the fallback.
    pub async fn create_account(&self, mint: &Pubkey, format: OutputFormat) -> Result<Pubkey> {
        let args = vec![
            "create-account".to_string(),
            mint.to_string(),
            "--owner".to_string(),
            self.owner.to_string(),
        ];
        let output = self.invoke(args, format).await?;

        let derived = get_associated_token_address_with_program_id(&self.owner, mint, &TOKEN_PROGRAM_ID);
        let chain = match format {
            OutputFormat::Json => ParseChain::new("token account")
                .then("json", |out| {
                    json_string(out, &["/commandOutput/address", "/address", "/account"])
                        .and_then(pubkey)
                })
                .then("regex", |out| {
                    capture(&JSON_ADDRESS, out)
                        .or_else(|| capture(&TEXT_ACCOUNT, out))
                        .and_then(pubkey)
                }),
            OutputFormat::Text => ParseChain::new("token account").then("regex", |out| {
                capture(&TEXT_ACCOUNT, out).and_then(pubkey)
            }),
        };
        Ok(chain.then("derived", |_| Some(derived)).parse(&output)?)
    }

    pub async fn mint_to(
        &self,
        mint: &Pubkey,
        amount: u64,
        recipient: &Pubkey,
        format: OutputFormat,
    ) -> Result<Option<String>> {
        let args = vec![
            "mint".to_string(),
            mint.to_string(),
            amount.to_string(),
            recipient.to_string(),
            "--mint-authority".to_string(),
            self.wallet_path.display().to_string(),
        ];
        let output = self.invoke(args, format).await?;
        Ok(signature_chain().parse(&output).ok())
    }
}

fn signature_chain() -> ParseChain<'static, String> {
    ParseChain::new("signature")
        .then("json", |out| {
            json_string(
                out,
                &[
                    "/signature",
                    "/transactionData/signature",
                    "/commandOutput/transactionData/signature",
                ],
            )
        })
        .then("regex", |out| {
            capture(&JSON_SIGNATURE, out).or_else(|| capture(&TEXT_SIGNATURE, out))
        })
}
