use std::path::PathBuf;

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown network '{0}' (expected devnet, testnet or mainnet-beta)")]
    UnknownNetwork(String),

    #[error(
        "wallet keypair not found; pass --wallet <path> or set WALLET_PATH (looked in {0})"
    )]
    WalletNotFound(PathBuf),

    #[error("failed to read keypair from {path}: {reason}")]
    BadKeypair { path: PathBuf, reason: String },

    #[error("invalid token config: {0}")]
    InvalidTokenConfig(String),
}

#[derive(Debug, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("'{0}' is not a valid decimal amount")]
    Malformed(String),

    #[error("'{amount}' has more than {decimals} fractional digits")]
    TooPrecise { amount: String, decimals: u8 },

    #[error("'{0}' does not fit in a u64 once scaled to base units")]
    Overflow(String),

    #[error("amount must be greater than zero")]
    Zero,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    #[error("file is not a recognized image format: {0}")]
    NotAnImage(PathBuf),

    #[error("image file is too large ({size} bytes); maximum allowed size is {max} bytes")]
    TooLarge { size: u64, max: u64 },

    #[error("no upload provider configured; set IMGBB_API_KEY or NFT_STORAGE_API_KEY")]
    NoProviders,

    #[error("upload failed on every provider: {0}")]
    AllFailed(String),

    #[error("{provider} returned an unexpected response: {detail}")]
    BadResponse {
        provider: &'static str,
        detail: String,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("could not extract {what} from spl-token output (tried {})", .tried.join(", "))]
    Exhausted {
        what: &'static str,
        tried: Vec<&'static str>,
    },
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
}

#[derive(Debug, Error)]
pub enum MintError {
    #[error("mint account {0} does not exist")]
    MissingMint(Pubkey),

    #[error("account {mint} is owned by {owner}, not a token program")]
    NotATokenProgram { mint: Pubkey, owner: Pubkey },

    #[error("failed to parse mint data for {0}")]
    Unparsable(Pubkey),

    #[error(
        "the provided wallet is not the mint authority for this token (expected {expected}, got {actual})"
    )]
    AuthorityMismatch { expected: String, actual: Pubkey },
}

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("{0} is required")]
    MissingValue(&'static str),

    #[error("{field} is {len} bytes; the limit is {max}")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("no metadata account at {0}")]
    NotFound(Pubkey),

    #[error("metadata account {0} could not be decoded")]
    Undecodable(Pubkey),

    #[error("metadata is immutable")]
    Immutable,

    #[error("wallet {actual} is not the update authority ({expected})")]
    NotUpdateAuthority { expected: Pubkey, actual: Pubkey },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no local record for mint {0}")]
    UnknownMint(String),

    #[error("invalid token index {index}; choose between 1 and {len}")]
    BadIndex { index: usize, len: usize },
}
