use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use solana_cli_config::Config;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    signature::{Keypair, read_keypair_file},
};

use crate::error::ConfigError;

pub const DEFAULT_DECIMALS: u8 = 9;
pub const DEFAULT_INITIAL_SUPPLY: u64 = 1_000_000_000;

const EXPLORER_BASE: &str = "https://explorer.solana.com";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Network {
    #[default]
    Devnet,
    Testnet,
    MainnetBeta,
}

impl Network {
    pub fn as_str(self) -> &'static str {
        match self {
            Network::Devnet => "devnet",
            Network::Testnet => "testnet",
            Network::MainnetBeta => "mainnet-beta",
        }
    }

    pub fn default_rpc_url(self) -> &'static str {
        match self {
            Network::Devnet => "https://api.devnet.solana.com",
            Network::Testnet => "https://api.testnet.solana.com",
            Network::MainnetBeta => "https://api.mainnet-beta.solana.com",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "devnet" => Ok(Network::Devnet),
            "testnet" => Ok(Network::Testnet),
            "mainnet" | "mainnet-beta" => Ok(Network::MainnetBeta),
            other => Err(ConfigError::UnknownNetwork(other.to_string())),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub network: Network,
    pub rpc_url: String,
    pub imgbb_api_key: Option<String>,
    pub nft_storage_api_key: Option<String>,
    pub wallet_path: Option<PathBuf>,
    pub token_output_dir: PathBuf,
    pub image_output_dir: PathBuf,
    pub spl_token_bin: PathBuf,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    // Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let network = match var("SOLANA_NETWORK") {
            Some(name) => name.parse()?,
            None => Network::default(),
        };
        let rpc_url = var("SOLANA_RPC_URL").unwrap_or_else(|| network.default_rpc_url().into());

        Ok(Self {
            network,
            rpc_url,
            imgbb_api_key: var("IMGBB_API_KEY"),
            nft_storage_api_key: var("NFT_STORAGE_API_KEY"),
            wallet_path: var("WALLET_PATH").map(PathBuf::from),
            token_output_dir: var("TOKEN_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("token-outputs")),
            image_output_dir: var("IMAGE_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("image-uploads")),
            spl_token_bin: var("SPL_TOKEN_BIN")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("spl-token")),
        })
    }

    pub fn rpc_client(&self) -> RpcClient {
        RpcClient::new_with_commitment(self.rpc_url.clone(), CommitmentConfig::confirmed())
    }

    pub fn explorer_address_url(&self, address: &str) -> String {
        format!("{EXPLORER_BASE}/address/{address}{}", self.cluster_suffix())
    }

    pub fn explorer_tx_url(&self, signature: &str) -> String {
        format!("{EXPLORER_BASE}/tx/{signature}{}", self.cluster_suffix())
    }

    fn cluster_suffix(&self) -> String {
        match self.network {
            Network::MainnetBeta => String::new(),
            other => format!("?cluster={other}"),
        }
    }

    pub fn resolve_wallet_path(&self, explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
        let fallback = solana_cli_keypair_path().or_else(home_keypair_path);
        pick_wallet(explicit, self.wallet_path.as_deref(), fallback)
    }

    pub fn load_keypair(path: &Path) -> Result<Keypair, ConfigError> {
        read_keypair_file(path).map_err(|e| ConfigError::BadKeypair {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

fn pick_wallet(
    explicit: Option<&Path>,
    from_env: Option<&Path>,
    fallback: Option<PathBuf>,
) -> Result<PathBuf, ConfigError> {
    let candidate = match explicit.or(from_env) {
        Some(path) => path.to_path_buf(),
        None => fallback.unwrap_or_else(|| PathBuf::from("~/.config/solana/id.json")),
    };
    if candidate.is_file() {
        Ok(candidate)
    } else {
        Err(ConfigError::WalletNotFound(candidate))
    }
}

fn solana_cli_keypair_path() -> Option<PathBuf> {
    let config_file = solana_cli_config::CONFIG_FILE.as_ref()?;
    if !Path::new(config_file).is_file() {
        return None;
    }
    let config = Config::load(config_file).ok()?;
    Some(PathBuf::from(config.keypair_path))
}

fn home_keypair_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE"))?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("solana")
            .join("id.json"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_to_devnet() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.network, Network::Devnet);
        assert_eq!(s.rpc_url, "https://api.devnet.solana.com");
        assert_eq!(s.token_output_dir, PathBuf::from("token-outputs"));
        assert_eq!(s.spl_token_bin, PathBuf::from("spl-token"));
        assert!(s.imgbb_api_key.is_none());
    }

    #[test]
    fn rpc_override_wins_over_network_default() {
        let s = settings(&[
            ("SOLANA_NETWORK", "mainnet"),
            ("SOLANA_RPC_URL", "http://localhost:8899"),
        ])
        .unwrap();
        assert_eq!(s.network, Network::MainnetBeta);
        assert_eq!(s.rpc_url, "http://localhost:8899");
    }

    #[test]
    fn blank_api_key_is_unset() {
        let s = settings(&[("IMGBB_API_KEY", "  "), ("NFT_STORAGE_API_KEY", "abc")]).unwrap();
        assert!(s.imgbb_api_key.is_none());
        assert_eq!(s.nft_storage_api_key.as_deref(), Some("abc"));
    }

    #[test]
    fn unknown_network_is_rejected() {
        assert!(matches!(
            settings(&[("SOLANA_NETWORK", "localnet")]),
            Err(ConfigError::UnknownNetwork(_))
        ));
    }

    #[test]
    fn explorer_urls_carry_cluster() {
        let devnet = settings(&[]).unwrap();
        assert_eq!(
            devnet.explorer_address_url("Mint111"),
            "https://explorer.solana.com/address/Mint111?cluster=devnet"
        );
        let mainnet = settings(&[("SOLANA_NETWORK", "mainnet-beta")]).unwrap();
        assert_eq!(
            mainnet.explorer_tx_url("sig"),
            "https://explorer.solana.com/tx/sig"
        );
    }

    #[test]
    fn wallet_resolution_order() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("explicit.json");
        let env = dir.path().join("env.json");
        let fallback = dir.path().join("fallback.json");
        for p in [&explicit, &env, &fallback] {
            std::fs::write(p, "[]").unwrap();
        }

        let picked = pick_wallet(Some(&explicit), Some(&env), Some(fallback.clone())).unwrap();
        assert_eq!(picked, explicit);
        let picked = pick_wallet(None, Some(&env), Some(fallback.clone())).unwrap();
        assert_eq!(picked, env);
        let picked = pick_wallet(None, None, Some(fallback.clone())).unwrap();
        assert_eq!(picked, fallback);
    }

    #[test]
    fn missing_wallet_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(
            pick_wallet(Some(&missing), None, None),
            Err(ConfigError::WalletNotFound(p)) if p == missing
        ));
    }
}
