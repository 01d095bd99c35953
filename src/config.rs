use std::env;
use std::path::PathBuf;
use std::time::Duration;

use ethers::types::Address;

use crate::errors::{MarketError, MarketResult};

pub const SEPOLIA_CHAIN_ID: u64 = 11155111;
pub const DEFAULT_IPFS_GATEWAY: &str = "https://ipfs.io/ipfs/";
pub const DEFAULT_METADATA_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LOG_FILE: &str = "logs/log.txt";

#[derive(Clone)]
pub struct Config {
    pub rpc_url: String,
    pub contract_address: Address,
    pub expected_chain_id: u64,
    pub wallet_private_key: Option<String>,
    pub ipfs_gateway: String,
    pub metadata_timeout: Duration,
    pub log_file: PathBuf,
}

// Keeps the private key out of debug output.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("rpc_url", &self.rpc_url)
            .field("contract_address", &self.contract_address)
            .field("expected_chain_id", &self.expected_chain_id)
            .field("wallet_private_key", &self.wallet_private_key.as_ref().map(|_| "<redacted>"))
            .field("ipfs_gateway", &self.ipfs_gateway)
            .field("metadata_timeout", &self.metadata_timeout)
            .field("log_file", &self.log_file)
            .finish()
    }
}

impl Config {
    /// Reads the process environment. Call `dotenv::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> MarketResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> MarketResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let rpc_url = get("RPC_URL")
            .ok_or_else(|| MarketError::Config("RPC_URL must be set in a .env file".to_string()))?;

        let contract_address: Address = get("CONTRACT_ADDRESS")
            .ok_or_else(|| {
                MarketError::Config("CONTRACT_ADDRESS must be set in a .env file".to_string())
            })?
            .trim()
            .parse()
            .map_err(|e| MarketError::Config(format!("CONTRACT_ADDRESS: {}", e)))?;

        let expected_chain_id = match get("EXPECTED_CHAIN_ID") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|e| MarketError::Config(format!("EXPECTED_CHAIN_ID '{}': {}", raw, e)))?,
            None => SEPOLIA_CHAIN_ID,
        };

        let metadata_timeout_secs = match get("METADATA_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                MarketError::Config(format!("METADATA_TIMEOUT_SECS '{}': {}", raw, e))
            })?,
            None => DEFAULT_METADATA_TIMEOUT_SECS,
        };
        if metadata_timeout_secs == 0 {
            return Err(MarketError::Config(
                "METADATA_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        let mut ipfs_gateway =
            get("IPFS_GATEWAY").unwrap_or_else(|| DEFAULT_IPFS_GATEWAY.to_string());
        if !ipfs_gateway.ends_with('/') {
            ipfs_gateway.push('/');
        }

        Ok(Config {
            rpc_url,
            contract_address,
            expected_chain_id,
            wallet_private_key: get("WALLET_PRIVATE_KEY"),
            ipfs_gateway,
            metadata_timeout: Duration::from_secs(metadata_timeout_secs),
            log_file: PathBuf::from(
                get("LOG_FILE").unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
            ),
        })
    }
}
