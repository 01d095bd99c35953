use std::fmt;
use std::str::FromStr;

use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NftItem {
    pub token_id: u64,
    pub price: String, // ether, as shown to the user
    #[serde(skip)]
    pub price_wei: U256,
    pub seller: Address,
    pub owner: Address,
    pub image: String,
    pub name: String,
    pub description: String,
}

/// Off-chain JSON document behind `tokenURI`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NftMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    All,
    LowToHigh,
    HighToLow,
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Filter::All),
            "lowToHigh" => Ok(Filter::LowToHigh),
            "highToLow" => Ok(Filter::HighToLow),
            other => Err(format!(
                "unknown filter '{}', expected one of: all, lowToHigh, highToLow",
                other
            )),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Filter::All => "all",
            Filter::LowToHigh => "lowToHigh",
            Filter::HighToLow => "highToLow",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletSource {
    /// Local key from `WALLET_PRIVATE_KEY`.
    Signer,
    /// First account handed out by the RPC endpoint.
    Provider,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletSession {
    pub user_address: Address,
    pub chain_id: u64,
    pub expected_chain_id: u64,
    pub source: WalletSource,
}

impl WalletSession {
    pub fn is_expected_network(&self) -> bool {
        self.chain_id == self.expected_chain_id
    }
}
