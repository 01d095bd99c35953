use ethers::prelude::*;
use ethers::providers::{JsonRpcClient, Provider};
use ethers::types::Address;

use crate::errors::{MarketError, MarketResult};
use crate::models::{WalletSession, WalletSource};

pub mod connection {
    use super::*;

    pub fn check_network(expected: u64, actual: u64) -> MarketResult<()> {
        if expected != actual {
            return Err(MarketError::WrongNetwork { expected, actual });
        }
        Ok(())
    }

    fn signer_address(private_key: &str) -> MarketResult<Address> {
        let key = private_key.trim();
        let key = key.strip_prefix("0x").unwrap_or(key);

        let wallet: LocalWallet = key
            .parse()
            .map_err(|e| MarketError::WalletMissing(format!("invalid WALLET_PRIVATE_KEY: {}", e)))?;

        Ok(wallet.address())
    }

    async fn request_account<P: JsonRpcClient>(provider: &Provider<P>) -> MarketResult<Address> {
        let accounts: Vec<Address> = provider
            .request("eth_requestAccounts", ())
            .await
            .map_err(|e| MarketError::WalletMissing(format!("account request rejected: {}", e)))?;

        accounts.into_iter().next().ok_or_else(|| {
            MarketError::WalletMissing("the wallet provider exposed no accounts".to_string())
        })
    }

    /// Resolves the user's address and checks the network it is connected to.
    ///
    /// A network mismatch is only reported unless `strict_network` is set, so a
    /// session on the wrong chain still counts as connected.
    pub async fn connect_wallet<P: JsonRpcClient>(
        provider: &Provider<P>,
        private_key: Option<&str>,
        expected_chain_id: u64,
        strict_network: bool,
    ) -> MarketResult<WalletSession> {
        let (user_address, source) = match private_key {
            Some(key) => (signer_address(key)?, WalletSource::Signer),
            None => (request_account(provider).await?, WalletSource::Provider),
        };

        let chain_id = provider
            .get_chainid()
            .await
            .map_err(|e| MarketError::Contract(format!("could not read network: {}", e)))?;
        if chain_id > U256::from(u64::MAX) {
            return Err(MarketError::Contract(format!("chain id {} out of range", chain_id)));
        }
        let chain_id = chain_id.as_u64();

        tracing::info!(
            address = %format!("0x{}", hex::encode(user_address.as_bytes())),
            chain_id,
            "Wallet connected"
        );

        if let Err(err) = check_network(expected_chain_id, chain_id) {
            if strict_network {
                return Err(err);
            }
            tracing::warn!(expected = expected_chain_id, actual = chain_id, "Wrong network");
            eprintln!("{}", err);
        }

        Ok(WalletSession {
            user_address,
            chain_id,
            expected_chain_id,
            source,
        })
    }
}
