use std::time::Duration;

use reqwest::Client;

use crate::errors::{MarketError, MarketResult};
use crate::models::NftMetadata;

/// Rewrites `ipfs://` token URIs onto an HTTP gateway; other URIs pass through.
pub fn resolve_token_uri(uri: &str, gateway: &str) -> String {
    let uri = uri.trim();
    match uri.strip_prefix("ipfs://") {
        Some(path) => {
            let path = path.strip_prefix("ipfs/").unwrap_or(path);
            format!("{}{}", gateway, path)
        }
        None => uri.to_string(),
    }
}

pub struct MetadataClient {
    client: Client,
    gateway: String,
}

impl MetadataClient {
    pub fn new(gateway: &str, timeout: Duration) -> MarketResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MarketError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self::with_client(client, gateway))
    }

    pub fn with_client(client: Client, gateway: &str) -> Self {
        Self {
            client,
            gateway: gateway.to_string(),
        }
    }

    pub async fn fetch(&self, token_id: u64, token_uri: &str) -> MarketResult<NftMetadata> {
        let url = resolve_token_uri(token_uri, &self.gateway);
        let fail = |reason: String| MarketError::Metadata { token_id, reason };

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| fail(format!("GET {}: {}", url, e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(fail(format!("GET {} returned {}", url, status)));
        }

        resp.json::<NftMetadata>()
            .await
            .map_err(|e| fail(format!("invalid metadata JSON at {}: {}", url, e)))
    }
}
