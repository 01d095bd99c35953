use ethers::prelude::*;
use ethers::types::{Address, U256};
use ethers::utils::format_ether;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::errors::{MarketError, MarketResult};
use crate::models;
use crate::services::metadata::MetadataClient;
use crate::try_join_all;
use crate::{ListedToken, Marketplace};

/// Wei to an ether decimal with at least one fractional digit (`1.0`, `0.15`).
pub fn format_price(wei: U256) -> String {
    let formatted = format_ether(wei);
    if !formatted.contains('.') {
        return format!("{}.0", formatted);
    }
    let trimmed = formatted.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{}0", trimmed)
    } else {
        trimmed.to_string()
    }
}

fn token_id_of(token: &ListedToken) -> MarketResult<u64> {
    if token.token_id > U256::from(u64::MAX) {
        return Err(MarketError::Contract(format!("token id {} out of range", token.token_id)));
    }
    Ok(token.token_id.as_u64())
}

pub fn assemble_item(
    token: &ListedToken,
    meta: models::NftMetadata,
) -> MarketResult<models::NftItem> {
    Ok(models::NftItem {
        token_id: token_id_of(token)?,
        price: format_price(token.price),
        price_wei: token.price,
        seller: token.seller,
        owner: token.owner,
        image: meta.image.unwrap_or_default(),
        name: meta.name.unwrap_or_default(),
        description: meta.description.unwrap_or_default(),
    })
}

pub mod listings {
    use super::*;

    type TaskResultItems = MarketResult<models::NftItem>;
    type TaskItems = JoinHandle<TaskResultItems>;

    /// Every NFT currently listed on the marketplace, in contract order.
    pub async fn get_nft_items<M: Middleware + 'static>(
        contract: Arc<Marketplace<M>>,
        metadata: Arc<MetadataClient>,
    ) -> MarketResult<Vec<models::NftItem>> {
        let listed: Vec<ListedToken> = contract
            .get_all_listed_nfts()
            .call()
            .await
            .map_err(|e| MarketError::Contract(format!("getAllListedNFTs: {}", e)))?;

        tracing::info!(count = listed.len(), "Listed NFTs fetched");

        load_items(contract, metadata, listed).await
    }

    /// NFTs the contract associates with `user` (owned or being sold by them).
    pub async fn get_my_nft_items<M: Middleware + 'static>(
        contract: Arc<Marketplace<M>>,
        metadata: Arc<MetadataClient>,
        user: Address,
    ) -> MarketResult<Vec<models::NftItem>> {
        let mine: Vec<ListedToken> = contract
            .get_my_nfts()
            .from(user)
            .call()
            .await
            .map_err(|e| MarketError::Contract(format!("getMyNFTs: {}", e)))?;

        tracing::info!(count = mine.len(), "User NFTs fetched");

        load_items(contract, metadata, mine).await
    }

    async fn load_items<M: Middleware + 'static>(
        contract: Arc<Marketplace<M>>,
        metadata: Arc<MetadataClient>,
        tokens: Vec<ListedToken>,
    ) -> MarketResult<Vec<models::NftItem>> {
        let total = tokens.len();
        let mut handles: Vec<TaskItems> = Vec::with_capacity(total);

        for (i, token) in tokens.into_iter().enumerate() {
            let contract_clone: Arc<Marketplace<M>> = Arc::clone(&contract);
            let metadata_clone: Arc<MetadataClient> = Arc::clone(&metadata);

            let handle: TaskItems = tokio::spawn(async move {
                let result = async {
                    let token_id = token_id_of(&token)?;
                    let token_uri: String = contract_clone
                        .token_uri(token.token_id)
                        .call()
                        .await
                        .map_err(|e| {
                            MarketError::Contract(format!("tokenURI({}): {}", token_id, e))
                        })?;

                    let meta = metadata_clone.fetch(token_id, &token_uri).await?;
                    assemble_item(&token, meta)
                }
                .await;

                match &result {
                    Ok(item) => tracing::debug!(
                        token_id = item.token_id,
                        "Item {} of {} fetched",
                        i + 1,
                        total
                    ),
                    Err(err) => tracing::error!(
                        token_id = %token.token_id,
                        error = %err,
                        "Error fetching NFT item"
                    ),
                }

                result
            });

            handles.push(handle);
        }

        let results = try_join_all(handles)
            .await
            .map_err(|e| MarketError::Task(e.to_string()))?;

        results.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::listings::{get_my_nft_items, get_nft_items};
    use super::*;
    use crate::services::metadata::testing::{local_client, serve};
    use ethers::abi::{encode, Token};
    use serde_json::json;
    use std::time::Duration;

    const META: &str = r#"{"name":"A","description":"d","image":"https://img/a.png"}"#;

    fn encoded_listing(tokens: &[ListedToken]) -> Bytes {
        let tuples = tokens
            .iter()
            .map(|t| {
                Token::Tuple(vec![
                    Token::Uint(t.token_id),
                    Token::Address(t.owner),
                    Token::Address(t.seller),
                    Token::Uint(t.price),
                    Token::Bool(t.currently_listed),
                ])
            })
            .collect();
        Bytes::from(encode(&[Token::Array(tuples)]))
    }

    fn encoded_uri(uri: &str) -> Bytes {
        Bytes::from(encode(&[Token::String(uri.to_string())]))
    }

    // The mock transport answers from the back of its queue, so the listing
    // response is pushed last and the tokenURI responses before it.
    fn mocked_market(
        listing: &[ListedToken],
        uris: &[String],
    ) -> (Arc<Marketplace<Provider<MockProvider>>>, MockProvider) {
        let (provider, mock) = Provider::mocked();
        for uri in uris {
            mock.push::<Bytes, _>(encoded_uri(uri)).unwrap();
        }
        mock.push::<Bytes, _>(encoded_listing(listing)).unwrap();

        let contract = Arc::new(Marketplace::new(Address::repeat_byte(0x99), Arc::new(provider)));
        (contract, mock)
    }

    fn token(id: u64, price: U256) -> ListedToken {
        ListedToken {
            token_id: U256::from(id),
            owner: Address::repeat_byte(0x11),
            seller: Address::repeat_byte(0x22),
            price,
            currently_listed: true,
        }
    }

    #[test]
    fn prices_render_in_ether() {
        assert_eq!(format_price(U256::exp10(18)), "1.0");
        assert_eq!(format_price(U256::exp10(17) * 15 / 10), "0.15");
        assert_eq!(format_price(U256::zero()), "0.0");
        assert_eq!(format_price(U256::exp10(18) * 25), "25.0");
    }

    #[test]
    fn item_takes_chain_fields_and_metadata() {
        let meta = models::NftMetadata {
            name: Some("Ape".to_string()),
            description: None,
            image: Some("https://img/ape.png".to_string()),
        };

        let item = assemble_item(&token(4, U256::exp10(16)), meta).unwrap();

        assert_eq!(item.token_id, 4);
        assert_eq!(item.price, "0.01");
        assert_eq!(item.price_wei, U256::exp10(16));
        assert_eq!(item.seller, Address::repeat_byte(0x22));
        assert_eq!(item.owner, Address::repeat_byte(0x11));
        assert_eq!(item.name, "Ape");
        assert_eq!(item.description, "");
        assert_eq!(item.image, "https://img/ape.png");
    }

    #[test]
    fn oversized_token_id_is_rejected() {
        let mut big = token(1, U256::zero());
        big.token_id = U256::MAX;
        assert!(matches!(
            assemble_item(&big, models::NftMetadata::default()),
            Err(MarketError::Contract(_))
        ));
    }

    #[tokio::test]
    async fn empty_listing_yields_no_items() {
        let (provider, mock) = Provider::mocked();
        let encoded = encode(&[Token::Array(vec![])]);
        mock.push::<Bytes, _>(Bytes::from(encoded)).unwrap();

        let contract = Arc::new(Marketplace::new(Address::zero(), Arc::new(provider)));
        let metadata =
            Arc::new(MetadataClient::new("https://ipfs.io/ipfs/", Duration::from_secs(1)).unwrap());

        let items = get_nft_items(contract, metadata).await.unwrap();

        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn listing_keeps_contract_order() {
        let url = serve(3, "HTTP/1.1 200 OK", META).await;
        let listing = vec![
            token(9, U256::exp10(18) * 3),
            token(2, U256::exp10(17)),
            token(5, U256::exp10(18)),
        ];
        let (contract, _mock) = mocked_market(&listing, &vec![url; 3]);

        let items = get_nft_items(contract, Arc::new(local_client())).await.unwrap();

        let ids: Vec<u64> = items.iter().map(|i| i.token_id).collect();
        assert_eq!(ids, vec![9, 2, 5]);
        let prices: Vec<&str> = items.iter().map(|i| i.price.as_str()).collect();
        assert_eq!(prices, vec!["3.0", "0.1", "1.0"]);
        assert!(items.iter().all(|i| i.name == "A" && i.description == "d"));
    }

    #[tokio::test]
    async fn one_broken_token_fails_the_whole_listing() {
        let ok = serve(1, "HTTP/1.1 200 OK", META).await;
        let missing = serve(1, "HTTP/1.1 404 Not Found", r#"{"error":"gone"}"#).await;
        let listing = vec![token(1, U256::exp10(18)), token(2, U256::exp10(18))];
        let (contract, _mock) = mocked_market(&listing, &[ok, missing]);

        let result = get_nft_items(contract, Arc::new(local_client())).await;

        match result {
            Err(MarketError::Metadata { reason, .. }) => assert!(reason.contains("404")),
            other => panic!("expected a metadata error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn profile_listing_is_called_from_the_user() {
        let url = serve(1, "HTTP/1.1 200 OK", META).await;
        let user = Address::repeat_byte(0x22);
        let (contract, mock) = mocked_market(&[token(4, U256::exp10(16))], &[url]);
        let expected = contract.get_my_nfts().from(user);

        let items = get_my_nft_items(Arc::clone(&contract), Arc::new(local_client()), user)
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].token_id, 4);
        assert_eq!(items[0].price, "0.01");
        mock.assert_request(
            "eth_call",
            json!([expected.tx, BlockId::from(BlockNumber::Latest)]),
        )
        .unwrap();
    }
}
