use std::io::{self, Write};
use std::sync::Arc;

use clap::Parser;
use ethers::prelude::abigen;
use ethers::providers::{Http, JsonRpcClient, Provider};
use eyre::Result;
use futures::future::try_join_all;

mod services {
    pub mod data_loader;
    pub mod filter;
    pub mod logging;
    pub mod metadata;
    pub mod render;
    pub mod wallet;
}

mod cli;
mod config;
mod errors;
mod models;

use cli::{Cli, Command, ListArgs};
use config::Config;
use errors::{MarketError, MarketResult};
use models::WalletSession;
use services::data_loader::listings::{get_my_nft_items, get_nft_items};
use services::filter::filter_items;
use services::logging::logger::init_logging;
use services::metadata::MetadataClient;
use services::render::{render_items, render_wallet};
use services::wallet::connection::connect_wallet;

abigen!(
    Marketplace,
    "src/data/marketplace.json",
    methods {
        getAllListedNFTs() as get_all_listed_nfts;
        getMyNFTs() as get_my_nfts;
        tokenURI(uint256) as token_uri;
    }
);

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    init_logging(&config.log_file)?;
    tracing::info!(?config, "Starting");

    if let Err(err) = run(cli, &config).await {
        tracing::error!(error = %err, "Command failed");
        return Err(err.into());
    }

    Ok(())
}

fn output_error(e: io::Error) -> MarketError {
    MarketError::Task(format!("writing output: {}", e))
}

/// `None` when no wallet is available, after the not-connected notice has been written.
async fn connect_or_notify<P: JsonRpcClient, W: Write>(
    provider: &Provider<P>,
    config: &Config,
    strict_network: bool,
    out: &mut W,
) -> MarketResult<Option<WalletSession>> {
    let connected = connect_wallet(
        provider,
        config.wallet_private_key.as_deref(),
        config.expected_chain_id,
        strict_network,
    )
    .await;

    match connected {
        Ok(session) => Ok(Some(session)),
        Err(MarketError::WalletMissing(reason)) => {
            tracing::error!(%reason, "Connection error");
            render_wallet(out, None).map_err(output_error)?;
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

async fn run(cli: Cli, config: &Config) -> MarketResult<()> {
    let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
        .map_err(|e| MarketError::Config(format!("RPC_URL '{}': {}", config.rpc_url, e)))?;

    let session =
        match connect_or_notify(&provider, config, cli.strict_network, &mut io::stdout()).await? {
            Some(session) => session,
            None => return Ok(()),
        };

    let (args, profile): (ListArgs, bool) = match cli.command {
        Command::Connect => {
            return render_wallet(&mut io::stdout().lock(), Some(&session)).map_err(output_error)
        }
        Command::Market(args) => (args, false),
        Command::Profile(args) => (args, true),
    };

    let client: Arc<Provider<Http>> = Arc::new(provider);
    let contract: Arc<Marketplace<Provider<Http>>> =
        Arc::new(Marketplace::new(config.contract_address, client));
    let metadata = Arc::new(MetadataClient::new(&config.ipfs_gateway, config.metadata_timeout)?);

    let items = if profile {
        get_my_nft_items(contract, metadata, session.user_address).await?
    } else {
        get_nft_items(contract, metadata).await?
    };

    let filtered = filter_items(&items, args.filter);
    tracing::info!(total = items.len(), filter = %args.filter, "Rendering NFTs");

    render_items(&mut io::stdout().lock(), &filtered, args.format()).map_err(output_error)
}
