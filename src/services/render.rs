use std::io::{self, Write};

use ethers::types::Address;
use hex::encode;

use crate::models::{NftItem, WalletSession, WalletSource};

pub const NO_ITEMS: &str = "No NFT Listed Now...";
pub const NOT_CONNECTED: &str = "Connect Metamask Wallet to Continue";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

pub fn full_address(address: &Address) -> String {
    format!("0x{}", encode(address.as_fixed_bytes()))
}

pub fn render_wallet<W: Write>(out: &mut W, session: Option<&WalletSession>) -> io::Result<()> {
    let session = match session {
        Some(session) => session,
        None => return writeln!(out, "{}", NOT_CONNECTED),
    };

    let source = match session.source {
        WalletSource::Signer => "local signer",
        WalletSource::Provider => "wallet provider",
    };
    writeln!(out, "Connected: {} ({})", full_address(&session.user_address), source)?;

    if session.is_expected_network() {
        writeln!(out, "Network: chain {}", session.chain_id)
    } else {
        writeln!(
            out,
            "Network: chain {} (expected {}, please switch networks)",
            session.chain_id, session.expected_chain_id
        )
    }
}

fn render_card<W: Write>(out: &mut W, item: &NftItem) -> io::Result<()> {
    let name = if item.name.is_empty() {
        "(unnamed)"
    } else {
        item.name.as_str()
    };
    writeln!(out, "#{} {}", item.token_id, name)?;
    writeln!(out, "  Price:  {} ETH", item.price)?;
    writeln!(out, "  Seller: {}", full_address(&item.seller))?;
    writeln!(out, "  Owner:  {}", full_address(&item.owner))?;
    if !item.image.is_empty() {
        writeln!(out, "  Image:  {}", item.image)?;
    }
    if !item.description.is_empty() {
        writeln!(out, "  {}", item.description)?;
    }
    Ok(())
}

pub fn render_items<W: Write>(
    out: &mut W,
    items: &[NftItem],
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, items)?;
            writeln!(out)
        }
        OutputFormat::Text if items.is_empty() => writeln!(out, "{}", NO_ITEMS),
        OutputFormat::Text => {
            writeln!(out, "NFTs")?;
            for item in items {
                writeln!(out)?;
                render_card(out, item)?;
            }
            Ok(())
        }
    }
}
