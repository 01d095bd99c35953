use clap::{Args, Parser, Subcommand};

use crate::models::Filter;
use crate::services::render::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "nft-mp-browser",
    version,
    about = "Browse NFTs listed on the marketplace contract"
)]
pub struct Cli {
    /// Treat a wallet on the wrong network as an error instead of a warning.
    #[arg(long, global = true)]
    pub strict_network: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Connect the wallet and show its status.
    Connect,
    /// List every NFT currently for sale.
    Market(ListArgs),
    /// List the connected user's NFTs.
    Profile(ListArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// all, lowToHigh or highToLow
    #[arg(long, default_value = "all")]
    pub filter: Filter,

    /// Print the listing as JSON.
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    pub fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}
