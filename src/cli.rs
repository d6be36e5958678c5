use std::path::PathBuf;

use alloy_primitives::{Address, U256};
use clap::{Parser, Subcommand};
use mintkit::config::{NEW_CONTRACT_VERSION, ZORA_MAINNET};

/// Prepare Zora mint and create transactions offline.
#[derive(Debug, Parser)]
#[command(name = "mintkit", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Chain whose built-in deployment to use.
    #[arg(long, global = true, default_value_t = ZORA_MAINNET)]
    pub chain_id: u64,

    /// JSON deployment description, overrides `--chain-id`.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Price and encode a mint from an indexer token record.
    Mint {
        /// Indexer token record (JSON).
        #[arg(long)]
        token: PathBuf,
        #[arg(long)]
        minter: Address,
        #[arg(long, default_value_t = 1)]
        quantity: u64,
        #[arg(long)]
        recipient: Option<Address>,
        #[arg(long)]
        referral: Option<Address>,
        #[arg(long, default_value = "")]
        comment: String,
        /// Per-token protocol fee in wei, when the record has none.
        #[arg(long)]
        mint_fee: Option<U256>,
    },
    /// Encode a new token on an already deployed 1155 contract.
    CreateToken {
        #[arg(long)]
        contract: Address,
        #[arg(long)]
        account: Address,
        #[arg(long)]
        token_uri: String,
        #[arg(long)]
        next_token_id: U256,
        #[arg(long, default_value = NEW_CONTRACT_VERSION)]
        contract_version: String,
        #[arg(long, default_value = "")]
        contract_name: String,
        /// Fixed price per token in wei; free mint when omitted.
        #[arg(long)]
        price: Option<U256>,
        #[arg(long)]
        mint_to_creator: Option<u64>,
        #[arg(long)]
        referral: Option<Address>,
    },
    /// Read the created contract and token id from receipt logs (JSON array).
    Receipt {
        #[arg(long)]
        logs: PathBuf,
    },
}
