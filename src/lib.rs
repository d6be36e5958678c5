//! Prepare mint and create transactions for Zora 1155 and 721 contracts.
//!
//! Everything here produces [`PreparedCall`]s for an external
//! simulate-then-send pipeline; nothing signs or broadcasts. Chain and indexer
//! access goes through the capability traits in [`lookup`].

pub mod abi;
pub mod allow_list;
pub mod call;
pub mod config;
pub mod costs;
pub mod create;
pub mod error;
pub mod lookup;
pub mod mint;
pub mod receipt;
pub mod strategy;
pub mod version;

#[cfg(test)]
pub(crate) mod test_utils;

pub use allow_list::{AllowListEntry, AllowListResolver, ProvenAllowListEntry};
pub use call::PreparedCall;
pub use config::ProtocolConfig;
pub use costs::{Erc20Approval, MintCosts, compute_costs};
pub use create::{
    CreateParameterBuilder, NewContractParams, NewTokenParams, PreparedCreate, SalesConfig,
};
pub use error::{PrepareError, Result};
pub use mint::{
    MintClient, MintParameterBuilder, MintRequest, MintTarget, MintableToken, PreparedMint,
    TokenSale, prepare_mint,
};
pub use receipt::{
    contract_address_from_logs, contract_address_from_receipt, token_id_from_create_logs,
    token_id_from_create_receipt,
};
pub use strategy::{SaleStrategy, StrategyKind, resolve_strategy};
