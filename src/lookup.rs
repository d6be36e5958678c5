//! Capabilities the engine borrows from the outside world.
//!
//! Every builder receives these explicitly at construction. None of them is
//! retried or cached here; a failure surfaces as
//! [`PrepareError::ExternalLookupFailure`].

use std::{
    future::Future,
    time::{SystemTime, UNIX_EPOCH},
};

use alloy_primitives::{Address, B256, Bytes, U256};
use alloy_sol_types::SolCall;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    abi::IZoraCreator1155,
    allow_list::AllowListEntry,
    error::{PrepareError, Result},
    strategy::RawStrategyRecord,
};

/// Read-only `eth_call` access.
pub trait ContractReader: Send + Sync {
    fn call(&self, to: Address, input: Bytes) -> impl Future<Output = eyre::Result<Bytes>> + Send;
}

/// Indexed token and sale metadata, e.g. a subgraph.
pub trait TokenQuery: Send + Sync {
    fn query(
        &self,
        token_contract: Address,
        token_id: Option<U256>,
    ) -> impl Future<Output = eyre::Result<TokenQueryResult>> + Send;

    /// Every indexed token of `token_contract`.
    fn query_contract(
        &self,
        token_contract: Address,
    ) -> impl Future<Output = eyre::Result<ContractTokensResult>> + Send;
}

/// Off-chain allow list index keyed by `(merkle_root, user)`.
pub trait MerkleIndex: Send + Sync {
    fn lookup(
        &self,
        merkle_root: B256,
        user: Address,
    ) -> impl Future<Output = eyre::Result<Option<(AllowListEntry, Vec<B256>)>>> + Send;
}

/// State of an already deployed 1155 contract.
pub trait ContractInfoSource: Send + Sync {
    fn contract_info(&self, contract: Address)
    -> impl Future<Output = eyre::Result<ContractInfo>> + Send;
}

/// Seconds since the unix epoch, used for best-effort sale window checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStandard {
    #[serde(rename = "ERC1155")]
    Erc1155,
    #[serde(rename = "ERC721")]
    Erc721,
}

/// What the indexer knows about a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenQueryResult {
    pub contract: ContractQueryResult,
    pub token_standard: TokenStandard,
    #[serde(default)]
    pub token_id: Option<String>,
    #[serde(default)]
    pub creator: Option<Address>,
    #[serde(default)]
    pub max_supply: Option<String>,
    #[serde(default)]
    pub total_minted: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub sales_strategies: Vec<RawStrategyRecord>,
}

/// All tokens the indexer knows for one contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractTokensResult {
    pub contract: ContractQueryResult,
    #[serde(default)]
    pub tokens: Vec<TokenQueryResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractQueryResult {
    pub address: Address,
    pub contract_version: String,
    /// Per-token protocol fee in wei, as a decimal string.
    #[serde(default)]
    pub mint_fee_per_quantity: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "contractURI")]
    pub contract_uri: Option<String>,
}

/// Deployed contract facts needed to add a token to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractInfo {
    pub contract_version: String,
    pub mint_fee: U256,
    pub name: String,
    pub next_token_id: U256,
}

/// `eth_call` a typed function and decode its return value.
pub async fn read_contract<R, C>(reader: &R, to: Address, call: C) -> Result<C::Return>
where
    R: ContractReader,
    C: SolCall + Send,
{
    let input = Bytes::from(call.abi_encode());
    let output = reader.call(to, input).await.map_err(|err| {
        warn!(target: "mintkit::lookup", %to, function = C::SIGNATURE, %err, "contract read failed");
        PrepareError::lookup(C::SIGNATURE, err)
    })?;

    C::abi_decode_returns(&output)
        .map_err(|err| PrepareError::lookup(C::SIGNATURE, eyre::eyre!("undecodable return data: {err}")))
}

/// [`ContractInfoSource`] that asks the contract itself.
#[derive(Debug, Clone)]
pub struct OnchainContractInfo<R> {
    reader: R,
}

impl<R: ContractReader> OnchainContractInfo<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: ContractReader> ContractInfoSource for OnchainContractInfo<R> {
    async fn contract_info(&self, contract: Address) -> eyre::Result<ContractInfo> {
        let reader = &self.reader;
        Ok(ContractInfo {
            contract_version: read_contract(reader, contract, IZoraCreator1155::contractVersionCall {})
                .await?,
            mint_fee: read_contract(reader, contract, IZoraCreator1155::mintFeeCall {}).await?,
            name: read_contract(reader, contract, IZoraCreator1155::nameCall {}).await?,
            next_token_id: read_contract(reader, contract, IZoraCreator1155::nextTokenIdCall {})
                .await?,
        })
    }
}
