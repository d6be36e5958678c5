//! In-memory stand-ins for the lookup capabilities.

use std::collections::HashMap;

use alloy_primitives::{Address, B256, Bytes, U256};
use alloy_sol_types::SolCall;

use crate::{
    allow_list::{AllowListEntry, hash_pair},
    lookup::{
        ContractInfo, ContractInfoSource, ContractReader, ContractTokensResult, MerkleIndex,
        TokenQuery, TokenQueryResult,
    },
};

/// Answers `eth_call`s by selector; unknown selectors fail.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockReader {
    responses: HashMap<[u8; 4], Bytes>,
}

impl MockReader {
    pub(crate) fn returning<C: SolCall>(mut self, output: Vec<u8>) -> Self {
        self.responses.insert(C::SELECTOR, output.into());
        self
    }
}

impl ContractReader for MockReader {
    async fn call(&self, to: Address, input: Bytes) -> eyre::Result<Bytes> {
        let selector: [u8; 4] = input
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| eyre::eyre!("calldata to {to} has no selector"))?;
        self.responses
            .get(&selector)
            .cloned()
            .ok_or_else(|| eyre::eyre!("no mocked response for 0x{} on {to}", alloy_primitives::hex::encode(selector)))
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MockQuery {
    result: Option<TokenQueryResult>,
    contract: Option<ContractTokensResult>,
}

impl MockQuery {
    pub(crate) fn new(result: TokenQueryResult) -> Self {
        Self {
            result: Some(result),
            contract: None,
        }
    }

    pub(crate) fn contract(tokens: ContractTokensResult) -> Self {
        Self {
            result: None,
            contract: Some(tokens),
        }
    }

    pub(crate) fn failing() -> Self {
        Self::default()
    }
}

impl TokenQuery for MockQuery {
    async fn query(&self, token_contract: Address, _: Option<U256>) -> eyre::Result<TokenQueryResult> {
        self.result
            .clone()
            .ok_or_else(|| eyre::eyre!("indexer unavailable for {token_contract}"))
    }

    async fn query_contract(&self, token_contract: Address) -> eyre::Result<ContractTokensResult> {
        self.contract
            .clone()
            .ok_or_else(|| eyre::eyre!("indexer unavailable for {token_contract}"))
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MockMerkleIndex {
    entries: HashMap<(B256, Address), (AllowListEntry, Vec<B256>)>,
    fail: bool,
}

impl MockMerkleIndex {
    pub(crate) fn with(mut self, root: B256, entry: AllowListEntry, proof: Vec<B256>) -> Self {
        self.entries.insert((root, entry.user), (entry, proof));
        self
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

impl MerkleIndex for MockMerkleIndex {
    async fn lookup(
        &self,
        merkle_root: B256,
        user: Address,
    ) -> eyre::Result<Option<(AllowListEntry, Vec<B256>)>> {
        if self.fail {
            eyre::bail!("allow list index unavailable");
        }
        Ok(self.entries.get(&(merkle_root, user)).cloned())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct MockContractInfo(pub(crate) ContractInfo);

impl ContractInfoSource for MockContractInfo {
    async fn contract_info(&self, _: Address) -> eyre::Result<ContractInfo> {
        Ok(self.0.clone())
    }
}

/// Root of a two leaf tree and each leaf's proof.
pub(crate) fn two_leaf_tree(a: &AllowListEntry, b: &AllowListEntry) -> (B256, Vec<B256>, Vec<B256>) {
    let (leaf_a, leaf_b) = (a.leaf_hash(), b.leaf_hash());
    (hash_pair(leaf_a, leaf_b), vec![leaf_b], vec![leaf_a])
}
