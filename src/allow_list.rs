//! Allow list entries and merkle proof verification.
//!
//! Leaves are `keccak256(abi.encode(user, maxCanMint, price))`, the layout the
//! merkle sale strategy checks on chain. Proofs hash sibling pairs in sorted
//! order.

use alloy_primitives::{Address, B256, U256, keccak256};
use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    error::{PrepareError, Result},
    lookup::MerkleIndex,
};

/// One committed allow list row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowListEntry {
    pub user: Address,
    pub price: U256,
    pub max_can_mint: U256,
}

impl AllowListEntry {
    pub fn leaf_hash(&self) -> B256 {
        keccak256((self.user, self.max_can_mint, self.price).abi_encode_params())
    }
}

/// An entry together with the proof that places it under a merkle root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenAllowListEntry {
    pub entry: AllowListEntry,
    pub proof: Vec<B256>,
}

impl ProvenAllowListEntry {
    pub fn verify(&self, root: B256) -> bool {
        verify_proof(&self.proof, root, self.entry.leaf_hash())
    }
}

/// Hash a sibling pair the way OpenZeppelin's `MerkleProof` does.
pub fn hash_pair(a: B256, b: B256) -> B256 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    keccak256([lo.as_slice(), hi.as_slice()].concat())
}

pub fn verify_proof(proof: &[B256], root: B256, leaf: B256) -> bool {
    proof.iter().fold(leaf, |node, sibling| hash_pair(node, *sibling)) == root
}

/// Looks up allow list rows in an off-chain index and checks them locally.
///
/// The contract re-verifies every proof, so a rejection here only guards
/// against a stale or tampered index.
#[derive(Debug, Clone)]
pub struct AllowListResolver<M> {
    index: M,
}

impl<M: MerkleIndex> AllowListResolver<M> {
    pub fn new(index: M) -> Self {
        Self { index }
    }

    /// `Ok(None)` means the user is not on the list.
    pub async fn get_allow_list_entry(
        &self,
        user: Address,
        merkle_root: B256,
    ) -> Result<Option<ProvenAllowListEntry>> {
        let found = self
            .index
            .lookup(merkle_root, user)
            .await
            .map_err(|err| PrepareError::lookup("allow list index", err))?;

        let Some((entry, proof)) = found else {
            debug!(target: "mintkit::allow_list", %user, %merkle_root, "user not on allow list");
            return Ok(None);
        };

        let proven = ProvenAllowListEntry { entry, proof };
        if proven.entry.user != user || !proven.verify(merkle_root) {
            warn!(
                target: "mintkit::allow_list",
                %user,
                %merkle_root,
                returned_user = %proven.entry.user,
                "allow list index returned an entry that does not verify"
            );
            return Err(PrepareError::InvalidProof {
                user,
                root: merkle_root,
            });
        }

        Ok(Some(proven))
    }
}
