use alloy_primitives::{Address, B256, U256};
use thiserror::Error;

/// Boxed cause of a failed collaborator call.
pub type LookupSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Everything that can stop a mint or create from being prepared.
///
/// All variants except [`PrepareError::ExternalLookupFailure`] are raised by the
/// engine's own validation and are deterministic for a given input.
#[derive(Error, Debug)]
pub enum PrepareError {
    #[error("unsupported sale strategy: {0}")]
    UnsupportedStrategy(String),

    #[error("invalid `{field}` in sale strategy record: {value:?}")]
    InvalidStrategyField { field: &'static str, value: String },

    #[error("contract version {version:?} does not support {capability}")]
    UnsupportedContractVersion {
        version: String,
        capability: &'static str,
    },

    #[error("allow list proof for {user} does not verify against root {root}")]
    InvalidProof { user: Address, root: B256 },

    #[error("an allow list entry is required to mint from merkle root {root}")]
    AllowListEntryRequired { root: B256 },

    #[error("allow list entry belongs to {entry_user} but the mint recipient is {recipient}")]
    AllowListRecipientMismatch {
        entry_user: Address,
        recipient: Address,
    },

    #[error("quantity {quantity} exceeds allow list cap of {max_can_mint}")]
    ExceedsAllowListCap { quantity: u64, max_can_mint: U256 },

    #[error("sale is not active at {now} (window {sale_start}..={sale_end})")]
    SaleNotActive {
        now: u64,
        sale_start: u64,
        sale_end: u64,
    },

    #[error("mint cost overflows uint256")]
    CostOverflow,

    #[error("no {expected} event found in receipt logs")]
    EventNotFound { expected: String },

    #[error("external lookup `{what}` failed: {source}")]
    ExternalLookupFailure {
        what: String,
        #[source]
        source: LookupSource,
    },
}

impl PrepareError {
    /// Wrap a collaborator failure without retrying or reinterpreting it.
    pub fn lookup(what: impl Into<String>, report: eyre::Report) -> Self {
        Self::ExternalLookupFailure {
            what: what.into(),
            source: report.into(),
        }
    }
}

pub type Result<T, E = PrepareError> = std::result::Result<T, E>;
