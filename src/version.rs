//! Capability checks keyed on the version string a 1155 contract reports.

use std::fmt;

use crate::error::{PrepareError, Result};

/// Parsed `major.minor.patch` of a 1155 contract. Anything after the numeric
/// triple (pre-release tags, build notes) is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContractVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

/// First release with `mint(minter, tokenId, quantity, rewardsRecipients, minterArguments)`.
const REWARDS_RECIPIENTS_MINT: ContractVersion = ContractVersion::new(2, 9, 0);
/// Timed sale strategy needs the rewards-recipients mint path.
const TIMED_SALE: ContractVersion = ContractVersion::new(2, 9, 0);
const CREATE_REFERRAL: ContractVersion = ContractVersion::new(2, 0, 0);
const MINT_WITH_REWARDS: ContractVersion = ContractVersion::new(2, 0, 0);

impl ContractVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    pub fn parse(version: &str) -> Result<Self> {
        let unsupported = || PrepareError::UnsupportedContractVersion {
            version: version.to_string(),
            capability: "version parsing",
        };

        let numeric = version
            .trim()
            .trim_start_matches('v')
            .split(|c: char| !(c.is_ascii_digit() || c == '.'))
            .next()
            .unwrap_or_default();

        let mut parts = numeric.split('.').map(str::parse::<u32>);
        let major = parts.next().and_then(|p| p.ok()).ok_or_else(unsupported)?;
        let minor = parts.next().and_then(|p| p.ok()).ok_or_else(unsupported)?;
        let patch = match parts.next() {
            Some(p) => p.map_err(|_| unsupported())?,
            None => 0,
        };

        Ok(Self::new(major, minor, patch))
    }

    pub fn supports_rewards_recipients_mint(&self) -> bool {
        *self >= REWARDS_RECIPIENTS_MINT
    }

    pub fn supports_timed_sale(&self) -> bool {
        *self >= TIMED_SALE
    }

    pub fn supports_create_referral(&self) -> bool {
        *self >= CREATE_REFERRAL
    }

    pub fn supports_paid_mint(&self) -> bool {
        *self >= MINT_WITH_REWARDS
    }

    /// Fails with `UnsupportedContractVersion` unless `supported` holds.
    pub fn require(&self, supported: bool, capability: &'static str) -> Result<()> {
        if supported {
            Ok(())
        } else {
            Err(PrepareError::UnsupportedContractVersion {
                version: self.to_string(),
                capability,
            })
        }
    }
}

impl fmt::Display for ContractVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
