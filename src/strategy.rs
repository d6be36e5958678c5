//! Sale strategy model and normalisation of indexer records.
//!
//! The indexer has shipped two record layouts over time: a nested layout with a
//! `type` tag and one payload object per strategy, and an older flat layout
//! keyed by `saleType`. Each layout has its own normaliser; both produce the
//! same closed [`SaleStrategy`] enum.

use std::str::FromStr;

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PrepareError, Result};

/// `saleEnd` value the contracts use for "never ends".
pub const SALE_END_FOREVER: u64 = u64::MAX;

/// A token's resolved sale configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaleStrategy {
    /// Fixed price minter at price zero; only the protocol fee is paid.
    FreeMint {
        minter: Address,
        sale_start: u64,
        sale_end: u64,
    },
    FixedPrice {
        minter: Address,
        price_per_token: U256,
        sale_start: u64,
        sale_end: u64,
        max_tokens_per_address: U256,
    },
    Erc20Price {
        minter: Address,
        price_per_token: U256,
        currency: Address,
        sale_start: u64,
        sale_end: u64,
        max_tokens_per_address: U256,
    },
    /// Price and cap per user live in the merkle leaves.
    AllowListMint {
        minter: Address,
        presale_merkle_root: B256,
        sale_start: u64,
        sale_end: u64,
    },
    TimedSale {
        minter: Address,
        sale_start: u64,
        sale_end: u64,
        mint_fee_per_unit: U256,
        secondary_activated: bool,
        erc20z: Address,
        pool: Address,
    },
}

/// Strategy discriminant. Declaration order is resolution priority, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StrategyKind {
    FreeMint,
    FixedPrice,
    Erc20Price,
    AllowListMint,
    TimedSale,
}

impl SaleStrategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::FreeMint { .. } => StrategyKind::FreeMint,
            Self::FixedPrice { .. } => StrategyKind::FixedPrice,
            Self::Erc20Price { .. } => StrategyKind::Erc20Price,
            Self::AllowListMint { .. } => StrategyKind::AllowListMint,
            Self::TimedSale { .. } => StrategyKind::TimedSale,
        }
    }

    /// The contract that implements this strategy's mint.
    pub fn minter(&self) -> Address {
        match self {
            Self::FreeMint { minter, .. }
            | Self::FixedPrice { minter, .. }
            | Self::Erc20Price { minter, .. }
            | Self::AllowListMint { minter, .. }
            | Self::TimedSale { minter, .. } => *minter,
        }
    }

    /// Whether mints through this strategy pay the 1155 contract's `mintFee()`.
    /// The ERC20 minter takes its cut in the sale currency instead.
    pub fn charges_contract_mint_fee(&self) -> bool {
        !matches!(self, Self::Erc20Price { .. })
    }

    /// `(sale_start, sale_end)` as configured on chain.
    pub fn sale_window(&self) -> (u64, u64) {
        match self {
            Self::FreeMint {
                sale_start,
                sale_end,
                ..
            }
            | Self::FixedPrice {
                sale_start,
                sale_end,
                ..
            }
            | Self::Erc20Price {
                sale_start,
                sale_end,
                ..
            }
            | Self::AllowListMint {
                sale_start,
                sale_end,
                ..
            }
            | Self::TimedSale {
                sale_start,
                sale_end,
                ..
            } => (*sale_start, *sale_end),
        }
    }

    /// Whether `now` falls inside the sale window. A zero or forever end never expires.
    pub fn is_active_at(&self, now: u64) -> bool {
        let (start, end) = self.sale_window();
        let open_ended = end == 0 || end == SALE_END_FOREVER;
        start <= now && (open_ended || now <= end)
    }
}

/// Integer field as the indexer sends it: usually a decimal string, sometimes a
/// JSON number, occasionally an empty string meaning "unset".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawUint {
    Number(u64),
    Text(String),
}

impl Default for RawUint {
    fn default() -> Self {
        Self::Number(0)
    }
}

impl From<u64> for RawUint {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RawUint {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl RawUint {
    fn to_u256(&self, field: &'static str) -> Result<U256> {
        match self {
            Self::Number(n) => Ok(U256::from(*n)),
            Self::Text(s) if s.trim().is_empty() => Ok(U256::ZERO),
            Self::Text(s) => U256::from_str(s.trim()).map_err(|_| invalid(field, s)),
        }
    }

    fn to_u64(&self, field: &'static str) -> Result<u64> {
        let value = self.to_u256(field)?;
        u64::try_from(value).map_err(|_| invalid(field, &value.to_string()))
    }
}

fn invalid(field: &'static str, value: &str) -> PrepareError {
    PrepareError::InvalidStrategyField {
        field,
        value: value.to_string(),
    }
}

fn opt_u256(value: &Option<RawUint>, field: &'static str) -> Result<U256> {
    value.as_ref().map_or(Ok(U256::ZERO), |v| v.to_u256(field))
}

fn opt_u64(value: &Option<RawUint>, field: &'static str) -> Result<u64> {
    value.as_ref().map_or(Ok(0), |v| v.to_u64(field))
}

fn parse_root(root: &str) -> Result<B256> {
    B256::from_str(root.trim()).map_err(|_| invalid("merkleRoot", root))
}

/// A strategy record in any of the supported indexer layouts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawStrategyRecord {
    Nested(NestedStrategyRecord),
    Flat(FlatStrategyRecord),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedStrategyRecord {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_price: Option<FixedPriceRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub erc20_minter: Option<Erc20MinterRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presale: Option<PresaleRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zora_timed_minter: Option<TimedMinterRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedPriceRecord {
    pub address: Address,
    pub price_per_token: RawUint,
    #[serde(default)]
    pub sale_start: RawUint,
    #[serde(default)]
    pub sale_end: RawUint,
    #[serde(default)]
    pub max_tokens_per_address: RawUint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Erc20MinterRecord {
    pub address: Address,
    pub price_per_token: RawUint,
    pub currency: Address,
    #[serde(default)]
    pub sale_start: RawUint,
    #[serde(default)]
    pub sale_end: RawUint,
    #[serde(default)]
    pub max_tokens_per_address: RawUint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresaleRecord {
    pub address: Address,
    pub merkle_root: String,
    #[serde(default)]
    pub presale_start: RawUint,
    #[serde(default)]
    pub presale_end: RawUint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimedMinterRecord {
    pub address: Address,
    pub mint_fee: RawUint,
    #[serde(default)]
    pub sale_start: RawUint,
    #[serde(default)]
    pub sale_end: RawUint,
    #[serde(default)]
    pub erc20_z: Erc20ZRecord,
    #[serde(default)]
    pub secondary_activated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Erc20ZRecord {
    pub id: Address,
    pub pool: Address,
}

/// Older flat layout: one object, all fields optional except the tag and minter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatStrategyRecord {
    pub sale_type: String,
    pub address: Address,
    #[serde(default)]
    pub price_per_token: Option<RawUint>,
    #[serde(default)]
    pub sale_start: Option<RawUint>,
    #[serde(default)]
    pub sale_end: Option<RawUint>,
    #[serde(default)]
    pub max_tokens_per_address: Option<RawUint>,
    #[serde(default)]
    pub currency: Option<Address>,
    #[serde(default)]
    pub merkle_root: Option<String>,
    #[serde(default)]
    pub mint_fee_per_quantity: Option<RawUint>,
    #[serde(default)]
    pub secondary_activated: Option<bool>,
    #[serde(default)]
    pub erc20_z: Option<Address>,
    #[serde(default)]
    pub pool: Option<Address>,
}

/// Fixed price records at price zero are free mints.
fn fixed_or_free(
    minter: Address,
    price_per_token: U256,
    sale_start: u64,
    sale_end: u64,
    max_tokens_per_address: U256,
) -> SaleStrategy {
    if price_per_token.is_zero() {
        SaleStrategy::FreeMint {
            minter,
            sale_start,
            sale_end,
        }
    } else {
        SaleStrategy::FixedPrice {
            minter,
            price_per_token,
            sale_start,
            sale_end,
            max_tokens_per_address,
        }
    }
}

fn missing_payload(tag: &str) -> PrepareError {
    PrepareError::UnsupportedStrategy(format!("record tagged {tag:?} carries no payload"))
}

impl NestedStrategyRecord {
    pub fn normalize(&self) -> Result<SaleStrategy> {
        match self.kind.as_str() {
            "FIXED_PRICE" => {
                let r = self
                    .fixed_price
                    .as_ref()
                    .ok_or_else(|| missing_payload(&self.kind))?;
                Ok(fixed_or_free(
                    r.address,
                    r.price_per_token.to_u256("pricePerToken")?,
                    r.sale_start.to_u64("saleStart")?,
                    r.sale_end.to_u64("saleEnd")?,
                    r.max_tokens_per_address.to_u256("maxTokensPerAddress")?,
                ))
            }
            "ERC_20_MINTER" => {
                let r = self
                    .erc20_minter
                    .as_ref()
                    .ok_or_else(|| missing_payload(&self.kind))?;
                Ok(SaleStrategy::Erc20Price {
                    minter: r.address,
                    price_per_token: r.price_per_token.to_u256("pricePerToken")?,
                    currency: r.currency,
                    sale_start: r.sale_start.to_u64("saleStart")?,
                    sale_end: r.sale_end.to_u64("saleEnd")?,
                    max_tokens_per_address: r
                        .max_tokens_per_address
                        .to_u256("maxTokensPerAddress")?,
                })
            }
            "PRESALE" => {
                let r = self
                    .presale
                    .as_ref()
                    .ok_or_else(|| missing_payload(&self.kind))?;
                Ok(SaleStrategy::AllowListMint {
                    minter: r.address,
                    presale_merkle_root: parse_root(&r.merkle_root)?,
                    sale_start: r.presale_start.to_u64("presaleStart")?,
                    sale_end: r.presale_end.to_u64("presaleEnd")?,
                })
            }
            "ZORA_TIMED" => {
                let r = self
                    .zora_timed_minter
                    .as_ref()
                    .ok_or_else(|| missing_payload(&self.kind))?;
                Ok(SaleStrategy::TimedSale {
                    minter: r.address,
                    sale_start: r.sale_start.to_u64("saleStart")?,
                    sale_end: r.sale_end.to_u64("saleEnd")?,
                    mint_fee_per_unit: r.mint_fee.to_u256("mintFee")?,
                    secondary_activated: r.secondary_activated,
                    erc20z: r.erc20_z.id,
                    pool: r.erc20_z.pool,
                })
            }
            other => Err(PrepareError::UnsupportedStrategy(format!(
                "unknown strategy type {other:?}"
            ))),
        }
    }
}

impl FlatStrategyRecord {
    pub fn normalize(&self) -> Result<SaleStrategy> {
        let sale_start = opt_u64(&self.sale_start, "saleStart")?;
        let sale_end = opt_u64(&self.sale_end, "saleEnd")?;

        match self.sale_type.as_str() {
            "fixedPrice" => Ok(fixed_or_free(
                self.address,
                opt_u256(&self.price_per_token, "pricePerToken")?,
                sale_start,
                sale_end,
                opt_u256(&self.max_tokens_per_address, "maxTokensPerAddress")?,
            )),
            "erc20" => Ok(SaleStrategy::Erc20Price {
                minter: self.address,
                price_per_token: opt_u256(&self.price_per_token, "pricePerToken")?,
                currency: self.currency.ok_or_else(|| invalid("currency", ""))?,
                sale_start,
                sale_end,
                max_tokens_per_address: opt_u256(
                    &self.max_tokens_per_address,
                    "maxTokensPerAddress",
                )?,
            }),
            "allowlist" => Ok(SaleStrategy::AllowListMint {
                minter: self.address,
                presale_merkle_root: parse_root(
                    self.merkle_root
                        .as_deref()
                        .ok_or_else(|| invalid("merkleRoot", ""))?,
                )?,
                sale_start,
                sale_end,
            }),
            "timed" => Ok(SaleStrategy::TimedSale {
                minter: self.address,
                sale_start,
                sale_end,
                mint_fee_per_unit: opt_u256(&self.mint_fee_per_quantity, "mintFeePerQuantity")?,
                secondary_activated: self.secondary_activated.unwrap_or(false),
                erc20z: self.erc20_z.unwrap_or_default(),
                pool: self.pool.unwrap_or_default(),
            }),
            other => Err(PrepareError::UnsupportedStrategy(format!(
                "unknown sale type {other:?}"
            ))),
        }
    }
}

impl RawStrategyRecord {
    pub fn normalize(&self) -> Result<SaleStrategy> {
        match self {
            Self::Nested(record) => record.normalize(),
            Self::Flat(record) => record.normalize(),
        }
    }
}

/// Normalise every record and keep the highest-priority strategy.
///
/// Equal-priority records resolve to the first one listed. Any record with an
/// unrecognised tag fails the whole resolution.
pub fn resolve_strategy(records: &[RawStrategyRecord]) -> Result<SaleStrategy> {
    let strategies = records
        .iter()
        .map(RawStrategyRecord::normalize)
        .collect::<Result<Vec<_>>>()?;

    let resolved = strategies
        .into_iter()
        .reduce(|best, next| if next.kind() > best.kind() { next } else { best })
        .ok_or_else(|| PrepareError::UnsupportedStrategy("no sale strategy configured".into()))?;

    debug!(
        target: "mintkit::strategy",
        kind = ?resolved.kind(),
        minter = %resolved.minter(),
        candidates = records.len(),
        "resolved sale strategy"
    );

    Ok(resolved)
}
