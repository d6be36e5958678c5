use alloy_primitives::{Address, U256, address};
use serde::{Deserialize, Serialize};

pub const ZORA_MAINNET: u64 = 7_777_777;
pub const BASE_MAINNET: u64 = 8_453;

/// 0.000777 ETH, the per-token protocol fee charged by 1155 contracts.
pub const DEFAULT_MINT_FEE: U256 = U256::from_limbs([777_000_000_000_000, 0, 0, 0]);
/// 0.000111 ETH, the per-token fee of the timed sale strategy.
pub const TIMED_SALE_MINT_FEE: U256 = U256::from_limbs([111_000_000_000_000, 0, 0, 0]);

/// Version reported by freshly deployed 1155 contracts.
pub const NEW_CONTRACT_VERSION: &str = "2.12.1";

const FACTORY: Address = address!("0x777777c338d93e2c7adf08d102d45ca7cc4ed021");
const FIXED_PRICE_MINTER: Address = address!("0x04e2516a2c207e84a1839755675dfd8ef6302f0a");
const MERKLE_MINTER: Address = address!("0xf48172ca3b6068b20ee4917eb27b5472f1f272c7");
const ERC20_MINTER: Address = address!("0x777777e8850d8d6d98de2b5f64fae401f96eff31");
const TIMED_SALE_STRATEGY: Address = address!("0x777777722d078c97c6ad07d9f36801e653e356ae");

/// Deployment addresses and fee defaults for one chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolConfig {
    pub chain_id: u64,
    pub factory: Address,
    pub fixed_price_minter: Address,
    pub merkle_minter: Address,
    pub erc20_minter: Address,
    pub timed_sale_strategy: Address,
    pub new_contract_version: String,
    pub default_mint_fee: U256,
    pub timed_sale_mint_fee: U256,
}

impl ProtocolConfig {
    pub fn new(
        chain_id: u64,
        factory: Address,
        fixed_price_minter: Address,
        merkle_minter: Address,
        erc20_minter: Address,
        timed_sale_strategy: Address,
    ) -> Self {
        Self {
            chain_id,
            factory,
            fixed_price_minter,
            merkle_minter,
            erc20_minter,
            timed_sale_strategy,
            new_contract_version: NEW_CONTRACT_VERSION.to_string(),
            default_mint_fee: DEFAULT_MINT_FEE,
            timed_sale_mint_fee: TIMED_SALE_MINT_FEE,
        }
    }

    /// Built-in deployment for a known chain.
    pub fn for_chain(chain_id: u64) -> Option<Self> {
        match chain_id {
            ZORA_MAINNET | BASE_MAINNET => Some(Self::new(
                chain_id,
                FACTORY,
                FIXED_PRICE_MINTER,
                MERKLE_MINTER,
                ERC20_MINTER,
                TIMED_SALE_STRATEGY,
            )),
            _ => None,
        }
    }

    /// Parse a deployment description, e.g. for a fork or a testnet.
    pub fn from_json(json: &str) -> eyre::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
