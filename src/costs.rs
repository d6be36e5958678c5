//! Native and ERC20 cost of minting a quantity under a resolved strategy.

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use serde::Serialize;

use crate::{
    abi::{Erc20Helper, IERC20},
    allow_list::AllowListEntry,
    call::PreparedCall,
    error::{PrepareError, Result},
    strategy::SaleStrategy,
};

/// What a mint costs.
///
/// `total_cost_eth` is always the native amount to attach to the call: the
/// purchase price when it is native, plus the protocol fee. `total_purchase_cost`
/// is the purchase price in the strategy's own currency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MintCosts {
    pub total_purchase_cost: U256,
    /// `None` when the purchase is paid in the native currency.
    pub total_purchase_cost_currency: Option<Address>,
    pub protocol_fee: U256,
    pub total_cost_eth: U256,
}

/// Allowance the minter needs before an ERC20 priced mint can succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Erc20Approval {
    pub erc20: Address,
    pub approve_to: Address,
    pub quantity: U256,
}

impl Erc20Approval {
    /// The `approve` call to broadcast ahead of the mint.
    pub fn prepared_call(&self) -> PreparedCall {
        PreparedCall {
            target_address: self.erc20,
            abi_function: IERC20::approveCall::SIGNATURE,
            args: Erc20Helper::approve(self.approve_to, self.quantity),
            value: U256::ZERO,
        }
    }
}

/// Costs plus, for ERC20 strategies, the approval to submit first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintQuote {
    pub costs: MintCosts,
    pub erc20_approval: Option<Erc20Approval>,
}

fn times(quantity: u64, unit: U256) -> Result<U256> {
    unit.checked_mul(U256::from(quantity))
        .ok_or(PrepareError::CostOverflow)
}

fn add(a: U256, b: U256) -> Result<U256> {
    a.checked_add(b).ok_or(PrepareError::CostOverflow)
}

fn native(purchase: U256, protocol_fee: U256) -> Result<MintCosts> {
    Ok(MintCosts {
        total_purchase_cost: purchase,
        total_purchase_cost_currency: None,
        protocol_fee,
        total_cost_eth: add(purchase, protocol_fee)?,
    })
}

/// Price `quantity` tokens.
///
/// `protocol_fee_per_unit` is the native fee the token contract charges per
/// token; timed sales carry their own fee and ignore it. Allow list mints are
/// priced from `allow_list_entry` (zero when absent). A zero quantity costs
/// nothing.
pub fn compute_costs(
    strategy: &SaleStrategy,
    quantity: u64,
    protocol_fee_per_unit: U256,
    allow_list_entry: Option<&AllowListEntry>,
) -> Result<MintQuote> {
    let protocol_fee = times(quantity, protocol_fee_per_unit)?;

    let quote = match strategy {
        SaleStrategy::FreeMint { .. } => MintQuote {
            costs: native(U256::ZERO, protocol_fee)?,
            erc20_approval: None,
        },
        SaleStrategy::FixedPrice {
            price_per_token, ..
        } => MintQuote {
            costs: native(times(quantity, *price_per_token)?, protocol_fee)?,
            erc20_approval: None,
        },
        SaleStrategy::AllowListMint { .. } => {
            let price = allow_list_entry.map_or(U256::ZERO, |entry| entry.price);
            MintQuote {
                costs: native(times(quantity, price)?, protocol_fee)?,
                erc20_approval: None,
            }
        }
        SaleStrategy::Erc20Price {
            minter,
            price_per_token,
            currency,
            ..
        } => {
            let purchase = times(quantity, *price_per_token)?;
            MintQuote {
                costs: MintCosts {
                    total_purchase_cost: purchase,
                    total_purchase_cost_currency: Some(*currency),
                    protocol_fee,
                    total_cost_eth: protocol_fee,
                },
                erc20_approval: Some(Erc20Approval {
                    erc20: *currency,
                    approve_to: *minter,
                    quantity: purchase,
                }),
            }
        }
        // Pricing beyond the flat fee happens in the strategy's pool.
        SaleStrategy::TimedSale {
            mint_fee_per_unit, ..
        } => {
            let fee = times(quantity, *mint_fee_per_unit)?;
            MintQuote {
                costs: native(U256::ZERO, fee)?,
                erc20_approval: None,
            }
        }
    };

    Ok(quote)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{B256, address, utils::parse_ether};
    use rand::Rng;

    const MINTER: Address = address!("0x04e2516a2c207e84a1839755675dfd8ef6302f0a");
    const CURRENCY: Address = address!("0xa6b280b42cb0b7c4a4f789ec6ccc3a7609a1bc39");

    fn free() -> SaleStrategy {
        SaleStrategy::FreeMint {
            minter: MINTER,
            sale_start: 0,
            sale_end: 0,
        }
    }

    fn fixed(price: U256) -> SaleStrategy {
        SaleStrategy::FixedPrice {
            minter: MINTER,
            price_per_token: price,
            sale_start: 0,
            sale_end: 0,
            max_tokens_per_address: U256::ZERO,
        }
    }

    fn erc20(price: U256) -> SaleStrategy {
        SaleStrategy::Erc20Price {
            minter: MINTER,
            price_per_token: price,
            currency: CURRENCY,
            sale_start: 0,
            sale_end: 0,
            max_tokens_per_address: U256::ZERO,
        }
    }

    fn timed(fee: U256) -> SaleStrategy {
        SaleStrategy::TimedSale {
            minter: MINTER,
            sale_start: 0,
            sale_end: 0,
            mint_fee_per_unit: fee,
            secondary_activated: false,
            erc20z: Address::ZERO,
            pool: Address::ZERO,
        }
    }

    #[test]
    fn free_mint_pays_only_the_protocol_fee() {
        let fee = parse_ether("0.000777").unwrap();
        let quote = compute_costs(&free(), 5, fee, None).unwrap();

        assert_eq!(quote.costs.total_cost_eth, parse_ether("0.003885").unwrap());
        assert_eq!(quote.costs.total_purchase_cost, U256::ZERO);
        assert!(quote.erc20_approval.is_none());
    }

    #[test]
    fn fixed_price_adds_price_and_fee_per_token() {
        let price = parse_ether("0.08").unwrap();
        let fee = parse_ether("0.000777").unwrap();
        let mut rng = rand::rng();

        for _ in 0..64 {
            let n: u64 = rng.random_range(0..10_000);
            let costs = compute_costs(&fixed(price), n, fee, None).unwrap().costs;
            assert_eq!(costs.total_cost_eth, U256::from(n) * (price + fee));
            assert_eq!(costs.total_purchase_cost, U256::from(n) * price);
            assert_eq!(costs.total_purchase_cost_currency, None);
        }
    }

    #[test]
    fn erc20_price_keeps_purchase_out_of_native_cost() {
        let one = parse_ether("1").unwrap();
        let quote = compute_costs(&erc20(one), 1, U256::ZERO, None).unwrap();

        let approval = quote.erc20_approval.unwrap();
        assert_eq!(approval.quantity, one);
        assert_eq!(approval.quantity, quote.costs.total_purchase_cost);
        assert_eq!(approval.erc20, CURRENCY);
        assert_eq!(approval.approve_to, MINTER);
        assert_eq!(quote.costs.total_cost_eth, U256::ZERO);
        assert_eq!(quote.costs.total_purchase_cost_currency, Some(CURRENCY));

        let fee = parse_ether("0.000777").unwrap();
        let with_fee = compute_costs(&erc20(one), 3, fee, None).unwrap();
        assert_eq!(with_fee.costs.total_cost_eth, U256::from(3) * fee);
        assert_eq!(with_fee.erc20_approval.unwrap().quantity, U256::from(3) * one);
    }

    #[test]
    fn approval_call_targets_the_currency() {
        let quote = compute_costs(&erc20(U256::from(7)), 2, U256::ZERO, None).unwrap();
        let call = quote.erc20_approval.unwrap().prepared_call();

        assert_eq!(call.target_address, CURRENCY);
        assert_eq!(call.value, U256::ZERO);
        assert_eq!(call.args, Erc20Helper::approve(MINTER, U256::from(14)));
    }

    #[test]
    fn timed_sale_ignores_protocol_fee_argument() {
        let fee = parse_ether("0.000111").unwrap();
        let costs = compute_costs(&timed(fee), 10, parse_ether("1").unwrap(), None)
            .unwrap()
            .costs;

        assert_eq!(costs.total_cost_eth, parse_ether("0.00111").unwrap());
        assert_eq!(costs.total_purchase_cost, U256::ZERO);
    }

    #[test]
    fn allow_list_uses_entry_price() {
        let strategy = SaleStrategy::AllowListMint {
            minter: MINTER,
            presale_merkle_root: B256::ZERO,
            sale_start: 0,
            sale_end: 0,
        };
        let entry = AllowListEntry {
            user: CURRENCY,
            price: U256::from(3),
            max_can_mint: U256::from(10),
        };

        let costs = compute_costs(&strategy, 4, U256::from(1), Some(&entry))
            .unwrap()
            .costs;
        assert_eq!(costs.total_purchase_cost, U256::from(12));
        assert_eq!(costs.total_cost_eth, U256::from(16));
    }

    #[test]
    fn zero_quantity_is_free_for_every_strategy() {
        let fee = parse_ether("0.000777").unwrap();
        for strategy in [free(), fixed(fee), erc20(fee), timed(fee)] {
            let costs = compute_costs(&strategy, 0, fee, None).unwrap().costs;
            assert_eq!(costs.total_cost_eth, U256::ZERO);
            assert_eq!(costs.total_purchase_cost, U256::ZERO);
        }
    }

    #[test]
    fn overflow_is_an_error_not_a_wrap() {
        assert!(matches!(
            compute_costs(&fixed(U256::MAX), 2, U256::ZERO, None),
            Err(PrepareError::CostOverflow)
        ));
        assert!(matches!(
            compute_costs(&fixed(U256::MAX), 1, U256::from(1), None),
            Err(PrepareError::CostOverflow)
        ));
    }
}
