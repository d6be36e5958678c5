use alloy_primitives::{Address, Bytes, FixedBytes, TxKind, U256};
use alloy_rpc_types_eth::{TransactionInput, TransactionRequest};
use alloy_sol_types::SolCall;
use serde::Serialize;

/// A fully specified contract invocation that has not been broadcast.
///
/// `args` is the complete calldata, selector included, so the call can be fed
/// straight into any simulate-then-send pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedCall {
    pub target_address: Address,
    /// Solidity signature of the invoked function, e.g. `approve(address,uint256)`.
    pub abi_function: &'static str,
    pub args: Bytes,
    pub value: U256,
}

impl PreparedCall {
    /// ABI-encode `call` against `target`.
    pub fn new<C: SolCall>(target_address: Address, call: &C, value: U256) -> Self {
        Self {
            target_address,
            abi_function: C::SIGNATURE,
            args: call.abi_encode().into(),
            value,
        }
    }

    pub fn selector(&self) -> Option<FixedBytes<4>> {
        self.args.get(..4).map(FixedBytes::<4>::from_slice)
    }

    /// Decode the calldata back into `C`, if it is a call to `C`.
    pub fn decode<C: SolCall>(&self) -> Option<C> {
        if self.selector()? != FixedBytes::from(C::SELECTOR) {
            return None;
        }
        C::abi_decode(&self.args).ok()
    }

    /// Request for `from` to send this call; gas and nonce are left to the filler.
    pub fn into_transaction_request(self, from: Address) -> TransactionRequest {
        TransactionRequest {
            from: Some(from),
            to: Some(TxKind::Call(self.target_address)),
            value: Some(self.value),
            input: TransactionInput::new(self.args),
            ..Default::default()
        }
    }
}
