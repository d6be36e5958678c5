//! Recover the created contract address and token id from a mined receipt.
//!
//! Decoders are tried in order, each against every log; the first event that
//! decodes wins. Current events come first, with legacy fallbacks after them.

use alloy_primitives::{Address, U256};
use alloy_rpc_types_eth::{Log, TransactionReceipt};
use alloy_sol_types::SolEvent;
use tracing::{debug, warn};

use crate::{
    abi::{IZoraCreator1155, IZoraCreator1155Factory},
    error::{PrepareError, Result},
};

type Decoder<T> = fn(&Log) -> Option<T>;

fn setup_new_contract(log: &Log) -> Option<Address> {
    IZoraCreator1155Factory::SetupNewContract::decode_log_data(&log.inner.data)
        .ok()
        .map(|event| event.newContract)
}

/// Proxies emit ERC-1967 `Upgraded` from their own address on deployment.
fn upgraded_proxy(log: &Log) -> Option<Address> {
    IZoraCreator1155::Upgraded::decode_log_data(&log.inner.data)
        .ok()
        .map(|_| log.inner.address)
}

fn setup_new_token(log: &Log) -> Option<U256> {
    IZoraCreator1155::SetupNewToken::decode_log_data(&log.inner.data)
        .ok()
        .map(|event| event.tokenId)
}

fn updated_token(log: &Log) -> Option<U256> {
    IZoraCreator1155::UpdatedToken::decode_log_data(&log.inner.data)
        .ok()
        .map(|event| event.tokenId)
}

const CONTRACT_ADDRESS_DECODERS: &[(&str, Decoder<Address>)] = &[
    (IZoraCreator1155Factory::SetupNewContract::SIGNATURE, setup_new_contract),
    (IZoraCreator1155::Upgraded::SIGNATURE, upgraded_proxy),
];

const TOKEN_ID_DECODERS: &[(&str, Decoder<U256>)] = &[
    (IZoraCreator1155::SetupNewToken::SIGNATURE, setup_new_token),
    (IZoraCreator1155::UpdatedToken::SIGNATURE, updated_token),
];

fn first_match<T: std::fmt::Display>(
    logs: &[Log],
    decoders: &[(&'static str, Decoder<T>)],
) -> Result<T> {
    for (event, decode) in decoders {
        if let Some(value) = logs.iter().find_map(*decode) {
            debug!(target: "mintkit::receipt", event = *event, %value, "decoded receipt log");
            return Ok(value);
        }
    }

    Err(PrepareError::EventNotFound {
        expected: decoders
            .iter()
            .map(|(event, _)| *event)
            .collect::<Vec<_>>()
            .join(" or "),
    })
}

fn logs_of(receipt: &TransactionReceipt) -> &[Log] {
    if !receipt.inner.status() {
        warn!(
            target: "mintkit::receipt",
            tx = %receipt.transaction_hash,
            "reading logs of a reverted transaction"
        );
    }
    receipt.inner.logs()
}

/// Address of the contract deployed by a factory create.
pub fn contract_address_from_logs(logs: &[Log]) -> Result<Address> {
    first_match(logs, CONTRACT_ADDRESS_DECODERS)
}

pub fn contract_address_from_receipt(receipt: &TransactionReceipt) -> Result<Address> {
    contract_address_from_logs(logs_of(receipt))
}

/// Id of the token set up by a create, on a new or existing contract.
pub fn token_id_from_create_logs(logs: &[Log]) -> Result<U256> {
    first_match(logs, TOKEN_ID_DECODERS)
}

pub fn token_id_from_create_receipt(receipt: &TransactionReceipt) -> Result<U256> {
    token_id_from_create_logs(logs_of(receipt))
}
