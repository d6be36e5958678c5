mod cli;

use std::{fs, sync::Arc};

use alloy_primitives::{Address, Bytes, U256};
use alloy_rpc_types_eth::Log;
use clap::Parser;
use eyre::{WrapErr, eyre};
use mintkit::{
    CreateParameterBuilder, MintClient, MintRequest, NewTokenParams, ProtocolConfig, SalesConfig,
    lookup::{
        ContractInfo, ContractInfoSource, ContractReader, ContractTokensResult, SystemClock,
        TokenQuery, TokenQueryResult,
    },
    receipt,
    strategy::SALE_END_FOREVER,
};
use serde_json::json;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};

/// No RPC endpoint: every read fails.
#[derive(Clone, Copy)]
struct OfflineReader;

impl ContractReader for OfflineReader {
    async fn call(&self, to: Address, _: Bytes) -> eyre::Result<Bytes> {
        Err(eyre!("offline, cannot eth_call {to}"))
    }
}

/// Token record loaded from disk.
struct FileTokenQuery(TokenQueryResult);

impl TokenQuery for FileTokenQuery {
    async fn query(&self, token_contract: Address, _: Option<U256>) -> eyre::Result<TokenQueryResult> {
        if token_contract != self.0.contract.address {
            warn!(target: "mintkit::cli", %token_contract, record = %self.0.contract.address, "record is for another contract");
        }
        Ok(self.0.clone())
    }

    async fn query_contract(&self, token_contract: Address) -> eyre::Result<ContractTokensResult> {
        if token_contract != self.0.contract.address {
            warn!(target: "mintkit::cli", %token_contract, record = %self.0.contract.address, "record is for another contract");
        }
        Ok(ContractTokensResult {
            contract: self.0.contract.clone(),
            tokens: vec![self.0.clone()],
        })
    }
}

/// Contract facts passed on the command line.
struct StaticContractInfo(ContractInfo);

impl ContractInfoSource for StaticContractInfo {
    async fn contract_info(&self, _: Address) -> eyre::Result<ContractInfo> {
        Ok(self.0.clone())
    }
}

fn load_config(cli: &Cli) -> eyre::Result<ProtocolConfig> {
    match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .wrap_err_with(|| format!("reading {}", path.display()))?;
            ProtocolConfig::from_json(&json)
        }
        None => ProtocolConfig::for_chain(cli.chain_id)
            .ok_or_else(|| eyre!("no built-in deployment for chain {}, pass --config", cli.chain_id)),
    }
}

#[tokio::main]
async fn main() -> Result<(), eyre::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    info!(target: "mintkit::cli", chain_id = config.chain_id, factory = %config.factory, "loaded deployment");

    let output = match cli.command {
        Command::Mint {
            token,
            minter,
            quantity,
            recipient,
            referral,
            comment,
            mint_fee,
        } => {
            let json = fs::read_to_string(&token)
                .wrap_err_with(|| format!("reading {}", token.display()))?;
            let mut record: TokenQueryResult = serde_json::from_str(&json)?;
            if let Some(fee) = mint_fee {
                record.contract.mint_fee_per_quantity = Some(fee.to_string());
            }
            let contract = record.contract.address;
            let token_id = record.token_id.as_deref().map(str::parse::<U256>).transpose()?;

            let client = MintClient::new(FileTokenQuery(record), OfflineReader, Arc::new(SystemClock));
            let mintable = client.get_token(contract, token_id).await?;

            let mut request = MintRequest::new(minter, quantity).with_comment(comment);
            if let Some(recipient) = recipient {
                request = request.with_recipient(recipient);
            }
            if let Some(referral) = referral {
                request = request.with_mint_referral(referral);
            }
            let prepared = mintable.prepare_mint(&request)?;

            json!({
                "strategy": format!("{:?}", mintable.sale.strategy.kind()),
                "parameters": prepared.parameters,
                "costs": prepared.costs,
                "erc20Approval": prepared.erc20_approval.as_ref().map(|a| a.prepared_call()),
            })
        }
        Command::CreateToken {
            contract,
            account,
            token_uri,
            next_token_id,
            contract_version,
            contract_name,
            price,
            mint_to_creator,
            referral,
        } => {
            let info = StaticContractInfo(ContractInfo {
                contract_version,
                mint_fee: config.default_mint_fee,
                name: contract_name,
                next_token_id,
            });

            let mut token = NewTokenParams::new(token_uri);
            if let Some(price) = price {
                token = token.with_sales_config(SalesConfig::FixedPrice {
                    price_per_token: price,
                    sale_start: 0,
                    sale_end: SALE_END_FOREVER,
                    max_tokens_per_address: 0,
                    funds_recipient: None,
                });
            }
            if let Some(count) = mint_to_creator {
                token = token.with_mint_to_creator_count(count);
            }
            if let Some(referral) = referral {
                token = token.with_create_referral(referral);
            }

            let builder = CreateParameterBuilder::new(config, OfflineReader, info, Arc::new(SystemClock));
            let prepared = builder
                .prepare_create_1155_on_existing_contract(contract, &token, account)
                .await?;

            json!({
                "contractAddress": prepared.contract_address,
                "newTokenId": prepared.new_token_id,
                "minter": prepared.minter,
                "parameters": prepared.parameters,
            })
        }
        Command::Receipt { logs } => {
            let json = fs::read_to_string(&logs)
                .wrap_err_with(|| format!("reading {}", logs.display()))?;
            let logs: Vec<Log> = serde_json::from_str(&json)?;
            let contract_address = match receipt::contract_address_from_logs(&logs) {
                Ok(address) => Some(address),
                Err(err) => {
                    debug!(target: "mintkit::cli", %err, "no contract address in receipt");
                    None
                }
            };

            json!({
                "contractAddress": contract_address,
                "tokenId": receipt::token_id_from_create_logs(&logs)?,
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
