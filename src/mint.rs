//! Mint parameter builder and the collector-facing token lookup.

use std::{str::FromStr, sync::Arc};

use alloy_primitives::{Address, B256, Bytes, U256};
use alloy_sol_types::SolValue;
use tracing::debug;

use crate::{
    abi::{IERC20Minter, IERC721Drop, ITimedSaleStrategy, IZoraCreator1155},
    allow_list::ProvenAllowListEntry,
    call::PreparedCall,
    costs::{Erc20Approval, MintCosts, compute_costs},
    error::{PrepareError, Result},
    lookup::{
        Clock, ContractQueryResult, ContractReader, ContractTokensResult, TokenQuery,
        TokenQueryResult, TokenStandard, read_contract,
    },
    strategy::{SaleStrategy, resolve_strategy},
    version::ContractVersion,
};

/// The token being minted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MintTarget {
    Erc1155 { contract: Address, token_id: U256 },
    /// Legacy drop contracts sell through their own `mintWithRewards`.
    Erc721 { contract: Address },
}

impl MintTarget {
    pub fn contract(&self) -> Address {
        match self {
            Self::Erc1155 { contract, .. } | Self::Erc721 { contract } => *contract,
        }
    }
}

/// Everything about a token's sale needed to price and encode a mint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSale {
    pub target: MintTarget,
    pub strategy: SaleStrategy,
    /// Version string reported by the token contract.
    pub contract_version: String,
    /// Native fee per token charged by the token contract.
    pub protocol_fee: U256,
}

/// Caller side of a mint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintRequest {
    pub quantity: u64,
    pub minter_account: Address,
    /// Defaults to `minter_account`.
    pub mint_recipient: Option<Address>,
    pub allow_list_entry: Option<ProvenAllowListEntry>,
    pub mint_referral: Option<Address>,
    pub comment: String,
}

impl MintRequest {
    pub fn new(minter_account: Address, quantity: u64) -> Self {
        Self {
            quantity,
            minter_account,
            mint_recipient: None,
            allow_list_entry: None,
            mint_referral: None,
            comment: String::new(),
        }
    }

    pub fn with_recipient(mut self, recipient: Address) -> Self {
        self.mint_recipient = Some(recipient);
        self
    }

    pub fn with_allow_list_entry(mut self, entry: ProvenAllowListEntry) -> Self {
        self.allow_list_entry = Some(entry);
        self
    }

    pub fn with_mint_referral(mut self, referral: Address) -> Self {
        self.mint_referral = Some(referral);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn recipient(&self) -> Address {
        self.mint_recipient.unwrap_or(self.minter_account)
    }
}

/// A ready-to-simulate mint plus what it costs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedMint {
    pub parameters: PreparedCall,
    pub costs: MintCosts,
    /// Must be mined before `parameters` for ERC20 priced sales.
    pub erc20_approval: Option<Erc20Approval>,
}

/// Validate, price and encode a mint at time `now`.
pub fn prepare_mint(sale: &TokenSale, request: &MintRequest, now: u64) -> Result<PreparedMint> {
    let recipient = request.recipient();
    let quantity = request.quantity;

    let allow_list_entry = match &sale.strategy {
        SaleStrategy::AllowListMint {
            presale_merkle_root,
            ..
        } => {
            let proven = request
                .allow_list_entry
                .as_ref()
                .ok_or(PrepareError::AllowListEntryRequired {
                    root: *presale_merkle_root,
                })?;
            check_allow_list(proven, *presale_merkle_root, recipient, quantity)?;
            Some(proven)
        }
        _ => None,
    };

    if !sale.strategy.is_active_at(now) {
        let (sale_start, sale_end) = sale.strategy.sale_window();
        return Err(PrepareError::SaleNotActive {
            now,
            sale_start,
            sale_end,
        });
    }

    let quote = compute_costs(
        &sale.strategy,
        quantity,
        sale.protocol_fee,
        allow_list_entry.map(|p| &p.entry),
    )?;
    let value = quote.costs.total_cost_eth;

    let parameters = match sale.target {
        MintTarget::Erc1155 { contract, token_id } => {
            mint_1155_call(sale, contract, token_id, request, allow_list_entry, value)?
        }
        MintTarget::Erc721 { contract } => mint_721_call(&sale.strategy, contract, request, value)?,
    };

    debug!(
        target: "mintkit::mint",
        kind = ?sale.strategy.kind(),
        function = parameters.abi_function,
        %quantity,
        %recipient,
        %value,
        "prepared mint"
    );

    Ok(PreparedMint {
        parameters,
        costs: quote.costs,
        erc20_approval: quote.erc20_approval,
    })
}

fn check_allow_list(
    proven: &ProvenAllowListEntry,
    root: B256,
    recipient: Address,
    quantity: u64,
) -> Result<()> {
    if !proven.verify(root) {
        return Err(PrepareError::InvalidProof {
            user: proven.entry.user,
            root,
        });
    }
    // The leaf is checked against `mintTo` on chain.
    if proven.entry.user != recipient {
        return Err(PrepareError::AllowListRecipientMismatch {
            entry_user: proven.entry.user,
            recipient,
        });
    }
    if U256::from(quantity) > proven.entry.max_can_mint {
        return Err(PrepareError::ExceedsAllowListCap {
            quantity,
            max_can_mint: proven.entry.max_can_mint,
        });
    }
    Ok(())
}

fn mint_1155_call(
    sale: &TokenSale,
    contract: Address,
    token_id: U256,
    request: &MintRequest,
    allow_list_entry: Option<&ProvenAllowListEntry>,
    value: U256,
) -> Result<PreparedCall> {
    let recipient = request.recipient();
    let quantity = U256::from(request.quantity);
    let referral = request.mint_referral.unwrap_or_default();

    let minter_arguments: Bytes = match &sale.strategy {
        SaleStrategy::Erc20Price {
            minter,
            price_per_token,
            currency,
            ..
        } => {
            let call = IERC20Minter::mintCall {
                mintTo: recipient,
                quantity,
                tokenAddress: contract,
                tokenId: token_id,
                totalValue: price_per_token
                    .checked_mul(quantity)
                    .ok_or(PrepareError::CostOverflow)?,
                currency: *currency,
                mintReferral: referral,
                comment: request.comment.clone(),
            };
            return Ok(PreparedCall::new(*minter, &call, value));
        }
        SaleStrategy::TimedSale { minter, .. } => {
            let version = ContractVersion::parse(&sale.contract_version)?;
            version.require(version.supports_timed_sale(), "timed sale mints")?;
            let call = ITimedSaleStrategy::mintCall {
                mintTo: recipient,
                quantity,
                collection: contract,
                tokenId: token_id,
                mintReferral: referral,
                comment: request.comment.clone(),
            };
            return Ok(PreparedCall::new(*minter, &call, value));
        }
        SaleStrategy::FreeMint { .. } | SaleStrategy::FixedPrice { .. } => {
            (recipient, request.comment.clone()).abi_encode_params().into()
        }
        SaleStrategy::AllowListMint {
            presale_merkle_root,
            ..
        } => {
            let proven = allow_list_entry.ok_or(PrepareError::AllowListEntryRequired {
                root: *presale_merkle_root,
            })?;
            (
                recipient,
                proven.entry.max_can_mint,
                proven.entry.price,
                proven.proof.clone(),
            )
                .abi_encode_params()
                .into()
        }
    };

    let minter = sale.strategy.minter();
    let version = ContractVersion::parse(&sale.contract_version)?;

    if version.supports_rewards_recipients_mint() {
        let call = IZoraCreator1155::mintCall {
            minter,
            tokenId: token_id,
            quantity,
            rewardsRecipients: request.mint_referral.into_iter().collect(),
            minterArguments: minter_arguments,
        };
        Ok(PreparedCall::new(contract, &call, value))
    } else {
        version.require(version.supports_paid_mint(), "minting with rewards")?;
        let call = IZoraCreator1155::mintWithRewardsCall {
            minter,
            tokenId: token_id,
            quantity,
            minterArguments: minter_arguments,
            mintReferral: referral,
        };
        Ok(PreparedCall::new(contract, &call, value))
    }
}

fn mint_721_call(
    strategy: &SaleStrategy,
    contract: Address,
    request: &MintRequest,
    value: U256,
) -> Result<PreparedCall> {
    match strategy {
        SaleStrategy::FreeMint { .. } | SaleStrategy::FixedPrice { .. } => {
            let call = IERC721Drop::mintWithRewardsCall {
                recipient: request.recipient(),
                quantity: U256::from(request.quantity),
                comment: request.comment.clone(),
                mintReferral: request.mint_referral.unwrap_or_default(),
            };
            Ok(PreparedCall::new(contract, &call, value))
        }
        other => Err(PrepareError::UnsupportedStrategy(format!(
            "{:?} sales are not available on 721 drops",
            other.kind()
        ))),
    }
}

/// Wraps [`prepare_mint`] with an injected clock.
#[derive(Clone)]
pub struct MintParameterBuilder {
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for MintParameterBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MintParameterBuilder").finish_non_exhaustive()
    }
}

impl MintParameterBuilder {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn prepare_mint(&self, sale: &TokenSale, request: &MintRequest) -> Result<PreparedMint> {
        prepare_mint(sale, request, self.clock.now())
    }
}

/// Indexed token metadata, carried along for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenMetadata {
    pub name: Option<String>,
    pub token_uri: Option<String>,
    pub max_supply: Option<U256>,
    pub total_minted: Option<U256>,
    pub creator: Option<Address>,
}

/// A token with its sale resolved and a mint builder bound to it.
#[derive(Debug, Clone)]
pub struct MintableToken {
    pub sale: TokenSale,
    pub metadata: TokenMetadata,
    builder: MintParameterBuilder,
}

impl MintableToken {
    pub fn new(sale: TokenSale, metadata: TokenMetadata, builder: MintParameterBuilder) -> Self {
        Self {
            sale,
            metadata,
            builder,
        }
    }

    pub fn prepare_mint(&self, request: &MintRequest) -> Result<PreparedMint> {
        self.builder.prepare_mint(&self.sale, request)
    }
}

/// Collector entry point: look a token up and get back something mintable.
#[derive(Clone)]
pub struct MintClient<Q, R> {
    query: Q,
    reader: R,
    builder: MintParameterBuilder,
}

impl<Q: TokenQuery, R: ContractReader> MintClient<Q, R> {
    pub fn new(query: Q, reader: R, clock: Arc<dyn Clock>) -> Self {
        Self {
            query,
            reader,
            builder: MintParameterBuilder::new(clock),
        }
    }

    /// Resolve the sale of `contract` (and `token_id` for 1155s).
    ///
    /// The protocol fee comes from the indexer when it reports one, otherwise
    /// from the contract's `mintFee()`. ERC20 sales carry no native fee.
    pub async fn get_token(&self, contract: Address, token_id: Option<U256>) -> Result<MintableToken> {
        let result = self
            .query
            .query(contract, token_id)
            .await
            .map_err(|err| PrepareError::lookup("token query", err))?;

        self.mintable(contract, token_id, &result).await
    }

    /// Every token of `contract` that has a sale, along with the contract record.
    ///
    /// Tokens the indexer lists without any sale strategy are skipped.
    pub async fn get_tokens_of_contract(
        &self,
        contract: Address,
    ) -> Result<(Vec<MintableToken>, ContractQueryResult)> {
        let ContractTokensResult {
            contract: info,
            tokens,
        } = self
            .query
            .query_contract(contract)
            .await
            .map_err(|err| PrepareError::lookup("contract token query", err))?;

        let mut mintables = Vec::with_capacity(tokens.len());
        for token in &tokens {
            if token.sales_strategies.is_empty() {
                debug!(target: "mintkit::mint", %contract, token_id = ?token.token_id, "token has no sales, skipping");
                continue;
            }
            mintables.push(self.mintable(contract, None, token).await?);
        }
        debug!(target: "mintkit::mint", %contract, listed = tokens.len(), mintable = mintables.len(), "resolved contract tokens");

        Ok((mintables, info))
    }

    async fn mintable(
        &self,
        contract: Address,
        token_id: Option<U256>,
        result: &TokenQueryResult,
    ) -> Result<MintableToken> {
        let strategy = resolve_strategy(&result.sales_strategies)?;

        let target = match result.token_standard {
            TokenStandard::Erc721 => MintTarget::Erc721 { contract },
            TokenStandard::Erc1155 => {
                let token_id = match token_id {
                    Some(id) => id,
                    None => parse_indexed("tokenId", result.token_id.as_deref())?
                        .ok_or_else(|| invalid("tokenId", ""))?,
                };
                MintTarget::Erc1155 { contract, token_id }
            }
        };

        let protocol_fee = if strategy.charges_contract_mint_fee() {
            match parse_indexed(
                "mintFeePerQuantity",
                result.contract.mint_fee_per_quantity.as_deref(),
            )? {
                Some(fee) => fee,
                None => {
                    read_contract(&self.reader, contract, IZoraCreator1155::mintFeeCall {}).await?
                }
            }
        } else {
            U256::ZERO
        };

        let metadata = TokenMetadata {
            name: result.contract.name.clone(),
            token_uri: result.uri.clone(),
            max_supply: parse_indexed("maxSupply", result.max_supply.as_deref())?,
            total_minted: parse_indexed("totalMinted", result.total_minted.as_deref())?,
            creator: result.creator,
        };

        let sale = TokenSale {
            target,
            strategy,
            contract_version: result.contract.contract_version.clone(),
            protocol_fee,
        };

        Ok(MintableToken::new(sale, metadata, self.builder.clone()))
    }
}

fn invalid(field: &'static str, value: &str) -> PrepareError {
    PrepareError::InvalidStrategyField {
        field,
        value: value.to_string(),
    }
}

/// Optional decimal string from the indexer; empty counts as absent.
fn parse_indexed(field: &'static str, value: Option<&str>) -> Result<Option<U256>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => U256::from_str(s).map(Some).map_err(|_| invalid(field, s)),
    }
}
