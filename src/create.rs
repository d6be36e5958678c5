//! Create parameter builder: new 1155 contracts and new tokens on existing ones.
//!
//! A token is created, granted a minter and configured for sale in one
//! transaction. On a new contract the setup actions ride along in the factory's
//! `createContractDeterministic`; on an existing contract they are batched in a
//! `multicall` guarded by `assumeLastTokenIdMatches`.

use std::sync::Arc;

use alloy_primitives::{Address, B256, Bytes, U256, aliases::U96};
use alloy_sol_types::SolCall;
use tracing::debug;

use crate::{
    abi::{
        IERC20Minter, IFixedPriceSaleStrategy, IMerkleSaleStrategy, ITimedSaleStrategy,
        IZoraCreator1155, IZoraCreator1155Factory, RoyaltyConfiguration,
    },
    call::PreparedCall,
    config::ProtocolConfig,
    error::{PrepareError, Result},
    lookup::{
        Clock, ContractInfoSource, ContractReader, OnchainContractInfo, SystemClock, read_contract,
    },
    mint::{MintParameterBuilder, MintTarget, MintableToken, TokenMetadata, TokenSale},
    strategy::{SALE_END_FOREVER, SaleStrategy},
    version::ContractVersion,
};

/// Permission bit that lets an address call the token's sale hooks.
pub const PERMISSION_BIT_MINTER: U256 = U256::from_limbs([4, 0, 0, 0]);

/// Contract level fields for a brand new 1155 contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContractParams {
    pub name: String,
    pub uri: String,
    /// Defaults to the creating account.
    pub default_admin: Option<Address>,
}

impl NewContractParams {
    pub fn new(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
            default_admin: None,
        }
    }
}

/// How the new token is sold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SalesConfig {
    /// A zero price sets up a free mint.
    FixedPrice {
        price_per_token: U256,
        sale_start: u64,
        sale_end: u64,
        max_tokens_per_address: u64,
        funds_recipient: Option<Address>,
    },
    Erc20 {
        currency: Address,
        price_per_token: U256,
        sale_start: u64,
        sale_end: u64,
        max_tokens_per_address: u64,
        funds_recipient: Option<Address>,
    },
    AllowList {
        presale_merkle_root: B256,
        sale_start: u64,
        sale_end: u64,
        funds_recipient: Option<Address>,
    },
    Timed {
        sale_start: u64,
        sale_end: u64,
        /// Defaults to the contract name.
        erc20_name: Option<String>,
        /// Defaults to a ticker derived from the ERC20 name.
        erc20_symbol: Option<String>,
    },
}

impl SalesConfig {
    /// Open ended free mint.
    pub fn free() -> Self {
        Self::FixedPrice {
            price_per_token: U256::ZERO,
            sale_start: 0,
            sale_end: SALE_END_FOREVER,
            max_tokens_per_address: 0,
            funds_recipient: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTokenParams {
    pub token_metadata_uri: String,
    /// Defaults to unlimited.
    pub max_supply: Option<U256>,
    pub mint_to_creator_count: Option<u64>,
    pub create_referral: Option<Address>,
    pub royalty_bps: Option<u32>,
    pub payout_recipient: Option<Address>,
    /// Defaults to [`SalesConfig::free`].
    pub sales_config: Option<SalesConfig>,
}

impl NewTokenParams {
    pub fn new(token_metadata_uri: impl Into<String>) -> Self {
        Self {
            token_metadata_uri: token_metadata_uri.into(),
            max_supply: None,
            mint_to_creator_count: None,
            create_referral: None,
            royalty_bps: None,
            payout_recipient: None,
            sales_config: None,
        }
    }

    pub fn with_sales_config(mut self, sales_config: SalesConfig) -> Self {
        self.sales_config = Some(sales_config);
        self
    }

    pub fn with_create_referral(mut self, referral: Address) -> Self {
        self.create_referral = Some(referral);
        self
    }

    pub fn with_max_supply(mut self, max_supply: U256) -> Self {
        self.max_supply = Some(max_supply);
        self
    }

    pub fn with_mint_to_creator_count(mut self, count: u64) -> Self {
        self.mint_to_creator_count = Some(count);
        self
    }

    pub fn with_royalty(mut self, royalty_bps: u32, payout_recipient: Address) -> Self {
        self.royalty_bps = Some(royalty_bps);
        self.payout_recipient = Some(payout_recipient);
        self
    }

    fn funds_recipient(&self, configured: Option<Address>, account: Address) -> Address {
        configured.or(self.payout_recipient).unwrap_or(account)
    }
}

/// A prepared create transaction and what it will produce once mined.
#[derive(Debug, Clone)]
pub struct PreparedCreate {
    pub parameters: PreparedCall,
    pub contract_address: Address,
    pub new_token_id: U256,
    /// Minter granted permission on the new token.
    pub minter: Address,
    pub contract_version: String,
    /// Mint builder scoped to the token being created.
    pub mint: MintableToken,
}

/// The contract a token is being added to.
struct TokenContext {
    contract_address: Address,
    contract_name: String,
    contract_version: String,
    mint_fee: U256,
    token_id: U256,
    /// Royalties on a new contract go into its default configuration instead.
    per_token_royalty: bool,
}

fn royalty_configuration(token: &NewTokenParams, account: Address) -> RoyaltyConfiguration {
    RoyaltyConfiguration {
        royaltyMintSchedule: 0,
        royaltyBPS: token.royalty_bps.unwrap_or_default(),
        royaltyRecipient: token.payout_recipient.unwrap_or(account),
    }
}

/// Short uppercase ticker from the first alphanumerics of `name`.
fn derive_symbol(name: &str) -> String {
    let symbol: String = name
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(4)
        .collect::<String>()
        .to_ascii_uppercase();
    if symbol.is_empty() {
        "ZORA".to_string()
    } else {
        symbol
    }
}

#[derive(Clone)]
pub struct CreateParameterBuilder<R, I> {
    config: ProtocolConfig,
    reader: R,
    contract_info: I,
    clock: Arc<dyn Clock>,
}

impl<R: ContractReader + Clone> CreateParameterBuilder<R, OnchainContractInfo<R>> {
    /// Builder that reads existing contracts through `reader` and uses wall clock time.
    pub fn onchain(config: ProtocolConfig, reader: R) -> Self {
        let contract_info = OnchainContractInfo::new(reader.clone());
        Self::new(config, reader, contract_info, Arc::new(SystemClock))
    }
}

impl<R: ContractReader, I: ContractInfoSource> CreateParameterBuilder<R, I> {
    pub fn new(config: ProtocolConfig, reader: R, contract_info: I, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            reader,
            contract_info,
            clock,
        }
    }

    /// Deploy a new contract through the factory with its first token.
    ///
    /// The contract address is the factory's own deterministic prediction for
    /// `(account, uri, name, admin)`.
    pub async fn prepare_create_1155(
        &self,
        contract: &NewContractParams,
        token: &NewTokenParams,
        account: Address,
    ) -> Result<PreparedCreate> {
        let admin = contract.default_admin.unwrap_or(account);
        let factory = self.config.factory;

        let contract_address = read_contract(
            &self.reader,
            factory,
            IZoraCreator1155Factory::deterministicContractAddressCall {
                msgSender: account,
                newContractURI: contract.uri.clone(),
                name: contract.name.clone(),
                contractAdmin: admin,
            },
        )
        .await?;

        let context = TokenContext {
            contract_address,
            contract_name: contract.name.clone(),
            contract_version: self.config.new_contract_version.clone(),
            mint_fee: self.config.default_mint_fee,
            token_id: U256::from(1),
            per_token_royalty: false,
        };
        let (setup_actions, strategy) = self.setup_actions(&context, token, account)?;

        let call = IZoraCreator1155Factory::createContractDeterministicCall {
            newContractURI: contract.uri.clone(),
            name: contract.name.clone(),
            defaultRoyaltyConfiguration: royalty_configuration(token, account),
            defaultAdmin: admin,
            setupActions: setup_actions,
        };
        let parameters = PreparedCall::new(factory, &call, U256::ZERO);

        debug!(
            target: "mintkit::create",
            %contract_address,
            %admin,
            kind = ?strategy.kind(),
            "prepared new contract"
        );

        Ok(self.prepared(parameters, context, strategy, token, account))
    }

    /// Add a token to a contract that is already deployed.
    pub async fn prepare_create_1155_on_existing_contract(
        &self,
        contract_address: Address,
        token: &NewTokenParams,
        account: Address,
    ) -> Result<PreparedCreate> {
        let info = self
            .contract_info
            .contract_info(contract_address)
            .await
            .map_err(|err| PrepareError::lookup("contract info", err))?;

        let context = TokenContext {
            contract_address,
            contract_name: info.name,
            contract_version: info.contract_version,
            mint_fee: info.mint_fee,
            token_id: info.next_token_id,
            per_token_royalty: true,
        };

        // Reverts if another token lands first and shifts the id.
        let last_token_id = context.token_id.saturating_sub(U256::from(1));
        let mut actions: Vec<Bytes> =
            vec![IZoraCreator1155::assumeLastTokenIdMatchesCall { tokenId: last_token_id }
                .abi_encode()
                .into()];
        let (setup_actions, strategy) = self.setup_actions(&context, token, account)?;
        actions.extend(setup_actions);

        let call = IZoraCreator1155::multicallCall { data: actions };
        let parameters = PreparedCall::new(contract_address, &call, U256::ZERO);

        debug!(
            target: "mintkit::create",
            %contract_address,
            token_id = %context.token_id,
            version = %context.contract_version,
            kind = ?strategy.kind(),
            "prepared token on existing contract"
        );

        Ok(self.prepared(parameters, context, strategy, token, account))
    }

    /// Token setup calls in execution order, plus the strategy they configure.
    fn setup_actions(
        &self,
        context: &TokenContext,
        token: &NewTokenParams,
        account: Address,
    ) -> Result<(Vec<Bytes>, SaleStrategy)> {
        let version = ContractVersion::parse(&context.contract_version)?;
        let token_id = context.token_id;
        let max_supply = token.max_supply.unwrap_or(U256::MAX);
        let mut actions: Vec<Bytes> = Vec::new();

        match token.create_referral {
            Some(referral) => {
                version.require(version.supports_create_referral(), "create referrals")?;
                actions.push(
                    IZoraCreator1155::setupNewTokenWithCreateReferralCall {
                        newURI: token.token_metadata_uri.clone(),
                        maxSupply: max_supply,
                        createReferral: referral,
                    }
                    .abi_encode()
                    .into(),
                );
            }
            None => actions.push(
                IZoraCreator1155::setupNewTokenCall {
                    newURI: token.token_metadata_uri.clone(),
                    maxSupply: max_supply,
                }
                .abi_encode()
                .into(),
            ),
        }

        if context.per_token_royalty && token.royalty_bps.is_some() {
            actions.push(
                IZoraCreator1155::updateRoyaltiesForTokenCall {
                    tokenId: token_id,
                    newConfiguration: royalty_configuration(token, account),
                }
                .abi_encode()
                .into(),
            );
        }

        let sales_config = token.sales_config.clone().unwrap_or_else(SalesConfig::free);
        let (strategy, set_sale) = self.sale_setup(context, &version, &sales_config, token, account)?;
        let minter = strategy.minter();

        actions.push(
            IZoraCreator1155::addPermissionCall {
                tokenId: token_id,
                user: minter,
                permissionBits: PERMISSION_BIT_MINTER,
            }
            .abi_encode()
            .into(),
        );
        actions.push(
            IZoraCreator1155::callSaleCall {
                tokenId: token_id,
                salesConfig: minter,
                data: set_sale,
            }
            .abi_encode()
            .into(),
        );

        if let Some(count) = token.mint_to_creator_count.filter(|count| *count > 0) {
            actions.push(
                IZoraCreator1155::adminMintCall {
                    recipient: account,
                    tokenId: token_id,
                    quantity: U256::from(count),
                    data: Bytes::new(),
                }
                .abi_encode()
                .into(),
            );
        }

        Ok((actions, strategy))
    }

    /// Strategy for `sales_config` and the `setSale` calldata the minter receives.
    fn sale_setup(
        &self,
        context: &TokenContext,
        version: &ContractVersion,
        sales_config: &SalesConfig,
        token: &NewTokenParams,
        account: Address,
    ) -> Result<(SaleStrategy, Bytes)> {
        let token_id = context.token_id;

        let (strategy, set_sale): (SaleStrategy, Vec<u8>) = match sales_config {
            SalesConfig::FixedPrice {
                price_per_token,
                sale_start,
                sale_end,
                max_tokens_per_address,
                funds_recipient,
            } => {
                let minter = self.config.fixed_price_minter;
                let price = U96::checked_from_uint(*price_per_token).ok_or_else(|| {
                    PrepareError::InvalidStrategyField {
                        field: "pricePerToken",
                        value: price_per_token.to_string(),
                    }
                })?;
                let set_sale = IFixedPriceSaleStrategy::setSaleCall {
                    tokenId: token_id,
                    salesConfig: IFixedPriceSaleStrategy::SalesConfig {
                        saleStart: *sale_start,
                        saleEnd: *sale_end,
                        maxTokensPerAddress: *max_tokens_per_address,
                        pricePerToken: price,
                        fundsRecipient: token.funds_recipient(*funds_recipient, account),
                    },
                };
                let strategy = if price_per_token.is_zero() {
                    SaleStrategy::FreeMint {
                        minter,
                        sale_start: *sale_start,
                        sale_end: *sale_end,
                    }
                } else {
                    SaleStrategy::FixedPrice {
                        minter,
                        price_per_token: *price_per_token,
                        sale_start: *sale_start,
                        sale_end: *sale_end,
                        max_tokens_per_address: U256::from(*max_tokens_per_address),
                    }
                };
                (strategy, set_sale.abi_encode())
            }
            SalesConfig::Erc20 {
                currency,
                price_per_token,
                sale_start,
                sale_end,
                max_tokens_per_address,
                funds_recipient,
            } => {
                let minter = self.config.erc20_minter;
                let set_sale = IERC20Minter::setSaleCall {
                    tokenId: token_id,
                    salesConfig: IERC20Minter::SalesConfig {
                        saleStart: *sale_start,
                        saleEnd: *sale_end,
                        maxTokensPerAddress: *max_tokens_per_address,
                        pricePerToken: *price_per_token,
                        fundsRecipient: token.funds_recipient(*funds_recipient, account),
                        currency: *currency,
                    },
                };
                let strategy = SaleStrategy::Erc20Price {
                    minter,
                    price_per_token: *price_per_token,
                    currency: *currency,
                    sale_start: *sale_start,
                    sale_end: *sale_end,
                    max_tokens_per_address: U256::from(*max_tokens_per_address),
                };
                (strategy, set_sale.abi_encode())
            }
            SalesConfig::AllowList {
                presale_merkle_root,
                sale_start,
                sale_end,
                funds_recipient,
            } => {
                let minter = self.config.merkle_minter;
                let set_sale = IMerkleSaleStrategy::setSaleCall {
                    tokenId: token_id,
                    merkleSaleSettings: IMerkleSaleStrategy::MerkleSaleSettings {
                        presaleStart: *sale_start,
                        presaleEnd: *sale_end,
                        fundsRecipient: token.funds_recipient(*funds_recipient, account),
                        merkleRoot: *presale_merkle_root,
                    },
                };
                let strategy = SaleStrategy::AllowListMint {
                    minter,
                    presale_merkle_root: *presale_merkle_root,
                    sale_start: *sale_start,
                    sale_end: *sale_end,
                };
                (strategy, set_sale.abi_encode())
            }
            SalesConfig::Timed {
                sale_start,
                sale_end,
                erc20_name,
                erc20_symbol,
            } => {
                version.require(version.supports_timed_sale(), "timed sales")?;
                let minter = self.config.timed_sale_strategy;
                let name = erc20_name
                    .clone()
                    .unwrap_or_else(|| context.contract_name.clone());
                let symbol = erc20_symbol.clone().unwrap_or_else(|| derive_symbol(&name));
                let set_sale = ITimedSaleStrategy::setSaleCall {
                    tokenId: token_id,
                    salesConfig: ITimedSaleStrategy::SalesConfig {
                        saleStart: *sale_start,
                        saleEnd: *sale_end,
                        name,
                        symbol,
                    },
                };
                // The ERC20z and its pool only exist once the market launches.
                let strategy = SaleStrategy::TimedSale {
                    minter,
                    sale_start: *sale_start,
                    sale_end: *sale_end,
                    mint_fee_per_unit: self.config.timed_sale_mint_fee,
                    secondary_activated: false,
                    erc20z: Address::ZERO,
                    pool: Address::ZERO,
                };
                (strategy, set_sale.abi_encode())
            }
        };

        Ok((strategy, set_sale.into()))
    }

    fn prepared(
        &self,
        parameters: PreparedCall,
        context: TokenContext,
        strategy: SaleStrategy,
        token: &NewTokenParams,
        account: Address,
    ) -> PreparedCreate {
        let minter = strategy.minter();
        let protocol_fee = if strategy.charges_contract_mint_fee() {
            context.mint_fee
        } else {
            U256::ZERO
        };
        let sale = TokenSale {
            target: MintTarget::Erc1155 {
                contract: context.contract_address,
                token_id: context.token_id,
            },
            strategy,
            contract_version: context.contract_version.clone(),
            protocol_fee,
        };
        let metadata = TokenMetadata {
            name: Some(context.contract_name),
            token_uri: Some(token.token_metadata_uri.clone()),
            max_supply: Some(token.max_supply.unwrap_or(U256::MAX)),
            total_minted: Some(U256::from(token.mint_to_creator_count.unwrap_or_default())),
            creator: Some(account),
        };

        PreparedCreate {
            parameters,
            contract_address: context.contract_address,
            new_token_id: context.token_id,
            minter,
            contract_version: context.contract_version,
            mint: MintableToken::new(sale, metadata, MintParameterBuilder::new(self.clock.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{ProtocolConfig, ZORA_MAINNET},
        lookup::{ContractInfo, FixedClock},
        mint::MintRequest,
        test_utils::{MockContractInfo, MockReader},
    };
    use alloy_primitives::{address, utils::parse_ether};
    use alloy_sol_types::SolValue;

    const CREATOR: Address = address!("0xf69fec6d858c77e969509843852178bd24cad2b6");
    const PREDICTED: Address = address!("0xb1a8928dc8a7ed9e2a2bfea4d2bf6e7de0b65bf4");
    const EXISTING: Address = address!("0xa2fea3537915dc6c7c7a97a82d1236041e6feb2e");
    const REFERRAL: Address = address!("0xcd08da546414dd463c89705b5e72ce1aeebf1567");

    fn config() -> ProtocolConfig {
        ProtocolConfig::for_chain(ZORA_MAINNET).unwrap()
    }

    fn builder(version: &str, next_token_id: u64) -> CreateParameterBuilder<MockReader, MockContractInfo> {
        let reader = MockReader::default()
            .returning::<IZoraCreator1155Factory::deterministicContractAddressCall>(
                PREDICTED.abi_encode(),
            );
        let info = MockContractInfo(ContractInfo {
            contract_version: version.to_string(),
            mint_fee: parse_ether("0.000777").unwrap(),
            name: "Existing Collection".to_string(),
            next_token_id: U256::from(next_token_id),
        });
        CreateParameterBuilder::new(config(), reader, info, Arc::new(FixedClock(0)))
    }

    fn contract() -> NewContractParams {
        NewContractParams::new("testContract", "ipfs://DUMMY/contract.json")
    }

    fn token() -> NewTokenParams {
        NewTokenParams::new("ipfs://DUMMY/token.json")
    }

    fn decode_factory_call(
        prepared: &PreparedCreate,
    ) -> IZoraCreator1155Factory::createContractDeterministicCall {
        prepared
            .parameters
            .decode::<IZoraCreator1155Factory::createContractDeterministicCall>()
            .unwrap()
    }

    fn selectors(actions: &[Bytes]) -> Vec<[u8; 4]> {
        actions
            .iter()
            .map(|action| <[u8; 4]>::try_from(&action[..4]).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn new_contract_defaults_to_a_free_mint_of_token_one() {
        let prepared = builder("2.12.1", 1)
            .prepare_create_1155(&contract(), &token(), CREATOR)
            .await
            .unwrap();

        assert_eq!(prepared.contract_address, PREDICTED);
        assert_eq!(prepared.new_token_id, U256::from(1));
        assert_eq!(prepared.minter, config().fixed_price_minter);
        assert_eq!(prepared.contract_version, config().new_contract_version);
        assert_eq!(prepared.parameters.target_address, config().factory);
        assert_eq!(prepared.parameters.value, U256::ZERO);

        let call = decode_factory_call(&prepared);
        assert_eq!(call.defaultAdmin, CREATOR);
        assert_eq!(call.name, "testContract");
        assert_eq!(
            selectors(&call.setupActions),
            vec![
                IZoraCreator1155::setupNewTokenCall::SELECTOR,
                IZoraCreator1155::addPermissionCall::SELECTOR,
                IZoraCreator1155::callSaleCall::SELECTOR,
            ]
        );

        let setup = IZoraCreator1155::setupNewTokenCall::abi_decode(&call.setupActions[0]).unwrap();
        assert_eq!(setup.maxSupply, U256::MAX);

        let permission =
            IZoraCreator1155::addPermissionCall::abi_decode(&call.setupActions[1]).unwrap();
        assert_eq!(permission.user, config().fixed_price_minter);
        assert_eq!(permission.permissionBits, PERMISSION_BIT_MINTER);

        let call_sale = IZoraCreator1155::callSaleCall::abi_decode(&call.setupActions[2]).unwrap();
        let set_sale = IFixedPriceSaleStrategy::setSaleCall::abi_decode(&call_sale.data).unwrap();
        assert_eq!(set_sale.tokenId, U256::from(1));
        assert_eq!(set_sale.salesConfig.pricePerToken, U96::ZERO);
        assert_eq!(set_sale.salesConfig.fundsRecipient, CREATOR);

        assert!(matches!(prepared.mint.sale.strategy, SaleStrategy::FreeMint { .. }));
    }

    #[tokio::test]
    async fn created_token_is_immediately_mintable() {
        let prepared = builder("2.12.1", 1)
            .prepare_create_1155(&contract(), &token(), CREATOR)
            .await
            .unwrap();

        let mint = prepared.mint.prepare_mint(&MintRequest::new(REFERRAL, 3)).unwrap();
        assert_eq!(mint.parameters.target_address, PREDICTED);
        assert_eq!(
            mint.costs.total_cost_eth,
            U256::from(3) * parse_ether("0.000777").unwrap()
        );
        let call = mint.parameters.decode::<IZoraCreator1155::mintCall>().unwrap();
        assert_eq!(call.tokenId, U256::from(1));
    }

    #[tokio::test]
    async fn referral_royalty_and_creator_mint_extend_the_setup() {
        let token = token()
            .with_create_referral(REFERRAL)
            .with_mint_to_creator_count(2)
            .with_royalty(500, REFERRAL);

        let prepared = builder("2.12.1", 1)
            .prepare_create_1155(&contract(), &token, CREATOR)
            .await
            .unwrap();
        let call = decode_factory_call(&prepared);

        assert_eq!(call.defaultRoyaltyConfiguration.royaltyBPS, 500);
        assert_eq!(call.defaultRoyaltyConfiguration.royaltyRecipient, REFERRAL);
        assert_eq!(
            selectors(&call.setupActions),
            vec![
                IZoraCreator1155::setupNewTokenWithCreateReferralCall::SELECTOR,
                IZoraCreator1155::addPermissionCall::SELECTOR,
                IZoraCreator1155::callSaleCall::SELECTOR,
                IZoraCreator1155::adminMintCall::SELECTOR,
            ]
        );

        let admin_mint = IZoraCreator1155::adminMintCall::abi_decode(&call.setupActions[3]).unwrap();
        assert_eq!(admin_mint.recipient, CREATOR);
        assert_eq!(admin_mint.quantity, U256::from(2));

        // Payout recipient receives sale proceeds when no funds recipient is set.
        let call_sale = IZoraCreator1155::callSaleCall::abi_decode(&call.setupActions[2]).unwrap();
        let set_sale = IFixedPriceSaleStrategy::setSaleCall::abi_decode(&call_sale.data).unwrap();
        assert_eq!(set_sale.salesConfig.fundsRecipient, REFERRAL);
    }

    #[tokio::test]
    async fn existing_contract_uses_next_token_id_in_a_guarded_multicall() {
        let token = token().with_royalty(250, CREATOR);
        let prepared = builder("2.7.0", 2)
            .prepare_create_1155_on_existing_contract(EXISTING, &token, CREATOR)
            .await
            .unwrap();

        assert_eq!(prepared.new_token_id, U256::from(2));
        assert_eq!(prepared.contract_address, EXISTING);
        assert_eq!(prepared.contract_version, "2.7.0");
        assert_eq!(prepared.parameters.target_address, EXISTING);

        let call = prepared
            .parameters
            .decode::<IZoraCreator1155::multicallCall>()
            .unwrap();
        assert_eq!(
            selectors(&call.data),
            vec![
                IZoraCreator1155::assumeLastTokenIdMatchesCall::SELECTOR,
                IZoraCreator1155::setupNewTokenCall::SELECTOR,
                IZoraCreator1155::updateRoyaltiesForTokenCall::SELECTOR,
                IZoraCreator1155::addPermissionCall::SELECTOR,
                IZoraCreator1155::callSaleCall::SELECTOR,
            ]
        );
        let guard =
            IZoraCreator1155::assumeLastTokenIdMatchesCall::abi_decode(&call.data[0]).unwrap();
        assert_eq!(guard.tokenId, U256::from(1));

        let royalties =
            IZoraCreator1155::updateRoyaltiesForTokenCall::abi_decode(&call.data[2]).unwrap();
        assert_eq!(royalties.tokenId, U256::from(2));
        assert_eq!(royalties.newConfiguration.royaltyBPS, 250);

        // Older contracts mint through mintWithRewards.
        let mint = prepared.mint.prepare_mint(&MintRequest::new(REFERRAL, 1)).unwrap();
        assert!(mint.parameters.decode::<IZoraCreator1155::mintWithRewardsCall>().is_some());
    }

    #[tokio::test]
    async fn timed_sale_needs_a_recent_contract() {
        let timed = token().with_sales_config(SalesConfig::Timed {
            sale_start: 0,
            sale_end: 0,
            erc20_name: None,
            erc20_symbol: None,
        });

        let err = builder("2.7.0", 2)
            .prepare_create_1155_on_existing_contract(EXISTING, &timed, CREATOR)
            .await
            .unwrap_err();
        assert!(matches!(err, PrepareError::UnsupportedContractVersion { .. }));

        let garbled = builder("not-a-version", 2)
            .prepare_create_1155_on_existing_contract(EXISTING, &timed, CREATOR)
            .await
            .unwrap_err();
        assert!(matches!(garbled, PrepareError::UnsupportedContractVersion { .. }));

        let prepared = builder("2.9.0", 2)
            .prepare_create_1155_on_existing_contract(EXISTING, &timed, CREATOR)
            .await
            .unwrap();
        assert_eq!(prepared.minter, config().timed_sale_strategy);

        let call = prepared.parameters.decode::<IZoraCreator1155::multicallCall>().unwrap();
        let call_sale = IZoraCreator1155::callSaleCall::abi_decode(&call.data[3]).unwrap();
        let set_sale = ITimedSaleStrategy::setSaleCall::abi_decode(&call_sale.data).unwrap();
        assert_eq!(set_sale.tokenId, U256::from(2));
        assert_eq!(set_sale.salesConfig.name, "Existing Collection");
        assert_eq!(set_sale.salesConfig.symbol, "EXIS");

        let mint = prepared.mint.prepare_mint(&MintRequest::new(REFERRAL, 10)).unwrap();
        assert_eq!(mint.costs.total_cost_eth, parse_ether("0.00111").unwrap());
    }

    #[tokio::test]
    async fn priced_and_allow_list_sales_pick_their_minters() {
        let erc20 = token().with_sales_config(SalesConfig::Erc20 {
            currency: REFERRAL,
            price_per_token: parse_ether("1").unwrap(),
            sale_start: 0,
            sale_end: 0,
            max_tokens_per_address: 0,
            funds_recipient: None,
        });
        let prepared = builder("2.12.1", 1)
            .prepare_create_1155(&contract(), &erc20, CREATOR)
            .await
            .unwrap();
        assert_eq!(prepared.minter, config().erc20_minter);
        let mint = prepared.mint.prepare_mint(&MintRequest::new(CREATOR, 2)).unwrap();
        let approval = mint.erc20_approval.clone().unwrap();
        assert_eq!(mint.costs.total_cost_eth, U256::ZERO);
        assert_eq!(mint.costs.total_purchase_cost, parse_ether("2").unwrap());
        assert_eq!(mint.costs.total_purchase_cost_currency, Some(REFERRAL));
        assert_eq!(approval.quantity, mint.costs.total_purchase_cost);
        assert_eq!(approval.approve_to, config().erc20_minter);

        let root = B256::repeat_byte(0x4d);
        let allow_list = token().with_sales_config(SalesConfig::AllowList {
            presale_merkle_root: root,
            sale_start: 0,
            sale_end: 0,
            funds_recipient: Some(REFERRAL),
        });
        let prepared = builder("2.12.1", 1)
            .prepare_create_1155(&contract(), &allow_list, CREATOR)
            .await
            .unwrap();
        assert_eq!(prepared.minter, config().merkle_minter);

        let call = decode_factory_call(&prepared);
        let call_sale = IZoraCreator1155::callSaleCall::abi_decode(&call.setupActions[2]).unwrap();
        let set_sale = IMerkleSaleStrategy::setSaleCall::abi_decode(&call_sale.data).unwrap();
        assert_eq!(set_sale.merkleSaleSettings.merkleRoot, root);
        assert_eq!(set_sale.merkleSaleSettings.fundsRecipient, REFERRAL);
    }

    /// The contract rejects `callSale` unless the first argument word of the
    /// minter calldata is the token id.
    fn sale_data_token_id(actions: &[Bytes]) -> U256 {
        let call_sale = actions
            .iter()
            .find_map(|action| IZoraCreator1155::callSaleCall::abi_decode(action).ok())
            .unwrap();
        assert_eq!(call_sale.tokenId, U256::from_be_slice(&call_sale.data[4..36]));
        U256::from_be_slice(&call_sale.data[4..36])
    }

    #[tokio::test]
    async fn every_sale_setup_leads_with_the_new_token_id() {
        let configs = [
            SalesConfig::free(),
            SalesConfig::FixedPrice {
                price_per_token: U256::from(10),
                sale_start: 0,
                sale_end: 0,
                max_tokens_per_address: 0,
                funds_recipient: None,
            },
            SalesConfig::Erc20 {
                currency: REFERRAL,
                price_per_token: U256::from(10),
                sale_start: 0,
                sale_end: 0,
                max_tokens_per_address: 0,
                funds_recipient: None,
            },
            SalesConfig::AllowList {
                presale_merkle_root: B256::repeat_byte(1),
                sale_start: 0,
                sale_end: 0,
                funds_recipient: None,
            },
            SalesConfig::Timed {
                sale_start: 0,
                sale_end: 0,
                erc20_name: None,
                erc20_symbol: None,
            },
        ];

        for config in configs {
            let token = token().with_sales_config(config);

            let created = builder("2.12.1", 5)
                .prepare_create_1155(&contract(), &token, CREATOR)
                .await
                .unwrap();
            let actions = decode_factory_call(&created).setupActions;
            assert_eq!(sale_data_token_id(&actions), created.new_token_id);

            let added = builder("2.12.1", 5)
                .prepare_create_1155_on_existing_contract(EXISTING, &token, CREATOR)
                .await
                .unwrap();
            let actions = added
                .parameters
                .decode::<IZoraCreator1155::multicallCall>()
                .unwrap()
                .data;
            assert_eq!(sale_data_token_id(&actions), U256::from(5));
        }
    }

    #[tokio::test]
    async fn fixed_prices_above_uint96_are_rejected() {
        let too_expensive = token().with_sales_config(SalesConfig::FixedPrice {
            price_per_token: U256::from(1u128 << 96),
            sale_start: 0,
            sale_end: 0,
            max_tokens_per_address: 0,
            funds_recipient: None,
        });
        assert!(matches!(
            builder("2.12.1", 1)
                .prepare_create_1155(&contract(), &too_expensive, CREATOR)
                .await,
            Err(PrepareError::InvalidStrategyField { field: "pricePerToken", .. })
        ));
    }

    #[tokio::test]
    async fn failed_address_prediction_is_a_lookup_failure() {
        let builder = CreateParameterBuilder::new(
            config(),
            MockReader::default(),
            MockContractInfo(ContractInfo {
                contract_version: "2.12.1".into(),
                mint_fee: U256::ZERO,
                name: String::new(),
                next_token_id: U256::from(1),
            }),
            Arc::new(FixedClock(0)),
        );
        assert!(matches!(
            builder.prepare_create_1155(&contract(), &token(), CREATOR).await,
            Err(PrepareError::ExternalLookupFailure { .. })
        ));
    }

    #[test]
    fn symbols_come_from_leading_alphanumerics() {
        assert_eq!(derive_symbol("Existing Collection"), "EXIS");
        assert_eq!(derive_symbol("a b-c"), "ABC");
        assert_eq!(derive_symbol("!!"), "ZORA");
    }
}
