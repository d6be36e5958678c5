//! Solidity interfaces of the deployed 1155 contracts, the factory and the minters.
//!
//! Only the functions and events the engine encodes or decodes are declared.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_macro::sol;
use alloy_sol_types::SolCall;

sol! {
    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    struct RoyaltyConfiguration {
        uint32 royaltyMintSchedule;
        uint32 royaltyBPS;
        address royaltyRecipient;
    }

    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    struct TokenData {
        string uri;
        uint256 maxSupply;
        uint256 totalMinted;
    }

    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    interface IZoraCreator1155Factory {
        event SetupNewContract(
            address indexed newContract,
            address indexed creator,
            address indexed defaultAdmin,
            string contractURI,
            string name,
            RoyaltyConfiguration defaultRoyaltyConfiguration
        );

        function createContractDeterministic(
            string calldata newContractURI,
            string calldata name,
            RoyaltyConfiguration calldata defaultRoyaltyConfiguration,
            address defaultAdmin,
            bytes[] calldata setupActions
        ) external returns (address);

        function deterministicContractAddress(
            address msgSender,
            string calldata newContractURI,
            string calldata name,
            address contractAdmin
        ) external view returns (address);
    }

    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    interface IZoraCreator1155 {
        event SetupNewToken(uint256 indexed tokenId, address indexed sender, string newURI, uint256 maxSupply);
        event UpdatedToken(address indexed from, uint256 indexed tokenId, TokenData tokenData);
        event Upgraded(address indexed implementation);

        function mint(
            address minter,
            uint256 tokenId,
            uint256 quantity,
            address[] calldata rewardsRecipients,
            bytes calldata minterArguments
        ) external payable;

        function mintWithRewards(
            address minter,
            uint256 tokenId,
            uint256 quantity,
            bytes calldata minterArguments,
            address mintReferral
        ) external payable;

        function setupNewToken(string calldata newURI, uint256 maxSupply) external returns (uint256);
        function setupNewTokenWithCreateReferral(
            string calldata newURI,
            uint256 maxSupply,
            address createReferral
        ) external returns (uint256);
        function assumeLastTokenIdMatches(uint256 tokenId) external view;
        function addPermission(uint256 tokenId, address user, uint256 permissionBits) external;
        function callSale(uint256 tokenId, address salesConfig, bytes calldata data) external;
        function adminMint(address recipient, uint256 tokenId, uint256 quantity, bytes calldata data) external;
        function updateRoyaltiesForToken(uint256 tokenId, RoyaltyConfiguration calldata newConfiguration) external;
        function multicall(bytes[] calldata data) external returns (bytes[] memory results);

        function contractVersion() external view returns (string memory);
        function mintFee() external view returns (uint256);
        function name() external view returns (string memory);
        function nextTokenId() external view returns (uint256);
    }
}

sol! {
    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    interface IFixedPriceSaleStrategy {
        struct SalesConfig {
            uint64 saleStart;
            uint64 saleEnd;
            uint64 maxTokensPerAddress;
            uint96 pricePerToken;
            address fundsRecipient;
        }

        function setSale(uint256 tokenId, SalesConfig calldata salesConfig) external;
    }
}

sol! {
    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    interface IMerkleSaleStrategy {
        struct MerkleSaleSettings {
            uint64 presaleStart;
            uint64 presaleEnd;
            address fundsRecipient;
            bytes32 merkleRoot;
        }

        function setSale(uint256 tokenId, MerkleSaleSettings calldata merkleSaleSettings) external;
    }
}

sol! {
    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    interface IERC20Minter {
        struct SalesConfig {
            uint64 saleStart;
            uint64 saleEnd;
            uint64 maxTokensPerAddress;
            uint256 pricePerToken;
            address fundsRecipient;
            address currency;
        }

        function setSale(uint256 tokenId, SalesConfig calldata salesConfig) external;

        function mint(
            address mintTo,
            uint256 quantity,
            address tokenAddress,
            uint256 tokenId,
            uint256 totalValue,
            address currency,
            address mintReferral,
            string calldata comment
        ) external payable;
    }
}

sol! {
    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    interface ITimedSaleStrategy {
        struct SalesConfig {
            uint64 saleStart;
            uint64 saleEnd;
            string name;
            string symbol;
        }

        /// The collection is taken from `msg.sender`, so this must be routed through `callSale`.
        function setSale(uint256 tokenId, SalesConfig calldata salesConfig) external;

        function mint(
            address mintTo,
            uint256 quantity,
            address collection,
            uint256 tokenId,
            address mintReferral,
            string calldata comment
        ) external payable;
    }
}

sol! {
    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    interface IERC721Drop {
        function mintWithRewards(
            address recipient,
            uint256 quantity,
            string calldata comment,
            address mintReferral
        ) external payable returns (uint256);
    }
}

sol! {
    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    interface IERC20 {
        function approve(address spender, uint256 value) external returns (bool);
    }
}

/// Static helpers for constructing ERC20 calls.
pub struct Erc20Helper;

impl Erc20Helper {
    /// ABI-encode an approval call for a minter.
    pub fn approve(spender: Address, value: U256) -> Bytes {
        IERC20::approveCall::new((spender, value)).abi_encode().into()
    }
}
