//! Protocol constants: codec tags, field limits, denominations, and the
//! static network/chain lookup tables.
//!
//! All amounts are in base units (1 AVAX = 10^9 base units).

/// One whole unit of the native asset, in base units.
pub const ONE_AVAX: u64 = 1_000_000_000;

/// One hundredth of the native asset.
pub const CENTI_AVAX: u64 = ONE_AVAX / 100;

/// One thousandth of the native asset.
pub const MILLI_AVAX: u64 = ONE_AVAX / 1_000;

/// Default fee burned by a plain transfer, import, export, or operation tx.
pub const DEFAULT_TX_FEE: u64 = MILLI_AVAX;

/// Default fee burned by an asset creation tx.
pub const DEFAULT_CREATION_TX_FEE: u64 = CENTI_AVAX;

/// Fee ceiling below which the goose-egg check always passes.
pub const GOOSE_EGG_FEE_LIMIT: u64 = 10 * ONE_AVAX;

// --- Codec ---

/// Codec version prefixed to every unsigned tx and UTXO.
pub const LATEST_CODEC: u16 = 0;

pub const ADDRESS_LEN: usize = 20;
pub const ID_LEN: usize = 32;
pub const SIGNATURE_LEN: usize = 65;
pub const CHECKSUM_LEN: usize = 4;

/// Maximum memo length in bytes.
pub const MAX_MEMO_LEN: usize = 256;
/// Maximum asset name length in bytes.
pub const MAX_NAME_LEN: usize = 128;
/// Maximum asset symbol length in bytes.
pub const MAX_SYMBOL_LEN: usize = 4;
/// Maximum asset denomination.
pub const MAX_DENOMINATION: u8 = 32;
/// Maximum NFT payload length in bytes.
pub const MAX_NFT_PAYLOAD_LEN: usize = 1024;

// --- Type tags ---

pub const SECP_INPUT_ID: u32 = 5;
pub const SECP_MINT_OUTPUT_ID: u32 = 6;
pub const SECP_TRANSFER_OUTPUT_ID: u32 = 7;
pub const SECP_MINT_OP_ID: u32 = 8;
pub const SECP_CREDENTIAL_ID: u32 = 9;
pub const NFT_MINT_OUTPUT_ID: u32 = 10;
pub const NFT_TRANSFER_OUTPUT_ID: u32 = 11;
pub const NFT_MINT_OP_ID: u32 = 12;
pub const NFT_TRANSFER_OP_ID: u32 = 13;
pub const NFT_CREDENTIAL_ID: u32 = 14;

pub const BASE_TX_ID: u32 = 0;
pub const CREATE_ASSET_TX_ID: u32 = 1;
pub const OPERATION_TX_ID: u32 = 2;
pub const IMPORT_TX_ID: u32 = 3;
pub const EXPORT_TX_ID: u32 = 4;

/// Feature-extension id of the secp256k1 fungible fx.
pub const SECP_FX_ID: u32 = 0;
/// Feature-extension id of the NFT fx.
pub const NFT_FX_ID: u32 = 1;

// --- Networks and chains ---

pub const MAINNET_ID: u32 = 1;
pub const CASCADE_ID: u32 = 2;
pub const DENALI_ID: u32 = 3;
pub const EVEREST_ID: u32 = 4;
pub const FUJI_ID: u32 = 5;
pub const LOCAL_ID: u32 = 12345;

/// HRP used for any network id without a registered prefix.
pub const FALLBACK_HRP: &str = "custom";

/// Prefix of the string form of a private key.
pub const PRIVATE_KEY_PREFIX: &str = "PrivateKey-";

/// Human-readable bech32 prefix for a network id.
///
/// # Examples
///
/// ```
/// use ava_core::constants::{hrp_for_network, MAINNET_ID, FUJI_ID};
/// assert_eq!(hrp_for_network(MAINNET_ID), "avax");
/// assert_eq!(hrp_for_network(FUJI_ID), "fuji");
/// assert_eq!(hrp_for_network(9999), "custom");
/// ```
pub fn hrp_for_network(network_id: u32) -> &'static str {
    match network_id {
        MAINNET_ID => "avax",
        CASCADE_ID => "cascade",
        DENALI_ID => "denali",
        EVEREST_ID => "everest",
        FUJI_ID => "fuji",
        LOCAL_ID => "local",
        _ => FALLBACK_HRP,
    }
}

/// Short alias of a chain, used as the address string prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ChainAlias {
    /// Asset exchange chain.
    X,
    /// Platform chain (validators and subnets).
    P,
    /// Contract chain. Only its address alias is known here.
    C,
}

impl ChainAlias {
    /// The alias as it appears before the `-` separator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X => "X",
            Self::P => "P",
            Self::C => "C",
        }
    }

    /// Look up an alias from its string form.
    pub fn from_alias(s: &str) -> Option<Self> {
        match s {
            "X" => Some(Self::X),
            "P" => Some(Self::P),
            "C" => Some(Self::C),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChainAlias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
