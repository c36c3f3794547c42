//! Chain client contract.
//!
//! The wallet never talks to a node directly. It calls a [`ChainClient`],
//! which an application implements over whatever transport it uses. Calls
//! are blocking and made one at a time.

use serde::{Deserialize, Serialize};

use ava_core::ids::{AssetId, BlockchainId, TxId};

use crate::error::WalletError;

/// Metadata of an asset as reported by the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDescription {
    pub asset_id: AssetId,
    pub name: String,
    pub symbol: String,
    pub denomination: u8,
}

/// Acceptance state of an issued transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxStatus {
    Accepted,
    Processing,
    Rejected,
    Unknown,
}

impl TxStatus {
    /// Whether the status will not change any more.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }
}

/// Node operations the wallet depends on.
pub trait ChainClient {
    /// cb58 UTXO strings owned by any of `addresses` (address strings in
    /// `<chain>-<bech32>` form). With `source_chain`, the atomic UTXOs
    /// exported from that chain and not yet imported.
    fn get_utxos(
        &self,
        addresses: &[String],
        source_chain: Option<&BlockchainId>,
    ) -> Result<Vec<String>, WalletError>;

    /// Look up an asset by id or alias (e.g. `"AVAX"`).
    fn get_asset_description(&self, asset: &str) -> Result<AssetDescription, WalletError>;

    /// Submit a cb58-encoded signed transaction, returning its id.
    fn issue_tx(&self, tx: &str) -> Result<TxId, WalletError>;

    fn get_tx_status(&self, tx_id: &TxId) -> Result<TxStatus, WalletError>;
}
