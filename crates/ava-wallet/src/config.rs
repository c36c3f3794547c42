//! Wallet configuration.
//!
//! [`WalletConfig`] defaults to a local network X chain. It can be built
//! programmatically or loaded from a JSON file; missing fields keep their
//! defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use ava_core::constants::{
    ChainAlias, DEFAULT_CREATION_TX_FEE, DEFAULT_TX_FEE, LOCAL_ID, hrp_for_network,
};
use ava_core::ids::{AssetId, BlockchainId, Id};

use crate::builder::TransactionBuilder;
use crate::error::WalletError;

/// Configuration for one wallet on one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub network_id: u32,
    pub chain: ChainAlias,
    /// Id of the chain transactions are built for.
    pub blockchain_id: BlockchainId,
    /// Asset fees are paid in. Resolved through the chain client when unset.
    pub native_asset_id: Option<AssetId>,
    pub tx_fee: u64,
    pub creation_fee: u64,
    /// Node endpoint handed to the chain client.
    pub rpc_url: String,
    /// Log level filter string (e.g. "info", "ava_wallet=debug").
    pub log_level: String,
    /// "text" or "json".
    pub log_format: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            network_id: LOCAL_ID,
            chain: ChainAlias::X,
            blockchain_id: Id::ZERO,
            native_asset_id: None,
            tx_fee: DEFAULT_TX_FEE,
            creation_fee: DEFAULT_CREATION_TX_FEE,
            rpc_url: "http://127.0.0.1:9650".to_string(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

impl WalletConfig {
    pub fn from_json_str(s: &str) -> Result<Self, WalletError> {
        serde_json::from_str(s).map_err(|e| WalletError::Config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, WalletError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| WalletError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String, WalletError> {
        serde_json::to_string_pretty(self).map_err(|e| WalletError::Config(e.to_string()))
    }

    /// Bech32 prefix for addresses on this network.
    pub fn hrp(&self) -> &'static str {
        hrp_for_network(self.network_id)
    }

    /// Builder configured with this network, chain and fees.
    pub fn builder(&self, fee_asset_id: AssetId) -> TransactionBuilder {
        let mut builder = TransactionBuilder::new(self.network_id, self.blockchain_id, fee_asset_id);
        builder.set_tx_fee(self.tx_fee).set_creation_fee(self.creation_fee);
        builder
    }
}
