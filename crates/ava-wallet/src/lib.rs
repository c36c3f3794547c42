//! # ava-wallet: client-side wallet state and transaction building.
//!
//! Holds keys and tracked UTXOs, selects inputs, builds every transaction
//! variant with the fee guard applied, and signs the result. Talking to a
//! node goes through the [`ChainClient`] trait, which callers implement.
//!
//! # Modules
//!
//! - [`error`]: `WalletError` enum
//! - [`keys`]: KeyChain of secp256k1 keys by address
//! - [`utxo_set`]: UTXO set with address index and set algebra
//! - [`coin_selection`]: First-fit multi-asset selection
//! - [`builder`]: Transaction builder and goose-egg fee check
//! - [`rpc`]: Chain client contract
//! - [`config`]: Wallet configuration
//! - [`logging`]: Tracing subscriber setup
//! - [`wallet`]: High-level wallet composition

pub mod builder;
pub mod coin_selection;
pub mod config;
pub mod error;
pub mod keys;
pub mod logging;
pub mod rpc;
pub mod utxo_set;
pub mod wallet;

// Re-exports for convenient access
pub use builder::{SpendOptions, TransactionBuilder, goose_egg_check};
pub use coin_selection::{AssetRequest, CoinSelection, CoinSelector};
pub use config::WalletConfig;
pub use error::WalletError;
pub use keys::KeyChain;
pub use logging::init_logging;
pub use rpc::{AssetDescription, ChainClient, TxStatus};
pub use utxo_set::{MergeRule, UtxoSet};
pub use wallet::Wallet;
