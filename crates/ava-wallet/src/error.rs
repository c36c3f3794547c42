//! Wallet error types.

use ava_core::error::{AddressError, CodecError, CryptoError, TxError};
use ava_core::ids::AssetId;
use ava_core::utxo::UtxoId;
use thiserror::Error;

/// Errors that can occur in wallet operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// Spendable UTXOs of the asset do not cover the request plus fees.
    #[error("insufficient funds of {asset}: have {have}, need {need}")]
    InsufficientFunds {
        /// Asset that ran short.
        asset: AssetId,
        /// Spendable amount found.
        have: u64,
        /// Amount required.
        need: u64,
    },

    /// Fee is both above the absolute limit and larger than the value moved.
    #[error("goose egg check failed: fee {fee} exceeds output total {output_total}")]
    GooseEgg {
        /// Amount burned.
        fee: u64,
        /// Amount of the fee asset sent to outputs.
        output_total: u64,
    },

    /// UTXO already present in the set.
    #[error("duplicate UTXO: {0}")]
    DuplicateUtxo(UtxoId),

    /// UTXO not present in the set.
    #[error("unknown UTXO: {0}")]
    UnknownUtxo(UtxoId),

    /// No spendable UTXO matched the request.
    #[error("no spendable UTXOs")]
    NoSpendableUtxos,

    /// Invalid amount or amount combination.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Required key not found in the keychain.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// Failure reported by the chain client.
    #[error("rpc: {0}")]
    Rpc(String),

    /// Invalid or unreadable configuration.
    #[error("config: {0}")]
    Config(String),

    /// Logging could not be initialized.
    #[error("logging: {0}")]
    Logging(String),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Tx(#[from] TxError),
}

impl From<ava_core::error::CoreError> for WalletError {
    fn from(e: ava_core::error::CoreError) -> Self {
        use ava_core::error::CoreError;
        match e {
            CoreError::Codec(e) => Self::Codec(e),
            CoreError::Address(e) => Self::Address(e),
            CoreError::Crypto(e) => Self::Crypto(e),
            CoreError::Tx(e) => Self::Tx(e),
        }
    }
}
