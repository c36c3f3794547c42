//! # ava-core
//! Canonical codec, ownership model, transaction types and signing for the
//! Ava X and P chains.

pub mod address;
pub mod base_tx;
pub mod cb58;
pub mod codec;
pub mod constants;
pub mod credential;
pub mod crypto;
pub mod error;
pub mod genesis;
pub mod ids;
pub mod initial_states;
pub mod input;
pub mod operation;
pub mod output;
pub mod owners;
pub mod traits;
pub mod tx;
pub mod utxo;
