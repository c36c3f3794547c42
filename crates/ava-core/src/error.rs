//! Error types for the Ava core.
use thiserror::Error;

use crate::address::Address;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("malformed buffer: needed {needed} bytes, {remaining} remaining")] MalformedBuffer { needed: usize, remaining: usize },
    #[error("checksum mismatch")] Checksum,
    #[error("unknown {kind} type tag: {tag}")] UnknownTypeTag { kind: &'static str, tag: u32 },
    #[error("unsupported codec version: {0}")] InvalidCodecVersion(u16),
    #[error("invalid length: expected {expected}, got {got}")] InvalidLength { expected: usize, got: usize },
    #[error("invalid utf-8 string")] InvalidUtf8,
    #[error("trailing bytes: {0}")] TrailingBytes(usize),
    #[error("invalid base58: {0}")] Base58(String),
    #[error("{0} not in strictly ascending order")] NotSorted(&'static str),
    #[error("threshold {threshold} exceeds {available} addresses")] Threshold { threshold: u32, available: usize },
    #[error("{field} too long: {len} > {max}")] TooLong { field: &'static str, len: usize, max: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid address format: {0}")] InvalidFormat(String),
    #[error("unexpected chain alias: expected {expected}, got {got}")] UnexpectedChain { expected: String, got: String },
    #[error("unexpected HRP: expected {expected}, got {got}")] UnexpectedHrp { expected: String, got: String },
    #[error("invalid address length: {0}")] InvalidLength(usize),
    #[error("bech32: {0}")] Bech32(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid private key")] InvalidPrivateKey,
    #[error("invalid public key bytes")] InvalidPublicKey,
    #[error("invalid signature bytes")] InvalidSignature,
    #[error("signature verification failed")] VerificationFailed,
    #[error("public key recovery failed")] RecoveryFailed,
    #[error("no signing key for address {0:?}")] MissingSigningKey(Address),
    #[error("signing failed: {0}")] SigningFailed(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TxError {
    #[error("threshold {threshold} exceeds {available} addresses")] Threshold { threshold: u32, available: usize },
    #[error("memo too long: {len} > {max}")] MemoTooLong { len: usize, max: usize },
    #[error("invalid asset name: {0}")] InvalidName(String),
    #[error("invalid asset symbol: {0}")] InvalidSymbol(String),
    #[error("invalid denomination: {0}")] InvalidDenomination(u8),
    #[error("payload too long: {len} > {max}")] PayloadTooLong { len: usize, max: usize },
    #[error("address {0:?} is not an owner of the output")] AddressNotOwner(Address),
    #[error("credential count {credentials} does not match {signables} inputs and operations")] CredentialMismatch { credentials: usize, signables: usize },
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)] Codec(#[from] CodecError),
    #[error(transparent)] Address(#[from] AddressError),
    #[error(transparent)] Crypto(#[from] CryptoError),
    #[error(transparent)] Tx(#[from] TxError),
}
