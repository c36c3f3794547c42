//! Trait interfaces between the core and its callers.
//!
//! - [`KeyStore`]: address-indexed signing keys (ava-wallet's keychain implements)

use crate::address::Address;
use crate::crypto::KeyPair;

/// Lookup of signing keys by the address they control.
///
/// Signing walks every `SigIdx` of a transaction and asks the store for the
/// key behind its source address; a `None` aborts the whole signature.
pub trait KeyStore {
    /// Key pair for `address`, if held.
    fn keypair(&self, address: &Address) -> Option<&KeyPair>;

    /// Whether a key for `address` is held.
    fn has_key(&self, address: &Address) -> bool {
        self.keypair(address).is_some()
    }
}

impl KeyStore for [KeyPair] {
    fn keypair(&self, address: &Address) -> Option<&KeyPair> {
        self.iter().find(|kp| &kp.address() == address)
    }
}

impl KeyStore for Vec<KeyPair> {
    fn keypair(&self, address: &Address) -> Option<&KeyPair> {
        self.as_slice().keypair(address)
    }
}
