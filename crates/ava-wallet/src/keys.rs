//! Keychain: the set of secp256k1 keys a wallet controls, indexed by the
//! address each key derives.

use std::collections::BTreeMap;
use std::fmt;

use ava_core::address::{Address, format_address, parse_address_for};
use ava_core::constants::ChainAlias;
use ava_core::crypto::KeyPair;
use ava_core::traits::KeyStore;

use crate::error::WalletError;

/// Keys for one chain on one network.
///
/// Addresses iterate in ascending byte order, which is also the order
/// [`addresses`](Self::addresses) returns them in.
#[derive(Clone)]
pub struct KeyChain {
    hrp: String,
    chain: ChainAlias,
    keys: BTreeMap<Address, KeyPair>,
}

impl KeyChain {
    pub fn new(hrp: impl Into<String>, chain: ChainAlias) -> Self {
        Self {
            hrp: hrp.into(),
            chain,
            keys: BTreeMap::new(),
        }
    }

    /// Generate a fresh key and return its address.
    pub fn make_key(&mut self) -> Address {
        self.add_keypair(KeyPair::generate())
    }

    pub fn add_keypair(&mut self, keypair: KeyPair) -> Address {
        let address = keypair.address();
        self.keys.insert(address, keypair);
        address
    }

    /// Import a raw 32-byte secret.
    pub fn import_secret(&mut self, secret: &[u8]) -> Result<Address, WalletError> {
        Ok(self.add_keypair(KeyPair::from_secret_bytes(secret)?))
    }

    /// Import a `PrivateKey-<cb58>` string.
    pub fn import_key(&mut self, private_key: &str) -> Result<Address, WalletError> {
        Ok(self.add_keypair(KeyPair::from_private_key_string(private_key)?))
    }

    pub fn remove_key(&mut self, address: &Address) -> bool {
        self.keys.remove(address).is_some()
    }

    pub fn get(&self, address: &Address) -> Option<&KeyPair> {
        self.keys.get(address)
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.keys.keys().copied().collect()
    }

    /// Human-readable `<chain>-<bech32>` strings of every held address.
    pub fn address_strings(&self) -> Result<Vec<String>, WalletError> {
        self.keys
            .keys()
            .map(|a| format_address(self.chain.as_str(), &self.hrp, a).map_err(WalletError::from))
            .collect()
    }

    /// Parse an address string for this keychain's chain and network.
    pub fn parse_address(&self, s: &str) -> Result<Address, WalletError> {
        Ok(parse_address_for(s, self.chain, &self.hrp)?)
    }

    pub fn hrp(&self) -> &str {
        &self.hrp
    }

    pub fn chain(&self) -> ChainAlias {
        self.chain
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl KeyStore for KeyChain {
    fn keypair(&self, address: &Address) -> Option<&KeyPair> {
        self.keys.get(address)
    }
}

impl fmt::Debug for KeyChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyChain")
            .field("hrp", &self.hrp)
            .field("chain", &self.chain)
            .field("keys", &self.keys.len())
            .finish()
    }
}
