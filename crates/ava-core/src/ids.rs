//! Fixed 32-byte identifiers for assets, transactions, and blockchains.
//!
//! Ids are opaque outside equality and ordering. Their external string
//! form is cb58.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::cb58;
use crate::codec::{Decode, Encode, Reader, Writer};
use crate::constants::ID_LEN;
use crate::error::CodecError;

/// A 32-byte identifier ordered by raw byte comparison.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Id(pub [u8; ID_LEN]);

/// Identifier of an asset.
pub type AssetId = Id;
/// Identifier of a transaction.
pub type TxId = Id;
/// Identifier of a blockchain.
pub type BlockchainId = Id;

impl Id {
    /// The all-zero id, used as the blockchain id of genesis assets.
    pub const ZERO: Self = Self([0u8; ID_LEN]);

    pub fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Build an id from a slice that must be exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CodecError> {
        let arr: [u8; ID_LEN] = bytes.try_into().map_err(|_| CodecError::InvalidLength {
            expected: ID_LEN,
            got: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ID_LEN]
    }

    pub fn to_cb58(&self) -> String {
        cb58::encode(&self.0)
    }

    pub fn from_cb58(s: &str) -> Result<Self, CodecError> {
        Self::from_slice(&cb58::decode(s)?)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_cb58())
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.to_cb58())
    }
}

impl FromStr for Id {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_cb58(s)
    }
}

impl From<[u8; ID_LEN]> for Id {
    fn from(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Id {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Encode for Id {
    fn encode_into(&self, w: &mut Writer) {
        w.put_fixed(&self.0);
    }
}

impl Decode for Id {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self(r.get_array()?))
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_cb58())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_cb58(&s).map_err(serde::de::Error::custom)
    }
}
