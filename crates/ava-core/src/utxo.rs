//! Unspent outputs and their identifiers.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::cb58;
use crate::codec::{Decode, Encode, Reader, Writer};
use crate::constants::LATEST_CODEC;
use crate::error::CodecError;
use crate::ids::{AssetId, TxId};
use crate::output::Output;

/// `txID ‖ outputIndex`. Ordering follows the encoded bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct UtxoId {
    pub tx_id: TxId,
    pub output_index: u32,
}

impl UtxoId {
    pub fn new(tx_id: TxId, output_index: u32) -> Self {
        Self {
            tx_id,
            output_index,
        }
    }

    pub fn to_cb58(&self) -> String {
        cb58::encode(&self.to_bytes())
    }

    pub fn from_cb58(s: &str) -> Result<Self, CodecError> {
        Self::from_bytes(&cb58::decode(s)?)
    }
}

impl fmt::Display for UtxoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_cb58())
    }
}

impl fmt::Debug for UtxoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UtxoId({}:{})", self.tx_id, self.output_index)
    }
}

impl FromStr for UtxoId {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_cb58(s)
    }
}

impl Encode for UtxoId {
    fn encode_into(&self, w: &mut Writer) {
        self.tx_id.encode_into(w);
        w.put_u32(self.output_index);
    }
}

impl Decode for UtxoId {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            tx_id: TxId::decode(r)?,
            output_index: r.get_u32()?,
        })
    }
}

impl Serialize for UtxoId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_cb58())
    }
}

impl<'de> Deserialize<'de> for UtxoId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_cb58(&s).map_err(serde::de::Error::custom)
    }
}

/// A spendable output as returned by a node.
///
/// Encoded with a leading codec version, the same way it arrives over RPC.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Utxo {
    pub utxo_id: UtxoId,
    pub asset_id: AssetId,
    pub output: Output,
}

impl Utxo {
    pub fn new(utxo_id: UtxoId, asset_id: AssetId, output: impl Into<Output>) -> Self {
        Self {
            utxo_id,
            asset_id,
            output: output.into(),
        }
    }

    pub fn tx_id(&self) -> TxId {
        self.utxo_id.tx_id
    }

    pub fn output_index(&self) -> u32 {
        self.utxo_id.output_index
    }

    pub fn to_cb58(&self) -> String {
        cb58::encode(&self.to_bytes())
    }

    pub fn from_cb58(s: &str) -> Result<Self, CodecError> {
        Self::from_bytes(&cb58::decode(s)?)
    }
}

impl Encode for Utxo {
    fn encode_into(&self, w: &mut Writer) {
        w.put_u16(LATEST_CODEC);
        self.utxo_id.encode_into(w);
        self.asset_id.encode_into(w);
        self.output.encode_into(w);
    }
}

impl Decode for Utxo {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let codec = r.get_u16()?;
        if codec != LATEST_CODEC {
            return Err(CodecError::InvalidCodecVersion(codec));
        }
        Ok(Self {
            utxo_id: UtxoId::decode(r)?,
            asset_id: AssetId::decode(r)?,
            output: Output::decode(r)?,
        })
    }
}
