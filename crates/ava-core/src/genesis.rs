//! Genesis assets of an asset-exchange chain.
//!
//! Genesis assets reuse the create-asset layout, prefixed with a short
//! alias. They are never signed or issued.

use serde::{Deserialize, Serialize};

use crate::base_tx::BaseTx;
use crate::codec::{Decode, Encode, Reader, Writer};
use crate::constants::{CREATE_ASSET_TX_ID, LATEST_CODEC};
use crate::crypto::sha256;
use crate::error::{CodecError, TxError};
use crate::ids::{AssetId, Id};
use crate::initial_states::InitialStates;
use crate::tx::CreateAssetTx;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisAsset {
    pub alias: String,
    pub asset: CreateAssetTx,
}

impl GenesisAsset {
    /// A genesis asset on `network_id`. Its base fields carry no inputs or
    /// outputs and the zero blockchain id.
    pub fn new(
        alias: impl Into<String>,
        network_id: u32,
        name: &str,
        symbol: &str,
        denomination: u8,
        initial_states: InitialStates,
        memo: Vec<u8>,
    ) -> Result<Self, TxError> {
        let base = BaseTx::new(network_id, Id::ZERO, Vec::new(), Vec::new(), memo)?;
        Ok(Self {
            alias: alias.into(),
            asset: CreateAssetTx::new(base, name, symbol, denomination, initial_states)?,
        })
    }

    /// Asset id: SHA-256 of the create-asset bytes, as the chain derives it
    /// for a genesis transaction.
    pub fn asset_id(&self) -> AssetId {
        let mut w = Writer::new();
        w.put_u16(LATEST_CODEC);
        w.put_u32(CREATE_ASSET_TX_ID);
        self.asset.encode_into(&mut w);
        Id::from_bytes(sha256(&w.into_bytes()))
    }
}

impl Encode for GenesisAsset {
    fn encode_into(&self, w: &mut Writer) {
        w.put_str16(&self.alias);
        self.asset.encode_into(w);
    }
}

impl Decode for GenesisAsset {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let alias = r.get_str16()?;
        let base = BaseTx::decode(r)?;
        Ok(Self {
            alias,
            asset: CreateAssetTx::decode_with_base(base, r)?,
        })
    }
}

/// The full genesis asset list. Assets encode in alias order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GenesisData {
    pub assets: Vec<GenesisAsset>,
}

impl GenesisData {
    pub fn new(assets: Vec<GenesisAsset>) -> Self {
        Self { assets }
    }

    pub fn get(&self, alias: &str) -> Option<&GenesisAsset> {
        self.assets.iter().find(|a| a.alias == alias)
    }
}

impl Encode for GenesisData {
    fn encode_into(&self, w: &mut Writer) {
        let mut sorted: Vec<&GenesisAsset> = self.assets.iter().collect();
        sorted.sort_by(|a, b| a.alias.cmp(&b.alias));
        w.put_u16(LATEST_CODEC);
        w.put_u32(sorted.len() as u32);
        for asset in sorted {
            asset.encode_into(w);
        }
    }
}

impl Decode for GenesisData {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let codec = r.get_u16()?;
        if codec != LATEST_CODEC {
            return Err(CodecError::InvalidCodecVersion(codec));
        }
        // alias prefix + empty base + name/symbol prefixes + denomination + states count
        let assets = r.get_list(2 + 48 + 4 + 1 + 4)?;
        Ok(Self { assets })
    }
}
