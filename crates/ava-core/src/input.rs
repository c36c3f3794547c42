//! Inputs: references to UTXOs being consumed, plus the signature indices
//! that authorize spending them.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

use crate::address::Address;
use crate::codec::{Decode, Encode, Reader, Writer};
use crate::constants::SECP_INPUT_ID;
use crate::credential::CredentialKind;
use crate::error::{CodecError, TxError};
use crate::ids::AssetId;
use crate::owners::OutputOwners;
use crate::utxo::UtxoId;

/// Which owner signs, by position in the spent output's address list.
///
/// Only `address_index` goes on the wire. `source` is the address whose key
/// must produce the signature; it is zero after decoding.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SigIdx {
    pub address_index: u32,
    pub source: Address,
}

impl SigIdx {
    pub fn new(address_index: u32, source: Address) -> Self {
        Self {
            address_index,
            source,
        }
    }

    /// Signature indices for `spenders`, located in `owners`.
    ///
    /// Every spender must be an owner; a miss means the caller picked
    /// spenders from some other output.
    pub fn for_spenders(owners: &OutputOwners, spenders: &[Address]) -> Result<Vec<Self>, TxError> {
        spenders
            .iter()
            .map(|addr| {
                owners
                    .address_index(addr)
                    .map(|idx| Self::new(idx, *addr))
                    .ok_or(TxError::AddressNotOwner(*addr))
            })
            .collect()
    }
}

impl PartialEq for SigIdx {
    fn eq(&self, other: &Self) -> bool {
        self.address_index == other.address_index
    }
}

impl Eq for SigIdx {}

impl Hash for SigIdx {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address_index.hash(state);
    }
}

impl Encode for SigIdx {
    fn encode_into(&self, w: &mut Writer) {
        w.put_u32(self.address_index);
    }
}

impl Decode for SigIdx {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self::new(r.get_u32()?, Address::default()))
    }
}

pub(crate) fn decode_sig_idxs(r: &mut Reader<'_>) -> Result<Vec<SigIdx>, CodecError> {
    r.get_list(4)
}

/// Spend of a fungible transfer output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecpTransferInput {
    pub amount: u64,
    pub sig_idxs: Vec<SigIdx>,
}

impl SecpTransferInput {
    pub fn new(amount: u64, sig_idxs: Vec<SigIdx>) -> Self {
        Self { amount, sig_idxs }
    }
}

impl Encode for SecpTransferInput {
    fn encode_into(&self, w: &mut Writer) {
        w.put_u64(self.amount);
        w.put_list(&self.sig_idxs);
    }
}

impl Decode for SecpTransferInput {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            amount: r.get_u64()?,
            sig_idxs: decode_sig_idxs(r)?,
        })
    }
}

/// Any input, tagged by its input id on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Input {
    SecpTransfer(SecpTransferInput),
}

impl Input {
    pub fn input_id(&self) -> u32 {
        match self {
            Self::SecpTransfer(_) => SECP_INPUT_ID,
        }
    }

    /// Credential type that must accompany this input.
    pub fn credential_kind(&self) -> CredentialKind {
        match self {
            Self::SecpTransfer(_) => CredentialKind::Secp,
        }
    }

    pub fn credential_id(&self) -> u32 {
        self.credential_kind().credential_id()
    }

    pub fn amount(&self) -> u64 {
        match self {
            Self::SecpTransfer(i) => i.amount,
        }
    }

    pub fn sig_idxs(&self) -> &[SigIdx] {
        match self {
            Self::SecpTransfer(i) => &i.sig_idxs,
        }
    }
}

impl Encode for Input {
    fn encode_into(&self, w: &mut Writer) {
        w.put_u32(self.input_id());
        match self {
            Self::SecpTransfer(i) => i.encode_into(w),
        }
    }
}

impl Decode for Input {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        match r.get_u32()? {
            SECP_INPUT_ID => Ok(Self::SecpTransfer(SecpTransferInput::decode(r)?)),
            tag => Err(CodecError::UnknownTypeTag { kind: "input", tag }),
        }
    }
}

impl From<SecpTransferInput> for Input {
    fn from(i: SecpTransferInput) -> Self {
        Self::SecpTransfer(i)
    }
}

/// An input bound to the UTXO it consumes and that UTXO's asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransferableInput {
    pub utxo_id: UtxoId,
    pub asset_id: AssetId,
    pub input: Input,
}

impl TransferableInput {
    pub fn new(utxo_id: UtxoId, asset_id: AssetId, input: impl Into<Input>) -> Self {
        Self {
            utxo_id,
            asset_id,
            input: input.into(),
        }
    }
}

impl Encode for TransferableInput {
    fn encode_into(&self, w: &mut Writer) {
        self.utxo_id.encode_into(w);
        self.asset_id.encode_into(w);
        self.input.encode_into(w);
    }
}

impl Decode for TransferableInput {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            utxo_id: UtxoId::decode(r)?,
            asset_id: AssetId::decode(r)?,
            input: Input::decode(r)?,
        })
    }
}
