//! Output variants and the asset-tagged [`TransferableOutput`] wrapper.
//!
//! Each variant is a plain data struct whose encoding is its body only; the
//! [`Output`] enum adds the `u32` type tag and owns the tag → decoder
//! dispatch table.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::codec::{Decode, Encode, Reader, Writer};
use crate::constants::{
    MAX_NFT_PAYLOAD_LEN, NFT_FX_ID, NFT_MINT_OUTPUT_ID, NFT_TRANSFER_OUTPUT_ID, SECP_FX_ID,
    SECP_MINT_OUTPUT_ID, SECP_TRANSFER_OUTPUT_ID,
};
use crate::error::{CodecError, TxError};
use crate::ids::AssetId;
use crate::owners::OutputOwners;

/// Fungible amount owned by an [`OutputOwners`] set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecpTransferOutput {
    pub amount: u64,
    pub owners: OutputOwners,
}

impl SecpTransferOutput {
    pub fn new(amount: u64, owners: OutputOwners) -> Self {
        Self { amount, owners }
    }
}

impl Encode for SecpTransferOutput {
    fn encode_into(&self, w: &mut Writer) {
        w.put_u64(self.amount);
        self.owners.encode_into(w);
    }
}

impl Decode for SecpTransferOutput {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            amount: r.get_u64()?,
            owners: OutputOwners::decode(r)?,
        })
    }
}

/// Authority to mint more of a variable-cap fungible asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecpMintOutput {
    pub owners: OutputOwners,
}

impl Encode for SecpMintOutput {
    fn encode_into(&self, w: &mut Writer) {
        self.owners.encode_into(w);
    }
}

impl Decode for SecpMintOutput {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            owners: OutputOwners::decode(r)?,
        })
    }
}

/// Authority to mint NFTs of one group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NftMintOutput {
    pub group_id: u32,
    pub owners: OutputOwners,
}

impl Encode for NftMintOutput {
    fn encode_into(&self, w: &mut Writer) {
        w.put_u32(self.group_id);
        self.owners.encode_into(w);
    }
}

impl Decode for NftMintOutput {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            group_id: r.get_u32()?,
            owners: OutputOwners::decode(r)?,
        })
    }
}

/// A single NFT: its group, an opaque payload, and its owners.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NftTransferOutput {
    pub group_id: u32,
    pub payload: Vec<u8>,
    pub owners: OutputOwners,
}

impl NftTransferOutput {
    pub fn new(group_id: u32, payload: Vec<u8>, owners: OutputOwners) -> Result<Self, TxError> {
        check_payload(&payload)?;
        Ok(Self {
            group_id,
            payload,
            owners,
        })
    }
}

/// Reject NFT payloads over the protocol limit.
pub fn check_payload(payload: &[u8]) -> Result<(), TxError> {
    if payload.len() > MAX_NFT_PAYLOAD_LEN {
        return Err(TxError::PayloadTooLong {
            len: payload.len(),
            max: MAX_NFT_PAYLOAD_LEN,
        });
    }
    Ok(())
}

impl Encode for NftTransferOutput {
    fn encode_into(&self, w: &mut Writer) {
        w.put_u32(self.group_id);
        w.put_bytes(&self.payload);
        self.owners.encode_into(w);
    }
}

impl Decode for NftTransferOutput {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            group_id: r.get_u32()?,
            payload: r.get_bytes()?,
            owners: OutputOwners::decode(r)?,
        })
    }
}

/// Any output, tagged by its output id on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Output {
    SecpTransfer(SecpTransferOutput),
    SecpMint(SecpMintOutput),
    NftMint(NftMintOutput),
    NftTransfer(NftTransferOutput),
}

impl Output {
    /// Stable numeric tag used by the codec and the canonical sort.
    pub fn output_id(&self) -> u32 {
        match self {
            Self::SecpTransfer(_) => SECP_TRANSFER_OUTPUT_ID,
            Self::SecpMint(_) => SECP_MINT_OUTPUT_ID,
            Self::NftMint(_) => NFT_MINT_OUTPUT_ID,
            Self::NftTransfer(_) => NFT_TRANSFER_OUTPUT_ID,
        }
    }

    /// Feature extension the output belongs to.
    pub fn fx_id(&self) -> u32 {
        match self {
            Self::SecpTransfer(_) | Self::SecpMint(_) => SECP_FX_ID,
            Self::NftMint(_) | Self::NftTransfer(_) => NFT_FX_ID,
        }
    }

    pub fn owners(&self) -> &OutputOwners {
        match self {
            Self::SecpTransfer(o) => &o.owners,
            Self::SecpMint(o) => &o.owners,
            Self::NftMint(o) => &o.owners,
            Self::NftTransfer(o) => &o.owners,
        }
    }

    /// Amount of a plain transfer output; `None` for every other variant.
    pub fn amount(&self) -> Option<u64> {
        match self {
            Self::SecpTransfer(o) => Some(o.amount),
            _ => None,
        }
    }

    pub fn addresses(&self) -> &[Address] {
        self.owners().addresses()
    }

    pub fn locktime(&self) -> u64 {
        self.owners().locktime()
    }

    pub fn meets_threshold(&self, candidates: &[Address], as_of: u64) -> bool {
        self.owners().meets_threshold(candidates, as_of)
    }

    pub fn spenders(&self, candidates: &[Address], as_of: u64) -> Vec<Address> {
        self.owners().spenders(candidates, as_of)
    }

    pub fn address_index(&self, address: &Address) -> Option<u32> {
        self.owners().address_index(address)
    }

    /// Decode the body of an output whose tag has already been read.
    pub fn decode_body(output_id: u32, r: &mut Reader<'_>) -> Result<Self, CodecError> {
        match output_id {
            SECP_TRANSFER_OUTPUT_ID => Ok(Self::SecpTransfer(SecpTransferOutput::decode(r)?)),
            SECP_MINT_OUTPUT_ID => Ok(Self::SecpMint(SecpMintOutput::decode(r)?)),
            NFT_MINT_OUTPUT_ID => Ok(Self::NftMint(NftMintOutput::decode(r)?)),
            NFT_TRANSFER_OUTPUT_ID => Ok(Self::NftTransfer(NftTransferOutput::decode(r)?)),
            tag => Err(CodecError::UnknownTypeTag { kind: "output", tag }),
        }
    }

    fn encode_body(&self, w: &mut Writer) {
        match self {
            Self::SecpTransfer(o) => o.encode_into(w),
            Self::SecpMint(o) => o.encode_into(w),
            Self::NftMint(o) => o.encode_into(w),
            Self::NftTransfer(o) => o.encode_into(w),
        }
    }
}

/// Tag followed by body.
impl Encode for Output {
    fn encode_into(&self, w: &mut Writer) {
        w.put_u32(self.output_id());
        self.encode_body(w);
    }
}

impl Decode for Output {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let tag = r.get_u32()?;
        Self::decode_body(tag, r)
    }
}

impl From<SecpTransferOutput> for Output {
    fn from(o: SecpTransferOutput) -> Self {
        Self::SecpTransfer(o)
    }
}

impl From<SecpMintOutput> for Output {
    fn from(o: SecpMintOutput) -> Self {
        Self::SecpMint(o)
    }
}

impl From<NftMintOutput> for Output {
    fn from(o: NftMintOutput) -> Self {
        Self::NftMint(o)
    }
}

impl From<NftTransferOutput> for Output {
    fn from(o: NftTransferOutput) -> Self {
        Self::NftTransfer(o)
    }
}

/// An output paired with the asset it carries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransferableOutput {
    pub asset_id: AssetId,
    pub output: Output,
}

impl TransferableOutput {
    pub fn new(asset_id: AssetId, output: impl Into<Output>) -> Self {
        Self {
            asset_id,
            output: output.into(),
        }
    }

    /// Plain transfer of `amount` to `owners`.
    pub fn transfer(asset_id: AssetId, amount: u64, owners: OutputOwners) -> Self {
        Self::new(asset_id, SecpTransferOutput::new(amount, owners))
    }
}

impl Encode for TransferableOutput {
    fn encode_into(&self, w: &mut Writer) {
        self.asset_id.encode_into(w);
        self.output.encode_into(w);
    }
}

impl Decode for TransferableOutput {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            asset_id: AssetId::decode(r)?,
            output: Output::decode(r)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::Id;

    fn owners(b: u8) -> OutputOwners {
        OutputOwners::single(Address([b; 20]))
    }

    #[test]
    fn output_ids() {
        assert_eq!(Output::from(SecpTransferOutput::new(1, owners(1))).output_id(), 7);
        assert_eq!(Output::from(SecpMintOutput { owners: owners(1) }).output_id(), 6);
        assert_eq!(Output::from(NftMintOutput { group_id: 0, owners: owners(1) }).output_id(), 10);
        let nft = NftTransferOutput::new(0, vec![1], owners(1)).unwrap();
        assert_eq!(Output::from(nft).output_id(), 11);
    }

    #[test]
    fn fx_ids() {
        assert_eq!(Output::from(SecpMintOutput { owners: owners(1) }).fx_id(), SECP_FX_ID);
        assert_eq!(Output::from(NftMintOutput { group_id: 0, owners: owners(1) }).fx_id(), NFT_FX_ID);
    }

    #[test]
    fn amount_only_for_transfer() {
        assert_eq!(Output::from(SecpTransferOutput::new(42, owners(1))).amount(), Some(42));
        assert_eq!(Output::from(SecpMintOutput { owners: owners(1) }).amount(), None);
    }

    #[test]
    fn transfer_output_layout() {
        let out = TransferableOutput::transfer(Id([0xAA; 32]), 5, owners(2));
        let bytes = out.to_bytes();
        assert_eq!(&bytes[..32], &[0xAA; 32]);
        assert_eq!(&bytes[32..36], &SECP_TRANSFER_OUTPUT_ID.to_be_bytes());
        assert_eq!(&bytes[36..44], &5u64.to_be_bytes());
        assert_eq!(bytes.len(), 32 + 4 + 8 + 8 + 4 + 4 + 20);
    }

    #[test]
    fn nft_mint_output_serializes_every_owner() {
        let many = OutputOwners::new(vec![Address([1; 20]), Address([2; 20])], 0, 1).unwrap();
        let out = Output::from(NftMintOutput { group_id: 3, owners: many.clone() });
        let bytes = out.to_bytes();
        assert_eq!(bytes.len(), 4 + 4 + 8 + 4 + 4 + 40);
        assert_eq!(Output::from_bytes(&bytes).unwrap(), out);
    }

    #[test]
    fn nft_transfer_round_trip() {
        let out = Output::from(NftTransferOutput::new(9, b"ipfs://x".to_vec(), owners(4)).unwrap());
        assert_eq!(Output::from_bytes(&out.to_bytes()).unwrap(), out);
    }

    #[test]
    fn oversized_payload_rejected() {
        let err = NftTransferOutput::new(0, vec![0; MAX_NFT_PAYLOAD_LEN + 1], owners(1)).unwrap_err();
        assert!(matches!(err, TxError::PayloadTooLong { .. }));
    }

    #[test]
    fn unknown_tag_rejected() {
        let mut bytes = 99u32.to_be_bytes().to_vec();
        bytes.extend_from_slice(&[0u8; 16]);
        assert_eq!(
            Output::from_bytes(&bytes).unwrap_err(),
            CodecError::UnknownTypeTag { kind: "output", tag: 99 }
        );
    }

    #[test]
    fn truncated_output_rejected() {
        let bytes = TransferableOutput::transfer(Id([1; 32]), 5, owners(2)).to_bytes();
        assert!(matches!(
            TransferableOutput::from_bytes(&bytes[..bytes.len() - 1]).unwrap_err(),
            CodecError::MalformedBuffer { .. }
        ));
    }
}
