//! Operations: typed state transitions on non-fungible or mintable UTXOs,
//! carried by an operation transaction.

use serde::{Deserialize, Serialize};

use crate::codec::{Decode, Encode, Reader, Writer};
use crate::constants::{NFT_MINT_OP_ID, NFT_TRANSFER_OP_ID, SECP_MINT_OP_ID};
use crate::credential::CredentialKind;
use crate::error::{CodecError, TxError};
use crate::ids::AssetId;
use crate::input::{SigIdx, decode_sig_idxs};
use crate::output::{NftTransferOutput, SecpMintOutput, SecpTransferOutput, check_payload};
use crate::owners::OutputOwners;
use crate::utxo::UtxoId;

/// Mint more of a variable-cap fungible asset.
///
/// Consumes a mint output and re-creates it alongside the freshly minted
/// transfer output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecpMintOperation {
    pub sig_idxs: Vec<SigIdx>,
    pub mint_output: SecpMintOutput,
    pub transfer_output: SecpTransferOutput,
}

impl Encode for SecpMintOperation {
    fn encode_into(&self, w: &mut Writer) {
        w.put_list(&self.sig_idxs);
        self.mint_output.encode_into(w);
        self.transfer_output.encode_into(w);
    }
}

impl Decode for SecpMintOperation {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            sig_idxs: decode_sig_idxs(r)?,
            mint_output: SecpMintOutput::decode(r)?,
            transfer_output: SecpTransferOutput::decode(r)?,
        })
    }
}

/// Mint one NFT per owner set in `outputs`, all sharing `payload`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NftMintOperation {
    pub sig_idxs: Vec<SigIdx>,
    pub group_id: u32,
    pub payload: Vec<u8>,
    pub outputs: Vec<OutputOwners>,
}

impl NftMintOperation {
    pub fn new(
        sig_idxs: Vec<SigIdx>,
        group_id: u32,
        payload: Vec<u8>,
        outputs: Vec<OutputOwners>,
    ) -> Result<Self, TxError> {
        check_payload(&payload)?;
        Ok(Self {
            sig_idxs,
            group_id,
            payload,
            outputs,
        })
    }
}

impl Encode for NftMintOperation {
    fn encode_into(&self, w: &mut Writer) {
        w.put_list(&self.sig_idxs);
        w.put_u32(self.group_id);
        w.put_bytes(&self.payload);
        w.put_list(&self.outputs);
    }
}

impl Decode for NftMintOperation {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            sig_idxs: decode_sig_idxs(r)?,
            group_id: r.get_u32()?,
            payload: r.get_bytes()?,
            // locktime + threshold + address count
            outputs: r.get_list(16)?,
        })
    }
}

/// Hand an NFT to new owners.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NftTransferOperation {
    pub sig_idxs: Vec<SigIdx>,
    pub output: NftTransferOutput,
}

impl Encode for NftTransferOperation {
    fn encode_into(&self, w: &mut Writer) {
        w.put_list(&self.sig_idxs);
        self.output.encode_into(w);
    }
}

impl Decode for NftTransferOperation {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            sig_idxs: decode_sig_idxs(r)?,
            output: NftTransferOutput::decode(r)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    SecpMint(SecpMintOperation),
    NftMint(NftMintOperation),
    NftTransfer(NftTransferOperation),
}

impl Operation {
    pub fn op_id(&self) -> u32 {
        match self {
            Self::SecpMint(_) => SECP_MINT_OP_ID,
            Self::NftMint(_) => NFT_MINT_OP_ID,
            Self::NftTransfer(_) => NFT_TRANSFER_OP_ID,
        }
    }

    pub fn credential_kind(&self) -> CredentialKind {
        match self {
            Self::SecpMint(_) => CredentialKind::Secp,
            Self::NftMint(_) | Self::NftTransfer(_) => CredentialKind::Nft,
        }
    }

    pub fn credential_id(&self) -> u32 {
        self.credential_kind().credential_id()
    }

    pub fn sig_idxs(&self) -> &[SigIdx] {
        match self {
            Self::SecpMint(op) => &op.sig_idxs,
            Self::NftMint(op) => &op.sig_idxs,
            Self::NftTransfer(op) => &op.sig_idxs,
        }
    }
}

impl Encode for Operation {
    fn encode_into(&self, w: &mut Writer) {
        w.put_u32(self.op_id());
        match self {
            Self::SecpMint(op) => op.encode_into(w),
            Self::NftMint(op) => op.encode_into(w),
            Self::NftTransfer(op) => op.encode_into(w),
        }
    }
}

impl Decode for Operation {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        match r.get_u32()? {
            SECP_MINT_OP_ID => Ok(Self::SecpMint(SecpMintOperation::decode(r)?)),
            NFT_MINT_OP_ID => Ok(Self::NftMint(NftMintOperation::decode(r)?)),
            NFT_TRANSFER_OP_ID => Ok(Self::NftTransfer(NftTransferOperation::decode(r)?)),
            tag => Err(CodecError::UnknownTypeTag { kind: "operation", tag }),
        }
    }
}

impl From<SecpMintOperation> for Operation {
    fn from(op: SecpMintOperation) -> Self {
        Self::SecpMint(op)
    }
}

impl From<NftMintOperation> for Operation {
    fn from(op: NftMintOperation) -> Self {
        Self::NftMint(op)
    }
}

impl From<NftTransferOperation> for Operation {
    fn from(op: NftTransferOperation) -> Self {
        Self::NftTransfer(op)
    }
}

/// An operation applied to one or more UTXOs of a single asset.
///
/// `utxo_ids` are written in ascending order regardless of how they were
/// supplied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransferableOperation {
    pub asset_id: AssetId,
    pub utxo_ids: Vec<UtxoId>,
    pub operation: Operation,
}

impl TransferableOperation {
    pub fn new(asset_id: AssetId, utxo_ids: Vec<UtxoId>, operation: impl Into<Operation>) -> Self {
        Self {
            asset_id,
            utxo_ids,
            operation: operation.into(),
        }
    }
}

impl Encode for TransferableOperation {
    fn encode_into(&self, w: &mut Writer) {
        self.asset_id.encode_into(w);
        w.put_sorted_list(&self.utxo_ids);
        self.operation.encode_into(w);
    }
}

impl Decode for TransferableOperation {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            asset_id: AssetId::decode(r)?,
            utxo_ids: r.get_list(36)?,
            operation: Operation::decode(r)?,
        })
    }
}
