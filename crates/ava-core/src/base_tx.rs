//! The fields every transaction variant starts with.

use serde::{Deserialize, Serialize};

use crate::codec::{Decode, Encode, Reader, Writer, canonical_order};
use crate::constants::MAX_MEMO_LEN;
use crate::error::{CodecError, TxError};
use crate::ids::{AssetId, BlockchainId};
use crate::input::TransferableInput;
use crate::output::TransferableOutput;

/// Network, chain, spent inputs, created outputs and a memo.
///
/// `outs` and `ins` may be kept in any order; they are sorted into
/// canonical byte order whenever the transaction is encoded.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BaseTx {
    pub network_id: u32,
    pub blockchain_id: BlockchainId,
    pub outs: Vec<TransferableOutput>,
    pub ins: Vec<TransferableInput>,
    pub memo: Vec<u8>,
}

impl BaseTx {
    pub fn new(
        network_id: u32,
        blockchain_id: BlockchainId,
        outs: Vec<TransferableOutput>,
        ins: Vec<TransferableInput>,
        memo: Vec<u8>,
    ) -> Result<Self, TxError> {
        check_memo(&memo)?;
        Ok(Self {
            network_id,
            blockchain_id,
            outs,
            ins,
            memo,
        })
    }

    /// Inputs in the order they are serialized and signed.
    pub fn sorted_ins(&self) -> Vec<&TransferableInput> {
        canonical_order(&self.ins)
    }

    pub fn sorted_outs(&self) -> Vec<&TransferableOutput> {
        canonical_order(&self.outs)
    }

    /// Sum of plain-transfer input amounts of `asset_id`.
    pub fn input_total(&self, asset_id: &AssetId) -> u64 {
        sum_inputs(&self.ins, asset_id)
    }

    /// Sum of plain-transfer output amounts of `asset_id`.
    pub fn output_total(&self, asset_id: &AssetId) -> u64 {
        sum_outputs(&self.outs, asset_id)
    }
}

pub fn check_memo(memo: &[u8]) -> Result<(), TxError> {
    if memo.len() > MAX_MEMO_LEN {
        return Err(TxError::MemoTooLong {
            len: memo.len(),
            max: MAX_MEMO_LEN,
        });
    }
    Ok(())
}

pub(crate) fn sum_inputs(ins: &[TransferableInput], asset_id: &AssetId) -> u64 {
    ins.iter()
        .filter(|i| &i.asset_id == asset_id)
        .fold(0u64, |acc, i| acc.saturating_add(i.input.amount()))
}

pub(crate) fn sum_outputs(outs: &[TransferableOutput], asset_id: &AssetId) -> u64 {
    outs.iter()
        .filter(|o| &o.asset_id == asset_id)
        .filter_map(|o| o.output.amount())
        .fold(0u64, u64::saturating_add)
}

impl Encode for BaseTx {
    fn encode_into(&self, w: &mut Writer) {
        w.put_u32(self.network_id);
        self.blockchain_id.encode_into(w);
        w.put_sorted_list(&self.outs);
        w.put_sorted_list(&self.ins);
        w.put_bytes(&self.memo);
    }
}

impl Decode for BaseTx {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let network_id = r.get_u32()?;
        let blockchain_id = BlockchainId::decode(r)?;
        // asset + tag + empty owners
        let outs = r.get_list(52)?;
        // utxo id + asset + tag + amount + sig count
        let ins = r.get_list(84)?;
        let memo = r.get_bytes()?;
        if memo.len() > MAX_MEMO_LEN {
            return Err(CodecError::TooLong {
                field: "memo",
                len: memo.len(),
                max: MAX_MEMO_LEN,
            });
        }
        Ok(Self {
            network_id,
            blockchain_id,
            outs,
            ins,
            memo,
        })
    }
}
