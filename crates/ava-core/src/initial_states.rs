//! Genesis state of a newly created asset, grouped by feature extension.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::address::Address;
use crate::codec::{Decode, Encode, Reader, Writer};
use crate::error::{CodecError, TxError};
use crate::output::{NftMintOutput, Output, SecpMintOutput, SecpTransferOutput};
use crate::owners::OutputOwners;

/// A group of addresses allowed to mint, and how many must sign.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MinterSet {
    pub threshold: u32,
    pub minters: Vec<Address>,
}

impl MinterSet {
    pub fn new(threshold: u32, minters: Vec<Address>) -> Self {
        Self { threshold, minters }
    }

    /// Unlocked owner set for the minters.
    pub fn owners(&self) -> Result<OutputOwners, TxError> {
        OutputOwners::new(self.minters.clone(), 0, self.threshold)
    }
}

/// Outputs keyed by fx id. Fx ids encode ascending; the outputs under
/// each one encode in canonical byte order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InitialStates {
    states: BTreeMap<u32, Vec<Output>>,
}

impl InitialStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// File `output` under its own fx id.
    pub fn add_output(&mut self, output: impl Into<Output>) {
        let output = output.into();
        self.states.entry(output.fx_id()).or_default().push(output);
    }

    /// Fixed-cap fungible genesis: one transfer output per `(amount, owners)`.
    pub fn fixed_cap(holders: impl IntoIterator<Item = (u64, OutputOwners)>) -> Self {
        let mut states = Self::new();
        for (amount, owners) in holders {
            states.add_output(SecpTransferOutput::new(amount, owners));
        }
        states
    }

    /// Variable-cap fungible genesis: one mint output per minter set.
    pub fn variable_cap(minter_sets: &[MinterSet]) -> Result<Self, TxError> {
        let mut states = Self::new();
        for set in minter_sets {
            states.add_output(SecpMintOutput {
                owners: set.owners()?,
            });
        }
        Ok(states)
    }

    /// NFT genesis: minter set `i` controls group `i`.
    pub fn nft(minter_sets: &[MinterSet]) -> Result<Self, TxError> {
        let mut states = Self::new();
        for (group_id, set) in (0u32..).zip(minter_sets) {
            states.add_output(NftMintOutput {
                group_id,
                owners: set.owners()?,
            });
        }
        Ok(states)
    }

    pub fn outputs(&self, fx_id: u32) -> &[Output] {
        self.states.get(&fx_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fx_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.states.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.states.values().all(Vec::is_empty)
    }
}

impl Encode for InitialStates {
    fn encode_into(&self, w: &mut Writer) {
        w.put_u32(self.states.len() as u32);
        for (fx_id, outputs) in &self.states {
            w.put_u32(*fx_id);
            w.put_sorted_list(outputs);
        }
    }
}

impl Decode for InitialStates {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let count = r.get_count(8)?;
        let mut states = BTreeMap::new();
        for _ in 0..count {
            let fx_id = r.get_u32()?;
            // tag + empty owners
            let outputs: Vec<Output> = r.get_list(20)?;
            states.insert(fx_id, outputs);
        }
        Ok(Self { states })
    }
}
