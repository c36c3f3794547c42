//! First-fit coin selection over a [`UtxoSet`].
//!
//! UTXOs are taken whole, in the set's insertion order, until every
//! requested asset is covered. There is no attempt at optimal selection;
//! two wallets holding the same set in the same order always pick the same
//! inputs.

use tracing::debug;

use ava_core::address::Address;
use ava_core::ids::AssetId;
use ava_core::input::{SecpTransferInput, SigIdx, TransferableInput};
use ava_core::output::{Output, TransferableOutput};
use ava_core::owners::OutputOwners;
use ava_core::utxo::Utxo;

use crate::error::WalletError;
use crate::utxo_set::UtxoSet;

/// How much of one asset to send and how much of it to burn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetRequest {
    pub asset_id: AssetId,
    pub amount: u64,
    pub burn: u64,
}

impl AssetRequest {
    pub fn new(asset_id: AssetId, amount: u64, burn: u64) -> Self {
        Self {
            asset_id,
            amount,
            burn,
        }
    }

    fn target(&self) -> Result<u64, WalletError> {
        self.amount
            .checked_add(self.burn)
            .ok_or_else(|| WalletError::InvalidAmount("amount plus fee overflows".into()))
    }
}

/// Progress against one [`AssetRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSpend {
    pub request: AssetRequest,
    pub spent: u64,
    target: u64,
}

impl AssetSpend {
    pub fn is_finished(&self) -> bool {
        self.spent >= self.target
    }

    /// What comes back to the sender once amount and burn are covered.
    pub fn change(&self) -> u64 {
        self.spent.saturating_sub(self.target)
    }
}

/// Inputs picked for a set of requests.
#[derive(Debug, Clone, Default)]
pub struct CoinSelection {
    pub ins: Vec<TransferableInput>,
    pub spends: Vec<AssetSpend>,
}

impl CoinSelection {
    /// Payment outputs to `to`, one per asset with a non-zero amount.
    pub fn payment_outputs(&self, to: &OutputOwners) -> Vec<TransferableOutput> {
        self.spends
            .iter()
            .filter(|s| s.request.amount > 0)
            .map(|s| TransferableOutput::transfer(s.request.asset_id, s.request.amount, to.clone()))
            .collect()
    }

    /// Change outputs, one per asset with leftover value, unlocked and
    /// spendable by any one of `change`.
    ///
    /// `change` may be empty when nothing is left over.
    pub fn change_outputs(&self, change: &[Address]) -> Result<Vec<TransferableOutput>, WalletError> {
        let leftover: Vec<&AssetSpend> = self.spends.iter().filter(|s| s.change() > 0).collect();
        if leftover.is_empty() {
            return Ok(Vec::new());
        }
        let owners = OutputOwners::new(change.to_vec(), 0, 1)?;
        Ok(leftover
            .into_iter()
            .map(|s| TransferableOutput::transfer(s.request.asset_id, s.change(), owners.clone()))
            .collect())
    }
}

/// Build the input that spends a transfer output owned by `from`.
///
/// Returns `None` when the output is not a plain transfer or `from` cannot
/// meet its threshold at `as_of`.
pub fn spend_transfer_output(
    utxo: &Utxo,
    from: &[Address],
    as_of: u64,
) -> Result<Option<TransferableInput>, WalletError> {
    let Output::SecpTransfer(out) = &utxo.output else {
        return Ok(None);
    };
    if !out.owners.meets_threshold(from, as_of) {
        return Ok(None);
    }
    let spenders = out.owners.spenders(from, as_of);
    let sig_idxs = SigIdx::for_spenders(&out.owners, &spenders)?;
    Ok(Some(TransferableInput::new(
        utxo.utxo_id,
        utxo.asset_id,
        SecpTransferInput::new(out.amount, sig_idxs),
    )))
}

/// First-fit selector.
pub struct CoinSelector;

impl CoinSelector {
    /// Select UTXOs owned by `from` until every request is covered.
    ///
    /// Requests for the same asset are merged. A request of zero needs no
    /// inputs. Fails with [`WalletError::InsufficientFunds`] naming the
    /// first asset that could not be covered.
    pub fn select(
        utxos: &UtxoSet,
        requests: &[AssetRequest],
        from: &[Address],
        as_of: u64,
    ) -> Result<CoinSelection, WalletError> {
        let mut spends: Vec<AssetSpend> = Vec::new();
        for req in requests {
            match spends.iter_mut().find(|s| s.request.asset_id == req.asset_id) {
                Some(existing) => {
                    existing.request.amount = existing
                        .request
                        .amount
                        .checked_add(req.amount)
                        .ok_or_else(|| WalletError::InvalidAmount("amount overflows".into()))?;
                    existing.request.burn = existing
                        .request
                        .burn
                        .checked_add(req.burn)
                        .ok_or_else(|| WalletError::InvalidAmount("fee overflows".into()))?;
                    existing.target = existing.request.target()?;
                }
                None => spends.push(AssetSpend {
                    request: *req,
                    spent: 0,
                    target: req.target()?,
                }),
            }
        }

        let mut ins = Vec::new();
        for id in utxos.utxo_ids_for(from, true, as_of) {
            if spends.iter().all(AssetSpend::is_finished) {
                break;
            }
            let Some(utxo) = utxos.get(&id) else {
                continue;
            };
            let Some(spend) = spends
                .iter_mut()
                .find(|s| s.request.asset_id == utxo.asset_id && !s.is_finished())
            else {
                continue;
            };
            let Some(input) = spend_transfer_output(utxo, from, as_of)? else {
                continue;
            };
            spend.spent = spend.spent.saturating_add(input.input.amount());
            ins.push(input);
        }

        if let Some(short) = spends.iter().find(|s| !s.is_finished()) {
            return Err(WalletError::InsufficientFunds {
                asset: short.request.asset_id,
                have: short.spent,
                need: short.target,
            });
        }

        for s in &spends {
            debug!(
                asset = %s.request.asset_id,
                amount = s.request.amount,
                burn = s.request.burn,
                spent = s.spent,
                change = s.change(),
                "selected UTXOs"
            );
        }
        Ok(CoinSelection { ins, spends })
    }
}
