//! Shared test helpers for property and end-to-end tests.

use std::cell::RefCell;
use std::collections::HashMap;

use ava_core::address::Address;
use ava_core::crypto::KeyPair;
use ava_core::ids::{AssetId, BlockchainId, Id, TxId};
use ava_core::output::SecpTransferOutput;
use ava_core::owners::OutputOwners;
use ava_core::tx::{SignedTx, Transaction};
use ava_core::utxo::{Utxo, UtxoId};
use ava_wallet::rpc::{AssetDescription, ChainClient, TxStatus};
use ava_wallet::{UtxoSet, WalletError};

/// Fixed address from a seed byte.
pub fn addr(seed: u8) -> Address {
    Address([seed; 20])
}

/// Fixed asset id from a seed byte.
pub fn asset(seed: u8) -> AssetId {
    Id([seed; 32])
}

/// Deterministic key pair; `seed` must be non-zero.
pub fn keypair(seed: u8) -> KeyPair {
    KeyPair::from_secret_bytes(&[seed; 32]).unwrap()
}

/// Single-owner transfer UTXO.
pub fn transfer_utxo(tx: u8, index: u32, asset_id: AssetId, owner: Address, amount: u64) -> Utxo {
    Utxo::new(
        UtxoId::new(Id([tx; 32]), index),
        asset_id,
        SecpTransferOutput::new(amount, OutputOwners::single(owner)),
    )
}

/// In-memory chain answering the wallet's client calls.
///
/// Issued transactions are verified (credential count and signers) and
/// applied: consumed base and operation UTXOs disappear, imported UTXOs
/// leave shared memory, and base outputs become new UTXOs indexed in
/// canonical output order.
pub struct MockChain {
    native: AssetDescription,
    utxos: RefCell<UtxoSet>,
    atomic: RefCell<HashMap<BlockchainId, UtxoSet>>,
    statuses: RefCell<HashMap<TxId, TxStatus>>,
}

impl MockChain {
    pub fn new(native_asset_id: AssetId) -> Self {
        Self {
            native: AssetDescription {
                asset_id: native_asset_id,
                name: "Avalanche".into(),
                symbol: "AVAX".into(),
                denomination: 9,
            },
            utxos: RefCell::new(UtxoSet::new()),
            atomic: RefCell::new(HashMap::new()),
            statuses: RefCell::new(HashMap::new()),
        }
    }

    /// Credit a UTXO directly, as if produced by an earlier transaction.
    pub fn fund(&self, utxo: Utxo) {
        self.utxos.borrow_mut().add(utxo, true).unwrap();
    }

    /// Place a UTXO in shared memory as if `source_chain` had exported it.
    pub fn fund_atomic(&self, source_chain: BlockchainId, utxo: Utxo) {
        self.atomic
            .borrow_mut()
            .entry(source_chain)
            .or_default()
            .add(utxo, true)
            .unwrap();
    }

    pub fn utxo_count(&self) -> usize {
        self.utxos.borrow().len()
    }

    pub fn balance(&self, owner: &Address, asset_id: &AssetId, as_of: u64) -> u64 {
        self.utxos.borrow().balance(&[*owner], asset_id, as_of)
    }

    fn apply(&self, tx: &SignedTx) -> Result<TxId, WalletError> {
        tx.signers()?;
        let tx_id = tx.tx_id();
        let mut utxos = self.utxos.borrow_mut();

        let base = tx.unsigned.base();
        let mut consumed: Vec<UtxoId> = base.ins.iter().map(|i| i.utxo_id).collect();
        if let Transaction::Operation(op_tx) = &tx.unsigned.tx {
            consumed.extend(op_tx.ops.iter().flat_map(|op| op.utxo_ids.iter().copied()));
        }
        for id in &consumed {
            if !utxos.contains(id) {
                return Err(WalletError::Rpc(format!("missing UTXO {id}")));
            }
        }
        utxos.remove_all(consumed.iter());
        if let Transaction::Import(import) = &tx.unsigned.tx {
            let mut atomic = self.atomic.borrow_mut();
            let shared = atomic.entry(import.source_chain).or_default();
            for input in &import.imported_ins {
                if shared.remove(&input.utxo_id).is_none() {
                    return Err(WalletError::Rpc(format!("missing atomic UTXO {}", input.utxo_id)));
                }
            }
        }
        for (i, out) in base.sorted_outs().into_iter().enumerate() {
            let id = UtxoId::new(tx_id, i as u32);
            utxos
                .add(Utxo::new(id, out.asset_id, out.output.clone()), false)
                .map_err(|e| WalletError::Rpc(e.to_string()))?;
        }
        self.statuses.borrow_mut().insert(tx_id, TxStatus::Accepted);
        Ok(tx_id)
    }
}

impl ChainClient for MockChain {
    fn get_utxos(
        &self,
        addresses: &[String],
        source_chain: Option<&BlockchainId>,
    ) -> Result<Vec<String>, WalletError> {
        let mut owners = Vec::with_capacity(addresses.len());
        for s in addresses {
            let parsed = ava_core::address::parse_address(s)?;
            owners.push(parsed.address);
        }
        let atomic = self.atomic.borrow();
        let local = self.utxos.borrow();
        let utxos = match source_chain {
            Some(chain) => match atomic.get(chain) {
                Some(shared) => shared,
                None => return Ok(Vec::new()),
            },
            None => &*local,
        };
        let ids = utxos.utxo_ids_for(&owners, false, 0);
        Ok(utxos
            .all_utxos(Some(&ids))
            .into_iter()
            .map(|u| u.to_cb58())
            .collect())
    }

    fn get_asset_description(&self, asset: &str) -> Result<AssetDescription, WalletError> {
        if asset == self.native.symbol || asset == self.native.asset_id.to_cb58() {
            return Ok(self.native.clone());
        }
        Err(WalletError::Rpc(format!("asset {asset} not found")))
    }

    fn issue_tx(&self, tx: &str) -> Result<TxId, WalletError> {
        let tx = SignedTx::from_cb58(tx)?;
        self.apply(&tx)
    }

    fn get_tx_status(&self, tx_id: &TxId) -> Result<TxStatus, WalletError> {
        Ok(self
            .statuses
            .borrow()
            .get(tx_id)
            .copied()
            .unwrap_or(TxStatus::Unknown))
    }
}
