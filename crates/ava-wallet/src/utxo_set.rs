//! Local cache of UTXOs with an owner-address index and the set algebra
//! used to reconcile it with freshly fetched data.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::debug;

use ava_core::address::Address;
use ava_core::ids::AssetId;
use ava_core::utxo::{Utxo, UtxoId};

use crate::error::WalletError;

/// How [`UtxoSet::merge_by_rule`] combines the local set (`self`) with a
/// newly fetched one (`new`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeRule {
    /// Only UTXOs present in both.
    Intersection,
    /// UTXOs only in `self`.
    DifferenceSelf,
    /// UTXOs only in `new`.
    DifferenceNew,
    /// UTXOs in exactly one of the two.
    SymDifference,
    /// Everything from both.
    Union,
    /// `union(new) − new`.
    UnionMinusNew,
    /// `union(new) − self`.
    UnionMinusSelf,
}

#[derive(Debug, Clone)]
struct Entry {
    seq: u64,
    utxo: Utxo,
}

/// UTXOs keyed by id, iterated in insertion order.
///
/// Each UTXO is also indexed under every owner address of its output,
/// together with the output's locktime, so spendability can be answered
/// without touching the outputs themselves.
#[derive(Debug, Clone, Default)]
pub struct UtxoSet {
    entries: HashMap<UtxoId, Entry>,
    order: BTreeMap<u64, UtxoId>,
    next_seq: u64,
    address_index: HashMap<Address, HashMap<UtxoId, u64>>,
}

impl UtxoSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert `utxo`. An existing UTXO with the same id is an error unless
    /// `overwrite` is set, in which case it is replaced in place.
    pub fn add(&mut self, utxo: Utxo, overwrite: bool) -> Result<UtxoId, WalletError> {
        if !overwrite && self.contains(&utxo.utxo_id) {
            return Err(WalletError::DuplicateUtxo(utxo.utxo_id));
        }
        Ok(self.insert(utxo))
    }

    /// Insert every UTXO, skipping duplicates unless `overwrite` is set.
    /// Returns the ids actually inserted.
    pub fn add_all(&mut self, utxos: impl IntoIterator<Item = Utxo>, overwrite: bool) -> Vec<UtxoId> {
        let mut inserted = Vec::new();
        for utxo in utxos {
            if overwrite || !self.contains(&utxo.utxo_id) {
                inserted.push(self.insert(utxo));
            }
        }
        inserted
    }

    // Insert or replace in place, keeping the original insertion slot.
    fn insert(&mut self, utxo: Utxo) -> UtxoId {
        let id = utxo.utxo_id;
        let seq = match self.entries.get(&id).map(|e| e.seq) {
            Some(seq) => {
                self.unindex(&id);
                seq
            }
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.order.insert(seq, id);
                seq
            }
        };
        let locktime = utxo.output.locktime();
        for address in utxo.output.addresses() {
            self.address_index
                .entry(*address)
                .or_default()
                .insert(id, locktime);
        }
        self.entries.insert(id, Entry { seq, utxo });
        id
    }

    /// Decode and insert a cb58 UTXO string as returned by a node.
    pub fn add_cb58(&mut self, s: &str, overwrite: bool) -> Result<UtxoId, WalletError> {
        self.add(Utxo::from_cb58(s)?, overwrite)
    }

    /// Decode every string first, then insert. A malformed string fails
    /// the whole call without touching the set.
    pub fn add_all_cb58<S: AsRef<str>>(
        &mut self,
        strings: &[S],
        overwrite: bool,
    ) -> Result<Vec<UtxoId>, WalletError> {
        let utxos = strings
            .iter()
            .map(|s| Utxo::from_cb58(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.add_all(utxos, overwrite))
    }

    pub fn remove(&mut self, id: &UtxoId) -> Option<Utxo> {
        let entry = self.entries.get(id)?;
        let seq = entry.seq;
        self.unindex(id);
        self.order.remove(&seq);
        self.entries.remove(id).map(|e| e.utxo)
    }

    pub fn remove_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a UtxoId>) -> Vec<Utxo> {
        ids.into_iter().filter_map(|id| self.remove(id)).collect()
    }

    fn unindex(&mut self, id: &UtxoId) {
        let Some(entry) = self.entries.get(id) else {
            return;
        };
        for address in entry.utxo.output.addresses() {
            if let Some(ids) = self.address_index.get_mut(address) {
                ids.remove(id);
                if ids.is_empty() {
                    self.address_index.remove(address);
                }
            }
        }
    }

    pub fn get(&self, id: &UtxoId) -> Option<&Utxo> {
        self.entries.get(id).map(|e| &e.utxo)
    }

    pub fn contains(&self, id: &UtxoId) -> bool {
        self.entries.contains_key(id)
    }

    /// All ids in insertion order.
    pub fn utxo_ids(&self) -> Vec<UtxoId> {
        self.order.values().copied().collect()
    }

    /// UTXOs in insertion order, optionally limited to `filter`.
    pub fn all_utxos(&self, filter: Option<&[UtxoId]>) -> Vec<&Utxo> {
        let keep: Option<HashSet<&UtxoId>> = filter.map(|ids| ids.iter().collect());
        self.order
            .values()
            .filter(|id| keep.as_ref().is_none_or(|k| k.contains(id)))
            .filter_map(|id| self.get(id))
            .collect()
    }

    /// Every address that owns at least one UTXO.
    pub fn addresses(&self) -> Vec<Address> {
        let mut addrs: Vec<Address> = self.address_index.keys().copied().collect();
        addrs.sort();
        addrs
    }

    /// Ids owned by each of `addresses`, keyed by address.
    pub fn utxo_ids_by_address(&self, addresses: &[Address]) -> BTreeMap<Address, Vec<UtxoId>> {
        addresses
            .iter()
            .map(|a| {
                let mut ids: Vec<(u64, UtxoId)> = self
                    .address_index
                    .get(a)
                    .into_iter()
                    .flat_map(|m| m.keys())
                    .filter_map(|id| self.entries.get(id).map(|e| (e.seq, *id)))
                    .collect();
                ids.sort();
                (*a, ids.into_iter().map(|(_, id)| id).collect())
            })
            .collect()
    }

    /// Ids owned by any of `addresses`, in insertion order.
    ///
    /// With `spendable`, only UTXOs whose locktime is at or before `as_of`
    /// are returned.
    pub fn utxo_ids_for(&self, addresses: &[Address], spendable: bool, as_of: u64) -> Vec<UtxoId> {
        let mut wanted: HashSet<UtxoId> = HashSet::new();
        for address in addresses {
            let Some(ids) = self.address_index.get(address) else {
                continue;
            };
            for (id, locktime) in ids {
                if !spendable || *locktime <= as_of {
                    wanted.insert(*id);
                }
            }
        }
        self.order
            .values()
            .filter(|id| wanted.contains(id))
            .copied()
            .collect()
    }

    /// Spendable plain-transfer amount of `asset_id` owned by `addresses`.
    pub fn balance(&self, addresses: &[Address], asset_id: &AssetId, as_of: u64) -> u64 {
        self.utxo_ids_for(addresses, true, as_of)
            .iter()
            .filter_map(|id| self.get(id))
            .filter(|u| &u.asset_id == asset_id)
            .filter_map(|u| u.output.amount())
            .fold(0u64, u64::saturating_add)
    }

    /// Distinct assets held, optionally only by `addresses`.
    pub fn asset_ids(&self, addresses: Option<&[Address]>) -> Vec<AssetId> {
        let ids = match addresses {
            Some(addrs) => self.utxo_ids_for(addrs, false, 0),
            None => self.utxo_ids(),
        };
        ids.iter()
            .filter_map(|id| self.get(id))
            .map(|u| u.asset_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn id_set(&self) -> HashSet<UtxoId> {
        self.entries.keys().copied().collect()
    }

    /// New set with the UTXOs of `self` then `other`, limited to `filter`
    /// when given. On id collisions the copy from `self` wins.
    pub fn merge(&self, other: &UtxoSet, filter: Option<&HashSet<UtxoId>>) -> UtxoSet {
        let mut out = UtxoSet::new();
        for set in [self, other] {
            for utxo in set.all_utxos(None) {
                let wanted = filter.is_none_or(|f| f.contains(&utxo.utxo_id));
                if wanted && !out.contains(&utxo.utxo_id) {
                    out.insert(utxo.clone());
                }
            }
        }
        out
    }

    pub fn union(&self, other: &UtxoSet) -> UtxoSet {
        self.merge(other, None)
    }

    pub fn intersection(&self, other: &UtxoSet) -> UtxoSet {
        let ids: HashSet<UtxoId> = self.id_set().intersection(&other.id_set()).copied().collect();
        self.merge(other, Some(&ids))
    }

    pub fn difference(&self, other: &UtxoSet) -> UtxoSet {
        let ids: HashSet<UtxoId> = self.id_set().difference(&other.id_set()).copied().collect();
        self.merge(other, Some(&ids))
    }

    pub fn sym_difference(&self, other: &UtxoSet) -> UtxoSet {
        let ids: HashSet<UtxoId> = self
            .id_set()
            .symmetric_difference(&other.id_set())
            .copied()
            .collect();
        self.merge(other, Some(&ids))
    }

    /// Combine `self` with `new` according to `rule`.
    pub fn merge_by_rule(&self, new: &UtxoSet, rule: MergeRule) -> UtxoSet {
        let merged = match rule {
            MergeRule::Intersection => self.intersection(new),
            MergeRule::DifferenceSelf => self.difference(new),
            MergeRule::DifferenceNew => new.difference(self),
            MergeRule::SymDifference => self.sym_difference(new),
            MergeRule::Union => self.union(new),
            MergeRule::UnionMinusNew => self.union(new).difference(new),
            MergeRule::UnionMinusSelf => self.union(new).difference(self),
        };
        debug!(
            ?rule,
            local = self.len(),
            fetched = new.len(),
            result = merged.len(),
            "merged UTXO sets"
        );
        merged
    }
}

/// Two sets are equal when they hold the same UTXOs, whatever the order.
impl PartialEq for UtxoSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(id, e)| other.get(id) == Some(&e.utxo))
    }
}

impl Eq for UtxoSet {}

impl FromIterator<Utxo> for UtxoSet {
    fn from_iter<I: IntoIterator<Item = Utxo>>(iter: I) -> Self {
        let mut set = UtxoSet::new();
        set.add_all(iter, false);
        set
    }
}
