//! Property tests for the codec, ownership model, UTXO set and signing.
//!
//! Each property runs 256 cases with proptest shrinking.

use std::collections::HashSet;

use proptest::prelude::*;

use ava_core::base_tx::BaseTx;
use ava_core::cb58;
use ava_core::codec::{Decode, Encode};
use ava_core::constants::{GOOSE_EGG_FEE_LIMIT, ONE_AVAX};
use ava_core::ids::Id;
use ava_core::initial_states::InitialStates;
use ava_core::input::{SecpTransferInput, SigIdx, TransferableInput};
use ava_core::operation::{
    NftMintOperation, NftTransferOperation, Operation, SecpMintOperation, TransferableOperation,
};
use ava_core::output::{NftTransferOutput, SecpMintOutput, SecpTransferOutput};
use ava_core::owners::OutputOwners;
use ava_core::tx::{
    CreateAssetTx, ExportTx, ImportTx, OperationTx, SignedTx, Transaction, UnsignedTx,
};
use ava_core::utxo::{Utxo, UtxoId};
use ava_tests::helpers::*;
use ava_wallet::{SpendOptions, TransactionBuilder, UtxoSet, WalletError};

fn arb_owners() -> impl Strategy<Value = OutputOwners> {
    (prop::collection::vec(any::<[u8; 20]>(), 1..4), any::<u64>(), 0u32..4).prop_map(
        |(addrs, locktime, threshold)| {
            let addrs: Vec<_> = addrs.into_iter().map(ava_core::address::Address).collect();
            let distinct = addrs.iter().collect::<HashSet<_>>().len() as u32;
            OutputOwners::new(addrs, locktime, threshold.min(distinct)).unwrap()
        },
    )
}

fn arb_output() -> impl Strategy<Value = ava_core::output::TransferableOutput> {
    (any::<u8>(), any::<u64>(), arb_owners()).prop_map(|(a, amount, owners)| {
        ava_core::output::TransferableOutput::transfer(asset(a), amount, owners)
    })
}

fn arb_input() -> impl Strategy<Value = TransferableInput> {
    (any::<[u8; 32]>(), any::<u32>(), any::<u8>(), any::<u64>(), prop::collection::vec(any::<u32>(), 0..3))
        .prop_map(|(tx, index, a, amount, idxs)| {
            let sig_idxs = idxs.into_iter().map(|i| SigIdx::new(i, addr(0))).collect();
            TransferableInput::new(
                UtxoId::new(Id(tx), index),
                asset(a),
                SecpTransferInput::new(amount, sig_idxs),
            )
        })
}

fn arb_base_tx() -> impl Strategy<Value = BaseTx> {
    (
        any::<u32>(),
        any::<[u8; 32]>(),
        prop::collection::vec(arb_output(), 0..5),
        prop::collection::vec(arb_input(), 0..5),
        prop::collection::vec(any::<u8>(), 0..=256),
    )
        .prop_map(|(network, chain, outs, ins, memo)| {
            BaseTx::new(network, Id(chain), outs, ins, memo).unwrap()
        })
}

fn arb_sig_idxs() -> impl Strategy<Value = Vec<SigIdx>> {
    prop::collection::vec(0u32..8, 0..3)
        .prop_map(|idxs| idxs.into_iter().map(|i| SigIdx::new(i, addr(0))).collect())
}

fn arb_utxo_ids() -> impl Strategy<Value = Vec<UtxoId>> {
    prop::collection::vec((any::<[u8; 32]>(), any::<u32>()), 1..4)
        .prop_map(|ids| ids.into_iter().map(|(tx, i)| UtxoId::new(Id(tx), i)).collect())
}

fn arb_operation() -> impl Strategy<Value = Operation> {
    let payload = prop::collection::vec(any::<u8>(), 0..32);
    prop_oneof![
        (arb_sig_idxs(), arb_owners(), any::<u64>(), arb_owners()).prop_map(
            |(sig_idxs, minters, amount, holder)| {
                Operation::SecpMint(SecpMintOperation {
                    sig_idxs,
                    mint_output: SecpMintOutput { owners: minters },
                    transfer_output: SecpTransferOutput::new(amount, holder),
                })
            }
        ),
        (arb_sig_idxs(), any::<u32>(), payload.clone(), prop::collection::vec(arb_owners(), 1..3))
            .prop_map(|(sig_idxs, group_id, payload, outputs)| {
                Operation::NftMint(NftMintOperation::new(sig_idxs, group_id, payload, outputs).unwrap())
            }),
        (arb_sig_idxs(), any::<u32>(), payload, arb_owners()).prop_map(
            |(sig_idxs, group_id, payload, owners)| {
                Operation::NftTransfer(NftTransferOperation {
                    sig_idxs,
                    output: NftTransferOutput::new(group_id, payload, owners).unwrap(),
                })
            }
        ),
    ]
}

fn arb_transferable_op() -> impl Strategy<Value = TransferableOperation> {
    (any::<u8>(), arb_utxo_ids(), arb_operation())
        .prop_map(|(a, utxo_ids, op)| TransferableOperation::new(asset(a), utxo_ids, op))
}

fn arb_holders() -> impl Strategy<Value = Vec<(u64, OutputOwners)>> {
    prop::collection::vec((any::<u64>(), arb_owners()), 0..5)
}

fn arb_transaction() -> impl Strategy<Value = Transaction> {
    prop_oneof![
        arb_base_tx().prop_map(Transaction::Base),
        (arb_base_tx(), arb_holders()).prop_map(|(base, holders)| {
            let states = InitialStates::fixed_cap(holders);
            Transaction::CreateAsset(CreateAssetTx::new(base, "Token", "TKN", 8, states).unwrap())
        }),
        (arb_base_tx(), prop::collection::vec(arb_transferable_op(), 0..4))
            .prop_map(|(base, ops)| Transaction::Operation(OperationTx { base, ops })),
        (arb_base_tx(), any::<[u8; 32]>(), prop::collection::vec(arb_input(), 0..5)).prop_map(
            |(base, chain, imported_ins)| {
                Transaction::Import(ImportTx { base, source_chain: Id(chain), imported_ins })
            }
        ),
        (arb_base_tx(), any::<[u8; 32]>(), prop::collection::vec(arb_output(), 0..5)).prop_map(
            |(base, chain, exported_outs)| {
                Transaction::Export(ExportTx { base, destination_chain: Id(chain), exported_outs })
            }
        ),
    ]
}

/// Same transaction with every sortable list permuted.
fn permuted(tx: &Transaction, seed: u64) -> Transaction {
    fn spin<T>(items: &mut [T], seed: u64) {
        if !items.is_empty() {
            items.rotate_left(seed as usize % items.len());
            items.reverse();
        }
    }
    let mut tx = tx.clone();
    let base = match &mut tx {
        Transaction::Base(base) => base,
        Transaction::CreateAsset(create) => &mut create.base,
        Transaction::Operation(op_tx) => {
            spin(&mut op_tx.ops, seed);
            for op in &mut op_tx.ops {
                spin(&mut op.utxo_ids, seed);
            }
            &mut op_tx.base
        }
        Transaction::Import(import) => {
            spin(&mut import.imported_ins, seed);
            &mut import.base
        }
        Transaction::Export(export) => {
            spin(&mut export.exported_outs, seed);
            &mut export.base
        }
    };
    spin(&mut base.ins, seed);
    spin(&mut base.outs, seed.rotate_left(7));
    tx
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn cb58_round_trip(payload in prop::collection::vec(any::<u8>(), 0..128)) {
        let s = cb58::encode(&payload);
        prop_assert_eq!(cb58::decode(&s).unwrap(), payload);
    }

    #[test]
    fn cb58_rejects_corrupted_checksum(payload in prop::collection::vec(any::<u8>(), 1..64), flip in any::<u8>()) {
        let mut raw = bs58_bytes(&cb58::encode(&payload));
        let last = raw.len() - 1;
        raw[last] ^= flip | 1;
        let corrupted = bs58_string(&raw);
        prop_assert!(cb58::decode(&corrupted).is_err());
    }

    #[test]
    fn base_tx_round_trip(tx in arb_base_tx()) {
        let bytes = tx.to_bytes();
        let decoded = BaseTx::from_bytes(&bytes).unwrap();
        prop_assert_eq!(decoded.to_bytes(), bytes);
        prop_assert_eq!(decoded.ins.len(), tx.ins.len());
        prop_assert_eq!(decoded.memo, tx.memo);
    }

    #[test]
    fn base_tx_encoding_ignores_list_order(tx in arb_base_tx(), seed in any::<u64>()) {
        let mut shuffled = tx.clone();
        let n = shuffled.ins.len().max(1);
        shuffled.ins.rotate_left(seed as usize % n);
        shuffled.outs.reverse();
        prop_assert_eq!(shuffled.to_bytes(), tx.to_bytes());
    }

    #[test]
    fn every_variant_round_trips(tx in arb_transaction()) {
        let unsigned = UnsignedTx::new(tx);
        let bytes = unsigned.to_bytes();
        let decoded = UnsignedTx::from_bytes(&bytes).unwrap();
        prop_assert_eq!(decoded.tx_type_id(), unsigned.tx_type_id());
        prop_assert_eq!(decoded.to_bytes(), bytes);
    }

    #[test]
    fn every_variant_ignores_list_order(tx in arb_transaction(), seed in any::<u64>()) {
        let original = UnsignedTx::new(tx.clone());
        let shuffled = UnsignedTx::new(permuted(&tx, seed));
        prop_assert_eq!(shuffled.to_bytes(), original.to_bytes());
    }

    #[test]
    fn initial_states_ignore_holder_order(base in arb_base_tx(), holders in arb_holders()) {
        let mut reversed = holders.clone();
        reversed.reverse();
        let forward = CreateAssetTx::new(base.clone(), "Token", "TKN", 8, InitialStates::fixed_cap(holders)).unwrap();
        let backward = CreateAssetTx::new(base, "Token", "TKN", 8, InitialStates::fixed_cap(reversed)).unwrap();
        prop_assert_eq!(forward.to_bytes(), backward.to_bytes());
        let decoded = CreateAssetTx::from_bytes(&forward.to_bytes()).unwrap();
        prop_assert_eq!(decoded.to_bytes(), forward.to_bytes());
    }

    #[test]
    fn owners_addresses_are_sorted_and_unique(owners in arb_owners()) {
        let addrs = owners.addresses();
        prop_assert!(addrs.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(owners.threshold() as usize <= addrs.len());
    }

    #[test]
    fn utxo_cb58_round_trip(tx in any::<[u8; 32]>(), index in any::<u32>(), a in any::<u8>(), amount in any::<u64>(), owners in arb_owners()) {
        let utxo = Utxo::new(
            UtxoId::new(Id(tx), index),
            asset(a),
            SecpTransferOutput::new(amount, owners),
        );
        prop_assert_eq!(Utxo::from_cb58(&utxo.to_cb58()).unwrap(), utxo.clone());
        prop_assert_eq!(UtxoId::from_cb58(&utxo.utxo_id.to_cb58()).unwrap(), utxo.utxo_id);
    }

    #[test]
    fn set_algebra_identities(
        left in prop::collection::vec(0u8..16, 0..12),
        right in prop::collection::vec(0u8..16, 0..12),
    ) {
        let a: UtxoSet = left.iter().map(|&t| transfer_utxo(t, 0, asset(1), addr(1), t as u64)).collect();
        let b: UtxoSet = right.iter().map(|&t| transfer_utxo(t, 0, asset(1), addr(1), t as u64)).collect();

        let union = a.union(&b);
        let inter = a.intersection(&b);
        prop_assert_eq!(union.len() + inter.len(), a.len() + b.len());
        prop_assert!(a.difference(&b).intersection(&b).is_empty());
        prop_assert_eq!(a.sym_difference(&b), union.difference(&inter));
        prop_assert_eq!(a.union(&b), b.union(&a));
        prop_assert_eq!(a.intersection(&b), b.intersection(&a));
    }

    #[test]
    fn signers_match_spending_keys(seeds in prop::collection::hash_set(1u8..=255, 1..4), amount in 1u64..ONE_AVAX) {
        let keys: Vec<_> = seeds.iter().map(|&s| keypair(s)).collect();
        let set: UtxoSet = keys
            .iter()
            .enumerate()
            .map(|(i, k)| transfer_utxo(i as u8, 0, asset(1), k.address(), amount))
            .collect();
        let from: Vec<_> = keys.iter().map(|k| k.address()).collect();
        let mut builder = TransactionBuilder::new(1, Id([2; 32]), asset(1));
        builder.set_tx_fee(0);
        let opts = SpendOptions { as_of: 1, ..SpendOptions::default() };
        let total = amount * keys.len() as u64;
        let tx = builder
            .build_base_tx(&set, total, asset(1), &[addr(9)], &from, &from, &opts)
            .unwrap();
        let signed = tx.sign(&keys).unwrap();

        let mut recovered: Vec<_> = signed.signers().unwrap().into_iter().flatten().collect();
        let mut expected = from.clone();
        recovered.sort();
        expected.sort();
        prop_assert_eq!(recovered, expected);

        let decoded = SignedTx::from_cb58(&signed.to_cb58()).unwrap();
        prop_assert_eq!(decoded.tx_id(), signed.tx_id());
    }

    #[test]
    fn base_tx_burns_exactly_the_fee(amounts in prop::collection::vec(1u64..1_000_000, 1..8), pay in 0u64..1_000_000, fee in 0u64..1_000) {
        let set: UtxoSet = amounts
            .iter()
            .enumerate()
            .map(|(i, &v)| transfer_utxo(i as u8, 0, asset(1), addr(1), v))
            .collect();
        let mut builder = TransactionBuilder::new(1, Id([2; 32]), asset(1));
        builder.set_tx_fee(fee);
        let opts = SpendOptions { as_of: 1, ..SpendOptions::default() };
        let total: u64 = amounts.iter().sum();
        match builder.build_base_tx(&set, pay, asset(1), &[addr(9)], &[addr(1)], &[addr(1)], &opts) {
            Ok(tx) => {
                prop_assert!(pay + fee <= total);
                prop_assert_eq!(tx.burn(&asset(1)), fee);
                prop_assert_eq!(tx.input_total(&asset(1)), tx.output_total(&asset(1)) + fee);
            }
            Err(WalletError::InsufficientFunds { have, need, .. }) => {
                prop_assert!(pay + fee > total);
                prop_assert_eq!(have, total);
                prop_assert_eq!(need, pay + fee);
            }
            Err(e) => prop_assert!(false, "unexpected error {e}"),
        }
    }

    #[test]
    fn goose_egg_threshold(fee in 0u64..100 * ONE_AVAX, sent in 0u64..100 * ONE_AVAX) {
        let input = TransferableInput::new(
            UtxoId::new(Id([1; 32]), 0),
            asset(1),
            SecpTransferInput::new(fee + sent, vec![SigIdx::new(0, addr(1))]),
        );
        let outs = if sent > 0 {
            vec![ava_core::output::TransferableOutput::transfer(asset(1), sent, OutputOwners::single(addr(2)))]
        } else {
            Vec::new()
        };
        let base = BaseTx::new(1, Id([2; 32]), outs, vec![input], Vec::new()).unwrap();
        let tx = UnsignedTx::new(Transaction::Base(base));
        let ok = ava_wallet::goose_egg_check(&tx, &asset(1)).is_ok();
        prop_assert_eq!(ok, fee <= GOOSE_EGG_FEE_LIMIT || fee <= sent);
    }
}

fn bs58_bytes(s: &str) -> Vec<u8> {
    bs58::decode(s).into_vec().unwrap()
}

fn bs58_string(bytes: &[u8]) -> String {
    bs58::encode(bytes).into_string()
}
