//! Transaction builder.
//!
//! Every `build_*` method follows the same steps:
//! 1. Select fee (and payment) inputs from the UTXO set
//! 2. Assemble the variant-specific inputs, outputs or operations
//! 3. Run the goose-egg fee check and return the [`UnsignedTx`]
//!
//! Signing is a separate step on the returned transaction; see
//! [`UnsignedTx::sign`].

use tracing::{debug, warn};

use ava_core::address::Address;
use ava_core::base_tx::BaseTx;
use ava_core::constants::{DEFAULT_CREATION_TX_FEE, DEFAULT_TX_FEE, GOOSE_EGG_FEE_LIMIT};
use ava_core::ids::{AssetId, BlockchainId};
use ava_core::initial_states::{InitialStates, MinterSet};
use ava_core::input::{SigIdx, TransferableInput};
use ava_core::operation::{
    NftMintOperation, NftTransferOperation, SecpMintOperation, TransferableOperation,
};
use ava_core::output::{NftTransferOutput, Output, SecpTransferOutput, TransferableOutput};
use ava_core::owners::{OutputOwners, unix_now};
use ava_core::tx::{CreateAssetTx, ExportTx, ImportTx, OperationTx, Transaction, UnsignedTx};
use ava_core::utxo::{Utxo, UtxoId};

use crate::coin_selection::{AssetRequest, CoinSelection, CoinSelector, spend_transfer_output};
use crate::error::WalletError;
use crate::utxo_set::UtxoSet;

/// Per-call spending options shared by every builder method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpendOptions {
    /// Time at which locktimes and thresholds are evaluated.
    pub as_of: u64,
    /// Locktime of the outputs sent to the recipients.
    pub locktime: u64,
    /// Signatures required to spend the recipients' outputs.
    pub threshold: u32,
    pub memo: Vec<u8>,
}

impl Default for SpendOptions {
    fn default() -> Self {
        Self {
            as_of: unix_now(),
            locktime: 0,
            threshold: 1,
            memo: Vec::new(),
        }
    }
}

impl SpendOptions {
    /// Owners of recipient outputs.
    fn recipients(&self, to: &[Address]) -> Result<OutputOwners, WalletError> {
        Ok(OutputOwners::new(to.to_vec(), self.locktime, self.threshold)?)
    }
}

/// Reject a fee that is both above [`GOOSE_EGG_FEE_LIMIT`] and larger than
/// the amount of the fee asset sent to outputs.
pub fn goose_egg_check(tx: &UnsignedTx, fee_asset_id: &AssetId) -> Result<(), WalletError> {
    let output_total = tx.output_total(fee_asset_id);
    let fee = tx.burn(fee_asset_id);
    if fee <= GOOSE_EGG_FEE_LIMIT || fee <= output_total {
        return Ok(());
    }
    warn!(fee, output_total, asset = %fee_asset_id, "rejected disproportionate fee");
    Err(WalletError::GooseEgg { fee, output_total })
}

/// Builds unsigned transactions for one chain.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    network_id: u32,
    blockchain_id: BlockchainId,
    fee_asset_id: AssetId,
    tx_fee: u64,
    creation_fee: u64,
}

impl TransactionBuilder {
    /// Builder with the default fees, paying them in `fee_asset_id`.
    pub fn new(network_id: u32, blockchain_id: BlockchainId, fee_asset_id: AssetId) -> Self {
        Self {
            network_id,
            blockchain_id,
            fee_asset_id,
            tx_fee: DEFAULT_TX_FEE,
            creation_fee: DEFAULT_CREATION_TX_FEE,
        }
    }

    /// Override the fee burned by non-creation transactions.
    pub fn set_tx_fee(&mut self, fee: u64) -> &mut Self {
        self.tx_fee = fee;
        self
    }

    /// Override the fee burned by asset creation transactions.
    pub fn set_creation_fee(&mut self, fee: u64) -> &mut Self {
        self.creation_fee = fee;
        self
    }

    pub fn network_id(&self) -> u32 {
        self.network_id
    }

    pub fn blockchain_id(&self) -> BlockchainId {
        self.blockchain_id
    }

    pub fn fee_asset_id(&self) -> AssetId {
        self.fee_asset_id
    }

    pub fn tx_fee(&self) -> u64 {
        self.tx_fee
    }

    pub fn creation_fee(&self) -> u64 {
        self.creation_fee
    }

    /// Requests for sending `amount` of `asset_id` and burning `fee` of the
    /// fee asset.
    fn requests(&self, asset_id: AssetId, amount: u64, fee: u64) -> Vec<AssetRequest> {
        if asset_id == self.fee_asset_id {
            return vec![AssetRequest::new(asset_id, amount, fee)];
        }
        let mut reqs = vec![AssetRequest::new(asset_id, amount, 0)];
        if fee > 0 {
            reqs.push(AssetRequest::new(self.fee_asset_id, 0, fee));
        }
        reqs
    }

    /// Select inputs to burn `fee` and return them with the change outputs.
    fn pay_fee(
        &self,
        utxos: &UtxoSet,
        fee: u64,
        from: &[Address],
        change: &[Address],
        as_of: u64,
    ) -> Result<(Vec<TransferableInput>, Vec<TransferableOutput>), WalletError> {
        if fee == 0 {
            return Ok((Vec::new(), Vec::new()));
        }
        let selection = CoinSelector::select(
            utxos,
            &[AssetRequest::new(self.fee_asset_id, 0, fee)],
            from,
            as_of,
        )?;
        let change_outs = selection.change_outputs(change)?;
        Ok((selection.ins, change_outs))
    }

    fn base(
        &self,
        outs: Vec<TransferableOutput>,
        ins: Vec<TransferableInput>,
        memo: &[u8],
    ) -> Result<BaseTx, WalletError> {
        Ok(BaseTx::new(
            self.network_id,
            self.blockchain_id,
            outs,
            ins,
            memo.to_vec(),
        )?)
    }

    fn finish(&self, tx: Transaction) -> Result<UnsignedTx, WalletError> {
        let unsigned = UnsignedTx::new(tx);
        goose_egg_check(&unsigned, &self.fee_asset_id)?;
        debug!(
            tx_type = unsigned.tx_type_id(),
            ins = unsigned.base().ins.len(),
            outs = unsigned.base().outs.len(),
            burn = unsigned.burn(&self.fee_asset_id),
            "built transaction"
        );
        Ok(unsigned)
    }

    /// Send `amount` of `asset_id` to `to`, paying from `from` and returning
    /// change to `change`.
    ///
    /// A zero `amount` builds a fee-only transaction with no payment output.
    #[allow(clippy::too_many_arguments)]
    pub fn build_base_tx(
        &self,
        utxos: &UtxoSet,
        amount: u64,
        asset_id: AssetId,
        to: &[Address],
        from: &[Address],
        change: &[Address],
        opts: &SpendOptions,
    ) -> Result<UnsignedTx, WalletError> {
        let to_owners = if amount > 0 { Some(opts.recipients(to)?) } else { None };
        let requests = self.requests(asset_id, amount, self.tx_fee);
        let selection = CoinSelector::select(utxos, &requests, from, opts.as_of)?;
        let mut outs = match &to_owners {
            Some(owners) => selection.payment_outputs(owners),
            None => Vec::new(),
        };
        outs.extend(selection.change_outputs(change)?);
        let base = self.base(outs, selection.ins, &opts.memo)?;
        self.finish(Transaction::Base(base))
    }

    /// Create a new asset with caller-supplied genesis state.
    #[allow(clippy::too_many_arguments)]
    pub fn build_create_asset_tx(
        &self,
        utxos: &UtxoSet,
        from: &[Address],
        change: &[Address],
        initial_states: InitialStates,
        name: &str,
        symbol: &str,
        denomination: u8,
        opts: &SpendOptions,
    ) -> Result<UnsignedTx, WalletError> {
        let (ins, outs) = self.pay_fee(utxos, self.creation_fee, from, change, opts.as_of)?;
        let base = self.base(outs, ins, &opts.memo)?;
        let create = CreateAssetTx::new(base, name, symbol, denomination, initial_states)?;
        self.finish(Transaction::CreateAsset(create))
    }

    /// Create an NFT family. Minter set `i` controls group `i`.
    #[allow(clippy::too_many_arguments)]
    pub fn build_create_nft_asset_tx(
        &self,
        utxos: &UtxoSet,
        from: &[Address],
        change: &[Address],
        minter_sets: &[MinterSet],
        name: &str,
        symbol: &str,
        opts: &SpendOptions,
    ) -> Result<UnsignedTx, WalletError> {
        let states = InitialStates::nft(minter_sets)?;
        self.build_create_asset_tx(utxos, from, change, states, name, symbol, 0, opts)
    }

    fn fetch<'a>(utxos: &'a UtxoSet, id: &UtxoId) -> Result<&'a Utxo, WalletError> {
        utxos.get(id).ok_or(WalletError::UnknownUtxo(*id))
    }

    /// Signature indices for spending `owners` with keys from `from`.
    fn op_sig_idxs(owners: &OutputOwners, from: &[Address], as_of: u64) -> Result<Vec<SigIdx>, WalletError> {
        if !owners.meets_threshold(from, as_of) {
            return Err(WalletError::KeyNotFound(format!(
                "need {} of the output's owners",
                owners.threshold()
            )));
        }
        let spenders = owners.spenders(from, as_of);
        Ok(SigIdx::for_spenders(owners, &spenders)?)
    }

    fn operation_tx(
        &self,
        utxos: &UtxoSet,
        ops: Vec<TransferableOperation>,
        from: &[Address],
        change: &[Address],
        opts: &SpendOptions,
    ) -> Result<UnsignedTx, WalletError> {
        let (ins, outs) = self.pay_fee(utxos, self.tx_fee, from, change, opts.as_of)?;
        let base = self.base(outs, ins, &opts.memo)?;
        self.finish(Transaction::Operation(OperationTx { base, ops }))
    }

    /// Mint `amount` of a variable-cap asset to `to`, spending the mint
    /// output `mint_utxo_id` and re-creating it for its current owners.
    #[allow(clippy::too_many_arguments)]
    pub fn build_secp_mint_tx(
        &self,
        utxos: &UtxoSet,
        mint_utxo_id: &UtxoId,
        amount: u64,
        to: &[Address],
        from: &[Address],
        change: &[Address],
        opts: &SpendOptions,
    ) -> Result<UnsignedTx, WalletError> {
        if amount == 0 {
            return Err(WalletError::InvalidAmount("mint amount is zero".into()));
        }
        let utxo = Self::fetch(utxos, mint_utxo_id)?;
        let Output::SecpMint(mint) = &utxo.output else {
            return Err(WalletError::InvalidAmount(format!(
                "{mint_utxo_id} is not a mint output"
            )));
        };
        let op = SecpMintOperation {
            sig_idxs: Self::op_sig_idxs(&mint.owners, from, opts.as_of)?,
            mint_output: mint.clone(),
            transfer_output: SecpTransferOutput::new(amount, opts.recipients(to)?),
        };
        let op = TransferableOperation::new(utxo.asset_id, vec![utxo.utxo_id], op);
        self.operation_tx(utxos, vec![op], from, change, opts)
    }

    /// Mint one NFT per entry of `owners` from each NFT mint output in
    /// `mint_utxo_ids`, all carrying `payload`.
    #[allow(clippy::too_many_arguments)]
    pub fn build_nft_mint_tx(
        &self,
        utxos: &UtxoSet,
        mint_utxo_ids: &[UtxoId],
        owners: &[OutputOwners],
        payload: &[u8],
        from: &[Address],
        change: &[Address],
        opts: &SpendOptions,
    ) -> Result<UnsignedTx, WalletError> {
        let mut ops = Vec::with_capacity(mint_utxo_ids.len());
        for id in mint_utxo_ids {
            let utxo = Self::fetch(utxos, id)?;
            let Output::NftMint(mint) = &utxo.output else {
                return Err(WalletError::InvalidAmount(format!("{id} is not an NFT mint output")));
            };
            let op = NftMintOperation::new(
                Self::op_sig_idxs(&mint.owners, from, opts.as_of)?,
                mint.group_id,
                payload.to_vec(),
                owners.to_vec(),
            )?;
            ops.push(TransferableOperation::new(utxo.asset_id, vec![utxo.utxo_id], op));
        }
        self.operation_tx(utxos, ops, from, change, opts)
    }

    /// Hand each NFT in `nft_utxo_ids` to `to`.
    ///
    /// Signature indices come from each NFT's own owners; the fee inputs
    /// are signed separately.
    #[allow(clippy::too_many_arguments)]
    pub fn build_nft_transfer_tx(
        &self,
        utxos: &UtxoSet,
        nft_utxo_ids: &[UtxoId],
        to: &[Address],
        from: &[Address],
        change: &[Address],
        opts: &SpendOptions,
    ) -> Result<UnsignedTx, WalletError> {
        let recipients = opts.recipients(to)?;
        let mut ops = Vec::with_capacity(nft_utxo_ids.len());
        for id in nft_utxo_ids {
            let utxo = Self::fetch(utxos, id)?;
            let Output::NftTransfer(nft) = &utxo.output else {
                return Err(WalletError::InvalidAmount(format!("{id} is not an NFT")));
            };
            let op = NftTransferOperation {
                sig_idxs: Self::op_sig_idxs(&nft.owners, from, opts.as_of)?,
                output: NftTransferOutput::new(nft.group_id, nft.payload.clone(), recipients.clone())?,
            };
            ops.push(TransferableOperation::new(utxo.asset_id, vec![utxo.utxo_id], op));
        }
        self.operation_tx(utxos, ops, from, change, opts)
    }

    /// Import `atomic_utxos` exported from `source_chain` into outputs owned
    /// by `to`.
    ///
    /// The fee is taken from imported fee-asset value first; any shortfall
    /// is paid from local UTXOs.
    #[allow(clippy::too_many_arguments)]
    pub fn build_import_tx(
        &self,
        utxos: &UtxoSet,
        atomic_utxos: &[Utxo],
        source_chain: BlockchainId,
        to: &[Address],
        from: &[Address],
        change: &[Address],
        opts: &SpendOptions,
    ) -> Result<UnsignedTx, WalletError> {
        let mut imported_ins = Vec::new();
        let mut totals: Vec<(AssetId, u64)> = Vec::new();
        for utxo in atomic_utxos {
            let Some(input) = spend_transfer_output(utxo, from, opts.as_of)? else {
                continue;
            };
            let amount = input.input.amount();
            match totals.iter_mut().find(|(a, _)| *a == utxo.asset_id) {
                Some((_, total)) => *total = total.saturating_add(amount),
                None => totals.push((utxo.asset_id, amount)),
            }
            imported_ins.push(input);
        }
        if imported_ins.is_empty() {
            return Err(WalletError::NoSpendableUtxos);
        }

        let mut fee_left = self.tx_fee;
        let recipients = opts.recipients(to)?;
        let mut outs = Vec::new();
        for (asset_id, total) in totals {
            let mut amount = total;
            if asset_id == self.fee_asset_id {
                let covered = fee_left.min(amount);
                amount -= covered;
                fee_left -= covered;
            }
            if amount > 0 {
                outs.push(TransferableOutput::transfer(asset_id, amount, recipients.clone()));
            }
        }

        let (ins, change_outs) = self.pay_fee(utxos, fee_left, from, change, opts.as_of)?;
        outs.extend(change_outs);
        let base = self.base(outs, ins, &opts.memo)?;
        self.finish(Transaction::Import(ImportTx {
            base,
            source_chain,
            imported_ins,
        }))
    }

    /// Export `amount` of `asset_id` to `to` on `destination_chain`.
    #[allow(clippy::too_many_arguments)]
    pub fn build_export_tx(
        &self,
        utxos: &UtxoSet,
        amount: u64,
        asset_id: AssetId,
        destination_chain: BlockchainId,
        to: &[Address],
        from: &[Address],
        change: &[Address],
        opts: &SpendOptions,
    ) -> Result<UnsignedTx, WalletError> {
        if amount == 0 {
            return Err(WalletError::InvalidAmount("export amount is zero".into()));
        }
        let recipients = opts.recipients(to)?;
        let requests = self.requests(asset_id, amount, self.tx_fee);
        let selection: CoinSelection = CoinSelector::select(utxos, &requests, from, opts.as_of)?;
        let exported_outs = selection.payment_outputs(&recipients);
        let outs = selection.change_outputs(change)?;
        let base = self.base(outs, selection.ins, &opts.memo)?;
        self.finish(Transaction::Export(ExportTx {
            base,
            destination_chain,
            exported_outs,
        }))
    }
}
