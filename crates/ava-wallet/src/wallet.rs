//! Wallet composition: keys, tracked UTXOs and configuration.
//!
//! Every operation follows the same sequence: fetch what is needed from the
//! [`ChainClient`] one call at a time, build the transaction from local
//! state, run the fee check, and sign with the keychain. Nothing is sent
//! until [`Wallet::issue`] is called.

use tracing::{info, warn};

use ava_core::address::Address;
use ava_core::ids::{AssetId, BlockchainId, TxId};
use ava_core::initial_states::{InitialStates, MinterSet};
use ava_core::owners::OutputOwners;
use ava_core::tx::{SignedTx, Transaction, UnsignedTx};
use ava_core::utxo::{Utxo, UtxoId};

use crate::builder::{SpendOptions, TransactionBuilder};
use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::keys::KeyChain;
use crate::rpc::ChainClient;
use crate::utxo_set::{MergeRule, UtxoSet};

/// Alias the native asset is looked up by when the config does not name it.
pub const NATIVE_ASSET_ALIAS: &str = "AVAX";

/// Keys, UTXOs and settings for one chain.
#[derive(Debug, Clone)]
pub struct Wallet {
    config: WalletConfig,
    keychain: KeyChain,
    utxos: UtxoSet,
}

impl Wallet {
    /// Empty wallet for the network and chain named in `config`.
    pub fn new(config: WalletConfig) -> Self {
        let keychain = KeyChain::new(config.hrp(), config.chain);
        Self {
            config,
            keychain,
            utxos: UtxoSet::new(),
        }
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    pub fn keychain(&self) -> &KeyChain {
        &self.keychain
    }

    pub fn keychain_mut(&mut self) -> &mut KeyChain {
        &mut self.keychain
    }

    pub fn utxos(&self) -> &UtxoSet {
        &self.utxos
    }

    pub fn utxos_mut(&mut self) -> &mut UtxoSet {
        &mut self.utxos
    }

    /// Spendable balance of `asset_id` across all held addresses.
    pub fn balance(&self, asset_id: &AssetId, as_of: u64) -> u64 {
        self.utxos.balance(&self.keychain.addresses(), asset_id, as_of)
    }

    /// Fetch the UTXOs of every held address and combine them with the
    /// local set according to `rule`. Returns the new set size.
    pub fn refresh_utxos(
        &mut self,
        client: &dyn ChainClient,
        rule: MergeRule,
    ) -> Result<usize, WalletError> {
        let addresses = self.keychain.address_strings()?;
        if addresses.is_empty() {
            return Ok(self.utxos.len());
        }
        let strings = client.get_utxos(&addresses, None)?;
        let mut fetched = UtxoSet::new();
        fetched.add_all_cb58(&strings, true)?;
        self.utxos = self.utxos.merge_by_rule(&fetched, rule);
        info!(
            addresses = addresses.len(),
            fetched = fetched.len(),
            held = self.utxos.len(),
            "refreshed UTXOs"
        );
        Ok(self.utxos.len())
    }

    /// The asset fees are paid in, looked up once and then cached.
    pub fn native_asset_id(&mut self, client: &dyn ChainClient) -> Result<AssetId, WalletError> {
        if let Some(id) = self.config.native_asset_id {
            return Ok(id);
        }
        let desc = client.get_asset_description(NATIVE_ASSET_ALIAS)?;
        self.config.native_asset_id = Some(desc.asset_id);
        Ok(desc.asset_id)
    }

    fn builder(&mut self, client: &dyn ChainClient) -> Result<TransactionBuilder, WalletError> {
        let fee_asset = self.native_asset_id(client)?;
        Ok(self.config.builder(fee_asset))
    }

    fn sign(&self, tx: UnsignedTx) -> Result<SignedTx, WalletError> {
        Ok(tx.sign(&self.keychain)?)
    }

    /// Send `amount` of `asset_id` to `to`. Change returns to the held
    /// addresses.
    pub fn send(
        &mut self,
        client: &dyn ChainClient,
        amount: u64,
        asset_id: AssetId,
        to: &[Address],
        opts: &SpendOptions,
    ) -> Result<SignedTx, WalletError> {
        let builder = self.builder(client)?;
        let mine = self.keychain.addresses();
        let tx = builder.build_base_tx(&self.utxos, amount, asset_id, to, &mine, &mine, opts)?;
        self.sign(tx)
    }

    pub fn create_asset(
        &mut self,
        client: &dyn ChainClient,
        name: &str,
        symbol: &str,
        denomination: u8,
        initial_states: InitialStates,
        opts: &SpendOptions,
    ) -> Result<SignedTx, WalletError> {
        let builder = self.builder(client)?;
        let mine = self.keychain.addresses();
        let tx = builder.build_create_asset_tx(
            &self.utxos,
            &mine,
            &mine,
            initial_states,
            name,
            symbol,
            denomination,
            opts,
        )?;
        self.sign(tx)
    }

    pub fn create_nft_asset(
        &mut self,
        client: &dyn ChainClient,
        name: &str,
        symbol: &str,
        minter_sets: &[MinterSet],
        opts: &SpendOptions,
    ) -> Result<SignedTx, WalletError> {
        let builder = self.builder(client)?;
        let mine = self.keychain.addresses();
        let tx = builder.build_create_nft_asset_tx(
            &self.utxos,
            &mine,
            &mine,
            minter_sets,
            name,
            symbol,
            opts,
        )?;
        self.sign(tx)
    }

    /// Mint more of a variable-cap asset from a held mint output.
    pub fn mint(
        &mut self,
        client: &dyn ChainClient,
        mint_utxo_id: &UtxoId,
        amount: u64,
        to: &[Address],
        opts: &SpendOptions,
    ) -> Result<SignedTx, WalletError> {
        let builder = self.builder(client)?;
        let mine = self.keychain.addresses();
        let tx = builder.build_secp_mint_tx(&self.utxos, mint_utxo_id, amount, to, &mine, &mine, opts)?;
        self.sign(tx)
    }

    pub fn mint_nft(
        &mut self,
        client: &dyn ChainClient,
        mint_utxo_ids: &[UtxoId],
        owners: &[OutputOwners],
        payload: &[u8],
        opts: &SpendOptions,
    ) -> Result<SignedTx, WalletError> {
        let builder = self.builder(client)?;
        let mine = self.keychain.addresses();
        let tx = builder.build_nft_mint_tx(
            &self.utxos,
            mint_utxo_ids,
            owners,
            payload,
            &mine,
            &mine,
            opts,
        )?;
        self.sign(tx)
    }

    pub fn transfer_nft(
        &mut self,
        client: &dyn ChainClient,
        nft_utxo_ids: &[UtxoId],
        to: &[Address],
        opts: &SpendOptions,
    ) -> Result<SignedTx, WalletError> {
        let builder = self.builder(client)?;
        let mine = self.keychain.addresses();
        let tx = builder.build_nft_transfer_tx(&self.utxos, nft_utxo_ids, to, &mine, &mine, opts)?;
        self.sign(tx)
    }

    /// Import every atomic UTXO that `source_chain` exported to held
    /// addresses.
    pub fn import(
        &mut self,
        client: &dyn ChainClient,
        source_chain: BlockchainId,
        opts: &SpendOptions,
    ) -> Result<SignedTx, WalletError> {
        let addresses = self.keychain.address_strings()?;
        let strings = client.get_utxos(&addresses, Some(&source_chain))?;
        let atomic = strings
            .iter()
            .map(|s| Utxo::from_cb58(s))
            .collect::<Result<Vec<_>, _>>()?;
        let builder = self.builder(client)?;
        let mine = self.keychain.addresses();
        let tx = builder.build_import_tx(&self.utxos, &atomic, source_chain, &mine, &mine, &mine, opts)?;
        self.sign(tx)
    }

    pub fn export(
        &mut self,
        client: &dyn ChainClient,
        amount: u64,
        asset_id: AssetId,
        destination_chain: BlockchainId,
        to: &[Address],
        opts: &SpendOptions,
    ) -> Result<SignedTx, WalletError> {
        let builder = self.builder(client)?;
        let mine = self.keychain.addresses();
        let tx = builder.build_export_tx(
            &self.utxos,
            amount,
            asset_id,
            destination_chain,
            to,
            &mine,
            &mine,
            opts,
        )?;
        self.sign(tx)
    }

    /// Submit `tx` and drop the UTXOs it consumed from the local set.
    pub fn issue(&mut self, client: &dyn ChainClient, tx: &SignedTx) -> Result<TxId, WalletError> {
        let expected = tx.tx_id();
        let tx_id = client.issue_tx(&tx.to_cb58())?;
        if tx_id != expected {
            warn!(%expected, returned = %tx_id, "node returned a different transaction id");
        }
        let consumed = consumed_utxo_ids(&tx.unsigned);
        let removed = self.utxos.remove_all(consumed.iter());
        info!(%tx_id, tx_type = tx.unsigned.tx_type_id(), spent = removed.len(), "issued transaction");
        Ok(tx_id)
    }
}

/// Local UTXOs a transaction spends: base inputs and operation inputs.
/// Imported inputs live on another chain and are not tracked here.
fn consumed_utxo_ids(tx: &UnsignedTx) -> Vec<UtxoId> {
    let mut ids: Vec<UtxoId> = tx.base().ins.iter().map(|i| i.utxo_id).collect();
    if let Transaction::Operation(op_tx) = &tx.tx {
        ids.extend(op_tx.ops.iter().flat_map(|op| op.utxo_ids.iter().copied()));
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use ava_core::constants::{DEFAULT_TX_FEE, ONE_AVAX};
    use ava_core::ids::Id;
    use ava_core::output::{NftTransferOutput, SecpTransferOutput};

    use crate::rpc::{AssetDescription, TxStatus};

    const AS_OF: u64 = 1_000;

    fn avax() -> AssetId {
        Id([0xAA; 32])
    }

    #[derive(Default)]
    struct MockClient {
        utxos: Vec<String>,
        atomic: Vec<String>,
        asset_lookups: RefCell<usize>,
        issued: RefCell<Vec<String>>,
    }

    impl ChainClient for MockClient {
        fn get_utxos(
            &self,
            _addresses: &[String],
            source_chain: Option<&BlockchainId>,
        ) -> Result<Vec<String>, WalletError> {
            match source_chain {
                Some(_) => Ok(self.atomic.clone()),
                None => Ok(self.utxos.clone()),
            }
        }

        fn get_asset_description(&self, asset: &str) -> Result<AssetDescription, WalletError> {
            *self.asset_lookups.borrow_mut() += 1;
            if asset != NATIVE_ASSET_ALIAS {
                return Err(WalletError::Rpc(format!("unknown asset {asset}")));
            }
            Ok(AssetDescription {
                asset_id: avax(),
                name: "Avalanche".into(),
                symbol: "AVAX".into(),
                denomination: 9,
            })
        }

        fn issue_tx(&self, tx: &str) -> Result<TxId, WalletError> {
            self.issued.borrow_mut().push(tx.to_string());
            Ok(SignedTx::from_cb58(tx)?.tx_id())
        }

        fn get_tx_status(&self, _tx_id: &TxId) -> Result<TxStatus, WalletError> {
            Ok(TxStatus::Accepted)
        }
    }

    fn opts() -> SpendOptions {
        SpendOptions {
            as_of: AS_OF,
            ..SpendOptions::default()
        }
    }

    fn funded() -> (Wallet, MockClient, Address) {
        let mut wallet = Wallet::new(WalletConfig::default());
        let me = wallet.keychain_mut().import_secret(&[1; 32]).unwrap();
        let utxo = Utxo::new(
            UtxoId::new(Id([1; 32]), 0),
            avax(),
            SecpTransferOutput::new(2 * ONE_AVAX, OutputOwners::single(me)),
        );
        let client = MockClient {
            utxos: vec![utxo.to_cb58()],
            ..MockClient::default()
        };
        wallet.refresh_utxos(&client, MergeRule::Union).unwrap();
        (wallet, client, me)
    }

    #[test]
    fn refresh_loads_utxos() {
        let (wallet, _, _) = funded();
        assert_eq!(wallet.utxos().len(), 1);
        assert_eq!(wallet.balance(&avax(), AS_OF), 2 * ONE_AVAX);
    }

    #[test]
    fn refresh_without_keys_skips_client() {
        let mut wallet = Wallet::new(WalletConfig::default());
        let client = MockClient {
            utxos: vec!["garbage".into()],
            ..MockClient::default()
        };
        assert_eq!(wallet.refresh_utxos(&client, MergeRule::Union).unwrap(), 0);
    }

    #[test]
    fn native_asset_is_cached() {
        let (mut wallet, client, _) = funded();
        assert_eq!(wallet.native_asset_id(&client).unwrap(), avax());
        assert_eq!(wallet.native_asset_id(&client).unwrap(), avax());
        assert_eq!(*client.asset_lookups.borrow(), 1);
        assert_eq!(wallet.config().native_asset_id, Some(avax()));
    }

    #[test]
    fn send_and_issue_drops_spent_utxos() {
        let (mut wallet, client, _) = funded();
        let to = Address([0xEE; 20]);
        let tx = wallet.send(&client, ONE_AVAX, avax(), &[to], &opts()).unwrap();
        assert_eq!(tx.unsigned.burn(&avax()), DEFAULT_TX_FEE);
        let tx_id = wallet.issue(&client, &tx).unwrap();
        assert_eq!(tx_id, tx.tx_id());
        assert!(wallet.utxos().is_empty());
        assert_eq!(client.issued.borrow().len(), 1);
    }

    #[test]
    fn send_more_than_balance_fails() {
        let (mut wallet, client, _) = funded();
        let err = wallet
            .send(&client, 2 * ONE_AVAX, avax(), &[Address([0xEE; 20])], &opts())
            .unwrap_err();
        assert!(matches!(err, WalletError::InsufficientFunds { .. }));
    }

    #[test]
    fn transfer_nft_consumes_nft_and_fee_utxo() {
        let (mut wallet, client, me) = funded();
        let nft = Utxo::new(
            UtxoId::new(Id([2; 32]), 3),
            Id([0x70; 32]),
            NftTransferOutput::new(1, b"art".to_vec(), OutputOwners::single(me)).unwrap(),
        );
        wallet.utxos_mut().add(nft.clone(), false).unwrap();
        let tx = wallet
            .transfer_nft(&client, &[nft.utxo_id], &[Address([0xEE; 20])], &opts())
            .unwrap();
        assert_eq!(tx.credentials.len(), 2);
        wallet.issue(&client, &tx).unwrap();
        assert!(!wallet.utxos().contains(&nft.utxo_id));
        assert!(wallet.utxos().is_empty());
    }

    #[test]
    fn import_fetches_atomic_utxos() {
        let (mut wallet, mut client, me) = funded();
        let atomic = Utxo::new(
            UtxoId::new(Id([9; 32]), 0),
            avax(),
            SecpTransferOutput::new(ONE_AVAX, OutputOwners::single(me)),
        );
        client.atomic = vec![atomic.to_cb58()];
        let tx = wallet.import(&client, Id([0x11; 32]), &opts()).unwrap();
        assert!(tx.unsigned.base().ins.is_empty());
        wallet.issue(&client, &tx).unwrap();
        assert_eq!(wallet.utxos().len(), 1);

        client.atomic = vec!["bad".into()];
        assert!(wallet.import(&client, Id([0x11; 32]), &opts()).is_err());
    }
}
