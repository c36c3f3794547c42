//! Transaction variants, the unsigned envelope, and signing.
//!
//! Wire shapes:
//! - unsigned: `u16 codec ‖ u32 type ‖ variant fields`
//! - signed: `unsigned ‖ u32 n ‖ n × (u32 credential type ‖ credential)`
//!
//! Lists inside a transaction are sorted at encode time, and signing walks
//! the same sorted order, so credential `i` always answers the `i`-th input
//! or operation on the wire.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::base_tx::{BaseTx, sum_inputs, sum_outputs};
use crate::cb58;
use crate::codec::{Decode, Encode, Reader, Writer, canonical_order};
use crate::constants::{
    BASE_TX_ID, CREATE_ASSET_TX_ID, EXPORT_TX_ID, IMPORT_TX_ID, LATEST_CODEC, MAX_DENOMINATION,
    MAX_NAME_LEN, MAX_SYMBOL_LEN, OPERATION_TX_ID,
};
use crate::credential::{Credential, CredentialKind};
use crate::crypto::sha256;
use crate::error::{CodecError, CoreError, CryptoError, TxError};
use crate::ids::{AssetId, BlockchainId, TxId};
use crate::initial_states::InitialStates;
use crate::input::{SigIdx, TransferableInput};
use crate::operation::TransferableOperation;
use crate::output::TransferableOutput;
use crate::traits::KeyStore;

// Smallest encodings, used to bound decode allocations.
const MIN_OUTPUT_LEN: usize = 52;
const MIN_INPUT_LEN: usize = 84;
const MIN_OPERATION_LEN: usize = 44;
const MIN_CREDENTIAL_LEN: usize = 8;

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

/// Check the human-facing fields of a new asset.
pub fn validate_asset_fields(name: &str, symbol: &str, denomination: u8) -> Result<(), TxError> {
    if name.is_empty() || name.len() > MAX_NAME_LEN || !is_printable_ascii(name) {
        return Err(TxError::InvalidName(name.to_string()));
    }
    if symbol.is_empty() || symbol.len() > MAX_SYMBOL_LEN || !is_printable_ascii(symbol) {
        return Err(TxError::InvalidSymbol(symbol.to_string()));
    }
    if denomination > MAX_DENOMINATION {
        return Err(TxError::InvalidDenomination(denomination));
    }
    Ok(())
}

/// Creates a new asset with the given genesis state.
///
/// `name`, `symbol` and `denomination` are checked by [`CreateAssetTx::new`].
/// Code that sets the fields directly must pass them through
/// [`validate_asset_fields`] before encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAssetTx {
    pub base: BaseTx,
    pub name: String,
    pub symbol: String,
    pub denomination: u8,
    pub initial_states: InitialStates,
}

impl CreateAssetTx {
    pub fn new(
        base: BaseTx,
        name: impl Into<String>,
        symbol: impl Into<String>,
        denomination: u8,
        initial_states: InitialStates,
    ) -> Result<Self, TxError> {
        let name = name.into();
        let symbol = symbol.into();
        validate_asset_fields(&name, &symbol, denomination)?;
        Ok(Self {
            base,
            name,
            symbol,
            denomination,
            initial_states,
        })
    }

    /// Everything after the base fields. Shared with genesis assets.
    pub(crate) fn encode_asset_fields(&self, w: &mut Writer) {
        w.put_str16(&self.name);
        w.put_str16(&self.symbol);
        w.put_u8(self.denomination);
        self.initial_states.encode_into(w);
    }

    pub(crate) fn decode_with_base(base: BaseTx, r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            base,
            name: r.get_str16()?,
            symbol: r.get_str16()?,
            denomination: r.get_u8()?,
            initial_states: InitialStates::decode(r)?,
        })
    }
}

impl Encode for CreateAssetTx {
    fn encode_into(&self, w: &mut Writer) {
        self.base.encode_into(w);
        self.encode_asset_fields(w);
    }
}

impl Decode for CreateAssetTx {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let base = BaseTx::decode(r)?;
        Self::decode_with_base(base, r)
    }
}

/// Applies operations (mints, NFT transfers) to existing UTXOs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationTx {
    pub base: BaseTx,
    pub ops: Vec<TransferableOperation>,
}

impl Encode for OperationTx {
    fn encode_into(&self, w: &mut Writer) {
        self.base.encode_into(w);
        w.put_sorted_list(&self.ops);
    }
}

impl Decode for OperationTx {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            base: BaseTx::decode(r)?,
            ops: r.get_list(MIN_OPERATION_LEN)?,
        })
    }
}

/// Consumes UTXOs exported to this chain from `source_chain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportTx {
    pub base: BaseTx,
    pub source_chain: BlockchainId,
    pub imported_ins: Vec<TransferableInput>,
}

impl Encode for ImportTx {
    fn encode_into(&self, w: &mut Writer) {
        self.base.encode_into(w);
        self.source_chain.encode_into(w);
        w.put_sorted_list(&self.imported_ins);
    }
}

impl Decode for ImportTx {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            base: BaseTx::decode(r)?,
            source_chain: BlockchainId::decode(r)?,
            imported_ins: r.get_list(MIN_INPUT_LEN)?,
        })
    }
}

/// Moves outputs into shared memory for `destination_chain` to import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportTx {
    pub base: BaseTx,
    pub destination_chain: BlockchainId,
    pub exported_outs: Vec<TransferableOutput>,
}

impl Encode for ExportTx {
    fn encode_into(&self, w: &mut Writer) {
        self.base.encode_into(w);
        self.destination_chain.encode_into(w);
        w.put_sorted_list(&self.exported_outs);
    }
}

impl Decode for ExportTx {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            base: BaseTx::decode(r)?,
            destination_chain: BlockchainId::decode(r)?,
            exported_outs: r.get_list(MIN_OUTPUT_LEN)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transaction {
    Base(BaseTx),
    CreateAsset(CreateAssetTx),
    Operation(OperationTx),
    Import(ImportTx),
    Export(ExportTx),
}

impl Transaction {
    pub fn type_id(&self) -> u32 {
        match self {
            Self::Base(_) => BASE_TX_ID,
            Self::CreateAsset(_) => CREATE_ASSET_TX_ID,
            Self::Operation(_) => OPERATION_TX_ID,
            Self::Import(_) => IMPORT_TX_ID,
            Self::Export(_) => EXPORT_TX_ID,
        }
    }

    pub fn base(&self) -> &BaseTx {
        match self {
            Self::Base(tx) => tx,
            Self::CreateAsset(tx) => &tx.base,
            Self::Operation(tx) => &tx.base,
            Self::Import(tx) => &tx.base,
            Self::Export(tx) => &tx.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut BaseTx {
        match self {
            Self::Base(tx) => tx,
            Self::CreateAsset(tx) => &mut tx.base,
            Self::Operation(tx) => &mut tx.base,
            Self::Import(tx) => &mut tx.base,
            Self::Export(tx) => &mut tx.base,
        }
    }

    /// Every input the transaction consumes, imported ones included.
    pub fn all_ins(&self) -> impl Iterator<Item = &TransferableInput> {
        let imported: &[TransferableInput] = match self {
            Self::Import(tx) => &tx.imported_ins,
            _ => &[],
        };
        self.base().ins.iter().chain(imported)
    }

    /// Every output the transaction creates, exported ones included.
    pub fn all_outs(&self) -> impl Iterator<Item = &TransferableOutput> {
        let exported: &[TransferableOutput] = match self {
            Self::Export(tx) => &tx.exported_outs,
            _ => &[],
        };
        self.base().outs.iter().chain(exported)
    }

    /// `(credential kind, signature indices)` for each input and operation,
    /// in serialized order.
    pub fn signables(&self) -> Vec<(CredentialKind, &[SigIdx])> {
        let mut out: Vec<(CredentialKind, &[SigIdx])> = self
            .base()
            .sorted_ins()
            .into_iter()
            .map(|i| (i.input.credential_kind(), i.input.sig_idxs()))
            .collect();
        match self {
            Self::Import(tx) => out.extend(
                canonical_order(&tx.imported_ins)
                    .into_iter()
                    .map(|i| (i.input.credential_kind(), i.input.sig_idxs())),
            ),
            Self::Operation(tx) => out.extend(
                canonical_order(&tx.ops)
                    .into_iter()
                    .map(|op| (op.operation.credential_kind(), op.operation.sig_idxs())),
            ),
            _ => {}
        }
        out
    }

    fn encode_body(&self, w: &mut Writer) {
        match self {
            Self::Base(tx) => tx.encode_into(w),
            Self::CreateAsset(tx) => tx.encode_into(w),
            Self::Operation(tx) => tx.encode_into(w),
            Self::Import(tx) => tx.encode_into(w),
            Self::Export(tx) => tx.encode_into(w),
        }
    }
}

impl Encode for Transaction {
    fn encode_into(&self, w: &mut Writer) {
        w.put_u32(self.type_id());
        self.encode_body(w);
    }
}

impl Decode for Transaction {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        match r.get_u32()? {
            BASE_TX_ID => Ok(Self::Base(BaseTx::decode(r)?)),
            CREATE_ASSET_TX_ID => Ok(Self::CreateAsset(CreateAssetTx::decode(r)?)),
            OPERATION_TX_ID => Ok(Self::Operation(OperationTx::decode(r)?)),
            IMPORT_TX_ID => Ok(Self::Import(ImportTx::decode(r)?)),
            EXPORT_TX_ID => Ok(Self::Export(ExportTx::decode(r)?)),
            tag => Err(CodecError::UnknownTypeTag {
                kind: "transaction",
                tag,
            }),
        }
    }
}

/// A transaction ready to be signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTx {
    pub codec_id: u16,
    pub tx: Transaction,
}

impl UnsignedTx {
    pub fn new(tx: Transaction) -> Self {
        Self {
            codec_id: LATEST_CODEC,
            tx,
        }
    }

    pub fn tx_type_id(&self) -> u32 {
        self.tx.type_id()
    }

    pub fn base(&self) -> &BaseTx {
        self.tx.base()
    }

    /// Plain-transfer amount of `asset_id` consumed, imported inputs included.
    pub fn input_total(&self, asset_id: &AssetId) -> u64 {
        let imported = match &self.tx {
            Transaction::Import(tx) => sum_inputs(&tx.imported_ins, asset_id),
            _ => 0,
        };
        self.base().input_total(asset_id).saturating_add(imported)
    }

    /// Plain-transfer amount of `asset_id` created, exported outputs included.
    pub fn output_total(&self, asset_id: &AssetId) -> u64 {
        let exported = match &self.tx {
            Transaction::Export(tx) => sum_outputs(&tx.exported_outs, asset_id),
            _ => 0,
        };
        self.base().output_total(asset_id).saturating_add(exported)
    }

    /// Amount of `asset_id` the transaction destroys. Zero when outputs
    /// exceed inputs.
    pub fn burn(&self, asset_id: &AssetId) -> u64 {
        self.input_total(asset_id)
            .saturating_sub(self.output_total(asset_id))
    }

    /// Number of credentials a complete signature carries.
    pub fn credential_count(&self) -> usize {
        self.tx.signables().len()
    }

    /// SHA-256 of the unsigned bytes; the message every signature covers.
    pub fn signing_hash(&self) -> [u8; 32] {
        sha256(&self.to_bytes())
    }

    /// Sign every input and operation with keys from `keys`.
    ///
    /// Fails without producing anything if any required key is missing.
    pub fn sign<K: KeyStore + ?Sized>(&self, keys: &K) -> Result<SignedTx, CryptoError> {
        let digest = self.signing_hash();
        let mut credentials = Vec::new();
        for (kind, sig_idxs) in self.tx.signables() {
            let mut credential = Credential::new(kind);
            for sig_idx in sig_idxs {
                let keypair = keys
                    .keypair(&sig_idx.source)
                    .ok_or(CryptoError::MissingSigningKey(sig_idx.source))?;
                credential.push(keypair.sign_digest(&digest)?);
            }
            credentials.push(credential);
        }
        tracing::debug!(
            tx_type = self.tx_type_id(),
            credentials = credentials.len(),
            "signed transaction"
        );
        Ok(SignedTx {
            unsigned: self.clone(),
            credentials,
        })
    }
}

impl Encode for UnsignedTx {
    fn encode_into(&self, w: &mut Writer) {
        w.put_u16(self.codec_id);
        self.tx.encode_into(w);
    }
}

impl Decode for UnsignedTx {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let codec_id = r.get_u16()?;
        if codec_id != LATEST_CODEC {
            return Err(CodecError::InvalidCodecVersion(codec_id));
        }
        Ok(Self {
            codec_id,
            tx: Transaction::decode(r)?,
        })
    }
}

/// An unsigned transaction plus one credential per input and operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTx {
    pub unsigned: UnsignedTx,
    pub credentials: Vec<Credential>,
}

impl SignedTx {
    /// SHA-256 of the signed bytes.
    pub fn tx_id(&self) -> TxId {
        TxId::from_bytes(sha256(&self.to_bytes()))
    }

    pub fn to_cb58(&self) -> String {
        cb58::encode(&self.to_bytes())
    }

    pub fn from_cb58(s: &str) -> Result<Self, CodecError> {
        Self::from_bytes(&cb58::decode(s)?)
    }

    /// Recover the signer of every signature, grouped per credential.
    ///
    /// Also checks that credentials line up with the inputs and operations
    /// they answer.
    pub fn signers(&self) -> Result<Vec<Vec<Address>>, CoreError> {
        let signables = self.unsigned.tx.signables();
        if signables.len() != self.credentials.len() {
            return Err(TxError::CredentialMismatch {
                credentials: self.credentials.len(),
                signables: signables.len(),
            }
            .into());
        }
        let digest = self.unsigned.signing_hash();
        let mut out = Vec::with_capacity(self.credentials.len());
        for ((kind, sig_idxs), credential) in signables.iter().zip(&self.credentials) {
            if *kind != credential.kind || sig_idxs.len() != credential.signatures.len() {
                return Err(TxError::CredentialMismatch {
                    credentials: credential.signatures.len(),
                    signables: sig_idxs.len(),
                }
                .into());
            }
            let addresses = credential
                .signatures
                .iter()
                .map(|sig| sig.recover_digest(&digest).map(|pk| pk.address()))
                .collect::<Result<Vec<_>, _>>()?;
            out.push(addresses);
        }
        Ok(out)
    }
}

impl Encode for SignedTx {
    fn encode_into(&self, w: &mut Writer) {
        self.unsigned.encode_into(w);
        w.put_list(&self.credentials);
    }
}

impl Decode for SignedTx {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            unsigned: UnsignedTx::decode(r)?,
            credentials: r.get_list(MIN_CREDENTIAL_LEN)?,
        })
    }
}
