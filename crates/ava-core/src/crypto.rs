//! secp256k1 key management and recoverable ECDSA signatures.
//!
//! Uses `k256` for the curve arithmetic, SHA-256 for message hashing, and
//! RIPEMD-160 for address derivation.
//!
//! # Signature format
//!
//! A signature is 65 bytes: 32-byte `r`, 32-byte `s`, and a 1-byte
//! recovery id. `s` is always in low form, so signing the same message with
//! the same key yields identical bytes (RFC 6979 nonces).

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{RecoveryId, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use ripemd::Ripemd160;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::address::Address;
use crate::cb58;
use crate::codec::{Decode, Encode, Reader, Writer};
use crate::constants::{PRIVATE_KEY_PREFIX, SIGNATURE_LEN};
use crate::error::{CodecError, CryptoError};

/// SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Address of a compressed public key: RIPEMD-160(SHA-256(key)).
pub fn address_from_compressed(pubkey: &[u8]) -> Address {
    let sha = Sha256::digest(pubkey);
    let ripe = Ripemd160::digest(sha);
    let mut out = [0u8; 20];
    out.copy_from_slice(&ripe);
    Address(out)
}

/// A secp256k1 keypair.
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a random keypair using the OS cryptographic RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut rand::rngs::OsRng),
        }
    }

    /// Import a 32-byte private key.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_slice(bytes).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Import a `PrivateKey-<cb58>` string.
    pub fn from_private_key_string(s: &str) -> Result<Self, CryptoError> {
        let encoded = s
            .strip_prefix(PRIVATE_KEY_PREFIX)
            .ok_or(CryptoError::InvalidPrivateKey)?;
        let bytes = cb58::decode(encoded).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Self::from_secret_bytes(&bytes)
    }

    /// Raw 32-byte private key. Handle with care.
    pub fn secret_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.signing_key.to_bytes());
        out
    }

    /// The `PrivateKey-<cb58>` form of the private key.
    pub fn private_key_string(&self) -> String {
        format!("{PRIVATE_KEY_PREFIX}{}", cb58::encode(&self.secret_bytes()))
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            verifying_key: self.signing_key.verifying_key().clone(),
        }
    }

    pub fn address(&self) -> Address {
        self.public_key().address()
    }

    /// Sign a 32-byte message digest, producing a recoverable signature.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> Result<Signature, CryptoError> {
        let (sig, recid) = self
            .signing_key
            .sign_prehash_recoverable(digest)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
        let (sig, recid) = match sig.normalize_s() {
            Some(low) => (low, RecoveryId::new(!recid.is_y_odd(), recid.is_x_reduced())),
            None => (sig, recid),
        };
        let mut out = [0u8; SIGNATURE_LEN];
        out[..64].copy_from_slice(&sig.to_bytes());
        out[64] = recid.to_byte();
        Ok(Signature(out))
    }

    /// Hash `message` with SHA-256 and sign the digest.
    pub fn sign(&self, message: &[u8]) -> Result<Signature, CryptoError> {
        self.sign_digest(&sha256(message))
    }
}

impl Clone for KeyPair {
    fn clone(&self) -> Self {
        Self {
            signing_key: self.signing_key.clone(),
        }
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// A secp256k1 public key.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    verifying_key: VerifyingKey,
}

impl PublicKey {
    /// Parse a SEC1-encoded key (compressed or uncompressed).
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let verifying_key =
            VerifyingKey::from_sec1_bytes(bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self { verifying_key })
    }

    /// 33-byte compressed encoding.
    pub fn to_compressed(&self) -> [u8; 33] {
        let point = self.verifying_key.to_encoded_point(true);
        let mut out = [0u8; 33];
        out.copy_from_slice(point.as_bytes());
        out
    }

    pub fn address(&self) -> Address {
        address_from_compressed(&self.to_compressed())
    }

    /// Verify a signature over a 32-byte digest.
    pub fn verify_digest(&self, digest: &[u8; 32], signature: &Signature) -> Result<(), CryptoError> {
        let sig = signature.ecdsa()?;
        self.verifying_key
            .verify_prehash(digest, &sig)
            .map_err(|_| CryptoError::VerificationFailed)
    }

    /// Hash `message` with SHA-256 and verify the signature over the digest.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        self.verify_digest(&sha256(message), signature).is_ok()
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.to_compressed()))
    }
}

impl std::hash::Hash for PublicKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.to_compressed().hash(state);
    }
}

/// A 65-byte recoverable ECDSA signature: `r ‖ s ‖ recovery id`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature(pub [u8; SIGNATURE_LEN]);

impl Signature {
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }

    fn ecdsa(&self) -> Result<k256::ecdsa::Signature, CryptoError> {
        k256::ecdsa::Signature::from_slice(&self.0[..64]).map_err(|_| CryptoError::InvalidSignature)
    }

    fn recovery_id(&self) -> Result<RecoveryId, CryptoError> {
        RecoveryId::from_byte(self.0[64]).ok_or(CryptoError::InvalidSignature)
    }

    /// Recover the public key that produced this signature over `digest`.
    pub fn recover_digest(&self, digest: &[u8; 32]) -> Result<PublicKey, CryptoError> {
        let verifying_key =
            VerifyingKey::recover_from_prehash(digest, &self.ecdsa()?, self.recovery_id()?)
                .map_err(|_| CryptoError::RecoveryFailed)?;
        Ok(PublicKey { verifying_key })
    }

    /// Hash `message` with SHA-256 and recover the signer's public key.
    pub fn recover(&self, message: &[u8]) -> Result<PublicKey, CryptoError> {
        self.recover_digest(&sha256(message))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", hex::encode(self.0))
    }
}

impl Encode for Signature {
    fn encode_into(&self, w: &mut Writer) {
        w.put_fixed(&self.0);
    }
}

impl Decode for Signature {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self(r.get_array()?))
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        let arr: [u8; SIGNATURE_LEN] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("signature must be 65 bytes"))?;
        Ok(Self(arr))
    }
}
