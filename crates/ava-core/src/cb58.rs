//! Checksummed base-58 ("cb58") string encoding.
//!
//! The payload is suffixed with the last four bytes of its SHA-256 digest
//! and the result is base-58 encoded. Decoding recomputes the checksum and
//! rejects any mismatch.

use sha2::{Digest, Sha256};

use crate::constants::CHECKSUM_LEN;
use crate::error::CodecError;

fn checksum(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = Sha256::digest(payload);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest[digest.len() - CHECKSUM_LEN..]);
    out
}

/// Encode bytes as a cb58 string.
pub fn encode(payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(payload.len() + CHECKSUM_LEN);
    data.extend_from_slice(payload);
    data.extend_from_slice(&checksum(payload));
    bs58::encode(data).into_string()
}

/// Decode a cb58 string, verifying its checksum.
pub fn decode(s: &str) -> Result<Vec<u8>, CodecError> {
    let data = bs58::decode(s)
        .into_vec()
        .map_err(|e| CodecError::Base58(e.to_string()))?;
    if data.len() < CHECKSUM_LEN {
        return Err(CodecError::MalformedBuffer {
            needed: CHECKSUM_LEN,
            remaining: data.len(),
        });
    }
    let (payload, check) = data.split_at(data.len() - CHECKSUM_LEN);
    if check != checksum(payload) {
        return Err(CodecError::Checksum);
    }
    Ok(payload.to_vec())
}
