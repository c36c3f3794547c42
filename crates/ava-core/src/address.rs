//! Address encoding.
//!
//! An address is the 20-byte RIPEMD-160 of the SHA-256 of a compressed
//! secp256k1 public key. Its human-readable form is
//! `<chain-alias>-<bech32(hrp, address)>`, for example `X-avax1...` on
//! mainnet or `P-fuji1...` on the Fuji test network.

use bech32::{Bech32, Hrp};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::codec::{Decode, Encode, Reader, Writer};
use crate::constants::{ADDRESS_LEN, ChainAlias};
use crate::error::{AddressError, CodecError};

/// A raw 20-byte address, ordered by byte comparison.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    pub fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Build an address from a slice that must be exactly 20 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
        let arr: [u8; ADDRESS_LEN] = bytes
            .try_into()
            .map_err(|_| AddressError::InvalidLength(bytes.len()))?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Human-readable form on `chain` for a network with prefix `hrp`.
    pub fn to_address_string(&self, chain: ChainAlias, hrp: &str) -> Result<String, AddressError> {
        format_address(chain.as_str(), hrp, self)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", hex::encode(self.0))
    }
}

impl Encode for Address {
    fn encode_into(&self, w: &mut Writer) {
        w.put_fixed(&self.0);
    }
}

impl Decode for Address {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self(r.get_array()?))
    }
}

/// Format `address` as `<chain>-<bech32(hrp, address)>`.
pub fn format_address(chain: &str, hrp: &str, address: &Address) -> Result<String, AddressError> {
    let hrp = Hrp::parse(hrp).map_err(|e| AddressError::Bech32(e.to_string()))?;
    let encoded = bech32::encode::<Bech32>(hrp, address.as_bytes())
        .map_err(|e| AddressError::Bech32(e.to_string()))?;
    Ok(format!("{chain}-{encoded}"))
}

/// A parsed human-readable address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAddress {
    pub chain: String,
    pub hrp: String,
    pub address: Address,
}

/// Parse `<chain>-<bech32>` without checking which chain or network it names.
pub fn parse_address(s: &str) -> Result<ParsedAddress, AddressError> {
    let (chain, rest) = s
        .split_once('-')
        .ok_or_else(|| AddressError::InvalidFormat(format!("missing chain alias in {s:?}")))?;
    if chain.is_empty() || rest.is_empty() {
        return Err(AddressError::InvalidFormat(s.to_string()));
    }
    let (hrp, data) = bech32::decode(rest).map_err(|e| AddressError::Bech32(e.to_string()))?;
    let address = Address::from_slice(&data)?;
    Ok(ParsedAddress {
        chain: chain.to_string(),
        hrp: hrp.to_lowercase(),
        address,
    })
}

/// Parse an address that must belong to `chain` on the network with `hrp`.
pub fn parse_address_for(s: &str, chain: ChainAlias, hrp: &str) -> Result<Address, AddressError> {
    let parsed = parse_address(s)?;
    if parsed.chain != chain.as_str() {
        return Err(AddressError::UnexpectedChain {
            expected: chain.as_str().to_string(),
            got: parsed.chain,
        });
    }
    if parsed.hrp != hrp.to_ascii_lowercase() {
        return Err(AddressError::UnexpectedHrp {
            expected: hrp.to_string(),
            got: parsed.hrp,
        });
    }
    Ok(parsed.address)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Address {
        Address([0xAB; 20])
    }

    #[test]
    fn format_starts_with_alias_and_hrp() {
        let s = sample().to_address_string(ChainAlias::X, "avax").unwrap();
        assert!(s.starts_with("X-avax1"));
        assert_eq!(s, s.to_ascii_lowercase().replacen("x-", "X-", 1));
    }

    #[test]
    fn round_trip() {
        let s = format_address("P", "fuji", &sample()).unwrap();
        let parsed = parse_address(&s).unwrap();
        assert_eq!(parsed.chain, "P");
        assert_eq!(parsed.hrp, "fuji");
        assert_eq!(parsed.address, sample());
    }

    #[test]
    fn parse_for_accepts_matching_chain_and_hrp() {
        let s = format_address("X", "local", &sample()).unwrap();
        assert_eq!(parse_address_for(&s, ChainAlias::X, "local").unwrap(), sample());
    }

    #[test]
    fn parse_for_rejects_wrong_chain() {
        let s = format_address("X", "avax", &sample()).unwrap();
        assert!(matches!(
            parse_address_for(&s, ChainAlias::P, "avax").unwrap_err(),
            AddressError::UnexpectedChain { .. }
        ));
    }

    #[test]
    fn parse_for_rejects_wrong_hrp() {
        let s = format_address("X", "fuji", &sample()).unwrap();
        assert!(matches!(
            parse_address_for(&s, ChainAlias::X, "avax").unwrap_err(),
            AddressError::UnexpectedHrp { .. }
        ));
    }

    #[test]
    fn parse_rejects_missing_alias() {
        assert!(matches!(
            parse_address("avax1qqqq").unwrap_err(),
            AddressError::InvalidFormat(_)
        ));
    }

    #[test]
    fn parse_rejects_bad_checksum() {
        let mut s = format_address("X", "avax", &sample()).unwrap();
        let last = s.pop().unwrap();
        s.push(if last == 'q' { 'p' } else { 'q' });
        assert!(matches!(parse_address(&s).unwrap_err(), AddressError::Bech32(_)));
    }

    #[test]
    fn parse_rejects_wrong_payload_length() {
        let hrp = Hrp::parse("avax").unwrap();
        let encoded = bech32::encode::<Bech32>(hrp, &[1u8; 32]).unwrap();
        assert_eq!(
            parse_address(&format!("X-{encoded}")).unwrap_err(),
            AddressError::InvalidLength(32)
        );
    }

    #[test]
    fn ordering_is_bytewise() {
        let mut lo = [0u8; 20];
        lo[19] = 0xFF;
        let mut hi = [0u8; 20];
        hi[0] = 1;
        assert!(Address(lo) < Address(hi));
    }

    #[test]
    fn from_slice_checks_length() {
        assert_eq!(Address::from_slice(&[0u8; 19]).unwrap_err(), AddressError::InvalidLength(19));
        assert!(Address::from_slice(&[0u8; 20]).is_ok());
    }
}
