//! Multisig/locktime ownership shared by every output type.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::codec::{Decode, Encode, Reader, Writer};
use crate::constants::ADDRESS_LEN;
use crate::error::{CodecError, TxError};

/// Current Unix time in seconds.
pub fn unix_now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}

/// Who may spend an output, and from when.
///
/// Addresses are kept in strictly ascending byte order with no duplicates,
/// and `threshold` never exceeds the number of addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "OwnersRepr")]
pub struct OutputOwners {
    locktime: u64,
    threshold: u32,
    addresses: Vec<Address>,
}

#[derive(Deserialize)]
struct OwnersRepr {
    locktime: u64,
    threshold: u32,
    addresses: Vec<Address>,
}

impl TryFrom<OwnersRepr> for OutputOwners {
    type Error = TxError;

    fn try_from(repr: OwnersRepr) -> Result<Self, TxError> {
        Self::new(repr.addresses, repr.locktime, repr.threshold)
    }
}

impl OutputOwners {
    /// Create an owner set. Addresses are sorted and deduplicated.
    pub fn new(addresses: Vec<Address>, locktime: u64, threshold: u32) -> Result<Self, TxError> {
        let mut addresses = addresses;
        addresses.sort();
        addresses.dedup();
        if threshold as usize > addresses.len() {
            return Err(TxError::Threshold {
                threshold,
                available: addresses.len(),
            });
        }
        Ok(Self {
            locktime,
            threshold,
            addresses,
        })
    }

    /// Single-signature ownership with no locktime.
    pub fn single(address: Address) -> Self {
        Self {
            locktime: 0,
            threshold: 1,
            addresses: vec![address],
        }
    }

    pub fn locktime(&self) -> u64 {
        self.locktime
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    /// Index of `address` in the owner list, or `None` if it is not an owner.
    pub fn address_index(&self, address: &Address) -> Option<u32> {
        self.addresses
            .binary_search(address)
            .ok()
            .map(|i| i as u32)
    }

    /// True iff the locktime has passed at `as_of` and at least `threshold`
    /// of `candidates` are owners.
    pub fn meets_threshold(&self, candidates: &[Address], as_of: u64) -> bool {
        if as_of <= self.locktime {
            return false;
        }
        let present = self
            .addresses
            .iter()
            .filter(|a| candidates.contains(a))
            .count();
        present >= self.threshold as usize
    }

    /// Up to `threshold` owners present in `candidates`, in owner order.
    ///
    /// The order decides which signature indices get assigned, so the scan
    /// walks the owner list rather than the candidates.
    pub fn spenders(&self, candidates: &[Address], as_of: u64) -> Vec<Address> {
        if as_of <= self.locktime {
            return Vec::new();
        }
        self.addresses
            .iter()
            .filter(|a| candidates.contains(a))
            .take(self.threshold as usize)
            .copied()
            .collect()
    }
}

impl Encode for OutputOwners {
    fn encode_into(&self, w: &mut Writer) {
        w.put_u64(self.locktime);
        w.put_u32(self.threshold);
        w.put_list(&self.addresses);
    }
}

impl Decode for OutputOwners {
    /// Only the canonical form is accepted: addresses strictly ascending and
    /// a threshold the address list can satisfy.
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let locktime = r.get_u64()?;
        let threshold = r.get_u32()?;
        let addresses: Vec<Address> = r.get_list(ADDRESS_LEN)?;
        if addresses.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(CodecError::NotSorted("owner addresses"));
        }
        if threshold as usize > addresses.len() {
            return Err(CodecError::Threshold {
                threshold,
                available: addresses.len(),
            });
        }
        Ok(Self {
            locktime,
            threshold,
            addresses,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address([b; 20])
    }

    fn two_of_three() -> OutputOwners {
        OutputOwners::new(vec![addr(3), addr(1), addr(2)], 100, 2).unwrap()
    }

    #[test]
    fn addresses_are_sorted_and_deduped() {
        let owners = OutputOwners::new(vec![addr(9), addr(1), addr(9)], 0, 1).unwrap();
        assert_eq!(owners.addresses(), &[addr(1), addr(9)]);
    }

    #[test]
    fn threshold_above_address_count_rejected() {
        assert_eq!(
            OutputOwners::new(vec![addr(1)], 0, 2).unwrap_err(),
            TxError::Threshold { threshold: 2, available: 1 }
        );
    }

    #[test]
    fn meets_threshold_after_locktime() {
        let owners = two_of_three();
        assert!(owners.meets_threshold(&[addr(1), addr(2)], 101));
        assert!(!owners.meets_threshold(&[addr(1)], 101));
        assert!(!owners.meets_threshold(&[addr(1), addr(2)], 100));
        assert!(!owners.meets_threshold(&[addr(1), addr(2)], 50));
    }

    #[test]
    fn meets_threshold_ignores_strangers() {
        let owners = two_of_three();
        assert!(!owners.meets_threshold(&[addr(1), addr(7), addr(8)], 200));
    }

    #[test]
    fn spenders_follow_owner_order_and_stop_at_threshold() {
        let owners = two_of_three();
        let spenders = owners.spenders(&[addr(3), addr(2), addr(1)], 200);
        assert_eq!(spenders, vec![addr(1), addr(2)]);
    }

    #[test]
    fn spenders_empty_while_locked() {
        assert!(two_of_three().spenders(&[addr(1), addr(2)], 100).is_empty());
    }

    #[test]
    fn address_index_lookup() {
        let owners = two_of_three();
        assert_eq!(owners.address_index(&addr(1)), Some(0));
        assert_eq!(owners.address_index(&addr(3)), Some(2));
        assert_eq!(owners.address_index(&addr(4)), None);
    }

    #[test]
    fn encoding_layout() {
        let owners = OutputOwners::new(vec![addr(2), addr(1)], 7, 1).unwrap();
        let bytes = owners.to_bytes();
        assert_eq!(bytes.len(), 8 + 4 + 4 + 2 * 20);
        assert_eq!(&bytes[..8], &7u64.to_be_bytes());
        assert_eq!(&bytes[8..12], &1u32.to_be_bytes());
        assert_eq!(&bytes[12..16], &2u32.to_be_bytes());
        assert_eq!(&bytes[16..36], &[1u8; 20]);
        assert_eq!(OutputOwners::from_bytes(&bytes).unwrap(), owners);
    }

    fn raw_owners(threshold: u32, addrs: &[Address]) -> Vec<u8> {
        let mut w = Writer::new();
        w.put_u64(0);
        w.put_u32(threshold);
        w.put_list(addrs);
        w.into_bytes()
    }

    #[test]
    fn decode_rejects_unsorted_addresses() {
        let bytes = raw_owners(1, &[addr(2), addr(1)]);
        assert_eq!(
            OutputOwners::from_bytes(&bytes).unwrap_err(),
            CodecError::NotSorted("owner addresses")
        );
    }

    #[test]
    fn decode_rejects_duplicate_addresses() {
        let bytes = raw_owners(1, &[addr(1), addr(1)]);
        assert_eq!(
            OutputOwners::from_bytes(&bytes).unwrap_err(),
            CodecError::NotSorted("owner addresses")
        );
    }

    #[test]
    fn decode_rejects_unreachable_threshold() {
        let bytes = raw_owners(5, &[addr(1), addr(2)]);
        assert_eq!(
            OutputOwners::from_bytes(&bytes).unwrap_err(),
            CodecError::Threshold { threshold: 5, available: 2 }
        );
        let bytes = raw_owners(5, &[addr(2), addr(1), addr(1)]);
        assert!(OutputOwners::from_bytes(&bytes).is_err());
    }

    #[test]
    fn decode_accepts_canonical_bytes() {
        let bytes = raw_owners(2, &[addr(1), addr(2)]);
        let owners = OutputOwners::from_bytes(&bytes).unwrap();
        assert_eq!(owners.to_bytes(), bytes);
    }

    #[test]
    fn json_goes_through_validation() {
        let owners = two_of_three();
        let json = serde_json::to_string(&owners).unwrap();
        assert_eq!(serde_json::from_str::<OutputOwners>(&json).unwrap(), owners);

        let bad = json.replace("\"threshold\":2", "\"threshold\":9");
        assert!(serde_json::from_str::<OutputOwners>(&bad).is_err());
    }

    #[test]
    fn unix_now_is_recent() {
        assert!(unix_now() > 1_600_000_000);
    }
}
