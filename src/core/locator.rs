//! Block locators: a sparse list of known block ids, newest first, that a peer
//! uses to find the last block two chains have in common.

use crate::types::encoding::{Decode, DecodeError, Encode, EncodeSink};
use crate::types::hash::Hash;

/// Stream version written ahead of a locator on the network and on disk.
pub const PROTOCOL_VERSION: i32 = 170_002;

/// Destination of an encoding. Hashing streams omit the version field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    Network,
    Disk,
    GetHash,
}

impl Purpose {
    fn carries_version(self) -> bool {
        self != Purpose::GetHash
    }
}

/// Known block ids ordered newest to oldest.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockLocator {
    pub have: Vec<Hash>,
}

impl BlockLocator {
    pub fn new(have: Vec<Hash>) -> Self {
        Self { have }
    }

    /// Returns `true` if the locator holds no ids.
    pub fn is_null(&self) -> bool {
        self.have.is_empty()
    }

    pub fn clear(&mut self) {
        self.have.clear();
    }

    /// Writes the locator for `purpose`, prefixed by `version` unless the
    /// stream is being hashed.
    pub fn encode_for<S: EncodeSink>(&self, purpose: Purpose, version: i32, out: &mut S) {
        if purpose.carries_version() {
            version.encode(out);
        }
        self.have.encode(out);
    }

    /// Reads a locator written by [`encode_for`](Self::encode_for) with the
    /// same `purpose`. The version is `None` for hashing streams.
    pub fn decode_for(
        purpose: Purpose,
        input: &mut &[u8],
    ) -> Result<(Option<i32>, Self), DecodeError> {
        let version = if purpose.carries_version() {
            Some(i32::decode(input)?)
        } else {
            None
        };
        let have = Vec::<Hash>::decode(input)?;
        Ok((version, Self { have }))
    }
}

impl Encode for BlockLocator {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.encode_for(Purpose::GetHash, PROTOCOL_VERSION, out);
    }
}

impl Decode for BlockLocator {
    fn decode(input: &mut &[u8]) -> Result<Self, DecodeError> {
        Self::decode_for(Purpose::GetHash, input).map(|(_, locator)| locator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::utils::random_hash;

    fn locator(n: usize) -> BlockLocator {
        BlockLocator::new((0..n).map(|_| random_hash()).collect())
    }

    fn encoded(locator: &BlockLocator, purpose: Purpose) -> Vec<u8> {
        let mut out = Vec::new();
        locator.encode_for(purpose, PROTOCOL_VERSION, &mut out);
        out
    }

    #[test]
    fn network_form_carries_version() {
        let loc = locator(2);
        let bytes = encoded(&loc, Purpose::Network);

        assert_eq!(bytes.len(), 4 + 1 + 64);
        assert_eq!(&bytes[..4], &PROTOCOL_VERSION.to_le_bytes());
        assert_eq!(bytes[4], 2);
        assert_eq!(&bytes[5..37], loc.have[0].as_slice());
    }

    #[test]
    fn hash_form_omits_version() {
        let loc = locator(2);
        let network = encoded(&loc, Purpose::Network);
        let hashing = encoded(&loc, Purpose::GetHash);

        assert_eq!(hashing.len(), 1 + 64);
        assert_eq!(hashing.as_slice(), &network[4..]);
        assert_eq!(loc.to_bytes().as_slice(), hashing.as_slice());
    }

    #[test]
    fn disk_form_matches_network_form() {
        let loc = locator(3);
        assert_eq!(encoded(&loc, Purpose::Disk), encoded(&loc, Purpose::Network));
    }

    #[test]
    fn decode_for_each_purpose() {
        let loc = locator(4);
        for purpose in [Purpose::Network, Purpose::Disk, Purpose::GetHash] {
            let bytes = encoded(&loc, purpose);
            let mut input = bytes.as_slice();
            let (version, decoded) = BlockLocator::decode_for(purpose, &mut input).unwrap();

            assert_eq!(decoded, loc);
            assert!(input.is_empty());
            assert_eq!(version, purpose.carries_version().then_some(PROTOCOL_VERSION));
        }
    }

    #[test]
    fn empty_locator_is_null() {
        let mut loc = locator(3);
        assert!(!loc.is_null());

        loc.clear();
        assert!(loc.is_null());
        assert_eq!(loc.to_bytes().as_slice(), &[0x00]);
        assert!(BlockLocator::default().is_null());
    }

    #[test]
    fn truncated_locator() {
        let bytes = encoded(&locator(2), Purpose::Network);
        let mut input = &bytes[..bytes.len() - 1];
        assert!(matches!(
            BlockLocator::decode_for(Purpose::Network, &mut input),
            Err(DecodeError::TruncatedInput { .. })
        ));
    }
}
