//! Reference-counted byte buffer used for solutions and raw payloads.

use crate::types::encoding::{Decode, DecodeError, Encode, EncodeSink, read_bytes, read_len};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// An immutable, cheaply clonable byte buffer.
///
/// Wraps `Arc<Vec<u8>>`; mutation goes through copy-on-write so a header
/// cloned for sealing never aliases the solution of the original.
/// Encoded as a CompactSize length followed by the raw bytes.
#[derive(Default, Eq, PartialEq, Hash)]
pub struct Bytes(Arc<Vec<u8>>);

impl Bytes {
    /// Creates a new buffer from anything convertible to `Vec<u8>`.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self(Arc::new(data.into()))
    }

    /// Creates an empty buffer with the given capacity.
    pub fn with_capacity(cap: usize) -> Self {
        Self(Arc::new(Vec::with_capacity(cap)))
    }

    /// Returns the number of bytes in the buffer.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the contents as a byte slice.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }

    /// Copies the contents into a new `Vec<u8>`.
    pub fn to_vec(&self) -> Vec<u8> {
        self.as_slice().to_vec()
    }

    /// Returns a mutable reference to the underlying vector, cloning it first
    /// if the buffer is shared.
    pub fn make_mut(&mut self) -> &mut Vec<u8> {
        Arc::make_mut(&mut self.0)
    }

    /// Appends bytes to the buffer.
    pub fn extend_from_slice(&mut self, s: &[u8]) {
        self.make_mut().extend_from_slice(s);
    }
}

impl Clone for Bytes {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl Deref for Bytes {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl fmt::Debug for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bytes(0x{})", hex::encode(self.as_slice()))
    }
}

impl Encode for Bytes {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        crate::types::encoding::write_compact_size(self.len() as u64, out);
        out.write(self.as_slice());
    }
}

impl Decode for Bytes {
    fn decode(input: &mut &[u8]) -> Result<Self, DecodeError> {
        let len = read_len(input)?;
        Ok(Bytes::new(read_bytes(input, len)?))
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(v: Vec<u8>) -> Self {
        Self::new(v)
    }
}

impl From<&[u8]> for Bytes {
    fn from(s: &[u8]) -> Self {
        Self::new(s)
    }
}

impl<const N: usize> From<[u8; N]> for Bytes {
    fn from(arr: [u8; N]) -> Self {
        Self::new(arr)
    }
}

impl<const N: usize> From<&[u8; N]> for Bytes {
    fn from(arr: &[u8; N]) -> Self {
        Self::new(arr.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_shares_until_mutated() {
        let original = Bytes::from(b"solution");
        let mut copy = original.clone();
        copy.extend_from_slice(b"!");

        assert_eq!(original.as_slice(), b"solution");
        assert_eq!(copy.as_slice(), b"solution!");
    }

    #[test]
    fn encoding_is_length_prefixed() {
        let bytes = Bytes::from([0xAA, 0xBB, 0xCC]);
        let encoded = bytes.to_bytes();
        assert_eq!(encoded.as_slice(), &[0x03, 0xAA, 0xBB, 0xCC]);
        assert_eq!(Bytes::from_bytes(&encoded).unwrap(), bytes);
    }

    #[test]
    fn empty_encodes_to_single_byte() {
        assert_eq!(Bytes::default().to_bytes().as_slice(), &[0x00]);
    }

    #[test]
    fn large_payload_uses_wide_prefix() {
        // 1344 bytes, the Equihash(200,9) solution size.
        let bytes = Bytes::new(vec![7u8; 1344]);
        let encoded = bytes.to_bytes();
        assert_eq!(&encoded[..3], &[0xFD, 0x40, 0x05]);
        assert_eq!(encoded.len(), 3 + 1344);
        assert_eq!(Bytes::from_bytes(&encoded).unwrap(), bytes);
    }

    #[test]
    fn short_payload_is_truncated() {
        let result = Bytes::from_bytes(&[0x04, 0x01, 0x02]);
        assert_eq!(
            result,
            Err(DecodeError::TruncatedInput {
                needed: 4,
                remaining: 2
            })
        );
    }

    #[test]
    fn debug_shows_hex() {
        assert_eq!(format!("{:?}", Bytes::from([0x01, 0xff])), "Bytes(0x01ff)");
    }
}
