//! 256-bit hash values and the digest primitives that produce them.

use crate::types::encoding::EncodeSink;
use equiblock_derive::{BinaryCodec, Error};
use sha2::{Digest, Sha256};
use sha3::Sha3_256;
use std::fmt;
use std::str::FromStr;

/// Hash length in bytes.
pub const HASH_LEN: usize = 32;

/// Opaque 256-bit value: block ids, Merkle nodes, transaction ids, nonces.
///
/// Stored in wire order. Display and parsing use the byte-reversed hex form
/// that Bitcoin-derived chains print block hashes in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Ord, PartialOrd, BinaryCodec)]
pub struct Hash(pub [u8; HASH_LEN]);

impl Hash {
    /// The all-zero hash, used as the null value.
    pub const fn zero() -> Hash {
        Hash([0u8; HASH_LEN])
    }

    /// Returns `true` if every byte is zero.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    /// Returns the hash as a byte slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Builds a hash from a 32-byte slice, or `None` for any other length.
    pub fn from_slice(bytes: &[u8]) -> Option<Hash> {
        <[u8; HASH_LEN]>::try_from(bytes).ok().map(Hash)
    }

    /// Builds a hash holding `value` in its low-order (leading wire) bytes.
    ///
    /// Matches how small integers are stored in a 256-bit nonce.
    pub fn from_low_u64(value: u64) -> Hash {
        let mut out = [0u8; HASH_LEN];
        out[..8].copy_from_slice(&value.to_le_bytes());
        Hash(out)
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; HASH_LEN]> for Hash {
    fn from(bytes: [u8; HASH_LEN]) -> Self {
        Hash(bytes)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut reversed = self.0;
        reversed.reverse();
        f.write_str(&hex::encode(reversed))
    }
}

/// Errors from parsing a hash out of its hex form.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseHashError {
    #[error("invalid hex: {0}")]
    InvalidHex(hex::FromHexError),
    #[error("expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

impl FromStr for Hash {
    type Err = ParseHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = hex::decode(s).map_err(ParseHashError::InvalidHex)?;
        bytes.reverse();
        Hash::from_slice(&bytes).ok_or(ParseHashError::InvalidLength(bytes.len()))
    }
}

/// A 256-bit digest fed incrementally through [`EncodeSink`].
///
/// Block ids and Merkle nodes are produced through this trait, so the
/// digest is chosen by type rather than hard-wired into the codec.
pub trait Hasher: Default + EncodeSink {
    /// Consumes the hasher and returns the digest.
    fn finalize(self) -> Hash;

    /// Digests a single byte string.
    fn digest(data: &[u8]) -> Hash {
        let mut hasher = Self::default();
        hasher.write(data);
        hasher.finalize()
    }

    /// Digests `left || right`, the node rule of the Merkle tree.
    fn hash_pair(left: &Hash, right: &Hash) -> Hash {
        let mut hasher = Self::default();
        hasher.write(left.as_slice());
        hasher.write(right.as_slice());
        hasher.finalize()
    }
}

/// Double SHA-256, the chain digest for block ids, transaction ids and
/// Merkle nodes.
#[derive(Clone, Default)]
pub struct Sha256d {
    inner: Sha256,
}

impl EncodeSink for Sha256d {
    fn write(&mut self, bytes: &[u8]) {
        self.inner.update(bytes);
    }
}

impl Hasher for Sha256d {
    fn finalize(self) -> Hash {
        let first = self.inner.finalize();
        Hash(Sha256::digest(first).into())
    }
}

/// SHA3-256, for callers that build trees outside the chain digest.
#[derive(Clone, Default)]
pub struct Sha3 {
    inner: Sha3_256,
}

impl EncodeSink for Sha3 {
    fn write(&mut self, bytes: &[u8]) {
        self.inner.update(bytes);
    }
}

impl Hasher for Sha3 {
    fn finalize(self) -> Hash {
        Hash(self.inner.finalize().into())
    }
}
