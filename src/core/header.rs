//! Block headers and their proof-of-work input projection.
//!
//! A header is a payload of consensus fields followed by the Equihash
//! `nonce` and `solution`. Two payload families share one codec:
//!
//! - [`HeaderFields`]: version, parent, Merkle root, reserved hash, time, bits
//! - [`LegacyFields`]: a single aggregate hash standing in for a full header
//!
//! The restricted encoding ([`EquihashInput`]) is the payload alone, so it is
//! always a byte-exact prefix of the full encoding.

use crate::types::bytes::Bytes;
use crate::types::encoding::{Decode, Encode, EncodeSink};
use crate::types::hash::{HASH_LEN, Hash, Sha256d};
use equiblock_derive::BinaryCodec;
use std::fmt;

/// Header version written by [`HeaderFields::null`].
pub const CURRENT_VERSION: i32 = 4;

/// Encoded size of [`HeaderFields`], i.e. of the Equihash input.
pub const EQUIHASH_INPUT_SIZE: usize = 4 + HASH_LEN * 3 + 4 + 4;

/// Fixed-size prefix of a full primary header, nonce included, solution excluded.
pub const HEADER_SIZE: usize = EQUIHASH_INPUT_SIZE + HASH_LEN;

/// Encoded size of [`LegacyFields`].
pub const LEGACY_HEADER_SIZE: usize = HASH_LEN;

/// The part of a header covered by the proof of work.
pub trait HeaderPayload: Encode + Decode + Clone + fmt::Debug + PartialEq + Eq {
    /// Encoded size in bytes. Payloads are fixed width.
    const SIZE: usize;

    /// The canonical null payload.
    fn null() -> Self;

    /// Returns `true` if the payload marks an uninitialized header.
    fn is_null(&self) -> bool;
}

/// Consensus fields of a primary header, in wire order.
#[derive(Clone, Debug, PartialEq, Eq, BinaryCodec)]
pub struct HeaderFields {
    /// Format version.
    pub version: i32,
    /// Hash of the parent block.
    pub prev_block: Hash,
    /// Root of the transaction Merkle tree.
    pub merkle_root: Hash,
    /// Reserved by the format; carried verbatim.
    pub reserved: Hash,
    /// Unix timestamp in seconds.
    pub time: u32,
    /// Compact difficulty target. Zero means the header is null.
    pub bits: u32,
}

impl HeaderPayload for HeaderFields {
    const SIZE: usize = EQUIHASH_INPUT_SIZE;

    fn null() -> Self {
        Self {
            version: CURRENT_VERSION,
            prev_block: Hash::zero(),
            merkle_root: Hash::zero(),
            reserved: Hash::zero(),
            time: 0,
            bits: 0,
        }
    }

    fn is_null(&self) -> bool {
        self.bits == 0
    }
}

impl Default for HeaderFields {
    fn default() -> Self {
        Self::null()
    }
}

/// Reduced payload: the whole consensus header collapsed into one hash.
#[derive(Clone, Debug, Default, PartialEq, Eq, BinaryCodec)]
pub struct LegacyFields {
    /// Aggregate hash of the full header this payload stands in for.
    pub header_hash: Hash,
}

impl HeaderPayload for LegacyFields {
    const SIZE: usize = LEGACY_HEADER_SIZE;

    fn null() -> Self {
        Self {
            header_hash: Hash::zero(),
        }
    }

    fn is_null(&self) -> bool {
        self.header_hash.is_zero()
    }
}

/// A mined (or to-be-mined) block header.
#[derive(Clone, Debug, PartialEq, Eq, BinaryCodec)]
pub struct Header<P: HeaderPayload> {
    /// Fields covered by the proof of work.
    pub fields: P,
    /// 256-bit value searched by the solver.
    pub nonce: Hash,
    /// Equihash solution; opaque to the codec.
    pub solution: Bytes,
}

/// Primary header.
pub type BlockHeader = Header<HeaderFields>;

/// Single-hash legacy header.
pub type LegacyHeader = Header<LegacyFields>;

impl<P: HeaderPayload> Header<P> {
    /// Creates a null header.
    pub fn new() -> Self {
        Self::from_fields(P::null())
    }

    /// Creates a header with the given payload, a zero nonce and no solution.
    pub fn from_fields(fields: P) -> Self {
        Self {
            fields,
            nonce: Hash::zero(),
            solution: Bytes::default(),
        }
    }

    /// Returns `true` if the header is uninitialized.
    pub fn is_null(&self) -> bool {
        self.fields.is_null()
    }

    /// Resets every field to the null value.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Block id: double SHA-256 of the full encoding.
    pub fn hash(&self) -> Hash {
        self.hash_with::<Sha256d>()
    }

    /// The restricted view fed to the proof-of-work search.
    pub fn equihash_input(&self) -> EquihashInput<'_, P> {
        project_restricted(self)
    }

    /// Returns a copy of this header carrying `nonce` and `solution`.
    pub fn with_solution(&self, nonce: Hash, solution: impl Into<Bytes>) -> Self {
        Self {
            fields: self.fields.clone(),
            nonce,
            solution: solution.into(),
        }
    }
}

impl<P: HeaderPayload> Default for Header<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockHeader {
    /// Header timestamp widened for arithmetic.
    pub fn block_time(&self) -> i64 {
        i64::from(self.fields.time)
    }
}

impl fmt::Display for BlockHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = &self.fields;
        write!(
            f,
            "BlockHeader(hash={}, version={}, prev_block={}, merkle_root={}, reserved={}, time={}, bits={:08x}, nonce={}, solution={} bytes)",
            self.hash(),
            fields.version,
            fields.prev_block,
            fields.merkle_root,
            fields.reserved,
            fields.time,
            fields.bits,
            self.nonce,
            self.solution.len(),
        )
    }
}

impl fmt::Display for LegacyHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LegacyHeader(hash={}, header_hash={}, nonce={}, solution={} bytes)",
            self.hash(),
            self.fields.header_hash,
            self.nonce,
            self.solution.len(),
        )
    }
}

/// Read-only projection of a header without `nonce` and `solution`.
///
/// Its encoding is the exact byte string the proof-of-work search hashes.
#[derive(Debug, PartialEq, Eq)]
pub struct EquihashInput<'a, P: HeaderPayload>(&'a P);

impl<P: HeaderPayload> EquihashInput<'_, P> {
    /// The projected payload.
    pub fn fields(&self) -> &P {
        self.0
    }
}

impl<P: HeaderPayload> Encode for EquihashInput<'_, P> {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.0.encode(out);
    }
}

/// Projects a header onto its proof-of-work input.
pub fn project_restricted<P: HeaderPayload>(header: &Header<P>) -> EquihashInput<'_, P> {
    EquihashInput(&header.fields)
}
