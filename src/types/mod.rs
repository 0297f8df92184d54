//! Primitive types shared by the header codec and the Merkle engine.
//!
//! - `Hash`: 32-byte opaque value, plus the `Hasher` digest seam
//! - `Encode`/`Decode`: the deterministic wire codec
//! - `Bytes`: shared byte buffer for variable-length payloads
//! - `MerkleTree`: tree, branches and mutation detection

pub mod bytes;
pub mod encoding;
pub mod hash;
pub mod merkle_tree;
