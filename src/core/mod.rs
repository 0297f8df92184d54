//! Chain data structures.
//!
//! - `Header`: consensus fields plus the Equihash nonce and solution
//! - `Block`: immutable header and transactions with a cached Merkle tree
//! - `BlockLocator`: newest-first list of known block ids
//! - `pow`: the seam to an external Equihash solver

pub mod block;
pub mod header;
pub mod locator;
pub mod pow;
