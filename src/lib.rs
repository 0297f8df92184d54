//! Equihash block headers and Merkle trees.
//!
//! Provides the header codec with its restricted proof-of-work encoding,
//! blocks with Merkle commitments over their transactions, and block locators.

pub mod core;
pub mod types;
pub mod utils;
