//! Blocks: a primary header plus the transactions its Merkle root commits to.

use crate::core::header::BlockHeader;
use crate::types::encoding::{Decode, DecodeError, Encode, EncodeSink};
use crate::types::hash::{Hash, Sha256d};
use crate::types::merkle_tree::{MerkleError, MerkleTree, check_branch};
use crate::warn;
use std::fmt;
use std::sync::OnceLock;

/// Immutable block containing a header and transactions.
///
/// Transactions are opaque: anything with a canonical encoding works, and its
/// id is the chain digest of that encoding. The Merkle tree over those ids is
/// built on first use and cached for the lifetime of the block.
pub struct Block<T: Encode> {
    header: BlockHeader,
    transactions: Box<[T]>,

    /// Lazily built transaction tree, do not use directly.
    merkle_tree: OnceLock<MerkleTree>,
}

impl<T: Encode> Block<T> {
    /// Creates a block from a header and its transactions.
    pub fn new(header: BlockHeader, transactions: Vec<T>) -> Self {
        Self {
            header,
            transactions: transactions.into_boxed_slice(),
            merkle_tree: OnceLock::new(),
        }
    }

    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn transactions(&self) -> &[T] {
        &self.transactions
    }

    /// Block id, the hash of the header.
    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    pub fn block_time(&self) -> i64 {
        self.header.block_time()
    }

    /// Returns the transaction tree, building it on first call.
    ///
    /// Logs a warning if the transaction list was mutated; the caller decides
    /// whether to reject the block.
    pub fn merkle_tree(&self) -> &MerkleTree {
        self.merkle_tree.get_or_init(|| {
            let ids = self
                .transactions
                .iter()
                .map(|tx| tx.hash_with::<Sha256d>())
                .collect();
            let tree = MerkleTree::build(ids);
            if tree.is_mutated() {
                warn!(
                    "block {} has a mutated transaction list ({} transactions)",
                    self.header.hash(),
                    self.transactions.len()
                );
            }
            tree
        })
    }

    /// Merkle root over the transactions and whether the list was mutated.
    ///
    /// The root is computed from the body; it is not read from the header.
    pub fn build_merkle_root(&self) -> (Hash, bool) {
        let tree = self.merkle_tree();
        (tree.root(), tree.is_mutated())
    }

    /// Inclusion branch for the transaction at `index`.
    pub fn merkle_branch(&self, index: usize) -> Result<Vec<Hash>, MerkleError> {
        self.merkle_tree().branch(index)
    }

    /// Root implied by `leaf` and `branch` at `index`.
    pub fn check_merkle_branch(leaf: Hash, branch: &[Hash], index: usize) -> Hash {
        check_branch(leaf, branch, index)
    }

    /// Returns a block with the same header and a new body.
    pub fn with_transactions(&self, transactions: Vec<T>) -> Self {
        Self::new(self.header.clone(), transactions)
    }

    pub fn into_header(self) -> BlockHeader {
        self.header
    }
}

impl<T: Encode> From<BlockHeader> for Block<T> {
    fn from(header: BlockHeader) -> Self {
        Self::new(header, Vec::new())
    }
}

impl<T: Encode + Clone> Clone for Block<T> {
    fn clone(&self) -> Self {
        Self {
            header: self.header.clone(),
            transactions: self.transactions.clone(),
            merkle_tree: self.merkle_tree.clone(),
        }
    }
}

// The tree cache is derived from the body, so it takes no part in equality.
impl<T: Encode + PartialEq> PartialEq for Block<T> {
    fn eq(&self, other: &Self) -> bool {
        self.header == other.header && self.transactions == other.transactions
    }
}

impl<T: Encode + Eq> Eq for Block<T> {}

impl<T: Encode + fmt::Debug> fmt::Debug for Block<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("header", &self.header)
            .field("transactions", &self.transactions)
            .finish_non_exhaustive()
    }
}

impl<T: Encode> fmt::Display for Block<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Block({})", self.header)?;
        for (i, tx) in self.transactions.iter().enumerate() {
            writeln!(f, "  tx[{i}] {}", tx.hash_with::<Sha256d>())?;
        }
        write!(f, "  merkle_tree:")?;
        for hash in self.merkle_tree().levels().iter().flatten() {
            write!(f, " {hash}")?;
        }
        Ok(())
    }
}

impl<T: Encode> Encode for Block<T> {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.header.encode(out);
        self.transactions.encode(out);
    }
}

impl<T: Encode + Decode> Decode for Block<T> {
    fn decode(input: &mut &[u8]) -> Result<Self, DecodeError> {
        let header = BlockHeader::decode(input)?;
        let transactions = Box::<[T]>::decode(input)?;
        Ok(Self {
            header,
            transactions,
            merkle_tree: OnceLock::new(),
        })
    }
}
