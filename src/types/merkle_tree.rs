//! Merkle trees over transaction ids, with inclusion branches.
//!
//! Behavior:
//! - An empty list of leaves yields the digest of the empty byte string.
//! - Odd levels pair their last node with itself.
//! - Every level is retained so branches need no recomputation.
//!
//! # Mutation
//!
//! Pairing the last node with itself means `[a, b, c]` and `[a, b, c, c]`
//! share a root. A block whose transaction list was padded that way keeps a
//! valid-looking header while carrying different transactions. The tree flags
//! any level holding two equal hashes at an even/odd pair, and callers must
//! reject blocks whose tree [`is_mutated`](MerkleTree::is_mutated).

use crate::types::hash::{Hash, Hasher, Sha256d};
use equiblock_derive::Error;

/// Errors returned by branch extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MerkleError {
    /// The requested leaf does not exist.
    #[error("leaf index {index} out of range for {leaves} leaves")]
    IndexOutOfRange { index: usize, leaves: usize },
}

/// A fully materialized Merkle tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleTree {
    /// `levels[0]` holds the leaves, the last level holds the root.
    levels: Vec<Vec<Hash>>,
    root: Hash,
    mutated: bool,
}

impl MerkleTree {
    /// Builds a tree with the chain digest.
    pub fn build(leaves: Vec<Hash>) -> Self {
        Self::build_with::<Sha256d>(leaves)
    }

    /// Builds a tree with the digest `H`.
    pub fn build_with<H: Hasher>(leaves: Vec<Hash>) -> Self {
        if leaves.is_empty() {
            return Self {
                levels: Vec::new(),
                root: H::digest(&[]),
                mutated: false,
            };
        }

        let mut levels = vec![leaves];
        let mut mutated = false;

        loop {
            let level = &levels[levels.len() - 1];
            let n = level.len();
            if n == 1 {
                break;
            }

            let mut next = Vec::with_capacity(n.div_ceil(2));
            for i in (0..n).step_by(2) {
                let j = (i + 1).min(n - 1);
                if j == i + 1 && level[i] == level[j] {
                    mutated = true;
                }
                next.push(H::hash_pair(&level[i], &level[j]));
            }
            levels.push(next);
        }

        let root = levels[levels.len() - 1][0];
        Self {
            levels,
            root,
            mutated,
        }
    }

    /// Returns the root hash.
    pub fn root(&self) -> Hash {
        self.root
    }

    /// Returns `true` if a duplicated pair was seen while building.
    pub fn is_mutated(&self) -> bool {
        self.mutated
    }

    /// Number of leaves the tree was built from.
    pub fn leaf_count(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    /// Every level, leaves first.
    pub fn levels(&self) -> &[Vec<Hash>] {
        &self.levels
    }

    /// Returns the sibling hashes on the path from leaf `index` to the root,
    /// bottom-up.
    pub fn branch(&self, mut index: usize) -> Result<Vec<Hash>, MerkleError> {
        let leaves = self.leaf_count();
        if index >= leaves {
            return Err(MerkleError::IndexOutOfRange { index, leaves });
        }

        let below_root = &self.levels[..self.levels.len() - 1];
        let mut branch = Vec::with_capacity(below_root.len());
        for level in below_root {
            let sibling = (index ^ 1).min(level.len() - 1);
            branch.push(level[sibling]);
            index >>= 1;
        }
        Ok(branch)
    }
}

/// Folds `leaf` with `branch` using the chain digest and returns the root
/// it implies. The caller compares it with the expected root.
pub fn check_branch(leaf: Hash, branch: &[Hash], index: usize) -> Hash {
    check_branch_with::<Sha256d>(leaf, branch, index)
}

/// [`check_branch`] with the digest `H`.
pub fn check_branch_with<H: Hasher>(leaf: Hash, branch: &[Hash], mut index: usize) -> Hash {
    let mut hash = leaf;
    for sibling in branch {
        hash = if index & 1 == 1 {
            H::hash_pair(sibling, &hash)
        } else {
            H::hash_pair(&hash, sibling)
        };
        index >>= 1;
    }
    hash
}
