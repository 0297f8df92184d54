//! Test utilities.

#[cfg(test)]
pub mod utils {
    use crate::types::hash::{HASH_LEN, Hash};
    use std::sync::atomic::{AtomicU64, Ordering};

    static COUNTER: AtomicU64 = AtomicU64::new(1);

    /// Returns a distinct, non-zero hash on every call.
    ///
    /// The counter sits in the leading bytes and the tail is filled with a
    /// marker, so two values never collide within a test run.
    pub fn random_hash() -> Hash {
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut value = [0xA5u8; HASH_LEN];
        value[..8].copy_from_slice(&n.to_le_bytes());
        Hash(value)
    }
}
