//! Header codec and Merkle benchmark binary.
//!
//! Measures header encoding, hashing and decoding, and Merkle tree building,
//! branch extraction and branch checking over growing transaction counts.
//! Run with: `cargo run --release --bin bench`

use std::hint::black_box;
use std::time::{Duration, Instant};

use equiblock::core::block::Block;
use equiblock::core::header::{BlockHeader, CURRENT_VERSION, Header, HeaderFields};
use equiblock::types::bytes::Bytes;
use equiblock::types::encoding::{Decode, Encode};
use equiblock::types::hash::{Hash, Hasher, Sha3, Sha256d};
use equiblock::types::merkle_tree::{MerkleTree, check_branch};
use equiblock::utils::log::SHOW_TIMESTAMP;
use equiblock::{info, warn};
use std::sync::atomic::Ordering;

/// Equihash(200,9) solution length.
const SOLUTION_LEN: usize = 1344;

// ---------------------------------------------------------------------------
// Benchmark harness
// ---------------------------------------------------------------------------

struct BenchResult {
    name: String,
    iterations: u64,
    total: Duration,
    /// Bytes or hashes processed per run (None to omit column).
    units: Option<u64>,
}

impl BenchResult {
    fn avg(&self) -> Duration {
        self.total / self.iterations.max(1) as u32
    }

    fn print(&self) {
        let ns_per_op = self.avg().as_nanos();
        let ns_per_unit = self
            .units
            .filter(|&n| n > 0)
            .map(|n| format!("{:>8.1}", ns_per_op as f64 / n as f64))
            .unwrap_or_else(|| "       -".to_string());
        println!(
            "  {:<30} {:>9} iters {:>10.3} us/iter  {} ns/unit",
            self.name,
            self.iterations,
            ns_per_op as f64 / 1000.0,
            ns_per_unit,
        );
    }
}

/// Runs `f` for at least `min_duration`, returning aggregated results.
fn bench<F, R>(
    name: impl Into<String>,
    min_duration: Duration,
    units: Option<u64>,
    mut f: F,
) -> BenchResult
where
    F: FnMut() -> R,
{
    // Warmup
    for _ in 0..5 {
        black_box(f());
    }

    let mut iterations = 0u64;
    let start = Instant::now();
    while start.elapsed() < min_duration {
        black_box(f());
        iterations += 1;
    }

    BenchResult {
        name: name.into(),
        iterations,
        total: start.elapsed(),
        units,
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn sealed_header() -> BlockHeader {
    Header {
        fields: HeaderFields {
            version: CURRENT_VERSION,
            prev_block: Sha256d::digest(b"parent"),
            merkle_root: Sha256d::digest(b"root"),
            reserved: Hash::zero(),
            time: 1_600_000_000,
            bits: 0x1d00ffff,
        },
        nonce: Hash::from_low_u64(42),
        solution: Bytes::new(vec![0x5a; SOLUTION_LEN]),
    }
}

fn leaves(n: u64) -> Vec<Hash> {
    (0..n).map(|i| Sha256d::digest(&i.to_le_bytes())).collect()
}

fn transactions(n: u64) -> Vec<Bytes> {
    (0..n).map(|i| Bytes::new(i.to_le_bytes().repeat(32))).collect()
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    SHOW_TIMESTAMP.store(false, Ordering::Relaxed);
    let min = Duration::from_secs(2);

    println!("Header and Merkle benchmarks (each runs for >= 2s)\n");
    println!(
        "  {:<30} {:>9}       {:>14}  {:>10}",
        "benchmark", "iters", "avg time", "ns/unit"
    );
    println!("  {}", "-".repeat(74));

    // 1. Header codec, units are encoded bytes
    let header = sealed_header();
    let encoded = header.to_bytes();
    let len = encoded.len() as u64;

    bench("header_encode", min, Some(len), || header.to_bytes()).print();
    bench("header_equihash_input", min, None, || {
        header.equihash_input().to_bytes()
    })
    .print();
    bench("header_hash", min, Some(len), || header.hash()).print();
    bench("header_decode", min, Some(len), || {
        BlockHeader::from_bytes(&encoded).is_ok()
    })
    .print();

    // 2. Merkle trees, units are leaves
    for n in [16u64, 256, 4096] {
        let input = leaves(n);
        bench(format!("merkle_build({n})"), min, Some(n), || {
            MerkleTree::build(input.clone()).root()
        })
        .print();
        bench(format!("merkle_build_sha3({n})"), min, Some(n), || {
            MerkleTree::build_with::<Sha3>(input.clone()).root()
        })
        .print();

        let tree = MerkleTree::build(input.clone());
        let last = (n - 1) as usize;
        bench(format!("merkle_branch({n})"), min, None, || {
            tree.branch(last).map_or(0, |b| b.len())
        })
        .print();

        let branch = match tree.branch(last) {
            Ok(branch) => branch,
            Err(e) => {
                warn!("skipping branch check for {} leaves: {}", n, e);
                continue;
            }
        };
        bench(format!("merkle_check({n})"), min, Some(branch.len() as u64), || {
            check_branch(input[last], &branch, last) == tree.root()
        })
        .print();
    }

    // 3. Block trees from raw transactions, cache excluded
    for n in [16u64, 1024] {
        let block = Block::new(sealed_header(), transactions(n));
        let txs = transactions(n);
        bench(format!("block_merkle_root({n})"), min, Some(n), || {
            block.with_transactions(txs.clone()).build_merkle_root()
        })
        .print();
    }

    println!();
    info!("benchmarks finished");
}
