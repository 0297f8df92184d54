//! Proof-of-work sealing.
//!
//! The Equihash search itself is external. A [`Solver`] receives the
//! restricted header encoding and a candidate nonce, and either returns a
//! solution or declines the nonce.

use crate::core::header::{Header, HeaderPayload};
use crate::types::bytes::Bytes;
use crate::types::encoding::Encode;
use crate::types::hash::Hash;
use crate::{debug, info, warn};

/// An external proof-of-work search.
pub trait Solver {
    type Error;

    /// Searches for a solution over `input` with `nonce`.
    ///
    /// Returns `Ok(None)` when no solution exists for this nonce.
    fn solve(&mut self, input: &[u8], nonce: &Hash) -> Result<Option<Bytes>, Self::Error>;
}

/// Tries each nonce in turn and returns the first sealed copy of `header`.
///
/// The restricted encoding is computed once and reused across candidates.
/// `header` is never modified. Returns `Ok(None)` if every nonce is declined
/// and stops at the first solver error.
pub fn seal<P, S, I>(
    header: &Header<P>,
    nonces: I,
    solver: &mut S,
) -> Result<Option<Header<P>>, S::Error>
where
    P: HeaderPayload,
    S: Solver,
    I: IntoIterator<Item = Hash>,
{
    let input = header.equihash_input().to_bytes();
    let mut tried = 0u64;

    for nonce in nonces {
        tried += 1;
        debug!("trying nonce {}", nonce);

        if let Some(solution) = solver.solve(&input, &nonce)? {
            let sealed = header.with_solution(nonce, solution);
            info!(
                "sealed header {} after {} nonces ({} byte solution)",
                sealed.hash(),
                tried,
                sealed.solution.len()
            );
            return Ok(Some(sealed));
        }
    }

    warn!("no solution found after {} nonces", tried);
    Ok(None)
}
