//! Uniform index selection backed by the operating system CSPRNG

use rand::RngCore;
use rand::rngs::OsRng;

use crate::domain::DomainError;

/// Uniformly random index in `[0, len)`. `len == 0` yields `0` so callers
/// never build an empty range; they decide what an empty pool means.
///
/// Draws come straight from `OsRng` and are rejection sampled, so a failing
/// entropy source surfaces as a `Generation` error instead of a panic.
pub fn random_index(len: usize) -> Result<usize, DomainError> {
    if len <= 1 {
        return Ok(0);
    }

    let bound = len as u64;
    // Largest multiple of `bound` that fits; draws at or above it are biased
    let limit = u64::MAX - u64::MAX % bound;
    let mut buf = [0u8; 8];

    loop {
        OsRng.try_fill_bytes(&mut buf).map_err(|e| {
            DomainError::generation(format!("failed to generate a random slice index: {}", e))
        })?;

        let value = u64::from_le_bytes(buf);
        if value < limit {
            return Ok((value % bound) as usize);
        }
    }
}
