//! Mask derivation from a caller-supplied 64-bit seed.
//!
//! The seed drives every per-invocation randomization (coordinate blinding,
//! table layout permutation). It is expanded through SHAKE-256 so distinct
//! but related seeds (seed, seed+1, seed+2 at the different consumption
//! sites) yield unrelated byte streams.

use tiny_keccak::{Hasher, Shake};

/// Fill `out` with bytes derived from `seed`.
pub(crate) fn expand_seed(seed: u64, out: &mut [u8]) {
    let mut xof = Shake::v256();
    xof.update(&seed.to_le_bytes());
    xof.finalize(out);
}
