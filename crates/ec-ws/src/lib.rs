//! Constant-time arithmetic for short Weierstrass curves y² = x³ - 3x + b
//! over a prime field, with a fixed-base fast path for NIST P-256.
//!
//! The crate exposes two handles: [`EcContext`] freezes one curve's
//! parameters, [`EcPoint`] carries a projective point and the group
//! operations, most importantly scalar multiplication. The multiplication
//! ladders are built from the complete Renes–Costello–Batina formulae, read
//! their precomputed tables through obliviously-indexed memory, and (for a
//! nonzero caller seed) blind both the scalar and the projective
//! coordinates, so neither control flow nor the address trace depends on
//! secret scalar bits.
//!
//! ```
//! use ec_ws::{EcContext, EcPoint};
//!
//! # fn main() -> Result<(), ec_ws::Error> {
//! // NIST P-256 parameters, big-endian.
//! let p = hex::decode("ffffffff00000001000000000000000000000000ffffffffffffffffffffffff").unwrap();
//! let b = hex::decode("5ac635d8aa3a93e7b3ebbd55769886bc651d06b0cc53b0f63bce3c3e27d2604b").unwrap();
//! let n = hex::decode("ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551").unwrap();
//! let gx = hex::decode("6b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296").unwrap();
//! let gy = hex::decode("4fe342e2fe1a7f9b8ee7eb4a7c0f9e162bce33576b315ececbb6406837bf51f5").unwrap();
//!
//! let ctx = EcContext::new(&p, &b, &n, 0x1234_5678)?;
//! let mut point = EcPoint::new(&ctx, &gx, &gy)?;
//! point.scalar(&[0x02], 0x9876_5432)?;
//!
//! let mut x = vec![0u8; ctx.bytes()];
//! let mut y = vec![0u8; ctx.bytes()];
//! point.get_xy(&mut x, &mut y)?;
//! # Ok(())
//! # }
//! ```
//!
//! A context is immutable and may be shared across threads; points and the
//! per-call scratch are single-threaded. The C ABI lives behind the `ffi`
//! feature (enabled by default).

mod curve;
mod mont;
mod p256;
mod point;
mod scalar;
mod scatter;
mod seed;
mod window;
mod workplace;

#[cfg(feature = "ffi")]
pub mod ffi;

pub use point::{EcContext, EcPoint};

use thiserror::Error as ThisError;

/// Error kinds of the whole operation surface. Constant-time paths never
/// fail on secret-dependent conditions: every variant below is triggered by
/// public inputs only.
#[derive(Debug, ThisError, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// A required pointer argument was null (C ABI only).
    #[error("unexpected null argument")]
    Null,

    /// An input byte string was empty.
    #[error("input is empty")]
    NotEnoughData,

    /// A length or value is out of range for the context.
    #[error("length mismatch or value out of range")]
    Value,

    /// The coordinates do not satisfy the curve equation.
    #[error("point is not on the curve")]
    EcPoint,

    /// The operands belong to different curve contexts.
    #[error("points belong to different curves")]
    EcCurve,

    /// An allocation failed (C ABI only).
    #[error("out of memory")]
    Memory,
}
