//! Complete point formulae for y² = x³ - 3x + b.
//!
//! The three group operations are the a = -3 specializations from
//! "Complete addition formulas for prime order elliptic curves"
//! (Renes–Costello–Batina): algorithm 4 for projective + projective,
//! algorithm 5 for projective + affine, algorithm 6 for doubling. The
//! operation sequences are kept exactly as published — the register reuse
//! across steps is part of the formulae — with every step running on the
//! workplace register file. Completeness means the same instruction trace
//! covers the point at infinity, equal and opposite inputs; nothing here
//! branches on coordinate values except the documented public check in
//! `mix_add`.

use crate::mont::{self, MontContext};
use crate::workplace::{Reg::*, Workplace};

/// (x, y, z) ← 2·(x, y, z). Correct for any input including infinity.
pub(crate) fn full_double(
    x: &mut [u64],
    y: &mut [u64],
    z: &mut [u64],
    b: &[u64],
    wp: &mut Workplace,
    ctx: &MontContext,
) {
    wp.load(X1, x);
    wp.load(Y1, y);
    wp.load(Z1, z);
    wp.load(B, b);

    wp.mul(ctx, T0, X1, X1);
    wp.mul(ctx, T1, Y1, Y1);
    wp.mul(ctx, T2, Z1, Z1);

    wp.mul(ctx, T3, X1, Y1);
    wp.add(ctx, T3, T3, T3);
    wp.mul(ctx, Z3, X1, Z1);

    wp.add(ctx, Z3, Z3, Z3);
    wp.mul(ctx, Y3, B, T2);
    wp.sub(ctx, Y3, Y3, Z3);

    wp.add(ctx, X3, Y3, Y3);
    wp.add(ctx, Y3, X3, Y3);
    wp.sub(ctx, X3, T1, Y3);

    wp.add(ctx, Y3, T1, Y3);
    wp.mul(ctx, Y3, X3, Y3);
    wp.mul(ctx, X3, X3, T3);

    wp.add(ctx, T3, T2, T2);
    wp.add(ctx, T2, T2, T3);
    wp.mul(ctx, Z3, B, Z3);

    wp.sub(ctx, Z3, Z3, T2);
    wp.sub(ctx, Z3, Z3, T0);
    wp.add(ctx, T3, Z3, Z3);

    wp.add(ctx, Z3, Z3, T3);
    wp.add(ctx, T3, T0, T0);
    wp.add(ctx, T0, T3, T0);

    wp.sub(ctx, T0, T0, T2);
    wp.mul(ctx, T0, T0, Z3);
    wp.add(ctx, Y3, Y3, T0);

    wp.mul(ctx, T0, Y1, Z1);
    wp.add(ctx, T0, T0, T0);
    wp.mul(ctx, Z3, T0, Z3);

    wp.sub(ctx, X3, X3, Z3);
    wp.mul(ctx, Z3, T0, T1);
    wp.add(ctx, Z3, Z3, Z3);

    wp.add(ctx, Z3, Z3, Z3);

    wp.store(X3, x);
    wp.store(Y3, y);
    wp.store(Z3, z);
}

/// (x1, y1, z1) ← (x1, y1, z1) + (x2, y2, z2). Correct for any inputs,
/// either or both at infinity; this is the only addition safe when both
/// operands carry unknown Z.
pub(crate) fn full_add(
    x1: &mut [u64],
    y1: &mut [u64],
    z1: &mut [u64],
    x2: &[u64],
    y2: &[u64],
    z2: &[u64],
    b: &[u64],
    wp: &mut Workplace,
    ctx: &MontContext,
) {
    wp.load(X1, x1);
    wp.load(Y1, y1);
    wp.load(Z1, z1);
    wp.load(X2, x2);
    wp.load(Y2, y2);
    wp.load(Z2, z2);
    wp.load(B, b);

    wp.mul(ctx, T0, X1, X2);
    wp.mul(ctx, T1, Y1, Y2);
    wp.mul(ctx, T2, Z1, Z2);

    wp.add(ctx, T3, X1, Y1);
    wp.add(ctx, T4, X2, Y2);
    wp.mul(ctx, T3, T3, T4);

    wp.add(ctx, T4, T0, T1);
    wp.sub(ctx, T3, T3, T4);
    wp.add(ctx, T4, Y1, Z1);

    wp.add(ctx, X3, Y2, Z2);
    wp.mul(ctx, T4, T4, X3);
    wp.add(ctx, X3, T1, T2);

    wp.sub(ctx, T4, T4, X3);
    wp.add(ctx, X3, X1, Z1);
    wp.add(ctx, Y3, X2, Z2);

    wp.mul(ctx, X3, X3, Y3);
    wp.add(ctx, Y3, T0, T2);
    wp.sub(ctx, Y3, X3, Y3);

    wp.mul(ctx, Z3, B, T2);
    wp.sub(ctx, X3, Y3, Z3);
    wp.add(ctx, Z3, X3, X3);

    wp.add(ctx, X3, X3, Z3);
    wp.sub(ctx, Z3, T1, X3);
    wp.add(ctx, X3, T1, X3);

    wp.mul(ctx, Y3, B, Y3);
    wp.add(ctx, T1, T2, T2);
    wp.add(ctx, T2, T1, T2);

    wp.sub(ctx, Y3, Y3, T2);
    wp.sub(ctx, Y3, Y3, T0);
    wp.add(ctx, T1, Y3, Y3);

    wp.add(ctx, Y3, T1, Y3);
    wp.add(ctx, T1, T0, T0);
    wp.add(ctx, T0, T1, T0);

    wp.sub(ctx, T0, T0, T2);
    wp.mul(ctx, T1, T4, Y3);
    wp.mul(ctx, T2, T0, Y3);

    wp.mul(ctx, Y3, X3, Z3);
    wp.add(ctx, Y3, Y3, T2);
    wp.mul(ctx, X3, T3, X3);

    wp.sub(ctx, X3, X3, T1);
    wp.mul(ctx, Z3, T4, Z3);
    wp.mul(ctx, T1, T3, T0);

    wp.add(ctx, Z3, Z3, T1);

    wp.store(X3, x1);
    wp.store(Y3, y1);
    wp.store(Z3, z1);
}

/// (x1, y1, z1) ← (x1, y1, z1) + (x2, y2) with the addend affine (Z = 1).
/// Cheaper than `full_add`. The affine encoding (0, 0) of infinity is not
/// covered by the formula, so it is peeled off up front; the check reads
/// public table data, never a secret-selected value's role in the ladder.
pub(crate) fn mix_add(
    x1: &mut [u64],
    y1: &mut [u64],
    z1: &mut [u64],
    x2: &[u64],
    y2: &[u64],
    b: &[u64],
    wp: &mut Workplace,
    ctx: &MontContext,
) {
    if bool::from(mont::is_zero(x2) & mont::is_zero(y2)) {
        return;
    }

    wp.load(X1, x1);
    wp.load(Y1, y1);
    wp.load(Z1, z1);
    wp.load(X2, x2);
    wp.load(Y2, y2);
    wp.load(B, b);

    wp.mul(ctx, T0, X1, X2);
    wp.mul(ctx, T1, Y1, Y2);
    wp.add(ctx, T3, X2, Y2);

    wp.add(ctx, T4, X1, Y1);
    wp.mul(ctx, T3, T3, T4);
    wp.add(ctx, T4, T0, T1);

    wp.sub(ctx, T3, T3, T4);
    wp.mul(ctx, T4, Y2, Z1);
    wp.add(ctx, T4, T4, Y1);

    wp.mul(ctx, Y3, X2, Z1);
    wp.add(ctx, Y3, Y3, X1);
    wp.mul(ctx, Z3, B, Z1);

    wp.sub(ctx, X3, Y3, Z3);
    wp.add(ctx, Z3, X3, X3);
    wp.add(ctx, X3, X3, Z3);

    wp.sub(ctx, Z3, T1, X3);
    wp.add(ctx, X3, T1, X3);
    wp.mul(ctx, Y3, B, Y3);

    wp.add(ctx, T1, Z1, Z1);
    wp.add(ctx, T2, T1, Z1);
    wp.sub(ctx, Y3, Y3, T2);

    wp.sub(ctx, Y3, Y3, T0);
    wp.add(ctx, T1, Y3, Y3);
    wp.add(ctx, Y3, T1, Y3);

    wp.add(ctx, T1, T0, T0);
    wp.add(ctx, T0, T1, T0);
    wp.sub(ctx, T0, T0, T2);

    wp.mul(ctx, T1, T4, Y3);
    wp.mul(ctx, T2, T0, Y3);
    wp.mul(ctx, Y3, X3, Z3);

    wp.add(ctx, Y3, Y3, T2);
    wp.mul(ctx, X3, T3, X3);
    wp.sub(ctx, X3, X3, T1);

    wp.mul(ctx, Z3, T4, Z3);
    wp.mul(ctx, T1, T3, T0);
    wp.add(ctx, Z3, Z3, T1);

    wp.store(X3, x1);
    wp.store(Y3, y1);
    wp.store(Z3, z1);
}

/// Reduce (x, y, z) to its affine coordinates in place: (x/z, y/z) for
/// z ≠ 0, (0, 0) for infinity. The caller decides what to do with z.
pub(crate) fn projective_to_affine(
    x: &mut [u64],
    y: &mut [u64],
    z: &[u64],
    wp: &mut Workplace,
    ctx: &MontContext,
) {
    if bool::from(mont::is_zero(z)) {
        x.fill(0);
        y.fill(0);
        return;
    }

    let mut inv = vec![0u64; ctx.words];
    ctx.inv_prime(&mut inv, z);

    wp.load(X1, x);
    wp.load(Y1, y);
    wp.load(Z1, &inv);
    wp.mul(ctx, X3, X1, Z1);
    wp.mul(ctx, Y3, Y1, Z1);
    wp.store(X3, x);
    wp.store(Y3, y);
}
