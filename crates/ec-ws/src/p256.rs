//! NIST P-256 specifics: curve constants, generator recognition, and the
//! fixed-base comb.
//!
//! The comb stores, for every 5-bit slice i of a scalar, the 32 affine
//! points (j · 2^(5i))·G. Multiplying the generator then walks the scalar
//! right to left, one oblivious table lookup and one mixed addition per
//! slice, with no doublings at all. The table content is public, so it is
//! computed once at context construction (rows via the complete formulae,
//! affine reduction with one shared inversion) and scattered under the
//! context seed.

use log::debug;

use crate::curve::{full_add, full_double, mix_add};
use crate::mont::{self, MontContext};
use crate::scatter::ProtMemory;
use crate::window::BitWindowRl;
use crate::workplace::Workplace;
use crate::Error;

/// Scalar bits consumed per comb lookup.
pub(crate) const WINDOW_BITS: u32 = 5;
/// Points per subtable, 2^WINDOW_BITS.
pub(crate) const POINTS_PER_TABLE: usize = 32;
/// Subtables: enough for any 256-bit scalar, ⌈256/5⌉.
pub(crate) const N_TABLES: usize = 52;

/// p = 2^256 - 2^224 + 2^192 + 2^96 - 1, big-endian.
pub(crate) const MODULUS_BE: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF,
];

/// Same prime as little-endian limbs, the context tag comparand.
pub(crate) const MODULUS_WORDS: [u64; 4] = [
    0xFFFFFFFFFFFFFFFF,
    0x00000000FFFFFFFF,
    0x0000000000000000,
    0xFFFFFFFF00000001,
];

/// Curve parameter b, big-endian.
pub(crate) const B_BE: [u8; 32] = [
    0x5A, 0xC6, 0x35, 0xD8, 0xAA, 0x3A, 0x93, 0xE7, 0xB3, 0xEB, 0xBD, 0x55, 0x76, 0x98, 0x86,
    0xBC, 0x65, 0x1D, 0x06, 0xB0, 0xCC, 0x53, 0xB0, 0xF6, 0x3B, 0xCE, 0x3C, 0x3E, 0x27, 0xD2,
    0x60, 0x4B,
];

/// Group order n, big-endian.
pub(crate) const ORDER_BE: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xBC, 0xE6, 0xFA, 0xAD, 0xA7, 0x17, 0x9E, 0x84, 0xF3, 0xB9, 0xCA, 0xC2, 0xFC, 0x63,
    0x25, 0x51,
];

/// Generator x, big-endian affine.
pub(crate) const GX_BE: [u8; 32] = [
    0x6B, 0x17, 0xD1, 0xF2, 0xE1, 0x2C, 0x42, 0x47, 0xF8, 0xBC, 0xE6, 0xE5, 0x63, 0xA4, 0x40,
    0xF2, 0x77, 0x03, 0x7D, 0x81, 0x2D, 0xEB, 0x33, 0xA0, 0xF4, 0xA1, 0x39, 0x45, 0xD8, 0x98,
    0xC2, 0x96,
];

/// Generator y, big-endian affine.
pub(crate) const GY_BE: [u8; 32] = [
    0x4F, 0xE3, 0x42, 0xE2, 0xFE, 0x1A, 0x7F, 0x9B, 0x8E, 0xE7, 0xEB, 0x4A, 0x7C, 0x0F, 0x9E,
    0x16, 0x2B, 0xCE, 0x33, 0x57, 0x6B, 0x31, 0x5E, 0xCE, 0xCB, 0xB6, 0x40, 0x68, 0x37, 0xBF,
    0x51, 0xF5,
];

/// Generator x in Montgomery form (x·2^256 mod p), the fast-path comparand.
pub(crate) const MONT_GX: [u64; 4] = [
    0x79E730D418A9143C,
    0x75BA95FC5FEDB601,
    0x79FB732B77622510,
    0x18905F76A53755C6,
];

/// Generator y in Montgomery form.
pub(crate) const MONT_GY: [u64; 4] = [
    0xDDF25357CE95560A,
    0x8B4AB8E4BA19E45C,
    0xD2E88688DD21F325,
    0x8571FF1825885D85,
];

/// Whether a projective point is exactly the canonical generator. The
/// comparison is on public routing state: which multiplication path runs is
/// observable either way.
pub(crate) fn is_generator(ctx: &MontContext, x: &[u64], y: &[u64], z: &[u64]) -> bool {
    ctx.modulus_type == mont::ModulusType::P256
        && x == &MONT_GX[..]
        && y == &MONT_GY[..]
        && bool::from(ctx.is_one(z))
}

/// Reduce one comb row to affine x‖y records with a single field inversion
/// (Montgomery's trick). The j = 0 entry is the group identity and encodes
/// as the all-zero record.
fn row_to_records(
    ctx: &MontContext,
    row: &[(Vec<u64>, Vec<u64>, Vec<u64>)],
) -> Vec<Vec<u64>> {
    let w = ctx.words;
    let mut scratch = vec![0u64; w + 2];

    let idxs: Vec<usize> = (0..row.len())
        .filter(|&i| !bool::from(mont::is_zero(&row[i].2)))
        .collect();

    // Prefix products z₀·…·z_k, one inversion of the total, then walk back.
    let mut prods: Vec<Vec<u64>> = Vec::with_capacity(idxs.len());
    let mut acc = ctx.r1.clone();
    for &i in &idxs {
        let mut t = vec![0u64; w];
        ctx.mult(&mut t, &acc, &row[i].2, &mut scratch);
        acc = t.clone();
        prods.push(t);
    }
    let mut inv_acc = vec![0u64; w];
    ctx.inv_prime(&mut inv_acc, &acc);

    let mut records = vec![vec![0u64; 2 * w]; row.len()];
    for k in (0..idxs.len()).rev() {
        let i = idxs[k];
        let mut z_inv = vec![0u64; w];
        if k == 0 {
            z_inv.copy_from_slice(&inv_acc);
        } else {
            ctx.mult(&mut z_inv, &inv_acc, &prods[k - 1], &mut scratch);
        }
        let mut t = vec![0u64; w];
        ctx.mult(&mut t, &inv_acc, &row[i].2, &mut scratch);
        inv_acc = t;

        let (rx, ry) = records[i].split_at_mut(w);
        ctx.mult(rx, &row[i].0, &z_inv, &mut scratch);
        ctx.mult(ry, &row[i].1, &z_inv, &mut scratch);
    }
    records
}

/// Compute and scatter the 52 generator subtables.
pub(crate) fn build_generator_tables(
    ctx: &MontContext,
    b: &[u64],
    seed: u64,
) -> Vec<ProtMemory> {
    debug_assert_eq!(ctx.words, MONT_GX.len());
    let w = ctx.words;
    let mut wp = Workplace::new(ctx);

    let mut bx = MONT_GX.to_vec();
    let mut by = MONT_GY.to_vec();
    let mut bz = vec![0u64; w];
    ctx.set_small(&mut bz, 1);

    let mut tables = Vec::with_capacity(N_TABLES);
    for _ in 0..N_TABLES {
        let mut row = Vec::with_capacity(POINTS_PER_TABLE);
        let mut ax = vec![0u64; w];
        let mut ay = vec![0u64; w];
        let mut az = vec![0u64; w];
        ctx.set_small(&mut ay, 1);
        for _ in 0..POINTS_PER_TABLE {
            row.push((ax.clone(), ay.clone(), az.clone()));
            full_add(&mut ax, &mut ay, &mut az, &bx, &by, &bz, b, &mut wp, ctx);
        }

        let records = row_to_records(ctx, &row);
        let refs: Vec<&[u64]> = records.iter().map(|r| r.as_slice()).collect();
        tables.push(ProtMemory::scatter(&refs, seed));

        for _ in 0..WINDOW_BITS {
            full_double(&mut bx, &mut by, &mut bz, b, &mut wp, ctx);
        }
    }
    debug!(
        "generator comb ready: {} subtables of {} points",
        N_TABLES, POINTS_PER_TABLE
    );
    tables
}

/// Fixed-base multiplication (x3, y3, z3) ← k·G through the scattered comb.
/// Fails with `Value` when the scalar needs more than 52 windows.
pub(crate) fn scalar_generator(
    x3: &mut [u64],
    y3: &mut [u64],
    z3: &mut [u64],
    b: &[u64],
    exp: &[u8],
    prot_g: &[ProtMemory],
    wp: &mut Workplace,
    ctx: &MontContext,
) -> Result<(), Error> {
    // Reject before touching the output: a failed call must leave the
    // caller's point exactly as it was.
    let skip = exp.iter().position(|&v| v != 0).unwrap_or(exp.len());
    let bw = BitWindowRl::new(WINDOW_BITS, &exp[skip..]);
    if bw.nr_windows() > prot_g.len() {
        return Err(Error::Value);
    }

    ctx.set_small(x3, 0);
    ctx.set_small(y3, 1);
    ctx.set_small(z3, 0);

    let mut buffer = vec![0u64; 2 * ctx.words];
    for (i, digit) in bw.enumerate() {
        prot_g[i].gather(&mut buffer, digit as usize);
        let (xw, yw) = buffer.split_at(ctx.words);
        mix_add(x3, y3, z3, xw, yw, b, wp, ctx);
    }
    Ok(())
}
