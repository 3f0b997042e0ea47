//! Generic scalar multiplication and side-channel blinding.
//!
//! The ladder is a fixed 4-bit window, left to right: the 16 small multiples
//! of the input point are precomputed and scattered, then every window of
//! the scalar costs exactly four complete doublings, three oblivious
//! gathers and one complete addition, independent of the window value. The
//! complete formulae make mid-ladder infinities and coincidences follow the
//! same instruction trace as any other input.
//!
//! Blinding rewrites the problem before the ladder ever sees it: the scalar
//! becomes k + R·n (identical modulo the group order, different bit
//! pattern), and the projective coordinates are scaled by a seed-derived
//! field element (same point, different limb values).

use crate::curve::{full_add, full_double, mix_add};
use crate::mont::{addmul_word, bytes_to_words, words_to_bytes, MontContext};
use crate::scatter::ProtMemory;
use crate::seed::expand_seed;
use crate::window::BitWindowLr;
use crate::workplace::{wipe, wipe_words, Reg, Workplace};

pub(crate) const WINDOW_BITS: u32 = 4;
const WINDOW_ITEMS: usize = 1 << WINDOW_BITS;

/// (x, y, z) ← exp·(x, y, z) with the windowed ladder. `seed` keys the
/// table scatter; the scalar itself must already be blinded if the caller
/// wants scalar blinding.
pub(crate) fn ec_scalar(
    x: &mut [u64],
    y: &mut [u64],
    z: &mut [u64],
    b: &[u64],
    exp: &[u8],
    seed: u64,
    wp: &mut Workplace,
    ctx: &MontContext,
) {
    let w = ctx.words;
    let z_is_one = bool::from(ctx.is_one(z));

    // O, P, 2P, … 15P
    let mut win_x = vec![vec![0u64; w]; WINDOW_ITEMS];
    let mut win_y = vec![vec![0u64; w]; WINDOW_ITEMS];
    let mut win_z = vec![vec![0u64; w]; WINDOW_ITEMS];
    ctx.set_small(&mut win_y[0], 1);
    win_x[1].copy_from_slice(x);
    win_y[1].copy_from_slice(y);
    win_z[1].copy_from_slice(z);
    for i in 2..WINDOW_ITEMS {
        win_x[i] = win_x[i - 1].clone();
        win_y[i] = win_y[i - 1].clone();
        win_z[i] = win_z[i - 1].clone();
        if z_is_one {
            mix_add(&mut win_x[i], &mut win_y[i], &mut win_z[i], x, y, b, wp, ctx);
        } else {
            full_add(&mut win_x[i], &mut win_y[i], &mut win_z[i], x, y, z, b, wp, ctx);
        }
    }

    let refs: Vec<&[u64]> = win_x.iter().map(|v| v.as_slice()).collect();
    let prot_x = ProtMemory::scatter(&refs, seed);
    let refs: Vec<&[u64]> = win_y.iter().map(|v| v.as_slice()).collect();
    let prot_y = ProtMemory::scatter(&refs, seed);
    let refs: Vec<&[u64]> = win_z.iter().map(|v| v.as_slice()).collect();
    let prot_z = ProtMemory::scatter(&refs, seed);

    // Accumulator starts at infinity.
    ctx.set_small(x, 0);
    ctx.set_small(y, 1);
    ctx.set_small(z, 0);

    let skip = exp.iter().position(|&v| v != 0).unwrap_or(exp.len());
    let bw = BitWindowLr::new(WINDOW_BITS, &exp[skip..]);

    let mut xw = vec![0u64; w];
    let mut yw = vec![0u64; w];
    let mut zw = vec![0u64; w];
    for digit in bw {
        prot_x.gather(&mut xw, digit as usize);
        prot_y.gather(&mut yw, digit as usize);
        prot_z.gather(&mut zw, digit as usize);
        // The first window may hold fewer than four significant bits; the
        // four doublings still run, vacuously, on the initial infinity, so
        // every window costs the same.
        for _ in 0..WINDOW_BITS {
            full_double(x, y, z, b, wp, ctx);
        }
        full_add(x, y, z, &xw, &yw, &zw, b, wp, ctx);
    }

    for v in win_x.iter_mut().chain(win_y.iter_mut()).chain(win_z.iter_mut()) {
        wipe_words(v);
    }
    wipe_words(&mut xw);
    wipe_words(&mut yw);
    wipe_words(&mut zw);
}

/// k + R·n, big-endian, sized two limbs past max(k, n) so the sum never
/// truncates. The caller wipes the result when it carried a secret.
pub(crate) fn blind_scalar(k: &[u8], r: u32, order: &[u64]) -> Vec<u8> {
    let scalar_words = (k.len() + 7) / 8;
    let blind_words = order.len().max(scalar_words) + 2;

    let mut acc = vec![0u64; blind_words];
    bytes_to_words(&mut acc, k);
    addmul_word(&mut acc, order, r as u64);

    let mut out = vec![0u8; blind_words * 8];
    words_to_bytes(&mut out, &acc);
    wipe_words(&mut acc);
    out
}

/// Scale (x, y, z) by a field element derived from `seed`. The projective
/// class is unchanged; every limb the ladder touches afterwards is not.
pub(crate) fn blind_coordinates(
    x: &mut [u64],
    y: &mut [u64],
    z: &mut [u64],
    seed: u64,
    wp: &mut Workplace,
    ctx: &MontContext,
) {
    let mut fbytes = vec![0u8; ctx.bytes];
    expand_seed(seed, &mut fbytes);
    let mut factor = vec![0u64; ctx.words];
    bytes_to_words(&mut factor, &fbytes);

    wp.load(Reg::T4, &factor);
    wp.load(Reg::X1, x);
    wp.mul(ctx, Reg::X1, Reg::X1, Reg::T4);
    wp.store(Reg::X1, x);
    wp.load(Reg::Y1, y);
    wp.mul(ctx, Reg::Y1, Reg::Y1, Reg::T4);
    wp.store(Reg::Y1, y);
    wp.load(Reg::Z1, z);
    wp.mul(ctx, Reg::Z1, Reg::Z1, Reg::T4);
    wp.store(Reg::Z1, z);

    wipe(&mut fbytes);
    wipe_words(&mut factor);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::projective_to_affine;
    use crate::p256;

    fn setup() -> (MontContext, Vec<u64>, Workplace) {
        let ctx = MontContext::new(&p256::MODULUS_BE).unwrap();
        let b = ctx.from_bytes(&p256::B_BE).unwrap();
        let wp = Workplace::new(&ctx);
        (ctx, b, wp)
    }

    fn generator(ctx: &MontContext) -> (Vec<u64>, Vec<u64>, Vec<u64>) {
        let x = ctx.from_bytes(&p256::GX_BE).unwrap();
        let y = ctx.from_bytes(&p256::GY_BE).unwrap();
        let mut z = vec![0u64; ctx.words];
        ctx.set_small(&mut z, 1);
        (x, y, z)
    }

    fn affine_hex(
        ctx: &MontContext,
        wp: &mut Workplace,
        x: &[u64],
        y: &[u64],
        z: &[u64],
    ) -> (String, String) {
        let (mut xa, mut ya) = (x.to_vec(), y.to_vec());
        projective_to_affine(&mut xa, &mut ya, z, wp, ctx);
        let mut bx = vec![0u8; ctx.bytes];
        let mut by = vec![0u8; ctx.bytes];
        ctx.to_bytes(&mut bx, &xa).unwrap();
        ctx.to_bytes(&mut by, &ya).unwrap();
        (hex::encode_upper(bx), hex::encode_upper(by))
    }

    #[test]
    fn ladder_times_one_and_two() {
        let (ctx, b, mut wp) = setup();

        let (mut x, mut y, mut z) = generator(&ctx);
        ec_scalar(&mut x, &mut y, &mut z, &b, &[1], 77, &mut wp, &ctx);
        let (hx, hy) = affine_hex(&ctx, &mut wp, &x, &y, &z);
        assert_eq!(hx, hex::encode_upper(p256::GX_BE));
        assert_eq!(hy, hex::encode_upper(p256::GY_BE));

        let (mut x, mut y, mut z) = generator(&ctx);
        ec_scalar(&mut x, &mut y, &mut z, &b, &[2], 77, &mut wp, &ctx);
        let (hx, hy) = affine_hex(&ctx, &mut wp, &x, &y, &z);
        assert_eq!(
            hx,
            "7CF27B188D034F7E8A52380304B51AC3C08969E277F21B35A60B48FC47669978"
        );
        assert_eq!(
            hy,
            "07775510DB8ED040293D9AC69F7430DBBA7DADE63CE982299E04B79D227873D1"
        );
    }

    #[test]
    fn ladder_ignores_scatter_seed_and_padding() {
        let (ctx, b, mut wp) = setup();
        let (mut x1, mut y1, mut z1) = generator(&ctx);
        ec_scalar(&mut x1, &mut y1, &mut z1, &b, &[0x6F], 1, &mut wp, &ctx);
        let (mut x2, mut y2, mut z2) = generator(&ctx);
        ec_scalar(&mut x2, &mut y2, &mut z2, &b, &[0, 0, 0x6F], 999, &mut wp, &ctx);
        assert_eq!(
            affine_hex(&ctx, &mut wp, &x1, &y1, &z1),
            affine_hex(&ctx, &mut wp, &x2, &y2, &z2)
        );
    }

    #[test]
    fn ladder_times_zero_is_infinity() {
        let (ctx, b, mut wp) = setup();
        let (mut x, mut y, mut z) = generator(&ctx);
        ec_scalar(&mut x, &mut y, &mut z, &b, &[0, 0], 5, &mut wp, &ctx);
        assert!(bool::from(crate::mont::is_zero(&z)));
    }

    #[test]
    fn blinded_scalar_value() {
        // k = 5, n = 3, R = 2 → 5 + 2·3 = 11 in a 3-limb buffer.
        let out = blind_scalar(&[5], 2, &[3]);
        assert_eq!(out.len(), 24);
        assert_eq!(out[23], 11);
        assert!(out[..23].iter().all(|&v| v == 0));
    }

    #[test]
    fn blinding_preserves_the_product() {
        let (ctx, b, mut wp) = setup();
        let mut order = vec![0u64; ctx.words];
        bytes_to_words(&mut order, &p256::ORDER_BE);

        let k = [0x07u8];
        let (mut x1, mut y1, mut z1) = generator(&ctx);
        ec_scalar(&mut x1, &mut y1, &mut z1, &b, &k, 13, &mut wp, &ctx);

        let (mut x2, mut y2, mut z2) = generator(&ctx);
        blind_coordinates(&mut x2, &mut y2, &mut z2, 41, &mut wp, &ctx);
        let mut blinded = blind_scalar(&k, 5, &order);
        ec_scalar(&mut x2, &mut y2, &mut z2, &b, &blinded, 14, &mut wp, &ctx);
        wipe(&mut blinded);

        assert_eq!(
            affine_hex(&ctx, &mut wp, &x1, &y1, &z1),
            affine_hex(&ctx, &mut wp, &x2, &y2, &z2)
        );
    }
}
