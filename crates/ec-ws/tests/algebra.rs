//! Randomized algebraic laws of the group operations.
//!
//! These tests cross-check independent code paths against each other —
//! doubling vs addition, blinded vs unblinded ladders, comb vs generic
//! window — over random scalars, and exercise the generic (non-P-256)
//! machinery end to end on P-384.

use ec_ws::{EcContext, EcPoint};
use rand::{Rng, SeedableRng};

// =============================================================================
// Helpers
// =============================================================================

const P256_P: &str = "ffffffff00000001000000000000000000000000ffffffffffffffffffffffff";
const P256_B: &str = "5ac635d8aa3a93e7b3ebbd55769886bc651d06b0cc53b0f63bce3c3e27d2604b";
const P256_N: &str = "ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551";
const P256_GX: &str = "6b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296";
const P256_GY: &str = "4fe342e2fe1a7f9b8ee7eb4a7c0f9e162bce33576b315ececbb6406837bf51f5";

const P384_P: &str = "fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffe\
                      ffffffff0000000000000000ffffffff";
const P384_B: &str = "b3312fa7e23ee7e4988e056be3f82d19181d9c6efe8141120314088f5013875a\
                      c656398d8a2ed19d2a85c8edd3ec2aef";
const P384_N: &str = "ffffffffffffffffffffffffffffffffffffffffffffffffc7634d81f4372ddf\
                      581a0db248b0a77aecec196accc52973";
const P384_GX: &str = "aa87ca22be8b05378eb1c71ef320ad746e1d3b628ba79b9859f741e082542a38\
                      5502f25dbf55296c3a545e3872760ab7";
const P384_GY: &str = "3617de4a96262c6f5d9e98bf9292dc29f8f41dbd289a147ce9da3113b5f0b8c0\
                      0a60b1ce1d7e819d7a431d7c90ea0e5f";

fn make_ctx(p: &str, b: &str, n: &str) -> EcContext {
    let _ = env_logger::builder().is_test(true).try_init();
    EcContext::new(
        &hex::decode(p).unwrap(),
        &hex::decode(b).unwrap(),
        &hex::decode(n).unwrap(),
        42,
    )
    .unwrap()
}

fn make_point<'a>(ctx: &'a EcContext, gx: &str, gy: &str) -> EcPoint<'a> {
    EcPoint::new(ctx, &hex::decode(gx).unwrap(), &hex::decode(gy).unwrap()).unwrap()
}

fn infinity(ctx: &EcContext) -> EcPoint<'_> {
    EcPoint::new(ctx, &[0], &[0]).unwrap()
}

fn rng() -> rand::rngs::StdRng {
    rand::rngs::StdRng::seed_from_u64(0x5EED_CAFE)
}

/// Big-endian a + b into a buffer one byte longer than the wider operand.
fn add_be(a: &[u8], b: &[u8]) -> Vec<u8> {
    let len = a.len().max(b.len()) + 1;
    let mut out = vec![0u8; len];
    let mut carry = 0u16;
    for i in 0..len {
        let av = if i < a.len() { a[a.len() - 1 - i] as u16 } else { 0 };
        let bv = if i < b.len() { b[b.len() - 1 - i] as u16 } else { 0 };
        let s = av + bv + carry;
        out[len - 1 - i] = s as u8;
        carry = s >> 8;
    }
    out
}

// =============================================================================
// P-256 laws
// =============================================================================

#[test]
fn identities() {
    let ctx = make_ctx(P256_P, P256_B, P256_N);
    let g = make_point(&ctx, P256_GX, P256_GY);
    let o = infinity(&ctx);

    let mut p = g.clone();
    p.add(&o).unwrap();
    assert!(p.equals(&g).unwrap());

    let mut p = o.clone();
    p.add(&g).unwrap();
    assert!(p.equals(&g).unwrap());

    let mut p = o.clone();
    p.add(&o).unwrap();
    assert!(p.is_pai());

    let mut p = g.clone();
    p.scalar(&[0], 1).unwrap();
    assert!(p.is_pai());

    let mut p = g.clone();
    p.scalar(&[1], 1).unwrap();
    assert!(p.equals(&g).unwrap());
}

#[test]
fn doubling_matches_self_addition() {
    let ctx = make_ctx(P256_P, P256_B, P256_N);
    let mut rng = rng();
    for _ in 0..4 {
        let mut k = [0u8; 32];
        rng.fill(&mut k[..]);
        let mut p = make_point(&ctx, P256_GX, P256_GY);
        p.scalar(&k, 1).unwrap();

        let mut doubled = p.clone();
        doubled.double();
        let mut self_added = p.clone();
        let q = p.clone();
        self_added.add(&q).unwrap();
        let mut by_scalar = p.clone();
        by_scalar.scalar(&[2], 9).unwrap();

        assert!(doubled.equals(&self_added).unwrap());
        assert!(doubled.equals(&by_scalar).unwrap());
    }
}

#[test]
fn addition_is_associative() {
    let ctx = make_ctx(P256_P, P256_B, P256_N);
    let mut rng = rng();
    for _ in 0..4 {
        let mut points = Vec::new();
        for _ in 0..3 {
            let mut k = [0u8; 32];
            rng.fill(&mut k[..]);
            let mut p = make_point(&ctx, P256_GX, P256_GY);
            p.scalar(&k, 1).unwrap();
            points.push(p);
        }
        let (p, q, r) = (&points[0], &points[1], &points[2]);

        let mut left = p.clone();
        left.add(q).unwrap();
        left.add(r).unwrap();

        let mut right = q.clone();
        right.add(r).unwrap();
        let mut sum = p.clone();
        sum.add(&right).unwrap();

        assert!(left.equals(&sum).unwrap());
    }
}

#[test]
fn scalars_distribute_over_addition() {
    let ctx = make_ctx(P256_P, P256_B, P256_N);
    let mut rng = rng();
    for _ in 0..4 {
        // Half-width scalars keep a + b far below the group order.
        let mut a = [0u8; 16];
        let mut b = [0u8; 16];
        rng.fill(&mut a[..]);
        rng.fill(&mut b[..]);

        let mut lhs = make_point(&ctx, P256_GX, P256_GY);
        lhs.scalar(&add_be(&a, &b), 5).unwrap();

        let mut pa = make_point(&ctx, P256_GX, P256_GY);
        pa.scalar(&a, 6).unwrap();
        let mut pb = make_point(&ctx, P256_GX, P256_GY);
        pb.scalar(&b, 7).unwrap();
        pa.add(&pb).unwrap();

        assert!(lhs.equals(&pa).unwrap());
    }
}

#[test]
fn blinding_does_not_change_the_product() {
    let ctx = make_ctx(P256_P, P256_B, P256_N);
    let mut rng = rng();
    for _ in 0..3 {
        let mut k = [0u8; 32];
        rng.fill(&mut k[..]);

        // A non-generator point: blinding only applies off the fast path.
        let mut base = make_point(&ctx, P256_GX, P256_GY);
        base.scalar(&[3], 0).unwrap();

        let mut plain = base.clone();
        plain.scalar(&k, 0).unwrap();

        for seed in [1u64, 0xABCD_EF01, u64::MAX] {
            let mut blinded = base.clone();
            blinded.scalar(&k, seed).unwrap();
            assert!(plain.equals(&blinded).unwrap());
        }
    }
}

#[test]
fn scalar_plus_order_multiples_reduce() {
    let ctx = make_ctx(P256_P, P256_B, P256_N);
    let n = hex::decode(P256_N).unwrap();
    let mut rng = rng();

    let mut k = [0u8; 32];
    rng.fill(&mut k[..]);
    let k_plus_n = add_be(&k, &n);
    let k_plus_2n = add_be(&k_plus_n, &n);

    let mut want = make_point(&ctx, P256_GX, P256_GY);
    want.scalar(&k, 1).unwrap();
    for variant in [&k_plus_n, &k_plus_2n] {
        let mut got = make_point(&ctx, P256_GX, P256_GY);
        got.scalar(variant, 1).unwrap();
        assert!(want.equals(&got).unwrap());
    }
}

#[test]
fn results_stay_on_the_curve() {
    let ctx = make_ctx(P256_P, P256_B, P256_N);
    let mut rng = rng();
    for _ in 0..4 {
        let mut k = [0u8; 32];
        rng.fill(&mut k[..]);
        let mut p = make_point(&ctx, P256_GX, P256_GY);
        p.scalar(&k, 2).unwrap();
        p.double();

        let mut x = vec![0u8; ctx.bytes()];
        let mut y = vec![0u8; ctx.bytes()];
        p.get_xy(&mut x, &mut y).unwrap();
        // Re-importing runs the curve-equation check.
        let back = EcPoint::new(&ctx, &x, &y).unwrap();
        assert!(back.equals(&p).unwrap());
    }
}

#[test]
fn normalized_base_uses_the_mixed_window_build() {
    let ctx = make_ctx(P256_P, P256_B, P256_N);

    // Same multiplication from a Z = 1 base and from a scaled base.
    let mut base = make_point(&ctx, P256_GX, P256_GY);
    base.scalar(&[5], 0).unwrap();
    let mut scaled = base.clone();
    scaled.double();
    scaled.neg();
    let mut normalized = scaled.clone();
    normalized.normalize();

    let k = [0xC3u8, 0x5A, 0x11, 0x99];
    let mut a = scaled.clone();
    a.scalar(&k, 17).unwrap();
    let mut b = normalized.clone();
    b.scalar(&k, 18).unwrap();
    assert!(a.equals(&b).unwrap());
}

// =============================================================================
// P-384: the generic path end to end
// =============================================================================

#[test]
fn p384_basics() {
    let ctx = make_ctx(P384_P, P384_B, P384_N);
    let g = make_point(&ctx, P384_GX, P384_GY);

    let mut doubled = g.clone();
    doubled.double();
    let mut by_scalar = g.clone();
    by_scalar.scalar(&[2], 0x1234).unwrap();
    assert!(doubled.equals(&by_scalar).unwrap());

    let mut order_times = g.clone();
    order_times.scalar(&hex::decode(P384_N).unwrap(), 0x99).unwrap();
    assert!(order_times.is_pai());

    let n_minus_1 = {
        let mut n = hex::decode(P384_N).unwrap();
        *n.last_mut().unwrap() -= 1;
        n
    };
    let mut almost = g.clone();
    almost.scalar(&n_minus_1, 0xF00).unwrap();
    let mut neg_g = g.clone();
    neg_g.neg();
    assert!(almost.equals(&neg_g).unwrap());
}
