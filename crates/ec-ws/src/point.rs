//! Curve parameters and the point operation surface.
//!
//! An [`EcContext`] freezes one curve y² = x³ - 3x + b over an odd prime:
//! the Montgomery context, the imported parameter b, the group order and —
//! when the modulus is recognized as P-256 — the scattered generator comb.
//! It is immutable after construction and freely shareable.
//!
//! An [`EcPoint`] owns its projective coordinates and borrows its context,
//! so a point can never outlive the curve it belongs to. Points from
//! different contexts refuse to combine.

use log::debug;

use crate::curve::{full_add, full_double, projective_to_affine};
use crate::mont::{self, bytes_to_words, ModulusType, MontContext};
use crate::p256;
use crate::scalar::{blind_coordinates, blind_scalar, ec_scalar};
use crate::scatter::ProtMemory;
use crate::workplace::{wipe, Reg, Workplace};
use crate::Error;

/// Immutable parameters of one short Weierstrass curve with a = -3.
pub struct EcContext {
    mont: MontContext,
    b: Vec<u64>,
    order: Vec<u64>,
    prot_g: Option<Vec<ProtMemory>>,
}

impl EcContext {
    /// Build a context from big-endian curve parameters of equal length:
    /// the prime modulus, the constant b and the group order. `seed` keys
    /// the layout randomization of the generator comb.
    pub fn new(modulus: &[u8], b: &[u8], order: &[u8], seed: u64) -> Result<EcContext, Error> {
        if modulus.is_empty() || b.is_empty() || order.is_empty() {
            return Err(Error::NotEnoughData);
        }
        if b.len() != modulus.len() || order.len() != modulus.len() {
            return Err(Error::Value);
        }

        let mont = MontContext::new(modulus)?;
        let b = mont.from_bytes(b)?;
        let mut order_words = vec![0u64; mont.words];
        bytes_to_words(&mut order_words, order);

        let prot_g = if mont.modulus_type == ModulusType::P256 {
            Some(p256::build_generator_tables(&mont, &b, seed))
        } else {
            None
        };
        debug!(
            "EC context over {}-byte modulus, fixed-base comb: {}",
            mont.bytes,
            prot_g.is_some()
        );

        Ok(EcContext {
            mont,
            b,
            order: order_words,
            prot_g,
        })
    }

    /// Byte length of one serialized coordinate.
    pub fn bytes(&self) -> usize {
        self.mont.bytes
    }
}

/// A point on an [`EcContext`]'s curve, in projective coordinates.
///
/// Z = 0 encodes the point at infinity; at the byte interface infinity is
/// the affine pair (0, 0).
#[derive(Clone)]
pub struct EcPoint<'a> {
    ctx: &'a EcContext,
    x: Vec<u64>,
    y: Vec<u64>,
    z: Vec<u64>,
}

impl<'a> EcPoint<'a> {
    /// Import an affine point from big-endian coordinates of at most
    /// `ctx.bytes()` bytes each. (0, 0) becomes the point at infinity;
    /// anything else must satisfy the curve equation.
    pub fn new(ctx: &'a EcContext, x: &[u8], y: &[u8]) -> Result<EcPoint<'a>, Error> {
        if x.is_empty() || y.is_empty() {
            return Err(Error::NotEnoughData);
        }
        let m = &ctx.mont;
        if x.len() > m.bytes || y.len() > m.bytes {
            return Err(Error::Value);
        }

        let xm = m.from_bytes(x)?;
        let ym = m.from_bytes(y)?;
        let mut zm = vec![0u64; m.words];
        m.set_small(&mut zm, 1);
        let mut p = EcPoint {
            ctx,
            x: xm,
            y: ym,
            z: zm,
        };

        if bool::from(mont::is_zero(&p.x) & mont::is_zero(&p.y)) {
            m.set_small(&mut p.y, 1);
            m.set_small(&mut p.z, 0);
            return Ok(p);
        }

        // y² == x³ - 3x + b
        let mut wp = Workplace::new(m);
        wp.load(Reg::X1, &p.x);
        wp.load(Reg::Y1, &p.y);
        wp.load(Reg::B, &ctx.b);
        wp.mul(m, Reg::T0, Reg::Y1, Reg::Y1);
        wp.mul(m, Reg::T1, Reg::X1, Reg::X1);
        wp.mul(m, Reg::T1, Reg::T1, Reg::X1);
        wp.sub(m, Reg::T1, Reg::T1, Reg::X1);
        wp.sub(m, Reg::T1, Reg::T1, Reg::X1);
        wp.sub(m, Reg::T1, Reg::T1, Reg::X1);
        wp.add(m, Reg::T1, Reg::T1, Reg::B);
        if !bool::from(wp.eq(Reg::T0, Reg::T1)) {
            debug!("rejected point: curve equation does not hold");
            return Err(Error::EcPoint);
        }
        Ok(p)
    }

    /// Whether this is the point at infinity.
    pub fn is_pai(&self) -> bool {
        bool::from(mont::is_zero(&self.z))
    }

    /// Write the affine coordinates as big-endian bytes. Both buffers must
    /// be exactly `ctx.bytes()` long; infinity exports as (0, 0).
    pub fn get_xy(&self, x_out: &mut [u8], y_out: &mut [u8]) -> Result<(), Error> {
        let m = &self.ctx.mont;
        if x_out.len() != m.bytes || y_out.len() != m.bytes {
            return Err(Error::Value);
        }
        let mut wp = Workplace::new(m);
        let mut xa = self.x.clone();
        let mut ya = self.y.clone();
        projective_to_affine(&mut xa, &mut ya, &self.z, &mut wp, m);
        m.to_bytes(x_out, &xa)?;
        m.to_bytes(y_out, &ya)?;
        Ok(())
    }

    /// p ← 2p.
    pub fn double(&mut self) {
        let m = &self.ctx.mont;
        let mut wp = Workplace::new(m);
        full_double(&mut self.x, &mut self.y, &mut self.z, &self.ctx.b, &mut wp, m);
    }

    /// self ← self + other. Both points must share a context.
    pub fn add(&mut self, other: &EcPoint<'a>) -> Result<(), Error> {
        if !core::ptr::eq(self.ctx, other.ctx) {
            return Err(Error::EcCurve);
        }
        let m = &self.ctx.mont;
        let mut wp = Workplace::new(m);
        full_add(
            &mut self.x,
            &mut self.y,
            &mut self.z,
            &other.x,
            &other.y,
            &other.z,
            &self.ctx.b,
            &mut wp,
            m,
        );
        Ok(())
    }

    /// Rewrite the coordinates with Z = 1 (or Z = 0 at infinity).
    pub fn normalize(&mut self) {
        let m = &self.ctx.mont;
        if bool::from(mont::is_zero(&self.z)) {
            return;
        }
        let mut wp = Workplace::new(m);
        projective_to_affine(&mut self.x, &mut self.y, &self.z, &mut wp, m);
        m.set_small(&mut self.z, 1);
    }

    /// p ← k·p for a big-endian scalar of any nonzero length.
    ///
    /// A nonzero `seed` enables the side-channel countermeasures: the
    /// coordinates are re-scaled by a seed-derived factor and the ladder
    /// runs on k + R·n instead of k. `seed == 0` disables both and must not
    /// be used with secret scalars. Multiplications of the recognized P-256
    /// generator take the fixed-base comb, whose table layout was already
    /// randomized at context construction.
    pub fn scalar(&mut self, k: &[u8], seed: u64) -> Result<(), Error> {
        if k.is_empty() {
            return Err(Error::NotEnoughData);
        }
        let m = &self.ctx.mont;
        let mut wp = Workplace::new(m);

        if let Some(prot_g) = &self.ctx.prot_g {
            if p256::is_generator(m, &self.x, &self.y, &self.z) {
                return p256::scalar_generator(
                    &mut self.x,
                    &mut self.y,
                    &mut self.z,
                    &self.ctx.b,
                    k,
                    prot_g,
                    &mut wp,
                    m,
                );
            }
        }

        if seed != 0 {
            blind_coordinates(&mut self.x, &mut self.y, &mut self.z, seed, &mut wp, m);
            let mut blinded = blind_scalar(k, seed as u32, &self.ctx.order);
            ec_scalar(
                &mut self.x,
                &mut self.y,
                &mut self.z,
                &self.ctx.b,
                &blinded,
                seed.wrapping_add(1),
                &mut wp,
                m,
            );
            wipe(&mut blinded);
        } else {
            ec_scalar(
                &mut self.x,
                &mut self.y,
                &mut self.z,
                &self.ctx.b,
                k,
                seed.wrapping_add(1),
                &mut wp,
                m,
            );
        }
        Ok(())
    }

    /// Projective equality: X1·Z2 = X2·Z1 and Y1·Z2 = Y2·Z1, or both at
    /// infinity. Points from different contexts are an error, not unequal.
    pub fn equals(&self, other: &EcPoint<'a>) -> Result<bool, Error> {
        if !core::ptr::eq(self.ctx, other.ctx) {
            return Err(Error::EcCurve);
        }
        let m = &self.ctx.mont;
        let p1_pai = mont::is_zero(&self.z);
        let p2_pai = mont::is_zero(&other.z);
        if bool::from(p1_pai | p2_pai) {
            return Ok(bool::from(p1_pai & p2_pai));
        }

        let mut wp = Workplace::new(m);
        wp.load(Reg::X1, &self.x);
        wp.load(Reg::Y1, &self.y);
        wp.load(Reg::Z1, &self.z);
        wp.load(Reg::X2, &other.x);
        wp.load(Reg::Y2, &other.y);
        wp.load(Reg::Z2, &other.z);
        wp.mul(m, Reg::T0, Reg::X1, Reg::Z2);
        wp.mul(m, Reg::T1, Reg::X2, Reg::Z1);
        wp.mul(m, Reg::T2, Reg::Y1, Reg::Z2);
        wp.mul(m, Reg::T3, Reg::Y2, Reg::Z1);
        Ok(bool::from(
            wp.eq(Reg::T0, Reg::T1) & wp.eq(Reg::T2, Reg::T3),
        ))
    }

    /// p ← -p, i.e. y ← p - y.
    pub fn neg(&mut self) {
        let m = &self.ctx.mont;
        let mut wp = Workplace::new(m);
        wp.load(Reg::X1, &m.modulus);
        wp.load(Reg::Y1, &self.y);
        wp.sub(m, Reg::Y1, Reg::X1, Reg::Y1);
        wp.store(Reg::Y1, &mut self.y);
    }

    /// dst ← src, adopting src's context. The limb widths must agree.
    pub fn copy_from(&mut self, src: &EcPoint<'a>) -> Result<(), Error> {
        if self.x.len() != src.x.len() {
            return Err(Error::EcCurve);
        }
        self.ctx = src.ctx;
        self.x.copy_from_slice(&src.x);
        self.y.copy_from_slice(&src.y);
        self.z.copy_from_slice(&src.z);
        Ok(())
    }
}
