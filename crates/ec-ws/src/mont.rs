//! Montgomery arithmetic over a generic odd prime modulus.
//!
//! Field elements are little-endian `u64` limb vectors of a fixed width
//! decided at context construction, held in Montgomery form (a·R mod p with
//! R = 2^(64·words)). Multiplication is CIOS with a caller-provided
//! scratchpad so the hot paths never allocate; the final reduction and all
//! predicates go through `subtle` so no limb comparison branches on secret
//! data.
//!
//! The context is immutable after `MontContext::new` and can be shared
//! freely across threads.

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

use crate::p256;
use crate::Error;

/// Tag for moduli with a dedicated fast path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ModulusType {
    /// The NIST P-256 prime 2^256 - 2^224 + 2^192 + 2^96 - 1.
    P256,
    /// Any other odd modulus.
    Generic,
}

/// Immutable Montgomery context for one modulus.
#[derive(Clone, Debug)]
pub(crate) struct MontContext {
    /// Number of 64-bit limbs per field element.
    pub(crate) words: usize,
    /// Byte length of the modulus as presented by the caller.
    pub(crate) bytes: usize,
    /// The modulus p, little-endian limbs.
    pub(crate) modulus: Vec<u64>,
    /// R mod p, i.e. 1 in Montgomery form.
    pub(crate) r1: Vec<u64>,
    /// R² mod p, the to-Montgomery conversion factor.
    pub(crate) r2: Vec<u64>,
    /// -p⁻¹ mod 2^64.
    pub(crate) n0: u64,
    /// p - 2, the Fermat inversion exponent.
    pub(crate) modulus_min_2: Vec<u64>,
    pub(crate) modulus_type: ModulusType,
}

#[inline(always)]
fn adc(a: u64, b: u64, carry: u64) -> (u64, u64) {
    let v = a as u128 + b as u128 + carry as u128;
    (v as u64, (v >> 64) as u64)
}

#[inline(always)]
fn sbb(a: u64, b: u64, borrow: u64) -> (u64, u64) {
    let v = (a as u128).wrapping_sub(b as u128 + borrow as u128);
    (v as u64, ((v >> 64) as u64) & 1)
}

/// Big-endian bytes into little-endian limbs. Bytes that do not fit `out`
/// are ignored from the most significant end; missing bytes read as zero.
pub(crate) fn bytes_to_words(out: &mut [u64], bytes: &[u8]) {
    out.fill(0);
    let take = bytes.len().min(out.len() * 8);
    for k in 0..take {
        let byte = bytes[bytes.len() - 1 - k] as u64;
        out[k / 8] |= byte << (8 * (k % 8));
    }
}

/// Little-endian limbs into big-endian bytes, right-aligned in `out`.
pub(crate) fn words_to_bytes(out: &mut [u8], words: &[u64]) {
    out.fill(0);
    let take = out.len().min(words.len() * 8);
    let len = out.len();
    for k in 0..take {
        out[len - 1 - k] = (words[k / 8] >> (8 * (k % 8))) as u64 as u8;
    }
}

/// acc += a·k, carrying into the limbs above `a`. `acc` must be wide enough
/// to absorb the product; the high limbs provide that headroom.
pub(crate) fn addmul_word(acc: &mut [u64], a: &[u64], k: u64) {
    let mut carry = 0u64;
    for i in 0..a.len() {
        let v = acc[i] as u128 + (a[i] as u128) * (k as u128) + carry as u128;
        acc[i] = v as u64;
        carry = (v >> 64) as u64;
    }
    for limb in acc.iter_mut().skip(a.len()) {
        let (s, c) = adc(*limb, carry, 0);
        *limb = s;
        carry = c;
        if carry == 0 {
            break;
        }
    }
}

/// All-zero predicate, constant time.
pub(crate) fn is_zero(a: &[u64]) -> Choice {
    let mut acc = 0u64;
    for &limb in a {
        acc |= limb;
    }
    acc.ct_eq(&0)
}

/// Limb-wise equality, constant time.
pub(crate) fn is_equal(a: &[u64], b: &[u64]) -> Choice {
    a.ct_eq(b)
}

impl MontContext {
    /// Build a context from the big-endian modulus. The modulus must be odd
    /// and at least 3; its byte length (leading zeros included) fixes the
    /// serialized width of every element.
    pub(crate) fn new(modulus: &[u8]) -> Result<Self, Error> {
        if modulus.is_empty() {
            return Err(Error::NotEnoughData);
        }
        let bytes = modulus.len();
        let words = (bytes + 7) / 8;

        let mut p = vec![0u64; words];
        bytes_to_words(&mut p, modulus);
        if p[0] & 1 == 0 {
            return Err(Error::Value);
        }
        if words == 1 && p[0] < 3 {
            return Err(Error::Value);
        }

        // -p⁻¹ mod 2^64 by Newton iteration: odd p is self-inverse mod 8,
        // each step doubles the valid bit count.
        let p0 = p[0];
        let mut inv = p0;
        for _ in 0..5 {
            inv = inv.wrapping_mul(2u64.wrapping_sub(p0.wrapping_mul(inv)));
        }
        let n0 = inv.wrapping_neg();

        let mut modulus_min_2 = vec![0u64; words];
        let mut borrow = 0u64;
        for i in 0..words {
            let sub = if i == 0 { 2 } else { 0 };
            let (d, b) = sbb(p[i], sub, borrow);
            modulus_min_2[i] = d;
            borrow = b;
        }

        let modulus_type = if words == p256::MODULUS_WORDS.len() && p == p256::MODULUS_WORDS {
            ModulusType::P256
        } else {
            ModulusType::Generic
        };

        let mut ctx = MontContext {
            words,
            bytes,
            modulus: p,
            r1: Vec::new(),
            r2: Vec::new(),
            n0,
            modulus_min_2,
            modulus_type,
        };

        // R mod p and R² mod p by repeated modular doubling of 1. The
        // doubling count is fixed by the limb width, never by the values.
        let mut t = vec![0u64; words];
        t[0] = 1;
        let mut u = vec![0u64; words];
        let mut s = vec![0u64; words];
        for _ in 0..64 * words {
            ctx.add(&mut u, &t, &t, &mut s);
            core::mem::swap(&mut t, &mut u);
        }
        ctx.r1 = t.clone();
        for _ in 0..64 * words {
            ctx.add(&mut u, &t, &t, &mut s);
            core::mem::swap(&mut t, &mut u);
        }
        ctx.r2 = t;

        Ok(ctx)
    }

    /// out = a·b·R⁻¹ mod p (CIOS). `scratch` needs `words + 2` limbs; `out`
    /// must not overlap the operands.
    pub(crate) fn mult(&self, out: &mut [u64], a: &[u64], b: &[u64], scratch: &mut [u64]) {
        let w = self.words;
        let p = &self.modulus;
        let t = &mut scratch[..w + 2];
        t.fill(0);

        for i in 0..w {
            let bi = b[i] as u128;
            let mut carry = 0u64;
            for j in 0..w {
                let v = t[j] as u128 + (a[j] as u128) * bi + carry as u128;
                t[j] = v as u64;
                carry = (v >> 64) as u64;
            }
            let v = t[w] as u128 + carry as u128;
            t[w] = v as u64;
            t[w + 1] = (v >> 64) as u64;

            let m = t[0].wrapping_mul(self.n0);
            let v = t[0] as u128 + (m as u128) * (p[0] as u128);
            let mut carry = (v >> 64) as u64;
            for j in 1..w {
                let v = t[j] as u128 + (m as u128) * (p[j] as u128) + carry as u128;
                t[j - 1] = v as u64;
                carry = (v >> 64) as u64;
            }
            let v = t[w] as u128 + carry as u128;
            t[w - 1] = v as u64;
            t[w] = t[w + 1] + ((v >> 64) as u64);
        }

        // Result is below 2p with a one-bit overflow limb; fold it back with
        // a selected subtraction.
        let mut borrow = 0u64;
        for i in 0..w {
            let (d, b) = sbb(t[i], p[i], borrow);
            out[i] = d;
            borrow = b;
        }
        let keep_sub = Choice::from(t[w] as u8) | !Choice::from(borrow as u8);
        for i in 0..w {
            out[i] = u64::conditional_select(&t[i], &out[i], keep_sub);
        }
    }

    /// out = (a + b) mod p. `scratch` needs `words` limbs.
    pub(crate) fn add(&self, out: &mut [u64], a: &[u64], b: &[u64], scratch: &mut [u64]) {
        let w = self.words;
        let mut carry = 0u64;
        for i in 0..w {
            let (s, c) = adc(a[i], b[i], carry);
            out[i] = s;
            carry = c;
        }
        let t = &mut scratch[..w];
        let mut borrow = 0u64;
        for i in 0..w {
            let (d, b) = sbb(out[i], self.modulus[i], borrow);
            t[i] = d;
            borrow = b;
        }
        let keep_sub = Choice::from(carry as u8) | !Choice::from(borrow as u8);
        for i in 0..w {
            out[i] = u64::conditional_select(&out[i], &t[i], keep_sub);
        }
    }

    /// out = (a - b) mod p. `scratch` needs `words` limbs.
    pub(crate) fn sub(&self, out: &mut [u64], a: &[u64], b: &[u64], scratch: &mut [u64]) {
        let w = self.words;
        let mut borrow = 0u64;
        for i in 0..w {
            let (d, b) = sbb(a[i], b[i], borrow);
            out[i] = d;
            borrow = b;
        }
        let t = &mut scratch[..w];
        let mut carry = 0u64;
        for i in 0..w {
            let (s, c) = adc(out[i], self.modulus[i], carry);
            t[i] = s;
            carry = c;
        }
        let add_back = Choice::from(borrow as u8);
        for i in 0..w {
            out[i] = u64::conditional_select(&out[i], &t[i], add_back);
        }
    }

    /// out = a⁻¹ mod p by Fermat (a^(p-2)), square-and-multiply over the
    /// public exponent bits. `out` must not overlap `a`.
    pub(crate) fn inv_prime(&self, out: &mut [u64], a: &[u64]) {
        let w = self.words;
        let mut result = self.r1.clone();
        let mut tmp = vec![0u64; w];
        let mut scratch = vec![0u64; w + 2];
        for bit in (0..64 * w).rev() {
            self.mult(&mut tmp, &result, &result, &mut scratch);
            core::mem::swap(&mut result, &mut tmp);
            if (self.modulus_min_2[bit / 64] >> (bit % 64)) & 1 == 1 {
                self.mult(&mut tmp, &result, a, &mut scratch);
                core::mem::swap(&mut result, &mut tmp);
            }
        }
        out.copy_from_slice(&result);
    }

    /// Import a big-endian integer into Montgomery form.
    pub(crate) fn from_bytes(&self, bytes: &[u8]) -> Result<Vec<u64>, Error> {
        if bytes.is_empty() {
            return Err(Error::NotEnoughData);
        }
        if bytes.len() > self.bytes {
            return Err(Error::Value);
        }
        let w = self.words;
        let mut plain = vec![0u64; w];
        bytes_to_words(&mut plain, bytes);
        let mut out = vec![0u64; w];
        let mut scratch = vec![0u64; w + 2];
        self.mult(&mut out, &plain, &self.r2, &mut scratch);
        Ok(out)
    }

    /// Export a Montgomery-form element as canonical big-endian bytes of the
    /// modulus width.
    pub(crate) fn to_bytes(&self, out: &mut [u8], a: &[u64]) -> Result<(), Error> {
        if out.len() != self.bytes {
            return Err(Error::Value);
        }
        let w = self.words;
        let mut one = vec![0u64; w];
        one[0] = 1;
        let mut plain = vec![0u64; w];
        let mut scratch = vec![0u64; w + 2];
        self.mult(&mut plain, a, &one, &mut scratch);
        words_to_bytes(out, &plain);
        Ok(())
    }

    /// Set a small constant (Montgomery form).
    pub(crate) fn set_small(&self, out: &mut [u64], v: u64) {
        out.fill(0);
        match v {
            0 => {}
            1 => out.copy_from_slice(&self.r1),
            _ => {
                let w = self.words;
                let mut plain = vec![0u64; w];
                plain[0] = v;
                let mut scratch = vec![0u64; w + 2];
                let mut tmp = vec![0u64; w];
                self.mult(&mut tmp, &plain, &self.r2, &mut scratch);
                out.copy_from_slice(&tmp);
            }
        }
    }

    /// Montgomery-form 1 predicate, constant time.
    pub(crate) fn is_one(&self, a: &[u64]) -> Choice {
        a.ct_eq(&self.r1[..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_251() -> MontContext {
        MontContext::new(&[251]).unwrap()
    }

    fn fe(ctx: &MontContext, v: &[u8]) -> Vec<u64> {
        ctx.from_bytes(v).unwrap()
    }

    fn byte(ctx: &MontContext, a: &[u64]) -> u8 {
        let mut out = vec![0u8; ctx.bytes];
        ctx.to_bytes(&mut out, a).unwrap();
        out[out.len() - 1]
    }

    #[test]
    fn rejects_bad_moduli() {
        assert!(matches!(MontContext::new(&[]), Err(Error::NotEnoughData)));
        assert!(matches!(MontContext::new(&[250]), Err(Error::Value)));
        assert!(matches!(MontContext::new(&[1]), Err(Error::Value)));
    }

    #[test]
    fn roundtrip_mod_251() {
        let ctx = ctx_251();
        for v in [0u8, 1, 2, 127, 250] {
            assert_eq!(byte(&ctx, &fe(&ctx, &[v])), v);
        }
    }

    #[test]
    fn add_sub_mul_mod_251() {
        let ctx = ctx_251();
        let mut out = vec![0u64; 1];
        let mut s = vec![0u64; 3];

        ctx.add(&mut out, &fe(&ctx, &[200]), &fe(&ctx, &[100]), &mut s);
        assert_eq!(byte(&ctx, &out), 49);

        ctx.sub(&mut out, &fe(&ctx, &[10]), &fe(&ctx, &[20]), &mut s);
        assert_eq!(byte(&ctx, &out), 241);

        ctx.mult(&mut out, &fe(&ctx, &[20]), &fe(&ctx, &[30]), &mut s);
        assert_eq!(byte(&ctx, &out), 98);
    }

    #[test]
    fn inversion_mod_251() {
        let ctx = ctx_251();
        let two = fe(&ctx, &[2]);
        let mut inv = vec![0u64; 1];
        ctx.inv_prime(&mut inv, &two);
        assert_eq!(byte(&ctx, &inv), 126);

        let mut prod = vec![0u64; 1];
        let mut s = vec![0u64; 3];
        ctx.mult(&mut prod, &two, &inv, &mut s);
        assert!(bool::from(ctx.is_one(&prod)));
    }

    #[test]
    fn nine_byte_modulus_limb_edges() {
        // p = 2^64 + 1 (odd, 9 bytes, 2 limbs with a partial top limb).
        let p = [0x01, 0, 0, 0, 0, 0, 0, 0, 0x01];
        let ctx = MontContext::new(&p).unwrap();
        assert_eq!(ctx.words, 2);
        assert_eq!(ctx.bytes, 9);

        // 2^64 ≡ -1, so (2^64)² ≡ 1 mod p.
        let base = fe(&ctx, &[0x01, 0, 0, 0, 0, 0, 0, 0, 0]);
        let mut sq = vec![0u64; 2];
        let mut s = vec![0u64; 4];
        ctx.mult(&mut sq, &base, &base, &mut s);
        let mut out = vec![0u8; 9];
        ctx.to_bytes(&mut out, &sq).unwrap();
        assert_eq!(out, [0, 0, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn montgomery_one_exports_as_one() {
        let p256 = crate::p256::MODULUS_BE;
        let ctx = MontContext::new(&p256).unwrap();
        assert_eq!(ctx.modulus_type, ModulusType::P256);
        assert_eq!(ctx.words, 4);

        let mut out = vec![0u8; 32];
        ctx.to_bytes(&mut out, &ctx.r1).unwrap();
        let mut expect = [0u8; 32];
        expect[31] = 1;
        assert_eq!(out[..], expect[..]);
        assert!(bool::from(ctx.is_one(&ctx.r1)));
        assert!(bool::from(is_zero(&[0u64; 4])));
    }

    #[test]
    fn word_byte_helpers() {
        let mut w = [0u64; 2];
        bytes_to_words(&mut w, &[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09]);
        assert_eq!(w, [0x0203040506070809, 0x01]);

        let mut b = [0u8; 9];
        words_to_bytes(&mut b, &w);
        assert_eq!(b, [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09]);

        // acc = 5 + 3·(2^65 - 1) = 6·2^64 + 2
        let mut acc = [5u64, 0, 0];
        addmul_word(&mut acc, &[u64::MAX, 1], 3);
        assert_eq!(acc, [2, 6, 0]);
    }
}
