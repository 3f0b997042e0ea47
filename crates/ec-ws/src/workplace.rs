//! Scratch arena for the curve formulae.
//!
//! One heap slab holds every temporary the complete addition/doubling
//! formulae need: the five shared temporaries, the two input point copies,
//! the staged result coordinates and the curve parameter, plus a scratchpad
//! region for the Montgomery multiplier. The formulae address elements by
//! register name, and each operation stages its result in the scratchpad
//! before writing the destination register, so a step may name its
//! destination among its operands — the paper's register reuse — without
//! tripping over slice aliasing.
//!
//! A workplace is built per call site and must not be shared across
//! threads. The slab is wiped on drop; ladder temporaries carry
//! secret-derived values.

use subtle::Choice;

use crate::mont::{self, MontContext};

/// Field elements reserved for the multiplier's internal accumulator.
pub(crate) const SCRATCHPAD_NR: usize = 4;

const NR_REGS: usize = 15;

/// Register names of the arena. T0–T4 are the formula temporaries, X1–Z2
/// the copied input points, X3–Z3 the staged result, B the curve parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Reg {
    T0,
    T1,
    T2,
    T3,
    T4,
    X1,
    Y1,
    Z1,
    X2,
    Y2,
    Z2,
    X3,
    Y3,
    Z3,
    B,
}

pub(crate) struct Workplace {
    slab: Vec<u64>,
    words: usize,
}

#[inline]
fn span(r: Reg, words: usize) -> core::ops::Range<usize> {
    let i = r as usize;
    i * words..(i + 1) * words
}

impl Workplace {
    pub(crate) fn new(ctx: &MontContext) -> Self {
        Workplace {
            slab: vec![0u64; (NR_REGS + SCRATCHPAD_NR) * ctx.words],
            words: ctx.words,
        }
    }

    pub(crate) fn load(&mut self, r: Reg, src: &[u64]) {
        self.slab[span(r, self.words)].copy_from_slice(src);
    }

    pub(crate) fn store(&self, r: Reg, dst: &mut [u64]) {
        dst.copy_from_slice(&self.slab[span(r, self.words)]);
    }

    pub(crate) fn set_small(&mut self, ctx: &MontContext, r: Reg, v: u64) {
        ctx.set_small(&mut self.slab[span(r, self.words)], v);
    }

    /// r = a·b in Montgomery form. Any of the three may coincide.
    pub(crate) fn mul(&mut self, ctx: &MontContext, r: Reg, a: Reg, b: Reg) {
        let w = self.words;
        let (regs, scratch) = self.slab.split_at_mut(NR_REGS * w);
        let (stage, acc) = scratch.split_at_mut(w);
        ctx.mult(stage, &regs[span(a, w)], &regs[span(b, w)], acc);
        regs[span(r, w)].copy_from_slice(stage);
    }

    /// r = (a + b) mod p. Any of the three may coincide.
    pub(crate) fn add(&mut self, ctx: &MontContext, r: Reg, a: Reg, b: Reg) {
        let w = self.words;
        let (regs, scratch) = self.slab.split_at_mut(NR_REGS * w);
        let (stage, acc) = scratch.split_at_mut(w);
        ctx.add(stage, &regs[span(a, w)], &regs[span(b, w)], acc);
        regs[span(r, w)].copy_from_slice(stage);
    }

    /// r = (a - b) mod p. Any of the three may coincide.
    pub(crate) fn sub(&mut self, ctx: &MontContext, r: Reg, a: Reg, b: Reg) {
        let w = self.words;
        let (regs, scratch) = self.slab.split_at_mut(NR_REGS * w);
        let (stage, acc) = scratch.split_at_mut(w);
        ctx.sub(stage, &regs[span(a, w)], &regs[span(b, w)], acc);
        regs[span(r, w)].copy_from_slice(stage);
    }

    pub(crate) fn eq(&self, a: Reg, b: Reg) -> Choice {
        mont::is_equal(&self.slab[span(a, self.words)], &self.slab[span(b, self.words)])
    }
}

impl Drop for Workplace {
    fn drop(&mut self) {
        for limb in self.slab.iter_mut() {
            unsafe { core::ptr::write_volatile(limb, 0) };
        }
    }
}

/// Zero a secret-bearing byte buffer before it is released.
pub(crate) fn wipe(bytes: &mut [u8]) {
    for b in bytes.iter_mut() {
        unsafe { core::ptr::write_volatile(b, 0) };
    }
}

/// Zero a secret-bearing limb buffer before it is released.
pub(crate) fn wipe_words(words: &mut [u64]) {
    for w in words.iter_mut() {
        unsafe { core::ptr::write_volatile(w, 0) };
    }
}
