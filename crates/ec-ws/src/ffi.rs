//! C FFI bindings for the curve engine.
//!
//! Conventions:
//!   - Caller owns all byte buffers; Rust writes into `*mut u8` of the
//!     agreed size.
//!   - Every function returns `i32`: 0 for success, one of the `ECWS_ERR_*`
//!     codes otherwise. `ecws_cmp` additionally returns `ECWS_ERR_VALUE`
//!     for points that are merely unequal.
//!   - Handles are opaque pointers created and released by this library
//!     (`ecws_new_*` / `ecws_free_*`).
//!   - A context must stay alive until every point created on it has been
//!     freed; freeing the context first leaves points dangling.
//!   - All functions are prefixed `ecws_` to avoid symbol conflicts.
//!
//! Multi-precision integers cross this boundary as big-endian byte strings,
//! affine coordinates at exactly the context's modulus width.

use std::ptr;
use std::slice;

use crate::{EcContext, EcPoint, Error};

pub const ECWS_ERR_NULL: i32 = 1;
pub const ECWS_ERR_NOT_ENOUGH_DATA: i32 = 2;
pub const ECWS_ERR_VALUE: i32 = 3;
pub const ECWS_ERR_EC_POINT: i32 = 4;
pub const ECWS_ERR_EC_CURVE: i32 = 5;
pub const ECWS_ERR_MEMORY: i32 = 6;

fn code(e: Error) -> i32 {
    match e {
        Error::Null => ECWS_ERR_NULL,
        Error::NotEnoughData => ECWS_ERR_NOT_ENOUGH_DATA,
        Error::Value => ECWS_ERR_VALUE,
        Error::EcPoint => ECWS_ERR_EC_POINT,
        Error::EcCurve => ECWS_ERR_EC_CURVE,
        Error::Memory => ECWS_ERR_MEMORY,
    }
}

/// Opaque curve context handle.
pub struct EcwsContext(EcContext);

/// Opaque point handle. Borrows the context it was created on for the whole
/// program lifetime; see the module contract.
pub struct EcwsPoint(EcPoint<'static>);

/// # Safety
/// `out` must be writable; `modulus`, `b` and `order` must each point to
/// `len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn ecws_new_context(
    out: *mut *mut EcwsContext,
    modulus: *const u8,
    b: *const u8,
    order: *const u8,
    len: usize,
    seed: u64,
) -> i32 {
    if out.is_null() || modulus.is_null() || b.is_null() || order.is_null() {
        return ECWS_ERR_NULL;
    }
    *out = ptr::null_mut();
    if len == 0 {
        return ECWS_ERR_NOT_ENOUGH_DATA;
    }
    let modulus = slice::from_raw_parts(modulus, len);
    let b = slice::from_raw_parts(b, len);
    let order = slice::from_raw_parts(order, len);
    match EcContext::new(modulus, b, order, seed) {
        Ok(ctx) => {
            *out = Box::into_raw(Box::new(EcwsContext(ctx)));
            0
        }
        Err(e) => code(e),
    }
}

/// # Safety
/// `ctx` must be a handle from `ecws_new_context` (or null) with no live
/// points on it.
#[no_mangle]
pub unsafe extern "C" fn ecws_free_context(ctx: *mut EcwsContext) {
    if !ctx.is_null() {
        drop(Box::from_raw(ctx));
    }
}

/// # Safety
/// `out` must be writable, `x` and `y` must point to `len` readable bytes,
/// `ctx` must be a live context handle that outlives the new point.
#[no_mangle]
pub unsafe extern "C" fn ecws_new_point(
    out: *mut *mut EcwsPoint,
    x: *const u8,
    y: *const u8,
    len: usize,
    ctx: *const EcwsContext,
) -> i32 {
    if out.is_null() || x.is_null() || y.is_null() || ctx.is_null() {
        return ECWS_ERR_NULL;
    }
    *out = ptr::null_mut();
    if len == 0 {
        return ECWS_ERR_NOT_ENOUGH_DATA;
    }
    let ctx: &'static EcwsContext = &*ctx;
    let x = slice::from_raw_parts(x, len);
    let y = slice::from_raw_parts(y, len);
    match EcPoint::new(&ctx.0, x, y) {
        Ok(p) => {
            *out = Box::into_raw(Box::new(EcwsPoint(p)));
            0
        }
        Err(e) => code(e),
    }
}

/// # Safety
/// `p` must be a handle from `ecws_new_point`/`ecws_clone` or null.
#[no_mangle]
pub unsafe extern "C" fn ecws_free_point(p: *mut EcwsPoint) {
    if !p.is_null() {
        drop(Box::from_raw(p));
    }
}

/// # Safety
/// `x` and `y` must each point to `len` writable bytes; `p` must be live.
#[no_mangle]
pub unsafe extern "C" fn ecws_get_xy(
    x: *mut u8,
    y: *mut u8,
    len: usize,
    p: *const EcwsPoint,
) -> i32 {
    if x.is_null() || y.is_null() || p.is_null() {
        return ECWS_ERR_NULL;
    }
    let x = slice::from_raw_parts_mut(x, len);
    let y = slice::from_raw_parts_mut(y, len);
    match (*p).0.get_xy(x, y) {
        Ok(()) => 0,
        Err(e) => code(e),
    }
}

/// # Safety
/// `p` must be a live point handle.
#[no_mangle]
pub unsafe extern "C" fn ecws_double(p: *mut EcwsPoint) -> i32 {
    if p.is_null() {
        return ECWS_ERR_NULL;
    }
    (*p).0.double();
    0
}

/// # Safety
/// `a` and `b` must be live point handles.
#[no_mangle]
pub unsafe extern "C" fn ecws_add(a: *mut EcwsPoint, b: *const EcwsPoint) -> i32 {
    if a.is_null() || b.is_null() {
        return ECWS_ERR_NULL;
    }
    match (*a).0.add(&(*b).0) {
        Ok(()) => 0,
        Err(e) => code(e),
    }
}

/// # Safety
/// `p` must be a live point handle.
#[no_mangle]
pub unsafe extern "C" fn ecws_normalize(p: *mut EcwsPoint) -> i32 {
    if p.is_null() {
        return ECWS_ERR_NULL;
    }
    (*p).0.normalize();
    0
}

/// Returns 1 when the point is the point at infinity, 0 otherwise (null
/// included).
///
/// # Safety
/// `p` must be a live point handle or null.
#[no_mangle]
pub unsafe extern "C" fn ecws_is_pai(p: *const EcwsPoint) -> i32 {
    if p.is_null() {
        return 0;
    }
    (*p).0.is_pai() as i32
}

/// # Safety
/// `p` must be live; `k` must point to `len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn ecws_scalar(
    p: *mut EcwsPoint,
    k: *const u8,
    len: usize,
    seed: u64,
) -> i32 {
    if p.is_null() || k.is_null() {
        return ECWS_ERR_NULL;
    }
    if len == 0 {
        return ECWS_ERR_NOT_ENOUGH_DATA;
    }
    let k = slice::from_raw_parts(k, len);
    match (*p).0.scalar(k, seed) {
        Ok(()) => 0,
        Err(e) => code(e),
    }
}

/// # Safety
/// `out` must be writable and `p` a live point handle.
#[no_mangle]
pub unsafe extern "C" fn ecws_clone(out: *mut *mut EcwsPoint, p: *const EcwsPoint) -> i32 {
    if out.is_null() || p.is_null() {
        return ECWS_ERR_NULL;
    }
    *out = Box::into_raw(Box::new(EcwsPoint((*p).0.clone())));
    0
}

/// # Safety
/// `dst` and `src` must be live point handles.
#[no_mangle]
pub unsafe extern "C" fn ecws_copy(dst: *mut EcwsPoint, src: *const EcwsPoint) -> i32 {
    if dst.is_null() || src.is_null() {
        return ECWS_ERR_NULL;
    }
    match (*dst).0.copy_from(&(*src).0) {
        Ok(()) => 0,
        Err(e) => code(e),
    }
}

/// Returns 0 when the points are equal, `ECWS_ERR_VALUE` when they differ.
///
/// # Safety
/// `a` and `b` must be live point handles.
#[no_mangle]
pub unsafe extern "C" fn ecws_cmp(a: *const EcwsPoint, b: *const EcwsPoint) -> i32 {
    if a.is_null() || b.is_null() {
        return ECWS_ERR_NULL;
    }
    match (*a).0.equals(&(*b).0) {
        Ok(true) => 0,
        Ok(false) => ECWS_ERR_VALUE,
        Err(e) => code(e),
    }
}

/// # Safety
/// `p` must be a live point handle.
#[no_mangle]
pub unsafe extern "C" fn ecws_neg(p: *mut EcwsPoint) -> i32 {
    if p.is_null() {
        return ECWS_ERR_NULL;
    }
    (*p).0.neg();
    0
}
