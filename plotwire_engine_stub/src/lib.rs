// Copyright 2026 the Plotwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A tiny stand-in for the plotting engine library.
//!
//! It exports the same six entry points a real engine does and answers a
//! handful of commands by calling back through the interface it was given:
//!
//! - `plot`: `init`, `move_to(0, 0)`, `vector(1000, 1000)`,
//!   `put_text(500, 500, "hi")`, `text`.
//! - `points`: one `point(x, y, 0)` per dataframe row, from its first two
//!   columns.
//! - anything else: status `3`, no callbacks.
//!
//! `gdmp_init` fails with `-1` before an interface is bound and with `-2`
//! if the table does not carry the expected `tscale` and `flags`.
//!
//! With the `legacy-abi` feature the version entry point is left out.

#![expect(unsafe_code, reason = "exports C entry points and calls a C table")]

use core::ffi::{c_char, c_double, c_float, c_int, c_uint, c_void};
use core::ptr;
use core::sync::atomic::{AtomicPtr, Ordering};

use parking_lot::{Mutex, const_mutex};

type Ctx = *mut c_void;

/// Entries of the callback table past the ones this stub calls.
const UNUSED_ENTRIES: usize = 56;

#[repr(C)]
#[allow(dead_code, reason = "mirrors the full table; only a few entries are called")]
struct Methods {
    options: unsafe extern "C" fn(Ctx),
    init: unsafe extern "C" fn(Ctx),
    reset: unsafe extern "C" fn(Ctx),
    text: unsafe extern "C" fn(Ctx),
    scale: unsafe extern "C" fn(Ctx, c_double, c_double) -> c_int,
    graphics: unsafe extern "C" fn(Ctx),
    move_to: unsafe extern "C" fn(Ctx, c_uint, c_uint),
    vector: unsafe extern "C" fn(Ctx, c_uint, c_uint),
    linetype: unsafe extern "C" fn(Ctx, c_int),
    put_text: unsafe extern "C" fn(Ctx, c_uint, c_uint, *const c_char),
    text_angle: unsafe extern "C" fn(Ctx, c_float) -> c_int,
    justify_text: unsafe extern "C" fn(Ctx, c_int) -> c_int,
    point: unsafe extern "C" fn(Ctx, c_uint, c_uint, c_int),
    rest: [*const c_void; UNUSED_ENTRIES],
    tscale: c_double,
    flags: c_int,
}

#[repr(C)]
#[allow(dead_code, reason = "only ever reached through the host's pointer")]
struct Interface {
    methods: Methods,
    context: Ctx,
}

static OBJECT: AtomicPtr<Interface> = AtomicPtr::new(ptr::null_mut());
static LINE: Mutex<String> = const_mutex(String::new());
static FRAME: Mutex<(Vec<f64>, usize)> = const_mutex((Vec::new(), 0));

/// The bound interface, if any.
///
/// # Safety
///
/// The pointer last passed to [`set_gdmp_matplot_object`] must still be live.
unsafe fn interface<'a>() -> Option<&'a Interface> {
    // SAFETY: forwarded to the caller.
    unsafe { OBJECT.load(Ordering::Acquire).as_ref() }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "dataframe coordinates are small whole numbers"
)]
fn coord(value: f64) -> c_uint {
    value.max(0.0) as c_uint
}

/// Binds the callback interface the engine draws through.
///
/// # Safety
///
/// `object` must be null or point to an interface that stays valid until it
/// is replaced or the library is unloaded.
#[unsafe(no_mangle)]
pub unsafe extern "system" fn set_gdmp_matplot_object(object: *mut c_void) -> c_int {
    OBJECT.store(object.cast(), Ordering::Release);
    0
}

/// Checks the bound interface.
///
/// # Safety
///
/// See [`set_gdmp_matplot_object`].
#[unsafe(no_mangle)]
pub unsafe extern "system" fn gdmp_init() -> c_int {
    // SAFETY: the host keeps the interface alive while the library is loaded.
    let Some(interface) = (unsafe { interface() }) else {
        return -1;
    };
    let methods = &interface.methods;
    if methods.tscale == 1.0 && methods.flags == 0 {
        0
    } else {
        -2
    }
}

/// Stores the next command line.
///
/// # Safety
///
/// `line` must be null or valid for reads of `len` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "system" fn set_gdmp_input_line(line: *const c_char, len: usize) {
    let text = if line.is_null() {
        String::new()
    } else {
        // SAFETY: the caller guarantees `len` readable bytes.
        let bytes = unsafe { core::slice::from_raw_parts(line.cast::<u8>(), len) };
        String::from_utf8_lossy(bytes).into_owned()
    };
    *LINE.lock() = text;
}

/// Runs the stored command line.
///
/// # Safety
///
/// See [`set_gdmp_matplot_object`].
#[unsafe(no_mangle)]
pub unsafe extern "system" fn do_line() -> c_int {
    // SAFETY: the host keeps the interface alive while the library is loaded.
    let Some(interface) = (unsafe { interface() }) else {
        return -1;
    };
    let m = &interface.methods;
    let ctx = interface.context;
    let line = LINE.lock().clone();

    match line.trim() {
        "plot" => {
            // SAFETY: every entry is a host trampoline expecting `ctx`.
            unsafe {
                (m.init)(ctx);
                (m.move_to)(ctx, 0, 0);
                (m.vector)(ctx, 1000, 1000);
                (m.put_text)(ctx, 500, 500, c"hi".as_ptr());
                (m.text)(ctx);
            }
            0
        }
        "points" => {
            let (values, columns) = FRAME.lock().clone();
            for row in values.chunks(columns.max(1)) {
                let x = coord(row[0]);
                let y = coord(row.get(1).copied().unwrap_or(0.0));
                // SAFETY: as above.
                unsafe { (m.point)(ctx, x, y, 0) };
            }
            0
        }
        _ => 3,
    }
}

/// Copies a row-major dataframe.
///
/// # Safety
///
/// `values` must be null or valid for reads of `rows * cols` values.
#[unsafe(no_mangle)]
pub unsafe extern "system" fn set_gdmp_dataframe(
    values: *const c_double,
    rows: c_uint,
    cols: c_uint,
) {
    let len = rows as usize * cols as usize;
    let copied = if values.is_null() {
        Vec::new()
    } else {
        // SAFETY: the caller guarantees `rows * cols` readable values.
        unsafe { core::slice::from_raw_parts(values, len) }.to_vec()
    };
    *FRAME.lock() = (copied, cols as usize);
}

/// Writes the NUL-terminated version string into `buf`.
///
/// # Safety
///
/// `buf` must be valid for writes of `len` bytes.
#[cfg(not(feature = "legacy-abi"))]
#[unsafe(no_mangle)]
pub unsafe extern "system" fn gdmp_get_gnuplot_version(buf: *mut c_char, len: c_uint) -> c_int {
    const VERSION: &[u8] = b"stub 1.0\0";
    let len = VERSION.len().min(len as usize);
    if buf.is_null() || len == 0 {
        return -1;
    }
    // SAFETY: `len` is within both buffers; the last byte written is forced
    // to NUL.
    unsafe {
        ptr::copy_nonoverlapping(VERSION.as_ptr(), buf.cast::<u8>(), len);
        *buf.add(len - 1) = 0;
    }
    0
}
