// Copyright 2026 the Plotwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! C-side layout of the engine interface.
//!
//! Field order and types here must match the engine's headers exactly; the
//! engine reads the table by offset.

use core::ffi::{c_char, c_double, c_float, c_int, c_uchar, c_uint, c_void};

/// The context pointer passed back as the first argument of every callback.
pub(crate) type Ctx = *mut c_void;

/// Value for [`CallbackTable::tscale`].
pub(crate) const TSCALE: c_double = 1.0;

/// Value for [`CallbackTable::flags`]; no optional terminal capabilities.
pub(crate) const TERM_FLAGS: c_int = 0;

/// The engine's drawing callback table.
#[repr(C)]
pub(crate) struct CallbackTable {
    pub(crate) options: unsafe extern "C" fn(Ctx),
    pub(crate) init: unsafe extern "C" fn(Ctx),
    pub(crate) reset: unsafe extern "C" fn(Ctx),
    pub(crate) text: unsafe extern "C" fn(Ctx),
    pub(crate) scale: unsafe extern "C" fn(Ctx, c_double, c_double) -> c_int,
    pub(crate) graphics: unsafe extern "C" fn(Ctx),
    pub(crate) move_to: unsafe extern "C" fn(Ctx, c_uint, c_uint),
    pub(crate) vector: unsafe extern "C" fn(Ctx, c_uint, c_uint),
    pub(crate) linetype: unsafe extern "C" fn(Ctx, c_int),
    pub(crate) put_text: unsafe extern "C" fn(Ctx, c_uint, c_uint, *const c_char),
    pub(crate) text_angle: unsafe extern "C" fn(Ctx, c_float) -> c_int,
    pub(crate) justify_text: unsafe extern "C" fn(Ctx, c_int) -> c_int,
    pub(crate) point: unsafe extern "C" fn(Ctx, c_uint, c_uint, c_int),
    pub(crate) arrow: unsafe extern "C" fn(Ctx, c_uint, c_uint, c_uint, c_uint, c_int),
    pub(crate) set_font: unsafe extern "C" fn(Ctx, *const c_char, c_double) -> c_int,
    pub(crate) pointsize: unsafe extern "C" fn(Ctx, c_double),
    pub(crate) suspend: unsafe extern "C" fn(Ctx),
    pub(crate) resume: unsafe extern "C" fn(Ctx),
    pub(crate) fillbox: unsafe extern "C" fn(Ctx, c_int, c_uint, c_uint, c_uint, c_uint),
    pub(crate) linewidth: unsafe extern "C" fn(Ctx, c_double),

    pub(crate) make_palette: unsafe extern "C" fn(Ctx, *mut c_void) -> c_int,
    pub(crate) previous_palette: unsafe extern "C" fn(Ctx),
    pub(crate) set_color: unsafe extern "C" fn(Ctx, c_uint),
    pub(crate) filled_polygon: unsafe extern "C" fn(Ctx, c_int, *mut c_void, c_int),
    pub(crate) image: unsafe extern "C" fn(Ctx, c_uint, c_uint, *mut c_void, *mut c_void, c_uint),
    pub(crate) enhanced_open:
        unsafe extern "C" fn(Ctx, *mut c_char, c_double, c_double, c_char, c_char, c_int),
    pub(crate) enhanced_flush: unsafe extern "C" fn(Ctx),
    pub(crate) enhanced_writec: unsafe extern "C" fn(Ctx, c_int),
    pub(crate) layer: unsafe extern "C" fn(Ctx, c_uint),
    pub(crate) path: unsafe extern "C" fn(Ctx, c_int),
    pub(crate) hypertext: unsafe extern "C" fn(Ctx, c_int, *const c_char),
    pub(crate) boxed_text: unsafe extern "C" fn(Ctx, c_uint, c_uint, c_int),
    pub(crate) modify_plots: unsafe extern "C" fn(Ctx, c_uint, c_int),
    pub(crate) dashtype: unsafe extern "C" fn(Ctx, c_int, *mut c_void),

    pub(crate) set_xmax: unsafe extern "C" fn(Ctx, c_uint),
    pub(crate) set_ymax: unsafe extern "C" fn(Ctx, c_uint),
    pub(crate) set_h_tic: unsafe extern "C" fn(Ctx, c_uint),
    pub(crate) set_v_tic: unsafe extern "C" fn(Ctx, c_uint),

    pub(crate) set_color_mode: unsafe extern "C" fn(Ctx, c_uchar),
    pub(crate) set_linetype: unsafe extern "C" fn(Ctx, c_int),
    pub(crate) set_dashpattern: unsafe extern "C" fn(Ctx, *const c_char),

    pub(crate) set_h_char: unsafe extern "C" fn(Ctx, c_uint),
    pub(crate) set_v_char: unsafe extern "C" fn(Ctx, c_uint),

    pub(crate) set_gridline: unsafe extern "C" fn(Ctx, c_uint),
    pub(crate) set_hasgrid: unsafe extern "C" fn(Ctx, c_uint),
    pub(crate) set_plotno: unsafe extern "C" fn(Ctx, c_uint),

    pub(crate) set_fill_pattern: unsafe extern "C" fn(Ctx, c_int),
    pub(crate) set_fill_pattern_index: unsafe extern "C" fn(Ctx, c_uint),
    pub(crate) set_rgb: unsafe extern "C" fn(Ctx, c_uint),
    pub(crate) set_patterncolor: unsafe extern "C" fn(Ctx, *mut c_uint),
    pub(crate) set_group_filled_is_open: unsafe extern "C" fn(Ctx, c_uchar),
    pub(crate) set_in_textbox: unsafe extern "C" fn(Ctx, c_uchar),
    pub(crate) set_xsize: unsafe extern "C" fn(Ctx, c_uint),
    pub(crate) set_ysize: unsafe extern "C" fn(Ctx, c_uint),
    pub(crate) set_xlast: unsafe extern "C" fn(Ctx, c_uint),
    pub(crate) set_ylast: unsafe extern "C" fn(Ctx, c_uint),
    pub(crate) set_linecap: unsafe extern "C" fn(Ctx, c_int),
    pub(crate) set_group_is_open: unsafe extern "C" fn(Ctx, c_uchar),
    pub(crate) set_path_is_open: unsafe extern "C" fn(Ctx, c_uchar),

    pub(crate) set_fontscale: unsafe extern "C" fn(Ctx, c_double),
    pub(crate) set_dashlength: unsafe extern "C" fn(Ctx, c_double),
    pub(crate) set_name: unsafe extern "C" fn(Ctx, *const c_char),
    pub(crate) set_linewidth_factor: unsafe extern "C" fn(Ctx, c_double),
    pub(crate) set_background: unsafe extern "C" fn(Ctx, c_int),

    pub(crate) set_linecolor: unsafe extern "C" fn(Ctx, *const c_char),
    pub(crate) set_alpha: unsafe extern "C" fn(Ctx, c_double),

    pub(crate) set_term_pointsize: unsafe extern "C" fn(Ctx, c_double),
    pub(crate) set_stroke_width: unsafe extern "C" fn(Ctx, c_double),

    pub(crate) set_pen: unsafe extern "C" fn(Ctx, c_uint, c_uint, c_double),

    pub(crate) tscale: c_double,
    pub(crate) flags: c_int,
}

/// What the engine receives from `set_gdmp_matplot_object`: the table plus
/// the context pointer to pass back.
#[repr(C)]
pub(crate) struct EngineInterface {
    pub(crate) methods: CallbackTable,
    pub(crate) context: Ctx,
}

// Entry points exported by the engine library. `system` is `stdcall` on
// 32-bit Windows and the C convention everywhere else.

pub(crate) type InitFn = unsafe extern "system" fn() -> c_int;
pub(crate) type SetInputLineFn = unsafe extern "system" fn(*const c_char, usize);
pub(crate) type DoLineFn = unsafe extern "system" fn() -> c_int;
pub(crate) type SetObjectFn = unsafe extern "system" fn(*mut c_void) -> c_int;
pub(crate) type SetDataframeFn = unsafe extern "system" fn(*const c_double, c_uint, c_uint);
pub(crate) type VersionFn = unsafe extern "system" fn(*mut c_char, c_uint) -> c_int;

pub(crate) const SYM_INIT: &str = "gdmp_init";
pub(crate) const SYM_SET_INPUT_LINE: &str = "set_gdmp_input_line";
pub(crate) const SYM_DO_LINE: &str = "do_line";
pub(crate) const SYM_SET_OBJECT: &str = "set_gdmp_matplot_object";
pub(crate) const SYM_SET_DATAFRAME: &str = "set_gdmp_dataframe";
pub(crate) const SYM_VERSION: &str = "gdmp_get_gnuplot_version";
