// Copyright 2026 the Plotwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `extern "C"` trampolines from the engine's callback table into
//! [`EngineCallbacks`].
//!
//! Every trampoline recovers the `Context` from the pointer the engine
//! passes back and forwards to the trait method of the same name. A null
//! context forwards nothing. Null text pointers skip the call, except for
//! `set_font` where the name is optional.

use core::ffi::{CStr, c_char, c_double, c_float, c_int, c_uchar, c_uint, c_void};
use core::ptr::NonNull;
use std::borrow::Cow;
use std::sync::Arc;

use plotwire_core::callbacks::EngineCallbacks;

use crate::abi::{CallbackTable, Ctx, EngineInterface, TERM_FLAGS, TSCALE};

/// What the context pointer points at.
struct Context {
    callbacks: Arc<dyn EngineCallbacks>,
}

/// An engine interface and its context, allocated at fixed addresses.
///
/// The engine keeps a pointer to the interface, so it must outlive every call
/// into the library that received it.
pub(crate) struct Binding {
    interface: NonNull<EngineInterface>,
}

// SAFETY: the binding exclusively owns both allocations, and the context only
// holds an `Arc<dyn EngineCallbacks>`, which is `Send + Sync`.
unsafe impl Send for Binding {}

impl Binding {
    pub(crate) fn new(callbacks: Arc<dyn EngineCallbacks>) -> Self {
        let context = Box::into_raw(Box::new(Context { callbacks })).cast::<c_void>();
        let interface = Box::new(EngineInterface {
            methods: table(),
            context,
        });
        Self {
            interface: NonNull::from(Box::leak(interface)),
        }
    }

    /// The address handed to the engine.
    pub(crate) fn as_ptr(&self) -> *mut c_void {
        self.interface.as_ptr().cast()
    }
}

impl Drop for Binding {
    fn drop(&mut self) {
        // SAFETY: both allocations were leaked in `new` and are only freed
        // here.
        unsafe {
            let interface = Box::from_raw(self.interface.as_ptr());
            drop(Box::from_raw(interface.context.cast::<Context>()));
        }
    }
}

/// Recovers the callbacks behind a context pointer.
///
/// # Safety
///
/// `ctx` must be null or point to a live [`Context`].
unsafe fn callbacks<'a>(ctx: Ctx) -> Option<&'a dyn EngineCallbacks> {
    // SAFETY: per the function contract.
    unsafe { ctx.cast::<Context>().as_ref() }.map(|c| &*c.callbacks)
}

/// Decodes a C string, replacing invalid UTF-8.
///
/// # Safety
///
/// `s` must be null or point to a NUL-terminated string that stays valid
/// for `'a`.
unsafe fn c_text<'a>(s: *const c_char) -> Option<Cow<'a, str>> {
    if s.is_null() {
        return None;
    }
    // SAFETY: non-null and NUL-terminated per the function contract.
    Some(unsafe { CStr::from_ptr(s) }.to_string_lossy())
}

// ---------------------------------------------------------------------------
// Trampolines
// ---------------------------------------------------------------------------

macro_rules! forward {
    ($($name:ident($($arg:ident: $ty:ty),*);)*) => {$(
        unsafe extern "C" fn $name(ctx: Ctx $(, $arg: $ty)*) {
            // SAFETY: the engine passes back the context installed with the table.
            if let Some(cb) = unsafe { callbacks(ctx) } {
                cb.$name($($arg),*);
            }
        }
    )*};
}

macro_rules! forward_flag {
    ($($name:ident;)*) => {$(
        unsafe extern "C" fn $name(ctx: Ctx, flag: c_uchar) {
            // SAFETY: the engine passes back the context installed with the table.
            if let Some(cb) = unsafe { callbacks(ctx) } {
                cb.$name(flag != 0);
            }
        }
    )*};
}

macro_rules! forward_text {
    ($($name:ident;)*) => {$(
        unsafe extern "C" fn $name(ctx: Ctx, s: *const c_char) {
            // SAFETY: the engine passes back the context installed with the
            // table, and a string valid for the duration of the call.
            if let (Some(cb), Some(s)) = unsafe { (callbacks(ctx), c_text(s)) } {
                cb.$name(&s);
            }
        }
    )*};
}

forward! {
    options();
    init();
    reset();
    text();
    graphics();
    move_to(x: c_uint, y: c_uint);
    vector(x: c_uint, y: c_uint);
    linetype(linetype: c_int);
    point(x: c_uint, y: c_uint, kind: c_int);
    arrow(sx: c_uint, sy: c_uint, ex: c_uint, ey: c_uint, head: c_int);
    pointsize(size: c_double);
    suspend();
    resume();
    fillbox(style: c_int, x: c_uint, y: c_uint, width: c_uint, height: c_uint);
    linewidth(width: c_double);
    previous_palette();
    set_color(color: c_uint);
    enhanced_flush();
    enhanced_writec(c: c_int);
    layer(layer: c_uint);
    path(p: c_int);
    boxed_text(x: c_uint, y: c_uint, option: c_int);
    modify_plots(operations: c_uint, plotno: c_int);

    set_xmax(value: c_uint);
    set_ymax(value: c_uint);
    set_h_tic(value: c_uint);
    set_v_tic(value: c_uint);
    set_color_mode(mode: c_uchar);
    set_linetype(value: c_int);
    set_h_char(value: c_uint);
    set_v_char(value: c_uint);
    set_gridline(value: c_uint);
    set_hasgrid(value: c_uint);
    set_plotno(value: c_uint);
    set_fill_pattern(value: c_int);
    set_fill_pattern_index(value: c_uint);
    set_rgb(rgb: c_uint);
    set_xsize(value: c_uint);
    set_ysize(value: c_uint);
    set_xlast(value: c_uint);
    set_ylast(value: c_uint);
    set_linecap(value: c_int);
    set_fontscale(value: c_double);
    set_dashlength(value: c_double);
    set_linewidth_factor(value: c_double);
    set_background(rgb: c_int);
    set_alpha(value: c_double);
    set_term_pointsize(value: c_double);
    set_stroke_width(value: c_double);
    set_pen(index: c_uint, color: c_uint, width: c_double);
}

forward_flag! {
    set_group_filled_is_open;
    set_in_textbox;
    set_group_is_open;
    set_path_is_open;
}

forward_text! {
    set_dashpattern;
    set_name;
    set_linecolor;
}

unsafe extern "C" fn scale(ctx: Ctx, x: c_double, y: c_double) -> c_int {
    // SAFETY: the engine passes back the context installed with the table.
    unsafe { callbacks(ctx) }.map_or(0, |cb| c_int::from(cb.scale(x, y)))
}

unsafe extern "C" fn put_text(ctx: Ctx, x: c_uint, y: c_uint, s: *const c_char) {
    // SAFETY: context as installed; the string is valid for the call.
    if let (Some(cb), Some(s)) = unsafe { (callbacks(ctx), c_text(s)) } {
        cb.put_text(x, y, &s);
    }
}

unsafe extern "C" fn text_angle(ctx: Ctx, degrees: c_float) -> c_int {
    // SAFETY: the engine passes back the context installed with the table.
    unsafe { callbacks(ctx) }.map_or(0, |cb| c_int::from(cb.text_angle(degrees)))
}

unsafe extern "C" fn justify_text(ctx: Ctx, mode: c_int) -> c_int {
    // SAFETY: the engine passes back the context installed with the table.
    unsafe { callbacks(ctx) }.map_or(0, |cb| c_int::from(cb.justify_text(mode)))
}

unsafe extern "C" fn set_font(ctx: Ctx, name: *const c_char, size: c_double) -> c_int {
    // SAFETY: context as installed; the name is null or valid for the call.
    let (cb, name) = unsafe { (callbacks(ctx), c_text(name)) };
    cb.map_or(0, |cb| c_int::from(cb.set_font(name.as_deref(), size)))
}

unsafe extern "C" fn make_palette(ctx: Ctx, palette: *mut c_void) -> c_int {
    _ = palette;
    // SAFETY: the engine passes back the context installed with the table.
    unsafe { callbacks(ctx) }.map_or(0, |cb| cb.make_palette())
}

unsafe extern "C" fn filled_polygon(ctx: Ctx, count: c_int, corners: *mut c_void, style: c_int) {
    let Ok(count) = usize::try_from(count) else {
        return;
    };
    if count == 0 || corners.is_null() {
        return;
    }
    // SAFETY: the engine passes `count` (x, y) pairs of `int`, valid for the
    // duration of the call.
    let corners = unsafe { core::slice::from_raw_parts(corners.cast::<[c_int; 2]>(), count) };
    // SAFETY: the engine passes back the context installed with the table.
    if let Some(cb) = unsafe { callbacks(ctx) } {
        cb.filled_polygon(corners, style);
    }
}

unsafe extern "C" fn image(
    ctx: Ctx,
    m: c_uint,
    n: c_uint,
    data: *mut c_void,
    corners: *mut c_void,
    color_mode: c_uint,
) {
    _ = (data, corners);
    // SAFETY: the engine passes back the context installed with the table.
    if let Some(cb) = unsafe { callbacks(ctx) } {
        cb.image(m, n, color_mode);
    }
}

unsafe extern "C" fn enhanced_open(
    ctx: Ctx,
    font: *mut c_char,
    size: c_double,
    base: c_double,
    width_flag: c_char,
    show_flag: c_char,
    overprint: c_int,
) {
    // SAFETY: context as installed; the font name is valid for the call.
    if let (Some(cb), Some(font)) = unsafe { (callbacks(ctx), c_text(font.cast_const())) } {
        cb.enhanced_open(&font, size, base, width_flag != 0, show_flag != 0, overprint);
    }
}

unsafe extern "C" fn hypertext(ctx: Ctx, kind: c_int, s: *const c_char) {
    // SAFETY: context as installed; the string is valid for the call.
    if let (Some(cb), Some(s)) = unsafe { (callbacks(ctx), c_text(s)) } {
        cb.hypertext(kind, &s);
    }
}

unsafe extern "C" fn dashtype(ctx: Ctx, kind: c_int, custom: *mut c_void) {
    _ = custom;
    // SAFETY: the engine passes back the context installed with the table.
    if let Some(cb) = unsafe { callbacks(ctx) } {
        cb.dashtype(kind);
    }
}

unsafe extern "C" fn set_patterncolor(ctx: Ctx, colors: *mut c_uint) {
    if colors.is_null() {
        return;
    }
    // SAFETY: the engine passes an array of eight pattern colors.
    let colors = unsafe { colors.cast::<[c_uint; 8]>().read() };
    // SAFETY: the engine passes back the context installed with the table.
    if let Some(cb) = unsafe { callbacks(ctx) } {
        cb.set_patterncolor(colors);
    }
}

/// The table handed to the engine, in header order.
pub(crate) fn table() -> CallbackTable {
    CallbackTable {
        options,
        init,
        reset,
        text,
        scale,
        graphics,
        move_to,
        vector,
        linetype,
        put_text,
        text_angle,
        justify_text,
        point,
        arrow,
        set_font,
        pointsize,
        suspend,
        resume,
        fillbox,
        linewidth,
        make_palette,
        previous_palette,
        set_color,
        filled_polygon,
        image,
        enhanced_open,
        enhanced_flush,
        enhanced_writec,
        layer,
        path,
        hypertext,
        boxed_text,
        modify_plots,
        dashtype,
        set_xmax,
        set_ymax,
        set_h_tic,
        set_v_tic,
        set_color_mode,
        set_linetype,
        set_dashpattern,
        set_h_char,
        set_v_char,
        set_gridline,
        set_hasgrid,
        set_plotno,
        set_fill_pattern,
        set_fill_pattern_index,
        set_rgb,
        set_patterncolor,
        set_group_filled_is_open,
        set_in_textbox,
        set_xsize,
        set_ysize,
        set_xlast,
        set_ylast,
        set_linecap,
        set_group_is_open,
        set_path_is_open,
        set_fontscale,
        set_dashlength,
        set_name,
        set_linewidth_factor,
        set_background,
        set_linecolor,
        set_alpha,
        set_term_pointsize,
        set_stroke_width,
        set_pen,
        tscale: TSCALE,
        flags: TERM_FLAGS,
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::CString;

    use parking_lot::Mutex;

    use super::*;

    #[derive(Default)]
    struct Log(Mutex<Vec<String>>);

    impl Log {
        fn take(&self) -> Vec<String> {
            core::mem::take(&mut *self.0.lock())
        }
    }

    impl EngineCallbacks for Log {
        fn move_to(&self, x: u32, y: u32) {
            self.0.lock().push(format!("move {x} {y}"));
        }

        fn put_text(&self, x: u32, y: u32, text: &str) {
            self.0.lock().push(format!("text {x} {y} {text}"));
        }

        fn set_font(&self, name: Option<&str>, size: f64) -> bool {
            self.0.lock().push(format!("font {name:?} {size}"));
            true
        }

        fn filled_polygon(&self, corners: &[[i32; 2]], style: i32) {
            self.0.lock().push(format!("polygon {corners:?} {style}"));
        }

        fn set_patterncolor(&self, colors: [u32; 8]) {
            self.0.lock().push(format!("pattern {colors:?}"));
        }

        fn set_path_is_open(&self, open: bool) {
            self.0.lock().push(format!("path {open}"));
        }

        fn set_linecolor(&self, spec: &str) {
            self.0.lock().push(format!("linecolor {spec}"));
        }
    }

    fn bound() -> (Arc<Log>, Binding) {
        let log = Arc::new(Log::default());
        let binding = Binding::new(log.clone());
        (log, binding)
    }

    fn interface(binding: &Binding) -> &EngineInterface {
        // SAFETY: the interface lives as long as the binding.
        unsafe { binding.interface.as_ref() }
    }

    #[test]
    fn numeric_and_flag_callbacks_forward() {
        let (log, binding) = bound();
        let iface = interface(&binding);
        // SAFETY: the context is the one installed with the table.
        unsafe {
            (iface.methods.move_to)(iface.context, 3, 4);
            (iface.methods.set_path_is_open)(iface.context, 1);
            (iface.methods.set_path_is_open)(iface.context, 0);
        }
        assert_eq!(log.take(), ["move 3 4", "path true", "path false"]);
    }

    #[test]
    fn text_callbacks_skip_null() {
        let (log, binding) = bound();
        let iface = interface(&binding);
        let hello = CString::new("hello").unwrap();
        let blue = CString::new("0,0,255").unwrap();
        // SAFETY: the context is the one installed with the table; strings
        // outlive the calls.
        unsafe {
            (iface.methods.put_text)(iface.context, 1, 2, hello.as_ptr());
            (iface.methods.put_text)(iface.context, 1, 2, core::ptr::null());
            (iface.methods.set_linecolor)(iface.context, blue.as_ptr());
            (iface.methods.set_linecolor)(iface.context, core::ptr::null());
        }
        assert_eq!(log.take(), ["text 1 2 hello", "linecolor 0,0,255"]);
    }

    #[test]
    fn set_font_forwards_null_as_none() {
        let (log, binding) = bound();
        let iface = interface(&binding);
        let name = CString::new("Sans,10").unwrap();
        // SAFETY: the context is the one installed with the table.
        let (a, b) = unsafe {
            (
                (iface.methods.set_font)(iface.context, name.as_ptr(), 12.0),
                (iface.methods.set_font)(iface.context, core::ptr::null(), 9.0),
            )
        };
        assert_eq!((a, b), (1, 1));
        assert_eq!(log.take(), [r#"font Some("Sans,10") 12"#, "font None 9"]);
    }

    #[test]
    fn polygon_corners_become_pairs() {
        let (log, binding) = bound();
        let iface = interface(&binding);
        let mut xy: [c_int; 6] = [0, 0, 10, 0, 10, 10];
        let corners = xy.as_mut_ptr().cast::<c_void>();
        // SAFETY: `xy` holds three corners and outlives the calls.
        unsafe {
            (iface.methods.filled_polygon)(iface.context, 3, corners, 17);
            (iface.methods.filled_polygon)(iface.context, 0, corners, 17);
            (iface.methods.filled_polygon)(iface.context, -1, corners, 17);
            (iface.methods.filled_polygon)(iface.context, 3, core::ptr::null_mut(), 17);
        }
        assert_eq!(log.take(), ["polygon [[0, 0], [10, 0], [10, 10]] 17"]);
    }

    #[test]
    fn pattern_colors_are_read_as_eight() {
        let (log, binding) = bound();
        let iface = interface(&binding);
        let mut colors: [c_uint; 8] = [1, 2, 3, 4, 5, 6, 7, 8];
        // SAFETY: eight colors, alive for the call.
        unsafe {
            (iface.methods.set_patterncolor)(iface.context, colors.as_mut_ptr());
            (iface.methods.set_patterncolor)(iface.context, core::ptr::null_mut());
        }
        assert_eq!(log.take(), ["pattern [1, 2, 3, 4, 5, 6, 7, 8]"]);
    }

    #[test]
    fn null_context_forwards_nothing() {
        let (log, binding) = bound();
        let iface = interface(&binding);
        // SAFETY: a null context is accepted by every trampoline.
        let scaled = unsafe {
            (iface.methods.move_to)(core::ptr::null_mut(), 1, 1);
            (iface.methods.scale)(core::ptr::null_mut(), 1.0, 1.0)
        };
        assert_eq!(scaled, 0);
        assert!(log.take().is_empty());
    }

    #[test]
    fn trailing_fields_follow_the_table() {
        let (_log, binding) = bound();
        let iface = interface(&binding);
        assert_eq!(iface.methods.tscale, TSCALE);
        assert_eq!(iface.methods.flags, TERM_FLAGS);
        assert_eq!(binding.as_ptr(), core::ptr::from_ref(iface).cast_mut().cast());
    }
}
