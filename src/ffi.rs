//! C-compatible FFI API for host applications.
//!
//! # ABI Contract
//!
//! All exported functions use `extern "C"` calling convention and `#[no_mangle]`
//! to ensure stable symbol names.
//!
//! ## Memory management
//! - Buffers returned by `sforge_*` functions are allocated on the Rust heap.
//! - Callers **must** free them with `sforge_free_buffer` / `sforge_free_string`.
//! - Passing a null pointer to a free function is a no-op.
//!
//! ## Error handling
//! - Functions that can fail return a `c_int` (0 = success, non-zero = error).
//! - Error details can be retrieved via `sforge_last_error`.
//!
//! ## Thread safety
//! - Every call composes its own document, so calls may run concurrently.
//! - `sforge_last_error` uses a thread-local.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;
use std::slice;

use crate::fonts::{FontFamily, FontManager};
use crate::layout_config::LayoutConfig;
use crate::pipeline::{compute_layout, generate_document, LayoutOptions, PageOrientation};
use crate::render::render_pdf;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

// ---------------------------------------------------------------------------
// C-compatible configuration types
// ---------------------------------------------------------------------------

/// Page orientation for use in [`SforgeLayoutConfig`].
#[repr(C)]
pub enum SforgePageOrientation {
    /// Portrait mode: height > width (default).
    Portrait = 0,
    /// Landscape mode: width > height.
    Landscape = 1,
}

/// Font family for use in [`SforgeLayoutConfig`].
#[repr(C)]
pub enum SforgeFontFamily {
    Serif = 0,
    Sans = 1,
}

/// Optional configuration passed to the `*_ex` functions.
///
/// Fields set to `0` (or `NULL` for `date_stamp`) fall back to defaults:
/// - `page_width`  → 595.28 pt
/// - `page_height` → 841.89 pt
/// - `margin`      → 72 pt
/// - `date_stamp`  → today's date
#[repr(C)]
pub struct SforgeLayoutConfig {
    /// Page width in points. Pass `0.0` to use the default (A4 = 595.28).
    pub page_width: f32,
    /// Page height in points. Pass `0.0` to use the default (A4 = 841.89).
    pub page_height: f32,
    /// Page margin in points. Pass `0.0` to use the default (72 pt).
    pub margin: f32,
    pub orientation: SforgePageOrientation,
    pub font_family: SforgeFontFamily,
    /// Null-terminated UTF-8 date printed on the cover, or `NULL`.
    pub date_stamp: *const c_char,
}

/// Convert an `SforgeLayoutConfig` (FFI) to `LayoutOptions` (Rust).
///
/// # Safety
/// `cfg.date_stamp`, if non-null, must point to a valid null-terminated string.
unsafe fn options_from_c(cfg: &SforgeLayoutConfig) -> LayoutOptions {
    let defaults = LayoutOptions::default();
    let pick = |value: f32, default: f32| if value == 0.0 { default } else { value };

    let date_stamp = if cfg.date_stamp.is_null() {
        None
    } else {
        Some(CStr::from_ptr(cfg.date_stamp).to_string_lossy().into_owned())
    };

    LayoutOptions {
        page_width: pick(cfg.page_width, defaults.page_width),
        page_height: pick(cfg.page_height, defaults.page_height),
        margin: pick(cfg.margin, defaults.margin),
        orientation: match cfg.orientation {
            SforgePageOrientation::Portrait => PageOrientation::Portrait,
            SforgePageOrientation::Landscape => PageOrientation::Landscape,
        },
        font_family: match cfg.font_family {
            SforgeFontFamily::Serif => FontFamily::Serif,
            SforgeFontFamily::Sans => FontFamily::Sans,
        },
        date_stamp,
        ..defaults
    }
}

/// Read the `(title, body)` pair shared by the generate/layout entry points.
///
/// # Safety
/// `title` must be null or a valid null-terminated string; `body_ptr` must
/// point to `body_len` valid bytes.
unsafe fn read_input<'a>(
    title: *const c_char,
    body_ptr: *const u8,
    body_len: u32,
) -> Result<(&'a str, &'a str), c_int> {
    let title = if title.is_null() {
        ""
    } else {
        match CStr::from_ptr(title).to_str() {
            Ok(s) => s,
            Err(e) => {
                set_last_error(&format!("Invalid UTF-8 in title: {e}"));
                return Err(2);
            }
        }
    };

    let body = if body_len == 0 {
        ""
    } else {
        match std::str::from_utf8(slice::from_raw_parts(body_ptr, body_len as usize)) {
            Ok(s) => s,
            Err(e) => {
                set_last_error(&format!("Invalid UTF-8 in body: {e}"));
                return Err(2);
            }
        }
    };
    Ok((title, body))
}

fn hand_over_bytes(bytes: Vec<u8>, out_buf: *mut *mut u8, out_len: *mut u32) {
    let len = bytes.len() as u32;
    let raw = Box::into_raw(bytes.into_boxed_slice()) as *mut u8;
    // SAFETY: callers check both out-pointers for null first.
    unsafe {
        *out_buf = raw;
        *out_len = len;
    }
}

// ---------------------------------------------------------------------------
// Core API
// ---------------------------------------------------------------------------

/// Lay out and render a summary document with default options.
///
/// # Parameters
/// - `title`: null-terminated UTF-8 title (`NULL` = untitled)
/// - `body_ptr`, `body_len`: UTF-8 summary text (not necessarily null-terminated)
/// - `out_buf`, `out_len`: on success, receive the heap-allocated PDF bytes
///
/// # Returns
/// `0` on success, non-zero on error. On error, call `sforge_last_error`.
///
/// # Safety
/// - `body_ptr` must point to `body_len` valid bytes.
/// - `out_buf` and `out_len` must be valid pointers.
/// - The caller must free `*out_buf` by calling `sforge_free_buffer`.
#[no_mangle]
pub unsafe extern "C" fn sforge_generate_document(
    title: *const c_char,
    body_ptr: *const u8,
    body_len: u32,
    out_buf: *mut *mut u8,
    out_len: *mut u32,
) -> c_int {
    sforge_generate_document_ex(title, body_ptr, body_len, ptr::null(), out_buf, out_len, ptr::null_mut())
}

/// Generate a document with a custom [`SforgeLayoutConfig`], optionally
/// returning the derived filename.
///
/// # Parameters
/// - `cfg`: optional pointer to an [`SforgeLayoutConfig`]; pass `NULL` for defaults
/// - `out_filename`: optional; receives the `.pdf` filename derived from the
///   title (free with `sforge_free_string`)
///
/// # Safety
/// Same as `sforge_generate_document`. `cfg`, if non-null, must point to a
/// fully-initialised [`SforgeLayoutConfig`].
#[no_mangle]
pub unsafe extern "C" fn sforge_generate_document_ex(
    title: *const c_char,
    body_ptr: *const u8,
    body_len: u32,
    cfg: *const SforgeLayoutConfig,
    out_buf: *mut *mut u8,
    out_len: *mut u32,
    out_filename: *mut *mut c_char,
) -> c_int {
    if (body_ptr.is_null() && body_len > 0) || out_buf.is_null() || out_len.is_null() {
        set_last_error("Null pointer argument");
        return 1;
    }

    let (title, body) = match read_input(title, body_ptr, body_len) {
        Ok(input) => input,
        Err(code) => return code,
    };

    let options = if cfg.is_null() {
        LayoutOptions::default()
    } else {
        options_from_c(&*cfg)
    };

    match generate_document(title, body, &options) {
        Ok(artifact) => {
            if !out_filename.is_null() {
                *out_filename = CString::new(artifact.filename)
                    .map(CString::into_raw)
                    .unwrap_or(ptr::null_mut());
            }
            hand_over_bytes(artifact.bytes, out_buf, out_len);
            0
        }
        Err(e) => {
            set_last_error(&e.to_string());
            3
        }
    }
}

/// Compute only the frozen layout (no PDF rendering). Returns JSON.
///
/// # Safety
/// Same as `sforge_generate_document_ex`. `*out_json_ptr` must be freed with
/// `sforge_free_string`.
#[no_mangle]
pub unsafe extern "C" fn sforge_compute_layout(
    title: *const c_char,
    body_ptr: *const u8,
    body_len: u32,
    cfg: *const SforgeLayoutConfig,
    out_json_ptr: *mut *mut c_char,
) -> c_int {
    if (body_ptr.is_null() && body_len > 0) || out_json_ptr.is_null() {
        set_last_error("Null pointer argument");
        return 1;
    }

    let (title, body) = match read_input(title, body_ptr, body_len) {
        Ok(input) => input,
        Err(code) => return code,
    };

    let options = if cfg.is_null() {
        LayoutOptions::default()
    } else {
        options_from_c(&*cfg)
    };

    let json = compute_layout(title, body, &options).to_json();
    match CString::new(json) {
        Ok(cs) => {
            *out_json_ptr = cs.into_raw();
            0
        }
        Err(_) => {
            set_last_error("JSON contained null byte");
            3
        }
    }
}

/// Render a PDF from a layout JSON string produced by `sforge_compute_layout`.
///
/// This allows pre-computing the layout and rendering separately. Built-in
/// fonts are used.
///
/// # Safety
/// `json_ptr` must be a valid null-terminated string; `out_buf` and `out_len`
/// must be valid pointers.
#[no_mangle]
pub unsafe extern "C" fn sforge_render_from_layout(
    json_ptr: *const c_char,
    out_buf: *mut *mut u8,
    out_len: *mut u32,
) -> c_int {
    if json_ptr.is_null() || out_buf.is_null() || out_len.is_null() {
        set_last_error("Null pointer argument");
        return 1;
    }

    let json = match CStr::from_ptr(json_ptr).to_str() {
        Ok(s) => s,
        Err(e) => {
            set_last_error(&format!("Invalid UTF-8 in JSON: {e}"));
            return 2;
        }
    };

    let layout = match LayoutConfig::from_json(json) {
        Ok(c) => c,
        Err(e) => {
            set_last_error(&e.to_string());
            return 3;
        }
    };

    match render_pdf(&layout, &FontManager::new(layout.font_family)) {
        Ok(bytes) => {
            hand_over_bytes(bytes, out_buf, out_len);
            0
        }
        Err(e) => {
            set_last_error(&e.to_string());
            4
        }
    }
}

// ---------------------------------------------------------------------------
// Memory management
// ---------------------------------------------------------------------------

/// Free a PDF buffer returned by `sforge_generate_document` (or similar).
///
/// # Safety
/// `buf` must have been returned by this library and `len` must be the
/// corresponding length.
#[no_mangle]
pub unsafe extern "C" fn sforge_free_buffer(buf: *mut u8, len: u32) {
    if !buf.is_null() {
        let _ = Box::from_raw(slice::from_raw_parts_mut(buf, len as usize));
    }
}

/// Free a string returned by this library (filename or layout JSON).
///
/// # Safety
/// `s` must have been returned by Rust's `CString::into_raw`.
#[no_mangle]
pub unsafe extern "C" fn sforge_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = CString::from_raw(s);
    }
}

/// Retrieve the last error message. Returns a null-terminated string.
///
/// The returned pointer is valid until the next `sforge_*` call on the same
/// thread. The caller should **not** free this pointer.
///
/// Returns null if no error has occurred.
#[no_mangle]
pub extern "C" fn sforge_last_error() -> *const c_char {
    LAST_ERROR.with(|e| {
        let borrow = e.borrow();
        match borrow.as_ref() {
            Some(cs) => cs.as_ptr(),
            None => ptr::null(),
        }
    })
}

/// Return the library version as a null-terminated string.
/// The caller must **not** free this pointer.
#[no_mangle]
pub extern "C" fn sforge_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
