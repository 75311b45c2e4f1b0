//! FFI bindings to libsoxr.

use std::os::raw::{c_char, c_double, c_uint, c_ulong, c_void};

/// Opaque soxr handle type.
pub enum SoxrHandle {}

/// Opaque error type (const char*). Null means success.
pub type SoxrError = *const c_char;

/// Quality recipe constants.
pub const SOXR_QQ: c_ulong = 0; // Quick cubic interpolation
pub const SOXR_LQ: c_ulong = 1; // 16-bit, 80% bandwidth
pub const SOXR_MQ: c_ulong = 2; // 16-bit, 95% bandwidth
pub const SOXR_HQ: c_ulong = 4; // 20-bit
pub const SOXR_VHQ: c_ulong = 6; // 28-bit

/// Mirrors `soxr_io_spec_t`.
#[repr(C)]
pub struct SoxrIoSpec {
    pub itype: c_uint,
    pub otype: c_uint,
    pub scale: c_double,
    pub e: *mut c_void,
    pub flags: c_ulong,
}

/// Mirrors `soxr_quality_spec_t`.
#[repr(C)]
pub struct SoxrQualitySpec {
    pub precision: c_double,
    pub phase_response: c_double,
    pub passband_end: c_double,
    pub stopband_begin: c_double,
    pub e: *mut c_void,
    pub flags: c_ulong,
}

unsafe extern "C" {
    /// Returns the library version string.
    pub fn soxr_version() -> *const c_char;

    /// Fills an I/O description for the given datatypes.
    pub fn soxr_io_spec(itype: c_uint, otype: c_uint) -> SoxrIoSpec;

    /// Fills a quality description for a recipe.
    pub fn soxr_quality_spec(recipe: c_ulong, flags: c_ulong) -> SoxrQualitySpec;

    /// Creates a new soxr resampler.
    pub fn soxr_create(
        input_rate: c_double,
        output_rate: c_double,
        num_channels: c_uint,
        error: *mut SoxrError,
        io_spec: *const SoxrIoSpec,
        quality_spec: *const SoxrQualitySpec,
        runtime_spec: *const c_void,
    ) -> *mut SoxrHandle;

    /// Processes samples. A null input flushes the resampler.
    ///
    /// For split datatypes `input` and `output` point to arrays of per-channel
    /// buffer pointers.
    pub fn soxr_process(
        handle: *mut SoxrHandle,
        input: *const c_void,
        input_len: usize,
        input_done: *mut usize,
        output: *mut c_void,
        output_len: usize,
        output_done: *mut usize,
    ) -> SoxrError;

    /// Returns the output frames currently buffered.
    pub fn soxr_delay(handle: *mut SoxrHandle) -> c_double;

    /// Returns the number of clipped integer samples.
    pub fn soxr_num_clips(handle: *mut SoxrHandle) -> usize;

    /// Returns the name of the active resampling engine.
    pub fn soxr_engine(handle: *mut SoxrHandle) -> *const c_char;

    /// Resets the resampler to its initial state.
    pub fn soxr_clear(handle: *mut SoxrHandle) -> SoxrError;

    /// Deletes the resampler and frees resources.
    pub fn soxr_delete(handle: *mut SoxrHandle);
}

/// Converts a C string returned by libsoxr.
pub fn c_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        // Safety: libsoxr returns NUL-terminated static strings.
        let c_str = unsafe { std::ffi::CStr::from_ptr(ptr) };
        Some(c_str.to_string_lossy().into_owned())
    }
}

/// Safe wrapper to get error message.
pub fn error_string(err: SoxrError) -> Option<String> {
    c_string(err)
}
