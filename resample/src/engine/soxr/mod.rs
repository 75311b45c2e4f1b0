//! SoX Resampler engine.
//!
//! Thin owner of a native `soxr_t` handle. libsoxr does its own buffering,
//! so every call maps onto a single `soxr_process`, except flushing, which
//! repeats until the library has nothing left or the output is full.

mod ffi;

use std::os::raw::{c_uint, c_ulong, c_void};
use std::ptr;

use tracing::debug;

use super::{Diagnostic, Engine, EngineSpec};
use crate::format::{Datatype, Sample};
use crate::quality::Quality;

/// Returns the linked libsoxr version, e.g. `"libsoxr-0.1.3"`.
pub fn version() -> String {
    // Safety: returns a pointer to a static string.
    ffi::c_string(unsafe { ffi::soxr_version() }).unwrap_or_default()
}

fn recipe(quality: Quality) -> c_ulong {
    match quality {
        Quality::Quick => ffi::SOXR_QQ,
        Quality::Low => ffi::SOXR_LQ,
        Quality::Medium => ffi::SOXR_MQ,
        Quality::High => ffi::SOXR_HQ,
        Quality::VeryHigh => ffi::SOXR_VHQ,
    }
}

/// Engine backed by the system libsoxr.
///
/// The handle is released on drop.
pub struct SoxrEngine {
    handle: *mut ffi::SoxrHandle,
    datatype: Datatype,
    channels: usize,
    name: String,
}

// Safety: the handle is owned exclusively and only used through `&mut self`,
// except for the read-only getters, which libsoxr allows concurrently.
unsafe impl Send for SoxrEngine {}

impl Drop for SoxrEngine {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe { ffi::soxr_delete(self.handle) };
            self.handle = ptr::null_mut();
        }
    }
}

impl SoxrEngine {
    fn check_layout<T: Sample>(&self, planar: bool) -> Result<(), Diagnostic> {
        if T::FORMAT != self.datatype.format() || planar != self.datatype.is_planar() {
            return Err(format!(
                "engine created for {:?}, called with {} {}",
                self.datatype,
                if planar { "planar" } else { "interleaved" },
                T::FORMAT
            ));
        }
        Ok(())
    }

    /// One `soxr_process` call over raw buffers.
    ///
    /// # Safety
    ///
    /// `input` must be null or address `ilen` frames of the configured
    /// layout, and `output` must address `olen` writable frames.
    unsafe fn process_raw(
        &mut self,
        input: *const c_void,
        ilen: usize,
        output: *mut c_void,
        olen: usize,
    ) -> Result<usize, Diagnostic> {
        let mut idone = 0usize;
        let mut odone = 0usize;
        let err = unsafe {
            ffi::soxr_process(self.handle, input, ilen, &mut idone, output, olen, &mut odone)
        };
        if let Some(msg) = ffi::error_string(err) {
            return Err(msg);
        }
        if idone < ilen {
            return Err(format!("consumed {idone} of {ilen} input frames"));
        }
        Ok(odone)
    }
}

impl Engine for SoxrEngine {
    fn create(spec: &EngineSpec) -> Result<Self, Diagnostic> {
        let valid = |rate: f64| rate.is_finite() && rate > 0.0;
        if !valid(spec.in_rate) || !valid(spec.out_rate) {
            return Err(format!("invalid io_ratio: {} -> {}", spec.in_rate, spec.out_rate));
        }
        let channels = c_uint::try_from(spec.channels)
            .map_err(|_| format!("invalid channel count: {}", spec.channels))?;

        let handle = unsafe {
            let datatype = spec.datatype as c_uint;
            let io_spec = ffi::soxr_io_spec(datatype, datatype);
            let quality_spec = ffi::soxr_quality_spec(recipe(spec.quality), 0);

            let mut error: ffi::SoxrError = ptr::null();
            let handle = ffi::soxr_create(
                spec.in_rate,
                spec.out_rate,
                channels,
                &mut error,
                &io_spec,
                &quality_spec,
                ptr::null(),
            );
            if handle.is_null() {
                return Err(ffi::error_string(error).unwrap_or_else(|| "unknown error".to_string()));
            }
            handle
        };

        let name = ffi::c_string(unsafe { ffi::soxr_engine(handle) })
            .unwrap_or_else(|| "soxr".to_string());
        debug!(
            "soxr: created {} engine, {} -> {} Hz, channels={}, {:?}",
            name, spec.in_rate, spec.out_rate, spec.channels, spec.datatype
        );

        Ok(Self {
            handle,
            datatype: spec.datatype,
            channels: spec.channels,
            name,
        })
    }

    fn process<T: Sample>(
        &mut self,
        input: Option<&[T]>,
        output: &mut [T],
    ) -> Result<usize, Diagnostic> {
        self.check_layout::<T>(false)?;
        let channels = self.channels;
        let olen = output.len() / channels;

        match input {
            Some(samples) => {
                let ilen = samples.len() / channels;
                let (src, dst) = (samples.as_ptr().cast(), output.as_mut_ptr().cast());
                unsafe { self.process_raw(src, ilen, dst, olen) }
            }
            None => {
                let mut done = 0;
                while done < olen {
                    let out = &mut output[done * channels..];
                    let dst = out.as_mut_ptr().cast();
                    let n = unsafe { self.process_raw(ptr::null(), 0, dst, olen - done)? };
                    if n == 0 {
                        break;
                    }
                    done += n;
                }
                Ok(done)
            }
        }
    }

    fn process_planar<T: Sample>(
        &mut self,
        input: Option<&[&[T]]>,
        output: &mut [&mut [T]],
    ) -> Result<usize, Diagnostic> {
        self.check_layout::<T>(true)?;
        if output.len() != self.channels {
            return Err(format!("expected {} output channels, got {}", self.channels, output.len()));
        }
        let olen = output.iter().map(|ch| ch.len()).min().unwrap_or(0);

        match input {
            Some(chans) => {
                if chans.len() != self.channels {
                    return Err(format!(
                        "expected {} input channels, got {}",
                        self.channels,
                        chans.len()
                    ));
                }
                let ilen = chans.iter().map(|ch| ch.len()).min().unwrap_or(0);
                let in_ptrs: Vec<*const c_void> =
                    chans.iter().map(|ch| ch.as_ptr().cast()).collect();
                let mut out_ptrs: Vec<*mut c_void> =
                    output.iter_mut().map(|ch| ch.as_mut_ptr().cast()).collect();
                let (src, dst) = (in_ptrs.as_ptr().cast(), out_ptrs.as_mut_ptr().cast());
                unsafe { self.process_raw(src, ilen, dst, olen) }
            }
            None => {
                let mut done = 0;
                while done < olen {
                    let mut out_ptrs: Vec<*mut c_void> =
                        output.iter_mut().map(|ch| ch[done..].as_mut_ptr().cast()).collect();
                    let n = unsafe {
                        self.process_raw(ptr::null(), 0, out_ptrs.as_mut_ptr().cast(), olen - done)?
                    };
                    if n == 0 {
                        break;
                    }
                    done += n;
                }
                Ok(done)
            }
        }
    }

    fn delay(&self) -> f64 {
        unsafe { ffi::soxr_delay(self.handle) }
    }

    fn clip_count(&self) -> usize {
        unsafe { ffi::soxr_num_clips(self.handle) }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn reset(&mut self) -> Result<(), Diagnostic> {
        let err = unsafe { ffi::soxr_clear(self.handle) };
        match ffi::error_string(err) {
            Some(msg) => Err(msg),
            None => Ok(()),
        }
    }
}
