//! Resampling engines.
//!
//! An [`Engine`] is the stateful filter behind a session. Converters only
//! talk to engines through this trait, so the streaming, batch and planar
//! paths behave the same whichever backend is compiled in:
//!
//! - [`RubatoEngine`]: pure Rust windowed-sinc interpolation (default).
//! - `SoxrEngine`: the system libsoxr, enabled by the `libsoxr` feature.
//!
//! Engines report failures as a plain diagnostic string; converters wrap it
//! in the matching [`Error`](crate::Error) variant.

mod rubato_impl;
#[cfg(feature = "libsoxr")]
pub mod soxr;

pub use rubato_impl::RubatoEngine;
#[cfg(feature = "libsoxr")]
pub use soxr::SoxrEngine;

use crate::format::{Datatype, Sample};
use crate::quality::Quality;

/// Human-readable failure reason reported by an engine.
pub type Diagnostic = String;

/// Engine used when none is named explicitly.
#[cfg(not(feature = "libsoxr"))]
pub type DefaultEngine = RubatoEngine;

/// Engine used when none is named explicitly.
#[cfg(feature = "libsoxr")]
pub type DefaultEngine = SoxrEngine;

/// Parameters an engine is created with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSpec {
    /// Input sample rate in Hz.
    pub in_rate: f64,
    /// Output sample rate in Hz.
    pub out_rate: f64,
    /// Number of channels.
    pub channels: usize,
    /// Element type and layout of both input and output.
    pub datatype: Datatype,
    /// Quality tier.
    pub quality: Quality,
}

/// A stateful sample-rate converter.
///
/// All frame counts are per channel. Interleaved calls pass `frames ×
/// channels` samples; planar calls pass one slice per channel.
///
/// A processing call consumes all of its input and writes at most as many
/// frames as the output holds. Callers size the output from [`delay`]
/// plus the input length times the rate ratio, which is always enough.
/// Passing `None` as input flushes: the engine pads with silence and emits
/// everything it still holds.
///
/// [`delay`]: Engine::delay
pub trait Engine: Send + Sized {
    /// Creates an engine. Invalid rates or channel counts are rejected here.
    fn create(spec: &EngineSpec) -> Result<Self, Diagnostic>;

    /// Processes interleaved samples, returning the output frames written.
    fn process<T: Sample>(
        &mut self,
        input: Option<&[T]>,
        output: &mut [T],
    ) -> Result<usize, Diagnostic>;

    /// Processes planar samples, returning the output frames written per channel.
    fn process_planar<T: Sample>(
        &mut self,
        input: Option<&[&[T]]>,
        output: &mut [&mut [T]],
    ) -> Result<usize, Diagnostic>;

    /// Output frames the engine currently owes for input it has consumed.
    fn delay(&self) -> f64;

    /// Integer output samples clamped since creation or the last reset.
    fn clip_count(&self) -> usize;

    /// Identifier of the underlying algorithm.
    fn name(&self) -> &str;

    /// Returns the engine to its freshly created state, keeping the configuration.
    fn reset(&mut self) -> Result<(), Diagnostic>;
}
