//! Error types for resampling.

use crate::format::SampleFormat;

/// Result type alias for resampling operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for resampling operations.
///
/// Every error is reported to the immediate caller; nothing is retried.
/// No output buffer is ever returned alongside an error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Element type or format name is not one of float32, float64, int32, int16.
    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// The engine rejected the configuration.
    #[error("engine init failed: {0}")]
    EngineInit(String),

    /// Input was passed after the last input without a `clear()`.
    #[error("input after last input")]
    StreamEnded,

    /// Input channel count differs from the configured one.
    #[error("channel mismatch: expected {expected}, got {got}")]
    ChannelMismatch { expected: usize, got: usize },

    /// Input element type differs from the configured format.
    #[error("format mismatch: expected {expected}, got {got}")]
    FormatMismatch {
        expected: SampleFormat,
        got: SampleFormat,
    },

    /// The engine rejected a processing or drain call.
    #[error("engine process failed: {0}")]
    EngineProcess(String),

    /// The engine could not reset its state.
    #[error("engine reset failed: {0}")]
    EngineReset(String),

    /// Planar input is not contiguous along the frame axis.
    #[error("input is not contiguous along the frame axis")]
    NotContiguous,

    /// A sample rate is zero, negative or not a number.
    #[error("invalid sample rate: in {in_rate}, out {out_rate}")]
    InvalidRate { in_rate: f64, out_rate: f64 },

    /// Channel count outside `[1, MAX_CHANNELS]`.
    #[error("channel count {0} out of range [1, {max}]", max = crate::config::MAX_CHANNELS)]
    InvalidChannels(usize),

    /// Sample slice does not describe a whole number of frames.
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    /// Quality name could not be parsed.
    #[error("invalid quality {0:?}: must be one of QQ, LQ, MQ, HQ, VHQ")]
    InvalidQuality(String),
}
