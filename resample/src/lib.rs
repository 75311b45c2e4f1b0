//! Sample-rate conversion for multi-channel PCM.
//!
//! This crate wraps a resampling engine with the pieces a caller actually
//! needs around it:
//!
//! - [`ResampleStream`]: a stateful session fed chunk by chunk, with
//!   end-of-stream draining, delay and clip telemetry, and reset
//! - [`convert`] / [`resample`]: one-shot conversion of interleaved buffers
//! - [`convert_planar`] / [`resample_planar`]: the same for channel-major
//!   buffers
//!
//! All converters size their output once from an upper bound, feed the
//! engine in bounded slices, and hand the filled allocation to the caller
//! without copying.
//!
//! Supported sample types are `f32`, `f64`, `i32` and `i16`. Integer output
//! saturates; each saturated sample is counted as a clip.
//!
//! # Engines
//!
//! The default engine is a pure Rust windowed-sinc resampler built on
//! `rubato`. Enabling the `libsoxr` feature links the system libsoxr and
//! makes it the default instead. Any [`Engine`] can be plugged in through
//! the `*_with` functions and [`ResampleStream::with_engine`].
//!
//! # Example
//!
//! ```rust
//! use giztoy_resample::{Frames, ResampleStream, SessionConfig};
//!
//! let config = SessionConfig::new(44100.0, 48000.0, 2);
//! let mut stream = ResampleStream::new(config)?;
//!
//! let tone: Vec<f32> = (0..44100)
//!     .flat_map(|i| {
//!         let s = (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / 44100.0).sin() * 0.5;
//!         [s, s]
//!     })
//!     .collect();
//!
//! let mut produced = 0;
//! for piece in tone.chunks(2 * 4410) {
//!     produced += stream.process(Frames::new(piece, 2)?, false)?.frames();
//! }
//! produced += stream.process(Frames::<f32>::new(&[], 2)?, true)?.frames();
//!
//! assert_eq!(produced, 48000);
//! assert_eq!(stream.clip_count(), 0);
//! # Ok::<(), giztoy_resample::Error>(())
//! ```

pub mod batch;
pub mod buffer;
pub mod chunk;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod planar;
pub mod quality;
pub mod stream;

pub use batch::{convert, convert_oneshot, convert_with, resample, resample_oneshot};
pub use buffer::{Frames, InterleavedBuf, PlanarBuf, Strided};
pub use config::SessionConfig;
pub use engine::{DefaultEngine, Engine, EngineSpec, RubatoEngine};
pub use error::{Error, Result};
pub use format::{Datatype, Sample, SampleFormat, resolve, resolve_planar};
pub use planar::{convert_planar, convert_planar_with, resample_planar};
pub use quality::Quality;
pub use stream::ResampleStream;
