//! One-shot conversion of a complete interleaved buffer.

use tracing::{debug, trace};

use crate::buffer::{Frames, InterleavedBuf};
use crate::chunk;
use crate::config::SessionConfig;
use crate::engine::{DefaultEngine, Engine};
use crate::error::{Error, Result};
use crate::format::Sample;
use crate::quality::Quality;

/// Converts `input` with the default engine. See [`convert_with`].
pub fn convert<T: Sample>(
    config: &SessionConfig,
    input: Frames<'_, T>,
) -> Result<InterleavedBuf<T>> {
    convert_with::<DefaultEngine, T>(config, input)
}

/// Converts a complete buffer: creates an engine, feeds the input in slices
/// of [`SessionConfig::chunk_len`] frames, drains, and drops the engine.
///
/// The input's channel count and element type must match `config`.
pub fn convert_with<E: Engine, T: Sample>(
    config: &SessionConfig,
    input: Frames<'_, T>,
) -> Result<InterleavedBuf<T>> {
    run::<E, T>(config, input, config.chunk_len())
}

/// Like [`convert`], but hands the whole input to the engine in a single
/// call. Output is identical; large inputs are slower.
pub fn convert_oneshot<T: Sample>(
    config: &SessionConfig,
    input: Frames<'_, T>,
) -> Result<InterleavedBuf<T>> {
    run::<DefaultEngine, T>(config, input, usize::MAX)
}

/// Resamples `input` from `in_rate` to `out_rate`, taking the channel count
/// and format from the input itself.
///
/// # Example
///
/// ```
/// use giztoy_resample::{Frames, Quality, resample};
///
/// let input = vec![0i16; 2 * 44100];
/// let out = resample(Frames::new(&input, 2)?, 44100.0, 16000.0, Quality::Medium)?;
/// assert_eq!(out.frames(), 16000);
/// assert_eq!(out.channels(), 2);
/// # Ok::<(), giztoy_resample::Error>(())
/// ```
pub fn resample<T: Sample>(
    input: Frames<'_, T>,
    in_rate: f64,
    out_rate: f64,
    quality: Quality,
) -> Result<InterleavedBuf<T>> {
    convert(&config_for(&input, in_rate, out_rate, quality), input)
}

/// Unchunked variant of [`resample`].
pub fn resample_oneshot<T: Sample>(
    input: Frames<'_, T>,
    in_rate: f64,
    out_rate: f64,
    quality: Quality,
) -> Result<InterleavedBuf<T>> {
    convert_oneshot(&config_for(&input, in_rate, out_rate, quality), input)
}

fn config_for<T: Sample>(
    input: &Frames<'_, T>,
    in_rate: f64,
    out_rate: f64,
    quality: Quality,
) -> SessionConfig {
    SessionConfig::new(in_rate, out_rate, input.channels())
        .with_format(T::FORMAT)
        .with_quality(quality)
}

fn run<E: Engine, T: Sample>(
    config: &SessionConfig,
    input: Frames<'_, T>,
    chunk_len: usize,
) -> Result<InterleavedBuf<T>> {
    config.validate()?;
    let channels = config.channels;
    if input.channels() != channels {
        return Err(Error::ChannelMismatch {
            expected: channels,
            got: input.channels(),
        });
    }
    if T::FORMAT != config.format {
        return Err(Error::FormatMismatch {
            expected: config.format,
            got: T::FORMAT,
        });
    }

    let mut engine =
        E::create(&config.engine_spec(config.format.interleaved())).map_err(Error::EngineInit)?;

    let frames = input.frames();
    let capacity = chunk::batch_capacity(frames, config.in_rate, config.out_rate);
    let mut out = vec![T::default(); capacity * channels];
    let mut done = 0;

    for (start, len) in chunk::slices(frames, chunk_len) {
        let n = engine
            .process(Some(input.slice(start, len)), &mut out[done * channels..])
            .map_err(Error::EngineProcess)?;
        trace!("resample: slice {}+{} -> {} frames", start, len, n);
        done += n;
    }
    done += engine
        .process::<T>(None, &mut out[done * channels..])
        .map_err(Error::EngineProcess)?;

    debug!(
        "resample: {} -> {} frames ({} -> {} Hz, engine={}, clips={})",
        frames,
        done,
        config.in_rate,
        config.out_rate,
        engine.name(),
        engine.clip_count()
    );
    Ok(InterleavedBuf::from_filled(out, done, channels))
}
