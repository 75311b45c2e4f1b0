//! One-shot conversion of planar (channel-major) buffers.
//!
//! Same chunking and sizing as [`batch`](crate::batch), but each channel is
//! its own contiguous run of samples. For every slice the converter builds
//! per-channel input and output views and hands them to the engine's planar
//! entry point.

use tracing::{debug, trace};

use crate::buffer::{PlanarBuf, Strided};
use crate::chunk;
use crate::config::SessionConfig;
use crate::engine::{DefaultEngine, Engine};
use crate::error::{Error, Result};
use crate::format::Sample;
use crate::quality::Quality;

/// Converts planar `input` with the default engine. See [`convert_planar_with`].
pub fn convert_planar<T: Sample>(
    config: &SessionConfig,
    input: Strided<'_, T>,
) -> Result<PlanarBuf<T>> {
    convert_planar_with::<DefaultEngine, T>(config, input)
}

/// Converts a complete planar buffer.
///
/// Rates are checked before anything else, so an invalid rate fails with
/// [`Error::InvalidRate`] without creating an engine. The input must be
/// contiguous along the frame axis ([`Error::NotContiguous`] otherwise).
///
/// The output keeps a fixed per-channel stride equal to the capacity that
/// was reserved; only [`PlanarBuf::frames`] samples per channel are valid.
pub fn convert_planar_with<E: Engine, T: Sample>(
    config: &SessionConfig,
    input: Strided<'_, T>,
) -> Result<PlanarBuf<T>> {
    config.validate_rates()?;
    if !input.is_frame_contiguous() {
        return Err(Error::NotContiguous);
    }
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
        E::create(&config.engine_spec(config.format.planar())).map_err(Error::EngineInit)?;

    let frames = input.frames();
    let stride = chunk::batch_capacity(frames, config.in_rate, config.out_rate);
    let mut out = vec![T::default(); stride * channels];
    let sources: Vec<&[T]> = (0..channels).map(|ch| input.channel(ch)).collect();
    let mut done = 0;

    for (start, len) in chunk::slices(frames, config.chunk_len()) {
        let ins: Vec<&[T]> = sources.iter().map(|ch| &ch[start..start + len]).collect();
        let mut outs: Vec<&mut [T]> = out.chunks_mut(stride).map(|ch| &mut ch[done..]).collect();
        let n = engine.process_planar(Some(&ins[..]), &mut outs[..]).map_err(Error::EngineProcess)?;
        trace!("resample planar: slice {}+{} -> {} frames", start, len, n);
        done += n;
    }
    let mut outs: Vec<&mut [T]> = out.chunks_mut(stride).map(|ch| &mut ch[done..]).collect();
    done += engine.process_planar::<T>(None, &mut outs[..]).map_err(Error::EngineProcess)?;

    debug!(
        "resample planar: {} -> {} frames x {} channels (engine={})",
        frames,
        done,
        channels,
        engine.name()
    );
    Ok(PlanarBuf::from_filled(out, done, channels, stride))
}

/// Resamples planar `input`, taking the channel count and format from it.
pub fn resample_planar<T: Sample>(
    input: Strided<'_, T>,
    in_rate: f64,
    out_rate: f64,
    quality: Quality,
) -> Result<PlanarBuf<T>> {
    let config = SessionConfig::new(in_rate, out_rate, input.channels())
        .with_format(T::FORMAT)
        .with_quality(quality);
    convert_planar(&config, input)
}
