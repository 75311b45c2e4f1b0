//! Streaming resampling session.
//!
//! A [`ResampleStream`] wraps one engine and converts successive chunks of
//! a stream. Each call returns the output that became available; the last
//! call (with `last = true`) also drains whatever the engine still holds.
//!
//! ```text
//! Active --process(.., last=true)--> Ended
//! Active --process(.., last=false)-> Active
//! Ended  --process(..)-------------> error: StreamEnded
//! any    --clear()-----------------> Active
//! ```

use tracing::{debug, trace, warn};

use crate::buffer::{Frames, InterleavedBuf};
use crate::chunk;
use crate::config::SessionConfig;
use crate::engine::{DefaultEngine, Engine};
use crate::error::{Error, Result};
use crate::format::Sample;

/// Stateful interleaved resampler for one stream.
///
/// Owns its engine exclusively; the engine is released when the stream is
/// dropped. A stream is `Send` but not shared: calls take `&mut self`.
pub struct ResampleStream<E: Engine = DefaultEngine> {
    engine: E,
    config: SessionConfig,
    ratio: f64,
    chunk_len: usize,
    ended: bool,
}

impl ResampleStream {
    /// Creates a stream on the default engine.
    ///
    /// # Example
    ///
    /// ```
    /// use giztoy_resample::{Frames, ResampleStream, SessionConfig};
    ///
    /// let mut stream = ResampleStream::new(SessionConfig::new(16000.0, 8000.0, 1))?;
    /// let input = vec![0.0f32; 1600];
    /// let mut frames = stream.process(Frames::mono(&input), false)?.frames();
    /// frames += stream.process(Frames::<f32>::mono(&[]), true)?.frames();
    /// assert_eq!(frames, 800);
    /// # Ok::<(), giztoy_resample::Error>(())
    /// ```
    pub fn new(config: SessionConfig) -> Result<Self> {
        Self::with_engine(config)
    }
}

impl<E: Engine> ResampleStream<E> {
    /// Creates a stream on engine `E`.
    ///
    /// Fails with [`Error::InvalidChannels`] for an out-of-range channel
    /// count and [`Error::EngineInit`] if the engine rejects the
    /// configuration.
    pub fn with_engine(config: SessionConfig) -> Result<Self> {
        config.validate()?;
        let engine =
            E::create(&config.engine_spec(config.format.interleaved())).map_err(Error::EngineInit)?;
        let stream = Self {
            engine,
            config,
            ratio: config.ratio(),
            chunk_len: config.chunk_len(),
            ended: false,
        };
        debug!(
            "resample stream created: {} -> {} Hz, ch={}, {}, {}, engine={}, chunk={}",
            config.in_rate,
            config.out_rate,
            config.channels,
            config.format,
            config.quality,
            stream.engine.name(),
            stream.chunk_len
        );
        Ok(stream)
    }

    /// Converts the next chunk of the stream.
    ///
    /// Returns the frames produced by this call, which may be fewer or more
    /// than `input.frames() * ratio` because of engine latency. With `last`
    /// set, the engine is drained and the stream moves to the ended state.
    ///
    /// A rejected call leaves the stream unchanged.
    pub fn process<T: Sample>(
        &mut self,
        input: Frames<'_, T>,
        last: bool,
    ) -> Result<InterleavedBuf<T>> {
        if self.ended {
            return Err(Error::StreamEnded);
        }
        let channels = self.config.channels;
        if input.channels() != channels {
            return Err(Error::ChannelMismatch {
                expected: channels,
                got: input.channels(),
            });
        }
        if T::FORMAT != self.config.format {
            return Err(Error::FormatMismatch {
                expected: self.config.format,
                got: T::FORMAT,
            });
        }

        let frames = input.frames();
        let capacity = chunk::output_capacity(self.engine.delay(), frames, self.ratio);
        let mut out = vec![T::default(); capacity * channels];
        let mut done = 0;

        for (start, len) in chunk::slices(frames, self.chunk_len) {
            let n = self
                .engine
                .process(Some(input.slice(start, len)), &mut out[done * channels..])
                .map_err(Error::EngineProcess)?;
            trace!("resample stream: slice {}+{} -> {} frames", start, len, n);
            done += n;
        }

        if last {
            self.ended = true;
            let n = self
                .engine
                .process::<T>(None, &mut out[done * channels..])
                .map_err(Error::EngineProcess)?;
            done += n;
            debug!(
                "resample stream ended: drained {} frames, clips={}",
                n,
                self.engine.clip_count()
            );
        }

        Ok(InterleavedBuf::from_filled(out, done, channels))
    }

    /// Integer samples clamped since creation or the last [`clear`](Self::clear).
    pub fn clip_count(&self) -> usize {
        self.engine.clip_count()
    }

    /// Output frames still held inside the engine.
    pub fn delay(&self) -> f64 {
        self.engine.delay()
    }

    /// Identifier of the engine implementation in use.
    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Resets the engine and reopens an ended stream, keeping the configuration.
    pub fn clear(&mut self) -> Result<()> {
        self.engine.reset().map_err(Error::EngineReset)?;
        self.ended = false;
        debug!("resample stream cleared");
        Ok(())
    }

    /// The session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Output rate divided by input rate.
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Largest slice handed to the engine per call, in input frames.
    pub fn chunk_len(&self) -> usize {
        self.chunk_len
    }

    /// Returns true once the last input has been processed.
    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl<E: Engine> Drop for ResampleStream<E> {
    fn drop(&mut self) {
        let delay = self.engine.delay();
        if !self.ended && delay > 0.0 {
            warn!("resample stream dropped with {} frames not drained", delay);
        }
    }
}
