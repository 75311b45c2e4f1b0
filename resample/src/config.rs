//! Session configuration.

use serde::{Deserialize, Serialize};

use crate::chunk;
use crate::engine::EngineSpec;
use crate::error::{Error, Result};
use crate::format::{Datatype, SampleFormat};
use crate::quality::Quality;

/// Upper limit on channels. Engines allocate state per channel, so huge
/// counts fail late and expensively; they are rejected up front instead.
pub const MAX_CHANNELS: usize = 65536;

/// Configuration of a resampling session. Immutable for the session's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Input sample rate in Hz.
    pub in_rate: f64,
    /// Output sample rate in Hz.
    pub out_rate: f64,
    /// Number of interleaved channels.
    pub channels: usize,
    /// Sample format of input and output (default: float32).
    #[serde(default)]
    pub format: SampleFormat,
    /// Quality tier (default: HQ).
    #[serde(default)]
    pub quality: Quality,
}

impl SessionConfig {
    /// Creates a float32, HQ configuration.
    pub fn new(in_rate: f64, out_rate: f64, channels: usize) -> Self {
        Self {
            in_rate,
            out_rate,
            channels,
            format: SampleFormat::default(),
            quality: Quality::default(),
        }
    }

    /// Sets the sample format.
    pub fn with_format(mut self, format: SampleFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the quality tier.
    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    /// Output rate divided by input rate.
    pub fn ratio(&self) -> f64 {
        self.out_rate / self.in_rate
    }

    /// Engine slice length in input frames.
    pub fn chunk_len(&self) -> usize {
        chunk::chunk_len(self.in_rate, self.out_rate)
    }

    /// Checks the channel count.
    ///
    /// Rates are validated by the engine when it is created.
    pub fn validate(&self) -> Result<()> {
        if self.channels == 0 || self.channels > MAX_CHANNELS {
            return Err(Error::InvalidChannels(self.channels));
        }
        Ok(())
    }

    /// Checks that both rates are finite and strictly positive.
    pub fn validate_rates(&self) -> Result<()> {
        let valid = |rate: f64| rate.is_finite() && rate > 0.0;
        if !valid(self.in_rate) || !valid(self.out_rate) {
            return Err(Error::InvalidRate {
                in_rate: self.in_rate,
                out_rate: self.out_rate,
            });
        }
        Ok(())
    }

    /// Builds the engine creation parameters for the given datatype.
    pub(crate) fn engine_spec(&self, datatype: Datatype) -> EngineSpec {
        EngineSpec {
            in_rate: self.in_rate,
            out_rate: self.out_rate,
            channels: self.channels,
            datatype,
            quality: self.quality,
        }
    }
}
