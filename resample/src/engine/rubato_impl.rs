//! Windowed-sinc engine built on rubato.
//!
//! rubato consumes fixed-size blocks, while sessions hand over arbitrary
//! slices. The engine keeps a per-channel queue of unconsumed input and a
//! queue of produced output, and runs the kernel whenever a full block is
//! queued. The kernel starts its read position half a filter before the
//! first input frame, so output frame `j` already sits at input time
//! `j / ratio` and nothing has to be discarded.
//!
//! The total output is pinned to `round(frames_in * ratio)`. Because the
//! kernel only ever sees whole blocks, the output depends on the input
//! sequence alone and not on how it was sliced.

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
    calculate_cutoff,
};
use tracing::{debug, trace};

use super::{Diagnostic, Engine, EngineSpec};
use crate::format::{Datatype, Sample};
use crate::quality::Quality;

/// Smallest kernel block in input frames.
const MIN_KERNEL_FRAMES: usize = 1024;

/// Zero-padded kernel calls allowed when flushing. Blocks are at least
/// twice the filter length, so the tail always fits in far fewer.
const MAX_FLUSH_CALLS: usize = 8;

/// Filter settings for one quality tier.
struct Tier {
    name: &'static str,
    sinc_len: usize,
    oversampling: usize,
    interpolation: SincInterpolationType,
    window: WindowFunction,
}

fn tier(quality: Quality) -> Tier {
    match quality {
        Quality::Quick => Tier {
            name: "sinc32-linear",
            sinc_len: 32,
            oversampling: 64,
            interpolation: SincInterpolationType::Linear,
            window: WindowFunction::Hann2,
        },
        Quality::Low => Tier {
            name: "sinc64-linear",
            sinc_len: 64,
            oversampling: 128,
            interpolation: SincInterpolationType::Linear,
            window: WindowFunction::Blackman2,
        },
        Quality::Medium => Tier {
            name: "sinc128-quadratic",
            sinc_len: 128,
            oversampling: 128,
            interpolation: SincInterpolationType::Quadratic,
            window: WindowFunction::Blackman2,
        },
        Quality::High => Tier {
            name: "sinc256-cubic",
            sinc_len: 256,
            oversampling: 256,
            interpolation: SincInterpolationType::Cubic,
            window: WindowFunction::BlackmanHarris2,
        },
        Quality::VeryHigh => Tier {
            name: "sinc512-cubic",
            sinc_len: 512,
            oversampling: 512,
            interpolation: SincInterpolationType::Cubic,
            window: WindowFunction::BlackmanHarris2,
        },
    }
}

/// Pure Rust engine using rubato's asynchronous sinc interpolator.
pub struct RubatoEngine {
    kernel: SincFixedIn<f64>,
    datatype: Datatype,
    channels: usize,
    ratio: f64,
    /// Kernel block length in input frames.
    block: usize,
    /// Input not yet run through the kernel, per channel.
    pending: Vec<Vec<f64>>,
    /// Output not yet handed to the caller, per channel.
    ready: Vec<Vec<f64>>,
    scratch: Vec<Vec<f64>>,
    frames_in: u64,
    frames_out: u64,
    clips: usize,
    name: String,
}

impl RubatoEngine {
    /// Kernel block length in input frames.
    pub fn block_len(&self) -> usize {
        self.block
    }

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

    /// Total output frames for the input consumed so far.
    fn target(&self) -> u64 {
        (self.frames_in as f64 * self.ratio).round() as u64
    }

    fn owed(&self) -> u64 {
        self.target().saturating_sub(self.frames_out)
    }

    fn ready_len(&self) -> usize {
        self.ready.first().map_or(0, Vec::len)
    }

    /// Runs the kernel over one block of pending input starting at `start`.
    fn run_kernel(&mut self, start: usize) -> Result<(), Diagnostic> {
        let end = start + self.block;
        let input: Vec<&[f64]> = self.pending.iter().map(|ch| &ch[start..end]).collect();
        let (_, produced) = self
            .kernel
            .process_into_buffer(&input, &mut self.scratch, None)
            .map_err(|e| e.to_string())?;

        for (ready, out) in self.ready.iter_mut().zip(&self.scratch) {
            ready.extend_from_slice(&out[..produced]);
        }
        Ok(())
    }

    /// Runs every complete block of pending input.
    fn feed(&mut self) -> Result<(), Diagnostic> {
        let available = self.pending.first().map_or(0, Vec::len);
        let mut start = 0;
        while available - start >= self.block {
            self.run_kernel(start)?;
            start += self.block;
        }
        if start > 0 {
            for ch in &mut self.pending {
                ch.drain(..start);
            }
        }
        Ok(())
    }

    /// Pads with silence until every owed frame has been produced.
    fn flush(&mut self) -> Result<(), Diagnostic> {
        let target = self.target();
        let mut calls = 0;
        while self.frames_out + (self.ready_len() as u64) < target && calls < MAX_FLUSH_CALLS {
            for ch in &mut self.pending {
                ch.resize(self.block, 0.0);
            }
            self.run_kernel(0)?;
            for ch in &mut self.pending {
                ch.clear();
            }
            calls += 1;
        }
        for ch in &mut self.pending {
            ch.clear();
        }

        let owed = self.owed() as usize;
        for ch in &mut self.ready {
            ch.truncate(owed);
        }
        trace!("rubato: flushed after {} padded blocks, {} frames left", calls, owed);
        Ok(())
    }

    /// Frames that may be emitted into `capacity` frames of output.
    fn emit_len(&self, capacity: usize) -> usize {
        capacity.min(self.ready_len()).min(self.owed() as usize)
    }

    fn consume_ready(&mut self, frames: usize) {
        for ch in &mut self.ready {
            ch.drain(..frames);
        }
        self.frames_out += frames as u64;
    }
}

impl Engine for RubatoEngine {
    fn create(spec: &EngineSpec) -> Result<Self, Diagnostic> {
        let valid = |rate: f64| rate.is_finite() && rate > 0.0;
        if !valid(spec.in_rate) || !valid(spec.out_rate) {
            return Err(format!("invalid io_ratio: {} -> {}", spec.in_rate, spec.out_rate));
        }
        let ratio = spec.out_rate / spec.in_rate;
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(format!("invalid io_ratio: {ratio}"));
        }
        if spec.channels == 0 {
            return Err("invalid channel count: 0".to_string());
        }

        let tier = tier(spec.quality);
        let block = MIN_KERNEL_FRAMES.max(2 * tier.sinc_len + 2 * (1.0 / ratio).ceil() as usize);
        let params = SincInterpolationParameters {
            sinc_len: tier.sinc_len,
            f_cutoff: calculate_cutoff::<f32>(tier.sinc_len, tier.window),
            oversampling_factor: tier.oversampling,
            interpolation: tier.interpolation,
            window: tier.window,
        };
        let kernel = SincFixedIn::<f64>::new(ratio, 1.0, params, block, spec.channels)
            .map_err(|e| e.to_string())?;
        let scratch = kernel.output_buffer_allocate(true);

        debug!(
            "rubato: created {} engine, ratio={}, block={}, channels={}",
            tier.name, ratio, block, spec.channels
        );

        Ok(Self {
            kernel,
            datatype: spec.datatype,
            channels: spec.channels,
            ratio,
            block,
            pending: vec![Vec::with_capacity(block); spec.channels],
            ready: vec![Vec::new(); spec.channels],
            scratch,
            frames_in: 0,
            frames_out: 0,
            clips: 0,
            name: format!("rubato-{}", tier.name),
        })
    }

    fn process<T: Sample>(
        &mut self,
        input: Option<&[T]>,
        output: &mut [T],
    ) -> Result<usize, Diagnostic> {
        self.check_layout::<T>(false)?;
        let channels = self.channels;

        match input {
            Some(samples) => {
                if samples.len() % channels != 0 {
                    return Err(format!(
                        "{} samples is not a whole number of {}-channel frames",
                        samples.len(),
                        channels
                    ));
                }
                for frame in samples.chunks_exact(channels) {
                    for (pending, &sample) in self.pending.iter_mut().zip(frame) {
                        pending.push(sample.to_f64());
                    }
                }
                self.frames_in += (samples.len() / channels) as u64;
                self.feed()?;
            }
            None => self.flush()?,
        }

        let frames = self.emit_len(output.len() / channels);
        for (ch, ready) in self.ready.iter().enumerate() {
            for (i, &value) in ready[..frames].iter().enumerate() {
                let (sample, clipped) = T::from_f64(value);
                output[i * channels + ch] = sample;
                self.clips += usize::from(clipped);
            }
        }
        self.consume_ready(frames);
        Ok(frames)
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

        match input {
            Some(chans) => {
                if chans.len() != self.channels {
                    return Err(format!(
                        "expected {} input channels, got {}",
                        self.channels,
                        chans.len()
                    ));
                }
                let frames = chans.first().map_or(0, |ch| ch.len());
                if chans.iter().any(|ch| ch.len() != frames) {
                    return Err("input channels differ in length".to_string());
                }
                for (pending, samples) in self.pending.iter_mut().zip(chans) {
                    pending.extend(samples.iter().map(|s| s.to_f64()));
                }
                self.frames_in += frames as u64;
                self.feed()?;
            }
            None => self.flush()?,
        }

        let capacity = output.iter().map(|ch| ch.len()).min().unwrap_or(0);
        let frames = self.emit_len(capacity);
        for (out, ready) in output.iter_mut().zip(&self.ready) {
            for (dst, &value) in out[..frames].iter_mut().zip(&ready[..frames]) {
                let (sample, clipped) = T::from_f64(value);
                *dst = sample;
                self.clips += usize::from(clipped);
            }
        }
        self.consume_ready(frames);
        Ok(frames)
    }

    fn delay(&self) -> f64 {
        self.owed() as f64
    }

    fn clip_count(&self) -> usize {
        self.clips
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn reset(&mut self) -> Result<(), Diagnostic> {
        self.kernel.reset();
        for ch in self.pending.iter_mut().chain(self.ready.iter_mut()) {
            ch.clear();
        }
        self.frames_in = 0;
        self.frames_out = 0;
        self.clips = 0;
        Ok(())
    }
}
