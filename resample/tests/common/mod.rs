//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::cell::Cell;

use giztoy_resample::engine::{Diagnostic, Engine, EngineSpec};
use giztoy_resample::{RubatoEngine, Sample};

/// Interleaved sine at `freq` Hz, same signal on every channel.
pub fn sine(freq: f64, rate: f64, frames: usize, channels: usize, amplitude: f64) -> Vec<f32> {
    let mut out = Vec::with_capacity(frames * channels);
    for i in 0..frames {
        let v = (2.0 * std::f64::consts::PI * freq * i as f64 / rate).sin() * amplitude;
        for _ in 0..channels {
            out.push(v as f32);
        }
    }
    out
}

/// Interleaved test signal with a different tone per channel.
pub fn tones<T: Sample>(rate: f64, frames: usize, channels: usize) -> Vec<T> {
    let mut out = Vec::with_capacity(frames * channels);
    for i in 0..frames {
        for ch in 0..channels {
            let freq = 220.0 * (ch + 1) as f64;
            let v = (2.0 * std::f64::consts::PI * freq * i as f64 / rate).sin() * 0.5;
            out.push(T::from_f64(v).0);
        }
    }
    out
}

/// Splits interleaved samples into one vector per channel.
pub fn deinterleave<T: Copy>(data: &[T], channels: usize) -> Vec<Vec<T>> {
    (0..channels)
        .map(|ch| data.iter().skip(ch).step_by(channels).copied().collect())
        .collect()
}

thread_local! {
    static CREATED: Cell<usize> = const { Cell::new(0) };
    static DROPPED: Cell<usize> = const { Cell::new(0) };
}

/// Engines of [`CountingEngine`] created on this thread.
pub fn created() -> usize {
    CREATED.with(Cell::get)
}

/// Engines of [`CountingEngine`] dropped on this thread.
pub fn dropped() -> usize {
    DROPPED.with(Cell::get)
}

/// Rubato engine that counts creation attempts and drops.
pub struct CountingEngine(RubatoEngine);

impl Drop for CountingEngine {
    fn drop(&mut self) {
        DROPPED.with(|c| c.set(c.get() + 1));
    }
}

impl Engine for CountingEngine {
    fn create(spec: &EngineSpec) -> Result<Self, Diagnostic> {
        CREATED.with(|c| c.set(c.get() + 1));
        match RubatoEngine::create(spec) {
            Ok(inner) => Ok(Self(inner)),
            Err(err) => {
                // Nothing to drop, keep the counters balanced.
                DROPPED.with(|c| c.set(c.get() + 1));
                Err(err)
            }
        }
    }

    fn process<T: Sample>(
        &mut self,
        input: Option<&[T]>,
        output: &mut [T],
    ) -> Result<usize, Diagnostic> {
        self.0.process(input, output)
    }

    fn process_planar<T: Sample>(
        &mut self,
        input: Option<&[&[T]]>,
        output: &mut [&mut [T]],
    ) -> Result<usize, Diagnostic> {
        self.0.process_planar(input, output)
    }

    fn delay(&self) -> f64 {
        self.0.delay()
    }

    fn clip_count(&self) -> usize {
        self.0.clip_count()
    }

    fn name(&self) -> &str {
        self.0.name()
    }

    fn reset(&mut self) -> Result<(), Diagnostic> {
        self.0.reset()
    }
}

/// Engine whose every processing and reset call fails.
pub struct FailingEngine;

impl Engine for FailingEngine {
    fn create(_spec: &EngineSpec) -> Result<Self, Diagnostic> {
        Ok(Self)
    }

    fn process<T: Sample>(
        &mut self,
        _input: Option<&[T]>,
        _output: &mut [T],
    ) -> Result<usize, Diagnostic> {
        Err("scripted process failure".to_string())
    }

    fn process_planar<T: Sample>(
        &mut self,
        _input: Option<&[&[T]]>,
        _output: &mut [&mut [T]],
    ) -> Result<usize, Diagnostic> {
        Err("scripted process failure".to_string())
    }

    fn delay(&self) -> f64 {
        0.0
    }

    fn clip_count(&self) -> usize {
        0
    }

    fn name(&self) -> &str {
        "failing"
    }

    fn reset(&mut self) -> Result<(), Diagnostic> {
        Err("scripted reset failure".to_string())
    }
}

/// Engine that passes input through unchanged but fails to drain.
/// Only valid for configurations with `out_rate >= in_rate`.
pub struct DrainFailEngine {
    channels: usize,
}

impl Engine for DrainFailEngine {
    fn create(spec: &EngineSpec) -> Result<Self, Diagnostic> {
        Ok(Self { channels: spec.channels })
    }

    fn process<T: Sample>(
        &mut self,
        input: Option<&[T]>,
        output: &mut [T],
    ) -> Result<usize, Diagnostic> {
        match input {
            Some(samples) => {
                output[..samples.len()].copy_from_slice(samples);
                Ok(samples.len() / self.channels)
            }
            None => Err("scripted drain failure".to_string()),
        }
    }

    fn process_planar<T: Sample>(
        &mut self,
        input: Option<&[&[T]]>,
        output: &mut [&mut [T]],
    ) -> Result<usize, Diagnostic> {
        match input {
            Some(chans) => {
                for (out, ch) in output.iter_mut().zip(chans) {
                    out[..ch.len()].copy_from_slice(ch);
                }
                Ok(chans.first().map_or(0, |ch| ch.len()))
            }
            None => Err("scripted drain failure".to_string()),
        }
    }

    fn delay(&self) -> f64 {
        0.0
    }

    fn clip_count(&self) -> usize {
        0
    }

    fn name(&self) -> &str {
        "drain-fail"
    }

    fn reset(&mut self) -> Result<(), Diagnostic> {
        Ok(())
    }
}
