//! Chunking policy and output sizing.
//!
//! Engines get slower per frame as a single call grows, so every converter
//! feeds input in slices of at most [`chunk_len`] frames. Output buffers are
//! sized once, up front, from an upper bound on what the engine can emit.

/// Smallest slice handed to the engine in one call, in input frames.
pub const MIN_CHUNK_FRAMES: usize = 1000;

/// Output frames per slice the chunk length aims for (about one second).
pub const TARGET_OUTPUT_FRAMES: f64 = 48_000.0;

/// Returns the slice length in input frames: about one second of output
/// worth of input, but never less than [`MIN_CHUNK_FRAMES`].
pub fn chunk_len(in_rate: f64, out_rate: f64) -> usize {
    let len = TARGET_OUTPUT_FRAMES * in_rate / out_rate;
    if len.is_finite() && len > MIN_CHUNK_FRAMES as f64 {
        len as usize
    } else {
        MIN_CHUNK_FRAMES
    }
}

/// Upper bound on output frames for `frames_in` new input frames when the
/// engine already holds `delay` output frames.
pub fn output_capacity(delay: f64, frames_in: usize, ratio: f64) -> usize {
    let bound = (delay.max(0.0) + frames_in as f64 * ratio).ceil();
    if bound.is_finite() { bound as usize + 1 } else { 1 }
}

/// Output frames to allocate for converting `frames_in` frames in one call,
/// `ceil(frames_in * out_rate / in_rate) + 1`.
pub fn batch_capacity(frames_in: usize, in_rate: f64, out_rate: f64) -> usize {
    let bound = (frames_in as f64 * out_rate / in_rate).ceil();
    if bound.is_finite() && bound >= 0.0 { bound as usize + 1 } else { 1 }
}

/// Splits `frames` into consecutive `(start, len)` slices of at most `chunk`.
pub fn slices(frames: usize, chunk: usize) -> impl Iterator<Item = (usize, usize)> {
    let chunk = chunk.max(1);
    (0..frames)
        .step_by(chunk)
        .map(move |start| (start, chunk.min(frames - start)))
}
