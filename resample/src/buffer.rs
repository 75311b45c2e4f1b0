//! Input views and output buffers.
//!
//! Input is borrowed: [`Frames`] for interleaved (frame-major) data and
//! [`Strided`] for arbitrary frame/channel strides, of which only the
//! frame-contiguous (planar) case is accepted by the planar converter.
//!
//! Output is owned: converters allocate a buffer sized for the worst case,
//! let the engine fill it, and hand it over as [`InterleavedBuf`] or
//! [`PlanarBuf`]. The buffer is never copied to trim it; unused capacity
//! is released together with the buffer when the caller drops it.

use std::ops::Deref;

use crate::error::{Error, Result};

/// Borrowed interleaved buffer of `frames × channels` samples.
#[derive(Debug, Clone, Copy)]
pub struct Frames<'a, T> {
    data: &'a [T],
    channels: usize,
}

impl<'a, T> Frames<'a, T> {
    /// Wraps interleaved samples. `data.len()` must be a multiple of `channels`.
    pub fn new(data: &'a [T], channels: usize) -> Result<Self> {
        if channels == 0 {
            return Err(Error::InvalidShape("zero channels".to_string()));
        }
        if data.len() % channels != 0 {
            return Err(Error::InvalidShape(format!(
                "{} samples is not a whole number of {}-channel frames",
                data.len(),
                channels
            )));
        }
        Ok(Self { data, channels })
    }

    /// Wraps a single-channel signal.
    pub fn mono(data: &'a [T]) -> Self {
        Self { data, channels: 1 }
    }

    /// Number of frames.
    pub fn frames(&self) -> usize {
        self.data.len() / self.channels
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns true if there are no frames.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The interleaved samples.
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Returns `len` frames starting at frame `start`.
    pub(crate) fn slice(&self, start: usize, len: usize) -> &'a [T] {
        &self.data[start * self.channels..(start + len) * self.channels]
    }
}

/// Borrowed buffer with explicit strides, in samples.
///
/// Sample `(frame, channel)` lives at
/// `data[frame * frame_stride + channel * channel_stride]`.
#[derive(Debug, Clone, Copy)]
pub struct Strided<'a, T> {
    data: &'a [T],
    frames: usize,
    channels: usize,
    frame_stride: usize,
    channel_stride: usize,
}

impl<'a, T> Strided<'a, T> {
    /// Wraps `data` with the given shape and strides.
    ///
    /// Fails with [`Error::InvalidShape`] if any addressed sample lies
    /// outside `data`.
    pub fn new(
        data: &'a [T],
        frames: usize,
        channels: usize,
        frame_stride: usize,
        channel_stride: usize,
    ) -> Result<Self> {
        if channels == 0 {
            return Err(Error::InvalidShape("zero channels".to_string()));
        }
        if frames > 0 {
            let span = (channels - 1).checked_mul(channel_stride);
            let last = (frames - 1)
                .checked_mul(frame_stride)
                .and_then(|f| span.and_then(|c| f.checked_add(c)));
            match last {
                Some(last) if last < data.len() => {}
                _ => {
                    return Err(Error::InvalidShape(format!(
                        "{frames}x{channels} view, strides ({frame_stride}, {channel_stride}), \
                         exceeds {} samples",
                        data.len()
                    )));
                }
            }
        }
        Ok(Self {
            data,
            frames,
            channels,
            frame_stride,
            channel_stride,
        })
    }

    /// Wraps channel-major samples: all frames of channel 0, then channel 1, ...
    pub fn planar(data: &'a [T], channels: usize) -> Result<Self> {
        if channels == 0 || data.len() % channels != 0 {
            return Err(Error::InvalidShape(format!(
                "{} samples cannot be split into {} channels",
                data.len(),
                channels
            )));
        }
        let frames = data.len() / channels;
        Self::new(data, frames, channels, 1, frames)
    }

    /// Number of frames.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Distance between consecutive frames of one channel.
    pub fn frame_stride(&self) -> usize {
        self.frame_stride
    }

    /// Distance between the same frame of consecutive channels.
    pub fn channel_stride(&self) -> usize {
        self.channel_stride
    }

    /// Returns true if each channel is contiguous along the frame axis.
    pub fn is_frame_contiguous(&self) -> bool {
        self.frame_stride == 1
    }

    /// Returns the samples of channel `ch`. Only valid for frame-contiguous views.
    pub(crate) fn channel(&self, ch: usize) -> &'a [T] {
        debug_assert!(self.is_frame_contiguous());
        if self.frames == 0 {
            return &[];
        }
        let start = ch * self.channel_stride;
        &self.data[start..start + self.frames]
    }
}

impl<'a, T> From<Frames<'a, T>> for Strided<'a, T> {
    fn from(frames: Frames<'a, T>) -> Self {
        Self {
            data: frames.data,
            frames: frames.frames(),
            channels: frames.channels,
            frame_stride: frames.channels,
            channel_stride: 1,
        }
    }
}

/// Owned interleaved output.
///
/// Holds exactly the produced frames. Dropping it frees the allocation,
/// including any capacity reserved for the worst case but not used.
#[derive(Debug, Clone, PartialEq)]
pub struct InterleavedBuf<T> {
    data: Vec<T>,
    channels: usize,
}

impl<T> InterleavedBuf<T> {
    /// Takes ownership of a filled allocation, keeping the first `frames` frames.
    pub(crate) fn from_filled(mut data: Vec<T>, frames: usize, channels: usize) -> Self {
        data.truncate(frames * channels);
        Self { data, channels }
    }

    /// Number of frames.
    pub fn frames(&self) -> usize {
        self.data.len() / self.channels
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns true if no frames were produced.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The interleaved samples.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Returns the samples of frame `index`.
    pub fn frame(&self, index: usize) -> Option<&[T]> {
        let start = index.checked_mul(self.channels)?;
        self.data.get(start..start + self.channels)
    }

    /// Capacity of the underlying allocation, in frames.
    pub fn capacity_frames(&self) -> usize {
        self.data.capacity() / self.channels
    }

    /// Hands over the allocation without copying.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

impl<T> Deref for InterleavedBuf<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.data
    }
}

impl<T> AsRef<[T]> for InterleavedBuf<T> {
    fn as_ref(&self) -> &[T] {
        &self.data
    }
}

/// Owned planar output.
///
/// Channel `c` starts at `c * stride`; only the first [`frames`](Self::frames)
/// samples of each channel are valid. The stride is the capacity reserved
/// per channel, not the number of frames produced.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarBuf<T> {
    data: Vec<T>,
    frames: usize,
    channels: usize,
    stride: usize,
}

impl<T> PlanarBuf<T> {
    pub(crate) fn from_filled(data: Vec<T>, frames: usize, channels: usize, stride: usize) -> Self {
        debug_assert!(frames <= stride && data.len() == stride * channels);
        Self {
            data,
            frames,
            channels,
            stride,
        }
    }

    /// Number of valid frames per channel.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Distance between channel starts, in samples.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns true if no frames were produced.
    pub fn is_empty(&self) -> bool {
        self.frames == 0
    }

    /// Returns the valid samples of channel `ch`.
    ///
    /// # Panics
    ///
    /// Panics if `ch >= self.channels()`.
    pub fn channel(&self, ch: usize) -> &[T] {
        assert!(ch < self.channels, "channel {ch} out of range");
        let start = ch * self.stride;
        &self.data[start..start + self.frames]
    }

    /// Iterates over the valid samples of each channel.
    pub fn iter_channels(&self) -> impl Iterator<Item = &[T]> {
        (0..self.channels).map(move |ch| self.channel(ch))
    }

    /// The full strided storage, including unused tail capacity.
    pub fn as_raw(&self) -> &[T] {
        &self.data
    }

    /// Hands over the strided storage without copying.
    pub fn into_raw(self) -> Vec<T> {
        self.data
    }
}

impl<T: Copy> PlanarBuf<T> {
    /// Transposes the valid frames into an interleaved buffer.
    pub fn to_interleaved(&self) -> InterleavedBuf<T> {
        let mut data = Vec::with_capacity(self.frames * self.channels);
        for frame in 0..self.frames {
            for ch in 0..self.channels {
                data.push(self.data[ch * self.stride + frame]);
            }
        }
        InterleavedBuf {
            data,
            channels: self.channels,
        }
    }
}
