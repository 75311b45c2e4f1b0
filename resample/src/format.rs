//! Sample formats and the engine datatype identifiers they resolve to.

use std::any::TypeId;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Numeric element type of a PCM buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    /// 32-bit float.
    #[default]
    #[serde(alias = "f32")]
    Float32,
    /// 64-bit float.
    #[serde(alias = "f64")]
    Float64,
    /// 32-bit signed integer.
    #[serde(alias = "i32")]
    Int32,
    /// 16-bit signed integer.
    #[serde(alias = "i16")]
    Int16,
}

impl SampleFormat {
    /// Resolves a concrete element type to its format.
    ///
    /// Fails with [`Error::UnsupportedFormat`] for anything other than
    /// `f32`, `f64`, `i32` or `i16`.
    pub fn of<T: 'static>() -> Result<Self> {
        let id = TypeId::of::<T>();
        if id == TypeId::of::<f32>() {
            Ok(SampleFormat::Float32)
        } else if id == TypeId::of::<f64>() {
            Ok(SampleFormat::Float64)
        } else if id == TypeId::of::<i32>() {
            Ok(SampleFormat::Int32)
        } else if id == TypeId::of::<i16>() {
            Ok(SampleFormat::Int16)
        } else {
            Err(Error::UnsupportedFormat(std::any::type_name::<T>().to_string()))
        }
    }

    /// Returns the engine identifier for interleaved buffers of this format.
    pub const fn interleaved(self) -> Datatype {
        match self {
            SampleFormat::Float32 => Datatype::Float32I,
            SampleFormat::Float64 => Datatype::Float64I,
            SampleFormat::Int32 => Datatype::Int32I,
            SampleFormat::Int16 => Datatype::Int16I,
        }
    }

    /// Returns the engine identifier for planar (split) buffers of this format.
    pub const fn planar(self) -> Datatype {
        match self {
            SampleFormat::Float32 => Datatype::Float32S,
            SampleFormat::Float64 => Datatype::Float64S,
            SampleFormat::Int32 => Datatype::Int32S,
            SampleFormat::Int16 => Datatype::Int16S,
        }
    }

    /// Returns the lowercase name, e.g. `"float32"`.
    pub const fn name(self) -> &'static str {
        match self {
            SampleFormat::Float32 => "float32",
            SampleFormat::Float64 => "float64",
            SampleFormat::Int32 => "int32",
            SampleFormat::Int16 => "int16",
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SampleFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "float32" | "f32" => Ok(SampleFormat::Float32),
            "float64" | "f64" => Ok(SampleFormat::Float64),
            "int32" | "i32" => Ok(SampleFormat::Int32),
            "int16" | "i16" => Ok(SampleFormat::Int16),
            _ => Err(Error::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Engine datatype identifier.
///
/// The discriminants match libsoxr's `soxr_datatype_t`: the `I` variants are
/// interleaved, the `S` variants split (planar).
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Datatype {
    Float32I = 0,
    Float64I = 1,
    Int32I = 2,
    Int16I = 3,
    Float32S = 4,
    Float64S = 5,
    Int32S = 6,
    Int16S = 7,
}

impl Datatype {
    /// Returns the element format.
    pub const fn format(self) -> SampleFormat {
        match self {
            Datatype::Float32I | Datatype::Float32S => SampleFormat::Float32,
            Datatype::Float64I | Datatype::Float64S => SampleFormat::Float64,
            Datatype::Int32I | Datatype::Int32S => SampleFormat::Int32,
            Datatype::Int16I | Datatype::Int16S => SampleFormat::Int16,
        }
    }

    /// Returns true for the split (per-channel) variants.
    pub const fn is_planar(self) -> bool {
        (self as u32) >= 4
    }
}

/// Resolves `T` to the interleaved engine datatype.
pub fn resolve<T: 'static>() -> Result<Datatype> {
    SampleFormat::of::<T>().map(SampleFormat::interleaved)
}

/// Resolves `T` to the planar engine datatype.
pub fn resolve_planar<T: 'static>() -> Result<Datatype> {
    SampleFormat::of::<T>().map(SampleFormat::planar)
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
    impl Sealed for i32 {}
    impl Sealed for i16 {}
}

/// A sample type the engines can process.
///
/// Implemented for exactly the four supported element types. Conversions go
/// through `f64` in the range `[-1.0, 1.0)` for integers.
pub trait Sample: Copy + Default + PartialEq + fmt::Debug + Send + Sync + 'static + sealed::Sealed {
    /// Format of this element type.
    const FORMAT: SampleFormat;

    /// Converts to `f64`, scaling integers to `[-1.0, 1.0)`.
    fn to_f64(self) -> f64;

    /// Converts from `f64`. The flag is true when the value saturated.
    fn from_f64(value: f64) -> (Self, bool);
}

impl Sample for f32 {
    const FORMAT: SampleFormat = SampleFormat::Float32;

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(value: f64) -> (Self, bool) {
        (value as f32, false)
    }
}

impl Sample for f64 {
    const FORMAT: SampleFormat = SampleFormat::Float64;

    fn to_f64(self) -> f64 {
        self
    }

    fn from_f64(value: f64) -> (Self, bool) {
        (value, false)
    }
}

impl Sample for i32 {
    const FORMAT: SampleFormat = SampleFormat::Int32;

    fn to_f64(self) -> f64 {
        self as f64 / 2_147_483_648.0
    }

    fn from_f64(value: f64) -> (Self, bool) {
        let scaled = (value * 2_147_483_648.0).round();
        if scaled > i32::MAX as f64 {
            (i32::MAX, true)
        } else if scaled < i32::MIN as f64 {
            (i32::MIN, true)
        } else {
            (scaled as i32, false)
        }
    }
}

impl Sample for i16 {
    const FORMAT: SampleFormat = SampleFormat::Int16;

    fn to_f64(self) -> f64 {
        self as f64 / 32_768.0
    }

    fn from_f64(value: f64) -> (Self, bool) {
        let scaled = (value * 32_768.0).round();
        if scaled > i16::MAX as f64 {
            (i16::MAX, true)
        } else if scaled < i16::MIN as f64 {
            (i16::MIN, true)
        } else {
            (scaled as i16, false)
        }
    }
}
