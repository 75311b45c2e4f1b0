//! Quality tiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Quality preset, ordered from lowest effort to highest fidelity.
///
/// How a tier maps onto filter parameters is up to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Quality {
    /// Quick cubic interpolation.
    #[serde(rename = "QQ", alias = "qq")]
    Quick,
    /// Low quality.
    #[serde(rename = "LQ", alias = "lq")]
    Low,
    /// Medium quality.
    #[serde(rename = "MQ", alias = "mq")]
    Medium,
    /// High quality.
    #[default]
    #[serde(rename = "HQ", alias = "hq")]
    High,
    /// Very high quality.
    #[serde(rename = "VHQ", alias = "vhq")]
    VeryHigh,
}

impl Quality {
    /// All tiers, low to high.
    pub const ALL: [Quality; 5] = [
        Quality::Quick,
        Quality::Low,
        Quality::Medium,
        Quality::High,
        Quality::VeryHigh,
    ];

    /// Returns the short name, e.g. `"HQ"`.
    pub const fn name(self) -> &'static str {
        match self {
            Quality::Quick => "QQ",
            Quality::Low => "LQ",
            Quality::Medium => "MQ",
            Quality::High => "HQ",
            Quality::VeryHigh => "VHQ",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Quality {
    type Err = Error;

    /// Accepts `qq`, `lq`, `mq`, `hq`, `vhq` in any case, optionally
    /// prefixed with `soxr_`.
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_ascii_lowercase();
        let name = lower.strip_prefix("soxr_").unwrap_or(&lower);
        match name {
            "qq" => Ok(Quality::Quick),
            "lq" => Ok(Quality::Low),
            "mq" => Ok(Quality::Medium),
            "hq" => Ok(Quality::High),
            "vhq" => Ok(Quality::VeryHigh),
            _ => Err(Error::InvalidQuality(s.to_string())),
        }
    }
}
