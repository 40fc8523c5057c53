use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseColorError {
    #[error("expected rgb(r, g, b) or rgba(r, g, b, a), got \"{0}\"")]
    Syntax(String),

    #[error("invalid {channel} channel \"{value}\"")]
    Channel { channel: &'static str, value: String },
}

/// 8-bit RGB with a straight (non-premultiplied) alpha in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

/// Signed per-channel delta applied to a base color to get its peak color.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ColorShift {
    pub r: i32,
    pub g: i32,
    pub b: i32,
}

impl Default for ColorShift {
    fn default() -> Self {
        Self { r: 20, g: 20, b: 30 }
    }
}

impl Rgba {
    pub const BLACK: Self = Self::rgba(0, 0, 0, 1.0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parses `rgb(..)`/`rgba(..)`; anything unparseable becomes opaque black.
    pub fn parse_or_black(s: &str) -> Self {
        match s.parse() {
            Ok(c) => c,
            Err(e) => {
                log::warn!("{e}; using opaque black");
                Self::BLACK
            }
        }
    }

    /// Adds `shift` to each color channel, saturating at `[0, 255]`. Alpha is kept.
    pub fn shifted(self, shift: ColorShift) -> Self {
        fn add(c: u8, d: i32) -> u8 {
            (i32::from(c) + d).clamp(0, 255) as u8
        }
        Self {
            r: add(self.r, shift.r),
            g: add(self.g, shift.g),
            b: add(self.b, shift.b),
            a: self.a,
        }
    }

    /// Per-channel linear interpolation of the color channels, rounded to the
    /// nearest integer. The alpha of the result is `alpha`.
    pub fn mix(self, other: Self, t: f64, alpha: f64) -> Self {
        fn ch(a: u8, b: u8, t: f64) -> u8 {
            lerp(f64::from(a), f64::from(b), t).round().clamp(0.0, 255.0) as u8
        }
        Self {
            r: ch(self.r, other.r, t),
            g: ch(self.g, other.g, t),
            b: ch(self.b, other.b, t),
            a: alpha,
        }
    }
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

impl FromStr for Rgba {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let syntax = || ParseColorError::Syntax(s.to_owned());

        let t = s.trim();
        let body = t
            .strip_prefix("rgba(")
            .or_else(|| t.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(syntax)?;

        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        if parts.len() != 3 && parts.len() != 4 {
            return Err(syntax());
        }

        fn channel(name: &'static str, v: &str) -> Result<u8, ParseColorError> {
            let err = || ParseColorError::Channel {
                channel: name,
                value: v.to_owned(),
            };
            if v.is_empty() || !v.bytes().all(|b| b.is_ascii_digit()) {
                return Err(err());
            }
            let n: u32 = v.parse().map_err(|_| err())?;
            Ok(n.min(255) as u8)
        }

        let r = channel("red", parts[0])?;
        let g = channel("green", parts[1])?;
        let b = channel("blue", parts[2])?;
        let a = match parts.get(3) {
            Some(v) => {
                let a: f64 = v.parse().map_err(|_| ParseColorError::Channel {
                    channel: "alpha",
                    value: (*v).to_owned(),
                })?;
                if !a.is_finite() || a < 0.0 {
                    return Err(ParseColorError::Channel {
                        channel: "alpha",
                        value: (*v).to_owned(),
                    });
                }
                a.min(1.0)
            }
            None => 1.0,
        };

        Ok(Self::rgba(r, g, b, a))
    }
}

/// CSS functional notation, suitable for canvas fill styles.
impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse_or_black(&s))
    }
}
