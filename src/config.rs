//! Options accepted by the background, as the embedding page supplies them.
//!
//! Every field is optional in the JSON form; missing keys take the defaults
//! below and unknown keys are ignored. Values are not range-checked: a negative
//! spacing or an out-of-range probability just draws something odd.

use serde::Deserialize;

use crate::color::{ColorShift, Rgba};

/// Radius below which a dot is never drawn smaller.
pub const MIN_RADIUS: f64 = 0.1;

/// Multiple of the largest viewport dimension covered by the jitter table.
pub const JITTER_SAFE_MARGIN: f64 = 1.5;

/// Cells rendered past each viewport edge so partially visible dots still show.
pub const EDGE_CELLS: i32 = 2;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid background options: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WaveConfig {
    pub dot_color: Rgba,
    pub dot_size: f64,
    pub dot_spacing: f64,

    pub amplitude1: f64,
    pub frequency_x1: f64,
    pub frequency_y1: f64,
    pub speed1: f64,

    pub amplitude2: f64,
    pub frequency_x2: f64,
    pub frequency_y2: f64,
    pub speed2: f64,

    pub noise_amplitude: f64,
    pub noise_frequency: f64,
    pub noise_speed: f64,

    pub perspective_factor: f64,
    pub size_variation: f64,
    pub opacity_variation: f64,
    pub peak_color_shift: ColorShift,
    pub initial_randomness: f64,

    pub glow_intensity_threshold: f64,
    pub glow_probability: f64,
    pub glow_radius_multiplier: f64,
    pub glow_color: Rgba,
    pub glow_blur_radius: f64,

    /// Time counter increment per rendered frame.
    pub time_step: f64,
    /// Skip refreshes that arrive sooner than `1000 / max_fps` ms after the
    /// last rendered frame.
    pub max_fps: Option<f64>,
    /// Fixed seed for jitter, noise and glow trials.
    pub seed: Option<u64>,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            dot_color: Rgba::rgba(115, 115, 115, 0.5),
            dot_size: 1.0,
            dot_spacing: 30.0,

            amplitude1: 3.0,
            frequency_x1: 0.02,
            frequency_y1: 0.01,
            speed1: 0.015,

            amplitude2: 2.5,
            frequency_x2: 0.015,
            frequency_y2: 0.025,
            speed2: -0.018,

            noise_amplitude: 1.5,
            noise_frequency: 0.03,
            noise_speed: 0.008,

            perspective_factor: 0.15,
            size_variation: 0.4,
            opacity_variation: 0.3,
            peak_color_shift: ColorShift::default(),
            initial_randomness: 0.8,

            glow_intensity_threshold: 0.95,
            glow_probability: 0.03,
            glow_radius_multiplier: 4.0,
            glow_color: Rgba::rgba(255, 255, 255, 0.08),
            glow_blur_radius: 4.0,

            time_step: 1.0,
            max_fps: None,
            seed: None,
        }
    }
}

impl WaveConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Options as handed over by the embedding page. Missing options are the
    /// defaults; malformed ones are logged and replaced by the defaults.
    pub fn from_options(json: Option<&str>) -> Self {
        match json.map(str::trim).filter(|s| !s.is_empty()) {
            None => Self::default(),
            Some(json) => Self::from_json(json).unwrap_or_else(|e| {
                log::warn!("{e}; using default background options");
                Self::default()
            }),
        }
    }

    /// Largest displacement the wave and noise channels can sum to. Floored at
    /// `f64::EPSILON` so an all-zero configuration normalizes to a flat field.
    pub fn max_displacement(&self) -> f64 {
        (self.amplitude1 + self.amplitude2 + self.noise_amplitude).max(f64::EPSILON)
    }

    pub fn peak_color(&self) -> Rgba {
        self.dot_color.shifted(self.peak_color_shift)
    }

    /// Whether switching to `other` invalidates the jitter table.
    pub fn jitter_changed(&self, other: &Self) -> bool {
        self.dot_spacing != other.dot_spacing || self.initial_randomness != other.initial_randomness
    }
}
