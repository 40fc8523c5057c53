//! Per-cell wave field: two sine channels plus 3D coherent noise, folded into
//! a single effect intensity that drives dot size, opacity and color.

use std::ops::Range;

use noise::{NoiseFn, OpenSimplex};
use rand::Rng;

use crate::color::{lerp, Rgba};
use crate::config::{WaveConfig, EDGE_CELLS, MIN_RADIUS};
use crate::jitter::{JitterTable, Offset};

/// One dot as it will be painted this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DotSample {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: Rgba,
    pub intensity: f64,
}

/// Enlarged blurred mark painted under a high-intensity dot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlowMark {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

/// Cell index ranges that cover a viewport, and the offset that centers the
/// grid inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    pub cols: Range<i32>,
    pub rows: Range<i32>,
    pub origin: Offset,
    pub spacing: f64,
}

impl GridLayout {
    pub fn for_viewport(width: f64, height: f64, spacing: f64) -> Self {
        if !(spacing > 0.0 && spacing.is_finite()) || !(width >= 0.0) || !(height >= 0.0) {
            return Self {
                cols: 0..0,
                rows: 0..0,
                origin: Offset::ZERO,
                spacing,
            };
        }

        let cols = (width / spacing).ceil() as i32 + 2 * EDGE_CELLS;
        let rows = (height / spacing).ceil() as i32 + 2 * EDGE_CELLS;
        let origin = Offset {
            x: (width - f64::from(cols - EDGE_CELLS) * spacing) / 2.0,
            y: (height - f64::from(rows - EDGE_CELLS) * spacing) / 2.0,
        };

        Self {
            cols: -EDGE_CELLS..cols - EDGE_CELLS,
            rows: -EDGE_CELLS..rows - EDGE_CELLS,
            origin,
            spacing,
        }
    }

    pub fn cell_count(&self) -> usize {
        self.cols.len() * self.rows.len()
    }

    /// Undisplaced position of cell `(i, j)`, jitter included.
    pub fn base_position(&self, i: i32, j: i32, jitter: &JitterTable) -> (f64, f64) {
        let o = jitter.get(i, j);
        (
            f64::from(i) * self.spacing + self.origin.x + o.x,
            f64::from(j) * self.spacing + self.origin.y + o.y,
        )
    }
}

/// Maps a displacement onto `[0, 1]`, with zero displacement at `0.5`.
pub fn effect_intensity(displacement: f64, max_displacement: f64) -> f64 {
    ((displacement + max_displacement) / (2.0 * max_displacement)).clamp(0.0, 1.0)
}

/// `1.0` at the top of the viewport, `1 - factor` at the bottom.
pub fn perspective_scale(y: f64, viewport_height: f64, factor: f64) -> f64 {
    if viewport_height > 0.0 {
        lerp(1.0, 1.0 - factor, y / viewport_height)
    } else {
        1.0
    }
}

pub struct FieldEvaluator<N = OpenSimplex> {
    config: WaveConfig,
    noise: N,
    peak: Rgba,
    max_displacement: f64,
    min_opacity: f64,
}

impl FieldEvaluator<OpenSimplex> {
    pub fn new(config: &WaveConfig, noise_seed: u32) -> Self {
        Self::with_noise(config, OpenSimplex::new(noise_seed))
    }
}

impl<N: NoiseFn<f64, 3>> FieldEvaluator<N> {
    pub fn with_noise(config: &WaveConfig, noise: N) -> Self {
        Self {
            config: config.clone(),
            noise,
            peak: config.peak_color(),
            max_displacement: config.max_displacement(),
            min_opacity: (config.dot_color.a - config.opacity_variation).max(0.0),
        }
    }

    /// Replaces the parameters while keeping the noise permutation.
    pub fn reconfigure(&mut self, config: &WaveConfig) {
        self.config = config.clone();
        self.peak = config.peak_color();
        self.max_displacement = config.max_displacement();
        self.min_opacity = (config.dot_color.a - config.opacity_variation).max(0.0);
    }

    pub fn max_displacement(&self) -> f64 {
        self.max_displacement
    }

    pub fn peak_color(&self) -> Rgba {
        self.peak
    }

    /// Vertical displacement at `(x, y)` for time `t`.
    pub fn displacement(&self, x: f64, y: f64, t: f64) -> f64 {
        let c = &self.config;
        let wave1 = (x * c.frequency_x1 + y * c.frequency_y1 + t * c.speed1).sin() * c.amplitude1;
        let wave2 = (x * c.frequency_x2 + y * c.frequency_y2 + t * c.speed2).sin() * c.amplitude2;
        let n = self.noise.get([
            x * c.noise_frequency,
            y * c.noise_frequency,
            t * c.noise_speed,
        ]);
        wave1 + wave2 + n * c.noise_amplitude
    }

    /// Evaluates the dot whose undisplaced position is `(x, y)`.
    pub fn sample(&self, x: f64, y: f64, t: f64, viewport_height: f64) -> DotSample {
        let displacement = self.displacement(x, y, t);
        self.shade(x, y, displacement, viewport_height)
    }

    /// Everything downstream of the displacement: intensity, size, opacity and
    /// color. Only `y` is displaced.
    pub fn shade(&self, x: f64, y: f64, displacement: f64, viewport_height: f64) -> DotSample {
        let c = &self.config;
        let intensity = effect_intensity(displacement, self.max_displacement);
        let scale = perspective_scale(y, viewport_height, c.perspective_factor);

        let size = c.dot_size + c.dot_size * c.size_variation * intensity;
        let radius = (size * scale).max(MIN_RADIUS);
        let opacity = lerp(self.min_opacity, c.dot_color.a, intensity);

        DotSample {
            x,
            y: y + displacement,
            radius,
            color: c.dot_color.mix(self.peak, intensity, opacity),
            intensity,
        }
    }

    /// Independent glow trial for `dot`. Draws from `rng` only when the dot is
    /// above the intensity threshold.
    pub fn glow<R: Rng + ?Sized>(&self, dot: &DotSample, rng: &mut R) -> Option<GlowMark> {
        let c = &self.config;
        if dot.intensity > c.glow_intensity_threshold && rng.gen::<f64>() < c.glow_probability {
            Some(GlowMark {
                x: dot.x,
                y: dot.y,
                radius: dot.radius * c.glow_radius_multiplier,
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use noise::Constant;
    use rand::rngs::mock::StepRng;

    fn flat(config: &WaveConfig, value: f64) -> FieldEvaluator<Constant> {
        FieldEvaluator::with_noise(config, Constant::new(value))
    }

    #[test]
    fn zero_displacement_is_half_intensity() {
        assert_eq!(effect_intensity(0.0, 7.0), 0.5);
        assert_eq!(effect_intensity(7.0, 7.0), 1.0);
        assert_eq!(effect_intensity(-7.0, 7.0), 0.0);
        assert_eq!(effect_intensity(100.0, 7.0), 1.0);
        assert_eq!(effect_intensity(0.0, f64::EPSILON), 0.5);
    }

    #[test]
    fn perspective_spans_top_to_bottom() {
        assert_eq!(perspective_scale(0.0, 600.0, 0.15), 1.0);
        assert!((perspective_scale(600.0, 600.0, 0.15) - 0.85).abs() < 1e-12);
        assert_eq!(perspective_scale(300.0, 0.0, 0.15), 1.0);
    }

    #[test]
    fn shade_at_extremes() {
        let cfg = WaveConfig::default();
        let eval = flat(&cfg, 0.0);

        let low = eval.shade(10.0, 0.0, -7.0, 600.0);
        assert_eq!(low.color, Rgba::rgba(115, 115, 115, 0.2));
        assert_eq!(low.radius, 1.0);
        assert_eq!(low.y, -7.0);

        let high = eval.shade(10.0, 0.0, 7.0, 600.0);
        assert_eq!(high.color, Rgba::rgba(135, 135, 145, 0.5));
        assert!((high.radius - 1.4).abs() < 1e-12);
        assert_eq!(high.x, 10.0);
    }

    #[test]
    fn radius_never_below_floor() {
        let cfg = WaveConfig {
            dot_size: 0.0,
            perspective_factor: 3.0,
            ..WaveConfig::default()
        };
        let eval = flat(&cfg, 0.0);
        for y in [0.0, 300.0, 600.0, 1200.0] {
            assert_eq!(eval.shade(0.0, y, 0.0, 600.0).radius, MIN_RADIUS);
        }
    }

    #[test]
    fn noise_extremes_stay_in_range() {
        let cfg = WaveConfig::default();
        for n in [-1.0, 1.0] {
            let eval = flat(&cfg, n);
            for t in 0..50 {
                let d = eval.sample(f64::from(t) * 13.0, 40.0, f64::from(t), 600.0);
                assert!((0.0..=1.0).contains(&d.intensity));
            }
        }
    }

    #[test]
    fn glow_needs_threshold() {
        let cfg = WaveConfig {
            glow_probability: 1.0,
            glow_intensity_threshold: 0.75,
            ..WaveConfig::default()
        };
        let eval = flat(&cfg, 0.0);
        let mut rng = StepRng::new(0, 0);

        let dim = eval.shade(0.0, 0.0, 0.0, 600.0);
        assert_eq!(eval.glow(&dim, &mut rng), None);

        let bright = eval.shade(0.0, 0.0, 7.0, 600.0);
        let glow = eval.glow(&bright, &mut rng).unwrap();
        assert_eq!(glow.radius, bright.radius * 4.0);
        assert_eq!((glow.x, glow.y), (bright.x, bright.y));
    }

    #[test]
    fn grid_is_centered() {
        let g = GridLayout::for_viewport(600.0, 300.0, 30.0);
        assert_eq!(g.cols, -2..22);
        assert_eq!(g.rows, -2..12);
        assert_eq!(g.origin, Offset { x: -30.0, y: -30.0 });

        for width in [320.0, 610.0, 1024.0, 1921.0] {
            let g = GridLayout::for_viewport(width, 480.0, 30.0);
            let mid = g.origin.x + f64::from(g.cols.end) * g.spacing / 2.0;
            assert!((mid - width / 2.0).abs() < 1e-9, "width {width}: mid {mid}");
        }
    }

    #[test]
    fn bad_spacing_yields_no_cells() {
        assert_eq!(GridLayout::for_viewport(800.0, 600.0, 0.0).cell_count(), 0);
        assert_eq!(GridLayout::for_viewport(800.0, 600.0, -5.0).cell_count(), 0);
    }
}
