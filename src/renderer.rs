//! State owned by one mounted background, advanced once per rendered frame.

use noise::{NoiseFn, OpenSimplex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::clock::FrameClock;
use crate::config::{WaveConfig, JITTER_SAFE_MARGIN};
use crate::field::{DotSample, FieldEvaluator, GlowMark, GridLayout};
use crate::jitter::JitterTable;
use crate::paint::{BlurScope, Surface};

/// Size in logical (CSS) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn max_dimension(&self) -> f64 {
        self.width.max(self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub dots: usize,
    pub glows: usize,
}

pub struct Renderer<N = OpenSimplex> {
    config: WaveConfig,
    evaluator: FieldEvaluator<N>,
    jitter: JitterTable,
    jitter_extent: f64,
    rng: StdRng,
    clock: FrameClock,
    viewport: Viewport,
    time: f64,
    frames: u64,
    // Reused per-frame batches; cleared at the start of every frame.
    dots: Vec<DotSample>,
    glows: Vec<GlowMark>,
}

impl Renderer<OpenSimplex> {
    /// `screen` sizes the jitter table and is the initial viewport.
    pub fn new(config: WaveConfig, screen: Viewport) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let evaluator = FieldEvaluator::new(&config, rng.gen());
        Self::with_evaluator(config, evaluator, screen, rng)
    }
}

impl<N: NoiseFn<f64, 3>> Renderer<N> {
    pub fn with_evaluator(
        config: WaveConfig,
        evaluator: FieldEvaluator<N>,
        screen: Viewport,
        mut rng: StdRng,
    ) -> Self {
        let jitter_extent = screen.max_dimension();
        let jitter = JitterTable::build(
            config.dot_spacing,
            config.initial_randomness,
            jitter_extent,
            &mut rng,
        );
        Self {
            clock: FrameClock::new(config.max_fps),
            config,
            evaluator,
            jitter,
            jitter_extent,
            rng,
            viewport: screen,
            time: 0.0,
            frames: 0,
            dots: Vec::new(),
            glows: Vec::new(),
        }
    }

    pub fn config(&self) -> &WaveConfig {
        &self.config
    }

    pub fn jitter(&self) -> &JitterTable {
        &self.jitter
    }

    pub fn evaluator(&self) -> &FieldEvaluator<N> {
        &self.evaluator
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// New drawing size. The jitter table is kept unless the viewport outgrew
    /// what it covers, in which case it is rebuilt for the new size.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport != self.viewport {
            log::debug!("viewport {}x{}", viewport.width, viewport.height);
        }
        let needed = viewport.max_dimension();
        if needed > self.jitter_extent * JITTER_SAFE_MARGIN {
            log::debug!("viewport outgrew jitter table ({} > {})", needed, self.jitter_extent);
            self.jitter_extent = needed;
            self.jitter = JitterTable::build(
                self.config.dot_spacing,
                self.config.initial_randomness,
                needed,
                &mut self.rng,
            );
        }
        self.viewport = viewport;
    }

    /// Applies new options. The jitter table is regenerated only when spacing or
    /// jitter magnitude changed.
    pub fn reconfigure(&mut self, config: WaveConfig) {
        if self.config.jitter_changed(&config) {
            self.jitter = JitterTable::build(
                config.dot_spacing,
                config.initial_randomness,
                self.jitter_extent,
                &mut self.rng,
            );
        }
        if self.config.max_fps != config.max_fps {
            self.clock = FrameClock::new(config.max_fps);
        }
        self.evaluator.reconfigure(&config);
        self.config = config;
    }

    /// Throttle gate for the refresh at `now_ms`.
    pub fn should_render(&mut self, now_ms: f64) -> bool {
        self.clock.tick(now_ms)
    }

    /// Clears `surface`, advances time by one step and paints every visible
    /// cell: glow marks first under a blur, then the dots unfiltered.
    pub fn render_frame<S: Surface + ?Sized>(&mut self, surface: &mut S) -> FrameStats {
        let Viewport { width, height } = self.viewport;
        surface.clear(width, height);

        let layout = GridLayout::for_viewport(width, height, self.config.dot_spacing);
        self.time += self.config.time_step;

        self.dots.clear();
        self.glows.clear();
        for i in layout.cols.clone() {
            for j in layout.rows.clone() {
                let (x, y) = layout.base_position(i, j, &self.jitter);
                let dot = self.evaluator.sample(x, y, self.time, height);
                if let Some(glow) = self.evaluator.glow(&dot, &mut self.rng) {
                    self.glows.push(glow);
                }
                self.dots.push(dot);
            }
        }

        if !self.glows.is_empty() {
            let mut blurred = BlurScope::new(&mut *surface, self.config.glow_blur_radius);
            for g in &self.glows {
                blurred.fill_circle(g.x, g.y, g.radius, self.config.glow_color);
            }
        }

        for d in &self.dots {
            surface.fill_circle(d.x, d.y, d.radius, d.color);
        }

        self.frames += 1;
        let stats = FrameStats {
            dots: self.dots.len(),
            glows: self.glows.len(),
        };
        log::trace!(
            "frame {} t={} dots={} glows={}",
            self.frames,
            self.time,
            stats.dots,
            stats.glows
        );
        stats
    }
}
