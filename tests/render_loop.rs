use dotwave_wasm::field::FieldEvaluator;
use dotwave_wasm::paint::Surface;
use dotwave_wasm::{Renderer, Rgba, Viewport, WaveConfig};
use noise::Constant;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Clone, PartialEq)]
enum Op {
    Clear(f64, f64),
    Blur(f64),
    Reset,
    Fill { radius: f64, color: Rgba, blurred: bool },
}

#[derive(Default)]
struct Recorder {
    ops: Vec<Op>,
    blur: Option<f64>,
}

impl Surface for Recorder {
    fn clear(&mut self, width: f64, height: f64) {
        self.ops.push(Op::Clear(width, height));
    }

    fn set_blur(&mut self, radius: f64) {
        self.blur = Some(radius);
        self.ops.push(Op::Blur(radius));
    }

    fn reset_filter(&mut self) {
        self.blur = None;
        self.ops.push(Op::Reset);
    }

    fn fill_circle(&mut self, _x: f64, _y: f64, radius: f64, color: Rgba) {
        self.ops.push(Op::Fill {
            radius,
            color,
            blurred: self.blur.is_some(),
        });
    }
}

/// Noise pinned at +1 and glow certain above a low threshold, so every cell
/// whose sine channels are not strongly negative glows.
fn glowing(screen: Viewport) -> Renderer<Constant> {
    let config = WaveConfig {
        glow_intensity_threshold: 0.1,
        glow_probability: 1.0,
        ..WaveConfig::default()
    };
    let evaluator = FieldEvaluator::with_noise(&config, Constant::new(1.0));
    Renderer::with_evaluator(config, evaluator, screen, StdRng::seed_from_u64(11))
}

#[test]
fn glow_batch_is_blurred_and_dots_are_not() {
    let mut renderer = glowing(Viewport::new(320.0, 240.0));
    let mut rec = Recorder::default();
    let stats = renderer.render_frame(&mut rec);
    assert!(stats.glows > 0);

    assert_eq!(rec.ops[0], Op::Clear(320.0, 240.0));
    assert_eq!(rec.ops[1], Op::Blur(4.0));

    let reset_at = rec.ops.iter().position(|op| *op == Op::Reset).unwrap();
    let (glows, dots) = rec.ops.split_at(reset_at);
    let glows = &glows[2..];
    let dots = &dots[1..];

    assert_eq!(glows.len(), stats.glows);
    assert_eq!(dots.len(), stats.dots);
    let glow_color = Rgba::rgba(255, 255, 255, 0.08);
    assert!(glows
        .iter()
        .all(|op| matches!(op, Op::Fill { blurred: true, color, .. } if *color == glow_color)));
    assert!(dots
        .iter()
        .all(|op| matches!(op, Op::Fill { blurred: false, .. })));
    assert!(rec.blur.is_none());
}

#[test]
fn no_glow_means_no_filter_changes() {
    let config = WaveConfig {
        glow_probability: 0.0,
        ..WaveConfig::default()
    };
    let evaluator = FieldEvaluator::with_noise(&config, Constant::new(0.0));
    let mut renderer = Renderer::with_evaluator(
        config,
        evaluator,
        Viewport::new(200.0, 200.0),
        StdRng::seed_from_u64(2),
    );
    let mut rec = Recorder::default();
    let stats = renderer.render_frame(&mut rec);
    assert_eq!(stats.glows, 0);
    assert!(!rec.ops.iter().any(|op| matches!(op, Op::Blur(_) | Op::Reset)));
}

#[test]
fn glow_never_fires_below_threshold() {
    let config = WaveConfig {
        glow_intensity_threshold: 1.0,
        glow_probability: 1.0,
        ..WaveConfig::default()
    };
    let evaluator = FieldEvaluator::with_noise(&config, Constant::new(-1.0));
    let mut renderer = Renderer::with_evaluator(
        config,
        evaluator,
        Viewport::new(640.0, 480.0),
        StdRng::seed_from_u64(3),
    );
    let mut rec = Recorder::default();
    for _ in 0..20 {
        assert_eq!(renderer.render_frame(&mut rec).glows, 0);
    }
}

#[test]
fn glow_radius_is_a_multiple_of_the_dot() {
    let mut renderer = glowing(Viewport::new(200.0, 100.0));
    let mut rec = Recorder::default();
    let stats = renderer.render_frame(&mut rec);
    // Every cell glows here, so glows and dots pair up in paint order.
    assert_eq!(stats.glows, stats.dots);

    let radii = |blurred: bool| -> Vec<f64> {
        rec.ops
            .iter()
            .filter_map(|op| match op {
                Op::Fill { radius, blurred: b, .. } if *b == blurred => Some(*radius),
                _ => None,
            })
            .collect()
    };
    for (glow, dot) in radii(true).iter().zip(radii(false)) {
        assert_eq!(*glow, dot * 4.0);
    }
}

#[test]
fn throttle_skips_early_refreshes() {
    let config = WaveConfig {
        max_fps: Some(31.25),
        ..WaveConfig::default()
    };
    let mut renderer = Renderer::new(config, Viewport::new(100.0, 100.0));
    let mut rec = Recorder::default();
    for k in 0..8 {
        if renderer.should_render(f64::from(k) * 16.0) {
            renderer.render_frame(&mut rec);
        }
    }
    assert_eq!(renderer.frames(), 4);
    assert_eq!(renderer.time(), 4.0);
}

#[test]
fn every_frame_starts_with_a_full_clear() {
    let mut renderer = Renderer::new(WaveConfig::default(), Viewport::new(1024.0, 768.0));
    renderer.resize(Viewport::new(500.0, 300.0));
    let mut rec = Recorder::default();
    renderer.render_frame(&mut rec);
    renderer.render_frame(&mut rec);
    let clears: Vec<&Op> = rec.ops.iter().filter(|op| matches!(op, Op::Clear(..))).collect();
    assert_eq!(clears, [&Op::Clear(500.0, 300.0), &Op::Clear(500.0, 300.0)]);
}
