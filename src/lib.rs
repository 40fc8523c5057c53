#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

//! Animated dot-wave background for a `<canvas>`: a jittered dot grid pushed
//! around by two sine channels and 3D noise, repainted once per display frame.

pub mod clock;
pub mod color;
pub mod config;
pub mod field;
pub mod jitter;
pub mod paint;
pub mod renderer;

pub use color::{ColorShift, ParseColorError, Rgba};
pub use config::{ConfigError, WaveConfig};
pub use renderer::{FrameStats, Renderer, Viewport};

#[cfg(target_arch = "wasm32")]
pub use wasm::DotWaveBackground;

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
mod wasm {
    use wasm_bindgen::prelude::*;

    use crate::config::WaveConfig;

    mod render;
    mod surface;

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        // A second init (e.g. hot reload) is harmless.
        console_log::init_with_level(log::Level::Info).ok();
        Ok(())
    }

    /// Handle to one background mounted on a canvas. Dropping it from JS (`free`)
    /// unmounts as well.
    #[wasm_bindgen]
    pub struct DotWaveBackground {
        animation: Option<render::Animation>,
    }

    #[wasm_bindgen]
    impl DotWaveBackground {
        /// Sizes `canvas` to its on-screen box and starts the frame loop.
        /// `options` is a JSON object of camelCase options; bad options fall
        /// back to the defaults. Without a 2D context nothing animates.
        pub fn mount(
            canvas: web_sys::HtmlCanvasElement,
            options: Option<String>,
        ) -> Result<DotWaveBackground, JsValue> {
            let config = WaveConfig::from_options(options.as_deref());
            let animation = render::start(canvas, config)?;
            Ok(DotWaveBackground { animation })
        }

        /// Stops the loop; no frame is painted after this returns. The frame
        /// count stays readable.
        pub fn unmount(&mut self) {
            if let Some(animation) = &mut self.animation {
                animation.stop();
            }
        }

        /// Applies new options to a running background.
        pub fn reconfigure(&mut self, options: &str) -> Result<(), JsValue> {
            let config =
                WaveConfig::from_json(options).map_err(|e| JsValue::from_str(&e.to_string()))?;
            if let Some(animation) = &self.animation {
                animation.reconfigure(config);
            }
            Ok(())
        }

        #[wasm_bindgen(getter)]
        pub fn running(&self) -> bool {
            self.animation.as_ref().is_some_and(render::Animation::is_running)
        }

        /// Frames painted so far.
        #[wasm_bindgen(getter)]
        pub fn frames(&self) -> f64 {
            self.animation.as_ref().map_or(0.0, |a| a.frames() as f64)
        }
    }
}
