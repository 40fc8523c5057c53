use std::f64::consts::TAU;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

use crate::color::Rgba;
use crate::paint::Surface;
use crate::renderer::Viewport;

/// `Surface` over a canvas 2D context, drawing in CSS pixels.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// `None` when the canvas cannot hand out a 2D context.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Option<Self>, JsValue> {
        let Some(ctx) = canvas.get_context("2d")? else {
            return Ok(None);
        };
        let ctx: CanvasRenderingContext2d = ctx.dyn_into()?;
        Ok(Some(Self { canvas, ctx }))
    }

    /// Matches the backing store to the canvas' on-screen box at the current
    /// device pixel ratio and returns the logical size.
    pub fn fit(&self, window: &Window) -> Result<Viewport, JsValue> {
        let ratio = window.device_pixel_ratio().max(1.0);
        let width = f64::from(self.canvas.offset_width());
        let height = f64::from(self.canvas.offset_height());

        // Resizing the backing store resets the context state, transform included.
        self.canvas.set_width((width * ratio).round() as u32);
        self.canvas.set_height((height * ratio).round() as u32);
        let style = self.canvas.style();
        style.set_property("width", &format!("{width}px"))?;
        style.set_property("height", &format!("{height}px"))?;
        self.ctx.set_transform(ratio, 0.0, 0.0, ratio, 0.0, 0.0)?;

        Ok(Viewport::new(width, height))
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self, width: f64, height: f64) {
        self.ctx.clear_rect(0.0, 0.0, width, height);
    }

    fn set_blur(&mut self, radius: f64) {
        self.ctx.set_filter(&format!("blur({radius}px)"));
    }

    fn reset_filter(&mut self) {
        self.ctx.set_filter("none");
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Rgba) {
        self.ctx.set_fill_style_str(&color.to_string());
        self.ctx.begin_path();
        if let Err(e) = self.ctx.arc(x, y, radius, 0.0, TAU) {
            log::warn!("arc at ({x}, {y}) r={radius} failed: {e:?}");
            return;
        }
        self.ctx.fill();
    }
}
