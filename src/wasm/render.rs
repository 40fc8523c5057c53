use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{window, HtmlCanvasElement, Window};

use super::surface::CanvasSurface;
use crate::config::WaveConfig;
use crate::renderer::{Renderer, Viewport};

type FrameCallback = Closure<dyn FnMut(f64)>;

/// Everything the frame callback touches, owned by one mounted background.
struct LoopState {
    renderer: Renderer,
    surface: CanvasSurface,
    pending: Option<i32>,
    running: bool,
}

/// Window `resize` listener, removed when dropped.
struct ResizeSubscription {
    window: Window,
    callback: Closure<dyn FnMut()>,
}

impl ResizeSubscription {
    fn listen(window: &Window, callback: Closure<dyn FnMut()>) -> Result<Self, JsValue> {
        window.add_event_listener_with_callback("resize", callback.as_ref().unchecked_ref())?;
        Ok(Self {
            window: window.clone(),
            callback,
        })
    }
}

impl Drop for ResizeSubscription {
    fn drop(&mut self) {
        if let Err(e) = self
            .window
            .remove_event_listener_with_callback("resize", self.callback.as_ref().unchecked_ref())
        {
            log::warn!("failed to remove resize listener: {e:?}");
        }
    }
}

/// A running frame loop. Stopped on drop.
pub struct Animation {
    window: Window,
    state: Rc<RefCell<LoopState>>,
    // `tick` holds the animation-frame closure so that it can keep calling
    // `request_animation_frame` with itself. The closure keeps a clone of this
    // `Rc`; taking the closure out on stop breaks that cycle.
    tick: Rc<RefCell<Option<FrameCallback>>>,
    resize: Option<ResizeSubscription>,
}

/// Sizes the canvas and schedules the first frame. `Ok(None)` when the canvas
/// is not attached to the document or has no 2D context.
pub fn start(canvas: HtmlCanvasElement, config: WaveConfig) -> Result<Option<Animation>, JsValue> {
    let window = window().ok_or("no window")?;
    if !canvas.is_connected() {
        log::warn!("canvas is not attached to the document; background not started");
        return Ok(None);
    }
    let Some(surface) = CanvasSurface::new(canvas)? else {
        log::warn!("canvas has no 2D context; background not started");
        return Ok(None);
    };

    // The table must cover the canvas even when it is larger than the window.
    let canvas_box = surface.fit(&window)?;
    let screen = Viewport::new(
        window.inner_width()?.as_f64().unwrap_or_default().max(canvas_box.width),
        window.inner_height()?.as_f64().unwrap_or_default().max(canvas_box.height),
    );
    let mut renderer = Renderer::new(config, screen);
    renderer.resize(canvas_box);
    log::info!(
        "dot wave mounted at {}x{}",
        renderer.viewport().width,
        renderer.viewport().height
    );

    let state = Rc::new(RefCell::new(LoopState {
        renderer,
        surface,
        pending: None,
        running: true,
    }));

    // Resize re-reads the canvas box; the jitter table only grows.
    let resize = {
        let state = state.clone();
        let window = window.clone();
        Closure::wrap(Box::new(move || {
            let mut guard = state.borrow_mut();
            let s = &mut *guard;
            match s.surface.fit(&window) {
                Ok(viewport) => s.renderer.resize(viewport),
                Err(e) => log::warn!("resize failed: {e:?}"),
            }
        }) as Box<dyn FnMut()>)
    };
    let resize = ResizeSubscription::listen(&window, resize)?;

    // Animation loop
    let tick: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));
    {
        let f = tick.clone();
        let state = state.clone();
        let window = window.clone();
        *tick.borrow_mut() = Some(Closure::wrap(Box::new(move |now: f64| {
            let mut guard = state.borrow_mut();
            let s = &mut *guard;
            s.pending = None;
            if !s.running {
                return;
            }

            if s.renderer.should_render(now) {
                s.renderer.render_frame(&mut s.surface);
            }

            // schedule next
            let next = f.borrow();
            let Some(callback) = next.as_ref() else {
                return;
            };
            match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
                Ok(id) => s.pending = Some(id),
                Err(e) => {
                    log::warn!("could not schedule next frame: {e:?}");
                    s.running = false;
                }
            }
        }) as Box<dyn FnMut(f64)>));
    }

    let first = {
        let callback = tick.borrow();
        let callback = callback.as_ref().ok_or("frame callback missing")?;
        window.request_animation_frame(callback.as_ref().unchecked_ref())?
    };
    state.borrow_mut().pending = Some(first);

    Ok(Some(Animation {
        window,
        state,
        tick,
        resize: Some(resize),
    }))
}

impl Animation {
    pub fn is_running(&self) -> bool {
        self.state.borrow().running
    }

    pub fn frames(&self) -> u64 {
        self.state.borrow().renderer.frames()
    }

    pub fn reconfigure(&self, config: WaveConfig) {
        self.state.borrow_mut().renderer.reconfigure(config);
    }

    /// Cancels the pending frame and detaches the resize listener. Idempotent.
    pub fn stop(&mut self) {
        {
            let mut s = self.state.borrow_mut();
            if s.running {
                log::info!("dot wave unmounted after {} frames", s.renderer.frames());
            }
            s.running = false;
            if let Some(id) = s.pending.take() {
                if let Err(e) = self.window.cancel_animation_frame(id) {
                    log::warn!("cancel_animation_frame failed: {e:?}");
                }
            }
        }
        drop(self.resize.take());
        let callback = self.tick.borrow_mut().take();
        drop(callback);
    }
}

impl Drop for Animation {
    fn drop(&mut self) {
        self.stop();
    }
}
