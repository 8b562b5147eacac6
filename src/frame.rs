use crate::core::{FrameId, FrameScheduler};
use std::cell::RefCell;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

/// `requestAnimationFrame` bound to one fixed callback.
///
/// The callback receives the frame timestamp in milliseconds. The owner must
/// stop its [`LoopHandle`](crate::core::LoopHandle) before dropping this,
/// otherwise the browser would call into a released closure.
pub struct RafScheduler {
    tick: RefCell<Option<Closure<dyn FnMut(f64)>>>,
}

impl RafScheduler {
    pub fn new(on_frame: impl FnMut(f64) + 'static) -> Self {
        Self {
            tick: RefCell::new(Some(Closure::wrap(
                Box::new(on_frame) as Box<dyn FnMut(f64)>
            ))),
        }
    }

    /// Release the callback; later requests are refused.
    pub fn dispose(&self) {
        self.tick.borrow_mut().take();
    }
}

impl FrameScheduler for RafScheduler {
    fn request(&self) -> Option<FrameId> {
        let tick = self.tick.borrow();
        let cb = tick.as_ref()?;
        web::window()?
            .request_animation_frame(cb.as_ref().unchecked_ref())
            .ok()
    }

    fn cancel(&self, id: FrameId) {
        if let Some(w) = web::window() {
            _ = w.cancel_animation_frame(id);
        }
    }
}

/// Resolve on the next animation frame.
pub async fn next_frame() {
    let Some(window) = web::window() else {
        return;
    };
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        _ = window.request_animation_frame(&resolve);
    });
    _ = JsFuture::from(promise).await;
}

/// Let layout settle for `n` frames.
pub async fn wait_frames(n: u32) {
    for _ in 0..n {
        next_frame().await;
    }
}
