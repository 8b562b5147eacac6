use crate::core::Detach;
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

#[inline]
pub fn now_ms() -> f64 {
    instant::now()
}

/// Resize a canvas backing store to its CSS size times `scale`.
/// Returns the CSS size it was sized for.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement, scale: f64) -> (f64, f64) {
    let rect = canvas.get_bounding_client_rect();
    let (w, h) = (rect.width(), rect.height());
    let w_px = ((w * scale).floor() as u32).max(1);
    let h_px = ((h * scale).floor() as u32).max(1);
    if canvas.width() != w_px {
        canvas.set_width(w_px);
    }
    if canvas.height() != h_px {
        canvas.set_height(h_px);
    }
    (w, h)
}

pub fn context_2d(canvas: &web::HtmlCanvasElement) -> Option<web::CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .ok()
        .flatten()
        .and_then(|c| c.dyn_into::<web::CanvasRenderingContext2d>().ok())
}

pub fn create_canvas(document: &web::Document) -> Option<web::HtmlCanvasElement> {
    document
        .create_element("canvas")
        .ok()
        .and_then(|el| el.dyn_into::<web::HtmlCanvasElement>().ok())
}

#[inline]
pub fn set_style(el: &web::HtmlElement, property: &str, value: &str) {
    _ = el.style().set_property(property, value);
}

// ---------------- Detachable attachments ----------------

/// Event listener that is removed on detach.
pub struct Listener {
    target: web::EventTarget,
    kind: &'static str,
    capture: bool,
    closure: Option<Closure<dyn FnMut(web::Event)>>,
}

impl Listener {
    pub fn new(
        target: &web::EventTarget,
        kind: &'static str,
        handler: impl FnMut(web::Event) + 'static,
    ) -> Option<Self> {
        Self::attach(target, kind, false, handler)
    }

    /// Capture-phase listener; sees `scroll` from every element under target.
    pub fn capture(
        target: &web::EventTarget,
        kind: &'static str,
        handler: impl FnMut(web::Event) + 'static,
    ) -> Option<Self> {
        Self::attach(target, kind, true, handler)
    }

    fn attach(
        target: &web::EventTarget,
        kind: &'static str,
        capture: bool,
        handler: impl FnMut(web::Event) + 'static,
    ) -> Option<Self> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web::Event)>);
        target
            .add_event_listener_with_callback_and_bool(kind, closure.as_ref().unchecked_ref(), capture)
            .map_err(|e| log::warn!("[dom] add {} listener failed: {:?}", kind, e))
            .ok()?;
        Some(Self {
            target: target.clone(),
            kind,
            capture,
            closure: Some(closure),
        })
    }
}

impl Detach for Listener {
    fn detach(&mut self) {
        if let Some(closure) = self.closure.take() {
            _ = self.target.remove_event_listener_with_callback_and_bool(
                self.kind,
                closure.as_ref().unchecked_ref(),
                self.capture,
            );
        }
    }
}

/// `ResizeObserver` disconnected on detach.
pub struct ResizeWatch {
    observer: Option<web::ResizeObserver>,
    _closure: Closure<dyn FnMut(js_sys::Array, web::ResizeObserver)>,
}

impl ResizeWatch {
    pub fn new(target: &web::Element, mut handler: impl FnMut() + 'static) -> Option<Self> {
        let closure = Closure::wrap(Box::new(move |_entries: js_sys::Array, _obs: web::ResizeObserver| {
            handler();
        }) as Box<dyn FnMut(js_sys::Array, web::ResizeObserver)>);
        let observer = web::ResizeObserver::new(closure.as_ref().unchecked_ref())
            .map_err(|e| log::warn!("[dom] ResizeObserver unavailable: {:?}", e))
            .ok()?;
        observer.observe(target);
        Some(Self {
            observer: Some(observer),
            _closure: closure,
        })
    }
}

impl Detach for ResizeWatch {
    fn detach(&mut self) {
        if let Some(o) = self.observer.take() {
            o.disconnect();
        }
    }
}

/// `IntersectionObserver` disconnected on detach.
pub struct IntersectionWatch {
    observer: Option<web::IntersectionObserver>,
    _closure: Closure<dyn FnMut(js_sys::Array, web::IntersectionObserver)>,
}

impl IntersectionWatch {
    pub fn new(
        targets: &[web::Element],
        root_margin: &str,
        thresholds: &[f64],
        mut handler: impl FnMut(Vec<web::IntersectionObserverEntry>) + 'static,
    ) -> Option<Self> {
        let closure = Closure::wrap(Box::new(
            move |entries: js_sys::Array, _obs: web::IntersectionObserver| {
                let entries = entries
                    .iter()
                    .filter_map(|e| e.dyn_into::<web::IntersectionObserverEntry>().ok())
                    .collect();
                handler(entries);
            },
        )
            as Box<dyn FnMut(js_sys::Array, web::IntersectionObserver)>);
        let init = web::IntersectionObserverInit::new();
        init.set_root_margin(root_margin);
        let list = js_sys::Array::new();
        for t in thresholds {
            list.push(&(*t).into());
        }
        init.set_threshold(&list);
        let observer =
            web::IntersectionObserver::new_with_options(closure.as_ref().unchecked_ref(), &init)
                .map_err(|e| log::warn!("[dom] IntersectionObserver unavailable: {:?}", e))
                .ok()?;
        for t in targets {
            observer.observe(t);
        }
        Some(Self {
            observer: Some(observer),
            _closure: closure,
        })
    }

    /// Start watching another element; re-observing is a no-op.
    pub fn observe(&self, target: &web::Element) {
        if let Some(o) = &self.observer {
            o.observe(target);
        }
    }
}

impl Detach for IntersectionWatch {
    fn detach(&mut self) {
        if let Some(o) = self.observer.take() {
            o.disconnect();
        }
    }
}

/// `MutationObserver` on a subtree's child list, disconnected on detach.
pub struct MutationWatch {
    observer: Option<web::MutationObserver>,
    _closure: Closure<dyn FnMut(js_sys::Array, web::MutationObserver)>,
}

impl MutationWatch {
    pub fn new(target: &web::Node, mut handler: impl FnMut() + 'static) -> Option<Self> {
        let closure = Closure::wrap(Box::new(move |_records: js_sys::Array, _obs: web::MutationObserver| {
            handler();
        }) as Box<dyn FnMut(js_sys::Array, web::MutationObserver)>);
        let observer = web::MutationObserver::new(closure.as_ref().unchecked_ref())
            .map_err(|e| log::warn!("[dom] MutationObserver unavailable: {:?}", e))
            .ok()?;
        let init = web::MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        observer
            .observe_with_options(target, &init)
            .map_err(|e| log::warn!("[dom] MutationObserver.observe failed: {:?}", e))
            .ok()?;
        Some(Self {
            observer: Some(observer),
            _closure: closure,
        })
    }
}

impl Detach for MutationWatch {
    fn detach(&mut self) {
        if let Some(o) = self.observer.take() {
            o.disconnect();
        }
    }
}

/// Re-armable `setTimeout` slot with a fixed callback.
pub struct Timer {
    closure: Closure<dyn FnMut()>,
    handle: Rc<Cell<Option<i32>>>,
}

impl Timer {
    pub fn new(mut handler: impl FnMut() + 'static) -> Self {
        let handle: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
        let fired = handle.clone();
        let closure = Closure::wrap(Box::new(move || {
            fired.set(None);
            handler();
        }) as Box<dyn FnMut()>);
        Self { closure, handle }
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.handle.get().is_some()
    }

    /// (Re)start the countdown.
    pub fn arm(&self, delay_ms: f64) {
        self.clear();
        let Some(w) = web::window() else {
            return;
        };
        let delay = delay_ms.max(0.0).ceil() as i32;
        match w.set_timeout_with_callback_and_timeout_and_arguments_0(
            self.closure.as_ref().unchecked_ref(),
            delay,
        ) {
            Ok(id) => self.handle.set(Some(id)),
            Err(e) => log::warn!("[dom] setTimeout failed: {:?}", e),
        }
    }

    /// Start the countdown unless one is already running.
    pub fn arm_if_idle(&self, delay_ms: f64) {
        if !self.is_armed() {
            self.arm(delay_ms);
        }
    }

    pub fn clear(&self) {
        if let Some(id) = self.handle.take() {
            if let Some(w) = web::window() {
                w.clear_timeout_with_handle(id);
            }
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.clear();
    }
}

#[derive(Clone, Copy)]
enum IdleHandle {
    Idle(u32),
    Timeout(i32),
}

/// One-shot task run when the main thread is idle, or after a fixed delay
/// where `requestIdleCallback` is missing.
pub struct IdleTask {
    closure: Closure<dyn FnMut()>,
    handle: Rc<Cell<Option<IdleHandle>>>,
}

impl IdleTask {
    pub fn new(mut task: impl FnMut() + 'static) -> Self {
        let handle: Rc<Cell<Option<IdleHandle>>> = Rc::new(Cell::new(None));
        let fired = handle.clone();
        let closure = Closure::wrap(Box::new(move || {
            fired.set(None);
            task();
        }) as Box<dyn FnMut()>);
        Self { closure, handle }
    }

    pub fn schedule(&self, idle_timeout_ms: u32, fallback_ms: i32) {
        self.cancel();
        let Some(w) = web::window() else {
            return;
        };
        let cb = self.closure.as_ref().unchecked_ref();
        let has_idle = js_sys::Reflect::has(&w, &"requestIdleCallback".into()).unwrap_or(false);
        if has_idle {
            let opts = web::IdleRequestOptions::new();
            opts.set_timeout(idle_timeout_ms);
            if let Ok(id) = w.request_idle_callback_with_options(cb, &opts) {
                self.handle.set(Some(IdleHandle::Idle(id)));
                return;
            }
        }
        match w.set_timeout_with_callback_and_timeout_and_arguments_0(cb, fallback_ms) {
            Ok(id) => self.handle.set(Some(IdleHandle::Timeout(id))),
            Err(e) => log::warn!("[dom] idle start could not be scheduled: {:?}", e),
        }
    }

    pub fn cancel(&self) {
        let Some(h) = self.handle.take() else {
            return;
        };
        let Some(w) = web::window() else {
            return;
        };
        match h {
            IdleHandle::Idle(id) => w.cancel_idle_callback(id),
            IdleHandle::Timeout(id) => w.clear_timeout_with_handle(id),
        }
    }
}

impl Drop for IdleTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Resolve the element that actually scrolls the page content: a marked
/// inner container when the layout has one, otherwise the window.
pub fn find_scroller(document: &web::Document) -> Option<web::Element> {
    if let Some(el) = document.get_element_by_id(crate::constants::SCROLLER_ID) {
        return Some(el);
    }
    crate::constants::SCROLLER_SELECTORS
        .iter()
        .find_map(|sel| document.query_selector(sel).ok().flatten())
}
