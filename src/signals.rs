use crate::constants::{COARSE_POINTER_QUERY, REDUCED_MOTION_QUERY};
use crate::core::Capabilities;
use std::cell::RefCell;
use wasm_bindgen::JsValue;
use web_sys as web;

thread_local! {
    // Media query objects are created once per page and reused by readers
    // and change listeners alike.
    static REDUCED_MOTION: RefCell<Option<web::MediaQueryList>> = const { RefCell::new(None) };
    static COARSE_POINTER: RefCell<Option<web::MediaQueryList>> = const { RefCell::new(None) };
}

fn memo_query(
    slot: &'static std::thread::LocalKey<RefCell<Option<web::MediaQueryList>>>,
    query: &str,
) -> Option<web::MediaQueryList> {
    slot.with(|cell| {
        if let Some(mql) = cell.borrow().as_ref() {
            return Some(mql.clone());
        }
        let mql = web::window()?.match_media(query).ok().flatten()?;
        *cell.borrow_mut() = Some(mql.clone());
        Some(mql)
    })
}

pub fn reduced_motion_query() -> Option<web::MediaQueryList> {
    memo_query(&REDUCED_MOTION, REDUCED_MOTION_QUERY)
}

pub fn coarse_pointer_query() -> Option<web::MediaQueryList> {
    memo_query(&COARSE_POINTER, COARSE_POINTER_QUERY)
}

#[inline]
pub fn prefers_reduced_motion() -> bool {
    reduced_motion_query().map(|m| m.matches()).unwrap_or(false)
}

#[inline]
pub fn coarse_pointer() -> bool {
    coarse_pointer_query().map(|m| m.matches()).unwrap_or(false)
}

fn reflect_get(target: &JsValue, key: &str) -> Option<JsValue> {
    js_sys::Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

fn device_memory(navigator: &web::Navigator) -> Option<f64> {
    reflect_get(navigator, "deviceMemory").and_then(|v| v.as_f64())
}

fn save_data(navigator: &web::Navigator) -> bool {
    reflect_get(navigator, "connection")
        .and_then(|c| reflect_get(&c, "saveData"))
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}

pub fn viewport_size(window: &web::Window) -> (f64, f64) {
    let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (w, h)
}

pub fn document_visible() -> bool {
    crate::dom::window_document()
        .map(|d| d.visibility_state() == web::VisibilityState::Visible)
        .unwrap_or(false)
}

/// Read the current capability snapshot; `None` outside a browser.
pub fn read_capabilities() -> Option<Capabilities> {
    let window = web::window()?;
    let navigator = window.navigator();
    let (viewport_width, viewport_height) = viewport_size(&window);
    let cores = navigator.hardware_concurrency();
    Some(Capabilities {
        reduced_motion: prefers_reduced_motion(),
        save_data: save_data(&navigator),
        device_memory_gb: device_memory(&navigator),
        hardware_cores: (cores.is_finite() && cores > 0.0).then_some(cores as u32),
        coarse_pointer: coarse_pointer(),
        viewport_width,
        viewport_height,
        device_pixel_ratio: window.device_pixel_ratio(),
        document_visible: document_visible(),
    })
}
