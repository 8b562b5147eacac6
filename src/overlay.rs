use crate::constants::DEBUG_HUD_ID;
use crate::core::{PolicyStore, RuntimeState, Subscription};
use std::rc::Rc;
use web_sys as web;

#[inline]
pub fn hud_element(document: &web::Document) -> Option<web::Element> {
    document.get_element_by_id(DEBUG_HUD_ID)
}

/// Render the current policy into the debug HUD.
pub fn update_hud(el: &web::Element, state: &RuntimeState, device_dpr: f64) {
    let running = if state.running { "running" } else { "paused" };
    let html = format!(
        "<div style='color: #cfe7ff; font: 12px ui-monospace, monospace; background: rgba(10, 14, 24, 0.8); padding: 6px 10px; border-radius: 6px; border: 1px solid rgba(80, 110, 150, 0.35);'>zone: {} • fps: {:.0} • dpr: {:.2}/{:.2} • density: {:.2} • profile: {} • {}</div>",
        state.zone.attr(),
        state.target_fps,
        device_dpr.min(state.pixel_ratio_cap as f64),
        device_dpr,
        state.density,
        state.profile.as_str(),
        running
    );
    el.set_inner_html(&html);
}

/// Keep `#bg-debug` in sync with the store when the page provides one.
pub fn attach_hud(store: &Rc<PolicyStore>) -> Option<Subscription> {
    let document = crate::dom::window_document()?;
    let el = hud_element(&document)?;
    let dpr = || web::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
    update_hud(&el, &store.get(), dpr());
    log::info!("[hud] attached to #{}", DEBUG_HUD_ID);
    Some(store.subscription(move |state| update_hud(&el, state, dpr())))
}
