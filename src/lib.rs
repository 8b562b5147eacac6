#![cfg(target_arch = "wasm32")]
use crate::core::{Detach, Subscription};
use background::BackgroundSystem;
use policy::PolicyRuntime;
use showcase::ShowcaseSystem;
use wasm_bindgen::prelude::*;
use web_sys as web;

mod background;
mod camera;
mod constants;
mod core;
mod dom;
mod frame;
mod overlay;
mod policy;
mod render;
mod showcase;
mod signals;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("backdrop-web starting");
    Ok(())
}

/// Page-level owner of the render policy and both visual surfaces.
///
/// Create one per page, mount the surfaces the page has, and call
/// [`VisualCore::dispose`] (or drop it from JS with `free()`) on navigation.
#[wasm_bindgen]
pub struct VisualCore {
    policy: PolicyRuntime,
    hud: Option<Subscription>,
    background: Option<BackgroundSystem>,
    showcase: Option<ShowcaseSystem>,
}

#[wasm_bindgen]
impl VisualCore {
    #[wasm_bindgen(constructor)]
    pub fn new() -> VisualCore {
        let policy = PolicyRuntime::mount();
        let hud = overlay::attach_hud(&policy.store());
        VisualCore {
            policy,
            hud,
            background: None,
            showcase: None,
        }
    }

    /// Attach the ambient background to `canvas`, replacing any previous one.
    pub fn mount_background(&mut self, canvas: web::HtmlCanvasElement) {
        self.unmount_background();
        self.background = Some(BackgroundSystem::mount(canvas, self.policy.store()));
    }

    pub fn unmount_background(&mut self) {
        if let Some(mut bg) = self.background.take() {
            bg.unmount();
        }
    }

    /// Attach the showcase. `projects` is an array of
    /// `{ identifier: string, images: string[] }`.
    pub fn mount_showcase(
        &mut self,
        container: web::Element,
        canvas: web::HtmlCanvasElement,
        projects: JsValue,
    ) {
        self.unmount_showcase();
        let projects = showcase::parse_projects(&projects);
        log::info!("[showcase] mount projects={}", projects.len());
        self.showcase = Some(ShowcaseSystem::mount(
            container,
            canvas,
            projects,
            self.policy.store(),
        ));
    }

    pub fn unmount_showcase(&mut self) {
        if let Some(mut sc) = self.showcase.take() {
            sc.unmount();
        }
    }

    #[wasm_bindgen(getter)]
    pub fn profile(&self) -> String {
        self.policy.state().profile.as_str().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn zone(&self) -> String {
        self.policy.state().zone.attr().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn running(&self) -> bool {
        self.policy.state().running
    }

    #[wasm_bindgen(getter, js_name = backgroundAnimating)]
    pub fn background_animating(&self) -> bool {
        self.background.as_ref().is_some_and(|b| b.is_running())
    }

    #[wasm_bindgen(getter, js_name = showcaseAnimating)]
    pub fn showcase_animating(&self) -> bool {
        self.showcase.as_ref().is_some_and(|s| s.is_running())
    }

    #[wasm_bindgen(getter, js_name = backgroundBuilds)]
    pub fn background_builds(&self) -> u32 {
        self.background.as_ref().map(|b| b.builds()).unwrap_or(0)
    }

    /// Unmount everything: frames, observers, listeners and timers.
    pub fn dispose(&mut self) {
        self.unmount_showcase();
        self.unmount_background();
        if let Some(mut hud) = self.hud.take() {
            hud.detach();
        }
        self.policy.unmount();
        log::info!("[core] disposed");
    }
}

impl Default for VisualCore {
    fn default() -> Self {
        Self::new()
    }
}
