use crate::constants::*;
use crate::core::{
    camera_drift, draw_order, fallback_sources, plane_budget, plane_pose, plane_sources, ActiveIndex,
    Carousel, Detach, Eligibility, LoopHandle, PlanePose, PlaneSource, PolicyStore, ProjectItem,
    ScrollMetrics, ShowcaseMode, Teardown, TriggerBounds, FALLBACK_IMAGES_PER_PROJECT,
    SHOWCASE_DPR_CAP,
};
use crate::dom::{self, IntersectionWatch, Listener, ResizeWatch, Timer};
use crate::frame::{self, RafScheduler};
use crate::render::{texture, GpuState, ImagePixels};
use crate::signals;
use fnv::FnvHashSet;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

// Frames to wait for the canvas to be attached before giving up.
const CONNECT_WAIT_FRAMES: u32 = 120;

/// Horizontally scrollable image strip shown instead of the 3D stack.
struct FallbackList {
    el: Option<web::Element>,
}

impl FallbackList {
    fn render(
        container: &web::Element,
        sources: &[PlaneSource],
        projects: &[ProjectItem],
    ) -> anyhow::Result<Self> {
        let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
        let list = document
            .create_element("div")
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        _ = list.set_attribute("class", "work-showcase-fallback");
        _ = list.set_attribute(
            "style",
            "display:flex;gap:16px;overflow-x:auto;scroll-snap-type:x mandatory;",
        );
        for source in sources {
            let img = document
                .create_element("img")
                .map_err(|e| anyhow::anyhow!("{:?}", e))?;
            _ = img.set_attribute("src", &source.src);
            _ = img.set_attribute("loading", "lazy");
            _ = img.set_attribute("decoding", "async");
            let alt = projects
                .get(source.project_index)
                .map(|p| p.identifier.as_str())
                .unwrap_or_default();
            _ = img.set_attribute("alt", alt);
            _ = img.set_attribute(
                "style",
                "flex:0 0 auto;height:320px;width:auto;scroll-snap-align:start;",
            );
            _ = list.append_child(&img);
        }
        container
            .append_child(&list)
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        Ok(Self { el: Some(list) })
    }
}

impl Detach for FallbackList {
    fn detach(&mut self) {
        if let Some(el) = self.el.take() {
            el.remove();
        }
    }
}

struct State {
    gpu: Option<GpuState>,
    carousel: Carousel,
    handle: LoopHandle,
    bounds: Option<TriggerBounds>,
    scroller: Option<web::Element>,
    active: ActiveIndex,
    in_view: bool,
    poses: Vec<PlanePose>,
}

struct Shared {
    container: web::Element,
    canvas: web::HtmlCanvasElement,
    projects: Vec<ProjectItem>,
    sources: Vec<PlaneSource>,
    plane_size: [f32; 2],
    store: Rc<PolicyStore>,
    state: RefCell<State>,
    frames: RafScheduler,
    refresh: Timer,
    refresh_early: Timer,
    refresh_late: Timer,
    // Listeners of the 3D stack; run when leaving it.
    teardown: RefCell<Teardown>,
    // Eligibility listeners; live for the whole mount.
    watchers: RefCell<Teardown>,
    fallback: RefCell<Option<FallbackList>>,
    mode: Cell<Option<ShowcaseMode>>,
    // Bumped whenever the stack is entered or left; a stale init gives up.
    generation: Cell<u32>,
    gpu_failed: Cell<bool>,
    disposed: Cell<bool>,
}

impl Shared {
    fn story(&self) -> Option<web::Element> {
        dom::window_document()?.get_element_by_id(STORY_ROOT_ID)
    }

    fn wrapper(&self) -> web::Element {
        dom::window_document()
            .and_then(|d| d.get_element_by_id(CHAPTERS_WRAPPER_ID))
            .unwrap_or_else(|| self.container.clone())
    }

    fn write_active(&self, project_index: usize) {
        let changed = self.state.borrow_mut().active.update(project_index);
        if let (Some(idx), Some(story)) = (changed, self.story()) {
            _ = story.set_attribute(ACTIVE_INDEX_ATTR, &idx.to_string());
        }
    }

    fn eligibility(&self) -> Eligibility {
        Eligibility {
            profile: self.store.get().profile,
            reduced_motion: signals::prefers_reduced_motion(),
            coarse_pointer: signals::coarse_pointer(),
            viewport_width: web::window()
                .map(|w| signals::viewport_size(&w).0)
                .unwrap_or(0.0),
        }
    }

    /// Switch between the stack and the list when eligibility changed.
    fn reevaluate(self: &Rc<Self>) {
        if self.disposed.get() {
            return;
        }
        let next = self
            .eligibility()
            .mode(self.sources.len(), self.gpu_failed.get());
        let prev = self.mode.replace(Some(next));
        if prev == Some(next) {
            return;
        }
        log::info!("[showcase] mode {:?} -> {:?}", prev, next);
        self.leave_stack();
        self.hide_fallback();
        match next {
            ShowcaseMode::Stack => self.enter_stack(),
            ShowcaseMode::List => self.show_fallback(),
            ShowcaseMode::Empty => log::info!("[showcase] no images; nothing to show"),
        }
    }

    fn enter_stack(self: &Rc<Self>) {
        dom::set_style(&self.canvas, "display", "block");
        self.generation.set(self.generation.get().wrapping_add(1));
        self.state.borrow_mut().in_view = true;
        let generation = self.generation.get();
        let weak = Rc::downgrade(self);
        spawn_local(async move {
            if let Err(e) = init(weak, generation).await {
                log::warn!("[showcase] init aborted: {:?}", e);
            }
        });
    }

    fn leave_stack(&self) {
        self.generation.set(self.generation.get().wrapping_add(1));
        self.refresh.clear();
        self.refresh_early.clear();
        self.refresh_late.clear();
        {
            let mut teardown = self.teardown.borrow_mut();
            if !teardown.is_empty() {
                log::debug!("[showcase] detaching {} stack listeners", teardown.len());
                teardown.run();
            }
        }
        let mut st = self.state.borrow_mut();
        st.handle.stop(&self.frames);
        st.gpu = None;
        st.bounds = None;
    }

    fn show_fallback(&self) {
        dom::set_style(&self.canvas, "display", "none");
        let sources = fallback_sources(&self.projects, FALLBACK_IMAGES_PER_PROJECT);
        match FallbackList::render(&self.container, &sources, &self.projects) {
            Ok(list) => *self.fallback.borrow_mut() = Some(list),
            Err(e) => log::warn!("[showcase] fallback render failed: {:?}", e),
        }
    }

    fn hide_fallback(&self) {
        if let Some(mut list) = self.fallback.borrow_mut().take() {
            list.detach();
        }
    }

    fn watch_eligibility(self: &Rc<Self>) {
        let mut watchers = self.watchers.borrow_mut();
        let weak = Rc::downgrade(self);
        watchers.push(self.store.subscription(move |_state| {
            if let Some(s) = weak.upgrade() {
                s.reevaluate();
            }
        }));

        let reevaluate = |shared: &Rc<Shared>| {
            let weak = Rc::downgrade(shared);
            move |_e: web::Event| {
                if let Some(s) = weak.upgrade() {
                    s.reevaluate();
                }
            }
        };
        if let Some(window) = web::window() {
            if let Some(l) = Listener::new(&window, "resize", reevaluate(self)) {
                watchers.push(l);
            }
        }
        for mql in [signals::reduced_motion_query(), signals::coarse_pointer_query()]
            .into_iter()
            .flatten()
        {
            if let Some(l) = Listener::new(&mql, "change", reevaluate(self)) {
                watchers.push(l);
            }
        }
    }

    fn scroll_metrics(&self) -> ScrollMetrics {
        let st = self.state.borrow();
        if let Some(el) = &st.scroller {
            return ScrollMetrics {
                scroll_top: el.scroll_top() as f64,
                scroll_height: el.scroll_height() as f64,
                client_height: el.client_height() as f64,
            };
        }
        let Some(window) = web::window() else {
            return ScrollMetrics::default();
        };
        let scroll_height = window
            .document()
            .and_then(|d| d.document_element())
            .map(|el| el.scroll_height() as f64)
            .unwrap_or(0.0);
        ScrollMetrics {
            scroll_top: window.scroll_y().unwrap_or(0.0),
            scroll_height,
            client_height: signals::viewport_size(&window).1,
        }
    }

    /// Re-measure the trigger region and resync the canvas size.
    fn measure(&self) {
        if self.disposed.get() {
            return;
        }
        let dpr = web::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
        _ = dom::sync_canvas_backing_size(&self.canvas, dpr.min(SHOWCASE_DPR_CAP as f64));
        let metrics = self.scroll_metrics();
        let rect = self.wrapper().get_bounding_client_rect();
        let scroller_top = self
            .state
            .borrow()
            .scroller
            .as_ref()
            .map(|el| el.get_bounding_client_rect().top())
            .unwrap_or(0.0);
        let wrapper_top = rect.top() - scroller_top + metrics.scroll_top;
        let bounds = TriggerBounds::measure(wrapper_top, rect.height(), metrics.client_height);
        self.state.borrow_mut().bounds = Some(bounds);
        log::debug!(
            "[showcase] measured start={:.0} end={:.0}",
            bounds.start,
            bounds.end
        );
        self.update_progress();
    }

    fn update_progress(&self) {
        let metrics = self.scroll_metrics();
        {
            let mut st = self.state.borrow_mut();
            let Some(bounds) = st.bounds else {
                return;
            };
            let p = crate::core::map_progress(bounds.progress(metrics.scroll_top), &metrics);
            st.carousel.set_progress(p, dom::now_ms());
        }
        self.ensure_loop();
    }

    fn ensure_loop(&self) {
        let mut st = self.state.borrow_mut();
        if st.in_view && st.gpu.is_some() && !self.disposed.get() {
            st.handle.start(&self.frames);
        }
    }

    fn on_scroll(&self) {
        self.update_progress();
        self.refresh.arm(REFRESH_DEBOUNCE_MS);
    }

    fn on_visibility(&self, entries: Vec<web::IntersectionObserverEntry>) {
        let Some(last) = entries.last() else {
            return;
        };
        let in_view = last.is_intersecting();
        {
            let mut st = self.state.borrow_mut();
            st.in_view = in_view;
            if in_view {
                st.carousel.touch(dom::now_ms());
            } else {
                st.handle.stop(&self.frames);
            }
        }
        if in_view {
            self.refresh.arm(REFRESH_DEBOUNCE_MS);
            self.ensure_loop();
        }
    }

    fn on_frame(&self) {
        let project_index = {
            let mut st = self.state.borrow_mut();
            if !st.handle.fired() {
                return;
            }
            let current_t = st.carousel.step();
            let count = st.carousel.count();
            let State {
                gpu, poses, carousel, ..
            } = &mut *st;
            poses.clear();
            poses.extend((0..count).map(|i| plane_pose(i, current_t)));
            if let Some(gpu) = gpu.as_mut() {
                let order = draw_order(poses);
                let camera = camera_drift(carousel.progress());
                gpu.resize_if_needed(self.canvas.width(), self.canvas.height());
                if let Err(e) = gpu.render(poses, &order, &camera, self.plane_size) {
                    log::warn!("[showcase] render error: {}", e);
                }
            }

            if st.carousel.should_idle(dom::now_ms()) {
                st.handle.stop(&self.frames);
                log::debug!("[showcase] idle at t={:.3}", st.carousel.current_t());
            } else {
                st.handle.schedule_next(&self.frames);
            }
            self.sources
                .get(st.carousel.active_plane())
                .map(|s| s.project_index)
        };
        if let Some(pi) = project_index {
            self.write_active(pi);
        }
    }

    fn on_texture(&self, src: &str, result: anyhow::Result<ImagePixels>) {
        {
            let mut st = self.state.borrow_mut();
            let Some(gpu) = st.gpu.as_mut() else {
                return;
            };
            match result {
                Ok(pixels) => gpu.insert_texture(src, &pixels),
                Err(e) => log::warn!("[showcase] image {} failed: {:?}", src, e),
            }
            for (i, s) in self.sources.iter().enumerate() {
                if s.src == src {
                    gpu.assign_texture(i, src);
                }
            }
            st.carousel.touch(dom::now_ms());
        }
        self.ensure_loop();
    }

    fn wire(self: &Rc<Self>) {
        let Some(window) = web::window() else {
            return;
        };
        let mut teardown = self.teardown.borrow_mut();

        let weak = Rc::downgrade(self);
        if let Some(w) = ResizeWatch::new(&self.wrapper(), move || {
            if let Some(s) = weak.upgrade() {
                s.refresh.arm(REFRESH_DEBOUNCE_MS);
            }
        }) {
            teardown.push(w);
        }

        let weak = Rc::downgrade(self);
        if let Some(l) = Listener::new(&window, "resize", move |_e| {
            if let Some(s) = weak.upgrade() {
                s.refresh.arm(REFRESH_DEBOUNCE_MS);
            }
        }) {
            teardown.push(l);
        }

        let scroll_target: web::EventTarget = match &self.state.borrow().scroller {
            Some(el) => el.clone().into(),
            None => window.clone().into(),
        };
        let weak = Rc::downgrade(self);
        if let Some(l) = Listener::new(&scroll_target, "scroll", move |_e| {
            if let Some(s) = weak.upgrade() {
                s.on_scroll();
            }
        }) {
            teardown.push(l);
        }

        let weak = Rc::downgrade(self);
        if let Some(w) = IntersectionWatch::new(
            std::slice::from_ref(&self.container),
            SHOWCASE_ROOT_MARGIN,
            &[0.0],
            move |entries| {
                if let Some(s) = weak.upgrade() {
                    s.on_visibility(entries);
                }
            },
        ) {
            teardown.push(w);
        }

        let loaded = window
            .document()
            .map(|d| d.ready_state() == "complete")
            .unwrap_or(true);
        if !loaded {
            let weak = Rc::downgrade(self);
            if let Some(l) = Listener::new(&window, "load", move |_e| {
                if let Some(s) = weak.upgrade() {
                    s.measure();
                }
            }) {
                teardown.push(l);
            }
        }
    }

    fn stop(&self) {
        self.disposed.set(true);
        self.watchers.borrow_mut().run();
        self.leave_stack();
        self.hide_fallback();
    }
}

/// Scroll-driven 3D image stack, or its flat fallback.
///
/// The choice follows the policy profile, reduced motion, the pointer and
/// the viewport width, and is re-made whenever any of them changes.
pub struct ShowcaseSystem {
    shared: Rc<Shared>,
}

impl ShowcaseSystem {
    pub fn mount(
        container: web::Element,
        canvas: web::HtmlCanvasElement,
        projects: Vec<ProjectItem>,
        store: Rc<PolicyStore>,
    ) -> Self {
        let (max_planes, plane_size) = plane_budget(signals::coarse_pointer());
        let sources = plane_sources(&projects, max_planes);

        let shared = Rc::new_cyclic(|weak: &Weak<Shared>| {
            let on_frame = weak.clone();
            let timer = |weak: &Weak<Shared>| {
                let weak = weak.clone();
                Timer::new(move || {
                    if let Some(s) = weak.upgrade() {
                        s.measure();
                    }
                })
            };
            Shared {
                container,
                canvas,
                projects,
                plane_size,
                store,
                state: RefCell::new(State {
                    gpu: None,
                    carousel: Carousel::new(sources.len()),
                    handle: LoopHandle::default(),
                    bounds: None,
                    scroller: None,
                    active: ActiveIndex::default(),
                    in_view: true,
                    poses: Vec::with_capacity(sources.len()),
                }),
                sources,
                frames: RafScheduler::new(move |_ts| {
                    if let Some(s) = on_frame.upgrade() {
                        s.on_frame();
                    }
                }),
                refresh: timer(weak),
                refresh_early: timer(weak),
                refresh_late: timer(weak),
                teardown: RefCell::new(Teardown::default()),
                watchers: RefCell::new(Teardown::default()),
                fallback: RefCell::new(None),
                mode: Cell::new(None),
                generation: Cell::new(0),
                gpu_failed: Cell::new(false),
                disposed: Cell::new(false),
            }
        });

        shared.write_active(0);
        shared.watch_eligibility();
        shared.reevaluate();
        Self { shared }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.shared.state.borrow().handle.is_running()
    }

    pub fn unmount(&mut self) {
        if self.shared.disposed.get() {
            return;
        }
        self.shared.stop();
        self.shared.frames.dispose();
        log::info!("[showcase] unmounted");
    }
}

impl Drop for ShowcaseSystem {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn alive(weak: &Weak<Shared>, generation: u32) -> anyhow::Result<Rc<Shared>> {
    weak.upgrade()
        .filter(|s| !s.disposed.get() && s.generation.get() == generation)
        .ok_or_else(|| anyhow::anyhow!("stack left during init"))
}

async fn init(weak: Weak<Shared>, generation: u32) -> anyhow::Result<()> {
    let canvas = alive(&weak, generation)?.canvas.clone();
    let mut waited = 0;
    while !canvas.is_connected() {
        if waited >= CONNECT_WAIT_FRAMES {
            anyhow::bail!("canvas never attached");
        }
        frame::next_frame().await;
        alive(&weak, generation)?;
        waited += 1;
    }
    frame::wait_frames(INIT_SETTLE_FRAMES).await;

    let plane_count = {
        let shared = alive(&weak, generation)?;
        if let Some(document) = dom::window_document() {
            shared.state.borrow_mut().scroller = dom::find_scroller(&document);
        }
        let dpr = web::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
        _ = dom::sync_canvas_backing_size(&canvas, dpr.min(SHOWCASE_DPR_CAP as f64));
        shared.sources.len()
    };

    let gpu = GpuState::new(&canvas, plane_count).await;
    let shared = alive(&weak, generation)?;
    let gpu = match gpu {
        Ok(g) => g,
        Err(e) => {
            log::warn!("[showcase] gpu unavailable: {}", e);
            shared.gpu_failed.set(true);
            shared.reevaluate();
            return Ok(());
        }
    };
    shared.state.borrow_mut().gpu = Some(gpu);
    shared.wire();
    shared.measure();
    shared.refresh_early.arm(REFRESH_EARLY_MS as f64);
    shared.refresh_late.arm(REFRESH_LATE_MS as f64);
    log::info!(
        "[showcase] ready planes={} scroller={}",
        plane_count,
        if shared.state.borrow().scroller.is_some() {
            "element"
        } else {
            "window"
        }
    );

    let unique: FnvHashSet<&str> = shared.sources.iter().map(|s| s.src.as_str()).collect();
    for src in unique {
        let src = src.to_string();
        let weak = weak.clone();
        spawn_local(async move {
            let result = texture::load_pixels(&src).await;
            if let Ok(s) = alive(&weak, generation) {
                s.on_texture(&src, result);
            }
        });
    }

    let fonts_ready = dom::window_document().and_then(|d| d.fonts().ready().ok());
    drop(shared);
    if let Some(promise) = fonts_ready {
        _ = JsFuture::from(promise).await;
        if let Ok(s) = alive(&weak, generation) {
            s.measure();
        }
    }
    Ok(())
}

/// Parse `[{ identifier, images: [..] }, ..]` from JS.
pub fn parse_projects(value: &wasm_bindgen::JsValue) -> Vec<ProjectItem> {
    let Some(array) = value.dyn_ref::<js_sys::Array>() else {
        return Vec::new();
    };
    array
        .iter()
        .map(|item| {
            let identifier = js_sys::Reflect::get(&item, &"identifier".into())
                .ok()
                .and_then(|v| v.as_string())
                .unwrap_or_default();
            let images = js_sys::Reflect::get(&item, &"images".into())
                .ok()
                .and_then(|v| v.dyn_into::<js_sys::Array>().ok())
                .map(|a| a.iter().filter_map(|v| v.as_string()).collect())
                .unwrap_or_default();
            ProjectItem { identifier, images }
        })
        .collect()
}
