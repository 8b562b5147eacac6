use crate::constants::*;
use crate::core::{
    FramePacer, LoopHandle, PolicyStore, Profile, ResizeCoordinator, ResizePoll, RuntimeState,
    Scene, SceneConfig, SizeChange, Teardown, REBUILD_HEIGHT_THRESHOLD_PX, RESIZE_DEBOUNCE_MS,
    RESIZE_THROTTLE_MS, SCROLL_SETTLE_MS,
};
use crate::dom::{self, IdleTask, Listener, ResizeWatch, Timer};
use crate::frame::RafScheduler;
use std::cell::{Cell, RefCell};
use std::f64::consts::TAU;
use std::rc::{Rc, Weak};
use web_sys as web;

/// 2D context plus the per-size cached layers.
struct Surface2d {
    ctx: web::CanvasRenderingContext2d,
    // Static dot field and background fill, redrawn only on rebuild.
    layer: Option<web::HtmlCanvasElement>,
    fade: Option<web::CanvasGradient>,
}

struct State {
    runtime: RuntimeState,
    surface: Option<Surface2d>,
    scene: Scene,
    pacer: FramePacer,
    handle: LoopHandle,
    resize: ResizeCoordinator,
    time_sec: f32,
    css: (f64, f64),
    scale: f64,
    started: bool,
}

impl State {
    fn draw(&self) {
        let Some(s) = &self.surface else {
            return;
        };
        let ctx = &s.ctx;
        let (w, h) = self.css;
        match &s.layer {
            Some(layer) => {
                _ = ctx.draw_image_with_html_canvas_element_and_dw_and_dh(layer, 0.0, 0.0, w, h);
            }
            None => {
                ctx.set_fill_style_str(FALLBACK_BG);
                ctx.fill_rect(0.0, 0.0, w, h);
            }
        }
        if self.runtime.profile == Profile::Off || self.scene.is_empty() {
            return;
        }

        let cfg = *self.scene.config();
        let t = self.time_sec;
        let density = self.runtime.density;

        ctx.save();
        _ = ctx.set_global_composite_operation("lighter");
        ctx.set_line_width(cfg.line_width as f64);
        ctx.set_stroke_style_str(LINE_COLOR);
        ctx.set_global_alpha(cfg.line_alpha as f64);
        for line in self.scene.lines_drawn(density) {
            ctx.begin_path();
            for (i, (x, y)) in self.scene.line_points(line, t).enumerate() {
                if i == 0 {
                    ctx.move_to(x as f64, y as f64);
                } else {
                    ctx.line_to(x as f64, y as f64);
                }
            }
            ctx.stroke();
        }
        ctx.restore();

        ctx.save();
        _ = ctx.set_global_composite_operation("lighter");
        ctx.set_global_alpha(cfg.node_alpha as f64);
        for node in self.scene.nodes_drawn(density) {
            let (x, y, r) = self.scene.node_glow(node, t);
            let (x, y, r) = (x as f64, y as f64, r as f64);
            let Ok(g) = ctx.create_radial_gradient(x, y, 0.0, x, y, r) else {
                continue;
            };
            _ = g.add_color_stop(0.0, GLOW_INNER);
            _ = g.add_color_stop(1.0, GLOW_OUTER);
            ctx.set_fill_style_canvas_gradient(&g);
            ctx.begin_path();
            _ = ctx.arc(x, y, r, 0.0, TAU);
            ctx.fill();
        }
        ctx.restore();

        if let Some(fade) = &s.fade {
            let top = self.scene.fade_top() as f64;
            ctx.set_fill_style_canvas_gradient(fade);
            ctx.fill_rect(0.0, top, w, h - top);
        }
    }

    /// Re-size the backing store and rebuild entities and cached layers.
    fn rebuild(&mut self, canvas: &web::HtmlCanvasElement, width: f64, height: f64) {
        let cfg = SceneConfig::for_profile(self.runtime.profile);
        self.css = (width, height);
        self.scene.rebuild(width as f32, height as f32, &cfg);
        _ = dom::sync_canvas_backing_size(canvas, self.scale);
        let Some(s) = self.surface.as_mut() else {
            return;
        };
        // Resizing the backing store resets the context state.
        _ = s.ctx.set_transform(self.scale, 0.0, 0.0, self.scale, 0.0, 0.0);
        s.layer = paint_static_layer(canvas, &self.scene, self.scale);
        let top = self.scene.fade_top() as f64;
        let fade = s.ctx.create_linear_gradient(0.0, top, 0.0, height);
        _ = fade.add_color_stop(0.0, FADE_TOP);
        _ = fade.add_color_stop(1.0, FADE_BOTTOM);
        s.fade = Some(fade);
        log::debug!(
            "[background] rebuild {}x{} scale={:.2} lines={} nodes={} builds={}",
            width,
            height,
            self.scale,
            self.scene.lines().len(),
            self.scene.nodes().len(),
            self.scene.builds()
        );
    }
}

fn paint_static_layer(
    canvas: &web::HtmlCanvasElement,
    scene: &Scene,
    scale: f64,
) -> Option<web::HtmlCanvasElement> {
    let document = dom::window_document()?;
    let layer = dom::create_canvas(&document)?;
    layer.set_width(canvas.width());
    layer.set_height(canvas.height());
    let ctx = dom::context_2d(&layer)?;
    _ = ctx.set_transform(scale, 0.0, 0.0, scale, 0.0, 0.0);
    let (w, h) = scene.size();
    ctx.set_fill_style_str(FALLBACK_BG);
    ctx.fill_rect(0.0, 0.0, w as f64, h as f64);
    ctx.set_global_alpha(scene.config().dot_alpha as f64);
    ctx.set_fill_style_str(DOT_COLOR);
    for dot in scene.dots() {
        ctx.begin_path();
        _ = ctx.arc(dot.x as f64, dot.y as f64, dot.radius as f64, 0.0, TAU);
        ctx.fill();
    }
    Some(layer)
}

fn canvas_css_size(canvas: &web::HtmlCanvasElement) -> (f64, f64) {
    let rect = canvas.get_bounding_client_rect();
    (rect.width(), rect.height())
}

struct Shared {
    canvas: web::HtmlCanvasElement,
    store: Rc<PolicyStore>,
    state: RefCell<State>,
    frames: RafScheduler,
    resize_timer: Timer,
    idle: IdleTask,
    teardown: RefCell<Teardown>,
    disposed: Cell<bool>,
}

impl Shared {
    fn start(self: &Rc<Self>) {
        {
            let mut st = self.state.borrow_mut();
            if st.started {
                return;
            }
            st.started = true;
            st.surface = dom::context_2d(&self.canvas).map(|ctx| Surface2d {
                ctx,
                layer: None,
                fade: None,
            });
            if st.surface.is_none() {
                log::warn!("[background] no 2d context; keeping static fill");
            }
        }
        self.wire();
        let runtime = self.store.get();
        self.on_policy(runtime, true);
        log::info!(
            "[background] started profile={} fps={} running={}",
            runtime.profile.as_str(),
            runtime.target_fps,
            runtime.running
        );
    }

    fn wire(self: &Rc<Self>) {
        let mut teardown = self.teardown.borrow_mut();

        let weak = Rc::downgrade(self);
        teardown.push(self.store.subscription(move |next| {
            if let Some(s) = weak.upgrade() {
                s.on_policy(*next, false);
            }
        }));

        let weak = Rc::downgrade(self);
        if let Some(w) = ResizeWatch::new(&self.canvas, move || {
            if let Some(s) = weak.upgrade() {
                s.on_resize();
            }
        }) {
            teardown.push(w);
        }

        if let Some(document) = dom::window_document() {
            let weak = Rc::downgrade(self);
            if let Some(l) = Listener::capture(&document, "scroll", move |_e| {
                if let Some(s) = weak.upgrade() {
                    s.state.borrow_mut().resize.on_scroll(dom::now_ms());
                }
            }) {
                teardown.push(l);
            }
        }
    }

    fn on_policy(&self, next: RuntimeState, force: bool) {
        let mut st = self.state.borrow_mut();
        if !st.started {
            return;
        }
        let prev = st.runtime;
        st.runtime = next;
        st.pacer.set_interval(next.frame_interval_ms());
        let rebuild = force
            || prev.profile != next.profile
            || prev.pixel_ratio_cap != next.pixel_ratio_cap;
        if rebuild {
            let dpr = web::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
            st.scale = dpr.min(next.pixel_ratio_cap as f64).max(0.5);
            let (w, h) = canvas_css_size(&self.canvas);
            st.resize.invalidate();
            st.resize.prime(w, h);
            st.rebuild(&self.canvas, w, h);
        }

        let animate = next.running && next.profile != Profile::Off && st.surface.is_some();
        if animate {
            if st.handle.start(&self.frames) {
                st.pacer.reset();
                log::debug!("[background] loop start fps={}", next.target_fps);
            }
        } else {
            st.handle.stop(&self.frames);
            // Leave a complete still frame behind.
            st.draw();
        }
    }

    fn on_resize(&self) {
        let delay = self.state.borrow_mut().resize.on_resize(dom::now_ms());
        if let Some(delay) = delay {
            self.resize_timer.arm_if_idle(delay);
        }
    }

    fn on_resize_timer(&self) {
        let (w, h) = canvas_css_size(&self.canvas);
        let mut st = self.state.borrow_mut();
        match st.resize.poll(dom::now_ms(), w, h) {
            ResizePoll::Idle => {}
            ResizePoll::Wait(ms) => self.resize_timer.arm(ms),
            ResizePoll::Apply(SizeChange::Rebuild) => {
                st.rebuild(&self.canvas, w, h);
                if !st.handle.is_running() {
                    st.draw();
                }
            }
            ResizePoll::Apply(_) => {}
        }
    }

    fn on_frame(&self, ts: f64) {
        let mut st = self.state.borrow_mut();
        if !st.handle.fired() {
            return;
        }
        st.handle.schedule_next(&self.frames);
        if let Some(dt) = st.pacer.admit(ts) {
            st.time_sec += dt;
            st.scene.step_nodes(dt);
            st.draw();
        }
    }

    fn stop(&self) {
        self.disposed.set(true);
        self.idle.cancel();
        self.resize_timer.clear();
        self.teardown.borrow_mut().run();
        let mut st = self.state.borrow_mut();
        st.handle.stop(&self.frames);
        st.resize.cancel();
    }
}

/// Ambient Canvas2D background bound to one canvas element.
pub struct BackgroundSystem {
    shared: Rc<Shared>,
}

impl BackgroundSystem {
    /// Attach to `canvas`; drawing starts once the main thread is idle.
    pub fn mount(canvas: web::HtmlCanvasElement, store: Rc<PolicyStore>) -> Self {
        dom::set_style(&canvas, "background-color", FALLBACK_BG);
        let runtime = store.get();
        let shared = Rc::new_cyclic(|weak: &Weak<Shared>| {
            let on_frame = weak.clone();
            let on_timer = weak.clone();
            let on_idle = weak.clone();
            Shared {
                canvas,
                store,
                state: RefCell::new(State {
                    runtime,
                    surface: None,
                    scene: Scene::new(),
                    pacer: FramePacer::new(runtime.frame_interval_ms()),
                    handle: LoopHandle::default(),
                    resize: ResizeCoordinator::new(
                        RESIZE_THROTTLE_MS,
                        RESIZE_DEBOUNCE_MS,
                        SCROLL_SETTLE_MS,
                        REBUILD_HEIGHT_THRESHOLD_PX,
                    ),
                    time_sec: 0.0,
                    css: (0.0, 0.0),
                    scale: 1.0,
                    started: false,
                }),
                frames: RafScheduler::new(move |ts| {
                    if let Some(s) = on_frame.upgrade() {
                        s.on_frame(ts);
                    }
                }),
                resize_timer: Timer::new(move || {
                    if let Some(s) = on_timer.upgrade() {
                        s.on_resize_timer();
                    }
                }),
                idle: IdleTask::new(move || {
                    if let Some(s) = on_idle.upgrade() {
                        s.start();
                    }
                }),
                teardown: RefCell::new(Teardown::default()),
                disposed: Cell::new(false),
            }
        });
        shared
            .idle
            .schedule(IDLE_START_TIMEOUT_MS, IDLE_START_FALLBACK_MS);
        log::info!("[background] mounted; start deferred until idle");
        Self { shared }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.shared.state.borrow().handle.is_running()
    }

    #[inline]
    pub fn builds(&self) -> u32 {
        self.shared.state.borrow().scene.builds()
    }

    pub fn unmount(&mut self) {
        if self.shared.disposed.get() {
            return;
        }
        self.shared.stop();
        self.shared.frames.dispose();
        log::info!("[background] unmounted");
    }
}

impl Drop for BackgroundSystem {
    fn drop(&mut self) {
        self.unmount();
    }
}
