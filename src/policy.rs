use crate::constants::{MENU_MARKER_SELECTOR, ZONE_ATTR, ZONE_THRESHOLDS};
use crate::core::{
    Commit, Detach, FrameId, FrameScheduler, PolicyEngine, PolicyStore, RuntimeState, Teardown,
    Zone,
};
use crate::dom::{self, IntersectionWatch, Listener, MutationWatch, Timer};
use crate::frame::RafScheduler;
use crate::signals;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use web_sys as web;

struct Shared {
    engine: RefCell<PolicyEngine>,
    store: Rc<PolicyStore>,
    commit_frame: RafScheduler,
    pending_frame: Cell<Option<FrameId>>,
    settle: Timer,
    zones: RefCell<Option<IntersectionWatch>>,
}

impl Shared {
    fn schedule_commit(&self) {
        if !self.engine.borrow_mut().request_commit() {
            return;
        }
        match self.commit_frame.request() {
            Some(id) => self.pending_frame.set(Some(id)),
            None => self.engine.borrow_mut().cancel_queued(),
        }
    }

    fn on_frame(&self) {
        self.pending_frame.set(None);
        let now = dom::now_ms();
        let outcome = self.engine.borrow_mut().commit(now);
        self.handle(outcome, now);
    }

    fn on_settle(&self) {
        let now = dom::now_ms();
        let outcome = self.engine.borrow_mut().flush_if_settled(now);
        self.handle(outcome, now);
    }

    // Engine borrows are released before publishing so listeners may read
    // the store or poke the runtime again.
    fn handle(&self, outcome: Commit, now: f64) {
        match outcome {
            Commit::Published(state) => {
                log::debug!(
                    "[policy] publish profile={} zone={} fps={} running={}",
                    state.profile.as_str(),
                    state.zone.attr(),
                    state.target_fps,
                    state.running
                );
                self.store.publish(state);
            }
            Commit::Held => {
                let deadline = self.engine.borrow().settle_deadline().unwrap_or(now);
                self.settle.arm((deadline - now).max(1.0));
            }
            Commit::Unchanged => {}
        }
    }

    fn refresh_base(&self) {
        let caps = signals::read_capabilities();
        self.engine.borrow_mut().refresh_base(caps.as_ref());
        self.schedule_commit();
    }

    fn refresh_menu(&self, document: &web::Document) {
        let open = document
            .query_selector(MENU_MARKER_SELECTOR)
            .ok()
            .flatten()
            .is_some();
        self.engine.borrow_mut().set_menu_open(open);
        self.schedule_commit();
    }

    fn on_zone_entries(&self, entries: Vec<web::IntersectionObserverEntry>) {
        {
            let mut engine = self.engine.borrow_mut();
            for entry in entries {
                let zone = entry
                    .target()
                    .get_attribute(ZONE_ATTR)
                    .and_then(|a| Zone::from_attr(&a));
                let Some(zone) = zone else {
                    continue;
                };
                let ratio = if entry.is_intersecting() {
                    entry.intersection_ratio() as f32
                } else {
                    0.0
                };
                engine.set_zone_ratio(zone, ratio);
            }
        }
        self.schedule_commit();
    }

    /// Observe zone elements added since mount and zero out zones whose
    /// elements are gone.
    fn rescan_zones(&self, document: &web::Document) {
        let zones = self.zones.borrow();
        let mut engine = self.engine.borrow_mut();
        for zone in Zone::CANDIDATES {
            let found = zone_elements(document, zone);
            if found.is_empty() {
                engine.set_zone_ratio(zone, 0.0);
            }
            if let Some(watch) = zones.as_ref() {
                for el in &found {
                    watch.observe(el);
                }
            }
        }
    }

    fn on_scroll(&self) {
        self.engine.borrow_mut().on_scroll(dom::now_ms());
    }
}

fn zone_elements(document: &web::Document, zone: Zone) -> Vec<web::Element> {
    let selector = format!("[{}=\"{}\"]", ZONE_ATTR, zone.attr());
    let Ok(list) = document.query_selector_all(&selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|n| n.dyn_into::<web::Element>().ok())
        .collect()
}

/// Page-wide render policy: listens to capability, visibility, zone and
/// menu signals and publishes a `RuntimeState` through its store.
pub struct PolicyRuntime {
    shared: Rc<Shared>,
    teardown: Teardown,
}

impl PolicyRuntime {
    pub fn mount() -> Self {
        let caps = signals::read_capabilities();
        let engine = PolicyEngine::new(caps.as_ref());
        let store = PolicyStore::new(*engine.state());
        log::info!(
            "[policy] mount profile={} fps={} dpr_cap={}",
            engine.base().profile.as_str(),
            engine.base().target_fps,
            engine.base().pixel_ratio_cap
        );

        let shared = Rc::new_cyclic(|weak: &Weak<Shared>| {
            let on_frame = weak.clone();
            let on_settle = weak.clone();
            Shared {
                engine: RefCell::new(engine),
                store,
                commit_frame: RafScheduler::new(move |_ts| {
                    if let Some(s) = on_frame.upgrade() {
                        s.on_frame();
                    }
                }),
                pending_frame: Cell::new(None),
                settle: Timer::new(move || {
                    if let Some(s) = on_settle.upgrade() {
                        s.on_settle();
                    }
                }),
                zones: RefCell::new(None),
            }
        });

        let mut runtime = Self {
            shared,
            teardown: Teardown::default(),
        };
        runtime.wire();
        runtime.shared.schedule_commit();
        runtime
    }

    fn wire(&mut self) {
        let Some(window) = web::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        let refresh = |shared: &Rc<Shared>| {
            let weak = Rc::downgrade(shared);
            move |_e: web::Event| {
                if let Some(s) = weak.upgrade() {
                    s.refresh_base();
                }
            }
        };
        if let Some(l) = Listener::new(&window, "resize", refresh(&self.shared)) {
            self.teardown.push(l);
        }
        if let Some(l) = Listener::new(&document, "visibilitychange", refresh(&self.shared)) {
            self.teardown.push(l);
        }
        for mql in [signals::reduced_motion_query(), signals::coarse_pointer_query()]
            .into_iter()
            .flatten()
        {
            if let Some(l) = Listener::new(&mql, "change", refresh(&self.shared)) {
                self.teardown.push(l);
            }
        }

        let weak = Rc::downgrade(&self.shared);
        if let Some(l) = Listener::capture(&document, "scroll", move |_e| {
            if let Some(s) = weak.upgrade() {
                s.on_scroll();
            }
        }) {
            self.teardown.push(l);
        }

        let targets: Vec<web::Element> = Zone::CANDIDATES
            .iter()
            .flat_map(|z| zone_elements(&document, *z))
            .collect();
        let weak = Rc::downgrade(&self.shared);
        let watch = IntersectionWatch::new(&targets, "0px", &ZONE_THRESHOLDS, move |entries| {
            if let Some(s) = weak.upgrade() {
                s.on_zone_entries(entries);
            }
        });
        *self.shared.zones.borrow_mut() = watch;

        if let Some(body) = document.body() {
            let weak = Rc::downgrade(&self.shared);
            let doc = document.clone();
            if let Some(m) = MutationWatch::new(&body, move || {
                if let Some(s) = weak.upgrade() {
                    s.rescan_zones(&doc);
                    s.refresh_menu(&doc);
                }
            }) {
                self.teardown.push(m);
            }
        }
        self.shared.refresh_menu(&document);
        log::info!(
            "[policy] wired zones={} listeners={}",
            targets.len(),
            self.teardown.len()
        );
    }

    #[inline]
    pub fn store(&self) -> Rc<PolicyStore> {
        self.shared.store.clone()
    }

    #[inline]
    pub fn state(&self) -> RuntimeState {
        self.shared.store.get()
    }

    pub fn unmount(&mut self) {
        self.teardown.run();
        if let Some(mut watch) = self.shared.zones.borrow_mut().take() {
            watch.detach();
        }
        self.shared.settle.clear();
        if let Some(id) = self.shared.pending_frame.take() {
            self.shared.commit_frame.cancel(id);
            self.shared.engine.borrow_mut().cancel_queued();
        }
        self.shared.commit_frame.dispose();
    }
}

impl Drop for PolicyRuntime {
    fn drop(&mut self) {
        self.unmount();
    }
}
