use super::constants::*;
use super::signals::Capabilities;
use super::timing::ScrollGate;

/// Discrete capability tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Profile {
    Off,
    LowEnd,
    Mobile,
    Desktop,
}

impl Profile {
    pub fn as_str(self) -> &'static str {
        match self {
            Profile::Off => "off",
            Profile::LowEnd => "low-end",
            Profile::Mobile => "mobile",
            Profile::Desktop => "desktop",
        }
    }
}

/// Semantic page region competing for render-policy attention.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Zone {
    Hero,
    Selection,
    Main,
    Footer,
    MenuOverlay,
}

impl Zone {
    pub const COUNT: usize = 5;
    pub const ALL: [Zone; Zone::COUNT] = [
        Zone::Hero,
        Zone::Selection,
        Zone::Main,
        Zone::Footer,
        Zone::MenuOverlay,
    ];
    // Zones observed for visibility; Main is the fallback and the overlay is
    // driven by the menu marker instead.
    pub const CANDIDATES: [Zone; 3] = [Zone::Footer, Zone::Hero, Zone::Selection];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Value of the `data-bg-zone` attribute marking this region.
    pub fn attr(self) -> &'static str {
        match self {
            Zone::Hero => "hero",
            Zone::Selection => "selection",
            Zone::Main => "main",
            Zone::Footer => "footer",
            Zone::MenuOverlay => "menu-overlay",
        }
    }

    pub fn from_attr(value: &str) -> Option<Zone> {
        Zone::ALL.into_iter().find(|z| z.attr() == value)
    }

    #[inline]
    pub fn priority(self) -> f32 {
        match self {
            Zone::MenuOverlay => 4.0,
            Zone::Footer => 3.0,
            Zone::Hero => 2.0,
            Zone::Selection => 1.0,
            Zone::Main => 0.0,
        }
    }

    /// Share of the configured primitives drawn while this zone is active.
    #[inline]
    pub fn density(self) -> f32 {
        match self {
            Zone::Hero => 1.0,
            Zone::Selection => 0.5,
            Zone::Main => 0.75,
            Zone::Footer | Zone::MenuOverlay => 0.0,
        }
    }

    /// Upper bound on the frame rate while this zone is active.
    #[inline]
    pub fn fps_cap(self) -> Option<f32> {
        match self {
            Zone::Hero => None,
            Zone::Selection => Some(15.0),
            Zone::Main => Some(10.0),
            Zone::Footer | Zone::MenuOverlay => Some(0.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolicyState {
    pub profile: Profile,
    pub target_fps: f32,
    pub pixel_ratio_cap: f32,
}

impl PolicyState {
    pub const OFF: PolicyState = PolicyState {
        profile: Profile::Off,
        target_fps: OFF_FPS,
        pixel_ratio_cap: OFF_DPR,
    };
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RuntimeState {
    pub profile: Profile,
    pub target_fps: f32,
    pub pixel_ratio_cap: f32,
    pub visible: bool,
    pub zone: Zone,
    pub density: f32,
    pub running: bool,
}

impl RuntimeState {
    /// Apply zone tuning to a base policy and derive the running flag.
    pub fn compose(base: PolicyState, visible: bool, zone: Zone) -> Self {
        let target_fps = match zone.fps_cap() {
            Some(cap) => base.target_fps.min(cap),
            None => base.target_fps,
        };
        let running = visible
            && base.profile != Profile::Off
            && target_fps > 0.0
            && zone != Zone::MenuOverlay;
        Self {
            profile: base.profile,
            target_fps,
            pixel_ratio_cap: base.pixel_ratio_cap,
            visible,
            zone,
            density: zone.density().clamp(0.0, 1.0),
            running,
        }
    }

    /// Milliseconds between drawn frames; one second when the loop is paused.
    #[inline]
    pub fn frame_interval_ms(&self) -> f64 {
        if self.target_fps > 0.0 {
            1000.0 / self.target_fps as f64
        } else {
            1000.0
        }
    }
}

/// Derive the capability tier. `None` means no browser environment at all.
pub fn compute_policy(caps: Option<&Capabilities>) -> PolicyState {
    let Some(caps) = caps else {
        return PolicyState::OFF;
    };
    if caps.reduced_motion || caps.save_data {
        return PolicyState::OFF;
    }
    let low_end = caps.memory_gb() <= LOW_END_MAX_MEMORY_GB || caps.cores() <= LOW_END_MAX_CORES;
    if low_end {
        return PolicyState {
            profile: Profile::LowEnd,
            target_fps: LOW_END_FPS,
            pixel_ratio_cap: LOW_END_DPR,
        };
    }
    if caps.coarse_pointer || caps.viewport_width < MOBILE_MAX_WIDTH {
        return PolicyState {
            profile: Profile::Mobile,
            target_fps: MOBILE_FPS,
            pixel_ratio_cap: caps.dpr().min(MOBILE_DPR_CAP),
        };
    }
    PolicyState {
        profile: Profile::Desktop,
        target_fps: DESKTOP_FPS,
        pixel_ratio_cap: caps.dpr().min(DESKTOP_DPR_CAP),
    }
}

/// Latest intersection ratio per zone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ZoneRatios([f32; Zone::COUNT]);

impl ZoneRatios {
    #[inline]
    pub fn get(&self, zone: Zone) -> f32 {
        self.0[zone.index()]
    }

    #[inline]
    pub fn set(&mut self, zone: Zone, ratio: f32) {
        self.0[zone.index()] = if ratio.is_finite() {
            ratio.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }
}

/// Pick the zone that should drive the policy.
///
/// The currently active zone gets a ratio bonus so that two regions with
/// similar visibility do not flip-flop near a scroll boundary.
pub fn pick_zone(ratios: &ZoneRatios, menu_open: bool, current: Zone) -> Zone {
    if menu_open {
        return Zone::MenuOverlay;
    }
    let max_ratio = Zone::CANDIDATES
        .iter()
        .map(|z| ratios.get(*z))
        .fold(0.0_f32, f32::max);
    if max_ratio < ZONE_MIN_RATIO {
        return Zone::Main;
    }

    let mut best = Zone::Hero;
    let mut best_score = f32::MIN;
    for z in Zone::CANDIDATES {
        let bonus = if z == current { ZONE_HYSTERESIS_BONUS } else { 0.0 };
        let score = (ratios.get(z) + bonus) * ZONE_RATIO_WEIGHT + z.priority() * ZONE_PRIORITY_WEIGHT;
        if score > best_score {
            best_score = score;
            best = z;
        }
    }
    best
}

/// Result of a commit attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum Commit {
    /// A new state differing from the last published one.
    Published(RuntimeState),
    /// Nothing changed; subscribers are not notified.
    Unchanged,
    /// A scroll gesture is in progress; retry once it settles.
    Held,
}

/// Turns signal updates into published `RuntimeState`s.
///
/// Updates only mark the engine dirty; the caller schedules one animation
/// frame per dirty period and calls [`PolicyEngine::commit`] from it.
pub struct PolicyEngine {
    base: PolicyState,
    visible: bool,
    ratios: ZoneRatios,
    menu_open: bool,
    last: RuntimeState,
    frame_queued: bool,
    pending_commit: bool,
    scroll: ScrollGate,
}

impl PolicyEngine {
    pub fn new(caps: Option<&Capabilities>) -> Self {
        let base = compute_policy(caps);
        let visible = caps.map(|c| c.document_visible).unwrap_or(false);
        Self {
            base,
            visible,
            ratios: ZoneRatios::default(),
            menu_open: false,
            last: RuntimeState::compose(base, visible, Zone::Main),
            frame_queued: false,
            pending_commit: false,
            scroll: ScrollGate::new(COMMIT_SETTLE_MS),
        }
    }

    /// Last published state.
    #[inline]
    pub fn state(&self) -> &RuntimeState {
        &self.last
    }

    #[inline]
    pub fn base(&self) -> PolicyState {
        self.base
    }

    pub fn refresh_base(&mut self, caps: Option<&Capabilities>) {
        self.base = compute_policy(caps);
        self.visible = caps.map(|c| c.document_visible).unwrap_or(false);
    }

    pub fn set_zone_ratio(&mut self, zone: Zone, ratio: f32) {
        self.ratios.set(zone, ratio);
    }

    pub fn set_menu_open(&mut self, open: bool) {
        self.menu_open = open;
    }

    /// Returns `true` when the caller must schedule a frame for [`commit`].
    ///
    /// [`commit`]: PolicyEngine::commit
    pub fn request_commit(&mut self) -> bool {
        if self.frame_queued {
            return false;
        }
        self.frame_queued = true;
        true
    }

    /// Forget a queued frame that the caller cancelled.
    pub fn cancel_queued(&mut self) {
        self.frame_queued = false;
    }

    pub fn on_scroll(&mut self, now_ms: f64) {
        self.scroll.mark(now_ms);
    }

    /// When a held commit may be retried.
    #[inline]
    pub fn settle_deadline(&self) -> Option<f64> {
        self.scroll.settle_deadline()
    }

    pub fn commit(&mut self, now_ms: f64) -> Commit {
        self.frame_queued = false;
        if self.scroll.in_gesture(now_ms) {
            self.pending_commit = true;
            return Commit::Held;
        }
        self.pending_commit = false;
        let zone = pick_zone(&self.ratios, self.menu_open, self.last.zone);
        let next = RuntimeState::compose(self.base, self.visible, zone);
        if next == self.last {
            return Commit::Unchanged;
        }
        self.last = next;
        Commit::Published(next)
    }

    /// Retry a held commit after the scroll quiet period.
    pub fn flush_if_settled(&mut self, now_ms: f64) -> Commit {
        if !self.pending_commit {
            return Commit::Unchanged;
        }
        self.commit(now_ms)
    }
}
