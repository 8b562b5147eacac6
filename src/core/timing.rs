// Throttle/debounce/gating primitives shared by the policy engine and both
// render loops. All of them are driven by caller-supplied millisecond
// timestamps so the web layer owns the actual timers.

/// Marks a scroll gesture in progress until `settle_ms` of quiet.
#[derive(Clone, Debug)]
pub struct ScrollGate {
    settle_ms: f64,
    last_scroll: Option<f64>,
}

impl ScrollGate {
    pub fn new(settle_ms: f64) -> Self {
        Self {
            settle_ms,
            last_scroll: None,
        }
    }

    #[inline]
    pub fn mark(&mut self, now_ms: f64) {
        self.last_scroll = Some(now_ms);
    }

    #[inline]
    pub fn in_gesture(&self, now_ms: f64) -> bool {
        match self.last_scroll {
            Some(t) => now_ms - t < self.settle_ms,
            None => false,
        }
    }

    #[inline]
    pub fn settle_deadline(&self) -> Option<f64> {
        self.last_scroll.map(|t| t + self.settle_ms)
    }
}

/// Trailing-edge debounce: fires once `delay_ms` after the last poke.
#[derive(Clone, Debug)]
pub struct Debounce {
    delay_ms: f64,
    deadline: Option<f64>,
}

impl Debounce {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms,
            deadline: None,
        }
    }

    #[inline]
    pub fn delay_ms(&self) -> f64 {
        self.delay_ms
    }

    #[inline]
    pub fn poke(&mut self, now_ms: f64) {
        self.deadline = Some(now_ms + self.delay_ms);
    }

    #[inline]
    pub fn deadline(&self) -> Option<f64> {
        self.deadline
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// `true` exactly once per quiet period, when the deadline has passed.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        match self.deadline {
            Some(d) if now_ms >= d => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Leading-edge throttle: admits at most one event per interval.
#[derive(Clone, Debug)]
pub struct Throttle {
    interval_ms: f64,
    last: Option<f64>,
}

impl Throttle {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            last: None,
        }
    }

    pub fn admit(&mut self, now_ms: f64) -> bool {
        match self.last {
            Some(t) if now_ms - t < self.interval_ms => false,
            _ => {
                self.last = Some(now_ms);
                true
            }
        }
    }
}

/// Paces a self-rescheduling animation loop down to a target frame rate.
#[derive(Clone, Debug)]
pub struct FramePacer {
    interval_ms: f64,
    last_frame: Option<f64>,
}

impl FramePacer {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            last_frame: None,
        }
    }

    pub fn set_interval(&mut self, interval_ms: f64) {
        self.interval_ms = interval_ms.max(1.0);
    }

    #[inline]
    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    /// Returns the simulation step in seconds when a frame should be drawn.
    ///
    /// The step is the nominal interval, not the measured gap, so motion
    /// stays even at low frame rates and after tab switches.
    pub fn admit(&mut self, now_ms: f64) -> Option<f32> {
        if let Some(last) = self.last_frame {
            if now_ms - last < self.interval_ms {
                return None;
            }
        }
        self.last_frame = Some(now_ms);
        Some((self.interval_ms / 1000.0) as f32)
    }

    pub fn reset(&mut self) {
        self.last_frame = None;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizeChange {
    Unchanged,
    /// Height-only change under the threshold, e.g. a mobile toolbar.
    Jitter,
    Rebuild,
}

/// Decides whether a measured size warrants a full scene rebuild.
#[derive(Clone, Debug)]
pub struct SizeTracker {
    height_threshold: f64,
    last: Option<(f64, f64)>,
}

impl SizeTracker {
    pub fn new(height_threshold: f64) -> Self {
        Self {
            height_threshold,
            last: None,
        }
    }

    #[inline]
    pub fn last(&self) -> Option<(f64, f64)> {
        self.last
    }

    pub fn classify(&self, width: f64, height: f64) -> SizeChange {
        let Some((w0, h0)) = self.last else {
            return SizeChange::Rebuild;
        };
        if width != w0 {
            return SizeChange::Rebuild;
        }
        let dh = (height - h0).abs();
        if dh == 0.0 {
            SizeChange::Unchanged
        } else if dh < self.height_threshold {
            SizeChange::Jitter
        } else {
            SizeChange::Rebuild
        }
    }

    /// Classify and, on rebuild, adopt the new size as the reference.
    ///
    /// Jitter is not adopted, so repeated small steps still add up to a
    /// rebuild once they cross the threshold.
    pub fn apply(&mut self, width: f64, height: f64) -> SizeChange {
        let change = self.classify(width, height);
        if change == SizeChange::Rebuild {
            self.last = Some((width, height));
        }
        change
    }

    /// Force the next measurement to rebuild (profile changed).
    pub fn invalidate(&mut self) {
        self.last = None;
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ResizePoll {
    /// Nothing pending.
    Idle,
    /// Check again after this many milliseconds.
    Wait(f64),
    Apply(SizeChange),
}

/// Throttle → debounce → scroll gate → size classification pipeline for
/// resize notifications.
#[derive(Clone, Debug)]
pub struct ResizeCoordinator {
    throttle: Throttle,
    debounce: Debounce,
    gate: ScrollGate,
    tracker: SizeTracker,
}

impl ResizeCoordinator {
    pub fn new(throttle_ms: f64, debounce_ms: f64, settle_ms: f64, height_threshold: f64) -> Self {
        Self {
            throttle: Throttle::new(throttle_ms),
            debounce: Debounce::new(debounce_ms),
            gate: ScrollGate::new(settle_ms),
            tracker: SizeTracker::new(height_threshold),
        }
    }

    /// Record the size the scene was first built for.
    pub fn prime(&mut self, width: f64, height: f64) -> SizeChange {
        self.tracker.apply(width, height)
    }

    pub fn invalidate(&mut self) {
        self.tracker.invalidate();
    }

    /// Every event pushes the quiet period back. Throttled events return
    /// `None`; admitted ones return the delay after which
    /// [`poll`](Self::poll) should run, when the caller has no timer armed.
    pub fn on_resize(&mut self, now_ms: f64) -> Option<f64> {
        self.debounce.poke(now_ms);
        self.throttle
            .admit(now_ms)
            .then(|| self.debounce.delay_ms())
    }

    pub fn on_scroll(&mut self, now_ms: f64) {
        self.gate.mark(now_ms);
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.debounce.is_armed()
    }

    pub fn poll(&mut self, now_ms: f64, width: f64, height: f64) -> ResizePoll {
        let Some(deadline) = self.debounce.deadline() else {
            return ResizePoll::Idle;
        };
        if now_ms < deadline {
            return ResizePoll::Wait(deadline - now_ms);
        }
        if self.gate.in_gesture(now_ms) {
            let settle = self.gate.settle_deadline().unwrap_or(now_ms);
            return ResizePoll::Wait((settle - now_ms).max(1.0));
        }
        self.debounce.cancel();
        ResizePoll::Apply(self.tracker.apply(width, height))
    }

    pub fn cancel(&mut self) {
        self.debounce.cancel();
    }
}
