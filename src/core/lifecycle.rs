// Start/stop state machine for animation-frame loops and teardown bookkeeping
// for everything a mounted component attaches to the host.

pub type FrameId = i32;

/// Host capable of scheduling one callback on the next animation frame.
///
/// The callback itself is bound by the implementation; the loop handle only
/// tracks the id so that stopping can cancel it.
pub trait FrameScheduler {
    fn request(&self) -> Option<FrameId>;
    fn cancel(&self, id: FrameId);
}

/// Single loop handle owned by a component instance.
#[derive(Debug, Default)]
pub struct LoopHandle {
    pending: Option<FrameId>,
    running: bool,
}

impl LoopHandle {
    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[inline]
    pub fn pending(&self) -> Option<FrameId> {
        self.pending
    }

    /// Start the loop. Returns `false` when it was already running.
    pub fn start<S: FrameScheduler + ?Sized>(&mut self, scheduler: &S) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.schedule_next(scheduler);
        true
    }

    /// Mark the scheduled frame as delivered. Returns whether the loop is
    /// still meant to run.
    #[inline]
    pub fn fired(&mut self) -> bool {
        self.pending = None;
        self.running
    }

    /// Queue the next frame while running; at most one frame is ever queued.
    pub fn schedule_next<S: FrameScheduler + ?Sized>(&mut self, scheduler: &S) {
        if !self.running || self.pending.is_some() {
            return;
        }
        self.pending = scheduler.request();
        if self.pending.is_none() {
            log::warn!("[loop] frame request refused; loop stopped");
            self.running = false;
        }
    }

    /// Idempotent; always cancels a queued frame before returning.
    pub fn stop<S: FrameScheduler + ?Sized>(&mut self, scheduler: &S) {
        self.running = false;
        if let Some(id) = self.pending.take() {
            scheduler.cancel(id);
        }
    }
}

/// Something attached to the host that must be released on unmount:
/// an event listener, an observer, a timer.
pub trait Detach {
    fn detach(&mut self);
}

/// Owns every attachment of a mounted component and releases them in
/// reverse order, on [`Teardown::run`] or on drop.
#[derive(Default)]
pub struct Teardown {
    items: Vec<Box<dyn Detach>>,
}

impl Teardown {
    pub fn push(&mut self, item: impl Detach + 'static) {
        self.items.push(Box::new(item));
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn run(&mut self) {
        while let Some(mut item) = self.items.pop() {
            item.detach();
        }
    }
}

impl Drop for Teardown {
    fn drop(&mut self) {
        self.run();
    }
}
