// Host-side tests for the loop start/stop state machine and teardown.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod core {
    pub mod lifecycle {
        include!("../src/core/lifecycle.rs");
    }
}

use crate::core::lifecycle::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Records requested and cancelled frame ids like a browser frame queue.
#[derive(Default)]
struct MockScheduler {
    next: Cell<FrameId>,
    queued: RefCell<Vec<FrameId>>,
    cancelled: RefCell<Vec<FrameId>>,
    refuse: Cell<bool>,
}

impl MockScheduler {
    fn pending(&self) -> usize {
        self.queued.borrow().len()
    }

    /// Deliver the oldest queued frame, if any.
    fn deliver(&self) -> Option<FrameId> {
        let mut q = self.queued.borrow_mut();
        if q.is_empty() {
            None
        } else {
            Some(q.remove(0))
        }
    }
}

impl FrameScheduler for MockScheduler {
    fn request(&self) -> Option<FrameId> {
        if self.refuse.get() {
            return None;
        }
        let id = self.next.get() + 1;
        self.next.set(id);
        self.queued.borrow_mut().push(id);
        Some(id)
    }

    fn cancel(&self, id: FrameId) {
        self.queued.borrow_mut().retain(|q| *q != id);
        self.cancelled.borrow_mut().push(id);
    }
}

/// Stand-in for a listener or observer; counts live attachments.
struct Attachment {
    name: &'static str,
    live: Rc<Cell<usize>>,
    log: Rc<RefCell<Vec<&'static str>>>,
    attached: bool,
}

impl Attachment {
    fn new(name: &'static str, live: &Rc<Cell<usize>>, log: &Rc<RefCell<Vec<&'static str>>>) -> Self {
        live.set(live.get() + 1);
        Self {
            name,
            live: live.clone(),
            log: log.clone(),
            attached: true,
        }
    }
}

impl Detach for Attachment {
    fn detach(&mut self) {
        if self.attached {
            self.attached = false;
            self.live.set(self.live.get() - 1);
            self.log.borrow_mut().push(self.name);
        }
    }
}

#[test]
fn start_queues_exactly_one_frame() {
    let s = MockScheduler::default();
    let mut h = LoopHandle::default();
    assert!(h.start(&s));
    assert!(!h.start(&s));
    assert!(h.is_running());
    assert_eq!(s.pending(), 1);
}

#[test]
fn loop_reschedules_one_frame_at_a_time() {
    let s = MockScheduler::default();
    let mut h = LoopHandle::default();
    h.start(&s);
    for _ in 0..5 {
        let id = s.deliver().expect("a frame is queued");
        assert_eq!(h.pending(), Some(id));
        assert!(h.fired());
        h.schedule_next(&s);
        h.schedule_next(&s);
        assert_eq!(s.pending(), 1);
    }
}

#[test]
fn stop_cancels_the_queued_frame() {
    let s = MockScheduler::default();
    let mut h = LoopHandle::default();
    h.start(&s);
    h.stop(&s);
    assert_eq!(s.pending(), 0);
    assert_eq!(s.cancelled.borrow().len(), 1);
    assert!(!h.is_running());
    assert_eq!(h.pending(), None);

    h.stop(&s);
    assert_eq!(s.cancelled.borrow().len(), 1);
}

#[test]
fn frame_delivered_after_stop_does_not_reschedule() {
    let s = MockScheduler::default();
    let mut h = LoopHandle::default();
    h.start(&s);
    // The browser already dispatched the callback when stop ran.
    s.deliver();
    h.stop(&s);
    assert!(!h.fired());
    h.schedule_next(&s);
    assert_eq!(s.pending(), 0);
}

#[test]
fn restart_after_stop_is_allowed() {
    let s = MockScheduler::default();
    let mut h = LoopHandle::default();
    h.start(&s);
    h.stop(&s);
    assert!(h.start(&s));
    assert_eq!(s.pending(), 1);
}

#[test]
fn refused_request_stops_the_loop() {
    let s = MockScheduler::default();
    s.refuse.set(true);
    let mut h = LoopHandle::default();
    h.start(&s);
    assert!(!h.is_running());
    assert_eq!(h.pending(), None);
}

#[test]
fn teardown_detaches_in_reverse_order() {
    let live = Rc::new(Cell::new(0));
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut t = Teardown::default();
    t.push(Attachment::new("resize", &live, &log));
    t.push(Attachment::new("scroll", &live, &log));
    t.push(Attachment::new("observer", &live, &log));
    assert_eq!(t.len(), 3);
    assert_eq!(live.get(), 3);

    t.run();
    assert!(t.is_empty());
    assert_eq!(live.get(), 0);
    assert_eq!(*log.borrow(), vec!["observer", "scroll", "resize"]);

    t.run();
    assert_eq!(log.borrow().len(), 3);
}

#[test]
fn teardown_runs_on_drop() {
    let live = Rc::new(Cell::new(0));
    let log = Rc::new(RefCell::new(Vec::new()));
    {
        let mut t = Teardown::default();
        t.push(Attachment::new("a", &live, &log));
        t.push(Attachment::new("b", &live, &log));
    }
    assert_eq!(live.get(), 0);
}

#[test]
fn unmount_while_running_leaves_nothing_behind() {
    let s = MockScheduler::default();
    let live = Rc::new(Cell::new(0));
    let log = Rc::new(RefCell::new(Vec::new()));

    let mut h = LoopHandle::default();
    let mut t = Teardown::default();
    t.push(Attachment::new("resize-observer", &live, &log));
    t.push(Attachment::new("scroll-listener", &live, &log));
    h.start(&s);
    for _ in 0..3 {
        s.deliver();
        h.fired();
        h.schedule_next(&s);
    }
    assert_eq!(s.pending(), 1);

    h.stop(&s);
    t.run();
    assert_eq!(s.pending(), 0);
    assert_eq!(live.get(), 0);

    // A repeated unmount is harmless.
    h.stop(&s);
    t.run();
    assert_eq!(s.pending(), 0);
    assert_eq!(live.get(), 0);
}
