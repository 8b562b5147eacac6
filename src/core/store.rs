use super::lifecycle::Detach;
use super::policy::RuntimeState;
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

pub type SubscriberId = u32;
type Listener = Rc<dyn Fn(&RuntimeState)>;

/// Reactive holder of the current `RuntimeState`.
///
/// One instance per mounted page, handed explicitly to every consumer.
/// Listeners run synchronously on publish and may read the store.
pub struct PolicyStore {
    state: Cell<RuntimeState>,
    listeners: RefCell<SmallVec<[(SubscriberId, Listener); 4]>>,
    next_id: Cell<SubscriberId>,
}

impl PolicyStore {
    pub fn new(initial: RuntimeState) -> Rc<Self> {
        Rc::new(Self {
            state: Cell::new(initial),
            listeners: RefCell::new(SmallVec::new()),
            next_id: Cell::new(1),
        })
    }

    #[inline]
    pub fn get(&self) -> RuntimeState {
        self.state.get()
    }

    pub fn subscribe(&self, listener: impl Fn(&RuntimeState) + 'static) -> SubscriberId {
        let id = self.next_id.get();
        self.next_id.set(id.wrapping_add(1));
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Subscribe and get a guard that unsubscribes on detach.
    pub fn subscription(
        self: &Rc<Self>,
        listener: impl Fn(&RuntimeState) + 'static,
    ) -> Subscription {
        let id = self.subscribe(listener);
        Subscription {
            store: Rc::downgrade(self),
            id: Some(id),
        }
    }

    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    #[inline]
    pub fn subscriber_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Store and broadcast `state`. Returns `false` (and notifies nobody)
    /// when it equals the current state.
    pub fn publish(&self, state: RuntimeState) -> bool {
        if self.state.get() == state {
            return false;
        }
        self.state.set(state);
        let snapshot: SmallVec<[Listener; 4]> =
            self.listeners.borrow().iter().map(|(_, l)| l.clone()).collect();
        for listener in snapshot {
            listener(&state);
        }
        true
    }
}

/// Unsubscribes from a [`PolicyStore`] when detached.
pub struct Subscription {
    store: Weak<PolicyStore>,
    id: Option<SubscriberId>,
}

impl Detach for Subscription {
    fn detach(&mut self) {
        if let (Some(store), Some(id)) = (self.store.upgrade(), self.id.take()) {
            store.unsubscribe(id);
        }
    }
}
