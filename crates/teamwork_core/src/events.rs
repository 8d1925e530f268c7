//! In-process change notification.
//!
//! # Responsibility
//! - Let views and aggregates subscribe to "data changed" signals.
//! - Deliver events synchronously after a mutation has been committed.
//!
//! # Invariants
//! - Services notify only after a successful store write, so subscribers
//!   always observe the committed state.
//! - Delivery order follows subscription order.
//! - Subscribers must tolerate repeated delivery; recomputation is idempotent.

use log::debug;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// Kind of change that just happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeEvent {
    /// Tasks or documents changed; every derived view should refresh.
    DataChanged,
    /// The member roster changed; assignee lists and the contribution table
    /// should refresh.
    RosterChanged,
    /// All collections were wiped.
    Reset,
}

impl Display for ChangeEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DataChanged => write!(f, "data_changed"),
            Self::RosterChanged => write!(f, "roster_changed"),
            Self::Reset => write!(f, "reset"),
        }
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Listener = Rc<dyn Fn(ChangeEvent)>;

/// Single-threaded subscriber registry.
#[derive(Default)]
pub struct ChangeNotifier {
    listeners: RefCell<BTreeMap<SubscriptionId, Listener>>,
    next_id: Cell<u64>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for every future event.
    pub fn subscribe(&self, listener: impl Fn(ChangeEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.listeners.borrow_mut().insert(id, Rc::new(listener));
        id
    }

    /// Removes a listener. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.borrow_mut().remove(&id).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Delivers `event` to every listener registered at call time.
    pub fn notify(&self, event: ChangeEvent) {
        // Snapshot first so listeners may subscribe/unsubscribe re-entrantly.
        let listeners: Vec<Listener> = self.listeners.borrow().values().cloned().collect();
        debug!(
            "event=change_notify module=events status=ok change={} listeners={}",
            event,
            listeners.len()
        );
        for listener in listeners {
            listener(event);
        }
    }
}
