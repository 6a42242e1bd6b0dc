use crate::domain::logging::get_time_provider;
use std::cell::{Cell, RefCell};
use std::fmt::Debug;
use std::rc::{Rc, Weak};

/// Base trait for all domain events
pub trait DomainEvent: Debug + Clone {
    fn event_type(&self) -> &'static str;
    fn timestamp(&self) -> u64 {
        get_time_provider().current_timestamp()
    }
}

struct Listener<T> {
    id: u64,
    callback: Rc<dyn Fn(&T)>,
    single_shot: bool,
}

type ListenerList<T> = RefCell<Vec<Listener<T>>>;

/// Single-threaded multicast event source.
///
/// Every subscription returns a [`Subscription`] guard; dropping the guard
/// removes the listener, so owners tear down their listeners deterministically.
pub struct EventDelegate<T> {
    listeners: Rc<ListenerList<T>>,
    next_id: Cell<u64>,
}

impl<T: 'static> Default for EventDelegate<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> EventDelegate<T> {
    pub fn new() -> Self {
        Self { listeners: Rc::new(RefCell::new(Vec::new())), next_id: Cell::new(1) }
    }

    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.subscribe_with(callback, false)
    }

    /// Listener removed automatically after its first delivery
    pub fn subscribe_once(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.subscribe_with(callback, true)
    }

    fn subscribe_with(&self, callback: impl Fn(&T) + 'static, single_shot: bool) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners.borrow_mut().push(Listener { id, callback: Rc::new(callback), single_shot });

        let weak: Weak<ListenerList<T>> = Rc::downgrade(&self.listeners);
        Subscription {
            remove: Some(Box::new(move || {
                if let Some(listeners) = weak.upgrade() {
                    listeners.borrow_mut().retain(|l| l.id != id);
                }
            })),
        }
    }

    /// Deliver `event` to a snapshot of the current listeners.
    ///
    /// Listeners may subscribe or unsubscribe while being called.
    pub fn fire(&self, event: &T) {
        let snapshot: Vec<(u64, Rc<dyn Fn(&T)>, bool)> = self
            .listeners
            .borrow()
            .iter()
            .map(|l| (l.id, Rc::clone(&l.callback), l.single_shot))
            .collect();

        let fired_once: Vec<u64> = snapshot.iter().filter(|(_, _, once)| *once).map(|(id, _, _)| *id).collect();
        if !fired_once.is_empty() {
            self.listeners.borrow_mut().retain(|l| !fired_once.contains(&l.id));
        }

        for (_, callback, _) in snapshot {
            callback(event);
        }
    }

    pub fn has_listeners(&self) -> bool {
        !self.listeners.borrow().is_empty()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn unsubscribe_all(&self) {
        self.listeners.borrow_mut().clear();
    }
}

/// Scoped listener registration; unsubscribes on drop
#[must_use = "dropping a Subscription immediately unsubscribes it"]
pub struct Subscription {
    remove: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Keep the listener for the lifetime of its delegate
    pub fn forget(mut self) {
        self.remove = None;
    }

    pub fn unsubscribe(mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("active", &self.remove.is_some()).finish()
    }
}
