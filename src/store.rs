//! Reactive single-value store
//!
//! A `ReactiveCell` holds one value and pushes every change to its subscribers
//! synchronously, in registration order. New subscribers are handed the
//! current value immediately.
//!
//! Changes made from inside a subscriber callback are queued and delivered
//! after the current notification round finishes, so every subscriber sees
//! values in the order they were set. A panicking subscriber is logged and
//! skipped; the remaining subscribers are still notified.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

type Callback<T> = Rc<RefCell<dyn FnMut(&T)>>;

struct Subscriber<T> {
    id: u64,
    /// Version of the cell when this subscriber joined (it already saw that value)
    joined_at: u64,
    callback: Callback<T>,
}

struct Shared<T> {
    value: RefCell<T>,
    subscribers: RefCell<Vec<Subscriber<T>>>,
    /// Values set but not yet delivered, tagged with their version
    pending: RefCell<VecDeque<(u64, T)>>,
    notifying: Cell<bool>,
    version: Cell<u64>,
    next_id: Cell<u64>,
}

/// Type-erased view of a cell's subscriber list, used by `Subscription`
trait Registry {
    fn remove(&self, id: u64);
    fn contains(&self, id: u64) -> bool;
}

impl<T> Registry for Shared<T> {
    fn remove(&self, id: u64) {
        let mut subscribers = self.subscribers.borrow_mut();
        if let Some(index) = subscribers.iter().position(|s| s.id == id) {
            subscribers.remove(index);
        }
    }

    fn contains(&self, id: u64) -> bool {
        self.subscribers.borrow().iter().any(|s| s.id == id)
    }
}

/// An observable value container
pub struct ReactiveCell<T> {
    shared: Rc<Shared<T>>,
}

impl<T: Clone + 'static> ReactiveCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            shared: Rc::new(Shared {
                value: RefCell::new(value),
                subscribers: RefCell::new(Vec::new()),
                pending: RefCell::new(VecDeque::new()),
                notifying: Cell::new(false),
                version: Cell::new(0),
                next_id: Cell::new(1),
            }),
        }
    }

    /// Current value (no side effects)
    pub fn get(&self) -> T {
        self.shared.value.borrow().clone()
    }

    /// Replace the value and notify every subscriber once
    pub fn set(&self, value: T) {
        self.store(value);
        self.notify();
    }

    /// Store `value` without notifying; returns whether it differs from the
    /// current one. Pair with `notify` to publish several cells as a group.
    pub(crate) fn replace(&self, value: T) -> bool
    where
        T: PartialEq,
    {
        if *self.shared.value.borrow() == value {
            return false;
        }
        self.store(value);
        true
    }

    /// Deliver every stored but undelivered value
    pub(crate) fn notify(&self) {
        if self.shared.notifying.get() {
            // Delivered by the outer round once it finishes
            return;
        }
        self.drain();
    }

    /// `set(f(current))`
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.shared.value.borrow());
        self.set(next);
    }

    /// Register a callback. It is invoked right away with the current value,
    /// then once per subsequent change until unsubscribed.
    pub fn subscribe(&self, callback: impl FnMut(&T) + 'static) -> Subscription {
        let id = self.shared.next_id.get();
        self.shared.next_id.set(id + 1);

        let callback: Callback<T> = Rc::new(RefCell::new(callback));
        self.shared.subscribers.borrow_mut().push(Subscriber {
            id,
            joined_at: self.shared.version.get(),
            callback: callback.clone(),
        });

        let current = self.get();
        invoke(id, &callback, &current);

        let shared: Rc<dyn Registry> = self.shared.clone();
        Subscription {
            registry: Rc::downgrade(&shared),
            id,
        }
    }

    /// Number of live registrations
    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.borrow().len()
    }

    fn store(&self, value: T) {
        let version = self.shared.version.get() + 1;
        self.shared.version.set(version);
        *self.shared.value.borrow_mut() = value.clone();
        self.shared.pending.borrow_mut().push_back((version, value));
    }

    fn drain(&self) {
        self.shared.notifying.set(true);
        loop {
            let next = self.shared.pending.borrow_mut().pop_front();
            let Some((version, value)) = next else {
                break;
            };

            // Snapshot so callbacks may (un)subscribe while we iterate
            let round: Vec<(u64, Callback<T>)> = self
                .shared
                .subscribers
                .borrow()
                .iter()
                .filter(|s| s.joined_at < version)
                .map(|s| (s.id, s.callback.clone()))
                .collect();

            for (id, callback) in round {
                if !self.shared.contains(id) {
                    continue;
                }
                invoke(id, &callback, &value);
            }
        }
        self.shared.notifying.set(false);
    }
}

/// Clones are handles to the same value and subscriber list
impl<T> Clone for ReactiveCell<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T: Clone + Default + 'static> Default for ReactiveCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for ReactiveCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveCell")
            .field("value", &*self.shared.value.borrow())
            .field("subscribers", &self.shared.subscribers.borrow().len())
            .finish()
    }
}

fn invoke<T>(id: u64, callback: &Callback<T>, value: &T) {
    let Ok(mut callback) = callback.try_borrow_mut() else {
        log::warn!("Subscriber {} re-entered during its own notification, skipped", id);
        return;
    };
    let result = panic::catch_unwind(AssertUnwindSafe(|| (&mut *callback)(value)));
    if result.is_err() {
        log::error!("Subscriber {} panicked during notification", id);
    }
}

/// Handle returned by `ReactiveCell::subscribe`
///
/// Dropping the handle does not unsubscribe; call `unsubscribe`.
#[derive(Clone)]
pub struct Subscription {
    registry: Weak<dyn Registry>,
    id: u64,
}

impl Subscription {
    /// Remove this registration. Calling it again is a no-op.
    pub fn unsubscribe(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }

    /// Whether the registration is still live
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.contains(self.id))
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder<T: Clone + 'static>() -> (Rc<RefCell<Vec<T>>>, impl FnMut(&T) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |v: &T| sink.borrow_mut().push(v.clone()))
    }

    #[test]
    fn test_subscribe_replays_current_value() {
        let cell = ReactiveCell::new(42u32);
        let (seen, cb) = recorder();
        let _sub = cell.subscribe(cb);
        assert_eq!(*seen.borrow(), vec![42]);
    }

    #[test]
    fn test_set_and_update_notify_once_each() {
        let cell = ReactiveCell::new(1.0f64);
        let (seen, cb) = recorder();
        let _sub = cell.subscribe(cb);

        cell.set(2.0);
        cell.update(|v| v * 10.0);
        assert_eq!(cell.get(), 20.0);
        assert_eq!(*seen.borrow(), vec![1.0, 2.0, 20.0]);
    }

    #[test]
    fn test_notification_order_is_registration_order() {
        let cell = ReactiveCell::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));
        let subs: Vec<_> = (0..3)
            .map(|i| {
                let log = log.clone();
                cell.subscribe(move |v: &i32| log.borrow_mut().push((i, *v)))
            })
            .collect();
        log.borrow_mut().clear();

        cell.set(7);
        assert_eq!(*log.borrow(), vec![(0, 7), (1, 7), (2, 7)]);
        assert_eq!(subs.len(), 3);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let cell = ReactiveCell::new(0);
        let (seen, cb) = recorder();
        let sub = cell.subscribe(cb);
        let (_other_seen, other) = recorder();
        let other_sub = cell.subscribe(other);

        sub.unsubscribe();
        sub.unsubscribe();
        assert!(!sub.is_active());
        assert!(other_sub.is_active());
        assert_eq!(cell.subscriber_count(), 1);

        cell.set(5);
        assert_eq!(*seen.borrow(), vec![0]);
    }

    #[test]
    fn test_unsubscribe_during_notification() {
        let cell = Rc::new(ReactiveCell::new(0));
        let later: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        // First subscriber removes the second one when the value hits 1
        let later_handle = later.clone();
        let _first = cell.subscribe(move |v: &i32| {
            if *v == 1 {
                if let Some(sub) = later_handle.borrow().as_ref() {
                    sub.unsubscribe();
                }
            }
        });
        let (seen, cb) = recorder();
        *later.borrow_mut() = Some(cell.subscribe(cb));
        let (third_seen, third) = recorder();
        let _third = cell.subscribe(third);

        cell.set(1);
        cell.set(2);
        assert_eq!(*seen.borrow(), vec![0]);
        assert_eq!(*third_seen.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_set_from_callback_keeps_order() {
        let cell = Rc::new(ReactiveCell::new(0));
        let inner = cell.clone();
        let _bump = cell.subscribe(move |v: &i32| {
            if *v == 1 {
                inner.set(2);
            }
        });
        let (seen, cb) = recorder();
        let _sub = cell.subscribe(cb);

        cell.set(1);
        assert_eq!(cell.get(), 2);
        assert_eq!(*seen.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_subscribe_from_callback_gets_no_duplicate() {
        let cell = Rc::new(ReactiveCell::new(0));
        let late_seen = Rc::new(RefCell::new(Vec::new()));
        let handle = cell.clone();
        let sink = late_seen.clone();
        let _outer = cell.subscribe(move |v: &i32| {
            if *v == 1 {
                let sink = sink.clone();
                let _ = handle.subscribe(move |v: &i32| sink.borrow_mut().push(*v));
            }
        });

        cell.set(1);
        cell.set(2);
        assert_eq!(*late_seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_panicking_subscriber_is_isolated() {
        let cell = ReactiveCell::new(0);
        let _bad = cell.subscribe(|v: &i32| {
            if *v > 0 {
                panic!("observer failure");
            }
        });
        let (seen, cb) = recorder();
        let _good = cell.subscribe(cb);

        cell.set(3);
        cell.set(4);
        assert_eq!(*seen.borrow(), vec![0, 3, 4]);
        assert_eq!(cell.get(), 4);
    }

    #[test]
    fn test_replace_defers_until_notify() {
        let a = ReactiveCell::new(0);
        let b = ReactiveCell::new(0);
        let pairs = Rc::new(RefCell::new(Vec::new()));
        let sink = pairs.clone();
        let other = b.clone();
        let _sub = a.subscribe(move |v: &i32| sink.borrow_mut().push((*v, other.get())));

        assert!(a.replace(1));
        assert!(b.replace(10));
        assert!(!b.replace(10));
        assert_eq!(*pairs.borrow(), vec![(0, 0)]);

        a.notify();
        b.notify();
        a.notify();
        assert_eq!(*pairs.borrow(), vec![(0, 0), (1, 10)]);
    }

    #[test]
    fn test_subscribe_between_replace_and_notify() {
        let cell = ReactiveCell::new(0);
        cell.replace(5);
        let (seen, cb) = recorder();
        let _sub = cell.subscribe(cb);
        cell.notify();
        assert_eq!(*seen.borrow(), vec![5]);
    }

    #[test]
    fn test_subscription_outlives_cell() {
        let cell = ReactiveCell::new(1);
        let sub = cell.subscribe(|_| {});
        drop(cell);
        assert!(!sub.is_active());
        sub.unsubscribe();
    }
}
