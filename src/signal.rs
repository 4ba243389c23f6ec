//! Multi-subscriber notifier with synchronous firing and explicit teardown.

use parking_lot::Mutex;
use std::sync::{Arc, Weak};

type Slot<A> = Arc<dyn Fn(&A) + Send + Sync>;

struct Slots<A> {
    next_id: u64,
    entries: Vec<(u64, Slot<A>)>,
    destroyed: bool,
}

/// Removes subscriptions from a signal without knowing its argument type.
trait Disconnect: Send + Sync {
    fn remove(&self, id: u64) -> bool;
    fn contains(&self, id: u64) -> bool;
}

impl<A: 'static> Disconnect for Mutex<Slots<A>> {
    fn remove(&self, id: u64) -> bool {
        let mut slots = self.lock();
        let before = slots.entries.len();
        slots.entries.retain(|(slot_id, _)| *slot_id != id);
        slots.entries.len() != before
    }

    fn contains(&self, id: u64) -> bool {
        self.lock().entries.iter().any(|(slot_id, _)| *slot_id == id)
    }
}

/// An event that any number of subscribers can observe.
///
/// [`fire`](Signal::fire) calls every subscriber inline, in subscription
/// order. Subscribers may connect or disconnect from inside a callback;
/// the change applies to the next fire.
///
/// # Example
///
/// ```rust
/// use tickstate::Signal;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::sync::Arc;
///
/// let signal = Signal::<u32>::new();
/// let total = Arc::new(AtomicU32::new(0));
///
/// let sink = Arc::clone(&total);
/// let connection = signal.connect(move |n| {
///     sink.fetch_add(*n, Ordering::SeqCst);
/// });
///
/// signal.fire(&5);
/// connection.disconnect();
/// signal.fire(&5);
///
/// assert_eq!(total.load(Ordering::SeqCst), 5);
/// ```
pub struct Signal<A> {
    slots: Arc<Mutex<Slots<A>>>,
}

impl<A: 'static> Signal<A> {
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(Slots {
                next_id: 0,
                entries: Vec::new(),
                destroyed: false,
            })),
        }
    }

    /// Subscribe `callback`.
    ///
    /// Connecting to a destroyed signal returns an already-disconnected
    /// [`Connection`].
    pub fn connect<F>(&self, callback: F) -> Connection
    where
        F: Fn(&A) + Send + Sync + 'static,
    {
        let mut slots = self.slots.lock();
        if slots.destroyed {
            return Connection::detached();
        }
        let id = slots.next_id;
        slots.next_id += 1;
        slots.entries.push((id, Arc::new(callback)));

        let weak: Weak<Mutex<Slots<A>>> = Arc::downgrade(&self.slots);
        let handle: Weak<dyn Disconnect> = weak;
        Connection {
            slots: Some(handle),
            id,
        }
    }

    /// Call every subscriber with `args`.
    pub fn fire(&self, args: &A) {
        let subscribers: Vec<Slot<A>> = self
            .slots
            .lock()
            .entries
            .iter()
            .map(|(_, slot)| Arc::clone(slot))
            .collect();

        for subscriber in subscribers {
            subscriber(args);
        }
    }

    /// Drop every subscriber and refuse new ones.
    pub fn destroy(&self) {
        let mut slots = self.slots.lock();
        slots.destroyed = true;
        slots.entries.clear();
    }

    pub fn is_destroyed(&self) -> bool {
        self.slots.lock().destroyed
    }

    pub fn subscriber_count(&self) -> usize {
        self.slots.lock().entries.len()
    }
}

impl<A: 'static> Default for Signal<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Clone for Signal<A> {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
        }
    }
}

/// A subscription to a [`Signal`].
///
/// Dropping a connection leaves the subscription in place; call
/// [`disconnect`](Connection::disconnect) to remove it.
pub struct Connection {
    slots: Option<Weak<dyn Disconnect>>,
    id: u64,
}

impl Connection {
    fn detached() -> Self {
        Self { slots: None, id: 0 }
    }

    /// Remove the subscription. Returns `false` if it was already gone.
    pub fn disconnect(&self) -> bool {
        self.slots
            .as_ref()
            .and_then(Weak::upgrade)
            .is_some_and(|slots| slots.remove(self.id))
    }

    pub fn is_connected(&self) -> bool {
        self.slots
            .as_ref()
            .and_then(Weak::upgrade)
            .is_some_and(|slots| slots.contains(self.id))
    }
}
