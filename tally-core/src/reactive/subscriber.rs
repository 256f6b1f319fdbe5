//! Subscriber registry for the reactive system.
//!
//! Every observable (atom, list, fold) owns a [`Subscribers`] arena. The arena
//! keeps callbacks in subscription order and hands out [`Subscription`]
//! tokens that remove them again.
//!
//! # Dispatch
//!
//! Emitting an event snapshots the registered callbacks and releases the lock
//! before calling any of them. Callbacks are therefore free to read other
//! observables, subscribe, or unsubscribe. Changes to the subscriber set made
//! during a pass take effect from the next pass on.
//!
//! An event emitted from inside a callback of the same registry is queued and
//! delivered once the current pass has finished, so every subscriber observes
//! events in the order the mutations happened.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::Mutex;
use smallvec::SmallVec;

/// Unique identifier for a subscriber.
///
/// Each registered callback gets a unique ID. The ID is what a
/// [`Subscription`] uses to find its callback again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    ///
    /// Uses an atomic counter to ensure uniqueness across threads.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

/// A value that can be read and watched.
///
/// Implemented by [`Atom`](super::Atom) and [`Fold`](super::Fold); the
/// render boundary only needs these two operations.
pub trait Observable<T> {
    /// Current value.
    fn get(&self) -> T;

    /// Register `notify` for every future change.
    fn subscribe<F>(&self, notify: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static;
}

type Callback<A> = Arc<dyn Fn(&A) + Send + Sync>;

struct Registry<A> {
    /// Callbacks in subscription order.
    callbacks: IndexMap<SubscriberId, Callback<A>>,
    /// Events waiting for delivery.
    pending: VecDeque<A>,
    /// Whether a dispatch loop is currently draining `pending`.
    dispatching: bool,
}

/// Ordered set of callbacks receiving events of type `A`.
///
/// Cloning shares the same registry.
pub struct Subscribers<A> {
    inner: Arc<Mutex<Registry<A>>>,
}

impl<A> Subscribers<A>
where
    A: Send + 'static,
{
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Registry {
                callbacks: IndexMap::new(),
                pending: VecDeque::new(),
                dispatching: false,
            })),
        }
    }

    /// Register a callback. It is called after every callback registered
    /// before it.
    pub fn subscribe<F>(&self, notify: F) -> Subscription
    where
        F: Fn(&A) + Send + Sync + 'static,
    {
        let id = SubscriberId::new();
        self.inner.lock().callbacks.insert(id, Arc::new(notify));
        tracing::trace!(?id, "subscribed");

        let registry: Weak<dyn Detach> = Arc::downgrade(&self.inner) as Weak<dyn Detach>;
        Subscription { id, registry }
    }

    /// Remove a callback by ID.
    ///
    /// Returns true if the callback was still registered.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.inner.detach(id)
    }

    /// Deliver `event` to every registered callback.
    ///
    /// If a dispatch is already running for this registry (the call comes
    /// from inside a callback), the event is queued behind the current one.
    pub fn emit(&self, event: A) {
        {
            let mut registry = self.inner.lock();
            registry.pending.push_back(event);
            if registry.dispatching {
                tracing::trace!(queued = registry.pending.len(), "re-entrant emit queued");
                return;
            }
            registry.dispatching = true;
        }

        let _guard = DispatchGuard {
            registry: &self.inner,
        };

        loop {
            let (event, callbacks) = {
                let mut registry = self.inner.lock();
                match registry.pending.pop_front() {
                    Some(event) => {
                        let callbacks: SmallVec<[Callback<A>; 4]> =
                            registry.callbacks.values().cloned().collect();
                        (event, callbacks)
                    }
                    None => break,
                }
            };

            tracing::trace!(subscribers = callbacks.len(), "dispatching event");
            for notify in &callbacks {
                notify(&event);
            }
        }
    }

    /// Remove every callback and return how many there were.
    pub fn clear(&self) -> usize {
        let callbacks = std::mem::take(&mut self.inner.lock().callbacks);
        callbacks.len()
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.inner.lock().callbacks.len()
    }

    /// True if nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().callbacks.is_empty()
    }
}

impl<A> Default for Subscribers<A>
where
    A: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Clone for Subscribers<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Resets the dispatching flag when the loop ends, including by unwinding,
/// so a panicking callback does not wedge the registry.
struct DispatchGuard<'a, A> {
    registry: &'a Mutex<Registry<A>>,
}

impl<A> Drop for DispatchGuard<'_, A> {
    fn drop(&mut self) {
        let mut registry = self.registry.lock();
        registry.dispatching = false;
        if std::thread::panicking() {
            registry.pending.clear();
        }
    }
}

/// Type-erased removal, so a [`Subscription`] does not carry the event type.
trait Detach: Send + Sync {
    fn detach(&self, id: SubscriberId) -> bool;
}

impl<A: Send> Detach for Mutex<Registry<A>> {
    fn detach(&self, id: SubscriberId) -> bool {
        // The callback may own the registry's owner, so drop it unlocked.
        let removed = self.lock().callbacks.shift_remove(&id);
        let found = removed.is_some();
        drop(removed);
        if found {
            tracing::trace!(?id, "unsubscribed");
        }
        found
    }
}

/// Token returned by `subscribe`.
///
/// Holds only a weak reference to the registry: it never keeps the source
/// alive. Dropping the token leaves the callback registered; call
/// [`unsubscribe`](Subscription::unsubscribe) to remove it.
#[must_use = "dropping a Subscription leaves the callback registered with no way to remove it"]
pub struct Subscription {
    id: SubscriberId,
    registry: Weak<dyn Detach>,
}

impl Subscription {
    /// The subscriber ID this token removes.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Remove the callback. Calling this more than once is a no-op.
    pub fn unsubscribe(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.detach(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("source_alive", &(self.registry.strong_count() > 0))
            .finish()
    }
}
