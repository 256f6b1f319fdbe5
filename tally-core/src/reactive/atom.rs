//! Atom Implementation
//!
//! An Atom is the single-slot reactive primitive. It holds one value and a
//! list of subscribers that are told about every write.
//!
//! # How Atoms Work
//!
//! 1. `get` returns a clone of the current value. It has no side effects.
//!
//! 2. `set` replaces the value and then notifies every subscriber, in
//!    subscription order, with the new value.
//!
//! 3. Every `set` notifies, even if the new value equals the old one. There
//!    is no equality gate, so `T` needs no `PartialEq`.
//!
//! # Thread Safety
//!
//! The value lives behind an `RwLock`. The lock is released before any
//! subscriber runs, so subscribers may read or write the atom themselves.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::subscriber::{Observable, Subscribers, Subscription};

/// Counter for generating unique atom IDs.
static ATOM_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a new unique atom ID.
fn next_atom_id() -> u64 {
    ATOM_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// A reactive cell holding a value of type T.
///
/// Cloning an atom gives another handle to the same cell.
///
/// # Example
///
/// ```rust
/// use tally_core::reactive::Atom;
///
/// let name = Atom::new(String::new());
/// let _sub = name.subscribe(|v| println!("name is now {v}"));
///
/// name.set("Ada".to_string());
/// assert_eq!(name.get(), "Ada");
/// ```
pub struct Atom<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Unique identifier for this atom.
    id: u64,

    /// The current value.
    value: Arc<RwLock<T>>,

    /// Callbacks told about every write.
    subscribers: Subscribers<T>,
}

impl<T> Atom<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a new atom with the given initial value.
    pub fn new(value: T) -> Self {
        Self {
            id: next_atom_id(),
            value: Arc::new(RwLock::new(value)),
            subscribers: Subscribers::new(),
        }
    }

    /// Get the atom's unique ID.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Get the current value.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Borrow the current value without cloning it.
    ///
    /// `f` runs under the read lock; it must not write to this atom.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.read())
    }

    /// Set a new value and notify subscribers.
    pub fn set(&self, value: T) {
        *self.value.write() = value.clone();
        tracing::trace!(atom = self.id, "atom set");
        self.subscribers.emit(value);
    }

    /// Update the value using a function.
    ///
    /// This is useful for updates that depend on the current value.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let new_value = {
            let guard = self.value.read();
            f(&guard)
        };
        self.set(new_value);
    }

    /// Register a callback invoked with the new value after every `set`.
    pub fn subscribe<F>(&self, notify: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(notify)
    }

    /// Get the number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<T> Observable<T> for Atom<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn get(&self) -> T {
        Atom::get(self)
    }

    fn subscribe<F>(&self, notify: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        Atom::subscribe(self, notify)
    }
}

impl<T> Clone for Atom<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            value: Arc::clone(&self.value),
            subscribers: self.subscribers.clone(),
        }
    }
}

impl<T> Default for Atom<T>
where
    T: Clone + Default + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Debug for Atom<T>
where
    T: Clone + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Atom")
            .field("id", &self.id)
            .field("value", &*self.value.read())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[test]
    fn atom_get_and_set() {
        let atom = Atom::new(0);
        assert_eq!(atom.get(), 0);

        atom.set(42);
        assert_eq!(atom.get(), 42);
    }

    #[test]
    fn atom_update() {
        let atom = Atom::new(10);
        atom.update(|v| v + 5);
        assert_eq!(atom.get(), 15);
    }

    #[test]
    fn atom_notifies_with_new_value() {
        let atom = Atom::new(String::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        let _sub = atom.subscribe(move |v: &String| seen_clone.lock().push(v.clone()));

        atom.set("a".to_string());
        atom.set("b".to_string());

        assert_eq!(*seen.lock(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn atom_notifies_even_when_value_is_equal() {
        let atom = Atom::new(7);
        let call_count = Arc::new(AtomicI32::new(0));
        let call_count_clone = call_count.clone();

        let _sub = atom.subscribe(move |_| {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        });

        atom.set(7);
        atom.set(7);
        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn atom_unsubscribe() {
        let atom = Atom::new(0);
        let call_count = Arc::new(AtomicI32::new(0));
        let call_count_clone = call_count.clone();

        let sub = atom.subscribe(move |_| {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        });

        atom.set(1);
        assert_eq!(call_count.load(Ordering::SeqCst), 1);

        sub.unsubscribe();
        atom.set(2);
        // Should not have been called again
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
        assert_eq!(atom.subscriber_count(), 0);
    }

    #[test]
    fn subscriber_can_read_the_atom() {
        let atom = Atom::new(1);
        let observed = Arc::new(AtomicI32::new(0));
        let observed_clone = observed.clone();
        let reader = atom.clone();

        let _sub = atom.subscribe(move |_| {
            observed_clone.store(reader.get(), Ordering::SeqCst);
        });

        atom.set(9);
        assert_eq!(observed.load(Ordering::SeqCst), 9);
    }

    #[test]
    fn atom_clone_shares_state() {
        let atom1 = Atom::new(0);
        let atom2 = atom1.clone();

        atom1.set(42);
        assert_eq!(atom2.get(), 42);

        atom2.set(100);
        assert_eq!(atom1.get(), 100);
        assert_eq!(atom1.id(), atom2.id());
    }

    #[test]
    fn atom_ids_are_unique() {
        let a1 = Atom::new(0);
        let a2 = Atom::new(0);
        let a3 = Atom::new(0);

        assert_ne!(a1.id(), a2.id());
        assert_ne!(a2.id(), a3.id());
        assert_ne!(a1.id(), a3.id());
    }

    #[test]
    fn optional_atom_holds_absence() {
        let atom: Atom<Option<u32>> = Atom::default();
        assert_eq!(atom.get(), None);
        atom.set(Some(3));
        assert_eq!(atom.get(), Some(3));
    }
}
