//! Fold Implementation
//!
//! A Fold is a read-only derived value kept equal to a left-to-right reduce
//! over a [`ReactiveList`].
//!
//! # How Folds Work
//!
//! 1. On creation the fold reduces the list's initial contents and caches
//!    the result.
//!
//! 2. The fold subscribes to the list. Every structural change triggers a
//!    full re-fold of the current contents, in element order, followed by a
//!    notification of the fold's own subscribers with the new value.
//!
//! 3. There is no incremental maintenance. Re-folding from the seed keeps
//!    the result identical to a fresh `reduce`, including for combine
//!    functions that are not associative (floating-point addition).
//!
//! # Lifetime
//!
//! The list only holds a weak reference back to the fold. A fold stays alive
//! while any [`Fold`] handle exists or while anything is subscribed to it:
//! every callback registered through [`Fold::subscribe`] owns the fold. Once
//! the handles are gone and the last subscriber has unsubscribed, the fold
//! removes its subscription from the list. [`Fold::dispose`] does the same
//! immediately and releases the fold's own subscribers.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::list::ReactiveList;
use super::subscriber::{Observable, Subscribers, Subscription};

/// Counter for generating unique fold IDs.
static FOLD_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a new unique fold ID.
fn next_fold_id() -> u64 {
    FOLD_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

struct FoldInner<T> {
    /// Unique identifier for this fold.
    id: u64,

    /// Reduces the source list from the seed.
    compute: Box<dyn Fn() -> T + Send + Sync>,

    /// The value as of the last structural change.
    value: RwLock<T>,

    /// Number of recomputations since creation.
    version: AtomicU64,

    /// Callbacks told about every recomputation.
    subscribers: Subscribers<T>,

    /// Our subscription on the source list; `None` once disposed.
    source: Mutex<Option<Subscription>>,
}

impl<T> FoldInner<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn recompute(&self) {
        let value = (self.compute)();
        *self.value.write() = value.clone();
        let version = self.version.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(fold = self.id, version, "fold recomputed");
        self.subscribers.emit(value);
    }
}

impl<T> Drop for FoldInner<T> {
    fn drop(&mut self) {
        if let Some(source) = self.source.get_mut().take() {
            source.unsubscribe();
        }
    }
}

/// A derived value equal to `list.reduce(seed, combine)` at all times
/// outside an in-flight mutation.
///
/// Cloning a fold gives another handle to the same derived value.
///
/// # Example
///
/// ```rust
/// use tally_core::reactive::{Fold, ReactiveList};
///
/// let scores = ReactiveList::new(vec![1.5, 2.5]);
/// let total = Fold::new(&scores, 0.0, |sum: f64, s: &f64| sum + s);
/// assert_eq!(total.get(), 4.0);
///
/// scores.append(1.0);
/// assert_eq!(total.get(), 5.0);
/// ```
pub struct Fold<T>
where
    T: Clone + Send + Sync + 'static,
{
    inner: Arc<FoldInner<T>>,
}

impl<T> Fold<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a fold over `list`, computed immediately.
    pub fn new<E, F>(list: &ReactiveList<E>, seed: T, combine: F) -> Self
    where
        E: Clone + Send + Sync + 'static,
        F: Fn(T, &E) -> T + Send + Sync + 'static,
    {
        let source = list.clone();
        let compute = move || source.reduce(seed.clone(), &combine);
        let initial = compute();

        let inner = Arc::new(FoldInner {
            id: next_fold_id(),
            compute: Box::new(compute),
            value: RwLock::new(initial),
            version: AtomicU64::new(0),
            subscribers: Subscribers::new(),
            source: Mutex::new(None),
        });

        let weak = Arc::downgrade(&inner);
        let subscription = list.subscribe(move |_change| {
            if let Some(inner) = weak.upgrade() {
                inner.recompute();
            }
        });
        *inner.source.lock() = Some(subscription);

        tracing::debug!(fold = inner.id, list = list.id(), "fold created");
        Self { inner }
    }

    /// Get the fold's unique ID.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// The value as of the last structural change of the source.
    pub fn get(&self) -> T {
        self.inner.value.read().clone()
    }

    /// Borrow the value without cloning it.
    ///
    /// `f` runs under the value's read lock; it must not mutate the source
    /// list, since the re-fold takes the write lock.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.read())
    }

    /// Register a callback invoked with each recomputed value.
    ///
    /// The callback keeps the fold alive until it is unsubscribed, so the
    /// returned token must eventually be used to unsubscribe.
    pub fn subscribe<F>(&self, notify: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        if self.is_disposed() {
            return self.inner.subscribers.subscribe(notify);
        }
        let owner = Arc::clone(&self.inner);
        self.inner.subscribers.subscribe(move |value| {
            let _ = &owner;
            notify(value);
        })
    }

    /// Number of recomputations since creation.
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::Relaxed)
    }

    /// Stop following the source list and drop every subscriber. The last
    /// value stays readable.
    ///
    /// Calling this more than once is a no-op.
    pub fn dispose(&self) {
        let source = self.inner.source.lock().take();
        if let Some(source) = source {
            source.unsubscribe();
            let released = self.inner.subscribers.clear();
            tracing::debug!(fold = self.inner.id, released, "fold disposed");
        }
    }

    /// True once [`dispose`](Fold::dispose) has been called.
    pub fn is_disposed(&self) -> bool {
        self.inner.source.lock().is_none()
    }

    /// Get the number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }
}

impl<T> Observable<T> for Fold<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn get(&self) -> T {
        Fold::get(self)
    }

    fn subscribe<F>(&self, notify: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        Fold::subscribe(self, notify)
    }
}

impl<T> Clone for Fold<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Debug for Fold<T>
where
    T: Clone + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fold")
            .field("id", &self.inner.id)
            .field("value", &*self.inner.value.read())
            .field("version", &self.version())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
