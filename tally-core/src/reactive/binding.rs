//! Binding Implementation
//!
//! A Binding ties one output region to one source. It is the seam between
//! the reactive core and whatever draws the screen.
//!
//! # How Bindings Work
//!
//! 1. When created, the binding renders once with the source's current state.
//!
//! 2. It then subscribes to the source and renders again on every
//!    notification. Nothing else triggers it, so a binding re-renders only
//!    when its own source changes.
//!
//! 3. After [`Binding::dispose`], or once the last clone of a binding is
//!    dropped, the binding unsubscribes and never renders again.
//!
//! # Sources
//!
//! - [`Binding::new`] binds any [`Observable`] (an atom or a fold) and hands
//!   the renderer the full value.
//! - [`Binding::list`] binds a [`MappedList`] and hands the renderer row-level
//!   changes. The first render is the whole view as one insertion.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::change::ListChange;
use super::mapped::MappedList;
use super::subscriber::{Observable, Subscription};

/// Counter for generating unique binding IDs.
static BINDING_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a new unique binding ID.
fn next_binding_id() -> u64 {
    BINDING_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

struct BindingInner {
    /// Unique identifier for this binding.
    id: u64,

    /// Whether the binding has been disposed.
    disposed: AtomicBool,

    /// Number of times the renderer has run.
    run_count: AtomicUsize,

    /// Subscription on the source; `None` once disposed.
    subscription: Mutex<Option<Subscription>>,
}

impl BindingInner {
    fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        let subscription = self.subscription.lock().take();
        if let Some(subscription) = subscription {
            subscription.unsubscribe();
            tracing::trace!(binding = self.id, "binding disposed");
        }
    }

    fn rendered(&self) {
        self.run_count.fetch_add(1, Ordering::SeqCst);
    }
}

impl Drop for BindingInner {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// A render callback attached to one source.
///
/// The source only holds a weak reference to the binding, so the binding
/// lives exactly as long as its handles.
///
/// # Example
///
/// ```rust
/// use tally_core::reactive::{Atom, Binding};
///
/// let name = Atom::new(String::from("world"));
/// let binding = Binding::new(&name, |v: &String| println!("Hello {v}"));
///
/// name.set("Ada".to_string()); // Prints: "Hello Ada"
/// assert_eq!(binding.run_count(), 2);
/// ```
#[must_use = "dropping a Binding disposes it"]
pub struct Binding {
    inner: Arc<BindingInner>,
}

impl Binding {
    /// Bind `render` to an atom or fold.
    pub fn new<T, S, F>(source: &S, render: F) -> Self
    where
        S: Observable<T>,
        F: Fn(&T) + Send + Sync + 'static,
    {
        let binding = Self::detached();

        render(&source.get());
        binding.inner.rendered();

        let weak = Arc::downgrade(&binding.inner);
        let subscription = source.subscribe(move |value| {
            if let Some(inner) = live(&weak) {
                render(value);
                inner.rendered();
            }
        });
        *binding.inner.subscription.lock() = Some(subscription);

        tracing::trace!(binding = binding.inner.id, "value binding created");
        binding
    }

    /// Bind `render` to the rows of a mapped list.
    pub fn list<E, U, F>(rows: &MappedList<E, U>, render: F) -> Self
    where
        E: Clone + Send + Sync + 'static,
        U: Send + 'static,
        F: Fn(&ListChange<U>) + Send + Sync + 'static,
    {
        let binding = Self::detached();

        render(&rows.snapshot());
        binding.inner.rendered();

        let weak = Arc::downgrade(&binding.inner);
        let subscription = rows.subscribe(move |change| {
            if let Some(inner) = live(&weak) {
                render(change);
                inner.rendered();
            }
        });
        *binding.inner.subscription.lock() = Some(subscription);

        tracing::trace!(binding = binding.inner.id, "list binding created");
        binding
    }

    fn detached() -> Self {
        Self {
            inner: Arc::new(BindingInner {
                id: next_binding_id(),
                disposed: AtomicBool::new(false),
                run_count: AtomicUsize::new(0),
                subscription: Mutex::new(None),
            }),
        }
    }

    /// Get the binding's unique ID.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Dispose of the binding.
    ///
    /// After disposal, the renderer will not run again.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    /// Check if the binding has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    /// Get the number of times the renderer has run.
    pub fn run_count(&self) -> usize {
        self.inner.run_count.load(Ordering::SeqCst)
    }
}

/// The binding behind `weak`, unless it is gone or disposed.
fn live(weak: &Weak<BindingInner>) -> Option<Arc<BindingInner>> {
    weak.upgrade()
        .filter(|inner| !inner.disposed.load(Ordering::SeqCst))
}

impl Clone for Binding {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("id", &self.inner.id)
            .field("run_count", &self.run_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
