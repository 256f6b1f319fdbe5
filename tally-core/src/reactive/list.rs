//! Reactive List Implementation
//!
//! A ReactiveList is an ordered collection that reports every structural
//! change to its subscribers as a [`ListChange`].
//!
//! # How Lists Work
//!
//! 1. All mutations are splices: `append`, `insert`, `remove_range` and
//!    `splice` each replace one contiguous range with new elements.
//!
//! 2. A splice is validated first. An invalid range is rejected with
//!    [`ListError::OutOfRange`] and the list is left untouched.
//!
//! 3. A valid splice is applied under the write lock, the lock is released,
//!    and then one change is emitted before the call returns.
//!
//! # Element Identity
//!
//! Every element is stored with an [`ElementKey`] assigned when it enters
//! the list. An [`IndexHandle`] remembers only the key, so it resolves to the
//! element's position at the time it is used, not when it was created.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::error::{ListError, Result};

use super::change::{ChangeKind, ListChange};
use super::fold::Fold;
use super::mapped::MappedList;
use super::subscriber::{Subscribers, Subscription};

/// Counter for generating unique list IDs.
static LIST_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a new unique list ID.
fn next_list_id() -> u64 {
    LIST_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Identity of one element for as long as it stays in its list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementKey(u64);

impl ElementKey {
    /// Generate a new unique element key.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ElementKey {
    fn default() -> Self {
        Self::new()
    }
}

struct Slot<E> {
    key: ElementKey,
    value: E,
}

impl<E> Slot<E> {
    fn new(value: E) -> Self {
        Self {
            key: ElementKey::new(),
            value,
        }
    }
}

pub(crate) struct ListInner<E> {
    id: u64,
    slots: RwLock<Vec<Slot<E>>>,
    subscribers: Subscribers<ListChange<E>>,
}

impl<E> ListInner<E> {
    fn position_of(&self, key: ElementKey) -> Option<usize> {
        self.slots.read().iter().position(|slot| slot.key == key)
    }
}

/// An observable ordered collection.
///
/// Cloning a list gives another handle to the same elements.
///
/// # Example
///
/// ```rust
/// use tally_core::reactive::ReactiveList;
///
/// let scores = ReactiveList::new(vec![100, 90]);
/// let total = scores.fold(0, |sum, score| sum + score);
///
/// scores.append(80);
/// assert_eq!(total.get(), 270);
///
/// scores.remove_range(1, 1).unwrap();
/// assert_eq!(total.get(), 180);
/// ```
pub struct ReactiveList<E>
where
    E: Clone + Send + Sync + 'static,
{
    inner: Arc<ListInner<E>>,
}

impl<E> ReactiveList<E>
where
    E: Clone + Send + Sync + 'static,
{
    /// Create a list holding `items` in order.
    pub fn new(items: Vec<E>) -> Self {
        Self {
            inner: Arc::new(ListInner {
                id: next_list_id(),
                slots: RwLock::new(items.into_iter().map(Slot::new).collect()),
                subscribers: Subscribers::new(),
            }),
        }
    }

    /// Get the list's unique ID.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.inner.slots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.slots.read().is_empty()
    }

    /// Element at `index`, if any.
    pub fn get(&self, index: usize) -> Option<E> {
        self.inner
            .slots
            .read()
            .get(index)
            .map(|slot| slot.value.clone())
    }

    /// Copy of the current contents.
    pub fn to_vec(&self) -> Vec<E> {
        self.inner
            .slots
            .read()
            .iter()
            .map(|slot| slot.value.clone())
            .collect()
    }

    /// Left-to-right fold over the current contents.
    ///
    /// `combine` runs under the read lock; it must not mutate this list.
    pub fn reduce<T, F>(&self, seed: T, mut combine: F) -> T
    where
        F: FnMut(T, &E) -> T,
    {
        self.inner
            .slots
            .read()
            .iter()
            .fold(seed, |acc, slot| combine(acc, &slot.value))
    }

    /// Insert `value` at the end.
    pub fn append(&self, value: E) {
        let change = {
            let mut slots = self.inner.slots.write();
            let end = slots.len();
            splice_slots(&mut slots, ChangeKind::Insert, end..end, vec![value])
        };
        self.publish(change);
    }

    /// Insert `value` so that it ends up at `index`.
    pub fn insert(&self, index: usize, value: E) -> Result<()> {
        self.apply(ChangeKind::Insert, index, 0, vec![value])
            .map(|_| ())
    }

    /// Remove `count` elements starting at `start` and return them.
    ///
    /// Fails with [`ListError::OutOfRange`] if `start + count > len`.
    pub fn remove_range(&self, start: usize, count: usize) -> Result<Vec<E>> {
        self.apply(ChangeKind::Remove, start, count, Vec::new())
    }

    /// Replace `count` elements starting at `start` with `items`.
    ///
    /// Returns the removed elements.
    pub fn splice(&self, start: usize, count: usize, items: Vec<E>) -> Result<Vec<E>> {
        let kind = if count == 0 && !items.is_empty() {
            ChangeKind::Insert
        } else if count > 0 && items.is_empty() {
            ChangeKind::Remove
        } else {
            ChangeKind::Replace
        };
        self.apply(kind, start, count, items)
    }

    fn apply(
        &self,
        kind: ChangeKind,
        start: usize,
        count: usize,
        items: Vec<E>,
    ) -> Result<Vec<E>> {
        let change = {
            let mut slots = self.inner.slots.write();
            let len = slots.len();
            let end = match start.checked_add(count) {
                Some(end) if end <= len => end,
                _ => {
                    tracing::warn!(list = self.inner.id, start, count, len, "splice out of range");
                    return Err(ListError::OutOfRange { start, count, len });
                }
            };
            splice_slots(&mut slots, kind, start..end, items)
        };

        let removed = change.removed().to_vec();
        self.publish(change);
        Ok(removed)
    }

    /// Log and deliver a change once the write lock is released.
    fn publish(&self, change: ListChange<E>) {
        tracing::debug!(
            list = self.inner.id,
            kind = ?change.kind(),
            index = change.index(),
            removed = change.removed_len(),
            inserted = change.inserted_len(),
            "list spliced"
        );
        self.inner.subscribers.emit(change);
    }

    /// Register a callback invoked with every structural change.
    pub fn subscribe<F>(&self, notify: F) -> Subscription
    where
        F: Fn(&ListChange<E>) + Send + Sync + 'static,
    {
        self.inner.subscribers.subscribe(notify)
    }

    /// Get the number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }

    /// Handle for the element currently at `index`.
    pub fn handle(&self, index: usize) -> Option<IndexHandle<E>> {
        let key = self.inner.slots.read().get(index)?.key;
        Some(IndexHandle::new(Arc::downgrade(&self.inner), key))
    }

    /// Current position of the element with `key`.
    pub fn position_of(&self, key: ElementKey) -> Option<usize> {
        self.inner.position_of(key)
    }

    /// Live transformed view of this list.
    ///
    /// `transform` receives each element with a handle to it.
    pub fn map<U, F>(&self, transform: F) -> MappedList<E, U>
    where
        U: Send + 'static,
        F: Fn(&E, IndexHandle<E>) -> U + Send + Sync + 'static,
    {
        MappedList::new(self.clone(), transform)
    }

    /// Derived value kept equal to `reduce(seed, combine)`.
    pub fn fold<T, F>(&self, seed: T, combine: F) -> Fold<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(T, &E) -> T + Send + Sync + 'static,
    {
        Fold::new(self, seed, combine)
    }

    /// Derived element count.
    pub fn length(&self) -> Fold<usize> {
        self.fold(0, |count, _| count + 1)
    }

    /// Keys and values of the current contents.
    pub(crate) fn entries(&self) -> Vec<(ElementKey, E)> {
        self.inner
            .slots
            .read()
            .iter()
            .map(|slot| (slot.key, slot.value.clone()))
            .collect()
    }

    pub(crate) fn downgrade(&self) -> Weak<ListInner<E>> {
        Arc::downgrade(&self.inner)
    }
}

impl<E> Clone for ReactiveList<E>
where
    E: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> Default for ReactiveList<E>
where
    E: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<E> FromIterator<E> for ReactiveList<E>
where
    E: Clone + Send + Sync + 'static,
{
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<E> Debug for ReactiveList<E>
where
    E: Clone + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactiveList")
            .field("id", &self.inner.id)
            .field("items", &self.to_vec())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

/// Replace `range` of `slots` with fresh slots for `items`.
///
/// `range` must already be within bounds.
fn splice_slots<E: Clone>(
    slots: &mut Vec<Slot<E>>,
    kind: ChangeKind,
    range: std::ops::Range<usize>,
    items: Vec<E>,
) -> ListChange<E> {
    let start = range.start;
    let inserted: Vec<Slot<E>> = items.into_iter().map(Slot::new).collect();
    let inserted_pairs = inserted
        .iter()
        .map(|slot| (slot.key, slot.value.clone()))
        .collect();
    let removed_pairs = slots
        .splice(range, inserted)
        .map(|slot| (slot.key, slot.value))
        .collect();

    ListChange::new(kind, start, removed_pairs, inserted_pairs)
}

/// Reference to one element that resolves to its current index on use.
///
/// The handle does not keep the list alive. Once the element has been
/// removed, or the list dropped, the handle is detached.
pub struct IndexHandle<E> {
    list: Weak<ListInner<E>>,
    key: ElementKey,
}

impl<E> IndexHandle<E>
where
    E: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(list: Weak<ListInner<E>>, key: ElementKey) -> Self {
        Self { list, key }
    }

    /// The element's identity key.
    pub fn key(&self) -> ElementKey {
        self.key
    }

    /// The element's index right now.
    pub fn resolve(&self) -> Option<usize> {
        self.list.upgrade()?.position_of(self.key)
    }

    /// True while the element is still in its list.
    pub fn is_attached(&self) -> bool {
        self.resolve().is_some()
    }

    /// The element's current value.
    pub fn get(&self) -> Option<E> {
        let list = self.list.upgrade()?;
        let slots = list.slots.read();
        slots
            .iter()
            .find(|slot| slot.key == self.key)
            .map(|slot| slot.value.clone())
    }

    /// The list this handle points into, if it still exists.
    pub fn list(&self) -> Option<ReactiveList<E>> {
        self.list.upgrade().map(|inner| ReactiveList { inner })
    }

    /// Remove the element from wherever it is now.
    ///
    /// Fails with [`ListError::Detached`] if it is no longer in the list.
    pub fn remove(&self) -> Result<E> {
        let list = self.list().ok_or(ListError::Detached)?;
        let index = list.position_of(self.key).ok_or(ListError::Detached)?;
        let mut removed = list.remove_range(index, 1)?;
        removed.pop().ok_or(ListError::Detached)
    }
}

impl<E> Clone for IndexHandle<E> {
    fn clone(&self) -> Self {
        Self {
            list: Weak::clone(&self.list),
            key: self.key,
        }
    }
}

impl<E> Debug for IndexHandle<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexHandle")
            .field("key", &self.key)
            .field("list_alive", &(self.list.strong_count() > 0))
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

    fn recording(list: &ReactiveList<i32>) -> (Arc<Mutex<Vec<ListChange<i32>>>>, Subscription) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();
        let sub = list.subscribe(move |change| log_clone.lock().push(change.clone()));
        (log, sub)
    }

    #[test]
    fn new_list_keeps_order() {
        let list = ReactiveList::new(vec![3, 1, 2]);
        assert_eq!(list.len(), 3);
        assert_eq!(list.to_vec(), vec![3, 1, 2]);
        assert_eq!(list.get(1), Some(1));
        assert_eq!(list.get(3), None);
    }

    #[test]
    fn append_emits_insert_at_old_length() {
        let list = ReactiveList::new(vec![1, 2]);
        let (log, _sub) = recording(&list);

        list.append(3);

        let log = log.lock();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].kind(), ChangeKind::Insert);
        assert_eq!(log[0].index(), 2);
        assert_eq!(log[0].inserted(), &[3]);
        assert_eq!(list.to_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn append_to_empty_list_always_succeeds() {
        let list = ReactiveList::default();
        let (log, _sub) = recording(&list);

        list.append(7);
        list.append(8);

        let log = log.lock();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].index(), 0);
        assert!(log[0].removed().is_empty());
        assert_eq!(log[1].index(), 1);
        assert_eq!(list.to_vec(), vec![7, 8]);
    }

    #[test]
    fn remove_range_emits_remove_and_returns_elements() {
        let list = ReactiveList::new(vec![1, 2, 3, 4]);
        let (log, _sub) = recording(&list);

        let removed = list.remove_range(1, 2).unwrap();

        assert_eq!(removed, vec![2, 3]);
        assert_eq!(list.to_vec(), vec![1, 4]);
        let log = log.lock();
        assert_eq!(log[0].kind(), ChangeKind::Remove);
        assert_eq!(log[0].index(), 1);
        assert_eq!(log[0].removed_len(), 2);
    }

    #[test]
    fn out_of_range_leaves_list_unchanged() {
        let list = ReactiveList::new(vec![1, 2]);
        let (log, _sub) = recording(&list);

        assert_eq!(
            list.remove_range(5, 1),
            Err(ListError::OutOfRange {
                start: 5,
                count: 1,
                len: 2
            })
        );
        assert!(list.remove_range(1, 2).is_err());
        assert!(list.remove_range(usize::MAX, 2).is_err());
        assert!(list.insert(3, 9).is_err());

        assert_eq!(list.to_vec(), vec![1, 2]);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn splice_replaces_range() {
        let list = ReactiveList::new(vec![1, 2, 3]);
        let (log, _sub) = recording(&list);

        let removed = list.splice(0, 2, vec![7, 8, 9]).unwrap();

        assert_eq!(removed, vec![1, 2]);
        assert_eq!(list.to_vec(), vec![7, 8, 9, 3]);
        assert_eq!(log.lock()[0].kind(), ChangeKind::Replace);
    }

    #[test]
    fn splice_kind_follows_extents() {
        let list = ReactiveList::new(vec![1, 2, 3]);
        let (log, _sub) = recording(&list);

        list.splice(0, 0, vec![0]).unwrap();
        list.splice(0, 1, Vec::new()).unwrap();

        let log = log.lock();
        assert_eq!(log[0].kind(), ChangeKind::Insert);
        assert_eq!(log[1].kind(), ChangeKind::Remove);
    }

    #[test]
    fn insert_in_the_middle() {
        let list = ReactiveList::new(vec![1, 3]);
        list.insert(1, 2).unwrap();
        assert_eq!(list.to_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn reduce_folds_left_to_right() {
        let list = ReactiveList::new(vec!["a", "b", "c"]);
        let joined = list.reduce(String::new(), |mut acc, s| {
            acc.push_str(s);
            acc
        });
        assert_eq!(joined, "abc");
    }

    #[test]
    fn handle_follows_element_across_mutations() {
        let list = ReactiveList::new(vec![10, 20, 30]);
        let handle = list.handle(2).unwrap();
        assert_eq!(handle.resolve(), Some(2));

        list.remove_range(0, 1).unwrap();
        assert_eq!(handle.resolve(), Some(1));

        list.insert(0, 5).unwrap();
        list.insert(0, 6).unwrap();
        assert_eq!(handle.resolve(), Some(3));
        assert_eq!(handle.get(), Some(30));
    }

    #[test]
    fn handle_remove_uses_current_position() {
        let list = ReactiveList::new(vec![1, 2, 3]);
        let handle = list.handle(2).unwrap();
        list.remove_range(0, 1).unwrap();

        assert_eq!(handle.remove(), Ok(3));
        assert_eq!(list.to_vec(), vec![2]);
        assert!(!handle.is_attached());
        assert_eq!(handle.remove(), Err(ListError::Detached));
    }

    #[test]
    fn handle_does_not_keep_list_alive() {
        let list = ReactiveList::new(vec![1]);
        let handle = list.handle(0).unwrap();
        drop(list);

        assert_eq!(handle.resolve(), None);
        assert!(handle.list().is_none());
        assert_eq!(handle.remove(), Err(ListError::Detached));
    }

    #[test]
    fn equal_values_have_distinct_identity() {
        let list = ReactiveList::new(vec![7, 7, 7]);
        let last = list.handle(2).unwrap();
        list.remove_range(0, 1).unwrap();
        assert_eq!(last.resolve(), Some(1));
    }

    #[test]
    fn subscriber_mutating_the_list_sees_ordered_events() {
        let list = ReactiveList::new(Vec::new());
        let writer = list.clone();
        let _echo = list.subscribe(move |change: &ListChange<i32>| {
            if change.inserted() == [1] {
                writer.append(2);
            }
        });

        let mirror = Arc::new(Mutex::new(Vec::new()));
        let mirror_clone = mirror.clone();
        let _mirror = list.subscribe(move |change| {
            change.apply_to(&mut mirror_clone.lock()).unwrap();
        });

        list.append(1);

        assert_eq!(list.to_vec(), vec![1, 2]);
        assert_eq!(*mirror.lock(), vec![1, 2]);
    }
}
