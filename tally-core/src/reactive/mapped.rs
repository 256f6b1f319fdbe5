//! Live transformed view of a [`ReactiveList`].
//!
//! A [`MappedList`] stores no elements of its own. Iterating it re-reads the
//! source and applies the transform, so it can be iterated any number of
//! times and always reflects the current contents. Subscribing to it yields
//! the source's structural changes with the transform applied to the
//! elements they carry, which is what a row renderer needs to patch only
//! the affected rows.

use std::sync::Arc;

use super::change::{ChangeKind, ListChange};
use super::list::{IndexHandle, ReactiveList};
use super::subscriber::Subscription;

type Transform<E, U> = Arc<dyn Fn(&E, IndexHandle<E>) -> U + Send + Sync>;

/// Order-preserving view of a list through `transform`.
///
/// Each element is passed to the transform together with an
/// [`IndexHandle`] that resolves to the element's position when used.
pub struct MappedList<E, U>
where
    E: Clone + Send + Sync + 'static,
{
    source: ReactiveList<E>,
    transform: Transform<E, U>,
}

impl<E, U> MappedList<E, U>
where
    E: Clone + Send + Sync + 'static,
    U: Send + 'static,
{
    pub(crate) fn new<F>(source: ReactiveList<E>, transform: F) -> Self
    where
        F: Fn(&E, IndexHandle<E>) -> U + Send + Sync + 'static,
    {
        Self {
            source,
            transform: Arc::new(transform),
        }
    }

    /// The underlying list.
    pub fn source(&self) -> &ReactiveList<E> {
        &self.source
    }

    /// Transformed elements of the source as it is now.
    ///
    /// The contents are read once up front; `transform` runs as each item is
    /// pulled.
    pub fn iter(&self) -> impl Iterator<Item = U> + '_ {
        let list = self.source.downgrade();
        self.source
            .entries()
            .into_iter()
            .map(move |(key, value)| (self.transform)(&value, IndexHandle::new(list.clone(), key)))
    }

    pub fn to_vec(&self) -> Vec<U> {
        self.iter().collect()
    }

    /// Transformed element at `index`.
    pub fn get(&self, index: usize) -> Option<U> {
        let handle = self.source.handle(index)?;
        let value = handle.get()?;
        Some((self.transform)(&value, handle))
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Register a callback invoked with each source change, transformed.
    ///
    /// The callback holds only a weak reference to the source.
    pub fn subscribe<F>(&self, notify: F) -> Subscription
    where
        F: Fn(&ListChange<U>) + Send + Sync + 'static,
    {
        let list = self.source.downgrade();
        let transform = Arc::clone(&self.transform);
        self.source.subscribe(move |change| {
            let mapped = change.map(|key, value| transform(value, IndexHandle::new(list.clone(), key)));
            notify(&mapped);
        })
    }

    /// The whole current view as a single insertion at index 0.
    ///
    /// Replaying it on an empty mirror yields [`to_vec`](MappedList::to_vec).
    pub fn snapshot(&self) -> ListChange<U> {
        let list = self.source.downgrade();
        let inserted = self
            .source
            .entries()
            .into_iter()
            .map(|(key, value)| (key, (self.transform)(&value, IndexHandle::new(list.clone(), key))))
            .collect();
        ListChange::new(ChangeKind::Insert, 0, Vec::new(), inserted)
    }
}

impl<E, U> Clone for MappedList<E, U>
where
    E: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            transform: Arc::clone(&self.transform),
        }
    }
}

impl<E, U> std::fmt::Debug for MappedList<E, U>
where
    E: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedList")
            .field("source", &self.source.id())
            .field("len", &self.source.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn view_is_restartable_and_live() {
        let list = ReactiveList::new(vec![1, 2]);
        let doubled = list.map(|v, _| v * 2);

        assert_eq!(doubled.iter().collect::<Vec<_>>(), vec![2, 4]);
        assert_eq!(doubled.iter().collect::<Vec<_>>(), vec![2, 4]);

        list.append(3);
        assert_eq!(doubled.to_vec(), vec![2, 4, 6]);
        assert_eq!(doubled.len(), 3);
        assert_eq!(doubled.get(2), Some(6));
    }

    #[test]
    fn iter_transforms_on_demand() {
        let list = ReactiveList::new(vec![1, 2, 3]);
        let calls = Arc::new(Mutex::new(0));
        let calls_clone = calls.clone();
        let view = list.map(move |v, _| {
            *calls_clone.lock() += 1;
            *v
        });

        let first = view.iter().next();
        assert_eq!(first, Some(1));
        assert_eq!(*calls.lock(), 1);
    }

    #[test]
    fn handles_resolve_at_use_time() {
        let list = ReactiveList::new(vec!["a", "b", "c"]);
        let rows = list.map(|v, handle| (v.to_string(), handle));

        let rendered = rows.to_vec();
        list.remove_range(0, 1).unwrap();

        let (label, handle) = &rendered[2];
        assert_eq!(label, "c");
        assert_eq!(handle.resolve(), Some(1));
        assert_eq!(rendered[0].1.resolve(), None);
    }

    #[test]
    fn subscribe_emits_transformed_changes() {
        let list = ReactiveList::new(vec![1]);
        let labels = list.map(|v, _| format!("#{v}"));
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();

        let _sub = labels.subscribe(move |change| log_clone.lock().push(change.clone()));

        list.append(2);
        list.remove_range(0, 1).unwrap();

        let log = log.lock();
        assert_eq!(log[0].inserted(), &["#2".to_string()]);
        assert_eq!(log[0].index(), 1);
        assert_eq!(log[1].removed(), &["#1".to_string()]);
        assert_eq!(log[1].kind(), ChangeKind::Remove);
    }

    #[test]
    fn replaying_snapshot_and_changes_matches_view() {
        let list = ReactiveList::new(vec![1, 2, 3]);
        let view = list.map(|v, _| v + 100);
        let mirror = Arc::new(Mutex::new(Vec::new()));

        view.snapshot().apply_to(&mut mirror.lock()).unwrap();
        let mirror_clone = mirror.clone();
        let _sub = view.subscribe(move |change| {
            change.apply_to(&mut mirror_clone.lock()).unwrap();
        });

        list.splice(1, 1, vec![7, 8]).unwrap();
        list.append(9);

        assert_eq!(*mirror.lock(), view.to_vec());
    }

    #[test]
    fn subscription_does_not_keep_source_alive() {
        let list = ReactiveList::new(vec![1]);
        let view = list.map(|v, _| *v);
        let handle = list.handle(0).unwrap();
        let _sub = view.subscribe(|_| {});

        drop(view);
        drop(list);
        assert!(handle.list().is_none());
    }
}
