//! Structural change events emitted by a [`ReactiveList`].
//!
//! A [`ListChange`] describes one splice: at `index`, the elements in
//! `removed` were taken out and the elements in `inserted` were put in their
//! place. Replaying every change a list emits, in order, against a mirror
//! that started from the same contents reproduces the list exactly.
//!
//! [`ReactiveList`]: super::ReactiveList

use crate::error::{ListError, Result};

use super::list::ElementKey;

/// What kind of structural operation produced a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Elements were inserted; nothing was removed.
    Insert,
    /// Elements were removed; nothing was inserted.
    Remove,
    /// A range was replaced.
    Replace,
}

/// One structural change of a list.
#[derive(Debug, Clone, PartialEq)]
pub struct ListChange<E> {
    kind: ChangeKind,
    index: usize,
    removed: Vec<E>,
    removed_keys: Vec<ElementKey>,
    inserted: Vec<E>,
    inserted_keys: Vec<ElementKey>,
}

impl<E> ListChange<E> {
    pub(crate) fn new(
        kind: ChangeKind,
        index: usize,
        removed: Vec<(ElementKey, E)>,
        inserted: Vec<(ElementKey, E)>,
    ) -> Self {
        let (removed_keys, removed): (Vec<_>, Vec<_>) = removed.into_iter().unzip();
        let (inserted_keys, inserted): (Vec<_>, Vec<_>) = inserted.into_iter().unzip();
        Self {
            kind,
            index,
            removed,
            removed_keys,
            inserted,
            inserted_keys,
        }
    }

    /// The operation that produced this change.
    #[inline]
    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    /// Position of the first affected element.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Elements taken out, in their former order.
    #[inline]
    pub fn removed(&self) -> &[E] {
        &self.removed
    }

    /// Elements put in, in their new order.
    #[inline]
    pub fn inserted(&self) -> &[E] {
        &self.inserted
    }

    /// Identity keys of the removed elements.
    #[inline]
    pub fn removed_keys(&self) -> &[ElementKey] {
        &self.removed_keys
    }

    /// Identity keys of the inserted elements.
    #[inline]
    pub fn inserted_keys(&self) -> &[ElementKey] {
        &self.inserted_keys
    }

    #[inline]
    pub fn removed_len(&self) -> usize {
        self.removed.len()
    }

    #[inline]
    pub fn inserted_len(&self) -> usize {
        self.inserted.len()
    }

    /// Transform the carried elements, keeping positions and keys.
    pub fn map<U>(&self, mut f: impl FnMut(ElementKey, &E) -> U) -> ListChange<U> {
        ListChange {
            kind: self.kind,
            index: self.index,
            removed: self
                .removed_keys
                .iter()
                .zip(&self.removed)
                .map(|(key, e)| f(*key, e))
                .collect(),
            removed_keys: self.removed_keys.clone(),
            inserted: self
                .inserted_keys
                .iter()
                .zip(&self.inserted)
                .map(|(key, e)| f(*key, e))
                .collect(),
            inserted_keys: self.inserted_keys.clone(),
        }
    }
}

impl<E: Clone> ListChange<E> {
    /// Replay this change on `mirror`.
    ///
    /// Fails without touching `mirror` if the removed range does not fit.
    pub fn apply_to(&self, mirror: &mut Vec<E>) -> Result<()> {
        let end = self
            .index
            .checked_add(self.removed.len())
            .filter(|end| *end <= mirror.len())
            .ok_or(ListError::OutOfRange {
                start: self.index,
                count: self.removed.len(),
                len: mirror.len(),
            })?;
        mirror.splice(self.index..end, self.inserted.iter().cloned());
        Ok(())
    }
}
