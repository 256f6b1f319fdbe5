//! Reactive Primitives
//!
//! This module implements the reactive core: atoms, lists, folds, and the
//! subscription plumbing that connects them to the render layer.
//!
//! # Concepts
//!
//! ## Atoms
//!
//! An Atom is a single mutable cell. Every write notifies the atom's
//! subscribers with the new value.
//!
//! ## Reactive Lists
//!
//! A ReactiveList is an ordered collection whose mutations are all splices.
//! Each splice is reported as a [`ListChange`] carrying the position, the
//! removed elements, and the inserted elements.
//!
//! ## Folds
//!
//! A Fold is a derived value equal to a left-to-right reduce over a list. It
//! re-folds the whole list on every structural change.
//!
//! ## Bindings
//!
//! A Binding attaches a render callback to one source and runs it on every
//! notification from that source only.
//!
//! # Implementation Notes
//!
//! Dependencies are explicit. Every observable owns an ordered registry of
//! callbacks, and derived values subscribe to their source directly. There
//! is no ambient tracking context: what depends on what is decided when a
//! subscription is made, and notification order is subscription order.
//!
//! Notification is synchronous. A mutation returns only after every
//! subscriber, transitively, has run.

mod atom;
mod binding;
mod change;
mod fold;
mod list;
mod mapped;
mod subscriber;

pub use atom::Atom;
pub use binding::Binding;
pub use change::{ChangeKind, ListChange};
pub use fold::Fold;
pub use list::{ElementKey, IndexHandle, ReactiveList};
pub use mapped::MappedList;
pub use subscriber::{Observable, SubscriberId, Subscribers, Subscription};
