//! Tally Core
//!
//! This crate provides the reactive state core behind the Tally score sheet.
//! It implements:
//!
//! - Observable cells (atoms)
//! - Observable ordered collections with structural change events
//! - Derived values folded over a collection
//! - Bindings that re-render one output region per source
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: Core reactive primitives and subscription plumbing
//! - `sheet`: The headless form model built on those primitives
//! - `error`: Error types
//!
//! # Example
//!
//! ```rust
//! use tally_core::reactive::{Atom, Binding, ReactiveList};
//!
//! // A list of scores and its running total
//! let scores = ReactiveList::new(vec![100, 90]);
//! let total = scores.fold(0, |sum, s| sum + s);
//!
//! // Re-render the label whenever the total changes
//! let _label = Binding::new(&total, |t: &i32| println!("Total Score: {t}"));
//!
//! scores.append(80);
//! // Binding runs, prints: "Total Score: 270"
//! assert_eq!(total.get(), 270);
//!
//! let name = Atom::new(String::new());
//! name.set("Ada".to_string());
//! assert_eq!(name.get(), "Ada");
//! ```

pub mod error;
pub mod reactive;
pub mod sheet;

pub use error::{ListError, Result, SheetError};
