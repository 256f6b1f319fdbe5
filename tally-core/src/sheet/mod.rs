//! Score Sheet
//!
//! The headless model behind the one-screen form: a name, a table of
//! subject/score rows that can be added and deleted, and a live count and
//! sum of the scores. Rendering is left to whoever binds to these values.
//!
//! # Wiring
//!
//! - `name`, `subject_name` and `score_input` are atoms the text inputs read
//!   and write.
//! - `subjects` is the table's list; `rows()` is its live row view.
//! - `subject_count` and `total_score` are folds over `subjects`.

mod config;
mod subject;

pub use config::SheetConfig;
pub use subject::{parse_score, Subject, SubjectRow};

use crate::error::Result;
use crate::reactive::{Atom, Fold, IndexHandle, MappedList, ReactiveList};

/// Form state for the score sheet.
#[derive(Debug, Clone)]
pub struct ScoreSheet {
    name: Atom<String>,
    subject_name: Atom<String>,
    score_input: Atom<String>,
    subjects: ReactiveList<Subject>,
    subject_count: Fold<usize>,
    total_score: Fold<f64>,
    default_score: String,
}

impl ScoreSheet {
    /// Build a sheet from `config`.
    pub fn new(config: SheetConfig) -> Self {
        let subjects = ReactiveList::new(config.subjects);
        let subject_count = subjects.length();
        let total_score = subjects.fold(0.0, |sum, subject: &Subject| sum + subject.score);

        tracing::debug!(rows = subjects.len(), "score sheet created");

        Self {
            name: Atom::new(String::new()),
            subject_name: Atom::new(String::new()),
            score_input: Atom::new(config.default_score.clone()),
            subjects,
            subject_count,
            total_score,
            default_score: config.default_score,
        }
    }

    /// The user's name input.
    pub fn name(&self) -> &Atom<String> {
        &self.name
    }

    /// The subject name input.
    pub fn subject_name(&self) -> &Atom<String> {
        &self.subject_name
    }

    /// The raw score input text.
    pub fn score_input(&self) -> &Atom<String> {
        &self.score_input
    }

    pub fn subjects(&self) -> &ReactiveList<Subject> {
        &self.subjects
    }

    /// Number of rows, kept up to date.
    pub fn subject_count(&self) -> &Fold<usize> {
        &self.subject_count
    }

    /// Sum of all scores in row order, kept up to date.
    pub fn total_score(&self) -> &Fold<f64> {
        &self.total_score
    }

    /// Heading text.
    pub fn greeting(&self) -> String {
        self.name.with(|name| format!("Hello {name}"))
    }

    pub fn subject_count_label(&self) -> String {
        format!("Total Subjects: {}", self.subject_count.get())
    }

    pub fn total_score_label(&self) -> String {
        format!("Total Score: {}", self.total_score.get())
    }

    /// Live table rows.
    pub fn rows(&self) -> MappedList<Subject, SubjectRow> {
        self.subjects.map(SubjectRow::render)
    }

    /// Submit action: append the entered subject and reset the inputs.
    ///
    /// The score text is parsed with [`parse_score`]; unparsable input is
    /// stored as `NaN`.
    pub fn add_subject(&self) {
        let subject = Subject::new(self.subject_name.get(), parse_score(&self.score_input.get()));
        tracing::debug!(name = %subject.name, score = subject.score, "adding subject");

        self.subjects.append(subject);
        self.subject_name.set(String::new());
        self.score_input.set(self.default_score.clone());
    }

    /// Delete action for the row behind `handle`, wherever it is now.
    pub fn delete(&self, handle: &IndexHandle<Subject>) -> Result<Subject> {
        let removed = handle.remove()?;
        tracing::debug!(name = %removed.name, "deleted subject");
        Ok(removed)
    }
}

impl Default for ScoreSheet {
    fn default() -> Self {
        Self::new(SheetConfig::default())
    }
}
