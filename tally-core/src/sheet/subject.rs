//! Subject rows and score parsing.

use serde::{Deserialize, Serialize};

use crate::reactive::IndexHandle;

/// One "subject/score" record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    pub score: f64,
}

impl Subject {
    pub fn new(name: impl Into<String>, score: f64) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// A rendered table row: display cells plus a handle for the delete action.
#[derive(Debug, Clone)]
pub struct SubjectRow {
    pub name: String,
    pub score: String,
    pub handle: IndexHandle<Subject>,
}

impl SubjectRow {
    pub(crate) fn render(subject: &Subject, handle: IndexHandle<Subject>) -> Self {
        Self {
            name: subject.name.clone(),
            score: subject.score.to_string(),
            handle,
        }
    }
}

/// Parse the score input the way a number field hands it over.
///
/// Leading whitespace is skipped, an optional sign is accepted, and the
/// longest run of decimal digits that follows is the value. Anything after
/// the digits is ignored. Input without digits yields `NaN`, which the sheet
/// stores as-is.
pub fn parse_score(text: &str) -> f64 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let mut value: Option<f64> = None;
    for byte in digits.bytes().take_while(u8::is_ascii_digit) {
        let digit = f64::from(byte - b'0');
        value = Some(value.unwrap_or(0.0) * 10.0 + digit);
    }

    match value {
        Some(v) if negative => -v,
        Some(v) => v,
        None => f64::NAN,
    }
}
