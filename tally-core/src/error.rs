//! Error types for the reactive core and the score sheet.

use thiserror::Error;

/// Errors raised by structural operations on a [`ReactiveList`].
///
/// Every failing operation leaves the list exactly as it was.
///
/// [`ReactiveList`]: crate::reactive::ReactiveList
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListError {
    #[error("range out of bounds: start {start}, count {count}, length {len}")]
    OutOfRange {
        start: usize,
        count: usize,
        len: usize,
    },

    #[error("element is no longer in the list")]
    Detached,
}

/// Result type for list operations.
pub type Result<T> = std::result::Result<T, ListError>;

/// Errors raised while setting up a score sheet.
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("invalid sheet config: {0}")]
    Config(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_message_names_the_range() {
        let err = ListError::OutOfRange {
            start: 5,
            count: 1,
            len: 2,
        };
        assert_eq!(
            err.to_string(),
            "range out of bounds: start 5, count 1, length 2"
        );
    }

    #[test]
    fn config_error_wraps_json_error() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = SheetError::from(json_err);
        assert!(err.to_string().starts_with("invalid sheet config:"));
    }
}
