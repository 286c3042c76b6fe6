use thiserror::Error;

use super::types::DataType;

/// Failures that escape an extractor.
///
/// Everything else (a malformed row, an unparseable code, a value that will
/// not convert) is absorbed where it happens and reported as an event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// The frame gate says this context holds `data_type` markup, but the
    /// container the extractor needs is not there
    #[error("{data_type} markup is present but `{container}` was not found")]
    MissingContainer {
        data_type: DataType,
        container: String,
    },
}
