use thiserror::Error;

/// Precondition violations of the reorder engine.
///
/// These are programming errors, not user-facing conditions: callers must
/// pass indices that are valid for the lists they hold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReorderError {
    #[error("Index {index} out of range for container of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Item {uid} not found in source container")]
    ItemNotFound { uid: String },

    #[error("Source and destination are the same container ({container_id}); use reorder")]
    SameContainer { container_id: String },
}
