//! Typed error hierarchy for boardsync.
//!
//! Three top-level enums cover the three subsystems:
//! - `DragError`: drag session controller misuse and invalid drops
//! - `CommitError`: failures of the order-change request
//! - `BoardError`: server-side validation of board mutations

use boardsync_common::{NodeKind, ReorderError};
use thiserror::Error;

/// Errors from the drag session controller.
#[derive(Debug, Error, PartialEq)]
pub enum DragError {
    #[error("No drag in progress")]
    NotDragging,

    #[error("A drag is already in progress for {uid}")]
    AlreadyDragging { uid: String },

    #[error("Previous drop is still being committed")]
    CommitInFlight,

    #[error("Item {uid} is not in any registered container")]
    UnknownItem { uid: String },

    #[error("Container {id} is not registered")]
    UnknownContainer { id: String },

    #[error(transparent)]
    Reorder(#[from] ReorderError),
}

/// Why an order-change request did not persist.
///
/// Both variants recover the same way (exact local revert); they differ only
/// in what the user is told.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CommitError {
    #[error("Server rejected the change ({status}): {reason}")]
    Rejected { status: u16, reason: String },

    #[error("Could not reach the server: {0}")]
    Transport(String),
}

/// Validation failures of server-side board mutations.
#[derive(Debug, Error, PartialEq)]
pub enum BoardError {
    #[error("Node {uid} not found")]
    NodeNotFound { uid: String },

    #[error("Container {uid} not found")]
    ContainerNotFound { uid: String },

    #[error("Node {uid} cannot be reordered")]
    NotOrderable { uid: String },

    #[error("A {item} cannot be placed in a {container}")]
    KindMismatch { item: NodeKind, container: NodeKind },

    #[error("Invalid node kind: {0}")]
    InvalidKind(String),

    #[error(transparent)]
    Reorder(#[from] ReorderError),
}

impl BoardError {
    /// `true` for errors that mean "the thing you asked about does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NodeNotFound { .. } | Self::ContainerNotFound { .. })
    }
}
