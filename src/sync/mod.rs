//! Optimistic commit and realtime reconciliation (client side).
//!
//! A drop is shown immediately, then sent through a [`BoardApi`]. The
//! answer either confirms it (the canonical event is applied and its echo
//! expected) or undoes it exactly. Broadcasts from other clients go through
//! the [`Reconciler`], which treats each event as an absolute correction.

pub mod api;
pub mod commit;
pub mod reconcile;
pub mod session;

pub use api::{BoardApi, HttpBoardApi, MoveNodeRequest};
pub use commit::{CommitOutcome, Notice, NoticeKind, commit_drop, resolve};
pub use reconcile::{ApplyOutcome, Reconciler};
pub use session::BoardSession;
