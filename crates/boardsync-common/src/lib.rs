//! Shared domain types for boardsync.
//!
//! Both the board server and the drag/sync client depend on this crate so the
//! reorder engine and the realtime wire format have exactly one definition.
//!
//! | Module     | Responsibility                                          |
//! |------------|---------------------------------------------------------|
//! | `model`    | `Orderable` trait, `OrderedItem`, `Node`, `NodeKind`    |
//! | `order`    | Pure reorder engine (`reorder`, `move_across_containers`) |
//! | `protocol` | `Topic`, `ReorderIntent`, `OrderChangedEvent`, socket messages |
//! | `error`    | `ReorderError`                                          |

pub mod error;
pub mod model;
pub mod order;
pub mod protocol;

pub use error::ReorderError;
pub use model::{Node, NodeKind, Orderable, OrderedItem};
pub use protocol::{
    ClientMessage, ContainerOrder, OrderChangedEvent, ReorderIntent, Topic, TopicKind, WsMessage,
};
