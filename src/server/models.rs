use boardsync_common::{ContainerOrder, Node, NodeKind, OrderChangedEvent, Topic};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardView {
    pub board: Node,
    pub columns: Vec<ColumnView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnView {
    pub column: Node,
    pub cards: Vec<Node>,
}

// ── Request payload types ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBoardRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateNodeRequest {
    pub kind: NodeKind,
    pub container_uid: String,
    #[serde(default)]
    pub title: String,
}

// ── Mutation results ──────────────────────────────────────────────────

/// A committed reorder: the canonical event plus where to publish it.
#[derive(Debug, Clone)]
pub struct MoveOutcome {
    pub node: Node,
    pub event: OrderChangedEvent,
    pub topics: Vec<Topic>,
}

#[derive(Debug, Clone)]
pub struct CreateOutcome {
    pub node: Node,
    pub topic: Topic,
}

#[derive(Debug, Clone)]
pub struct DeleteOutcome {
    pub node: Node,
    /// Remaining siblings, renumbered. `None` for boards.
    pub container: Option<ContainerOrder>,
    pub topic: Option<Topic>,
}
