//! Realtime wire protocol.
//!
//! Every socket message is a variant of a closed, adjacently tagged enum
//! (`{"type": ..., "data": ...}`), so handlers dispatch exhaustively on a
//! statically known payload shape.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{Node, NodeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicKind {
    Board,
    Card,
    Wiki,
}

impl TopicKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Board => "board",
            Self::Card => "card",
            Self::Wiki => "wiki",
        }
    }
}

/// Fan-out address: a resource type plus the instance id.
/// Subscribers of the same topic receive each other's published events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Topic {
    pub kind: TopicKind,
    pub id: String,
}

impl Topic {
    pub fn new(kind: TopicKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn board(id: impl Into<String>) -> Self {
        Self::new(TopicKind::Board, id)
    }

    pub fn card(id: impl Into<String>) -> Self {
        Self::new(TopicKind::Card, id)
    }

    pub fn wiki(id: impl Into<String>) -> Self {
        Self::new(TopicKind::Wiki, id)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.id)
    }
}

/// Request to place an item at `target_index` of `to_container_uid`.
///
/// `from_container_uid` is informational; the server looks the current
/// container up itself and bounds-checks against the live container size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderIntent {
    pub item_uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_container_uid: Option<String>,
    pub to_container_uid: String,
    pub target_index: usize,
}

impl ReorderIntent {
    pub fn is_cross_container(&self) -> bool {
        self.from_container_uid
            .as_deref()
            .is_some_and(|from| from != self.to_container_uid)
    }
}

/// Canonical order of one container after a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerOrder {
    pub container_uid: String,
    pub item_uids: Vec<String>,
}

/// Authoritative result of a reorder, broadcast to every subscriber.
///
/// Receivers apply it as an absolute placement (`container_uid`, `order`)
/// followed by alignment to `containers`, never as a delta, so applying the
/// same event twice is harmless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderChangedEvent {
    pub item_uid: String,
    pub kind: NodeKind,
    pub from_container_uid: String,
    pub container_uid: String,
    pub order: u32,
    #[serde(default)]
    pub containers: Vec<ContainerOrder>,
}

impl OrderChangedEvent {
    pub fn is_cross_container(&self) -> bool {
        self.from_container_uid != self.container_uid
    }
}

// ── Client → server ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    Subscribe {
        topic: Topic,
    },
    Unsubscribe {
        topic: Topic,
    },
    Reorder {
        #[serde(default)]
        request_id: Option<String>,
        intent: ReorderIntent,
    },
    Ping,
}

// ── Server → client ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum WsMessage {
    Subscribed {
        topic: Topic,
    },
    Unsubscribed {
        topic: Topic,
    },

    // One order-changed event per orderable kind
    ColumnOrderChanged(OrderChangedEvent),
    CardOrderChanged(OrderChangedEvent),
    ChecklistOrderChanged(OrderChangedEvent),
    CheckitemOrderChanged(OrderChangedEvent),
    AttachmentOrderChanged(OrderChangedEvent),
    WikiOrderChanged(OrderChangedEvent),
    WikiTabOrderChanged(OrderChangedEvent),

    ItemCreated {
        node: Node,
    },
    ItemDeleted {
        uid: String,
        kind: NodeKind,
        container: ContainerOrder,
    },

    // Replies to a socket-issued reorder
    ReorderAccepted {
        request_id: Option<String>,
        item_uid: String,
        container_uid: String,
        order: u32,
    },
    ReorderRejected {
        request_id: Option<String>,
        item_uid: String,
        reason: String,
    },

    /// The subscriber lagged behind and missed events; refetch the topic.
    ResyncRequired {
        topic: Topic,
    },
    Pong,
    Error {
        message: String,
    },
}

impl WsMessage {
    /// Wrap an order change in the variant named for its kind.
    /// Boards are not orderable and yield `None`.
    pub fn order_changed(event: OrderChangedEvent) -> Option<Self> {
        let msg = match event.kind {
            NodeKind::Board => return None,
            NodeKind::Column => Self::ColumnOrderChanged(event),
            NodeKind::Card => Self::CardOrderChanged(event),
            NodeKind::Checklist => Self::ChecklistOrderChanged(event),
            NodeKind::Checkitem => Self::CheckitemOrderChanged(event),
            NodeKind::Attachment => Self::AttachmentOrderChanged(event),
            NodeKind::Wiki => Self::WikiOrderChanged(event),
            NodeKind::WikiTab => Self::WikiTabOrderChanged(event),
        };
        Some(msg)
    }

    pub fn as_order_changed(&self) -> Option<&OrderChangedEvent> {
        match self {
            Self::ColumnOrderChanged(e)
            | Self::CardOrderChanged(e)
            | Self::ChecklistOrderChanged(e)
            | Self::CheckitemOrderChanged(e)
            | Self::AttachmentOrderChanged(e)
            | Self::WikiOrderChanged(e)
            | Self::WikiTabOrderChanged(e) => Some(e),
            _ => None,
        }
    }

    /// The wire tag of this message.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Subscribed { .. } => "Subscribed",
            Self::Unsubscribed { .. } => "Unsubscribed",
            Self::ColumnOrderChanged(_) => "ColumnOrderChanged",
            Self::CardOrderChanged(_) => "CardOrderChanged",
            Self::ChecklistOrderChanged(_) => "ChecklistOrderChanged",
            Self::CheckitemOrderChanged(_) => "CheckitemOrderChanged",
            Self::AttachmentOrderChanged(_) => "AttachmentOrderChanged",
            Self::WikiOrderChanged(_) => "WikiOrderChanged",
            Self::WikiTabOrderChanged(_) => "WikiTabOrderChanged",
            Self::ItemCreated { .. } => "ItemCreated",
            Self::ItemDeleted { .. } => "ItemDeleted",
            Self::ReorderAccepted { .. } => "ReorderAccepted",
            Self::ReorderRejected { .. } => "ReorderRejected",
            Self::ResyncRequired { .. } => "ResyncRequired",
            Self::Pong => "Pong",
            Self::Error { .. } => "Error",
        }
    }
}
