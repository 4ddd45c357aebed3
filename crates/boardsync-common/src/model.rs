use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A row that lives at a dense, zero-based position inside a container.
///
/// Implemented by every orderable entity: cards in columns, checkitems in
/// checklists, attachments on a card, wiki tabs, and columns on a board.
pub trait Orderable {
    fn uid(&self) -> &str;
    fn container_id(&self) -> &str;
    fn set_container_id(&mut self, container_id: &str);
    fn order(&self) -> u32;
    fn set_order(&mut self, order: u32);
}

/// Client-side view of an orderable row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedItem {
    pub uid: String,
    pub container_id: String,
    pub order: u32,
    #[serde(default)]
    pub title: String,
}

impl OrderedItem {
    pub fn new(uid: impl Into<String>, container_id: impl Into<String>, order: u32) -> Self {
        Self {
            uid: uid.into(),
            container_id: container_id.into(),
            order,
            title: String::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

impl Orderable for OrderedItem {
    fn uid(&self) -> &str {
        &self.uid
    }

    fn container_id(&self) -> &str {
        &self.container_id
    }

    fn set_container_id(&mut self, container_id: &str) {
        self.container_id = container_id.to_string();
    }

    fn order(&self) -> u32 {
        self.order
    }

    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}

impl From<&Node> for OrderedItem {
    fn from(node: &Node) -> Self {
        Self {
            uid: node.uid.clone(),
            container_id: node.container_uid.clone().unwrap_or_default(),
            order: node.position,
            title: node.title.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Board,
    Column,
    Card,
    Checklist,
    Checkitem,
    Attachment,
    Wiki,
    WikiTab,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Board => "board",
            Self::Column => "column",
            Self::Card => "card",
            Self::Checklist => "checklist",
            Self::Checkitem => "checkitem",
            Self::Attachment => "attachment",
            Self::Wiki => "wiki",
            Self::WikiTab => "wiki_tab",
        }
    }

    /// The only kind of container this kind may be placed in.
    /// `None` for the root kind.
    pub fn parent_kind(&self) -> Option<NodeKind> {
        match self {
            Self::Board => None,
            Self::Column => Some(Self::Board),
            Self::Card => Some(Self::Column),
            Self::Checklist => Some(Self::Card),
            Self::Checkitem => Some(Self::Checklist),
            Self::Attachment => Some(Self::Card),
            Self::Wiki => Some(Self::Board),
            Self::WikiTab => Some(Self::Wiki),
        }
    }

    pub fn is_orderable(&self) -> bool {
        self.parent_kind().is_some()
    }

    /// Whether nodes of this kind can hold children.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Self::Board | Self::Column | Self::Card | Self::Checklist | Self::Wiki
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "board" => Ok(Self::Board),
            "column" => Ok(Self::Column),
            "card" => Ok(Self::Card),
            "checklist" => Ok(Self::Checklist),
            "checkitem" => Ok(Self::Checkitem),
            "attachment" => Ok(Self::Attachment),
            "wiki" => Ok(Self::Wiki),
            "wiki_tab" => Ok(Self::WikiTab),
            _ => Err(format!("Invalid node kind: {}", s)),
        }
    }
}

/// A persisted board node. Boards are roots and have no container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub uid: String,
    pub kind: NodeKind,
    pub container_uid: Option<String>,
    pub title: String,
    pub position: u32,
    pub created_at: String,
    pub updated_at: String,
}

impl Orderable for Node {
    fn uid(&self) -> &str {
        &self.uid
    }

    fn container_id(&self) -> &str {
        self.container_uid.as_deref().unwrap_or_default()
    }

    fn set_container_id(&mut self, container_id: &str) {
        self.container_uid = Some(container_id.to_string());
    }

    fn order(&self) -> u32 {
        self.position
    }

    fn set_order(&mut self, order: u32) {
        self.position = order;
    }
}

/// Generate a fresh node uid.
pub fn new_uid() -> String {
    uuid::Uuid::new_v4().to_string()
}
