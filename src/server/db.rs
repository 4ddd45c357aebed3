use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use boardsync_common::order::{move_across_containers, reorder};
use boardsync_common::{ContainerOrder, Node, NodeKind, OrderChangedEvent, Orderable, Topic, model};
use rusqlite::{Connection, params};

use super::models::*;
use crate::errors::BoardError;

/// Async-safe handle to the board database.
///
/// Wraps `BoardDb` behind `Arc<Mutex>` and runs all access on tokio's
/// blocking thread pool via `spawn_blocking`. The mutex also serialises
/// mutations, so concurrent reorders are applied in arrival order.
#[derive(Clone)]
pub struct DbHandle {
    inner: Arc<std::sync::Mutex<BoardDb>>,
}

impl DbHandle {
    pub fn new(db: BoardDb) -> Self {
        Self {
            inner: Arc::new(std::sync::Mutex::new(db)),
        }
    }

    /// Run a closure with access to the database on a blocking thread.
    /// All data passed into `f` must be owned (`'static`).
    pub async fn call<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&BoardDb) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let db = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = db.lock().map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
            f(&guard)
        })
        .await
        .context("DB task panicked")?
    }

    /// Acquire the database mutex synchronously. For startup, CLI one-shots
    /// and tests; never from a hot async path.
    pub fn lock_sync(&self) -> Result<std::sync::MutexGuard<'_, BoardDb>> {
        self.inner
            .lock()
            .map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))
    }
}

pub struct BoardDb {
    conn: Connection,
}

const NODE_COLUMNS: &str = "uid, kind, container_uid, title, position, created_at, updated_at";

impl BoardDb {
    /// Open (or create) a SQLite database at the given path and run migrations.
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).context("Failed to open SQLite database")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Create an in-memory SQLite database (for testing).
    pub fn new_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    fn init(&self) -> Result<()> {
        self.conn
            .execute_batch("PRAGMA foreign_keys = ON;")
            .context("Failed to enable foreign keys")?;
        self.run_migrations().context("Failed to run migrations")?;
        Ok(())
    }

    fn run_migrations(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS nodes (
                    uid TEXT PRIMARY KEY,
                    kind TEXT NOT NULL,
                    container_uid TEXT REFERENCES nodes(uid) ON DELETE CASCADE,
                    title TEXT NOT NULL DEFAULT '',
                    position INTEGER NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL DEFAULT (datetime('now')),
                    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
                );

                CREATE INDEX IF NOT EXISTS idx_nodes_container ON nodes(container_uid, kind, position);
                CREATE INDEX IF NOT EXISTS idx_nodes_kind ON nodes(kind);
                ",
            )
            .context("Failed to create tables")?;
        Ok(())
    }

    // ── Boards ────────────────────────────────────────────────────────

    pub fn create_board(&self, title: &str) -> Result<Node> {
        let position: u32 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM nodes WHERE kind = 'board'",
                [],
                |row| row.get(0),
            )
            .context("Failed to count boards")?;
        let uid = model::new_uid();
        self.conn
            .execute(
                "INSERT INTO nodes (uid, kind, container_uid, title, position) VALUES (?1, 'board', NULL, ?2, ?3)",
                params![uid, title, position],
            )
            .context("Failed to insert board")?;
        self.get_node(&uid)?.context("Board not found after insert")
    }

    pub fn list_boards(&self) -> Result<Vec<Node>> {
        self.query_nodes(
            &format!("SELECT {NODE_COLUMNS} FROM nodes WHERE kind = 'board' ORDER BY position"),
            [],
        )
    }

    pub fn get_board(&self, uid: &str) -> Result<BoardView> {
        let board = self.get_node(uid)?.ok_or_else(|| BoardError::NodeNotFound {
            uid: uid.to_string(),
        })?;
        if board.kind != NodeKind::Board {
            return Err(BoardError::InvalidKind(format!("{} is a {}, not a board", uid, board.kind)).into());
        }

        let mut columns = Vec::new();
        for column in self.list_siblings(uid, NodeKind::Column)? {
            let cards = self.list_siblings(&column.uid, NodeKind::Card)?;
            columns.push(ColumnView { column, cards });
        }
        Ok(BoardView { board, columns })
    }

    // ── Nodes ─────────────────────────────────────────────────────────

    pub fn get_node(&self, uid: &str) -> Result<Option<Node>> {
        let mut nodes = self.query_nodes(
            &format!("SELECT {NODE_COLUMNS} FROM nodes WHERE uid = ?1"),
            params![uid],
        )?;
        Ok(nodes.pop())
    }

    /// All children of `container_uid`, grouped by kind, each group in
    /// position order.
    pub fn list_children(&self, container_uid: &str) -> Result<Vec<Node>> {
        self.query_nodes(
            &format!(
                "SELECT {NODE_COLUMNS} FROM nodes WHERE container_uid = ?1 ORDER BY kind, position, created_at"
            ),
            params![container_uid],
        )
    }

    /// The children of `container_uid` that are a `kind`, in position order.
    ///
    /// Positions are dense per `(container, kind)`: a board's columns and
    /// wikis are two independent sequences.
    pub fn list_siblings(&self, container_uid: &str, kind: NodeKind) -> Result<Vec<Node>> {
        self.query_nodes(
            &format!(
                "SELECT {NODE_COLUMNS} FROM nodes WHERE container_uid = ?1 AND kind = ?2 ORDER BY position, created_at"
            ),
            params![container_uid, kind.as_str()],
        )
    }

    /// Append a new node at the end of its container.
    pub fn create_node(&self, kind: NodeKind, container_uid: &str, title: &str) -> Result<CreateOutcome> {
        let container = self.require_container(container_uid, kind)?;
        let position: u32 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM nodes WHERE container_uid = ?1 AND kind = ?2",
                params![container_uid, kind.as_str()],
                |row| row.get(0),
            )
            .context("Failed to count siblings")?;

        let uid = model::new_uid();
        self.conn
            .execute(
                "INSERT INTO nodes (uid, kind, container_uid, title, position) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![uid, kind.as_str(), container_uid, title, position],
            )
            .context("Failed to insert node")?;
        let node = self.get_node(&uid)?.context("Node not found after insert")?;
        let topic = self.topic_for_container(&container)?;
        Ok(CreateOutcome { node, topic })
    }

    /// Delete a node (and, through the foreign key, its subtree), then
    /// renumber the same-kind siblings it leaves behind.
    pub fn delete_node(&self, uid: &str) -> Result<DeleteOutcome> {
        let node = self.get_node(uid)?.ok_or_else(|| BoardError::NodeNotFound {
            uid: uid.to_string(),
        })?;

        // DbHandle's mutex already guarantees exclusive access.
        let tx = self
            .conn
            .unchecked_transaction()
            .context("Failed to begin transaction")?;
        tx.execute("DELETE FROM nodes WHERE uid = ?1", params![uid])
            .context("Failed to delete node")?;
        let container = match node.container_uid.as_deref() {
            Some(container_uid) => {
                let item_uids = renumber_siblings(&tx, container_uid, node.kind)?;
                Some(ContainerOrder {
                    container_uid: container_uid.to_string(),
                    item_uids,
                })
            }
            None => None,
        };
        tx.commit().context("Failed to commit delete")?;

        let topic = match node.container_uid.as_deref() {
            Some(container_uid) => match self.get_node(container_uid)? {
                Some(parent) => Some(self.topic_for_container(&parent)?),
                None => None,
            },
            None => Some(Topic::board(&node.uid)),
        };
        Ok(DeleteOutcome {
            node,
            container,
            topic,
        })
    }

    /// Move `uid` to `target_index` of `target_container` (its own container
    /// when `None`).
    ///
    /// The index is checked against the live size of the destination; it is
    /// rejected, never clamped. Both affected containers are rewritten to
    /// dense positions in one transaction.
    pub fn move_node(
        &self,
        uid: &str,
        target_container: Option<&str>,
        target_index: usize,
    ) -> Result<MoveOutcome> {
        let node = self.get_node(uid)?.ok_or_else(|| BoardError::NodeNotFound {
            uid: uid.to_string(),
        })?;
        if !node.kind.is_orderable() {
            return Err(BoardError::NotOrderable { uid: uid.to_string() }.into());
        }
        let source_uid = node
            .container_uid
            .clone()
            .ok_or_else(|| BoardError::NotOrderable { uid: uid.to_string() })?;
        let target_uid = target_container.unwrap_or(&source_uid).to_string();

        let source = self.require_container(&source_uid, node.kind)?;
        let target = if target_uid == source_uid {
            source.clone()
        } else {
            self.require_container(&target_uid, node.kind)?
        };

        let source_items = self.list_siblings(&source_uid, node.kind)?;
        let dest_items = if target_uid == source_uid {
            Vec::new()
        } else {
            self.list_siblings(&target_uid, node.kind)?
        };
        let before: HashMap<String, (String, u32)> = source_items
            .iter()
            .chain(&dest_items)
            .map(|n| (n.uid.clone(), (n.container_id().to_string(), n.position)))
            .collect();

        let lists = if target_uid == source_uid {
            let from = source_items
                .iter()
                .position(|n| n.uid == uid)
                .context("Node missing from its own container")?;
            vec![reorder(&source_items, from, target_index).map_err(BoardError::from)?]
        } else {
            let (source_after, dest_after) =
                move_across_containers(&source_items, &dest_items, &target_uid, uid, target_index)
                    .map_err(BoardError::from)?;
            vec![source_after, dest_after]
        };
        self.write_move(&node.uid, &source, &target, &before, &lists)
    }

    fn write_move(
        &self,
        uid: &str,
        source: &Node,
        target: &Node,
        before: &HashMap<String, (String, u32)>,
        lists: &[Vec<Node>],
    ) -> Result<MoveOutcome> {
        let tx = self
            .conn
            .unchecked_transaction()
            .context("Failed to begin transaction")?;
        for item in lists.iter().flatten() {
            let unchanged = before
                .get(&item.uid)
                .is_some_and(|(c, p)| c == item.container_id() && *p == item.order());
            if unchanged {
                continue;
            }
            tx.execute(
                "UPDATE nodes SET container_uid = ?1, position = ?2, updated_at = datetime('now') WHERE uid = ?3",
                params![item.container_id(), item.order(), item.uid],
            )
            .context("Failed to write node position")?;
        }
        tx.commit().context("Failed to commit move")?;

        let containers: Vec<ContainerOrder> = lists
            .iter()
            .zip([&source.uid, &target.uid])
            .map(|(items, container_uid)| ContainerOrder {
                container_uid: container_uid.clone(),
                item_uids: items.iter().map(|n| n.uid.clone()).collect(),
            })
            .collect();

        let moved = self
            .get_node(uid)?
            .context("Node not found after move")?;
        let mut topics = vec![self.topic_for_container(source)?];
        let target_topic = self.topic_for_container(target)?;
        if !topics.contains(&target_topic) {
            topics.push(target_topic);
        }

        let event = OrderChangedEvent {
            item_uid: moved.uid.clone(),
            kind: moved.kind,
            from_container_uid: source.uid.clone(),
            container_uid: target.uid.clone(),
            order: moved.position,
            containers,
        };
        Ok(MoveOutcome {
            node: moved,
            event,
            topics,
        })
    }

    /// The realtime topic whose subscribers see changes inside `container`.
    pub fn topic_for_container(&self, container: &Node) -> Result<Topic> {
        let parent = || {
            container
                .container_uid
                .clone()
                .ok_or_else(|| BoardError::NodeNotFound {
                    uid: format!("parent of {}", container.uid),
                })
        };
        let topic = match container.kind {
            NodeKind::Board => Topic::board(&container.uid),
            NodeKind::Column => Topic::board(parent()?),
            NodeKind::Card => Topic::card(&container.uid),
            NodeKind::Checklist => Topic::card(parent()?),
            NodeKind::Wiki => Topic::wiki(&container.uid),
            NodeKind::Checkitem | NodeKind::Attachment | NodeKind::WikiTab => {
                return Err(BoardError::InvalidKind(format!(
                    "a {} does not contain other nodes",
                    container.kind
                ))
                .into());
            }
        };
        Ok(topic)
    }

    /// Look up `container_uid` and check it may hold a `kind`.
    fn require_container(&self, container_uid: &str, kind: NodeKind) -> Result<Node> {
        let Some(expected) = kind.parent_kind() else {
            return Err(BoardError::InvalidKind(format!("a {} has no container", kind)).into());
        };
        let container = self
            .get_node(container_uid)?
            .ok_or_else(|| BoardError::ContainerNotFound {
                uid: container_uid.to_string(),
            })?;
        if container.kind != expected {
            return Err(BoardError::KindMismatch {
                item: kind,
                container: container.kind,
            }
            .into());
        }
        Ok(container)
    }

    fn query_nodes<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Node>> {
        let mut stmt = self.conn.prepare(sql).context("Failed to prepare node query")?;
        let rows = stmt
            .query_map(params, |row| {
                Ok(NodeRow {
                    uid: row.get(0)?,
                    kind: row.get(1)?,
                    container_uid: row.get(2)?,
                    title: row.get(3)?,
                    position: row.get(4)?,
                    created_at: row.get(5)?,
                    updated_at: row.get(6)?,
                })
            })
            .context("Failed to query nodes")?;
        let mut nodes = Vec::new();
        for row in rows {
            let r = row.context("Failed to read node row")?;
            nodes.push(r.into_node()?);
        }
        Ok(nodes)
    }
}

/// Rewrite the positions of `container_uid`'s `kind` children to `0..n`.
fn renumber_siblings(conn: &Connection, container_uid: &str, kind: NodeKind) -> Result<Vec<String>> {
    let uids: Vec<String> = {
        let mut stmt = conn
            .prepare(
                "SELECT uid FROM nodes WHERE container_uid = ?1 AND kind = ?2 ORDER BY position, created_at",
            )
            .context("Failed to prepare sibling query")?;
        let rows = stmt
            .query_map(params![container_uid, kind.as_str()], |row| row.get(0))
            .context("Failed to query siblings")?;
        rows.collect::<rusqlite::Result<_>>()
            .context("Failed to read sibling rows")?
    };
    for (position, uid) in uids.iter().enumerate() {
        conn.execute(
            "UPDATE nodes SET position = ?1 WHERE uid = ?2",
            params![position as u32, uid],
        )
        .context("Failed to renumber sibling")?;
    }
    Ok(uids)
}

/// Intermediate row struct for nodes.
struct NodeRow {
    uid: String,
    kind: String,
    container_uid: Option<String>,
    title: String,
    position: u32,
    created_at: String,
    updated_at: String,
}

impl NodeRow {
    fn into_node(self) -> Result<Node> {
        let kind = NodeKind::from_str(&self.kind)
            .map_err(|e| anyhow::anyhow!(e))
            .context("Failed to parse node kind")?;
        Ok(Node {
            uid: self.uid,
            kind,
            container_uid: self.container_uid,
            title: self.title,
            position: self.position,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────
