//! Realtime fan-out server.
//!
//! ## Module Map
//!
//! ```text
//! ┌──────────┐   HTTP   ┌──────────────────────────────────────────────┐
//! │  Client  │ ───────> │  server.rs  (axum Router, ServerConfig)      │
//! │          │ <─────── │    ├─ api.rs  (route handlers, AppState)     │
//! └──────────┘ WebSocket│    └─ ws.rs   (subscriptions, keepalive)     │
//!                       │         │                                    │
//!                       │         │ apply_reorder()                    │
//!                       │         v                                    │
//!                       │  db.rs   (BoardDb behind DbHandle)           │
//!                       │         │                                    │
//!                       │         │ MoveOutcome { event, topics }      │
//!                       │         v                                    │
//!                       │  hub.rs  (TopicHub: one channel per topic)   │
//!                       └──────────────────────────────────────────────┘
//! ```
//!
//! ## Reorder Flow
//!
//! 1. `PATCH /api/nodes/{uid}/move` or a socket `Reorder` message reaches
//!    `api::apply_reorder()`.
//! 2. `BoardDb::move_node()` checks existence, kind compatibility and the
//!    target index against the live container, then rewrites both affected
//!    containers densely inside one transaction. Positions are dense per
//!    `(container, kind)`, so a board's columns and wikis order separately. The `DbHandle` mutex makes
//!    concurrent requests apply in arrival order.
//! 3. The canonical `OrderChangedEvent` is wrapped in its per-kind
//!    `WsMessage` and published to the topic of each touched container
//!    while the `DbHandle` lock is still held, so broadcasts leave in commit
//!    order.
//! 4. Every socket subscribed to that topic forwards it; a socket that fell
//!    behind gets `ResyncRequired` instead.

pub mod api;
pub mod db;
pub mod hub;
pub mod models;
#[allow(clippy::module_inception)]
pub mod server;
pub mod ws;

pub use server::{ServerConfig, build_router, open_db, start_server};
