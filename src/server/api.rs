use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
};
use boardsync_common::WsMessage;
use tracing::{info, warn};

use super::db::DbHandle;
use super::hub::TopicHub;
use super::models::*;
use super::ws::KeepAlive;
use crate::errors::BoardError;
use crate::sync::api::MoveNodeRequest;

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub db: DbHandle,
    pub hub: TopicHub,
    pub keepalive: KeepAlive,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(db: DbHandle, hub: TopicHub, keepalive: KeepAlive) -> SharedState {
        Arc::new(Self { db, hub, keepalive })
    }
}

// ── Error handling ────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl ApiError {
    pub fn message(&self) -> &str {
        match self {
            ApiError::NotFound(msg) | ApiError::BadRequest(msg) | ApiError::Internal(msg) => msg,
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<BoardError>() {
            Some(board) if board.is_not_found() => ApiError::NotFound(board.to_string()),
            Some(board) => ApiError::BadRequest(board.to_string()),
            None => ApiError::Internal(format!("{:#}", err)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({"error": message}))).into_response()
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/api/boards", get(list_boards).post(create_board))
        .route("/api/boards/{uid}", get(get_board))
        .route("/api/nodes", post(create_node))
        .route("/api/nodes/{uid}", delete(delete_node))
        .route("/api/nodes/{uid}/children", get(list_children))
        .route("/api/nodes/{uid}/move", patch(move_node))
        .route("/health", get(health_check))
}

// ── Shared mutation path ──────────────────────────────────────────────

/// Validate and persist a reorder, then publish the canonical event to the
/// topic of every container it touched. Used by HTTP and the socket alike.
///
/// Publishing happens before the database lock is released, so subscribers
/// see events in commit order and the last snapshot they get is current.
pub(crate) async fn apply_reorder(
    state: &SharedState,
    uid: String,
    req: MoveNodeRequest,
) -> Result<MoveOutcome, ApiError> {
    let shared = Arc::clone(state);
    let outcome = state
        .db
        .call(move |db| {
            let outcome =
                db.move_node(&uid, req.target_container_uid.as_deref(), req.target_index)?;
            if let Some(msg) = WsMessage::order_changed(outcome.event.clone()) {
                for topic in &outcome.topics {
                    shared.hub.publish(topic, &msg);
                }
            }
            Ok(outcome)
        })
        .await
        .inspect_err(|e| warn!(error = %e, "reorder rejected"))?;

    info!(
        uid = %outcome.event.item_uid,
        from = %outcome.event.from_container_uid,
        to = %outcome.event.container_uid,
        order = outcome.event.order,
        "reorder applied"
    );
    Ok(outcome)
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn health_check() -> &'static str {
    "ok"
}

async fn list_boards(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let boards = state.db.call(|db| db.list_boards()).await?;
    Ok(Json(boards))
}

async fn create_board(
    State(state): State<SharedState>,
    Json(req): Json<CreateBoardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let title = req.title.trim().to_string();
    if title.is_empty() {
        return Err(ApiError::BadRequest("Board title must not be empty".into()));
    }
    let board = state.db.call(move |db| db.create_board(&title)).await?;
    Ok((StatusCode::CREATED, Json(board)))
}

async fn get_board(
    State(state): State<SharedState>,
    Path(uid): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state.db.call(move |db| db.get_board(&uid)).await?;
    Ok(Json(view))
}

async fn create_node(
    State(state): State<SharedState>,
    Json(req): Json<CreateNodeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let CreateNodeRequest {
        kind,
        container_uid,
        title,
    } = req;
    let shared = Arc::clone(&state);
    let created = state
        .db
        .call(move |db| {
            let created = db.create_node(kind, &container_uid, &title)?;
            shared.hub.publish(
                &created.topic,
                &WsMessage::ItemCreated {
                    node: created.node.clone(),
                },
            );
            Ok(created)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(created.node)))
}

async fn list_children(
    State(state): State<SharedState>,
    Path(uid): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let children = state
        .db
        .call(move |db| {
            if db.get_node(&uid)?.is_none() {
                return Err(BoardError::NodeNotFound { uid }.into());
            }
            db.list_children(&uid)
        })
        .await?;
    Ok(Json(children))
}

async fn move_node(
    State(state): State<SharedState>,
    Path(uid): Path<String>,
    Json(req): Json<MoveNodeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = apply_reorder(&state, uid, req).await?;
    Ok(Json(outcome.event))
}

async fn delete_node(
    State(state): State<SharedState>,
    Path(uid): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let shared = Arc::clone(&state);
    state
        .db
        .call(move |db| {
            let deleted = db.delete_node(&uid)?;
            if let (Some(container), Some(topic)) = (deleted.container, deleted.topic.as_ref()) {
                shared.hub.publish(
                    topic,
                    &WsMessage::ItemDeleted {
                        uid: deleted.node.uid.clone(),
                        kind: deleted.node.kind,
                        container,
                    },
                );
            }
            Ok(())
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
