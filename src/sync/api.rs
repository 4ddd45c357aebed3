//! The order-change request seam.

use async_trait::async_trait;
use boardsync_common::{OrderChangedEvent, ReorderIntent};
use serde::{Deserialize, Serialize};

use crate::errors::CommitError;

/// Persists a reorder. Implementations return the authoritative result, the
/// same event the server broadcasts to other subscribers.
#[async_trait]
pub trait BoardApi: Send + Sync {
    async fn commit_reorder(&self, intent: &ReorderIntent) -> Result<OrderChangedEvent, CommitError>;
}

/// Body of `PATCH /api/nodes/{uid}/move`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveNodeRequest {
    pub target_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_container_uid: Option<String>,
}

impl From<&ReorderIntent> for MoveNodeRequest {
    fn from(intent: &ReorderIntent) -> Self {
        Self {
            target_index: intent.target_index,
            target_container_uid: Some(intent.to_container_uid.clone()),
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// [`BoardApi`] over the boardsync HTTP API.
#[derive(Debug, Clone)]
pub struct HttpBoardApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBoardApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn move_url(&self, uid: &str) -> String {
        format!("{}/api/nodes/{}/move", self.base_url, uid)
    }
}

#[async_trait]
impl BoardApi for HttpBoardApi {
    async fn commit_reorder(&self, intent: &ReorderIntent) -> Result<OrderChangedEvent, CommitError> {
        let resp = self
            .client
            .patch(self.move_url(&intent.item_uid))
            .header("Accept", "application/json")
            .json(&MoveNodeRequest::from(intent))
            .send()
            .await
            .map_err(|e| CommitError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let reason = match resp.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
            };
            return Err(CommitError::Rejected {
                status: status.as_u16(),
                reason,
            });
        }

        resp.json::<OrderChangedEvent>()
            .await
            .map_err(|e| CommitError::Transport(format!("Malformed move response: {}", e)))
    }
}
