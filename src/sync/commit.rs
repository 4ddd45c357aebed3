//! Resolving an optimistic drop against the server's answer.

use std::fmt;

use boardsync_common::{OrderChangedEvent, Orderable};
use tracing::{debug, info, warn};

use super::api::BoardApi;
use super::reconcile::{Reconciler, apply_order_event};
use crate::drag::{ContainerRegistry, DropOutcome};
use crate::errors::CommitError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Rejected,
    Offline,
}

/// User-facing message after a drop had to be undone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    fn from_error(err: &CommitError) -> Self {
        match err {
            CommitError::Rejected { reason, .. } => Self {
                kind: NoticeKind::Rejected,
                message: format!("The move was not saved: {}", reason),
            },
            CommitError::Transport(_) => Self {
                kind: NoticeKind::Offline,
                message: "The move could not be saved because the server is unreachable"
                    .to_string(),
            },
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    Committed(OrderChangedEvent),
    Reverted(Notice),
}

/// Send the drop's intent.
///
/// The drop is already visible locally. Only the API is borrowed, so the
/// caller's lists keep taking broadcasts while the request is in flight;
/// hand the answer to [`resolve`]. Nothing is retried.
pub async fn commit_drop<A, T>(
    api: &A,
    drop: &DropOutcome<T>,
) -> Result<OrderChangedEvent, CommitError>
where
    A: BoardApi + ?Sized,
{
    debug!(
        uid = %drop.intent.item_uid,
        to = %drop.intent.to_container_uid,
        index = drop.intent.target_index,
        "committing reorder"
    );
    api.commit_reorder(&drop.intent).await
}

/// Fold the answer to a [`commit_drop`] back into `registry`.
///
/// On success the canonical event is applied (it wins over the optimistic
/// guess if they differ) and remembered so its broadcast echo is skipped.
/// On failure the item goes back to its origin.
pub fn resolve<T: Orderable + Clone>(
    registry: &mut ContainerRegistry<T>,
    reconciler: &mut Reconciler,
    drop: &DropOutcome<T>,
    result: Result<OrderChangedEvent, CommitError>,
) -> CommitOutcome {
    match result {
        Ok(event) => {
            info!(
                uid = %event.item_uid,
                container = %event.container_uid,
                order = event.order,
                "reorder committed"
            );
            apply_order_event(registry, &event);
            reconciler.expect_echo(event.clone());
            CommitOutcome::Committed(event)
        }
        Err(err) => {
            warn!(uid = %drop.intent.item_uid, error = %err, "reorder failed; reverting");
            revert(registry, drop);
            CommitOutcome::Reverted(Notice::from_error(&err))
        }
    }
}

/// Put the dropped item back at its origin.
fn revert<T: Orderable + Clone>(registry: &mut ContainerRegistry<T>, drop: &DropOutcome<T>) {
    let uid = drop.intent.item_uid.as_str();
    let origin = &drop.origin;
    let Some(current) = registry.locate(uid) else {
        return;
    };
    let len = registry.len(&origin.container_id).unwrap_or(0);
    let max = if current.container_id == origin.container_id {
        len.saturating_sub(1)
    } else {
        len
    };
    if let Err(err) = registry.place(uid, &origin.container_id, origin.index.min(max)) {
        warn!(uid, error = %err, "could not revert failed drop");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drag::{DragSession, DropCandidate};
    use async_trait::async_trait;
    use boardsync_common::{ContainerOrder, NodeKind, OrderedItem, ReorderIntent};

    struct Fixed(Result<OrderChangedEvent, CommitError>);

    #[async_trait]
    impl BoardApi for Fixed {
        async fn commit_reorder(
            &self,
            _intent: &ReorderIntent,
        ) -> Result<OrderChangedEvent, CommitError> {
            self.0.clone()
        }
    }

    fn items(container: &str, uids: &[&str]) -> Vec<OrderedItem> {
        uids.iter()
            .enumerate()
            .map(|(i, uid)| OrderedItem::new(*uid, container, i as u32))
            .collect()
    }

    fn dropped(reg: &mut ContainerRegistry<OrderedItem>) -> DropOutcome<OrderedItem> {
        let mut drag = DragSession::new();
        drag.start_item(reg, "a").unwrap();
        drag.over(reg, Some(DropCandidate::new("done", 1))).unwrap();
        drag.end(reg, Some(DropCandidate::new("done", 1)))
            .unwrap()
            .unwrap()
    }

    fn registry() -> ContainerRegistry<OrderedItem> {
        let mut reg = ContainerRegistry::new();
        reg.register("todo", items("todo", &["a", "b"]));
        reg.register("done", items("done", &["c"]));
        reg
    }

    #[tokio::test]
    async fn test_rejection_reverts_to_pre_drag_order() {
        let mut reg = registry();
        let before = (reg.items("todo").unwrap().to_vec(), reg.items("done").unwrap().to_vec());
        let drop = dropped(&mut reg);
        assert_eq!(reg.uids("done"), vec!["c", "a"]);

        let api = Fixed(Err(CommitError::Rejected {
            status: 400,
            reason: "Index 1 out of range".to_string(),
        }));
        let result = commit_drop(&api, &drop).await;
        let outcome = resolve(&mut reg, &mut Reconciler::new(), &drop, result);

        match outcome {
            CommitOutcome::Reverted(notice) => {
                assert_eq!(notice.kind, NoticeKind::Rejected);
                assert!(notice.message.contains("out of range"));
            }
            other => panic!("Expected revert, got {:?}", other),
        }
        assert_eq!(reg.items("todo").unwrap(), before.0.as_slice());
        assert_eq!(reg.items("done").unwrap(), before.1.as_slice());
    }

    #[tokio::test]
    async fn test_rejection_within_one_list_restores_exact_positions() {
        let mut reg = ContainerRegistry::new();
        reg.register("todo", items("todo", &["a", "b", "c"]));
        let mut drag = DragSession::new();
        drag.start_item(&reg, "a").unwrap();
        let drop = drag
            .end(&mut reg, Some(DropCandidate::new("todo", 2)))
            .unwrap()
            .unwrap();
        assert_eq!(reg.uids("todo"), vec!["b", "c", "a"]);

        let api = Fixed(Err(CommitError::Rejected {
            status: 409,
            reason: "stale".to_string(),
        }));
        let result = commit_drop(&api, &drop).await;
        let outcome = resolve(&mut reg, &mut Reconciler::new(), &drop, result);

        assert!(matches!(outcome, CommitOutcome::Reverted(_)));
        assert_eq!(
            reg.items("todo").unwrap(),
            items("todo", &["a", "b", "c"]).as_slice()
        );
    }

    #[tokio::test]
    async fn test_transport_failure_reverts_identically() {
        let mut reg = registry();
        let drop = dropped(&mut reg);
        let api = Fixed(Err(CommitError::Transport("connection refused".to_string())));

        let result = commit_drop(&api, &drop).await;
        let outcome = resolve(&mut reg, &mut Reconciler::new(), &drop, result);

        assert!(matches!(
            outcome,
            CommitOutcome::Reverted(Notice {
                kind: NoticeKind::Offline,
                ..
            })
        ));
        assert_eq!(reg.uids("todo"), vec!["a", "b"]);
        assert_eq!(reg.uids("done"), vec!["c"]);
    }

    #[tokio::test]
    async fn test_success_applies_canonical_order_and_expects_echo() {
        let mut reg = registry();
        let drop = dropped(&mut reg);
        // The server placed it first instead.
        let event = OrderChangedEvent {
            item_uid: "a".to_string(),
            kind: NodeKind::Card,
            from_container_uid: "todo".to_string(),
            container_uid: "done".to_string(),
            order: 0,
            containers: vec![
                ContainerOrder {
                    container_uid: "todo".to_string(),
                    item_uids: vec!["b".to_string()],
                },
                ContainerOrder {
                    container_uid: "done".to_string(),
                    item_uids: vec!["a".to_string(), "c".to_string()],
                },
            ],
        };
        let mut rec = Reconciler::new();

        let result = commit_drop(&Fixed(Ok(event.clone())), &drop).await;
        let outcome = resolve(&mut reg, &mut rec, &drop, result);

        assert_eq!(outcome, CommitOutcome::Committed(event));
        assert_eq!(reg.uids("done"), vec!["a", "c"]);
        assert_eq!(rec.pending_echoes(), 1);
        assert!(reg.is_dense());
    }
}
