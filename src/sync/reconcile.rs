//! Applying server broadcasts to the local lists.
//!
//! Every order event carries the item's absolute placement and the canonical
//! order of each container it touched. Applying it means "make local state
//! look like that", so an event applied twice, or applied on top of an
//! optimistic move the server later overrode, converges to the same lists.

use std::collections::VecDeque;

use boardsync_common::{Node, OrderChangedEvent, Orderable, WsMessage};
use tracing::{debug, warn};

use crate::drag::ContainerRegistry;

/// How many of our own committed events we remember for echo suppression.
const MAX_EXPECTED_ECHOES: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// Our own commit coming back; local state already matches.
    SuppressedEcho,
    /// Not a list mutation (acks, pongs, subscription replies).
    Ignored,
    /// The local view diverged beyond what the event can repair.
    NeedsRefetch,
}

#[derive(Debug, Default)]
pub struct Reconciler {
    expected: VecDeque<OrderChangedEvent>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember a committed event so its broadcast echo can be skipped.
    pub fn expect_echo(&mut self, event: OrderChangedEvent) {
        if self.expected.len() == MAX_EXPECTED_ECHOES {
            self.expected.pop_front();
        }
        self.expected.push_back(event);
    }

    pub fn pending_echoes(&self) -> usize {
        self.expected.len()
    }

    pub fn apply<T>(&mut self, registry: &mut ContainerRegistry<T>, msg: &WsMessage) -> ApplyOutcome
    where
        T: Orderable + Clone + for<'a> From<&'a Node>,
    {
        if let Some(event) = msg.as_order_changed() {
            if let Some(pos) = self.expected.iter().position(|e| e == event) {
                self.expected.remove(pos);
                if matches_local(registry, event) {
                    debug!(uid = %event.item_uid, "suppressed own echo");
                    return ApplyOutcome::SuppressedEcho;
                }
            }
            return apply_order_event(registry, event);
        }

        match msg {
            WsMessage::ItemCreated { node } => apply_created(registry, node),
            WsMessage::ItemDeleted { uid, container, .. } => {
                registry.remove(uid);
                let report = registry.align(&container.container_uid, &container.item_uids);
                if report.needs_refetch() && registry.contains(&container.container_uid) {
                    ApplyOutcome::NeedsRefetch
                } else {
                    ApplyOutcome::Applied
                }
            }
            WsMessage::ResyncRequired { topic } => {
                warn!(%topic, "server asked for a resync");
                ApplyOutcome::NeedsRefetch
            }
            _ => ApplyOutcome::Ignored,
        }
    }
}

/// Apply one order event as an absolute correction.
pub fn apply_order_event<T: Orderable + Clone>(
    registry: &mut ContainerRegistry<T>,
    event: &OrderChangedEvent,
) -> ApplyOutcome {
    let mut refetch = false;

    if registry.contains(&event.container_uid) {
        match registry.locate(&event.item_uid) {
            Some(current) => {
                let len = registry.len(&event.container_uid).unwrap_or(0);
                let max = if current.container_id == event.container_uid {
                    len.saturating_sub(1)
                } else {
                    len
                };
                let index = (event.order as usize).min(max);
                if let Err(err) = registry.place(&event.item_uid, &event.container_uid, index) {
                    warn!(uid = %event.item_uid, error = %err, "could not place item from broadcast");
                    refetch = true;
                }
            }
            None if event.containers.is_empty() => refetch = true,
            None => {}
        }
    } else {
        // Moved somewhere this client is not showing.
        registry.remove(&event.item_uid);
    }

    for snapshot in &event.containers {
        let report = registry.align(&snapshot.container_uid, &snapshot.item_uids);
        if report.needs_refetch() && registry.contains(&snapshot.container_uid) {
            refetch = true;
        }
    }

    if refetch {
        ApplyOutcome::NeedsRefetch
    } else {
        ApplyOutcome::Applied
    }
}

fn apply_created<T>(registry: &mut ContainerRegistry<T>, node: &Node) -> ApplyOutcome
where
    T: Orderable + Clone + for<'a> From<&'a Node>,
{
    let Some(container) = node.container_uid.as_deref() else {
        return ApplyOutcome::Ignored;
    };
    if !registry.contains(container) {
        return ApplyOutcome::Ignored;
    }
    if registry.insert(T::from(node)).is_err() {
        return ApplyOutcome::NeedsRefetch;
    }
    let len = registry.len(container).unwrap_or(1);
    let index = (node.position as usize).min(len.saturating_sub(1));
    match registry.place(&node.uid, container, index) {
        Ok(()) => ApplyOutcome::Applied,
        Err(_) => ApplyOutcome::NeedsRefetch,
    }
}

/// Local lists already agree with every snapshot the event carries.
fn matches_local<T: Orderable + Clone>(
    registry: &ContainerRegistry<T>,
    event: &OrderChangedEvent,
) -> bool {
    let placed = registry
        .locate(&event.item_uid)
        .is_some_and(|loc| loc.container_id == event.container_uid && loc.index == event.order as usize);
    placed
        && event
            .containers
            .iter()
            .filter(|c| registry.contains(&c.container_uid))
            .all(|c| registry.uids(&c.container_uid) == c.item_uids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardsync_common::{ContainerOrder, NodeKind, OrderedItem, Topic};

    fn items(container: &str, uids: &[&str]) -> Vec<OrderedItem> {
        uids.iter()
            .enumerate()
            .map(|(i, uid)| OrderedItem::new(*uid, container, i as u32))
            .collect()
    }

    fn registry() -> ContainerRegistry<OrderedItem> {
        let mut reg = ContainerRegistry::new();
        reg.register("todo", items("todo", &["a", "b", "c"]));
        reg.register("done", items("done", &["d"]));
        reg
    }

    fn order(container: &str, uids: &[&str]) -> ContainerOrder {
        ContainerOrder {
            container_uid: container.to_string(),
            item_uids: uids.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn moved_b_to_done() -> WsMessage {
        WsMessage::CardOrderChanged(OrderChangedEvent {
            item_uid: "b".to_string(),
            kind: NodeKind::Card,
            from_container_uid: "todo".to_string(),
            container_uid: "done".to_string(),
            order: 1,
            containers: vec![order("todo", &["a", "c"]), order("done", &["d", "b"])],
        })
    }

    #[test]
    fn test_broadcast_is_applied_idempotently() {
        let mut reg = registry();
        let mut rec = Reconciler::new();

        assert_eq!(rec.apply(&mut reg, &moved_b_to_done()), ApplyOutcome::Applied);
        let once = (reg.uids("todo"), reg.uids("done"));
        assert_eq!(rec.apply(&mut reg, &moved_b_to_done()), ApplyOutcome::Applied);

        assert_eq!((reg.uids("todo"), reg.uids("done")), once);
        assert_eq!(once.1, vec!["d", "b"]);
        assert!(reg.is_dense());
    }

    #[test]
    fn test_server_order_overrides_optimistic_state() {
        let mut reg = registry();
        // Optimistically we put b at the top of done...
        reg.move_between("b", "done", 0).unwrap();
        // ...but a concurrent move landed first and the server says otherwise.
        let mut rec = Reconciler::new();
        assert_eq!(rec.apply(&mut reg, &moved_b_to_done()), ApplyOutcome::Applied);
        assert_eq!(reg.uids("done"), vec!["d", "b"]);
        assert_eq!(reg.get("b").unwrap().order, 1);
    }

    #[test]
    fn test_own_echo_is_suppressed_once() {
        let mut reg = registry();
        reg.move_between("b", "done", 1).unwrap();
        let mut rec = Reconciler::new();
        let msg = moved_b_to_done();
        rec.expect_echo(msg.as_order_changed().unwrap().clone());

        assert_eq!(rec.apply(&mut reg, &msg), ApplyOutcome::SuppressedEcho);
        assert_eq!(rec.pending_echoes(), 0);
        assert_eq!(rec.apply(&mut reg, &msg), ApplyOutcome::Applied);
    }

    #[test]
    fn test_echo_is_applied_when_local_state_drifted() {
        let mut reg = registry();
        let mut rec = Reconciler::new();
        let msg = moved_b_to_done();
        rec.expect_echo(msg.as_order_changed().unwrap().clone());

        assert_eq!(rec.apply(&mut reg, &msg), ApplyOutcome::Applied);
        assert_eq!(reg.uids("done"), vec!["d", "b"]);
    }

    #[test]
    fn test_event_for_unknown_item_requests_refetch() {
        let mut reg = registry();
        let msg = WsMessage::CardOrderChanged(OrderChangedEvent {
            item_uid: "zz".to_string(),
            kind: NodeKind::Card,
            from_container_uid: "todo".to_string(),
            container_uid: "todo".to_string(),
            order: 0,
            containers: vec![order("todo", &["zz", "a", "b", "c"])],
        });
        assert_eq!(
            Reconciler::new().apply(&mut reg, &msg),
            ApplyOutcome::NeedsRefetch
        );
        assert!(reg.is_dense());
    }

    #[test]
    fn test_move_to_offscreen_container_removes_locally() {
        let mut reg = registry();
        let msg = WsMessage::CardOrderChanged(OrderChangedEvent {
            item_uid: "a".to_string(),
            kind: NodeKind::Card,
            from_container_uid: "todo".to_string(),
            container_uid: "archive".to_string(),
            order: 0,
            containers: vec![order("todo", &["b", "c"]), order("archive", &["a"])],
        });
        assert_eq!(Reconciler::new().apply(&mut reg, &msg), ApplyOutcome::Applied);
        assert_eq!(reg.uids("todo"), vec!["b", "c"]);
    }

    #[test]
    fn test_created_and_deleted_items_are_mirrored() {
        let mut reg = registry();
        let mut rec = Reconciler::new();
        let node = Node {
            uid: "e".to_string(),
            kind: NodeKind::Card,
            container_uid: Some("done".to_string()),
            title: "New".to_string(),
            position: 1,
            created_at: String::new(),
            updated_at: String::new(),
        };
        assert_eq!(
            rec.apply(&mut reg, &WsMessage::ItemCreated { node }),
            ApplyOutcome::Applied
        );
        assert_eq!(reg.uids("done"), vec!["d", "e"]);

        let deleted = WsMessage::ItemDeleted {
            uid: "a".to_string(),
            kind: NodeKind::Card,
            container: order("todo", &["b", "c"]),
        };
        assert_eq!(rec.apply(&mut reg, &deleted), ApplyOutcome::Applied);
        assert_eq!(reg.uids("todo"), vec!["b", "c"]);
        assert!(reg.is_dense());
    }

    #[test]
    fn test_non_mutations_are_ignored_and_resync_forces_refetch() {
        let mut reg = registry();
        let mut rec = Reconciler::new();
        assert_eq!(rec.apply(&mut reg, &WsMessage::Pong), ApplyOutcome::Ignored);
        assert_eq!(
            rec.apply(
                &mut reg,
                &WsMessage::ResyncRequired {
                    topic: Topic::board("b1")
                }
            ),
            ApplyOutcome::NeedsRefetch
        );
    }
}
