use boardsync_common::{Orderable, ReorderIntent};
use tracing::{debug, trace};

use super::gate::{Admission, GateState, Splice, SpliceGate};
use super::keyboard::{Direction, Droppable, Rect, nearest_in_direction};
use super::registry::{ContainerRegistry, Location};
use crate::errors::DragError;

/// Where the active row would land if dropped now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropCandidate {
    pub container_id: String,
    pub index: usize,
}

impl DropCandidate {
    pub fn new(container_id: impl Into<String>, index: usize) -> Self {
        Self {
            container_id: container_id.into(),
            index,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging,
    /// A drop produced a reorder intent that has not resolved yet.
    Committing,
}

/// What is being dragged: a row, or a container (e.g. a whole column)
/// reordered within its own parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectKind {
    Item,
    Container,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverOutcome {
    /// Hover target updated, lists untouched.
    Hovering,
    /// The item was speculatively moved into the hovered container.
    Rehomed,
    /// A splice is in flight; this request waits for `settle`.
    Deferred,
    /// The candidate is not a valid target for the active subject.
    Ignored,
}

/// A completed drop that changed position and now needs committing.
#[derive(Debug, Clone)]
pub struct DropOutcome<T> {
    pub item: T,
    pub subject: SubjectKind,
    pub origin: Location,
    pub destination: Location,
    pub intent: ReorderIntent,
}

#[derive(Debug)]
struct ActiveDrag<T> {
    snapshot: T,
    kind: SubjectKind,
    origin: Location,
}

/// Ephemeral state of one drag gesture.
///
/// Lifecycle: `Idle → Dragging → Idle | Committing`, with `Committing →
/// Idle` once the caller reports the commit resolved. The session never owns
/// list data; every mutation goes through the [`ContainerRegistry`] passed in.
#[derive(Debug)]
pub struct DragSession<T> {
    phase: DragPhase,
    active: Option<ActiveDrag<T>>,
    hover: Option<DropCandidate>,
    gate: SpliceGate,
}

impl<T> Default for DragSession<T> {
    fn default() -> Self {
        Self {
            phase: DragPhase::Idle,
            active: None,
            hover: None,
            gate: SpliceGate::new(),
        }
    }
}

impl<T> DragSession<T>
where
    T: Orderable + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn is_dragging(&self) -> bool {
        self.phase == DragPhase::Dragging
    }

    /// Snapshot of the dragged row taken at drag start.
    pub fn active_item(&self) -> Option<&T> {
        self.active
            .as_ref()
            .filter(|a| a.kind == SubjectKind::Item)
            .map(|a| &a.snapshot)
    }

    /// Snapshot of the dragged container, when a container is being dragged.
    pub fn active_container(&self) -> Option<&T> {
        self.active
            .as_ref()
            .filter(|a| a.kind == SubjectKind::Container)
            .map(|a| &a.snapshot)
    }

    pub fn hover_target(&self) -> Option<&DropCandidate> {
        self.hover.as_ref()
    }

    pub fn gate_state(&self) -> &GateState {
        self.gate.state()
    }

    pub fn start_item(
        &mut self,
        registry: &ContainerRegistry<T>,
        uid: &str,
    ) -> Result<(), DragError> {
        self.start(registry, uid, SubjectKind::Item)
    }

    /// Start dragging a container row (e.g. a column inside its board).
    pub fn start_container(
        &mut self,
        registry: &ContainerRegistry<T>,
        uid: &str,
    ) -> Result<(), DragError> {
        self.start(registry, uid, SubjectKind::Container)
    }

    fn start(
        &mut self,
        registry: &ContainerRegistry<T>,
        uid: &str,
        kind: SubjectKind,
    ) -> Result<(), DragError> {
        match self.phase {
            DragPhase::Idle => {}
            DragPhase::Dragging => {
                let active = self
                    .active
                    .as_ref()
                    .map(|a| a.snapshot.uid().to_string())
                    .unwrap_or_default();
                return Err(DragError::AlreadyDragging { uid: active });
            }
            DragPhase::Committing => return Err(DragError::CommitInFlight),
        }

        let origin = registry
            .locate(uid)
            .ok_or_else(|| DragError::UnknownItem { uid: uid.to_string() })?;
        let snapshot = registry
            .get(uid)
            .cloned()
            .ok_or_else(|| DragError::UnknownItem { uid: uid.to_string() })?;

        debug!(uid, container = %origin.container_id, index = origin.index, ?kind, "drag started");
        self.active = Some(ActiveDrag {
            snapshot,
            kind,
            origin,
        });
        self.hover = None;
        self.gate.reset();
        self.phase = DragPhase::Dragging;
        Ok(())
    }

    /// Handle a drag-over / drag-move signal.
    ///
    /// A candidate in a different container re-homes the item immediately so
    /// the user sees it in the destination list. At most one such splice is
    /// in flight; further ones wait for [`settle`](Self::settle). Hover
    /// indices past the end of the destination are clamped to an append.
    pub fn over(
        &mut self,
        registry: &mut ContainerRegistry<T>,
        candidate: Option<DropCandidate>,
    ) -> Result<OverOutcome, DragError> {
        if self.phase != DragPhase::Dragging {
            return Err(DragError::NotDragging);
        }
        let Some(active) = self.active.as_ref() else {
            return Err(DragError::NotDragging);
        };

        let Some(candidate) = candidate else {
            self.hover = None;
            return Ok(OverOutcome::Hovering);
        };
        if !registry.contains(&candidate.container_id) {
            self.hover = None;
            return Ok(OverOutcome::Ignored);
        }

        if active.kind == SubjectKind::Container {
            if candidate.container_id != active.origin.container_id {
                self.hover = None;
                return Ok(OverOutcome::Ignored);
            }
            self.hover = Some(candidate);
            return Ok(OverOutcome::Hovering);
        }

        let uid = active.snapshot.uid().to_string();
        let current = registry
            .locate(&uid)
            .ok_or_else(|| DragError::UnknownItem { uid: uid.clone() })?;
        trace!(uid = %uid, target = %candidate.container_id, index = candidate.index, "drag over");
        self.hover = Some(candidate.clone());

        let splice = Splice {
            item_uid: uid,
            target: candidate,
        };
        if self.gate.is_busy() {
            self.gate.submit(splice);
            return Ok(OverOutcome::Deferred);
        }
        if current.container_id == splice.target.container_id {
            return Ok(OverOutcome::Hovering);
        }
        match self.gate.submit(splice) {
            Admission::Run(splice) => {
                self.apply_splice(registry, &splice)?;
                Ok(OverOutcome::Rehomed)
            }
            Admission::Queued => Ok(OverOutcome::Deferred),
        }
    }

    /// The UI has rendered the last splice. Runs the pending one, if it is
    /// still needed.
    pub fn settle(
        &mut self,
        registry: &mut ContainerRegistry<T>,
    ) -> Result<Option<OverOutcome>, DragError> {
        if self.active.is_none() {
            self.gate.reset();
            return Ok(None);
        }
        let Some(next) = self.gate.settle() else {
            return Ok(None);
        };

        let Some(current) = registry.locate(&next.item_uid) else {
            self.gate.reset();
            return Err(DragError::UnknownItem { uid: next.item_uid });
        };
        if current.container_id == next.target.container_id
            || !registry.contains(&next.target.container_id)
        {
            self.gate.settle();
            return Ok(None);
        }
        self.apply_splice(registry, &next)?;
        Ok(Some(OverOutcome::Rehomed))
    }

    /// Synthesise an `over` from an arrow key.
    pub fn keyboard_move(
        &mut self,
        registry: &mut ContainerRegistry<T>,
        direction: Direction,
        current: &Rect,
        droppables: &[Droppable],
    ) -> Result<OverOutcome, DragError> {
        let Some(active) = self.active.as_ref() else {
            return Err(DragError::NotDragging);
        };
        let Some(target) = nearest_in_direction(current, direction, droppables) else {
            return Ok(OverOutcome::Ignored);
        };

        let index = registry
            .locate(active.snapshot.uid())
            .map(|loc| loc.index)
            .unwrap_or(0);
        let len = registry.len(&target.container_id).unwrap_or(0);
        let candidate = DropCandidate::new(target.container_id.clone(), index.min(len));
        self.over(registry, Some(candidate))
    }

    /// Finish the gesture.
    ///
    /// Returns `Ok(None)` without committing when the drop target is missing
    /// or unrecognised (speculative moves are undone) or when the row ended
    /// where it started. Otherwise the final position is applied locally and
    /// the returned outcome must be committed; the session stays in
    /// `Committing` until [`finish_commit`](Self::finish_commit).
    pub fn end(
        &mut self,
        registry: &mut ContainerRegistry<T>,
        drop: Option<DropCandidate>,
    ) -> Result<Option<DropOutcome<T>>, DragError> {
        if self.phase != DragPhase::Dragging {
            return Err(DragError::NotDragging);
        }
        self.gate.reset();
        self.hover = None;
        self.phase = DragPhase::Idle;
        let active = self.active.take().ok_or(DragError::NotDragging)?;
        let uid = active.snapshot.uid().to_string();

        let drop = drop
            .filter(|d| registry.contains(&d.container_id))
            .filter(|d| {
                active.kind == SubjectKind::Item || d.container_id == active.origin.container_id
            });
        let Some(drop) = drop else {
            debug!(uid = %uid, "drop outside any container; restoring");
            restore(registry, &uid, &active.origin)?;
            return Ok(None);
        };

        if let Err(err) = finalize(registry, &uid, &drop) {
            restore(registry, &uid, &active.origin)?;
            return Err(err);
        }
        let destination = Location::new(drop.container_id, drop.index);
        if destination == active.origin {
            debug!(uid = %uid, "dropped in place");
            return Ok(None);
        }

        let item = registry
            .get(&uid)
            .cloned()
            .ok_or_else(|| DragError::UnknownItem { uid: uid.clone() })?;
        debug!(
            uid = %uid,
            from = %active.origin.container_id,
            to = %destination.container_id,
            index = destination.index,
            "drop applied"
        );
        self.phase = DragPhase::Committing;
        Ok(Some(DropOutcome {
            item,
            subject: active.kind,
            intent: ReorderIntent {
                item_uid: uid,
                from_container_uid: Some(active.origin.container_id.clone()),
                to_container_uid: destination.container_id.clone(),
                target_index: destination.index,
            },
            origin: active.origin,
            destination,
        }))
    }

    /// Abort the gesture, undoing any speculative re-homing.
    /// Returns `false` when no drag was active.
    pub fn cancel(&mut self, registry: &mut ContainerRegistry<T>) -> Result<bool, DragError> {
        if self.phase != DragPhase::Dragging {
            return Ok(false);
        }
        self.gate.reset();
        self.hover = None;
        self.phase = DragPhase::Idle;
        let Some(active) = self.active.take() else {
            return Ok(false);
        };
        debug!(uid = %active.snapshot.uid(), "drag cancelled");
        restore(registry, active.snapshot.uid(), &active.origin)?;
        Ok(true)
    }

    /// The commit for the last drop resolved (either way).
    pub fn finish_commit(&mut self) {
        if self.phase == DragPhase::Committing {
            self.phase = DragPhase::Idle;
        }
    }

    fn apply_splice(
        &mut self,
        registry: &mut ContainerRegistry<T>,
        splice: &Splice,
    ) -> Result<(), DragError> {
        let target = &splice.target;
        let result = registry
            .len(&target.container_id)
            .ok_or_else(|| DragError::UnknownContainer {
                id: target.container_id.clone(),
            })
            .and_then(|len| {
                registry.move_between(&splice.item_uid, &target.container_id, target.index.min(len))
            });
        if result.is_err() {
            self.gate.reset();
        }
        result
    }
}

fn finalize<T: Orderable + Clone>(
    registry: &mut ContainerRegistry<T>,
    uid: &str,
    drop: &DropCandidate,
) -> Result<(), DragError> {
    let current = registry
        .locate(uid)
        .ok_or_else(|| DragError::UnknownItem { uid: uid.to_string() })?;
    if current.container_id != drop.container_id {
        registry.move_between(uid, &drop.container_id, drop.index)
    } else if current.index != drop.index {
        registry.move_within(&drop.container_id, current.index, drop.index)
    } else {
        Ok(())
    }
}

/// Put `uid` back where the gesture found it.
fn restore<T: Orderable + Clone>(
    registry: &mut ContainerRegistry<T>,
    uid: &str,
    origin: &Location,
) -> Result<(), DragError> {
    let Some(current) = registry.locate(uid) else {
        return Ok(());
    };
    if current == *origin {
        return Ok(());
    }
    if current.container_id != origin.container_id {
        let len = registry.len(&origin.container_id).unwrap_or(0);
        registry.move_between(uid, &origin.container_id, origin.index.min(len))
    } else {
        let len = registry.len(&origin.container_id).unwrap_or(0);
        let index = origin.index.min(len.saturating_sub(1));
        registry.move_within(&origin.container_id, current.index, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardsync_common::OrderedItem;

    fn items(container: &str, uids: &[&str]) -> Vec<OrderedItem> {
        uids.iter()
            .enumerate()
            .map(|(i, uid)| OrderedItem::new(*uid, container, i as u32))
            .collect()
    }

    fn two_columns() -> ContainerRegistry<OrderedItem> {
        let mut reg = ContainerRegistry::new();
        reg.register("source", items("source", &["x", "y"]));
        reg.register("dest", items("dest", &["z"]));
        reg
    }

    #[test]
    fn test_start_captures_value_snapshot() {
        let mut reg = two_columns();
        let mut drag = DragSession::new();
        drag.start_item(&reg, "x").unwrap();
        reg.move_within("source", 0, 1).unwrap();

        let snapshot = drag.active_item().unwrap();
        assert_eq!(snapshot.order, 0);
        assert_eq!(drag.phase(), DragPhase::Dragging);
        assert!(drag.active_container().is_none());
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let reg = two_columns();
        let mut drag = DragSession::new();
        drag.start_item(&reg, "x").unwrap();
        assert_eq!(
            drag.start_item(&reg, "y"),
            Err(DragError::AlreadyDragging {
                uid: "x".to_string()
            })
        );
    }

    #[test]
    fn test_start_unknown_item_fails() {
        let reg = two_columns();
        let mut drag: DragSession<OrderedItem> = DragSession::new();
        assert!(matches!(
            drag.start_item(&reg, "ghost"),
            Err(DragError::UnknownItem { .. })
        ));
        assert_eq!(drag.phase(), DragPhase::Idle);
    }

    #[test]
    fn test_over_other_container_rehomes_speculatively() {
        let mut reg = two_columns();
        let mut drag = DragSession::new();
        drag.start_item(&reg, "x").unwrap();

        let outcome = drag
            .over(&mut reg, Some(DropCandidate::new("dest", 1)))
            .unwrap();

        assert_eq!(outcome, OverOutcome::Rehomed);
        assert_eq!(reg.uids("source"), vec!["y"]);
        assert_eq!(reg.uids("dest"), vec!["z", "x"]);
        assert_eq!(drag.hover_target(), Some(&DropCandidate::new("dest", 1)));
        assert!(reg.is_dense());
    }

    #[test]
    fn test_over_same_container_only_updates_hover() {
        let mut reg = two_columns();
        let mut drag = DragSession::new();
        drag.start_item(&reg, "x").unwrap();
        let outcome = drag
            .over(&mut reg, Some(DropCandidate::new("source", 1)))
            .unwrap();
        assert_eq!(outcome, OverOutcome::Hovering);
        assert_eq!(reg.uids("source"), vec!["x", "y"]);
    }

    #[test]
    fn test_over_unknown_container_is_ignored() {
        let mut reg = two_columns();
        let mut drag = DragSession::new();
        drag.start_item(&reg, "x").unwrap();
        let outcome = drag
            .over(&mut reg, Some(DropCandidate::new("trash", 0)))
            .unwrap();
        assert_eq!(outcome, OverOutcome::Ignored);
        assert!(drag.hover_target().is_none());
    }

    #[test]
    fn test_rapid_moves_are_serialised_through_the_gate() {
        let mut reg = ContainerRegistry::new();
        reg.register("a", items("a", &["item", "a2"]));
        reg.register("b", items("b", &["b1"]));
        reg.register("c", items("c", &["c1"]));
        let mut drag = DragSession::new();
        drag.start_item(&reg, "item").unwrap();

        assert_eq!(
            drag.over(&mut reg, Some(DropCandidate::new("b", 0))).unwrap(),
            OverOutcome::Rehomed
        );
        // Fired before the first splice settled.
        assert_eq!(
            drag.over(&mut reg, Some(DropCandidate::new("c", 0))).unwrap(),
            OverOutcome::Deferred
        );
        assert_eq!(reg.uids("b"), vec!["item", "b1"]);
        assert!(reg.uids("c") == vec!["c1"]);

        assert_eq!(drag.settle(&mut reg).unwrap(), Some(OverOutcome::Rehomed));
        assert_eq!(reg.uids("b"), vec!["b1"]);
        assert_eq!(reg.uids("c"), vec!["item", "c1"]);

        assert_eq!(drag.settle(&mut reg).unwrap(), None);
        assert_eq!(drag.gate_state(), &GateState::Ready);
        assert!(reg.is_dense());
    }

    #[test]
    fn test_pending_splice_back_to_current_container_is_dropped() {
        let mut reg = two_columns();
        let mut drag = DragSession::new();
        drag.start_item(&reg, "x").unwrap();
        drag.over(&mut reg, Some(DropCandidate::new("dest", 0))).unwrap();
        drag.over(&mut reg, Some(DropCandidate::new("dest", 1))).unwrap();

        assert_eq!(drag.settle(&mut reg).unwrap(), None);
        assert_eq!(drag.gate_state(), &GateState::Ready);
        assert_eq!(reg.uids("dest"), vec!["x", "z"]);
    }

    #[test]
    fn test_cancel_restores_speculative_rehome() {
        let mut reg = two_columns();
        let before_source = reg.items("source").unwrap().to_vec();
        let before_dest = reg.items("dest").unwrap().to_vec();
        let mut drag = DragSession::new();

        drag.start_item(&reg, "x").unwrap();
        drag.over(&mut reg, Some(DropCandidate::new("dest", 1))).unwrap();
        assert!(drag.cancel(&mut reg).unwrap());

        assert_eq!(reg.items("source").unwrap(), before_source.as_slice());
        assert_eq!(reg.items("dest").unwrap(), before_dest.as_slice());
        assert_eq!(drag.phase(), DragPhase::Idle);
        assert!(drag.active_item().is_none());
        assert!(drag.hover_target().is_none());
    }

    #[test]
    fn test_cancel_when_idle_is_noop() {
        let mut reg = two_columns();
        let mut drag: DragSession<OrderedItem> = DragSession::new();
        assert!(!drag.cancel(&mut reg).unwrap());
    }

    #[test]
    fn test_end_within_container_produces_intent() {
        let mut reg = ContainerRegistry::new();
        reg.register("col", items("col", &["t1", "t2", "t3"]));
        let mut drag = DragSession::new();
        drag.start_item(&reg, "t1").unwrap();
        drag.over(&mut reg, Some(DropCandidate::new("col", 2))).unwrap();

        let outcome = drag
            .end(&mut reg, Some(DropCandidate::new("col", 2)))
            .unwrap()
            .expect("position changed");

        assert_eq!(reg.uids("col"), vec!["t2", "t3", "t1"]);
        assert_eq!(outcome.origin, Location::new("col", 0));
        assert_eq!(outcome.destination, Location::new("col", 2));
        assert_eq!(outcome.item.order, 2);
        assert_eq!(
            outcome.intent,
            ReorderIntent {
                item_uid: "t1".to_string(),
                from_container_uid: Some("col".to_string()),
                to_container_uid: "col".to_string(),
                target_index: 2,
            }
        );
        assert_eq!(drag.phase(), DragPhase::Committing);
        drag.finish_commit();
        assert_eq!(drag.phase(), DragPhase::Idle);
    }

    #[test]
    fn test_end_after_rehome_finalises_destination_index() {
        let mut reg = two_columns();
        let mut drag = DragSession::new();
        drag.start_item(&reg, "x").unwrap();
        drag.over(&mut reg, Some(DropCandidate::new("dest", 0))).unwrap();

        let outcome = drag
            .end(&mut reg, Some(DropCandidate::new("dest", 1)))
            .unwrap()
            .unwrap();

        assert_eq!(reg.uids("dest"), vec!["z", "x"]);
        assert_eq!(reg.uids("source"), vec!["y"]);
        assert_eq!(outcome.item.container_id, "dest");
        assert!(outcome.intent.is_cross_container());
    }

    #[test]
    fn test_end_without_target_undoes_everything() {
        let mut reg = two_columns();
        let mut drag = DragSession::new();
        drag.start_item(&reg, "x").unwrap();
        drag.over(&mut reg, Some(DropCandidate::new("dest", 0))).unwrap();

        assert!(drag.end(&mut reg, None).unwrap().is_none());
        assert_eq!(reg.uids("source"), vec!["x", "y"]);
        assert_eq!(reg.uids("dest"), vec!["z"]);
        assert_eq!(drag.phase(), DragPhase::Idle);
    }

    #[test]
    fn test_end_in_place_commits_nothing() {
        let mut reg = two_columns();
        let mut drag = DragSession::new();
        drag.start_item(&reg, "y").unwrap();
        assert!(
            drag.end(&mut reg, Some(DropCandidate::new("source", 1)))
                .unwrap()
                .is_none()
        );
        assert_eq!(drag.phase(), DragPhase::Idle);
    }

    #[test]
    fn test_end_with_out_of_range_index_fails_and_restores() {
        let mut reg = two_columns();
        let mut drag = DragSession::new();
        drag.start_item(&reg, "x").unwrap();
        drag.over(&mut reg, Some(DropCandidate::new("dest", 1))).unwrap();

        let err = drag
            .end(&mut reg, Some(DropCandidate::new("source", 5)))
            .unwrap_err();
        assert!(matches!(err, DragError::Reorder(_)));
        assert_eq!(reg.uids("source"), vec!["x", "y"]);
        assert_eq!(reg.uids("dest"), vec!["z"]);
        assert_eq!(drag.phase(), DragPhase::Idle);
    }

    #[test]
    fn test_container_drag_reorders_within_parent_only() {
        let mut reg = ContainerRegistry::new();
        reg.register("board", items("board", &["todo", "doing", "done"]));
        reg.register("elsewhere", Vec::new());
        let mut drag = DragSession::new();
        drag.start_container(&reg, "done").unwrap();
        assert!(drag.active_container().is_some());
        assert!(drag.active_item().is_none());

        assert_eq!(
            drag.over(&mut reg, Some(DropCandidate::new("elsewhere", 0)))
                .unwrap(),
            OverOutcome::Ignored
        );
        let outcome = drag
            .end(&mut reg, Some(DropCandidate::new("board", 0)))
            .unwrap()
            .unwrap();
        assert_eq!(outcome.subject, SubjectKind::Container);
        assert_eq!(reg.uids("board"), vec!["done", "todo", "doing"]);
    }

    #[test]
    fn test_keyboard_move_rehomes_into_neighbour() {
        let mut reg = two_columns();
        let mut drag = DragSession::new();
        drag.start_item(&reg, "y").unwrap();
        let droppables = vec![
            Droppable::new("source", Rect::new(0.0, 0.0, 100.0, 300.0)),
            Droppable::new("dest", Rect::new(120.0, 0.0, 100.0, 300.0)),
        ];
        let current = Rect::new(10.0, 50.0, 80.0, 30.0);

        let outcome = drag
            .keyboard_move(&mut reg, Direction::Right, &current, &droppables)
            .unwrap();

        assert_eq!(outcome, OverOutcome::Rehomed);
        assert_eq!(reg.uids("dest"), vec!["z", "y"]);
        let top_row = Rect::new(130.0, 0.0, 80.0, 30.0);
        assert_eq!(
            drag.keyboard_move(&mut reg, Direction::Up, &top_row, &droppables)
                .unwrap(),
            OverOutcome::Ignored
        );
    }

    #[test]
    fn test_operations_require_an_active_drag() {
        let mut reg = two_columns();
        let mut drag: DragSession<OrderedItem> = DragSession::new();
        assert_eq!(
            drag.over(&mut reg, Some(DropCandidate::new("dest", 0))),
            Err(DragError::NotDragging)
        );
        assert!(matches!(drag.end(&mut reg, None), Err(DragError::NotDragging)));
    }
}
