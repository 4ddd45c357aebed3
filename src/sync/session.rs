use std::sync::Arc;

use boardsync_common::{OrderChangedEvent, OrderedItem, WsMessage};

use super::api::BoardApi;
use super::commit::{CommitOutcome, Notice, resolve};
use super::reconcile::{ApplyOutcome, Reconciler};
use crate::drag::{
    ContainerRegistry, Direction, DragSession, DropCandidate, DropOutcome, Droppable,
    OverOutcome, Rect,
};
use crate::errors::{CommitError, DragError};

/// Everything one open board needs on the client: its lists, the current
/// drag, echo bookkeeping, and the API to commit through.
///
/// A drop is committed in three steps so the session is never borrowed
/// across the request:
///
/// ```ignore
/// if let Some(drop) = session.drag_end(target)? {
///     let api = session.api();
///     let result = commit_drop(api.as_ref(), &drop).await;
///     session.complete_commit(&drop, result);
/// }
/// ```
///
/// Broadcasts passed to [`receive`](Self::receive) in the meantime are
/// applied as usual; a new drag is refused until the commit completes.
pub struct BoardSession<A> {
    registry: ContainerRegistry<OrderedItem>,
    drag: DragSession<OrderedItem>,
    reconciler: Reconciler,
    api: Arc<A>,
    notices: Vec<Notice>,
}

impl<A: BoardApi> BoardSession<A> {
    pub fn new(api: A) -> Self {
        Self {
            registry: ContainerRegistry::new(),
            drag: DragSession::new(),
            reconciler: Reconciler::new(),
            api: Arc::new(api),
            notices: Vec::new(),
        }
    }

    pub fn api(&self) -> Arc<A> {
        Arc::clone(&self.api)
    }

    pub fn registry(&self) -> &ContainerRegistry<OrderedItem> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ContainerRegistry<OrderedItem> {
        &mut self.registry
    }

    pub fn drag(&self) -> &DragSession<OrderedItem> {
        &self.drag
    }

    pub fn drag_start(&mut self, uid: &str) -> Result<(), DragError> {
        self.drag.start_item(&self.registry, uid)
    }

    pub fn drag_start_container(&mut self, uid: &str) -> Result<(), DragError> {
        self.drag.start_container(&self.registry, uid)
    }

    pub fn drag_over(&mut self, candidate: Option<DropCandidate>) -> Result<OverOutcome, DragError> {
        self.drag.over(&mut self.registry, candidate)
    }

    pub fn drag_settled(&mut self) -> Result<Option<OverOutcome>, DragError> {
        self.drag.settle(&mut self.registry)
    }

    pub fn drag_key(
        &mut self,
        direction: Direction,
        current: &Rect,
        droppables: &[Droppable],
    ) -> Result<OverOutcome, DragError> {
        self.drag
            .keyboard_move(&mut self.registry, direction, current, droppables)
    }

    pub fn drag_cancel(&mut self) -> Result<bool, DragError> {
        self.drag.cancel(&mut self.registry)
    }

    /// End the drag. A drop that moved the row is already applied locally
    /// and is returned for committing; the session stays `Committing` until
    /// [`complete_commit`](Self::complete_commit). `None` when nothing needs
    /// saving.
    pub fn drag_end(
        &mut self,
        drop: Option<DropCandidate>,
    ) -> Result<Option<DropOutcome<OrderedItem>>, DragError> {
        self.drag.end(&mut self.registry, drop)
    }

    /// Fold the server's answer for `drop` back into the lists and unlock
    /// the drag. A failed commit is reverted and queued as a notice.
    pub fn complete_commit(
        &mut self,
        drop: &DropOutcome<OrderedItem>,
        result: Result<OrderChangedEvent, CommitError>,
    ) -> CommitOutcome {
        let outcome = resolve(&mut self.registry, &mut self.reconciler, drop, result);
        self.drag.finish_commit();
        if let CommitOutcome::Reverted(notice) = &outcome {
            self.notices.push(notice.clone());
        }
        outcome
    }

    /// Feed one server message into the local lists.
    pub fn receive(&mut self, msg: &WsMessage) -> ApplyOutcome {
        self.reconciler.apply(&mut self.registry, msg)
    }

    /// Drain notices raised since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
