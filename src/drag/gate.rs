//! Single-slot serialisation of speculative cross-container splices.
//!
//! A splice (item leaves one list, enters another) is in flight from the
//! moment it is applied until the UI reports the resulting state as settled.
//! Hover events keep arriving meanwhile; they must not start a second splice
//! against lists that have not been rendered yet. The gate admits one splice,
//! keeps at most one more in a pending slot (the newest request replaces an
//! older pending one), and hands the pending splice out on settle.

use super::session::DropCandidate;

/// One speculative re-home request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    pub item_uid: String,
    pub target: DropCandidate,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GateState {
    #[default]
    Ready,
    Busy {
        in_flight: Splice,
        pending: Option<Splice>,
    },
}

/// Result of [`SpliceGate::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// The caller must apply this splice now.
    Run(Splice),
    /// Parked in the pending slot until the in-flight splice settles.
    Queued,
}

#[derive(Debug, Default)]
pub struct SpliceGate {
    state: GateState,
}

impl SpliceGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, GateState::Busy { .. })
    }

    pub fn submit(&mut self, splice: Splice) -> Admission {
        if let GateState::Busy { pending, .. } = &mut self.state {
            *pending = Some(splice);
            return Admission::Queued;
        }
        self.state = GateState::Busy {
            in_flight: splice.clone(),
            pending: None,
        };
        Admission::Run(splice)
    }

    /// Mark the in-flight splice as rendered. Returns the pending splice,
    /// which becomes the new in-flight one and must be applied by the caller.
    pub fn settle(&mut self) -> Option<Splice> {
        match std::mem::take(&mut self.state) {
            GateState::Ready => None,
            GateState::Busy { pending: None, .. } => None,
            GateState::Busy {
                pending: Some(next),
                ..
            } => {
                self.state = GateState::Busy {
                    in_flight: next.clone(),
                    pending: None,
                };
                Some(next)
            }
        }
    }

    /// Drop everything, e.g. when the gesture ends.
    pub fn reset(&mut self) {
        self.state = GateState::Ready;
    }
}
