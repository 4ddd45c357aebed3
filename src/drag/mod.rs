//! Client-side drag-and-drop reordering.
//!
//! ## Module Map
//!
//! | Module     | Responsibility                                            |
//! |------------|-----------------------------------------------------------|
//! | `registry` | `ContainerRegistry`: the on-screen lists plus listeners   |
//! | `session`  | `DragSession`: start / over / end / cancel state machine  |
//! | `gate`     | `SpliceGate`: one speculative cross-container splice at a time |
//! | `keyboard` | Arrow-key hit testing against droppable rectangles        |
//!
//! The registry is created per board session and passed into every drag
//! call, so two sessions (e.g. two boards in one process) never share lists.

pub mod gate;
pub mod keyboard;
pub mod registry;
pub mod session;

pub use gate::{GateState, SpliceGate};
pub use keyboard::{Direction, Droppable, Rect};
pub use registry::{AlignReport, ContainerRegistry, Location};
pub use session::{DragPhase, DragSession, DropCandidate, DropOutcome, OverOutcome, SubjectKind};
