/// Events emitted during a simulation step.
/// The presentation layer consumes these for HUD messages and effects.

use crate::domain::entity::{ActorId, Direction, GridPos};
use crate::domain::tile::TargetVariant;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageEvent {
    ActorStarted { id: ActorId, dir: Direction },
    ActorStopped { id: ActorId, x: i32, y: i32 },
    TargetDestroyed { x: i32, y: i32, variant: TargetVariant, particles: u32 },
    TargetsToggled,
    SlideStarted { from: GridPos, to: GridPos, distance: u32 },
    SlideSettled { x: i32, y: i32 },
    StageCleared,
    UndoApplied,
    UndoRefused(UndoRefusal),
    Restarted,
}

/// Why an undo request did nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UndoRefusal {
    NothingToUndo,
    Busy,
}
