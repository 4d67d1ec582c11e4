pub mod actor;
pub mod event;
pub mod history;
pub mod interaction;
pub mod level;
pub mod slide;
pub mod stage;
pub mod step;

pub use event::{StageEvent, UndoRefusal};
pub use stage::{SimConfig, StageSimulation, UndoOutcome};
pub use step::step;
