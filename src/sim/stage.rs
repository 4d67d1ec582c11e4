/// StageSimulation: the complete state of one running stage.
///
/// ## Board Layers
///
/// Two copies of the board:
///   - `base`: the stage as loaded. **Never mutated**.
///   - `grid`: the live board (base + everything that happened since).
///
/// `reset()` restores `grid = base.clone()` and respawns the actors.
/// `undo()` restores the newest history snapshot and moves the existing
/// actors back by id.
///
/// The per-tick algorithm lives in `step.rs`.

use crate::domain::entity::ActorId;
use crate::domain::grid::Grid;
use crate::domain::rules;
use crate::domain::tile::Tile;
use super::actor::Actor;
use super::history::{HistorySnapshot, HistoryStack};
use super::slide::SlideAnimation;

/// Simulation tuning, projected from `GameConfig::sim()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimConfig {
    /// Ticks an actor spends crossing one cell.
    pub move_ticks: u32,
    /// Ticks a pushed block spends per cell travelled.
    pub slide_ticks_per_cell: u32,
    /// Undo depth; 0 disables undo.
    pub history_depth: usize,
    pub particles_per_target: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            move_ticks: 10,
            slide_ticks_per_cell: 10,
            history_depth: 256,
            particles_per_target: 24,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UndoOutcome {
    Applied,
    NothingToUndo,
    /// An actor is moving or a block is sliding.
    Busy,
}

pub struct StageSimulation {
    index: usize,
    base: Grid,
    pub(super) grid: Grid,
    pub(super) actors: Vec<Actor>,
    pub(super) slide: SlideAnimation,
    pub(super) history: HistoryStack,
    pub(super) cleared: bool,
    pub(super) config: SimConfig,
    pub(super) tick: u64,
}

// ── Construction ──

impl StageSimulation {
    pub fn new(index: usize, base: Grid, config: SimConfig) -> Self {
        let grid = base.clone();
        let actors = spawn_actors(&grid);
        let cleared = rules::is_cleared(&grid);
        log::debug!(
            "stage {index}: {}x{} {:?}, {} actors",
            grid.width(), grid.height(), grid.topology(), actors.len(),
        );
        StageSimulation {
            index,
            base,
            grid,
            actors,
            slide: SlideAnimation::Idle,
            history: HistoryStack::new(config.history_depth),
            cleared,
            config,
            tick: 0,
        }
    }

    /// Back to the base layer. Actors are recreated and history is dropped.
    /// A base layer with no targets left counts as cleared straight away.
    pub fn reset(&mut self) {
        self.grid = self.base.clone();
        self.actors = spawn_actors(&self.grid);
        self.history.clear();
        self.slide.cancel();
        self.cleared = rules::is_cleared(&self.grid);
        log::debug!("stage {} reset", self.index);
    }

    /// Restore the newest snapshot, if nothing is in motion.
    pub fn undo(&mut self) -> UndoOutcome {
        if self.is_busy() {
            return UndoOutcome::Busy;
        }
        let Some(snapshot) = self.history.pop() else {
            return UndoOutcome::NothingToUndo;
        };
        self.grid.restore(&snapshot.cells);
        for &(id, pos) in snapshot.actors.iter() {
            if let Some(actor) = self.actors.iter_mut().find(|a| a.id == id) {
                actor.reposition(pos);
            }
        }
        self.slide.cancel();
        self.cleared = rules::is_cleared(&self.grid);
        log::debug!("undo applied, {} left", self.history.len());
        UndoOutcome::Applied
    }

    pub(super) fn capture(&self) -> HistorySnapshot {
        HistorySnapshot {
            cells: self.grid.snapshot(),
            actors: self.actors.iter().map(|a| (a.id, a.pos)).collect(),
        }
    }
}

/// One actor per actor tile, ids in scan order.
fn spawn_actors(grid: &Grid) -> Vec<Actor> {
    grid.positions_of(Tile::Actor)
        .into_iter()
        .enumerate()
        .map(|(i, pos)| Actor::new(ActorId(i), pos))
        .collect()
}

// ── Read-only accessors (render / persistence collaborators) ──

impl StageSimulation {
    pub fn grid(&self) -> &Grid { &self.grid }

    pub fn actors(&self) -> &[Actor] { &self.actors }

    pub fn config(&self) -> &SimConfig { &self.config }

    pub fn is_cleared(&self) -> bool { self.cleared }

    pub fn history_depth(&self) -> usize { self.history.len() }

    pub fn tick(&self) -> u64 { self.tick }

    pub fn stage_index(&self) -> usize { self.index }

    /// Where progression goes once this stage is done.
    pub fn next_stage_index(&self) -> Option<usize> {
        self.cleared.then_some(self.index + 1)
    }

    pub fn slide(&self) -> &SlideAnimation { &self.slide }

    pub fn slide_render_position(&self) -> Option<(f32, f32)> {
        self.slide.render_position(&self.grid)
    }

    pub fn actor_render_position(&self, actor: &Actor) -> (f32, f32) {
        actor.render_position(&self.grid, self.config.move_ticks)
    }

    /// Something is still in motion (undo is refused meanwhile).
    pub fn is_busy(&self) -> bool {
        self.slide.is_in_flight() || self.actors.iter().any(Actor::is_moving)
    }

    pub fn targets_remaining(&self) -> usize {
        rules::targets_remaining(&self.grid)
    }
}
