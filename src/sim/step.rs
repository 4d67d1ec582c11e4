/// The step function: advances a stage by one tick.
///
/// Processing order:
///   0. Restart / undo requests (either one ends the tick)
///   1. Slide animation
///   2. Prevented-direction release
///   3. Start moves (fixpoint over all idle actors)
///   4. Advance moving actors, resolving arrivals front-most first
///   5. Clear check
///
/// Moves only start when nothing was moving at the start of the tick, so
/// every mover shares one direction and one timer phase. All arrivals of a
/// tick therefore happen together.

use crate::domain::entity::{Direction, FrameInput, GridPos};
use crate::domain::rules;
use super::actor::Actor;
use super::event::{StageEvent, UndoRefusal};
use super::interaction::{HitOutcome, Resolver};
use super::stage::{StageSimulation, UndoOutcome};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(stage: &mut StageSimulation, input: FrameInput) -> Vec<StageEvent> {
    let mut events: Vec<StageEvent> = Vec::new();

    if input.restart {
        stage.reset();
        events.push(StageEvent::Restarted);
        return events;
    }
    if input.undo {
        events.push(match stage.undo() {
            UndoOutcome::Applied => StageEvent::UndoApplied,
            UndoOutcome::NothingToUndo => StageEvent::UndoRefused(UndoRefusal::NothingToUndo),
            UndoOutcome::Busy => StageEvent::UndoRefused(UndoRefusal::Busy),
        });
        return events;
    }

    stage.tick += 1;
    let was_cleared = stage.cleared;
    let moving_at_start = stage.actors.iter().any(Actor::is_moving);
    log::trace!("tick {} input {:?}", stage.tick, input.movement);

    stage.slide.advance(&mut stage.grid, &mut events);
    release_prevented(stage, input.movement);
    if !moving_at_start && !stage.cleared && !stage.slide.is_in_flight() {
        start_moves(stage, input.movement, &mut events);
    }
    advance_actors(stage, &mut events);
    resolve_clear(stage, was_cleared, &mut events);

    events
}

// ══════════════════════════════════════════════════════════════
// Prevented direction
// ══════════════════════════════════════════════════════════════

fn release_prevented(stage: &mut StageSimulation, input: Option<Direction>) {
    for actor in stage.actors.iter_mut().filter(|a| !a.is_moving()) {
        actor.clear_prevented(input);
    }
}

// ══════════════════════════════════════════════════════════════
// Start moves
//
// An actor blocked only by another actor that starts this tick may start
// too, so the scan repeats until a pass starts nobody. Each pass starts at
// least one actor or ends the loop, hence actors + 1 passes suffice.
// ══════════════════════════════════════════════════════════════

fn start_moves(stage: &mut StageSimulation, input: Option<Direction>, events: &mut Vec<StageEvent>) {
    let mut snapshot_taken = false;
    let max_passes = stage.actors.len() + 1;

    for _ in 0..max_passes {
        let mut started = false;
        for i in 0..stage.actors.len() {
            let Some(dir) = stage.actors[i].plan_start(&stage.grid, input) else { continue };
            // One snapshot per tick, taken before the first actor lifts its tile.
            if !snapshot_taken {
                let snapshot = stage.capture();
                stage.history.push(snapshot);
                snapshot_taken = true;
            }
            let move_ticks = stage.config.move_ticks;
            let actor = &mut stage.actors[i];
            actor.begin_move(&mut stage.grid, dir, move_ticks);
            log::debug!("actor {:?} starts {:?} from {:?}", actor.id, dir, actor.pos);
            events.push(StageEvent::ActorStarted { id: actor.id, dir });
            started = true;
        }
        if !started { break; }
    }
}

// ══════════════════════════════════════════════════════════════
// Advance moving actors
//
// Phase 1: count every mover down; collect those that stepped a cell
// Phase 2: order arrivals front-most first
// Phase 3: resolve the cell ahead of each, then continue or settle
// ══════════════════════════════════════════════════════════════

fn advance_actors(stage: &mut StageSimulation, events: &mut Vec<StageEvent>) {
    // ── Phase 1 ──
    let mut arrived: Vec<usize> = Vec::new();
    for (i, actor) in stage.actors.iter_mut().enumerate() {
        if actor.countdown(&stage.grid).is_some() {
            arrived.push(i);
        }
    }
    if arrived.is_empty() { return; }

    // ── Phase 2 ──
    let order = arrival_order(stage, arrived);

    // ── Phase 3 ──
    let mut pending: Vec<usize> = order.clone();
    for i in order {
        pending.retain(|&j| j != i);
        let Some(dir) = stage.actors[i].direction() else { continue };
        let ahead = stage.grid.neighbor(stage.actors[i].pos, dir);

        if is_reserved(stage, i, ahead) {
            settle(stage, i, events);
            continue;
        }

        let occupied = unwritten_cells(stage, &pending);
        let actor = &mut stage.actors[i];
        let mut resolver = Resolver {
            grid: &mut stage.grid,
            slide: &mut stage.slide,
            cleared: &mut stage.cleared,
            events: &mut *events,
            config: &stage.config,
            occupied: &occupied,
        };
        let outcome = resolver.enter(ahead, dir, &mut actor.prevented);

        if outcome == HitOutcome::None && !rules::is_solid_at(&stage.grid, ahead, true) {
            actor.continue_move(stage.config.move_ticks);
        } else {
            settle(stage, i, events);
        }
    }
}

/// Front-most first: an arrival goes before any arrival whose next cell it
/// currently holds. Falls back to list order if every candidate is waiting
/// on another one.
fn arrival_order(stage: &StageSimulation, mut pending: Vec<usize>) -> Vec<usize> {
    let mut order = Vec::with_capacity(pending.len());
    while !pending.is_empty() {
        let pick = pending
            .iter()
            .position(|&i| {
                let ahead = stage.actors[i].destination(&stage.grid);
                !pending.iter().any(|&j| j != i && Some(stage.actors[j].pos) == ahead)
            })
            .unwrap_or(0);
        order.push(pending.remove(pick));
    }
    order
}

/// Is `cell` the destination of some other actor that is still moving?
fn is_reserved(stage: &StageSimulation, me: usize, cell: GridPos) -> bool {
    stage.actors.iter().enumerate().any(|(j, other)| {
        j != me && other.destination(&stage.grid) == Some(cell)
    })
}

/// Cells actors will end up writing to: every mover's current cell and,
/// for those already committed to keep going, the next one.
fn unwritten_cells(stage: &StageSimulation, pending: &[usize]) -> Vec<GridPos> {
    let mut cells = Vec::new();
    for (j, actor) in stage.actors.iter().enumerate() {
        if !actor.is_moving() { continue; }
        cells.push(actor.pos);
        if !pending.contains(&j) {
            if let Some(dest) = actor.destination(&stage.grid) {
                cells.push(dest);
            }
        }
    }
    cells
}

fn settle(stage: &mut StageSimulation, i: usize, events: &mut Vec<StageEvent>) {
    let actor = &mut stage.actors[i];
    actor.settle(&mut stage.grid);
    log::debug!("actor {:?} stops at {:?}", actor.id, actor.pos);
    events.push(StageEvent::ActorStopped { id: actor.id, x: actor.pos.x, y: actor.pos.y });
}

// ══════════════════════════════════════════════════════════════
// Clear check
// ══════════════════════════════════════════════════════════════

fn resolve_clear(stage: &mut StageSimulation, was_cleared: bool, events: &mut Vec<StageEvent>) {
    stage.cleared = rules::is_cleared(&stage.grid);
    if stage.cleared && !was_cleared {
        log::debug!("stage {} cleared on tick {}", stage.stage_index(), stage.tick);
        events.push(StageEvent::StageCleared);
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
