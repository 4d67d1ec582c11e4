/// ActorController: one player block.
///
/// `pos` is authoritative for collision. While moving, the actor's tile is
/// NOT on the grid: the start cell is cleared to floor on `begin_move` and
/// `Tile::Actor` is written back only on `settle`.
///
///   Idle ──begin_move──▶ Moving{dir, timer}
///   Moving: timer -1 per tick; at 0 the actor steps one cell, then the
///   stage either tops the timer up (`continue_move`) or calls `settle`.

use crate::domain::entity::{ActorId, Direction, GridPos};
use crate::domain::grid::{Grid, Topology};
use crate::domain::rules;
use crate::domain::tile::Tile;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Motion {
    Idle,
    Moving { dir: Direction, timer: u32 },
}

#[derive(Clone, Debug)]
pub struct Actor {
    pub id: ActorId,
    pub pos: GridPos,
    pub motion: Motion,
    /// Last direction that ended in a hard stop; blocks retrying it until
    /// the input changes.
    pub prevented: Option<Direction>,
    pub facing: Direction,
}

impl Actor {
    pub fn new(id: ActorId, pos: GridPos) -> Self {
        Actor { id, pos, motion: Motion::Idle, prevented: None, facing: Direction::Down }
    }

    pub fn is_moving(&self) -> bool {
        matches!(self.motion, Motion::Moving { .. })
    }

    pub fn direction(&self) -> Option<Direction> {
        match self.motion {
            Motion::Moving { dir, .. } => Some(dir),
            Motion::Idle => None,
        }
    }

    /// The cell this actor will arrive at next, if moving.
    pub fn destination(&self, grid: &Grid) -> Option<GridPos> {
        self.direction().map(|dir| grid.neighbor(self.pos, dir))
    }

    /// Forget the remembered hard stop once the player lets go of it.
    pub fn clear_prevented(&mut self, input: Option<Direction>) {
        if self.prevented.is_some() && self.prevented != input {
            self.prevented = None;
        }
    }

    /// Would this actor start moving on `input` right now?
    pub fn plan_start(&self, grid: &Grid, input: Option<Direction>) -> Option<Direction> {
        if self.is_moving() { return None; }
        rules::can_start(grid, self.pos, input, self.prevented)
    }

    pub fn begin_move(&mut self, grid: &mut Grid, dir: Direction, move_ticks: u32) {
        grid.set_at(self.pos, Tile::Floor);
        self.motion = Motion::Moving { dir, timer: move_ticks };
        self.facing = dir;
    }

    /// Count one tick down. Returns the direction travelled if the actor
    /// stepped into its next cell this tick.
    pub fn countdown(&mut self, grid: &Grid) -> Option<Direction> {
        let Motion::Moving { dir, timer } = &mut self.motion else { return None };
        *timer = timer.saturating_sub(1);
        if *timer > 0 { return None; }
        let dir = *dir;
        self.pos = grid.neighbor(self.pos, dir);
        Some(dir)
    }

    pub fn continue_move(&mut self, move_ticks: u32) {
        if let Motion::Moving { timer, .. } = &mut self.motion {
            *timer += move_ticks;
        }
    }

    pub fn settle(&mut self, grid: &mut Grid) {
        grid.set_at(self.pos, Tile::Actor);
        self.motion = Motion::Idle;
    }

    /// Undo: put the actor back without replaying any movement.
    pub fn reposition(&mut self, pos: GridPos) {
        self.pos = pos;
        self.motion = Motion::Idle;
        self.prevented = None;
    }

    /// Interpolated position in cell units for the renderer.
    pub fn render_position(&self, grid: &Grid, move_ticks: u32) -> (f32, f32) {
        let (x, y) = (self.pos.x as f32, self.pos.y as f32);
        let Motion::Moving { dir, timer } = self.motion else { return (x, y) };
        let progress = 1.0 - (timer as f32 / move_ticks.max(1) as f32).clamp(0.0, 1.0);
        let (dx, dy) = dir.delta();
        let mut rx = x + dx as f32 * progress;
        let mut ry = y + dy as f32 * progress;
        if grid.topology() == Topology::Toroidal {
            rx = rx.rem_euclid(grid.width() as f32);
            ry = ry.rem_euclid(grid.height() as f32);
        }
        (rx, ry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rules::grid_from;

    fn actor_at(x: i32, y: i32) -> Actor {
        Actor::new(ActorId(0), GridPos::new(x, y))
    }

    #[test]
    fn begin_move_lifts_tile() {
        let mut g = grid_from(&["P.."], Topology::Bounded);
        let mut a = actor_at(0, 0);
        assert_eq!(a.plan_start(&g, Some(Direction::Right)), Some(Direction::Right));
        a.begin_move(&mut g, Direction::Right, 10);
        assert_eq!(g.get(0, 0, Tile::Wall), Tile::Floor);
        assert_eq!(a.motion, Motion::Moving { dir: Direction::Right, timer: 10 });
        assert_eq!(a.facing, Direction::Right);
    }

    #[test]
    fn moving_actor_does_not_plan() {
        let mut g = grid_from(&["P.."], Topology::Bounded);
        let mut a = actor_at(0, 0);
        a.begin_move(&mut g, Direction::Right, 10);
        assert_eq!(a.plan_start(&g, Some(Direction::Right)), None);
    }

    #[test]
    fn countdown_steps_after_timer() {
        let mut g = grid_from(&["P.."], Topology::Bounded);
        let mut a = actor_at(0, 0);
        a.begin_move(&mut g, Direction::Right, 3);
        assert_eq!(a.countdown(&g), None);
        assert_eq!(a.countdown(&g), None);
        assert_eq!(a.countdown(&g), Some(Direction::Right));
        assert_eq!(a.pos, GridPos::new(1, 0));
        a.continue_move(3);
        assert_eq!(a.motion, Motion::Moving { dir: Direction::Right, timer: 3 });
    }

    #[test]
    fn countdown_wraps_on_torus() {
        let mut g = grid_from(&["..P"], Topology::Toroidal);
        let mut a = actor_at(2, 0);
        a.begin_move(&mut g, Direction::Right, 1);
        assert_eq!(a.countdown(&g), Some(Direction::Right));
        assert_eq!(a.pos, GridPos::new(0, 0));
    }

    #[test]
    fn settle_writes_tile() {
        let mut g = grid_from(&["P.."], Topology::Bounded);
        let mut a = actor_at(0, 0);
        a.begin_move(&mut g, Direction::Right, 1);
        a.countdown(&g);
        a.settle(&mut g);
        assert_eq!(g.get(1, 0, Tile::Wall), Tile::Actor);
        assert!(!a.is_moving());
    }

    #[test]
    fn prevented_clears_on_other_input() {
        let mut a = actor_at(0, 0);
        a.prevented = Some(Direction::Left);
        a.clear_prevented(Some(Direction::Left));
        assert_eq!(a.prevented, Some(Direction::Left));
        a.clear_prevented(None);
        assert_eq!(a.prevented, None);
    }

    #[test]
    fn render_position_interpolates_and_wraps() {
        let mut g = grid_from(&["..P"], Topology::Toroidal);
        let mut a = actor_at(2, 0);
        assert_eq!(a.render_position(&g, 10), (2.0, 0.0));
        a.begin_move(&mut g, Direction::Right, 10);
        for _ in 0..5 {
            a.countdown(&g);
        }
        assert_eq!(a.render_position(&g, 10), (2.5, 0.0));

        let mut b = actor_at(0, 0);
        b.motion = Motion::Moving { dir: Direction::Left, timer: 5 };
        assert_eq!(b.render_position(&g, 10), (2.5, 0.0));
    }

    #[test]
    fn reposition_resets_state() {
        let mut a = actor_at(0, 0);
        a.motion = Motion::Moving { dir: Direction::Up, timer: 4 };
        a.prevented = Some(Direction::Up);
        a.reposition(GridPos::new(3, 2));
        assert_eq!(a.pos, GridPos::new(3, 2));
        assert!(!a.is_moving());
        assert_eq!(a.prevented, None);
    }
}
