/// InteractionResolver: what happens when a moving actor's leading edge
/// enters a cell.
///
/// ## Hit Truth Table
///
/// ┌──────────────┬───────────┬───────────┬─────────────────────────────┐
/// │ Entered cell  │ prevented │ Outcome   │ Grid effect                  │
/// ├──────────────┼───────────┼───────────┼─────────────────────────────┤
/// │ TargetA (3)   │ -         │ None      │ cleared to floor             │
/// │ TargetB (4)   │ set       │ Stop      │ cleared to floor             │
/// │ Toggle  (6)   │ -         │ Stop      │ cleared, A<->B unless clear  │
/// │ Slide   (5)   │ set       │ Stop      │ block launched to obstacle   │
/// │ anything else │ -         │ None      │ none                         │
/// └──────────────┴───────────┴───────────┴─────────────────────────────┘
///
/// The clear flag is recomputed after every destruction so that the
/// toggle swap can be suppressed on the final target.

use crate::domain::entity::{Direction, GridPos};
use crate::domain::grid::Grid;
use crate::domain::rules;
use crate::domain::tile::{TargetVariant, Tile};
use super::event::StageEvent;
use super::slide::SlideAnimation;
use super::stage::SimConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitOutcome {
    /// Keep going.
    None,
    /// Halt at the current resting cell.
    Stop,
}

/// Mutable stage state the resolver is allowed to touch.
pub struct Resolver<'a> {
    pub grid: &'a mut Grid,
    pub slide: &'a mut SlideAnimation,
    pub cleared: &'a mut bool,
    pub events: &'a mut Vec<StageEvent>,
    pub config: &'a SimConfig,
    /// Cells held by actors that have not written their tile yet
    /// (moving actors and their reserved destinations). A slide treats
    /// them as obstructions.
    pub occupied: &'a [GridPos],
}

impl Resolver<'_> {
    /// Process `cell`, entered while travelling `dir`.
    pub fn enter(&mut self, cell: GridPos, dir: Direction, prevented: &mut Option<Direction>) -> HitOutcome {
        let tile = self.grid.get_at(cell, Tile::Wall);

        if matches!(tile, Tile::TargetB | Tile::SlideBlock) {
            *prevented = Some(dir);
        }

        match tile {
            Tile::TargetA | Tile::TargetB | Tile::Toggle => self.destroy(cell, tile),
            Tile::SlideBlock => {
                self.push_block(cell, dir);
                HitOutcome::Stop
            }
            _ => HitOutcome::None,
        }
    }

    fn destroy(&mut self, cell: GridPos, tile: Tile) -> HitOutcome {
        let Some(variant) = tile.target_variant() else { return HitOutcome::None };
        self.grid.set_at(cell, Tile::Floor);
        self.events.push(StageEvent::TargetDestroyed {
            x: cell.x,
            y: cell.y,
            variant,
            particles: self.config.particles_per_target,
        });
        *self.cleared = rules::is_cleared(self.grid);

        if variant == TargetVariant::Toggle && !*self.cleared {
            let swapped = self.grid.swap_tiles(Tile::TargetA, Tile::TargetB);
            log::debug!("toggle at {cell:?} swapped {swapped} targets");
            self.events.push(StageEvent::TargetsToggled);
        }

        match variant {
            TargetVariant::A => HitOutcome::None,
            TargetVariant::B | TargetVariant::Toggle => HitOutcome::Stop,
        }
    }

    /// Clear the block's cell and send it to the last free cell before the
    /// first obstruction along `dir`.
    fn push_block(&mut self, cell: GridPos, dir: Direction) {
        self.grid.set_at(cell, Tile::Floor);

        let max_steps = self.grid.extent(dir).saturating_sub(1);
        let mut rest = cell;
        let mut distance = 0u32;
        while (distance as usize) < max_steps {
            let next = self.grid.neighbor(rest, dir);
            if rules::is_solid_at(self.grid, next, false) || self.occupied.contains(&next) {
                break;
            }
            rest = next;
            distance += 1;
        }

        if distance == 0 {
            self.grid.set_at(cell, Tile::SlideBlock);
            return;
        }

        self.grid.set_at(rest, Tile::InFlight);
        self.slide.launch(cell, rest, dir, distance, self.config.slide_ticks_per_cell);
        self.events.push(StageEvent::SlideStarted { from: cell, to: rest, distance });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::Topology;
    use crate::domain::rules::{diagram, grid_from};

    struct Bench {
        grid: Grid,
        slide: SlideAnimation,
        cleared: bool,
        events: Vec<StageEvent>,
        config: SimConfig,
        prevented: Option<Direction>,
    }

    impl Bench {
        fn new(rows: &[&str], topology: Topology) -> Self {
            let grid = grid_from(rows, topology);
            let cleared = rules::is_cleared(&grid);
            Bench {
                grid,
                slide: SlideAnimation::Idle,
                cleared,
                events: Vec::new(),
                config: SimConfig::default(),
                prevented: None,
            }
        }

        fn enter(&mut self, x: i32, y: i32, dir: Direction) -> HitOutcome {
            let mut r = Resolver {
                grid: &mut self.grid,
                slide: &mut self.slide,
                cleared: &mut self.cleared,
                events: &mut self.events,
                config: &self.config,
                occupied: &[],
            };
            r.enter(GridPos::new(x, y), dir, &mut self.prevented)
        }

        fn rows(&self) -> Vec<String> {
            diagram(&self.grid)
        }
    }

    // ── Destruction ──

    #[test]
    fn target_a_is_destroyed_and_passes() {
        let mut b = Bench::new(&["Pa.b"], Topology::Bounded);
        assert_eq!(b.enter(1, 0, Direction::Right), HitOutcome::None);
        assert_eq!(b.rows(), vec!["P..b"]);
        assert_eq!(b.prevented, None);
        assert_eq!(b.events, vec![StageEvent::TargetDestroyed {
            x: 1, y: 0, variant: TargetVariant::A, particles: 24,
        }]);
        assert!(!b.cleared);
    }

    #[test]
    fn target_b_is_destroyed_and_stops() {
        let mut b = Bench::new(&["Pb"], Topology::Bounded);
        assert_eq!(b.enter(1, 0, Direction::Right), HitOutcome::Stop);
        assert_eq!(b.rows(), vec!["P."]);
        assert_eq!(b.prevented, Some(Direction::Right));
        assert!(b.cleared);
    }

    #[test]
    fn last_target_sets_clear() {
        let mut b = Bench::new(&["Pa"], Topology::Bounded);
        assert!(!b.cleared);
        b.enter(1, 0, Direction::Right);
        assert!(b.cleared);
    }

    #[test]
    fn toggle_swaps_remaining_targets() {
        let mut b = Bench::new(&["Px.ab", "..aa."], Topology::Bounded);
        assert_eq!(b.enter(1, 0, Direction::Right), HitOutcome::Stop);
        assert_eq!(b.rows(), vec!["P..ba", "..bb."]);
        assert_eq!(b.prevented, None);
        assert!(b.events.contains(&StageEvent::TargetsToggled));
    }

    #[test]
    fn toggle_on_final_target_suppresses_swap() {
        let mut b = Bench::new(&["Px."], Topology::Bounded);
        assert_eq!(b.enter(1, 0, Direction::Right), HitOutcome::Stop);
        assert!(b.cleared);
        assert!(!b.events.contains(&StageEvent::TargetsToggled));
    }

    #[test]
    fn floor_and_marker_do_nothing() {
        let mut b = Bench::new(&["P.*a"], Topology::Bounded);
        assert_eq!(b.enter(1, 0, Direction::Right), HitOutcome::None);
        assert_eq!(b.enter(2, 0, Direction::Right), HitOutcome::None);
        assert_eq!(b.rows(), vec!["P.*a"]);
        assert!(b.events.is_empty());
    }

    // ── Slides ──

    #[test]
    fn slide_travels_to_first_obstruction() {
        let mut b = Bench::new(&["PS..#"], Topology::Bounded);
        assert_eq!(b.enter(1, 0, Direction::Right), HitOutcome::Stop);
        assert_eq!(b.prevented, Some(Direction::Right));
        assert_eq!(b.rows(), vec!["P..*#"]);
        assert_eq!(b.events, vec![StageEvent::SlideStarted {
            from: GridPos::new(1, 0), to: GridPos::new(3, 0), distance: 2,
        }]);
        assert!(matches!(b.slide, SlideAnimation::InFlight { distance: 2, total: 20, .. }));
    }

    #[test]
    fn slide_stops_at_board_edge() {
        let mut b = Bench::new(&["PS.."], Topology::Bounded);
        b.enter(1, 0, Direction::Right);
        assert_eq!(b.rows(), vec!["P..*"]);
    }

    #[test]
    fn slide_stops_before_targets() {
        let mut b = Bench::new(&["PS.a"], Topology::Bounded);
        b.enter(1, 0, Direction::Right);
        assert_eq!(b.rows(), vec!["P.*a"]);
    }

    #[test]
    fn blocked_slide_stays_put() {
        let mut b = Bench::new(&["PS#"], Topology::Bounded);
        assert_eq!(b.enter(1, 0, Direction::Right), HitOutcome::Stop);
        assert_eq!(b.rows(), vec!["PS#"]);
        assert_eq!(b.slide, SlideAnimation::Idle);
        assert!(b.events.is_empty());
        assert_eq!(b.prevented, Some(Direction::Right));
    }

    #[test]
    fn slide_wraps_on_torus() {
        let mut b = Bench::new(&["#.PS."], Topology::Toroidal);
        b.enter(3, 0, Direction::Right);
        assert_eq!(b.rows(), vec!["#.P.*"]);

        let mut b = Bench::new(&[".#PS."], Topology::Toroidal);
        b.enter(3, 0, Direction::Right);
        assert_eq!(b.rows(), vec!["*#P.."]);
    }

    #[test]
    fn slide_scan_capped_on_empty_torus_line() {
        let mut b = Bench::new(&["S..."], Topology::Toroidal);
        b.enter(0, 0, Direction::Left);
        assert!(matches!(b.slide, SlideAnimation::InFlight { distance: 3, .. }));
        assert_eq!(b.rows(), vec![".*.."]);
    }

    #[test]
    fn slide_respects_occupied_cells() {
        let mut b = Bench::new(&["PS...#"], Topology::Bounded);
        let blockers = [GridPos::new(4, 0)];
        let mut r = Resolver {
            grid: &mut b.grid,
            slide: &mut b.slide,
            cleared: &mut b.cleared,
            events: &mut b.events,
            config: &b.config,
            occupied: &blockers,
        };
        r.enter(GridPos::new(1, 0), Direction::Right, &mut b.prevented);
        assert_eq!(diagram(&b.grid), vec!["P..*.#"]);
    }
}
