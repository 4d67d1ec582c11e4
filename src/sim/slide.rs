/// SlideAnimation: carries a pushed block from its source cell to the
/// first obstruction.
///
/// The grid is authoritative the whole time. On launch the source is
/// already floor and the destination holds `Tile::InFlight`; this machine
/// only counts ticks and, when done, turns the marker into a slide block.
///
///   Idle ──launch──▶ InFlight ──elapsed >= total──▶ Idle
///
/// At most one slide per stage may be in flight.

use crate::domain::entity::{Direction, GridPos};
use crate::domain::grid::{Grid, Topology};
use crate::domain::tile::Tile;
use super::event::StageEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SlideAnimation {
    #[default]
    Idle,
    InFlight {
        source: GridPos,
        target: GridPos,
        dir: Direction,
        distance: u32,
        elapsed: u32,
        total: u32,
    },
}

impl SlideAnimation {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, SlideAnimation::InFlight { .. })
    }

    /// Start a slide. The caller has already cleared `source` and marked
    /// `target`. Panics if another slide is still in flight.
    pub fn launch(
        &mut self,
        source: GridPos,
        target: GridPos,
        dir: Direction,
        distance: u32,
        ticks_per_cell: u32,
    ) {
        assert!(
            !self.is_in_flight(),
            "slide launched from {source:?} while another slide is in flight",
        );
        let total = distance.saturating_mul(ticks_per_cell).max(1);
        log::debug!("slide {source:?} -> {target:?} over {distance} cells, {total} ticks");
        *self = SlideAnimation::InFlight { source, target, dir, distance, elapsed: 0, total };
    }

    /// One tick. Finalizes the destination once the animation has run out.
    pub fn advance(&mut self, grid: &mut Grid, events: &mut Vec<StageEvent>) {
        let SlideAnimation::InFlight { target, elapsed, total, .. } = self else { return };
        *elapsed += 1;
        if *elapsed < *total { return; }

        let target = *target;
        if grid.get_at(target, Tile::Wall) == Tile::InFlight {
            grid.set_at(target, Tile::SlideBlock);
        } else {
            log::warn!(
                "in-flight marker at {target:?} was overwritten by {:?}; leaving cell as is",
                grid.get_at(target, Tile::Wall),
            );
        }
        events.push(StageEvent::SlideSettled { x: target.x, y: target.y });
        *self = SlideAnimation::Idle;
    }

    /// Drop any animation without touching the grid (reset / undo paths).
    pub fn cancel(&mut self) {
        *self = SlideAnimation::Idle;
    }

    /// Interpolated block position in cell units, wrapped on toroidal boards.
    /// Purely presentational.
    pub fn render_position(&self, grid: &Grid) -> Option<(f32, f32)> {
        let SlideAnimation::InFlight { source, dir, distance, elapsed, total, .. } = *self else {
            return None;
        };
        let t = (elapsed as f32 / total as f32).min(1.0);
        let (dx, dy) = dir.delta();
        let travelled = distance as f32 * t;
        let mut x = source.x as f32 + dx as f32 * travelled;
        let mut y = source.y as f32 + dy as f32 * travelled;
        if grid.topology() == Topology::Toroidal {
            x = x.rem_euclid(grid.width() as f32);
            y = y.rem_euclid(grid.height() as f32);
        }
        Some((x, y))
    }
}
