/// Movement and clear rules, truth-table driven.
///
/// Pure functions over the grid. These encode "what is legal" without
/// performing the action.
///
/// ## Start Truth Table
///
/// An idle actor may begin a move this tick when every row allows it.
/// ┌────────────────────────────────┬─────────┬──────────────────────┐
/// │ Condition                       │ Allow?  │ Notes                │
/// ├────────────────────────────────┼─────────┼──────────────────────┤
/// │ No directional input            │ DENY    │                      │
/// │ Input == prevented direction    │ DENY    │ hard stop remembered │
/// │ Neighbor solid (base set)       │ DENY    │ OOB reads as wall    │
/// │ Otherwise                       │ ALLOW   │                      │
/// └────────────────────────────────┴─────────┴──────────────────────┘
///
/// ## Continue Truth Table
///
/// Evaluated after arrival, once the resolver has consumed the cell ahead.
/// ┌────────────────────────────────┬──────────┐
/// │ Condition                       │ Result   │
/// ├────────────────────────────────┼──────────┤
/// │ Cell ahead reserved by a mover  │ STOP     │
/// │ Resolver returned Stop          │ STOP     │
/// │ Ahead solid (ignore-blocks set) │ STOP     │
/// │ Otherwise                       │ CONTINUE │
/// └────────────────────────────────┴──────────┘
///
/// ## Clear
///
/// Cleared iff no cell holds TargetA, TargetB or Toggle.

use super::entity::{Direction, GridPos};
use super::grid::Grid;
use super::tile::Tile;

/// Solidity of a board cell. Outside a bounded board reads as wall.
#[inline]
pub fn is_solid_at(grid: &Grid, pos: GridPos, ignore_active_blocks: bool) -> bool {
    grid.get_at(pos, Tile::Wall).is_solid(ignore_active_blocks)
}

/// Can an idle actor at `pos` start moving in `input`? See the start table.
pub fn can_start(grid: &Grid, pos: GridPos, input: Option<Direction>, prevented: Option<Direction>) -> Option<Direction> {
    let dir = input?;
    if prevented == Some(dir) { return None; }
    if is_solid_at(grid, grid.neighbor(pos, dir), false) { return None; }
    Some(dir)
}

pub fn is_cleared(grid: &Grid) -> bool {
    !grid.cells().iter().any(|t| t.is_active_target())
}

/// Remaining active targets, for the HUD.
pub fn targets_remaining(grid: &Grid) -> usize {
    grid.count(Tile::is_active_target)
}

// ══════════════════════════════════════════════════════════════
// Board builders shared by the unit tests
// ══════════════════════════════════════════════════════════════

/// Build a grid from a string diagram.
/// Legend: '#'=Wall 'P'=Actor 'a'=TargetA 'b'=TargetB 'S'=SlideBlock
///         'x'=Toggle '*'=InFlight, anything else = Floor.
#[cfg(test)]
pub(crate) fn grid_from(rows: &[&str], topology: super::grid::Topology) -> Grid {
    let height = rows.len();
    let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
    let mut cells = vec![Tile::Floor; width * height];
    for (y, row) in rows.iter().enumerate() {
        for (x, ch) in row.chars().enumerate() {
            cells[y * width + x] = match ch {
                '#' => Tile::Wall,
                'P' => Tile::Actor,
                'a' => Tile::TargetA,
                'b' => Tile::TargetB,
                'S' => Tile::SlideBlock,
                'x' => Tile::Toggle,
                '*' => Tile::InFlight,
                _ => Tile::Floor,
            };
        }
    }
    Grid::from_cells(width, height, topology, cells)
}

/// Render a grid back into the diagram legend. Handy for whole-board asserts.
#[cfg(test)]
pub(crate) fn diagram(grid: &Grid) -> Vec<String> {
    (0..grid.height() as i32)
        .map(|y| {
            (0..grid.width() as i32)
                .map(|x| match grid.get(x, y, Tile::Wall) {
                    Tile::Floor => '.',
                    Tile::Wall => '#',
                    Tile::Actor => 'P',
                    Tile::TargetA => 'a',
                    Tile::TargetB => 'b',
                    Tile::SlideBlock => 'S',
                    Tile::Toggle => 'x',
                    Tile::InFlight => '*',
                })
                .collect()
        })
        .collect()
}
