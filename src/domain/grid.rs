/// Grid: the mutable tile array of a running stage.
///
/// ## Access model
///
///   - `get(x, y, default)`: total read. Toroidal stages wrap the
///     coordinate; bounded stages return `default` outside the board.
///   - `set(x, y, tile)`: total write. Wraps like `get`, silently
///     ignored outside a bounded board.
///
/// Linear layout: `cells[y * width + x]`.
///
/// All mutations of the live board go through `set()`, `swap_tiles()` or
/// `restore()`. Snapshots are defensive copies and never alias the live array.

use super::entity::{Direction, GridPos};
use super::tile::Tile;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Topology {
    #[default]
    Bounded,
    Toroidal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    topology: Topology,
    cells: Vec<Tile>,
}

/// `v mod extent`, always in `0..extent`.
#[inline]
pub fn wrap_coordinate(v: i32, extent: usize) -> i32 {
    v.rem_euclid(extent as i32)
}

// ── Construction ──

impl Grid {
    /// A board filled with floor.
    pub fn new(width: usize, height: usize, topology: Topology) -> Self {
        Grid {
            width,
            height,
            topology,
            cells: vec![Tile::Floor; width * height],
        }
    }

    /// Build from row-major tiles. `cells.len()` must be `width * height`.
    pub fn from_cells(width: usize, height: usize, topology: Topology, cells: Vec<Tile>) -> Self {
        assert_eq!(cells.len(), width * height, "cell count does not match {width}x{height}");
        Grid { width, height, topology, cells }
    }
}

// ── Queries ──

impl Grid {
    #[inline]
    pub fn width(&self) -> usize { self.width }

    #[inline]
    pub fn height(&self) -> usize { self.height }

    #[inline]
    pub fn topology(&self) -> Topology { self.topology }

    #[inline]
    pub fn cells(&self) -> &[Tile] { &self.cells }

    /// Normalize a coordinate for this board.
    /// Toroidal: always `Some`, wrapped. Bounded: `None` outside the board.
    #[inline]
    pub fn normalize(&self, x: i32, y: i32) -> Option<GridPos> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        match self.topology {
            Topology::Toroidal => Some(GridPos::new(
                wrap_coordinate(x, self.width),
                wrap_coordinate(y, self.height),
            )),
            Topology::Bounded => {
                if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
                    Some(GridPos::new(x, y))
                } else {
                    None
                }
            }
        }
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.normalize(x, y).map(|p| p.y as usize * self.width + p.x as usize)
    }

    /// Bounds-checked read. Out of bounds (bounded stages only) yields `default`.
    #[inline]
    pub fn get(&self, x: i32, y: i32, default: Tile) -> Tile {
        match self.index(x, y) {
            Some(i) => self.cells[i],
            None => default,
        }
    }

    #[inline]
    pub fn get_at(&self, pos: GridPos, default: Tile) -> Tile {
        self.get(pos.x, pos.y, default)
    }

    /// The adjacent cell in `dir`. Wrapped on toroidal boards; on bounded
    /// boards the result may lie outside (reads then return their default).
    pub fn neighbor(&self, pos: GridPos, dir: Direction) -> GridPos {
        let next = pos.offset(dir);
        match self.topology {
            Topology::Toroidal => self.normalize(next.x, next.y).unwrap_or(next),
            Topology::Bounded => next,
        }
    }

    /// All cells holding `tile`, in scan order (row by row).
    pub fn positions_of(&self, tile: Tile) -> Vec<GridPos> {
        self.cells.iter().enumerate()
            .filter(|(_, t)| **t == tile)
            .map(|(i, _)| GridPos::new((i % self.width) as i32, (i / self.width) as i32))
            .collect()
    }

    pub fn count(&self, pred: impl Fn(Tile) -> bool) -> usize {
        self.cells.iter().filter(|t| pred(**t)).count()
    }

    /// Travel extent along a direction's axis.
    pub fn extent(&self, dir: Direction) -> usize {
        match dir {
            Direction::Left | Direction::Right => self.width,
            Direction::Up | Direction::Down => self.height,
        }
    }
}

// ── Mutation ──

impl Grid {
    /// Bounds-checked write. No-op outside a bounded board.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, tile: Tile) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = tile;
        }
    }

    #[inline]
    pub fn set_at(&mut self, pos: GridPos, tile: Tile) {
        self.set(pos.x, pos.y, tile);
    }

    /// Exchange every `a` with `b` and vice versa across the whole board.
    /// Returns how many cells changed.
    pub fn swap_tiles(&mut self, a: Tile, b: Tile) -> usize {
        let mut changed = 0;
        for cell in self.cells.iter_mut() {
            if *cell == a {
                *cell = b;
                changed += 1;
            } else if *cell == b {
                *cell = a;
                changed += 1;
            }
        }
        changed
    }

    /// Defensive copy of the cell array (for history snapshots).
    pub fn snapshot(&self) -> Box<[Tile]> {
        self.cells.clone().into_boxed_slice()
    }

    /// Replace the cell array wholesale. Ignored if the size does not match.
    pub fn restore(&mut self, cells: &[Tile]) -> bool {
        if cells.len() != self.cells.len() {
            log::warn!(
                "snapshot of {} cells does not fit a {}x{} grid",
                cells.len(), self.width, self.height,
            );
            return false;
        }
        self.cells.copy_from_slice(cells);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_coordinate_is_non_negative() {
        assert_eq!(wrap_coordinate(-1, 5), 4);
        assert_eq!(wrap_coordinate(5, 5), 0);
        assert_eq!(wrap_coordinate(-11, 5), 4);
        assert_eq!(wrap_coordinate(3, 5), 3);
    }

    #[test]
    fn bounded_reads_default_outside() {
        let mut g = Grid::new(3, 2, Topology::Bounded);
        g.set(1, 1, Tile::TargetA);
        assert_eq!(g.get(1, 1, Tile::Wall), Tile::TargetA);
        assert_eq!(g.get(-1, 0, Tile::Wall), Tile::Wall);
        assert_eq!(g.get(3, 0, Tile::Floor), Tile::Floor);
        assert_eq!(g.get(0, 2, Tile::Wall), Tile::Wall);
    }

    #[test]
    fn bounded_write_outside_is_noop() {
        let mut g = Grid::new(2, 2, Topology::Bounded);
        let before = g.clone();
        g.set(2, 0, Tile::Wall);
        g.set(-1, -1, Tile::Wall);
        assert_eq!(g, before);
    }

    #[test]
    fn toroidal_reads_and_writes_wrap() {
        let mut g = Grid::new(4, 3, Topology::Toroidal);
        g.set(-1, 0, Tile::Wall);
        assert_eq!(g.get(3, 0, Tile::Floor), Tile::Wall);
        assert_eq!(g.get(7, 3, Tile::Floor), Tile::Wall);
    }

    #[test]
    fn neighbor_wraps_only_on_torus() {
        let b = Grid::new(4, 3, Topology::Bounded);
        let t = Grid::new(4, 3, Topology::Toroidal);
        let edge = GridPos::new(3, 1);
        assert_eq!(b.neighbor(edge, Direction::Right), GridPos::new(4, 1));
        assert_eq!(t.neighbor(edge, Direction::Right), GridPos::new(0, 1));
        assert_eq!(t.neighbor(GridPos::new(0, 0), Direction::Up), GridPos::new(0, 2));
    }

    #[test]
    fn swap_tiles_exchanges_both_ways() {
        let mut g = Grid::from_cells(3, 1, Topology::Bounded,
            vec![Tile::TargetA, Tile::Floor, Tile::TargetB]);
        assert_eq!(g.swap_tiles(Tile::TargetA, Tile::TargetB), 2);
        assert_eq!(g.cells(), &[Tile::TargetB, Tile::Floor, Tile::TargetA]);
    }

    #[test]
    fn snapshot_does_not_alias() {
        let mut g = Grid::new(2, 1, Topology::Bounded);
        let snap = g.snapshot();
        g.set(0, 0, Tile::Wall);
        assert_eq!(snap[0], Tile::Floor);
        assert!(g.restore(&snap));
        assert_eq!(g.get(0, 0, Tile::Wall), Tile::Floor);
    }

    #[test]
    fn restore_rejects_wrong_size() {
        let mut g = Grid::new(2, 1, Topology::Bounded);
        assert!(!g.restore(&[Tile::Wall]));
        assert_eq!(g.cells(), &[Tile::Floor, Tile::Floor]);
    }

    #[test]
    fn positions_in_scan_order() {
        let g = Grid::from_cells(2, 2, Topology::Bounded,
            vec![Tile::Floor, Tile::Actor, Tile::Actor, Tile::Floor]);
        assert_eq!(g.positions_of(Tile::Actor), vec![GridPos::new(1, 0), GridPos::new(0, 1)]);
    }
}
