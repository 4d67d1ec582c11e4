/// Value types shared by the simulation and its collaborators:
/// directions, cell coordinates, actor identity and per-tick input.

/// One of the four grid neighbours. Screen convention: `Up` is -y.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Analog input below this magnitude counts as "no direction".
pub const STICK_DEADZONE: f32 = 0.25;

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Discretize an analog stick (screen coordinates, +y down).
    ///
    /// The axis with the larger magnitude wins. On an exact tie the
    /// vertical axis wins, so diagonal keyboard chords resolve the same
    /// way every tick.
    pub fn from_stick(x: f32, y: f32) -> Option<Direction> {
        if (x * x + y * y).sqrt() < STICK_DEADZONE {
            return None;
        }
        let horizontal = x.abs() > y.abs();
        if !horizontal {
            if y < -STICK_DEADZONE { return Some(Direction::Up); }
            if y > STICK_DEADZONE { return Some(Direction::Down); }
        } else {
            if x < -STICK_DEADZONE { return Some(Direction::Left); }
            if x > STICK_DEADZONE { return Some(Direction::Right); }
        }
        None
    }
}

/// Integer cell coordinate. Signed so that offsets past the edge can be
/// represented before the grid normalizes or rejects them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        GridPos { x, y }
    }

    /// Raw offset, no wrapping. See `Grid::neighbor` for topology-aware stepping.
    pub fn offset(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        GridPos { x: self.x + dx, y: self.y + dy }
    }
}

/// Stable actor identity, assigned in board scan order when a stage is
/// loaded or reset. Survives undo unchanged.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ActorId(pub usize);

/// Frame input: one discretized direction (held) plus edge-triggered
/// undo / restart signals. Pure values, no polling side effects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub movement: Option<Direction>,
    pub undo: bool,
    pub restart: bool,
}

impl FrameInput {
    pub fn moving(dir: Direction) -> Self {
        FrameInput { movement: Some(dir), ..FrameInput::default() }
    }

    pub fn idle() -> Self {
        FrameInput::default()
    }
}
