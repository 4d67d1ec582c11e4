/// Tile codes and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.
///
/// The numeric codes are part of the level format and of the render
/// collaborator's contract, so every variant carries its code explicitly.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[repr(u16)]
pub enum Tile {
    #[default]
    Floor = 0,
    Wall = 1,
    Actor = 2,        // Cell held by a resting player block
    TargetA = 3,      // Destructible, pairs with TargetB
    TargetB = 4,      // Destructible, soft wall for the approaching actor
    SlideBlock = 5,   // Pushed to the first obstruction when entered
    Toggle = 6,       // Destructible, swaps every A <-> B on destruction
    InFlight = 256,   // Destination of a slide block still animating
}

/// Which destructible variant was hit. Consumed by the effects collaborator
/// (particle palette) and carried on `StageEvent::TargetDestroyed`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TargetVariant {
    A,
    B,
    Toggle,
}

impl Tile {
    pub fn code(self) -> u16 {
        self as u16
    }

    pub fn from_code(code: u16) -> Option<Tile> {
        match code {
            0 => Some(Tile::Floor),
            1 => Some(Tile::Wall),
            2 => Some(Tile::Actor),
            3 => Some(Tile::TargetA),
            4 => Some(Tile::TargetB),
            5 => Some(Tile::SlideBlock),
            6 => Some(Tile::Toggle),
            256 => Some(Tile::InFlight),
            _ => None,
        }
    }

    /// Solidity rule.
    ///
    /// Base set: wall, actor, both targets, slide block, toggle.
    /// Ignore-blocks set: wall, actor. Used by a moving actor checking the
    /// cell ahead after the resolver already consumed it.
    /// The in-flight marker is in neither set.
    pub fn is_solid(self, ignore_active_blocks: bool) -> bool {
        if ignore_active_blocks {
            matches!(self, Tile::Wall | Tile::Actor)
        } else {
            matches!(
                self,
                Tile::Wall
                    | Tile::Actor
                    | Tile::TargetA
                    | Tile::TargetB
                    | Tile::SlideBlock
                    | Tile::Toggle
            )
        }
    }

    /// Does this tile count towards the clear condition?
    pub fn is_active_target(self) -> bool {
        matches!(self, Tile::TargetA | Tile::TargetB | Tile::Toggle)
    }

    pub fn target_variant(self) -> Option<TargetVariant> {
        match self {
            Tile::TargetA => Some(TargetVariant::A),
            Tile::TargetB => Some(TargetVariant::B),
            Tile::Toggle => Some(TargetVariant::Toggle),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Tile; 8] = [
        Tile::Floor, Tile::Wall, Tile::Actor, Tile::TargetA,
        Tile::TargetB, Tile::SlideBlock, Tile::Toggle, Tile::InFlight,
    ];

    #[test]
    fn codes_match_level_format() {
        for t in ALL {
            assert_eq!(Tile::from_code(t.code()), Some(t));
        }
        assert_eq!(Tile::InFlight.code(), 256);
        assert_eq!(Tile::from_code(7), None);
    }

    #[test]
    fn base_solid_set() {
        let solid: Vec<Tile> = ALL.iter().copied().filter(|t| t.is_solid(false)).collect();
        assert_eq!(solid, vec![
            Tile::Wall, Tile::Actor, Tile::TargetA,
            Tile::TargetB, Tile::SlideBlock, Tile::Toggle,
        ]);
    }

    #[test]
    fn ignore_blocks_solid_set() {
        let solid: Vec<Tile> = ALL.iter().copied().filter(|t| t.is_solid(true)).collect();
        assert_eq!(solid, vec![Tile::Wall, Tile::Actor]);
    }

    #[test]
    fn in_flight_marker_never_solid() {
        assert!(!Tile::InFlight.is_solid(false));
        assert!(!Tile::InFlight.is_solid(true));
    }

    #[test]
    fn active_targets() {
        assert!(Tile::TargetA.is_active_target());
        assert!(Tile::TargetB.is_active_target());
        assert!(Tile::Toggle.is_active_target());
        assert!(!Tile::SlideBlock.is_active_target());
        assert!(!Tile::InFlight.is_active_target());
    }
}
