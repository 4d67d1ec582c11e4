/// HistoryStack: bounded undo history.
///
/// Each snapshot is a full copy of the board plus every actor's position,
/// keyed by stable id. Pushing past the cap evicts the oldest entry.
/// A cap of 0 keeps nothing, which disables undo.

use std::collections::VecDeque;

use crate::domain::entity::{ActorId, GridPos};
use crate::domain::tile::Tile;

/// Immutable once pushed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistorySnapshot {
    pub cells: Box<[Tile]>,
    pub actors: Box<[(ActorId, GridPos)]>,
}

#[derive(Clone, Debug)]
pub struct HistoryStack {
    entries: VecDeque<HistorySnapshot>,
    cap: usize,
}

impl HistoryStack {
    pub fn new(cap: usize) -> Self {
        HistoryStack { entries: VecDeque::with_capacity(cap.min(64)), cap }
    }

    pub fn push(&mut self, snapshot: HistorySnapshot) {
        if self.cap == 0 { return; }
        self.entries.push_back(snapshot);
        while self.entries.len() > self.cap {
            self.entries.pop_front();
        }
    }

    pub fn pop(&mut self) -> Option<HistorySnapshot> {
        self.entries.pop_back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn snap(tag: u16) -> HistorySnapshot {
        HistorySnapshot {
            cells: vec![Tile::from_code(tag % 7).unwrap_or_default()].into_boxed_slice(),
            actors: vec![(ActorId(0), GridPos::new(tag as i32, 0))].into_boxed_slice(),
        }
    }

    #[test]
    fn cap_three_evicts_oldest() {
        let mut h = HistoryStack::new(3);
        for i in 1..=4 {
            h.push(snap(i));
        }
        assert_eq!(h.len(), 3);
        assert_eq!(h.pop(), Some(snap(4)));
        assert_eq!(h.pop(), Some(snap(3)));
        assert_eq!(h.pop(), Some(snap(2)));
        assert_eq!(h.pop(), None);
    }

    #[test]
    fn zero_cap_keeps_nothing() {
        let mut h = HistoryStack::new(0);
        h.push(snap(1));
        assert!(h.is_empty());
        assert_eq!(h.pop(), None);
    }

    #[test]
    fn clear_empties() {
        let mut h = HistoryStack::new(5);
        h.push(snap(1));
        h.push(snap(2));
        h.clear();
        assert!(h.is_empty());
    }

    proptest! {
        #[test]
        fn never_exceeds_cap(cap in 0usize..8, ops in proptest::collection::vec(any::<bool>(), 0..64)) {
            let mut h = HistoryStack::new(cap);
            for (i, push) in ops.into_iter().enumerate() {
                if push { h.push(snap(i as u16)); } else { h.pop(); }
                prop_assert!(h.len() <= cap);
            }
        }

        #[test]
        fn keeps_the_newest(cap in 1usize..8, n in 0u16..32) {
            let mut h = HistoryStack::new(cap);
            for i in 0..n {
                h.push(snap(i));
            }
            let kept = (n as usize).min(cap);
            for i in (n as usize - kept..n as usize).rev() {
                prop_assert_eq!(h.pop(), Some(snap(i as u16)));
            }
            prop_assert_eq!(h.pop(), None);
        }
    }
}
