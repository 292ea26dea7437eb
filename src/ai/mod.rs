pub mod greedy;

use crate::board::Board;
use crate::types::{Player, Position};

pub use greedy::GreedySelector;

/// A chosen move and whether to spend a fix charge on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub pos: Position,
    pub fix: bool,
}

pub trait MoveSelector {
    /// Returns `None` when `player` has no legal move.
    fn select_move(&self, board: &Board, player: Player) -> Option<Decision>;
}
