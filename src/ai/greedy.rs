use crate::ai::{Decision, MoveSelector};
use crate::board::Board;
use crate::types::{Player, Position};

/// Corners and their diagonal neighbours. The CPU fixes stones placed here.
pub const STRATEGIC_SQUARES: [Position; 8] = [
    Position::new(0, 0),
    Position::new(0, 7),
    Position::new(7, 0),
    Position::new(7, 7),
    Position::new(1, 1),
    Position::new(1, 6),
    Position::new(6, 1),
    Position::new(6, 6),
];

/// One-ply selector: the move capturing the most stones, first one on ties.
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedySelector;

impl MoveSelector for GreedySelector {
    fn select_move(&self, board: &Board, player: Player) -> Option<Decision> {
        let mut best: Option<(Position, usize)> = None;
        for mv in board.valid_moves(player) {
            let captured = board.capture_count(mv, player);
            if best.is_none_or(|(_, most)| captured > most) {
                best = Some((mv, captured));
            }
        }

        let (pos, _) = best?;
        let fix = is_strategic(pos) && board.fix_charges(player) > 0;
        Some(Decision { pos, fix })
    }
}

pub fn is_strategic(pos: Position) -> bool {
    STRATEGIC_SQUARES.contains(&pos)
}
