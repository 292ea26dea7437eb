use serde::Serialize;

/// One of the two sides. Black is the human, white is the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Player {
    Black,
    White,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }

    /// Wire value used in snapshots: 1=black, 2=white.
    pub fn code(self) -> u8 {
        match self {
            Player::Black => 1,
            Player::White => 2,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Player::Black => 0,
            Player::White => 1,
        }
    }
}

/// A board coordinate, `x` is the column and `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: u8,
    pub y: u8,
}

impl Position {
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }
}

/// Public game state handed to the host page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameState {
    /// Row-major, 0=empty, 1=black, 2=white.
    pub board: Vec<u8>,
    /// Row-major, `true` where the stone is fixed.
    pub fixed: Vec<bool>,
    pub current_player: u8,
    pub black_count: u8,
    pub white_count: u8,
    pub black_fix_charges: u8,
    pub white_fix_charges: u8,
    pub is_game_over: bool,
    pub awaiting_fix_choice: bool,
    pub message: String,
    /// Set once the game is over.
    pub result: Option<GameResult>,
}

/// Final result after game over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameResult {
    /// `None` on a draw.
    pub winner: Option<Player>,
    pub black_count: u8,
    pub white_count: u8,
}

impl GameResult {
    pub fn from_counts(black_count: u8, white_count: u8) -> Self {
        let winner = if black_count > white_count {
            Some(Player::Black)
        } else if white_count > black_count {
            Some(Player::White)
        } else {
            None
        };
        Self {
            winner,
            black_count,
            white_count,
        }
    }
}
