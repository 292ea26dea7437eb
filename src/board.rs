use crate::types::{Player, Position};

pub const BOARD_SIZE: usize = 8;
pub const NUM_SQUARES: usize = BOARD_SIZE * BOARD_SIZE;
/// Fix charges each player starts with. Never replenished.
pub const FIX_CHARGES: u8 = 2;
const DIRECTIONS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Content of one square. A fixed stone can never be flipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Loose(Player),
    Fixed(Player),
}

impl Cell {
    pub fn owner(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Loose(player) | Cell::Fixed(player) => Some(player),
        }
    }

    pub fn is_fixed(self) -> bool {
        matches!(self, Cell::Fixed(_))
    }
}

/// What a successful placement did to the board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placement {
    pub flipped: Vec<Position>,
    /// Fixed opponent stones inside a captured run. They keep their colour.
    pub shielded: Vec<Position>,
    /// `true` when the placed stone consumed a fix charge.
    pub fixed: bool,
}

/// Reversi board with per-player fix charges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    grid: [[Cell; BOARD_SIZE]; BOARD_SIZE],
    fix_charges: [u8; 2],
}

impl Board {
    /// Creates the initial board:
    /// (3,3)=white, (4,3)=black, (3,4)=black, (4,4)=white.
    pub fn new() -> Self {
        let mut grid = [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE];
        grid[3][3] = Cell::Loose(Player::White);
        grid[4][4] = Cell::Loose(Player::White);
        grid[3][4] = Cell::Loose(Player::Black);
        grid[4][3] = Cell::Loose(Player::Black);
        Self {
            grid,
            fix_charges: [FIX_CHARGES; 2],
        }
    }

    pub fn cell(&self, pos: Position) -> Cell {
        self.grid[pos.y as usize][pos.x as usize]
    }

    pub fn is_fixed(&self, pos: Position) -> bool {
        self.cell(pos).is_fixed()
    }

    pub fn fix_charges(&self, player: Player) -> u8 {
        self.fix_charges[player.index()]
    }

    /// Empty cell that captures at least one run of opponent stones.
    pub fn can_place(&self, pos: Position, player: Player) -> bool {
        !self.collect_captures(pos, player).is_empty()
    }

    /// Legal moves in row-major order (y outer, x inner).
    pub fn valid_moves(&self, player: Player) -> Vec<Position> {
        all_positions()
            .filter(|&pos| self.can_place(pos, player))
            .collect()
    }

    pub fn has_valid_move(&self, player: Player) -> bool {
        all_positions().any(|pos| self.can_place(pos, player))
    }

    /// Number of opponent stones the move would capture, fixed ones included.
    /// Returns 0 when the move is illegal.
    pub fn capture_count(&self, pos: Position, player: Player) -> usize {
        self.collect_captures(pos, player).len()
    }

    /// Places one stone and flips captured stones, skipping fixed ones.
    /// Returns `None` and leaves the board unchanged when the move is illegal.
    pub fn place_stone(
        &mut self,
        pos: Position,
        player: Player,
        fix_this_stone: bool,
    ) -> Option<Placement> {
        let captures = self.collect_captures(pos, player);
        if captures.is_empty() {
            return None;
        }

        let charges = &mut self.fix_charges[player.index()];
        let fixed = fix_this_stone && *charges > 0;
        if fixed {
            *charges -= 1;
        }
        self.grid[pos.y as usize][pos.x as usize] = if fixed {
            Cell::Fixed(player)
        } else {
            Cell::Loose(player)
        };

        let mut placement = Placement {
            fixed,
            ..Placement::default()
        };
        for captured in captures {
            let cell = &mut self.grid[captured.y as usize][captured.x as usize];
            if cell.is_fixed() {
                placement.shielded.push(captured);
            } else {
                *cell = Cell::Loose(player);
                placement.flipped.push(captured);
            }
        }

        Some(placement)
    }

    /// Returns `(black_count, white_count)`.
    pub fn count_stones(&self) -> (u8, u8) {
        let mut black = 0u8;
        let mut white = 0u8;
        for cell in self.grid.iter().flatten() {
            match cell.owner() {
                Some(Player::Black) => black += 1,
                Some(Player::White) => white += 1,
                None => {}
            }
        }
        (black, white)
    }

    /// Converts board to `[u8; 64]` where 0=empty, 1=black, 2=white.
    pub fn to_array(&self) -> [u8; NUM_SQUARES] {
        let mut board = [0u8; NUM_SQUARES];
        for (square, cell) in board.iter_mut().zip(self.grid.iter().flatten()) {
            *square = cell.owner().map_or(0, Player::code);
        }
        board
    }

    /// Row-major flags, `true` for fixed stones.
    pub fn fixed_mask(&self) -> [bool; NUM_SQUARES] {
        let mut mask = [false; NUM_SQUARES];
        for (flag, cell) in mask.iter_mut().zip(self.grid.iter().flatten()) {
            *flag = cell.is_fixed();
        }
        mask
    }

    /// Every opponent stone in a run bracketed by `player`, over all eight
    /// directions. Each run is read from the current board, so runs never
    /// chain off each other.
    fn collect_captures(&self, pos: Position, player: Player) -> Vec<Position> {
        let mut captures = Vec::new();
        if !in_bounds(pos.x as i32, pos.y as i32) || self.cell(pos) != Cell::Empty {
            return captures;
        }

        let opponent = player.opponent();
        for (dx, dy) in DIRECTIONS {
            let mut x = pos.x as i32 + dx;
            let mut y = pos.y as i32 + dy;
            let mut line = Vec::new();

            while in_bounds(x, y) {
                let square = Position::new(x as u8, y as u8);
                match self.cell(square).owner() {
                    Some(owner) if owner == opponent => line.push(square),
                    Some(_) => {
                        captures.append(&mut line);
                        break;
                    }
                    None => break,
                }

                x += dx;
                y += dy;
            }
        }

        captures
    }

    /// Builds a board from eight rows of eight characters:
    /// `.` empty, `B`/`W` loose stones, `b`/`w` fixed stones.
    #[cfg(test)]
    pub(crate) fn from_diagram(rows: [&str; BOARD_SIZE], fix_charges: [u8; 2]) -> Self {
        let mut grid = [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE];
        for (y, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), BOARD_SIZE, "row {y} must have 8 cells");
            for (x, ch) in row.chars().enumerate() {
                grid[y][x] = match ch {
                    '.' => Cell::Empty,
                    'B' => Cell::Loose(Player::Black),
                    'W' => Cell::Loose(Player::White),
                    'b' => Cell::Fixed(Player::Black),
                    'w' => Cell::Fixed(Player::White),
                    other => panic!("unexpected cell {other:?}"),
                };
            }
        }
        Self { grid, fix_charges }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// All squares in row-major order.
pub fn all_positions() -> impl Iterator<Item = Position> {
    (0..BOARD_SIZE as u8).flat_map(|y| (0..BOARD_SIZE as u8).map(move |x| Position::new(x, y)))
}

fn in_bounds(x: i32, y: i32) -> bool {
    (0..BOARD_SIZE as i32).contains(&x) && (0..BOARD_SIZE as i32).contains(&y)
}
