use log::{debug, info};
use web_time::{Duration, Instant};

use crate::ai::{GreedySelector, MoveSelector};
use crate::board::Board;
use crate::config::Pacing;
use crate::layout::{DialogButton, FixDialog, cell_at};
use crate::types::{GameResult, GameState, Player, Position};

pub const HUMAN: Player = Player::Black;
pub const CPU: Player = Player::White;

/// Turn state. The dialog layout only exists while a fix choice is pending.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Playing,
    AwaitingFixChoice { pending: Position, dialog: FixDialog },
    GameOver(GameResult),
}

impl Phase {
    pub fn dialog(&self) -> Option<&FixDialog> {
        match self {
            Phase::AwaitingFixChoice { dialog, .. } => Some(dialog),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    CpuMove,
    HandBack,
    PassTurn,
}

/// A running pause. Always runs to completion; input is ignored meanwhile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pause {
    until: Instant,
    then: Step,
}

pub struct GameInstance {
    board: Board,
    pub current_player: Player,
    phase: Phase,
    pause: Option<Pause>,
    message: String,
    pacing: Pacing,
    selector: Box<dyn MoveSelector>,
}

impl GameInstance {
    pub fn new(pacing: Pacing, selector: Box<dyn MoveSelector>) -> Self {
        Self {
            board: Board::new(),
            current_player: HUMAN,
            phase: Phase::Playing,
            pause: None,
            message: turn_message(HUMAN).to_string(),
            pacing,
            selector,
        }
    }

    pub fn new_with_default_selector(pacing: Pacing) -> Self {
        Self::new(pacing, Box::new(GreedySelector))
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.phase, Phase::GameOver(_))
    }

    pub fn is_paused(&self) -> bool {
        self.pause.is_some()
    }

    /// Pointer press in canvas pixels.
    pub fn pointer_down(&mut self, px: f64, py: f64, now: Instant) {
        let outcome = match self.phase {
            Phase::Playing => match cell_at(px, py) {
                Some(pos) => self.place(pos, now),
                None => Err("pointer outside the board".to_string()),
            },
            Phase::AwaitingFixChoice { dialog, .. } => match dialog.hit(px, py) {
                Some(DialogButton::Yes) => self.choose_fix(true, now),
                Some(DialogButton::No) => self.choose_fix(false, now),
                None => Err("pointer outside the dialog buttons".to_string()),
            },
            Phase::GameOver(_) => Err("game is already over".to_string()),
        };
        if let Err(reason) = outcome {
            debug!("ignored pointer at ({px}, {py}): {reason}");
        }
    }

    /// Key press, named as in `KeyboardEvent.key`.
    pub fn key_down(&mut self, key: &str, now: Instant) {
        let outcome = match key {
            "y" | "Y" => self.choose_fix(true, now),
            "n" | "N" => self.choose_fix(false, now),
            _ => return,
        };
        if let Err(reason) = outcome {
            debug!("ignored key {key:?}: {reason}");
        }
    }

    /// Human move. Defers to the fix dialog while the human has charges left.
    pub fn place(&mut self, pos: Position, now: Instant) -> Result<(), String> {
        self.ensure_human_can_act()?;
        if self.phase != Phase::Playing {
            return Err("a fix choice is pending".to_string());
        }
        if !self.board.can_place(pos, HUMAN) {
            return Err("illegal move".to_string());
        }

        if self.board.fix_charges(HUMAN) > 0 {
            self.phase = Phase::AwaitingFixChoice {
                pending: pos,
                dialog: FixDialog::centered(),
            };
            return Ok(());
        }

        self.apply_move(pos, HUMAN, false, now)
    }

    /// Resolves the pending fix dialog.
    pub fn choose_fix(&mut self, fix: bool, now: Instant) -> Result<(), String> {
        self.ensure_human_can_act()?;
        let Phase::AwaitingFixChoice { pending, .. } = self.phase else {
            return Err("no fix choice is pending".to_string());
        };

        self.phase = Phase::Playing;
        self.apply_move(pending, HUMAN, fix, now)
    }

    /// Runs every pause that is due by `now`.
    pub fn advance(&mut self, now: Instant) {
        while let Some(pause) = self.pause {
            if now < pause.until {
                break;
            }
            self.pause = None;
            match pause.then {
                Step::CpuMove => {
                    if let Err(reason) = self.do_ai_move(pause.until) {
                        debug!("CPU move skipped: {reason}");
                    }
                }
                Step::HandBack => {}
                Step::PassTurn => self.pass(pause.until),
            }
        }
    }

    pub fn do_ai_move(&mut self, now: Instant) -> Result<(), String> {
        if self.is_game_over() {
            return Err("game is already over".to_string());
        }
        if self.current_player != CPU {
            return Err("it is not the CPU's turn".to_string());
        }

        let decision = self
            .selector
            .select_move(&self.board, CPU)
            .ok_or_else(|| "CPU has no legal moves".to_string())?;

        self.apply_move(decision.pos, CPU, decision.fix, now)
    }

    pub fn to_game_state(&self) -> GameState {
        let (black_count, white_count) = self.board.count_stones();
        GameState {
            board: self.board.to_array().to_vec(),
            fixed: self.board.fixed_mask().to_vec(),
            current_player: self.current_player.code(),
            black_count,
            white_count,
            black_fix_charges: self.board.fix_charges(Player::Black),
            white_fix_charges: self.board.fix_charges(Player::White),
            is_game_over: self.is_game_over(),
            awaiting_fix_choice: self.phase.dialog().is_some(),
            message: self.message.clone(),
            result: match self.phase {
                Phase::GameOver(result) => Some(result),
                _ => None,
            },
        }
    }

    pub fn to_game_result(&self) -> GameResult {
        let (black_count, white_count) = self.board.count_stones();
        GameResult::from_counts(black_count, white_count)
    }

    fn ensure_human_can_act(&self) -> Result<(), String> {
        if self.is_game_over() {
            return Err("game is already over".to_string());
        }
        if self.current_player != HUMAN {
            return Err("it is not the player's turn".to_string());
        }
        if self.pause.is_some() {
            return Err("waiting for a pause to finish".to_string());
        }
        Ok(())
    }

    fn apply_move(
        &mut self,
        pos: Position,
        player: Player,
        fix: bool,
        now: Instant,
    ) -> Result<(), String> {
        let placement = self
            .board
            .place_stone(pos, player, fix)
            .ok_or_else(|| "illegal move".to_string())?;

        info!(
            "{} placed ({}, {}){}: flipped {}, shielded {}",
            side_name(player),
            pos.x,
            pos.y,
            if placement.fixed { " fixed" } else { "" },
            placement.flipped.len(),
            placement.shielded.len()
        );

        self.finish_turn(player, now);
        Ok(())
    }

    /// Hands the turn over after a placement, passing or ending as needed.
    fn finish_turn(&mut self, mover: Player, now: Instant) {
        let next = mover.opponent();
        self.current_player = next;

        if !self.board.has_valid_move(next) {
            if !self.board.has_valid_move(mover) {
                self.end_game();
                return;
            }
            info!("{} has no legal move and passes", side_name(next));
            self.message = pass_message(next).to_string();
            self.schedule(Step::PassTurn, self.pacing.pass_notice, now);
            return;
        }

        self.message = turn_message(next).to_string();
        if next == CPU {
            self.schedule(Step::CpuMove, self.pacing.cpu_think, now);
        } else {
            self.schedule(Step::HandBack, self.pacing.cpu_settle, now);
        }
    }

    fn pass(&mut self, now: Instant) {
        self.current_player = self.current_player.opponent();
        self.message = turn_message(self.current_player).to_string();
        if self.current_player == CPU {
            self.schedule(Step::CpuMove, self.pacing.cpu_think, now);
        }
    }

    fn end_game(&mut self) {
        let result = self.to_game_result();
        info!(
            "game over: black {} - white {}",
            result.black_count, result.white_count
        );
        self.message = game_over_message(&result);
        self.phase = Phase::GameOver(result);
        self.pause = None;
    }

    fn schedule(&mut self, then: Step, after: Duration, now: Instant) {
        self.pause = Some(Pause {
            until: now + after,
            then,
        });
    }

    #[cfg(test)]
    fn set_board_for_test(&mut self, board: Board, current_player: Player) {
        self.board = board;
        self.current_player = current_player;
        self.phase = Phase::Playing;
        self.pause = None;
        self.message = turn_message(current_player).to_string();
    }
}

fn side_name(player: Player) -> &'static str {
    match player {
        Player::Black => "human",
        Player::White => "CPU",
    }
}

fn turn_message(player: Player) -> &'static str {
    match player {
        Player::Black => "あなたの番です (黒)",
        Player::White => "CPUの番です (白)",
    }
}

fn pass_message(player: Player) -> &'static str {
    match player {
        Player::Black => "あなたはパス",
        Player::White => "CPUはパス",
    }
}

fn game_over_message(result: &GameResult) -> String {
    let verdict = match result.winner {
        Some(Player::Black) => "あなたの勝ち",
        Some(Player::White) => "CPUの勝ち",
        None => "引き分け",
    };
    format!(
        "ゲーム終了！ {verdict} ({}-{})",
        result.black_count, result.white_count
    )
}

/// Panel line with the remaining fix charges.
pub fn fix_charges_line(board: &Board) -> String {
    format!(
        "固定権: あなた {} | CPU {}",
        board.fix_charges(HUMAN),
        board.fix_charges(CPU)
    )
}

/// Panel line with the live stone tally.
pub fn score_line(board: &Board) -> String {
    let (black, white) = board.count_stones();
    format!("あなた(黒):{black} CPU(白):{white}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::Decision;
    use crate::board::Cell;

    struct ScriptedSelector {
        decision: Decision,
    }

    impl MoveSelector for ScriptedSelector {
        fn select_move(&self, _board: &Board, _player: Player) -> Option<Decision> {
            Some(self.decision)
        }
    }

    fn pos(x: u8, y: u8) -> Position {
        Position::new(x, y)
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    /// Pointer coordinates in the middle of a cell.
    fn click(game: &mut GameInstance, at: Position, now: Instant) {
        game.pointer_down(at.x as f64 * 80.0 + 40.0, at.y as f64 * 80.0 + 40.0, now);
    }

    #[test]
    fn initial_state_is_correct() {
        let game = GameInstance::new_with_default_selector(Pacing::default());
        let state = game.to_game_state();

        assert_eq!(state.current_player, 1);
        assert_eq!(state.black_count, 2);
        assert_eq!(state.white_count, 2);
        assert_eq!(state.black_fix_charges, 2);
        assert_eq!(state.white_fix_charges, 2);
        assert!(!state.is_game_over);
        assert!(!state.awaiting_fix_choice);
        assert_eq!(state.result, None);
        assert_eq!(state.message, "あなたの番です (黒)");
        assert_eq!(game.board().valid_moves(game.current_player).len(), 4);
        assert!(!game.is_paused());
    }

    #[test]
    fn legal_click_with_charges_defers_placement_to_the_dialog() {
        let mut game = GameInstance::new_with_default_selector(Pacing::default());
        let t0 = Instant::now();

        click(&mut game, pos(2, 3), t0);

        match game.phase() {
            Phase::AwaitingFixChoice { pending, dialog } => {
                assert_eq!(*pending, pos(2, 3));
                assert_eq!(*dialog, FixDialog::centered());
            }
            other => panic!("unexpected phase {other:?}"),
        }
        assert_eq!(game.board(), &Board::new());
        assert_eq!(game.current_player, HUMAN);
    }

    #[test]
    fn yes_button_fixes_the_stone_and_starts_the_cpu_pause() {
        let pacing = Pacing::default();
        let mut game = GameInstance::new_with_default_selector(pacing);
        let t0 = Instant::now();

        click(&mut game, pos(2, 3), t0);
        let dialog = *game.phase().dialog().unwrap();
        let (yx, yy) = dialog.yes.center();
        game.pointer_down(yx, yy, t0);

        assert_eq!(game.phase(), &Phase::Playing);
        assert_eq!(game.board().cell(pos(2, 3)), Cell::Fixed(HUMAN));
        assert_eq!(game.board().cell(pos(3, 3)), Cell::Loose(HUMAN));
        assert_eq!(game.board().fix_charges(HUMAN), 1);
        assert_eq!(game.board().count_stones(), (4, 1));
        assert_eq!(game.current_player, CPU);
        assert_eq!(game.message(), "CPUの番です (白)");
        assert!(game.is_paused());

        game.advance(t0 + pacing.cpu_think - ms(1));
        assert_eq!(game.current_player, CPU);
        assert_eq!(game.board().count_stones(), (4, 1));

        game.advance(t0 + pacing.cpu_think);
        assert_eq!(game.current_player, HUMAN);
        assert_eq!(game.board().count_stones(), (3, 3));
        assert!(game.is_paused(), "settle pause follows the CPU move");

        game.advance(t0 + pacing.cpu_think + pacing.cpu_settle);
        assert!(!game.is_paused());
        assert_eq!(game.message(), "あなたの番です (黒)");
    }

    #[test]
    fn n_key_places_without_fixing() {
        let mut game = GameInstance::new_with_default_selector(Pacing::default());
        let t0 = Instant::now();

        click(&mut game, pos(2, 3), t0);
        game.key_down("N", t0);

        assert_eq!(game.board().cell(pos(2, 3)), Cell::Loose(HUMAN));
        assert_eq!(game.board().fix_charges(HUMAN), 2);
        assert_eq!(game.current_player, CPU);
    }

    #[test]
    fn clicks_outside_the_buttons_keep_the_dialog_open() {
        let mut game = GameInstance::new_with_default_selector(Pacing::default());
        let t0 = Instant::now();

        click(&mut game, pos(2, 3), t0);
        game.pointer_down(5.0, 5.0, t0);
        game.key_down("x", t0);

        assert!(game.phase().dialog().is_some());
        assert_eq!(game.board(), &Board::new());
    }

    #[test]
    fn without_charges_the_stone_is_placed_immediately() {
        let mut game = GameInstance::new_with_default_selector(Pacing::default());
        let board = Board::from_diagram(
            [
                "........",
                "........",
                "........",
                "...WB...",
                "...BW...",
                "........",
                "........",
                "........",
            ],
            [0, 2],
        );
        game.set_board_for_test(board, HUMAN);

        click(&mut game, pos(2, 3), Instant::now());

        assert_eq!(game.phase(), &Phase::Playing);
        assert_eq!(game.board().count_stones(), (4, 1));
        assert_eq!(game.current_player, CPU);
    }

    #[test]
    fn illegal_player_move_returns_error() {
        let mut game = GameInstance::new_with_default_selector(Pacing::default());
        let t0 = Instant::now();

        let err = game.place(pos(0, 0), t0).unwrap_err();
        assert!(err.contains("illegal move"));

        click(&mut game, pos(0, 0), t0);
        game.pointer_down(100.0, 700.0, t0);
        assert_eq!(game.phase(), &Phase::Playing);
        assert_eq!(game.board(), &Board::new());
    }

    #[test]
    fn human_input_is_ignored_during_the_cpu_turn_and_pauses() {
        let pacing = Pacing::default();
        let mut game = GameInstance::new_with_default_selector(pacing);
        let t0 = Instant::now();

        click(&mut game, pos(2, 3), t0);
        game.key_down("n", t0);
        let before = game.board().clone();

        let err = game.place(pos(2, 2), t0).unwrap_err();
        assert!(err.contains("not the player's turn"));
        assert_eq!(game.board(), &before);

        game.advance(t0 + pacing.cpu_think);
        let legal = game.board().valid_moves(game.current_player)[0];
        let err = game.place(legal, t0 + pacing.cpu_think).unwrap_err();
        assert!(err.contains("pause"));
    }

    #[test]
    fn cpu_uses_its_selector_and_fixes_strategic_squares() {
        let mut game = GameInstance::new(
            Pacing::instant(),
            Box::new(ScriptedSelector {
                decision: Decision {
                    pos: pos(0, 0),
                    fix: true,
                },
            }),
        );
        let board = Board::from_diagram(
            [
                ".BW.....",
                "........",
                "........",
                "...WB...",
                "...BW...",
                "........",
                "........",
                "........",
            ],
            [2, 2],
        );
        game.set_board_for_test(board, CPU);

        game.do_ai_move(Instant::now()).unwrap();

        assert_eq!(game.board().cell(pos(0, 0)), Cell::Fixed(CPU));
        assert_eq!(game.board().fix_charges(CPU), 1);
        assert_eq!(game.current_player, HUMAN);
    }

    #[test]
    fn cpu_pass_shows_a_notice_then_returns_the_turn() {
        let pacing = Pacing::default();
        let mut game = GameInstance::new_with_default_selector(pacing);
        let board = Board::from_diagram(
            [
                ".WB.....",
                "........",
                "........",
                "........",
                "........",
                "........",
                ".......W",
                ".......B",
            ],
            [0, 2],
        );
        game.set_board_for_test(board, HUMAN);
        let t0 = Instant::now();

        click(&mut game, pos(0, 0), t0);

        assert_eq!(game.message(), "CPUはパス");
        assert_eq!(game.current_player, CPU);
        assert!(!game.is_game_over());

        game.advance(t0 + pacing.pass_notice - ms(1));
        assert_eq!(game.message(), "CPUはパス");

        game.advance(t0 + pacing.pass_notice);
        assert_eq!(game.current_player, HUMAN);
        assert_eq!(game.message(), "あなたの番です (黒)");
        assert!(!game.is_paused());
        assert_eq!(game.board().valid_moves(game.current_player), vec![pos(7, 5)]);
    }

    #[test]
    fn human_pass_lets_the_cpu_move_again() {
        let mut game = GameInstance::new_with_default_selector(Pacing::instant());
        // White takes (0,0); black is then stuck while white can still play (7,5).
        let board = Board::from_diagram(
            [
                ".BW.....",
                "........",
                "........",
                "........",
                "........",
                "........",
                ".......B",
                ".......W",
            ],
            [2, 0],
        );
        game.set_board_for_test(board, CPU);
        game.pause = Some(Pause {
            until: Instant::now(),
            then: Step::CpuMove,
        });

        game.advance(Instant::now());

        assert_eq!(game.board().cell(pos(0, 0)), Cell::Loose(CPU));
        assert_eq!(game.board().cell(pos(7, 5)), Cell::Loose(CPU));
        assert!(game.is_game_over());
        assert_eq!(
            game.to_game_result(),
            GameResult {
                winner: Some(CPU),
                black_count: 0,
                white_count: 6,
            }
        );
        assert_eq!(game.message(), "ゲーム終了！ CPUの勝ち (0-6)");
    }

    #[test]
    fn human_pass_notice_holds_before_the_cpu_moves_again() {
        let pacing = Pacing::default();
        let mut game = GameInstance::new_with_default_selector(pacing);
        let board = Board::from_diagram(
            [
                ".BW.....",
                "........",
                "........",
                "........",
                "........",
                "........",
                ".......B",
                ".......W",
            ],
            [2, 0],
        );
        game.set_board_for_test(board, CPU);
        let t0 = Instant::now();
        game.pause = Some(Pause {
            until: t0,
            then: Step::CpuMove,
        });

        game.advance(t0);
        assert_eq!(game.board().cell(pos(0, 0)), Cell::Loose(CPU));
        assert_eq!(game.message(), "あなたはパス");
        assert_eq!(game.current_player, HUMAN);
        assert!(game.is_paused());

        game.advance(t0 + pacing.pass_notice - ms(1));
        assert_eq!(game.message(), "あなたはパス");
        assert_eq!(game.board().cell(pos(7, 5)), Cell::Empty);

        game.advance(t0 + pacing.pass_notice);
        assert_eq!(game.current_player, CPU);
        assert_eq!(game.message(), "CPUの番です (白)");
        assert_eq!(game.board().cell(pos(7, 5)), Cell::Empty);

        game.advance(t0 + pacing.pass_notice + pacing.cpu_think - ms(1));
        assert_eq!(game.board().cell(pos(7, 5)), Cell::Empty);

        game.advance(t0 + pacing.pass_notice + pacing.cpu_think);
        assert_eq!(game.board().cell(pos(7, 5)), Cell::Loose(CPU));
        assert!(game.is_game_over());
    }

    #[test]
    fn y_key_in_either_case_fixes_the_stone() {
        for key in ["y", "Y"] {
            let mut game = GameInstance::new_with_default_selector(Pacing::default());
            let t0 = Instant::now();

            click(&mut game, pos(2, 3), t0);
            game.key_down(key, t0);

            assert_eq!(game.phase(), &Phase::Playing, "key {key}");
            assert_eq!(game.board().cell(pos(2, 3)), Cell::Fixed(HUMAN), "key {key}");
            assert_eq!(game.board().fix_charges(HUMAN), 1, "key {key}");
            assert_eq!(game.current_player, CPU, "key {key}");
        }
    }

    #[test]
    fn neither_side_moving_ends_the_game_with_the_higher_count_winning() {
        let mut game = GameInstance::new_with_default_selector(Pacing::default());
        let board = Board::from_diagram(
            [
                ".WB.....",
                "........",
                "........",
                "........",
                "........",
                "........",
                "........",
                "........",
            ],
            [0, 2],
        );
        game.set_board_for_test(board, HUMAN);

        click(&mut game, pos(0, 0), Instant::now());

        assert!(game.is_game_over());
        assert!(!game.is_paused());
        assert_eq!(
            game.phase(),
            &Phase::GameOver(GameResult {
                winner: Some(HUMAN),
                black_count: 3,
                white_count: 0,
            })
        );
        assert_eq!(game.message(), "ゲーム終了！ あなたの勝ち (3-0)");
        let state = game.to_game_state();
        assert!(state.is_game_over);
        assert_eq!(state.result.and_then(|r| r.winner), Some(HUMAN));
        assert!(game.place(pos(5, 5), Instant::now()).is_err());
    }

    #[test]
    fn equal_counts_at_game_end_are_a_draw() {
        let mut game = GameInstance::new_with_default_selector(Pacing::default());
        let board = Board::from_diagram(
            [
                ".WB.....",
                "........",
                "........",
                "........",
                "........",
                "........",
                "........",
                "WWW.....",
            ],
            [0, 2],
        );
        game.set_board_for_test(board, HUMAN);

        click(&mut game, pos(0, 0), Instant::now());

        assert!(game.is_game_over());
        assert_eq!(game.to_game_result().winner, None);
        assert_eq!(game.message(), "ゲーム終了！ 引き分け (3-3)");
    }

    #[test]
    fn panel_lines_report_charges_and_tally() {
        let board = Board::new();

        assert_eq!(fix_charges_line(&board), "固定権: あなた 2 | CPU 2");
        assert_eq!(score_line(&board), "あなた(黒):2 CPU(白):2");
    }

    #[test]
    fn full_game_against_the_greedy_cpu_terminates() {
        let mut game = GameInstance::new_with_default_selector(Pacing::instant());
        let now = Instant::now();

        for _ in 0..200 {
            if game.is_game_over() {
                break;
            }
            game.advance(now);
            if game.current_player == HUMAN && !game.is_game_over() {
                let mv = game.board().valid_moves(game.current_player)[0];
                game.place(mv, now).unwrap();
                if game.phase().dialog().is_some() {
                    game.choose_fix(true, now).unwrap();
                }
            }
        }

        assert!(game.is_game_over());
        let (black, white) = game.board().count_stones();
        assert!(black as usize + white as usize <= 64);
        assert_eq!(game.board().fix_charges(HUMAN), 0);
    }
}
