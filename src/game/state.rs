use std::fmt;

use serde::{Deserialize, Serialize};

use super::board::{Board, COLS};
use super::minefield::{MineLayer, Minefield, Position};
use super::participant::Participant;
use super::rules::GameRules;
use super::seat::Seat;
use crate::error::GameError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    InProgress,
    Won(Seat),
    Drawn,
    Aborted,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        self != GameStatus::InProgress
    }
}

/// Result of an accepted move. Exactly one of: a piece was placed, or a
/// mine went off and the board is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOutcome {
    Placed { row: usize, col: usize, won: bool },
    LandmineTriggered { row: usize, col: usize },
}

impl MoveOutcome {
    pub fn position(&self) -> Position {
        match *self {
            MoveOutcome::Placed { row, col, .. } | MoveOutcome::LandmineTriggered { row, col } => {
                Position::new(row, col)
            }
        }
    }

    pub fn is_landmine(&self) -> bool {
        matches!(self, MoveOutcome::LandmineTriggered { .. })
    }
}

/// Told to the table when a penalised player sits out a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnAnnouncement {
    pub seat: Seat,
    pub handle: String,
    /// Skips still owed after this one.
    pub remaining: u32,
}

impl fmt::Display for TurnAnnouncement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} loses a turn! ({} turns remaining to lose)",
            self.handle, self.remaining
        )
    }
}

/// Everything the front-end needs to report after one button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    pub outcome: MoveOutcome,
    pub announcement: Option<TurnAnnouncement>,
}

/// One game of Connect Four with hidden landmines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "GameStateRepr<P>",
    bound(deserialize = "P: Participant + Deserialize<'de>")
)]
pub struct GameState<P> {
    board: Board,
    players: [P; 2],
    current: Seat,
    mines: Minefield,
    turns_to_lose: [u32; 2],
    status: GameStatus,
    rules: GameRules,
}

/// Wire shape of a [`GameState`], checked before it becomes one.
#[derive(Deserialize)]
struct GameStateRepr<P> {
    board: Board,
    players: [P; 2],
    current: Seat,
    mines: Minefield,
    turns_to_lose: [u32; 2],
    status: GameStatus,
    rules: GameRules,
}

impl<P: Participant> TryFrom<GameStateRepr<P>> for GameState<P> {
    type Error = GameError;

    fn try_from(repr: GameStateRepr<P>) -> Result<Self, Self::Error> {
        let [red, blue] = repr.players;
        Self::check_participants(&red, &blue)?;
        Ok(GameState {
            board: repr.board,
            players: [red, blue],
            current: repr.current,
            mines: repr.mines,
            turns_to_lose: repr.turns_to_lose,
            status: repr.status,
            rules: repr.rules,
        })
    }
}

impl<P: Participant> GameState<P> {
    /// Seat two participants and hide a fresh set of mines. `red` moves first.
    pub fn create(
        red: P,
        blue: P,
        layer: &mut dyn MineLayer,
        rules: GameRules,
    ) -> Result<Self, GameError> {
        Self::check_participants(&red, &blue)?;
        Ok(Self::build(red, blue, layer.lay(), rules))
    }

    /// Seat two participants over a known minefield.
    pub fn with_minefield(
        red: P,
        blue: P,
        mines: Minefield,
        rules: GameRules,
    ) -> Result<Self, GameError> {
        Self::check_participants(&red, &blue)?;
        Ok(Self::build(red, blue, mines, rules))
    }

    fn check_participants(red: &P, blue: &P) -> Result<(), GameError> {
        if red == blue {
            return Err(GameError::SamePlayer);
        }
        for p in [red, blue] {
            if !p.is_human() {
                return Err(GameError::NotHuman { handle: p.handle() });
            }
        }
        Ok(())
    }

    fn build(red: P, blue: P, mines: Minefield, rules: GameRules) -> Self {
        GameState {
            board: Board::new(),
            players: [red, blue],
            current: Seat::Red,
            mines,
            turns_to_lose: [0, 0],
            status: GameStatus::InProgress,
            rules,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    /// The hidden mines. Front-ends should only show these once the game is over.
    pub fn minefield(&self) -> &Minefield {
        &self.mines
    }

    pub fn player(&self, seat: Seat) -> &P {
        &self.players[seat.index()]
    }

    pub fn players(&self) -> (&P, &P) {
        (&self.players[0], &self.players[1])
    }

    pub fn current_seat(&self) -> Seat {
        self.current
    }

    pub fn current_player(&self) -> &P {
        self.player(self.current)
    }

    pub fn seat_of(&self, participant: &P) -> Option<Seat> {
        [Seat::Red, Seat::Blue]
            .into_iter()
            .find(|&seat| self.player(seat) == participant)
    }

    pub fn is_participant(&self, participant: &P) -> bool {
        self.seat_of(participant).is_some()
    }

    /// Pending skipped turns for a seat.
    pub fn turns_to_lose(&self, seat: Seat) -> u32 {
        self.turns_to_lose[seat.index()]
    }

    pub fn winner(&self) -> Option<&P> {
        match self.status {
            GameStatus::Won(seat) => Some(self.player(seat)),
            _ => None,
        }
    }

    /// Columns that can still take a piece
    pub fn legal_columns(&self) -> Vec<usize> {
        if self.is_terminal() {
            return Vec::new();
        }

        (0..COLS)
            .filter(|&col| !self.board.is_column_full(col))
            .collect()
    }

    /// Drop the current player's piece into `column`.
    ///
    /// If the landing cell holds an armed mine, the mine fires instead: no
    /// piece is placed and the current player owes `mine_penalty` skipped
    /// turns. Does not pass the turn; see [`GameState::advance_turn`].
    pub fn apply_move(&mut self, column: usize) -> Result<MoveOutcome, GameError> {
        if self.is_terminal() {
            return Err(GameError::GameAlreadyOver);
        }

        let row = self.board.landing_row(column)?;
        let seat = self.current;

        if self.mines.trigger(Position::new(row, column)) {
            let owed = &mut self.turns_to_lose[seat.index()];
            *owed = owed.saturating_add(self.rules.mine_penalty);
            return Ok(MoveOutcome::LandmineTriggered { row, col: column });
        }

        let cell = seat.to_cell();
        self.board.place(row, column, cell);

        let won = self.board.check_win(row, column, cell);
        if won {
            self.status = GameStatus::Won(seat);
        } else if self.board.is_full() {
            self.status = GameStatus::Drawn;
        }

        Ok(MoveOutcome::Placed {
            row,
            col: column,
            won,
        })
    }

    /// [`GameState::apply_move`] on behalf of `requester`, who must be the
    /// player whose turn it is.
    pub fn apply_move_as(&mut self, requester: &P, column: usize) -> Result<MoveOutcome, GameError> {
        if self.is_terminal() {
            return Err(GameError::GameAlreadyOver);
        }
        match self.seat_of(requester) {
            None => Err(GameError::NotAParticipant),
            Some(seat) if seat != self.current => Err(GameError::NotYourTurn),
            Some(_) => self.apply_move(column),
        }
    }

    /// Hand the turn on after a placement.
    ///
    /// A player who owes skipped turns keeps the turn and pays one skip;
    /// otherwise the other seat takes over.
    pub fn advance_turn(&mut self) -> Result<Option<TurnAnnouncement>, GameError> {
        if self.is_terminal() {
            return Err(GameError::GameAlreadyOver);
        }

        let seat = self.current;
        let owed = self.turns_to_lose[seat.index()];
        if owed > 0 {
            self.turns_to_lose[seat.index()] = owed - 1;
            return Ok(Some(TurnAnnouncement {
                seat,
                handle: self.player(seat).handle(),
                remaining: owed - 1,
            }));
        }

        self.current = seat.other();
        Ok(None)
    }

    /// One full turn: the move, then the hand-over if a piece was placed and
    /// the game goes on. A mine hit leaves the turn where it is.
    pub fn play(&mut self, requester: &P, column: usize) -> Result<TurnReport, GameError> {
        let outcome = self.apply_move_as(requester, column)?;

        let announcement = match outcome {
            MoveOutcome::Placed { .. } if !self.is_terminal() => self.advance_turn()?,
            _ => None,
        };

        Ok(TurnReport {
            outcome,
            announcement,
        })
    }

    /// End the game at a participant's request. Finished games keep their result.
    pub fn abort(&mut self, requester: &P) -> Result<(), GameError> {
        if !self.is_participant(requester) {
            return Err(GameError::NotAParticipant);
        }
        self.expire();
        Ok(())
    }

    /// End the game without a requester, e.g. when nobody moved for too long.
    pub fn expire(&mut self) {
        if !self.is_terminal() {
            self.status = GameStatus::Aborted;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board::{Cell, ROWS};
    use crate::game::minefield::{FixedMineLayer, RandomMineLayer};
    use crate::game::participant::LocalPlayer;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Account {
        id: u64,
        bot: bool,
    }

    impl Participant for Account {
        fn handle(&self) -> String {
            format!("<@{}>", self.id)
        }

        fn is_human(&self) -> bool {
            !self.bot
        }
    }

    fn alice() -> LocalPlayer {
        LocalPlayer::new("alice")
    }

    fn bob() -> LocalPlayer {
        LocalPlayer::new("bob")
    }

    fn game_with_mines(mines: &[(usize, usize)]) -> GameState<LocalPlayer> {
        let field = Minefield::new(mines.iter().map(|&(r, c)| Position::new(r, c))).unwrap();
        GameState::with_minefield(alice(), bob(), field, GameRules::default()).unwrap()
    }

    fn mine_free_game() -> GameState<LocalPlayer> {
        game_with_mines(&[])
    }

    #[test]
    fn test_initial_state() {
        let rules = GameRules::default();
        let mut layer = RandomMineLayer::seeded(11, &rules);
        let state = GameState::create(alice(), bob(), &mut layer, rules).unwrap();

        assert_eq!(state.current_player(), &alice());
        assert_eq!(state.current_seat(), Seat::Red);
        assert_eq!(state.status(), GameStatus::InProgress);
        assert_eq!(state.turns_to_lose(Seat::Red), 0);
        assert_eq!(state.turns_to_lose(Seat::Blue), 0);
        assert_eq!(state.board().piece_count(), 0);
        assert!((3..=5).contains(&state.minefield().len()));
        assert_eq!(state.legal_columns().len(), 7);
    }

    #[test]
    fn test_create_rejects_same_player() {
        let mut layer = FixedMineLayer::none();
        let result = GameState::create(alice(), alice(), &mut layer, GameRules::default());
        assert_eq!(result.unwrap_err(), GameError::SamePlayer);
    }

    #[test]
    fn test_create_rejects_bots() {
        let mut layer = FixedMineLayer::none();
        let human = Account { id: 1, bot: false };
        let robot = Account { id: 2, bot: true };
        let result = GameState::create(human, robot, &mut layer, GameRules::default());
        assert_eq!(
            result.unwrap_err(),
            GameError::NotHuman {
                handle: "<@2>".into()
            }
        );
    }

    #[test]
    fn test_apply_move_places_at_bottom() {
        let mut state = mine_free_game();
        let outcome = state.apply_move(3).unwrap();
        assert_eq!(
            outcome,
            MoveOutcome::Placed {
                row: 5,
                col: 3,
                won: false
            }
        );
        assert_eq!(state.board().get(5, 3), Cell::Red);
        // apply_move alone does not pass the turn
        assert_eq!(state.current_seat(), Seat::Red);
    }

    #[test]
    fn test_vertical_win_in_column_three() {
        let mut state = mine_free_game();
        for _ in 0..3 {
            state.apply_move(3).unwrap();
            assert_eq!(state.status(), GameStatus::InProgress);
        }
        let outcome = state.apply_move(3).unwrap();
        assert_eq!(
            outcome,
            MoveOutcome::Placed {
                row: 2,
                col: 3,
                won: true
            }
        );
        assert_eq!(state.status(), GameStatus::Won(Seat::Red));
        assert_eq!(state.winner(), Some(&alice()));
        assert!(state.legal_columns().is_empty());
    }

    #[test]
    fn test_column_full() {
        let mut state = mine_free_game();
        for i in 0..ROWS {
            let who = if i % 2 == 0 { alice() } else { bob() };
            state.play(&who, 0).unwrap();
        }
        assert_eq!(state.current_player(), &alice());
        assert_eq!(state.apply_move(0), Err(GameError::ColumnFull(0)));
        assert_eq!(state.board().piece_count(), ROWS);
    }

    #[test]
    fn test_invalid_column() {
        let mut state = mine_free_game();
        assert_eq!(state.apply_move(7), Err(GameError::InvalidColumn(7)));
        assert_eq!(state.board().piece_count(), 0);
    }

    #[test]
    fn test_landmine_costs_two_turns_and_leaves_board() {
        let mut state = game_with_mines(&[(5, 2)]);
        let outcome = state.apply_move(2).unwrap();

        assert_eq!(outcome, MoveOutcome::LandmineTriggered { row: 5, col: 2 });
        assert_eq!(state.board().piece_count(), 0);
        assert_eq!(state.turns_to_lose(Seat::Red), 2);
        assert_eq!(state.turns_to_lose(Seat::Blue), 0);
        assert_eq!(state.current_seat(), Seat::Red);
        assert_eq!(state.minefield().armed_count(), 0);
    }

    #[test]
    fn test_spent_mine_cell_is_ordinary() {
        let mut state = game_with_mines(&[(5, 2)]);
        assert!(state.apply_move(2).unwrap().is_landmine());

        let outcome = state.apply_move(2).unwrap();
        assert_eq!(
            outcome,
            MoveOutcome::Placed {
                row: 5,
                col: 2,
                won: false
            }
        );
        assert_eq!(state.board().get(5, 2), Cell::Red);
        assert_eq!(state.turns_to_lose(Seat::Red), 2);
    }

    #[test]
    fn test_mine_under_another_mine_fires_separately() {
        let mut state = game_with_mines(&[(5, 0), (4, 0)]);
        assert!(state.apply_move(0).unwrap().is_landmine());
        // (5, 0) is spent, so the next piece settles there
        let outcome = state.apply_move(0).unwrap();
        assert!(!outcome.is_landmine());
        assert_eq!(outcome.position(), Position::new(5, 0));

        let outcome = state.apply_move(0).unwrap();
        assert_eq!(outcome, MoveOutcome::LandmineTriggered { row: 4, col: 0 });
        assert_eq!(state.turns_to_lose(Seat::Red), 4);
        assert_eq!(state.apply_move(0).unwrap().position(), Position::new(4, 0));
        assert_eq!(state.board().piece_count(), 2);
    }

    #[test]
    fn test_penalised_player_keeps_turn_twice() {
        let mut state = game_with_mines(&[(5, 2)]);

        // alice hits the mine
        let report = state.play(&alice(), 2).unwrap();
        assert!(report.outcome.is_landmine());
        assert_eq!(report.announcement, None);
        assert_eq!(state.current_player(), &alice());

        // first skip
        let report = state.play(&alice(), 0).unwrap();
        let announcement = report.announcement.unwrap();
        assert_eq!(announcement.remaining, 1);
        assert_eq!(announcement.seat, Seat::Red);
        assert_eq!(announcement.to_string(), "alice loses a turn! (1 turns remaining to lose)");
        assert_eq!(state.current_player(), &alice());

        // second skip
        let report = state.play(&alice(), 1).unwrap();
        assert_eq!(report.announcement.unwrap().remaining, 0);
        assert_eq!(state.current_player(), &alice());
        assert_eq!(state.turns_to_lose(Seat::Red), 0);

        // debt paid, bob finally gets the turn
        let report = state.play(&alice(), 4).unwrap();
        assert_eq!(report.announcement, None);
        assert_eq!(state.current_player(), &bob());
    }

    #[test]
    fn test_advance_turn_swaps_without_debt() {
        let mut state = mine_free_game();
        state.apply_move(0).unwrap();
        assert_eq!(state.advance_turn(), Ok(None));
        assert_eq!(state.current_player(), &bob());
        state.apply_move(1).unwrap();
        assert_eq!(state.advance_turn(), Ok(None));
        assert_eq!(state.current_player(), &alice());
    }

    #[test]
    fn test_advance_turn_after_game_over() {
        let mut state = mine_free_game();
        for _ in 0..4 {
            state.apply_move(6).unwrap();
        }
        assert_eq!(state.advance_turn(), Err(GameError::GameAlreadyOver));
        assert_eq!(state.apply_move(0), Err(GameError::GameAlreadyOver));
    }

    #[test]
    fn test_requester_checks() {
        let mut state = mine_free_game();
        let carol = LocalPlayer::new("carol");
        assert_eq!(state.apply_move_as(&bob(), 0), Err(GameError::NotYourTurn));
        assert_eq!(state.apply_move_as(&carol, 0), Err(GameError::NotAParticipant));
        assert!(state.apply_move_as(&alice(), 0).is_ok());
    }

    #[test]
    fn test_winning_play_does_not_pass_turn() {
        let mut state = mine_free_game();
        for col in [0, 0, 1, 1, 2, 2] {
            let who = state.current_player().clone();
            state.play(&who, col).unwrap();
        }
        let report = state.play(&alice(), 3).unwrap();
        assert_eq!(
            report.outcome,
            MoveOutcome::Placed {
                row: 5,
                col: 3,
                won: true
            }
        );
        assert_eq!(report.announcement, None);
        assert_eq!(state.winner(), Some(&alice()));
        assert_eq!(state.play(&bob(), 4), Err(GameError::GameAlreadyOver));
    }

    #[test]
    fn test_full_board_without_four_is_drawn() {
        let mut state = mine_free_game();
        let columns = [
            0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 4, 3, 3, 3, 3, 3, 3, 4, 4, 4,
            4, 4, 5, 5, 5, 5, 5, 5, 6, 6, 6, 6, 6, 6,
        ];

        for (i, &col) in columns.iter().enumerate() {
            let who = state.current_player().clone();
            let report = state.play(&who, col).unwrap();
            assert!(matches!(report.outcome, MoveOutcome::Placed { won: false, .. }));
            if i + 1 < columns.len() {
                assert_eq!(state.status(), GameStatus::InProgress, "ended early at move {i}");
            }
        }

        assert!(state.board().is_full());
        assert_eq!(state.status(), GameStatus::Drawn);
        assert_eq!(state.winner(), None);
    }

    #[test]
    fn test_abort() {
        let mut state = mine_free_game();
        let carol = LocalPlayer::new("carol");
        assert_eq!(state.abort(&carol), Err(GameError::NotAParticipant));
        assert_eq!(state.status(), GameStatus::InProgress);

        state.abort(&bob()).unwrap();
        assert_eq!(state.status(), GameStatus::Aborted);
        state.abort(&alice()).unwrap();
        assert_eq!(state.status(), GameStatus::Aborted);
        assert_eq!(state.apply_move(0), Err(GameError::GameAlreadyOver));
    }

    #[test]
    fn test_abort_keeps_finished_result() {
        let mut state = mine_free_game();
        for _ in 0..4 {
            state.apply_move(5).unwrap();
        }
        state.abort(&bob()).unwrap();
        state.expire();
        assert_eq!(state.status(), GameStatus::Won(Seat::Red));
    }

    #[test]
    fn test_random_games_keep_invariants() {
        let rules = GameRules::default();
        let mut rng = StdRng::seed_from_u64(2024);

        for seed in 0..200 {
            let mut layer = RandomMineLayer::seeded(seed, &rules);
            let mut state = GameState::create(alice(), bob(), &mut layer, rules).unwrap();
            let mut placed = 0;
            let mut landmines = 0;

            while !state.is_terminal() {
                let legal = state.legal_columns();
                let col = legal[rng.random_range(0..legal.len())];
                let before = state.board().piece_count();
                let who = state.current_player().clone();

                match state.play(&who, col).unwrap().outcome {
                    MoveOutcome::Placed { .. } => {
                        placed += 1;
                        assert_eq!(state.board().piece_count(), before + 1);
                    }
                    MoveOutcome::LandmineTriggered { .. } => {
                        landmines += 1;
                        assert_eq!(state.board().piece_count(), before);
                    }
                }
            }

            assert_eq!(state.board().piece_count(), placed);
            assert_eq!(state.minefield().len() - state.minefield().armed_count(), landmines);
            assert!(landmines <= state.minefield().len());
            assert!(matches!(state.status(), GameStatus::Won(_) | GameStatus::Drawn));
        }
    }

    #[test]
    fn test_state_survives_json() {
        let mut state = game_with_mines(&[(5, 1), (0, 6)]);
        state.play(&alice(), 1).unwrap();
        state.play(&alice(), 3).unwrap();

        let json = serde_json::to_string(&state).unwrap();
        let restored: GameState<LocalPlayer> = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, state);
        assert_eq!(restored.turns_to_lose(Seat::Red), 1);
        assert!(!restored.minefield().is_armed(Position::new(5, 1)));
        assert!(restored.minefield().is_armed(Position::new(0, 6)));
    }

    #[test]
    fn test_json_rejects_same_player_twice() {
        let state = mine_free_game();
        let json = serde_json::to_string(&state)
            .unwrap()
            .replace("\"bob\"", "\"alice\"");
        let result = serde_json::from_str::<GameState<LocalPlayer>>(&json);
        assert!(result.is_err());
    }

    #[test]
    fn test_json_rejects_duplicate_mine() {
        let state = game_with_mines(&[(5, 0), (4, 0)]);
        let json = serde_json::to_string(&state)
            .unwrap()
            .replace("\"row\":4,\"col\":0", "\"row\":5,\"col\":0");
        let result = serde_json::from_str::<GameState<LocalPlayer>>(&json);
        assert!(result.is_err());
    }
}
