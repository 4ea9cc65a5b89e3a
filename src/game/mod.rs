//! Core game logic: board, seats, hidden mines and the per-game state machine.
//! Nothing in here logs or blocks; front-ends drive it and report the results.

mod board;
mod minefield;
mod participant;
mod render;
mod rules;
mod seat;
mod state;

pub use board::{Board, Cell, COLS, CONNECT, ROWS};
pub use minefield::{FixedMineLayer, MineLayer, Minefield, Position, RandomMineLayer};
pub use participant::{LocalPlayer, Participant};
pub use render::{render_board, GlyphSet};
pub use rules::GameRules;
pub use seat::Seat;
pub use state::{GameState, GameStatus, MoveOutcome, TurnAnnouncement, TurnReport};
