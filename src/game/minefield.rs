use std::fmt;

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::board::{COLS, ROWS};
use super::rules::GameRules;
use crate::error::GameError;

/// A board coordinate. Row 0 is the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }

    fn from_index(idx: usize) -> Self {
        Position {
            row: idx / COLS,
            col: idx % COLS,
        }
    }

    fn in_bounds(&self) -> bool {
        self.row < ROWS && self.col < COLS
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct Mine {
    position: Position,
    spent: bool,
}

/// Hidden hazards of one game.
///
/// The set of coordinates never changes after construction. Each mine fires
/// at most once; afterwards its cell behaves as an ordinary empty cell.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "MinefieldRepr")]
pub struct Minefield {
    mines: Vec<Mine>,
}

/// Wire shape of a [`Minefield`], checked before it becomes one.
#[derive(Deserialize)]
struct MinefieldRepr {
    mines: Vec<Mine>,
}

impl TryFrom<MinefieldRepr> for Minefield {
    type Error = GameError;

    fn try_from(repr: MinefieldRepr) -> Result<Self, Self::Error> {
        let mut field = Minefield::new(repr.mines.iter().map(|m| m.position))?;
        for (mine, loaded) in field.mines.iter_mut().zip(&repr.mines) {
            mine.spent = loaded.spent;
        }
        Ok(field)
    }
}

impl Minefield {
    /// Build a minefield from explicit coordinates. Duplicates and
    /// off-board coordinates are rejected.
    pub fn new(positions: impl IntoIterator<Item = Position>) -> Result<Self, GameError> {
        let mut mines: Vec<Mine> = Vec::new();
        for position in positions {
            if !position.in_bounds() {
                return Err(GameError::InvalidMinefield(format!(
                    "mine {position} is off the board"
                )));
            }
            if mines.iter().any(|m| m.position == position) {
                return Err(GameError::InvalidMinefield(format!(
                    "mine {position} listed twice"
                )));
            }
            mines.push(Mine {
                position,
                spent: false,
            });
        }
        Ok(Minefield { mines })
    }

    pub fn empty() -> Self {
        Minefield::default()
    }

    /// Total number of mines, spent or not.
    pub fn len(&self) -> usize {
        self.mines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mines.is_empty()
    }

    /// Mines that have not fired yet.
    pub fn armed_count(&self) -> usize {
        self.mines.iter().filter(|m| !m.spent).count()
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.mines.iter().map(|m| m.position)
    }

    pub fn contains(&self, position: Position) -> bool {
        self.mines.iter().any(|m| m.position == position)
    }

    pub fn is_armed(&self, position: Position) -> bool {
        self.mines
            .iter()
            .any(|m| m.position == position && !m.spent)
    }

    /// Fire the mine at `position` if one is armed there. Returns whether it fired.
    pub(crate) fn trigger(&mut self, position: Position) -> bool {
        match self
            .mines
            .iter_mut()
            .find(|m| m.position == position && !m.spent)
        {
            Some(mine) => {
                mine.spent = true;
                true
            }
            None => false,
        }
    }
}

/// Source of minefields for new games.
pub trait MineLayer {
    fn lay(&mut self) -> Minefield;
}

impl<L: MineLayer + ?Sized> MineLayer for Box<L> {
    fn lay(&mut self) -> Minefield {
        (**self).lay()
    }
}

/// Uniform random placement: a mine count drawn from `[min, max]`, then that
/// many distinct cells sampled without replacement.
pub struct RandomMineLayer<R: Rng = StdRng> {
    rng: R,
    min: usize,
    max: usize,
}

impl RandomMineLayer<StdRng> {
    pub fn new(rules: &GameRules) -> Self {
        Self::with_rng(StdRng::from_os_rng(), rules)
    }

    /// Reproducible placement, for replays and tests.
    pub fn seeded(seed: u64, rules: &GameRules) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), rules)
    }
}

impl<R: Rng> RandomMineLayer<R> {
    pub fn with_rng(rng: R, rules: &GameRules) -> Self {
        let max = rules.max_mines.min(ROWS * COLS);
        let min = rules.min_mines.min(max);
        RandomMineLayer { rng, min, max }
    }
}

impl<R: Rng> MineLayer for RandomMineLayer<R> {
    fn lay(&mut self) -> Minefield {
        let count = self.rng.random_range(self.min..=self.max);
        let mines = index::sample(&mut self.rng, ROWS * COLS, count)
            .into_iter()
            .map(|idx| Mine {
                position: Position::from_index(idx),
                spent: false,
            })
            .collect();
        Minefield { mines }
    }
}

/// Always lays the same mines.
#[derive(Debug, Clone, Default)]
pub struct FixedMineLayer {
    field: Minefield,
}

impl FixedMineLayer {
    pub fn new(positions: impl IntoIterator<Item = Position>) -> Result<Self, GameError> {
        Ok(FixedMineLayer {
            field: Minefield::new(positions)?,
        })
    }

    /// A layer that never places anything.
    pub fn none() -> Self {
        FixedMineLayer::default()
    }
}

impl MineLayer for FixedMineLayer {
    fn lay(&mut self) -> Minefield {
        self.field.clone()
    }
}
