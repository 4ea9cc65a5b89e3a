use serde::{Deserialize, Serialize};

use super::board::{COLS, ROWS};

/// Tunable parts of the landmine variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRules {
    /// Fewest mines hidden on a fresh board.
    pub min_mines: usize,
    /// Most mines hidden on a fresh board.
    pub max_mines: usize,
    /// Turns lost by whoever steps on a mine.
    pub mine_penalty: u32,
}

impl Default for GameRules {
    fn default() -> Self {
        GameRules {
            min_mines: 3,
            max_mines: 5,
            mine_penalty: 2,
        }
    }
}

impl GameRules {
    /// Classic Connect Four: no hazards at all.
    pub fn classic() -> Self {
        GameRules {
            min_mines: 0,
            max_mines: 0,
            ..Default::default()
        }
    }

    /// Problems with these rules, if any.
    pub fn check(&self) -> Result<(), String> {
        if self.min_mines > self.max_mines {
            return Err("min_mines must be <= max_mines".into());
        }
        if self.max_mines > ROWS * COLS {
            return Err(format!("max_mines must be <= {}", ROWS * COLS));
        }
        if self.mine_penalty == 0 {
            return Err("mine_penalty must be >= 1".into());
        }
        Ok(())
    }
}
