use serde::{Deserialize, Serialize};

use super::board::Cell;

/// Which side of the table a participant sits on. Red always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seat {
    Red,
    Blue,
}

impl Seat {
    /// Get the other seat
    pub fn other(self) -> Seat {
        match self {
            Seat::Red => Seat::Blue,
            Seat::Blue => Seat::Red,
        }
    }

    /// Convert seat to cell type
    pub fn to_cell(self) -> Cell {
        match self {
            Seat::Red => Cell::Red,
            Seat::Blue => Cell::Blue,
        }
    }

    /// Position of this seat in per-player arrays
    pub fn index(self) -> usize {
        match self {
            Seat::Red => 0,
            Seat::Blue => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Seat::Red => "Red",
            Seat::Blue => "Blue",
        }
    }
}
