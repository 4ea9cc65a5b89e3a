use serde::{Deserialize, Serialize};

use crate::error::GameError;

pub const ROWS: usize = 6;
pub const COLS: usize = 7;

/// Number of contiguous pieces needed to win.
pub const CONNECT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    Red,
    Blue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: [[Cell; COLS]; ROWS],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Board {
            cells: [[Cell::Empty; COLS]; ROWS],
        }
    }

    /// Get the cell at a specific position
    /// Row 0 is the top, row 5 is the bottom
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    /// Iterate over rows, top first
    pub fn rows(&self) -> impl Iterator<Item = &[Cell; COLS]> {
        self.cells.iter()
    }

    /// Check if a column is full
    pub fn is_column_full(&self, col: usize) -> bool {
        if col >= COLS {
            return true;
        }
        self.cells[0][col] != Cell::Empty
    }

    /// Lowest empty row in a column, i.e. where a dropped piece would settle
    pub fn landing_row(&self, col: usize) -> Result<usize, GameError> {
        if col >= COLS {
            return Err(GameError::InvalidColumn(col));
        }

        (0..ROWS)
            .rev()
            .find(|&row| self.cells[row][col] == Cell::Empty)
            .ok_or(GameError::ColumnFull(col))
    }

    /// Put a piece on an empty cell. Occupied cells are never overwritten.
    pub(crate) fn place(&mut self, row: usize, col: usize, cell: Cell) {
        debug_assert_eq!(self.cells[row][col], Cell::Empty, "cell ({row}, {col}) already taken");
        if self.cells[row][col] == Cell::Empty {
            self.cells[row][col] = cell;
        }
    }

    /// Drop a piece in a column, returns the row where it landed
    pub fn drop_piece(&mut self, col: usize, cell: Cell) -> Result<usize, GameError> {
        let row = self.landing_row(col)?;
        self.place(row, col, cell);
        Ok(row)
    }

    /// Check if the board is completely full
    pub fn is_full(&self) -> bool {
        (0..COLS).all(|col| self.is_column_full(col))
    }

    /// Number of pieces on the board
    pub fn piece_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|&&cell| cell != Cell::Empty)
            .count()
    }

    /// Check whether `cell` has four in a row through (row, col).
    ///
    /// Only the axes through the given position are inspected, so this must be
    /// called with the position of the piece that was just placed.
    pub fn check_win(&self, row: usize, col: usize, cell: Cell) -> bool {
        if cell == Cell::Empty || row >= ROWS || col >= COLS || self.get(row, col) != cell {
            return false;
        }

        self.check_horizontal(row, col, cell)
            || self.check_vertical(row, col, cell)
            || self.check_diagonal_up(row, col, cell)
            || self.check_diagonal_down(row, col, cell)
    }

    /// Check horizontal win (left-right through the position)
    fn check_horizontal(&self, row: usize, col: usize, cell: Cell) -> bool {
        self.line_length(row, col, 0, 1, cell) >= CONNECT
    }

    /// Check vertical win (up-down through the position)
    fn check_vertical(&self, row: usize, col: usize, cell: Cell) -> bool {
        self.line_length(row, col, 1, 0, cell) >= CONNECT
    }

    /// Check diagonal win (bottom-left to top-right, /)
    fn check_diagonal_up(&self, row: usize, col: usize, cell: Cell) -> bool {
        self.line_length(row, col, -1, 1, cell) >= CONNECT
    }

    /// Check diagonal win (top-left to bottom-right, \)
    fn check_diagonal_down(&self, row: usize, col: usize, cell: Cell) -> bool {
        self.line_length(row, col, 1, 1, cell) >= CONNECT
    }

    /// Length of the contiguous run of `cell` through (row, col) along
    /// (dr, dc), counting both directions and the position itself.
    fn line_length(&self, row: usize, col: usize, dr: i32, dc: i32, cell: Cell) -> usize {
        1 + self.ray(row, col, dr, dc, cell) + self.ray(row, col, -dr, -dc, cell)
    }

    fn ray(&self, row: usize, col: usize, dr: i32, dc: i32, cell: Cell) -> usize {
        let mut count = 0;
        let mut r = row as i32 + dr;
        let mut c = col as i32 + dc;
        while r >= 0
            && r < ROWS as i32
            && c >= 0
            && c < COLS as i32
            && self.cells[r as usize][c as usize] == cell
        {
            count += 1;
            r += dr;
            c += dc;
        }
        count
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
