//! Text projection of a board, for front-ends that show the game as a
//! message rather than a widget.

use serde::{Deserialize, Serialize};

use super::board::{Board, Cell, COLS};

/// Glyphs used to draw a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlyphSet {
    /// Keycap column numbers and coloured discs inside a code block, for chat.
    #[default]
    Emoji,
    /// Plain characters for terminals and logs.
    Ascii,
}

const KEYCAPS: [&str; COLS] = ["1️⃣", "2️⃣", "3️⃣", "4️⃣", "5️⃣", "6️⃣", "7️⃣"];

impl GlyphSet {
    pub fn cell(self, cell: Cell) -> &'static str {
        match (self, cell) {
            (GlyphSet::Emoji, Cell::Empty) => "⚫",
            (GlyphSet::Emoji, Cell::Red) => "🔴",
            (GlyphSet::Emoji, Cell::Blue) => "🔵",
            (GlyphSet::Ascii, Cell::Empty) => ".",
            (GlyphSet::Ascii, Cell::Red) => "X",
            (GlyphSet::Ascii, Cell::Blue) => "O",
        }
    }

    fn header(self) -> String {
        match self {
            GlyphSet::Emoji => KEYCAPS.concat(),
            GlyphSet::Ascii => (1..=COLS)
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    fn separator(self) -> &'static str {
        match self {
            GlyphSet::Emoji => "",
            GlyphSet::Ascii => " ",
        }
    }
}

/// Draw `board` as a column header followed by one line per row, top row first.
pub fn render_board(board: &Board, glyphs: GlyphSet) -> String {
    let mut out = String::new();
    if glyphs == GlyphSet::Emoji {
        out.push_str("```\n");
    }

    out.push_str(&glyphs.header());
    out.push('\n');

    for row in board.rows() {
        let line: Vec<&str> = row.iter().map(|&cell| glyphs.cell(cell)).collect();
        out.push_str(&line.join(glyphs.separator()));
        out.push('\n');
    }

    if glyphs == GlyphSet::Emoji {
        out.push_str("```");
    }
    out
}
