use crate::game::{Cell, GameState, LocalPlayer, Position, Seat, COLS, ROWS};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::messages::describe_result;

pub fn render(
    frame: &mut Frame,
    game: &GameState<LocalPlayer>,
    selected_column: usize,
    message: &Option<String>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(15),   // Board
            Constraint::Length(4), // Message
            Constraint::Length(3), // Controls
        ])
        .split(frame.area());

    render_header(frame, game, chunks[0]);
    render_board(frame, game, selected_column, chunks[1]);
    render_message(frame, message, chunks[2]);
    render_controls(frame, chunks[3]);
}

fn seat_color(seat: Seat) -> Color {
    match seat {
        Seat::Red => Color::Red,
        Seat::Blue => Color::Blue,
    }
}

fn render_header(frame: &mut Frame, game: &GameState<LocalPlayer>, area: Rect) {
    let seat = game.current_seat();
    let (red, blue) = game.players();

    let (status, color) = match describe_result(game) {
        Some(result) => (format!("Game Over  |  {result}"), Color::Green),
        None => (
            format!(
                "{} vs {}  |  Current turn: {} ({})  |  Turns to lose: {}",
                red,
                blue,
                game.current_player(),
                seat.name(),
                game.turns_to_lose(seat)
            ),
            seat_color(seat),
        ),
    };

    let header = Paragraph::new(status)
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Connect 4 with Landmines"),
        );

    frame.render_widget(header, area);
}

fn render_board(
    frame: &mut Frame,
    game: &GameState<LocalPlayer>,
    selected_column: usize,
    area: Rect,
) {
    let board = game.board();
    // Mines stay hidden until the game is over
    let reveal = game.is_terminal();
    let mut lines = Vec::new();

    // Column numbers with selection indicator
    let mut col_line = vec![Span::raw("   ")]; // Padding (3 chars to match "  ║")
    for col in 0..COLS {
        if col == selected_column {
            col_line.push(Span::styled(
                format!(" {} ", col + 1),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            ));
        } else {
            col_line.push(Span::raw(format!(" {} ", col + 1)));
        }
    }
    col_line.push(Span::raw("  ")); // Suffix padding to match " ║"
    lines.push(Line::from(col_line));

    lines.push(Line::from("  ╔══════════════════════╗"));

    for row in 0..ROWS {
        let mut row_spans = vec![Span::raw("  ║")];

        for col in 0..COLS {
            let cell = board.get(row, col);
            let (symbol, color) = match cell {
                Cell::Red => (" ● ", Color::Red),
                Cell::Blue => (" ● ", Color::Blue),
                Cell::Empty
                    if reveal && game.minefield().is_armed(Position::new(row, col)) =>
                {
                    (" ✱ ", Color::Magenta)
                }
                Cell::Empty => (" . ", Color::DarkGray),
            };
            row_spans.push(Span::styled(symbol, Style::default().fg(color)));
        }

        row_spans.push(Span::raw(" ║"));
        lines.push(Line::from(row_spans));
    }

    lines.push(Line::from("  ╚══════════════════════╝"));

    // Selection indicator
    let mut indicator_line = vec![Span::raw("   ")];
    for col in 0..COLS {
        if col == selected_column {
            indicator_line.push(Span::styled(" ▲ ", Style::default().fg(Color::Cyan)));
        } else {
            indicator_line.push(Span::raw("   "));
        }
    }
    indicator_line.push(Span::raw("  "));
    lines.push(Line::from(indicator_line));

    let board_widget = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(board_widget, area);
}

fn render_message(frame: &mut Frame, message: &Option<String>, area: Rect) {
    let text = message.as_deref().unwrap_or("");
    let msg_widget = Paragraph::new(text)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(msg_widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let line = Line::from(
        "←/→: Move  |  Enter or 1-7: Drop  |  E: End game  |  R: New game  |  Q: Quit",
    );

    let controls = Paragraph::new(line)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Controls"));

    frame.render_widget(controls, area);
}
