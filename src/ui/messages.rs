use crate::game::{GameState, GameStatus, MoveOutcome, Participant};
use crate::session::SessionUpdate;

/// Lines to show the table after a move.
pub fn describe_update<P: Participant>(update: &SessionUpdate<P>) -> Vec<String> {
    let state = &update.snapshot;
    let mut lines = Vec::new();

    match update.report.outcome {
        MoveOutcome::LandmineTriggered { .. } => {
            let who = state.current_player();
            lines.push(format!(
                "💥 LANDMINE! {} hit a landmine and loses {} turns!",
                who.handle(),
                state.rules().mine_penalty
            ));
        }
        MoveOutcome::Placed { .. } => {
            if let Some(line) = describe_result(state) {
                lines.push(line);
            }
        }
    }

    if let Some(announcement) = &update.report.announcement {
        lines.push(announcement.to_string());
    }

    if !state.is_terminal() {
        let seat = state.current_seat();
        lines.push(format!(
            "Current turn: {} (turns to lose: {})",
            state.current_player().handle(),
            state.turns_to_lose(seat)
        ));
    }

    lines
}

/// One line for a finished game, `None` while it is still running.
pub fn describe_result<P: Participant>(state: &GameState<P>) -> Option<String> {
    match state.status() {
        GameStatus::InProgress => None,
        GameStatus::Won(seat) => Some(format!("🎉 {} wins the game!", state.player(seat).handle())),
        GameStatus::Drawn => Some("It's a draw!".to_string()),
        GameStatus::Aborted => Some("Game ended.".to_string()),
    }
}
