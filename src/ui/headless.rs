//! Line-based front-end: one command per line on the input, board and
//! announcements written to the output.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use log::debug;

use super::messages::describe_update;
use super::LOCAL_SESSION;
use crate::game::{render_board, GlyphSet, LocalPlayer};
use crate::session::SessionRegistry;

const USAGE: &str = "Commands: 1-7 drop a piece, 'end' ends the game, 'new' starts over, 'quit' exits";

enum Command {
    Drop(usize),
    End,
    New,
    Quit,
}

fn parse(line: &str) -> Option<Command> {
    match line {
        "end" => Some(Command::End),
        "new" => Some(Command::New),
        "quit" | "q" => Some(Command::Quit),
        other => other
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .map(Command::Drop),
    }
}

/// Hotseat play over plain text streams.
pub struct HeadlessTable<'a, W: Write> {
    registry: &'a SessionRegistry<&'static str, LocalPlayer>,
    red: LocalPlayer,
    blue: LocalPlayer,
    glyphs: GlyphSet,
    idle_timeout: Duration,
    out: W,
}

impl<'a, W: Write> HeadlessTable<'a, W> {
    pub fn new(
        registry: &'a SessionRegistry<&'static str, LocalPlayer>,
        red: LocalPlayer,
        blue: LocalPlayer,
        glyphs: GlyphSet,
        idle_timeout: Duration,
        out: W,
    ) -> Self {
        HeadlessTable {
            registry,
            red,
            blue,
            glyphs,
            idle_timeout,
            out,
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Read commands until `quit` or end of input.
    pub fn run<R: BufRead>(&mut self, input: R) -> io::Result<()> {
        writeln!(self.out, "{USAGE}")?;
        self.new_game()?;

        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            debug!("headless input: {line}");
            self.expire_idle()?;

            match parse(line) {
                Some(Command::Quit) => break,
                Some(Command::New) => self.new_game()?,
                Some(Command::End) => self.end_game()?,
                Some(Command::Drop(column)) => self.drop_piece(column)?,
                None => writeln!(self.out, "{USAGE}")?,
            }
        }

        Ok(())
    }

    /// A game left alone longer than the idle timeout is over by the time
    /// the next command arrives.
    fn expire_idle(&mut self) -> io::Result<()> {
        for (_, last) in self.registry.reap_idle(self.idle_timeout) {
            writeln!(
                self.out,
                "Game ended: no moves for {} seconds.",
                self.idle_timeout.as_secs()
            )?;
            writeln!(self.out, "{}", render_board(last.board(), self.glyphs))?;
        }
        Ok(())
    }

    fn new_game(&mut self) -> io::Result<()> {
        self.registry.remove(&LOCAL_SESSION);
        match self
            .registry
            .start(LOCAL_SESSION, self.red.clone(), self.blue.clone())
        {
            Ok(state) => {
                writeln!(
                    self.out,
                    "Connect 4 with Landmines: {} vs {}",
                    self.red, self.blue
                )?;
                writeln!(self.out, "{}", render_board(state.board(), self.glyphs))?;
                writeln!(self.out, "Current turn: {}", state.current_player())
            }
            Err(e) => writeln!(self.out, "{e}"),
        }
    }

    fn end_game(&mut self) -> io::Result<()> {
        let Some(state) = self.registry.get(&LOCAL_SESSION) else {
            return writeln!(self.out, "No active game in this session!");
        };
        let requester = state.current_player().clone();
        match self.registry.end(&LOCAL_SESSION, &requester) {
            Ok(last) => {
                writeln!(self.out, "Game ended by {requester}")?;
                writeln!(self.out, "{}", render_board(last.board(), self.glyphs))
            }
            Err(e) => writeln!(self.out, "{e}"),
        }
    }

    fn drop_piece(&mut self, column: usize) -> io::Result<()> {
        let Some(state) = self.registry.get(&LOCAL_SESSION) else {
            return writeln!(self.out, "No active game in this session! Type 'new' to start one.");
        };
        let requester = state.current_player().clone();

        match self.registry.play(&LOCAL_SESSION, &requester, column) {
            Ok(update) => {
                writeln!(self.out, "{}", render_board(update.snapshot.board(), self.glyphs))?;
                for line in describe_update(&update) {
                    writeln!(self.out, "{line}")?;
                }
                if update.snapshot.is_terminal() {
                    writeln!(self.out, "Type 'new' for another game or 'quit' to exit.")?;
                }
                Ok(())
            }
            Err(e) => writeln!(self.out, "{e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{FixedMineLayer, GameRules, Position};

    fn run_script(layer: FixedMineLayer, script: &str) -> String {
        run_script_with_timeout(layer, Duration::from_secs(300), script)
    }

    fn run_script_with_timeout(layer: FixedMineLayer, timeout: Duration, script: &str) -> String {
        let registry = SessionRegistry::new(GameRules::default(), layer);
        let mut table = HeadlessTable::new(
            &registry,
            LocalPlayer::new("alice"),
            LocalPlayer::new("bob"),
            GlyphSet::Ascii,
            timeout,
            Vec::new(),
        );
        table.run(script.as_bytes()).unwrap();
        String::from_utf8(table.into_output()).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert!(matches!(parse("1"), Some(Command::Drop(0))));
        assert!(matches!(parse("7"), Some(Command::Drop(6))));
        assert!(matches!(parse("end"), Some(Command::End)));
        assert!(matches!(parse("q"), Some(Command::Quit)));
        assert!(parse("0").is_none());
        assert!(parse("left").is_none());
    }

    #[test]
    fn test_vertical_win_script() {
        let out = run_script(FixedMineLayer::none(), "1\n2\n1\n2\n1\n2\n1\n");
        assert!(out.contains("Connect 4 with Landmines: alice vs bob"));
        assert!(out.contains("🎉 alice wins the game!"));
        assert!(out.contains("X O . . . . ."));
    }

    #[test]
    fn test_moves_after_win_need_new_game() {
        let out = run_script(FixedMineLayer::none(), "1\n2\n1\n2\n1\n2\n1\n3\nnew\n3\n");
        assert!(out.contains("No active game in this session! Type 'new' to start one."));
        assert_eq!(out.matches("Connect 4 with Landmines").count(), 2);
        assert!(out.trim_end().ends_with("Current turn: bob (turns to lose: 0)"));
    }

    #[test]
    fn test_landmine_script() {
        let layer = FixedMineLayer::new([Position::new(5, 3)]).unwrap();
        let out = run_script(layer, "4\n4\n");
        assert!(out.contains("💥 LANDMINE! alice hit a landmine and loses 2 turns!"));
        assert!(out.contains("alice loses a turn! (1 turns remaining to lose)"));
    }

    #[test]
    fn test_invalid_input() {
        let out = run_script(FixedMineLayer::none(), "9\nabc\n");
        assert!(out.contains("invalid column"));
        assert_eq!(out.matches(USAGE).count(), 2);
    }

    #[test]
    fn test_end_script() {
        let out = run_script(FixedMineLayer::none(), "end\nend\n");
        assert!(out.contains("Game ended by alice"));
        assert!(out.contains("No active game in this session!"));
    }

    #[test]
    fn test_idle_game_expires_before_next_command() {
        let out = run_script_with_timeout(FixedMineLayer::none(), Duration::ZERO, "1\n");
        assert!(out.contains("Game ended: no moves for 0 seconds."));
        assert!(out.contains("No active game in this session! Type 'new' to start one."));
        assert!(!out.contains("X . . . . . ."));
    }

    #[test]
    fn test_active_game_survives_timeout_check() {
        let out = run_script(FixedMineLayer::none(), "1\n");
        assert!(!out.contains("Game ended"));
        assert!(out.contains("X . . . . . ."));
    }

    #[test]
    fn test_quit_stops_reading() {
        let out = run_script(FixedMineLayer::none(), "quit\n1\n");
        assert!(!out.contains("X . . . . . ."));
    }
}
