use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use log::info;
use ratatui::{backend::Backend, Terminal};

use super::messages::describe_update;
use super::LOCAL_SESSION;
use crate::error::GameError;
use crate::game::{GameState, LocalPlayer, COLS};
use crate::session::SessionRegistry;

pub struct App {
    registry: SessionRegistry<&'static str, LocalPlayer>,
    red: LocalPlayer,
    blue: LocalPlayer,
    /// Latest view of the game; kept after the registry lets go of a finished one.
    game: GameState<LocalPlayer>,
    selected_column: usize,
    should_quit: bool,
    message: Option<String>,
    idle_timeout: Duration,
}

impl App {
    pub fn new(
        registry: SessionRegistry<&'static str, LocalPlayer>,
        red: LocalPlayer,
        blue: LocalPlayer,
        idle_timeout: Duration,
    ) -> Result<Self, GameError> {
        let game = registry.start(LOCAL_SESSION, red.clone(), blue.clone())?;
        Ok(App {
            registry,
            red,
            blue,
            game,
            selected_column: 3, // Start in middle
            should_quit: false,
            message: Some("Watch out for hidden landmines! Hitting one costs you turns.".into()),
            idle_timeout,
        })
    }

    /// Main application loop
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()>
    where
        B::Error: Into<io::Error>,
    {
        loop {
            terminal
                .draw(|f| self.render(f))
                .map_err(Into::<io::Error>::into)?;

            if self.should_quit {
                break;
            }

            self.handle_events()?;
            self.expire_idle();
        }
        Ok(())
    }

    /// Handle keyboard events
    fn handle_events(&mut self) -> io::Result<()> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    fn expire_idle(&mut self) {
        for (_, state) in self.registry.reap_idle(self.idle_timeout) {
            self.game = state;
            self.message = Some(format!(
                "Game ended: no moves for {} seconds. Press 'r' for a new game.",
                self.idle_timeout.as_secs()
            ));
        }
    }

    /// Handle key press
    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Left => {
                if self.selected_column > 0 {
                    self.selected_column -= 1;
                }
            }
            KeyCode::Right => {
                if self.selected_column < COLS - 1 {
                    self.selected_column += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.drop_piece();
            }
            KeyCode::Char(c @ '1'..='7') => {
                self.selected_column = (c as u8 - b'1') as usize;
                self.drop_piece();
            }
            KeyCode::Char('e') => {
                self.end_game();
            }
            KeyCode::Char('r') => {
                self.restart();
            }
            _ => {}
        }
    }

    /// Drop the current player's piece in the selected column
    fn drop_piece(&mut self) {
        if self.game.is_terminal() {
            self.message = Some("Game is already over! Press 'r' to restart.".to_string());
            return;
        }

        let requester = self.game.current_player().clone();
        match self
            .registry
            .play(&LOCAL_SESSION, &requester, self.selected_column)
        {
            Ok(update) => {
                self.message = Some(describe_update(&update).join("\n"));
                self.game = update.snapshot;
            }
            Err(e) => {
                self.message = Some(e.to_string());
            }
        }
    }

    /// The player whose turn it is gives up the game
    fn end_game(&mut self) {
        let requester = self.game.current_player().clone();
        match self.registry.end(&LOCAL_SESSION, &requester) {
            Ok(last) => {
                self.game = last;
                self.message = Some(format!("Game ended by {requester}"));
            }
            Err(e) => {
                self.message = Some(e.to_string());
            }
        }
    }

    fn restart(&mut self) {
        self.registry.remove(&LOCAL_SESSION);
        match self
            .registry
            .start(LOCAL_SESSION, self.red.clone(), self.blue.clone())
        {
            Ok(game) => {
                info!("New local game");
                self.game = game;
                self.selected_column = 3;
                self.message = Some("New game started!".to_string());
            }
            Err(e) => {
                self.message = Some(e.to_string());
            }
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn game(&self) -> &GameState<LocalPlayer> {
        &self.game
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Render the UI
    fn render(&self, frame: &mut ratatui::Frame) {
        super::game_view::render(frame, &self.game, self.selected_column, &self.message);
    }
}
