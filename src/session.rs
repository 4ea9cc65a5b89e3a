//! Registry of running games, one per session (a chat channel, a terminal...).
//!
//! The registry map is locked only long enough to look up, insert or remove an
//! entry. Each game has its own lock, held for one whole turn, so games in
//! different sessions never wait on each other.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::error::GameError;
use crate::game::{
    GameRules, GameState, GameStatus, MineLayer, Participant, RandomMineLayer, Seat, TurnReport,
};

/// Result of a move made through the registry.
#[derive(Debug, Clone)]
pub struct SessionUpdate<P> {
    pub report: TurnReport,
    /// The game right after the move. Once this is terminal the session slot is free.
    pub snapshot: GameState<P>,
}

struct Slot<P> {
    state: GameState<P>,
    last_activity: Instant,
}

type SlotHandle<P> = Arc<Mutex<Slot<P>>>;

pub struct SessionRegistry<S, P> {
    games: Mutex<HashMap<S, SlotHandle<P>>>,
    layer: Mutex<Box<dyn MineLayer + Send>>,
    rules: GameRules,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S, P> SessionRegistry<S, P>
where
    S: Eq + Hash + Clone + Debug,
    P: Participant,
{
    pub fn new(rules: GameRules, layer: impl MineLayer + Send + 'static) -> Self {
        SessionRegistry {
            games: Mutex::new(HashMap::new()),
            layer: Mutex::new(Box::new(layer)),
            rules,
        }
    }

    /// Registry that hides mines uniformly at random, as the rules ask.
    pub fn with_random_mines(rules: GameRules) -> Self {
        Self::new(rules, RandomMineLayer::new(&rules))
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    /// Number of running games
    pub fn len(&self) -> usize {
        lock(&self.games).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_active(&self, session: &S) -> bool {
        lock(&self.games).contains_key(session)
    }

    /// Start a game in `session`. Fails if one is already running there.
    pub fn start(&self, session: S, red: P, blue: P) -> Result<GameState<P>, GameError> {
        let mut games = lock(&self.games);
        if games.contains_key(&session) {
            warn!("Refusing to start a second game in session {:?}", session);
            return Err(GameError::GameAlreadyActive);
        }

        let state = {
            let mut layer = lock(&self.layer);
            GameState::create(red, blue, &mut **layer, self.rules)?
        };

        info!(
            "Game started in session {:?}: {} vs {} ({} mines)",
            session,
            state.player(Seat::Red).handle(),
            state.player(Seat::Blue).handle(),
            state.minefield().len()
        );

        let snapshot = state.clone();
        games.insert(
            session,
            Arc::new(Mutex::new(Slot {
                state,
                last_activity: Instant::now(),
            })),
        );
        Ok(snapshot)
    }

    fn handle(&self, session: &S) -> Result<SlotHandle<P>, GameError> {
        lock(&self.games)
            .get(session)
            .cloned()
            .ok_or(GameError::NoActiveGame)
    }

    /// Drop the entry for `session`, but only if it still holds `handle`.
    fn release(&self, session: &S, handle: &SlotHandle<P>) {
        let mut games = lock(&self.games);
        if games
            .get(session)
            .is_some_and(|current| Arc::ptr_eq(current, handle))
        {
            games.remove(session);
        }
    }

    /// Play one turn for `requester` in `session`. A finished game is removed.
    pub fn play(
        &self,
        session: &S,
        requester: &P,
        column: usize,
    ) -> Result<SessionUpdate<P>, GameError> {
        let handle = self.handle(session)?;

        let update = {
            let mut slot = lock(&handle);
            let report = slot.state.play(requester, column).map_err(|e| {
                debug!(
                    "Move by {} in column {} rejected in session {:?}: {}",
                    requester.handle(),
                    column,
                    session,
                    e
                );
                e
            })?;
            slot.last_activity = Instant::now();

            debug!(
                "Session {:?}: {} -> {:?}",
                session,
                requester.handle(),
                report.outcome
            );
            if let Some(announcement) = &report.announcement {
                debug!("Session {:?}: {}", session, announcement);
            }

            SessionUpdate {
                report,
                snapshot: slot.state.clone(),
            }
        };

        match update.snapshot.status() {
            GameStatus::InProgress => {}
            GameStatus::Won(seat) => {
                info!(
                    "Game in session {:?} won by {}",
                    session,
                    update.snapshot.player(seat).handle()
                );
                self.release(session, &handle);
            }
            status => {
                info!("Game in session {:?} ended: {:?}", session, status);
                self.release(session, &handle);
            }
        }

        Ok(update)
    }

    /// End the game in `session` on a participant's request and free the slot.
    pub fn end(&self, session: &S, requester: &P) -> Result<GameState<P>, GameError> {
        let handle = self.handle(session)?;

        let snapshot = {
            let mut slot = lock(&handle);
            if let Err(e) = slot.state.abort(requester) {
                warn!(
                    "{} tried to end the game in session {:?} without playing in it",
                    requester.handle(),
                    session
                );
                return Err(e);
            }
            slot.state.clone()
        };

        self.release(session, &handle);
        info!("Game in session {:?} ended by {}", session, requester.handle());
        Ok(snapshot)
    }

    /// Drop a session without any participant check.
    pub fn remove(&self, session: &S) -> Option<GameState<P>> {
        let handle = lock(&self.games).remove(session)?;
        let mut slot = lock(&handle);
        slot.state.expire();
        Some(slot.state.clone())
    }

    /// Copy of the game currently running in `session`.
    pub fn get(&self, session: &S) -> Option<GameState<P>> {
        let handle = self.handle(session).ok()?;
        let slot = lock(&handle);
        Some(slot.state.clone())
    }

    /// Abort and remove every game nobody has touched for `timeout`.
    pub fn reap_idle(&self, timeout: Duration) -> Vec<(S, GameState<P>)> {
        self.reap_idle_at(Instant::now(), timeout)
    }

    pub fn reap_idle_at(&self, now: Instant, timeout: Duration) -> Vec<(S, GameState<P>)> {
        let mut games = lock(&self.games);
        let mut reaped = Vec::new();

        games.retain(|session, handle| {
            let mut slot = lock(&**handle);
            if now.saturating_duration_since(slot.last_activity) < timeout {
                return true;
            }
            slot.state.expire();
            info!("Game in session {:?} timed out", session);
            reaped.push((session.clone(), slot.state.clone()));
            false
        });

        reaped
    }
}
