//! A game state paired with its high-score store
//!
//! The store is only touched at session boundaries: read when a session
//! starts, written when a run ends with a new best.

use crate::highscores::ScoreStore;
use crate::sim::{Direction, GameEvent, GamePhase, GameState, Rules, Snapshot, SpawnError, tick};

/// Session control surface used by the drivers
#[derive(Debug)]
pub struct Session<S: ScoreStore> {
    state: GameState,
    store: S,
}

impl<S: ScoreStore> Session<S> {
    pub fn new(seed: u64, rules: Rules, store: S) -> Self {
        let mut state = GameState::with_rules(seed, rules);
        state.high_score = store.read_high_score();
        Self { state, store }
    }

    /// Reset and start a new run
    pub fn start_session(&mut self) -> Result<(), SpawnError> {
        self.state.high_score = self.store.read_high_score();
        let started = self.state.start_session();
        self.persist_if_over();
        started
    }

    /// Abandon the current run; no score is recorded
    pub fn stop(&mut self) {
        self.state.stop();
    }

    /// Forward a directional intent
    pub fn set_intent(&mut self, dir: Direction) {
        self.state.set_intent(dir);
    }

    /// Advance one step, saving the best score if this step ended the run
    pub fn tick(&mut self) -> Result<(), SpawnError> {
        let result = tick(&mut self.state);
        self.persist_if_over();
        result
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.drain_events()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn persist_if_over(&mut self) {
        if self.state.phase != GamePhase::GameOver {
            return;
        }
        let score = self.state.score;
        if score > self.store.read_high_score() {
            self.store.write_high_score(score);
        }
    }
}
