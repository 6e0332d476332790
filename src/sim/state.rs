//! Game state and core simulation types
//!
//! `GameState` is the single owner of everything that changes during play:
//! the snake, the live foods and power-up, and the round counters.

use std::collections::VecDeque;

use glam::IVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::question::{Answer, Question, generate_question};
use super::rules::Rules;
use super::spawn::{SpawnError, spawn_round};
use super::tier::{Tier, advance_tier};
use crate::consts::*;

/// A grid cell
pub type Position = IVec2;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Not started yet, or stopped
    #[default]
    Idle,
    /// Active gameplay, ticks are processed
    Running,
    /// Run ended
    GameOver,
}

/// Snake heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Grid step for one tick (y grows downward)
    pub fn delta(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// An answer option lying on the grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub pos: Position,
    pub value: Answer,
    pub is_correct: bool,
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Clears the wrong answers but costs tail segments
    Bomb,
    /// Grows the snake
    Potion,
    /// Bonus points, spawned by combo streaks
    Chest,
}

/// A power-up lying on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUp {
    pub pos: Position,
    pub kind: PowerUpKind,
}

/// Loot collected from correct answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Loot {
    /// Earned below Gold tier
    pub coins: u32,
    /// Earned at Gold tier and above
    pub gems: u32,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    /// Head left the grid
    Wall,
    /// Head ran into the body
    SelfCollision,
    /// Snake shrank below the minimum length
    Starved,
    /// A round could not be spawned
    Aborted,
}

/// Events emitted during a tick, drained by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RoundStarted { tier: Tier },
    CorrectAnswer { score: u32, combo: u32 },
    WrongAnswer { score: u32 },
    TierUp { tier: Tier },
    PowerUpCollected { kind: PowerUpKind },
    GameOver {
        score: u32,
        reason: GameOverReason,
        new_high_score: bool,
    },
}

/// Immutable view of the state handed to renderers and the HUD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub is_running: bool,
    /// Head first
    pub snake: Vec<Position>,
    pub direction: Direction,
    pub foods: Vec<Food>,
    pub power_up: Option<PowerUp>,
    pub question: Option<Question>,
    pub score: u32,
    pub high_score: u32,
    pub tier: Tier,
    pub loot: Loot,
    pub combo_streak: u32,
    pub time_ticks: u64,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Base seed; each session derives its own stream from it
    pub seed: u64,
    rng: Pcg32,
    /// Sessions started so far
    pub session_count: u32,
    pub rules: Rules,
    pub phase: GamePhase,
    /// Head first
    pub snake: VecDeque<Position>,
    /// Heading applied on the last tick
    pub direction: Direction,
    /// Heading buffered from input, applied on the next tick
    pub pending_direction: Direction,
    pub foods: Vec<Food>,
    pub power_up: Option<PowerUp>,
    pub question: Option<Question>,
    pub score: u32,
    /// Best score known to this state (loaded by the session)
    pub high_score: u32,
    pub tier: Tier,
    pub combo_streak: u32,
    pub loot: Loot,
    /// Ticks processed this session
    pub time_ticks: u64,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create an idle game state with default rules
    pub fn new(seed: u64) -> Self {
        Self::with_rules(seed, Rules::default())
    }

    /// Create an idle game state with custom rules
    pub fn with_rules(seed: u64, rules: Rules) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            session_count: 0,
            rules: rules.sanitized(),
            phase: GamePhase::Idle,
            snake: START_SNAKE.iter().copied().collect(),
            direction: Direction::Right,
            pending_direction: Direction::Right,
            foods: Vec::new(),
            power_up: None,
            question: None,
            score: 0,
            high_score: 0,
            tier: Tier::Bronze,
            combo_streak: 0,
            loot: Loot::default(),
            time_ticks: 0,
            events: Vec::new(),
        }
    }

    /// Reset to the starting layout and begin a new run
    pub fn start_session(&mut self) -> Result<(), SpawnError> {
        self.session_count += 1;
        self.rng = Pcg32::seed_from_u64(self.seed.wrapping_add(u64::from(self.session_count)));

        self.snake = START_SNAKE.iter().copied().collect();
        self.direction = Direction::Right;
        self.pending_direction = Direction::Right;
        self.foods.clear();
        self.power_up = None;
        self.question = None;
        self.score = 0;
        self.tier = Tier::Bronze;
        self.combo_streak = 0;
        self.loot = Loot::default();
        self.time_ticks = 0;
        self.events.clear();
        self.phase = GamePhase::Running;

        log::info!(
            "Session {} started (seed {}, high score {})",
            self.session_count,
            self.seed,
            self.high_score
        );
        self.start_round()
    }

    /// Halt the run without recording a result. Further ticks are no-ops.
    pub fn stop(&mut self) {
        if self.phase == GamePhase::Running {
            log::info!("Session {} stopped at score {}", self.session_count, self.score);
            self.phase = GamePhase::Idle;
        }
    }

    /// Buffer a heading for the next tick.
    ///
    /// Only turns onto the other axis are accepted, so the snake can never
    /// reverse into itself. Ignored unless running; the last accepted
    /// intent before a tick wins.
    pub fn set_intent(&mut self, dir: Direction) {
        if self.phase != GamePhase::Running {
            return;
        }
        if dir.is_horizontal() != self.direction.is_horizontal() {
            self.pending_direction = dir;
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub fn head(&self) -> Position {
        self.snake.front().copied().unwrap_or(START_SNAKE[0])
    }

    /// Whether any snake segment lies on `cell`
    pub fn snake_occupies(&self, cell: Position) -> bool {
        self.snake.contains(&cell)
    }

    /// Take the events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Owned copy of everything the presentation layer needs
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            is_running: self.is_running(),
            snake: self.snake.iter().copied().collect(),
            direction: self.direction,
            foods: self.foods.clone(),
            power_up: self.power_up,
            question: self.question.clone(),
            score: self.score,
            high_score: self.high_score,
            tier: self.tier,
            loot: self.loot,
            combo_streak: self.combo_streak,
            time_ticks: self.time_ticks,
        }
    }

    /// Replace the question and foods with a fresh round.
    ///
    /// A live power-up is left where it is. On failure the run is aborted.
    pub(crate) fn start_round(&mut self) -> Result<(), SpawnError> {
        let question = generate_question(self.tier, &mut self.rng);
        let spawned = spawn_round(
            &question,
            &self.snake,
            self.power_up.as_ref(),
            self.combo_streak,
            &self.rules,
            &mut self.rng,
        );

        let spawn = match spawned {
            Ok(spawn) => spawn,
            Err(err) => {
                log::error!("Round spawn failed: {err}");
                self.end_game(GameOverReason::Aborted);
                return Err(err);
            }
        };

        log::debug!("New round ({}): {}", self.tier.as_str(), question.text);
        self.foods = spawn.foods;
        if spawn.power_up.is_some() {
            self.power_up = spawn.power_up;
        }
        if spawn.combo_reset {
            self.combo_streak = 0;
        }
        self.question = Some(question);
        self.emit(GameEvent::RoundStarted { tier: self.tier });
        Ok(())
    }

    /// Raise the stored tier if the score has climbed past the next step
    pub(crate) fn raise_tier(&mut self) {
        if let Some(next) = advance_tier(self.tier, self.score, self.rules.tier_step) {
            log::info!("Tier up: {} -> {}", self.tier.as_str(), next.as_str());
            self.tier = next;
            self.emit(GameEvent::TierUp { tier: next });
        }
    }

    pub(crate) fn end_game(&mut self, reason: GameOverReason) {
        self.phase = GamePhase::GameOver;
        let new_high_score = self.score > self.high_score;
        if new_high_score {
            self.high_score = self.score;
        }
        log::info!(
            "Game over ({:?}): score {}, tier {}, length {}",
            reason,
            self.score,
            self.tier.as_str(),
            self.snake.len()
        );
        self.emit(GameEvent::GameOver {
            score: self.score,
            reason,
            new_high_score,
        });
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}
