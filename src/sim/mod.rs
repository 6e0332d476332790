//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One `tick` per call, no timers
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod question;
pub mod rules;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod tier;

pub use question::{Answer, Fraction, Question, generate_question};
pub use rules::Rules;
pub use spawn::{RoundSpawn, SpawnError, SpawnItem, spawn_round};
pub use state::{
    Direction, Food, GameEvent, GameOverReason, GamePhase, GameState, Loot, Position, PowerUp,
    PowerUpKind, Snapshot,
};
pub use tick::tick;
pub use tier::{Tier, advance_tier, tier_for};
