//! Math Snake - A grid snake arcade game driven by arithmetic questions
//!
//! Core modules:
//! - `sim`: Deterministic simulation (questions, spawning, tick, tiers)
//! - `highscores`: Best-score persistence behind the `ScoreStore` trait
//! - `session`: Game state paired with its score store
//! - `platform`: Browser/native input mapping
//! - `settings`: Player preferences and gameplay rules

pub mod highscores;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;

pub use highscores::{MemoryStore, ScoreStore};
pub use session::Session;
pub use settings::{Settings, SpeedPreset};

use glam::IVec2;

/// Game configuration constants
pub mod consts {
    use glam::IVec2;

    /// Cells per side of the square play field
    pub const TILE_COUNT: i32 = 20;

    /// Snake layout at session start (head first)
    pub const START_SNAKE: [IVec2; 3] = [IVec2::new(10, 10), IVec2::new(9, 10), IVec2::new(8, 10)];

    /// The snake dies when it shrinks below this length
    pub const MIN_SNAKE_LEN: usize = 3;

    /// Rejection-sampling budget for placing a single item
    pub const MAX_PLACEMENT_ATTEMPTS: u32 = 4 * (TILE_COUNT * TILE_COUNT) as u32;

    /// Default tick period used by the browser driver (ms)
    pub const DEFAULT_TICK_MS: u32 = 100;
}

/// Whether a grid cell lies inside the play field
#[inline]
pub fn in_bounds(pos: IVec2) -> bool {
    use consts::TILE_COUNT;
    pos.x >= 0 && pos.y >= 0 && pos.x < TILE_COUNT && pos.y < TILE_COUNT
}

/// Manhattan distance between two cells
#[inline]
pub fn manhattan(a: IVec2, b: IVec2) -> i32 {
    let d = (a - b).abs();
    d.x + d.y
}
