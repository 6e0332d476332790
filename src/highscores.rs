//! Best-score persistence
//!
//! The simulation only knows a single best score. Where it is kept is up to
//! the `ScoreStore` behind the session: memory natively, LocalStorage in the
//! browser.

use serde::{Deserialize, Serialize};

/// Read/write access to the persisted best score
pub trait ScoreStore {
    /// Stored best score, 0 when nothing has been saved yet
    fn read_high_score(&self) -> u32;

    /// Persist a new best score
    fn write_high_score(&mut self, score: u32);
}

/// Best score record as stored on disk/LocalStorage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScore {
    pub best: u32,
}

impl HighScore {
    /// Parse a stored value. Accepts the JSON record or a bare number (the
    /// format older builds wrote); anything else reads as 0.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Ok(record) = serde_json::from_str::<HighScore>(raw) {
            return record;
        }
        match raw.parse::<u32>() {
            Ok(best) => Self { best },
            Err(_) => {
                log::warn!("Ignoring unreadable high score {raw:?}");
                Self::default()
            }
        }
    }
}

/// In-process store (native builds and tests)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    best: HighScore,
    /// Number of writes, handy for asserting persistence happened
    pub writes: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_high_score(best: u32) -> Self {
        Self {
            best: HighScore { best },
            writes: 0,
        }
    }
}

impl ScoreStore for MemoryStore {
    fn read_high_score(&self) -> u32 {
        self.best.best
    }

    fn write_high_score(&mut self, score: u32) {
        self.best.best = score;
        self.writes += 1;
    }
}

/// Browser LocalStorage store
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "snakeHighScore";

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }
}

#[cfg(target_arch = "wasm32")]
impl ScoreStore for LocalStorageStore {
    fn read_high_score(&self) -> u32 {
        let Some(storage) = Self::storage() else {
            log::warn!("LocalStorage unavailable, high score starts at 0");
            return 0;
        };
        match storage.get_item(Self::STORAGE_KEY) {
            Ok(Some(raw)) => {
                let record = HighScore::parse(&raw);
                log::info!("Loaded high score {}", record.best);
                record.best
            }
            _ => {
                log::info!("No high score found, starting fresh");
                0
            }
        }
    }

    fn write_high_score(&mut self, score: u32) {
        let Some(storage) = Self::storage() else {
            return;
        };
        if let Ok(json) = serde_json::to_string(&HighScore { best: score }) {
            if storage.set_item(Self::STORAGE_KEY, &json).is_ok() {
                log::info!("High score saved ({score})");
            }
        }
    }
}
