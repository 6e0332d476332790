//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (key names to directions)

pub mod input;

pub use input::direction_for_key;
