//! Keyboard mapping
//!
//! Turns `KeyboardEvent.key` values into directional intents. Validation of
//! the turn itself happens in the simulation.

use crate::sim::Direction;

/// Direction for a key name (arrow keys and WASD), `None` for anything else
pub fn direction_for_key(key: &str) -> Option<Direction> {
    match key {
        "ArrowUp" | "w" | "W" => Some(Direction::Up),
        "ArrowDown" | "s" | "S" => Some(Direction::Down),
        "ArrowLeft" | "a" | "A" => Some(Direction::Left),
        "ArrowRight" | "d" | "D" => Some(Direction::Right),
        _ => None,
    }
}

/// Keys whose default browser action (page scroll) should be suppressed
pub fn is_arrow_key(key: &str) -> bool {
    matches!(key, "ArrowUp" | "ArrowDown" | "ArrowLeft" | "ArrowRight")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(direction_for_key("ArrowUp"), Some(Direction::Up));
        assert_eq!(direction_for_key("a"), Some(Direction::Left));
        assert_eq!(direction_for_key("D"), Some(Direction::Right));
        assert_eq!(direction_for_key("Enter"), None);
        assert!(is_arrow_key("ArrowDown"));
        assert!(!is_arrow_key("s"));
    }
}
