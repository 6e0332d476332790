//! Idle/demo mode steering
//!
//! A greedy bot that heads for the correct answer (or a nearer chest or
//! potion) while refusing moves that would end the run on the spot.

use super::state::{Direction, GameState, Position, PowerUpKind};
use crate::{in_bounds, manhattan};

/// Pick a heading for the next tick, or `None` when every move is fatal
/// or the game is not running.
pub fn steer(state: &GameState) -> Option<Direction> {
    if !state.is_running() {
        return None;
    }

    let head = state.head();
    let target = target_cell(state, head)?;

    Direction::ALL
        .into_iter()
        .filter(|&dir| dir != state.direction.opposite())
        .filter(|&dir| is_safe(state, head + dir.delta()))
        // Ties go to the current heading so the bot doesn't jitter
        .min_by_key(|&dir| (manhattan(head + dir.delta(), target), dir != state.direction))
}

/// Correct food, unless a helpful power-up is closer
fn target_cell(state: &GameState, head: Position) -> Option<Position> {
    let correct = state.foods.iter().find(|f| f.is_correct).map(|f| f.pos);
    let helpful = state
        .power_up
        .filter(|p| matches!(p.kind, PowerUpKind::Chest | PowerUpKind::Potion))
        .map(|p| p.pos);

    match (correct, helpful) {
        (Some(c), Some(h)) if manhattan(head, h) < manhattan(head, c) => Some(h),
        (Some(c), _) => Some(c),
        (None, h) => h,
    }
}

fn is_safe(state: &GameState, cell: Position) -> bool {
    if !in_bounds(cell) {
        return false;
    }
    // The tail cell is still occupied when the head arrives
    if state.snake_occupies(cell) {
        return false;
    }
    if state.foods.iter().any(|f| f.pos == cell && !f.is_correct) {
        return false;
    }
    !state
        .power_up
        .is_some_and(|p| p.pos == cell && p.kind == PowerUpKind::Bomb)
}
