//! Round spawning
//!
//! Places the three answer foods and, sometimes, a power-up on free grid
//! cells. Placement is rejection sampling with a fixed attempt budget so a
//! saturated grid surfaces as an error rather than a hang.

use std::collections::VecDeque;
use std::fmt;

use glam::IVec2;
use rand::Rng;

use super::question::Question;
use super::rules::Rules;
use super::state::{Food, Position, PowerUp, PowerUpKind};
use crate::consts::{MAX_PLACEMENT_ATTEMPTS, TILE_COUNT};

/// What was being placed when spawning failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnItem {
    Food,
    PowerUp,
}

impl fmt::Display for SpawnItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpawnItem::Food => write!(f, "food"),
            SpawnItem::PowerUp => write!(f, "power-up"),
        }
    }
}

/// Errors raised while spawning a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SpawnError {
    #[error("no free cell for {item} after {attempts} attempts (grid saturated)")]
    PlacementExhausted { item: SpawnItem, attempts: u32 },
}

/// Result of spawning a round
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSpawn {
    /// Correct answer first, then the two distractors
    pub foods: Vec<Food>,
    /// Newly spawned power-up (never set while one is already live)
    pub power_up: Option<PowerUp>,
    /// The combo streak hit the threshold; the caller resets the streak
    pub combo_reset: bool,
}

/// Spawn the foods for `question` and possibly a power-up.
///
/// Cells held by the snake, by a food placed earlier in this round, or by
/// `live_power_up` are never chosen. A live power-up also blocks any new
/// power-up, including the chest owed for a combo streak. Reaching the
/// streak threshold always resets the streak, whether or not the chest
/// could be placed.
pub fn spawn_round<R: Rng + ?Sized>(
    question: &Question,
    snake: &VecDeque<Position>,
    live_power_up: Option<&PowerUp>,
    combo_streak: u32,
    rules: &Rules,
    rng: &mut R,
) -> Result<RoundSpawn, SpawnError> {
    let options = std::iter::once((question.answer, true))
        .chain(question.distractors.iter().map(|d| (*d, false)));

    let mut foods: Vec<Food> = Vec::with_capacity(3);
    for (value, is_correct) in options {
        let pos = find_free_cell(rng, SpawnItem::Food, |cell| {
            snake.contains(&cell)
                || foods.iter().any(|f| f.pos == cell)
                || live_power_up.is_some_and(|p| p.pos == cell)
        })?;
        foods.push(Food {
            pos,
            value,
            is_correct,
        });
    }

    let combo_reset = combo_streak >= rules.combo_threshold;
    let kind = if live_power_up.is_some() {
        None
    } else if combo_reset {
        Some(PowerUpKind::Chest)
    } else if rng.random_bool(rules.power_up_chance) {
        Some(if rng.random_bool(0.5) {
            PowerUpKind::Bomb
        } else {
            PowerUpKind::Potion
        })
    } else {
        None
    };

    let power_up = match kind {
        Some(kind) => {
            let pos = find_free_cell(rng, SpawnItem::PowerUp, |cell| {
                snake.contains(&cell) || foods.iter().any(|f| f.pos == cell)
            })?;
            log::debug!("Spawned {:?} at ({}, {})", kind, pos.x, pos.y);
            Some(PowerUp { pos, kind })
        }
        None => None,
    };

    Ok(RoundSpawn {
        foods,
        power_up,
        combo_reset,
    })
}

/// Draw uniform cells until one is not `occupied`, up to the attempt budget
pub fn find_free_cell<R, F>(rng: &mut R, item: SpawnItem, occupied: F) -> Result<Position, SpawnError>
where
    R: Rng + ?Sized,
    F: Fn(Position) -> bool,
{
    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let cell = IVec2::new(rng.random_range(0..TILE_COUNT), rng.random_range(0..TILE_COUNT));
        if !occupied(cell) {
            return Ok(cell);
        }
    }
    log::error!("Placement exhausted for {item} after {MAX_PLACEMENT_ATTEMPTS} attempts");
    Err(SpawnError::PlacementExhausted {
        item,
        attempts: MAX_PLACEMENT_ATTEMPTS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::START_SNAKE;
    use crate::sim::question::generate_question;
    use crate::sim::tier::Tier;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn start_snake() -> VecDeque<Position> {
        START_SNAKE.iter().copied().collect()
    }

    #[test]
    fn test_spawn_places_three_distinct_foods() {
        let snake = start_snake();
        let rules = Rules::default();
        for seed in 0..200 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let q = generate_question(Tier::from_index((seed % 4) as i64), &mut rng);
            let spawn = spawn_round(&q, &snake, None, 0, &rules, &mut rng).unwrap();

            assert_eq!(spawn.foods.len(), 3);
            assert_eq!(spawn.foods.iter().filter(|f| f.is_correct).count(), 1);
            assert_eq!(spawn.foods[0].value, q.answer);

            let mut cells: Vec<Position> = spawn.foods.iter().map(|f| f.pos).collect();
            cells.extend(spawn.power_up.map(|p| p.pos));
            cells.extend(snake.iter().copied());
            let total = cells.len();
            cells.sort_by_key(|c| (c.x, c.y));
            cells.dedup();
            assert_eq!(cells.len(), total, "overlap with seed {seed}");
        }
    }

    #[test]
    fn test_foods_avoid_live_power_up() {
        let snake = start_snake();
        let rules = Rules::default();
        let live = PowerUp {
            pos: IVec2::new(3, 3),
            kind: PowerUpKind::Bomb,
        };
        for seed in 0..200 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let q = generate_question(Tier::Bronze, &mut rng);
            let spawn = spawn_round(&q, &snake, Some(&live), 0, &rules, &mut rng).unwrap();
            assert!(spawn.foods.iter().all(|f| f.pos != live.pos));
            assert!(spawn.power_up.is_none());
        }
    }

    #[test]
    fn test_combo_forces_chest() {
        let snake = start_snake();
        let rules = Rules {
            power_up_chance: 0.0,
            ..Default::default()
        };
        let mut rng = Pcg32::seed_from_u64(5);
        let q = generate_question(Tier::Bronze, &mut rng);
        let spawn = spawn_round(&q, &snake, None, 3, &rules, &mut rng).unwrap();
        assert_eq!(spawn.power_up.map(|p| p.kind), Some(PowerUpKind::Chest));
        assert!(spawn.combo_reset);
    }

    #[test]
    fn test_combo_chest_skipped_when_slot_taken_still_resets() {
        let snake = start_snake();
        let rules = Rules::default();
        let live = PowerUp {
            pos: IVec2::new(0, 0),
            kind: PowerUpKind::Potion,
        };
        let mut rng = Pcg32::seed_from_u64(5);
        let q = generate_question(Tier::Bronze, &mut rng);
        let spawn = spawn_round(&q, &snake, Some(&live), 4, &rules, &mut rng).unwrap();
        assert!(spawn.power_up.is_none());
        assert!(spawn.combo_reset);
    }

    #[test]
    fn test_random_power_up_is_bomb_or_potion() {
        let snake = start_snake();
        let rules = Rules {
            power_up_chance: 1.0,
            ..Default::default()
        };
        for seed in 0..50 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let q = generate_question(Tier::Silver, &mut rng);
            let spawn = spawn_round(&q, &snake, None, 0, &rules, &mut rng).unwrap();
            let kind = spawn.power_up.map(|p| p.kind);
            assert!(matches!(kind, Some(PowerUpKind::Bomb | PowerUpKind::Potion)));
            assert!(!spawn.combo_reset);
        }
    }

    #[test]
    fn test_saturated_grid_fails_loudly() {
        let snake: VecDeque<Position> = (0..TILE_COUNT)
            .flat_map(|y| (0..TILE_COUNT).map(move |x| IVec2::new(x, y)))
            .collect();
        let mut rng = Pcg32::seed_from_u64(1);
        let q = generate_question(Tier::Bronze, &mut rng);
        let err = spawn_round(&q, &snake, None, 0, &Rules::default(), &mut rng).unwrap_err();
        assert_eq!(
            err,
            SpawnError::PlacementExhausted {
                item: SpawnItem::Food,
                attempts: MAX_PLACEMENT_ATTEMPTS,
            }
        );
    }
}
