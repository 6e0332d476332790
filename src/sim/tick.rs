//! Discrete simulation tick
//!
//! One call advances the snake by one cell and resolves everything it runs
//! into. The order of the steps matters: movement, then walls and body,
//! then foods, then the power-up.

use super::spawn::SpawnError;
use super::state::{GameEvent, GameOverReason, GamePhase, GameState, PowerUpKind};
use super::tier::Tier;
use crate::consts::MIN_SNAKE_LEN;
use crate::in_bounds;

/// Advance the game state by one step.
///
/// Does nothing unless the state is running. An error means the next round
/// could not be spawned; the run has already been ended when it is returned.
pub fn tick(state: &mut GameState) -> Result<(), SpawnError> {
    if state.phase != GamePhase::Running {
        return Ok(());
    }
    state.time_ticks += 1;

    // Buffered input becomes the heading for this step
    state.direction = state.pending_direction;

    // Provisional growth; the tail is popped below unless something was eaten
    let head = state.head() + state.direction.delta();
    state.snake.push_front(head);

    if !in_bounds(head) {
        state.end_game(GameOverReason::Wall);
        return Ok(());
    }
    if state.snake.iter().skip(1).any(|&segment| segment == head) {
        state.end_game(GameOverReason::SelfCollision);
        return Ok(());
    }

    match state.foods.iter().position(|f| f.pos == head) {
        None => {
            state.snake.pop_back();
        }
        Some(index) if state.foods[index].is_correct => eat_correct(state)?,
        Some(index) => {
            eat_wrong(state, index);
            if state.phase != GamePhase::Running {
                return Ok(());
            }
        }
    }

    if state.power_up.is_some_and(|p| p.pos == head) {
        collect_power_up(state);
    }

    Ok(())
}

/// Correct answer: keep the tail, score, and roll a new round
fn eat_correct(state: &mut GameState) -> Result<(), SpawnError> {
    state.score = state.score.saturating_add(state.rules.correct_reward);
    if state.tier < Tier::Gold {
        state.loot.coins += 1;
    } else {
        state.loot.gems += 1;
    }
    state.combo_streak += 1;
    state.emit(GameEvent::CorrectAnswer {
        score: state.score,
        combo: state.combo_streak,
    });

    state.raise_tier();
    state.start_round()
}

/// Wrong answer: shrink, penalize, and drop only the eaten option
fn eat_wrong(state: &mut GameState, index: usize) {
    // The usual tail pop plus the shrink penalty. The head always survives.
    for _ in 0..=state.rules.wrong_answer_shrink {
        if state.snake.len() <= 1 {
            break;
        }
        state.snake.pop_back();
    }
    state.score = state.score.saturating_sub(state.rules.wrong_penalty);
    state.combo_streak = 0;
    state.foods.remove(index);
    state.emit(GameEvent::WrongAnswer { score: state.score });

    if state.snake.len() < MIN_SNAKE_LEN {
        state.end_game(GameOverReason::Starved);
    }
}

fn collect_power_up(state: &mut GameState) {
    let Some(power_up) = state.power_up.take() else {
        return;
    };
    log::debug!("Collected {:?}", power_up.kind);

    match power_up.kind {
        PowerUpKind::Bomb => {
            state.foods.retain(|f| f.is_correct);
            let trim = state
                .rules
                .bomb_trim
                .min(state.snake.len().saturating_sub(1));
            let keep = state.snake.len() - trim;
            state.snake.truncate(keep);
        }
        PowerUpKind::Potion => {
            if let Some(&tail) = state.snake.back() {
                for _ in 0..state.rules.potion_growth {
                    state.snake.push_back(tail);
                }
            }
        }
        PowerUpKind::Chest => {
            state.score = state.score.saturating_add(state.rules.chest_reward);
            state.raise_tier();
        }
    }

    state.emit(GameEvent::PowerUpCollected {
        kind: power_up.kind,
    });

    if state.snake.len() < MIN_SNAKE_LEN {
        state.end_game(GameOverReason::Starved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{MAX_PLACEMENT_ATTEMPTS, TILE_COUNT};
    use crate::sim::question::{Answer, Question};
    use crate::sim::spawn::SpawnItem;
    use crate::sim::rules::Rules;
    use crate::sim::state::{Direction, Food, Position, PowerUp};
    use glam::IVec2;
    use proptest::prelude::*;
    use std::collections::VecDeque;

    fn food(x: i32, y: i32, value: i32, is_correct: bool) -> Food {
        Food {
            pos: IVec2::new(x, y),
            value: Answer::Numeric(value),
            is_correct,
        }
    }

    /// Running state with a known board: snake heading right from (10,10),
    /// correct answer far away in the corner, no power-up.
    fn running_state(seed: u64) -> GameState {
        let mut state = GameState::with_rules(
            seed,
            Rules {
                power_up_chance: 0.0,
                ..Default::default()
            },
        );
        state.start_session().unwrap();
        state.foods = vec![
            food(0, 0, 7, true),
            food(0, 19, 6, false),
            food(19, 19, 8, false),
        ];
        state.power_up = None;
        state.drain_events();
        state
    }

    fn body(cells: &[(i32, i32)]) -> VecDeque<Position> {
        cells.iter().map(|&(x, y)| IVec2::new(x, y)).collect()
    }

    #[test]
    fn test_plain_move_keeps_length() {
        let mut state = running_state(1);
        tick(&mut state).unwrap();
        assert_eq!(state.snake, body(&[(11, 10), (10, 10), (9, 10)]));
        assert_eq!(state.time_ticks, 1);
    }

    #[test]
    fn test_pending_direction_applies_on_tick() {
        let mut state = running_state(1);
        state.set_intent(Direction::Down);
        assert_eq!(state.direction, Direction::Right);
        tick(&mut state).unwrap();
        assert_eq!(state.direction, Direction::Down);
        assert_eq!(state.head(), IVec2::new(10, 11));
    }

    #[test]
    fn test_wall_collision_ends_game() {
        let mut state = running_state(2);
        state.snake = body(&[(TILE_COUNT - 1, 5), (TILE_COUNT - 2, 5), (TILE_COUNT - 3, 5)]);
        tick(&mut state).unwrap();
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.drain_events().iter().any(|e| matches!(
            e,
            GameEvent::GameOver {
                reason: GameOverReason::Wall,
                ..
            }
        )));
    }

    #[test]
    fn test_self_collision_ends_game() {
        let mut state = running_state(3);
        // Hook shape: heading up into (5,4), which is part of the body
        state.snake = body(&[(5, 5), (6, 5), (6, 4), (5, 4), (4, 4)]);
        state.direction = Direction::Up;
        state.pending_direction = Direction::Up;
        tick(&mut state).unwrap();
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_ticks_ignored_when_not_running() {
        let mut state = running_state(4);
        state.stop();
        let before = state.snake.clone();
        tick(&mut state).unwrap();
        assert_eq!(state.snake, before);
        assert_eq!(state.time_ticks, 0);
    }

    #[test]
    fn test_correct_answer_grows_and_rolls_round() {
        // Length 3 head into the correct answer
        let mut state = running_state(5);
        state.question = Some(Question {
            text: "stale".to_string(),
            answer: Answer::Numeric(1000),
            distractors: [Answer::Numeric(1001), Answer::Numeric(1002)],
        });
        state.foods = vec![
            food(11, 10, 1000, true),
            food(0, 19, 1001, false),
            food(19, 19, 1002, false),
        ];
        tick(&mut state).unwrap();

        assert_eq!(state.score, 5);
        assert_eq!(state.snake.len(), 4);
        assert_eq!(state.loot.coins, 1);
        assert_eq!(state.combo_streak, 1);

        let question = state.question.clone().unwrap();
        assert_ne!(question.text, "stale");
        assert_eq!(state.foods.len(), 3);
        assert_eq!(state.foods[0].value, question.answer);
        assert_eq!(state.foods[1].value, question.distractors[0]);
        assert_eq!(state.foods[2].value, question.distractors[1]);
        // Bronze answers stay far below the old round's values
        assert!(
            state
                .foods
                .iter()
                .all(|f| !matches!(f.value, Answer::Numeric(v) if v >= 1000))
        );
        assert!(state.foods.iter().all(|f| f.pos != IVec2::new(11, 10)));
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::CorrectAnswer { score: 5, combo: 1 }));
        assert!(events.iter().any(|e| matches!(e, GameEvent::RoundStarted { .. })));
    }

    #[test]
    fn test_wrong_answer_at_length_four_ends_game() {
        let mut state = running_state(6);
        state.snake = body(&[(10, 10), (9, 10), (8, 10), (7, 10)]);
        state.score = 1;
        state.foods[1].pos = IVec2::new(11, 10);
        tick(&mut state).unwrap();

        assert_eq!(state.score, 0);
        assert_eq!(state.snake.len(), 2);
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_wrong_answer_removes_only_eaten_food() {
        let mut state = running_state(7);
        state.snake = body(&[(10, 10), (9, 10), (8, 10), (7, 10), (6, 10), (5, 10)]);
        state.score = 12;
        state.combo_streak = 2;
        state.foods[2].pos = IVec2::new(11, 10);
        tick(&mut state).unwrap();

        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.snake.len(), 4);
        assert_eq!(state.score, 10);
        assert_eq!(state.combo_streak, 0);
        assert_eq!(state.foods.len(), 2);
        assert!(state.foods.iter().any(|f| f.is_correct));
    }

    #[test]
    fn test_bomb_clears_distractors_and_trims() {
        let mut state = running_state(8);
        state.snake = body(&[
            (10, 10),
            (9, 10),
            (8, 10),
            (7, 10),
            (6, 10),
            (5, 10),
            (4, 10),
        ]);
        state.power_up = Some(PowerUp {
            pos: IVec2::new(11, 10),
            kind: PowerUpKind::Bomb,
        });
        tick(&mut state).unwrap();

        assert_eq!(state.foods.len(), 1);
        assert!(state.foods[0].is_correct);
        assert_eq!(state.snake.len(), 4);
        assert!(state.power_up.is_none());
        assert_eq!(state.phase, GamePhase::Running);
    }

    #[test]
    fn test_bomb_on_short_snake_is_fatal_but_keeps_head() {
        let mut state = running_state(9);
        state.power_up = Some(PowerUp {
            pos: IVec2::new(11, 10),
            kind: PowerUpKind::Bomb,
        });
        tick(&mut state).unwrap();

        assert_eq!(state.snake.len(), 1);
        assert_eq!(state.head(), IVec2::new(11, 10));
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_potion_adds_two_tail_copies() {
        let mut state = running_state(10);
        state.power_up = Some(PowerUp {
            pos: IVec2::new(11, 10),
            kind: PowerUpKind::Potion,
        });
        tick(&mut state).unwrap();
        assert_eq!(
            state.snake,
            body(&[(11, 10), (10, 10), (9, 10), (9, 10), (9, 10)])
        );

        // The stacked copies unwind as the snake moves on
        tick(&mut state).unwrap();
        tick(&mut state).unwrap();
        assert_eq!(
            state.snake,
            body(&[(13, 10), (12, 10), (11, 10), (10, 10), (9, 10)])
        );
    }

    #[test]
    fn test_chest_adds_bonus_and_can_raise_tier() {
        let mut state = running_state(11);
        state.power_up = Some(PowerUp {
            pos: IVec2::new(11, 10),
            kind: PowerUpKind::Chest,
        });
        tick(&mut state).unwrap();
        assert_eq!(state.score, 50);
        assert_eq!(state.snake.len(), 3);
        assert_eq!(state.tier, Tier::Gold);
        assert!(state.power_up.is_none());
    }

    #[test]
    fn test_combo_streak_forces_chest() {
        let mut state = running_state(12);
        state.combo_streak = 2;
        state.foods[0].pos = IVec2::new(11, 10);
        tick(&mut state).unwrap();

        assert_eq!(state.power_up.map(|p| p.kind), Some(PowerUpKind::Chest));
        assert_eq!(state.combo_streak, 0);
    }

    #[test]
    fn test_combo_threshold_resets_streak_with_live_power_up() {
        let mut state = running_state(15);
        let potion = PowerUp {
            pos: IVec2::new(5, 5),
            kind: PowerUpKind::Potion,
        };
        state.power_up = Some(potion);
        state.combo_streak = 2;
        state.foods[0].pos = IVec2::new(11, 10);
        tick(&mut state).unwrap();

        assert_eq!(state.combo_streak, 0);
        assert_eq!(state.power_up, Some(potion));
    }

    #[test]
    fn test_full_grid_aborts_run() {
        let mut state = running_state(16);
        // Every cell but the one in front of the head belongs to the snake
        let eaten = IVec2::new(11, 10);
        let head = IVec2::new(10, 10);
        let mut snake: VecDeque<Position> = VecDeque::from([head]);
        snake.extend(
            (0..TILE_COUNT)
                .flat_map(|y| (0..TILE_COUNT).map(move |x| IVec2::new(x, y)))
                .filter(|&c| c != head && c != eaten),
        );
        state.snake = snake;
        state.foods = vec![food(eaten.x, eaten.y, 7, true)];

        let err = tick(&mut state).unwrap_err();
        assert_eq!(
            err,
            SpawnError::PlacementExhausted {
                item: SpawnItem::Food,
                attempts: MAX_PLACEMENT_ATTEMPTS,
            }
        );
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.drain_events().iter().any(|e| matches!(
            e,
            GameEvent::GameOver {
                reason: GameOverReason::Aborted,
                ..
            }
        )));
    }

    #[test]
    fn test_tier_up_fires_once() {
        let mut state = running_state(13);
        state.score = 20;
        state.foods[0].pos = IVec2::new(11, 10);
        tick(&mut state).unwrap();
        assert_eq!(state.score, 25);
        assert_eq!(state.tier, Tier::Silver);
        let tier_ups = |events: &[GameEvent]| {
            events
                .iter()
                .filter(|e| matches!(e, GameEvent::TierUp { .. }))
                .count()
        };
        assert_eq!(tier_ups(&state.drain_events()), 1);

        // Drop back under 25 with a wrong answer, then earn it back
        let head = state.head();
        state.snake = body(&[
            (head.x, head.y),
            (head.x - 1, head.y),
            (head.x - 2, head.y),
            (head.x - 3, head.y),
            (head.x - 4, head.y),
            (head.x - 5, head.y),
        ]);
        state.direction = Direction::Right;
        state.pending_direction = Direction::Right;
        state.foods = vec![food(head.x + 1, head.y, 1, false), food(0, 0, 2, true)];
        tick(&mut state).unwrap();
        assert_eq!(state.score, 23);
        assert_eq!(state.tier, Tier::Silver);

        let head = state.head();
        state.foods = vec![food(head.x + 1, head.y, 2, true)];
        tick(&mut state).unwrap();
        assert_eq!(state.score, 28);
        assert_eq!(state.tier, Tier::Silver);
        assert_eq!(tier_ups(&state.drain_events()), 0);
    }

    #[test]
    fn test_gems_from_gold_tier() {
        let mut state = running_state(14);
        state.tier = Tier::Gold;
        state.score = 50;
        state.foods[0].pos = IVec2::new(11, 10);
        tick(&mut state).unwrap();
        assert_eq!(state.loot, crate::sim::state::Loot { coins: 0, gems: 1 });
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = GameState::new(777);
        let mut b = GameState::new(777);
        a.start_session().unwrap();
        b.start_session().unwrap();
        let turns = [Direction::Down, Direction::Left, Direction::Up, Direction::Right];
        for step in 0..40 {
            if step % 5 == 0 {
                let dir = turns[(step / 5) % turns.len()];
                a.set_intent(dir);
                b.set_intent(dir);
            }
            let ra = tick(&mut a);
            let rb = tick(&mut b);
            assert_eq!(ra, rb);
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }

    proptest! {
        #[test]
        fn prop_running_ticks_keep_snake_valid(
            seed in any::<u64>(),
            turns in proptest::collection::vec(0usize..4, 1..120),
        ) {
            let mut state = GameState::new(seed);
            state.start_session().unwrap();
            let mut last_tier = state.tier;

            for turn in turns {
                state.set_intent(Direction::ALL[turn]);
                tick(&mut state).unwrap();
                prop_assert!(state.tier >= last_tier);
                last_tier = state.tier;

                if !state.is_running() {
                    break;
                }
                prop_assert!(state.snake.len() >= MIN_SNAKE_LEN);
                prop_assert!(state.snake.iter().all(|&s| in_bounds(s)));
                let head = state.head();
                prop_assert!(state.snake.iter().skip(1).all(|&s| s != head));
                for (i, f) in state.foods.iter().enumerate() {
                    prop_assert!(!state.snake_occupies(f.pos));
                    prop_assert!(state.foods[i + 1..].iter().all(|o| o.pos != f.pos));
                }
                if let Some(p) = state.power_up {
                    prop_assert!(!state.snake_occupies(p.pos));
                    prop_assert!(state.foods.iter().all(|f| f.pos != p.pos));
                }
            }
        }
    }
}
