//! Gameplay tunables
//!
//! Everything a balance pass might want to change without touching the
//! tick logic. Persisted as part of `Settings`.

use serde::{Deserialize, Serialize};

/// Balance values for scoring, body changes and spawning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Points for eating the correct answer
    pub correct_reward: u32,
    /// Points lost for eating a wrong answer (score floors at 0)
    pub wrong_penalty: u32,
    /// Segments removed on a wrong answer, beyond the usual tail pop
    pub wrong_answer_shrink: usize,
    /// Points granted by a chest
    pub chest_reward: u32,
    /// Tail segments removed by a bomb
    pub bomb_trim: usize,
    /// Tail segments added by a potion
    pub potion_growth: usize,
    /// Chance of a bomb or potion spawning with a new round
    pub power_up_chance: f64,
    /// Consecutive correct answers that force a chest
    pub combo_threshold: u32,
    /// Score needed per tier step
    pub tier_step: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            correct_reward: 5,
            wrong_penalty: 2,
            wrong_answer_shrink: 2,
            chest_reward: 50,
            bomb_trim: 3,
            potion_growth: 2,
            power_up_chance: 0.1,
            combo_threshold: 3,
            tier_step: 25,
        }
    }
}

impl Rules {
    /// Clamp values that would otherwise panic or stall the simulation
    pub fn sanitized(mut self) -> Self {
        self.power_up_chance = if self.power_up_chance.is_finite() {
            self.power_up_chance.clamp(0.0, 1.0)
        } else {
            Rules::default().power_up_chance
        };
        self.combo_threshold = self.combo_threshold.max(1);
        self.tier_step = self.tier_step.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_clamps_chance() {
        let rules = Rules {
            power_up_chance: 3.0,
            tier_step: 0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(rules.power_up_chance, 1.0);
        assert_eq!(rules.tier_step, 1);

        let rules = Rules {
            power_up_chance: f64::NAN,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(rules.power_up_chance, 0.1);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let rules: Rules = serde_json::from_str(r#"{"chest_reward": 10}"#).unwrap();
        assert_eq!(rules.chest_reward, 10);
        assert_eq!(rules.correct_reward, 5);
        assert_eq!(rules.wrong_answer_shrink, 2);
    }
}
