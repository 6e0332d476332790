//! Score to tier mapping
//!
//! Tiers gate question difficulty and which loot counter a correct answer
//! feeds. The stored tier only ever moves forward within a session.

use serde::{Deserialize, Serialize};

/// Difficulty tier (also the visual theme)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Tier {
    /// Single-digit addition and subtraction
    #[default]
    Bronze,
    /// Mixed two-step expressions and multiplication
    Silver,
    /// Negative results
    Gold,
    /// Simple fractions
    Diamond,
}

impl Tier {
    /// Tier for a raw index. Values above 3 clamp to Diamond, anything
    /// negative falls back to Bronze.
    pub fn from_index(index: i64) -> Self {
        match index {
            ..=0 => Tier::Bronze,
            1 => Tier::Silver,
            2 => Tier::Gold,
            _ => Tier::Diamond,
        }
    }

    /// Badge label shown in the HUD
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Bronze => "BRONZE",
            Tier::Silver => "SILVER",
            Tier::Gold => "GOLD",
            Tier::Diamond => "DIAMOND",
        }
    }

    /// CSS theme class applied to the page body (Bronze uses the base theme)
    pub fn theme_class(self) -> Option<&'static str> {
        match self {
            Tier::Bronze => None,
            Tier::Silver => Some("theme-silver"),
            Tier::Gold => Some("theme-gold"),
            Tier::Diamond => Some("theme-diamond"),
        }
    }
}

/// Tier a score maps to: `min(3, score / step)`
pub fn tier_for(score: u32, step: u32) -> Tier {
    let step = step.max(1);
    Tier::from_index(i64::from(score / step))
}

/// Returns the new tier if `score` lifts `stored` upward, `None` otherwise.
/// A score that maps below `stored` never downgrades it.
pub fn advance_tier(stored: Tier, score: u32, step: u32) -> Option<Tier> {
    let next = tier_for(score, step);
    (next > stored).then_some(next)
}
