//! Game settings and preferences
//!
//! Persisted separately from the high score in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_TICK_MS;
use crate::sim::Rules;

/// Fastest allowed tick period (ms)
pub const MIN_TICK_MS: u32 = 40;
/// Slowest allowed tick period (ms)
pub const MAX_TICK_MS: u32 = 400;

/// Speed preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpeedPreset {
    Relaxed,
    #[default]
    Normal,
    Fast,
}

impl SpeedPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeedPreset::Relaxed => "Relaxed",
            SpeedPreset::Normal => "Normal",
            SpeedPreset::Fast => "Fast",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "relaxed" | "slow" => Some(SpeedPreset::Relaxed),
            "normal" | "med" => Some(SpeedPreset::Normal),
            "fast" => Some(SpeedPreset::Fast),
            _ => None,
        }
    }

    /// Tick period for this preset (ms)
    pub fn tick_ms(&self) -> u32 {
        match self {
            SpeedPreset::Relaxed => 150,
            SpeedPreset::Normal => DEFAULT_TICK_MS,
            SpeedPreset::Fast => 70,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Speed preset (used when no slider override is set)
    pub speed: SpeedPreset,
    /// Slider override for the tick period (ms)
    pub tick_interval_ms: Option<u32>,
    /// Fixed run seed (random per run when unset)
    pub seed: Option<u64>,
    /// Gameplay balance
    pub rules: Rules,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            speed: SpeedPreset::Normal,
            tick_interval_ms: None,
            seed: None,
            rules: Rules::default(),
        }
    }
}

impl Settings {
    /// Apply a speed preset (drops any slider override)
    pub fn apply_preset(&mut self, preset: SpeedPreset) {
        self.speed = preset;
        self.tick_interval_ms = None;
    }

    /// Set the slider value, clamped to the allowed range
    pub fn set_tick_interval(&mut self, ms: u32) {
        self.tick_interval_ms = Some(ms.clamp(MIN_TICK_MS, MAX_TICK_MS));
    }

    /// Effective tick period the driver should schedule (ms)
    pub fn tick_interval(&self) -> u32 {
        self.tick_interval_ms
            .unwrap_or_else(|| self.speed.tick_ms())
            .clamp(MIN_TICK_MS, MAX_TICK_MS)
    }

    /// Rules with unsafe values clamped
    pub fn effective_rules(&self) -> Rules {
        self.rules.sanitized()
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "math_snake_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(err) => log::warn!("Discarding stored settings: {err}"),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_intervals() {
        assert_eq!(Settings::default().tick_interval(), 100);
        let mut settings = Settings::default();
        settings.apply_preset(SpeedPreset::Fast);
        assert_eq!(settings.tick_interval(), 70);
        assert_eq!(SpeedPreset::from_str("SLOW"), Some(SpeedPreset::Relaxed));
        assert_eq!(SpeedPreset::from_str("warp"), None);
        for preset in [SpeedPreset::Relaxed, SpeedPreset::Normal, SpeedPreset::Fast] {
            assert_eq!(SpeedPreset::from_str(preset.as_str()), Some(preset));
        }
    }

    #[test]
    fn test_slider_clamps_and_preset_resets() {
        let mut settings = Settings::default();
        settings.set_tick_interval(5);
        assert_eq!(settings.tick_interval(), MIN_TICK_MS);
        settings.set_tick_interval(10_000);
        assert_eq!(settings.tick_interval(), MAX_TICK_MS);

        settings.apply_preset(SpeedPreset::Relaxed);
        assert_eq!(settings.tick_interval(), 150);
    }

    #[test]
    fn test_stored_json_fills_missing_fields() {
        let settings: Settings = serde_json::from_str(r#"{"speed":"Fast"}"#).unwrap();
        assert_eq!(settings.speed, SpeedPreset::Fast);
        assert_eq!(settings.rules, Rules::default());
        assert_eq!(settings.seed, None);
    }
}
