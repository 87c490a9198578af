//! Game settings and preferences
//!
//! Stored as JSON. Missing fields take their defaults, so older files keep
//! loading after new options are added.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH, BOSS_EXPLOSION_PARTICLES, MAX_FRAME_DT};

/// How much debris the particle pool keeps alive, rated in boss explosions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EffectsLevel {
    Minimal,
    #[default]
    Standard,
    Cinematic,
}

impl EffectsLevel {
    /// Boss death explosions that fit in the pool at once
    fn boss_explosions(self) -> usize {
        match self {
            EffectsLevel::Minimal => 1,
            EffectsLevel::Standard => 5,
            EffectsLevel::Cinematic => 16,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Particle pool sizing
    pub effects: EffectsLevel,

    // === Visual Effects ===
    /// Particle effects (explosions, sparks, etc.)
    pub particles: bool,
    /// Screen shake on explosions/impacts
    pub screen_shake: bool,
    /// Reduced motion (no shake)
    pub reduced_motion: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Simulation ===
    pub arena_width: f32,
    pub arena_height: f32,
    /// Largest step per frame in seconds
    pub max_frame_dt: f32,
    /// Timed run with ramping difficulty
    pub survival_mode: bool,
    /// Survival run length in seconds
    pub survival_duration: f32,
    /// Fixed RNG seed; random when absent
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            effects: EffectsLevel::Standard,

            particles: true,
            screen_shake: true,
            reduced_motion: false,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,

            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            max_frame_dt: MAX_FRAME_DT,
            survival_mode: false,
            survival_duration: 300.0,
            seed: None,
        }
    }
}

impl Settings {
    /// Camera shake is skipped under reduced motion
    pub fn wants_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Live particle limit; zero with particles off
    pub fn particle_pool(&self) -> usize {
        if self.particles {
            self.effects.boss_explosions() * BOSS_EXPLOSION_PARTICLES
        } else {
            0
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Invalid settings in {}: {} - using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::info!("No settings at {} ({}) - using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = self.to_json().map_err(std::io::Error::other)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{"effects":"cinematic","seed":42}"#).unwrap();
        assert_eq!(settings.effects, EffectsLevel::Cinematic);
        assert_eq!(settings.seed, Some(42));
        assert_eq!(settings.arena_width, ARENA_WIDTH);
        assert!(settings.particles);
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(Settings::from_json("{ not json").is_err());
    }

    #[test]
    fn test_particle_pool_holds_boss_explosions() {
        let mut settings = Settings {
            effects: EffectsLevel::Minimal,
            ..Settings::default()
        };
        assert_eq!(settings.particle_pool(), BOSS_EXPLOSION_PARTICLES);
        assert_eq!(Settings::default().particle_pool(), 5 * BOSS_EXPLOSION_PARTICLES);
        settings.particles = false;
        assert_eq!(settings.particle_pool(), 0);
    }

    #[test]
    fn test_reduced_motion_disables_shake() {
        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        assert!(!settings.wants_shake());
        assert!(Settings::default().wants_shake());
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let settings = Settings::load("/nonexistent/gungeon/settings.json");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("gungeon-settings-{}.json", std::process::id()));
        let settings = Settings {
            survival_mode: true,
            effects: EffectsLevel::Minimal,
            ..Settings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path), settings);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_unknown_effects_level_rejected() {
        assert!(Settings::from_json(r#"{"effects":"ultra"}"#).is_err());
    }
}
