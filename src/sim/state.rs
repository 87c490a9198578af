//! Game state and render snapshot
//!
//! Everything one run owns lives in [`GameState`]; the frame loop in `tick`
//! is the only writer.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::level::Level;
use super::particle::ParticleSystem;
use super::player::Player;
use super::projectile::{BossBullet, Bullet};
use super::timer::Timestamp;
use crate::audio::{SoundCue, SoundEffect};
use crate::consts::*;
use crate::settings::Settings;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for start input
    #[default]
    Start,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Boss arrival hold; only wave timers advance
    BossIntro,
    /// Run ended
    GameOver,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Start => "start",
            GamePhase::Playing => "playing",
            GamePhase::Paused => "paused",
            GamePhase::BossIntro => "boss_intro",
            GamePhase::GameOver => "game_over",
        }
    }
}

/// Camera shake requested by combat events
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenShake {
    pub intensity: f32,
    /// Seconds left
    pub duration: f32,
}

impl ScreenShake {
    /// Stronger and longer requests win; weaker ones never cut a shake short
    pub fn add(&mut self, intensity: f32, duration: f32) {
        self.intensity = self.intensity.max(intensity);
        self.duration = self.duration.max(duration);
    }

    pub fn update(&mut self, dt: f32) {
        if self.duration > 0.0 {
            self.duration -= dt;
            if self.duration <= 0.0 {
                self.duration = 0.0;
                self.intensity = 0.0;
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.duration > 0.0
    }
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub settings: Settings,
    pub arena: Vec2,
    pub phase: GamePhase,
    pub score: u64,
    pub player: Player,
    pub level: Level,
    pub bullets: Vec<Bullet>,
    pub enemy_bullets: Vec<Bullet>,
    pub boss_bullets: Vec<BossBullet>,
    pub particles: ParticleSystem,
    pub screen_shake: ScreenShake,
    pub survival_mode: bool,
    /// Seconds survived this run
    pub survival_timer: f32,
    /// Survival ramp applied to enemy fire
    pub difficulty_multiplier: f32,
    /// Seconds into the current boss intro
    pub boss_intro_timer: f32,
    /// Engine-wide gate between enemy volleys
    pub last_enemy_shot: Option<Timestamp>,
    /// Timestamp of the previous frame
    pub last_frame: Option<Timestamp>,
    /// Frames simulated since start
    pub frame: u64,
    /// Sound cues waiting for the audio backend
    sounds: Vec<SoundCue>,
}

impl GameState {
    /// Seed from the settings, or a random one
    pub fn new(settings: Settings) -> Self {
        let seed = settings.seed.unwrap_or_else(rand::random);
        Self::with_seed(seed, settings)
    }

    pub fn with_seed(seed: u64, settings: Settings) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let level = Level::generate(&mut rng);
        let mut particles = ParticleSystem::new(settings.particle_pool());
        particles.enabled = settings.particles;
        Self {
            seed,
            rng,
            arena: Vec2::new(settings.arena_width, settings.arena_height),
            phase: GamePhase::Start,
            score: 0,
            player: Player::default(),
            level,
            bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            boss_bullets: Vec::new(),
            particles,
            screen_shake: ScreenShake::default(),
            survival_mode: settings.survival_mode,
            survival_timer: 0.0,
            difficulty_multiplier: 1.0,
            boss_intro_timer: 0.0,
            last_enemy_shot: None,
            last_frame: None,
            frame: 0,
            sounds: Vec::new(),
            settings,
        }
    }

    /// Reset everything for a fresh run and start playing
    pub fn start_game(&mut self, now: Timestamp) {
        self.phase = GamePhase::Playing;
        self.score = 0;
        self.player = Player::new(Vec2::new(PLAYER_START_X, PLAYER_START_Y));
        self.level = Level::generate(&mut self.rng);
        self.bullets.clear();
        self.enemy_bullets.clear();
        self.boss_bullets.clear();
        self.particles.clear();
        self.screen_shake = ScreenShake::default();
        self.survival_timer = 0.0;
        self.difficulty_multiplier = 1.0;
        self.boss_intro_timer = 0.0;
        self.last_enemy_shot = None;
        self.last_frame = Some(now);
        self.sounds.clear();
        log::info!(
            "Run started (seed {}, survival {})",
            self.seed,
            if self.survival_mode { "on" } else { "off" }
        );
    }

    pub fn play_sound(&mut self, effect: SoundEffect, volume: f32) {
        self.sounds.push(SoundCue::new(effect, volume));
    }

    /// Hand queued cues to the caller
    pub fn drain_sounds(&mut self) -> Vec<SoundCue> {
        std::mem::take(&mut self.sounds)
    }

    pub fn pending_sounds(&self) -> &[SoundCue] {
        &self.sounds
    }

    pub fn add_screen_shake(&mut self, intensity: f32, duration: f32) {
        if self.settings.wants_shake() {
            self.screen_shake.add(intensity, duration);
        }
    }

    pub fn wave(&self) -> u32 {
        self.level.current_wave
    }

    /// Read-only view for the renderer
    pub fn snapshot(&self, now: Timestamp) -> Snapshot {
        let player = &self.player;
        let room = &self.level.room;
        Snapshot {
            frame: self.frame,
            phase: self.phase,
            score: self.score,
            wave: self.level.current_wave,
            difficulty: self.level.difficulty.as_str(),
            wave_transition: self.level.transition_time_remaining(),
            show_wave_complete: self.level.show_wave_complete,
            player: PlayerView {
                pos: player.pos,
                size: player.size,
                health_ratio: player.health_ratio(),
                shield_ratio: player.shield_ratio(),
                level: player.level,
                experience: player.experience,
                coins: player.coins,
                weapon: player.weapon.name.clone(),
                ammo: player.weapon.ammo,
                max_ammo: player.weapon.max_ammo,
                reload_progress: player.reload_progress(now),
                accuracy: player.stats.accuracy,
                kills: player.stats.kills,
                power_ups: player
                    .power_ups
                    .iter()
                    .map(|p| (p.kind, p.remaining(now)))
                    .collect(),
            },
            enemies: room
                .enemies
                .iter()
                .map(|e| EntityView {
                    kind: e.kind.as_str(),
                    pos: e.body.pos,
                    size: e.body.size,
                    color: e.body.color,
                    health_ratio: e.body.health_ratio(),
                })
                .collect(),
            boss: room.boss.as_ref().map(|b| BossView {
                kind: b.kind.as_str(),
                pos: b.body.pos,
                size: b.body.size,
                color: b.body.color,
                health_ratio: b.body.health_ratio(),
                phase: b.state.phase,
                max_phases: b.state.max_phases,
                pattern: b.state.current_pattern.as_str(),
                shielded: b.state.shield_active,
                enraged: b.state.enraged,
                dying: b.is_dying(),
            }),
            pickups: room
                .pickups
                .iter()
                .map(|p| EntityView {
                    kind: p.kind.as_str(),
                    pos: p.pos,
                    size: p.size,
                    color: p.color,
                    health_ratio: 1.0,
                })
                .collect(),
            bullets: self
                .bullets
                .iter()
                .chain(self.enemy_bullets.iter())
                .chain(self.boss_bullets.iter().map(|b| &b.bullet))
                .map(|b| BulletView {
                    pos: b.pos,
                    size: b.size,
                    color: b.color,
                    from_player: b.from_player,
                })
                .collect(),
            particles: self.particles.len(),
            screen_shake: self.screen_shake,
            survival_time_left: self
                .survival_mode
                .then(|| (self.settings.survival_duration - self.survival_timer).max(0.0)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub size: f32,
    pub health_ratio: f32,
    pub shield_ratio: f32,
    pub level: u32,
    pub experience: f32,
    pub coins: f32,
    pub weapon: String,
    pub ammo: u32,
    pub max_ammo: u32,
    pub reload_progress: f32,
    pub accuracy: f32,
    pub kills: u32,
    pub power_ups: Vec<(super::player::PowerUpKind, f32)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntityView {
    pub kind: &'static str,
    pub pos: Vec2,
    pub size: f32,
    pub color: u32,
    pub health_ratio: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct BossView {
    pub kind: &'static str,
    pub pos: Vec2,
    pub size: f32,
    pub color: u32,
    pub health_ratio: f32,
    pub phase: u32,
    pub max_phases: u32,
    pub pattern: &'static str,
    pub shielded: bool,
    pub enraged: bool,
    pub dying: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulletView {
    pub pos: Vec2,
    pub size: f32,
    pub color: u32,
    pub from_player: bool,
}

/// Per-frame render data
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub frame: u64,
    pub phase: GamePhase,
    pub score: u64,
    pub wave: u32,
    pub difficulty: &'static str,
    pub wave_transition: f32,
    pub show_wave_complete: bool,
    pub player: PlayerView,
    pub enemies: Vec<EntityView>,
    pub boss: Option<BossView>,
    pub pickups: Vec<EntityView>,
    pub bullets: Vec<BulletView>,
    pub particles: usize,
    pub screen_shake: ScreenShake,
    pub survival_time_left: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_shake_keeps_max() {
        let mut shake = ScreenShake::default();
        shake.add(12.0, 1.5);
        shake.add(2.0, 0.1);
        assert_eq!(shake, ScreenShake { intensity: 12.0, duration: 1.5 });
        shake.update(1.0);
        assert!(shake.is_active());
        shake.update(0.6);
        assert_eq!(shake, ScreenShake::default());
    }

    #[test]
    fn test_reduced_motion_suppresses_shake() {
        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        let mut state = GameState::with_seed(1, settings);
        state.add_screen_shake(10.0, 1.0);
        assert!(!state.screen_shake.is_active());
    }

    #[test]
    fn test_start_game_resets_run() {
        let mut state = GameState::with_seed(3, Settings::default());
        state.score = 999;
        state.player.health = 1.0;
        state.bullets.push(Bullet {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            damage: 1.0,
            lifetime: 1.0,
            size: 6.0,
            color: 0,
            from_player: true,
        });
        state.play_sound(SoundEffect::Shoot, 1.0);

        state.start_game(Timestamp(500.0));
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.score, 0);
        assert_eq!(state.player.health, 200.0);
        assert!(state.bullets.is_empty());
        assert_eq!(state.wave(), 1);
        assert_eq!(state.level.room.enemies.len(), 4);
        assert!(state.drain_sounds().is_empty());
        assert_eq!(state.last_frame, Some(Timestamp(500.0)));
    }

    #[test]
    fn test_same_seed_same_level() {
        let a = GameState::with_seed(42, Settings::default());
        let b = GameState::with_seed(42, Settings::default());
        let kinds = |s: &GameState| s.level.room.enemies.iter().map(|e| e.kind).collect::<Vec<_>>();
        assert_eq!(kinds(&a), kinds(&b));
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = GameState::with_seed(5, Settings::default());
        let snap = state.snapshot(Timestamp::ZERO);
        assert_eq!(snap.enemies.len(), 4);
        assert!(snap.boss.is_none());
        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"phase\":\"Start\""));
    }
}
