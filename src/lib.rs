//! Gungeon Assault - a top-down arcade shooter
//!
//! Core modules:
//! - `sim`: Real-time simulation (entities, waves, bosses, projectiles, combat)
//! - `audio`: Sound cue seam toward the platform audio backend
//! - `settings`: Runtime configuration

pub mod audio;
pub mod settings;
pub mod sim;

pub use settings::{EffectsLevel, Settings};

use glam::Vec2;
use rand::Rng;

/// Game configuration constants
pub mod consts {
    /// Playfield dimensions (canvas units)
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 600.0;

    /// Largest simulation step per frame (seconds). Slower frames drop time.
    pub const MAX_FRAME_DT: f32 = 0.016;

    /// Extra margin boss bullets may travel past the arena (homing overshoot)
    pub const BOSS_BULLET_MARGIN: f32 = 100.0;

    /// Player spawn point
    pub const PLAYER_START_X: f32 = 400.0;
    pub const PLAYER_START_Y: f32 = 500.0;
    pub const PLAYER_SIZE: f32 = 40.0;

    /// Bullet defaults
    pub const PLAYER_BULLET_SIZE: f32 = 6.0;
    pub const PLAYER_BULLET_LIFETIME: f32 = 4.0;
    pub const HEAVY_BULLET_SIZE: f32 = 12.0;
    pub const ENEMY_BULLET_SIZE: f32 = 5.0;
    pub const ENEMY_BULLET_SPEED: f32 = 450.0;
    pub const ENEMY_BULLET_LIFETIME: f32 = 5.0;
    pub const BOSS_BULLET_LIFETIME: f32 = 6.0;

    /// Homing boss bullets: steering acceleration and speed cap
    pub const HOMING_STRENGTH: f32 = 200.0;
    pub const HOMING_MAX_SPEED: f32 = 600.0;

    /// Engine-wide pause between enemy volleys (ms, before difficulty scaling)
    pub const ENEMY_VOLLEY_COOLDOWN_MS: f64 = 600.0;
    /// Enemies further than this never take a shot
    pub const ENEMY_FIRE_RANGE: f32 = 500.0;

    /// Boss intro hold (seconds)
    pub const BOSS_INTRO_DURATION: f32 = 3.0;
    /// Boss death animation (seconds) before removal
    pub const BOSS_DEATH_DURATION: f32 = 2.0;
    /// Particles thrown by a boss's killing blow
    pub const BOSS_EXPLOSION_PARTICLES: usize = 120;
    /// Guaranteed pickups dropped by a defeated boss
    pub const BOSS_PICKUP_DROPS: usize = 8;

    /// Every Nth wave is a boss wave
    pub const BOSS_WAVE_INTERVAL: u32 = 5;
}

/// Unit vector pointing from `from` toward `to` (zero when they coincide)
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

/// Circle overlap test where `size` is a diameter
#[inline]
pub fn circles_overlap(a_pos: Vec2, a_size: f32, b_pos: Vec2, b_size: f32) -> bool {
    a_pos.distance(b_pos) < (a_size + b_size) / 2.0
}

/// Vector of length `speed` pointing along `angle` (radians)
#[inline]
pub fn vec_from_angle(angle: f32, speed: f32) -> Vec2 {
    Vec2::new(angle.cos() * speed, angle.sin() * speed)
}

/// Uniform float in `[min, max)`; returns `min` for an empty range
#[inline]
pub fn random_between<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    min + rng.random::<f32>() * (max - min)
}
