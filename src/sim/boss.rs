//! Multi-phase bosses
//!
//! A boss is a [`Combatant`] plus a [`BossState`]: phase progression driven by
//! health breakpoints, a rotating attack pattern, random shield/teleport
//! abilities and a death latch that keeps the boss on the field until its
//! death animation finishes.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::enemy::Combatant;
use super::timer::Timestamp;
use crate::consts::BOSS_DEATH_DURATION;
use crate::{direction_to, random_between, vec_from_angle};

/// Boss chassis, escalating every five waves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BossKind {
    #[default]
    Destroyer,
    Battlecruiser,
    Dreadnought,
    Mothership,
    Voidlord,
    Titan,
}

/// Base stat line for a boss chassis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BossConfig {
    pub health: f32,
    pub speed: f32,
    pub damage: f32,
    /// Milliseconds
    pub cooldown: f32,
    pub color: u32,
    pub size: f32,
    pub phases: u32,
}

impl BossKind {
    const ORDER: [BossKind; 6] = [
        BossKind::Destroyer,
        BossKind::Battlecruiser,
        BossKind::Dreadnought,
        BossKind::Mothership,
        BossKind::Voidlord,
        BossKind::Titan,
    ];

    /// Chassis for a boss wave
    pub fn for_wave(wave: u32) -> Self {
        let index = (wave.saturating_sub(1) / 5) as usize;
        Self::ORDER[index.min(Self::ORDER.len() - 1)]
    }

    /// Unknown names fall back to `Destroyer`
    pub fn from_name(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "battlecruiser" => BossKind::Battlecruiser,
            "dreadnought" => BossKind::Dreadnought,
            "mothership" => BossKind::Mothership,
            "voidlord" => BossKind::Voidlord,
            "titan" => BossKind::Titan,
            _ => BossKind::Destroyer,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BossKind::Destroyer => "destroyer",
            BossKind::Battlecruiser => "battlecruiser",
            BossKind::Dreadnought => "dreadnought",
            BossKind::Mothership => "mothership",
            BossKind::Voidlord => "voidlord",
            BossKind::Titan => "titan",
        }
    }

    pub fn config(&self) -> BossConfig {
        let (health, speed, damage, cooldown, color, size, phases) = match self {
            BossKind::Destroyer => (2500.0, 35.0, 80.0, 250.0, 0x8B0000, 90.0, 3),
            BossKind::Battlecruiser => (4000.0, 30.0, 120.0, 200.0, 0xFF4500, 110.0, 4),
            BossKind::Dreadnought => (6500.0, 25.0, 180.0, 180.0, 0xFF0000, 130.0, 5),
            BossKind::Mothership => (10000.0, 20.0, 250.0, 150.0, 0xDC143C, 150.0, 6),
            BossKind::Voidlord => (15000.0, 40.0, 350.0, 120.0, 0x4B0082, 170.0, 7),
            BossKind::Titan => (25000.0, 15.0, 500.0, 100.0, 0xFFD700, 200.0, 8),
        };
        BossConfig {
            health,
            speed,
            damage,
            cooldown,
            color,
            size,
            phases,
        }
    }
}

/// Bullet-generation rules a boss cycles through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AttackPattern {
    #[default]
    Basic,
    Spiral,
    Burst,
    Charge,
    Rain,
    Laser,
    Homing,
    Nova,
    Barrage,
}

impl AttackPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttackPattern::Basic => "basic",
            AttackPattern::Spiral => "spiral",
            AttackPattern::Burst => "burst",
            AttackPattern::Charge => "charge",
            AttackPattern::Rain => "rain",
            AttackPattern::Laser => "laser",
            AttackPattern::Homing => "homing",
            AttackPattern::Nova => "nova",
            AttackPattern::Barrage => "barrage",
        }
    }

    /// Heavy patterns shake the screen when fired
    pub fn is_heavy(&self) -> bool {
        matches!(
            self,
            AttackPattern::Burst | AttackPattern::Charge | AttackPattern::Laser
        )
    }
}

/// Patterns unlocked at `phase`
pub fn patterns_for_phase(phase: u32) -> Vec<AttackPattern> {
    use AttackPattern::*;
    let mut pool = vec![Basic, Spiral, Burst];
    if phase >= 2 {
        pool.extend([Charge, Rain]);
    }
    if phase >= 3 {
        pool.extend([Laser, Homing]);
    }
    if phase >= 4 {
        pool.extend([Nova, Barrage]);
    }
    pool
}

/// One projectile produced by an attack pattern
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BulletSpec {
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: f32,
    pub size: f32,
    pub color: u32,
    /// Captured target for homing shots
    pub homing_target: Option<Vec2>,
}

/// Output of a single boss attack
#[derive(Debug, Clone, PartialEq)]
pub struct Volley {
    pub pattern: AttackPattern,
    pub bullets: Vec<BulletSpec>,
}

/// Boss-only state layered on top of the shared combat core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossState {
    /// 1..=max_phases, never decreases
    pub phase: u32,
    pub max_phases: u32,
    /// Descending health breakpoints; crossing index i in phase i+1 enters phase i+2
    pub phase_health: Vec<f32>,
    pub patterns: Vec<AttackPattern>,
    pub current_pattern: AttackPattern,
    /// Milliseconds accumulated from frame deltas
    pub pattern_timer: f32,
    /// Milliseconds
    pub pattern_duration: f32,
    pub enraged: bool,
    pub shield_active: bool,
    /// Wall-clock time the current shield drops
    pub shield_until: Option<Timestamp>,
    /// Wall-clock cooldown gates for the random abilities
    pub shield_ready_at: Option<Timestamp>,
    pub teleport_ready_at: Option<Timestamp>,
    /// Seconds since the death latch closed; `None` while alive
    pub death_timer: Option<f32>,
}

/// Per-frame odds of the special abilities
const TELEPORT_CHANCE: f32 = 0.015;
const SHIELD_CHANCE: f32 = 0.008;
const SHIELD_DURATION_MS: f64 = 4000.0;
const SHIELD_COOLDOWN_MS: f64 = 12000.0;
const TELEPORT_COOLDOWN_MS: f64 = 6000.0;
const SHIELD_DAMAGE_FACTOR: f32 = 0.3;

fn ready(gate: Option<Timestamp>, now: Timestamp) -> bool {
    gate.is_none_or(|t| now >= t)
}

/// A boss encounter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub kind: BossKind,
    pub body: Combatant,
    pub state: BossState,
    /// Player position seen on the last update
    pub target: Option<Vec2>,
}

/// Stat multiplier for bosses spawned in `wave`
pub fn boss_difficulty_scale(wave: u32) -> f32 {
    (1.0 + wave.saturating_sub(1) as f32 * 0.15).min(4.0)
}

/// Boss waves come every fifth wave
pub fn is_boss_wave(wave: u32) -> bool {
    wave > 0 && wave % crate::consts::BOSS_WAVE_INTERVAL == 0
}

impl Boss {
    /// Spawn the chassis for `wave` just above the arena
    pub fn for_wave(wave: u32) -> Self {
        Self::new(Vec2::new(350.0, -100.0), wave, BossKind::for_wave(wave))
    }

    pub fn new(pos: Vec2, wave: u32, kind: BossKind) -> Self {
        let config = kind.config();
        let scale = boss_difficulty_scale(wave);
        let max_health = (config.health * scale).floor();

        let mut phase_health: Vec<f32> = (1..config.phases)
            .map(|i| max_health * (1.0 - i as f32 / config.phases as f32))
            .collect();
        phase_health.push(0.0);

        Self {
            kind,
            body: Combatant {
                pos,
                vel: Vec2::ZERO,
                size: config.size,
                rotation: std::f32::consts::FRAC_PI_2,
                health: max_health,
                max_health,
                speed: config.speed,
                attack_damage: (config.damage * scale).floor(),
                attack_cooldown: config.cooldown,
                last_attack: None,
                last_shot: None,
                color: config.color,
                experience_value: (500.0 * scale).floor(),
                score_value: (5000.0 * scale).floor(),
            },
            state: BossState {
                phase: 1,
                max_phases: config.phases,
                phase_health,
                patterns: patterns_for_phase(1),
                current_pattern: AttackPattern::Basic,
                pattern_timer: 0.0,
                pattern_duration: 2000.0,
                enraged: false,
                shield_active: false,
                shield_until: None,
                shield_ready_at: None,
                teleport_ready_at: None,
                death_timer: None,
            },
            target: None,
        }
    }

    pub fn phase(&self) -> u32 {
        self.state.phase
    }

    pub fn is_dying(&self) -> bool {
        self.state.death_timer.is_some()
    }

    /// Removable only once the death animation has fully played
    pub fn is_dead(&self) -> bool {
        self.state
            .death_timer
            .is_some_and(|t| t >= BOSS_DEATH_DURATION)
    }

    /// Advance one frame. While dying only the death timer moves.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        player_pos: Vec2,
        now: Timestamp,
        rng: &mut R,
    ) {
        if let Some(timer) = self.state.death_timer.as_mut() {
            *timer += dt;
            return;
        }

        self.target = Some(player_pos);
        self.body.rotation = std::f32::consts::FRAC_PI_2;
        self.body.vel = direction_to(self.body.pos, player_pos) * self.body.speed;
        self.body.integrate(dt);

        self.check_phase_transition();
        self.update_attack_pattern(dt, rng);

        if self.state.shield_active && self.state.shield_until.is_some_and(|t| now >= t) {
            self.state.shield_active = false;
            self.state.shield_until = None;
        }

        if self.state.phase >= 3
            && ready(self.state.teleport_ready_at, now)
            && rng.random::<f32>() < TELEPORT_CHANCE
        {
            self.teleport(now, rng);
        }

        if self.state.phase >= 2
            && ready(self.state.shield_ready_at, now)
            && rng.random::<f32>() < SHIELD_CHANCE
        {
            self.activate_shield(now);
        }
    }

    /// Enter the next phase if health crossed its breakpoint; at most one step per call
    fn check_phase_transition(&mut self) -> bool {
        let state = &self.state;
        let crossed = state
            .phase_health
            .iter()
            .enumerate()
            .find(|&(i, &threshold)| {
                self.body.health <= threshold && state.phase == i as u32 + 1
            })
            .map(|(i, _)| i as u32 + 2);

        match crossed {
            Some(next) if next <= self.state.max_phases => {
                self.state.phase = next;
                self.on_phase_change();
                true
            }
            _ => false,
        }
    }

    fn on_phase_change(&mut self) {
        let phase = self.state.phase;
        self.state.pattern_timer = 0.0;
        self.state.pattern_duration = (2000.0 - (phase - 1) as f32 * 300.0).max(1000.0);
        self.state.patterns = patterns_for_phase(phase);

        let body = &mut self.body;
        body.health = (body.health + body.max_health * 0.1).min(body.max_health);
        body.speed *= 1.2;
        body.attack_cooldown = (body.attack_cooldown * 0.8).max(80.0);
        body.attack_damage *= 1.15;

        if phase + 1 >= self.state.max_phases {
            self.state.enraged = true;
        }
        log::info!(
            "Boss {} entered phase {}/{}",
            self.kind.as_str(),
            phase,
            self.state.max_phases
        );
    }

    fn update_attack_pattern<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        self.state.pattern_timer += dt * 1000.0;
        if self.state.pattern_timer >= self.state.pattern_duration {
            self.state.pattern_timer = 0.0;
            self.select_new_pattern(rng);
        }
    }

    /// Uniform pick from the unlocked pool, never repeating the current one
    /// unless it is the only choice
    pub fn select_new_pattern<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let pool = &self.state.patterns;
        if pool.is_empty() {
            return;
        }
        loop {
            let pick = pool[rng.random_range(0..pool.len())];
            if pick != self.state.current_pattern || pool.len() == 1 {
                self.state.current_pattern = pick;
                return;
            }
        }
    }

    fn teleport<R: Rng + ?Sized>(&mut self, now: Timestamp, rng: &mut R) {
        self.body.pos = Vec2::new(
            random_between(rng, 100.0, 700.0),
            random_between(rng, 50.0, 200.0),
        );
        self.state.teleport_ready_at = Some(now.after(TELEPORT_COOLDOWN_MS));
    }

    fn activate_shield(&mut self, now: Timestamp) {
        self.state.shield_active = true;
        self.state.shield_until = Some(now.after(SHIELD_DURATION_MS));
        self.state.shield_ready_at = Some(now.after(SHIELD_COOLDOWN_MS));
    }

    /// Shielded hits are cut by 70%. Reaching zero latches the death animation.
    pub fn take_damage(&mut self, amount: f32) {
        if self.is_dying() {
            return;
        }
        let amount = if self.state.shield_active {
            amount * SHIELD_DAMAGE_FACTOR
        } else {
            amount
        };
        self.body.apply_damage(amount);
        if self.body.is_depleted() {
            self.state.death_timer = Some(0.0);
            log::info!("Boss {} destroyed", self.kind.as_str());
        }
    }

    /// Fire the current pattern if the shot cooldown allows it
    pub fn fire<R: Rng + ?Sized>(&mut self, now: Timestamp, rng: &mut R) -> Option<Volley> {
        if self.is_dying() || !self.body.shoot(now) {
            return None;
        }
        let pattern = self.state.current_pattern;
        Some(Volley {
            pattern,
            bullets: self.pattern_bullets(pattern, now, rng),
        })
    }

    /// Bullet layout for `pattern` from the current state
    pub fn pattern_bullets<R: Rng + ?Sized>(
        &self,
        pattern: AttackPattern,
        now: Timestamp,
        rng: &mut R,
    ) -> Vec<BulletSpec> {
        let origin = self.body.pos;
        let damage = self.body.attack_damage;
        let phase = self.state.phase;
        let spec = |pos: Vec2, vel: Vec2, mult: f32, size: f32, color: u32| BulletSpec {
            pos,
            vel,
            damage: damage * mult,
            size,
            color,
            homing_target: None,
        };

        match pattern {
            AttackPattern::Basic => {
                let Some(target) = self.target else {
                    return Vec::new();
                };
                let aim = direction_to(origin, target);
                let base = aim.y.atan2(aim.x);
                let count = phase * 2;
                let spread = if count > 1 { 0.3 } else { 0.0 };
                (0..count)
                    .map(|i| {
                        let angle = base + (i as f32 - (count - 1) as f32 / 2.0) * spread;
                        spec(origin, vec_from_angle(angle, 450.0), 1.0, 12.0, self.body.color)
                    })
                    .collect()
            }
            AttackPattern::Spiral => {
                let count = 16 + phase * 4;
                let rotation = (now.millis() * 0.01) as f32;
                (0..count)
                    .map(|i| {
                        let angle = TAU * i as f32 / count as f32 + rotation;
                        spec(origin, vec_from_angle(angle, 400.0), 0.8, 10.0, 0xFF6B6B)
                    })
                    .collect()
            }
            AttackPattern::Burst => {
                let count = 20 + phase * 6;
                (0..count)
                    .map(|i| {
                        let angle = TAU * i as f32 / count as f32;
                        spec(origin, vec_from_angle(angle, 500.0), 0.7, 11.0, 0xFF4500)
                    })
                    .collect()
            }
            AttackPattern::Charge => {
                let Some(target) = self.target else {
                    return Vec::new();
                };
                let aim = direction_to(origin, target);
                (0..phase + 1)
                    .map(|i| {
                        let offset = i as f32 * 0.2;
                        let vel = Vec2::new(aim.x + offset.sin(), aim.y + offset.cos()) * 800.0;
                        spec(origin, vel, 3.0, 18.0, 0xFFD700)
                    })
                    .collect()
            }
            AttackPattern::Rain => {
                let count = 40 + phase * 10;
                (0..count)
                    .map(|_| {
                        let pos = Vec2::new(random_between(rng, 0.0, 800.0), -50.0);
                        let vel = Vec2::new(
                            random_between(rng, -150.0, 150.0),
                            random_between(rng, 350.0, 550.0),
                        );
                        spec(pos, vel, 0.6, 8.0, 0x9370DB)
                    })
                    .collect()
            }
            AttackPattern::Laser => {
                let Some(target) = self.target else {
                    return Vec::new();
                };
                let aim = direction_to(origin, target);
                (0..12)
                    .map(|i| {
                        let pos = origin + aim * (i as f32 * 25.0);
                        spec(pos, aim * 900.0, 2.0, 15.0, 0x00FFFF)
                    })
                    .collect()
            }
            AttackPattern::Homing => {
                let Some(target) = self.target else {
                    return Vec::new();
                };
                let count = 8 + phase * 2;
                (0..count)
                    .map(|i| {
                        let angle = TAU * i as f32 / count as f32;
                        BulletSpec {
                            homing_target: Some(target),
                            ..spec(origin, vec_from_angle(angle, 250.0), 1.5, 12.0, 0xFF69B4)
                        }
                    })
                    .collect()
            }
            AttackPattern::Nova => {
                let mut bullets = Vec::with_capacity(36);
                for ring in 0..3 {
                    let speed = 300.0 + ring as f32 * 100.0;
                    for i in 0..12 {
                        let angle = TAU * i as f32 / 12.0 + ring as f32 * 0.2;
                        bullets.push(spec(origin, vec_from_angle(angle, speed), 0.9, 10.0, 0xFF1493));
                    }
                }
                bullets
            }
            AttackPattern::Barrage => {
                let Some(target) = self.target else {
                    return Vec::new();
                };
                let aim = direction_to(origin, target);
                let base = aim.y.atan2(aim.x);
                let mut bullets = Vec::with_capacity(15);
                for salvo in 0..5 {
                    let speed = 600.0 + salvo as f32 * 50.0;
                    for i in 0..3 {
                        let angle = base + (i as f32 - 1.0) * 0.3;
                        bullets.push(spec(origin, vec_from_angle(angle, speed), 1.2, 13.0, 0xDC143C));
                    }
                }
                bullets
            }
        }
    }
}
