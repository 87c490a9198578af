//! Player ship: movement, weapon, shield/health and timed power-ups

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::timer::{Timestamp, cooldown_elapsed};
use crate::consts::*;

/// Timed buffs a pickup can grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    SpeedBoost,
    DamageBoost,
    RapidFire,
    MultiShot,
    Invincibility,
    ShieldRegen,
    HealthRegen,
    DoubleCoins,
    ExplosiveRounds,
    PiercingRounds,
}

/// An active power-up. Expires `duration` seconds after `started`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    /// Seconds
    pub duration: f32,
    /// Wall-clock activation time
    pub started: Timestamp,
}

impl PowerUp {
    /// Seconds left at `now` (0 once expired)
    pub fn remaining(&self, now: Timestamp) -> f32 {
        let elapsed = (now.since(self.started) / 1000.0) as f32;
        (self.duration - elapsed).max(0.0)
    }

    pub fn expired(&self, now: Timestamp) -> bool {
        (now.since(self.started) / 1000.0) as f32 >= self.duration
    }
}

/// A weapon loadout. The player holds exactly one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    pub damage: f32,
    /// Milliseconds between shots
    pub fire_rate: f32,
    pub bullet_speed: f32,
    pub bullet_count: u32,
    /// Radians between adjacent bullets of one volley
    pub spread: f32,
    pub ammo: u32,
    pub max_ammo: u32,
    /// Milliseconds
    pub reload_time: f32,
    pub color: u32,
    pub tier: u8,
}

impl Weapon {
    /// The innate weapon every run starts with
    pub fn starter() -> Self {
        Self {
            name: "Quantum Pulse Cannon".to_string(),
            damage: 120.0,
            fire_rate: 200.0,
            bullet_speed: 900.0,
            bullet_count: 1,
            spread: 0.0,
            ammo: 40,
            max_ammo: 40,
            reload_time: 1400.0,
            color: 0x00FFFF,
            tier: 0,
        }
    }
}

/// Cumulative per-run statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub kills: u32,
    /// Percentage of fired volleys that hit something
    pub accuracy: f32,
    pub shots_fired: u32,
    pub shots_hit: u32,
    pub coins_collected: f32,
    pub rooms_cleared: u32,
}

/// The player ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner of the ship's box
    pub pos: Vec2,
    pub vel: Vec2,
    /// Box edge length, also used as collision diameter
    pub size: f32,
    /// Always straight up; shots never aim
    pub rotation: f32,
    pub health: f32,
    pub max_health: f32,
    pub shield: f32,
    pub max_shield: f32,
    pub speed: f32,
    pub base_speed: f32,
    pub weapon: Weapon,
    pub last_shot: Option<Timestamp>,
    /// Heavy secondary shot has its own cooldown
    pub last_alternate_shot: Option<Timestamp>,
    /// Set while a reload is in progress (wall-clock start)
    pub reload_started: Option<Timestamp>,
    pub experience: f32,
    pub level: u32,
    pub coins: f32,
    pub stats: PlayerStats,
    pub power_ups: Vec<PowerUp>,
}

impl Default for Player {
    fn default() -> Self {
        Self::new(Vec2::new(PLAYER_START_X, PLAYER_START_Y))
    }
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size: PLAYER_SIZE,
            rotation: -std::f32::consts::FRAC_PI_2,
            health: 200.0,
            max_health: 200.0,
            shield: 100.0,
            max_shield: 100.0,
            speed: 280.0,
            base_speed: 280.0,
            weapon: Weapon::starter(),
            last_shot: None,
            last_alternate_shot: None,
            reload_started: None,
            experience: 0.0,
            level: 1,
            coins: 0.0,
            stats: PlayerStats::default(),
            power_ups: Vec::new(),
        }
    }

    /// Advance one frame: finish reloads, apply power-ups, move within `arena`
    pub fn update(&mut self, dt: f32, movement: Vec2, arena: Vec2, now: Timestamp) {
        if let Some(started) = self.reload_started {
            if now.since(started) >= self.weapon.reload_time as f64 {
                self.weapon.ammo = self.weapon.max_ammo;
                self.reload_started = None;
            }
        }

        self.update_power_ups(dt, now);

        self.vel = if movement != Vec2::ZERO {
            movement.normalize_or_zero() * self.speed
        } else {
            Vec2::ZERO
        };
        self.pos += self.vel * dt;
        self.rotation = -std::f32::consts::FRAC_PI_2;

        self.pos.x = self.pos.x.clamp(0.0, (arena.x - self.size).max(0.0));
        self.pos.y = self.pos.y.clamp(0.0, (arena.y - self.size).max(0.0));

        if self.stats.shots_fired > 0 {
            self.stats.accuracy =
                self.stats.shots_hit as f32 / self.stats.shots_fired as f32 * 100.0;
        }
    }

    fn update_power_ups(&mut self, dt: f32, now: Timestamp) {
        self.speed = self.base_speed;
        self.power_ups.retain(|p| !p.expired(now));

        for power_up in &self.power_ups {
            match power_up.kind {
                PowerUpKind::SpeedBoost => self.speed = self.base_speed * 1.8,
                PowerUpKind::ShieldRegen => {
                    self.shield = (self.shield + 20.0 * dt).min(self.max_shield);
                }
                PowerUpKind::HealthRegen => {
                    self.health = (self.health + 15.0 * dt).min(self.max_health);
                }
                // Read on demand by the weapon/damage queries
                PowerUpKind::DamageBoost
                | PowerUpKind::RapidFire
                | PowerUpKind::MultiShot
                | PowerUpKind::Invincibility => {}
                // Carried for display only
                PowerUpKind::DoubleCoins
                | PowerUpKind::ExplosiveRounds
                | PowerUpKind::PiercingRounds => {}
            }
        }
    }

    pub fn is_reloading(&self) -> bool {
        self.reload_started.is_some()
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Effective milliseconds between shots
    pub fn fire_rate(&self) -> f32 {
        let rate = self.weapon.fire_rate;
        if self.has_power_up(PowerUpKind::RapidFire) {
            (rate * 0.5).max(50.0)
        } else {
            rate
        }
    }

    /// Effective per-bullet damage
    pub fn weapon_damage(&self) -> f32 {
        let mut damage = self.weapon.damage;
        if self.has_power_up(PowerUpKind::DamageBoost) {
            damage *= 2.5;
        }
        damage + self.level as f32 * 15.0
    }

    /// Effective bullets per volley
    pub fn bullet_count(&self) -> u32 {
        let count = self.weapon.bullet_count;
        if self.has_power_up(PowerUpKind::MultiShot) {
            (count * 3).max(5)
        } else {
            count
        }
    }

    pub fn can_shoot(&self, now: Timestamp) -> bool {
        !self.is_reloading()
            && cooldown_elapsed(self.last_shot, now, self.fire_rate() as f64)
            && self.weapon.ammo > 0
    }

    /// Spend one round. Auto-reloads on the last one.
    pub fn shoot(&mut self, now: Timestamp) -> bool {
        if !self.can_shoot(now) {
            return false;
        }
        self.last_shot = Some(now);
        self.weapon.ammo -= 1;
        self.stats.shots_fired += 1;
        if self.weapon.ammo == 0 {
            self.reload(now);
        }
        true
    }

    /// Heavy shot: 1.5x the base fire interval, two rounds
    pub fn can_alternate_shoot(&self, now: Timestamp) -> bool {
        let cooldown = self.weapon.fire_rate as f64 * 1.5;
        !self.is_reloading()
            && cooldown_elapsed(self.last_alternate_shot, now, cooldown)
            && self.weapon.ammo >= 2
    }

    /// Spend two rounds on a heavy shot. Reloads once one round or less is left.
    pub fn alternate_shoot(&mut self, now: Timestamp) -> bool {
        if !self.can_alternate_shoot(now) {
            return false;
        }
        self.last_alternate_shot = Some(now);
        self.weapon.ammo -= 2;
        self.stats.shots_fired += 1;
        if self.weapon.ammo <= 1 {
            self.reload(now);
        }
        true
    }

    /// Heavy shot damage: 2.5x weapon damage, boosted like the main gun,
    /// plus a steeper per-level bonus
    pub fn alternate_weapon_damage(&self) -> f32 {
        let mut damage = self.weapon.damage * 2.5;
        if self.has_power_up(PowerUpKind::DamageBoost) {
            damage *= 2.5;
        }
        damage + self.level as f32 * 25.0
    }

    /// Muzzle point (center of the nose)
    pub fn muzzle(&self) -> Vec2 {
        Vec2::new(self.pos.x + self.size / 2.0, self.pos.y)
    }

    /// Middle of the ship's box; what enemies chase and bullets hit
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size / 2.0)
    }

    /// Velocities for one volley, fanned symmetrically around straight up
    pub fn volley_velocities(&self) -> Vec<Vec2> {
        let count = self.bullet_count();
        let spread = self.weapon.spread;
        (0..count)
            .map(|i| {
                let mut angle = -std::f32::consts::FRAC_PI_2;
                if count > 1 {
                    angle += (i as f32 - (count - 1) as f32 / 2.0) * spread;
                }
                crate::vec_from_angle(angle, self.weapon.bullet_speed)
            })
            .collect()
    }

    pub fn can_reload(&self) -> bool {
        !self.is_reloading() && self.weapon.ammo < self.weapon.max_ammo
    }

    pub fn reload(&mut self, now: Timestamp) -> bool {
        if !self.can_reload() {
            return false;
        }
        self.reload_started = Some(now);
        true
    }

    /// Reload completion in `[0, 1]` (1 when not reloading)
    pub fn reload_progress(&self, now: Timestamp) -> f32 {
        match self.reload_started {
            Some(started) => {
                (now.since(started) / self.weapon.reload_time as f64).min(1.0) as f32
            }
            None => 1.0,
        }
    }

    /// Shield soaks first, the remainder comes off health
    pub fn take_damage(&mut self, amount: f32) {
        if self.has_power_up(PowerUpKind::Invincibility) || amount <= 0.0 {
            return;
        }
        let mut remaining = amount;
        if self.shield > 0.0 {
            let absorbed = remaining.min(self.shield);
            self.shield -= absorbed;
            remaining -= absorbed;
        }
        if remaining > 0.0 {
            self.health = (self.health - remaining).max(0.0);
        }
    }

    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    pub fn add_shield(&mut self, amount: f32) {
        self.shield = (self.shield + amount).min(self.max_shield);
    }

    pub fn add_ammo(&mut self, amount: u32) {
        self.weapon.ammo = (self.weapon.ammo + amount).min(self.weapon.max_ammo);
    }

    pub fn add_coins(&mut self, amount: f32) {
        self.coins += amount;
        self.stats.coins_collected += amount;
    }

    /// Returns true when this addition triggered a level up.
    /// At most one level is gained per call.
    pub fn add_experience(&mut self, amount: f32) -> bool {
        self.experience += amount;
        if self.experience >= self.level as f32 * 150.0 {
            self.level_up();
            true
        } else {
            false
        }
    }

    /// Activate a power-up, replacing any running one of the same kind
    pub fn add_power_up(&mut self, kind: PowerUpKind, duration: f32, now: Timestamp) {
        self.power_ups.retain(|p| p.kind != kind);
        self.power_ups.push(PowerUp {
            kind,
            duration,
            started: now,
        });
    }

    pub fn has_power_up(&self, kind: PowerUpKind) -> bool {
        self.power_ups.iter().any(|p| p.kind == kind)
    }

    pub fn power_up_time_remaining(&self, kind: PowerUpKind, now: Timestamp) -> f32 {
        self.power_ups
            .iter()
            .find(|p| p.kind == kind)
            .map(|p| p.remaining(now))
            .unwrap_or(0.0)
    }

    pub fn level_up(&mut self) {
        self.level += 1;
        self.experience = 0.0;
        self.max_health += 40.0;
        self.health = self.max_health;
        self.base_speed += 12.0;
        self.speed = self.base_speed;
        self.max_shield += 30.0;
        self.shield = self.max_shield;
        self.upgrade_weapon();
        log::info!("Level up! Now level {}", self.level);
    }

    fn upgrade_weapon(&mut self) {
        let weapon = &mut self.weapon;
        weapon.damage += 30.0;
        weapon.fire_rate = (weapon.fire_rate - 40.0).max(80.0);
        weapon.max_ammo += 10;
        weapon.ammo = weapon.max_ammo;
        weapon.bullet_speed += 100.0;

        let rename = match self.level {
            5 => Some(("Plasma Storm Cannon", 0xFF00FF)),
            10 => Some(("Antimatter Destroyer", 0xFFD700)),
            15 => Some(("Quantum Annihilator", 0xFF4500)),
            _ => None,
        };
        if let Some((name, color)) = rename {
            weapon.name = name.to_string();
            weapon.color = color;
        }
    }

    /// Swap in a new weapon. Ammo carries over only for the same model.
    pub fn equip_weapon(&mut self, mut weapon: Weapon) {
        if self.weapon.name == weapon.name {
            weapon.ammo = (self.weapon.ammo + weapon.ammo).min(weapon.max_ammo);
        }
        weapon.ammo = weapon.ammo.min(weapon.max_ammo);
        self.weapon = weapon;
        self.reload_started = None;
    }

    pub fn health_ratio(&self) -> f32 {
        if self.max_health > 0.0 {
            self.health / self.max_health
        } else {
            0.0
        }
    }

    pub fn shield_ratio(&self) -> f32 {
        if self.max_shield > 0.0 {
            self.shield / self.max_shield
        } else {
            0.0
        }
    }
}
