//! Collectible pickups and the weapon catalog

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::player::{Player, PowerUpKind, Weapon};
use super::timer::Timestamp;
use crate::random_between;

/// Every kind of pickup that can appear on the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickupKind {
    Health,
    Ammo,
    Experience,
    Coin,
    Shield,
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
    Weapon,
}

impl PickupKind {
    pub const ALL: [PickupKind; 16] = [
        PickupKind::Health,
        PickupKind::Ammo,
        PickupKind::Experience,
        PickupKind::Coin,
        PickupKind::Shield,
        PickupKind::SpeedBoost,
        PickupKind::DamageBoost,
        PickupKind::RapidFire,
        PickupKind::MultiShot,
        PickupKind::Invincibility,
        PickupKind::ShieldRegen,
        PickupKind::HealthRegen,
        PickupKind::DoubleCoins,
        PickupKind::ExplosiveRounds,
        PickupKind::PiercingRounds,
        PickupKind::Weapon,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PickupKind::Health => "health",
            PickupKind::Ammo => "ammo",
            PickupKind::Experience => "experience",
            PickupKind::Coin => "coin",
            PickupKind::Shield => "shield",
            PickupKind::SpeedBoost => "speed_boost",
            PickupKind::DamageBoost => "damage_boost",
            PickupKind::RapidFire => "rapid_fire",
            PickupKind::MultiShot => "multi_shot",
            PickupKind::Invincibility => "invincibility",
            PickupKind::ShieldRegen => "shield_regen",
            PickupKind::HealthRegen => "health_regen",
            PickupKind::DoubleCoins => "double_coins",
            PickupKind::ExplosiveRounds => "explosive_rounds",
            PickupKind::PiercingRounds => "piercing_rounds",
            PickupKind::Weapon => "weapon",
        }
    }

    /// Unknown names become `Coin`
    pub fn from_name(s: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s.to_lowercase())
            .unwrap_or(PickupKind::Coin)
    }

    /// The timed buff this pickup grants, if any
    pub fn power_up(&self) -> Option<PowerUpKind> {
        match self {
            PickupKind::SpeedBoost => Some(PowerUpKind::SpeedBoost),
            PickupKind::DamageBoost => Some(PowerUpKind::DamageBoost),
            PickupKind::RapidFire => Some(PowerUpKind::RapidFire),
            PickupKind::MultiShot => Some(PowerUpKind::MultiShot),
            PickupKind::Invincibility => Some(PowerUpKind::Invincibility),
            PickupKind::ShieldRegen => Some(PowerUpKind::ShieldRegen),
            PickupKind::HealthRegen => Some(PowerUpKind::HealthRegen),
            PickupKind::DoubleCoins => Some(PowerUpKind::DoubleCoins),
            PickupKind::ExplosiveRounds => Some(PowerUpKind::ExplosiveRounds),
            PickupKind::PiercingRounds => Some(PowerUpKind::PiercingRounds),
            PickupKind::Health
            | PickupKind::Ammo
            | PickupKind::Experience
            | PickupKind::Coin
            | PickupKind::Shield
            | PickupKind::Weapon => None,
        }
    }

    /// (value, color, size, lifetime seconds). Coin value is rolled at spawn.
    fn profile(&self) -> (f32, u32, f32, f32) {
        match self {
            PickupKind::Health => (60.0, 0x44FF44, 12.0, 40.0),
            PickupKind::Ammo => (50.0, 0xFFD700, 10.0, 40.0),
            PickupKind::Experience => (80.0, 0x00FFFF, 9.0, 35.0),
            PickupKind::Coin => (15.0, 0xFFD700, 8.0, 45.0),
            PickupKind::Shield => (80.0, 0x00BFFF, 14.0, 30.0),
            PickupKind::SpeedBoost => (15.0, 0xFF69B4, 11.0, 35.0),
            PickupKind::DamageBoost => (20.0, 0xFF4500, 12.0, 35.0),
            PickupKind::RapidFire => (18.0, 0xADFF2F, 11.0, 35.0),
            PickupKind::MultiShot => (25.0, 0x9370DB, 13.0, 40.0),
            PickupKind::Invincibility => (8.0, 0xFFD700, 16.0, 25.0),
            PickupKind::ShieldRegen => (12.0, 0x00CED1, 13.0, 30.0),
            PickupKind::HealthRegen => (10.0, 0x32CD32, 12.0, 30.0),
            PickupKind::DoubleCoins => (20.0, 0xDAA520, 14.0, 35.0),
            PickupKind::ExplosiveRounds => (15.0, 0xFF6347, 13.0, 30.0),
            PickupKind::PiercingRounds => (18.0, 0x4169E1, 12.0, 35.0),
            PickupKind::Weapon => (0.0, 0xFFFFFF, 16.0, 60.0),
        }
    }
}

/// What collecting a pickup did, for effects and sound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupOutcome {
    /// Instant resource (health, ammo, coins...)
    Resource,
    /// Timed buff started
    PowerUp(PowerUpKind),
    /// New weapon equipped
    Weapon,
    /// Experience crossed a level threshold
    LevelUp,
}

/// A collectible lying on the field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub kind: PickupKind,
    /// Center
    pub pos: Vec2,
    /// Amount granted; seconds for timed kinds
    pub value: f32,
    pub color: u32,
    /// Nominal diameter; collection uses twice this
    pub size: f32,
    /// Seconds left before it vanishes
    pub lifetime: f32,
    pub weapon: Option<Weapon>,
}

impl Pickup {
    pub fn new<R: Rng + ?Sized>(kind: PickupKind, pos: Vec2, wave: u32, rng: &mut R) -> Self {
        let (mut value, mut color, size, lifetime) = kind.profile();
        let mut weapon = None;
        match kind {
            PickupKind::Coin => value = random_between(rng, 15.0, 35.0),
            PickupKind::Weapon => {
                let w = weapon_pickup(weapon_tier_for_wave(wave), rng);
                color = w.color;
                weapon = Some(w);
            }
            _ => {}
        }
        Self {
            kind,
            pos,
            value,
            color,
            size,
            lifetime,
            weapon,
        }
    }

    /// Tick the lifetime; false once expired
    pub fn update(&mut self, dt: f32) -> bool {
        self.lifetime -= dt;
        self.lifetime > 0.0
    }

    /// Grant this pickup's effect to the player
    pub fn apply_to(&self, player: &mut Player, now: Timestamp) -> PickupOutcome {
        if let Some(power_up) = self.kind.power_up() {
            player.add_power_up(power_up, self.value, now);
            return PickupOutcome::PowerUp(power_up);
        }
        match self.kind {
            PickupKind::Health => player.heal(self.value),
            PickupKind::Ammo => player.add_ammo(self.value as u32),
            PickupKind::Experience => {
                if player.add_experience(self.value) {
                    return PickupOutcome::LevelUp;
                }
            }
            PickupKind::Coin => player.add_coins(self.value),
            PickupKind::Shield => player.add_shield(self.value),
            PickupKind::Weapon => {
                if let Some(weapon) = &self.weapon {
                    player.equip_weapon(weapon.clone());
                    return PickupOutcome::Weapon;
                }
            }
            _ => {}
        }
        PickupOutcome::Resource
    }
}

/// Weapon tier offered by pickups on `wave`
pub fn weapon_tier_for_wave(wave: u32) -> u8 {
    (wave / 3 + 1).min(3) as u8
}

/// Every weapon that can drop, across tiers 1..=3
pub fn weapon_catalog() -> Vec<Weapon> {
    let entry = |name: &str, damage, fire_rate, speed, count, ammo: u32, reload, color, tier| Weapon {
        name: name.to_string(),
        damage,
        fire_rate,
        bullet_speed: speed,
        bullet_count: count,
        spread: 0.0,
        ammo,
        max_ammo: ammo,
        reload_time: reload,
        color,
        tier,
    };
    vec![
        entry("Plasma Storm Cannon", 150.0, 180.0, 950.0, 1, 45, 1200.0, 0xFF6B6B, 1),
        entry("Twin Quantum Blaster", 110.0, 140.0, 900.0, 2, 50, 1400.0, 0x4ECDC4, 1),
        entry("Antimatter Cannon", 220.0, 250.0, 1100.0, 1, 35, 1000.0, 0x9B59B6, 2),
        entry("Triple Burst Laser", 140.0, 120.0, 950.0, 3, 42, 1300.0, 0xE74C3C, 2),
        entry("Quantum Annihilator", 350.0, 300.0, 1300.0, 1, 30, 800.0, 0xF1C40F, 3),
        entry("Pentuple Plasma Array", 120.0, 100.0, 900.0, 5, 55, 1600.0, 0xE67E22, 3),
    ]
}

/// A uniformly chosen weapon of `tier` (clamped into the catalog range)
pub fn weapon_pickup<R: Rng + ?Sized>(tier: u8, rng: &mut R) -> Weapon {
    let tier = tier.clamp(1, 3);
    let mut options: Vec<Weapon> = weapon_catalog()
        .into_iter()
        .filter(|w| w.tier == tier)
        .collect();
    let index = rng.random_range(0..options.len());
    options.swap_remove(index)
}

/// Drop-chance roll for a defeated enemy
pub fn should_drop<R: Rng + ?Sized>(chance: f32, rng: &mut R) -> bool {
    rng.random::<f32>() < chance
}

fn pickup_weights(wave: u32) -> Vec<(PickupKind, f32)> {
    use PickupKind::*;
    let mut table = vec![
        (Health, 0.15),
        (Ammo, 0.20),
        (Experience, 0.12),
        (Coin, 0.10),
        (Shield, 0.08),
        (SpeedBoost, 0.07),
        (DamageBoost, 0.06),
        (RapidFire, 0.05),
        (MultiShot, 0.04),
        (Invincibility, 0.03),
        (ShieldRegen, 0.04),
        (HealthRegen, 0.03),
        (DoubleCoins, 0.02),
        (ExplosiveRounds, 0.02),
        (PiercingRounds, 0.02),
        (Weapon, (0.03 + wave as f32 * 0.015).min(0.20)),
    ];

    let mut bump = |kind: PickupKind, amount: f32| {
        if let Some(entry) = table.iter_mut().find(|(k, _)| *k == kind) {
            entry.1 += amount;
        }
    };
    if wave >= 3 {
        for kind in [Shield, SpeedBoost, DamageBoost, ShieldRegen] {
            bump(kind, 0.02);
        }
    }
    if wave >= 6 {
        bump(RapidFire, 0.03);
        for kind in [MultiShot, Invincibility, ExplosiveRounds, PiercingRounds] {
            bump(kind, 0.02);
        }
    }
    if wave >= 10 {
        bump(DoubleCoins, 0.03);
        bump(HealthRegen, 0.02);
    }
    table
}

/// Weighted draw over the wave's pickup table, falling back to `Coin`
pub fn random_pickup_kind<R: Rng + ?Sized>(wave: u32, rng: &mut R) -> PickupKind {
    let roll: f32 = rng.random();
    let mut cumulative = 0.0;
    for (kind, weight) in pickup_weights(wave) {
        cumulative += weight;
        if roll <= cumulative {
            return kind;
        }
    }
    PickupKind::Coin
}
