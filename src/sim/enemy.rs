//! Enemy ships and the combat core they share with bosses

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::timer::{Timestamp, cooldown_elapsed};
use crate::direction_to;

/// Enemy archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnemyKind {
    #[default]
    Basic,
    Scout,
    Soldier,
    Heavy,
    Sniper,
}

/// Base stat line for an archetype (before difficulty scaling)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub health: f32,
    pub speed: f32,
    pub attack_damage: f32,
    /// Milliseconds
    pub attack_cooldown: f32,
    pub color: u32,
    pub size: f32,
    pub experience: f32,
    pub score: f32,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 5] = [
        EnemyKind::Basic,
        EnemyKind::Scout,
        EnemyKind::Soldier,
        EnemyKind::Heavy,
        EnemyKind::Sniper,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::Basic => "basic",
            EnemyKind::Scout => "scout",
            EnemyKind::Soldier => "soldier",
            EnemyKind::Heavy => "heavy",
            EnemyKind::Sniper => "sniper",
        }
    }

    /// Unknown names fall back to `Basic`
    pub fn from_name(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "scout" => EnemyKind::Scout,
            "soldier" => EnemyKind::Soldier,
            "heavy" => EnemyKind::Heavy,
            "sniper" => EnemyKind::Sniper,
            _ => EnemyKind::Basic,
        }
    }

    pub fn base_stats(&self) -> EnemyStats {
        match self {
            EnemyKind::Scout => EnemyStats {
                health: 30.0,
                speed: 85.0,
                attack_damage: 12.0,
                attack_cooldown: 1000.0,
                color: 0xFF6B6B,
                size: 18.0,
                experience: 15.0,
                score: 30.0,
            },
            EnemyKind::Soldier => EnemyStats {
                health: 50.0,
                speed: 70.0,
                attack_damage: 18.0,
                attack_cooldown: 800.0,
                color: 0x4ECDC4,
                size: 20.0,
                experience: 20.0,
                score: 60.0,
            },
            EnemyKind::Heavy => EnemyStats {
                health: 90.0,
                speed: 55.0,
                attack_damage: 28.0,
                attack_cooldown: 1200.0,
                color: 0x9B59B6,
                size: 26.0,
                experience: 30.0,
                score: 120.0,
            },
            EnemyKind::Sniper => EnemyStats {
                health: 40.0,
                speed: 60.0,
                attack_damage: 25.0,
                attack_cooldown: 1500.0,
                color: 0xE74C3C,
                size: 19.0,
                experience: 25.0,
                score: 100.0,
            },
            EnemyKind::Basic => EnemyStats {
                health: 40.0,
                speed: 75.0,
                attack_damage: 15.0,
                attack_cooldown: 900.0,
                color: 0xFF8E53,
                size: 20.0,
                experience: 18.0,
                score: 50.0,
            },
        }
    }

    /// Chance this archetype leaves a pickup behind
    pub fn drop_chance(&self) -> f32 {
        match self {
            EnemyKind::Basic => 0.65,
            EnemyKind::Scout => 0.60,
            EnemyKind::Soldier => 0.70,
            EnemyKind::Heavy => 0.85,
            EnemyKind::Sniper => 0.75,
        }
    }
}

/// Stat multiplier for regular enemies spawned in `wave`
pub fn difficulty_scale(wave: u32) -> f32 {
    (1.0 + wave.saturating_sub(1) as f32 * 0.12).min(3.0)
}

/// Kinematic and combat state shared by enemies and bosses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combatant {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Collision diameter
    pub size: f32,
    /// Cosmetic heading, always facing down
    pub rotation: f32,
    pub health: f32,
    pub max_health: f32,
    pub speed: f32,
    pub attack_damage: f32,
    /// Milliseconds, gates both contact attacks and shots
    pub attack_cooldown: f32,
    pub last_attack: Option<Timestamp>,
    pub last_shot: Option<Timestamp>,
    pub color: u32,
    pub experience_value: f32,
    pub score_value: f32,
}

/// Enemies may drift this far outside the arena
const ROAM_MIN: Vec2 = Vec2::new(-50.0, -100.0);
const ROAM_MAX: Vec2 = Vec2::new(850.0, 650.0);

impl Combatant {
    /// Move along `vel` and keep within the roaming box
    pub fn integrate(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        self.pos = self.pos.clamp(ROAM_MIN, ROAM_MAX);
    }

    pub fn can_attack(&self, now: Timestamp) -> bool {
        cooldown_elapsed(self.last_attack, now, self.attack_cooldown as f64)
    }

    pub fn can_shoot(&self, now: Timestamp) -> bool {
        cooldown_elapsed(self.last_shot, now, self.attack_cooldown as f64)
    }

    /// Contact attack trigger; true when the cooldown allowed it
    pub fn attack(&mut self, now: Timestamp) -> bool {
        if self.can_attack(now) {
            self.last_attack = Some(now);
            true
        } else {
            false
        }
    }

    /// Ranged attack trigger; true when the cooldown allowed it
    pub fn shoot(&mut self, now: Timestamp) -> bool {
        if self.can_shoot(now) {
            self.last_shot = Some(now);
            true
        } else {
            false
        }
    }

    pub fn apply_damage(&mut self, amount: f32) {
        self.health = (self.health - amount).max(0.0);
    }

    pub fn is_depleted(&self) -> bool {
        self.health <= 0.0
    }

    pub fn health_ratio(&self) -> f32 {
        if self.max_health > 0.0 {
            self.health / self.max_health
        } else {
            0.0
        }
    }
}

/// A regular enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub body: Combatant,
    /// Formation slot assigned at spawn. Movement chases the player instead.
    pub formation_pos: Vec2,
}

impl Enemy {
    pub fn new(pos: Vec2, kind: EnemyKind, wave: u32, formation_pos: Option<Vec2>) -> Self {
        let stats = kind.base_stats();
        let scale = difficulty_scale(wave);
        let health = (stats.health * scale).floor();
        Self {
            kind,
            body: Combatant {
                pos,
                vel: Vec2::ZERO,
                size: stats.size,
                rotation: std::f32::consts::FRAC_PI_2,
                health,
                max_health: health,
                speed: stats.speed,
                attack_damage: (stats.attack_damage * scale).floor(),
                attack_cooldown: stats.attack_cooldown,
                last_attack: None,
                last_shot: None,
                color: stats.color,
                experience_value: (stats.experience * scale).floor(),
                score_value: (stats.score * scale).floor(),
            },
            formation_pos: formation_pos.unwrap_or(pos),
        }
    }

    /// Chase the player with the archetype's movement quirk
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        player_pos: Vec2,
        now: Timestamp,
        rng: &mut R,
    ) {
        self.body.rotation = std::f32::consts::FRAC_PI_2;
        self.body.vel = self.steering(player_pos, now, rng);
        self.body.integrate(dt);
    }

    fn steering<R: Rng + ?Sized>(&self, player_pos: Vec2, now: Timestamp, rng: &mut R) -> Vec2 {
        let mut direction = direction_to(self.body.pos, player_pos);
        let mut speed = self.body.speed;

        match self.kind {
            EnemyKind::Scout => {
                // Erratic weave while pursuing
                let t = now.millis();
                direction += Vec2::new(
                    ((t * 0.005).sin() * 0.3) as f32,
                    ((t * 0.007).cos() * 0.3) as f32,
                );
                direction = direction.normalize_or_zero();
            }
            EnemyKind::Sniper => {
                if self.body.pos.distance(player_pos) < 150.0 {
                    speed *= 0.7;
                    direction += Vec2::new(
                        (rng.random::<f32>() - 0.5) * 0.4,
                        (rng.random::<f32>() - 0.5) * 0.4,
                    );
                    direction = direction.normalize_or_zero();
                }
            }
            EnemyKind::Soldier => speed *= 1.1,
            EnemyKind::Heavy | EnemyKind::Basic => {}
        }

        direction * speed
    }

    pub fn take_damage(&mut self, amount: f32) {
        self.body.apply_damage(amount);
    }

    /// Regular enemies die the moment health runs out
    pub fn is_dead(&self) -> bool {
        self.body.is_depleted()
    }
}

/// Archetype weights by wave; later tiers unlock soldiers, heavies and snipers
fn kind_weights(wave: u32) -> [(EnemyKind, f32); 5] {
    use EnemyKind::*;
    let [b, sc, so, h, sn] = if wave >= 10 {
        [0.2, 0.2, 0.3, 0.2, 0.1]
    } else if wave >= 7 {
        [0.25, 0.25, 0.25, 0.15, 0.1]
    } else if wave >= 5 {
        [0.3, 0.3, 0.25, 0.15, 0.0]
    } else if wave >= 3 {
        [0.4, 0.4, 0.2, 0.0, 0.0]
    } else {
        [0.5, 0.5, 0.0, 0.0, 0.0]
    };
    [(Basic, b), (Scout, sc), (Soldier, so), (Heavy, h), (Sniper, sn)]
}

/// Archetypes available from `wave` onward
pub fn unlocked_kinds(wave: u32) -> Vec<EnemyKind> {
    let mut kinds = vec![EnemyKind::Basic, EnemyKind::Scout];
    if wave >= 3 {
        kinds.push(EnemyKind::Soldier);
    }
    if wave >= 5 {
        kinds.push(EnemyKind::Heavy);
    }
    if wave >= 7 {
        kinds.push(EnemyKind::Sniper);
    }
    kinds
}

/// Weighted draw from the wave's unlocked archetypes
pub fn roll_enemy_kind<R: Rng + ?Sized>(wave: u32, rng: &mut R) -> EnemyKind {
    let unlocked = unlocked_kinds(wave);
    let roll: f32 = rng.random();
    let mut cumulative = 0.0;
    for (kind, weight) in kind_weights(wave) {
        if !unlocked.contains(&kind) {
            continue;
        }
        cumulative += weight;
        if roll <= cumulative {
            return kind;
        }
    }
    EnemyKind::Basic
}

/// Enemies per wave: a capped step function
pub fn enemy_count_for_wave(wave: u32) -> usize {
    match wave {
        0..=2 => 4,
        3..=4 => 5,
        5..=6 => 6,
        7..=8 => 7,
        9..=10 => 9,
        11..=15 => 11,
        _ => (12 + (wave - 15) / 3).min(18) as usize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_heavy_wave_one_stats() {
        let enemy = Enemy::new(Vec2::ZERO, EnemyKind::Heavy, 1, None);
        assert_eq!(enemy.body.health, 90.0);
        assert_eq!(enemy.body.max_health, 90.0);
        assert_eq!(enemy.body.speed, 55.0);
        assert_eq!(enemy.body.attack_damage, 28.0);
        assert_eq!(enemy.formation_pos, Vec2::ZERO);
    }

    #[test]
    fn test_difficulty_scale_caps() {
        assert_eq!(difficulty_scale(1), 1.0);
        assert!((difficulty_scale(6) - 1.6).abs() < 1e-6);
        assert_eq!(difficulty_scale(100), 3.0);
        // Wave 0 is treated like wave 1
        assert_eq!(difficulty_scale(0), 1.0);
    }

    #[test]
    fn test_scaled_stats_are_floored() {
        // Scout at wave 4: 30 * 1.36 = 40.8
        let enemy = Enemy::new(Vec2::ZERO, EnemyKind::Scout, 4, None);
        assert_eq!(enemy.body.health, 40.0);
        assert_eq!(enemy.body.score_value, 40.0);
    }

    #[test]
    fn test_unknown_kind_falls_back_to_basic() {
        assert_eq!(EnemyKind::from_name("dragon"), EnemyKind::Basic);
        assert_eq!(EnemyKind::from_name("Sniper"), EnemyKind::Sniper);
    }

    #[test]
    fn test_enemy_chases_player() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut enemy = Enemy::new(Vec2::new(100.0, 100.0), EnemyKind::Basic, 1, None);
        enemy.update(0.1, Vec2::new(100.0, 300.0), Timestamp::ZERO, &mut rng);
        assert!((enemy.body.vel - Vec2::new(0.0, 75.0)).length() < 1e-4);
        assert!((enemy.body.pos.y - 107.5).abs() < 1e-4);
        assert_eq!(enemy.body.rotation, std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn test_soldier_is_faster() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut enemy = Enemy::new(Vec2::ZERO, EnemyKind::Soldier, 1, None);
        enemy.update(0.01, Vec2::new(300.0, 0.0), Timestamp::ZERO, &mut rng);
        assert!((enemy.body.vel.length() - 77.0).abs() < 1e-3);
    }

    #[test]
    fn test_sniper_slows_when_close() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut enemy = Enemy::new(Vec2::new(100.0, 100.0), EnemyKind::Sniper, 7, None);
        enemy.update(0.01, Vec2::new(100.0, 200.0), Timestamp::ZERO, &mut rng);
        assert!((enemy.body.vel.length() - 42.0).abs() < 1e-3);

        enemy.body.pos = Vec2::new(100.0, 100.0);
        enemy.update(0.01, Vec2::new(100.0, 400.0), Timestamp::ZERO, &mut rng);
        assert!((enemy.body.vel.length() - 60.0).abs() < 1e-3);
    }

    #[test]
    fn test_zero_distance_does_not_nan() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut enemy = Enemy::new(Vec2::new(50.0, 50.0), EnemyKind::Heavy, 1, None);
        enemy.update(0.016, Vec2::new(50.0, 50.0), Timestamp::ZERO, &mut rng);
        assert_eq!(enemy.body.vel, Vec2::ZERO);
        assert!(enemy.body.pos.is_finite());
    }

    #[test]
    fn test_roaming_bounds() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut enemy = Enemy::new(Vec2::new(845.0, 0.0), EnemyKind::Basic, 1, None);
        enemy.update(1.0, Vec2::new(2000.0, 0.0), Timestamp::ZERO, &mut rng);
        assert_eq!(enemy.body.pos.x, 850.0);
    }

    #[test]
    fn test_attack_and_shot_cooldowns_are_independent() {
        let mut enemy = Enemy::new(Vec2::ZERO, EnemyKind::Basic, 1, None);
        let t = Timestamp(10_000.0);
        assert!(enemy.body.attack(t));
        assert!(!enemy.body.attack(t.after(899.0)));
        assert!(enemy.body.shoot(t));
        assert!(enemy.body.attack(t.after(900.0)));
    }

    #[test]
    fn test_damage_and_death() {
        let mut enemy = Enemy::new(Vec2::ZERO, EnemyKind::Basic, 1, None);
        enemy.take_damage(25.0);
        assert!(!enemy.is_dead());
        enemy.take_damage(100.0);
        assert_eq!(enemy.body.health, 0.0);
        assert!(enemy.is_dead());
    }

    #[test]
    fn test_enemy_count_steps() {
        assert_eq!(enemy_count_for_wave(1), 4);
        assert_eq!(enemy_count_for_wave(4), 5);
        assert_eq!(enemy_count_for_wave(9), 9);
        assert_eq!(enemy_count_for_wave(15), 11);
        assert_eq!(enemy_count_for_wave(16), 12);
        assert_eq!(enemy_count_for_wave(21), 14);
        assert_eq!(enemy_count_for_wave(200), 18);
    }

    #[test]
    fn test_kind_roll_respects_unlocks() {
        let mut rng = Pcg32::seed_from_u64(42);
        for _ in 0..500 {
            let kind = roll_enemy_kind(2, &mut rng);
            assert!(matches!(kind, EnemyKind::Basic | EnemyKind::Scout));
        }
        for _ in 0..500 {
            let kind = roll_enemy_kind(5, &mut rng);
            assert_ne!(kind, EnemyKind::Sniper);
        }
        let mut seen_sniper = false;
        for _ in 0..2000 {
            seen_sniper |= roll_enemy_kind(9, &mut rng) == EnemyKind::Sniper;
        }
        assert!(seen_sniper);
    }
}
