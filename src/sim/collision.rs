//! Collision resolution and combat outcomes
//!
//! Runs once per frame after every entity moved. All tests are circle
//! overlaps using each entity's size as its diameter; there is no broad
//! phase, the populations are small. Order matters:
//! 1. player bullets against enemies, then the boss (one target per bullet)
//! 2. enemy and boss bullets against the player
//! 3. body contact, gated by each attacker's own cooldown
//! 4. pickups, which count as twice their nominal size

use glam::Vec2;

use super::boss::Boss;
use super::enemy::Enemy;
use super::pickup::{Pickup, PickupOutcome, random_pickup_kind, should_drop};
use super::projectile::Bullet;
use super::state::GameState;
use super::timer::Timestamp;
use crate::audio::SoundEffect;
use crate::circles_overlap;
use crate::consts::{BOSS_EXPLOSION_PARTICLES, BOSS_PICKUP_DROPS};
use crate::random_between;

/// What a player bullet struck this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletTarget {
    Enemy(usize),
    Boss,
    Miss,
}

/// First target a player bullet overlaps. Enemies are checked before the
/// boss; a dying boss no longer absorbs shots.
pub fn find_bullet_target(bullet: &Bullet, enemies: &[Enemy], boss: Option<&Boss>) -> BulletTarget {
    if let Some(index) = enemies
        .iter()
        .rposition(|e| circles_overlap(bullet.pos, bullet.size, e.body.pos, e.body.size))
    {
        return BulletTarget::Enemy(index);
    }
    match boss {
        Some(b)
            if !b.is_dying()
                && circles_overlap(bullet.pos, bullet.size, b.body.pos, b.body.size) =>
        {
            BulletTarget::Boss
        }
        _ => BulletTarget::Miss,
    }
}

/// Run every collision pass for this frame
pub fn resolve_collisions(state: &mut GameState, now: Timestamp) {
    player_bullets_vs_hostiles(state);
    hostile_bullets_vs_player(state);
    contact_damage(state, now);
    collect_pickups(state, now);
}

fn player_bullets_vs_hostiles(state: &mut GameState) {
    let mut bullets = std::mem::take(&mut state.bullets);
    bullets.retain(|bullet| !strike(state, bullet));
    // Nothing spawns player bullets during resolution
    state.bullets = bullets;
}

/// Apply one bullet; true when it hit something and must be removed
fn strike(state: &mut GameState, bullet: &Bullet) -> bool {
    let room = &state.level.room;
    match find_bullet_target(bullet, &room.enemies, room.boss.as_ref()) {
        BulletTarget::Miss => false,
        BulletTarget::Enemy(index) => {
            let enemy = &mut state.level.room.enemies[index];
            enemy.take_damage(bullet.damage);
            let dead = enemy.is_dead();

            state.player.stats.shots_hit += 1;
            state.particles.add_bullet_impact(bullet.pos, &mut state.rng);
            state.play_sound(SoundEffect::Hit, 0.8);
            state.add_screen_shake(1.0, 0.05);

            if dead {
                let enemy = state.level.room.enemies.remove(index);
                handle_enemy_death(state, &enemy);
            }
            true
        }
        BulletTarget::Boss => {
            let Some(boss) = state.level.room.boss.as_mut() else {
                return false;
            };
            boss.take_damage(bullet.damage);
            let killed = boss.is_dying();
            let (pos, color) = (boss.body.pos, boss.body.color);

            state.player.stats.shots_hit += 1;
            state.particles.add_bullet_impact(bullet.pos, &mut state.rng);
            state.play_sound(SoundEffect::BossHit, 1.2);
            state.add_screen_shake(3.0, 0.15);

            if killed {
                state
                    .particles
                    .add_explosion(pos, color, BOSS_EXPLOSION_PARTICLES, &mut state.rng);
                state.play_sound(SoundEffect::BossDeath, 2.5);
                state.add_screen_shake(20.0, 1.5);
            }
            true
        }
    }
}

fn hostile_bullets_vs_player(state: &mut GameState) {
    let center = state.player.center();
    let size = state.player.size;

    let mut damage = Vec::new();
    state.enemy_bullets.retain(|b| {
        let hit = circles_overlap(b.pos, b.size, center, size);
        if hit {
            damage.push((b.pos, b.damage));
        }
        !hit
    });
    state.boss_bullets.retain(|b| {
        let hit = circles_overlap(b.bullet.pos, b.bullet.size, center, size);
        if hit {
            damage.push((b.bullet.pos, b.bullet.damage));
        }
        !hit
    });

    for (pos, amount) in damage {
        state.player.take_damage(amount);
        state.particles.add_bullet_impact(pos, &mut state.rng);
        state.play_sound(SoundEffect::Hit, 1.5);
        state.add_screen_shake(6.0, 0.25);
    }
}

fn contact_damage(state: &mut GameState, now: Timestamp) {
    let center = state.player.center();
    let size = state.player.size;

    let hits: Vec<f32> = state
        .level
        .room
        .enemies
        .iter_mut()
        .filter(|e| circles_overlap(center, size, e.body.pos, e.body.size))
        .filter_map(|e| e.body.attack(now).then_some(e.body.attack_damage))
        .collect();
    for amount in hits {
        state.player.take_damage(amount);
        state.play_sound(SoundEffect::Hit, 1.2);
        state.add_screen_shake(8.0, 0.3);
    }

    let boss_hit = state.level.room.boss.as_mut().and_then(|boss| {
        let touching = !boss.is_dying()
            && circles_overlap(center, size, boss.body.pos, boss.body.size);
        // Ramming hurts twice as much as the boss's shots
        (touching && boss.body.attack(now)).then_some(boss.body.attack_damage * 2.0)
    });
    if let Some(amount) = boss_hit {
        state.player.take_damage(amount);
        state.play_sound(SoundEffect::Hit, 2.0);
        state.add_screen_shake(12.0, 0.4);
    }
}

fn collect_pickups(state: &mut GameState, now: Timestamp) {
    let center = state.player.center();
    let size = state.player.size;

    let mut pickups = std::mem::take(&mut state.level.room.pickups);
    pickups.retain(|pickup| {
        if !circles_overlap(center, size, pickup.pos, pickup.size * 2.0) {
            return true;
        }
        match pickup.apply_to(&mut state.player, now) {
            PickupOutcome::PowerUp(kind) => {
                log::debug!("Power-up {:?} for {:.0}s", kind, pickup.value);
                state.play_sound(SoundEffect::PowerUp, 1.0);
            }
            PickupOutcome::Weapon => {
                log::info!("Equipped {}", state.player.weapon.name);
            }
            PickupOutcome::Resource | PickupOutcome::LevelUp => {}
        }
        state.particles.add_pickup_effect(pickup.pos, pickup.color, &mut state.rng);
        state.play_sound(SoundEffect::Pickup, 1.0);
        false
    });
    state.level.room.pickups = pickups;
}

/// Rewards, effects and a possible drop for a destroyed enemy
pub fn handle_enemy_death(state: &mut GameState, enemy: &Enemy) {
    let body = &enemy.body;
    state.score += body.score_value as u64;
    state.player.add_experience(body.experience_value);
    state.player.stats.kills += 1;

    state.particles.add_explosion(body.pos, body.color, 25, &mut state.rng);
    state.play_sound(SoundEffect::Explosion, 1.0);
    state.add_screen_shake(5.0, 0.25);

    if should_drop(enemy.kind.drop_chance(), &mut state.rng) {
        let wave = state.wave();
        let kind = random_pickup_kind(wave, &mut state.rng);
        let pickup = Pickup::new(kind, body.pos, wave, &mut state.rng);
        state.level.room.pickups.push(pickup);
    }
}

/// Rewards and the guaranteed pickup shower once a boss finished dying
pub fn handle_boss_defeat(state: &mut GameState, boss: &Boss) {
    let body = &boss.body;
    state.score += body.score_value as u64;
    state.player.add_experience(body.experience_value);
    state.player.stats.kills += 1;

    let wave = state.wave();
    for _ in 0..BOSS_PICKUP_DROPS {
        let offset = Vec2::new(
            random_between(&mut state.rng, -80.0, 80.0),
            random_between(&mut state.rng, -80.0, 80.0),
        );
        let kind = random_pickup_kind(wave, &mut state.rng);
        let pickup = Pickup::new(kind, body.pos + offset, wave, &mut state.rng);
        state.level.room.pickups.push(pickup);
    }
    state.play_sound(SoundEffect::WaveComplete, 1.0);
    log::info!("Boss {} defeated on wave {}", boss.kind.as_str(), wave);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::enemy::EnemyKind;
    use crate::sim::pickup::PickupKind;
    use crate::sim::player::PowerUpKind;

    fn state() -> GameState {
        let mut state = GameState::with_seed(99, Settings::default());
        state.start_game(Timestamp::ZERO);
        state.level.room.enemies.clear();
        state
    }

    fn player_bullet(pos: Vec2, damage: f32) -> Bullet {
        Bullet {
            pos,
            vel: Vec2::ZERO,
            damage,
            lifetime: 4.0,
            size: 6.0,
            color: 0xFFFFFF,
            from_player: true,
        }
    }

    fn hostile_bullet(pos: Vec2, damage: f32) -> Bullet {
        Bullet {
            from_player: false,
            ..player_bullet(pos, damage)
        }
    }

    #[test]
    fn test_bullet_hits_one_target_only() {
        let mut state = state();
        let pos = Vec2::new(200.0, 200.0);
        state.level.room.enemies.push(Enemy::new(pos, EnemyKind::Heavy, 1, None));
        state.level.room.enemies.push(Enemy::new(pos, EnemyKind::Heavy, 1, None));
        state.bullets.push(player_bullet(pos, 10.0));

        resolve_collisions(&mut state, Timestamp::ZERO);
        assert!(state.bullets.is_empty());
        let damaged = state
            .level
            .room
            .enemies
            .iter()
            .filter(|e| e.body.health < e.body.max_health)
            .count();
        assert_eq!(damaged, 1);
        assert_eq!(state.player.stats.shots_hit, 1);
    }

    #[test]
    fn test_enemies_checked_before_boss() {
        let pos = Vec2::new(300.0, 200.0);
        let enemies = vec![Enemy::new(pos, EnemyKind::Basic, 1, None)];
        let mut boss = Boss::for_wave(5);
        boss.body.pos = pos;
        let bullet = player_bullet(pos, 1.0);
        assert_eq!(find_bullet_target(&bullet, &enemies, Some(&boss)), BulletTarget::Enemy(0));
        assert_eq!(find_bullet_target(&bullet, &[], Some(&boss)), BulletTarget::Boss);

        boss.take_damage(1.0e9);
        assert_eq!(find_bullet_target(&bullet, &[], Some(&boss)), BulletTarget::Miss);
    }

    #[test]
    fn test_kill_awards_and_removes() {
        let mut state = state();
        let pos = Vec2::new(200.0, 200.0);
        state.level.room.enemies.push(Enemy::new(pos, EnemyKind::Basic, 1, None));
        state.bullets.push(player_bullet(pos, 1000.0));

        resolve_collisions(&mut state, Timestamp::ZERO);
        assert!(state.level.room.enemies.is_empty());
        assert_eq!(state.player.stats.kills, 1);
        assert!(state.score > 0);
        let effects: Vec<_> = state.drain_sounds().into_iter().map(|c| c.effect).collect();
        assert_eq!(effects, vec![SoundEffect::Hit, SoundEffect::Explosion]);
    }

    #[test]
    fn test_hostile_bullets_hit_shield_first() {
        let mut state = state();
        let center = state.player.center();
        state.enemy_bullets.push(hostile_bullet(center, 30.0));
        state.boss_bullets.push(crate::sim::projectile::BossBullet {
            bullet: hostile_bullet(center, 100.0),
            homing_target: None,
        });

        resolve_collisions(&mut state, Timestamp::ZERO);
        assert!(state.enemy_bullets.is_empty());
        assert!(state.boss_bullets.is_empty());
        assert_eq!(state.player.shield, 0.0);
        assert_eq!(state.player.health, 170.0);
    }

    #[test]
    fn test_both_directions_resolve_in_one_frame() {
        let mut state = state();
        let enemy_pos = Vec2::new(100.0, 100.0);
        state.level.room.enemies.push(Enemy::new(enemy_pos, EnemyKind::Heavy, 1, None));
        state.bullets.push(player_bullet(enemy_pos, 5.0));
        state.enemy_bullets.push(hostile_bullet(state.player.center(), 10.0));

        resolve_collisions(&mut state, Timestamp::ZERO);
        assert!(state.bullets.is_empty());
        assert!(state.enemy_bullets.is_empty());
        assert_eq!(state.player.shield, 90.0);
    }

    #[test]
    fn test_contact_damage_respects_cooldown() {
        let mut state = state();
        let mut enemy = Enemy::new(state.player.center(), EnemyKind::Basic, 1, None);
        enemy.body.attack_damage = 10.0;
        state.level.room.enemies.push(enemy);

        resolve_collisions(&mut state, Timestamp(1000.0));
        resolve_collisions(&mut state, Timestamp(1001.0));
        assert_eq!(state.player.shield, 90.0);
    }

    #[test]
    fn test_boss_contact_is_doubled() {
        let mut state = state();
        let mut boss = Boss::for_wave(5);
        boss.body.pos = state.player.center();
        boss.body.attack_damage = 20.0;
        state.level.room.boss = Some(boss);

        resolve_collisions(&mut state, Timestamp(1000.0));
        assert_eq!(state.player.shield, 60.0);
    }

    #[test]
    fn test_pickup_collected_with_double_radius() {
        let mut state = state();
        let center = state.player.center();
        let mut pickup = Pickup::new(PickupKind::DamageBoost, Vec2::ZERO, 1, &mut state.rng);
        // 20 + 12 = 32 reach with the doubled size; 30 is inside
        pickup.pos = center + Vec2::new(30.0, 0.0);
        state.level.room.pickups.push(pickup);

        resolve_collisions(&mut state, Timestamp(0.0));
        assert!(state.level.room.pickups.is_empty());
        assert!(state.player.has_power_up(PowerUpKind::DamageBoost));
        let effects: Vec<_> = state.drain_sounds().into_iter().map(|c| c.effect).collect();
        assert_eq!(effects, vec![SoundEffect::PowerUp, SoundEffect::Pickup]);
    }

    #[test]
    fn test_boss_defeat_drops_pickups() {
        let mut state = state();
        let boss = Boss::for_wave(5);
        handle_boss_defeat(&mut state, &boss);
        assert_eq!(state.level.room.pickups.len(), BOSS_PICKUP_DROPS);
        assert_eq!(state.score, boss.body.score_value as u64);
        assert_eq!(state.player.stats.kills, 1);
        for p in &state.level.room.pickups {
            assert!((p.pos - boss.body.pos).abs().max_element() <= 80.0);
        }
    }
}
