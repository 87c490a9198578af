//! Frame tick
//!
//! Core game loop. The caller passes its wall-clock time each frame; the
//! step is the elapsed time clamped to `max_frame_dt`, so slow frames lose
//! time instead of taking huge steps.

use glam::Vec2;
use rand::Rng;

use super::boss::{Boss, is_boss_wave};
use super::collision::{handle_boss_defeat, resolve_collisions};
use super::projectile::{BossBullet, Bullet, update_boss_bullets, update_bullets};
use super::state::{GamePhase, GameState};
use super::timer::{Timestamp, cooldown_elapsed};
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::{direction_to, random_between, vec_from_angle};

/// Input snapshot for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Desired movement, each axis in [-1, 1]
    pub movement: Vec2,
    /// Fire held
    pub shooting: bool,
    /// Heavy secondary shot held
    pub alternate_fire: bool,
    /// Reload requested
    pub reload: bool,
    /// Pause toggle
    pub pause: bool,
    /// Start a run from the title or game-over screen
    pub start: bool,
    /// Flip survival mode (title screen only)
    pub toggle_survival: bool,
    /// Idle/demo mode - AI plays the game
    pub idle_mode: bool,
}

/// Seconds to simulate for a frame at `now`; zero on the very first frame
pub fn frame_delta(last: Option<Timestamp>, now: Timestamp, max_dt: f32) -> f32 {
    match last {
        Some(last) => ((now.since(last) / 1000.0) as f32).clamp(0.0, max_dt),
        None => 0.0,
    }
}

/// Advance the game by one frame
pub fn tick(state: &mut GameState, input: &TickInput, now: Timestamp) {
    let dt = frame_delta(state.last_frame, now, state.settings.max_frame_dt);
    state.last_frame = Some(now);

    if input.toggle_survival && state.phase == GamePhase::Start {
        state.survival_mode = !state.survival_mode;
        log::info!("Survival mode {}", if state.survival_mode { "on" } else { "off" });
    }

    if input.pause {
        match state.phase {
            GamePhase::Playing => state.phase = GamePhase::Paused,
            GamePhase::Paused => state.phase = GamePhase::Playing,
            _ => {}
        }
    }

    // Idle/demo mode - AI plays the game
    let mut input = input.clone();
    if input.idle_mode {
        autopilot(state, &mut input);
    }
    let input = &input;

    if input.start && matches!(state.phase, GamePhase::Start | GamePhase::GameOver) {
        state.start_game(now);
        return;
    }

    if !matches!(state.phase, GamePhase::Playing | GamePhase::BossIntro) {
        return;
    }
    state.frame += 1;
    update(state, input, dt, now);
}

fn update(state: &mut GameState, input: &TickInput, dt: f32, now: Timestamp) {
    state.level.update(dt, &mut state.rng);

    if state.phase == GamePhase::BossIntro {
        state.boss_intro_timer += dt;
        if state.boss_intro_timer >= BOSS_INTRO_DURATION {
            state.phase = GamePhase::Playing;
            state.boss_intro_timer = 0.0;
        }
        return;
    }

    if state.survival_mode {
        state.survival_timer += dt;
        state.difficulty_multiplier = 1.0 + (state.survival_timer / 60.0) * 0.8;
        if state.survival_timer >= state.settings.survival_duration {
            state.phase = GamePhase::GameOver;
            state.play_sound(SoundEffect::WaveComplete, 1.0);
            log::info!("Survived {:.0}s with score {}", state.survival_timer, state.score);
            return;
        }
    }

    let arena = state.arena;
    state.player.update(dt, input.movement, arena, now);

    if input.shooting && state.player.can_shoot(now) {
        fire_player_volley(state, now);
    }
    if input.alternate_fire && state.player.can_alternate_shoot(now) {
        fire_heavy_shot(state, now);
    }

    if input.reload && state.player.can_reload() && state.player.reload(now) {
        state.play_sound(SoundEffect::Reload, 1.0);
    }

    let room = &state.level.room;
    if is_boss_wave(room.wave_number)
        && room.enemies.is_empty()
        && room.boss.is_none()
        && !room.boss_spawned
    {
        spawn_boss(state);
    }

    let target = state.player.center();
    for enemy in &mut state.level.room.enemies {
        enemy.update(dt, target, now, &mut state.rng);
    }

    update_boss(state, dt, now);
    fire_enemy_volley(state, now);

    state.level.room.pickups.retain_mut(|p| p.update(dt));
    if state.level.check_room_cleared() {
        state.player.stats.rooms_cleared += 1;
        state.play_sound(SoundEffect::WaveComplete, 1.0);
    }

    let target = state.player.center();
    update_bullets(&mut state.bullets, dt, arena);
    update_bullets(&mut state.enemy_bullets, dt, arena);
    update_boss_bullets(&mut state.boss_bullets, dt, arena, target);
    state.particles.update(dt);
    state.screen_shake.update(dt);

    resolve_collisions(state, now);

    if state.player.health <= 0.0 {
        state.phase = GamePhase::GameOver;
        state.play_sound(SoundEffect::GameOver, 1.0);
        log::info!(
            "Game over on wave {} with score {}",
            state.level.current_wave,
            state.score
        );
    }
}

fn fire_player_volley(state: &mut GameState, now: Timestamp) {
    if !state.player.shoot(now) {
        return;
    }
    let player = &state.player;
    let muzzle = player.muzzle();
    let damage = player.weapon_damage();
    let color = player.weapon.color;
    state
        .bullets
        .extend(player.volley_velocities().into_iter().map(|vel| Bullet {
            pos: muzzle,
            vel,
            damage,
            lifetime: PLAYER_BULLET_LIFETIME,
            size: PLAYER_BULLET_SIZE,
            color,
            from_player: true,
        }));

    state.particles.add_muzzle_flash(muzzle, Vec2::NEG_Y, &mut state.rng);
    state.play_sound(SoundEffect::Shoot, 1.0);
    state.add_screen_shake(2.0, 0.1);
}

/// Single slow-cycling round straight up the screen
fn fire_heavy_shot(state: &mut GameState, now: Timestamp) {
    if !state.player.alternate_shoot(now) {
        return;
    }
    let player = &state.player;
    let muzzle = player.muzzle();
    state.bullets.push(Bullet {
        pos: muzzle,
        vel: Vec2::new(0.0, -player.weapon.bullet_speed),
        damage: player.alternate_weapon_damage(),
        lifetime: PLAYER_BULLET_LIFETIME,
        size: HEAVY_BULLET_SIZE,
        color: player.weapon.color,
        from_player: true,
    });

    state.particles.add_muzzle_flash(muzzle, Vec2::NEG_Y, &mut state.rng);
    state.play_sound(SoundEffect::Shoot, 1.3);
    state.add_screen_shake(4.0, 0.15);
}

fn spawn_boss(state: &mut GameState) {
    let wave = state.level.room.wave_number;
    let boss = Boss::for_wave(wave);
    log::info!(
        "Boss {} incoming on wave {} ({} hp, {} phases)",
        boss.kind.as_str(),
        wave,
        boss.body.max_health,
        boss.state.max_phases
    );
    state.level.room.boss = Some(boss);
    state.level.room.boss_spawned = true;
    state.phase = GamePhase::BossIntro;
    state.boss_intro_timer = 0.0;

    state.add_screen_shake(12.0, 1.5);
    state
        .particles
        .add_explosion(Vec2::new(400.0, 100.0), 0xFF0000, 80, &mut state.rng);
    state.play_sound(SoundEffect::BossIntro, 1.5);
}

/// Move, fire and finally retire the boss
fn update_boss(state: &mut GameState, dt: f32, now: Timestamp) {
    let target = state.player.center();
    let Some(boss) = state.level.room.boss.as_mut() else {
        return;
    };

    let phase_before = boss.phase();
    boss.update(dt, target, now, &mut state.rng);
    let phase_changed = boss.phase() > phase_before;
    let (pos, color) = (boss.body.pos, boss.body.color);
    let volley = boss.fire(now, &mut state.rng);
    let finished = boss.is_dead();

    if phase_changed {
        state.play_sound(SoundEffect::BossPhase, 1.0);
        state.add_screen_shake(8.0, 0.5);
        state.particles.add_explosion(pos, color, 40, &mut state.rng);
    }

    if let Some(volley) = volley {
        state
            .boss_bullets
            .extend(volley.bullets.iter().map(BossBullet::from_spec));
        state.play_sound(SoundEffect::BossShoot, 1.8);
        if volley.pattern.is_heavy() {
            state.add_screen_shake(5.0, 0.3);
        }
    }

    if finished {
        if let Some(boss) = state.level.room.boss.take() {
            handle_boss_defeat(state, &boss);
        }
    }
}

/// One aimed shot from a random enemy in range, paced engine-wide
fn fire_enemy_volley(state: &mut GameState, now: Timestamp) {
    let cooldown = ENEMY_VOLLEY_COOLDOWN_MS / state.difficulty_multiplier as f64;
    if !cooldown_elapsed(state.last_enemy_shot, now, cooldown) {
        return;
    }

    let target = state.player.center();
    let candidates: Vec<usize> = state
        .level
        .room
        .enemies
        .iter()
        .enumerate()
        .filter(|(_, e)| e.body.pos.distance(target) < ENEMY_FIRE_RANGE && e.body.can_shoot(now))
        .map(|(i, _)| i)
        .collect();
    if candidates.is_empty() {
        return;
    }

    let index = candidates[state.rng.random_range(0..candidates.len())];
    let shooter = &mut state.level.room.enemies[index].body;
    if !shooter.shoot(now) {
        return;
    }
    let origin = shooter.pos;
    let damage = shooter.attack_damage;

    // Lead the target by the bullet's travel time
    let time_to_hit = origin.distance(target) / ENEMY_BULLET_SPEED;
    let predicted = target + state.player.vel * time_to_hit;
    let aim = direction_to(origin, predicted);
    let spread = (0.15 - (state.difficulty_multiplier - 1.0) * 0.08).max(0.03);
    let angle = aim.y.atan2(aim.x) + random_between(&mut state.rng, -spread, spread);

    state.enemy_bullets.push(Bullet {
        pos: origin,
        vel: vec_from_angle(angle, ENEMY_BULLET_SPEED),
        damage,
        lifetime: ENEMY_BULLET_LIFETIME,
        size: ENEMY_BULLET_SIZE,
        color: 0xFF4444,
        from_player: false,
    });
    state
        .particles
        .add_muzzle_flash(origin, vec_from_angle(angle, 1.0), &mut state.rng);
    state.play_sound(SoundEffect::EnemyShoot, 0.7);
    state.last_enemy_shot = Some(now);
}

/// Demo driver: always firing, dodges the closest incoming shot, otherwise
/// grabs pickups or lines up under the nearest target
fn autopilot(state: &GameState, input: &mut TickInput) {
    if matches!(state.phase, GamePhase::Start | GamePhase::GameOver) {
        input.start = true;
        return;
    }

    let player = &state.player;
    let center = player.center();
    input.shooting = true;
    input.reload = player.weapon.ammo == 0;

    let threat = state
        .enemy_bullets
        .iter()
        .chain(state.boss_bullets.iter().map(|b| &b.bullet))
        .filter(|b| b.vel.dot(center - b.pos) > 0.0 && b.pos.distance(center) < 150.0)
        .min_by(|a, b| {
            a.pos
                .distance(center)
                .partial_cmp(&b.pos.distance(center))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    let room = &state.level.room;
    let movement = if let Some(bullet) = threat {
        // Step sideways out of the bullet's path
        let side = Vec2::new(-bullet.vel.y, bullet.vel.x).normalize_or_zero();
        if side.dot(center - bullet.pos) >= 0.0 { side } else { -side }
    } else if let Some(pickup) = room.pickups.iter().min_by(|a, b| {
        a.pos
            .distance(center)
            .partial_cmp(&b.pos.distance(center))
            .unwrap_or(std::cmp::Ordering::Equal)
    }) {
        direction_to(center, pickup.pos)
    } else {
        let nearest_enemy = room
            .enemies
            .iter()
            .map(|e| e.body.pos)
            .min_by(|a, b| {
                a.distance(center)
                    .partial_cmp(&b.distance(center))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        let aim_at = room.boss.as_ref().map(|b| b.body.pos).or(nearest_enemy);
        match aim_at {
            Some(target) => {
                let dx = target.x - center.x;
                let x = if dx.abs() > 10.0 { dx.signum() } else { 0.0 };
                // Hold a line near the bottom of the arena
                let home_y = state.arena.y - 100.0;
                let y = if (center.y - home_y).abs() > 20.0 {
                    (home_y - center.y).signum()
                } else {
                    0.0
                };
                Vec2::new(x, y)
            }
            None => Vec2::ZERO,
        }
    };

    input.movement = movement;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::enemy::{Enemy, EnemyKind};

    const FRAME_MS: f64 = 16.0;

    /// Started game with a clock at 10s
    fn playing() -> (GameState, Timestamp) {
        let mut state = GameState::with_seed(1234, Settings::default());
        let now = Timestamp(10_000.0);
        tick(
            &mut state,
            &TickInput {
                start: true,
                ..Default::default()
            },
            now,
        );
        (state, now)
    }

    fn advance(state: &mut GameState, now: &mut Timestamp, input: &TickInput, frames: usize) {
        for _ in 0..frames {
            *now = now.after(FRAME_MS);
            tick(state, input, *now);
        }
    }

    #[test]
    fn test_frame_delta_clamped() {
        assert_eq!(frame_delta(None, Timestamp(5000.0), 0.016), 0.0);
        assert_eq!(frame_delta(Some(Timestamp(0.0)), Timestamp(500.0), 0.016), 0.016);
        assert!((frame_delta(Some(Timestamp(0.0)), Timestamp(10.0), 0.016) - 0.01).abs() < 1e-6);
        assert_eq!(frame_delta(Some(Timestamp(100.0)), Timestamp(50.0), 0.016), 0.0);
    }

    #[test]
    fn test_start_and_pause() {
        let mut state = GameState::with_seed(1, Settings::default());
        let mut now = Timestamp(0.0);
        advance(&mut state, &mut now, &TickInput::default(), 3);
        assert_eq!(state.phase, GamePhase::Start);
        assert_eq!(state.frame, 0);

        tick(&mut state, &TickInput { start: true, ..Default::default() }, now);
        assert_eq!(state.phase, GamePhase::Playing);

        let pause = TickInput { pause: true, ..Default::default() };
        advance(&mut state, &mut now, &pause, 1);
        assert_eq!(state.phase, GamePhase::Paused);
        let frame = state.frame;
        advance(&mut state, &mut now, &TickInput::default(), 10);
        assert_eq!(state.frame, frame);
        advance(&mut state, &mut now, &pause, 1);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_survival_toggle_only_on_title() {
        let mut state = GameState::with_seed(1, Settings::default());
        let toggle = TickInput { toggle_survival: true, ..Default::default() };
        tick(&mut state, &toggle, Timestamp(0.0));
        assert!(state.survival_mode);

        let (mut state, now) = playing();
        tick(&mut state, &toggle, now.after(16.0));
        assert!(!state.survival_mode);
    }

    #[test]
    fn test_player_volley() {
        let (mut state, mut now) = playing();
        state.level.room.enemies.clear();
        state.player.weapon.bullet_count = 3;
        state.player.weapon.spread = 0.2;
        let fire = TickInput { shooting: true, ..Default::default() };
        advance(&mut state, &mut now, &fire, 1);

        assert_eq!(state.bullets.len(), 3);
        assert_eq!(state.player.weapon.ammo, 39);
        let speed = state.player.weapon.bullet_speed;
        for b in &state.bullets {
            assert!((b.vel.length() - speed).abs() < 1e-2);
            assert!(b.from_player);
        }
        assert!((state.bullets[0].vel.x + state.bullets[2].vel.x).abs() < 1e-2);
        assert!(state.pending_sounds().iter().any(|c| c.effect == SoundEffect::Shoot));
    }

    #[test]
    fn test_heavy_shot() {
        let (mut state, mut now) = playing();
        state.level.room.enemies.clear();
        let heavy = TickInput { alternate_fire: true, ..Default::default() };
        advance(&mut state, &mut now, &heavy, 1);

        assert_eq!(state.bullets.len(), 1);
        let b = state.bullets[0];
        assert_eq!(b.size, HEAVY_BULLET_SIZE);
        assert_eq!(b.damage, 120.0 * 2.5 + 25.0);
        assert!(b.vel.y < 0.0 && b.vel.x == 0.0);
        assert_eq!(state.player.weapon.ammo, 38);

        // 300ms between heavy shots
        advance(&mut state, &mut now, &heavy, 10);
        assert_eq!(state.bullets.len(), 1);
        advance(&mut state, &mut now, &heavy, 10);
        assert_eq!(state.bullets.len(), 2);
        assert_eq!(state.player.weapon.ammo, 36);
    }

    #[test]
    fn test_enemy_volley_is_paced() {
        let (mut state, mut now) = playing();
        state.level.room.enemies.clear();
        let near = state.player.center() - Vec2::new(0.0, 200.0);
        let mut enemy = Enemy::new(near, EnemyKind::Heavy, 1, None);
        enemy.body.speed = 0.0;
        enemy.body.attack_cooldown = 0.0;
        state.level.room.enemies.push(enemy);

        advance(&mut state, &mut now, &TickInput::default(), 1);
        assert_eq!(state.enemy_bullets.len(), 1);
        let b = state.enemy_bullets[0];
        assert_eq!(b.size, ENEMY_BULLET_SIZE);
        assert!(b.vel.y > 0.0);
        let first = state.last_enemy_shot;
        assert_eq!(first, Some(now));

        // 600ms engine cooldown holds the next shot back
        advance(&mut state, &mut now, &TickInput::default(), 10);
        assert_eq!(state.last_enemy_shot, first);
        advance(&mut state, &mut now, &TickInput::default(), 30);
        assert!(state.last_enemy_shot > first);
    }

    #[test]
    fn test_out_of_range_enemies_hold_fire() {
        let (mut state, mut now) = playing();
        state.level.room.enemies.clear();
        let mut enemy = Enemy::new(Vec2::new(-40.0, -90.0), EnemyKind::Heavy, 1, None);
        enemy.body.speed = 0.0;
        state.level.room.enemies.push(enemy);
        advance(&mut state, &mut now, &TickInput::default(), 5);
        assert!(state.enemy_bullets.is_empty());
    }

    fn reach_boss_wave(state: &mut GameState) {
        for _ in 0..4 {
            state.level.force_next_wave(&mut state.rng);
        }
        assert_eq!(state.wave(), 5);
        state.level.room.enemies.clear();
    }

    #[test]
    fn test_boss_intro_then_fight() {
        let (mut state, mut now) = playing();
        reach_boss_wave(&mut state);

        advance(&mut state, &mut now, &TickInput::default(), 1);
        assert_eq!(state.phase, GamePhase::BossIntro);
        assert!(state.level.room.boss.is_some());
        assert!(state.level.room.boss_spawned);
        // The formation is gone, so the wave counts as done with the boss up
        assert!(state.level.room.wave_completed);
        assert_eq!(state.player.stats.rooms_cleared, 1);

        let boss_pos = state.level.room.boss.as_ref().map(|b| b.body.pos);
        // Frozen during the intro
        advance(&mut state, &mut now, &TickInput::default(), 150);
        assert_eq!(state.phase, GamePhase::BossIntro);
        assert_eq!(state.level.room.boss.as_ref().map(|b| b.body.pos), boss_pos);

        advance(&mut state, &mut now, &TickInput::default(), 50);
        assert_eq!(state.phase, GamePhase::Playing);
        // Next wave dropped in around the surviving boss
        assert_eq!(state.wave(), 6);
        assert!(state.level.room.boss.is_some());
        assert!(!state.level.room.enemies.is_empty());
    }

    #[test]
    fn test_boss_removed_after_death_animation() {
        let (mut state, mut now) = playing();
        reach_boss_wave(&mut state);
        advance(&mut state, &mut now, &TickInput::default(), 1);
        state.phase = GamePhase::Playing;
        state.player.add_power_up(
            crate::sim::player::PowerUpKind::Invincibility,
            1000.0,
            now,
        );

        if let Some(boss) = state.level.room.boss.as_mut() {
            boss.take_damage(1.0e9);
        }
        // 1.5s: still dying
        advance(&mut state, &mut now, &TickInput::default(), 94);
        assert!(state.level.room.boss.is_some());

        advance(&mut state, &mut now, &TickInput::default(), 40);
        assert!(state.level.room.boss.is_none());
        assert_eq!(state.player.stats.kills, 1);
        assert!(state.score >= 5000);

        // Removal does not complete the wave a second time or bring the boss back
        advance(&mut state, &mut now, &TickInput::default(), 2);
        assert_eq!(state.wave(), 5);
        assert_eq!(state.player.stats.rooms_cleared, 1);
        assert!(state.level.room.boss_spawned);
        assert!(state.level.room.boss.is_none());
    }

    #[test]
    fn test_game_over_when_health_gone() {
        let (mut state, mut now) = playing();
        state.player.health = 0.0;
        advance(&mut state, &mut now, &TickInput::default(), 1);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.drain_sounds().iter().any(|c| c.effect == SoundEffect::GameOver));

        let frame = state.frame;
        advance(&mut state, &mut now, &TickInput::default(), 5);
        assert_eq!(state.frame, frame);
    }

    #[test]
    fn test_survival_ramp_and_finish() {
        let (mut state, mut now) = playing();
        state.survival_mode = true;
        state.level.room.enemies.clear();
        state.survival_timer = 60.0;
        advance(&mut state, &mut now, &TickInput::default(), 1);
        assert!((state.difficulty_multiplier - 1.8).abs() < 1e-3);

        state.drain_sounds();
        state.survival_timer = 299.999;
        advance(&mut state, &mut now, &TickInput::default(), 1);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.drain_sounds().iter().any(|c| c.effect == SoundEffect::WaveComplete));
    }

    #[test]
    fn test_wave_advances_after_clear() {
        let (mut state, mut now) = playing();
        state.level.room.enemies.clear();
        advance(&mut state, &mut now, &TickInput::default(), 1);
        assert!(state.level.room.wave_completed);
        assert_eq!(state.player.stats.rooms_cleared, 1);

        // Easy tier waits 3s
        advance(&mut state, &mut now, &TickInput::default(), 200);
        assert_eq!(state.wave(), 2);
        assert_eq!(state.level.room.enemies.len(), 4);
    }

    #[test]
    fn test_idle_mode_plays_itself() {
        let mut state = GameState::with_seed(7, Settings::default());
        let mut now = Timestamp(0.0);
        let idle = TickInput { idle_mode: true, ..Default::default() };
        let mut fired = false;
        for _ in 0..3000 {
            advance(&mut state, &mut now, &idle, 1);
            fired |= !state.bullets.is_empty();
            let player = &state.player;
            assert!(player.health >= 0.0 && player.health <= player.max_health);
            assert!(player.shield >= 0.0 && player.shield <= player.max_shield);
        }

        assert!(state.frame > 0);
        assert!(fired);
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = || {
            let mut state = GameState::with_seed(21, Settings::default());
            let mut now = Timestamp(0.0);
            let idle = TickInput { idle_mode: true, ..Default::default() };
            advance(&mut state, &mut now, &idle, 1500);
            (state.score, state.frame, state.level.current_wave, state.player.stats.kills)
        };
        assert_eq!(run(), run());
    }
}
