//! Bullet populations
//!
//! Three pools live side by side on the game state: player bullets, enemy
//! bullets and boss bullets. Each pool integrates, then drops bullets whose
//! lifetime ran out or that left the arena (boss bullets get extra margin so
//! homing shots can swing back in).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::boss::BulletSpec;
use crate::consts::{BOSS_BULLET_LIFETIME, BOSS_BULLET_MARGIN, HOMING_MAX_SPEED, HOMING_STRENGTH};
use crate::direction_to;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    /// Center
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: f32,
    /// Seconds left
    pub lifetime: f32,
    /// Collision diameter
    pub size: f32,
    pub color: u32,
    pub from_player: bool,
}

impl Bullet {
    /// Advance one frame; false when the bullet should be dropped
    pub fn update(&mut self, dt: f32, arena: Vec2, margin: f32) -> bool {
        self.pos += self.vel * dt;
        self.lifetime -= dt;
        self.lifetime > 0.0 && in_bounds(self.pos, arena, margin)
    }
}

/// A boss projectile, optionally steering toward the player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BossBullet {
    pub bullet: Bullet,
    /// Set for homing shots; follows the player's live position
    pub homing_target: Option<Vec2>,
}

impl BossBullet {
    pub fn from_spec(spec: &BulletSpec) -> Self {
        Self {
            bullet: Bullet {
                pos: spec.pos,
                vel: spec.vel,
                damage: spec.damage,
                lifetime: BOSS_BULLET_LIFETIME,
                size: spec.size,
                color: spec.color,
                from_player: false,
            },
            homing_target: spec.homing_target,
        }
    }

    pub fn is_homing(&self) -> bool {
        self.homing_target.is_some()
    }

    /// Bend velocity toward the target, capped at the homing top speed
    fn steer(&mut self, dt: f32) {
        let Some(target) = self.homing_target else {
            return;
        };
        let dir = direction_to(self.bullet.pos, target);
        self.bullet.vel += dir * HOMING_STRENGTH * dt;
        self.bullet.vel = self.bullet.vel.clamp_length_max(HOMING_MAX_SPEED);
    }
}

fn in_bounds(pos: Vec2, arena: Vec2, margin: f32) -> bool {
    pos.x >= -margin && pos.x <= arena.x + margin && pos.y >= -margin && pos.y <= arena.y + margin
}

/// Integrate and cull player or enemy bullets
pub fn update_bullets(bullets: &mut Vec<Bullet>, dt: f32, arena: Vec2) {
    bullets.retain_mut(|b| b.update(dt, arena, 0.0));
}

/// Re-aim homing shots at `player_center`, then integrate and cull
pub fn update_boss_bullets(bullets: &mut Vec<BossBullet>, dt: f32, arena: Vec2, player_center: Vec2) {
    bullets.retain_mut(|b| {
        if b.homing_target.is_some() {
            b.homing_target = Some(player_center);
            b.steer(dt);
        }
        b.bullet.update(dt, arena, BOSS_BULLET_MARGIN)
    });
}
