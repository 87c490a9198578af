//! Cosmetic particles
//!
//! Simulated in the core so effects line up with combat events; drawing them
//! is the renderer's job.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{random_between, vec_from_angle};

const GRAVITY: f32 = 80.0;
const DRAG: f32 = 0.98;
const SHRINK: f32 = 0.992;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    pub size: f32,
    pub lifetime: f32,
    pub max_lifetime: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
}

impl Particle {
    pub fn new<R: Rng + ?Sized>(
        pos: Vec2,
        vel: Vec2,
        color: u32,
        size: f32,
        lifetime: f32,
        rng: &mut R,
    ) -> Self {
        Self {
            pos,
            vel,
            color,
            size,
            lifetime,
            max_lifetime: lifetime,
            rotation: random_between(rng, 0.0, TAU),
            rotation_speed: random_between(rng, -5.0, 5.0),
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        self.lifetime -= dt;
        self.rotation += self.rotation_speed * dt;
        self.vel.y += GRAVITY * dt;
        self.vel *= DRAG;
        self.size *= SHRINK;
    }

    pub fn is_dead(&self) -> bool {
        self.lifetime <= 0.0 || self.size <= 0.1
    }

    /// Remaining life in [0, 1], for fading
    pub fn alpha(&self) -> f32 {
        if self.max_lifetime > 0.0 {
            (self.lifetime / self.max_lifetime).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Blend an RGB color toward white by `amount` in [0, 1]
pub fn lighten(color: u32, amount: f32) -> u32 {
    let channel = |shift: u32| {
        let c = ((color >> shift) & 0xFF) as f32;
        let c = c + (255.0 - c) * amount.clamp(0.0, 1.0);
        (c.round() as u32).min(255) << shift
    };
    channel(16) | channel(8) | channel(0)
}

/// Capped particle pool. New particles are dropped once full.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParticleSystem {
    pub particles: Vec<Particle>,
    pub max_particles: usize,
    pub enabled: bool,
}

impl ParticleSystem {
    pub fn new(max_particles: usize) -> Self {
        Self {
            particles: Vec::with_capacity(max_particles.min(512)),
            max_particles,
            enabled: true,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn update(&mut self, dt: f32) {
        self.particles.retain_mut(|p| {
            p.update(dt);
            !p.is_dead()
        });
    }

    fn push(&mut self, particle: Particle) {
        if self.enabled && self.particles.len() < self.max_particles {
            self.particles.push(particle);
        }
    }

    /// Radial blast: `intensity` ring particles plus debris and sparks
    pub fn add_explosion<R: Rng + ?Sized>(
        &mut self,
        pos: Vec2,
        color: u32,
        intensity: usize,
        rng: &mut R,
    ) {
        if !self.enabled {
            return;
        }
        for i in 0..intensity {
            let angle = TAU * i as f32 / intensity as f32;
            let vel = vec_from_angle(angle, random_between(rng, 80.0, 200.0));
            let size = random_between(rng, 3.0, 8.0);
            let life = random_between(rng, 0.8, 2.0);
            let p = Particle::new(pos, vel, color, size, life, rng);
            self.push(p);
        }

        let debris_color = lighten(color, 0.3);
        for _ in 0..intensity / 2 {
            let vel = Vec2::new(
                random_between(rng, -150.0, 150.0),
                random_between(rng, -150.0, 150.0),
            );
            let size = random_between(rng, 1.0, 4.0);
            let life = random_between(rng, 1.2, 2.5);
            let p = Particle::new(pos, vel, debris_color, size, life, rng);
            self.push(p);
        }

        for _ in 0..intensity * 2 {
            let vel = Vec2::new(
                random_between(rng, -300.0, 300.0),
                random_between(rng, -300.0, 300.0),
            );
            let size = random_between(rng, 0.5, 2.0);
            let life = random_between(rng, 0.3, 1.0);
            let p = Particle::new(pos, vel, 0xFFFF00, size, life, rng);
            self.push(p);
        }
    }

    /// Sparks and a little smoke where a bullet lands
    pub fn add_bullet_impact<R: Rng + ?Sized>(&mut self, pos: Vec2, rng: &mut R) {
        if !self.enabled {
            return;
        }
        for i in 0..8 {
            let angle = TAU * i as f32 / 8.0;
            let vel = vec_from_angle(angle, random_between(rng, 50.0, 150.0));
            let size = random_between(rng, 1.0, 3.0);
            let life = random_between(rng, 0.3, 0.8);
            let p = Particle::new(pos, vel, 0xFFD700, size, life, rng);
            self.push(p);
        }
        for _ in 0..4 {
            let vel = Vec2::new(
                random_between(rng, -50.0, 50.0),
                random_between(rng, -80.0, -20.0),
            );
            let size = random_between(rng, 2.0, 5.0);
            let life = random_between(rng, 0.5, 1.2);
            let p = Particle::new(pos, vel, 0x888888, size, life, rng);
            self.push(p);
        }
    }

    /// Flash cone along `direction` plus hot gas
    pub fn add_muzzle_flash<R: Rng + ?Sized>(&mut self, pos: Vec2, direction: Vec2, rng: &mut R) {
        if !self.enabled {
            return;
        }
        let base = direction.y.atan2(direction.x);
        for _ in 0..6 {
            let angle = base + random_between(rng, -0.4, 0.4);
            let vel = vec_from_angle(angle, random_between(rng, 150.0, 300.0));
            let size = random_between(rng, 3.0, 6.0);
            let life = random_between(rng, 0.1, 0.4);
            let p = Particle::new(pos, vel, 0xFFFF00, size, life, rng);
            self.push(p);
        }
        for _ in 0..4 {
            let angle = base + random_between(rng, -0.6, 0.6);
            let vel = vec_from_angle(angle, random_between(rng, 80.0, 150.0));
            let size = random_between(rng, 2.0, 4.0);
            let life = random_between(rng, 0.2, 0.6);
            let p = Particle::new(pos, vel, 0xFF6600, size, life, rng);
            self.push(p);
        }
    }

    /// Ring and rising glitter when something is collected
    pub fn add_pickup_effect<R: Rng + ?Sized>(&mut self, pos: Vec2, color: u32, rng: &mut R) {
        if !self.enabled {
            return;
        }
        for i in 0..12 {
            let angle = TAU * i as f32 / 12.0;
            let vel = vec_from_angle(angle, random_between(rng, 40.0, 100.0)) + Vec2::new(0.0, -50.0);
            let size = random_between(rng, 2.0, 5.0);
            let life = random_between(rng, 0.5, 1.2);
            let p = Particle::new(pos, vel, color, size, life, rng);
            self.push(p);
        }
        for _ in 0..8 {
            let vel = Vec2::new(
                random_between(rng, -80.0, 80.0),
                random_between(rng, -120.0, -40.0),
            );
            let size = random_between(rng, 1.0, 3.0);
            let life = random_between(rng, 0.3, 0.8);
            let p = Particle::new(pos, vel, 0xFFFFFF, size, life, rng);
            self.push(p);
        }
    }
}
