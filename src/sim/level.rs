//! Wave progression
//!
//! One battlefield room hosts every wave. A wave is spawned as a formation,
//! fought until its regular enemies are gone, then a transition timer runs
//! before the next wave drops in. A live boss does not hold the wave open and
//! stays on the field across the transition. A backup timer one second
//! longer guards against the primary path being skipped.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::boss::Boss;
use super::enemy::{Enemy, enemy_count_for_wave, roll_enemy_kind};
use super::pickup::Pickup;
use super::timer::Countdown;
use crate::random_between;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn for_wave(wave: u32) -> Self {
        match wave {
            0..=6 => Difficulty::Easy,
            7..=15 => Difficulty::Medium,
            _ => Difficulty::Hard,
        }
    }

    /// Mandatory pause between waves (seconds)
    pub fn transition_delay(&self) -> f32 {
        match self {
            Difficulty::Easy => 3.0,
            Difficulty::Medium => 2.5,
            Difficulty::Hard => 2.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// Spatial arrangement a wave spawns in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Formation {
    Line,
    VFormation,
    Diamond,
    Scattered,
    Pincer,
    Flanking,
}

impl Formation {
    const ORDER: [Formation; 6] = [
        Formation::Line,
        Formation::VFormation,
        Formation::Diamond,
        Formation::Scattered,
        Formation::Pincer,
        Formation::Flanking,
    ];

    /// Advances every three waves and stays on the last one
    pub fn for_wave(wave: u32) -> Self {
        let index = (wave / 3) as usize;
        Self::ORDER[index.min(Self::ORDER.len() - 1)]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Formation::Line => "line",
            Formation::VFormation => "v-formation",
            Formation::Diamond => "diamond",
            Formation::Scattered => "scattered",
            Formation::Pincer => "pincer",
            Formation::Flanking => "flanking",
        }
    }
}

/// Spawn point and rally point for each of `count` enemies
pub fn formation_slots<R: Rng + ?Sized>(
    formation: Formation,
    count: usize,
    rng: &mut R,
) -> Vec<(Vec2, Vec2)> {
    let n = count as f32;
    (0..count)
        .map(|i| {
            let fi = i as f32;
            match formation {
                Formation::Line => {
                    let x = 100.0 + fi * (600.0 / n);
                    (Vec2::new(x, -60.0), Vec2::new(x, 80.0))
                }
                Formation::VFormation => {
                    let center = n / 2.0;
                    let offset = (fi - center).abs() * 40.0;
                    let x = 400.0 + (fi - center) * 60.0;
                    (Vec2::new(x, -60.0 - offset), Vec2::new(x, 80.0 + offset))
                }
                Formation::Diamond => {
                    let rows = n.sqrt().ceil().max(1.0) as usize;
                    let row = i / rows;
                    let col = i % rows;
                    let x = 350.0 + (col as f32 - rows as f32 / 2.0) * 50.0 + (row % 2) as f32 * 25.0;
                    (
                        Vec2::new(x, -60.0 - row as f32 * 40.0),
                        Vec2::new(x, 80.0 + row as f32 * 30.0),
                    )
                }
                Formation::Pincer => {
                    let left = i % 2 == 0;
                    let group = (i / 2) as f32;
                    let x = if left { 50.0 + group * 35.0 } else { 750.0 - group * 35.0 };
                    let rally_x = if left { 200.0 } else { 600.0 };
                    (
                        Vec2::new(x, -60.0 - group * 25.0),
                        Vec2::new(rally_x, 100.0 + group * 40.0),
                    )
                }
                Formation::Flanking => {
                    let spawn = if fi < n / 3.0 {
                        Vec2::new(-50.0, 100.0 + fi * 40.0)
                    } else if fi < n * 2.0 / 3.0 {
                        Vec2::new(850.0, 100.0 + (fi - n / 3.0) * 40.0)
                    } else {
                        Vec2::new(300.0 + (fi - n * 2.0 / 3.0) * 60.0, -60.0)
                    };
                    (spawn, Vec2::new(400.0, 300.0))
                }
                Formation::Scattered => {
                    let x = random_between(rng, 50.0, 750.0);
                    let y = random_between(rng, -150.0, -30.0);
                    (Vec2::new(x, y), Vec2::new(x, random_between(rng, 60.0, 150.0)))
                }
            }
        })
        .collect()
}

/// Build the enemies for `wave` in its formation
pub fn spawn_formation<R: Rng + ?Sized>(wave: u32, rng: &mut R) -> Vec<Enemy> {
    let formation = Formation::for_wave(wave);
    let slots = formation_slots(formation, enemy_count_for_wave(wave), rng);
    slots
        .into_iter()
        .map(|(spawn, rally)| {
            let kind = roll_enemy_kind(wave, rng);
            Enemy::new(spawn, kind, wave, Some(rally))
        })
        .collect()
}

/// The battlefield and everything currently on it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Room {
    pub enemies: Vec<Enemy>,
    pub boss: Option<Boss>,
    pub pickups: Vec<Pickup>,
    pub wave_number: u32,
    /// Enemy count at spawn; non-zero means the wave actually started
    pub enemies_remaining: usize,
    pub cleared: bool,
    pub wave_completed: bool,
    /// This wave's boss has already appeared
    pub boss_spawned: bool,
}

/// Wave state machine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    pub room: Room,
    pub current_wave: u32,
    pub difficulty: Difficulty,
    pub transition: Countdown,
    pub backup: Countdown,
    pub spawning_wave: bool,
    pub show_wave_complete: bool,
}

impl Level {
    /// Fresh level with wave 1 already on the field
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut level = Self {
            room: Room::default(),
            current_wave: 1,
            difficulty: Difficulty::Easy,
            transition: Countdown::idle(),
            backup: Countdown::idle(),
            spawning_wave: false,
            show_wave_complete: false,
        };
        level.populate(1, rng);
        level
    }

    fn populate<R: Rng + ?Sized>(&mut self, wave: u32, rng: &mut R) {
        self.spawning_wave = true;
        self.show_wave_complete = false;
        self.difficulty = Difficulty::for_wave(wave);

        let room = &mut self.room;
        room.wave_number = wave;
        room.cleared = false;
        room.wave_completed = false;
        room.boss_spawned = false;
        room.enemies = spawn_formation(wave, rng);
        room.enemies_remaining = room.enemies.len();

        log::info!(
            "Wave {} spawned ({} {}, difficulty {})",
            wave,
            room.enemies.len(),
            Formation::for_wave(wave).as_str(),
            self.difficulty.as_str()
        );
        self.spawning_wave = false;
    }

    /// Advance wave timers; returns the new wave number when one spawned
    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) -> Option<u32> {
        let mut spawned = None;
        if self.transition.tick(dt) {
            log::debug!("Wave transition complete");
            spawned = self.spawn_next_wave(rng);
        }
        if self.backup.tick(dt) {
            log::warn!("Backup wave timer fired");
            spawned = self.spawn_next_wave(rng).or(spawned);
        }
        spawned
    }

    /// True exactly once per wave, when the field empties after a real spawn
    pub fn check_room_cleared(&mut self) -> bool {
        let room = &mut self.room;
        let done = room.enemies.is_empty()
            && !room.cleared
            && room.enemies_remaining > 0
            && !self.spawning_wave
            && !room.wave_completed;
        if !done {
            return false;
        }

        room.cleared = true;
        room.wave_completed = true;
        self.show_wave_complete = true;
        let delay = self.difficulty.transition_delay();
        self.transition = Countdown::new(delay);
        self.backup = Countdown::new(delay + 1.0);
        log::info!("Wave {} completed, next in {:.1}s", room.wave_number, delay);
        true
    }

    fn spawn_next_wave<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<u32> {
        if self.spawning_wave {
            log::warn!("Wave spawn already in progress");
            return None;
        }
        self.transition.stop();
        self.backup.stop();
        self.show_wave_complete = false;
        self.current_wave += 1;
        self.populate(self.current_wave, rng);
        Some(self.current_wave)
    }

    /// Skip the transition and spawn the next wave now
    pub fn force_next_wave<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<u32> {
        self.spawn_next_wave(rng)
    }

    pub fn is_wave_transitioning(&self) -> bool {
        self.transition.is_running() || self.show_wave_complete
    }

    pub fn transition_time_remaining(&self) -> f32 {
        self.transition.remaining()
    }

    /// One-line debug summary
    pub fn status(&self) -> String {
        format!(
            "Wave: {}, Enemies: {}, Transition: {:.1}s, Spawning: {}, Completed: {}",
            self.current_wave,
            self.room.enemies.len(),
            self.transition.remaining(),
            self.spawning_wave,
            self.room.wave_completed
        )
    }
}
