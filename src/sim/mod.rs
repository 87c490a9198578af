//! Real-time simulation module
//!
//! All gameplay logic lives here:
//! - Time comes in from the caller (`Timestamp`); nothing reads a global clock
//! - Randomness goes through the state's seeded RNG
//! - No rendering or platform dependencies; effects leave as sound cues,
//!   particles and the render snapshot

pub mod boss;
pub mod collision;
pub mod enemy;
pub mod level;
pub mod particle;
pub mod pickup;
pub mod player;
pub mod projectile;
pub mod state;
pub mod tick;
pub mod timer;

pub use boss::{AttackPattern, Boss, BossKind, BossState, BulletSpec, Volley, is_boss_wave};
pub use collision::{BulletTarget, find_bullet_target, resolve_collisions};
pub use enemy::{Combatant, Enemy, EnemyKind, difficulty_scale};
pub use level::{Difficulty, Formation, Level, Room};
pub use particle::{Particle, ParticleSystem};
pub use pickup::{Pickup, PickupKind, PickupOutcome, random_pickup_kind};
pub use player::{Player, PowerUp, PowerUpKind, Weapon};
pub use projectile::{BossBullet, Bullet};
pub use state::{GamePhase, GameState, ScreenShake, Snapshot};
pub use tick::{TickInput, tick};
pub use timer::{Countdown, Timestamp};
