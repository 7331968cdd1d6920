//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Time read through [`Clock`] only
//! - Seeded RNG only
//! - No rendering, audio or platform dependencies

pub mod arena;
pub mod body;
pub mod boss;
pub mod clock;
pub mod collision;
pub mod enemy;
pub mod hitbox;
pub mod items;
pub mod player;
pub mod projectile;
pub mod spawn;
pub mod tile;

pub use arena::{ArenaPhase, ArenaState, SimEvent, tick};
pub use body::{AxisOutcome, Gravity, HorizontalBlock, Hover, KinematicBody};
pub use boss::{Boss, BossPhase, BossState, DamageOutcome, MachineInputs, next_state};
pub use clock::{Clock, FixedStepClock, ManualClock};
pub use collision::{can_occupy, can_occupy_hitbox, is_on_floor, is_solid_at};
pub use enemy::Enemy;
pub use hitbox::Hitbox;
pub use items::{HeartPickup, Spike};
pub use player::{Player, PlayerInput};
pub use projectile::{FieldBounds, Projectile, ProjectileSet};
pub use spawn::{
    ScanDirection, arena_heart_spawn_points, ground_top, heart_spawn_point, place_on_ground,
    place_or_fallback, spike_spawn_points,
};
pub use tile::{AIR, GROUND, GridError, PLATFORM, Solidity, TileCode, TileGrid, TileSolidity};
