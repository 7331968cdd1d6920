//! Arena Sim - simulation core for a tile-based side-scrolling platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (tile collision, kinematics, boss AI, projectiles)
//! - `tuning`: Data-driven game balance

pub mod sim;
pub mod tuning;

pub use tuning::{ItemTuning, Tuning, TuningError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Pixel scale applied to every authored size and speed
    pub const SCALE: f32 = 1.5;
    /// Authored tile size before scaling
    pub const TILES_DEFAULT_SIZE: f32 = 32.0;
    /// Tile edge length in pixels
    pub const TILE_SIZE: f32 = TILES_DEFAULT_SIZE * SCALE;
    /// Rows in every level grid
    pub const TILES_IN_HEIGHT: usize = 14;
    /// Columns visible at once (viewport width)
    pub const TILES_IN_WIDTH: usize = 26;

    /// Fixed simulation rate (updates per second)
    pub const SIM_HZ: u32 = 200;
    /// Milliseconds per simulation tick
    pub const MS_PER_TICK: u64 = 1000 / SIM_HZ as u64;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Viewport dimensions in pixels
    pub const GAME_WIDTH: f32 = TILES_IN_WIDTH as f32 * TILE_SIZE;
    pub const GAME_HEIGHT: f32 = TILES_IN_HEIGHT as f32 * TILE_SIZE;
}

/// Unit vector from `from` to `to`, or `None` when the points coincide
#[inline]
pub fn direction_between(from: Vec2, to: Vec2) -> Option<Vec2> {
    let delta = to - from;
    if delta.length_squared() > 0.0 {
        Some(delta.normalize())
    } else {
        None
    }
}

/// Horizontal sign (-1, 0, +1) of `target - origin`, with a dead zone
#[inline]
pub fn horizontal_sign(origin: f32, target: f32, dead_zone: f32) -> f32 {
    if target < origin - dead_zone {
        -1.0
    } else if target > origin + dead_zone {
        1.0
    } else {
        0.0
    }
}
