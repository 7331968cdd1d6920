//! Data-driven game balance
//!
//! Every speed, threshold and timer the simulation reads lives here. Defaults
//! match the shipped game at `SCALE = 1.5`; a JSON file may override any
//! subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{MS_PER_TICK, SCALE, TILE_SIZE};

/// Failures while loading or validating tuning data
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Level-wide values
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    /// Tile edge length in pixels
    pub tile_size: f32,
    /// Projectile culling margin around the level
    pub projectile_margin: f32,
    /// How far past the bottom of the level a body must fall to count as a pit death
    pub pit_margin: f32,
    /// Milliseconds per simulation tick
    pub ms_per_tick: u64,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            tile_size: TILE_SIZE,
            projectile_margin: 200.0,
            pit_margin: 10.0,
            ms_per_tick: MS_PER_TICK,
        }
    }
}

impl WorldTuning {
    /// Simulation timestep in seconds, as driven by the game clock
    #[inline]
    pub fn tick_seconds(&self) -> f32 {
        self.ms_per_tick as f32 / 1000.0
    }
}

/// Player body and hearts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub speed: f32,
    pub gravity: f32,
    pub jump_speed: f32,
    pub max_jumps: u8,
    pub max_hearts: i32,
    /// Debounce between two accepted hits
    pub damage_cooldown_ms: u64,
    pub width: f32,
    pub height: f32,
    pub attack_width: f32,
    pub attack_height: f32,
    /// Damage dealt to the boss per accepted melee hit
    pub attack_damage: i32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            speed: 1.0 * SCALE,
            gravity: 0.04 * SCALE,
            jump_speed: -2.8 * SCALE,
            max_jumps: 2,
            max_hearts: 3,
            damage_cooldown_ms: 600,
            width: 20.0 * SCALE,
            height: 40.0 * SCALE,
            attack_width: 30.0 * SCALE,
            attack_height: 40.0 * SCALE,
            attack_damage: 1,
        }
    }
}

/// Optional ranged attack for regular enemies
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyRangedTuning {
    pub cooldown_ms: u64,
    /// Horizontal distance at which the enemy opens fire
    pub sight_range: f32,
    pub projectile_speed: f32,
    pub projectile_size: f32,
    pub projectile_damage: i32,
}

impl Default for EnemyRangedTuning {
    fn default() -> Self {
        Self {
            cooldown_ms: 2000,
            sight_range: 240.0 * SCALE,
            projectile_speed: 2.0 * SCALE,
            projectile_size: 8.0 * SCALE,
            projectile_damage: 1,
        }
    }
}

/// Regular patrolling enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub speed: f32,
    pub width: f32,
    pub height: f32,
    /// Hitbox is this much narrower/shorter than the sprite
    pub hitbox_inset: f32,
    /// Pixels dropped per tick when unsupported
    pub fall_step: f32,
    pub contact_damage: i32,
    /// Tile columns enemies spawn on
    pub spawn_columns: Vec<usize>,
    pub ranged: Option<EnemyRangedTuning>,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            speed: 0.5 * SCALE,
            width: 24.0 * SCALE,
            height: 32.0 * SCALE,
            hitbox_inset: 10.0 * SCALE,
            fall_step: 1.0,
            contact_damage: 1,
            spawn_columns: vec![5, 12, 20],
            ranged: None,
        }
    }
}

/// The boss archetype
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BossTuning {
    pub width: f32,
    pub height: f32,
    pub hitbox_inset: f32,
    /// Spawn height above the arena floor
    pub spawn_lift: f32,

    pub base_speed: f32,
    pub charge_speed: f32,
    /// Attack-state speed = charge speed * this
    pub attack_multiplier: f32,
    /// Speed kept (reversed) after bumping into a wall
    pub wall_damping: f32,

    /// Patrol -> Chase below this distance
    pub near_threshold: f32,
    /// Chase -> Attack below this distance
    pub attack_threshold: f32,
    /// Chase stops inside this horizontal band around the target
    pub chase_dead_zone: f32,
    pub chase_min_ms: u64,
    /// Per-tick chance of starting an attack once every other gate passes
    pub attack_chance: f32,
    pub attack_cooldown_ms: u64,
    pub attack_cooldown_jitter_ms: u64,
    pub initial_attack_delay_ms: u64,
    pub attack_duration_ms: u64,
    pub retreat_duration_ms: u64,

    /// Patrol bounds, in tile columns
    pub patrol_left_tile: usize,
    pub patrol_right_tile: usize,

    pub max_health: i32,
    pub invulnerability_ms: u64,
    pub death_duration_ticks: u32,

    pub hover_smoothing: f32,
    pub hover_max_speed: f32,
    /// Hover band, in rows above the bottom of the grid
    pub hover_low_rows: usize,
    pub hover_high_rows: usize,
    /// Random offset (+/-) around the target's altitude
    pub hover_offset: f32,
    pub hover_retarget_ms: u64,
    pub hover_retarget_jitter_ms: u64,
    pub hover_first_retarget_ms: u64,

    pub projectile_cooldown_ms: u64,
    /// Per-tick chance of firing once the cooldown has elapsed
    pub shot_chance: f32,
    pub projectile_speed: f32,
    pub projectile_size: f32,
    pub projectile_damage: i32,
    pub projectile_max_age_ms: u64,
    pub contact_damage: i32,

    /// Delay between entering the arena and the boss appearing
    pub intro_ms: u64,
}

impl Default for BossTuning {
    fn default() -> Self {
        Self {
            width: 64.0 * SCALE,
            height: 64.0 * SCALE,
            hitbox_inset: 10.0 * SCALE,
            spawn_lift: 40.0 * SCALE,

            base_speed: 0.8 * SCALE,
            charge_speed: 1.3 * SCALE,
            attack_multiplier: 1.3,
            wall_damping: 0.5,

            near_threshold: 300.0 * SCALE,
            attack_threshold: 130.0 * SCALE,
            chase_dead_zone: 70.0,
            chase_min_ms: 800,
            attack_chance: 0.20,
            attack_cooldown_ms: 3000,
            attack_cooldown_jitter_ms: 2000,
            initial_attack_delay_ms: 2000,
            attack_duration_ms: 800,
            retreat_duration_ms: 1000,

            patrol_left_tile: 3,
            patrol_right_tile: 41,

            max_health: 5,
            invulnerability_ms: 500,
            death_duration_ticks: 60,

            hover_smoothing: 0.04,
            hover_max_speed: 1.5 * SCALE,
            hover_low_rows: 4,
            hover_high_rows: 10,
            hover_offset: 80.0,
            hover_retarget_ms: 800,
            hover_retarget_jitter_ms: 700,
            hover_first_retarget_ms: 800,

            projectile_cooldown_ms: 2500,
            shot_chance: 0.25,
            projectile_speed: 2.0 * SCALE,
            projectile_size: 12.0 * SCALE,
            projectile_damage: 1,
            projectile_max_age_ms: 10_000,
            contact_damage: 1,

            intro_ms: 4000,
        }
    }
}

/// Spikes and heart pickups
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemTuning {
    pub spike_size: f32,
    pub spike_damage: i32,
    /// Tile columns that get a spike in a regular level
    pub spike_columns: Vec<usize>,
    /// Tile columns that get a spike in a boss arena
    pub arena_spike_columns: Vec<usize>,
    pub heart_size: f32,
    /// Gap between a heart and the ground under it
    pub heart_lift: f32,
    /// Hearts restored per pickup
    pub heart_heal: i32,
    /// Where a level's heart is aimed, as a fraction of the level width
    pub heart_level_fraction: f32,
    /// Columns tried around the aimed one
    pub heart_search_span: usize,
    pub heart_fallback_column: usize,
    /// Tile columns that get a heart in a boss arena
    pub arena_heart_columns: Vec<usize>,
}

impl Default for ItemTuning {
    fn default() -> Self {
        Self {
            spike_size: 16.0 * SCALE,
            spike_damage: 1,
            spike_columns: vec![6, 10, 16, 21],
            arena_spike_columns: Vec::new(),
            heart_size: 16.0 * SCALE,
            heart_lift: 4.0 * SCALE,
            heart_heal: 1,
            heart_level_fraction: 0.7,
            heart_search_span: 10,
            heart_fallback_column: 10,
            arena_heart_columns: vec![8, 22, 36],
        }
    }
}

/// Complete balance data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub world: WorldTuning,
    pub player: PlayerTuning,
    pub enemy: EnemyTuning,
    pub boss: BossTuning,
    pub items: ItemTuning,
}

impl Tuning {
    /// Parse and validate a JSON document (missing fields keep their defaults)
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read, parse and validate a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    /// [`Tuning::load`], falling back to defaults on any failure
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!(
                    "Using default tuning ({}): {}",
                    path.as_ref().display(),
                    e
                );
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        fn invalid(field: &'static str, reason: &'static str) -> Result<(), TuningError> {
            Err(TuningError::Invalid { field, reason })
        }

        if !(self.world.tile_size > 0.0) {
            return invalid("world.tile_size", "must be positive");
        }
        if self.world.ms_per_tick == 0 {
            return invalid("world.ms_per_tick", "must be positive");
        }
        if self.world.projectile_margin < 0.0 {
            return invalid("world.projectile_margin", "must not be negative");
        }

        for (field, size) in [
            ("player.width", self.player.width),
            ("player.height", self.player.height),
            ("enemy.width", self.enemy.width),
            ("enemy.height", self.enemy.height),
            ("boss.width", self.boss.width),
            ("boss.height", self.boss.height),
            ("boss.projectile_size", self.boss.projectile_size),
            ("items.spike_size", self.items.spike_size),
            ("items.heart_size", self.items.heart_size),
        ] {
            if !(size > 0.0) {
                return invalid(field, "must be positive");
            }
        }

        for (field, chance) in [
            ("boss.attack_chance", self.boss.attack_chance),
            ("boss.shot_chance", self.boss.shot_chance),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return invalid(field, "must be within [0, 1]");
            }
        }

        if self.player.max_hearts <= 0 {
            return invalid("player.max_hearts", "must be positive");
        }
        if self.boss.max_health <= 0 {
            return invalid("boss.max_health", "must be positive");
        }
        if self.boss.death_duration_ticks == 0 {
            return invalid("boss.death_duration_ticks", "must be positive");
        }
        if self.boss.hover_max_speed < 0.0 {
            return invalid("boss.hover_max_speed", "must not be negative");
        }
        if self.boss.patrol_left_tile >= self.boss.patrol_right_tile {
            return invalid("boss.patrol_left_tile", "must be left of patrol_right_tile");
        }
        if self.boss.hover_low_rows > self.boss.hover_high_rows {
            return invalid("boss.hover_low_rows", "must not exceed hover_high_rows");
        }
        if !(0.0..=1.0).contains(&self.items.heart_level_fraction) {
            return invalid("items.heart_level_fraction", "must be within [0, 1]");
        }
        if self.items.heart_lift < 0.0 {
            return invalid("items.heart_lift", "must not be negative");
        }
        if !(self.enemy.fall_step > 0.0) {
            return invalid("enemy.fall_step", "must be positive");
        }
        if let Some(ranged) = &self.enemy.ranged {
            if !(ranged.projectile_size > 0.0) {
                return invalid("enemy.ranged.projectile_size", "must be positive");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let tuning = Tuning::default();
        assert!(tuning.validate().is_ok());
        assert_eq!(tuning.world.tile_size, 48.0);
        assert_eq!(tuning.boss.near_threshold, 450.0);
        assert_eq!(tuning.boss.attack_threshold, 195.0);
        assert_eq!(tuning.items.spike_columns, vec![6, 10, 16, 21]);
        assert_eq!(tuning.items.heart_size, 24.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "boss": { "max_health": 8 } }"#).unwrap();
        assert_eq!(tuning.boss.max_health, 8);
        assert_eq!(tuning.boss.invulnerability_ms, 500);
        assert_eq!(tuning.player.max_jumps, 2);
    }

    #[test]
    fn test_rejects_bad_chance() {
        let err = Tuning::from_json(r#"{ "boss": { "attack_chance": 1.5 } }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::Invalid {
                field: "boss.attack_chance",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_non_positive_fall_step() {
        for json in [
            r#"{ "enemy": { "fall_step": 0.0 } }"#,
            r#"{ "enemy": { "fall_step": -1.0 } }"#,
        ] {
            assert!(matches!(
                Tuning::from_json(json),
                Err(TuningError::Invalid {
                    field: "enemy.fall_step",
                    ..
                })
            ));
        }
    }

    #[test]
    fn test_tick_seconds_follows_ms_per_tick() {
        let mut world = WorldTuning::default();
        assert_eq!(world.tick_seconds(), 0.005);
        world.ms_per_tick = 10;
        assert_eq!(world.tick_seconds(), 0.01);
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Json(_))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let mut tuning = Tuning::default();
        tuning.enemy.ranged = Some(EnemyRangedTuning::default());
        let json = tuning.to_json().unwrap();
        let back = Tuning::from_json(&json).unwrap();
        assert!(back.enemy.ranged.is_some());
        assert_eq!(back.boss.death_duration_ticks, 60);
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let tuning = Tuning::load_or_default("/nonexistent/arena-sim/tuning.json");
        assert_eq!(tuning.boss.max_health, 5);
    }
}
