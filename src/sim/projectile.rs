//! Straight-line projectiles
//!
//! Projectiles move by a constant velocity each tick and deactivate once they
//! leave the field (plus a margin for camera scroll) or outlive their max
//! age. Hits are polled by the owner's caller; a hit projectile is
//! deactivated so it cannot hit twice. Inactive projectiles are swept at the
//! end of the owner's tick, never removed mid-iteration.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::hitbox::Hitbox;
use super::tile::TileGrid;

/// Region outside of which projectiles are culled
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldBounds {
    pub width: f32,
    pub height: f32,
    /// Extra room on every side (larger than the viewport scroll)
    pub margin: f32,
}

impl FieldBounds {
    pub fn for_grid(grid: &TileGrid, margin: f32) -> Self {
        Self {
            width: grid.pixel_width(),
            height: grid.pixel_height(),
            margin,
        }
    }

    /// Is the hitbox's origin still within the culling region?
    pub fn contains(&self, hitbox: &Hitbox) -> bool {
        hitbox.x >= -self.margin
            && hitbox.x <= self.width + self.margin
            && hitbox.y >= -self.margin
            && hitbox.y <= self.height + self.margin
    }
}

/// A single projectile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub hitbox: Hitbox,
    /// Displacement per tick
    pub velocity: Vec2,
    pub damage: i32,
    active: bool,
    pub spawned_ms: u64,
    /// Culled once this old, if set
    pub max_age_ms: Option<u64>,
    /// Ticks alive (drives the pulse animation)
    pub age_ticks: u32,
}

impl Projectile {
    /// Square projectile of edge `size` centered on `center`
    pub fn new(center: Vec2, velocity: Vec2, size: f32, damage: i32, now_ms: u64) -> Self {
        Self {
            hitbox: Hitbox::centered(center, size, size),
            velocity,
            damage,
            active: true,
            spawned_ms: now_ms,
            max_age_ms: None,
            age_ticks: 0,
        }
    }

    pub fn with_max_age(mut self, max_age_ms: u64) -> Self {
        self.max_age_ms = Some(max_age_ms);
        self
    }

    /// Advance one tick; deactivates when out of bounds or expired
    pub fn update(&mut self, bounds: &FieldBounds, now_ms: u64) {
        if !self.active {
            return;
        }

        self.hitbox = self.hitbox.translated(self.velocity);
        self.age_ticks = self.age_ticks.wrapping_add(1);

        let expired = self
            .max_age_ms
            .is_some_and(|max| now_ms.saturating_sub(self.spawned_ms) >= max);
        if expired || !bounds.contains(&self.hitbox) {
            self.active = false;
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// One-way switch to inactive
    #[inline]
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Active and overlapping `target`
    pub fn hits(&self, target: &Hitbox) -> bool {
        self.active && self.hitbox.intersects(target)
    }

    /// Render scale, pulsing around 1.0
    pub fn pulse_scale(&self) -> f32 {
        1.0 + 0.2 * (self.age_ticks as f32 * 0.2).sin()
    }
}

/// Projectiles owned by one controller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSet {
    projectiles: Vec<Projectile>,
}

impl ProjectileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, projectile: Projectile) {
        self.projectiles.push(projectile);
    }

    /// Tick every projectile, then sweep the inactive ones
    pub fn update(&mut self, bounds: &FieldBounds, now_ms: u64) {
        for projectile in &mut self.projectiles {
            projectile.update(bounds, now_ms);
        }
        self.sweep();
    }

    /// Sum damage from every active projectile touching `target`, deactivating each hit
    pub fn check_collision(&mut self, target: &Hitbox) -> i32 {
        let mut damage = 0;
        for projectile in &mut self.projectiles {
            if projectile.hits(target) {
                damage += projectile.damage;
                projectile.deactivate();
            }
        }
        damage
    }

    pub fn sweep(&mut self) {
        self.projectiles.retain(Projectile::is_active);
    }

    pub fn clear(&mut self) {
        self.projectiles.clear();
    }

    /// Active projectiles (for rendering)
    pub fn active(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.iter().filter(|p| p.is_active())
    }

    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }
}
