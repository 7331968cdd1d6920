//! Patrolling ground enemy
//!
//! Walks at a constant speed and turns around on two separate triggers: a
//! wall blocking the horizontal move, and a one-pixel probe ahead that finds
//! no floor beneath it. Gravity is a coarse one-pixel creep rather than an
//! accelerated fall.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{HorizontalBlock, KinematicBody};
use super::clock::Clock;
use super::collision::is_on_floor;
use super::hitbox::Hitbox;
use super::projectile::{FieldBounds, Projectile, ProjectileSet};
use super::tile::{Solidity, TileGrid};
use crate::tuning::{EnemyRangedTuning, Tuning};

/// A regular enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub body: KinematicBody,
    fall_step: f32,
    contact_damage: i32,
    defeated: bool,
    ranged: Option<EnemyRangedTuning>,
    last_shot_ms: Option<u64>,
    projectiles: ProjectileSet,
    projectile_margin: f32,
}

impl Enemy {
    /// Enemy whose sprite's top-left corner is at (`x`, `y`), walking right
    pub fn new(x: f32, y: f32, tuning: &Tuning) -> Self {
        let et = &tuning.enemy;
        let hitbox = Hitbox::new(x, y, et.width, et.height).shrunk(et.hitbox_inset);
        let mut body =
            KinematicBody::new(hitbox, Solidity::Ground).with_wall_policy(HorizontalBlock::Reverse);
        body.x_speed = et.speed;

        Self {
            body,
            fall_step: et.fall_step,
            contact_damage: et.contact_damage,
            defeated: false,
            ranged: et.ranged.clone(),
            last_shot_ms: None,
            projectiles: ProjectileSet::new(),
            projectile_margin: tuning.world.projectile_margin,
        }
    }

    /// Advance one tick. Returns true when a projectile was fired.
    pub fn update(&mut self, grid: &TileGrid, target: Option<Hitbox>, clock: &impl Clock) -> bool {
        if self.defeated {
            return false;
        }
        let now = clock.now_ms();

        // Wall ahead: the body's wall policy reverses the speed
        self.body.step_horizontal(grid);

        // No floor ahead. Only probed while standing, so a falling enemy
        // does not flip every tick.
        if self.body.grounded && !is_on_floor(grid, &self.edge_probe(), &self.body.solidity) {
            self.body.x_speed = -self.body.x_speed;
        }

        self.body.creep_down(grid, self.fall_step);

        let fired = match target {
            Some(target) => self.shoot_at(&target, now),
            None => false,
        };

        let bounds = FieldBounds::for_grid(grid, self.projectile_margin);
        self.projectiles.update(&bounds, now);
        fired
    }

    /// One-pixel-wide column just ahead of the body in its walking direction
    fn edge_probe(&self) -> Hitbox {
        let hb = &self.body.hitbox;
        let x = if self.facing_left() {
            hb.x - 1.0
        } else {
            hb.right() + 1.0
        };
        Hitbox::new(x, hb.y, 1.0, hb.height)
    }

    /// Horizontal shot in the facing direction when the target is ahead,
    /// in sight range and at the same height
    fn shoot_at(&mut self, target: &Hitbox, now: u64) -> bool {
        let Some(ranged) = &self.ranged else {
            return false;
        };

        let hb = &self.body.hitbox;
        let dx = target.center_x() - hb.center_x();
        let ahead = if self.facing_left() { dx < 0.0 } else { dx > 0.0 };
        let level = target.y < hb.bottom() && target.bottom() > hb.y;
        if !ahead || !level || dx.abs() > ranged.sight_range {
            return false;
        }
        if self
            .last_shot_ms
            .is_some_and(|last| now.saturating_sub(last) < ranged.cooldown_ms)
        {
            return false;
        }

        let dir = if self.facing_left() { -1.0 } else { 1.0 };
        self.projectiles.spawn(Projectile::new(
            hb.center(),
            Vec2::new(dir * ranged.projectile_speed, 0.0),
            ranged.projectile_size,
            ranged.projectile_damage,
            now,
        ));
        self.last_shot_ms = Some(now);
        true
    }

    /// Mark as beaten by the player; the owner sweeps it at end of tick
    pub fn defeat(&mut self) {
        if !self.defeated {
            self.defeated = true;
            self.projectiles.clear();
        }
    }

    #[inline]
    pub fn is_defeated(&self) -> bool {
        self.defeated
    }

    #[inline]
    pub fn hitbox(&self) -> &Hitbox {
        &self.body.hitbox
    }

    #[inline]
    pub fn facing_left(&self) -> bool {
        self.body.x_speed < 0.0
    }

    #[inline]
    pub fn contact_damage(&self) -> i32 {
        self.contact_damage
    }

    pub fn collides_with_body(&self, target: &Hitbox) -> bool {
        !self.defeated && self.body.hitbox.intersects(target)
    }

    pub fn check_projectile_collision(&mut self, target: &Hitbox) -> i32 {
        self.projectiles.check_collision(target)
    }

    #[inline]
    pub fn projectiles(&self) -> &ProjectileSet {
        &self.projectiles
    }
}
