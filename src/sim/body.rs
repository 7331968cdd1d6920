//! Kinematic body integration
//!
//! Each tick moves a body along x, then along y. Each axis is all-or-nothing:
//! the candidate position for that axis alone is checked against the tile
//! grid and either committed in full or rejected, never split. A rejected
//! axis applies its blocked policy instead.

use serde::{Deserialize, Serialize};

use super::collision::{can_occupy, is_on_floor};
use super::hitbox::Hitbox;
use super::tile::{Solidity, TileGrid};

/// Result of one axis update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisOutcome {
    /// Candidate position committed (or there was nothing to move)
    Moved,
    /// Candidate position rejected, position unchanged
    Blocked,
}

impl AxisOutcome {
    #[inline]
    pub fn is_blocked(self) -> bool {
        self == AxisOutcome::Blocked
    }
}

/// What happens to horizontal speed when a wall blocks the move
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HorizontalBlock {
    /// Zero the speed
    Stop,
    /// Flip the direction, keep the magnitude
    Reverse,
    /// Flip the direction and scale the magnitude
    ReverseDamped(f32),
}

/// Gravity-arc vertical movement parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gravity {
    /// Added to vertical speed every airborne tick (px/tick²)
    pub acceleration: f32,
    /// Vertical speed set by a jump (negative = up)
    pub jump_speed: f32,
}

/// Smoothed hover toward a periodically re-chosen altitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hover {
    pub target_y: f32,
    pub smoothing: f32,
    pub max_speed: f32,
    /// Highest allowed target (smallest y)
    pub min_y: f32,
    /// Lowest allowed target (largest y)
    pub max_y: f32,
    pub next_retarget_ms: u64,
}

impl Hover {
    /// Vertical speed this tick: `clamp((target - y) * smoothing, -max, max)`
    pub fn desired_speed(&self, current_y: f32) -> f32 {
        let max = self.max_speed.abs();
        ((self.target_y - current_y) * self.smoothing).max(-max).min(max)
    }

    #[inline]
    pub fn retarget_due(&self, now_ms: u64) -> bool {
        now_ms >= self.next_retarget_ms
    }

    /// Pick a new target altitude, bounded to the band, and schedule the next change
    pub fn retarget(&mut self, desired_y: f32, now_ms: u64, next_in_ms: u64) {
        self.target_y = desired_y.min(self.max_y).max(self.min_y);
        self.next_retarget_ms = now_ms + next_in_ms;
    }
}

/// Per-entity position and velocity state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KinematicBody {
    pub hitbox: Hitbox,
    /// Horizontal speed (px/tick)
    pub x_speed: f32,
    /// Vertical speed (px/tick, positive = down)
    pub y_speed: f32,
    pub grounded: bool,
    pub jumps_remaining: u8,
    pub max_jumps: u8,
    /// Which tile codes block this body
    pub solidity: Solidity,
    pub on_wall: HorizontalBlock,
}

impl KinematicBody {
    pub fn new(hitbox: Hitbox, solidity: Solidity) -> Self {
        Self {
            hitbox,
            x_speed: 0.0,
            y_speed: 0.0,
            grounded: false,
            jumps_remaining: 0,
            max_jumps: 0,
            solidity,
            on_wall: HorizontalBlock::Stop,
        }
    }

    pub fn with_jumps(mut self, max_jumps: u8) -> Self {
        self.max_jumps = max_jumps;
        self
    }

    pub fn with_wall_policy(mut self, on_wall: HorizontalBlock) -> Self {
        self.on_wall = on_wall;
        self
    }

    /// Could this body's hitbox sit with its top-left at (`x`, `y`)?
    #[inline]
    pub fn fits_at(&self, grid: &TileGrid, x: f32, y: f32) -> bool {
        can_occupy(grid, x, y, self.hitbox.width, self.hitbox.height, &self.solidity)
    }

    #[inline]
    pub fn on_floor(&self, grid: &TileGrid) -> bool {
        is_on_floor(grid, &self.hitbox, &self.solidity)
    }

    /// Move by `x_speed` along x, or apply the wall policy
    pub fn step_horizontal(&mut self, grid: &TileGrid) -> AxisOutcome {
        if self.x_speed == 0.0 {
            return AxisOutcome::Moved;
        }

        let candidate = self.hitbox.x + self.x_speed;
        if self.fits_at(grid, candidate, self.hitbox.y) {
            self.hitbox.x = candidate;
            return AxisOutcome::Moved;
        }

        self.x_speed = match self.on_wall {
            HorizontalBlock::Stop => 0.0,
            HorizontalBlock::Reverse => -self.x_speed,
            HorizontalBlock::ReverseDamped(factor) => -self.x_speed * factor,
        };
        AxisOutcome::Blocked
    }

    /// Move by `dy` along y if the whole rectangle fits there
    pub fn step_vertical(&mut self, grid: &TileGrid, dy: f32) -> AxisOutcome {
        if dy == 0.0 {
            return AxisOutcome::Moved;
        }

        let candidate = self.hitbox.y + dy;
        if self.fits_at(grid, self.hitbox.x, candidate) {
            self.hitbox.y = candidate;
            AxisOutcome::Moved
        } else {
            AxisOutcome::Blocked
        }
    }

    /// One gravity-arc tick: refresh grounded state, accelerate, move, resolve
    pub fn step_gravity(&mut self, grid: &TileGrid, gravity: &Gravity) -> AxisOutcome {
        if self.grounded {
            if self.on_floor(grid) {
                self.jumps_remaining = self.max_jumps;
                return AxisOutcome::Moved;
            }
            // Walked off a ledge
            self.grounded = false;
        }

        self.y_speed += gravity.acceleration;
        let outcome = self.step_vertical(grid, self.y_speed);
        if outcome.is_blocked() {
            if self.y_speed < 0.0 {
                // Head hit a ceiling
                self.y_speed = 0.0;
            } else {
                self.land();
            }
        }
        outcome
    }

    /// One hover tick toward `hover.target_y`
    pub fn step_hover(&mut self, grid: &TileGrid, hover: &Hover) -> AxisOutcome {
        let desired = hover.desired_speed(self.hitbox.y);
        let outcome = self.step_vertical(grid, desired);
        self.y_speed = match outcome {
            AxisOutcome::Moved => desired,
            AxisOutcome::Blocked => 0.0,
        };
        outcome
    }

    /// Coarse gravity: drop `step` pixels if there is room
    pub fn creep_down(&mut self, grid: &TileGrid, step: f32) -> AxisOutcome {
        let outcome = self.step_vertical(grid, step);
        self.grounded = outcome.is_blocked();
        outcome
    }

    /// Start a jump if any jumps remain
    pub fn jump(&mut self, gravity: &Gravity) -> bool {
        if self.jumps_remaining == 0 {
            return false;
        }
        self.jumps_remaining -= 1;
        self.y_speed = gravity.jump_speed;
        self.grounded = false;
        true
    }

    /// Become grounded: stop falling and refill jumps
    pub fn land(&mut self) {
        self.grounded = true;
        self.y_speed = 0.0;
        self.jumps_remaining = self.max_jumps;
    }

    /// External respawn/teleport reset
    pub fn teleport(&mut self, x: f32, y: f32) {
        self.hitbox = self.hitbox.at(x, y);
        self.x_speed = 0.0;
        self.y_speed = 0.0;
        self.grounded = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tile::{AIR, GROUND};

    const TS: f32 = 48.0;

    fn floor_grid() -> TileGrid {
        let mut grid = TileGrid::filled(12, 8, AIR, TS).unwrap();
        grid.fill_span(7, 0..=11, GROUND);
        grid.set(8, 6, GROUND);
        grid
    }

    fn gravity() -> Gravity {
        Gravity {
            acceleration: 0.06,
            jump_speed: -4.2,
        }
    }

    #[test]
    fn test_blocked_horizontal_keeps_position() {
        let grid = floor_grid();
        // Right edge 2px short of the block at column 8
        let hitbox = Hitbox::new(8.0 * TS - 32.0, 6.0 * TS + 10.0, 30.0, 30.0);
        let mut body = KinematicBody::new(hitbox, Solidity::Ground);
        body.x_speed = 5.0;
        assert_eq!(body.step_horizontal(&grid), AxisOutcome::Blocked);
        assert_eq!(body.hitbox.x, hitbox.x);
        assert_eq!(body.x_speed, 0.0);
    }

    #[test]
    fn test_wall_policies() {
        let grid = floor_grid();
        let hitbox = Hitbox::new(8.0 * TS - 32.0, 6.0 * TS + 10.0, 30.0, 30.0);

        let mut reverse = KinematicBody::new(hitbox, Solidity::Ground)
            .with_wall_policy(HorizontalBlock::Reverse);
        reverse.x_speed = 5.0;
        reverse.step_horizontal(&grid);
        assert_eq!(reverse.x_speed, -5.0);

        let mut damped = KinematicBody::new(hitbox, Solidity::Ground)
            .with_wall_policy(HorizontalBlock::ReverseDamped(0.5));
        damped.x_speed = 4.0;
        damped.step_horizontal(&grid);
        assert_eq!(damped.x_speed, -2.0);
    }

    #[test]
    fn test_gravity_lands_and_resets_jumps() {
        let grid = floor_grid();
        let hitbox = Hitbox::new(50.0, 5.0 * TS, 30.0, 60.0);
        let mut body = KinematicBody::new(hitbox, Solidity::Ground).with_jumps(2);

        for _ in 0..400 {
            body.step_gravity(&grid, &gravity());
        }
        assert!(body.grounded);
        assert_eq!(body.y_speed, 0.0);
        assert_eq!(body.jumps_remaining, 2);
        assert!(body.hitbox.bottom() < 7.0 * TS);
    }

    #[test]
    fn test_double_jump_then_exhausted() {
        let grid = floor_grid();
        let hitbox = Hitbox::new(50.0, 7.0 * TS - 61.0, 30.0, 60.0);
        let mut body = KinematicBody::new(hitbox, Solidity::Ground).with_jumps(2);
        body.land();

        assert!(body.jump(&gravity()));
        assert!(!body.grounded);
        assert!(body.jump(&gravity()));
        assert!(!body.jump(&gravity()));
        assert_eq!(body.y_speed, -4.2);

        body.step_gravity(&grid, &gravity());
        assert!(body.hitbox.y < hitbox.y);
    }

    #[test]
    fn test_ceiling_zeroes_speed_and_stays_airborne() {
        let mut grid = floor_grid();
        grid.fill_span(4, 0..=11, GROUND);
        // Head 1px under the ceiling row
        let hitbox = Hitbox::new(50.0, 5.0 * TS + 1.0, 30.0, 30.0);
        let mut body = KinematicBody::new(hitbox, Solidity::Ground).with_jumps(2);
        body.jumps_remaining = 1;
        body.jump(&gravity());

        assert_eq!(body.step_gravity(&grid, &gravity()), AxisOutcome::Blocked);
        assert_eq!(body.y_speed, 0.0);
        assert!(!body.grounded);
        assert_eq!(body.hitbox.y, hitbox.y);
    }

    #[test]
    fn test_walking_off_ledge_becomes_airborne() {
        let mut grid = TileGrid::filled(12, 8, AIR, TS).unwrap();
        grid.fill_span(7, 0..=3, GROUND);
        let hitbox = Hitbox::new(6.0 * TS, 7.0 * TS - 61.0, 30.0, 60.0);
        let mut body = KinematicBody::new(hitbox, Solidity::Ground).with_jumps(2);
        body.land();

        body.step_gravity(&grid, &gravity());
        assert!(!body.grounded);
        assert!(body.hitbox.y > hitbox.y);
    }

    #[test]
    fn test_hover_clamps_speed_and_band() {
        let mut hover = Hover {
            target_y: 100.0,
            smoothing: 0.04,
            max_speed: 2.25,
            min_y: 111.0,
            max_y: 399.0,
            next_retarget_ms: 800,
        };
        assert_eq!(hover.desired_speed(400.0), -2.25);
        assert!((hover.desired_speed(110.0) - (-0.4)).abs() < 0.0001);

        assert!(!hover.retarget_due(799));
        assert!(hover.retarget_due(800));
        hover.retarget(20.0, 800, 1000);
        assert_eq!(hover.target_y, 111.0);
        assert_eq!(hover.next_retarget_ms, 1800);
        hover.retarget(900.0, 1800, 1000);
        assert_eq!(hover.target_y, 399.0);
    }

    #[test]
    fn test_creep_down_grounds_on_floor() {
        let grid = floor_grid();
        let hitbox = Hitbox::new(50.0, 7.0 * TS - 33.5, 30.0, 33.0);
        let mut body = KinematicBody::new(hitbox, Solidity::Ground);
        assert_eq!(body.creep_down(&grid, 1.0), AxisOutcome::Blocked);
        assert!(body.grounded);
        assert_eq!(body.hitbox.y, hitbox.y);
    }
}
