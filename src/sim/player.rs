//! The player's body, hearts and melee attack

use serde::{Deserialize, Serialize};

use super::body::{Gravity, KinematicBody};
use super::clock::Clock;
use super::hitbox::Hitbox;
use super::tile::{Solidity, TileGrid};
use crate::tuning::PlayerTuning;

/// Player intent for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInput {
    pub left: bool,
    pub right: bool,
    /// Jump pressed this tick
    pub jump: bool,
    /// Attack held
    pub attack: bool,
}

/// The player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: KinematicBody,
    gravity: Gravity,
    speed: f32,
    facing_left: bool,
    attacking: bool,
    moving: bool,
    hearts: i32,
    max_hearts: i32,
    last_hit_ms: Option<u64>,
    damage_cooldown_ms: u64,
    attack_width: f32,
    attack_height: f32,
}

impl Player {
    /// Player with its hitbox's top-left corner at (`x`, `y`)
    pub fn new(x: f32, y: f32, tuning: &PlayerTuning) -> Self {
        let hitbox = Hitbox::new(x, y, tuning.width, tuning.height);
        let mut body = KinematicBody::new(hitbox, Solidity::Ground).with_jumps(tuning.max_jumps);
        body.jumps_remaining = tuning.max_jumps;

        Self {
            body,
            gravity: Gravity {
                acceleration: tuning.gravity,
                jump_speed: tuning.jump_speed,
            },
            speed: tuning.speed,
            facing_left: false,
            attacking: false,
            moving: false,
            hearts: tuning.max_hearts,
            max_hearts: tuning.max_hearts,
            last_hit_ms: None,
            damage_cooldown_ms: tuning.damage_cooldown_ms,
            attack_width: tuning.attack_width,
            attack_height: tuning.attack_height,
        }
    }

    /// Sync grounded state with a freshly loaded grid
    pub fn load_level(&mut self, grid: &TileGrid) {
        if self.body.on_floor(grid) {
            self.body.land();
        } else {
            self.body.grounded = false;
        }
    }

    /// Move to a spawn point, clearing motion and attack state
    pub fn respawn(&mut self, x: f32, y: f32, grid: &TileGrid) {
        self.body.teleport(x, y);
        self.body.jumps_remaining = self.body.max_jumps;
        self.attacking = false;
        self.moving = false;
        self.load_level(grid);
    }

    /// Advance one tick. Returns true when a jump started.
    pub fn update(&mut self, grid: &TileGrid, input: &PlayerInput) -> bool {
        let jumped = input.jump && self.body.jump(&self.gravity);

        self.body.x_speed = 0.0;
        if input.left {
            self.facing_left = true;
            self.body.x_speed -= self.speed;
        }
        if input.right {
            self.facing_left = false;
            self.body.x_speed += self.speed;
        }

        self.body.step_horizontal(grid);
        self.body.step_gravity(grid, &self.gravity);

        self.attacking = input.attack;
        self.moving = self.body.x_speed != 0.0 || !self.body.grounded;
        jumped
    }

    /// Lose hearts, at most once per damage cooldown. Returns true if accepted.
    pub fn take_damage(&mut self, amount: i32, clock: &impl Clock) -> bool {
        if amount <= 0 || self.is_defeated() {
            return false;
        }
        let now = clock.now_ms();
        if self
            .last_hit_ms
            .is_some_and(|last| now.saturating_sub(last) < self.damage_cooldown_ms)
        {
            return false;
        }

        self.hearts = (self.hearts - amount).max(0);
        self.last_hit_ms = Some(now);
        log::debug!("Player hit, {} hearts left", self.hearts);
        true
    }

    pub fn heal(&mut self, amount: i32) {
        if amount > 0 {
            self.hearts = (self.hearts + amount).min(self.max_hearts);
        }
    }

    pub fn reset_hearts(&mut self) {
        self.hearts = self.max_hearts;
        self.last_hit_ms = None;
    }

    #[inline]
    pub fn is_defeated(&self) -> bool {
        self.hearts <= 0
    }

    /// Melee box in front of the body, vertically centered, while attacking
    pub fn attack_hitbox(&self) -> Option<Hitbox> {
        if !self.attacking {
            return None;
        }
        let hb = &self.body.hitbox;
        let x = if self.facing_left {
            hb.x - self.attack_width
        } else {
            hb.right()
        };
        let y = hb.y + (hb.height - self.attack_height) / 2.0;
        Some(Hitbox::new(x, y, self.attack_width, self.attack_height))
    }

    /// Bottom edge has dropped `margin` past the bottom of the level
    pub fn fell_into_pit(&self, grid: &TileGrid, margin: f32) -> bool {
        self.body.hitbox.bottom() > grid.pixel_height() + margin
    }

    #[inline]
    pub fn hitbox(&self) -> &Hitbox {
        &self.body.hitbox
    }

    #[inline]
    pub fn hearts(&self) -> i32 {
        self.hearts
    }

    #[inline]
    pub fn max_hearts(&self) -> i32 {
        self.max_hearts
    }

    #[inline]
    pub fn facing_left(&self) -> bool {
        self.facing_left
    }

    #[inline]
    pub fn is_attacking(&self) -> bool {
        self.attacking
    }

    #[inline]
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    #[inline]
    pub fn in_air(&self) -> bool {
        !self.body.grounded
    }
}
