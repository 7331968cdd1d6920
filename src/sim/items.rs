//! Static level items: spikes and heart pickups
//!
//! Items never move. The arena checks them against the player once per tick;
//! collected hearts are dropped in the end-of-tick sweep.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::hitbox::Hitbox;

/// Floor hazard that costs hearts on touch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spike {
    pub hitbox: Hitbox,
    pub damage: i32,
}

impl Spike {
    /// Square spike with its top-left corner at `at`
    pub fn new(at: Vec2, size: f32, damage: i32) -> Self {
        Self {
            hitbox: Hitbox::new(at.x, at.y, size, size),
            damage,
        }
    }

    #[inline]
    pub fn touches(&self, target: &Hitbox) -> bool {
        self.hitbox.intersects(target)
    }
}

/// Heart that restores hearts when the player touches it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeartPickup {
    pub hitbox: Hitbox,
    pub heal: i32,
    collected: bool,
}

impl HeartPickup {
    pub fn new(at: Vec2, size: f32, heal: i32) -> Self {
        Self {
            hitbox: Hitbox::new(at.x, at.y, size, size),
            heal,
            collected: false,
        }
    }

    /// Mark collected if `target` touches it. True only on the collecting call.
    pub fn try_collect(&mut self, target: &Hitbox) -> bool {
        if self.collected || !self.hitbox.intersects(target) {
            return false;
        }
        self.collected = true;
        true
    }

    #[inline]
    pub fn is_collected(&self) -> bool {
        self.collected
    }
}
