//! Axis-aligned hitbox geometry
//!
//! Every entity collides and measures distance through one of these. Pixel
//! space, origin at the top-left, y grows downward.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Hitbox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Hitbox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Hitbox of `width` x `height` centered on `center`
    pub fn centered(center: Vec2, width: f32, height: f32) -> Self {
        Self::new(
            center.x - width / 2.0,
            center.y - height / 2.0,
            width,
            height,
        )
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Same size, moved to a new top-left corner
    #[inline]
    pub fn at(&self, x: f32, y: f32) -> Self {
        Self { x, y, ..*self }
    }

    #[inline]
    pub fn translated(&self, delta: Vec2) -> Self {
        self.at(self.x + delta.x, self.y + delta.y)
    }

    /// Open-interval overlap test (touching edges do not intersect)
    pub fn intersects(&self, other: &Hitbox) -> bool {
        if self.width <= 0.0 || self.height <= 0.0 || other.width <= 0.0 || other.height <= 0.0 {
            return false;
        }
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Reduce width and height by `by`, keeping the top-left corner
    pub fn shrunk(&self, by: f32) -> Self {
        Self::new(
            self.x,
            self.y,
            (self.width - by).max(1.0),
            (self.height - by).max(1.0),
        )
    }
}
