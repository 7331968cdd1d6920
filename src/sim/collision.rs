//! Tile collision queries
//!
//! Converts pixel-space rectangles into tile-grid solidity answers. A
//! rectangle may occupy a position only if every sampled point lands on a
//! passable tile. Sampling is corners only, plus the two mid-height edge
//! points for bodies taller than one tile, so slivers thinner than the
//! sample spacing are not caught.
//!
//! Edge policy (gameplay depends on it):
//! - left of x = 0 or above y = 0 is solid
//! - at or below the grid's pixel height is open (falling into a pit is legal)
//! - right of the last column is solid

use super::hitbox::Hitbox;
use super::tile::{TileGrid, TileSolidity};

/// Solidity of the single pixel (`px`, `py`) under `rule`
pub fn is_solid_at(grid: &TileGrid, px: f32, py: f32, rule: &impl TileSolidity) -> bool {
    if px < 0.0 || py < 0.0 {
        return true;
    }
    if py >= grid.pixel_height() {
        return false;
    }

    let tile_x = (px / grid.tile_size()).floor() as usize;
    let tile_y = (py / grid.tile_size()).floor() as usize;

    if tile_y >= grid.rows() {
        return false;
    }
    if tile_x >= grid.cols() {
        return true;
    }

    grid.is_solid_tile(tile_x, tile_y, rule)
}

/// Can a rectangle of `width` x `height` sit with its top-left at (`x`, `y`)?
pub fn can_occupy(
    grid: &TileGrid,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    rule: &impl TileSolidity,
) -> bool {
    let right = x + width;
    let bottom = y + height;

    let corners_clear = !is_solid_at(grid, x, y, rule)
        && !is_solid_at(grid, right, y, rule)
        && !is_solid_at(grid, x, bottom, rule)
        && !is_solid_at(grid, right, bottom, rule);
    if !corners_clear {
        return false;
    }

    if height > grid.tile_size() {
        let mid = y + height / 2.0;
        return !is_solid_at(grid, x, mid, rule) && !is_solid_at(grid, right, mid, rule);
    }

    true
}

/// [`can_occupy`] for an existing hitbox
#[inline]
pub fn can_occupy_hitbox(grid: &TileGrid, hitbox: &Hitbox, rule: &impl TileSolidity) -> bool {
    can_occupy(grid, hitbox.x, hitbox.y, hitbox.width, hitbox.height, rule)
}

/// Is there solid ground one pixel below either bottom corner?
pub fn is_on_floor(grid: &TileGrid, hitbox: &Hitbox, rule: &impl TileSolidity) -> bool {
    let probe_y = hitbox.bottom() + 1.0;
    is_solid_at(grid, hitbox.x, probe_y, rule) || is_solid_at(grid, hitbox.right(), probe_y, rule)
}
