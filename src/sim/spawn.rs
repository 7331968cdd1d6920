//! Spawn placement on a tile grid
//!
//! Used by level setup, never from inside a tick. A column without ground is
//! not an error: placement returns `None` and the caller picks a fallback.

use glam::Vec2;

use super::collision::can_occupy;
use super::hitbox::Hitbox;
use super::tile::{TileGrid, TileSolidity};
use crate::tuning::{ItemTuning, Tuning};

/// Which end of a column a ground scan starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDirection {
    /// First solid tile from row 0 down (top surface of the highest ledge)
    TopDown,
    /// First solid tile from the last row up (the floor)
    BottomUp,
}

/// Pixel y of the top edge of the first solid tile in `col`
pub fn ground_top(
    grid: &TileGrid,
    col: usize,
    direction: ScanDirection,
    rule: &impl TileSolidity,
) -> Option<f32> {
    if col >= grid.cols() {
        return None;
    }
    let solid = |row: &usize| grid.is_solid_tile(col, *row, rule);
    let row = match direction {
        ScanDirection::TopDown => (0..grid.rows()).find(solid),
        ScanDirection::BottomUp => (0..grid.rows()).rev().find(solid),
    }?;
    Some(row as f32 * grid.tile_size())
}

/// Top y that rests a body of `height` on the ground in `col`
pub fn place_on_ground(
    grid: &TileGrid,
    col: usize,
    height: f32,
    direction: ScanDirection,
    rule: &impl TileSolidity,
) -> Option<f32> {
    ground_top(grid, col, direction, rule).map(|top| top - height)
}

/// [`place_on_ground`], substituting a spot at mid-height of the grid
pub fn place_or_fallback(
    grid: &TileGrid,
    col: usize,
    height: f32,
    direction: ScanDirection,
    rule: &impl TileSolidity,
) -> f32 {
    match place_on_ground(grid, col, height, direction, rule) {
        Some(y) => y,
        None => {
            log::warn!("No ground in column {col}, using fallback placement");
            grid.pixel_height() * 0.5 - height
        }
    }
}

/// Sprite top-left corners for the level's regular enemies
///
/// Columns outside the grid are skipped.
pub fn enemy_spawn_points(grid: &TileGrid, tuning: &Tuning, rule: &impl TileSolidity) -> Vec<Vec2> {
    let ts = grid.tile_size();
    tuning
        .enemy
        .spawn_columns
        .iter()
        .filter_map(|&col| {
            if col >= grid.cols() {
                log::warn!("Enemy spawn column {col} is outside the level, skipped");
                return None;
            }
            let y = place_or_fallback(grid, col, tuning.enemy.height, ScanDirection::BottomUp, rule);
            Some(Vec2::new(col as f32 * ts, y))
        })
        .collect()
}

/// Left x of an item of `size` centered on tile column `col`
fn centered_in_column(grid: &TileGrid, col: usize, size: f32) -> f32 {
    let ts = grid.tile_size();
    col as f32 * ts + ((ts - size) / 2.0).floor()
}

/// Spike top-left corners, each resting on the highest ground in its column
///
/// Columns outside the grid or without ground get no spike.
pub fn spike_spawn_points(
    grid: &TileGrid,
    columns: &[usize],
    size: f32,
    rule: &impl TileSolidity,
) -> Vec<Vec2> {
    columns
        .iter()
        .filter_map(|&col| {
            let y = place_on_ground(grid, col, size, ScanDirection::TopDown, rule)?;
            Some(Vec2::new(centered_in_column(grid, col, size), y))
        })
        .collect()
}

/// Heart top-left in `col`, floating `heart_lift` above the highest ground
fn heart_in_column(grid: &TileGrid, col: usize, items: &ItemTuning, rule: &impl TileSolidity) -> Option<Vec2> {
    let y = place_on_ground(grid, col, items.heart_size + items.heart_lift, ScanDirection::TopDown, rule)?;
    Some(Vec2::new(centered_in_column(grid, col, items.heart_size), y))
}

fn clear_of(spot: Vec2, size: f32, avoid: &[Hitbox]) -> bool {
    let heart = Hitbox::new(spot.x, spot.y, size, size);
    !avoid.iter().any(|other| other.intersects(&heart))
}

/// The level's single heart
///
/// Tried at `heart_search_span` columns around `heart_level_fraction` of the
/// level width. The first spot that is free space and clear of `avoid` wins;
/// otherwise the heart goes on the fallback column, or nowhere if that
/// column has no ground.
pub fn heart_spawn_point(
    grid: &TileGrid,
    items: &ItemTuning,
    avoid: &[Hitbox],
    rule: &impl TileSolidity,
) -> Option<Vec2> {
    let size = items.heart_size;
    let aimed = (grid.cols() as f32 * items.heart_level_fraction) as usize;
    let first = aimed.saturating_sub(items.heart_search_span / 2);

    let found = (first..aimed + items.heart_search_span.div_ceil(2))
        .filter(|&col| col < grid.cols())
        .filter_map(|col| heart_in_column(grid, col, items, rule))
        .find(|spot| can_occupy(grid, spot.x, spot.y, size, size, rule) && clear_of(*spot, size, avoid));
    if found.is_some() {
        return found;
    }

    log::warn!("No free spot for the level heart, trying column {}", items.heart_fallback_column);
    heart_in_column(grid, items.heart_fallback_column, items, rule)
}

/// Boss arena hearts, one per configured column that has ground and is clear of `avoid`
pub fn arena_heart_spawn_points(
    grid: &TileGrid,
    items: &ItemTuning,
    avoid: &[Hitbox],
    rule: &impl TileSolidity,
) -> Vec<Vec2> {
    items
        .arena_heart_columns
        .iter()
        .filter_map(|&col| heart_in_column(grid, col, items, rule))
        .filter(|spot| clear_of(*spot, items.heart_size, avoid))
        .collect()
}

/// Boss sprite top-left: centered in the level, hovering above the floor row
pub fn boss_spawn_point(grid: &TileGrid, tuning: &Tuning) -> Vec2 {
    let bt = &tuning.boss;
    let x = grid.pixel_width() / 2.0 - bt.width / 2.0;
    let floor_y = grid.rows().saturating_sub(2) as f32 * grid.tile_size();
    let y = (floor_y - bt.height - bt.spawn_lift).max(0.0);
    Vec2::new(x, y)
}

/// Player start in a boss arena, clear of the left wall
pub fn boss_arena_player_start(grid: &TileGrid) -> Vec2 {
    let ts = grid.tile_size();
    Vec2::new(
        3.0 * ts + 10.0 * crate::consts::SCALE,
        grid.rows().saturating_sub(4) as f32 * ts,
    )
}
