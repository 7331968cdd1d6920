//! Tile grid and solidity classification
//!
//! A level is a rectangular matrix of integer tile codes. The grid is built
//! once per level load by the layout generator and is read-only afterwards.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Integer tile code as authored in the level layout
pub type TileCode = i32;

/// Empty space
pub const AIR: TileCode = 11;
/// Solid ground top/fill
pub const GROUND: TileCode = 1;
/// Floating platform (solid for walkers, passable for flyers)
pub const PLATFORM: TileCode = 3;

/// Rejected grid shapes
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("tile grid has no rows or no columns")]
    Empty,
    #[error("row {row} has {found} columns, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("tile size must be positive, got {0}")]
    TileSize(f32),
}

/// Decides which tile codes block a particular body
pub trait TileSolidity {
    fn is_solid(&self, code: TileCode) -> bool;
}

/// Built-in solidity rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Solidity {
    /// Only `AIR` is passable (walking bodies)
    #[default]
    Ground,
    /// `AIR` and `PLATFORM` are passable (the flying boss)
    Flight,
}

impl TileSolidity for Solidity {
    fn is_solid(&self, code: TileCode) -> bool {
        match self {
            Solidity::Ground => code != AIR,
            Solidity::Flight => code != AIR && code != PLATFORM,
        }
    }
}

impl<F> TileSolidity for F
where
    F: Fn(TileCode) -> bool,
{
    fn is_solid(&self, code: TileCode) -> bool {
        self(code)
    }
}

/// Rectangular, row-major tile matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    tiles: Vec<TileCode>,
    cols: usize,
    rows: usize,
    tile_size: f32,
}

impl TileGrid {
    /// Build a grid from row slices, rejecting ragged or empty input
    pub fn from_rows<R>(rows: &[R], tile_size: f32) -> Result<Self, GridError>
    where
        R: AsRef<[TileCode]>,
    {
        if !(tile_size > 0.0) {
            return Err(GridError::TileSize(tile_size));
        }
        let cols = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        if rows.is_empty() || cols == 0 {
            return Err(GridError::Empty);
        }

        let mut tiles = Vec::with_capacity(cols * rows.len());
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(GridError::Ragged {
                    row: i,
                    expected: cols,
                    found: row.len(),
                });
            }
            tiles.extend_from_slice(row);
        }

        Ok(Self {
            tiles,
            cols,
            rows: rows.len(),
            tile_size,
        })
    }

    /// Grid of `cols` x `rows` tiles all set to `code`
    pub fn filled(cols: usize, rows: usize, code: TileCode, tile_size: f32) -> Result<Self, GridError> {
        if cols == 0 || rows == 0 {
            return Err(GridError::Empty);
        }
        if !(tile_size > 0.0) {
            return Err(GridError::TileSize(tile_size));
        }
        Ok(Self {
            tiles: vec![code; cols * rows],
            cols,
            rows,
            tile_size,
        })
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Level width in pixels
    #[inline]
    pub fn pixel_width(&self) -> f32 {
        self.cols as f32 * self.tile_size
    }

    /// Level height in pixels
    #[inline]
    pub fn pixel_height(&self) -> f32 {
        self.rows as f32 * self.tile_size
    }

    /// Tile code at (`col`, `row`), `None` outside the grid
    #[inline]
    pub fn get(&self, col: usize, row: usize) -> Option<TileCode> {
        if col < self.cols && row < self.rows {
            Some(self.tiles[row * self.cols + col])
        } else {
            None
        }
    }

    /// Overwrite one tile (layout tooling and tests; the sim never mutates a grid)
    pub fn set(&mut self, col: usize, row: usize, code: TileCode) {
        if col < self.cols && row < self.rows {
            self.tiles[row * self.cols + col] = code;
        }
    }

    /// Fill columns `cols` on `row` with `code`, clipped to the grid
    pub fn fill_span(&mut self, row: usize, cols: std::ops::RangeInclusive<usize>, code: TileCode) {
        for col in cols {
            self.set(col, row, code);
        }
    }

    /// Is the tile at (`col`, `row`) solid under `rule`? Out-of-grid is not solid.
    pub fn is_solid_tile(&self, col: usize, row: usize, rule: &impl TileSolidity) -> bool {
        self.get(col, row).is_some_and(|code| rule.is_solid(code))
    }
}
