//! Tile grid collision queries
//!
//! The grid is immutable for the lifetime of a level. Every query treats
//! coordinates outside the grid as solid, so bodies can never leave the
//! level through an edge.

use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::consts::COLLISION_INSET;
use crate::error::LevelError;

/// Raw tile identifier as stored in level data
pub type TileId = u8;

/// Empty air
pub const AIR_TILE: TileId = 11;
/// Water surface
pub const WATER_SURFACE_TILE: TileId = 48;
/// Deep water
pub const WATER_DEEP_TILE: TileId = 49;
/// Spike strip (non-solid hazard)
pub const SPIKE_TILE: TileId = 50;
/// Highest solid atlas tile
pub const LAST_SOLID_TILE: TileId = 47;

/// Collision class of a tile id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileClass {
    Solid,
    Air,
    Water,
    Hazard,
}

impl TileClass {
    /// Classify a tile id, `None` for ids the atlas does not define
    pub fn of(id: TileId) -> Option<Self> {
        match id {
            AIR_TILE => Some(TileClass::Air),
            WATER_SURFACE_TILE | WATER_DEEP_TILE => Some(TileClass::Water),
            SPIKE_TILE => Some(TileClass::Hazard),
            0..=LAST_SOLID_TILE => Some(TileClass::Solid),
            _ => None,
        }
    }
}

/// Level geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tile_size: f32,
    /// Row-major tile ids
    tiles: Vec<TileId>,
}

impl TileGrid {
    /// Build a grid from row-major ids, rejecting unknown tiles
    pub fn new(
        width: usize,
        height: usize,
        tiles: Vec<TileId>,
        tile_size: f32,
    ) -> Result<Self, LevelError> {
        if width == 0 || height == 0 {
            return Err(LevelError::Empty);
        }
        if tiles.len() != width * height {
            return Err(LevelError::Ragged {
                row: tiles.len() / width,
                expected: width,
                got: tiles.len() % width,
            });
        }
        if let Some((i, &id)) = tiles
            .iter()
            .enumerate()
            .find(|&(_, &id)| TileClass::of(id).is_none())
        {
            return Err(LevelError::UnknownTile {
                x: i % width,
                y: i / width,
                id,
            });
        }
        Ok(Self {
            width,
            height,
            tile_size,
            tiles,
        })
    }

    /// Build a grid from rows of equal length
    pub fn from_rows(rows: &[Vec<TileId>], tile_size: f32) -> Result<Self, LevelError> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(LevelError::Ragged {
                row,
                expected: width,
                got: r.len(),
            });
        }
        let tiles = rows.iter().flatten().copied().collect();
        Self::new(width, rows.len(), tiles, tile_size)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Level width in world pixels
    pub fn pixel_width(&self) -> f32 {
        self.width as f32 * self.tile_size
    }

    /// Tile column containing world x
    #[inline]
    pub fn column_of(&self, x: f32) -> i32 {
        (x / self.tile_size).floor() as i32
    }

    /// Tile row containing world y
    #[inline]
    pub fn row_of(&self, y: f32) -> i32 {
        (y / self.tile_size).floor() as i32
    }

    /// Tile id at a tile coordinate, `None` outside the grid
    pub fn tile(&self, tx: i32, ty: i32) -> Option<TileId> {
        if tx < 0 || ty < 0 || tx as usize >= self.width || ty as usize >= self.height {
            return None;
        }
        Some(self.tiles[ty as usize * self.width + tx as usize])
    }

    /// Class at a tile coordinate; outside the grid is solid
    pub fn class(&self, tx: i32, ty: i32) -> TileClass {
        self.tile(tx, ty)
            .and_then(TileClass::of)
            .unwrap_or(TileClass::Solid)
    }

    pub fn is_solid(&self, tx: i32, ty: i32) -> bool {
        self.class(tx, ty) == TileClass::Solid
    }

    /// Whether the world point lies in a solid tile
    pub fn is_solid_at(&self, x: f32, y: f32) -> bool {
        self.is_solid(self.column_of(x), self.row_of(y))
    }

    fn class_at(&self, x: f32, y: f32) -> TileClass {
        self.class(self.column_of(x), self.row_of(y))
    }

    /// True iff no tile under the rectangle's sample points is solid
    pub fn can_occupy(&self, r: &Rect) -> bool {
        self.sample_points(r)
            .all(|(x, y)| !self.is_solid_at(x, y))
    }

    /// True iff a solid tile lies one probe unit under the bottom edge
    pub fn is_on_floor(&self, r: &Rect) -> bool {
        let probe_y = r.bottom() + COLLISION_INSET;
        self.x_samples(r).any(|x| self.is_solid_at(x, probe_y))
    }

    /// True iff there is floor under the leading bottom corner after moving `dx`
    pub fn is_floor_ahead(&self, r: &Rect, dx: f32) -> bool {
        let probe_y = r.bottom() + COLLISION_INSET;
        let x = if dx > 0.0 {
            r.right() - COLLISION_INSET + dx
        } else {
            r.x + dx
        };
        self.is_solid_at(x, probe_y)
    }

    /// True iff any sample point lies in a hazard tile
    pub fn is_hazard(&self, r: &Rect) -> bool {
        self.sample_points(r)
            .any(|(x, y)| self.class_at(x, y) == TileClass::Hazard)
    }

    /// True iff any sample point lies in water
    pub fn is_water(&self, r: &Rect) -> bool {
        self.sample_points(r)
            .any(|(x, y)| self.class_at(x, y) == TileClass::Water)
    }

    /// X that puts the rectangle flush against the tile blocking a move of `dx`.
    ///
    /// Falls back to the current x if the flush position is itself blocked.
    pub fn snap_x_next_to_wall(&self, r: &Rect, dx: f32) -> f32 {
        let ts = self.tile_size;
        let candidate = if dx > 0.0 {
            let col = self.column_of(r.right() - COLLISION_INSET + dx);
            col as f32 * ts - r.width
        } else if dx < 0.0 {
            let col = self.column_of(r.x + dx);
            (col + 1) as f32 * ts
        } else {
            return r.x;
        };
        let toward_wall = (candidate - r.x) * dx >= 0.0;
        if toward_wall && self.can_occupy(&Rect { x: candidate, ..*r }) {
            candidate
        } else {
            r.x
        }
    }

    /// Y that puts the rectangle flush on the floor (`dy > 0`) or under the
    /// ceiling (`dy < 0`) blocking a move of `dy`.
    pub fn snap_y_next_to_obstacle(&self, r: &Rect, dy: f32) -> f32 {
        let ts = self.tile_size;
        let candidate = if dy > 0.0 {
            let row = self.row_of(r.bottom() - COLLISION_INSET + dy);
            row as f32 * ts - r.height
        } else if dy < 0.0 {
            let row = self.row_of(r.y + dy);
            (row + 1) as f32 * ts
        } else {
            return r.y;
        };
        if self.can_occupy(&Rect { y: candidate, ..*r }) {
            candidate
        } else {
            r.y
        }
    }

    /// No solid tile between two columns (inclusive) on a row
    pub fn is_row_clear(&self, col_a: i32, col_b: i32, row: i32) -> bool {
        let (lo, hi) = (col_a.min(col_b), col_a.max(col_b));
        (lo..=hi).all(|c| !self.is_solid(c, row))
    }

    /// Row is clear and every column has floor beneath it
    pub fn is_row_walkable(&self, col_a: i32, col_b: i32, row: i32) -> bool {
        let (lo, hi) = (col_a.min(col_b), col_a.max(col_b));
        self.is_row_clear(lo, hi, row) && (lo..=hi).all(|c| self.is_solid(c, row + 1))
    }

    /// An enemy at `from` can walk to `to` along `row`
    pub fn is_sight_clear(&self, from: &Rect, to: &Rect, row: i32) -> bool {
        let from_col = self.column_of(from.x);
        let to_col = if self.is_on_floor(to) {
            self.column_of(to.x)
        } else {
            self.column_of(to.right() - COLLISION_INSET)
        };
        self.is_row_walkable(from_col, to_col, row)
    }

    /// A cannon at `from` has an unobstructed line to `to` along `row`
    pub fn is_line_clear(&self, from: &Rect, to: &Rect, row: i32) -> bool {
        self.is_row_clear(self.column_of(from.x), self.column_of(to.x), row)
    }

    fn x_samples(&self, r: &Rect) -> impl Iterator<Item = f32> + use<> {
        edge_samples(r.x, r.right() - COLLISION_INSET, self.tile_size)
    }

    /// Corners plus intermediate points no more than one tile apart
    fn sample_points(&self, r: &Rect) -> impl Iterator<Item = (f32, f32)> + use<> {
        let ys: Vec<f32> = edge_samples(r.y, r.bottom() - COLLISION_INSET, self.tile_size).collect();
        self.x_samples(r)
            .flat_map(move |x| ys.clone().into_iter().map(move |y| (x, y)))
    }
}

/// Evenly spaced samples from `lo` to `hi` inclusive, at most `step` apart
fn edge_samples(lo: f32, hi: f32, step: f32) -> impl Iterator<Item = f32> {
    let hi = hi.max(lo);
    let n = ((hi - lo) / step).ceil() as usize;
    (0..=n).map(move |i| (lo + i as f32 * step).min(hi))
}
