//! Load-time error types.
//!
//! The simulation itself never fails mid-tick: out-of-range queries are
//! answered as solid and entity invariants are kept by clamping. Everything
//! that can go wrong happens while building a config or a level, and is
//! reported through these types before the tick loop starts.

use thiserror::Error;

use crate::sim::TileId;

/// Invalid configuration values or config documents.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config value '{name}' = {value} is outside {range}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        range: &'static str,
    },

    #[error("malformed config document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Level data that cannot be turned into a playable level.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level has no tiles")]
    Empty,

    #[error("row {row} has {got} tiles, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("unknown tile id {id} at ({x}, {y})")]
    UnknownTile { x: usize, y: usize, id: TileId },

    #[error("unknown map glyph '{glyph}' at ({x}, {y})")]
    UnknownGlyph { x: usize, y: usize, glyph: char },

    #[error("level has no player spawn point")]
    MissingSpawn,

    #[error("level declares more than one player spawn point")]
    DuplicateSpawn,

    #[error("player spawn at tile ({x}, {y}) overlaps solid geometry")]
    SpawnInsideGeometry { x: u32, y: u32 },

    #[error("{what} placed outside the level at tile ({x}, {y})")]
    PlacementOutOfBounds { what: &'static str, x: u32, y: u32 },

    #[error("level index {index} out of range ({count} levels)")]
    NoSuchLevel { index: usize, count: usize },

    #[error("level set is empty")]
    NoLevels,

    #[error("malformed level document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
