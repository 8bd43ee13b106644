//! Tidepool - a 2D side-scrolling platformer simulation core
//!
//! Core modules:
//! - `sim`: Fixed-timestep simulation (tile collision, player, enemies, objects, projectiles)
//! - `level`: Level data loading, validation and procedural generation
//! - `settings`: Explicit simulation configuration
//! - `error`: Load-time error types
//!
//! Rendering, audio playback, input devices and leaderboard persistence are
//! host concerns. The core exposes read accessors and a drained event queue.

pub mod error;
pub mod level;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, LevelError};
pub use level::{Level, LevelData, LevelSet};
pub use settings::SimConfig;

/// Game configuration constants
pub mod consts {
    /// Logical updates per second (fixed timestep)
    pub const UPDATES_PER_SECOND: u32 = 200;
    /// Fixed simulation timestep in seconds
    pub const SIM_DT: f32 = 1.0 / UPDATES_PER_SECOND as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 20;
    /// Longest frame delta the clock will accept (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Unscaled tile edge in pixels
    pub const TILES_DEFAULT_SIZE: f32 = 32.0;
    /// Default global scale factor
    pub const DEFAULT_SCALE: f32 = 2.0;
    /// Visible tiles horizontally / vertically
    pub const TILES_IN_WIDTH: u32 = 26;
    pub const TILES_IN_HEIGHT: u32 = 14;

    /// Ticks per animation frame
    pub const ANI_SPEED: u32 = 25;

    /// Inset applied to the trailing right/bottom edges when sampling tiles,
    /// and the downward probe used by floor checks (world pixels)
    pub const COLLISION_INSET: f32 = 1.0;
}
