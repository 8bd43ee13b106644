//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable iteration order (level placement order)
//! - No rendering, audio or platform dependencies

pub mod anim;
pub mod body;
pub mod clock;
pub mod enemy;
pub mod events;
pub mod interaction;
pub mod objects;
pub mod player;
pub mod pool;
pub mod projectile;
pub mod rect;
pub mod state;
pub mod tick;
pub mod tiles;

pub use anim::{AnimStep, AnimationState};
pub use body::{BodyParams, Facing, PhysicsBody, StepOutcome};
pub use clock::SimulationClock;
pub use enemy::{Archetype, Enemy, EnemyKind, EnemyState};
pub use events::{Emote, EmoteKind, GameEvent};
pub use objects::{ContainerKind, InteractiveObject, ObjectKind, ObjectSet, PotionKind, TreeKind};
pub use player::{Player, PlayerAction, PlayerIntent};
pub use pool::Pool;
pub use projectile::Projectile;
pub use rect::Rect;
pub use state::{GamePhase, GameState};
pub use tick::{TickInput, autopilot, tick};
pub use tiles::{TileClass, TileGrid, TileId};
