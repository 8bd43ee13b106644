//! Events emitted by the simulation and short-lived emote effects
//!
//! The core never plays sounds or draws. It queues named events each tick
//! and the host drains them (see `GameState::drain_events`).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::anim::{AnimStep, AnimationState};

/// Something the host may want to react to (sound cues, transitions)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Player left the ground
    Jump,
    /// Player attack swing connected with its hit-test frame
    Attack,
    /// Player lost a life
    PlayerHit,
    /// Player started dying
    Death,
    /// Death animation finished
    GameOver,
    LevelCompleted,
    /// Last level completed
    GameCompleted,
    CannonFired,
    ContainerBroken,
    PotionCollected,
    EnemyKilled,
}

/// Emote glyph shown above an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmoteKind {
    /// Surprise
    Exclamation,
    /// Confusion
    Question,
}

/// Frames an emote is visible for
pub const EMOTE_FRAMES: usize = 5;

/// A floating emote; lives for [`EMOTE_FRAMES`] animation frames
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Emote {
    pub kind: EmoteKind,
    pub position: Vec2,
    pub anim: AnimationState<EmoteKind>,
}

impl Emote {
    pub fn new(kind: EmoteKind, position: Vec2) -> Self {
        Self {
            kind,
            position,
            anim: AnimationState::new(kind),
        }
    }

    /// Advance one tick; false once the emote has played out
    pub fn update(&mut self, ani_speed: u32) -> bool {
        self.anim.advance(EMOTE_FRAMES, ani_speed) != AnimStep::Finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emote_expires_after_five_frames() {
        let mut emote = Emote::new(EmoteKind::Question, Vec2::ZERO);
        let alive = (0..10).take_while(|_| emote.update(2)).count();
        assert_eq!(alive, 9);
    }
}
