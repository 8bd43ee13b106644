//! Tick-driven animation clock
//!
//! Every animated entity advances one tick per simulation update and moves
//! to the next frame every `ani_speed` ticks. Frame counts vary per entity
//! and action, so they are passed in rather than stored.

use serde::{Deserialize, Serialize};

/// Result of advancing the clock by one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimStep {
    /// Still on the same frame
    Ticked,
    /// Moved to a new frame
    NextFrame,
    /// Passed the last frame and wrapped to frame 0
    Finished,
}

/// Current action plus frame position within it.
///
/// Invariant: `frame < frame_count(action)` whenever the caller passes
/// consistent frame counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationState<A> {
    pub action: A,
    pub frame: usize,
    pub tick: u32,
}

impl<A: Copy + PartialEq> AnimationState<A> {
    pub fn new(action: A) -> Self {
        Self {
            action,
            frame: 0,
            tick: 0,
        }
    }

    /// Switch action, restarting from frame 0 only if it changed
    pub fn set(&mut self, action: A) {
        if self.action != action {
            self.force(action);
        }
    }

    /// Switch action and always restart from frame 0
    pub fn force(&mut self, action: A) {
        self.action = action;
        self.frame = 0;
        self.tick = 0;
    }

    /// Switch action starting at `frame`, clamped into range
    pub fn enter_at(&mut self, action: A, frame: usize, frame_count: usize) {
        self.action = action;
        self.frame = frame.min(frame_count.saturating_sub(1));
        self.tick = 0;
    }

    /// Advance one tick
    pub fn advance(&mut self, frame_count: usize, ani_speed: u32) -> AnimStep {
        self.tick += 1;
        if self.tick < ani_speed {
            return AnimStep::Ticked;
        }
        self.tick = 0;
        self.frame += 1;
        if self.frame >= frame_count {
            self.frame = 0;
            AnimStep::Finished
        } else {
            AnimStep::NextFrame
        }
    }

    /// The current frame was entered on this tick
    #[inline]
    pub fn is_frame_start(&self) -> bool {
        self.tick == 0
    }

    /// On the last tick of the last frame
    pub fn is_last_tick(&self, frame_count: usize, ani_speed: u32) -> bool {
        self.frame + 1 >= frame_count && self.tick + 1 >= ani_speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Action {
        Idle,
        Attack,
    }

    #[test]
    fn test_advances_every_ani_speed_ticks() {
        let mut anim = AnimationState::new(Action::Idle);
        for _ in 0..4 {
            assert_eq!(anim.advance(3, 5), AnimStep::Ticked);
        }
        assert_eq!(anim.advance(3, 5), AnimStep::NextFrame);
        assert_eq!(anim.frame, 1);
        assert!(anim.is_frame_start());
    }

    #[test]
    fn test_wraps_after_last_frame() {
        let mut anim = AnimationState::new(Action::Idle);
        let steps: Vec<AnimStep> = (0..6).map(|_| anim.advance(3, 2)).collect();
        assert_eq!(steps[5], AnimStep::Finished);
        assert_eq!(anim.frame, 0);
    }

    #[test]
    fn test_set_same_action_keeps_progress() {
        let mut anim = AnimationState::new(Action::Idle);
        anim.advance(3, 1);
        anim.set(Action::Idle);
        assert_eq!(anim.frame, 1);
        anim.set(Action::Attack);
        assert_eq!(anim.frame, 0);
    }

    #[test]
    fn test_enter_at_clamps_frame() {
        let mut anim = AnimationState::new(Action::Idle);
        anim.enter_at(Action::Attack, 1, 3);
        assert_eq!(anim.frame, 1);
        anim.enter_at(Action::Attack, 7, 3);
        assert_eq!(anim.frame, 2);
    }

    #[test]
    fn test_frame_always_in_range() {
        let mut anim = AnimationState::new(Action::Idle);
        for _ in 0..1000 {
            anim.advance(4, 3);
            assert!(anim.frame < 4);
        }
    }
}
