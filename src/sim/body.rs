//! Shared physics body
//!
//! Axis-separated move-with-collision used by the player and every enemy.
//! Horizontal motion resolves first, then vertical, so a body falling while
//! pressed into a wall slides down it instead of sticking.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use super::tiles::TileGrid;

/// Horizontal facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// -1.0 for left, +1.0 for right
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }

    /// Direction from `from_x` toward `to_x` (right when equal)
    pub fn toward(from_x: f32, to_x: f32) -> Self {
        if to_x < from_x {
            Facing::Left
        } else {
            Facing::Right
        }
    }
}

/// Per-tick physics constants, already scaled
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyParams {
    /// Added to `air_speed` every airborne tick
    pub gravity: f32,
    /// Vertical speed after bumping into a ceiling
    pub fall_speed_after_collision: f32,
}

/// What happened during one [`PhysicsBody::step`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepOutcome {
    /// Net horizontal displacement
    pub dx: f32,
    /// A wall stopped the horizontal move
    pub blocked_x: bool,
    pub landed: bool,
    pub bumped_ceiling: bool,
    /// Horizontal displacement occurred or the body is airborne
    pub moving: bool,
}

/// Position and velocity shared by every moving entity.
///
/// Invariant: `in_air == false` implies the body rests on solid ground
/// (see [`TileGrid::is_on_floor`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsBody {
    pub hitbox: Rect,
    /// Vertical velocity in pixels per tick (+y is down)
    pub air_speed: f32,
    pub in_air: bool,
    /// Horizontal speed magnitude in pixels per tick
    pub walk_speed: f32,
    pub facing: Facing,
}

impl PhysicsBody {
    pub fn new(hitbox: Rect, walk_speed: f32) -> Self {
        Self {
            hitbox,
            air_speed: 0.0,
            in_air: false,
            walk_speed,
            facing: Facing::Right,
        }
    }

    /// Teleport to `pos` at rest, airborne if nothing is underneath
    pub fn place(&mut self, grid: &TileGrid, pos: Vec2) {
        self.hitbox = self.hitbox.at(pos);
        self.air_speed = 0.0;
        self.in_air = !grid.is_on_floor(&self.hitbox);
    }

    /// Leave the ground with vertical speed `speed`. No-op while airborne.
    pub fn launch(&mut self, speed: f32) -> bool {
        if self.in_air {
            return false;
        }
        self.in_air = true;
        self.air_speed = speed;
        true
    }

    /// Re-derive `in_air` from the ground under the hitbox
    pub fn settle(&mut self, grid: &TileGrid) {
        if !self.in_air && !grid.is_on_floor(&self.hitbox) {
            self.in_air = true;
        }
    }

    /// Advance one tick: walk `desired_dx`, then fall or rise by `air_speed`
    pub fn step(&mut self, grid: &TileGrid, desired_dx: f32, params: &BodyParams) -> StepOutcome {
        let mut out = StepOutcome::default();

        // Walked off a ledge last tick
        self.settle(grid);

        if desired_dx != 0.0 {
            let moved = self.hitbox.translated(desired_dx, 0.0);
            if grid.can_occupy(&moved) {
                self.hitbox = moved;
                out.dx = desired_dx;
            } else {
                let x = grid.snap_x_next_to_wall(&self.hitbox, desired_dx);
                out.dx = x - self.hitbox.x;
                out.blocked_x = true;
                self.hitbox.x = x;
            }
            // Walked off a ledge this tick
            self.settle(grid);
        }

        if self.in_air {
            let moved = self.hitbox.translated(0.0, self.air_speed);
            if grid.can_occupy(&moved) {
                self.hitbox = moved;
                self.air_speed += params.gravity;
            } else {
                self.hitbox.y = grid.snap_y_next_to_obstacle(&self.hitbox, self.air_speed);
                if self.air_speed > 0.0 {
                    self.in_air = false;
                    self.air_speed = 0.0;
                    out.landed = true;
                    // Snap fallback left us short of the floor
                    self.settle(grid);
                } else {
                    self.air_speed = params.fall_speed_after_collision;
                    out.bumped_ceiling = true;
                }
            }
        }

        out.moving = out.dx != 0.0 || self.in_air;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tiles::tests::grid;

    const PARAMS: BodyParams = BodyParams {
        gravity: 0.5,
        fall_speed_after_collision: 1.0,
    };

    #[test]
    fn test_falls_with_constant_gravity() {
        let g = grid(&["....", "....", "....", "....", "####"], 10.0);
        let mut body = PhysicsBody::new(Rect::new(0.0, 0.0, 8.0, 8.0), 1.0);
        body.in_air = true;
        body.step(&g, 0.0, &PARAMS);
        assert_eq!(body.air_speed, 0.5);
        body.step(&g, 0.0, &PARAMS);
        assert_eq!(body.air_speed, 1.0);
        assert_eq!(body.hitbox.y, 0.5);
    }

    #[test]
    fn test_lands_flush_on_floor() {
        let g = grid(&["....", "....", "####"], 10.0);
        let mut body = PhysicsBody::new(Rect::new(0.0, 10.0, 8.0, 8.0), 1.0);
        body.in_air = true;
        body.air_speed = 5.0;
        let out = body.step(&g, 0.0, &PARAMS);
        assert!(out.landed);
        assert!(!body.in_air);
        assert_eq!(body.air_speed, 0.0);
        assert_eq!(body.hitbox.y, 12.0);
        assert!(g.is_on_floor(&body.hitbox));
    }

    #[test]
    fn test_ceiling_bump_starts_falling() {
        let g = grid(&["####", "....", "....", "####"], 10.0);
        let mut body = PhysicsBody::new(Rect::new(0.0, 12.0, 8.0, 8.0), 1.0);
        body.in_air = true;
        body.air_speed = -5.0;
        let out = body.step(&g, 0.0, &PARAMS);
        assert!(out.bumped_ceiling);
        assert!(body.in_air);
        assert_eq!(body.hitbox.y, 10.0);
        assert_eq!(body.air_speed, PARAMS.fall_speed_after_collision);
    }

    #[test]
    fn test_wall_stops_horizontal_move() {
        let g = grid(&["...#", "####"], 10.0);
        let mut body = PhysicsBody::new(Rect::new(20.0, 2.0, 8.0, 8.0), 1.0);
        let out = body.step(&g, 5.0, &PARAMS);
        assert!(out.blocked_x);
        assert_eq!(body.hitbox.x, 22.0);
        assert_eq!(out.dx, 2.0);
        assert!(out.moving);
    }

    #[test]
    fn test_walking_off_ledge_becomes_airborne_same_tick() {
        let g = grid(&["....", "....", "#..."], 10.0);
        let mut body = PhysicsBody::new(Rect::new(1.0, 12.0, 8.0, 8.0), 1.0);
        assert!(g.is_on_floor(&body.hitbox));
        body.step(&g, 9.0, &PARAMS);
        assert!(body.in_air);
    }

    #[test]
    fn test_idle_body_is_not_moving() {
        let g = grid(&["....", "####"], 10.0);
        let mut body = PhysicsBody::new(Rect::new(0.0, 2.0, 8.0, 8.0), 1.0);
        let out = body.step(&g, 0.0, &PARAMS);
        assert!(!out.moving);
        assert_eq!(body.hitbox.y, 2.0);
    }

    #[test]
    fn test_launch_only_from_ground() {
        let mut body = PhysicsBody::new(Rect::new(0.0, 0.0, 8.0, 8.0), 1.0);
        assert!(body.launch(-3.0));
        assert!(!body.launch(-3.0));
        assert_eq!(body.air_speed, -3.0);
    }

    #[test]
    fn test_facing_toward() {
        assert_eq!(Facing::toward(10.0, 5.0), Facing::Left);
        assert_eq!(Facing::toward(10.0, 15.0), Facing::Right);
        assert_eq!(Facing::Left.flipped().sign(), 1.0);
    }
}
