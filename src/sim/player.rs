//! The user-controlled character
//!
//! Input sets intent flags before each tick; `Player::update` turns them into
//! movement, jump and attack timing. Cross-entity effects (damaging enemies,
//! collecting potions) are not applied here: the update returns a
//! [`PlayerUpdate`] report and the tick orchestrator resolves it.

use glam::Vec2;
use log::debug;
use serde::{Deserialize, Serialize};

use super::anim::{AnimStep, AnimationState};
use super::body::{Facing, PhysicsBody};
use super::events::GameEvent;
use super::rect::Rect;
use super::tiles::TileGrid;
use crate::settings::SimConfig;

/// Unscaled player hitbox
pub const PLAYER_HITBOX_SIZE: Vec2 = Vec2::new(20.0, 27.0);
/// Attack frame on which a swing is hit-tested
pub const ATTACK_HIT_FRAME: usize = 1;
/// Hit frames at the end of the animation without knockback
const KNOCKBACK_TAIL_FRAMES: usize = 3;

// Attack box geometry (unscaled)
const ATTACK_BOX_SIZE: Vec2 = Vec2::new(35.0, 20.0);
const ATTACK_BOX_Y_OFFSET: f32 = 10.0;
const ATTACK_BOX_RIGHT_INSET: f32 = 5.0;
const ATTACK_BOX_LEFT_GAP: f32 = 10.0;

/// Player animation actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAction {
    Idle,
    Running,
    Jump,
    Falling,
    Attack,
    Hit,
    Dead,
}

impl PlayerAction {
    pub fn frame_count(self) -> usize {
        match self {
            PlayerAction::Idle => 11,
            PlayerAction::Running => 12,
            PlayerAction::Jump => 1,
            PlayerAction::Falling => 1,
            PlayerAction::Attack => 3,
            PlayerAction::Hit => 7,
            PlayerAction::Dead => 8,
        }
    }
}

/// Held movement intent, written by the input layer before each tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerIntent {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

/// Requests produced by one player update
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerUpdate {
    /// The player moved; pickups, hazards and water need checking
    pub moved: bool,
    /// Run one attack hit-test pass with this box
    pub attack_box: Option<Rect>,
    /// The death animation has played out
    pub death_finished: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub body: PhysicsBody,
    pub anim: AnimationState<PlayerAction>,
    pub intent: PlayerIntent,
    lives: u8,
    max_lives: u8,
    power: u32,
    power_max: u32,
    power_regen_tick: u32,
    attacking: bool,
    attack_checked: bool,
    power_attack_active: bool,
    power_attack_ticks: u32,
    knockback: Facing,
    moving: bool,
    spawn: Vec2,
}

impl Player {
    pub fn new(config: &SimConfig, spawn: Vec2) -> Self {
        let size = PLAYER_HITBOX_SIZE * config.scale;
        let hitbox = Rect::new(spawn.x, spawn.y, size.x, size.y);
        Self {
            body: PhysicsBody::new(hitbox, config.player_walk_speed()),
            anim: AnimationState::new(PlayerAction::Idle),
            intent: PlayerIntent::default(),
            lives: config.max_lives,
            max_lives: config.max_lives,
            power: config.power_max,
            power_max: config.power_max,
            power_regen_tick: 0,
            attacking: false,
            attack_checked: false,
            power_attack_active: false,
            power_attack_ticks: 0,
            knockback: Facing::Left,
            moving: false,
            spawn,
        }
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn max_lives(&self) -> u8 {
        self.max_lives
    }

    pub fn power(&self) -> u32 {
        self.power
    }

    pub fn power_max(&self) -> u32 {
        self.power_max
    }

    pub fn is_dead(&self) -> bool {
        self.lives == 0
    }

    pub fn is_attacking(&self) -> bool {
        self.attacking
    }

    pub fn is_power_attacking(&self) -> bool {
        self.power_attack_active
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn hitbox(&self) -> &Rect {
        &self.body.hitbox
    }

    pub fn spawn(&self) -> Vec2 {
        self.spawn
    }

    /// Attack box on the facing side of the hitbox
    pub fn attack_box(&self, scale: f32) -> Rect {
        let hb = &self.body.hitbox;
        let size = ATTACK_BOX_SIZE * scale;
        let x = match self.body.facing {
            Facing::Right => hb.right() - ATTACK_BOX_RIGHT_INSET * scale,
            Facing::Left => hb.x - hb.width - ATTACK_BOX_LEFT_GAP * scale,
        };
        Rect::new(x, hb.y + ATTACK_BOX_Y_OFFSET * scale, size.x, size.y)
    }

    /// Lose one life and enter Hit. No-op while already in Hit or dead.
    pub fn take_damage(&mut self) -> bool {
        if self.is_dead() || self.anim.action == PlayerAction::Hit {
            return false;
        }
        self.lives -= 1;
        self.attacking = false;
        self.attack_checked = false;
        self.power_attack_active = false;
        self.power_attack_ticks = 0;
        self.knockback = self.body.facing.flipped();
        self.anim.force(PlayerAction::Hit);
        debug!("player hit, {} lives left", self.lives);
        true
    }

    /// [`take_damage`](Self::take_damage) with knockback away from `source_x`
    pub fn take_damage_from(&mut self, source_x: f32) -> bool {
        if !self.take_damage() {
            return false;
        }
        self.knockback = if source_x < self.body.hitbox.x {
            Facing::Right
        } else {
            Facing::Left
        };
        true
    }

    /// Instant death, bypassing Hit
    pub fn kill(&mut self) {
        self.lives = 0;
    }

    pub fn add_life(&mut self, n: u8) {
        self.lives = self.lives.saturating_add(n).min(self.max_lives);
    }

    pub fn change_power(&mut self, delta: i32) {
        let power = i64::from(self.power) + i64::from(delta);
        self.power = power.clamp(0, i64::from(self.power_max)) as u32;
    }

    /// Begin a swing if one is not already in progress
    pub fn start_attack(&mut self) {
        if self.is_dead() || self.anim.action == PlayerAction::Hit {
            return;
        }
        self.attacking = true;
    }

    /// Begin a dashing power attack if enough power is stored
    pub fn power_attack(&mut self, cost: u32) -> bool {
        if self.power_attack_active || self.is_dead() || self.power < cost {
            return false;
        }
        self.power_attack_active = true;
        self.power_attack_ticks = 0;
        self.power -= cost;
        true
    }

    /// Move to a new spawn point (level load)
    pub fn set_spawn(&mut self, grid: &TileGrid, spawn: Vec2) {
        self.spawn = spawn;
        self.body.place(grid, spawn);
    }

    /// Full reset for retry or a new level
    pub fn reset_all(&mut self, grid: &TileGrid) {
        self.intent = PlayerIntent::default();
        self.lives = self.max_lives;
        self.power = self.power_max;
        self.power_regen_tick = 0;
        self.attacking = false;
        self.attack_checked = false;
        self.power_attack_active = false;
        self.power_attack_ticks = 0;
        self.moving = false;
        self.anim.force(PlayerAction::Idle);
        self.body.place(grid, self.spawn);
    }

    /// Advance one tick
    pub fn update(
        &mut self,
        grid: &TileGrid,
        config: &SimConfig,
        events: &mut Vec<GameEvent>,
    ) -> PlayerUpdate {
        let mut report = PlayerUpdate::default();

        self.power_regen_tick += 1;
        if self.power_regen_tick >= config.power_regen_interval {
            self.power_regen_tick = 0;
            self.change_power(1);
        }

        if self.is_dead() {
            report.death_finished = self.update_dying(grid, config, events);
            return report;
        }

        let params = config.body_params();
        if self.anim.action == PlayerAction::Hit {
            let knockback_frames = PlayerAction::Hit
                .frame_count()
                .saturating_sub(KNOCKBACK_TAIL_FRAMES);
            let dx = if self.anim.frame <= knockback_frames {
                self.knockback.sign() * self.body.walk_speed * config.player_knockback
            } else {
                0.0
            };
            self.moving = self.body.step(grid, dx, &params).moving;
        } else {
            self.update_pos(grid, config, events);
        }

        if self.moving {
            report.moved = true;
            if self.power_attack_active {
                self.power_attack_ticks += 1;
                if self.power_attack_ticks >= config.power_attack_duration {
                    self.power_attack_active = false;
                    self.power_attack_ticks = 0;
                }
            }
        }

        if (self.attacking || self.power_attack_active)
            && !self.attack_checked
            && self.anim.action == PlayerAction::Attack
            && self.anim.frame == ATTACK_HIT_FRAME
        {
            // A power attack hit-tests every tick
            self.attack_checked = !self.power_attack_active;
            report.attack_box = Some(self.attack_box(config.scale));
            events.push(GameEvent::Attack);
        }

        let action = self.anim.action;
        if self.anim.advance(action.frame_count(), config.ani_speed) == AnimStep::Finished {
            self.attacking = false;
            self.attack_checked = false;
            if action == PlayerAction::Hit {
                // air_speed is kept: a player hit mid-air carries on falling
                self.anim.force(PlayerAction::Idle);
                self.body.settle(grid);
            }
        }
        self.set_animation();

        report
    }

    fn update_pos(&mut self, grid: &TileGrid, config: &SimConfig, events: &mut Vec<GameEvent>) {
        let walk = self.body.walk_speed;
        let mut dx = 0.0;
        if self.intent.left && !self.intent.right {
            dx = -walk;
            self.body.facing = Facing::Left;
        } else if self.intent.right && !self.intent.left {
            dx = walk;
            self.body.facing = Facing::Right;
        }

        if self.power_attack_active {
            if dx == 0.0 {
                dx = self.body.facing.sign() * walk;
            }
            dx *= config.power_attack_speed_multiplier;
        }

        let out = self.body.step(grid, dx, &config.body_params());
        if out.blocked_x && self.power_attack_active {
            self.power_attack_active = false;
            self.power_attack_ticks = 0;
        }

        if self.intent.jump && self.body.launch(config.jump_speed()) {
            events.push(GameEvent::Jump);
        }

        self.moving = out.dx != 0.0 || self.body.in_air;
    }

    /// Returns true once the death animation has played out
    fn update_dying(
        &mut self,
        grid: &TileGrid,
        config: &SimConfig,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        if self.anim.action != PlayerAction::Dead {
            self.anim.force(PlayerAction::Dead);
            self.intent = PlayerIntent::default();
            self.attacking = false;
            self.power_attack_active = false;
            self.moving = false;
            self.body.air_speed = 0.0;
            self.body.in_air = !grid.is_on_floor(&self.body.hitbox);
            events.push(GameEvent::Death);
            return false;
        }

        let frames = PlayerAction::Dead.frame_count();
        if self.anim.is_last_tick(frames, config.ani_speed) {
            return true;
        }
        self.anim.advance(frames, config.ani_speed);
        if self.body.in_air {
            self.body.step(grid, 0.0, &config.body_params());
        }
        false
    }

    fn set_animation(&mut self) {
        let current = self.anim.action;
        if current == PlayerAction::Hit {
            return;
        }

        let mut action = if self.moving {
            PlayerAction::Running
        } else {
            PlayerAction::Idle
        };
        if self.body.in_air {
            action = if self.body.air_speed < 0.0 {
                PlayerAction::Jump
            } else {
                PlayerAction::Falling
            };
        }

        if self.power_attack_active {
            self.anim
                .enter_at(PlayerAction::Attack, ATTACK_HIT_FRAME, PlayerAction::Attack.frame_count());
            return;
        }

        if self.attacking {
            if current != PlayerAction::Attack {
                self.anim.enter_at(
                    PlayerAction::Attack,
                    ATTACK_HIT_FRAME,
                    PlayerAction::Attack.frame_count(),
                );
            }
            return;
        }

        self.anim.set(action);
    }
}
