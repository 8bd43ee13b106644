//! Simulation configuration
//!
//! Every tunable lives here, unscaled, and is multiplied by the single
//! global `scale` through the accessor methods. A config is built once and
//! handed to the level loader and the simulation; nothing reads globals.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::BodyParams;

/// Simulation tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Global scale factor applied to every distance and speed
    pub scale: f32,
    /// Logical ticks per second
    pub updates_per_second: u32,
    /// Maximum ticks run per rendered frame
    pub max_substeps: u32,
    /// Ticks per animation frame
    pub ani_speed: u32,

    // === Physics (unscaled, per tick) ===
    pub gravity: f32,
    pub jump_speed: f32,
    pub fall_speed_after_collision: f32,
    pub player_walk_speed: f32,
    pub enemy_walk_speed: f32,
    pub projectile_speed: f32,
    /// Initial vertical speed of a jumper's leap
    pub jumper_leap_speed: f32,

    // === Player ===
    pub max_lives: u8,
    pub power_max: u32,
    /// Ticks between +1 power regeneration
    pub power_regen_interval: u32,
    pub power_attack_cost: u32,
    /// Moving ticks a power attack lasts
    pub power_attack_duration: u32,
    pub power_attack_speed_multiplier: f32,
    /// Knockback speed multiplier while the player is in Hit
    pub player_knockback: f32,

    // === Damage / pickups ===
    pub player_attack_damage: i32,
    pub spike_enemy_damage: i32,
    pub red_potion_value: u8,
    pub blue_potion_value: i32,

    // === Enemies / objects ===
    /// Ticks a jumper rests in Idle before patrolling again
    pub jumper_rest_ticks: u32,
    /// Enemy sight range as a multiple of the archetype's attack range
    pub sight_attack_ranges: f32,
    /// Cannon trigger range in tiles
    pub cannon_range_tiles: f32,

    // === Arenas ===
    pub projectile_capacity: usize,
    pub emote_capacity: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            updates_per_second: UPDATES_PER_SECOND,
            max_substeps: MAX_SUBSTEPS,
            ani_speed: ANI_SPEED,

            gravity: 0.04,
            jump_speed: -2.25,
            fall_speed_after_collision: 0.5,
            player_walk_speed: 1.0,
            enemy_walk_speed: 0.35,
            projectile_speed: 0.75,
            jumper_leap_speed: -1.75,

            max_lives: 3,
            power_max: 200,
            power_regen_interval: 15,
            power_attack_cost: 60,
            power_attack_duration: 35,
            power_attack_speed_multiplier: 3.0,
            player_knockback: 1.25,

            player_attack_damage: 20,
            spike_enemy_damage: 200,
            red_potion_value: 1,
            blue_potion_value: 10,

            jumper_rest_ticks: 120,
            sight_attack_ranges: 5.0,
            cannon_range_tiles: 5.0,

            projectile_capacity: 32,
            emote_capacity: 20,
        }
    }
}

impl SimConfig {
    /// Parse a JSON config document; missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("scale", self.scale)?;
        positive("gravity", self.gravity)?;
        positive("player_walk_speed", self.player_walk_speed)?;
        positive("enemy_walk_speed", self.enemy_walk_speed)?;
        positive("projectile_speed", self.projectile_speed)?;
        positive("power_attack_speed_multiplier", self.power_attack_speed_multiplier)?;
        if self.jump_speed >= 0.0 {
            return Err(out_of_range("jump_speed", self.jump_speed, "(-inf, 0)"));
        }
        if self.jumper_leap_speed >= 0.0 {
            return Err(out_of_range("jumper_leap_speed", self.jumper_leap_speed, "(-inf, 0)"));
        }
        if self.fall_speed_after_collision < 0.0 {
            return Err(out_of_range(
                "fall_speed_after_collision",
                self.fall_speed_after_collision,
                "[0, inf)",
            ));
        }
        at_least_one("updates_per_second", self.updates_per_second)?;
        at_least_one("max_substeps", self.max_substeps)?;
        at_least_one("ani_speed", self.ani_speed)?;
        at_least_one("power_regen_interval", self.power_regen_interval)?;
        at_least_one("max_lives", u32::from(self.max_lives))?;
        if self.power_attack_cost > self.power_max {
            return Err(out_of_range(
                "power_attack_cost",
                self.power_attack_cost as f32,
                "[0, power_max]",
            ));
        }
        at_least_one("projectile_capacity", self.projectile_capacity as u32)?;
        at_least_one("emote_capacity", self.emote_capacity as u32)?;
        Ok(())
    }

    /// Scale an unscaled distance or speed
    #[inline]
    pub fn scaled(&self, v: f32) -> f32 {
        v * self.scale
    }

    /// Tile edge in world pixels
    pub fn tile_size(&self) -> f32 {
        TILES_DEFAULT_SIZE * self.scale
    }

    /// Visible world width in pixels
    pub fn view_width(&self) -> f32 {
        TILES_IN_WIDTH as f32 * self.tile_size()
    }

    pub fn gravity(&self) -> f32 {
        self.scaled(self.gravity)
    }

    pub fn jump_speed(&self) -> f32 {
        self.scaled(self.jump_speed)
    }

    pub fn player_walk_speed(&self) -> f32 {
        self.scaled(self.player_walk_speed)
    }

    pub fn enemy_walk_speed(&self) -> f32 {
        self.scaled(self.enemy_walk_speed)
    }

    pub fn projectile_speed(&self) -> f32 {
        self.scaled(self.projectile_speed)
    }

    pub fn jumper_leap_speed(&self) -> f32 {
        self.scaled(self.jumper_leap_speed)
    }

    /// Physics constants shared by every body
    pub fn body_params(&self) -> BodyParams {
        BodyParams {
            gravity: self.gravity(),
            fall_speed_after_collision: self.scaled(self.fall_speed_after_collision),
        }
    }

    /// Length of one tick in seconds
    pub fn tick_seconds(&self) -> f32 {
        1.0 / self.updates_per_second as f32
    }
}

fn out_of_range(name: &'static str, value: f32, range: &'static str) -> ConfigError {
    ConfigError::OutOfRange {
        name,
        value: f64::from(value),
        range,
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(out_of_range(name, value, "(0, inf)"))
    }
}

fn at_least_one(name: &'static str, value: u32) -> Result<(), ConfigError> {
    if value >= 1 {
        Ok(())
    } else {
        Err(out_of_range(name, value as f32, "[1, inf)"))
    }
}
