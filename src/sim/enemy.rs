//! Enemy state machines
//!
//! Three archetypes share one state machine (Idle, Running, Attack, Hit,
//! Dead) and differ only in how they patrol and attack. All archetype
//! behavior is dispatched from [`advance`] with a single match.

use glam::Vec2;
use log::debug;
use serde::{Deserialize, Serialize};

use super::anim::{AnimStep, AnimationState};
use super::body::{Facing, PhysicsBody};
use super::events::EmoteKind;
use super::rect::Rect;
use super::tiles::TileGrid;
use crate::consts::COLLISION_INSET;
use crate::settings::SimConfig;

/// Knockback speed as a multiple of walk speed
const ENEMY_KNOCKBACK: f32 = 2.0;
/// Hit frames at the end of the animation without knockback
const KNOCKBACK_TAIL_FRAMES: usize = 2;
/// Horizontal leap speed as a multiple of walk speed
const JUMPER_LEAP_MULTIPLIER: f32 = 3.0;
/// Lunge speed as a multiple of walk speed
const SWIMMER_LUNGE_MULTIPLIER: f32 = 4.0;

/// Shared enemy states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyState {
    Idle,
    Running,
    Attack,
    Hit,
    Dead,
}

impl EnemyState {
    fn index(self) -> usize {
        match self {
            EnemyState::Idle => 0,
            EnemyState::Running => 1,
            EnemyState::Attack => 2,
            EnemyState::Hit => 3,
            EnemyState::Dead => 4,
        }
    }
}

/// Enemy kind as named in level data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    /// Melee crab that patrols and pinches
    Walker,
    /// Star that rests, then leaps at the player
    Jumper,
    /// Shark that lunges along the ground, unharmed by water
    Swimmer,
}

/// Fixed per-kind parameters (unscaled)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchetypeParams {
    pub hitbox: Vec2,
    pub max_health: i32,
    /// Frame counts indexed by Idle, Running, Attack, Hit, Dead
    pub frames: [usize; 5],
    pub attack_range_tiles: f32,
    /// Attack box width and x offset from the hitbox
    pub attack_box_width: f32,
    pub attack_box_offset: f32,
    /// Attack frame on which the strike lands
    pub strike_frame: usize,
    pub water_immune: bool,
}

impl EnemyKind {
    pub const fn params(self) -> ArchetypeParams {
        match self {
            EnemyKind::Walker => ArchetypeParams {
                hitbox: Vec2::new(22.0, 19.0),
                max_health: 50,
                frames: [9, 6, 7, 4, 5],
                attack_range_tiles: 1.0,
                attack_box_width: 82.0,
                attack_box_offset: -30.0,
                strike_frame: 3,
                water_immune: false,
            },
            EnemyKind::Jumper => ArchetypeParams {
                hitbox: Vec2::new(17.0, 21.0),
                max_health: 25,
                frames: [8, 6, 7, 4, 5],
                attack_range_tiles: 3.0,
                attack_box_width: 17.0,
                attack_box_offset: 0.0,
                strike_frame: 3,
                water_immune: false,
            },
            EnemyKind::Swimmer => ArchetypeParams {
                hitbox: Vec2::new(18.0, 22.0),
                max_health: 25,
                frames: [8, 6, 8, 4, 5],
                attack_range_tiles: 2.0,
                attack_box_width: 40.0,
                attack_box_offset: -11.0,
                strike_frame: 3,
                water_immune: true,
            },
        }
    }
}

/// Archetype with its per-enemy behavior state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Archetype {
    Walker,
    Jumper {
        /// Ticks left resting in Idle
        rest: u32,
        leaping: bool,
    },
    Swimmer,
}

impl Archetype {
    pub fn new(kind: EnemyKind) -> Self {
        match kind {
            EnemyKind::Walker => Archetype::Walker,
            EnemyKind::Jumper => Archetype::Jumper {
                rest: 0,
                leaping: false,
            },
            EnemyKind::Swimmer => Archetype::Swimmer,
        }
    }

    pub fn kind(&self) -> EnemyKind {
        match self {
            Archetype::Walker => EnemyKind::Walker,
            Archetype::Jumper { .. } => EnemyKind::Jumper,
            Archetype::Swimmer => EnemyKind::Swimmer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub archetype: Archetype,
    pub body: PhysicsBody,
    pub anim: AnimationState<EnemyState>,
    health: i32,
    max_health: i32,
    /// False once the death animation completes
    active: bool,
    attack_checked: bool,
    knockback: Facing,
    spawn: Vec2,
}

/// World view an enemy needs for one tick
#[derive(Debug, Clone, Copy)]
pub struct EnemyContext<'a> {
    pub grid: &'a TileGrid,
    pub config: &'a SimConfig,
    pub player: &'a Rect,
}

/// Effects of one enemy tick for the orchestrator to apply
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnemyTick {
    /// Attack box that lands this tick
    pub strike: Option<Rect>,
    pub emote: Option<(EmoteKind, Vec2)>,
    /// Death animation finished this tick
    pub deactivated: bool,
}

impl Enemy {
    /// New enemy with its hitbox top-left at `spawn`
    pub fn new(kind: EnemyKind, spawn: Vec2, config: &SimConfig) -> Self {
        let params = kind.params();
        let size = params.hitbox * config.scale;
        let mut body = PhysicsBody::new(
            Rect::new(spawn.x, spawn.y, size.x, size.y),
            config.enemy_walk_speed(),
        );
        body.facing = Facing::Left;
        Self {
            archetype: Archetype::new(kind),
            body,
            anim: AnimationState::new(EnemyState::Idle),
            health: params.max_health,
            max_health: params.max_health,
            active: true,
            attack_checked: false,
            knockback: Facing::Right,
            spawn,
        }
    }

    pub fn kind(&self) -> EnemyKind {
        self.archetype.kind()
    }

    pub fn params(&self) -> ArchetypeParams {
        self.kind().params()
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn state(&self) -> EnemyState {
        self.anim.action
    }

    pub fn hitbox(&self) -> &Rect {
        &self.body.hitbox
    }

    pub fn frame_count(&self, state: EnemyState) -> usize {
        self.params().frames[state.index()]
    }

    fn is_leaping(&self) -> bool {
        matches!(self.archetype, Archetype::Jumper { leaping: true, .. })
    }

    /// Can be hurt by a player attack
    pub fn is_damageable(&self) -> bool {
        self.active
            && !matches!(self.state(), EnemyState::Hit | EnemyState::Dead)
            && !self.is_leaping()
    }

    /// Hurts the player on touch
    pub fn deals_contact_damage(&self) -> bool {
        self.active && !matches!(self.state(), EnemyState::Hit | EnemyState::Dead)
    }

    /// Subtract health, entering Dead at zero and Hit otherwise
    pub fn hurt(&mut self, amount: i32) {
        if !self.active || self.state() == EnemyState::Dead {
            return;
        }
        self.health = (self.health - amount).max(0);
        if self.health == 0 {
            self.anim.force(EnemyState::Dead);
            if let Archetype::Jumper { leaping, .. } = &mut self.archetype {
                *leaping = false;
            }
            debug!("{:?} killed", self.kind());
        } else {
            self.anim.force(EnemyState::Hit);
            self.knockback = self.body.facing.flipped();
        }
    }

    /// [`hurt`](Self::hurt) with knockback away from `source_x`
    pub fn hurt_from(&mut self, amount: i32, source_x: f32) {
        self.hurt(amount);
        if self.state() == EnemyState::Hit {
            self.knockback = Facing::toward(source_x, self.body.hitbox.x);
        }
    }

    pub fn kill(&mut self) {
        self.hurt(self.health.max(1));
    }

    /// Restore to the level-load state
    pub fn reset(&mut self, grid: &TileGrid) {
        self.archetype = Archetype::new(self.kind());
        self.health = self.max_health;
        self.active = true;
        self.attack_checked = false;
        self.body.facing = Facing::Left;
        self.anim.force(EnemyState::Idle);
        self.body.place(grid, self.spawn);
    }

    /// Attack box for the current facing
    pub fn attack_box(&self, scale: f32) -> Rect {
        let params = self.params();
        let hb = &self.body.hitbox;
        let width = params.attack_box_width * scale;
        Rect::new(hb.x + params.attack_box_offset * scale, hb.y, width, hb.height)
    }

    /// Tile row the enemy stands in
    fn row(&self, grid: &TileGrid) -> i32 {
        grid.row_of(self.body.hitbox.bottom() - COLLISION_INSET)
    }

    fn attack_range(&self, grid: &TileGrid) -> f32 {
        self.params().attack_range_tiles * grid.tile_size()
    }

    fn can_see_player(&self, ctx: &EnemyContext) -> bool {
        let row = self.row(ctx.grid);
        let player_row = ctx.grid.row_of(ctx.player.bottom() - COLLISION_INSET);
        if row != player_row {
            return false;
        }
        let sight = self.attack_range(ctx.grid) * ctx.config.sight_attack_ranges;
        (ctx.player.x - self.body.hitbox.x).abs() <= sight
            && ctx.grid.is_sight_clear(&self.body.hitbox, ctx.player, row)
    }

    fn is_player_close_for_attack(&self, ctx: &EnemyContext) -> bool {
        (ctx.player.x - self.body.hitbox.x).abs() <= self.attack_range(ctx.grid)
    }

    /// Face the player, reporting a surprise emote on a turn
    fn turn_towards_player(&mut self, ctx: &EnemyContext, tick: &mut EnemyTick) {
        let facing = Facing::toward(self.body.hitbox.x, ctx.player.x);
        if facing != self.body.facing {
            self.body.facing = facing;
            tick.emote = Some((EmoteKind::Exclamation, self.emote_anchor()));
        }
    }

    fn emote_anchor(&self) -> Vec2 {
        let hb = &self.body.hitbox;
        Vec2::new(hb.center().x, hb.y)
    }

    /// Walk forward, turning around at walls and ledges
    fn patrol(&mut self, grid: &TileGrid) {
        let dx = self.body.facing.sign() * self.body.walk_speed;
        let moved = self.body.hitbox.translated(dx, 0.0);
        if grid.can_occupy(&moved) && grid.is_floor_ahead(&self.body.hitbox, dx) {
            self.body.hitbox = moved;
        } else {
            self.body.facing = self.body.facing.flipped();
        }
    }

    /// Running: chase a visible player and switch to Attack when close
    fn chase(&mut self, ctx: &EnemyContext, tick: &mut EnemyTick) {
        if self.can_see_player(ctx) {
            self.turn_towards_player(ctx, tick);
            if self.is_player_close_for_attack(ctx) {
                self.anim.force(EnemyState::Attack);
                return;
            }
        }
        self.patrol(ctx.grid);
    }

    /// Report the strike box once per attack on the strike frame
    fn strike(&mut self, scale: f32, tick: &mut EnemyTick) {
        if self.anim.frame == 0 {
            self.attack_checked = false;
        }
        if self.anim.frame == self.params().strike_frame && !self.attack_checked {
            self.attack_checked = true;
            tick.strike = Some(self.attack_box(scale));
        }
    }
}

/// Advance one enemy by one tick
pub fn advance(enemy: &mut Enemy, ctx: &EnemyContext) -> EnemyTick {
    let mut tick = EnemyTick::default();
    if !enemy.active {
        return tick;
    }

    let params = ctx.config.body_params();
    match enemy.state() {
        EnemyState::Dead => {
            if enemy.body.in_air {
                enemy.body.step(ctx.grid, 0.0, &params);
            }
        }
        EnemyState::Hit => {
            let knockback_frames = enemy
                .frame_count(EnemyState::Hit)
                .saturating_sub(KNOCKBACK_TAIL_FRAMES);
            let dx = if enemy.anim.frame <= knockback_frames {
                enemy.knockback.sign() * enemy.body.walk_speed * ENEMY_KNOCKBACK
            } else {
                0.0
            };
            enemy.body.step(ctx.grid, dx, &params);
        }
        _ if enemy.body.in_air => {
            let dx = if enemy.is_leaping() {
                enemy.body.facing.sign() * enemy.body.walk_speed * JUMPER_LEAP_MULTIPLIER
            } else {
                0.0
            };
            let out = enemy.body.step(ctx.grid, dx, &params);
            if out.landed {
                if let Archetype::Jumper { rest, leaping } = &mut enemy.archetype {
                    if *leaping {
                        *leaping = false;
                        *rest = ctx.config.jumper_rest_ticks;
                        enemy.anim.force(EnemyState::Idle);
                    }
                }
            }
        }
        state => {
            enemy.body.settle(ctx.grid);
            if !enemy.body.in_air {
                advance_grounded(enemy, state, ctx, &mut tick);
            }
        }
    }

    let state = enemy.state();
    let frames = enemy.frame_count(state);
    if enemy.anim.advance(frames, ctx.config.ani_speed) == AnimStep::Finished {
        match state {
            EnemyState::Dead => {
                enemy.active = false;
                tick.deactivated = true;
            }
            EnemyState::Attack if enemy.is_leaping() => {
                let strike_frame = enemy.params().strike_frame;
                enemy.anim.enter_at(EnemyState::Attack, strike_frame, frames);
            }
            EnemyState::Attack | EnemyState::Hit => enemy.anim.force(EnemyState::Idle),
            _ => {}
        }
    }

    tick
}

fn advance_grounded(enemy: &mut Enemy, state: EnemyState, ctx: &EnemyContext, tick: &mut EnemyTick) {
    let scale = ctx.config.scale;
    let strike_frame = enemy.params().strike_frame;
    match (enemy.kind(), state) {
        (EnemyKind::Jumper, EnemyState::Idle) => {
            if let Archetype::Jumper { rest, .. } = &mut enemy.archetype {
                if *rest > 0 {
                    *rest -= 1;
                    return;
                }
            }
            enemy.anim.force(EnemyState::Running);
        }
        (_, EnemyState::Idle) => enemy.anim.force(EnemyState::Running),
        (_, EnemyState::Running) => enemy.chase(ctx, tick),
        (EnemyKind::Walker, EnemyState::Attack) => enemy.strike(scale, tick),
        (EnemyKind::Jumper, EnemyState::Attack) => {
            // Wind up until the strike frame, then leap
            if enemy.anim.frame >= strike_frame
                && !enemy.is_leaping()
                && enemy.body.launch(ctx.config.jumper_leap_speed())
            {
                enemy.archetype = Archetype::Jumper {
                    rest: 0,
                    leaping: true,
                };
            }
        }
        (EnemyKind::Swimmer, EnemyState::Attack) => {
            enemy.strike(scale, tick);
            if enemy.anim.frame >= strike_frame {
                let dx = enemy.body.facing.sign() * enemy.body.walk_speed * SWIMMER_LUNGE_MULTIPLIER;
                let moved = enemy.body.hitbox.translated(dx, 0.0);
                if ctx.grid.can_occupy(&moved) && ctx.grid.is_floor_ahead(&enemy.body.hitbox, dx) {
                    enemy.body.hitbox = moved;
                } else {
                    enemy.anim.force(EnemyState::Idle);
                    tick.emote = Some((EmoteKind::Question, enemy.emote_anchor()));
                }
            }
        }
        (_, EnemyState::Hit | EnemyState::Dead) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tiles::tests::grid;

    fn setup(kind: EnemyKind) -> (TileGrid, SimConfig, Enemy) {
        let g = grid(
            &[
                "....................",
                "....................",
                "....................",
                "....................",
                "####################",
            ],
            10.0,
        );
        let config = SimConfig {
            scale: 0.25,
            ..SimConfig::default()
        };
        let h = kind.params().hitbox.y * config.scale;
        let mut enemy = Enemy::new(kind, Vec2::new(100.0, 40.0 - h), &config);
        enemy.reset(&g);
        (g, config, enemy)
    }

    fn run(enemy: &mut Enemy, g: &TileGrid, config: &SimConfig, player: &Rect, ticks: u32) -> Vec<EnemyTick> {
        let ctx = EnemyContext {
            grid: g,
            config,
            player,
        };
        (0..ticks).map(|_| advance(enemy, &ctx)).collect()
    }

    #[test]
    fn test_hurt_twice_enters_hit() {
        let (_, _, mut enemy) = setup(EnemyKind::Walker);
        enemy.hurt(20);
        enemy.hurt(20);
        assert_eq!(enemy.health(), 10);
        assert_eq!(enemy.state(), EnemyState::Hit);
    }

    #[test]
    fn test_lethal_hurt_deactivates_after_death_animation() {
        let (g, config, mut enemy) = setup(EnemyKind::Jumper);
        enemy.hurt(15);
        enemy.hurt(20);
        assert!(enemy.health() <= 0);
        assert_eq!(enemy.state(), EnemyState::Dead);
        assert!(!enemy.is_damageable());

        let far = Rect::new(0.0, 0.0, 1.0, 1.0);
        let ticks = enemy.frame_count(EnemyState::Dead) as u32 * config.ani_speed;
        let results = run(&mut enemy, &g, &config, &far, ticks);
        assert!(results.last().is_some_and(|t| t.deactivated));
        assert!(!enemy.is_active());
        assert!(!enemy.deals_contact_damage());
    }

    #[test]
    fn test_dead_enemy_ignores_further_damage() {
        let (_, _, mut enemy) = setup(EnemyKind::Swimmer);
        enemy.kill();
        enemy.hurt(5);
        assert_eq!(enemy.health(), 0);
        assert_eq!(enemy.state(), EnemyState::Dead);
    }

    #[test]
    fn test_reset_reactivates() {
        let (g, config, mut enemy) = setup(EnemyKind::Walker);
        enemy.kill();
        let far = Rect::new(0.0, 0.0, 1.0, 1.0);
        run(&mut enemy, &g, &config, &far, 500);
        assert!(!enemy.is_active());
        enemy.reset(&g);
        assert!(enemy.is_active());
        assert_eq!(enemy.health(), enemy.max_health());
        assert!(enemy.is_damageable());
    }

    #[test]
    fn test_walker_patrols_and_turns_at_ledge() {
        let g = grid(&["..........", "..........", "...####..."], 10.0);
        let config = SimConfig {
            scale: 0.25,
            ..SimConfig::default()
        };
        let h = EnemyKind::Walker.params().hitbox.y * config.scale;
        let mut enemy = Enemy::new(EnemyKind::Walker, Vec2::new(45.0, 20.0 - h), &config);
        enemy.reset(&g);
        let far = Rect::new(0.0, 0.0, 1.0, 1.0);
        for t in run(&mut enemy, &g, &config, &far, 2000) {
            assert!(t.strike.is_none());
            assert!(!enemy.body.in_air);
        }
        assert!(enemy.hitbox().x >= 30.0);
        // Trailing edge may overhang by the collision inset
        assert!(enemy.hitbox().right() <= 70.0 + COLLISION_INSET);
    }

    #[test]
    fn test_walker_attacks_close_player() {
        let (g, config, mut enemy) = setup(EnemyKind::Walker);
        let player = Rect::new(enemy.hitbox().x + 6.0, 33.25, 5.0, 6.75);
        let results = run(&mut enemy, &g, &config, &player, 200);
        assert!(results.iter().any(|t| t.emote.is_some()));
        let strikes = results.iter().filter(|t| t.strike.is_some()).count();
        assert_eq!(strikes, 1);
    }

    #[test]
    fn test_jumper_not_damageable_while_leaping() {
        let (g, config, mut enemy) = setup(EnemyKind::Jumper);
        let player = Rect::new(enemy.hitbox().x - 20.0, 33.25, 5.0, 6.75);
        let ctx = EnemyContext {
            grid: &g,
            config: &config,
            player: &player,
        };
        let mut leapt = false;
        for _ in 0..400 {
            advance(&mut enemy, &ctx);
            if enemy.body.in_air {
                leapt = true;
                assert!(!enemy.is_damageable());
                assert!(enemy.deals_contact_damage());
            }
        }
        assert!(leapt);
    }

    #[test]
    fn test_swimmer_stops_when_blocked() {
        let g = grid(&["#.........", "#.........", "##########"], 10.0);
        let config = SimConfig {
            scale: 0.25,
            ..SimConfig::default()
        };
        let h = EnemyKind::Swimmer.params().hitbox.y * config.scale;
        let mut enemy = Enemy::new(EnemyKind::Swimmer, Vec2::new(20.0, 20.0 - h), &config);
        enemy.reset(&g);
        let player = Rect::new(11.0, 20.0 - 6.75, 5.0, 6.75);
        let results = run(&mut enemy, &g, &config, &player, 400);
        assert!(
            results
                .iter()
                .any(|t| matches!(t.emote, Some((EmoteKind::Question, _))))
        );
        assert!(g.can_occupy(enemy.hitbox()));
    }
}
