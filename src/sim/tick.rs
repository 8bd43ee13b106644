//! Fixed timestep simulation tick
//!
//! Core game loop that advances the world deterministically by one update.

use log::{debug, info, trace};

use super::enemy::{EnemyContext, EnemyState, advance as advance_enemy};
use super::events::{Emote, GameEvent};
use super::interaction::{
    attack_vs_breakables, attack_vs_enemies, enemy_vs_player, hazard_touching, pickups_vs_player,
    star_vs_player, strike_vs_player, water_touching,
};
use super::objects::ObjectKind;
use super::projectile::{Impact, update_projectiles};
use super::rect::Rect;
use super::state::{GamePhase, GameState};

/// Tiles the autopilot looks ahead before committing a power attack
const AUTOPILOT_DASH_TILES: f32 = 3.0;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    /// Start a normal swing
    pub attack: bool,
    /// Start a power attack dash
    pub power_attack: bool,
    /// Pause toggle
    pub pause: bool,
    /// Demo mode: the autopilot replaces the other inputs
    pub idle_mode: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.time_ticks += 1;

    if input.pause {
        state.toggle_pause();
        info!("phase -> {:?}", state.phase);
        return;
    }

    match state.phase {
        GamePhase::Playing => {}
        GamePhase::PlayerDying => {
            tick_dying(state);
            return;
        }
        _ => return,
    }
    state.session_ticks += 1;

    let input = if input.idle_mode {
        autopilot(state)
    } else {
        *input
    };
    apply_input(state, &input);

    // Objects and cannons
    let player_box = *state.player.hitbox();
    let shots = state.objects.update(&state.grid, &player_box, &state.config);
    for shot in shots {
        if state.projectiles.spawn(shot).is_some() {
            state.push_event(GameEvent::CannonFired);
        } else {
            debug!("projectile pool full, shot dropped");
        }
    }

    update_player(state);

    // Balls test against where the player ended up this tick
    let player_box = *state.player.hitbox();
    for impact in update_projectiles(&mut state.projectiles, &state.grid, &player_box) {
        if impact == Impact::Player && state.player.take_damage() {
            state.push_event(GameEvent::PlayerHit);
        }
    }

    update_enemies(state);

    state
        .emotes
        .retain(|emote| emote.update(state.config.ani_speed));
    state.update_camera();

    if state.player.is_dead() {
        state.phase = GamePhase::PlayerDying;
        info!("player died on level {}", state.level_index());
    } else if level_cleared(state) {
        state.complete_level();
    }
}

/// Death fall and animation; nothing else moves
fn tick_dying(state: &mut GameState) {
    let report = state
        .player
        .update(&state.grid, &state.config, &mut state.events);
    if report.death_finished {
        state.phase = GamePhase::GameOver;
        state.push_event(GameEvent::GameOver);
        info!("game over on level {}", state.level_index());
    }
}

fn apply_input(state: &mut GameState, input: &TickInput) {
    let player = &mut state.player;
    player.intent.left = input.left;
    player.intent.right = input.right;
    player.intent.jump = input.jump;
    if input.attack {
        player.start_attack();
    }
    if input.power_attack && player.power_attack(state.config.power_attack_cost) {
        debug!("power attack, {} power left", player.power());
    }
}

fn update_player(state: &mut GameState) {
    let report = state
        .player
        .update(&state.grid, &state.config, &mut state.events);

    if let Some(attack_box) = report.attack_box {
        let source_x = state.player.hitbox().x;
        if let Some(index) = attack_vs_enemies(
            &attack_box,
            &mut state.enemies,
            state.config.player_attack_damage,
            source_x,
        ) && state.enemies[index].state() == EnemyState::Dead
        {
            state.push_event(GameEvent::EnemyKilled);
        }
        if attack_vs_breakables(&attack_box, &mut state.objects, state.config.scale).is_some() {
            state.push_event(GameEvent::ContainerBroken);
        }
    }

    let hitbox = *state.player.hitbox();
    if report.moved {
        let collected = pickups_vs_player(&mut state.player, &mut state.objects, &state.config);
        for _ in 0..collected {
            state.push_event(GameEvent::PotionCollected);
        }
        if hazard_touching(&hitbox, &state.grid, &state.objects) {
            debug!("player touched spikes");
            state.player.kill();
        } else if water_touching(&hitbox, &state.grid) {
            debug!("player fell in water");
            state.player.kill();
        }
    }
}

fn update_enemies(state: &mut GameState) {
    let player_box = *state.player.hitbox();
    let ctx = EnemyContext {
        grid: &state.grid,
        config: &state.config,
        player: &player_box,
    };

    for enemy in state.enemies.iter_mut() {
        if !enemy.is_active() {
            continue;
        }
        let alive = enemy.state() != EnemyState::Dead;
        let report = advance_enemy(enemy, &ctx);

        if let Some(strike) = report.strike
            && strike_vs_player(&strike, enemy.hitbox().x, &mut state.player)
        {
            state.events.push(GameEvent::PlayerHit);
        }
        if enemy_vs_player(enemy, &mut state.player) {
            state.events.push(GameEvent::PlayerHit);
        }

        if hazard_touching(enemy.hitbox(), ctx.grid, &state.objects) {
            enemy.hurt(ctx.config.spike_enemy_damage);
        } else if !enemy.params().water_immune && water_touching(enemy.hitbox(), ctx.grid) {
            enemy.kill();
        }
        if alive && enemy.state() == EnemyState::Dead {
            state.events.push(GameEvent::EnemyKilled);
        }

        if let Some((kind, position)) = report.emote
            && state.emotes.spawn(Emote::new(kind, position)).is_none()
        {
            trace!("emote pool full, {kind:?} dropped");
        }
    }
}

/// Star touched, or every enemy of a populated level gone
fn level_cleared(state: &mut GameState) -> bool {
    let hitbox = *state.player.hitbox();
    if star_vs_player(&hitbox, &mut state.objects) {
        return true;
    }
    !state.enemies.is_empty() && state.enemies.iter().all(|e| !e.is_active())
}

/// Demo controller: walk right, jump at walls and gaps, swing at anything
/// in reach.
pub fn autopilot(state: &GameState) -> TickInput {
    let mut input = TickInput::default();
    if state.phase != GamePhase::Playing {
        return input;
    }

    let player = &state.player;
    let hitbox = *player.hitbox();
    let grid = &state.grid;
    let ts = grid.tile_size();
    input.right = true;

    let probe = ts * 0.5;
    let wall_ahead = !grid.can_occupy(&hitbox.translated(probe, 0.0));
    let gap_ahead = !player.body.in_air && !grid.is_floor_ahead(&hitbox, probe);
    let spikes_ahead = hazard_touching(&hitbox.translated(ts, 0.0), grid, &state.objects);
    input.jump = wall_ahead || gap_ahead || spikes_ahead;

    let reach = player.attack_box(state.config.scale);
    let enemy_in_reach = state
        .enemies
        .iter()
        .any(|e| e.is_damageable() && reach.intersects(e.hitbox()));
    let container_in_reach = state.objects.iter().any(|o| {
        matches!(o.kind, ObjectKind::Container(_))
            && o.active
            && !o.animating
            && reach.intersects(&o.hitbox)
    });
    input.attack = enemy_in_reach || container_in_reach;

    let dash = Rect::new(hitbox.right(), hitbox.y, ts * AUTOPILOT_DASH_TILES, hitbox.height);
    input.power_attack = !player.is_power_attacking()
        && player.power() == player.power_max()
        && state
            .enemies
            .iter()
            .any(|e| e.is_damageable() && dash.intersects(e.hitbox()));

    input
}
