//! Damage rules between the player and enemies

use glam::Vec2;
use proptest::prelude::*;

use tidepool::consts::ANI_SPEED;
use tidepool::sim::enemy::{self, EnemyContext};
use tidepool::sim::interaction::{attack_vs_enemies, enemy_vs_player};
use tidepool::sim::tiles::AIR_TILE;
use tidepool::sim::{Enemy, EnemyKind, EnemyState, Player, Rect, TileGrid, TileId};
use tidepool::SimConfig;

fn config() -> SimConfig {
    SimConfig {
        scale: 0.25,
        ..SimConfig::default()
    }
}

/// Flat floor eight tiles wide, ground on the bottom row
fn flat(tile_size: f32) -> TileGrid {
    let rows: Vec<Vec<TileId>> = (0..4)
        .map(|y| vec![if y == 3 { 1 } else { AIR_TILE }; 8])
        .collect();
    TileGrid::from_rows(&rows, tile_size).unwrap()
}

fn grounded_walker(grid: &TileGrid, config: &SimConfig) -> Enemy {
    let size = EnemyKind::Walker.params().hitbox * config.scale;
    let spawn = Vec2::new(20.0, 3.0 * grid.tile_size() - size.y);
    let mut walker = Enemy::new(EnemyKind::Walker, spawn, config);
    walker.reset(grid);
    walker
}

#[test]
fn two_small_hits_leave_enemy_in_hit() {
    let config = config();
    let mut walker = Enemy::new(EnemyKind::Walker, Vec2::ZERO, &config);
    assert_eq!(walker.health(), 50);
    walker.hurt(20);
    walker.hurt(20);
    assert_eq!(walker.health(), 10);
    assert_eq!(walker.state(), EnemyState::Hit);
}

#[test]
fn lethal_hit_kills_then_deactivates() {
    let config = config();
    let grid = flat(10.0);
    let mut walker = grounded_walker(&grid, &config);
    walker.hurt(35);
    assert_eq!(walker.health(), 15);

    walker.hurt(20);
    assert!(walker.health() <= 0);
    assert_eq!(walker.state(), EnemyState::Dead);
    assert!(walker.is_active());

    // Player far away so nothing else interferes
    let player = Rect::new(1_000.0, 0.0, 5.0, 7.0);
    let ctx = EnemyContext {
        grid: &grid,
        config: &config,
        player: &player,
    };
    let dead_ticks = walker.frame_count(EnemyState::Dead) as u32 * ANI_SPEED;
    let mut deactivated_at = None;
    for t in 1..=dead_ticks + 1 {
        if enemy::advance(&mut walker, &ctx).deactivated {
            deactivated_at = Some(t);
            break;
        }
    }
    assert_eq!(deactivated_at, Some(dead_ticks));
    assert!(!walker.is_active());
}

#[test]
fn dead_enemy_is_inert_until_reset() {
    let config = config();
    let grid = flat(10.0);
    let mut enemies = vec![grounded_walker(&grid, &config)];
    enemies[0].kill();

    let player = Rect::new(1_000.0, 0.0, 5.0, 7.0);
    let ctx = EnemyContext {
        grid: &grid,
        config: &config,
        player: &player,
    };
    for _ in 0..1_000 {
        enemy::advance(&mut enemies[0], &ctx);
    }
    assert!(!enemies[0].is_active());

    let everywhere = Rect::new(-1_000.0, -1_000.0, 5_000.0, 5_000.0);
    assert_eq!(attack_vs_enemies(&everywhere, &mut enemies, 20, 0.0), None);
    let mut victim = Player::new(&config, enemies[0].hitbox().position());
    assert!(!enemy_vs_player(&enemies[0], &mut victim));
    assert_eq!(victim.lives(), victim.max_lives());

    enemies[0].reset(&grid);
    assert!(enemies[0].is_active());
    assert_eq!(enemies[0].health(), enemies[0].max_health());
    assert_eq!(attack_vs_enemies(&everywhere, &mut enemies, 20, 0.0), Some(0));
}

#[test]
fn hit_lock_absorbs_repeat_damage() {
    let config = config();
    let mut player = Player::new(&config, Vec2::ZERO);
    let lives = player.lives();
    assert!(player.take_damage());
    assert!(!player.take_damage());
    assert_eq!(player.lives(), lives - 1);
}

#[test]
fn red_potion_never_exceeds_max_lives() {
    let config = config();
    let mut player = Player::new(&config, Vec2::ZERO);
    player.add_life(5);
    assert_eq!(player.lives(), player.max_lives());
}

proptest! {
    #[test]
    fn one_swing_damages_exactly_one_enemy(
        count in 2usize..8,
        kinds in prop::collection::vec(0u8..3, 8),
    ) {
        let config = config();
        let mut enemies: Vec<Enemy> = (0..count)
            .map(|i| {
                let kind = match kinds[i] {
                    0 => EnemyKind::Walker,
                    1 => EnemyKind::Jumper,
                    _ => EnemyKind::Swimmer,
                };
                Enemy::new(kind, Vec2::new(10.0, 10.0), &config)
            })
            .collect();
        let attack = Rect::new(0.0, 0.0, 40.0, 40.0);
        let hit = attack_vs_enemies(&attack, &mut enemies, 20, 0.0);
        prop_assert_eq!(hit, Some(0));
        let damaged = enemies.iter().filter(|e| e.health() < e.max_health()).count();
        prop_assert_eq!(damaged, 1);
    }

    #[test]
    fn damage_in_hit_window_costs_one_life(extra_calls in 1usize..10) {
        let config = config();
        let mut player = Player::new(&config, Vec2::ZERO);
        let lives = player.lives();
        for _ in 0..=extra_calls {
            player.take_damage_from(50.0);
        }
        prop_assert_eq!(player.lives(), lives - 1);
    }

    #[test]
    fn enemy_health_never_negative(hits in prop::collection::vec(0i32..100, 1..10)) {
        let config = config();
        let mut walker = Enemy::new(EnemyKind::Walker, Vec2::ZERO, &config);
        for amount in hits {
            walker.hurt(amount);
            prop_assert!(walker.health() >= 0);
            prop_assert!(walker.health() <= walker.max_health());
        }
    }
}
