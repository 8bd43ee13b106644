//! Cannonballs
//!
//! Projectiles fly horizontally at constant speed until they hit the player
//! or level geometry. There is no range limit; because everything outside
//! the grid is solid, a ball leaving the level retires at the edge.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::Facing;
use super::pool::Pool;
use super::rect::Rect;
use super::tiles::TileGrid;
use crate::settings::SimConfig;

/// Unscaled cannonball size
pub const CANNON_BALL_SIZE: Vec2 = Vec2::new(15.0, 15.0);
/// Muzzle offsets from the cannon hitbox origin (unscaled)
const MUZZLE_LEFT: Vec2 = Vec2::new(-3.0, 5.0);
const MUZZLE_RIGHT: Vec2 = Vec2::new(29.0, 5.0);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub hitbox: Rect,
    /// Signed horizontal speed in pixels per tick
    pub velocity: f32,
}

impl Projectile {
    /// Ball leaving a cannon whose hitbox is `cannon`
    pub fn from_cannon(cannon: &Rect, facing: Facing, config: &SimConfig) -> Self {
        let muzzle = match facing {
            Facing::Left => MUZZLE_LEFT,
            Facing::Right => MUZZLE_RIGHT,
        };
        let muzzle = muzzle * config.scale;
        let size = CANNON_BALL_SIZE * config.scale;
        Self {
            hitbox: Rect::new(cannon.x + muzzle.x, cannon.y + muzzle.y, size.x, size.y),
            velocity: facing.sign() * config.projectile_speed(),
        }
    }
}

/// How a projectile retired this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Impact {
    Player,
    Level,
}

/// Advance every live projectile, retiring those that hit something.
///
/// Returns the impacts in slot order; the caller applies player damage.
pub fn update_projectiles(
    pool: &mut Pool<Projectile>,
    grid: &TileGrid,
    player: &Rect,
) -> Vec<Impact> {
    let mut impacts = Vec::new();
    pool.retain(|p| {
        p.hitbox.x += p.velocity;
        let center = p.hitbox.center();
        if p.hitbox.intersects(player) {
            impacts.push(Impact::Player);
            false
        } else if grid.is_solid_at(center.x, center.y) {
            impacts.push(Impact::Level);
            false
        } else {
            true
        }
    });
    impacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tiles::tests::grid;

    fn config() -> SimConfig {
        SimConfig {
            scale: 0.25,
            ..SimConfig::default()
        }
    }

    #[test]
    fn test_muzzle_side_follows_facing() {
        let cannon = Rect::new(50.0, 10.0, 10.0, 6.5);
        let left = Projectile::from_cannon(&cannon, Facing::Left, &config());
        let right = Projectile::from_cannon(&cannon, Facing::Right, &config());
        assert!(left.hitbox.x < cannon.x && left.velocity < 0.0);
        assert!(right.hitbox.x > cannon.x && right.velocity > 0.0);
    }

    #[test]
    fn test_hits_player_before_wall() {
        let g = grid(&["....#"], 10.0);
        let mut pool = Pool::with_capacity(4);
        pool.spawn(Projectile {
            hitbox: Rect::new(10.0, 2.0, 4.0, 4.0),
            velocity: 1.0,
        });
        let player = Rect::new(14.0, 0.0, 5.0, 8.0);
        assert_eq!(update_projectiles(&mut pool, &g, &player), vec![Impact::Player]);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_retires_on_level_geometry() {
        let g = grid(&["....#"], 10.0);
        let mut pool = Pool::with_capacity(4);
        pool.spawn(Projectile {
            hitbox: Rect::new(30.0, 2.0, 4.0, 4.0),
            velocity: 2.0,
        });
        let far = Rect::new(0.0, 0.0, 1.0, 1.0);
        let mut impacts = Vec::new();
        for _ in 0..10 {
            impacts.extend(update_projectiles(&mut pool, &g, &far));
        }
        assert_eq!(impacts, vec![Impact::Level]);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_retires_at_level_edge() {
        let g = grid(&["....."], 10.0);
        let mut pool = Pool::with_capacity(1);
        pool.spawn(Projectile {
            hitbox: Rect::new(5.0, 2.0, 4.0, 4.0),
            velocity: -1.0,
        });
        let far = Rect::new(40.0, 0.0, 1.0, 1.0);
        for _ in 0..20 {
            update_projectiles(&mut pool, &g, &far);
        }
        assert!(pool.is_empty());
    }
}
