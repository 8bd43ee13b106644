//! Interactive level objects
//!
//! Potions, containers, spikes, cannons, stars and decorations. Objects are
//! built from level placements and never destroyed during a level; they are
//! only deactivated, and `ObjectSet::reset` restores the level-load set.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::anim::{AnimStep, AnimationState};
use super::body::Facing;
use super::projectile::Projectile;
use super::rect::Rect;
use super::tiles::TileGrid;
use crate::consts::COLLISION_INSET;
use crate::settings::SimConfig;

/// Cannon animation frame that releases the ball
pub const CANNON_FIRE_FRAME: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PotionKind {
    /// Restores a life
    Red,
    /// Refills power
    Blue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    Barrel,
    Box,
}

impl ContainerKind {
    /// Potion dropped when broken
    pub fn loot(self) -> PotionKind {
        match self {
            ContainerKind::Barrel => PotionKind::Blue,
            ContainerKind::Box => PotionKind::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeKind {
    One,
    Two,
    Three,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Potion(PotionKind),
    Container(ContainerKind),
    Spike,
    Cannon(Facing),
    Star,
    Tree(TreeKind),
    /// Grass tuft variant
    Grass(u8),
}

impl ObjectKind {
    pub fn frame_count(self) -> usize {
        match self {
            ObjectKind::Potion(_) | ObjectKind::Cannon(_) => 7,
            ObjectKind::Container(_) => 8,
            ObjectKind::Star => 13,
            ObjectKind::Tree(_) => 4,
            ObjectKind::Spike | ObjectKind::Grass(_) => 1,
        }
    }

    /// Unscaled hitbox size
    fn hitbox_size(self) -> Vec2 {
        match self {
            ObjectKind::Potion(_) => Vec2::new(7.0, 14.0),
            ObjectKind::Container(ContainerKind::Barrel) => Vec2::new(23.0, 25.0),
            ObjectKind::Container(ContainerKind::Box) => Vec2::new(25.0, 18.0),
            ObjectKind::Spike => Vec2::new(32.0, 16.0),
            ObjectKind::Cannon(_) => Vec2::new(40.0, 26.0),
            ObjectKind::Star => Vec2::new(20.0, 20.0),
            ObjectKind::Tree(_) | ObjectKind::Grass(_) => Vec2::new(32.0, 32.0),
        }
    }

    /// Animates continuously rather than on a trigger
    fn loops(self) -> bool {
        matches!(
            self,
            ObjectKind::Potion(_) | ObjectKind::Star | ObjectKind::Tree(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractiveObject {
    pub kind: ObjectKind,
    pub hitbox: Rect,
    pub anim: AnimationState<()>,
    pub active: bool,
    /// A triggered animation (container break, cannon fire) is playing
    pub animating: bool,
}

impl InteractiveObject {
    /// Object resting in the tile at (`tx`, `ty`): centered horizontally,
    /// standing on the tile's bottom edge
    pub fn at_tile(kind: ObjectKind, tx: u32, ty: u32, tile_size: f32, scale: f32) -> Self {
        let size = kind.hitbox_size() * scale;
        let x = tx as f32 * tile_size + (tile_size - size.x) / 2.0;
        let y = match kind {
            ObjectKind::Star => ty as f32 * tile_size + (tile_size - size.y) / 2.0,
            _ => (ty + 1) as f32 * tile_size - size.y,
        };
        Self::new(kind, Rect::new(x, y, size.x, size.y))
    }

    pub fn new(kind: ObjectKind, hitbox: Rect) -> Self {
        Self {
            kind,
            hitbox,
            anim: AnimationState::new(()),
            active: true,
            animating: kind.loops(),
        }
    }

    /// Potion dropped by a broken container, hovering above it
    pub fn potion_from(container: &Rect, kind: PotionKind, scale: f32) -> Self {
        let size = ObjectKind::Potion(kind).hitbox_size() * scale;
        let x = container.center().x - size.x / 2.0;
        let y = container.y - container.height / 2.0;
        Self::new(ObjectKind::Potion(kind), Rect::new(x, y, size.x, size.y))
    }

    /// Advance the animation one tick
    fn update(&mut self, ani_speed: u32) {
        if !self.animating {
            return;
        }
        if self.anim.advance(self.kind.frame_count(), ani_speed) == AnimStep::Finished {
            match self.kind {
                ObjectKind::Container(_) => {
                    self.animating = false;
                    self.active = false;
                }
                ObjectKind::Cannon(_) => self.animating = false,
                _ => {}
            }
        }
    }
}

/// Every object of the current level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectSet {
    objects: Vec<InteractiveObject>,
    initial: Vec<InteractiveObject>,
}

impl ObjectSet {
    pub fn new(objects: Vec<InteractiveObject>) -> Self {
        Self {
            initial: objects.clone(),
            objects,
        }
    }

    /// Restore the level-load set, dropping spawned potions
    pub fn reset(&mut self) {
        self.objects = self.initial.clone();
    }

    pub fn iter(&self) -> impl Iterator<Item = &InteractiveObject> {
        self.objects.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut InteractiveObject> {
        self.objects.iter_mut()
    }

    pub fn push(&mut self, object: InteractiveObject) {
        self.objects.push(object);
    }

    /// Animate objects and fire cannons that see the player.
    ///
    /// Returns the cannonballs released this tick.
    pub fn update(&mut self, grid: &TileGrid, player: &Rect, config: &SimConfig) -> Vec<Projectile> {
        let mut shots = Vec::new();
        let range = config.cannon_range_tiles * grid.tile_size();
        let player_row = grid.row_of(player.bottom() - COLLISION_INSET);

        for object in self.objects.iter_mut().filter(|o| o.active) {
            if let ObjectKind::Cannon(facing) = object.kind {
                if !object.animating && cannon_sees(grid, &object.hitbox, facing, player, player_row, range) {
                    object.animating = true;
                }
                object.update(config.ani_speed);
                if object.animating
                    && object.anim.frame == CANNON_FIRE_FRAME
                    && object.anim.is_frame_start()
                {
                    shots.push(Projectile::from_cannon(&object.hitbox, facing, config));
                }
            } else {
                object.update(config.ani_speed);
            }
        }
        shots
    }
}

fn cannon_sees(
    grid: &TileGrid,
    cannon: &Rect,
    facing: Facing,
    player: &Rect,
    player_row: i32,
    range: f32,
) -> bool {
    let row = grid.row_of(cannon.bottom() - COLLISION_INSET);
    let in_front = match facing {
        Facing::Left => cannon.x > player.x,
        Facing::Right => cannon.x < player.x,
    };
    row == player_row
        && (player.x - cannon.x).abs() <= range
        && in_front
        && grid.is_line_clear(cannon, player, row)
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

    fn cannon_level() -> (TileGrid, ObjectSet) {
        let g = grid(&["..........", "..........", "##########"], 10.0);
        let cannon = InteractiveObject::at_tile(ObjectKind::Cannon(Facing::Left), 8, 1, 10.0, 0.25);
        (g, ObjectSet::new(vec![cannon]))
    }

    #[test]
    fn test_at_tile_stands_on_tile_bottom() {
        let obj = InteractiveObject::at_tile(ObjectKind::Container(ContainerKind::Box), 2, 3, 64.0, 2.0);
        assert_eq!(obj.hitbox.bottom(), 4.0 * 64.0);
        assert_eq!(obj.hitbox.center().x, 2.5 * 64.0);
        assert!(obj.active && !obj.animating);
    }

    #[test]
    fn test_cannon_fires_once_per_cycle_at_player_in_front() {
        let (g, mut objects) = cannon_level();
        let config = config();
        let player = Rect::new(40.0, 13.25, 5.0, 6.75);
        let cycle = ObjectKind::Cannon(Facing::Left).frame_count() as u32 * config.ani_speed;
        let shots: usize = (0..cycle).map(|_| objects.update(&g, &player, &config).len()).sum();
        assert_eq!(shots, 1);
    }

    #[test]
    fn test_cannon_ignores_player_behind_it() {
        let (g, mut objects) = cannon_level();
        let config = config();
        let player = Rect::new(95.0, 13.25, 4.0, 6.75);
        let shots: usize = (0..500).map(|_| objects.update(&g, &player, &config).len()).sum();
        assert_eq!(shots, 0);
    }

    #[test]
    fn test_broken_container_deactivates_after_animation() {
        let mut obj = InteractiveObject::at_tile(ObjectKind::Container(ContainerKind::Barrel), 0, 0, 10.0, 0.25);
        obj.animating = true;
        for _ in 0..8 * 25 {
            obj.update(25);
        }
        assert!(!obj.active);
    }

    #[test]
    fn test_reset_drops_spawned_potions() {
        let (_, mut objects) = cannon_level();
        objects.push(InteractiveObject::new(
            ObjectKind::Potion(PotionKind::Red),
            Rect::new(0.0, 0.0, 2.0, 2.0),
        ));
        assert_eq!(objects.iter().count(), 2);
        objects.reset();
        assert_eq!(objects.iter().count(), 1);
    }

    #[test]
    fn test_container_loot() {
        assert_eq!(ContainerKind::Barrel.loot(), PotionKind::Blue);
        assert_eq!(ContainerKind::Box.loot(), PotionKind::Red);
    }
}
