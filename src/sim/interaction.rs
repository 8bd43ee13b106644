//! Cross-entity hit tests
//!
//! Stateless functions run by the tick orchestrator after the per-entity
//! updates. Each one takes the collections it touches explicitly.

use log::debug;

use super::enemy::Enemy;
use super::objects::{InteractiveObject, ObjectKind, ObjectSet, PotionKind};
use super::player::Player;
use super::rect::Rect;
use super::tiles::TileGrid;
use crate::settings::SimConfig;

/// Damage the first damageable enemy touched by `attack_box`.
///
/// One pass damages at most one enemy. Returns its index.
pub fn attack_vs_enemies(
    attack_box: &Rect,
    enemies: &mut [Enemy],
    damage: i32,
    source_x: f32,
) -> Option<usize> {
    let index = enemies
        .iter()
        .position(|e| e.is_damageable() && attack_box.intersects(e.hitbox()))?;
    enemies[index].hurt_from(damage, source_x);
    debug!(
        "attack hit {:?} #{index}, health {}",
        enemies[index].kind(),
        enemies[index].health()
    );
    Some(index)
}

/// Break the first intact container touched by `attack_box`, dropping its
/// potion. Returns the dropped potion kind.
pub fn attack_vs_breakables(attack_box: &Rect, objects: &mut ObjectSet, scale: f32) -> Option<PotionKind> {
    let container = objects.iter_mut().find(|o| {
        matches!(o.kind, ObjectKind::Container(_))
            && o.active
            && !o.animating
            && o.hitbox.intersects(attack_box)
    })?;
    let ObjectKind::Container(kind) = container.kind else {
        return None;
    };
    container.animating = true;
    let loot = kind.loot();
    let potion = InteractiveObject::potion_from(&container.hitbox, loot, scale);
    objects.push(potion);
    Some(loot)
}

/// Collect every active potion the player touches. Returns how many.
pub fn pickups_vs_player(player: &mut Player, objects: &mut ObjectSet, config: &SimConfig) -> usize {
    let hitbox = *player.hitbox();
    let mut collected = 0;
    for object in objects.iter_mut() {
        let ObjectKind::Potion(kind) = object.kind else {
            continue;
        };
        if !object.active || !object.hitbox.intersects(&hitbox) {
            continue;
        }
        object.active = false;
        collected += 1;
        match kind {
            PotionKind::Red => player.add_life(config.red_potion_value),
            PotionKind::Blue => player.change_power(config.blue_potion_value),
        }
    }
    collected
}

/// Deactivate the first active star the player touches
pub fn star_vs_player(hitbox: &Rect, objects: &mut ObjectSet) -> bool {
    match objects
        .iter_mut()
        .find(|o| o.kind == ObjectKind::Star && o.active && o.hitbox.intersects(hitbox))
    {
        Some(star) => {
            star.active = false;
            true
        }
        None => false,
    }
}

/// Spike objects or spike tiles under the hitbox
pub fn hazard_touching(hitbox: &Rect, grid: &TileGrid, objects: &ObjectSet) -> bool {
    grid.is_hazard(hitbox)
        || objects
            .iter()
            .any(|o| o.kind == ObjectKind::Spike && o.active && o.hitbox.intersects(hitbox))
}

pub fn water_touching(hitbox: &Rect, grid: &TileGrid) -> bool {
    grid.is_water(hitbox)
}

/// Contact damage from one enemy. Returns true if the player lost a life.
pub fn enemy_vs_player(enemy: &Enemy, player: &mut Player) -> bool {
    enemy.deals_contact_damage()
        && enemy.hitbox().intersects(player.hitbox())
        && player.take_damage_from(enemy.hitbox().x)
}

/// An enemy strike box landing on the player
pub fn strike_vs_player(strike: &Rect, source_x: f32, player: &mut Player) -> bool {
    strike.intersects(player.hitbox()) && player.take_damage_from(source_x)
}
