//! Level data, validation and generation
//!
//! A [`LevelData`] is the authored description (JSON or an ASCII map). It is
//! validated and turned into a runtime [`Level`] by [`LevelData::build`];
//! nothing reaches the tick loop without passing through that check.

use glam::Vec2;
use log::info;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::{TILES_IN_HEIGHT, TILES_IN_WIDTH};
use crate::error::LevelError;
use crate::settings::SimConfig;
use crate::sim::body::Facing;
use crate::sim::enemy::{Enemy, EnemyKind};
use crate::sim::objects::{ContainerKind, InteractiveObject, ObjectKind, PotionKind, TreeKind};
use crate::sim::player::PLAYER_HITBOX_SIZE;
use crate::sim::rect::Rect;
use crate::sim::tiles::{AIR_TILE, SPIKE_TILE, TileGrid, TileId, WATER_DEEP_TILE, WATER_SURFACE_TILE};

/// Solid tile used by ASCII maps and generated levels
const GROUND_TILE: TileId = 1;
/// Narrowest generated level, in tiles
const MIN_GENERATED_WIDTH: usize = TILES_IN_WIDTH as usize + 4;

/// Tile coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilePos {
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyPlacement {
    pub kind: EnemyKind,
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectPlacement {
    pub kind: ObjectKind,
    pub x: u32,
    pub y: u32,
}

/// Authored level description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    /// Row-major tile ids
    pub tiles: Vec<Vec<TileId>>,
    pub spawn: Option<TilePos>,
    #[serde(default)]
    pub enemies: Vec<EnemyPlacement>,
    #[serde(default)]
    pub objects: Vec<ObjectPlacement>,
}

/// A validated level ready for simulation
#[derive(Debug, Clone)]
pub struct Level {
    pub grid: TileGrid,
    /// Player hitbox top-left at spawn
    pub player_spawn: Vec2,
    pub enemies: Vec<Enemy>,
    pub objects: Vec<InteractiveObject>,
    /// Largest horizontal camera offset in pixels
    pub max_camera_offset: f32,
}

impl LevelData {
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, LevelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse an ASCII map, one character per tile.
    ///
    /// Terrain: `#` solid, `.` air, `~` water surface, `=` deep water,
    /// `^` spike tile. Entities (placed on an air tile): `P` spawn,
    /// `W`/`J`/`S` walker/jumper/swimmer, `r`/`b` red/blue potion,
    /// `x`/`o` barrel/box, `!` spike, `<`/`>` cannon, `*` star,
    /// `t`/`T`/`Y` trees, `,`/`;` grass.
    pub fn from_ascii(map: &str) -> Result<Self, LevelError> {
        let mut data = LevelData {
            tiles: Vec::new(),
            spawn: None,
            enemies: Vec::new(),
            objects: Vec::new(),
        };

        for (y, line) in map.lines().filter(|l| !l.trim().is_empty()).enumerate() {
            let mut row = Vec::with_capacity(line.len());
            for (x, glyph) in line.trim_end().chars().enumerate() {
                let at = (x as u32, y as u32);
                let tile = match glyph {
                    '#' => GROUND_TILE,
                    '.' => AIR_TILE,
                    '~' => WATER_SURFACE_TILE,
                    '=' => WATER_DEEP_TILE,
                    '^' => SPIKE_TILE,
                    'P' => {
                        if data.spawn.is_some() {
                            return Err(LevelError::DuplicateSpawn);
                        }
                        data.spawn = Some(TilePos { x: at.0, y: at.1 });
                        AIR_TILE
                    }
                    _ => {
                        if let Some(kind) = enemy_glyph(glyph) {
                            data.enemies.push(EnemyPlacement { kind, x: at.0, y: at.1 });
                        } else if let Some(kind) = object_glyph(glyph) {
                            data.objects.push(ObjectPlacement { kind, x: at.0, y: at.1 });
                        } else {
                            return Err(LevelError::UnknownGlyph { x, y, glyph });
                        }
                        AIR_TILE
                    }
                };
                row.push(tile);
            }
            data.tiles.push(row);
        }

        Ok(data)
    }

    pub fn width(&self) -> usize {
        self.tiles.first().map(Vec::len).unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.tiles.len()
    }

    /// Validate and construct the runtime level
    pub fn build(&self, config: &SimConfig) -> Result<Level, LevelError> {
        config.validate()?;
        let ts = config.tile_size();
        let grid = TileGrid::from_rows(&self.tiles, ts)?;

        let spawn = self.spawn.ok_or(LevelError::MissingSpawn)?;
        self.check_bounds("spawn", spawn.x, spawn.y)?;
        let size = PLAYER_HITBOX_SIZE * config.scale;
        let player_spawn = standing_in_tile(spawn.x, spawn.y, size, ts);
        let spawn_box = Rect::new(player_spawn.x, player_spawn.y, size.x, size.y);
        if !grid.can_occupy(&spawn_box) {
            return Err(LevelError::SpawnInsideGeometry {
                x: spawn.x,
                y: spawn.y,
            });
        }

        let mut enemies = Vec::with_capacity(self.enemies.len());
        for p in &self.enemies {
            self.check_bounds("enemy", p.x, p.y)?;
            let size = p.kind.params().hitbox * config.scale;
            let mut enemy = Enemy::new(p.kind, standing_in_tile(p.x, p.y, size, ts), config);
            enemy.reset(&grid);
            enemies.push(enemy);
        }

        let mut objects = Vec::with_capacity(self.objects.len());
        for p in &self.objects {
            self.check_bounds("object", p.x, p.y)?;
            objects.push(InteractiveObject::at_tile(p.kind, p.x, p.y, ts, config.scale));
        }

        let max_camera_offset =
            (self.width() as f32 - TILES_IN_WIDTH as f32).max(0.0) * ts;

        Ok(Level {
            grid,
            player_spawn,
            enemies,
            objects,
            max_camera_offset,
        })
    }

    fn check_bounds(&self, what: &'static str, x: u32, y: u32) -> Result<(), LevelError> {
        if x as usize >= self.width() || y as usize >= self.height() {
            return Err(LevelError::PlacementOutOfBounds { what, x, y });
        }
        Ok(())
    }

    /// Build a playable level from a seed. The same seed and width always
    /// produce the same level.
    pub fn generate(seed: u64, width: usize) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let width = width.max(MIN_GENERATED_WIDTH);
        let height = TILES_IN_HEIGHT as usize;

        // Ground thickness per column as a bounded random walk
        let mut ground = Vec::with_capacity(width);
        let mut thickness: usize = 2;
        for x in 0..width {
            if x >= 5 && x + 3 < width && rng.random_bool(0.3) {
                thickness = if rng.random_bool(0.5) {
                    (thickness + 1).min(5)
                } else {
                    thickness.saturating_sub(1).max(1)
                };
            }
            ground.push(thickness);
        }

        let mut tiles = vec![vec![AIR_TILE; width]; height];
        for (x, &t) in ground.iter().enumerate() {
            for row in tiles.iter_mut().skip(height - t) {
                row[x] = GROUND_TILE;
            }
        }

        let surface = |x: usize| (height - ground[x] - 1) as u32;
        let mut data = LevelData {
            tiles,
            spawn: Some(TilePos { x: 1, y: surface(1) }),
            enemies: Vec::new(),
            objects: Vec::new(),
        };

        let mut x = 8;
        while x + 4 < width {
            let flat = ground[x - 1] == ground[x] && ground[x] == ground[x + 1];
            let pick: u32 = rng.random_range(0..10);
            let (tx, ty) = (x as u32, surface(x));
            match pick {
                0..=2 if flat => data.enemies.push(EnemyPlacement {
                    kind: EnemyKind::Walker,
                    x: tx,
                    y: ty,
                }),
                3 if flat => data.enemies.push(EnemyPlacement {
                    kind: EnemyKind::Jumper,
                    x: tx,
                    y: ty,
                }),
                4 => data.objects.push(ObjectPlacement {
                    kind: ObjectKind::Container(if rng.random_bool(0.5) {
                        ContainerKind::Barrel
                    } else {
                        ContainerKind::Box
                    }),
                    x: tx,
                    y: ty,
                }),
                5 => data.objects.push(ObjectPlacement {
                    kind: ObjectKind::Potion(PotionKind::Blue),
                    x: tx,
                    y: ty,
                }),
                6 => data.objects.push(ObjectPlacement {
                    kind: ObjectKind::Tree(TreeKind::One),
                    x: tx,
                    y: ty,
                }),
                _ => data.objects.push(ObjectPlacement {
                    kind: ObjectKind::Grass(rng.random_range(0..2)),
                    x: tx,
                    y: ty,
                }),
            }
            x += rng.random_range(3..7);
        }

        let end = width - 2;
        data.objects.push(ObjectPlacement {
            kind: ObjectKind::Star,
            x: end as u32,
            y: surface(end),
        });

        info!(
            "generated level: seed {seed}, {width} tiles, {} enemies, {} objects",
            data.enemies.len(),
            data.objects.len()
        );
        data
    }
}

fn enemy_glyph(glyph: char) -> Option<EnemyKind> {
    match glyph {
        'W' => Some(EnemyKind::Walker),
        'J' => Some(EnemyKind::Jumper),
        'S' => Some(EnemyKind::Swimmer),
        _ => None,
    }
}

fn object_glyph(glyph: char) -> Option<ObjectKind> {
    let kind = match glyph {
        'r' => ObjectKind::Potion(PotionKind::Red),
        'b' => ObjectKind::Potion(PotionKind::Blue),
        'x' => ObjectKind::Container(ContainerKind::Barrel),
        'o' => ObjectKind::Container(ContainerKind::Box),
        '!' => ObjectKind::Spike,
        '<' => ObjectKind::Cannon(Facing::Left),
        '>' => ObjectKind::Cannon(Facing::Right),
        '*' => ObjectKind::Star,
        't' => ObjectKind::Tree(TreeKind::One),
        'T' => ObjectKind::Tree(TreeKind::Two),
        'Y' => ObjectKind::Tree(TreeKind::Three),
        ',' => ObjectKind::Grass(0),
        ';' => ObjectKind::Grass(1),
        _ => return None,
    };
    Some(kind)
}

/// Top-left of a `size` box centered in tile (`tx`, `ty`) and standing on
/// its bottom edge
fn standing_in_tile(tx: u32, ty: u32, size: Vec2, tile_size: f32) -> Vec2 {
    Vec2::new(
        tx as f32 * tile_size + (tile_size - size.x) / 2.0,
        (ty + 1) as f32 * tile_size - size.y,
    )
}

/// Ordered levels of one play session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelSet {
    levels: Vec<LevelData>,
}

impl LevelSet {
    pub fn new(levels: Vec<LevelData>) -> Result<Self, LevelError> {
        if levels.is_empty() {
            return Err(LevelError::NoLevels);
        }
        Ok(Self { levels })
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn is_last(&self, index: usize) -> bool {
        index + 1 >= self.levels.len()
    }

    /// Build level `index`
    pub fn load_level(&self, index: usize, config: &SimConfig) -> Result<Level, LevelError> {
        let data = self.levels.get(index).ok_or(LevelError::NoSuchLevel {
            index,
            count: self.levels.len(),
        })?;
        let level = data.build(config)?;
        info!(
            "loaded level {index}: {}x{} tiles, {} enemies, {} objects",
            data.width(),
            data.height(),
            level.enemies.len(),
            level.objects.len()
        );
        Ok(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: &str = "
..........
.P...W..*.
##########
";

    #[test]
    fn test_ascii_map_placements() {
        let data = LevelData::from_ascii(MAP).unwrap();
        assert_eq!(data.width(), 10);
        assert_eq!(data.height(), 3);
        assert_eq!(data.spawn, Some(TilePos { x: 1, y: 1 }));
        assert_eq!(data.enemies.len(), 1);
        assert_eq!(data.objects[0].kind, ObjectKind::Star);
        assert_eq!(data.tiles[1][5], AIR_TILE);
    }

    #[test]
    fn test_build_places_player_on_floor() {
        let config = SimConfig::default();
        let level = LevelData::from_ascii(MAP).unwrap().build(&config).unwrap();
        let size = PLAYER_HITBOX_SIZE * config.scale;
        let hitbox = Rect::new(level.player_spawn.x, level.player_spawn.y, size.x, size.y);
        assert!(level.grid.can_occupy(&hitbox));
        assert!(level.grid.is_on_floor(&hitbox));
        assert!(!level.enemies[0].body.in_air);
        assert_eq!(level.max_camera_offset, 0.0);
    }

    #[test]
    fn test_missing_spawn() {
        let data = LevelData::from_ascii("...\n###").unwrap();
        assert!(matches!(
            data.build(&SimConfig::default()),
            Err(LevelError::MissingSpawn)
        ));
    }

    #[test]
    fn test_duplicate_spawn() {
        assert!(matches!(
            LevelData::from_ascii("P.P\n###"),
            Err(LevelError::DuplicateSpawn)
        ));
    }

    #[test]
    fn test_unknown_glyph() {
        assert!(matches!(
            LevelData::from_ascii("P.?\n###"),
            Err(LevelError::UnknownGlyph { x: 2, y: 0, glyph: '?' })
        ));
    }

    #[test]
    fn test_spawn_inside_geometry() {
        let mut data = LevelData::from_ascii("P..\n###").unwrap();
        data.spawn = Some(TilePos { x: 0, y: 1 });
        assert!(matches!(
            data.build(&SimConfig::default()),
            Err(LevelError::SpawnInsideGeometry { x: 0, y: 1 })
        ));
    }

    #[test]
    fn test_placement_out_of_bounds() {
        let mut data = LevelData::from_ascii("P..\n###").unwrap();
        data.enemies.push(EnemyPlacement {
            kind: EnemyKind::Walker,
            x: 9,
            y: 0,
        });
        assert!(matches!(
            data.build(&SimConfig::default()),
            Err(LevelError::PlacementOutOfBounds { what: "enemy", .. })
        ));
    }

    #[test]
    fn test_json_round_trip_keeps_level() {
        let data = LevelData::from_ascii(MAP).unwrap();
        let parsed = LevelData::from_json(&data.to_json().unwrap()).unwrap();
        assert_eq!(parsed, data);
    }

    #[test]
    fn test_level_set_bounds() {
        assert!(matches!(LevelSet::new(Vec::new()), Err(LevelError::NoLevels)));
        let set = LevelSet::new(vec![LevelData::from_ascii(MAP).unwrap()]).unwrap();
        assert!(set.is_last(0));
        assert!(matches!(
            set.load_level(3, &SimConfig::default()),
            Err(LevelError::NoSuchLevel { index: 3, count: 1 })
        ));
    }

    #[test]
    fn test_generate_is_deterministic_and_playable() {
        let a = LevelData::generate(42, 60);
        let b = LevelData::generate(42, 60);
        assert_eq!(a, b);
        assert_ne!(a, LevelData::generate(43, 60));

        let level = a.build(&SimConfig::default()).unwrap();
        assert!(level.max_camera_offset > 0.0);
        assert!(level.objects.iter().any(|o| o.kind == ObjectKind::Star));
    }
}
