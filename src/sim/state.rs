//! Game state and level lifecycle
//!
//! Everything the tick mutates lives here, owned by one `GameState`. The
//! state is serializable so a host can snapshot it between ticks.

use std::time::Duration;

use log::info;
use serde::{Deserialize, Serialize};

use super::enemy::Enemy;
use super::events::{Emote, GameEvent};
use super::objects::ObjectSet;
use super::player::Player;
use super::pool::Pool;
use super::projectile::Projectile;
use super::tiles::TileGrid;
use crate::error::LevelError;
use crate::level::LevelSet;
use crate::settings::SimConfig;

/// Camera dead-zone borders as fractions of the view width
const CAMERA_LEFT_BORDER: f32 = 0.25;
const CAMERA_RIGHT_BORDER: f32 = 0.75;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Frozen until unpaused
    Paused,
    /// Death animation playing; only the player updates
    PlayerDying,
    /// Waiting for the host to advance to the next level
    LevelCompleted,
    /// Last level completed
    GameCompleted,
    /// Death animation finished; waiting for retry
    GameOver,
}

/// Complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub config: SimConfig,
    levels: LevelSet,
    level_index: usize,
    pub phase: GamePhase,
    pub grid: TileGrid,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub objects: ObjectSet,
    pub projectiles: Pool<Projectile>,
    pub emotes: Pool<Emote>,
    /// Horizontal camera offset in pixels
    pub camera_x: f32,
    pub max_camera_offset: f32,
    /// Ticks simulated in any phase
    pub time_ticks: u64,
    /// Ticks spent in `Playing` this session
    pub session_ticks: u64,
    /// Queued events for the host
    #[serde(skip)]
    pub(crate) events: Vec<GameEvent>,
}

impl GameState {
    /// Start a session on the first level
    pub fn new(config: SimConfig, levels: LevelSet) -> Result<Self, LevelError> {
        let level = levels.load_level(0, &config)?;
        let player = Player::new(&config, level.player_spawn);
        let mut state = Self {
            projectiles: Pool::with_capacity(config.projectile_capacity),
            emotes: Pool::with_capacity(config.emote_capacity),
            config,
            levels,
            level_index: 0,
            phase: GamePhase::Playing,
            grid: level.grid,
            player,
            enemies: level.enemies,
            objects: ObjectSet::new(level.objects),
            camera_x: 0.0,
            max_camera_offset: level.max_camera_offset,
            time_ticks: 0,
            session_ticks: 0,
            events: Vec::new(),
        };
        state.player.reset_all(&state.grid);
        state.update_camera();
        Ok(state)
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Replace the world with level `index`
    pub fn load_level(&mut self, index: usize) -> Result<(), LevelError> {
        let level = self.levels.load_level(index, &self.config)?;
        self.level_index = index;
        self.grid = level.grid;
        self.enemies = level.enemies;
        self.objects = ObjectSet::new(level.objects);
        self.max_camera_offset = level.max_camera_offset;
        self.projectiles.clear();
        self.emotes.clear();
        self.player.set_spawn(&self.grid, level.player_spawn);
        self.player.reset_all(&self.grid);
        self.camera_x = 0.0;
        self.update_camera();
        self.phase = GamePhase::Playing;
        Ok(())
    }

    /// Advance past a completed level. From `GameCompleted` this starts a
    /// new session on the first level.
    pub fn next_level(&mut self) -> Result<(), LevelError> {
        match self.phase {
            GamePhase::LevelCompleted => self.load_level(self.level_index + 1),
            GamePhase::GameCompleted => self.restart_session(),
            _ => Ok(()),
        }
    }

    /// Restart the current level with every entity reset
    pub fn retry(&mut self) {
        for enemy in &mut self.enemies {
            enemy.reset(&self.grid);
        }
        self.objects.reset();
        self.projectiles.clear();
        self.emotes.clear();
        self.player.reset_all(&self.grid);
        self.camera_x = 0.0;
        self.update_camera();
        self.phase = GamePhase::Playing;
        info!("retrying level {}", self.level_index);
    }

    /// Back to the first level with a fresh session timer
    pub fn restart_session(&mut self) -> Result<(), LevelError> {
        self.session_ticks = 0;
        self.load_level(0)
    }

    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            GamePhase::Playing => GamePhase::Paused,
            GamePhase::Paused => GamePhase::Playing,
            other => other,
        };
    }

    /// Time spent playing this session
    pub fn session_time(&self) -> Duration {
        Duration::from_secs_f64(self.session_ticks as f64 / f64::from(self.config.updates_per_second))
    }

    /// Take every event queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Enter the completion phase for the current level
    pub(crate) fn complete_level(&mut self) {
        if self.levels.is_last(self.level_index) {
            self.phase = GamePhase::GameCompleted;
            self.push_event(GameEvent::GameCompleted);
            info!("game completed in {:.1}s", self.session_time().as_secs_f32());
        } else {
            self.phase = GamePhase::LevelCompleted;
            self.push_event(GameEvent::LevelCompleted);
            info!("level {} completed", self.level_index);
        }
    }

    /// Keep the player inside the camera dead zone
    pub fn update_camera(&mut self) {
        let view = self.config.view_width();
        let left = view * CAMERA_LEFT_BORDER;
        let right = view * CAMERA_RIGHT_BORDER;
        let diff = self.player.hitbox().x - self.camera_x;
        if diff > right {
            self.camera_x += diff - right;
        } else if diff < left {
            self.camera_x += diff - left;
        }
        self.camera_x = self.camera_x.clamp(0.0, self.max_camera_offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LevelData;

    fn two_levels() -> LevelSet {
        let a = LevelData::from_ascii("..........\n.P......*.\n##########").unwrap();
        let b = LevelData::from_ascii("..........\n.P...W....\n##########").unwrap();
        LevelSet::new(vec![a, b]).unwrap()
    }

    #[test]
    fn test_new_state_starts_playing() {
        let state = GameState::new(SimConfig::default(), two_levels()).unwrap();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.level_index(), 0);
        assert!(!state.player.body.in_air);
        assert_eq!(state.camera_x, 0.0);
    }

    #[test]
    fn test_completion_advances_levels() {
        let mut state = GameState::new(SimConfig::default(), two_levels()).unwrap();
        state.complete_level();
        assert_eq!(state.phase, GamePhase::LevelCompleted);
        state.next_level().unwrap();
        assert_eq!(state.level_index(), 1);
        assert_eq!(state.enemies.len(), 1);
        state.complete_level();
        assert_eq!(state.phase, GamePhase::GameCompleted);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::LevelCompleted, GameEvent::GameCompleted]
        );
        state.next_level().unwrap();
        assert_eq!(state.level_index(), 0);
    }

    #[test]
    fn test_pause_toggles_only_while_playing() {
        let mut state = GameState::new(SimConfig::default(), two_levels()).unwrap();
        state.toggle_pause();
        assert_eq!(state.phase, GamePhase::Paused);
        state.toggle_pause();
        assert_eq!(state.phase, GamePhase::Playing);
        state.phase = GamePhase::GameOver;
        state.toggle_pause();
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_session_time_counts_ticks() {
        let mut state = GameState::new(SimConfig::default(), two_levels()).unwrap();
        state.session_ticks = 400;
        assert_eq!(state.session_time(), Duration::from_secs(2));
    }

    #[test]
    fn test_retry_restores_player() {
        let mut state = GameState::new(SimConfig::default(), two_levels()).unwrap();
        state.player.kill();
        state.phase = GamePhase::GameOver;
        state.retry();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player.lives(), state.config.max_lives);
    }

    #[test]
    fn test_camera_clamps_to_level() {
        let wide = LevelData::generate(7, 60);
        let mut state =
            GameState::new(SimConfig::default(), LevelSet::new(vec![wide]).unwrap()).unwrap();
        state.player.body.hitbox.x = 10_000.0;
        state.update_camera();
        assert_eq!(state.camera_x, state.max_camera_offset);
        state.player.body.hitbox.x = 0.0;
        state.update_camera();
        assert_eq!(state.camera_x, 0.0);
    }
}
