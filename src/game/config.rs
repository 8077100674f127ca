use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::action::Direction;
use super::state::{Position, Snake};

/// Direction every fresh game starts moving in
pub const START_DIRECTION: Direction = Direction::Right;

/// Configuration for the game
///
/// Fixed at construction; the board never resizes while a game is running.
/// Missing fields fall back to [`GameConfig::default`] when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Side length of the square board, in cells
    pub board_size: usize,
    /// Milliseconds between ticks
    pub tick_interval_ms: u64,
    /// Points awarded for each food eaten
    pub score_increment: u32,
    /// Head cell of a fresh snake
    pub start_position: Position,
    /// Segments of a fresh snake, trailing to the left of the head
    pub start_length: usize,
    /// Food cell of a fresh game
    pub start_food: Position,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_size: 15,
            tick_interval_ms: 200,
            score_increment: 10,
            start_position: Position::new(5, 5),
            start_length: 1,
            start_food: Position::new(10, 10),
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom board size
    pub fn new(board_size: usize) -> Self {
        Self {
            board_size,
            ..Default::default()
        }
    }

    /// Create a small board for testing
    pub fn small() -> Self {
        Self {
            board_size: 8,
            start_position: Position::new(2, 2),
            start_food: Position::new(6, 6),
            ..Default::default()
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// The snake every fresh game starts with
    pub fn start_snake(&self) -> Snake {
        Snake::new(self.start_position, START_DIRECTION, self.start_length)
    }

    /// Reject degenerate boards and start layouts that break the game invariants
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.board_size >= 2,
            "board size must be at least 2, got {}",
            self.board_size
        );
        ensure!(
            self.board_size <= i32::MAX as usize,
            "board size {} is too large",
            self.board_size
        );
        ensure!(
            self.tick_interval_ms > 0,
            "tick interval must be positive"
        );
        ensure!(self.start_length >= 1, "start length must be at least 1");
        // A straight start snake cannot be longer than one row
        ensure!(
            self.start_length <= self.board_size,
            "start length {} does not fit a {}x{} board",
            self.start_length,
            self.board_size,
            self.board_size
        );

        let in_bounds = |pos: Position| {
            let size = self.board_size as i32;
            pos.x >= 0 && pos.x < size && pos.y >= 0 && pos.y < size
        };

        let snake = self.start_snake();
        for segment in &snake.body {
            ensure!(
                in_bounds(*segment),
                "start snake segment ({}, {}) is outside the {}x{} board",
                segment.x,
                segment.y,
                self.board_size,
                self.board_size
            );
        }
        ensure!(
            in_bounds(self.start_food),
            "start food ({}, {}) is outside the {}x{} board",
            self.start_food.x,
            self.start_food.y,
            self.board_size,
            self.board_size
        );
        ensure!(
            !snake.contains(self.start_food),
            "start food ({}, {}) overlaps the start snake",
            self.start_food.x,
            self.start_food.y
        );

        Ok(())
    }

    /// Load a JSON config file without validating it.
    ///
    /// Use this when further overrides are applied before [`GameConfig::validate`].
    pub fn load_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {:?}", path))
    }

    /// Load a JSON config file and validate it
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let config = Self::load_json_file(path)?;
        config
            .validate()
            .with_context(|| format!("Invalid config in {:?}", path))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.board_size, 15);
        assert_eq!(config.tick_interval(), Duration::from_millis(200));
        assert_eq!(config.score_increment, 10);
        assert_eq!(config.start_position, Position::new(5, 5));
        assert_eq!(config.start_length, 1);
        assert_eq!(config.start_food, Position::new(10, 10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_config() {
        let config = GameConfig::new(20);
        assert_eq!(config.board_size, 20);
        assert!(config.validate().is_ok());
        assert!(GameConfig::small().validate().is_ok());
    }

    #[test]
    fn test_rejects_tiny_board() {
        let err = GameConfig {
            board_size: 1,
            start_position: Position::new(0, 0),
            start_food: Position::new(0, 0),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert!(err.to_string().contains("board size"));
    }

    #[test]
    fn test_rejects_zero_tick_interval() {
        let config = GameConfig {
            tick_interval_ms: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("tick interval"));
    }

    #[test]
    fn test_rejects_start_layout_off_board() {
        // Default start cells do not fit a 5x5 board
        assert!(GameConfig::new(5).validate().is_err());

        // Trailing segments run off the left edge
        let config = GameConfig {
            start_position: Position::new(1, 5),
            start_length: 3,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_oversized_start_length() {
        let config = GameConfig {
            start_length: usize::MAX / 64,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("start length"));

        let config = GameConfig {
            start_length: 16,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_food_on_snake() {
        let config = GameConfig {
            start_length: 3,
            start_food: Position::new(4, 5),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("overlaps"));
    }

    #[test]
    fn test_start_snake_trails_left() {
        let config = GameConfig {
            start_length: 3,
            ..Default::default()
        };
        let snake = config.start_snake();
        assert_eq!(snake.direction, Direction::Right);
        assert_eq!(
            snake.body,
            vec![Position::new(5, 5), Position::new(4, 5), Position::new(3, 5)]
        );
    }

    #[test]
    fn test_load_partial_json_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("snake.json");
        std::fs::write(&path, r#"{ "board_size": 20, "tick_interval_ms": 150 }"#).unwrap();

        let config = GameConfig::from_json_file(&path).unwrap();
        assert_eq!(config.board_size, 20);
        assert_eq!(config.tick_interval_ms, 150);
        assert_eq!(config.score_increment, 10);
        assert_eq!(config.start_food, Position::new(10, 10));
    }

    #[test]
    fn test_load_without_validation_allows_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("snake.json");
        std::fs::write(&path, r#"{ "board_size": 5 }"#).unwrap();

        // Default start cells do not fit a 5x5 board on their own
        assert!(GameConfig::from_json_file(&path).is_err());

        let mut config = GameConfig::load_json_file(&path).unwrap();
        assert_eq!(config.board_size, 5);
        assert!(config.validate().is_err());

        config.board_size = 15;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_invalid_json_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("snake.json");
        std::fs::write(&path, r#"{ "tick_interval_ms": 0 }"#).unwrap();
        assert!(GameConfig::from_json_file(&path).is_err());

        std::fs::write(&path, "not json").unwrap();
        assert!(GameConfig::from_json_file(&path).is_err());

        assert!(GameConfig::from_json_file(&temp_dir.path().join("missing.json")).is_err());
    }
}
