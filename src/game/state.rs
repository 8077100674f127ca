use serde::{Deserialize, Serialize};

use super::action::Direction;

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub body: Vec<Position>,
    /// Committed direction: the one applied by the most recent tick
    pub direction: Direction,
}

impl Snake {
    /// Create a new snake with given starting position and direction
    pub fn new(head: Position, direction: Direction, length: usize) -> Self {
        let mut body = vec![head];

        // Add initial body segments behind the head
        let (dx, dy) = direction.delta();
        let (back_dx, back_dy) = (-dx, -dy);

        for i in 1..length {
            let prev = body[i - 1];
            body.push(prev.moved_by(back_dx, back_dy));
        }

        Self { body, direction }
    }

    /// Build a snake from explicit segments, head first.
    pub fn from_segments(body: Vec<Position>, direction: Direction) -> Self {
        Self { body, direction }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Get the tail position (last segment)
    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    /// Segments that are still occupied after a non-growing move: everything but the tail.
    pub fn segments_ahead_of_tail(&self) -> &[Position] {
        &self.body[..self.body.len().saturating_sub(1)]
    }

    /// Check if a new head at `pos` would run into the snake.
    ///
    /// The current tail is always excluded, whether or not this tick grows.
    pub fn collides_ahead_of_tail(&self, pos: Position) -> bool {
        self.segments_ahead_of_tail().contains(&pos)
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Move snake in current direction, growing if should_grow is true
    pub fn move_snake(&mut self, should_grow: bool) {
        let new_head = self.head().moved_in_direction(self.direction);
        self.body.insert(0, new_head);

        if !should_grow {
            self.body.pop();
        }
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Type of collision that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CollisionType {
    /// Snake hit a wall
    Wall,
    /// Snake hit itself
    SelfCollision,
}

/// Lifecycle phase of a game. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    NotStarted,
    Running,
    Paused,
    Over,
    /// The snake filled the board; no cell is left for food.
    Won,
}

impl GamePhase {
    /// Phases from which a start command begins a fresh game
    pub fn can_start(&self) -> bool {
        matches!(self, GamePhase::NotStarted | GamePhase::Over | GamePhase::Won)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, GamePhase::Over | GamePhase::Won)
    }
}

/// Read-only view of the game handed to the renderer once per frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub snake_cells: Vec<Position>,
    /// Last placed food. After `Won` it sits under the head.
    pub food: Position,
    pub score: u32,
    pub phase: GamePhase,
    pub board_size: usize,
}

/// Complete game state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    pub food: Position,
    /// Latched by input; committed to the snake at the start of the next tick
    pub requested_direction: Direction,
    pub board_size: usize,
    pub score: u32,
    pub steps: u32,
    pub phase: GamePhase,
}

impl GameState {
    /// Create a new game state in the `NotStarted` phase
    pub fn new(snake: Snake, food: Position, board_size: usize) -> Self {
        let requested_direction = snake.direction;
        Self {
            snake,
            food,
            requested_direction,
            board_size,
            score: 0,
            steps: 0,
            phase: GamePhase::NotStarted,
        }
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        let size = self.board_size as i32;
        pos.x >= 0 && pos.x < size && pos.y >= 0 && pos.y < size
    }

    /// Latch a direction for the next tick.
    ///
    /// Only the requested field is written. A reversal of the committed
    /// direction is ignored and `false` is returned.
    pub fn request_direction(&mut self, direction: Direction) -> bool {
        if self.snake.direction.is_opposite(direction) {
            return false;
        }
        self.requested_direction = direction;
        true
    }

    /// Promote the requested direction to the committed one
    pub fn commit_direction(&mut self) {
        self.snake.direction = self.requested_direction;
    }

    /// Toggle Running <-> Paused. Returns false in any other phase.
    pub fn toggle_pause(&mut self) -> bool {
        self.phase = match self.phase {
            GamePhase::Running => GamePhase::Paused,
            GamePhase::Paused => GamePhase::Running,
            _ => return false,
        };
        true
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            snake_cells: self.snake.body.clone(),
            food: self.food,
            score: self.score,
            phase: self.phase,
            board_size: self.board_size,
        }
    }
}
