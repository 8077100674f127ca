use super::{
    config::GameConfig,
    state::{CollisionType, GamePhase, GameState, Position, Snake},
};
use log::{debug, info};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

/// Rejection-sampling draws per board cell before falling back to a scan
const DRAWS_PER_CELL: usize = 4;

/// What a single call to [`GameEngine::advance`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Phase was not `Running`; nothing changed
    Skipped,
    /// Snake translated by one cell
    Moved,
    /// Snake ate food and grew by one cell
    Grew,
    /// The move was fatal and was not applied; phase is now `Over`
    Collided(CollisionType),
    /// The snake grew into the last free cell; phase is now `Won`
    BoardFilled,
}

impl TickOutcome {
    /// Whether this tick moved the game out of `Running` for good
    pub fn is_terminal(&self) -> bool {
        matches!(self, TickOutcome::Collided(_) | TickOutcome::BoardFilled)
    }
}

/// The game engine that handles all game logic
pub struct GameEngine {
    config: GameConfig,
    rng: StdRng,
}

impl GameEngine {
    /// Create a new game engine with the given configuration
    ///
    /// The configuration is validated; a degenerate board is rejected here.
    pub fn new(config: GameConfig) -> anyhow::Result<Self> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Same as [`GameEngine::new`] but with deterministic food placement
    pub fn with_seed(config: GameConfig, seed: u64) -> anyhow::Result<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, rng: StdRng) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self { config, rng })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Fresh state waiting for a start command
    pub fn reset(&self) -> GameState {
        GameState::new(
            self.config.start_snake(),
            self.config.start_food,
            self.config.board_size,
        )
    }

    /// Fresh state that is already running
    pub fn start(&self) -> GameState {
        let mut state = self.reset();
        state.phase = GamePhase::Running;
        state
    }

    /// Execute one tick of the game
    pub fn advance(&mut self, state: &mut GameState) -> TickOutcome {
        if state.phase != GamePhase::Running {
            return TickOutcome::Skipped;
        }

        state.commit_direction();
        let new_head = state.snake.head().moved_in_direction(state.snake.direction);

        if let Some(collision_type) = self.check_collision(state, new_head) {
            state.phase = GamePhase::Over;
            info!(
                "game over: {:?} at ({}, {}), score {}",
                collision_type, new_head.x, new_head.y, state.score
            );
            return TickOutcome::Collided(collision_type);
        }

        let ate_food = new_head == state.food;
        state.snake.move_snake(ate_food);
        state.steps += 1;

        if !ate_food {
            return TickOutcome::Moved;
        }

        state.score += self.config.score_increment;
        match self.place_food(&state.snake) {
            Some(food) => {
                state.food = food;
                TickOutcome::Grew
            }
            None => {
                state.phase = GamePhase::Won;
                info!("board cleared with score {}", state.score);
                TickOutcome::BoardFilled
            }
        }
    }

    /// Check if the new head position causes a collision
    fn check_collision(&self, state: &GameState, pos: Position) -> Option<CollisionType> {
        if !state.is_in_bounds(pos) {
            return Some(CollisionType::Wall);
        }

        // The current tail is excluded even on a growing tick
        if state.snake.collides_ahead_of_tail(pos) {
            return Some(CollisionType::SelfCollision);
        }

        None
    }

    /// Pick a uniformly random cell not covered by the snake.
    ///
    /// Returns `None` when the snake covers the whole board.
    pub fn place_food(&mut self, snake: &Snake) -> Option<Position> {
        let size = self.config.board_size;
        let cells = size * size;
        if snake.len() >= cells {
            return None;
        }

        for _ in 0..cells * DRAWS_PER_CELL {
            let x = self.rng.gen_range(0..size) as i32;
            let y = self.rng.gen_range(0..size) as i32;
            let pos = Position::new(x, y);

            if !snake.contains(pos) {
                debug!("food placed at ({}, {})", pos.x, pos.y);
                return Some(pos);
            }
        }

        // Dense board: choose among the remaining free cells directly
        let free: Vec<Position> = (0..size as i32)
            .flat_map(|y| (0..size as i32).map(move |x| Position::new(x, y)))
            .filter(|pos| !snake.contains(*pos))
            .collect();
        let pos = free.choose(&mut self.rng).copied();
        if let Some(pos) = pos {
            debug!("food placed at ({}, {}) after scan", pos.x, pos.y);
        }
        pos
    }
}
