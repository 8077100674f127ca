use anyhow::Result;
use log::{debug, info};

use super::ticker::Ticker;
use crate::game::{Command, GameConfig, GameEngine, GameState, Snapshot, TickOutcome};

/// Single owner of the game: engine, state and the tick timer.
///
/// Commands and ticks are the only writers and both go through `&mut self`,
/// so every mutation is serialized on whichever task owns the session.
pub struct GameSession {
    engine: GameEngine,
    state: GameState,
    ticker: Ticker,
}

impl GameSession {
    pub fn new(config: GameConfig) -> Result<Self> {
        Ok(Self::from_engine(GameEngine::new(config)?))
    }

    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self> {
        Ok(Self::from_engine(GameEngine::with_seed(config, seed)?))
    }

    fn from_engine(engine: GameEngine) -> Self {
        let state = engine.reset();
        let ticker = Ticker::new(engine.config().tick_interval());
        Self {
            engine,
            state,
            ticker,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    pub fn config(&self) -> &GameConfig {
        self.engine.config()
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_running()
    }

    /// Apply one input event. Returns whether it changed anything.
    pub fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::Move(direction) => {
                let accepted = self.state.request_direction(direction);
                if !accepted {
                    debug!("ignored reversal to {:?}", direction);
                }
                accepted
            }
            Command::Start => {
                if !self.state.phase.can_start() {
                    return false;
                }
                self.state = self.engine.start();
                self.ticker.start();
                info!("game started");
                true
            }
            Command::Reset => {
                self.ticker.stop();
                self.state = self.engine.reset();
                info!("game reset");
                true
            }
            Command::TogglePause => {
                let toggled = self.state.toggle_pause();
                if toggled {
                    info!("game {:?}", self.state.phase);
                }
                toggled
            }
        }
    }

    /// Run one tick of the simulation, stopping the timer if the game ended
    pub fn on_tick(&mut self) -> TickOutcome {
        let outcome = self.engine.advance(&mut self.state);
        if outcome.is_terminal() {
            self.ticker.stop();
            if let Ok(json) = serde_json::to_string(&self.state.snapshot()) {
                debug!("final snapshot: {}", json);
            }
        }
        outcome
    }

    /// Wait for the timer, then tick. Pends forever while the timer is stopped.
    pub async fn next_tick(&mut self) -> TickOutcome {
        self.ticker.tick().await;
        self.on_tick()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{CollisionType, Direction, GamePhase, Position};
    use std::time::Duration;
    use tokio::time::timeout;

    fn session() -> GameSession {
        GameSession::with_seed(GameConfig::default(), 3).unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        assert!(GameSession::new(GameConfig::new(1)).is_err());
    }

    #[test]
    fn test_starts_not_started_and_idle() {
        let session = session();
        assert_eq!(session.state().phase, GamePhase::NotStarted);
        assert!(!session.is_ticking());
    }

    #[test]
    fn test_start_only_from_startable_phases() {
        let mut session = session();

        assert!(session.handle_command(Command::Start));
        assert_eq!(session.state().phase, GamePhase::Running);
        assert!(session.is_ticking());

        // Already running: start is a no-op and keeps progress
        session.on_tick();
        assert!(!session.handle_command(Command::Start));
        assert_eq!(session.state().snake.head(), Position::new(6, 5));

        session.handle_command(Command::TogglePause);
        assert!(!session.handle_command(Command::Start));
        assert_eq!(session.state().phase, GamePhase::Paused);
    }

    #[test]
    fn test_pause_freezes_state() {
        let mut session = session();
        session.handle_command(Command::Start);
        session.on_tick();

        assert!(session.handle_command(Command::TogglePause));
        let before = session.snapshot();
        for _ in 0..10 {
            assert_eq!(session.on_tick(), TickOutcome::Skipped);
        }
        assert_eq!(session.snapshot(), before);
        assert!(session.is_ticking());

        assert!(session.handle_command(Command::TogglePause));
        assert_eq!(session.on_tick(), TickOutcome::Moved);
    }

    #[test]
    fn test_toggle_pause_ignored_outside_play() {
        let mut session = session();
        assert!(!session.handle_command(Command::TogglePause));
        assert_eq!(session.state().phase, GamePhase::NotStarted);
    }

    #[test]
    fn test_collision_stops_timer_once() {
        let mut session = session();
        session.handle_command(Command::Start);

        // (5,5) moving right hits the wall after the 10th tick
        for _ in 0..9 {
            assert_eq!(session.on_tick(), TickOutcome::Moved);
        }
        assert_eq!(
            session.on_tick(),
            TickOutcome::Collided(CollisionType::Wall)
        );
        assert_eq!(session.state().phase, GamePhase::Over);
        assert!(!session.is_ticking());

        // Late ticks are harmless
        assert_eq!(session.on_tick(), TickOutcome::Skipped);
        assert_eq!(session.state().snake.head(), Position::new(14, 5));
    }

    #[test]
    fn test_play_again_after_game_over() {
        let mut session = session();
        session.handle_command(Command::Start);
        session.handle_command(Command::Move(Direction::Up));
        for _ in 0..6 {
            session.on_tick();
        }
        assert_eq!(session.state().phase, GamePhase::Over);

        assert!(session.handle_command(Command::Start));
        assert_eq!(session.state().phase, GamePhase::Running);
        assert_eq!(session.state().snake.body, vec![Position::new(5, 5)]);
        assert_eq!(session.state().score, 0);
        assert!(session.is_ticking());
    }

    #[test]
    fn test_reset_from_any_phase() {
        let mut session = session();
        session.handle_command(Command::Start);
        session.on_tick();
        session.handle_command(Command::TogglePause);

        assert!(session.handle_command(Command::Reset));
        assert_eq!(session.state().phase, GamePhase::NotStarted);
        assert_eq!(session.state().snake.body, vec![Position::new(5, 5)]);
        assert!(!session.is_ticking());

        // Resetting again is fine
        assert!(session.handle_command(Command::Reset));
        assert!(!session.is_ticking());
    }

    #[test]
    fn test_reversal_ignored() {
        let mut session = session();
        session.handle_command(Command::Start);

        assert!(!session.handle_command(Command::Move(Direction::Left)));
        session.on_tick();
        assert_eq!(session.state().snake.direction, Direction::Right);
        assert_eq!(session.state().snake.head(), Position::new(6, 5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_drive_the_game() {
        let mut session = session();
        session.handle_command(Command::Start);

        for _ in 0..5 {
            assert_eq!(session.next_tick().await, TickOutcome::Moved);
        }
        let snapshot = session.snapshot();
        assert_eq!(snapshot.snake_cells, vec![Position::new(10, 5)]);
        assert_eq!(snapshot.score, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_ticks_after_game_over() {
        let mut session = session();
        session.handle_command(Command::Start);
        session.handle_command(Command::Move(Direction::Up));

        let mut outcome = TickOutcome::Moved;
        while !outcome.is_terminal() {
            outcome = session.next_tick().await;
        }
        assert!(!session.is_ticking());

        let waited = timeout(Duration::from_secs(10), session.next_tick()).await;
        assert!(waited.is_err());
    }
}
