use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use log::info;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::Duration;
use tokio::time::interval;

use crate::game::{Command, GamePhase, TickOutcome};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::Renderer;
use crate::session::GameSession;

/// Render at 30 FPS (33ms per frame), independent of the tick period
const RENDER_INTERVAL: Duration = Duration::from_millis(33);

pub struct PlayMode {
    session: GameSession,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
}

impl PlayMode {
    pub fn new(session: GameSession) -> Self {
        Self {
            session,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        info!(
            "leaving after {} games, best score {}",
            self.metrics.games_played, self.metrics.best_score
        );
        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();
        let mut render_timer = interval(RENDER_INTERVAL);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(err)) => return Err(err).context("Failed to read terminal event"),
                        None => self.should_quit = true,
                    }
                }

                // Game logic tick; pends while the session timer is stopped
                outcome = self.session.next_tick() => {
                    self.on_tick(outcome);
                }

                // Render frame
                _ = render_timer.tick() => {
                    self.metrics.update();
                    let snapshot = self.session.snapshot();
                    terminal.draw(|frame| {
                        self.renderer.render(frame, &snapshot, &self.metrics);
                    }).context("Failed to draw frame")?;
                }

                // Handle Ctrl+C; the loop exits right after, so it is never polled again
                _ = &mut ctrl_c => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return;
            }

            match self.input_handler.handle_key_event(key) {
                KeyAction::Game(command) => self.apply_command(command),
                KeyAction::Quit => self.should_quit = true,
                KeyAction::None => {}
            }
        }
    }

    fn apply_command(&mut self, command: Command) {
        if !self.session.handle_command(command) {
            return;
        }

        match command {
            Command::Start => self.metrics.on_game_start(),
            Command::Reset => self.metrics.on_reset(),
            Command::TogglePause => match self.session.state().phase {
                GamePhase::Paused => self.metrics.on_pause(),
                _ => self.metrics.on_resume(),
            },
            Command::Move(_) => {}
        }
    }

    fn on_tick(&mut self, outcome: TickOutcome) {
        if outcome.is_terminal() {
            self.metrics.on_game_over(self.session.state().score);
        }
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, GameConfig};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn mode() -> PlayMode {
        PlayMode::new(GameSession::with_seed(GameConfig::default(), 1).unwrap())
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_game_initialization() {
        let mode = mode();
        assert_eq!(mode.session.state().phase, GamePhase::NotStarted);
        assert_eq!(mode.session.state().score, 0);
        assert!(!mode.should_quit);
    }

    #[test]
    fn test_keys_drive_lifecycle() {
        let mut mode = mode();

        mode.handle_event(key(KeyCode::Enter));
        assert_eq!(mode.session.state().phase, GamePhase::Running);

        mode.handle_event(key(KeyCode::Char(' ')));
        assert_eq!(mode.session.state().phase, GamePhase::Paused);

        mode.handle_event(key(KeyCode::Char(' ')));
        assert_eq!(mode.session.state().phase, GamePhase::Running);

        mode.handle_event(key(KeyCode::Down));
        assert_eq!(mode.session.state().requested_direction, Direction::Down);

        mode.handle_event(key(KeyCode::Char('r')));
        assert_eq!(mode.session.state().phase, GamePhase::NotStarted);
        assert!(!mode.session.is_ticking());

        mode.handle_event(key(KeyCode::Char('q')));
        assert!(mode.should_quit);
    }

    #[test]
    fn test_game_over_counts_game() {
        let mut mode = mode();
        mode.handle_event(key(KeyCode::Enter));
        mode.handle_event(key(KeyCode::Up));

        loop {
            let outcome = mode.session.on_tick();
            mode.on_tick(outcome);
            if outcome.is_terminal() {
                break;
            }
        }

        assert_eq!(mode.session.state().phase, GamePhase::Over);
        assert_eq!(mode.metrics.games_played, 1);
    }

    #[test]
    fn test_release_events_ignored() {
        let mut mode = mode();
        let mut release = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;

        mode.handle_event(Event::Key(release));
        assert_eq!(mode.session.state().phase, GamePhase::NotStarted);
    }
}
