use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

#[derive(Debug)]
enum TickerState {
    Stopped,
    /// Started, first tick due at the given instant; no interval built yet
    Armed(Instant),
    Ticking(Interval),
}

/// Owned handle to the periodic game tick.
///
/// While stopped, [`Ticker::tick`] never resolves, so it can sit in a
/// `tokio::select!` next to input and render timers without firing.
/// Starting and stopping do not need a runtime; the interval is built on
/// the first await.
#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    state: TickerState,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            state: TickerState::Stopped,
        }
    }

    /// Arm the timer. The first tick fires one full period from now.
    ///
    /// Starting an armed ticker re-arms it from the current instant.
    pub fn start(&mut self) {
        self.state = TickerState::Armed(Instant::now() + self.period);
    }

    /// Cancel the timer. Returns whether a running timer was actually cancelled.
    pub fn stop(&mut self) -> bool {
        let previous = std::mem::replace(&mut self.state, TickerState::Stopped);
        !matches!(previous, TickerState::Stopped)
    }

    pub fn is_running(&self) -> bool {
        !matches!(self.state, TickerState::Stopped)
    }

    /// Wait for the next tick, or forever if stopped
    pub async fn tick(&mut self) {
        if let TickerState::Armed(first) = self.state {
            let mut interval = interval_at(first, self.period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            self.state = TickerState::Ticking(interval);
        }

        match &mut self.state {
            TickerState::Ticking(interval) => {
                interval.tick().await;
            }
            _ => std::future::pending::<()>().await,
        }
    }
}
