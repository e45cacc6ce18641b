use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

use crate::game::Schedule;

/// Timer that calls the game loop at the engine's current speed.
///
/// Holds at most one interval. Every [`Schedule`] replaces it, so a tick
/// armed under the old period can never fire after a reschedule.
pub struct Ticker {
    interval: Option<Interval>,
}

impl Ticker {
    pub fn stopped() -> Self {
        Self { interval: None }
    }

    pub fn apply(&mut self, schedule: Schedule) {
        // Cancel first, then arm the replacement
        self.interval = None;

        if let Schedule::Every(ms) = schedule {
            let period = Duration::from_millis(ms);
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            self.interval = Some(interval);
        }
    }

    pub fn is_active(&self) -> bool {
        self.interval.is_some()
    }

    pub fn period(&self) -> Option<Duration> {
        self.interval.as_ref().map(Interval::period)
    }

    /// Resolves on the next tick. Never resolves while stopped.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::stopped()
    }
}
