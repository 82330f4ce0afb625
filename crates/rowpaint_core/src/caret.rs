//! Caret blink phase tracking.

use std::time::{Duration, Instant};

/// Blink state driven by the owner's clock.
///
/// The caret is visible for the first half of every period. Any cursor
/// movement should call [`CaretBlink::restart`] so the caret shows at once.
#[derive(Clone, Copy, Debug)]
pub struct CaretBlink {
    period: Duration,
    phase_start: Option<Instant>,
}

impl CaretBlink {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(2)),
            phase_start: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start blinking, visible, from `now`.
    pub fn restart(&mut self, now: Instant) {
        self.phase_start = Some(now);
    }

    /// Stop blinking; the caret stays hidden until restarted.
    pub fn stop(&mut self) {
        self.phase_start = None;
    }

    pub fn is_running(&self) -> bool {
        self.phase_start.is_some()
    }

    fn half_period_ms(&self) -> u128 {
        (self.period.as_millis() / 2).max(1)
    }

    pub fn visible_at(&self, now: Instant) -> bool {
        let Some(start) = self.phase_start else {
            return false;
        };
        let ticks = now.saturating_duration_since(start).as_millis() / self.half_period_ms();
        ticks % 2 == 0
    }

    /// Time until the next visibility flip, for repaint scheduling.
    pub fn next_toggle_in(&self, now: Instant) -> Option<Duration> {
        let start = self.phase_start?;
        let half = self.half_period_ms();
        let elapsed = now.saturating_duration_since(start).as_millis();
        let remaining = half - elapsed % half;
        Some(Duration::from_millis(remaining as u64).max(Duration::from_millis(1)))
    }
}
