//! Fixed-step scheduler: converts wall-clock frames into a bounded number
//! of ticks.
//!
//! Each frame reports a timestamp in milliseconds. Elapsed time, scaled by
//! the game speed, feeds an accumulator; one tick is owed per
//! `tick_interval_ms` in the accumulator. At most `max_catch_up_steps`
//! ticks run per frame. Time owed beyond that cap is dropped, never
//! queued, which bounds the work after the host stalls.
//!
//! The scheduler holds no game state; it only answers "how many ticks
//! now?". The caller runs them.

use crate::config::WorldConfig;

/// Frame-to-tick converter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheduler {
    /// Simulated milliseconds per tick at speed 1.
    interval_ms: u64,
    /// Most ticks per frame.
    max_steps: u32,
    /// Timestamp of the previous frame, if any.
    last_frame_ms: Option<u64>,
    /// Scaled milliseconds not yet turned into ticks.
    accumulator_ms: u64,
}

impl Scheduler {
    /// A scheduler that has not seen a frame yet.
    pub fn new(config: &WorldConfig) -> Self {
        Self {
            interval_ms: config.tick_interval_ms.max(1),
            max_steps: config.max_catch_up_steps.max(1),
            last_frame_ms: None,
            accumulator_ms: 0,
        }
    }

    /// Milliseconds carried toward the next tick.
    pub const fn accumulator_ms(&self) -> u64 {
        self.accumulator_ms
    }

    /// Timestamp of the previous frame.
    pub const fn last_frame_ms(&self) -> Option<u64> {
        self.last_frame_ms
    }

    /// Forget the previous frame and any carried time.
    pub const fn reset(&mut self) {
        self.last_frame_ms = None;
        self.accumulator_ms = 0;
    }

    /// Account for a frame at `now_ms` and return how many ticks to run.
    ///
    /// While not `running`, the frame only records its timestamp and
    /// clears the accumulator. The first frame, and any frame whose
    /// timestamp moves backwards, counts as zero elapsed time.
    pub fn frame(&mut self, now_ms: u64, running: bool, speed: u32) -> u32 {
        let previous = self.last_frame_ms.replace(now_ms);
        if !running {
            self.accumulator_ms = 0;
            return 0;
        }

        let elapsed = previous.map_or(0, |last| now_ms.saturating_sub(last));
        self.accumulator_ms = self
            .accumulator_ms
            .saturating_add(elapsed.saturating_mul(u64::from(speed)));

        let mut steps: u32 = 0;
        while self.accumulator_ms >= self.interval_ms && steps < self.max_steps {
            self.accumulator_ms = self.accumulator_ms.saturating_sub(self.interval_ms);
            steps = steps.saturating_add(1);
        }
        if self.accumulator_ms >= self.interval_ms {
            let dropped = self.accumulator_ms;
            self.accumulator_ms = self.accumulator_ms.checked_rem(self.interval_ms).unwrap_or(0);
            tracing::debug!(dropped_ms = dropped.saturating_sub(self.accumulator_ms), "Catch-up cap reached");
        }
        steps
    }
}
