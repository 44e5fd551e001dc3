//! Frame clock.
use std::{
    thread,
    time::{Duration, Instant},
};

/// Number of clock cycles in a second that delay timers count down.
const DELAY_FREQUENCY: u64 = 60;

/// Number of nanoseconds in a second
const NANOS_IN_SECOND: u64 = 1_000_000_000;

/// Time in nanoseconds a single timer cycle takes, precalculated.
const CLOCK_CYCLE_TIME: u64 = NANOS_IN_SECOND / DELAY_FREQUENCY;

/// Timer to pace the host loop at the 60 Hz timer frequency.
///
/// The machine itself has no notion of time. The host runs a batch of
/// instructions, ticks the timers, and then waits here for the rest of
/// the frame.
pub(crate) struct Clock(Instant);

impl Clock {
    /// Creates a new clock with the current time as internal state.
    pub(crate) fn new() -> Self {
        Self(Instant::now())
    }

    /// Set the clock state back to zero.
    pub(crate) fn reset(&mut self) {
        self.0 = Instant::now()
    }

    /// Block the current thread until the next frame.
    pub(crate) fn wait(&mut self) {
        let frame = Duration::from_nanos(CLOCK_CYCLE_TIME);

        loop {
            let elapsed = self.0.elapsed();
            if elapsed < frame {
                // Sleep does not have enough resolution near the end of
                // the frame, so only sleep while there's plenty left.
                let remaining = frame - elapsed;
                if remaining > Duration::from_millis(2) {
                    thread::sleep(remaining - Duration::from_millis(2));
                } else {
                    thread::yield_now();
                }
            } else {
                // Reset back to zero, rather than trying to catch up.
                //
                // If the host was paused, it should simply continue at the
                // next frame running at its usual speed.
                self.reset();
                return;
            }
        }
    }
}
