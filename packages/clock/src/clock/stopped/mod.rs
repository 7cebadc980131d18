//! A fixed clock for tests.
//!
//! Temporal invariants (peer freshness, connection-id lifetimes) cannot be
//! tested against the system clock. The stopped clock always returns the same
//! time until a test moves it explicitly.
use std::sync::RwLock;
use std::time::Duration;

use storrent_primitives::DurationSinceUnixEpoch;

use super::{Stopped, Time};

#[derive(Debug)]
pub struct StoppedClock;

/// Extra controls only the stopped clock has: tests use them to travel in
/// time.
pub trait StoppedTime: Time {
    /// Sets the fixed time to a concrete timestamp.
    fn local_set(unix_time: &DurationSinceUnixEpoch);

    /// Sets the fixed time back to the Unix Epoch.
    fn local_set_to_unix_epoch() {
        Self::local_set(&Duration::ZERO);
    }

    /// Moves the fixed time forward.
    fn local_add(duration: &Duration);
}

lazy_static! {
    // The fixed time is process-wide; tests that move the clock should not
    // assume another test has not moved it before.
    static ref FIXED_TIME: RwLock<DurationSinceUnixEpoch> = RwLock::new(Duration::ZERO);
}

impl Time for Stopped {
    fn now() -> DurationSinceUnixEpoch {
        *FIXED_TIME.read().expect("it should get a read lock on the fixed time")
    }

    fn dbg_clock_type() -> String {
        "Stopped".to_owned()
    }
}

impl StoppedTime for Stopped {
    fn local_set(unix_time: &DurationSinceUnixEpoch) {
        let mut fixed_time = FIXED_TIME.write().expect("it should get a write lock on the fixed time");
        *fixed_time = *unix_time;
    }

    fn local_add(duration: &Duration) {
        let mut fixed_time = FIXED_TIME.write().expect("it should get a write lock on the fixed time");
        *fixed_time = fixed_time.saturating_add(*duration);
    }
}
