use std::time::SystemTime;

use storrent_primitives::DurationSinceUnixEpoch;

use super::{Time, Working};

#[derive(Debug)]
pub struct WorkingClock;

impl Time for Working {
    fn now() -> DurationSinceUnixEpoch {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .expect("the system time should be after the unix epoch")
    }

    fn dbg_clock_type() -> String {
        "Working".to_owned()
    }
}
