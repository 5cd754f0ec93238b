//! Pose sources
//!
//! - `ReplayPoseSource`: recorded flight, one JSON pose sample per line
//! - `ProfilePoseSource`: scripted altitude profile (constant / ramp / sine)

mod profile;
mod replay;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use contracts::{PoseSource, SourceConfig};

use crate::error::Result;

pub use profile::ProfilePoseSource;
pub use replay::ReplayPoseSource;

/// Build the configured pose source
pub fn source_from_config(config: &SourceConfig) -> Result<Box<dyn PoseSource>> {
    match config {
        SourceConfig::Replay(replay) => Ok(Box::new(ReplayPoseSource::load(replay)?)),
        SourceConfig::Profile(profile) => Ok(Box::new(ProfilePoseSource::new(profile.clone())?)),
    }
}

const PACE_SLICE: Duration = Duration::from_millis(10);

/// Sleep until `deadline`, waking early if `running` is cleared
///
/// Returns false when stopped.
pub(crate) fn sleep_until(deadline: Instant, running: &AtomicBool) -> bool {
    loop {
        if !running.load(Ordering::Relaxed) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        std::thread::sleep((deadline - now).min(PACE_SLICE));
    }
}
