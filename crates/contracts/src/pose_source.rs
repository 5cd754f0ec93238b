//! PoseSource trait - Pose telemetry source abstraction
//!
//! Decouples where pose samples come from (recorded flight, scripted profile)
//! from the topic they are published on.

use std::sync::Arc;

use crate::{PoseSample, Publisher};

/// Pose telemetry source
///
/// Sources run on their own thread and push every sample into the given
/// publisher. They never see the range topic.
pub trait PoseSource: Send + Sync {
    /// Source name (used for logging)
    fn name(&self) -> &str;

    /// Start emitting samples into `publisher`
    ///
    /// Repeated calls while running are ignored.
    fn start(&self, publisher: Arc<dyn Publisher<PoseSample>>);

    /// Stop emitting samples
    fn stop(&self);

    /// Check if currently emitting
    fn is_running(&self) -> bool;

    /// Block until the source finishes, returning the number of samples emitted
    fn wait(&self) -> u64;
}
