//! ProfilePoseSource - scripted altitude profile
//!
//! Emits `duration_sec * rate_hz` samples on a fixed period. Only the
//! vertical coordinate varies; samples are stamped with profile time
//! starting at zero.

use std::f64::consts::TAU;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use contracts::{PoseSample, PoseSource, ProfileConfig, ProfileShape, Publisher, Time};
use tracing::{debug, info, warn};

use super::sleep_until;
use crate::error::{Result, TransportError};

const FRAME_ID: &str = "odom";
const CHILD_FRAME_ID: &str = "base_link";

/// Scripted altitude profile source
pub struct ProfilePoseSource {
    name: String,
    config: ProfileConfig,
    count: u64,
    running: Arc<AtomicBool>,
    thread_handle: Mutex<Option<JoinHandle<u64>>>,
}

impl ProfilePoseSource {
    /// Validate the profile and prepare the source
    pub fn new(config: ProfileConfig) -> Result<Self> {
        if !(config.rate_hz.is_finite() && config.rate_hz >= ProfileConfig::MIN_RATE_HZ) {
            return Err(TransportError::InvalidProfile {
                message: format!(
                    "rate_hz must be >= {}, got {}",
                    ProfileConfig::MIN_RATE_HZ,
                    config.rate_hz
                ),
            });
        }
        if !(config.duration_sec > 0.0 && config.duration_sec <= ProfileConfig::MAX_DURATION_SEC) {
            return Err(TransportError::InvalidProfile {
                message: format!(
                    "duration_sec must be in (0, {}], got {}",
                    ProfileConfig::MAX_DURATION_SEC,
                    config.duration_sec
                ),
            });
        }
        if !(config.start_z.is_finite() && config.end_z.is_finite()) {
            return Err(TransportError::InvalidProfile {
                message: "start_z and end_z must be finite".to_string(),
            });
        }

        let count = ((config.duration_sec * config.rate_hz).round() as u64).max(1);
        Ok(Self {
            name: format!("profile_{}", shape_name(config.shape)),
            config,
            count,
            running: Arc::new(AtomicBool::new(false)),
            thread_handle: Mutex::new(None),
        })
    }

    /// Number of samples one run emits
    pub fn len(&self) -> u64 {
        self.count
    }

    /// Always false; a valid profile emits at least one sample
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The `index`-th sample of the profile
    pub fn sample_at(&self, index: u64) -> PoseSample {
        sample_at(&self.config, self.count, index)
    }
}

fn shape_name(shape: ProfileShape) -> &'static str {
    match shape {
        ProfileShape::Constant => "constant",
        ProfileShape::Ramp => "ramp",
        ProfileShape::Sine => "sine",
    }
}

fn sample_at(config: &ProfileConfig, count: u64, index: u64) -> PoseSample {
    let fraction = if count > 1 {
        index as f64 / (count - 1) as f64
    } else {
        0.0
    };
    let z = match config.shape {
        ProfileShape::Constant => config.start_z,
        ProfileShape::Ramp => config.start_z + (config.end_z - config.start_z) * fraction,
        ProfileShape::Sine => {
            let mid = (config.start_z + config.end_z) / 2.0;
            let amplitude = (config.end_z - config.start_z) / 2.0;
            mid - amplitude * (TAU * fraction).cos()
        }
    };

    let mut sample = PoseSample::at_position_z(z);
    sample.header.frame_id = FRAME_ID.to_string();
    sample.header.stamp = Time::from_secs_f64(index as f64 / config.rate_hz);
    sample.child_frame_id = CHILD_FRAME_ID.to_string();
    sample
}

impl PoseSource for ProfilePoseSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&self, publisher: Arc<dyn Publisher<PoseSample>>) {
        if self.running.swap(true, Ordering::SeqCst) {
            debug!(source = %self.name, "profile already running");
            return;
        }

        let config = self.config.clone();
        let count = self.count;
        let running = Arc::clone(&self.running);

        let spawned = std::thread::Builder::new()
            .name("pose-profile".to_string())
            .spawn(move || {
                let period = Duration::from_secs_f64(1.0 / config.rate_hz);
                let started = Instant::now();
                let mut emitted = 0;

                for index in 0..count {
                    if !sleep_until(started + period.mul_f64(index as f64), &running) {
                        break;
                    }
                    publisher.send(sample_at(&config, count, index));
                    emitted += 1;
                }

                running.store(false, Ordering::SeqCst);
                info!(samples = emitted, "profile finished");
                emitted
            });

        match spawned {
            Ok(handle) => {
                debug!(
                    source = %self.name,
                    samples = self.count,
                    rate_hz = self.config.rate_hz,
                    "profile started"
                );
                *self
                    .thread_handle
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = Some(handle);
            }
            Err(e) => {
                warn!(source = %self.name, error = %e, "failed to spawn profile thread");
                self.running.store(false, Ordering::SeqCst);
            }
        }
    }

    fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn wait(&self) -> u64 {
        let handle = self
            .thread_handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match handle.map(JoinHandle::join) {
            Some(Ok(emitted)) => emitted,
            Some(Err(_)) => {
                warn!(source = %self.name, "profile thread panicked");
                0
            }
            None => 0,
        }
    }
}

impl Drop for ProfilePoseSource {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(shape: ProfileShape) -> ProfileConfig {
        ProfileConfig {
            shape,
            rate_hz: 1000.0,
            duration_sec: 0.011,
            start_z: 0.0,
            end_z: -2.0,
        }
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<PoseSample>>,
    }

    impl Publisher<PoseSample> for Recorder {
        fn send(&self, message: PoseSample) {
            self.seen.lock().unwrap().push(message);
        }
    }

    #[test]
    fn test_ramp_endpoints() {
        let source = ProfilePoseSource::new(profile(ProfileShape::Ramp)).unwrap();
        assert_eq!(source.len(), 11);
        assert_eq!(source.sample_at(0).position_z(), 0.0);
        assert!((source.sample_at(5).position_z() + 1.0).abs() < 1e-12);
        assert_eq!(source.sample_at(10).position_z(), -2.0);
    }

    #[test]
    fn test_sine_returns_to_start() {
        let source = ProfilePoseSource::new(profile(ProfileShape::Sine)).unwrap();
        assert!(source.sample_at(0).position_z().abs() < 1e-12);
        assert!((source.sample_at(5).position_z() + 2.0).abs() < 1e-12);
        assert!(source.sample_at(10).position_z().abs() < 1e-12);
    }

    #[test]
    fn test_constant_and_stamps() {
        let source = ProfilePoseSource::new(profile(ProfileShape::Constant)).unwrap();
        let sample = source.sample_at(3);
        assert_eq!(sample.position_z(), 0.0);
        assert_eq!(sample.header.stamp, Time::new(0, 3_000_000));
        assert_eq!(sample.header.frame_id, "odom");
    }

    #[test]
    fn test_invalid_profiles() {
        let mut config = profile(ProfileShape::Ramp);
        config.rate_hz = 0.0;
        assert!(matches!(
            ProfilePoseSource::new(config),
            Err(TransportError::InvalidProfile { .. })
        ));

        let mut config = profile(ProfileShape::Ramp);
        config.duration_sec = -1.0;
        assert!(ProfilePoseSource::new(config).is_err());

        // Periods that would not fit in a Duration
        for rate_hz in [1e-300, f64::MIN_POSITIVE, 0.0009] {
            let mut config = profile(ProfileShape::Ramp);
            config.rate_hz = rate_hz;
            assert!(ProfilePoseSource::new(config).is_err(), "rate {rate_hz}");
        }

        let mut config = profile(ProfileShape::Ramp);
        config.duration_sec = 1e300;
        assert!(ProfilePoseSource::new(config).is_err());

        let mut config = profile(ProfileShape::Constant);
        config.rate_hz = ProfileConfig::MIN_RATE_HZ;
        config.duration_sec = 1.0;
        assert_eq!(ProfilePoseSource::new(config).unwrap().len(), 1);

        let mut config = profile(ProfileShape::Ramp);
        config.end_z = f64::INFINITY;
        assert!(ProfilePoseSource::new(config).is_err());
    }

    #[test]
    fn test_runs_to_completion() {
        let source = ProfilePoseSource::new(profile(ProfileShape::Ramp)).unwrap();
        let recorder = Arc::new(Recorder::default());

        source.start(recorder.clone());
        assert_eq!(source.wait(), 11);
        assert!(!source.is_running());

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.len(), 11);
        assert_eq!(seen[10].position_z(), -2.0);
    }
}
