//! ReplayPoseSource - 回放 JSONL 录制的位姿
//!
//! 每行一个 `PoseSample` JSON，空行与 `#` 开头的行被忽略。
//! 按记录中 header.stamp 的间隔 (除以速度倍率) 定时发布。

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use contracts::{ContractError, PoseSample, PoseSource, Publisher, ReplayConfig};
use tracing::{debug, info, warn};

use super::sleep_until;
use crate::error::{Result, TransportError};

/// 回放位姿源
pub struct ReplayPoseSource {
    name: String,
    samples: Arc<Vec<PoseSample>>,
    speed: f64,
    loop_playback: bool,
    running: Arc<AtomicBool>,
    thread_handle: Mutex<Option<JoinHandle<u64>>>,
}

impl ReplayPoseSource {
    /// 按配置加载录制文件 (`-` 表示 stdin)
    pub fn load(config: &ReplayConfig) -> Result<Self> {
        let path = config.path.as_path();
        let samples = if path == Path::new("-") {
            read_samples(std::io::stdin().lock())?
        } else {
            let file = File::open(path).map_err(|source| TransportError::ReplayOpen {
                path: path.to_path_buf(),
                source,
            })?;
            read_samples(BufReader::new(file))?
        };

        info!(path = %path.display(), samples = samples.len(), "replay file loaded");
        Self::from_samples(samples, config.speed, config.loop_playback)
    }

    /// 从任意 reader 读取
    pub fn from_reader<R: BufRead>(reader: R, speed: f64, loop_playback: bool) -> Result<Self> {
        Self::from_samples(read_samples(reader)?, speed, loop_playback)
    }

    /// 直接使用内存中的样本
    pub fn from_samples(samples: Vec<PoseSample>, speed: f64, loop_playback: bool) -> Result<Self> {
        if !speed.is_finite() || speed < 0.0 {
            return Err(ContractError::config_validation(
                "source.speed",
                format!("replay speed must be >= 0, got {speed}"),
            )
            .into());
        }

        Ok(Self {
            name: "replay".to_string(),
            samples: Arc::new(samples),
            speed,
            loop_playback,
            running: Arc::new(AtomicBool::new(false)),
            thread_handle: Mutex::new(None),
        })
    }

    /// 样本数
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// 是否没有样本
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

fn read_samples<R: BufRead>(reader: R) -> Result<Vec<PoseSample>> {
    let mut samples = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| TransportError::ReplayParse {
            line: index + 1,
            message: e.to_string(),
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let sample = serde_json::from_str::<PoseSample>(trimmed).map_err(|e| {
            TransportError::ReplayParse {
                line: index + 1,
                message: e.to_string(),
            }
        })?;
        samples.push(sample);
    }
    Ok(samples)
}

/// 单次回放；返回 (已发布数, 是否被停止)
fn play_once(
    samples: &[PoseSample],
    speed: f64,
    running: &AtomicBool,
    publisher: &dyn Publisher<PoseSample>,
) -> (u64, bool) {
    let Some(first) = samples.first() else {
        return (0, false);
    };
    let base = first.header.stamp.as_secs_f64();
    let started = Instant::now();
    let mut emitted = 0;

    for sample in samples {
        if speed > 0.0 {
            let offset = (sample.header.stamp.as_secs_f64() - base) / speed;
            if offset > 0.0 && offset.is_finite() {
                let deadline = started + Duration::from_secs_f64(offset);
                if !sleep_until(deadline, running) {
                    return (emitted, true);
                }
            }
        }
        if !running.load(Ordering::Relaxed) {
            return (emitted, true);
        }

        publisher.send(sample.clone());
        emitted += 1;
    }
    (emitted, false)
}

impl PoseSource for ReplayPoseSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&self, publisher: Arc<dyn Publisher<PoseSample>>) {
        if self.running.swap(true, Ordering::SeqCst) {
            debug!(source = %self.name, "replay already running");
            return;
        }

        let samples = Arc::clone(&self.samples);
        let running = Arc::clone(&self.running);
        let speed = self.speed;
        let loop_playback = self.loop_playback;

        let spawned = std::thread::Builder::new()
            .name("pose-replay".to_string())
            .spawn(move || {
                let mut total = 0;
                let mut rounds = 0u64;
                loop {
                    let (emitted, stopped) = play_once(&samples, speed, &running, &*publisher);
                    total += emitted;
                    rounds += 1;
                    if stopped || !loop_playback || samples.is_empty() {
                        break;
                    }
                }
                running.store(false, Ordering::SeqCst);
                info!(samples = total, rounds, "replay finished");
                total
            });

        match spawned {
            Ok(handle) => {
                debug!(source = %self.name, samples = self.samples.len(), speed, "replay started");
                *self
                    .thread_handle
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = Some(handle);
            }
            Err(e) => {
                warn!(source = %self.name, error = %e, "failed to spawn replay thread");
                self.running.store(false, Ordering::SeqCst);
            }
        }
    }

    fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            debug!(source = %self.name, "replay stop requested");
        }
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
                warn!(source = %self.name, "replay thread panicked");
                0
            }
            None => 0,
        }
    }
}

impl Drop for ReplayPoseSource {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}
