//! # Transport
//!
//! In-process publish/subscribe runtime hosting the range synthesizer.
//!
//! Responsibilities:
//! - Process-scoped `Context` with `init` / `run` / `shutdown` phases
//! - Typed topics with bounded per-subscription queues and drop policy
//! - Single-threaded dispatch: callbacks run to completion, in delivery order
//! - Pose sources (JSONL replay, scripted altitude profile)
//!
//! ## Usage Example
//!
//! ```ignore
//! use transport::Context;
//! use contracts::{PoseSample, QosProfile, RangeReading};
//!
//! let context = Context::init();
//! let node = context.create_node("fake_sensor")?;
//! let range_pub = node.create_publisher::<RangeReading>("vl53l1x/range")?;
//! let odom_sub = node.create_subscription::<PoseSample>("drone/odom", QosProfile::keep_last(10))?;
//!
//! // ... register callbacks on odom_sub ...
//! context.run_until(source_done).await;
//! context.shutdown();
//! ```

mod context;
mod error;
mod executor;
mod publisher;
mod sources;
mod stats;
mod subscription;
mod topic;

// Re-exports
pub use context::{Context, Node};
pub use contracts::{DropPolicy, QosProfile};
pub use error::{Result, TransportError};
pub use publisher::TopicPublisher;
pub use sources::{source_from_config, ProfilePoseSource, ReplayPoseSource};
pub use stats::{TopicStats, TopicStatsSnapshot};
pub use subscription::TopicSubscription;
