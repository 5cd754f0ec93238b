//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Message Model
//! - `PoseSample` is the inbound odometry/telemetry message (NED frame, down is positive)
//! - `RangeReading` is the outbound down-facing range sensor message
//! - Stamps use the ROS `Time { sec, nanosec }` layout

mod blueprint;
mod error;
mod message;
mod pose_source;
mod pubsub;
mod sink;
mod topic;

pub use blueprint::*;
pub use error::*;
pub use message::*;
pub use pose_source::PoseSource;
pub use pubsub::{Clock, MessageCallback, Publisher, Subscriber};
pub use sink::{LocalRangeSink, RangeSink};
pub use topic::{resolve_topic_name, validate_topic_name};
