//! # Dispatcher
//!
//! 测距读数分发模块。
//!
//! 负责：
//! - 订阅 `RangeReading` 话题
//! - Fan-out 到多个 sinks (log / JSON lines 文件 / UDP)
//! - 隔离慢 sink，不阻塞订阅回调

pub mod counters;
pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod sinks;

pub use contracts::{RangeReading, RangeSink};
pub use counters::{SinkCounters, SinkReport};
pub use dispatcher::Dispatcher;
pub use error::DispatcherError;
pub use handle::SinkHandle;
pub use sinks::{FileSink, FileSinkConfig, LogSink, NetworkFormat, NetworkSink, NetworkSinkConfig};
