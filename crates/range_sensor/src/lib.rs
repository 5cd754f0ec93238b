//! # Range Sensor
//!
//! Synthetic down-facing range sensor.
//!
//! Turns pose telemetry (NED, down is positive) into a `RangeReading` that
//! mimics a VL53L1X time-of-flight sensor mounted `SENSOR_OFFSET` above the
//! ground plane. One reading is published per pose sample, nothing is
//! retained between samples.
//!
//! ## Usage Example
//!
//! ```ignore
//! use range_sensor::{RangeSynthesizer, SystemClock};
//!
//! let synthesizer = RangeSynthesizer::new(Arc::new(range_publisher), Arc::new(SystemClock));
//! let synthesizer = synthesizer.attach(&pose_subscription)?;
//! ```

mod clock;
mod model;
mod synthesizer;

pub use clock::{ManualClock, SystemClock};
pub use model::{
    range_from_altitude, SensorModel, FIELD_OF_VIEW, FRAME_ID, MAX_RANGE, MIN_RANGE,
    RADIATION_TYPE, SENSOR_OFFSET,
};
pub use synthesizer::RangeSynthesizer;
