//! VL53L1X sensor model
//!
//! Fixed characteristics of the simulated time-of-flight sensor and the
//! measurement equation.

use contracts::{Header, RadiationType, RangeReading, Time};

/// Mounting height of the sensor above the ground plane (m)
pub const SENSOR_OFFSET: f64 = 0.05;

/// Frame the reading is reported in
pub const FRAME_ID: &str = "base_down";

/// Emitter type
pub const RADIATION_TYPE: RadiationType = RadiationType::Infrared;

/// ~27 degrees
pub const FIELD_OF_VIEW: f32 = 0.47;

/// 140 mm
pub const MIN_RANGE: f32 = 0.14;

/// 3.6 m in the dark, down to 0.73 m in bright light
pub const MAX_RANGE: f32 = 3.00;

/// Measurement equation
///
/// `position_z` is NED (down positive), so climbing makes it more negative
/// and the range larger. Computed in `f64`, stored in `f32`. Never clamped.
#[inline]
pub fn range_from_altitude(position_z: f64) -> f32 {
    (SENSOR_OFFSET - position_z) as f32
}

/// Fixed fields of every emitted reading
#[derive(Debug, Clone, PartialEq)]
pub struct SensorModel {
    pub frame_id: String,
    pub radiation_type: RadiationType,
    pub field_of_view: f32,
    pub min_range: f32,
    pub max_range: f32,
}

impl SensorModel {
    /// The emulated VL53L1X
    pub fn vl53l1x() -> Self {
        Self {
            frame_id: FRAME_ID.to_string(),
            radiation_type: RADIATION_TYPE,
            field_of_view: FIELD_OF_VIEW,
            min_range: MIN_RANGE,
            max_range: MAX_RANGE,
        }
    }

    /// Build a reading for `range` stamped with `stamp`
    pub fn reading(&self, range: f32, stamp: Time) -> RangeReading {
        RangeReading {
            header: Header {
                frame_id: self.frame_id.clone(),
                stamp,
            },
            radiation_type: self.radiation_type,
            field_of_view: self.field_of_view,
            min_range: self.min_range,
            max_range: self.max_range,
            range,
        }
    }
}

impl Default for SensorModel {
    fn default() -> Self {
        Self::vl53l1x()
    }
}
