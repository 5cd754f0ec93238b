//! RangeSynthesizer - pose telemetry to range reading adapter

use std::sync::Arc;

use contracts::{
    Clock, ContractError, MessageCallback, PoseSample, Publisher, RangeReading, Subscriber,
};
use tracing::{debug, instrument};

use crate::model::{range_from_altitude, SensorModel};

/// Synthetic range sensor
///
/// Holds two injected capabilities: the outbound publisher and the clock used
/// to stamp readings. Stateless between samples: every call to
/// [`on_pose`](Self::on_pose) publishes exactly one reading derived only from
/// that sample.
pub struct RangeSynthesizer {
    model: SensorModel,
    publisher: Arc<dyn Publisher<RangeReading>>,
    clock: Arc<dyn Clock>,
}

impl RangeSynthesizer {
    /// Create a synthesizer publishing into `publisher`
    pub fn new(publisher: Arc<dyn Publisher<RangeReading>>, clock: Arc<dyn Clock>) -> Self {
        let model = SensorModel::vl53l1x();
        debug!(
            frame_id = %model.frame_id,
            field_of_view = model.field_of_view,
            min_range = model.min_range,
            max_range = model.max_range,
            "range synthesizer ready"
        );

        Self {
            model,
            publisher,
            clock,
        }
    }

    /// Fixed sensor characteristics
    pub fn model(&self) -> &SensorModel {
        &self.model
    }

    /// Pure transform: pose sample to reading
    ///
    /// The stamp comes from the processing clock, not from the sample.
    pub fn synthesize(&self, sample: &PoseSample) -> RangeReading {
        let range = range_from_altitude(sample.position_z());
        self.model.reading(range, self.clock.now())
    }

    /// Handle one inbound sample: transform and publish once
    pub fn on_pose(&self, sample: PoseSample) {
        let reading = self.synthesize(&sample);
        self.publisher.send(reading);
    }

    /// Callback suitable for any `Subscriber<PoseSample>`
    pub fn handler(self: &Arc<Self>) -> MessageCallback<PoseSample> {
        let synthesizer = Arc::clone(self);
        Arc::new(move |sample| synthesizer.on_pose(sample))
    }

    /// Register on `subscriber` and return the shared synthesizer
    ///
    /// # Errors
    /// Propagates the subscriber's registration error.
    #[instrument(name = "range_synthesizer_attach", skip_all)]
    pub fn attach(
        self,
        subscriber: &dyn Subscriber<PoseSample>,
    ) -> Result<Arc<Self>, ContractError> {
        let synthesizer = Arc::new(self);
        subscriber.subscribe(synthesizer.handler())?;
        debug!("range synthesizer subscribed");
        Ok(synthesizer)
    }
}
