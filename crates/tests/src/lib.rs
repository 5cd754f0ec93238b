//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 真实传输层上的端到端测试 (位姿 -> 测距 -> sinks)
//! - 回放文件端到端测试

#[cfg(test)]
mod contract_tests {
    use contracts::{RadiationType, RangeReading};

    #[test]
    fn test_range_reading_wire_shape() {
        let reading =
            range_sensor::SensorModel::vl53l1x().reading(1.05, contracts::Time::new(3, 7));
        let json = serde_json::to_value(&reading).unwrap();

        assert_eq!(json["header"]["frame_id"], "base_down");
        assert_eq!(json["header"]["stamp"]["sec"], 3);
        assert_eq!(json["header"]["stamp"]["nanosec"], 7);
        assert_eq!(json["radiation_type"], "INFRARED");

        let back: RangeReading = serde_json::from_value(json).unwrap();
        assert_eq!(back.radiation_type, RadiationType::Infrared);
        assert_eq!(back.radiation_type.wire_value(), 1);
    }

    #[test]
    fn test_default_wiring_is_valid() {
        let bp = config_loader::BridgeBlueprint::default();
        assert!(config_loader::ConfigLoader::validate(&bp).is_ok());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    use contracts::{
        PoseSample, PoseSource, Publisher, QosProfile, RangeReading, ReplayConfig, SinkConfig,
        SinkType, Subscriber, Time,
    };
    use dispatcher::Dispatcher;
    use range_sensor::{range_from_altitude, ManualClock, RangeSynthesizer};
    use transport::{Context, ReplayPoseSource};

    /// Collect every reading delivered on a subscription
    fn collect(subscription: &dyn Subscriber<RangeReading>) -> Arc<Mutex<Vec<RangeReading>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        subscription
            .subscribe(Arc::new(move |reading| sink.lock().unwrap().push(reading)))
            .unwrap();
        seen
    }

    /// 100 samples through the real transport, depth 10, publish and spin interleaved
    #[test]
    fn test_hundred_samples_in_order() {
        let context = Context::init();
        let node = context.create_node("fake_sensor").unwrap();
        let qos = QosProfile::keep_last(10);

        let range_pub = node.create_publisher::<RangeReading>("vl53l1x/range").unwrap();
        let range_sub = node
            .create_subscription::<RangeReading>("vl53l1x/range", qos)
            .unwrap();
        let readings = collect(&range_sub);

        let pose_sub = node
            .create_subscription::<PoseSample>("drone/odom", qos)
            .unwrap();
        let clock = Arc::new(ManualClock::new(Time::new(0, 0)));
        RangeSynthesizer::new(Arc::new(range_pub), clock.clone())
            .attach(&pose_sub)
            .unwrap();

        let pose_pub = node.create_publisher::<PoseSample>("drone/odom").unwrap();
        for i in 0..100 {
            clock.advance_nanos(10_000_000);
            pose_pub.send(PoseSample::at_position_z(-(i as f64) * 0.02));
            context.spin_some();
        }

        let readings = readings.lock().unwrap();
        assert_eq!(readings.len(), 100);
        for (i, reading) in readings.iter().enumerate() {
            assert_eq!(reading.range, range_from_altitude(-(i as f64) * 0.02));
            assert_eq!(reading.header.frame_id, "base_down");
        }
        assert!(readings
            .windows(2)
            .all(|w| w[0].header.stamp < w[1].header.stamp));

        let pose_stats = context.topic_stats("/drone/odom").unwrap();
        assert_eq!(pose_stats.published, 100);
        assert_eq!(pose_stats.delivered, 100);
        assert_eq!(pose_stats.dropped, 0);
        assert_eq!(context.topic_stats("/vl53l1x/range").unwrap().delivered, 100);
    }

    /// Burst without spinning keeps only the newest `depth` samples
    #[test]
    fn test_burst_keeps_newest() {
        let context = Context::init();
        let node = context.create_node("fake_sensor").unwrap();

        let range_pub = node.create_publisher::<RangeReading>("vl53l1x/range").unwrap();
        let range_sub = node
            .create_subscription::<RangeReading>("vl53l1x/range", QosProfile::keep_last(100))
            .unwrap();
        let readings = collect(&range_sub);

        let pose_sub = node
            .create_subscription::<PoseSample>("drone/odom", QosProfile::keep_last(10))
            .unwrap();
        RangeSynthesizer::new(Arc::new(range_pub), Arc::new(ManualClock::new(Time::new(0, 0))))
            .attach(&pose_sub)
            .unwrap();

        let pose_pub = node.create_publisher::<PoseSample>("drone/odom").unwrap();
        for i in 0..25 {
            pose_pub.send(PoseSample::at_position_z(-(i as f64)));
        }
        context.spin_some();

        let ranges: Vec<f32> = readings.lock().unwrap().iter().map(|r| r.range).collect();
        let expected: Vec<f32> = (15..25).map(|i| range_from_altitude(-(i as f64))).collect();
        assert_eq!(ranges, expected);
        assert_eq!(context.topic_stats("/drone/odom").unwrap().dropped, 15);
    }

    /// Synthesizer -> dispatcher -> file sink
    #[tokio::test]
    async fn test_readings_reach_file_sink() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/ranges.jsonl");

        let context = Context::init();
        let node = context.create_node("fake_sensor").unwrap();
        let qos = QosProfile::keep_last(10);

        let range_pub = node.create_publisher::<RangeReading>("vl53l1x/range").unwrap();
        let range_sub = node
            .create_subscription::<RangeReading>("vl53l1x/range", qos)
            .unwrap();
        let dispatcher = Dispatcher::from_configs(&[SinkConfig {
            name: "file".to_string(),
            sink_type: SinkType::File,
            queue_capacity: 64,
            params: HashMap::from([("path".to_string(), path.display().to_string())]),
        }])
        .await
        .unwrap();
        dispatcher.attach(&range_sub).unwrap();

        let pose_sub = node
            .create_subscription::<PoseSample>("drone/odom", qos)
            .unwrap();
        RangeSynthesizer::new(Arc::new(range_pub), Arc::new(ManualClock::new(Time::new(5, 0))))
            .attach(&pose_sub)
            .unwrap();

        let pose_pub = node.create_publisher::<PoseSample>("drone/odom").unwrap();
        let altitudes = [0.0, -1.0, 0.05, 3.5, -4.0];
        for z in altitudes {
            pose_pub.send(PoseSample::at_position_z(z));
            context.spin_some();
        }

        context.shutdown();
        dispatcher.shutdown().await;

        let written: Vec<RangeReading> = std::fs::read_to_string(&path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        let ranges: Vec<f32> = written.iter().map(|r| r.range).collect();
        let expected: Vec<f32> = altitudes.iter().map(|z| range_from_altitude(*z)).collect();
        assert_eq!(ranges, expected);
        assert!(written.iter().all(|r| r.header.stamp == Time::new(5, 0)));

        let summary = dispatcher.range_summary();
        assert_eq!(summary.total_readings, 5);
        // 0.05, 0.0 and -3.45 below 0.14; 4.05 above 3.0
        assert_eq!(summary.below_min, 3);
        assert_eq!(summary.above_max, 1);

        let (name, report) = &dispatcher.reports()[0];
        assert_eq!(name, "file");
        assert_eq!(report.written, 5);
        assert_eq!(report.rejected, 0);
        assert_eq!(report.out_of_envelope, 4);
        assert_eq!(report.last_stamp, Some(Time::new(5, 0)));
    }

    /// Recorded JSONL flight replayed through the transport
    #[tokio::test]
    async fn test_replay_end_to_end() {
        let mut recording = tempfile::NamedTempFile::new().unwrap();
        writeln!(recording, "# takeoff").unwrap();
        for i in 0..50 {
            let mut sample = PoseSample::at_position_z(-(i as f64) * 0.1);
            sample.header.stamp = Time::from_secs_f64(i as f64 * 0.02);
            writeln!(recording, "{}", serde_json::to_string(&sample).unwrap()).unwrap();
        }
        recording.flush().unwrap();

        let context = Context::init();
        let node = context.create_node("fake_sensor").unwrap();
        let qos = QosProfile::keep_last(100);

        let range_pub = node.create_publisher::<RangeReading>("vl53l1x/range").unwrap();
        let range_sub = node
            .create_subscription::<RangeReading>("vl53l1x/range", qos)
            .unwrap();
        let readings = collect(&range_sub);

        let pose_sub = node
            .create_subscription::<PoseSample>("drone/odom", qos)
            .unwrap();
        RangeSynthesizer::new(Arc::new(range_pub), Arc::new(ManualClock::new(Time::new(0, 0))))
            .attach(&pose_sub)
            .unwrap();

        let source = Arc::new(
            ReplayPoseSource::load(&ReplayConfig {
                path: recording.path().to_path_buf(),
                speed: 0.0,
                loop_playback: false,
            })
            .unwrap(),
        );
        assert_eq!(source.len(), 50);

        let pose_pub = node.create_publisher::<PoseSample>("drone/odom").unwrap();
        source.start(Arc::new(pose_pub));

        let waiter = Arc::clone(&source);
        let emitted = context
            .run_until(tokio::task::spawn_blocking(move || waiter.wait()))
            .await
            .unwrap()
            .unwrap();
        context.shutdown();

        assert_eq!(emitted, 50);
        let readings = readings.lock().unwrap();
        assert_eq!(readings.len(), 50);
        for (i, reading) in readings.iter().enumerate() {
            assert_eq!(reading.range, range_from_altitude(-(i as f64) * 0.1));
        }
    }
}
