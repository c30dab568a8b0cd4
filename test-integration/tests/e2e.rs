//! End-to-end scenarios: full engine over the stub channel.

use simtemp_devkit::SensorHarness;
use simtemp_module::config::SimulatorConfig;
use std::time::Duration;
use test_integration::{assert_physically_plausible, instance_ids};

fn config(send_data: bool, send_interval_ms: u64, instance_count: usize) -> SimulatorConfig {
    SimulatorConfig {
        send_data,
        send_interval_ms,
        instance_count,
    }
}

/// SendData=true, InstanceCount=2: one cycle emits exactly readings 0 and 1.
#[tokio::test]
async fn fan_out_emits_one_reading_per_instance() {
    // long interval: only the first cycle can run during the test window
    let harness = SensorHarness::start(config(true, 5000, 2));

    let readings = harness
        .wait_for_readings(2, Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(instance_ids(&readings), vec![0, 1]);

    // nothing more arrives before the next tick
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(harness.readings().unwrap().len(), 2);

    assert_physically_plausible(&readings);
    harness.stop().await.unwrap();
}

/// SendData=false: no readings while disabled, regardless of interval;
/// re-enabling resumes emission on the next tick.
#[tokio::test]
async fn disabled_emission_stays_silent_until_reenabled() {
    let harness = SensorHarness::start(config(false, 20, 1));

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(harness.readings().unwrap().is_empty());

    let applied = harness.send_config(Some(true), None, None);
    assert!(applied.send_data);

    harness
        .wait_for_readings(1, Duration::from_secs(1))
        .await
        .unwrap();
    harness.stop().await.unwrap();
}

/// A reset command mid-run is consumed by the next cycle and emission
/// continues with plausible values.
#[tokio::test]
async fn reset_mid_run_is_consumed_and_emission_continues() {
    let harness = SensorHarness::start(config(true, 20, 1));

    let before = harness
        .wait_for_readings(3, Duration::from_secs(1))
        .await
        .unwrap();

    harness.send_control_batch(&["Reset"]);

    // the next cycle consumes the flag exactly once
    let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
    while harness.reset_pending() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "reset flag was never consumed"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let after = harness
        .wait_for_readings(before.len() + 3, Duration::from_secs(1))
        .await
        .unwrap();
    assert!(after.len() > before.len());
    assert_physically_plausible(&after);
    harness.stop().await.unwrap();
}

/// Control batch [Reset, Bogus]: reset requested once, unknown command is a
/// no-op, the batch does not error out.
#[tokio::test]
async fn mixed_control_batch_applies_reset_and_ignores_unknown() {
    // emission disabled so the flag stays observable
    let harness = SensorHarness::start(config(false, 20, 1));

    harness.commands.handle_control_batch(b"garbage payload");
    assert!(!harness.reset_pending());

    harness.send_control_batch(&["Reset", "Bogus"]);
    assert!(harness.reset_pending());

    // enabling emission lets the next cycle consume the flag once
    harness.send_config(Some(true), None, None);
    let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
    while harness.reset_pending() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "reset flag was never consumed"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    harness.stop().await.unwrap();
}

/// Direct reset invocation always acknowledges with a success status.
#[tokio::test]
async fn direct_reset_invocation_acknowledges() {
    let harness = SensorHarness::start(config(false, 20, 1));

    let ack = harness.invoke_reset();
    assert_eq!(ack.status, 200);
    assert!(harness.reset_pending());

    harness.stop().await.unwrap();
}

/// Delivery failures are logged per-instance and never stop the loop.
#[tokio::test]
async fn delivery_failure_does_not_stop_the_loop() {
    let harness = SensorHarness::start(config(true, 20, 1));
    harness.channel.set_failing(true);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(harness.readings().unwrap().is_empty());

    harness.channel.set_failing(false);
    harness
        .wait_for_readings(1, Duration::from_secs(1))
        .await
        .unwrap();
    harness.stop().await.unwrap();
}

/// Interval and fan-out changes take effect on the next tick without
/// restarting the loop; invalid updates are rejected per-field.
#[tokio::test]
async fn reconfiguration_applies_on_the_next_tick() {
    let harness = SensorHarness::start(config(true, 30, 1));

    harness
        .wait_for_readings(1, Duration::from_secs(1))
        .await
        .unwrap();

    let applied = harness.send_config(None, None, Some(3));
    assert!(applied.instance_count);

    // subsequent cycles fan out to all three instances
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        let readings = harness.readings().unwrap();
        if instance_ids(&readings).contains(&2) {
            break;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "instance 2 never appeared after the fan-out increase"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    // invalid values leave the config untouched
    let before = harness.config.snapshot();
    let applied = harness.send_config(None, Some(0), Some(0));
    assert!(!applied.any());
    assert_eq!(harness.config.snapshot(), before);

    harness.stop().await.unwrap();
}
