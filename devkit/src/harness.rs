/*!
Test harness for the sensor engine.

Wires the configuration store, command processor and emission loop around a
[`ChannelStub`], the way the binary wires them around MQTT. Tests feed
inbound events through the same decode paths the transport uses and assert
on the recorded outbound readings.
*/

use crate::channel_stub::ChannelStub;
use crate::payloads;
use anyhow::{bail, Result};
use simtemp_module::channel::topic;
use simtemp_module::commands::{CommandProcessor, ResetAck, ResetFlag};
use simtemp_module::config::{AppliedFields, ConfigStore, SimulatorConfig};
use simtemp_module::telemetry::{EmissionLoop, Reading};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub struct SensorHarness {
    pub channel: ChannelStub,
    pub config: ConfigStore,
    pub commands: CommandProcessor,
    reset: ResetFlag,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SensorHarness {
    /// Spawn an emission loop over a fresh stub with the given initial
    /// configuration.
    pub fn start(initial: SimulatorConfig) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let channel = ChannelStub::new();
        let config = ConfigStore::new(initial);
        let reset = ResetFlag::new();
        let commands = CommandProcessor::new(reset.clone());
        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(
            EmissionLoop::new(channel.clone(), config.clone(), reset.clone(), shutdown_rx).run(),
        );

        Self {
            channel,
            config,
            commands,
            reset,
            shutdown,
            task,
        }
    }

    /// Feed a sparse config update the way the config-sync collaborator
    /// would deliver it.
    pub fn send_config(
        &self,
        send_data: Option<bool>,
        send_interval: Option<i64>,
        instance_count: Option<i64>,
    ) -> AppliedFields {
        let payload =
            serde_json::to_vec(&payloads::config_update(send_data, send_interval, instance_count))
                .expect("config update serializes");
        self.config.apply_json(&payload)
    }

    /// Feed a control batch the way the `control` queue would deliver it.
    pub fn send_control_batch(&self, commands: &[&str]) {
        let payload = serde_json::to_vec(&payloads::control_batch(commands))
            .expect("control batch serializes");
        self.commands.handle_control_batch(&payload);
    }

    /// Direct reset invocation, bypassing the control queue.
    pub fn invoke_reset(&self) -> ResetAck {
        self.commands.handle_reset_invocation()
    }

    /// Whether a reset is requested but not yet consumed by a cycle.
    pub fn reset_pending(&self) -> bool {
        self.reset.is_requested()
    }

    /// Every reading emitted so far, in emission order.
    pub fn readings(&self) -> Result<Vec<Reading>> {
        self.channel.decoded(topic::TEMPERATURE_OUTPUT)
    }

    /// Poll until at least `count` readings were emitted or the timeout hits.
    pub async fn wait_for_readings(&self, count: usize, timeout: Duration) -> Result<Vec<Reading>> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let readings = self.readings()?;
            if readings.len() >= count {
                return Ok(readings);
            }
            if tokio::time::Instant::now() >= deadline {
                bail!(
                    "timed out waiting for {count} readings, got {}",
                    readings.len()
                );
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    /// Stop the emission loop and wait for it to exit.
    pub async fn stop(self) -> Result<()> {
        let _ = self.shutdown.send(true);
        self.task.await?;
        Ok(())
    }
}
