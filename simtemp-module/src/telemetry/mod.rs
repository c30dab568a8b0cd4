//! Telemetry generation and the emission loop.

pub mod policy;

use crate::channel::{topic, MessageChannel};
use crate::commands::ResetFlag;
use crate::config::{ConfigStore, SimulatorConfig};
use chrono::{DateTime, Utc};
use policy::GenerationPolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// One emitted telemetry record for one simulated instance.
///
/// Immutable once constructed; ownership transfers to the channel on
/// emission. `TimeCreated` serializes as an RFC 3339 timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Reading {
    pub instance_id: usize,
    pub machine: MachineReading,
    pub ambient: AmbientReading,
    pub time_created: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MachineReading {
    pub temperature: f64,
    pub pressure: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AmbientReading {
    pub temperature: f64,
    pub humidity: f64,
}

/// Per-instance machine state plus the shared generation policy.
///
/// An instance with no tracked temperature is seeded from the baseline
/// distribution on its next reading. That covers the first process cycle,
/// instances added by an `InstanceCount` increase, and every instance after
/// [`reset_all`](SensorBank::reset_all).
#[derive(Default)]
pub struct SensorBank {
    policy: GenerationPolicy,
    temperatures: HashMap<usize, f64>,
}

impl SensorBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all tracked state so every instance reseeds on its next reading.
    ///
    /// A reset applies to all instances of the cycle that observes it, not
    /// just the first one processed.
    pub fn reset_all(&mut self) {
        self.temperatures.clear();
    }

    pub fn current_temperature(&self, instance_id: usize) -> Option<f64> {
        self.temperatures.get(&instance_id).copied()
    }

    /// Advance (or seed) the walk for one instance and build its reading.
    pub fn next_reading(&mut self, instance_id: usize) -> Reading {
        let temperature = match self.temperatures.get(&instance_id) {
            Some(&previous) => self.policy.next_machine_temperature(previous),
            None => self.policy.initial_machine_temperature(),
        };
        self.temperatures.insert(instance_id, temperature);
        Reading {
            instance_id,
            machine: MachineReading {
                temperature,
                pressure: self.policy.pressure(temperature),
            },
            ambient: AmbientReading {
                temperature: self.policy.ambient_temperature(),
                humidity: self.policy.humidity(),
            },
            time_created: Utc::now(),
        }
    }
}

/// The scheduling core: one long-running task producing readings at the
/// configured interval.
///
/// Sole writer of the sensor bank and sole consumer of the reset flag on
/// the hot path. The config snapshot is re-read every cycle, so interval and
/// fan-out changes take effect on the next tick without restarting the loop.
/// Drift policy: the wait is a fixed delay after the batch completes, so an
/// overrun delays the next tick but does not compound.
pub struct EmissionLoop<C> {
    channel: C,
    config: ConfigStore,
    reset: ResetFlag,
    bank: SensorBank,
    shutdown: watch::Receiver<bool>,
}

impl<C: MessageChannel> EmissionLoop<C> {
    pub fn new(
        channel: C,
        config: ConfigStore,
        reset: ResetFlag,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            channel,
            config,
            reset,
            bank: SensorBank::new(),
            shutdown,
        }
    }

    /// Run until the shutdown signal fires.
    ///
    /// A failed cycle is logged and the loop continues on the next tick;
    /// only cancellation stops it. The sleep races the shutdown signal, so
    /// cancellation interrupts a pending wait promptly.
    pub async fn run(mut self) {
        info!("emission loop started");
        loop {
            let cfg = self.config.snapshot();
            if cfg.send_data {
                if let Err(e) = self.emit_cycle(&cfg).await {
                    error!(error = ?e, "emission cycle failed, continuing on next tick");
                }
            }
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_millis(cfg.send_interval_ms)) => {}
                _ = self.shutdown.changed() => {
                    info!("shutdown requested, emission loop stopping");
                    break;
                }
            }
        }
        info!("emission loop stopped");
    }

    /// Produce and publish one reading per configured instance.
    ///
    /// The reset flag is consumed once for the whole cycle, before any
    /// instance is processed. A delivery failure is logged and the remaining
    /// instances of the batch still go out.
    async fn emit_cycle(&mut self, cfg: &SimulatorConfig) -> anyhow::Result<()> {
        if self.reset.take() {
            info!("reset observed, reseeding all instances");
            self.bank.reset_all();
        }
        for instance_id in 0..cfg.instance_count {
            let reading = self.bank.next_reading(instance_id);
            let payload = serde_json::to_vec(&reading)?;
            match self.channel.publish(topic::TEMPERATURE_OUTPUT, payload).await {
                Ok(()) => debug!(
                    instance_id,
                    temperature = reading.machine.temperature,
                    "reading emitted"
                ),
                Err(e) => warn!(instance_id, error = %e, "failed to deliver reading, continuing"),
            }
        }
        Ok(())
    }
}
