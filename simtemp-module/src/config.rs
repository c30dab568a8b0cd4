//! Live simulator tunables and the partial-update procedure.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Tunables read by the emission loop once per cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Whether readings are emitted at all.
    pub send_data: bool,
    /// Cycle period in milliseconds, always > 0.
    pub send_interval_ms: u64,
    /// Number of simulated instances per cycle, always >= 1.
    pub instance_count: usize,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            send_data: true,
            send_interval_ms: 5000,
            instance_count: 1,
        }
    }
}

/// Sparse inbound update from the config-sync collaborator.
///
/// Missing or null keys leave the corresponding field unchanged.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigUpdate {
    #[serde(rename = "SendData", skip_serializing_if = "Option::is_none")]
    pub send_data: Option<bool>,
    #[serde(rename = "SendInterval", skip_serializing_if = "Option::is_none")]
    pub send_interval: Option<i64>,
    #[serde(rename = "InstanceCount", skip_serializing_if = "Option::is_none")]
    pub instance_count: Option<i64>,
}

/// Which fields an update actually changed, for observability.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AppliedFields {
    pub send_data: bool,
    pub send_interval: bool,
    pub instance_count: bool,
}

impl AppliedFields {
    pub fn any(&self) -> bool {
        self.send_data || self.send_interval || self.instance_count
    }
}

/// Shared configuration store.
///
/// Updates may race reads from the emission loop; the mutex guarantees a
/// reader sees either the old or the fully-updated value of each field,
/// never a torn mix of two updates.
#[derive(Clone)]
pub struct ConfigStore {
    inner: Arc<Mutex<SimulatorConfig>>,
}

impl ConfigStore {
    pub fn new(initial: SimulatorConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(initial)),
        }
    }

    /// Decode and apply a sparse JSON update.
    ///
    /// Decode is all-or-nothing: a malformed payload drops the whole update
    /// and nothing is applied.
    pub fn apply_json(&self, payload: &[u8]) -> AppliedFields {
        match serde_json::from_slice::<ConfigUpdate>(payload) {
            Ok(update) => self.apply_update(&update),
            Err(e) => {
                warn!(error = %e, "invalid configuration update payload, dropping");
                AppliedFields::default()
            }
        }
    }

    /// Install every present and valid field, keeping the prior value for
    /// the rest. An out-of-domain value (interval <= 0, instance count < 1)
    /// is ignored for that field only. Never blocks on I/O, never fails.
    pub fn apply_update(&self, update: &ConfigUpdate) -> AppliedFields {
        let mut applied = AppliedFields::default();
        let effective = {
            let mut cfg = self.inner.lock();
            if let Some(v) = update.send_data {
                cfg.send_data = v;
                applied.send_data = true;
            }
            if let Some(v) = update.send_interval {
                if v > 0 {
                    cfg.send_interval_ms = v as u64;
                    applied.send_interval = true;
                } else {
                    warn!(value = v, "SendInterval must be positive, keeping previous");
                }
            }
            if let Some(v) = update.instance_count {
                if v >= 1 {
                    cfg.instance_count = v as usize;
                    applied.instance_count = true;
                } else {
                    warn!(value = v, "InstanceCount must be >= 1, keeping previous");
                }
            }
            cfg.clone()
        };
        info!(
            send_data = effective.send_data,
            send_interval_ms = effective.send_interval_ms,
            instance_count = effective.instance_count,
            "configuration updated"
        );
        applied
    }

    /// Point-in-time copy, safe for concurrent reads.
    pub fn snapshot(&self) -> SimulatorConfig {
        self.inner.lock().clone()
    }
}
