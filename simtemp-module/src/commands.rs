//! Control command decoding and the reset protocol.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Command value that triggers a reseed of the simulated state.
pub const COMMAND_RESET: &str = "Reset";

/// One entry of an inbound control batch.
#[derive(Debug, Serialize, Deserialize)]
pub struct ControlCommand {
    #[serde(rename = "Command")]
    pub command: String,
}

/// Acknowledgement for the direct reset invocation; always a success.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResetAck {
    #[serde(rename = "Status")]
    pub status: u16,
}

/// Process-wide reset request.
///
/// Handlers set it; the emission loop consumes it exactly once per full
/// cycle via [`take`](ResetFlag::take), which clears it atomically.
#[derive(Clone, Default)]
pub struct ResetFlag(Arc<AtomicBool>);

impl ResetFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Consume-and-clear. Returns whether a reset was pending.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Maps inbound control traffic to state transitions.
///
/// Both entry points only set the shared flag; neither recomputes sensor
/// state itself.
#[derive(Clone)]
pub struct CommandProcessor {
    reset: ResetFlag,
}

impl CommandProcessor {
    pub fn new(reset: ResetFlag) -> Self {
        Self { reset }
    }

    /// Decode a JSON array of commands and dispatch each one.
    ///
    /// Decode is all-or-nothing: a malformed payload drops the whole batch.
    /// Unknown command values are logged no-ops, never errors.
    pub fn handle_control_batch(&self, payload: &[u8]) {
        let batch: Vec<ControlCommand> = match serde_json::from_slice(payload) {
            Ok(batch) => batch,
            Err(e) => {
                warn!(error = %e, "failed to decode control batch, dropping");
                return;
            }
        };
        for cmd in batch {
            if cmd.command == COMMAND_RESET {
                info!("resetting temperature sensor");
                self.reset.request();
            } else {
                info!(command = %cmd.command, "unsupported control command, no-op");
            }
        }
    }

    /// Direct invocation path, distinct from the batched control messages.
    /// Always succeeds.
    pub fn handle_reset_invocation(&self) -> ResetAck {
        info!("reset requested via direct invocation");
        self.reset.request();
        ResetAck { status: 200 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processor() -> (CommandProcessor, ResetFlag) {
        let flag = ResetFlag::new();
        (CommandProcessor::new(flag.clone()), flag)
    }

    #[test]
    fn reset_flag_is_consumed_once() {
        let flag = ResetFlag::new();
        assert!(!flag.take());
        flag.request();
        assert!(flag.is_requested());
        assert!(flag.take());
        assert!(!flag.take());
        assert!(!flag.is_requested());
    }

    #[test]
    fn reset_command_in_batch_sets_the_flag() {
        let (proc, flag) = processor();
        proc.handle_control_batch(br#"[{"Command":"Reset"}]"#);
        assert!(flag.is_requested());
    }

    #[test]
    fn unknown_commands_are_noops() {
        let (proc, flag) = processor();
        proc.handle_control_batch(br#"[{"Command":"Bogus"},{"Command":"AlsoBogus"}]"#);
        assert!(!flag.is_requested());
    }

    #[test]
    fn mixed_batch_applies_reset_and_skips_the_rest() {
        let (proc, flag) = processor();
        proc.handle_control_batch(br#"[{"Command":"Reset"},{"Command":"Bogus"}]"#);
        assert!(flag.take());
        assert!(!flag.is_requested());
    }

    #[test]
    fn malformed_batch_is_dropped_without_effect() {
        let (proc, flag) = processor();
        proc.handle_control_batch(b"{ definitely not an array");
        assert!(!flag.is_requested());
    }

    #[test]
    fn direct_invocation_always_acknowledges() {
        let (proc, flag) = processor();
        let ack = proc.handle_reset_invocation();
        assert_eq!(ack.status, 200);
        assert!(flag.is_requested());

        // wire shape of the ack
        let json = serde_json::to_value(&ack).unwrap();
        assert_eq!(json, serde_json::json!({"Status": 200}));
    }
}
