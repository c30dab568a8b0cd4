//! Simulated temperature sensor module
//!
//! Emits periodic machine/ambient telemetry readings over a message channel
//! and accepts live control while running:
//! - Random-walk generation model with temperature-correlated pressure
//! - Live tunables (emission on/off, interval, instance fan-out)
//! - Reset protocol that is race-safe against an in-flight emission cycle
//!
//! The binary in `main.rs` wires the engine to MQTT; everything else is
//! transport-agnostic and runs against any [`channel::MessageChannel`].

pub mod channel;
pub mod commands;
pub mod config;
pub mod settings;
pub mod telemetry;
