/*!
# Simtemp DevKit - Stubs and Utilities for Development

Lets the sensor engine run without a broker:
- [`ChannelStub`]: in-memory message channel recording every publish
- [`SensorHarness`]: full engine wiring around the stub for tests
- [`payloads`]: JSON builders matching the inbound wire formats
*/

pub mod channel_stub;
pub mod harness;
pub mod payloads;

pub use channel_stub::{ChannelStub, StubMessage};
pub use harness::SensorHarness;
