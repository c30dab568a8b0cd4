//! Message channel seam between the engine and the transport.
//!
//! The emission loop and the reset acknowledgement path never talk to
//! rumqttc directly; they go through [`MessageChannel`] so the devkit stub
//! can stand in for a broker during development and tests.

use async_trait::async_trait;
use rumqttc::{AsyncClient, QoS};
use thiserror::Error;

/// Topic names shared with the external collaborators.
pub mod topic {
    /// Outbound telemetry readings.
    pub const TEMPERATURE_OUTPUT: &str = "temperatureOutput";
    /// Inbound control command batches.
    pub const CONTROL: &str = "control";
    /// Inbound sparse configuration updates.
    pub const CONFIG: &str = "config";
    /// Inbound direct reset invocation.
    pub const RESET: &str = "reset";
    /// Outbound reset acknowledgement.
    pub const RESET_ACK: &str = "reset/ack";
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("mqtt publish failed: {0}")]
    Mqtt(#[from] rumqttc::ClientError),
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Outbound side of the message channel.
///
/// Fire-and-forget semantics: callers log failures and move on, there are
/// no retries and no backpressure.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), ChannelError>;
}

/// Production channel over a rumqttc client.
///
/// Publishing only enqueues; the MQTT event loop polled by the binary does
/// the actual network I/O.
#[derive(Clone)]
pub struct MqttChannel {
    client: AsyncClient,
}

impl MqttChannel {
    pub fn new(client: AsyncClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MessageChannel for MqttChannel {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), ChannelError> {
        self.client
            .publish(topic, QoS::AtLeastOnce, false, payload)
            .await
            .map_err(ChannelError::from)
    }
}
