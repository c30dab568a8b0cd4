/*!
In-memory stand-in for the MQTT channel.

Records every published message and allows tests to assert on them without
starting a broker. Can be switched into a failing mode to exercise the
delivery-error handling of the emission loop.
*/

use async_trait::async_trait;
use parking_lot::Mutex;
use simtemp_module::channel::{ChannelError, MessageChannel};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct StubMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Stub channel compatible with [`MessageChannel`].
#[derive(Clone, Default)]
pub struct ChannelStub {
    published: Arc<Mutex<Vec<StubMessage>>>,
    failing: Arc<AtomicBool>,
}

impl ChannelStub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every publish fail with a delivery error until switched back.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All recorded messages (for test assertions).
    pub fn published(&self) -> Vec<StubMessage> {
        self.published.lock().clone()
    }

    /// Messages recorded on a given topic.
    pub fn find_by_topic(&self, topic: &str) -> Vec<StubMessage> {
        self.published
            .lock()
            .iter()
            .filter(|msg| msg.topic == topic)
            .cloned()
            .collect()
    }

    /// Decode every message recorded on a topic.
    pub fn decoded<T>(&self, topic: &str) -> anyhow::Result<Vec<T>>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        self.find_by_topic(topic)
            .iter()
            .map(|msg| serde_json::from_slice(&msg.payload).map_err(Into::into))
            .collect()
    }

    /// Decode the most recent message on a topic, if any.
    pub fn last_json<T>(&self, topic: &str) -> anyhow::Result<Option<T>>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        match self.find_by_topic(topic).last() {
            Some(msg) => Ok(Some(serde_json::from_slice(&msg.payload)?)),
            None => Ok(None),
        }
    }

    /// Forget all recorded messages.
    pub fn clear(&self) {
        self.published.lock().clear();
    }
}

#[async_trait]
impl MessageChannel for ChannelStub {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), ChannelError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ChannelError::Delivery("stub is in failing mode".into()));
        }
        debug!(topic, bytes = payload.len(), "stub publish");
        self.published.lock().push(StubMessage {
            topic: topic.to_string(),
            payload,
        });
        Ok(())
    }
}
