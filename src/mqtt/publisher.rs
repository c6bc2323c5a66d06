use anyhow::{Context, Result};
use rumqttc::{AsyncClient, QoS};
use tracing::debug;

/// Publisher for decoded sensor values
#[derive(Clone)]
pub struct SensorPublisher {
    client: AsyncClient,
}

impl SensorPublisher {
    pub fn new(client: AsyncClient) -> Self {
        Self { client }
    }

    /// Publish one JSON payload to a sensor topic.
    ///
    /// A rejected publish is an error for this message only; the caller logs
    /// it and moves on.
    pub async fn publish(&self, topic: &str, payload: String) -> Result<()> {
        debug!(topic = %topic, bytes = payload.len(), "publishing sensor value");

        self.client
            .publish(topic, QoS::AtMostOnce, false, payload)
            .await
            .context(format!("failed to publish to topic '{}'", topic))?;

        Ok(())
    }
}
