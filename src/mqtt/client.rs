use anyhow::{Context, Result};
use rand::Rng;
use rumqttc::{AsyncClient, EventLoop, MqttOptions, QoS};
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

/// MQTT broker configuration
#[derive(Clone, Debug, Deserialize)]
pub struct MqttConfig {
    #[serde(default = "default_broker_host")]
    pub broker_host: String,
    #[serde(default = "default_broker_port")]
    pub broker_port: u16,
}

fn default_broker_host() -> String {
    "broker.emqx.io".to_string()
}

fn default_broker_port() -> u16 {
    1883
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_host: default_broker_host(),
            broker_port: default_broker_port(),
        }
    }
}

/// MQTT session: a clonable request handle plus the network event loop that
/// drives it.
pub struct MqttLink {
    pub client: AsyncClient,
    pub event_loop: EventLoop,
}

impl MqttLink {
    /// Build the client. The broker connection itself is established lazily
    /// once the event loop is polled.
    pub fn connect(config: &MqttConfig) -> Self {
        let client_id = format!("serlink-{}", rand::thread_rng().gen_range(0..1000));

        let mut options = MqttOptions::new(&client_id, &config.broker_host, config.broker_port);
        options.set_keep_alive(Duration::from_secs(5));

        let (client, event_loop) = AsyncClient::new(options, 32);

        info!(
            broker = %config.broker_host,
            port = config.broker_port,
            client_id = %client_id,
            "mqtt client created"
        );

        Self { client, event_loop }
    }

    /// Register the command-topic subscription.
    pub async fn subscribe(&self, topic: &str) -> Result<()> {
        self.client
            .subscribe(topic, QoS::AtMostOnce)
            .await
            .context(format!("failed to subscribe to '{}'", topic))?;

        info!(topic = %topic, "subscribed to command topic");
        Ok(())
    }
}
