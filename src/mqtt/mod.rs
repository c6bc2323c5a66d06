// MQTT client integration

mod client;
mod publisher;

pub use client::{MqttConfig, MqttLink};
pub use publisher::SensorPublisher;
