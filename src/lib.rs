// Wire-format rules shared by both translation directions
pub mod codec;

// Device model (actuators commanded over MQTT)
pub mod device;

// Sensor model (telemetry decoded from serial frames)
pub mod sensor;

// Frame and command routing
pub mod dispatch;

// Bridge runtime and workers
pub mod bridge;

// Serial transport integration
pub mod serial;

// MQTT client integration
pub mod mqtt;

// Configuration
pub mod config;
