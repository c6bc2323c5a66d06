use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio::io::{ReadHalf, WriteHalf};
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::info;

/// Serial port configuration
#[derive(Clone, Debug, Deserialize)]
pub struct SerialConfig {
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Read timeout bounds shutdown latency; it is not a protocol deadline
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

fn default_path() -> String {
    "/dev/ttyUSB0".to_string()
}

fn default_baud_rate() -> u32 {
    115_200
}

fn default_read_timeout_ms() -> u64 {
    1000
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            baud_rate: default_baud_rate(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

/// An open serial connection to the robot controller
pub struct SerialLink {
    stream: SerialStream,
    path: String,
}

impl SerialLink {
    /// Open the configured port. A missing device path is fatal to the
    /// bridge; there is no retry.
    pub fn open(config: &SerialConfig) -> Result<Self> {
        if !Path::new(&config.path).exists() {
            bail!("serial device '{}' not found", config.path);
        }

        let stream = tokio_serial::new(&config.path, config.baud_rate)
            .timeout(Duration::from_millis(config.read_timeout_ms))
            .open_native_async()
            .context(format!("failed to open serial port '{}'", config.path))?;

        info!(path = %config.path, baud_rate = config.baud_rate, "serial port opened");

        Ok(Self {
            stream,
            path: config.path.clone(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Split into independently owned read and write halves, one per worker.
    pub fn split(self) -> (ReadHalf<SerialStream>, WriteHalf<SerialStream>) {
        tokio::io::split(self.stream)
    }
}
