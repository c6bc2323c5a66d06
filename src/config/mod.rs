use anyhow::{Context, Result};
use serde::Deserialize;

// Re-export transport config types
pub use crate::mqtt::MqttConfig;
pub use crate::serial::SerialConfig;

/// Complete serlink configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SerlinkConfig {
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub mqtt: MqttConfig,
    #[serde(default)]
    pub topics: TopicConfig,
}

/// Topic layout and command framing
#[derive(Debug, Clone, Deserialize)]
pub struct TopicConfig {
    /// Root under which sensor values are published
    #[serde(default = "default_root_topic")]
    pub root: String,
    /// Subtopic (under the root) carrying inbound commands
    #[serde(default = "default_command_subtopic")]
    pub command_subtopic: String,
    /// Single character separating device name and value in a command
    #[serde(default = "default_command_separator")]
    pub command_separator: char,
}

fn default_root_topic() -> String {
    "/python/mqtt/robot/1/".to_string()
}

fn default_command_subtopic() -> String {
    "command".to_string()
}

fn default_command_separator() -> char {
    '~'
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            root: default_root_topic(),
            command_subtopic: default_command_subtopic(),
            command_separator: default_command_separator(),
        }
    }
}

impl Default for SerlinkConfig {
    fn default() -> Self {
        Self {
            serial: SerialConfig::default(),
            mqtt: MqttConfig::default(),
            topics: TopicConfig::default(),
        }
    }
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> Result<SerlinkConfig> {
    let contents = std::fs::read_to_string(path)
        .context(format!("failed to read config file '{}'", path))?;
    let config: SerlinkConfig =
        toml::from_str(&contents).context(format!("failed to parse config file '{}'", path))?;
    Ok(config)
}
