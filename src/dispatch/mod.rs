use tracing::{debug, error, warn};

use crate::codec::{frame_code, join_topic, split_command};
use crate::device::Device;
use crate::sensor::Sensor;

#[cfg(test)]
mod tests;

/// What the bridge should do with a message after dispatch
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Publish a decoded sensor value to MQTT
    Publish { topic: String, payload: String },
    /// Write an encoded command frame to the serial port
    Write { frame: String },
    /// Message dropped; the reason has already been logged
    Ignored,
}

/// Routes wire traffic to the fixed device and sensor rosters.
///
/// The dispatcher is the only owner of the rosters. Serial frames are matched
/// to sensors by their 2-character code, MQTT commands to devices by
/// (case-normalized) name. A failed decode or encode is terminal for that
/// message; the next one is processed independently.
pub struct Dispatcher {
    sensors: Vec<Sensor>,
    devices: Vec<Device>,
    root_topic: String,
    command_separator: char,
}

impl Dispatcher {
    /// Build the fixed roster. Entities live for the process lifetime and are
    /// only ever mutated in place by successful dispatch calls.
    pub fn new(root_topic: impl Into<String>, command_separator: char) -> Self {
        Self {
            sensors: vec![
                Sensor::battery(),
                Sensor::id_tag(),
                Sensor::ranging_front(),
                Sensor::ranging_side(),
            ],
            devices: vec![
                Device::camera_servo(),
                Device::wheels(),
                Device::flashlight(),
                Device::uv_flashlight(),
            ],
            root_topic: root_topic.into(),
            command_separator,
        }
    }

    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn sensor(&self, code: &str) -> Option<&Sensor> {
        self.sensors.iter().find(|s| s.code() == code)
    }

    pub fn device(&self, name: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.name() == name)
    }

    /// Route one raw serial line to the matching sensor.
    ///
    /// Returns the publish to perform, or `Ignored` for malformed frames,
    /// unknown codes, failed decodes and no-value decodes.
    pub fn dispatch_serial_frame(&mut self, raw: &str) -> DispatchOutcome {
        let frame = raw.trim();
        if frame.is_empty() {
            return DispatchOutcome::Ignored;
        }

        let Some(code) = frame_code(frame) else {
            warn!(frame = %frame, "serial frame is missing its terminator");
            return DispatchOutcome::Ignored;
        };

        let topic = join_topic(&self.root_topic, code);
        let Some(sensor) = self.sensors.iter_mut().find(|s| s.code() == code) else {
            warn!(frame = %frame, "serial frame with unrecognized sensor code");
            return DispatchOutcome::Ignored;
        };

        match sensor.decode_frame(frame) {
            Ok(Some(value)) => {
                let payload = match serde_json::to_string_pretty(&value) {
                    Ok(payload) => payload,
                    Err(e) => {
                        error!(code = %sensor.code(), error = %e, "failed to serialize sensor value");
                        return DispatchOutcome::Ignored;
                    }
                };
                debug!(code = %sensor.code(), topic = %topic, "sensor frame decoded");
                DispatchOutcome::Publish { topic, payload }
            }
            Ok(None) => DispatchOutcome::Ignored,
            Err(e) => {
                warn!(code = %sensor.code(), frame = %frame, error = %e, "sensor frame rejected");
                DispatchOutcome::Ignored
            }
        }
    }

    /// Route one MQTT command payload to the matching device.
    ///
    /// Returns the serial frame to write, or `Ignored` for split failures,
    /// unknown devices and rejected values.
    pub fn dispatch_mqtt_command(&mut self, payload: &str) -> DispatchOutcome {
        let (name, value) = match split_command(payload, self.command_separator) {
            Ok(parts) => parts,
            Err(e) => {
                error!(payload = %payload, error = %e, "failed to split command payload");
                return DispatchOutcome::Ignored;
            }
        };

        let Some(device) = self.devices.iter_mut().find(|d| d.name() == name) else {
            warn!(device = %name, "command for a device not in the roster");
            return DispatchOutcome::Ignored;
        };

        match device.encode_command(value) {
            Ok(frame) => {
                debug!(device = %name, frame = %frame, "command encoded");
                DispatchOutcome::Write { frame }
            }
            Err(e) => {
                warn!(device = %name, value = %value, error = %e, "command rejected");
                DispatchOutcome::Ignored
            }
        }
    }
}
