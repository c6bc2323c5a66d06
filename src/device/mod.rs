use chrono::{DateTime, Utc};
use std::fmt;

use crate::codec::{direction_char, field3, FIELD_SEPARATOR};

#[cfg(test)]
mod tests;

/// Validation errors reported by a device encode
#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    /// The value (or one of its fields) is not a valid integer
    NotNumeric(String),
    /// The value is numeric but outside the device's declared range
    OutOfRange { value: i64, min: i64, max: i64 },
    /// A multi-field value is missing the secondary separator or has extra fields
    MissingField,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::NotNumeric(raw) => write!(f, "value '{}' is not numeric", raw),
            CommandError::OutOfRange { value, min, max } => {
                write!(f, "value {} outside [{}, {}]", value, min, max)
            }
            CommandError::MissingField => {
                write!(f, "expected exactly two '{}'-separated fields", FIELD_SEPARATOR)
            }
        }
    }
}

impl std::error::Error for CommandError {}

/// Stored state behind each device variant
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceState {
    /// Differential drive, signed power per side in [-100, 100]
    Wheels { left_power: i16, right_power: i16 },
    /// Steerable camera mount, angle from vertical in [-50, 50]
    CameraServo { angle: i16 },
    /// Visible-light source, level in [0, 100]
    Flashlight { level: u8 },
    /// UV source, level in [0, 100]
    UvFlashlight { level: u8 },
}

/// A commandable actuator on the robot.
///
/// Each device validates an MQTT-supplied value and encodes it into the
/// controller's fixed-width command frame. State and `last_changed` are
/// updated only when encoding succeeds; a rejected value leaves both alone.
#[derive(Debug, Clone)]
pub struct Device {
    name: &'static str,
    code: &'static str,
    state: DeviceState,
    last_changed: DateTime<Utc>,
}

impl Device {
    pub fn wheels() -> Self {
        Self {
            name: "WHEELS",
            code: "ST",
            state: DeviceState::Wheels {
                left_power: 0,
                right_power: 0,
            },
            last_changed: Utc::now(),
        }
    }

    pub fn camera_servo() -> Self {
        Self {
            name: "CAMERA_SERVO",
            code: "SS",
            state: DeviceState::CameraServo { angle: 0 },
            last_changed: Utc::now(),
        }
    }

    pub fn flashlight() -> Self {
        Self {
            name: "FLASHLIGHT",
            code: "SL",
            state: DeviceState::Flashlight { level: 0 },
            last_changed: Utc::now(),
        }
    }

    pub fn uv_flashlight() -> Self {
        Self {
            name: "UV_FLASHLIGHT",
            code: "SU",
            state: DeviceState::UvFlashlight { level: 0 },
            last_changed: Utc::now(),
        }
    }

    /// MQTT-facing device name (uppercase)
    pub fn name(&self) -> &str {
        self.name
    }

    /// Short identifier, unique within the device roster
    pub fn code(&self) -> &str {
        self.code
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Timestamp of the last successful encode
    pub fn last_changed(&self) -> DateTime<Utc> {
        self.last_changed
    }

    /// Validate an MQTT-supplied value and encode the serial command frame.
    pub fn encode_command(&mut self, value: &str) -> Result<String, CommandError> {
        let (frame, state) = match self.state {
            DeviceState::Wheels { .. } => encode_wheels(value)?,
            DeviceState::CameraServo { .. } => encode_camera_servo(value)?,
            DeviceState::Flashlight { .. } => encode_flashlight(value)?,
            DeviceState::UvFlashlight { .. } => encode_uv_flashlight(value)?,
        };

        self.state = state;
        self.last_changed = Utc::now();
        Ok(frame)
    }
}

/// Parse one numeric field and check it against the device's range.
fn parse_field(raw: &str, min: i64, max: i64) -> Result<i64, CommandError> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| CommandError::NotNumeric(raw.to_string()))?;

    if value < min || value > max {
        return Err(CommandError::OutOfRange { value, min, max });
    }

    Ok(value)
}

fn encode_wheels(value: &str) -> Result<(String, DeviceState), CommandError> {
    let (left_raw, right_raw) = value
        .split_once(FIELD_SEPARATOR)
        .ok_or(CommandError::MissingField)?;
    if right_raw.contains(FIELD_SEPARATOR) {
        return Err(CommandError::MissingField);
    }

    let left = parse_field(left_raw, -100, 100)? as i16;
    let right = parse_field(right_raw, -100, 100)? as i16;

    let frame = format!(
        "ST0{}00{}{}00{}E",
        direction_char(left),
        field3(left.unsigned_abs()),
        direction_char(right),
        field3(right.unsigned_abs()),
    );

    Ok((
        frame,
        DeviceState::Wheels {
            left_power: left,
            right_power: right,
        },
    ))
}

fn encode_camera_servo(value: &str) -> Result<(String, DeviceState), CommandError> {
    let angle = parse_field(value, -50, 50)? as i16;

    // 90 - angle maps the [-50, 50] input onto the servo's [40, 140] wire range
    let magnitude = (90 - angle) as u16;
    let frame = format!("SS{}0000000000E", field3(magnitude));

    Ok((frame, DeviceState::CameraServo { angle }))
}

fn encode_flashlight(value: &str) -> Result<(String, DeviceState), CommandError> {
    let level = parse_field(value, 0, 100)? as u8;
    let frame = format!("SU++000{}00000E", field3(level as u16));

    Ok((frame, DeviceState::Flashlight { level }))
}

fn encode_uv_flashlight(value: &str) -> Result<(String, DeviceState), CommandError> {
    let level = parse_field(value, 0, 100)? as u8;
    let frame = format!("SU++{}00000000E", field3(level as u16));

    Ok((frame, DeviceState::UvFlashlight { level }))
}
