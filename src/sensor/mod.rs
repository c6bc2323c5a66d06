use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::codec::all_digits;


/// Decode errors for a sensor frame payload
#[derive(Debug, Clone, PartialEq)]
pub enum FrameError {
    /// Payload has the wrong length for this sensor
    PayloadLength { expected: usize, actual: usize },
    /// Payload contains non-digit characters
    PayloadNotNumeric(String),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::PayloadLength { expected, actual } => {
                write!(f, "payload length {} (expected {})", actual, expected)
            }
            FrameError::PayloadNotNumeric(payload) => {
                write!(f, "payload '{}' contains non-digit characters", payload)
            }
        }
    }
}

impl std::error::Error for FrameError {}

/// A decoded sensor value, serialized as-is into the MQTT publish payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensorValue {
    /// Single 3-digit reading (battery charge)
    Single(String),
    /// Ordered 3-digit readings from a ranging array
    Series(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorKind {
    Battery,
    RangingFront,
    RangingSide,
    IdTag,
}

/// A telemetry source on the robot, keyed by its 2-character frame code.
///
/// The stored value and `last_changed` are updated only when a decode
/// succeeds.
#[derive(Debug, Clone)]
pub struct Sensor {
    code: &'static str,
    kind: SensorKind,
    value: Option<SensorValue>,
    last_changed: DateTime<Utc>,
}

impl Sensor {
    pub fn battery() -> Self {
        Self::new("SA", SensorKind::Battery)
    }

    pub fn id_tag() -> Self {
        Self::new("SF", SensorKind::IdTag)
    }

    pub fn ranging_front() -> Self {
        Self::new("SI", SensorKind::RangingFront)
    }

    pub fn ranging_side() -> Self {
        Self::new("SU", SensorKind::RangingSide)
    }

    fn new(code: &'static str, kind: SensorKind) -> Self {
        Self {
            code,
            kind,
            value: None,
            last_changed: Utc::now(),
        }
    }

    /// Frame code, unique within the sensor roster
    pub fn code(&self) -> &str {
        self.code
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    /// Last successfully decoded value, if any
    pub fn value(&self) -> Option<&SensorValue> {
        self.value.as_ref()
    }

    /// Timestamp of the last successful decode
    pub fn last_changed(&self) -> DateTime<Utc> {
        self.last_changed
    }

    /// Decode a well-formed frame addressed to this sensor.
    ///
    /// `frame` is the full frame including code and terminator; the caller
    /// has already verified both. The identification tag decodes to no value
    /// by design (the controller emits `SF` frames but no payload format is
    /// defined for them); its decode still counts as a success and bumps
    /// `last_changed`.
    pub fn decode_frame(&mut self, frame: &str) -> Result<Option<SensorValue>, FrameError> {
        let payload = frame
            .get(2..frame.len().saturating_sub(1))
            .unwrap_or_default();

        let value = match self.kind {
            SensorKind::Battery => {
                let digits = check_payload(payload, 3)?;
                Some(SensorValue::Single(digits.to_string()))
            }
            SensorKind::RangingFront | SensorKind::RangingSide => {
                let digits = check_payload(payload, 15)?;
                let readings = (0..5)
                    .map(|i| digits[i * 3..i * 3 + 3].to_string())
                    .collect();
                Some(SensorValue::Series(readings))
            }
            SensorKind::IdTag => None,
        };

        if let Some(value) = &value {
            self.value = Some(value.clone());
        }
        self.last_changed = Utc::now();
        Ok(value)
    }
}

/// Verify a frame payload is exactly `expected` digits.
fn check_payload(payload: &str, expected: usize) -> Result<&str, FrameError> {
    if payload.len() != expected {
        return Err(FrameError::PayloadLength {
            expected,
            actual: payload.len(),
        });
    }
    if !all_digits(payload) {
        return Err(FrameError::PayloadNotNumeric(payload.to_string()));
    }
    Ok(payload)
}
