use std::fmt;


/// Terminator character closing every serial frame.
pub const FRAME_TERMINATOR: char = 'E';

/// Secondary separator between the fields of a multi-field command value.
pub const FIELD_SEPARATOR: char = ';';

/// Errors from splitting an MQTT command payload
#[derive(Debug, Clone, PartialEq)]
pub enum SplitError {
    /// The payload contains no occurrence of the configured separator
    MissingSeparator(char),
    /// The payload contains more than one occurrence of the separator
    ExtraSeparator(char),
}

impl fmt::Display for SplitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitError::MissingSeparator(sep) => {
                write!(f, "separator '{}' not found in payload", sep)
            }
            SplitError::ExtraSeparator(sep) => {
                write!(f, "more than one '{}' separator in payload", sep)
            }
        }
    }
}

impl std::error::Error for SplitError {}

/// Split an MQTT command payload into device name and value.
///
/// The payload must contain exactly one occurrence of `separator`. The name
/// part is normalized to uppercase so device lookup is case-insensitive; the
/// value part is passed through untouched.
pub fn split_command(payload: &str, separator: char) -> Result<(String, &str), SplitError> {
    let (name, value) = payload
        .split_once(separator)
        .ok_or(SplitError::MissingSeparator(separator))?;

    if value.contains(separator) {
        return Err(SplitError::ExtraSeparator(separator));
    }

    Ok((name.trim().to_ascii_uppercase(), value))
}

/// Extract the 2-character sensor code from a serial frame.
///
/// Returns `None` when the frame is too short or does not end with the frame
/// terminator; payload validation is left to the matched sensor.
pub fn frame_code(frame: &str) -> Option<&str> {
    if frame.len() < 3 || !frame.ends_with(FRAME_TERMINATOR) {
        return None;
    }
    frame.get(..2)
}

/// Format a magnitude as a 3-digit zero-padded wire field.
pub fn field3(value: u16) -> String {
    format!("{:03}", value)
}

/// Direction character for a signed power value.
pub fn direction_char(power: i16) -> char {
    if power >= 0 {
        '+'
    } else {
        '-'
    }
}

/// Join a root topic and a leaf segment, collapsing duplicate slashes.
pub fn join_topic(root: &str, leaf: &str) -> String {
    let mut topic = format!("{}{}", root, leaf);
    while topic.contains("//") {
        topic = topic.replace("//", "/");
    }
    topic
}

/// True if `s` is non-empty and consists only of ASCII digits.
pub fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
