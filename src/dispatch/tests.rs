use super::*;
use crate::sensor::SensorValue;
use std::collections::HashSet;

const ROOT: &str = "/python/mqtt/robot/1/";

fn dispatcher() -> Dispatcher {
    Dispatcher::new(ROOT, '~')
}

#[test]
fn test_serial_battery_frame_publishes() {
    let mut dispatcher = dispatcher();
    let outcome = dispatcher.dispatch_serial_frame("SA075E");

    let DispatchOutcome::Publish { topic, payload } = outcome else {
        panic!("expected a publish, got {:?}", outcome);
    };
    assert_eq!(topic, "/python/mqtt/robot/1/SA");

    // Pretty-printing is not a contract; compare the parsed value
    let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
    assert_eq!(value, serde_json::json!("075"));
}

#[test]
fn test_serial_ranging_frame_publishes_series() {
    let mut dispatcher = dispatcher();
    let outcome = dispatcher.dispatch_serial_frame("SI001002003004005E");

    let DispatchOutcome::Publish { topic, payload } = outcome else {
        panic!("expected a publish, got {:?}", outcome);
    };
    assert_eq!(topic, "/python/mqtt/robot/1/SI");

    let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
    assert_eq!(
        value,
        serde_json::json!(["001", "002", "003", "004", "005"])
    );
}

#[test]
fn test_serial_frame_trims_line_ending() {
    let mut dispatcher = dispatcher();
    let outcome = dispatcher.dispatch_serial_frame("SA075E\r\n");
    assert!(matches!(outcome, DispatchOutcome::Publish { .. }));
}

#[test]
fn test_serial_frame_unknown_code_is_ignored() {
    let mut dispatcher = dispatcher();
    assert_eq!(
        dispatcher.dispatch_serial_frame("ZZ123E"),
        DispatchOutcome::Ignored
    );
}

#[test]
fn test_serial_frame_missing_terminator_is_ignored() {
    let mut dispatcher = dispatcher();
    assert_eq!(
        dispatcher.dispatch_serial_frame("SA075"),
        DispatchOutcome::Ignored
    );
}

#[test]
fn test_serial_frame_bad_payload_is_ignored_and_state_unchanged() {
    let mut dispatcher = dispatcher();
    assert_eq!(
        dispatcher.dispatch_serial_frame("SA07xE"),
        DispatchOutcome::Ignored
    );
    assert_eq!(dispatcher.sensor("SA").unwrap().value(), None);
}

#[test]
fn test_id_tag_frame_publishes_nothing_but_counts_as_seen() {
    let mut dispatcher = dispatcher();
    let before = dispatcher.sensor("SF").unwrap().last_changed();

    assert_eq!(
        dispatcher.dispatch_serial_frame("SF12AB34E"),
        DispatchOutcome::Ignored
    );
    assert!(dispatcher.sensor("SF").unwrap().last_changed() >= before);
}

#[test]
fn test_repeat_serial_frame_updates_timestamp_with_identical_value() {
    let mut dispatcher = dispatcher();

    dispatcher.dispatch_serial_frame("SA075E");
    let first_value = dispatcher.sensor("SA").unwrap().value().cloned();
    let first_seen = dispatcher.sensor("SA").unwrap().last_changed();

    dispatcher.dispatch_serial_frame("SA075E");
    let sensor = dispatcher.sensor("SA").unwrap();
    assert_eq!(sensor.value().cloned(), first_value);
    assert_eq!(
        sensor.value(),
        Some(&SensorValue::Single("075".to_string()))
    );
    assert!(sensor.last_changed() >= first_seen);
}

#[test]
fn test_mqtt_wheels_command_writes_frame() {
    let mut dispatcher = dispatcher();
    assert_eq!(
        dispatcher.dispatch_mqtt_command("WHEELS~100;-100"),
        DispatchOutcome::Write {
            frame: "ST0+00100-00100E".to_string()
        }
    );
}

#[test]
fn test_mqtt_camera_command_writes_frame() {
    let mut dispatcher = dispatcher();
    assert_eq!(
        dispatcher.dispatch_mqtt_command("CAMERA_SERVO~-40"),
        DispatchOutcome::Write {
            frame: "SS1300000000000E".to_string()
        }
    );
}

#[test]
fn test_mqtt_command_name_is_case_insensitive() {
    let mut dispatcher = dispatcher();
    assert_eq!(
        dispatcher.dispatch_mqtt_command("flashlight~50"),
        DispatchOutcome::Write {
            frame: "SU++00005000000E".to_string()
        }
    );
}

#[test]
fn test_mqtt_command_invalid_value_is_ignored_and_state_unchanged() {
    let mut dispatcher = dispatcher();
    let before = dispatcher.device("FLASHLIGHT").unwrap().last_changed();

    assert_eq!(
        dispatcher.dispatch_mqtt_command("FLASHLIGHT~xyz"),
        DispatchOutcome::Ignored
    );

    let device = dispatcher.device("FLASHLIGHT").unwrap();
    assert_eq!(device.last_changed(), before);
}

#[test]
fn test_mqtt_command_out_of_range_is_ignored() {
    let mut dispatcher = dispatcher();
    assert_eq!(
        dispatcher.dispatch_mqtt_command("WHEELS~150;0"),
        DispatchOutcome::Ignored
    );
}

#[test]
fn test_mqtt_command_unknown_device_is_ignored() {
    let mut dispatcher = dispatcher();
    assert_eq!(
        dispatcher.dispatch_mqtt_command("GRIPPER~1"),
        DispatchOutcome::Ignored
    );
}

#[test]
fn test_mqtt_command_split_failures_are_ignored() {
    let mut dispatcher = dispatcher();
    assert_eq!(
        dispatcher.dispatch_mqtt_command("WHEELS 100;-100"),
        DispatchOutcome::Ignored
    );
    assert_eq!(
        dispatcher.dispatch_mqtt_command("WHEELS~100~-100"),
        DispatchOutcome::Ignored
    );
}

#[test]
fn test_publish_topic_collapses_duplicate_slashes() {
    let mut dispatcher = Dispatcher::new("/robot//1/", '~');
    let DispatchOutcome::Publish { topic, .. } = dispatcher.dispatch_serial_frame("SA075E")
    else {
        panic!("expected a publish");
    };
    assert_eq!(topic, "/robot/1/SA");
}

#[test]
fn test_roster_codes_are_unique_within_each_role() {
    let dispatcher = dispatcher();

    let sensor_codes: HashSet<&str> = dispatcher.sensors().iter().map(|s| s.code()).collect();
    assert_eq!(sensor_codes.len(), dispatcher.sensors().len());

    let device_codes: HashSet<&str> = dispatcher.devices().iter().map(|d| d.code()).collect();
    assert_eq!(device_codes.len(), dispatcher.devices().len());
}
