use super::*;

#[test]
fn test_wheels_encode_mixed_directions() {
    let mut wheels = Device::wheels();
    let frame = wheels.encode_command("100;-100").unwrap();
    assert_eq!(frame, "ST0+00100-00100E");
    assert_eq!(
        wheels.state(),
        &DeviceState::Wheels {
            left_power: 100,
            right_power: -100
        }
    );
}

#[test]
fn test_wheels_encode_zero_is_positive() {
    let mut wheels = Device::wheels();
    let frame = wheels.encode_command("000;000").unwrap();
    assert_eq!(frame, "ST0+00000+00000E");
}

#[test]
fn test_wheels_encode_accepts_explicit_plus_sign() {
    let mut wheels = Device::wheels();
    let frame = wheels.encode_command("+100;-50").unwrap();
    assert_eq!(frame, "ST0+00100-00050E");
}

#[test]
fn test_wheels_rejects_out_of_range() {
    let mut wheels = Device::wheels();
    let before = wheels.last_changed();

    let result = wheels.encode_command("150;0");
    assert_eq!(
        result,
        Err(CommandError::OutOfRange {
            value: 150,
            min: -100,
            max: 100
        })
    );

    // Stored state and timestamp untouched on rejection
    assert_eq!(
        wheels.state(),
        &DeviceState::Wheels {
            left_power: 0,
            right_power: 0
        }
    );
    assert_eq!(wheels.last_changed(), before);
}

#[test]
fn test_wheels_rejects_missing_field() {
    let mut wheels = Device::wheels();
    assert_eq!(wheels.encode_command("100"), Err(CommandError::MissingField));
    assert_eq!(
        wheels.encode_command("1;2;3"),
        Err(CommandError::MissingField)
    );
}

#[test]
fn test_camera_servo_encode_negative_angle() {
    let mut servo = Device::camera_servo();
    // magnitude = 90 - (-40) = 130
    let frame = servo.encode_command("-40").unwrap();
    assert_eq!(frame, "SS1300000000000E");
    assert_eq!(servo.state(), &DeviceState::CameraServo { angle: -40 });
}

#[test]
fn test_camera_servo_encode_range_boundaries() {
    let mut servo = Device::camera_servo();
    assert_eq!(servo.encode_command("50").unwrap(), "SS0400000000000E");
    assert_eq!(servo.encode_command("-50").unwrap(), "SS1400000000000E");
    assert_eq!(servo.encode_command("0").unwrap(), "SS0900000000000E");
}

#[test]
fn test_camera_servo_rejects_out_of_range() {
    let mut servo = Device::camera_servo();
    assert!(matches!(
        servo.encode_command("51"),
        Err(CommandError::OutOfRange { value: 51, .. })
    ));
    assert_eq!(servo.state(), &DeviceState::CameraServo { angle: 0 });
}

#[test]
fn test_flashlight_encode() {
    let mut flashlight = Device::flashlight();
    let frame = flashlight.encode_command("100").unwrap();
    assert_eq!(frame, "SU++00010000000E");
    assert_eq!(flashlight.state(), &DeviceState::Flashlight { level: 100 });
}

#[test]
fn test_flashlight_rejects_non_numeric() {
    let mut flashlight = Device::flashlight();
    let result = flashlight.encode_command("xyz");
    assert_eq!(result, Err(CommandError::NotNumeric("xyz".to_string())));
    assert_eq!(flashlight.state(), &DeviceState::Flashlight { level: 0 });
}

#[test]
fn test_flashlight_rejects_negative_level() {
    let mut flashlight = Device::flashlight();
    assert!(matches!(
        flashlight.encode_command("-1"),
        Err(CommandError::OutOfRange { value: -1, .. })
    ));
}

#[test]
fn test_uv_flashlight_encode() {
    let mut uv = Device::uv_flashlight();
    let frame = uv.encode_command("7").unwrap();
    assert_eq!(frame, "SU++00700000000E");
    assert_eq!(uv.state(), &DeviceState::UvFlashlight { level: 7 });
}

#[test]
fn test_all_command_frames_are_sixteen_bytes() {
    assert_eq!(Device::wheels().encode_command("100;-100").unwrap().len(), 16);
    assert_eq!(Device::camera_servo().encode_command("-40").unwrap().len(), 16);
    assert_eq!(Device::flashlight().encode_command("5").unwrap().len(), 16);
    assert_eq!(Device::uv_flashlight().encode_command("5").unwrap().len(), 16);
}

#[test]
fn test_successful_encode_updates_last_changed() {
    let mut servo = Device::camera_servo();
    let before = servo.last_changed();
    servo.encode_command("10").unwrap();
    assert!(servo.last_changed() >= before);
    assert_eq!(servo.state(), &DeviceState::CameraServo { angle: 10 });
}
