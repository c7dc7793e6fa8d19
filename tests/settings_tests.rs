use heading_reckoner::{FusionError, FusionPipeline, FusionSettings, GravityCompensation, SensorSample};
use nalgebra::Vector3;

/// Settings load from a host configuration file, missing keys take defaults
#[test]
fn test_settings_from_toml() {
    let text = r#"
        movement_threshold = 0.25
        gravity_compensation = "rotated"

        [magnetometer_calibration]
        hard_iron = [12.5, -4.0, 30.0]
    "#;

    let settings: FusionSettings = toml::from_str(text).unwrap();

    assert_eq!(settings.movement_threshold, 0.25);
    assert_eq!(settings.gravity_compensation, GravityCompensation::Rotated);
    assert_eq!(settings.gravity, 9.80665);
    assert_eq!(settings.min_horizontal_field, 0.1);
    assert!(settings.accelerometer_calibration.is_none());

    let calibration = settings.magnetometer_calibration.unwrap();
    assert_eq!(calibration.hard_iron, Vector3::new(12.5, -4.0, 30.0));
    assert!(settings.validate().is_ok());
}

#[test]
fn test_empty_toml_is_default() {
    let settings: FusionSettings = toml::from_str("").unwrap();
    assert_eq!(settings, FusionSettings::default());
}

#[test]
fn test_unknown_gravity_model_is_rejected() {
    let result: Result<FusionSettings, _> = toml::from_str(r#"gravity_compensation = "magic""#);
    assert!(result.is_err());
}

#[test]
fn test_loaded_settings_are_validated() {
    let settings: FusionSettings = toml::from_str("free_fall_ratio = 1.5").unwrap();

    let result = FusionPipeline::with_settings(settings, 0);
    assert!(matches!(result, Err(FusionError::InvalidSettings(_))));
}

/// A configured hard iron offset is removed before the heading is computed
#[test]
fn test_hard_iron_offset_from_config() {
    let settings: FusionSettings = toml::from_str(
        r#"
        [magnetometer_calibration]
        hard_iron = [30.0, 0.0, 0.0]
        "#,
    )
    .unwrap();
    let mut pipeline = FusionPipeline::with_settings(settings, 0).unwrap();

    // Raw field looks like north-east, corrected field is due north
    pipeline.feed(SensorSample::accelerometer(Vector3::new(0.0, 0.0, 9.80665), 10));
    let output = pipeline
        .feed(SensorSample::magnetometer(Vector3::new(30.0, 22.0, -42.0), 10))
        .unwrap();

    assert!(output.azimuth_degrees.abs() < 1e-3, "azimuth {}", output.azimuth_degrees);
}
