#![cfg(test)]

use super::config::*;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.serial.port, "/dev/ttyS0");
    assert_eq!(config.serial.baud_rate, 38400);
    assert_eq!(config.serial.timeout_secs, 3);
    assert_eq!(config.metrics.circuit_count, 7);
    assert_eq!(config.metrics.phase, Phase::Single);
    assert!((config.metrics.ac_frequency - 50.0).abs() < f64::EPSILON);
    assert!(!config.influxdb.enabled);
}

#[test]
fn test_config_validation() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    // Test empty port
    config.serial.port = String::new();
    assert!(config.validate().is_err());

    // Reset and test zero timeout
    config = Config::default();
    config.serial.timeout_secs = 0;
    assert!(config.validate().is_err());

    // Fewer circuits than phases
    config = Config::default();
    config.metrics.phase = Phase::Three;
    config.metrics.circuit_count = 2;
    assert!(config.validate().is_err());
}

#[test]
fn test_config_serialization() {
    let config = Config::default();
    let yaml = serde_yaml::to_string(&config).unwrap();
    let deserialized: Config = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(config.serial.port, deserialized.serial.port);
    assert_eq!(config.metrics, deserialized.metrics);
}
