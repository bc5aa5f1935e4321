use super::*;

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyS0".to_string(),
            baud_rate: 38400,
            timeout_secs: 3,
            decode_retries: 0,
        }
    }
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            noise_floor: crate::sensor::normalize::DEFAULT_NOISE_FLOOR,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            circuit_count: 7,
            phase: Phase::Single,
            ac_frequency: 50.0,
        }
    }
}

impl Default for InfluxConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: "influxdb".to_string(),
            port: 8086,
            database: "powerpi".to_string(),
            username: "powerpi".to_string(),
            password: "powerpi".to_string(),
            measurement: "power".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            file: None,
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}
