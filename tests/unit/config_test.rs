//! Tests for configuration validation

use prometheus_process_sim::config::{SimulatorConfig, DEFAULT_MAX_PROCESSES};

#[test]
fn test_default_config_is_valid() {
    let cfg = SimulatorConfig::default();
    assert_eq!(cfg.max_processes, DEFAULT_MAX_PROCESSES);
    assert_eq!(cfg.init_pid, "init");
    assert_eq!(cfg.error_token, "error");
    assert_eq!(cfg.separator, " ");
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_config_invalid_max_processes() {
    let invalid = SimulatorConfig {
        max_processes: 0,
        ..SimulatorConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_config_invalid_init_pid() {
    for pid in ["", "in it"] {
        let invalid = SimulatorConfig {
            init_pid: pid.to_string(),
            ..SimulatorConfig::default()
        };
        assert!(invalid.validate().is_err(), "accepted {pid:?}");
    }
}

#[test]
fn test_config_invalid_error_token() {
    let invalid = SimulatorConfig {
        error_token: String::new(),
        ..SimulatorConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_config_from_json_fills_defaults() {
    let json = r#"{ "max_processes": 8 }"#;
    let config = SimulatorConfig::from_json_str(json).unwrap();
    assert_eq!(config.max_processes, 8);
    assert_eq!(config.init_pid, "init");
}

#[test]
fn test_config_from_json_rejects_invalid() {
    assert!(SimulatorConfig::from_json_str(r#"{ "max_processes": 0 }"#).is_err());
    assert!(SimulatorConfig::from_json_str("not json").is_err());
}

#[test]
fn test_config_from_lookup() {
    let config = SimulatorConfig::from_lookup(|key| match key {
        "PROCSIM_MAX_PROCESSES" => Some(" 16 ".to_string()),
        "PROCSIM_INIT_PID" => Some("root".to_string()),
        _ => None,
    })
    .unwrap();
    assert_eq!(config.max_processes, 16);
    assert_eq!(config.init_pid, "root");

    let err = SimulatorConfig::from_lookup(|key| {
        (key == "PROCSIM_MAX_PROCESSES").then(|| "lots".to_string())
    });
    assert!(err.is_err());
}
