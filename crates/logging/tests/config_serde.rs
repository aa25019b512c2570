//! Serialisation of [`LogConfig`] for applications that persist it.

#![cfg(feature = "serde")]

use logging::LogConfig;

#[test]
fn config_round_trips_through_json() {
    let config = LogConfig::from_verbose_level(2);
    let json = serde_json::to_string(&config).expect("serialise config");
    let parsed: LogConfig = serde_json::from_str(&json).expect("parse config");
    assert_eq!(parsed, config);
}

#[test]
fn missing_fields_fall_back_to_defaults() {
    let parsed: LogConfig = serde_json::from_str(r#"{"verbose": 1}"#).expect("parse config");
    assert_eq!(parsed.verbose, 1);
    assert_eq!(parsed.env_var, "FILECODEC_LOG");
    assert!(parsed.with_target);
}
