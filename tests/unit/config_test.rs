//! Tests for configuration validation

use std::collections::HashMap;

use resource_queue::config::{QueueConfig, JOB_TYPES_ENV, TOTAL_UNITS_ENV};

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn test_queue_config_validation() {
    let valid = QueueConfig::new(10.0)
        .with_job_type("OpenAI", 0.0)
        .with_job_type("Llama3.2", 3.0);
    assert!(valid.validate().is_ok());

    // Oversized types are legal config; enqueue rejects them.
    assert!(QueueConfig::new(10.0).with_job_type("huge", 50.0).validate().is_ok());
}

#[test]
fn test_queue_config_invalid_total_units() {
    assert!(QueueConfig::new(0.0).validate().is_err());
    assert!(QueueConfig::new(-5.0).validate().is_err());
    assert!(QueueConfig::new(f64::NAN).validate().is_err());
    assert!(QueueConfig::new(f64::INFINITY).validate().is_err());
}

#[test]
fn test_queue_config_invalid_job_units() {
    let invalid = QueueConfig::new(10.0).with_job_type("broken", -1.0);
    let err = invalid.validate().unwrap_err();
    assert!(err.contains("broken"), "{err}");
}

#[test]
fn test_queue_config_from_json() {
    let cfg = QueueConfig::from_json_str(
        r#"{ "total_units": 10, "job_types": { "OpenAI": 0, "Llama3.2": 3, "GPT-J": 5 } }"#,
    )
    .unwrap();
    assert_eq!(cfg.total_units, 10.0);
    assert_eq!(cfg.job_types.len(), 3);
    assert_eq!(cfg.job_types.job_type_units("GPT-J"), Some(5.0));
}

#[test]
fn test_queue_config_from_json_defaults_job_types() {
    let cfg = QueueConfig::from_json_str(r#"{ "total_units": 4.5 }"#).unwrap();
    assert!(cfg.job_types.is_empty());
}

#[test]
fn test_queue_config_from_json_rejects_invalid() {
    assert!(QueueConfig::from_json_str("{").unwrap_err().starts_with("parse error"));
    assert!(QueueConfig::from_json_str(r#"{ "total_units": 0 }"#).is_err());
}

#[test]
fn test_queue_config_from_lookup() {
    let cfg = QueueConfig::from_lookup(lookup(&[
        (TOTAL_UNITS_ENV, " 10 "),
        (JOB_TYPES_ENV, "OpenAI=0,Claude 3.7 Sonnet=0,Llama3.2=3"),
    ]))
    .unwrap();
    assert_eq!(cfg.total_units, 10.0);
    assert_eq!(cfg.job_types.job_type_units("Claude 3.7 Sonnet"), Some(0.0));
    assert_eq!(cfg.job_types.job_type_units("Llama3.2"), Some(3.0));
}

#[test]
fn test_queue_config_from_lookup_errors() {
    let err = QueueConfig::from_lookup(lookup(&[])).unwrap_err();
    assert!(err.contains(TOTAL_UNITS_ENV), "{err}");

    assert!(QueueConfig::from_lookup(lookup(&[(TOTAL_UNITS_ENV, "ten")])).is_err());
    assert!(QueueConfig::from_lookup(lookup(&[
        (TOTAL_UNITS_ENV, "10"),
        (JOB_TYPES_ENV, "Llama3.2:3"),
    ]))
    .is_err());

    // Job types are optional.
    let cfg = QueueConfig::from_lookup(lookup(&[(TOTAL_UNITS_ENV, "2")])).unwrap();
    assert!(cfg.job_types.is_empty());
}
