//! Configuration loading and validation tests.
//!
//! Serialized because the loader reads process environment variables.

use std::path::Path;

use invoicer::config::get_configuration;
use invoicer::error::AppError;
use serial_test::serial;

fn write_config(dir: &tempfile::TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("invoicer.toml");
    std::fs::write(&path, contents).expect("Failed to write config file");
    path
}

#[test]
#[serial]
fn defaults_apply_when_file_missing() {
    let settings = get_configuration(Path::new("/definitely/not/here/invoicer.toml"))
        .expect("Defaults should load without a file");

    assert_eq!(settings.log_level, "warn");
    assert_eq!(settings.business.name, "My Business");
    assert!(settings.business.address_lines.is_empty());
    assert_eq!(settings.billing.default_hourly_rate, 85.0);
    assert_eq!(settings.billing.default_tax_rate, 0.1025);
    assert_eq!(settings.storage.db_path, Path::new("data/invoicer.db"));
    assert_eq!(settings.storage.output_dir, Path::new("invoices"));
}

#[test]
#[serial]
fn file_values_override_defaults() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = write_config(
        &dir,
        r#"
log_level = "info"

[business]
name = "Bluebird Handyman"
phone = "555-0199"
address_lines = ["9 Workshop Way", "Springfield"]

[billing]
default_hourly_rate = 95.0
default_tax_rate = 0.08

[storage]
db_path = "data/test.db"
output_dir = "out"
"#,
    );

    let settings = get_configuration(&path).expect("Failed to load configuration");

    assert_eq!(settings.log_level, "info");
    assert_eq!(settings.business.name, "Bluebird Handyman");
    assert_eq!(settings.business.phone, "555-0199");
    assert_eq!(
        settings.business.address_lines,
        vec!["9 Workshop Way".to_string(), "Springfield".to_string()]
    );
    assert_eq!(settings.billing.default_hourly_rate, 95.0);
    assert_eq!(settings.billing.default_tax_rate, 0.08);
    assert_eq!(settings.storage.db_path, Path::new("data/test.db"));
    assert_eq!(settings.storage.output_dir, Path::new("out"));
    // Unset sections keep their defaults
    assert_eq!(settings.business.email, "");
}

#[test]
#[serial]
fn environment_overrides_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = write_config(
        &dir,
        r#"
[billing]
default_hourly_rate = 95.0
"#,
    );

    std::env::set_var("INVOICER_BILLING__DEFAULT_HOURLY_RATE", "120.5");
    let result = get_configuration(&path);
    std::env::remove_var("INVOICER_BILLING__DEFAULT_HOURLY_RATE");

    let settings = result.expect("Failed to load configuration");
    assert_eq!(settings.billing.default_hourly_rate, 120.5);
}

#[test]
#[serial]
fn environment_address_lines_split_on_commas() {
    std::env::set_var(
        "INVOICER_BUSINESS__ADDRESS_LINES",
        "9 Workshop Way,Springfield",
    );
    std::env::set_var("INVOICER_BUSINESS__NAME", "Smith, Sons & Co.");
    let result = get_configuration(Path::new("/definitely/not/here/invoicer.toml"));
    std::env::remove_var("INVOICER_BUSINESS__ADDRESS_LINES");
    std::env::remove_var("INVOICER_BUSINESS__NAME");

    let settings = result.expect("Failed to load configuration");
    assert_eq!(
        settings.business.address_lines,
        vec!["9 Workshop Way".to_string(), "Springfield".to_string()]
    );
    // Only the list key splits; a comma elsewhere stays one value
    assert_eq!(settings.business.name, "Smith, Sons & Co.");
}

#[test]
#[serial]
fn rejects_tax_rate_outside_fraction_range() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    // 8.75 looks like a percentage; the loader wants a fraction
    let path = write_config(
        &dir,
        r#"
[billing]
default_tax_rate = 8.75
"#,
    );

    let err = get_configuration(&path).expect_err("Percentage-style tax rate should be rejected");
    assert!(matches!(err, AppError::ConfigError(_)));
}

#[test]
#[serial]
fn rejects_negative_hourly_rate() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = write_config(
        &dir,
        r#"
[billing]
default_hourly_rate = -1.0
"#,
    );

    let err = get_configuration(&path).expect_err("Negative hourly rate should be rejected");
    assert!(matches!(err, AppError::ConfigError(_)));
}
