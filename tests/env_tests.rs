// Credential loading against a mutated process environment; serialized
// because the environment is process-global.

use inspections::config::{Credentials, REQUIRED_VARS};
use inspections::runner;
use serial_test::serial;
use std::env;
use std::path::Path;

fn set_all_required() {
    for name in REQUIRED_VARS {
        unsafe { env::set_var(name, "test-value") };
    }
}

fn clear_all() {
    for name in REQUIRED_VARS {
        unsafe { env::remove_var(name) };
    }
    unsafe { env::remove_var("OPENAI_API_KEY") };
}

#[test]
#[serial]
fn test_all_required_vars_present() {
    set_all_required();
    let credentials = Credentials::from_env().expect("credentials");
    assert_eq!(credentials.s3_bucket_name, "test-value");
    assert_eq!(credentials.s3_file_name, "test-value");
    assert!(credentials.openai_api_key.is_none());
    clear_all();
}

#[test]
#[serial]
fn test_missing_vars_are_all_named() {
    set_all_required();
    unsafe { env::remove_var("S3_BUCKET_NAME") };
    unsafe { env::remove_var("GEOCODIO_API_KEY") };

    let err = Credentials::from_env().expect_err("should fail");
    let message = err.to_string();
    assert!(message.contains("S3_BUCKET_NAME"));
    assert!(message.contains("GEOCODIO_API_KEY"));
    assert!(!message.contains("AWS_REGION"));
    clear_all();
}

#[test]
#[serial]
fn test_blank_value_counts_as_missing() {
    set_all_required();
    unsafe { env::set_var("S3_FILE_NAME", "   ") };

    let err = Credentials::from_env().expect_err("should fail");
    assert!(err.to_string().contains("S3_FILE_NAME"));
    clear_all();
}

#[test]
#[serial]
fn test_optional_labeling_key_is_picked_up() {
    set_all_required();
    unsafe { env::set_var("OPENAI_API_KEY", "sk-test") };

    let credentials = Credentials::from_env().expect("credentials");
    assert_eq!(credentials.openai_api_key.as_deref(), Some("sk-test"));
    clear_all();
}

#[test]
#[serial]
fn test_preflight_fails_before_any_io_when_env_is_empty() {
    clear_all();
    let missing_env = Path::new("does-not-exist.env");
    let missing_settings = Path::new("does-not-exist.yaml");

    let err = runner::preflight(missing_env, missing_settings).expect_err("should fail");
    assert!(err.to_string().contains("missing required environment variables"));
}

#[test]
#[serial]
fn test_preflight_loads_settings_and_prepares_work_dir() {
    set_all_required();

    let scratch = env::temp_dir().join(format!("inspections_{}", uuid::Uuid::new_v4()));
    let work_dir = scratch.join("out");
    let settings_path = scratch.join("settings.yaml");
    std::fs::create_dir_all(&scratch).expect("scratch dir");
    std::fs::write(
        &settings_path,
        format!("fire_at: \"04:30\"\nwork_dir: {}\n", work_dir.display()),
    )
    .expect("settings file");

    let ctx = runner::preflight(Path::new("does-not-exist.env"), &settings_path)
        .expect("preflight");
    assert_eq!(ctx.settings.fire_at, "04:30");
    assert!(work_dir.is_dir());
    // unspecified fields keep their defaults
    assert_eq!(ctx.settings.output_file, "inspections.csv");

    std::fs::remove_dir_all(&scratch).ok();
    clear_all();
}
