use hylog_config::{ConfigError, HylogConfig, LoggingConfig, HYLOG_CONFIG_ENV_VAR};
use std::io::Write;

#[test]
fn loads_full_config_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[memory]
log_memory_size_bits = 22
target_bytes = "3M"

[logging]
level = "hylog.memory=debug"
json = true
stderr = false
"#
    )
    .unwrap();

    let config = HylogConfig::load_from_path(file.path()).unwrap();

    assert_eq!(config.memory.log_memory_size_bits, 22);
    assert_eq!(
        config.logging,
        LoggingConfig {
            level: "hylog.memory=debug".to_owned(),
            json: true,
            stderr: false,
        }
    );
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let err = HylogConfig::load_from_path(&path).unwrap_err();

    match err {
        ConfigError::Io { path: reported, .. } => {
            assert_eq!(reported, path.display().to_string())
        }
        other => panic!("expected io error, got {other:?}"),
    }
}

#[test]
fn unknown_keys_are_rejected() {
    let err = HylogConfig::load_from_str("[memory]\ntarget = 10\n").unwrap_err();

    assert!(matches!(err, ConfigError::Toml(_)), "{err:?}");
}

#[test]
fn env_var_selects_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[memory]\nlog_memory_size_bits = 18").unwrap();

    // Only this test touches the variable.
    std::env::set_var(HYLOG_CONFIG_ENV_VAR, file.path());
    let loaded = HylogConfig::load_from_env();
    std::env::remove_var(HYLOG_CONFIG_ENV_VAR);
    let unset = HylogConfig::load_from_env();

    assert_eq!(loaded.unwrap().unwrap().memory.log_memory_size_bits, 18);
    assert!(unset.unwrap().is_none());
}

#[test]
fn tracing_initialization_is_idempotent() {
    let config = LoggingConfig {
        stderr: false,
        ..LoggingConfig::default()
    };

    let first = hylog_config::init_tracing(&config);
    let second = hylog_config::init_tracing(&config);

    assert_eq!(first, second);
}
