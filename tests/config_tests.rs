mod support;

use std::fs;

use polystore::application::{IngestPolicy, LoadMode};
use polystore::error::{ConfigError, Error};
use polystore::infrastructure::config::settings::Config;

#[test]
fn config_loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = support::write_config(dir.path(), 17);
    let config = Config::load(&path).unwrap();
    assert_eq!(config.generation.seed, Some(17));
    assert_eq!(config.data.zones, dir.path().join("zonas.csv"));
    assert_eq!(config.ingest.policy, IngestPolicy::Skip);
    assert_eq!(config.load.mode, LoadMode::RejectIfNonEmpty);
    assert_eq!(config.logging.level, "error");
}

#[test]
fn config_rejects_zero_replication_factor() {
    let toml = r#"
[column]
keyspace = "polystore"
replication_factor = 0
"#;
    let err = Config::parse_toml(toml).unwrap_err();
    assert!(matches!(
        err,
        Error::Config(ConfigError::InvalidValue {
            field: "column.replication_factor",
            ..
        })
    ));
}

#[test]
fn config_rejects_unknown_load_mode() {
    let toml = r#"
[load]
mode = "overwrite"
"#;
    let err = Config::parse_toml(toml).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::Parse(_))));
}

#[test]
fn config_rejects_unknown_log_format() {
    let toml = r#"
[logging]
level = "info"
format = "xml"
"#;
    let err = Config::parse_toml(toml).unwrap_err();
    assert!(err.to_string().contains("logging.format"));
}

#[test]
fn missing_config_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::ReadFile(_))));
}

#[test]
fn shipped_config_is_valid() {
    let content = fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml"))
        .expect("read shipped config");
    let config: Config = toml::from_str(&content).unwrap();
    config.validate().unwrap();
    assert_eq!(config.column.keyspace, "polystore");
}
