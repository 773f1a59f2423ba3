use std::fs;
use std::time::Duration;

use encwatch_app::platform::config::ConfigError;
use encwatch_app::platform::controller::ControllerError;
use encwatch_app::platform::logging::LogDestination;
use encwatch_app::{load_config, run_download, AppConfig, AppError, ContainerId};
use tempfile::TempDir;

#[test]
fn missing_file_means_defaults() {
    let temp = TempDir::new().unwrap();
    let loaded = load_config(&temp.path().join("encwatch.ron")).unwrap();
    assert!(loaded.is_none());

    let config = AppConfig::default();
    assert_eq!(config.poll_interval(), Duration::from_millis(1000));
    assert_eq!(config.completed_container, "dl_div");
    assert_eq!(config.progress_container, "progressBars");
    assert!(config.validate().is_ok());
}

#[test]
fn partial_file_overrides_only_named_fields() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("encwatch.ron");
    fs::write(
        &path,
        r#"(
    server_url: "http://media.local:8082",
    poll_interval_ms: 500,
    html_snapshot: Some("status.html"),
    log_destination: Both,
)"#,
    )
    .unwrap();

    let config = load_config(&path).unwrap().expect("config present");
    assert_eq!(config.server_url, "http://media.local:8082");
    assert_eq!(config.poll_interval(), Duration::from_millis(500));
    assert_eq!(config.html_snapshot, Some("status.html".into()));
    assert_eq!(config.log_destination, LogDestination::Both);
    assert_eq!(config.status_path, "/ready");
    assert_eq!(config.route().href_for("a b.mp4"), "/encoding/a%20b.mp4");
}

#[test]
fn unparsable_file_is_an_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("encwatch.ron");
    fs::write(&path, "(poll_interval_ms: \"soon\")").unwrap();

    assert!(matches!(
        load_config(&path),
        Err(ConfigError::Parse { .. })
    ));
}

#[test]
fn validation_rejects_bad_settings() {
    let zero = AppConfig {
        poll_interval_ms: 0,
        ..AppConfig::default()
    };
    assert!(matches!(zero.validate(), Err(ConfigError::ZeroPollInterval)));

    let same = AppConfig {
        progress_container: "dl_div".to_string(),
        ..AppConfig::default()
    };
    assert!(matches!(same.validate(), Err(ConfigError::SameContainer(_))));

    let bad_url = AppConfig {
        server_url: "ftp://example.com".to_string(),
        ..AppConfig::default()
    };
    assert!(matches!(bad_url.validate(), Err(ConfigError::ServerUrl { .. })));

    let no_connect = AppConfig {
        connect_timeout_ms: 0,
        ..AppConfig::default()
    };
    assert!(matches!(
        no_connect.validate(),
        Err(ConfigError::ZeroTimeout("connect_timeout_ms"))
    ));

    let no_request = AppConfig {
        request_timeout_ms: 0,
        ..AppConfig::default()
    };
    assert!(matches!(
        no_request.validate(),
        Err(ConfigError::ZeroTimeout("request_timeout_ms"))
    ));
}

#[test]
fn target_container_missing_from_page_fails_at_startup() {
    let config = AppConfig {
        completed_container: "downloads".to_string(),
        ..AppConfig::default()
    };
    assert!(config.validate().is_ok());

    let err = run_download(&config, "a.mp4").unwrap_err();
    assert!(matches!(
        err,
        AppError::Controller(ControllerError::MissingContainer(id)) if id == ContainerId::new("downloads")
    ));
}
