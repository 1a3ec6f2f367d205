use chrono::NaiveDate;

use crate::config::constants::{
    CREDENTIAL_FILE_PATH, GEMINI_ENDPOINT, HELLO_MESSAGE, HISTORY_DIR, LOG_DIR,
    LOG_RETENTION_HOURS, MODELS,
};

use super::*;

#[test]
fn test_load_configuration() {
    let config = load_configuration("./testdata/config.toml").expect("failed to load config");

    assert_eq!(config.general.hello_message.as_deref(), Some("Hi there!"));
    assert_eq!(config.general.verbose, true);

    let log = &config.log;
    assert_eq!(log.level.as_deref(), Some("debug"));
    let log_filters = log.filters.as_deref().unwrap_or_default();
    assert_eq!(log_filters.len(), 1);
    assert_eq!(log_filters[0].module.as_deref(), Some("gemchat::backend"));
    assert_eq!(log_filters[0].level.as_deref(), Some("trace"));
    assert_eq!(log.dir, "/var/log/gemchat");
    assert_eq!(log.retention_hours, 24);

    assert_eq!(config.credential.path, "/etc/gemchat/api.txt");

    let gemini = &config.gemini;
    assert_eq!(gemini.endpoint, "http://localhost:8080/v1beta");
    assert_eq!(gemini.default_model(), "gemini-2.5-pro");
    assert_eq!(gemini.timeout_secs, Some(60));

    assert_eq!(config.storage.history_dir, "/var/lib/gemchat/history");
}

#[test]
fn test_load_configuration_with_some_default_fields() {
    let config =
        load_configuration("./testdata/config_with_default.toml").expect("failed to load config");

    assert_eq!(config.general.hello_message.as_deref(), Some(HELLO_MESSAGE));
    assert_eq!(config.log.level.as_deref(), Some("info"));
    assert_eq!(config.log.dir, LOG_DIR);
    assert_eq!(config.log.retention_hours, LOG_RETENTION_HOURS);
    assert_eq!(config.credential.path, CREDENTIAL_FILE_PATH);
    assert_eq!(config.gemini.endpoint, GEMINI_ENDPOINT);
    assert_eq!(config.storage.history_dir, HISTORY_DIR);

    // Models outside of the allow-list fall back to the default one
    assert_eq!(config.gemini.default_model.as_deref(), Some("gpt-4"));
    assert_eq!(config.gemini.default_model(), MODELS[0]);
}

#[test]
fn test_log_file_name() {
    let timestamp = NaiveDate::from_ymd_opt(2024, 3, 9)
        .unwrap()
        .and_hms_opt(7, 5, 1)
        .unwrap()
        .and_utc();

    let name = log_file_name(timestamp);
    assert_eq!(name, "gemchat-20240309-070501.log");
    assert_eq!(parse_log_file_name(&name), Some(timestamp.naive_utc()));

    assert_eq!(parse_log_file_name("gemchat-latest.log"), None);
    assert_eq!(parse_log_file_name("other-20240309-070501.log"), None);
    assert_eq!(parse_log_file_name("gemchat-20240309-070501.txt"), None);
}

#[test]
fn test_sweep_logs() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let now = NaiveDate::from_ymd_opt(2024, 3, 9)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();

    let files = [
        "gemchat-20240309-110000.log", // 1 hour old
        "gemchat-20240307-130000.log", // 47 hours old
        "gemchat-20240307-110000.log", // 49 hours old
        "gemchat-20240101-000000.log", // months old
        "notes.txt",
        "gemchat-broken.log",
    ];
    for file in files {
        std::fs::write(dir.path().join(file), "").expect("failed to write file");
    }

    let removed = sweep_logs(dir.path(), 48, now).expect("failed to sweep logs");
    assert_eq!(removed, 2);

    let mut remaining = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect::<Vec<_>>();
    remaining.sort();
    assert_eq!(
        remaining,
        vec![
            "gemchat-20240307-130000.log",
            "gemchat-20240309-110000.log",
            "gemchat-broken.log",
            "notes.txt",
        ]
    );
}

#[test]
fn test_sweep_logs_missing_dir() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let now = chrono::Local::now().naive_local();
    let removed =
        sweep_logs(&dir.path().join("missing"), 48, now).expect("failed to sweep logs");
    assert_eq!(removed, 0);
}

#[test]
fn test_resolve_path() {
    let ret = resolve_path("$GEMCHAT_TEST_ROOT/${GEMCHAT_TEST_USER}/config.toml")
        .expect("failed to resolve path");
    assert_eq!(ret, "//config.toml");

    let dir = "/tmp/test";
    let user_path = "user_path";
    unsafe {
        std::env::set_var("GEMCHAT_TEST_ROOT", dir);
        std::env::set_var("GEMCHAT_TEST_USER", user_path);
    }
    let ret = resolve_path("$GEMCHAT_TEST_ROOT/${GEMCHAT_TEST_USER}/config.toml")
        .expect("failed to resolve path");
    assert_eq!(ret, format!("{dir}/{user_path}/config.toml"));
}
