use super::*;

use std::{
    collections::HashMap,
    env,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

fn temp_config(contents: &str) -> (PathBuf, PathBuf) {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("monitor_config_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join("monitor.toml");
    fs::write(&path, contents).expect("write config");
    (temp_root, path)
}

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn missing_config_file_yields_defaults() {
    let settings =
        load_settings_with_env(Path::new("/nonexistent/monitor.toml"), env_from(&[]))
            .expect("settings");

    assert_eq!(settings, Settings::default());
    assert_eq!(settings.data_path, "/data");
    assert_eq!(settings.period(), Duration::from_millis(1000));
}

#[test]
fn file_values_override_defaults_and_env_overrides_file() {
    let (temp_root, path) = temp_config(
        r#"
server_url = "http://esp32.local"
period_ms = 250
request_timeout_ms = 900
"#,
    );

    let settings = load_settings_with_env(
        &path,
        env_from(&[
            ("MONITOR_SERVER_URL", "http://10.0.0.7"),
            ("MONITOR_PERIOD_MS", "500"),
        ]),
    )
    .expect("settings");

    assert_eq!(settings.server_url, "http://10.0.0.7");
    assert_eq!(settings.period_ms, 500);
    assert_eq!(settings.request_timeout(), Duration::from_millis(900));
    assert_eq!(settings.data_path, "/data");

    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn app_prefixed_server_url_wins() {
    let settings = load_settings_with_env(
        Path::new("/nonexistent/monitor.toml"),
        env_from(&[
            ("MONITOR_SERVER_URL", "http://a"),
            ("APP__SERVER_URL", "http://b"),
        ]),
    )
    .expect("settings");

    assert_eq!(settings.server_url, "http://b");
}

#[test]
fn unparseable_env_numbers_are_ignored() {
    let settings = load_settings_with_env(
        Path::new("/nonexistent/monitor.toml"),
        env_from(&[("MONITOR_PERIOD_MS", "fast")]),
    )
    .expect("settings");

    assert_eq!(settings.period_ms, 1000);
}

#[test]
fn zero_period_is_rejected() {
    let err = load_settings_with_env(
        Path::new("/nonexistent/monitor.toml"),
        env_from(&[("MONITOR_PERIOD_MS", "0")]),
    )
    .expect_err("must fail");

    assert!(err.to_string().contains("poll period"));
}

#[test]
fn malformed_config_file_is_an_error() {
    let (temp_root, path) = temp_config("period_ms = \"soon\"");

    let err = load_settings_with_env(&path, env_from(&[])).expect_err("must fail");
    assert!(err.to_string().contains("failed to parse config"));

    fs::remove_dir_all(temp_root).expect("cleanup");
}
