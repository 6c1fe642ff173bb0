#![allow(clippy::unwrap_used)]

use std::fs;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use skylight_config::{ConfigError, load_config, load_config_or_default, save_config};
use skylight_core::{Configuration, DeviceKind};

const TOML_CONFIG: &str = r#"
insecure = true

[[layout.top]]
type = "clock"
width = "30%"

[[layout.top]]
type = "weather"
latitude = 51.5
longitude = -0.12
conditions = ["humidity", "uv"]

[[layout.middle]]
type = "devices"
name = "Living room"
refresh = "10s"

[devices.lamp]
entity = "light.lamp"

[devices.fan]
entity = "switch.fan"
name = "Ceiling fan"

[apis.home]
url = "http://hub.local:8123"
key_env = "HUB_TOKEN"

[refresh]
weather_secs = 600
"#;

#[test]
fn test_toml_file_loads_with_defaults_filled_in() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, TOML_CONFIG).unwrap();

    let config = load_config(Some(&path)).unwrap();

    assert!(config.insecure);
    assert_eq!(config.layout.top.len(), 2);
    assert_eq!(config.layout.top[0].width.as_deref(), Some("30%"));
    assert_eq!(config.layout.top[1].param_f64("latitude"), Some(51.5));
    assert_eq!(config.layout.top[1].param_list("conditions"), vec!["humidity", "uv"]);
    assert_eq!(config.layout.middle[0].display_name(), "Living room");
    assert!(config.layout.bottom.is_empty());

    let ids: Vec<&str> = config.devices.keys().map(String::as_str).collect();
    assert_eq!(ids, vec!["lamp", "fan"]);
    assert_eq!(config.devices["lamp"].kind(), DeviceKind::Light);
    assert_eq!(config.devices["fan"].display_name("fan"), "Ceiling fan");

    assert_eq!(config.api_url("home"), Some("http://hub.local:8123"));
    assert_eq!(config.refresh.weather_secs, 600);
    assert_eq!(config.refresh.calendar_secs, 15 * 60);
}

#[test]
fn test_json_file_is_accepted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{ "layout": { "bottom": [ { "type": "notifications", "width": 40 } ] },
             "apis": { "notifications": { "url": "http://kiosk.local:8765/api/notifications" } } }"#,
    )
    .unwrap();

    let config = load_config(Some(&path)).unwrap();
    assert_eq!(config.layout.bottom[0].kind, "notifications");
    assert_eq!(config.layout.bottom[0].width.as_deref(), Some("40"));
    assert!(config.api_url("notifications").is_some());
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let result = load_config(Some(&dir.path().join("nope.toml")));
    assert!(matches!(result, Err(ConfigError::NotFound { .. })));
}

#[test]
fn test_malformed_file_degrades_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[layout\ntop = 3").unwrap();

    assert!(load_config(Some(&path)).is_err());
    assert_eq!(load_config_or_default(Some(&path)), Configuration::default());
}

#[test]
fn test_saved_config_loads_back() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("config.toml");
    fs::write(&source, TOML_CONFIG).unwrap();
    let config = load_config(Some(&source)).unwrap();

    let target = dir.path().join("nested").join("copy.toml");
    save_config(&config, &target).unwrap();

    assert_eq!(load_config(Some(&target)).unwrap(), config);
}
