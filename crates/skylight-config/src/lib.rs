//! Configuration for the Skylight kiosk.
//!
//! Layered loading (defaults, TOML or JSON file, `SKYLIGHT_` environment),
//! per-endpoint credential resolution (env var + keyring + plaintext) and
//! non-fatal validation. The configuration is loaded once per client load
//! and never mutated afterwards.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml},
};
use secrecy::SecretString;
use thiserror::Error;
use tracing::{debug, warn};

use skylight_core::config::endpoint;
use skylight_core::{ApiConfig, Configuration, Credentials};

const KEYRING_SERVICE: &str = "skylight";
const ENV_PREFIX: &str = "SKYLIGHT_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for endpoint '{endpoint}'")]
    NoCredentials { endpoint: String },

    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Platform config directory, e.g. `~/.config/skylight`.
pub fn config_dir() -> PathBuf {
    ProjectDirs::from("dev", "skylight", "skylight").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("skylight");
            p
        },
        |dirs| dirs.config_dir().to_path_buf(),
    )
}

/// The default TOML config path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the configuration.
///
/// With an explicit `path` only that file is read, as JSON when it ends in
/// `.json` and as TOML otherwise. Without one, `config.toml` and then
/// `config.json` from the config directory are merged, both optional.
/// Environment variables win over files: `SKYLIGHT_REFRESH__WEATHER_SECS=60`.
pub fn load_config(path: Option<&Path>) -> Result<Configuration, ConfigError> {
    let mut figment = Figment::new().merge(Serialized::defaults(Configuration::default()));

    match path {
        Some(path) => {
            if !path.is_file() {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            figment = if is_json(path) {
                figment.merge(Json::file(path))
            } else {
                figment.merge(Toml::file(path))
            };
        }
        None => {
            let dir = config_dir();
            figment = figment
                .merge(Toml::file(dir.join("config.toml")))
                .merge(Json::file(dir.join("config.json")));
        }
    }

    let config: Configuration = figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()?;
    debug!(
        tiles = config.layout.tile_count(),
        devices = config.devices.len(),
        apis = config.apis.len(),
        "configuration loaded"
    );
    Ok(config)
}

/// Load the configuration, falling back to the defaults when it cannot be
/// read. The failure is logged; the dashboard then shows its empty state.
pub fn load_config_or_default(path: Option<&Path>) -> Configuration {
    load_config(path).unwrap_or_else(|e| {
        warn!(error = %e, "configuration unusable, using defaults");
        Configuration::default()
    })
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize a configuration to TOML at `path`, creating parent
/// directories.
pub fn save_config(config: &Configuration, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(config)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Validation ──────────────────────────────────────────────────────

/// Problems that do not stop the dashboard but are worth reporting.
pub fn validate(config: &Configuration) -> Vec<ConfigError> {
    let mut problems = Vec::new();

    for (name, api) in &config.apis {
        if !endpoint::ALL.contains(&name.as_str()) {
            problems.push(ConfigError::Validation {
                field: format!("apis.{name}"),
                reason: format!("unknown endpoint, expected one of {}", endpoint::ALL.join(", ")),
            });
        }
        for (key, value) in [("url", &api.url), ("push_url", &api.push_url)] {
            if let Some(raw) = value {
                if let Err(e) = url::Url::parse(raw) {
                    problems.push(ConfigError::Validation {
                        field: format!("apis.{name}.{key}"),
                        reason: format!("{e}: {raw}"),
                    });
                }
            }
        }
    }

    for (id, device) in &config.devices {
        if device.entity.trim().is_empty() {
            problems.push(ConfigError::Validation {
                field: format!("devices.{id}.entity"),
                reason: "missing entity id".into(),
            });
        }
    }

    let bands = [
        ("top", &config.layout.top),
        ("middle", &config.layout.middle),
        ("bottom", &config.layout.bottom),
    ];
    for (band, tiles) in bands {
        for (i, tile) in tiles.iter().enumerate() {
            if tile.kind.trim().is_empty() {
                problems.push(ConfigError::Validation {
                    field: format!("layout.{band}[{i}].type"),
                    reason: "missing widget type".into(),
                });
            }
        }
    }

    problems
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve a secret for every configured endpoint that has one.
pub fn resolve_credentials(config: &Configuration) -> Credentials {
    resolve_credentials_with(config, keyring_lookup)
}

/// Resolve one endpoint's secret: `key_env` → system keyring
/// (`skylight/<endpoint>`) → plaintext `key`.
pub fn resolve_secret(name: &str, api: &ApiConfig) -> Result<SecretString, ConfigError> {
    resolve_secret_with(name, api, keyring_lookup)
}

fn resolve_credentials_with(
    config: &Configuration,
    keyring: impl Fn(&str) -> Option<String>,
) -> Credentials {
    let mut credentials = Credentials::default();
    for (name, api) in &config.apis {
        if let Ok(secret) = resolve_secret_with(name, api, &keyring) {
            credentials.insert(name.clone(), secret);
        }
    }
    debug!(resolved = credentials.len(), "credentials resolved");
    credentials
}

fn resolve_secret_with(
    name: &str,
    api: &ApiConfig,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    // 1. Named environment variable
    if let Some(ref env_name) = api.key_env {
        match std::env::var(env_name) {
            Ok(val) if !val.is_empty() => return Ok(SecretString::from(val)),
            _ => warn!(endpoint = name, var = %env_name, "key_env variable is not set"),
        }
    }

    // 2. System keyring
    if let Some(secret) = keyring(name) {
        return Ok(SecretString::from(secret));
    }

    // 3. Plaintext in config
    if let Some(ref key) = api.key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials {
        endpoint: name.into(),
    })
}

fn keyring_lookup(name: &str) -> Option<String> {
    keyring::Entry::new(KEYRING_SERVICE, name)
        .and_then(|entry| entry.get_password())
        .ok()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use secrecy::ExposeSecret;

    use super::*;

    fn no_keyring(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn plaintext_is_the_last_resort() {
        let api = ApiConfig {
            key: Some("plain".into()),
            ..ApiConfig::default()
        };
        let secret = resolve_secret_with("shipments", &api, |_| Some("from-keyring".into())).unwrap();
        assert_eq!(secret.expose_secret(), "from-keyring");

        let secret = resolve_secret_with("shipments", &api, no_keyring).unwrap();
        assert_eq!(secret.expose_secret(), "plain");
    }

    #[test]
    fn unset_key_env_falls_through() {
        let api = ApiConfig {
            key_env: Some("SKYLIGHT_TEST_SURELY_UNSET_VARIABLE".into()),
            ..ApiConfig::default()
        };
        let result = resolve_secret_with("home", &api, no_keyring);
        assert!(matches!(result, Err(ConfigError::NoCredentials { .. })));
    }

    #[test]
    fn only_endpoints_with_secrets_are_resolved() {
        let mut config = Configuration::default();
        config.apis.insert(
            "home".into(),
            ApiConfig {
                url: Some("http://hub.local:8123".into()),
                key: Some("token".into()),
                ..ApiConfig::default()
            },
        );
        config.apis.insert(
            "recipe".into(),
            ApiConfig {
                url: Some("http://kiosk.local/recipe".into()),
                ..ApiConfig::default()
            },
        );
        let credentials = resolve_credentials_with(&config, no_keyring);
        assert_eq!(credentials.len(), 1);
        assert!(credentials.get("home").is_some());
        assert!(credentials.get("recipe").is_none());
    }

    #[test]
    fn validation_flags_bad_urls_and_entities() {
        let mut config = Configuration::default();
        config.apis.insert(
            "weather".into(),
            ApiConfig {
                url: Some("not a url".into()),
                ..ApiConfig::default()
            },
        );
        config.apis.insert("wether".into(), ApiConfig::default());
        config
            .devices
            .insert("lamp".into(), skylight_core::DeviceConfig::default());

        let fields: Vec<String> = validate(&config)
            .into_iter()
            .filter_map(|e| match e {
                ConfigError::Validation { field, .. } => Some(field),
                _ => None,
            })
            .collect();
        assert_eq!(
            fields,
            vec!["apis.weather.url", "apis.wether", "devices.lamp.entity"]
        );
    }

    #[test]
    fn default_config_is_valid() {
        assert!(validate(&Configuration::default()).is_empty());
    }
}
