use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "ClinicApi";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Port the original clinic frontend expects.
pub const DEFAULT_PORT: u16 = 8080;

/// Browsers may cache CORS preflight results this long (12 h).
pub const DEFAULT_CORS_MAX_AGE_SECS: u64 = 12 * 60 * 60;

pub const ENV_BIND_ADDR: &str = "CLINIC_BIND_ADDR";
pub const ENV_DB_PATH: &str = "CLINIC_DB_PATH";
pub const ENV_AUTO_CREATE_VISITS: &str = "AUTO_CREATE_VISITS";
pub const ENV_CORS_MAX_AGE: &str = "CORS_MAX_AGE_SECS";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "info,clinic_api=debug,tower_http=info"
}

/// Get the application data directory.
/// Platform data dir (e.g. ~/.local/share/ClinicApi), falling back to ./data.
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_NAME))
        .unwrap_or_else(|| PathBuf::from("data"))
}

pub fn default_db_path() -> PathBuf {
    app_data_dir().join("clinic.db")
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime configuration, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub db_path: PathBuf,
    /// Create a visit on the fly when a prescription names none (or an
    /// unknown one). When off, such prescriptions are rejected.
    pub auto_create_visits: bool,
    pub cors_max_age_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            db_path: default_db_path(),
            auto_create_visits: true,
            cors_max_age_secs: DEFAULT_CORS_MAX_AGE_SECS,
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup; unset keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_BIND_ADDR) {
            config.bind_addr = parse_bind_addr(&raw).ok_or_else(|| ConfigError::Invalid {
                var: ENV_BIND_ADDR,
                value: raw.clone(),
                reason: "expected host:port or a port number".into(),
            })?;
        }
        if let Some(raw) = lookup(ENV_DB_PATH) {
            if !raw.trim().is_empty() {
                config.db_path = PathBuf::from(raw);
            }
        }
        if let Some(raw) = lookup(ENV_AUTO_CREATE_VISITS) {
            config.auto_create_visits = parse_flag(&raw).ok_or_else(|| ConfigError::Invalid {
                var: ENV_AUTO_CREATE_VISITS,
                value: raw.clone(),
                reason: "expected true/false".into(),
            })?;
        }
        if let Some(raw) = lookup(ENV_CORS_MAX_AGE) {
            config.cors_max_age_secs = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Invalid {
                    var: ENV_CORS_MAX_AGE,
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?;
        }

        Ok(config)
    }
}

fn parse_bind_addr(raw: &str) -> Option<SocketAddr> {
    let raw = raw.trim();
    if let Ok(port) = raw.parse::<u16>() {
        return Some(SocketAddr::from(([0, 0, 0, 0], port)));
    }
    raw.parse().ok()
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
