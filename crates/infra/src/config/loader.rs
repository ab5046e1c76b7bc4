//! Configuration loader
//!
//! Loads the client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Reads a `.env` file into the environment when one is present
//! 2. Uses environment variables when `MARKETLINK_API_BASE_URL` is set
//! 3. Otherwise probes multiple paths for a config file
//! 4. Otherwise falls back to the reference defaults
//!
//! The result is validated before it is returned.
//!
//! ## Environment Variables
//! - `MARKETLINK_API_BASE_URL`: Backend base URL (required for env loading)
//! - `MARKETLINK_TIMEOUT_MS`: Per-attempt timeout in milliseconds
//! - `MARKETLINK_RETRY_ATTEMPTS`: Maximum attempts for transient failures
//! - `MARKETLINK_RETRY_DELAY_MS`: Linear backoff step in milliseconds
//! - `MARKETLINK_REFRESH_ENDPOINT`: Refresh endpoint path
//! - `MARKETLINK_SAFE_LOCATION`: Location shown after an auth failure
//! - `MARKETLINK_USER_AGENT`: Optional `User-Agent` header
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.toml`, `./marketlink.toml`, `./config.json`,
//!    `./marketlink.json` (current working directory)
//! 2. The same names one and two directories up
//! 3. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use marketlink_domain::{ClientConfig, MarketlinkError, Result};

pub const ENV_BASE_URL: &str = "MARKETLINK_API_BASE_URL";
pub const ENV_TIMEOUT_MS: &str = "MARKETLINK_TIMEOUT_MS";
pub const ENV_RETRY_ATTEMPTS: &str = "MARKETLINK_RETRY_ATTEMPTS";
pub const ENV_RETRY_DELAY_MS: &str = "MARKETLINK_RETRY_DELAY_MS";
pub const ENV_REFRESH_ENDPOINT: &str = "MARKETLINK_REFRESH_ENDPOINT";
pub const ENV_SAFE_LOCATION: &str = "MARKETLINK_SAFE_LOCATION";
pub const ENV_USER_AGENT: &str = "MARKETLINK_USER_AGENT";

const CONFIG_FILE_NAMES: [&str; 4] =
    ["config.toml", "marketlink.toml", "config.json", "marketlink.json"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `MarketlinkError::Config` if a source is present but invalid, or
/// the resulting configuration fails validation.
pub fn load() -> Result<ClientConfig> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    let config = if std::env::var(ENV_BASE_URL).is_ok() {
        let config = load_from_env()?;
        tracing::info!(base_url = %config.base_url, "Configuration loaded from environment variables");
        config
    } else if let Some(path) = probe_config_paths() {
        load_from_file(Some(path))?
    } else {
        tracing::info!("No configuration source found, using defaults");
        ClientConfig::default()
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// The base URL is required; every other variable falls back to its
/// default when unset.
///
/// # Errors
/// Returns `MarketlinkError::Config` if the base URL is missing or a
/// numeric variable does not parse.
pub fn load_from_env() -> Result<ClientConfig> {
    let defaults = ClientConfig::default();

    Ok(ClientConfig {
        base_url: env_var(ENV_BASE_URL)?,
        timeout_ms: env_number(ENV_TIMEOUT_MS, defaults.timeout_ms)?,
        retry_attempts: env_number(ENV_RETRY_ATTEMPTS, defaults.retry_attempts)?,
        retry_delay_ms: env_number(ENV_RETRY_DELAY_MS, defaults.retry_delay_ms)?,
        refresh_endpoint: std::env::var(ENV_REFRESH_ENDPOINT)
            .unwrap_or(defaults.refresh_endpoint),
        safe_location: std::env::var(ENV_SAFE_LOCATION).unwrap_or(defaults.safe_location),
        user_agent: std::env::var(ENV_USER_AGENT).ok().or(defaults.user_agent),
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
/// Fields missing from the file keep their defaults.
///
/// # Errors
/// Returns `MarketlinkError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(MarketlinkError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            MarketlinkError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| MarketlinkError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `MarketlinkError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| MarketlinkError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| MarketlinkError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(MarketlinkError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend(cwd.ancestors().take(3).map(Path::to_path_buf));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.extend(exe_dir.ancestors().take(3).map(Path::to_path_buf));
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `MarketlinkError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        MarketlinkError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Parse an optional numeric environment variable.
///
/// # Errors
/// Returns `MarketlinkError::Config` if the variable is set but invalid.
fn env_number<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| MarketlinkError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: [&str; 7] = [
        ENV_BASE_URL,
        ENV_TIMEOUT_MS,
        ENV_RETRY_ATTEMPTS,
        ENV_RETRY_DELAY_MS,
        ENV_REFRESH_ENDPOINT,
        ENV_SAFE_LOCATION,
        ENV_USER_AGENT,
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    fn write_config(contents: &str, extension: &str) -> PathBuf {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        let path = temp_file.path().with_extension(extension);
        std::fs::copy(temp_file.path(), &path).unwrap();
        path
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var(ENV_BASE_URL, "https://api.example.com");
        std::env::set_var(ENV_TIMEOUT_MS, "5000");
        std::env::set_var(ENV_RETRY_ATTEMPTS, "5");
        std::env::set_var(ENV_RETRY_DELAY_MS, "250");
        std::env::set_var(ENV_REFRESH_ENDPOINT, "/auth/refresh/");
        std::env::set_var(ENV_SAFE_LOCATION, "/login");
        std::env::set_var(ENV_USER_AGENT, "marketlink-test");

        let result = load_from_env();
        assert!(result.is_ok(), "Should load config from env vars, error: {:?}", result.err());

        let config = result.unwrap();
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.timeout_ms, 5000);
        assert_eq!(config.retry_attempts, 5);
        assert_eq!(config.retry_delay_ms, 250);
        assert_eq!(config.refresh_endpoint, "/auth/refresh/");
        assert_eq!(config.safe_location, "/login");
        assert_eq!(config.user_agent.as_deref(), Some("marketlink-test"));

        clear_env();
    }

    #[test]
    fn test_load_from_env_uses_defaults_for_optional_vars() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var(ENV_BASE_URL, "https://api.example.com");

        let config = load_from_env().unwrap();
        let defaults = ClientConfig::default();
        assert_eq!(config.timeout_ms, defaults.timeout_ms);
        assert_eq!(config.retry_attempts, defaults.retry_attempts);
        assert_eq!(config.refresh_endpoint, defaults.refresh_endpoint);

        clear_env();
    }

    #[test]
    fn test_load_from_env_missing_base_url() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, MarketlinkError::Config(_)), "Should be a Config error");
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var(ENV_BASE_URL, "https://api.example.com");
        std::env::set_var(ENV_RETRY_ATTEMPTS, "three");

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, MarketlinkError::Config(ref msg) if msg.contains(ENV_RETRY_ATTEMPTS)));

        clear_env();
    }

    #[test]
    fn test_load_from_file_toml_keeps_defaults() {
        let path = write_config(
            r#"
base_url = "https://staging.example.com"
retry_attempts = 2
"#,
            "toml",
        );

        let config = load_from_file(Some(path.clone())).unwrap();
        assert_eq!(config.base_url, "https://staging.example.com");
        assert_eq!(config.retry_attempts, 2);
        assert_eq!(config.timeout_ms, ClientConfig::default().timeout_ms);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_invalid_json() {
        let path = write_config(r#"{ "this is": "not valid json" "#, "json");

        let result = load_from_file(Some(path.clone()));
        assert!(matches!(result, Err(MarketlinkError::Config(_))));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/config.json")));
        assert!(matches!(result, Err(MarketlinkError::Config(_))));
    }

    #[test]
    fn test_parse_config_json() {
        let path = PathBuf::from("test.json");
        let config =
            parse_config(r#"{"base_url": "http://localhost:9000", "timeout_ms": 100}"#, &path)
                .unwrap();
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.timeout_ms, 100);
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("base_url: x", &PathBuf::from("test.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }

    #[test]
    fn test_load_prefers_environment_and_validates() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var(ENV_BASE_URL, "https://api.example.com");
        std::env::set_var(ENV_RETRY_ATTEMPTS, "0");

        let err = load().unwrap_err();
        assert!(matches!(err, MarketlinkError::Config(_)));

        std::env::set_var(ENV_RETRY_ATTEMPTS, "4");
        let config = load().unwrap();
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.retry_attempts, 4);

        clear_env();
    }
}
