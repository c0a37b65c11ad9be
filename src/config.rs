//! TOML-based configuration system.
//!
//! Loads settings from a `siteshell.toml` file, falling back to built-in
//! defaults. Every struct implements `Default` so a missing or partial
//! config file behaves exactly like no file at all. The shell only reads
//! configuration; it never writes it back.
//!
//! ## Config file search order
//!
//! 1. `SITESHELL_CONFIG` environment variable (explicit override)
//! 2. Next to the executable (`<exe_dir>/siteshell.toml`)
//! 3. Platform config directory (`%APPDATA%\siteshell\siteshell.toml` on Windows)
//! 4. Current working directory (`./siteshell.toml`)
//! 5. No file found → `Config::default()`

use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;

use crate::error::ConfigError;

const CONFIG_FILE_NAME: &str = "siteshell.toml";

// ─────────────────────────────────────────────────────────────────────────────
// Config structs
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub splash: SplashConfig,
    pub beacon: BeaconConfig,
    pub reachability: ReachabilityConfig,
    pub error_pages: ErrorPagesConfig,
    pub logging: LoggingConfig,
}

/// The one website the shell displays.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub home_url: String,
    /// Host whose subdomains stay inside the shell. Empty = host of `home_url`.
    pub origin_host: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplashConfig {
    /// Minimum time the splash stays up, in milliseconds.
    pub min_duration_ms: u64,
}

/// Analytics beacon fired once per surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BeaconConfig {
    pub enabled: bool,
    pub endpoint: String,
    /// Sent as the `User-Agent` header.
    pub client_id: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReachabilityConfig {
    /// Public address used for the routing-table lookup. No packet is sent.
    pub probe_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorPagesConfig {
    /// Fallback directory when the assets are not found in the usual places.
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub filter: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Default impls
// ─────────────────────────────────────────────────────────────────────────────

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            home_url: "https://example.com".to_string(),
            origin_host: String::new(),
        }
    }
}

impl Default for SplashConfig {
    fn default() -> Self {
        Self {
            min_duration_ms: 2000,
        }
    }
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: String::new(),
            client_id: "siteshell".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for ReachabilityConfig {
    fn default() -> Self {
        Self {
            probe_address: "1.1.1.1:53".to_string(),
        }
    }
}

impl Default for ErrorPagesConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("assets"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Validated settings
// ─────────────────────────────────────────────────────────────────────────────

/// Typed view of a [`Config`] once every value has been checked.
#[derive(Debug, Clone)]
pub struct ShellSettings {
    pub home_url: Url,
    pub origin_host: String,
    pub splash_min_duration: Duration,
    pub beacon: Option<BeaconSettings>,
    pub probe_address: SocketAddr,
    pub error_pages_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct BeaconSettings {
    pub endpoint: Url,
    pub client_id: String,
    pub timeout: Duration,
}

// ─────────────────────────────────────────────────────────────────────────────
// Config loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Loads configuration from a TOML file. Never panics: returns defaults
    /// if no file is found or if parsing fails.
    pub fn load() -> Self {
        match find_config_path() {
            Some(path) => match fs::read_to_string(&path) {
                Ok(content) => match Config::from_toml_str(&content) {
                    Ok(config) => {
                        info!(path = %path.display(), "Configuration loaded");
                        config
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Invalid config, using defaults");
                        Config::default()
                    }
                },
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Cannot read config, using defaults");
                    Config::default()
                }
            },
            None => {
                info!("No config file found, using defaults");
                Config::default()
            }
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Checks every value and converts it to its typed form.
    pub fn validate(&self) -> Result<ShellSettings, ConfigError> {
        let home_url =
            Url::parse(&self.site.home_url).map_err(|source| ConfigError::HomeUrl {
                value: self.site.home_url.clone(),
                source,
            })?;
        if !matches!(home_url.scheme(), "http" | "https") {
            return Err(ConfigError::HomeScheme(self.site.home_url.clone()));
        }

        let origin_host = match self.site.origin_host.trim() {
            "" => home_url
                .host_str()
                .map(str::to_string)
                .ok_or(ConfigError::MissingOrigin)?,
            host => host.to_string(),
        };

        let beacon = if self.beacon.enabled {
            let endpoint = Url::parse(&self.beacon.endpoint).map_err(|source| {
                ConfigError::BeaconEndpoint {
                    value: self.beacon.endpoint.clone(),
                    source,
                }
            })?;
            Some(BeaconSettings {
                endpoint,
                client_id: self.beacon.client_id.clone(),
                timeout: Duration::from_secs(self.beacon.timeout_secs),
            })
        } else {
            None
        };

        let probe_address = self
            .reachability
            .probe_address
            .parse()
            .map_err(|_| ConfigError::ProbeAddress(self.reachability.probe_address.clone()))?;

        Ok(ShellSettings {
            home_url,
            origin_host,
            splash_min_duration: Duration::from_millis(self.splash.min_duration_ms),
            beacon,
            probe_address,
            error_pages_dir: self.error_pages.dir.clone(),
        })
    }
}

/// Searches for a config file in the standard locations.
fn find_config_path() -> Option<PathBuf> {
    // 1. Explicit env var override
    if let Ok(path) = std::env::var("SITESHELL_CONFIG") {
        let p = PathBuf::from(path);
        if p.is_file() {
            return Some(p);
        }
    }

    // 2. Next to the executable
    if let Ok(exe) = std::env::current_exe()
        && let Some(dir) = exe.parent()
    {
        let p = dir.join(CONFIG_FILE_NAME);
        if p.is_file() {
            return Some(p);
        }
    }

    // 3. Platform config directory
    if let Some(dir) = platform_config_dir() {
        let p = dir.join(CONFIG_FILE_NAME);
        if p.is_file() {
            return Some(p);
        }
    }

    // 4. Current working directory
    let p = PathBuf::from(CONFIG_FILE_NAME);
    if p.is_file() {
        return Some(p);
    }

    None
}

/// Returns the platform config directory without adding a dependency.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join("siteshell"))
    }
    #[cfg(not(windows))]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .or_else(|| std::env::var("HOME").ok().map(|h| format!("{h}/.config")))
            .map(|dir| PathBuf::from(dir).join("siteshell"))
    }
}
