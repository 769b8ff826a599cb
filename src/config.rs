//! Configuration loading and constants.
//!
//! Loads application configuration from TOML files and defines constants for
//! HTTP cache TTLs, assistant limits, logging format, and default paths.
//! `AppConfig` is the root configuration struct containing all settings.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use const_format::formatcp;
use serde::{Deserialize, Serialize};

use crate::facility::Facility;

// =============================================================================
// HTTP Response Cache Control
// =============================================================================
// Cache-Control headers for upstream caches. All values are in seconds.
// Pages that may render an open assistant are never cached publicly since
// their content depends on the visitor's session cookie.

/// Static assets (CSS, JS) - long cache with immutable hint
pub const HTTP_CACHE_STATIC_MAX_AGE: u32 = 86400;

/// Facility API - reference data that only changes on redeploy
pub const HTTP_CACHE_API_MAX_AGE: u32 = 300;
pub const HTTP_CACHE_API_SWR: u32 = 60;

/// Error responses - short TTL to allow quick recovery
pub const HTTP_CACHE_ERROR_MAX_AGE: u32 = 5;

pub const CACHE_CONTROL_STATIC: &str =
    formatcp!("public, max-age={}, immutable", HTTP_CACHE_STATIC_MAX_AGE);

pub const CACHE_CONTROL_API: &str = formatcp!(
    "public, max-age={}, stale-while-revalidate={}",
    HTTP_CACHE_API_MAX_AGE,
    HTTP_CACHE_API_SWR
);

/// Landing page and assistant responses depend on the session cookie
pub const CACHE_CONTROL_PRIVATE: &str = "private, no-store";

pub const CACHE_CONTROL_ERROR: &str = formatcp!("public, max-age={}", HTTP_CACHE_ERROR_MAX_AGE);

// =============================================================================
// Assistant Constants
// =============================================================================

/// Maximum characters accepted for a manually entered location
pub const MAX_LOCATION_LENGTH: usize = 200;

/// Default idle timeout for assistant sessions (30 minutes)
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 1800;

/// Upper bound for the session idle timeout (7 days)
pub const MAX_SESSION_IDLE_SECS: u64 = 7 * 24 * 60 * 60;

/// Default cap on concurrently held assistant sessions
pub const DEFAULT_MAX_SESSIONS: u64 = 10_000;

/// Default timeout the browser passes to the geolocation request
pub const DEFAULT_GEOLOCATION_TIMEOUT_MS: u64 = 10_000;

/// Grace period on top of the geolocation timeout before an unanswered
/// location request is considered abandoned
pub const LOCATING_GRACE_MS: u64 = 5_000;

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Default directory holding themes
pub const DEFAULT_THEMES_DIR: &str = "dist/themes";

/// Name of the theme every other theme falls back to
pub const DEFAULT_THEME: &str = "default";

/// Default site name shown in the header and page titles
pub const DEFAULT_SITE_NAME: &str = "Health-SOS";

/// Default number offered by "Call Emergency Hotline"
pub const DEFAULT_EMERGENCY_NUMBER: &str = "911";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "health_sos=debug,tower_http=debug";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    pub http: HttpServerConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
    /// Assistant session settings
    #[serde(default)]
    pub session: SessionConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Facility directory; the built-in demo list is used when empty
    #[serde(default, rename = "facility")]
    pub facilities: Vec<Facility>,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UiConfig {
    /// Site title shown in header and page titles
    #[serde(default = "UiConfig::default_site_name")]
    pub site_name: String,
    /// Number offered when no facility matches
    #[serde(default = "UiConfig::default_emergency_number")]
    pub emergency_number: String,
    /// Timeout passed to the browser geolocation request
    #[serde(default = "UiConfig::default_geolocation_timeout_ms")]
    pub geolocation_timeout_ms: u64,
    /// Version string, populated at runtime
    #[serde(skip_deserializing, default = "UiConfig::default_version")]
    pub version: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            site_name: Self::default_site_name(),
            emergency_number: Self::default_emergency_number(),
            geolocation_timeout_ms: Self::default_geolocation_timeout_ms(),
            version: Self::default_version(),
        }
    }
}

impl UiConfig {
    fn default_site_name() -> String {
        DEFAULT_SITE_NAME.to_string()
    }

    fn default_emergency_number() -> String {
        DEFAULT_EMERGENCY_NUMBER.to_string()
    }

    fn default_geolocation_timeout_ms() -> u64 {
        DEFAULT_GEOLOCATION_TIMEOUT_MS
    }

    fn default_version() -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    /// How long an unanswered device location request blocks a new one.
    pub fn locating_stale_after(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.geolocation_timeout_ms + LOCATING_GRACE_MS)
    }
}

/// Theme selection. Templates and static files are looked up in the active
/// theme first, then in the default theme.
#[derive(Debug, Clone, Deserialize)]
pub struct ThemeConfig {
    #[serde(default = "ThemeConfig::default_name")]
    pub name: String,
    #[serde(default = "ThemeConfig::default_themes_dir")]
    pub themes_dir: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            themes_dir: Self::default_themes_dir(),
        }
    }
}

impl ThemeConfig {
    fn default_name() -> String {
        DEFAULT_THEME.to_string()
    }

    fn default_themes_dir() -> String {
        DEFAULT_THEMES_DIR.to_string()
    }

    pub fn templates_path(&self, theme: &str) -> PathBuf {
        Path::new(&self.themes_dir).join(theme).join("templates")
    }

    pub fn static_path(&self, theme: &str) -> PathBuf {
        Path::new(&self.themes_dir).join(theme).join("static")
    }

    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_THEME
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Seconds without a request before an assistant session is dropped
    #[serde(default = "SessionConfig::default_idle_timeout")]
    pub idle_timeout_seconds: u64,
    /// Maximum number of assistant sessions held at once
    #[serde(default = "SessionConfig::default_max_sessions")]
    pub max_sessions: u64,
    /// Secret for the session cookie key; random per process if unset
    pub cookie_secret: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_seconds: Self::default_idle_timeout(),
            max_sessions: Self::default_max_sessions(),
            cookie_secret: None,
        }
    }
}

impl SessionConfig {
    fn default_idle_timeout() -> u64 {
        DEFAULT_SESSION_IDLE_SECS
    }

    fn default_max_sessions() -> u64 {
        DEFAULT_MAX_SESSIONS
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.http.port == 0 {
            return Err(ConfigError::Validation(
                "http.port must be non-zero".to_string(),
            ));
        }

        let idle = self.session.idle_timeout_seconds;
        if idle == 0 || idle > MAX_SESSION_IDLE_SECS {
            return Err(ConfigError::Validation(format!(
                "session.idle_timeout_seconds must be between 1 and {}, got {}",
                MAX_SESSION_IDLE_SECS, idle
            )));
        }

        if self.session.max_sessions == 0 {
            return Err(ConfigError::Validation(
                "session.max_sessions must be at least 1".to_string(),
            ));
        }

        let name = &self.theme.name;
        if name.is_empty() || name.contains(['/', '\\']) || name == ".." {
            return Err(ConfigError::Validation(format!(
                "theme.name '{}' is not a valid theme directory name",
                name
            )));
        }

        let mut seen = HashSet::new();
        for facility in &self.facilities {
            if !seen.insert(facility.id.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "Duplicate facility id '{}'",
                    facility.id
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"
        [http]
        host = "127.0.0.1"
        port = 3000
    "#;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = AppConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(config.ui.site_name, "Health-SOS");
        assert_eq!(config.ui.emergency_number, "911");
        assert_eq!(config.ui.geolocation_timeout_ms, 10_000);
        assert_eq!(config.theme.name, "default");
        assert_eq!(config.session.idle_timeout_seconds, 1800);
        assert!(config.session.cookie_secret.is_none());
        assert!(!config.logging.is_json());
        assert!(config.facilities.is_empty());
    }

    #[test]
    fn facilities_are_read_from_tables() {
        let toml = format!(
            r#"{}
            [[facility]]
            id = "a"
            name = "Harbour Animal Clinic"
            type = "Veterinary Clinic"
            distance = "3.0 km"
            phone = "+1-555-1000"
            address = "1 Quay Road"

            [[facility]]
            id = "b"
            name = "North Hospital"
            type = "Emergency Department"
            distance = "4.5 km"
            is_24x7 = true
            phone = "+1-555-2000"
            address = "2 North Road"
            specialties = ["Trauma"]
            "#,
            MINIMAL
        );
        let config = AppConfig::from_toml(&toml).unwrap();
        assert_eq!(config.facilities.len(), 2);
        assert!(config.facilities[0].is_veterinary());
        assert!(!config.facilities[0].is_24x7);
        assert_eq!(config.facilities[0].specialties, None);
        assert_eq!(
            config.facilities[1].specialties.as_deref(),
            Some(&["Trauma".to_string()][..])
        );
    }

    #[test]
    fn duplicate_facility_ids_are_rejected() {
        let toml = format!(
            r#"{}
            [[facility]]
            id = "1"
            name = "A"
            type = "Urgent Care"
            distance = "1 km"
            phone = "1"
            address = "A"

            [[facility]]
            id = "1"
            name = "B"
            type = "Urgent Care"
            distance = "2 km"
            phone = "2"
            address = "B"
            "#,
            MINIMAL
        );
        assert!(matches!(
            AppConfig::from_toml(&toml),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn theme_name_cannot_escape_themes_dir() {
        let toml = format!("{}\n[theme]\nname = \"../etc\"\n", MINIMAL);
        assert!(matches!(
            AppConfig::from_toml(&toml),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn idle_timeout_must_be_positive() {
        let toml = format!("{}\n[session]\nidle_timeout_seconds = 0\n", MINIMAL);
        assert!(matches!(
            AppConfig::from_toml(&toml),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn idle_timeout_is_capped() {
        let at_cap = format!(
            "{}\n[session]\nidle_timeout_seconds = {}\n",
            MINIMAL, MAX_SESSION_IDLE_SECS
        );
        assert!(AppConfig::from_toml(&at_cap).is_ok());

        let huge = format!(
            "{}\n[session]\nidle_timeout_seconds = {}\n",
            MINIMAL,
            i64::MAX
        );
        assert!(matches!(
            AppConfig::from_toml(&huge),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn zero_port_is_rejected() {
        let toml = "[http]\nhost = \"0.0.0.0\"\nport = 0\n";
        assert!(matches!(
            AppConfig::from_toml(toml),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn missing_http_section_is_a_parse_error() {
        assert!(matches!(
            AppConfig::from_toml("[ui]\nsite_name = \"x\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}\n[logging]\nformat = \"JSON\"", MINIMAL).unwrap();
        let config = AppConfig::load(file.path()).unwrap();
        assert!(config.logging.is_json());
    }

    #[test]
    fn load_reports_missing_file() {
        assert!(matches!(
            AppConfig::load("/nonexistent/health-sos.toml"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn theme_paths_are_rooted_in_themes_dir() {
        let theme = ThemeConfig {
            name: "dark".to_string(),
            themes_dir: "/usr/share/health-sos/themes".to_string(),
        };
        assert_eq!(
            theme.templates_path("dark"),
            PathBuf::from("/usr/share/health-sos/themes/dark/templates")
        );
        assert_eq!(
            theme.static_path("default"),
            PathBuf::from("/usr/share/health-sos/themes/default/static")
        );
        assert!(!theme.is_default());
    }
}
