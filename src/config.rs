//! Client configuration.
//!
//! Read from `config.toml` in the user config directory (or an explicit path),
//! then overridden from the environment:
//!
//! - `STOCK_SHEETS_BASE_URL`: server base URL
//! - `STOCK_SHEETS_SESSION`: value of the server's session cookie

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::{Error, Result};

pub const CONFIG_FILENAME: &str = "config.toml";
pub const APP_DIR: &str = "stock-sheets";
pub const ENV_BASE_URL: &str = "STOCK_SHEETS_BASE_URL";
pub const ENV_SESSION: &str = "STOCK_SHEETS_SESSION";

/// Where a tracked sheet opens in the browser.
pub const SHEETS_URL_PREFIX: &str = "https://docs.google.com/spreadsheets/d/";

// ============================================================================
// Config File
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub paths: EndpointPaths,
    pub sheets_url_prefix: String,
    pub session_cookie_name: String,
    pub session_cookie: Option<String>,
    /// No timeout unless set.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            paths: EndpointPaths::default(),
            sheets_url_prefix: SHEETS_URL_PREFIX.to_string(),
            session_cookie_name: "session".to_string(),
            session_cookie: None,
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointPaths {
    pub index: String,
    pub settings: String,
    pub create: String,
    pub sync: String,
    pub delete: String,
}

impl Default for EndpointPaths {
    fn default() -> Self {
        Self {
            index: "/".to_string(),
            settings: "/settings".to_string(),
            create: "/create".to_string(),
            sync: "/sync".to_string(),
            delete: "/delete".to_string(),
        }
    }
}

impl ClientConfig {
    /// Default location: `<config dir>/stock-sheets/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILENAME))
    }

    /// Load from `path` (or the default location), then apply environment
    /// overrides. A missing default file is not an error; a missing explicit
    /// file is.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => match Self::default_path() {
                Some(p) if p.exists() => Self::from_file(&p)?,
                Some(p) => {
                    tracing::debug!("No config file at {:?}, using defaults", p);
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_overrides(
            std::env::var(ENV_BASE_URL).ok(),
            std::env::var(ENV_SESSION).ok(),
        );
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = toml::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn apply_overrides(&mut self, base_url: Option<String>, session: Option<String>) {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url;
        }
        if let Some(session) = session.filter(|s| !s.is_empty()) {
            self.session_cookie = Some(session);
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// `Cookie` header value for the session, if one is configured.
    pub fn cookie_header(&self) -> Option<String> {
        self.session_cookie
            .as_ref()
            .map(|value| format!("{}={}", self.session_cookie_name, value))
    }

    /// Resolve every endpoint against the base URL.
    pub fn endpoints(&self) -> Result<Endpoints> {
        let base = Url::parse(&self.base_url)?;
        if base.cannot_be_a_base() {
            return Err(Error::config(format!("{} cannot be a base URL", self.base_url)));
        }
        if self.sheets_url_prefix.is_empty() {
            return Err(Error::config("sheets_url_prefix is empty"));
        }

        Ok(Endpoints {
            index: base.join(&self.paths.index)?,
            settings: base.join(&self.paths.settings)?,
            create: base.join(&self.paths.create)?,
            sync: base.join(&self.paths.sync)?,
            delete: base.join(&self.paths.delete)?,
            sheets_url_prefix: self.sheets_url_prefix.clone(),
        })
    }
}

// ============================================================================
// Resolved Endpoints
// ============================================================================

/// Absolute URLs the controllers talk to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub index: Url,
    pub settings: Url,
    pub create: Url,
    pub sync: Url,
    pub delete: Url,
    pub sheets_url_prefix: String,
}

impl Endpoints {
    /// External URL of a tracked spreadsheet.
    pub fn sheet_url(&self, ssheet_id: &str) -> Result<Url> {
        let url = format!("{}{}", self.sheets_url_prefix, urlencoding::encode(ssheet_id));
        Ok(Url::parse(&url)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_server_routes() {
        let endpoints = ClientConfig::default().endpoints().unwrap();
        assert_eq!(endpoints.index.as_str(), "http://127.0.0.1:8080/");
        assert_eq!(endpoints.settings.as_str(), "http://127.0.0.1:8080/settings");
        assert_eq!(endpoints.create.as_str(), "http://127.0.0.1:8080/create");
        assert_eq!(endpoints.sync.as_str(), "http://127.0.0.1:8080/sync");
        assert_eq!(endpoints.delete.as_str(), "http://127.0.0.1:8080/delete");
    }

    #[test]
    fn test_sheet_url_concatenates_prefix() {
        let endpoints = ClientConfig::default().endpoints().unwrap();
        let url = endpoints.sheet_url("1AbC_d-9").unwrap();
        assert_eq!(url.as_str(), "https://docs.google.com/spreadsheets/d/1AbC_d-9");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
base_url = "https://stocks.example.com/app/"
session_cookie = "tok"

[paths]
sync = "api/sync"
"#
        )
        .unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.paths.index, "/");
        assert_eq!(config.cookie_header().as_deref(), Some("session=tok"));

        let endpoints = config.endpoints().unwrap();
        assert_eq!(endpoints.sync.as_str(), "https://stocks.example.com/app/api/sync");
        assert_eq!(endpoints.delete.as_str(), "https://stocks.example.com/delete");
    }

    #[test]
    fn test_invalid_toml_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url = [").unwrap();
        let err = ClientConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(ClientConfig::from_file(&missing).is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = ClientConfig::default();
        config.apply_overrides(Some("http://10.0.0.2:9000".into()), Some("abc".into()));
        assert_eq!(config.base_url, "http://10.0.0.2:9000");
        assert_eq!(config.session_cookie.as_deref(), Some("abc"));

        config.apply_overrides(Some("  ".into()), Some(String::new()));
        assert_eq!(config.base_url, "http://10.0.0.2:9000");
        assert_eq!(config.session_cookie.as_deref(), Some("abc"));
    }

    #[test]
    fn test_bad_base_url() {
        let config = ClientConfig {
            base_url: "not a url".into(),
            ..Default::default()
        };
        assert!(matches!(config.endpoints(), Err(Error::Url(_))));
    }
}
