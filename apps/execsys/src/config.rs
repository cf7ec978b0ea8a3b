//! # Application Configuration
//!
//! Layered configuration for the server, the CLI and the spreadsheet sink.
//!
//! Resolution order (highest priority first):
//! 1. CLI flags (applied via [`AppConfig::apply_cli_overrides`])
//! 2. Environment variables (`EXECSYS_*`)
//! 3. Config file (`--config`, default `execsys.toml`, optional)
//! 4. Compiled defaults
//!
//! Every field is optional in the file; the `effective_*` accessors fill in
//! the defaults.

use execsys_core::ExecsysError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file read when `--config` is not given. Missing is fine.
pub const DEFAULT_CONFIG_FILE: &str = "execsys.toml";

pub const DEFAULT_BOOKING_URL: &str = "https://calendly.com/cole-whetstone";
pub const DEFAULT_CONTACT_EMAIL: &str = "hello@whetstoneadmissions.com";
pub const DEFAULT_CONTACT_PHONE: &str = "917-562-5668";
pub const DEFAULT_FOUNDER_PHOTO_URL: &str =
    "https://whetstoneadmissions.com/wp-content/uploads/2025/09/cole.webp";

/// Webhook request timeout.
pub const DEFAULT_SHEETS_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

/// Requests per second across all clients.
pub const DEFAULT_RATE_LIMIT: u32 = 100;

// =============================================================================
// SECTIONS
// =============================================================================

/// Public site settings shown to visitors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub booking_url: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub founder_photo_url: Option<String>,
}

impl SiteConfig {
    pub fn effective_booking_url(&self) -> &str {
        self.booking_url.as_deref().unwrap_or(DEFAULT_BOOKING_URL)
    }

    pub fn effective_contact_email(&self) -> &str {
        self.contact_email.as_deref().unwrap_or(DEFAULT_CONTACT_EMAIL)
    }

    pub fn effective_contact_phone(&self) -> &str {
        self.contact_phone.as_deref().unwrap_or(DEFAULT_CONTACT_PHONE)
    }

    pub fn effective_founder_photo_url(&self) -> &str {
        self.founder_photo_url
            .as_deref()
            .unwrap_or(DEFAULT_FOUNDER_PHOTO_URL)
    }
}

/// Spreadsheet webhook settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    /// Web-app URL of the spreadsheet script. Unset or empty disables the sink.
    pub webhook_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl SheetsConfig {
    /// The webhook URL, if one is configured and non-empty.
    pub fn effective_webhook_url(&self) -> Option<&str> {
        self.webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }

    pub fn effective_timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_SHEETS_TIMEOUT_SECS)
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Requests per second; 0 disables rate limiting.
    pub rate_limit: Option<u32>,
    /// Comma-separated origins, or `*` for any origin. Unset means
    /// localhost only.
    pub cors_origins: Option<String>,
}

impl ServerConfig {
    pub fn effective_host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn effective_rate_limit(&self) -> u32 {
        self.rate_limit.unwrap_or(DEFAULT_RATE_LIMIT)
    }

    /// `host:port` bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.effective_host(), self.effective_port())
    }
}

// =============================================================================
// APP CONFIG
// =============================================================================

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub site: SiteConfig,
    pub sheets: SheetsConfig,
    pub server: ServerConfig,
}

/// CLI flags that override file and environment values.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl AppConfig {
    /// Load with layered resolution and validate the result.
    ///
    /// An explicit `path` must exist; when `path` is `None` the default
    /// `execsys.toml` is read only if present.
    pub fn load(
        path: Option<&Path>,
        cli_overrides: Option<&CliOverrides>,
    ) -> Result<Self, ExecsysError> {
        let mut config = Self::default();

        // Layer 3: config file
        match path {
            Some(explicit) => Self::merge_toml_file(&mut config, explicit)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::merge_toml_file(&mut config, default_path)?;
                }
            }
        }

        // Layer 2: environment variables
        config.apply_env_overrides(|key| std::env::var(key).ok());

        // Layer 1: CLI flags
        if let Some(cli) = cli_overrides {
            config.apply_cli_overrides(cli);
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ExecsysError> {
        toml::from_str(toml_str)
            .map_err(|e| ExecsysError::ConfigError(format!("<string>: {}", e)))
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ExecsysError> {
        if let Some(url) = self.sheets.effective_webhook_url()
            && !is_http_url(url)
        {
            return Err(ExecsysError::ConfigError(
                "sheets.webhook_url must start with http:// or https://".to_string(),
            ));
        }
        if self.sheets.effective_timeout_secs() == 0 {
            return Err(ExecsysError::ConfigError(
                "sheets.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if !is_http_url(self.site.effective_booking_url()) {
            return Err(ExecsysError::ConfigError(
                "site.booking_url must start with http:// or https://".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply `EXECSYS_*` overrides. `lookup` is `std::env::var` in
    /// production and a map in tests.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("EXECSYS_SHEETS_WEBHOOK_URL") {
            self.sheets.webhook_url = Some(url);
        }
        if let Some(url) = lookup("EXECSYS_BOOKING_URL") {
            self.site.booking_url = Some(url);
        }
        if let Some(limit) = lookup("EXECSYS_RATE_LIMIT") {
            match limit.trim().parse() {
                Ok(value) => self.server.rate_limit = Some(value),
                Err(_) => tracing::warn!("Ignoring invalid EXECSYS_RATE_LIMIT '{}'", limit),
            }
        }
        if let Some(origins) = lookup("EXECSYS_CORS_ORIGINS") {
            self.server.cors_origins = Some(origins);
        }
    }

    pub fn apply_cli_overrides(&mut self, cli: &CliOverrides) {
        if let Some(ref host) = cli.host {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = cli.port {
            self.server.port = Some(port);
        }
    }

    /// Merge a TOML file; keys set in the file replace current values.
    fn merge_toml_file(&mut self, path: &Path) -> Result<(), ExecsysError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ExecsysError::ConfigError(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        let file_config: AppConfig = toml::from_str(&content).map_err(|e| {
            ExecsysError::ConfigError(format!("Invalid TOML in '{}': {}", path.display(), e))
        })?;

        self.merge(file_config);
        Ok(())
    }

    fn merge(&mut self, other: AppConfig) {
        let AppConfig {
            site,
            sheets,
            server,
        } = other;

        merge_opt(&mut self.site.booking_url, site.booking_url);
        merge_opt(&mut self.site.contact_email, site.contact_email);
        merge_opt(&mut self.site.contact_phone, site.contact_phone);
        merge_opt(&mut self.site.founder_photo_url, site.founder_photo_url);

        merge_opt(&mut self.sheets.webhook_url, sheets.webhook_url);
        merge_opt(&mut self.sheets.timeout_secs, sheets.timeout_secs);

        merge_opt(&mut self.server.host, server.host);
        merge_opt(&mut self.server.port, server.port);
        merge_opt(&mut self.server.rate_limit, server.rate_limit);
        merge_opt(&mut self.server.cors_origins, server.cors_origins);
    }
}

fn merge_opt<T>(base: &mut Option<T>, other: Option<T>) {
    if other.is_some() {
        *base = other;
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

// =============================================================================
// TESTS
// =============================================================================
