use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;

use crate::error::{PublishError, Result};

/// Runtime configuration, built once at startup and handed to each component.
///
/// Every key maps to an environment variable of the same name in upper case
/// (`GHOST_URL`, `GHOST_ADMIN_API_KEY`, ...). A `.env` file is honoured.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Ghost Admin API
    pub ghost_url: String,
    pub ghost_admin_api_key: Option<String>,
    pub ghost_api_path: String,
    pub ghost_auth_scheme: String,
    pub request_timeout_secs: u64,

    // Local workspace
    pub output_dir: PathBuf,
    pub title_prefix: String,

    // Thumbnail rendering
    pub thumbnail_font_path: Option<PathBuf>,
    pub thumbnail_width: u32,
    pub thumbnail_height: u32,
    pub thumbnail_font_size: f32,

    // Observability
    pub log_level: String,
    /// `text` or `json`
    pub log_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ghost_url: "http://localhost:2368".to_string(),
            ghost_admin_api_key: None,
            ghost_api_path: "/ghost/api/admin".to_string(),
            ghost_auth_scheme: "Ghost".to_string(),
            request_timeout_secs: 30,
            output_dir: PathBuf::from("output"),
            title_prefix: "[번역] ".to_string(),
            thumbnail_font_path: None,
            thumbnail_width: 2000,
            thumbnail_height: 1200,
            thumbnail_font_size: 120.0,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();
        let config = config::Config::builder()
            .set_default("ghost_url", defaults.ghost_url)?
            .set_default("ghost_api_path", defaults.ghost_api_path)?
            .set_default("ghost_auth_scheme", defaults.ghost_auth_scheme)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs as i64)?
            .set_default("output_dir", "output")?
            .set_default("title_prefix", defaults.title_prefix)?
            .set_default("thumbnail_width", defaults.thumbnail_width as i64)?
            .set_default("thumbnail_height", defaults.thumbnail_height as i64)?
            .set_default("thumbnail_font_size", defaults.thumbnail_font_size as f64)?
            .set_default("log_level", defaults.log_level)?
            .set_default("log_format", defaults.log_format)?
            .add_source(config::Environment::default())
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.base_url()?;

        if self.request_timeout_secs == 0 {
            return Err(PublishError::config(
                "REQUEST_TIMEOUT_SECS must be greater than 0",
            ));
        }

        if self.thumbnail_width == 0 || self.thumbnail_height == 0 {
            return Err(PublishError::config("Thumbnail dimensions must be non-zero"));
        }

        if self.thumbnail_font_size <= 0.0 {
            return Err(PublishError::config("THUMBNAIL_FONT_SIZE must be positive"));
        }

        if !matches!(self.log_format.as_str(), "text" | "json") {
            return Err(PublishError::config(format!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            )));
        }

        Ok(())
    }

    /// Parsed `GHOST_URL`. Only `http` and `https` are accepted.
    pub fn base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.ghost_url).map_err(|e| {
            PublishError::config(format!("Invalid GHOST_URL '{}': {e}", self.ghost_url))
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(PublishError::config(format!(
                "GHOST_URL must use http or https, got '{other}'"
            ))),
        }
    }

    /// The `id:secret` admin key. Missing or blank is a configuration error.
    pub fn admin_api_key(&self) -> Result<&str> {
        match self.ghost_admin_api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(PublishError::config(
                "GHOST_ADMIN_API_KEY is not set (expected '<id>:<secret>')",
            )),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
