use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::db;

const DEFAULT_API_BASE_URL: &str = "https://euclinicaltrials.eu/ctis-public-api";
const DEFAULT_GEOCODING_BASE_URL: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_PAGE_SIZE: u32 = 250;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_GEOCODING_DELAY_SECS: u64 = 2;

/// Scraper configuration loaded from file and/or environment.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Active environment profile (`prod` or `dev`).
    pub env: String,
    pub db_path: PathBuf,
    pub api: ApiConfig,
    pub geocoding: GeocodingConfig,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub page_size: u32,
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone)]
pub struct GeocodingConfig {
    pub base_url: String,
    /// Email or URL identifying the operator to Nominatim.
    pub contact: Option<String>,
    pub delay_secs: u64,
}

impl GeocodingConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
struct ProfileConfig {
    db_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
struct ApiFileConfig {
    base_url: Option<String>,
    page_size: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct GeocodingFileConfig {
    base_url: Option<String>,
    contact: Option<String>,
    delay_secs: Option<u64>,
}

/// Raw TOML file structure for `~/.config/ctis-scraper/config.toml`.
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    active_env: Option<String>,
    prod: Option<ProfileConfig>,
    dev: Option<ProfileConfig>,
    api: Option<ApiFileConfig>,
    geocoding: Option<GeocodingFileConfig>,
}

/// Default config file location.
fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .expect("could not determine config directory")
        .join("ctis-scraper")
        .join("config.toml")
}

impl ScraperConfig {
    /// Load configuration from file and environment variables.
    ///
    /// Priority: environment variables override profile and file values,
    /// which override the built-in defaults. A missing file is fine.
    /// File path can be overridden by `config_path`, the environment
    /// profile by `env_override`.
    pub fn load(config_path: Option<&PathBuf>, env_override: Option<&str>) -> Result<Self> {
        let path = config_path.cloned().unwrap_or_else(default_config_path);

        let file_config = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ConfigFile>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        } else {
            ConfigFile::default()
        };

        Self::from_file_and_env(file_config, env_override)
    }

    /// Build config from parsed file values and current environment.
    fn from_file_and_env(file_config: ConfigFile, env_override: Option<&str>) -> Result<Self> {
        let ConfigFile {
            active_env,
            prod,
            dev,
            api,
            geocoding,
        } = file_config;

        let env = resolve_env(env_override, active_env.as_deref())?;
        let profile = match env.as_str() {
            "dev" => dev.as_ref(),
            "prod" => prod.as_ref(),
            _ => None,
        };

        let db_path = std::env::var("CTIS_DB_PATH")
            .ok()
            .map(PathBuf::from)
            .or_else(|| profile.and_then(|p| p.db_path.clone()))
            .unwrap_or_else(db::default_db_path);

        let api_file = api.unwrap_or_default();
        let api = ApiConfig {
            base_url: std::env::var("CTIS_API_BASE_URL")
                .ok()
                .or(api_file.base_url)
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            page_size: api_file.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            timeout_secs: api_file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        let geocoding_file = geocoding.unwrap_or_default();
        let geocoding = GeocodingConfig {
            base_url: std::env::var("CTIS_GEOCODING_BASE_URL")
                .ok()
                .or(geocoding_file.base_url)
                .unwrap_or_else(|| DEFAULT_GEOCODING_BASE_URL.to_string()),
            contact: std::env::var("CTIS_GEOCODING_CONTACT")
                .ok()
                .or(geocoding_file.contact)
                .filter(|contact| !contact.is_empty()),
            delay_secs: geocoding_file
                .delay_secs
                .unwrap_or(DEFAULT_GEOCODING_DELAY_SECS),
        };

        Ok(Self {
            env,
            db_path,
            api,
            geocoding,
        })
    }
}

fn resolve_env(env_override: Option<&str>, active_env: Option<&str>) -> Result<String> {
    let raw = env_override
        .map(str::to_string)
        .or_else(|| std::env::var("CTIS_ENV").ok())
        .or_else(|| active_env.map(str::to_string))
        .unwrap_or_else(|| "prod".to_string());

    match raw.trim().to_ascii_lowercase().as_str() {
        "prod" | "production" => Ok("prod".to_string()),
        "dev" | "development" => Ok("dev".to_string()),
        other => bail!("Invalid environment '{}'. Expected 'prod' or 'dev'.", other),
    }
}
