use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;
use workbench_core::domain::{CustomerId, InteractionType, ProductId};
use workbench_core::query::{blank_as_none, validate_page_size, DEFAULT_PAGE_SIZE};
use workbench_core::time::parse_instant;
use workbench_core::InteractionQuery;

const APP_DIR: &str = "workbench";
const CONFIG_FILENAME: &str = "config.toml";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = "workbench";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub list: ListConfig,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    /// `None` leaves requests without a deadline.
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct ListConfig {
    pub page_size: u32,
    /// Filters applied to the first load of a list view.
    pub filters: InteractionQuery,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: default_base_url(),
                timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
                user_agent: DEFAULT_USER_AGENT.to_string(),
            },
            list: ListConfig {
                page_size: DEFAULT_PAGE_SIZE,
                filters: InteractionQuery::default(),
            },
        }
    }
}

impl AppConfig {
    pub fn with_base_url(mut self, raw: Option<&str>) -> Result<Self> {
        if let Some(raw) = raw {
            self.api.base_url = parse_base_url(raw)?;
        }
        Ok(self)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("invalid page_size value: {0}")]
    InvalidPageSize(u32),
    #[error("invalid base_url value: {0}")]
    InvalidBaseUrl(String),
    #[error("invalid list filter: {0}")]
    InvalidFilter(String),
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    api: Option<ApiFile>,
    list: Option<ListFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ApiFile {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    user_agent: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ListFile {
    page_size: Option<u32>,
    filters: Option<FiltersFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FiltersFile {
    #[serde(default, deserialize_with = "blank_as_none")]
    customer_id: Option<CustomerId>,
    #[serde(default, deserialize_with = "blank_as_none")]
    product_id: Option<ProductId>,
    #[serde(default, deserialize_with = "blank_as_none")]
    interaction_type: Option<InteractionType>,
    start_date: Option<String>,
    end_date: Option<String>,
}

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path.clone()) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

/// Accepts absolute `http`/`https` URLs only.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|_| ConfigError::InvalidBaseUrl(trimmed.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ConfigError::InvalidBaseUrl(trimmed.to_string()));
    }
    Ok(url)
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base url is valid")
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(api) = parsed.api {
        if let Some(base_url) = api.base_url {
            config.api.base_url = parse_base_url(&base_url)?;
        }
        if let Some(timeout_secs) = api.timeout_secs {
            config.api.timeout = if timeout_secs == 0 {
                None
            } else {
                Some(Duration::from_secs(timeout_secs))
            };
        }
        if let Some(user_agent) = api.user_agent {
            let trimmed = user_agent.trim();
            if !trimmed.is_empty() {
                config.api.user_agent = trimmed.to_string();
            }
        }
    }

    if let Some(list) = parsed.list {
        if let Some(page_size) = list.page_size {
            config.list.page_size = validate_page_size(page_size)
                .map_err(|_| ConfigError::InvalidPageSize(page_size))?;
        }
        if let Some(filters) = list.filters {
            config.list.filters = merge_filters(filters)?;
        }
    }

    Ok(config)
}

fn merge_filters(filters: FiltersFile) -> Result<InteractionQuery> {
    Ok(InteractionQuery {
        customer_id: filters.customer_id,
        product_id: filters.product_id,
        interaction_type: filters.interaction_type,
        start_date: parse_filter_date("start_date", filters.start_date)?,
        end_date: parse_filter_date("end_date", filters.end_date)?,
        page: None,
        size: None,
    })
}

fn parse_filter_date(
    field: &str,
    raw: Option<String>,
) -> Result<Option<chrono::DateTime<chrono::Utc>>> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_instant(value)
            .map(Some)
            .map_err(|err| ConfigError::InvalidFilter(format!("{}: {}", field, err))),
    }
}
