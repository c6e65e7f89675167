//! Client configuration.
//!
//! # Invariants
//! - `base_url` is an absolute `http`/`https` URL.
//! - `data_dir` is absolute; the session database and logs live below it.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);
pub const DEFAULT_SEARCH_MIN_CHARS: usize = 2;

const DATA_DIR_NAME: &str = "lifedesk";
const SESSION_DB_FILE_NAME: &str = "session.sqlite3";
const LOG_DIR_NAME: &str = "logs";

#[derive(Debug)]
pub enum ConfigError {
    InvalidBaseUrl { value: String, source: url::ParseError },
    UnsupportedScheme(String),
    RelativeDataDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBaseUrl { value, source } => {
                write!(f, "invalid api base url `{value}`: {source}")
            }
            Self::UnsupportedScheme(scheme) => {
                write!(f, "api base url must use http or https, got `{scheme}`")
            }
            Self::RelativeDataDir(path) => {
                write!(f, "data directory must be absolute, got `{}`", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidBaseUrl { source, .. } => Some(source),
            Self::UnsupportedScheme(_) | Self::RelativeDataDir(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: Url,
    pub request_timeout: Duration,
    /// Quiet period before a member search is sent.
    pub search_debounce: Duration,
    /// Shorter queries clear results without a request.
    pub search_min_chars: usize,
    pub data_dir: PathBuf,
}

impl ClientConfig {
    /// Builds a config with default timings.
    ///
    /// # Errors
    /// - Returns an error when `base_url` does not parse or is not http(s).
    /// - Returns an error when `data_dir` is relative.
    pub fn new(base_url: &str, data_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let data_dir = data_dir.into();
        if !data_dir.is_absolute() {
            return Err(ConfigError::RelativeDataDir(data_dir));
        }
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
            search_min_chars: DEFAULT_SEARCH_MIN_CHARS,
            data_dir,
        })
    }

    /// Local backend and per-user data directory.
    pub fn from_defaults() -> Result<Self, ConfigError> {
        Self::new(DEFAULT_BASE_URL, default_data_dir())
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_search(mut self, debounce: Duration, min_chars: usize) -> Self {
        self.search_debounce = debounce;
        self.search_min_chars = min_chars.max(1);
        self
    }

    pub fn session_db_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_DB_FILE_NAME)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOG_DIR_NAME)
    }
}

/// Per-user data directory, falling back to the temp dir on bare systems.
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(DATA_DIR_NAME)
}

fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let trimmed = value.trim();
    let url = Url::parse(trimmed).map_err(|source| ConfigError::InvalidBaseUrl {
        value: trimmed.to_string(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
}
