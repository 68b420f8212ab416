//! Extension configuration surface.
//!
//! # Responsibility
//! - Parse the site-wide OpenID settings from TOML into one immutable struct.
//! - Validate store, URL and policy settings before any component is built.
//!
//! # Invariants
//! - Components receive configuration by reference; nothing reads ambient state.
//! - A durable store with an empty path, or a volatile store with an empty
//!   prefix, is rejected without touching the filesystem.

use crate::store::{parse_store_kind, StoreKind, StoreKindError};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use url::Url;

/// Default logo shown next to bound identifiers and the login link.
pub const DEFAULT_LOGIN_LOGO_URL: &str = "http://www.openid.net/login-bg.gif";
/// Default article path pattern; `$1` is replaced by the encoded title.
pub const DEFAULT_ARTICLE_PATH: &str = "/wiki/$1";

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Who decides whether a bound identifier is shown on the profile page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisibilityPolicy {
    Always,
    Never,
    /// Each user decides through the `hideopenid` preference.
    #[default]
    UserControlled,
}

impl VisibilityPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Never => "never",
            Self::UserControlled => "user",
        }
    }

    /// Parses `always|never|user`.
    pub fn parse(value: &str) -> ConfigResult<Self> {
        match value.trim() {
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            "user" => Ok(Self::UserControlled),
            other => Err(ConfigError::InvalidVisibilityPolicy(other.to_string())),
        }
    }

    /// Whether a bound identifier is displayed for a user with the given preference.
    pub fn shows_identifier(self, user_hides_identifier: bool) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::UserControlled => !user_hides_identifier,
        }
    }
}

/// Backend selection for one store role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Volatile { prefix: String },
    Durable { path: PathBuf },
}

impl StoreConfig {
    pub fn kind(&self) -> StoreKind {
        match self {
            Self::Volatile { .. } => StoreKind::Volatile,
            Self::Durable { .. } => StoreKind::Durable,
        }
    }

    /// Checks presence of the prefix or path. Does not touch the filesystem.
    pub fn validate(&self) -> ConfigResult<()> {
        match self {
            Self::Volatile { prefix } if prefix.trim().is_empty() => {
                Err(ConfigError::MissingStorePrefix)
            }
            Self::Durable { path } if is_blank_path(path) => Err(ConfigError::MissingStorePath),
            _ => Ok(()),
        }
    }
}

pub(crate) fn is_blank_path(path: &Path) -> bool {
    path.to_str()
        .map_or(path.as_os_str().is_empty(), |raw| raw.trim().is_empty())
}

/// Public addressing of the wiki.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    /// Scheme and host, e.g. `https://wiki.example.org`.
    pub server: String,
    /// Path pattern for page URLs, e.g. `/wiki/$1`.
    pub article_path: String,
}

impl SiteConfig {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            article_path: DEFAULT_ARTICLE_PATH.to_string(),
        }
    }
}

/// Optional logging settings consumed by `init_logging`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub dir: PathBuf,
}

/// Immutable, validated extension configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenIdConfig {
    pub site: SiteConfig,
    pub server_store: StoreConfig,
    pub consumer_store: StoreConfig,
    pub show_url_on_user_page: VisibilityPolicy,
    /// Set when the skin already renders its own OpenID login link.
    pub hide_login_link: bool,
    pub login_logo_url: String,
    pub logging: Option<LoggingConfig>,
}

impl OpenIdConfig {
    /// Builds a configuration with default display settings.
    pub fn new(site: SiteConfig, server_store: StoreConfig, consumer_store: StoreConfig) -> Self {
        Self {
            site,
            server_store,
            consumer_store,
            show_url_on_user_page: VisibilityPolicy::default(),
            hide_login_link: false,
            login_logo_url: DEFAULT_LOGIN_LOGO_URL.to_string(),
            logging: None,
        }
    }

    /// Reads and validates a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|err| ConfigError::Read {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates a TOML configuration document.
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        let raw: RawConfig =
            toml::from_str(contents).map_err(|err| ConfigError::Parse(err.to_string()))?;
        let config = raw.into_config()?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every setting that can be checked without I/O.
    pub fn validate(&self) -> ConfigResult<()> {
        let server = parse_url("site.server", &self.site.server)?;
        if !matches!(server.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                field: "site.server",
                value: self.site.server.clone(),
                message: "scheme must be http or https".to_string(),
            });
        }
        if !self.site.article_path.starts_with('/') || !self.site.article_path.contains("$1") {
            return Err(ConfigError::InvalidArticlePath(
                self.site.article_path.clone(),
            ));
        }
        parse_url("login_logo_url", &self.login_logo_url)?;
        self.server_store.validate()?;
        self.consumer_store.validate()?;
        Ok(())
    }
}

fn parse_url(field: &'static str, value: &str) -> ConfigResult<Url> {
    Url::parse(value).map_err(|err| ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
        message: err.to_string(),
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    site: RawSite,
    server_store: RawStore,
    consumer_store: RawStore,
    show_url_on_user_page: Option<String>,
    hide_login_link: Option<bool>,
    login_logo_url: Option<String>,
    logging: Option<RawLogging>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSite {
    server: String,
    article_path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStore {
    #[serde(rename = "type")]
    kind: String,
    path: Option<String>,
    prefix: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLogging {
    level: String,
    dir: String,
}

impl RawConfig {
    fn into_config(self) -> ConfigResult<OpenIdConfig> {
        let show_url_on_user_page = match self.show_url_on_user_page {
            Some(value) => VisibilityPolicy::parse(&value)?,
            None => VisibilityPolicy::default(),
        };
        Ok(OpenIdConfig {
            site: SiteConfig {
                server: self.site.server,
                article_path: self
                    .site
                    .article_path
                    .unwrap_or_else(|| DEFAULT_ARTICLE_PATH.to_string()),
            },
            server_store: self.server_store.into_store_config()?,
            consumer_store: self.consumer_store.into_store_config()?,
            show_url_on_user_page,
            hide_login_link: self.hide_login_link.unwrap_or(false),
            login_logo_url: self
                .login_logo_url
                .unwrap_or_else(|| DEFAULT_LOGIN_LOGO_URL.to_string()),
            logging: self.logging.map(|logging| LoggingConfig {
                level: logging.level,
                dir: PathBuf::from(logging.dir),
            }),
        })
    }
}

impl RawStore {
    fn into_store_config(self) -> ConfigResult<StoreConfig> {
        match parse_store_kind(&self.kind)? {
            StoreKind::Volatile => Ok(StoreConfig::Volatile {
                prefix: self.prefix.unwrap_or_default(),
            }),
            StoreKind::Durable => Ok(StoreConfig::Durable {
                path: PathBuf::from(self.path.unwrap_or_default()),
            }),
        }
    }
}

/// Fatal, setup-time configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    StoreKind(StoreKindError),
    MissingStorePrefix,
    MissingStorePath,
    UncreatableStorePath { path: PathBuf, message: String },
    UnusableStorePath { path: PathBuf, message: String },
    InvalidUrl {
        field: &'static str,
        value: String,
        message: String,
    },
    InvalidArticlePath(String),
    InvalidVisibilityPolicy(String),
    Read { path: PathBuf, message: String },
    Parse(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StoreKind(err) => write!(f, "{err}"),
            Self::MissingStorePrefix => write!(f, "volatile store requires a non-empty prefix"),
            Self::MissingStorePath => write!(f, "file store requires a non-empty path"),
            Self::UncreatableStorePath { path, message } => write!(
                f,
                "failed to create store directory `{}`: {message}",
                path.display()
            ),
            Self::UnusableStorePath { path, message } => write!(
                f,
                "store directory `{}` is not usable: {message}",
                path.display()
            ),
            Self::InvalidUrl {
                field,
                value,
                message,
            } => write!(f, "{field} is not a valid URL `{value}`: {message}"),
            Self::InvalidArticlePath(value) => write!(
                f,
                "article path must start with `/` and contain `$1`, got `{value}`"
            ),
            Self::InvalidVisibilityPolicy(value) => write!(
                f,
                "show_url_on_user_page is invalid: `{value}` (expected always|never|user)"
            ),
            Self::Read { path, message } => {
                write!(f, "failed to read `{}`: {message}", path.display())
            }
            Self::Parse(message) => write!(f, "failed to parse configuration: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StoreKind(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreKindError> for ConfigError {
    fn from(value: StoreKindError) -> Self {
        Self::StoreKind(value)
    }
}
