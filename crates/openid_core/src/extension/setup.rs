//! Extension setup and per-request entry points.
//!
//! # Responsibility
//! - Validate configuration and build both protocol stores exactly once.
//! - Register special pages and the visibility preference.
//! - Expose the per-request hooks the host calls in a fixed order:
//!   `compute_login_link`, `bind_discovery_signals`, `register_preference`.
//!
//! # Invariants
//! - Any store failure aborts setup; no partially configured extension exists.
//! - Store handles are never recreated after setup.

use super::special_pages::{SpecialPageError, SpecialPageRegistry};
use crate::config::{ConfigError, OpenIdConfig};
use crate::discovery::{DiscoveryBinder, DiscoveryOutcome};
use crate::host::{IdentityBindings, PageContext, UserDirectory, Viewer};
use crate::navigation::{NavLink, NavigationHook};
use crate::output::PageOutput;
use crate::preferences::{register_preference_if_applicable, PreferenceRegistry};
use crate::store::{create_store, StoreHandle, StoreRole, VolatileBackend};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Extension version reported in credits.
pub const OPENID_EXTENSION_VERSION: &str = "0.7.0";

/// Message key of the configuration error page title.
pub const CONFIG_ERROR_TITLE_KEY: &str = "openidconfigerror";
/// Message key of the configuration error page body.
pub const CONFIG_ERROR_TEXT_KEY: &str = "openidconfigerrortext";

/// Host-rendered page shown instead of content when setup fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigErrorPage {
    pub title_key: &'static str,
    pub text_key: &'static str,
}

/// Credits entry shown on the host's version page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensionCredits {
    pub name: &'static str,
    pub version: &'static str,
    pub author: &'static str,
    pub url: &'static str,
    pub description: &'static str,
}

/// Credits for this extension.
pub fn credits() -> ExtensionCredits {
    ExtensionCredits {
        name: "OpenID",
        version: OPENID_EXTENSION_VERSION,
        author: "Evan Prodromou",
        url: "http://www.mediawiki.org/wiki/Extension:OpenID",
        description: "lets users login to the wiki with an OpenID and login to other \
                      OpenID-aware Web sites with their wiki user account",
    }
}

/// Style rule placing the logo in front of the login navigation entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginStyleIntent {
    pub selector: &'static str,
    pub background_image: String,
    pub padding_left_px: u32,
    pub text_transform: &'static str,
}

/// Fatal setup errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    Config(ConfigError),
    Store {
        role: StoreRole,
        source: ConfigError,
    },
    SpecialPage(SpecialPageError),
}

impl SetupError {
    /// Page the host renders instead of serving protocol traffic.
    pub fn error_page(&self) -> ConfigErrorPage {
        ConfigErrorPage {
            title_key: CONFIG_ERROR_TITLE_KEY,
            text_key: CONFIG_ERROR_TEXT_KEY,
        }
    }
}

impl Display for SetupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid OpenID configuration: {err}"),
            Self::Store { role, source } => {
                write!(f, "failed to set up {} store: {source}", role.as_str())
            }
            Self::SpecialPage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SetupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Store { source, .. } => Some(source),
            Self::SpecialPage(err) => Some(err),
        }
    }
}

impl From<ConfigError> for SetupError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<SpecialPageError> for SetupError {
    fn from(value: SpecialPageError) -> Self {
        Self::SpecialPage(value)
    }
}

/// Fully set-up extension instance.
pub struct OpenIdExtension {
    config: OpenIdConfig,
    server_store: StoreHandle,
    consumer_store: StoreHandle,
    special_pages: SpecialPageRegistry,
    preferences: PreferenceRegistry,
    discovery: DiscoveryBinder,
    navigation: NavigationHook,
}

impl OpenIdExtension {
    /// Sets up the extension with a fresh volatile backend.
    pub fn setup(config: OpenIdConfig) -> Result<Self, SetupError> {
        Self::setup_with_backend(config, &VolatileBackend::new())
    }

    /// Sets up the extension; volatile stores bind to `volatile_backend`.
    pub fn setup_with_backend(
        config: OpenIdConfig,
        volatile_backend: &VolatileBackend,
    ) -> Result<Self, SetupError> {
        let started_at = Instant::now();
        info!("event=extension_setup module=extension status=start");

        match Self::build(config, volatile_backend) {
            Ok(extension) => {
                info!(
                    "event=extension_setup module=extension status=ok duration_ms={} policy={} special_pages={}",
                    started_at.elapsed().as_millis(),
                    extension.config.show_url_on_user_page.as_str(),
                    extension.special_pages.len()
                );
                Ok(extension)
            }
            Err(err) => {
                error!(
                    "event=extension_setup module=extension status=error duration_ms={} error_page={} error={}",
                    started_at.elapsed().as_millis(),
                    err.error_page().title_key,
                    err
                );
                Err(err)
            }
        }
    }

    fn build(config: OpenIdConfig, volatile_backend: &VolatileBackend) -> Result<Self, SetupError> {
        config.validate()?;

        let server_store = create_store(StoreRole::Server, &config.server_store, volatile_backend)
            .map_err(|source| SetupError::Store {
                role: StoreRole::Server,
                source,
            })?;
        let consumer_store =
            create_store(StoreRole::Consumer, &config.consumer_store, volatile_backend).map_err(
                |source| SetupError::Store {
                    role: StoreRole::Consumer,
                    source,
                },
            )?;

        let mut special_pages = SpecialPageRegistry::new();
        special_pages.register_openid_pages()?;

        let mut preferences = PreferenceRegistry::new();
        register_preference_if_applicable(config.show_url_on_user_page, &mut preferences);

        Ok(Self {
            discovery: DiscoveryBinder::new(&config),
            navigation: NavigationHook::new(&config),
            config,
            server_store,
            consumer_store,
            special_pages,
            preferences,
        })
    }

    pub fn config(&self) -> &OpenIdConfig {
        &self.config
    }

    /// Store for provider-side associations and nonces.
    pub fn server_store(&self) -> StoreHandle {
        self.server_store.clone()
    }

    /// Store for relying-party associations and nonces.
    pub fn consumer_store(&self) -> StoreHandle {
        self.consumer_store.clone()
    }

    pub fn special_pages(&self) -> &SpecialPageRegistry {
        &self.special_pages
    }

    /// Toggles this extension contributes to the preferences page.
    pub fn preferences(&self) -> &PreferenceRegistry {
        &self.preferences
    }

    pub fn credits(&self) -> ExtensionCredits {
        credits()
    }

    pub fn login_style(&self) -> LoginStyleIntent {
        LoginStyleIntent {
            selector: "li#pt-openidlogin",
            background_image: self.config.login_logo_url.clone(),
            padding_left_px: 20,
            text_transform: "none",
        }
    }

    pub fn compute_login_link(&self, viewer: &Viewer, page: &PageContext) -> Option<NavLink> {
        self.navigation.compute_login_link(viewer, page)
    }

    pub fn bind_discovery_signals(
        &self,
        page: &PageContext,
        users: &dyn UserDirectory,
        bindings: &dyn IdentityBindings,
        output: &mut dyn PageOutput,
    ) -> DiscoveryOutcome {
        self.discovery
            .bind_discovery_signals(page, users, bindings, output)
    }

    /// Adds this extension's toggles to a host-owned preference registry.
    pub fn register_preference(&self, registry: &mut PreferenceRegistry) -> bool {
        register_preference_if_applicable(self.config.show_url_on_user_page, registry)
    }
}
