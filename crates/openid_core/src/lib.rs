//! OpenID identity binding core for wiki user accounts.
//! Decides which discovery and display signals a page view carries and builds
//! the protocol-state stores handed to the OpenID consumer/server engine.

pub mod config;
pub mod discovery;
pub mod extension;
pub mod host;
pub mod identifier;
pub mod logging;
pub mod navigation;
pub mod output;
pub mod preferences;
pub mod site;
pub mod store;

pub use config::{
    ConfigError, ConfigResult, LoggingConfig, OpenIdConfig, SiteConfig, StoreConfig,
    VisibilityPolicy,
};
pub use discovery::{DiscoveryBinder, DiscoveryOutcome};
pub use extension::{
    ConfigErrorPage, ExtensionCredits, LoginStyleIntent, OpenIdExtension, SetupError,
    SpecialPageRegistry,
};
pub use host::{
    IdentityBindings, Namespace, PageContext, RequestAction, UserDirectory, UserRecord, Viewer,
    ANONYMOUS_USER_ID,
};
pub use identifier::{classify, ClassifiedIdentifier, IdentifierScheme};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use navigation::{NavLink, NavigationHook};
pub use output::{
    escape_html, HttpHeader, LinkRelation, MetaTag, PageOutput, RecordedOutput, SubtitleIntent,
};
pub use preferences::{register_preference_if_applicable, PreferenceRegistry};
pub use site::SiteUrls;
pub use store::{
    create_store, KeyValueStore, StoreError, StoreHandle, StoreKind, StoreRole, VolatileBackend,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;
    use crate::extension::OPENID_EXTENSION_VERSION;

    #[test]
    fn core_version_matches_extension_version() {
        assert_eq!(core_version(), OPENID_EXTENSION_VERSION);
    }
}
