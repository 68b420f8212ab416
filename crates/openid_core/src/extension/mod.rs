//! Extension wiring.
//!
//! Setup validates configuration, builds the protocol stores and registers
//! special pages once; the resulting [`OpenIdExtension`] serves the
//! per-request hooks.

pub mod setup;
pub mod special_pages;

pub use setup::{
    credits, ConfigErrorPage, ExtensionCredits, LoginStyleIntent, OpenIdExtension, SetupError,
    CONFIG_ERROR_TEXT_KEY, CONFIG_ERROR_TITLE_KEY, OPENID_EXTENSION_VERSION,
};
pub use special_pages::{
    SpecialPage, SpecialPageError, SpecialPageListing, SpecialPageRegistry, OPENID_SPECIAL_PAGES,
};
