//! Personal navigation entry for federated login.

use crate::config::OpenIdConfig;
use crate::host::{PageContext, Viewer};
use crate::site::{SiteUrls, SPECIAL_OPENID_LOGIN, SPECIAL_USER_LOGOUT};

/// Key of the login entry in the personal navigation bar; also its message key.
pub const OPENID_LOGIN_LINK_KEY: &str = "openidlogin";

/// Navigation entry handed to the skin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub key: &'static str,
    pub message_key: &'static str,
    pub href: String,
    /// True while the viewer is on the login special page itself.
    pub active: bool,
}

/// Decides whether anonymous viewers get a "log in with OpenID" link.
#[derive(Debug, Clone)]
pub struct NavigationHook {
    hide_login_link: bool,
    site: SiteUrls,
}

impl NavigationHook {
    pub fn new(config: &OpenIdConfig) -> Self {
        Self {
            hide_login_link: config.hide_login_link,
            site: SiteUrls::new(&config.site),
        }
    }

    /// Returns the login link for `viewer` on `page`, if any.
    ///
    /// The link returns to the current page, except from the logout page.
    pub fn compute_login_link(&self, viewer: &Viewer, page: &PageContext) -> Option<NavLink> {
        if self.hide_login_link || viewer.is_authenticated() {
            return None;
        }

        let returnto = if page.is_special(SPECIAL_USER_LOGOUT) {
            None
        } else {
            Some(page.prefixed_url.as_str())
        };

        Some(NavLink {
            key: OPENID_LOGIN_LINK_KEY,
            message_key: OPENID_LOGIN_LINK_KEY,
            href: self.site.openid_login_url(returnto),
            active: page.is_special(SPECIAL_OPENID_LOGIN),
        })
    }
}
