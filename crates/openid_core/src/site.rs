//! Wiki URL construction for titles and OpenID special pages.

use crate::config::SiteConfig;
use url::form_urlencoded;

/// Canonical prefix of the special page namespace.
pub const SPECIAL_NAMESPACE: &str = "Special";
/// Canonical prefix of the user namespace.
pub const USER_NAMESPACE: &str = "User";

/// Login entry point for federated identities.
pub const SPECIAL_OPENID_LOGIN: &str = "OpenIDLogin";
/// Return point after the provider redirects back.
pub const SPECIAL_OPENID_FINISH: &str = "OpenIDFinish";
/// Identity-provider endpoint advertised as `openid.server`.
pub const SPECIAL_OPENID_SERVER: &str = "OpenIDServer";
/// Converts an existing account to an OpenID-bound one.
pub const SPECIAL_OPENID_CONVERT: &str = "OpenIDConvert";
/// Per-user XRDS discovery document.
pub const SPECIAL_OPENID_XRDS: &str = "OpenIDXRDS";
/// Host logout page; login links never return to it.
pub const SPECIAL_USER_LOGOUT: &str = "Userlogout";

// Percent-escapes restored after form encoding so titles keep readable paths.
const TITLE_SAFE_ESCAPES: &[(&str, &str)] = &[
    ("%3B", ";"),
    ("%40", "@"),
    ("%24", "$"),
    ("%21", "!"),
    ("%2A", "*"),
    ("%28", "("),
    ("%29", ")"),
    ("%2C", ","),
    ("%2F", "/"),
    ("%7E", "~"),
    ("%3A", ":"),
];

/// Encodes a page title for use in a URL path or `returnto` value.
///
/// Spaces become underscores; `;@$!*(),/~:` stay literal.
pub fn encode_title(title: &str) -> String {
    let underscored = title.trim().replace(' ', "_");
    let mut encoded: String = form_urlencoded::byte_serialize(underscored.as_bytes()).collect();
    for (escape, literal) in TITLE_SAFE_ESCAPES {
        encoded = encoded.replace(escape, literal);
    }
    encoded
}

/// Builds fully-qualified wiki URLs from the site configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteUrls {
    server: String,
    article_path: String,
}

impl SiteUrls {
    pub fn new(site: &SiteConfig) -> Self {
        Self {
            server: site.server.trim_end_matches('/').to_string(),
            article_path: site.article_path.clone(),
        }
    }

    /// Fully-qualified URL of a prefixed title such as `User:Alice`.
    pub fn title_url(&self, prefixed_title: &str) -> String {
        format!(
            "{}{}",
            self.server,
            self.article_path.replace("$1", &encode_title(prefixed_title))
        )
    }

    /// Same as [`Self::title_url`] with a pre-encoded query string appended.
    pub fn title_url_with_query(&self, prefixed_title: &str, query: &str) -> String {
        let base = self.title_url(prefixed_title);
        if query.is_empty() {
            return base;
        }
        let separator = if base.contains('?') { '&' } else { '?' };
        format!("{base}{separator}{query}")
    }

    /// URL of `Special:<name>` or `Special:<name>/<subpage>`.
    pub fn special_page_url(&self, name: &str, subpage: Option<&str>) -> String {
        self.title_url(&special_title(name, subpage))
    }

    /// Identity-provider endpoint advertised through `openid.server`.
    pub fn openid_server_url(&self) -> String {
        self.special_page_url(SPECIAL_OPENID_SERVER, None)
    }

    /// Per-user XRDS discovery document location.
    pub fn xrds_url(&self, user_name: &str) -> String {
        self.special_page_url(SPECIAL_OPENID_XRDS, Some(user_name))
    }

    /// Login special page, optionally returning to `returnto` (already title-encoded).
    pub fn openid_login_url(&self, returnto: Option<&str>) -> String {
        let title = special_title(SPECIAL_OPENID_LOGIN, None);
        match returnto {
            Some(target) => self.title_url_with_query(&title, &format!("returnto={target}")),
            None => self.title_url(&title),
        }
    }
}

fn special_title(name: &str, subpage: Option<&str>) -> String {
    match subpage {
        Some(subpage) => format!("{SPECIAL_NAMESPACE}:{name}/{subpage}"),
        None => format!("{SPECIAL_NAMESPACE}:{name}"),
    }
}

#[cfg(test)]
mod tests {
    use super::{encode_title, SiteUrls};
    use crate::config::SiteConfig;

    fn site() -> SiteUrls {
        SiteUrls::new(&SiteConfig::new("https://wiki.example/"))
    }

    #[test]
    fn encode_title_keeps_path_characters_readable() {
        assert_eq!(encode_title("User:Alice Smith"), "User:Alice_Smith");
        assert_eq!(encode_title("Special:OpenIDXRDS/Bob"), "Special:OpenIDXRDS/Bob");
        assert_eq!(encode_title("Q&A?"), "Q%26A%3F");
    }

    #[test]
    fn xrds_url_is_fully_qualified() {
        assert_eq!(
            site().xrds_url("Alice"),
            "https://wiki.example/wiki/Special:OpenIDXRDS/Alice"
        );
    }

    #[test]
    fn server_url_points_at_special_page() {
        assert_eq!(
            site().openid_server_url(),
            "https://wiki.example/wiki/Special:OpenIDServer"
        );
    }

    #[test]
    fn query_separator_follows_article_path_shape() {
        let pretty = site();
        assert_eq!(
            pretty.openid_login_url(Some("Main_Page")),
            "https://wiki.example/wiki/Special:OpenIDLogin?returnto=Main_Page"
        );

        let mut config = SiteConfig::new("https://wiki.example");
        config.article_path = "/index.php?title=$1".to_string();
        let script = SiteUrls::new(&config);
        assert_eq!(
            script.openid_login_url(Some("Main_Page")),
            "https://wiki.example/index.php?title=Special:OpenIDLogin&returnto=Main_Page"
        );
        assert_eq!(
            script.openid_login_url(None),
            "https://wiki.example/index.php?title=Special:OpenIDLogin"
        );
    }
}
