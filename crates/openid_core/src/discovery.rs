//! Per-view discovery and identifier display decisions.
//!
//! # Responsibility
//! - Decide whether the viewed page is a user profile with a known account.
//! - Show a bound identifier when the visibility policy allows it.
//! - Advertise this site's provider endpoint for users without a binding.
//!
//! # Invariants
//! - Bound users never get discovery signals; unbound users never get a subtitle.
//! - The link relation, meta tag and response header for unbound users are
//!   always emitted together. Meta tag and header carry the same URL.
//! - Lookup misses are ordinary outcomes and are only logged at debug level.

use crate::config::{OpenIdConfig, VisibilityPolicy};
use crate::host::{IdentityBindings, PageContext, RequestAction, UserDirectory, UserRecord};
use crate::identifier::classify;
use crate::output::{
    HttpHeader, LinkRelation, MetaTag, PageOutput, SubtitleIntent, OPENID_LOGO_ALT,
    OPENID_SERVER_REL, SUBTITLE_CLASS, XRDS_LOCATION_HEADER,
};
use crate::site::SiteUrls;
use log::debug;

/// Terminal state of one discovery pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryOutcome {
    /// Edits, history views and other non-view actions are left alone.
    NotAViewRequest,
    NotAUserPage,
    UserPageNoSuchUser,
    UserPageBoundVisible,
    UserPageBoundHidden,
    UserPageUnbound,
}

impl DiscoveryOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotAViewRequest => "not_a_view_request",
            Self::NotAUserPage => "not_a_user_page",
            Self::UserPageNoSuchUser => "no_such_user",
            Self::UserPageBoundVisible => "bound_visible",
            Self::UserPageBoundHidden => "bound_hidden",
            Self::UserPageUnbound => "unbound",
        }
    }
}

/// Computes discovery and display intents for profile pages.
#[derive(Debug, Clone)]
pub struct DiscoveryBinder {
    policy: VisibilityPolicy,
    logo_url: String,
    site: SiteUrls,
}

impl DiscoveryBinder {
    pub fn new(config: &OpenIdConfig) -> Self {
        Self {
            policy: config.show_url_on_user_page,
            logo_url: config.login_logo_url.clone(),
            site: SiteUrls::new(&config.site),
        }
    }

    /// Emits subtitle or discovery intents for `page` into `output`.
    pub fn bind_discovery_signals(
        &self,
        page: &PageContext,
        users: &dyn UserDirectory,
        bindings: &dyn IdentityBindings,
        output: &mut dyn PageOutput,
    ) -> DiscoveryOutcome {
        let outcome = self.bind(page, users, bindings, output);
        debug!(
            "event=discovery_bind module=discovery status=ok outcome={}",
            outcome.as_str()
        );
        outcome
    }

    fn bind(
        &self,
        page: &PageContext,
        users: &dyn UserDirectory,
        bindings: &dyn IdentityBindings,
        output: &mut dyn PageOutput,
    ) -> DiscoveryOutcome {
        if page.action != RequestAction::View {
            return DiscoveryOutcome::NotAViewRequest;
        }
        if !page.is_user_profile() {
            return DiscoveryOutcome::NotAUserPage;
        }

        let user = match users.resolve_user_by_name(&page.local_name) {
            Some(user) if !user.is_anonymous() => user,
            _ => return DiscoveryOutcome::UserPageNoSuchUser,
        };

        match bindings
            .lookup_identity_binding(user.id)
            .filter(|identifier| !identifier.is_empty())
        {
            Some(identifier) => {
                if self.policy.shows_identifier(user.hide_identifier) {
                    output.set_subtitle(self.subtitle_for(&identifier));
                    DiscoveryOutcome::UserPageBoundVisible
                } else {
                    DiscoveryOutcome::UserPageBoundHidden
                }
            }
            None => {
                self.emit_discovery_signals(&user, output);
                DiscoveryOutcome::UserPageUnbound
            }
        }
    }

    fn subtitle_for(&self, identifier: &str) -> SubtitleIntent {
        let classified = classify(identifier);
        debug!(
            "event=identifier_display module=discovery scheme={} identifier_len={}",
            classified.scheme.as_str(),
            identifier.len()
        );
        SubtitleIntent {
            css_class: SUBTITLE_CLASS,
            logo_src: self.logo_url.clone(),
            logo_alt: OPENID_LOGO_ALT,
            href: classified.canonical_url,
            text: identifier.to_string(),
        }
    }

    // Some discovery clients only read the meta tag, others only the header.
    fn emit_discovery_signals(&self, user: &UserRecord, output: &mut dyn PageOutput) {
        let xrds_url = self.site.xrds_url(&user.name);
        output.add_link(LinkRelation {
            rel: OPENID_SERVER_REL.to_string(),
            href: self.site.openid_server_url(),
        });
        output.add_meta(MetaTag {
            name: XRDS_LOCATION_HEADER.to_string(),
            content: xrds_url.clone(),
            http_equiv: true,
        });
        output.add_header(HttpHeader {
            name: XRDS_LOCATION_HEADER.to_string(),
            value: xrds_url,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::{DiscoveryBinder, DiscoveryOutcome};
    use crate::config::{OpenIdConfig, SiteConfig, StoreConfig, VisibilityPolicy};
    use crate::host::{IdentityBindings, Namespace, PageContext, UserDirectory, UserRecord};
    use crate::output::RecordedOutput;
    use crate::site::SiteUrls;

    struct SingleUser(UserRecord, Option<String>);

    impl UserDirectory for SingleUser {
        fn resolve_user_by_name(&self, name: &str) -> Option<UserRecord> {
            (self.0.name == name).then(|| self.0.clone())
        }
    }

    impl IdentityBindings for SingleUser {
        fn lookup_identity_binding(&self, user_id: u64) -> Option<String> {
            (self.0.id == user_id).then(|| self.1.clone()).flatten()
        }
    }

    fn config(policy: VisibilityPolicy) -> OpenIdConfig {
        let mut config = OpenIdConfig::new(
            SiteConfig::new("https://wiki.example"),
            StoreConfig::Volatile {
                prefix: "s".to_string(),
            },
            StoreConfig::Volatile {
                prefix: "c".to_string(),
            },
        );
        config.show_url_on_user_page = policy;
        config
    }

    #[test]
    fn empty_binding_counts_as_unbound() {
        let config = config(VisibilityPolicy::Always);
        let host = SingleUser(
            UserRecord {
                id: 3,
                name: "Carol".to_string(),
                hide_identifier: false,
            },
            Some(String::new()),
        );
        let page = PageContext::for_title(Namespace::User, "Carol", &SiteUrls::new(&config.site));
        let mut output = RecordedOutput::new();

        let outcome =
            DiscoveryBinder::new(&config).bind_discovery_signals(&page, &host, &host, &mut output);

        assert_eq!(outcome, DiscoveryOutcome::UserPageUnbound);
        assert!(output.subtitles.is_empty());
        assert_eq!(output.links.len(), 1);
    }

    #[test]
    fn never_policy_hides_even_when_user_allows() {
        let config = config(VisibilityPolicy::Never);
        let host = SingleUser(
            UserRecord {
                id: 4,
                name: "Dave".to_string(),
                hide_identifier: false,
            },
            Some("http://dave.example/".to_string()),
        );
        let page = PageContext::for_title(Namespace::User, "Dave", &SiteUrls::new(&config.site));
        let mut output = RecordedOutput::new();

        let outcome =
            DiscoveryBinder::new(&config).bind_discovery_signals(&page, &host, &host, &mut output);

        assert_eq!(outcome, DiscoveryOutcome::UserPageBoundHidden);
        assert!(output.is_empty());
    }
}
