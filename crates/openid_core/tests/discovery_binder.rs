use openid_core::{
    DiscoveryBinder, DiscoveryOutcome, IdentityBindings, Namespace, OpenIdConfig, PageContext,
    RecordedOutput, RequestAction, SiteConfig, SiteUrls, StoreConfig, UserDirectory, UserRecord,
    VisibilityPolicy,
};
use std::collections::HashMap;

#[derive(Default)]
struct FakeWiki {
    users: HashMap<String, UserRecord>,
    bindings: HashMap<u64, String>,
}

impl FakeWiki {
    fn with_user(mut self, id: u64, name: &str, hide_identifier: bool) -> Self {
        self.users.insert(
            name.to_string(),
            UserRecord {
                id,
                name: name.to_string(),
                hide_identifier,
            },
        );
        self
    }

    fn with_binding(mut self, id: u64, identifier: &str) -> Self {
        self.bindings.insert(id, identifier.to_string());
        self
    }
}

impl UserDirectory for FakeWiki {
    fn resolve_user_by_name(&self, name: &str) -> Option<UserRecord> {
        self.users.get(name).cloned()
    }
}

impl IdentityBindings for FakeWiki {
    fn lookup_identity_binding(&self, user_id: u64) -> Option<String> {
        self.bindings.get(&user_id).cloned()
    }
}

fn config(policy: VisibilityPolicy) -> OpenIdConfig {
    let mut config = OpenIdConfig::new(
        SiteConfig::new("https://wiki.example"),
        StoreConfig::Volatile {
            prefix: "openid:server:".to_string(),
        },
        StoreConfig::Volatile {
            prefix: "openid:consumer:".to_string(),
        },
    );
    config.show_url_on_user_page = policy;
    config.login_logo_url = "https://wiki.example/openid-logo.gif".to_string();
    config
}

fn user_page(config: &OpenIdConfig, name: &str) -> PageContext {
    PageContext::for_title(Namespace::User, name, &SiteUrls::new(&config.site))
}

fn bind(
    config: &OpenIdConfig,
    wiki: &FakeWiki,
    page: &PageContext,
) -> (DiscoveryOutcome, RecordedOutput) {
    let mut output = RecordedOutput::new();
    let outcome =
        DiscoveryBinder::new(config).bind_discovery_signals(page, wiki, wiki, &mut output);
    (outcome, output)
}

#[test]
fn unbound_profile_emits_all_three_discovery_signals() {
    let config = config(VisibilityPolicy::UserControlled);
    let wiki = FakeWiki::default().with_user(1, "Alice", false);

    let (outcome, output) = bind(&config, &wiki, &user_page(&config, "Alice"));

    assert_eq!(outcome, DiscoveryOutcome::UserPageUnbound);
    assert!(output.subtitles.is_empty());

    assert_eq!(output.links.len(), 1);
    assert_eq!(output.links[0].rel, "openid.server");
    assert_eq!(
        output.links[0].href,
        "https://wiki.example/wiki/Special:OpenIDServer"
    );

    let expected = "https://wiki.example/wiki/Special:OpenIDXRDS/Alice";
    assert_eq!(output.meta.len(), 1);
    assert_eq!(output.meta[0].name, "X-XRDS-Location");
    assert!(output.meta[0].http_equiv);
    assert_eq!(output.meta[0].content, expected);
    assert_eq!(output.headers.len(), 1);
    assert_eq!(output.header("X-XRDS-Location"), Some(expected));
}

#[test]
fn bound_profile_with_always_policy_shows_identifier() {
    let config = config(VisibilityPolicy::Always);
    let wiki = FakeWiki::default()
        .with_user(2, "Bob", true)
        .with_binding(2, "http://bob.example/");

    let (outcome, output) = bind(&config, &wiki, &user_page(&config, "Bob"));

    assert_eq!(outcome, DiscoveryOutcome::UserPageBoundVisible);
    assert_eq!(output.subtitles.len(), 1);
    let subtitle = &output.subtitles[0];
    assert_eq!(subtitle.href, "http://bob.example/");
    assert_eq!(subtitle.escaped_text(), "http://bob.example/");
    assert_eq!(subtitle.logo_src, "https://wiki.example/openid-logo.gif");
    assert_eq!(subtitle.logo_alt, "OpenID");
    assert!(output.links.is_empty());
    assert!(output.meta.is_empty());
    assert!(output.headers.is_empty());
}

#[test]
fn user_controlled_policy_respects_hide_preference() {
    let config = config(VisibilityPolicy::UserControlled);
    let wiki = FakeWiki::default()
        .with_user(2, "Bob", true)
        .with_binding(2, "http://bob.example/");

    let (outcome, output) = bind(&config, &wiki, &user_page(&config, "Bob"));

    assert_eq!(outcome, DiscoveryOutcome::UserPageBoundHidden);
    assert!(output.is_empty());
}

#[test]
fn user_controlled_policy_shows_identifier_by_default() {
    let config = config(VisibilityPolicy::UserControlled);
    let wiki = FakeWiki::default()
        .with_user(2, "Bob", false)
        .with_binding(2, "http://bob.example/");

    let (outcome, output) = bind(&config, &wiki, &user_page(&config, "Bob"));

    assert_eq!(outcome, DiscoveryOutcome::UserPageBoundVisible);
    assert_eq!(output.subtitles.len(), 1);
}

#[test]
fn xri_identifier_links_through_proxy_resolver() {
    let config = config(VisibilityPolicy::Always);
    let wiki = FakeWiki::default()
        .with_user(5, "Eve", false)
        .with_binding(5, "xri://=eve<dev>");

    let (_, output) = bind(&config, &wiki, &user_page(&config, "Eve"));

    let subtitle = &output.subtitles[0];
    assert_eq!(subtitle.href, "http://xri.net/=eve<dev>");
    assert_eq!(subtitle.text, "xri://=eve<dev>");
    assert_eq!(subtitle.escaped_text(), "xri://=eve&lt;dev&gt;");
}

#[test]
fn user_sub_page_is_ignored_regardless_of_binding() {
    let config = config(VisibilityPolicy::Always);
    let unbound = FakeWiki::default().with_user(1, "Alice", false);
    let bound = FakeWiki::default()
        .with_user(1, "Alice", false)
        .with_binding(1, "http://alice.example/");
    let page = user_page(&config, "Alice/notes");

    for wiki in [unbound, bound] {
        let (outcome, output) = bind(&config, &wiki, &page);
        assert_eq!(outcome, DiscoveryOutcome::NotAUserPage);
        assert!(output.is_empty());
    }
}

#[test]
fn pages_outside_user_namespace_are_ignored() {
    let config = config(VisibilityPolicy::Always);
    let wiki = FakeWiki::default().with_user(1, "Alice", false);
    let page = PageContext::for_title(Namespace::Main, "Alice", &SiteUrls::new(&config.site));

    let (outcome, output) = bind(&config, &wiki, &page);

    assert_eq!(outcome, DiscoveryOutcome::NotAUserPage);
    assert!(output.is_empty());
}

#[test]
fn unknown_and_anonymous_users_get_no_signals() {
    let config = config(VisibilityPolicy::Always);
    let wiki = FakeWiki::default().with_user(0, "127.0.0.1", false);

    for name in ["Nobody", "127.0.0.1"] {
        let (outcome, output) = bind(&config, &wiki, &user_page(&config, name));
        assert_eq!(outcome, DiscoveryOutcome::UserPageNoSuchUser);
        assert!(output.is_empty());
    }
}

#[test]
fn non_view_actions_are_ignored() {
    let config = config(VisibilityPolicy::Always);
    let wiki = FakeWiki::default().with_user(1, "Alice", false);
    let page = user_page(&config, "Alice").with_action(RequestAction::parse("edit"));

    let (outcome, output) = bind(&config, &wiki, &page);

    assert_eq!(outcome, DiscoveryOutcome::NotAViewRequest);
    assert!(output.is_empty());
}

#[test]
fn xrds_location_encodes_user_names_with_spaces() {
    let config = config(VisibilityPolicy::Always);
    let wiki = FakeWiki::default().with_user(9, "Ann Lee", false);

    let (_, output) = bind(&config, &wiki, &user_page(&config, "Ann Lee"));

    let expected = "https://wiki.example/wiki/Special:OpenIDXRDS/Ann_Lee";
    assert_eq!(output.meta[0].content, expected);
    assert_eq!(output.header("X-XRDS-Location"), Some(expected));
}
