//! Contracts consumed from the host wiki.
//!
//! # Responsibility
//! - Describe the viewer, the viewed page and user records as plain data.
//! - Define the read-only lookups this core needs (user by name, identity binding).
//!
//! # Invariants
//! - User id `0` is the anonymous placeholder and never owns a binding.
//! - This core only reads bindings and preferences; writes happen in the host.

use crate::site::{encode_title, SiteUrls, SPECIAL_NAMESPACE, USER_NAMESPACE};

/// Sentinel id of the anonymous user.
pub const ANONYMOUS_USER_ID: u64 = 0;

/// The person making the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: u64,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self {
            user_id: ANONYMOUS_USER_ID,
        }
    }

    pub fn user(user_id: u64) -> Self {
        Self { user_id }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id != ANONYMOUS_USER_ID
    }
}

/// Local account as seen by this core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: u64,
    pub name: String,
    /// `hideopenid` preference; only meaningful under the user-controlled policy.
    pub hide_identifier: bool,
}

impl UserRecord {
    pub fn is_anonymous(&self) -> bool {
        self.id == ANONYMOUS_USER_ID
    }
}

/// Resolves display names to local accounts.
pub trait UserDirectory {
    fn resolve_user_by_name(&self, name: &str) -> Option<UserRecord>;
}

/// Read-only access to user ↔ identifier bindings.
pub trait IdentityBindings {
    fn lookup_identity_binding(&self, user_id: u64) -> Option<String>;
}

/// Namespace of the viewed page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Namespace {
    Main,
    User,
    Special,
    Other(String),
}

impl Namespace {
    /// Title prefix without the trailing colon; `None` for the main namespace.
    pub fn prefix(&self) -> Option<&str> {
        match self {
            Self::Main => None,
            Self::User => Some(USER_NAMESPACE),
            Self::Special => Some(SPECIAL_NAMESPACE),
            Self::Other(name) => Some(name.as_str()),
        }
    }
}

/// Request action; discovery signals only apply to plain views.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestAction {
    #[default]
    View,
    Other(String),
}

impl RequestAction {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "" | "view" => Self::View,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Everything this core needs to know about the page being served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    pub namespace: Namespace,
    /// Title text without the namespace prefix, e.g. `Alice/notes`.
    pub local_name: String,
    pub has_subpage_path: bool,
    /// Title-encoded prefixed form used for `returnto`, e.g. `User:Alice`.
    pub prefixed_url: String,
    /// Fully-qualified page URL from the host's page context. Not read by the
    /// hooks here; carried for hosts that build absolute links from it.
    pub full_url: String,
    pub action: RequestAction,
}

impl PageContext {
    /// Derives a view-request context for `namespace:local_name`.
    pub fn for_title(namespace: Namespace, local_name: impl Into<String>, site: &SiteUrls) -> Self {
        let local_name = local_name.into();
        let prefixed = match namespace.prefix() {
            Some(prefix) => format!("{prefix}:{local_name}"),
            None => local_name.clone(),
        };
        Self {
            has_subpage_path: local_name.contains('/'),
            prefixed_url: encode_title(&prefixed),
            full_url: site.title_url(&prefixed),
            namespace,
            local_name,
            action: RequestAction::View,
        }
    }

    pub fn with_action(mut self, action: RequestAction) -> Self {
        self.action = action;
        self
    }

    /// Whether this is `Special:<name>` (or one of its sub-pages).
    ///
    /// The first letter is case-insensitive, matching wiki title rules.
    pub fn is_special(&self, name: &str) -> bool {
        if self.namespace != Namespace::Special {
            return false;
        }
        let base = self
            .local_name
            .split('/')
            .next()
            .unwrap_or_default()
            .replace('_', " ");
        titles_match(&base, name)
    }

    /// A direct user profile page, not one of its sub-pages.
    pub fn is_user_profile(&self) -> bool {
        self.namespace == Namespace::User && !self.has_subpage_path
    }
}

fn titles_match(left: &str, right: &str) -> bool {
    let mut left_chars = left.chars();
    let mut right_chars = right.chars();
    match (left_chars.next(), right_chars.next()) {
        (Some(l), Some(r)) => {
            l.to_uppercase().eq(r.to_uppercase()) && left_chars.as_str() == right_chars.as_str()
        }
        (None, None) => true,
        _ => false,
    }
}
