//! Federated identifier classification.
//!
//! # Responsibility
//! - Decide whether a bound identifier is a plain URL or an XRI i-name.
//! - Compute the browser-resolvable URL used when linking to the identifier.
//!
//! # Invariants
//! - Classification is a pure function of the string prefix; no network access.
//! - URL identifiers are returned unchanged.
//! - XRI identifiers resolve through the fixed proxy resolver endpoint.

/// Scheme marker that prefixes fully-qualified XRI identifiers (case-sensitive).
pub const XRI_SCHEME_MARKER: &str = "xri://";
/// Proxy resolver endpoint used to dereference XRI i-names in a browser.
pub const XRI_PROXY_RESOLVER: &str = "http://xri.net/";

/// Addressing scheme of one federated identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierScheme {
    /// Already a dereferenceable web address.
    Url,
    /// XRI i-name that must go through the proxy resolver.
    Xri,
}

impl IdentifierScheme {
    /// Stable lowercase label used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::Xri => "xri",
        }
    }
}

/// Classification result for one raw identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedIdentifier {
    pub scheme: IdentifierScheme,
    /// Canonical, browser-resolvable URL for display links.
    pub canonical_url: String,
}

/// Classifies `identifier` and computes its canonical URL.
///
/// Empty input is returned unchanged as a URL identifier; callers guard
/// against unbound identifiers before calling.
pub fn classify(identifier: &str) -> ClassifiedIdentifier {
    if identifier.starts_with(XRI_SCHEME_MARKER) {
        ClassifiedIdentifier {
            scheme: IdentifierScheme::Xri,
            canonical_url: xri_to_url(identifier),
        }
    } else {
        ClassifiedIdentifier {
            scheme: IdentifierScheme::Url,
            canonical_url: identifier.to_string(),
        }
    }
}

/// Strips the XRI scheme marker, or returns the input when it is absent.
pub fn xri_base(xri: &str) -> &str {
    xri.strip_prefix(XRI_SCHEME_MARKER).unwrap_or(xri)
}

/// Builds the proxy resolver URL for one XRI.
pub fn xri_to_url(xri: &str) -> String {
    format!("{XRI_PROXY_RESOLVER}{}", xri_base(xri))
}

/// Shorthand for `classify(identifier).canonical_url`.
pub fn to_display_url(identifier: &str) -> String {
    classify(identifier).canonical_url
}
