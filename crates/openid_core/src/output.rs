//! Structured page-output intents handed to the host renderer.
//!
//! This core never builds markup. It records what should appear (subtitle,
//! link relations, meta tags, response headers) and the renderer escapes and
//! serialises it.

/// Link relation advertising the identity-provider endpoint.
pub const OPENID_SERVER_REL: &str = "openid.server";
/// Meta tag and response header carrying the XRDS document location.
pub const XRDS_LOCATION_HEADER: &str = "X-XRDS-Location";
/// Alt text of the logo in the identifier subtitle.
pub const OPENID_LOGO_ALT: &str = "OpenID";
/// CSS class of the subtitle wrapper.
pub const SUBTITLE_CLASS: &str = "subpages";

/// Profile subtitle: logo followed by a link to the bound identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleIntent {
    pub css_class: &'static str,
    pub logo_src: String,
    pub logo_alt: &'static str,
    pub href: String,
    /// Raw identifier; renderers must escape it (see [`Self::escaped_text`]).
    pub text: String,
}

impl SubtitleIntent {
    pub fn escaped_text(&self) -> String {
        escape_html(&self.text)
    }
}

/// `<link rel=... href=...>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRelation {
    pub rel: String,
    pub href: String,
}

/// `<meta>` entry; `http_equiv` selects `http-equiv` over `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaTag {
    pub name: String,
    pub content: String,
    pub http_equiv: bool,
}

/// Raw HTTP response header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpHeader {
    pub name: String,
    pub value: String,
}

/// Sink implemented by the host page renderer.
pub trait PageOutput {
    fn set_subtitle(&mut self, subtitle: SubtitleIntent);
    fn add_link(&mut self, link: LinkRelation);
    fn add_meta(&mut self, meta: MetaTag);
    fn add_header(&mut self, header: HttpHeader);
}

/// In-memory sink that keeps every intent, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordedOutput {
    pub subtitles: Vec<SubtitleIntent>,
    pub links: Vec<LinkRelation>,
    pub meta: Vec<MetaTag>,
    pub headers: Vec<HttpHeader>,
}

impl RecordedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.subtitles.is_empty()
            && self.links.is_empty()
            && self.meta.is_empty()
            && self.headers.is_empty()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|header| header.name.eq_ignore_ascii_case(name))
            .map(|header| header.value.as_str())
    }
}

impl PageOutput for RecordedOutput {
    fn set_subtitle(&mut self, subtitle: SubtitleIntent) {
        self.subtitles.push(subtitle);
    }

    fn add_link(&mut self, link: LinkRelation) {
        self.links.push(link);
    }

    fn add_meta(&mut self, meta: MetaTag) {
        self.meta.push(meta);
    }

    fn add_header(&mut self, header: HttpHeader) {
        self.headers.push(header);
    }
}

/// Escapes `& < > "` for HTML text and double-quoted attributes.
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}
