//! Special page registry contracts.

use crate::site::{
    SPECIAL_OPENID_CONVERT, SPECIAL_OPENID_FINISH, SPECIAL_OPENID_LOGIN, SPECIAL_OPENID_SERVER,
    SPECIAL_OPENID_XRDS,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

static SPECIAL_PAGE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Za-z0-9]*$").expect("valid special page name regex"));

/// Special pages contributed by this extension, in registration order.
pub const OPENID_SPECIAL_PAGES: &[&str] = &[
    SPECIAL_OPENID_LOGIN,
    SPECIAL_OPENID_FINISH,
    SPECIAL_OPENID_SERVER,
    SPECIAL_OPENID_CONVERT,
    SPECIAL_OPENID_XRDS,
];

/// Whether a special page appears on the host's special page index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialPageListing {
    Listed,
    Unlisted,
}

/// Registered special page snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialPage {
    pub name: String,
    pub listing: SpecialPageListing,
}

impl SpecialPage {
    pub fn unlisted(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            listing: SpecialPageListing::Unlisted,
        }
    }
}

/// In-process special page registry.
#[derive(Debug, Default)]
pub struct SpecialPageRegistry {
    entries: BTreeMap<String, SpecialPage>,
}

impl SpecialPageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one page after name validation.
    pub fn register(&mut self, page: SpecialPage) -> Result<(), SpecialPageError> {
        if !SPECIAL_PAGE_NAME_RE.is_match(&page.name) {
            return Err(SpecialPageError::InvalidName(page.name));
        }
        if self.entries.contains_key(page.name.as_str()) {
            return Err(SpecialPageError::DuplicateName(page.name));
        }
        self.entries.insert(page.name.clone(), page);
        Ok(())
    }

    /// Registers every OpenID special page as unlisted.
    pub fn register_openid_pages(&mut self) -> Result<(), SpecialPageError> {
        for name in OPENID_SPECIAL_PAGES {
            self.register(SpecialPage::unlisted(*name))?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&SpecialPage> {
        self.entries.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Special page registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialPageError {
    InvalidName(String),
    DuplicateName(String),
}

impl Display for SpecialPageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(value) => write!(f, "special page name is invalid: {value}"),
            Self::DuplicateName(value) => {
                write!(f, "special page already registered: {value}")
            }
        }
    }
}

impl Error for SpecialPageError {}
