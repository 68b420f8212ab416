//! Store backend kinds accepted at the configuration boundary.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Closed set of protocol-state backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StoreKind {
    /// Shared in-process cache, namespaced by key prefix.
    Volatile,
    /// SQLite file inside a configured directory.
    Durable,
}

impl StoreKind {
    /// Stable label used in log events and config output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Volatile => "volatile",
            Self::Durable => "durable",
        }
    }

    /// Configuration strings that select this backend.
    pub fn config_values(self) -> &'static [&'static str] {
        match self {
            Self::Volatile => &[STORE_KIND_MEMC, STORE_KIND_MEMCACHED],
            Self::Durable => &[STORE_KIND_FILE],
        }
    }
}

/// Config value for the volatile backend.
pub const STORE_KIND_MEMC: &str = "memc";
/// Long-form alias of [`STORE_KIND_MEMC`].
pub const STORE_KIND_MEMCACHED: &str = "memcached";
/// Config value for the durable backend.
pub const STORE_KIND_FILE: &str = "file";

const SUPPORTED_STORE_KIND_STRINGS: &[&str] =
    &[STORE_KIND_MEMC, STORE_KIND_MEMCACHED, STORE_KIND_FILE];

/// Returns every accepted store kind string.
pub fn supported_store_kind_strings() -> &'static [&'static str] {
    SUPPORTED_STORE_KIND_STRINGS
}

/// Parses one store kind from its config string (case-sensitive).
pub fn parse_store_kind(value: &str) -> Result<StoreKind, StoreKindError> {
    let normalized = value.trim();
    if normalized.is_empty() {
        return Err(StoreKindError::EmptyKind);
    }

    match normalized {
        STORE_KIND_MEMC | STORE_KIND_MEMCACHED => Ok(StoreKind::Volatile),
        STORE_KIND_FILE => Ok(StoreKind::Durable),
        other => Err(StoreKindError::UnsupportedKind(other.to_string())),
    }
}

/// Store kind parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKindError {
    EmptyKind,
    UnsupportedKind(String),
}

impl Display for StoreKindError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyKind => write!(f, "store type must not be empty"),
            Self::UnsupportedKind(value) => write!(
                f,
                "store type is unsupported: {value} (expected one of {})",
                SUPPORTED_STORE_KIND_STRINGS.join("|")
            ),
        }
    }
}

impl Error for StoreKindError {}
