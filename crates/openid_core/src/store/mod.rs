//! Key/value persistence backends for OpenID protocol state.
//!
//! # Responsibility
//! - Define the store contract consumed by the consumer/server protocol engine
//!   (associations and nonces).
//! - Provide a shared volatile backend and a durable SQLite-backed backend.
//! - Validate store configuration and build handles once at setup.
//!
//! # Invariants
//! - Handles are read-only after construction and safe to share across threads.
//! - Keys from different volatile prefixes never collide.
//! - Expired entries are never returned by reads.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

mod durable;
mod factory;
mod kind;
pub mod migrations;
mod volatile;

pub use durable::{DurableStore, DURABLE_STORE_FILE_NAME};
pub use factory::{create_store, STORE_DIR_MODE};
pub use kind::{
    parse_store_kind, supported_store_kind_strings, StoreKind, StoreKindError, STORE_KIND_FILE,
    STORE_KIND_MEMC, STORE_KIND_MEMCACHED,
};
pub use volatile::{VolatileBackend, VolatileStore};

pub type StoreResult<T> = Result<T, StoreError>;

/// Shared handle given to the protocol engine.
pub type StoreHandle = Arc<dyn KeyValueStore>;

/// Which half of the protocol engine a store serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreRole {
    Server,
    Consumer,
}

impl StoreRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::Consumer => "consumer",
        }
    }
}

/// Key/value contract for protocol state.
///
/// `ttl = None` keeps an entry until it is deleted.
pub trait KeyValueStore: Send + Sync {
    /// Backend kind behind this handle.
    fn kind(&self) -> StoreKind;

    /// Returns the live value stored under `key`.
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Inserts or replaces the value stored under `key`.
    fn put(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> StoreResult<()>;

    /// Inserts only when no live value exists. Returns whether the insert happened.
    ///
    /// Nonce bookkeeping relies on this for single-use checks.
    fn add(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> StoreResult<bool>;

    /// Removes `key`. Returns whether a value was removed.
    fn delete(&self, key: &str) -> StoreResult<bool>;

    /// Drops expired entries owned by this handle. Returns the number removed.
    ///
    /// Reads and `add` ignore expired entries but only the volatile backend
    /// evicts them on access; durable rows stay until this runs, so the
    /// protocol engine should call it periodically.
    fn cleanup_expired(&self) -> StoreResult<usize>;
}

/// Runtime store failures.
#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    InvalidKey(String),
    LockPoisoned(&'static str),
    ReadOnly,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "store schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::InvalidKey(reason) => write!(f, "invalid store key: {reason}"),
            Self::LockPoisoned(backend) => write!(f, "{backend} store lock poisoned"),
            Self::ReadOnly => write!(f, "store database is not writable"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. }
            | Self::InvalidKey(_)
            | Self::LockPoisoned(_)
            | Self::ReadOnly => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

fn validate_key(key: &str) -> StoreResult<()> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey("key must not be empty".to_string()));
    }
    Ok(())
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

fn expiry_epoch_ms(ttl: Option<Duration>) -> Option<i64> {
    ttl.map(|ttl| {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        now_epoch_ms().saturating_add(ttl_ms)
    })
}

fn is_expired(expires_at_ms: Option<i64>, now_ms: i64) -> bool {
    matches!(expires_at_ms, Some(deadline) if deadline <= now_ms)
}

#[cfg(test)]
mod tests {
    use super::{expiry_epoch_ms, is_expired, validate_key, StoreError};
    use std::time::Duration;

    #[test]
    fn empty_keys_are_rejected() {
        let err = validate_key("").expect_err("empty key must fail");
        assert!(matches!(err, StoreError::InvalidKey(_)));
        assert!(validate_key("assoc:http://op.example/").is_ok());
    }

    #[test]
    fn entries_without_ttl_never_expire() {
        assert_eq!(expiry_epoch_ms(None), None);
        assert!(!is_expired(None, i64::MAX));
    }

    #[test]
    fn zero_ttl_expires_immediately() {
        let deadline = expiry_epoch_ms(Some(Duration::ZERO));
        assert!(is_expired(deadline, deadline.expect("deadline set")));
    }
}
