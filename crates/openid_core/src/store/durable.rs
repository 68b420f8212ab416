//! SQLite-backed durable store.
//!
//! # Invariants
//! - The database file lives directly inside the configured store directory.
//! - Returned stores have migrations fully applied.

use super::migrations::apply_migrations;
use super::{
    expiry_epoch_ms, now_epoch_ms, validate_key, KeyValueStore, StoreError, StoreKind,
    StoreResult,
};
use log::{error, info};
use rusqlite::{params, Connection, DatabaseName, OptionalExtension, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// File name of the SQLite database inside the store directory.
pub const DURABLE_STORE_FILE_NAME: &str = "openid_store.sqlite3";

/// Durable key/value store persisted in one SQLite file.
pub struct DurableStore {
    conn: Mutex<Connection>,
    dir: PathBuf,
}

impl DurableStore {
    /// Opens (or creates) the store database inside an existing directory.
    ///
    /// # Side effects
    /// - Creates the database file and applies pending migrations.
    /// - Fails with `ReadOnly` when the file or its directory rejects writes.
    /// - Emits `store_open` logging events with duration and status.
    pub fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        let started_at = Instant::now();
        info!("event=store_open module=store status=start kind=durable");

        let opened = Connection::open(dir.join(DURABLE_STORE_FILE_NAME))
            .map_err(StoreError::from)
            .and_then(|mut conn| {
                bootstrap_connection(&mut conn)?;
                Ok(conn)
            });

        match opened {
            Ok(conn) => {
                info!(
                    "event=store_open module=store status=ok kind=durable duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(Self {
                    conn: Mutex::new(conn),
                    dir,
                })
            }
            Err(err) => {
                error!(
                    "event=store_open module=store status=error kind=durable duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Directory holding the database file.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::LockPoisoned("durable"))
    }
}

fn bootstrap_connection(conn: &mut Connection) -> StoreResult<()> {
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_migrations(conn)?;
    ensure_writable(conn)
}

/// Rejects databases SQLite silently opened read-only and directories where
/// the rollback journal cannot be created.
fn ensure_writable(conn: &mut Connection) -> StoreResult<()> {
    if conn.is_readonly(DatabaseName::Main)? {
        return Err(StoreError::ReadOnly);
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    tx.execute(
        "INSERT OR REPLACE INTO kv_entries (key, value, expires_at)
         VALUES ('', x'', 0);",
        [],
    )
    .map_err(|err| match err.sqlite_error_code() {
        Some(rusqlite::ErrorCode::ReadOnly) | Some(rusqlite::ErrorCode::CannotOpen) => {
            StoreError::ReadOnly
        }
        _ => StoreError::from(err),
    })?;
    tx.rollback()?;
    Ok(())
}

impl KeyValueStore for DurableStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Durable
    }

    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        validate_key(key)?;
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value
                 FROM kv_entries
                 WHERE key = ?1
                   AND (expires_at IS NULL OR expires_at > ?2);",
                params![key, now_epoch_ms()],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> StoreResult<()> {
        validate_key(key)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO kv_entries (key, value, expires_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                expires_at = excluded.expires_at;",
            params![key, value, expiry_epoch_ms(ttl)],
        )?;
        Ok(())
    }

    fn add(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> StoreResult<bool> {
        validate_key(key)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM kv_entries
             WHERE key = ?1
               AND expires_at IS NOT NULL
               AND expires_at <= ?2;",
            params![key, now_epoch_ms()],
        )?;
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO kv_entries (key, value, expires_at)
             VALUES (?1, ?2, ?3);",
            params![key, value, expiry_epoch_ms(ttl)],
        )?;
        tx.commit()?;
        Ok(inserted == 1)
    }

    fn delete(&self, key: &str) -> StoreResult<bool> {
        validate_key(key)?;
        let conn = self.lock()?;
        let changed = conn.execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(changed > 0)
    }

    fn cleanup_expired(&self) -> StoreResult<usize> {
        let conn = self.lock()?;
        let removed = conn.execute(
            "DELETE FROM kv_entries
             WHERE expires_at IS NOT NULL
               AND expires_at <= ?1;",
            [now_epoch_ms()],
        )?;
        Ok(removed)
    }
}
