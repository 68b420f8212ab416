//! Store construction for one protocol role.

use super::{DurableStore, StoreHandle, StoreRole, VolatileBackend, VolatileStore};
use crate::config::{is_blank_path, ConfigError, ConfigResult, StoreConfig};
use log::{error, info};
use std::fs::DirBuilder;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Permission bits for auto-created store directories (owner+group rwx).
pub const STORE_DIR_MODE: u32 = 0o770;

/// Validates `config` and builds the store handle for `role`.
///
/// Volatile stores bind to `volatile_backend` under their prefix. Durable
/// stores auto-create their directory and open the database inside it.
///
/// # Errors
/// - `MissingStorePrefix` / `MissingStorePath` for blank locations.
/// - `UncreatableStorePath` when the directory cannot be created.
/// - `UnusableStorePath` when the database cannot be opened or migrated.
pub fn create_store(
    role: StoreRole,
    config: &StoreConfig,
    volatile_backend: &VolatileBackend,
) -> ConfigResult<StoreHandle> {
    let started_at = Instant::now();
    let kind = config.kind();
    info!(
        "event=store_create module=store status=start role={} kind={}",
        role.as_str(),
        kind.as_str()
    );

    let result = match config {
        StoreConfig::Volatile { prefix } => create_volatile(prefix, volatile_backend),
        StoreConfig::Durable { path } => create_durable(path),
    };

    match &result {
        Ok(_) => info!(
            "event=store_create module=store status=ok role={} kind={} duration_ms={}",
            role.as_str(),
            kind.as_str(),
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=store_create module=store status=error role={} kind={} duration_ms={} error={}",
            role.as_str(),
            kind.as_str(),
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

fn create_volatile(prefix: &str, backend: &VolatileBackend) -> ConfigResult<StoreHandle> {
    if prefix.trim().is_empty() {
        return Err(ConfigError::MissingStorePrefix);
    }
    Ok(Arc::new(VolatileStore::new(backend.clone(), prefix)))
}

fn create_durable(path: &Path) -> ConfigResult<StoreHandle> {
    if is_blank_path(path) {
        return Err(ConfigError::MissingStorePath);
    }
    ensure_store_dir(path)?;
    let store = DurableStore::open(path).map_err(|err| ConfigError::UnusableStorePath {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    Ok(Arc::new(store))
}

fn ensure_store_dir(path: &Path) -> ConfigResult<()> {
    if path.is_dir() {
        return Ok(());
    }

    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(STORE_DIR_MODE);
    }

    builder
        .create(path)
        .map_err(|err| ConfigError::UncreatableStorePath {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
    info!(
        "event=store_dir_create module=store status=ok mode={:o}",
        STORE_DIR_MODE
    );
    Ok(())
}
