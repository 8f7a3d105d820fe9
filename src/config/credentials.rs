//! API key loading.
//!
//! Keys live either inline in the config, in a dedicated key file, or in the
//! `TICKERBAR_API_KEY` environment variable (also read from `.env`).

use crate::domain::errors::{Result, TickerError};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Reads a key file, trimming surrounding whitespace.
pub fn read_key_file(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path).map_err(|e| {
        TickerError::credential(format!("could not read API key file {:?}: {}", path, e))
    })?;

    warn_if_world_readable(path);

    let key = content.trim();
    if key.is_empty() {
        return Err(TickerError::credential(format!(
            "API key file {:?} is empty",
            path
        )));
    }

    debug!("Loaded API key from {:?}", path);
    Ok(key.to_string())
}

/// Rejects blank inline keys.
pub fn non_empty_key(key: &str, origin: &str) -> Result<String> {
    let key = key.trim();
    if key.is_empty() {
        return Err(TickerError::credential(format!("API key from {} is empty", origin)));
    }
    Ok(key.to_string())
}

#[cfg(unix)]
fn warn_if_world_readable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Ok(metadata) = fs::metadata(path) {
        let mode = metadata.permissions().mode();
        if mode & 0o077 != 0 {
            warn!(
                "API key file {:?} is accessible by other users (mode {:o}), consider chmod 600",
                path,
                mode & 0o777
            );
        }
    }
}

#[cfg(not(unix))]
fn warn_if_world_readable(_path: &Path) {}
