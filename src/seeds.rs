//! Seed store and rotation state persistence.
//!
//! Both files are plain JSON next to the site checkout. A missing or
//! unparseable file falls back to defaults so a fresh checkout runs without
//! setup; saving the rotation state is a hard error because losing it would
//! silently skip or repeat seeds.

use crate::error::{AutopostError, Result};
use crate::models::{RotationState, SeedFile};
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

/// Load the seed file, falling back to empty defaults when it is missing or
/// not valid JSON.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn load_seed_file(path: &Path) -> SeedFile {
    match fs::read_to_string(path).await {
        Ok(raw) => match serde_json::from_str(&raw) {
            Ok(seeds) => seeds,
            Err(e) => {
                warn!(error = %e, "seed file is not valid JSON; using empty defaults");
                SeedFile::default()
            }
        },
        Err(e) => {
            debug!(error = %e, "seed file missing; using empty defaults");
            SeedFile::default()
        }
    }
}

/// Load the rotation state, falling back to an empty state when the file is
/// missing or not valid JSON.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn load_state(path: &Path) -> RotationState {
    match fs::read_to_string(path).await {
        Ok(raw) => match serde_json::from_str(&raw) {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "state file is not valid JSON; starting a fresh rotation");
                RotationState::default()
            }
        },
        Err(e) => {
            debug!(error = %e, "state file missing; starting a fresh rotation");
            RotationState::default()
        }
    }
}

/// Persist the rotation state, creating parent directories as needed.
pub async fn save_state(state: &RotationState, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await.map_err(|e| AutopostError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }

    let json = serde_json::to_string_pretty(state).map_err(|e| AutopostError::Write {
        path: path.to_path_buf(),
        source: std::io::Error::other(e),
    })?;
    fs::write(path, json).await.map_err(|e| AutopostError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Pick the next unused seed index, in list order.
///
/// Returns `None` for an empty seed list. When every index has been used,
/// the rotation resets: `usedIndexes` is cleared, the cleared state is
/// persisted immediately, and index 0 is returned for reuse in this same
/// run.
#[instrument(level = "info", skip_all)]
pub async fn pick_next_seed(
    seeds: &SeedFile,
    state: &mut RotationState,
    state_path: &Path,
) -> Result<Option<usize>> {
    if seeds.items.is_empty() {
        return Ok(None);
    }

    if let Some(index) = (0..seeds.items.len()).find(|i| !state.usedIndexes.contains(i)) {
        debug!(index, "picked next unused seed");
        return Ok(Some(index));
    }

    info!(total = seeds.items.len(), "all seeds used; resetting rotation");
    state.usedIndexes.clear();
    save_state(state, state_path).await?;
    Ok(Some(0))
}

/// Record `index` as used and persist the state. Called only after the whole
/// run succeeded, so a failed run leaves the seed eligible for retry.
pub async fn mark_used(state: &mut RotationState, index: usize, state_path: &Path) -> Result<()> {
    state.usedIndexes.push(index);
    save_state(state, state_path).await
}
