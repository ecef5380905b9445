//! One named slot holding the serialized deck, overwritten on every save.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::{CardError, Result};
use crate::model::AppState;

/// Name of the storage slot; also the default data file stem.
pub const STORAGE_KEY: &str = "index-card-app-data";

pub trait BlobStore {
    /// Returns `None` when nothing has been stored yet.
    fn read(&self) -> Result<Option<String>>;
    fn write(&mut self, blob: &str) -> Result<()>;
}

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BlobStore for FileStore {
    fn read(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&self.path)?))
    }

    fn write(&mut self, blob: &str) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, blob)?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub blob: Option<String>,
    pub writes: usize,
}

impl BlobStore for MemoryStore {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.blob.clone())
    }

    fn write(&mut self, blob: &str) -> Result<()> {
        self.blob = Some(blob.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// Loads the stored deck, or the default deck when the slot is empty.
///
/// The second value reports whether load-time repair changed a stored deck,
/// in which case the caller should write the repaired state back.
pub fn load_state<S: BlobStore>(store: &S) -> Result<(AppState, bool)> {
    let Some(blob) = store.read()? else {
        info!("no stored deck, starting with default state");
        return Ok((AppState::default(), false));
    };
    let mut state: AppState = serde_json::from_str(&blob).map_err(CardError::CorruptState)?;
    let repaired = state.repair();
    if repaired {
        info!("repaired stored deck (active tab {})", state.active_tab_id);
    }
    debug!(
        "loaded {} tabs, {} cards",
        state.tabs.len(),
        state.cards.len()
    );
    Ok((state, repaired))
}

pub fn save_state<S: BlobStore>(store: &mut S, state: &AppState) -> Result<()> {
    let blob = serde_json::to_string(state).map_err(CardError::Encode)?;
    store.write(&blob)?;
    debug!("saved deck ({} bytes)", blob.len());
    Ok(())
}
