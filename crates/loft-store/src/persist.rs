use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::info;

use crate::snapshot::Workspace;

/// The persistence boundary: load one opaque snapshot at startup, replace it
/// wholesale after every mutation. The store does not care what sits behind
/// this.
pub trait SnapshotBackend: Send + Sync {
    fn load(&self) -> Result<Option<Workspace>>;
    fn save(&self, ws: &Workspace) -> Result<()>;
}

/// Whole-snapshot JSON file. Written via a temp file and rename so a crash
/// mid-write never leaves a truncated snapshot behind.
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SnapshotBackend for JsonFileBackend {
    fn load(&self) -> Result<Option<Workspace>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("reading snapshot {}", self.path.display()))?;
        let ws = serde_json::from_str(&raw)
            .with_context(|| format!("parsing snapshot {}", self.path.display()))?;
        info!("Snapshot loaded from {}", self.path.display());
        Ok(Some(ws))
    }

    fn save(&self, ws: &Workspace) -> Result<()> {
        let raw = serde_json::to_vec_pretty(ws).context("serializing snapshot")?;
        let tmp = tmp_path(&self.path);
        fs::write(&tmp, &raw).with_context(|| format!("writing snapshot {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing snapshot {}", self.path.display()))?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

/// Keeps the last snapshot in memory. Used by tests.
#[derive(Default)]
pub struct MemoryBackend {
    last: Mutex<Option<Workspace>>,
}

impl SnapshotBackend for MemoryBackend {
    fn load(&self) -> Result<Option<Workspace>> {
        Ok(self.lock().clone())
    }

    fn save(&self, ws: &Workspace) -> Result<()> {
        *self.lock() = Some(ws.clone());
        Ok(())
    }
}

impl MemoryBackend {
    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Workspace>> {
        // A panicked saver leaves a whole, older snapshot behind.
        self.last
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
