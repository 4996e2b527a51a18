//! Snapshot slots: where the serialised database lives between runs.

use crate::{HospitalError, HospitalResult};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// A named place holding one serialised snapshot.
pub trait SnapshotSlot: Send {
    /// Returns `None` when nothing has been written yet.
    fn load(&self) -> HospitalResult<Option<String>>;
    fn save(&mut self, raw: &str) -> HospitalResult<()>;
}

/// A single JSON file on disk.
#[derive(Clone, Debug)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotSlot for FileSlot {
    fn load(&self) -> HospitalResult<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(HospitalError::SlotRead(e)),
        }
    }

    fn save(&mut self, raw: &str) -> HospitalResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(HospitalError::SlotWrite)?;
        }
        // Write beside the target and rename over it so a reader never sees half a snapshot.
        let staging = self.staging_path();
        std::fs::write(&staging, raw).map_err(HospitalError::SlotWrite)?;
        std::fs::rename(&staging, &self.path).map_err(HospitalError::SlotWrite)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    contents: Option<String>,
    fail_writes: bool,
    writes: usize,
}

/// An in-process slot. Clones share state, so a test can keep one clone to inspect the slot
/// or inject write failures after handing the other to the store.
#[derive(Clone, Debug, Default)]
pub struct MemorySlot {
    state: Arc<Mutex<MemoryState>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(raw: impl Into<String>) -> Self {
        let slot = Self::default();
        slot.lock().contents = Some(raw.into());
        slot
    }

    /// While set, every `save` fails as if the storage quota were exhausted.
    pub fn fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    pub fn contents(&self) -> Option<String> {
        self.lock().contents.clone()
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SnapshotSlot for MemorySlot {
    fn load(&self) -> HospitalResult<Option<String>> {
        Ok(self.lock().contents.clone())
    }

    fn save(&mut self, raw: &str) -> HospitalResult<()> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(HospitalError::SlotWrite(io::Error::new(
                io::ErrorKind::Other,
                "storage quota exceeded",
            )));
        }
        state.contents = Some(raw.to_owned());
        state.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_slot_missing_file_loads_none() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let slot = FileSlot::new(temp_dir.path().join("db.json"));
        assert!(slot.load().expect("load").is_none());
    }

    #[test]
    fn test_file_slot_creates_parent_and_replaces_contents() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("nested").join("db.json");
        let mut slot = FileSlot::new(&path);

        slot.save("{\"patients\":[]}").expect("first save");
        slot.save("{\"tasks\":[]}").expect("second save");

        assert_eq!(slot.load().expect("load").as_deref(), Some("{\"tasks\":[]}"));
        assert!(!slot.staging_path().exists(), "staging file should be renamed away");
    }

    #[test]
    fn test_memory_slot_injected_failure_keeps_previous_contents() {
        let observer = MemorySlot::new();
        let mut slot = observer.clone();
        slot.save("v1").expect("save");
        observer.fail_writes(true);

        assert!(matches!(slot.save("v2"), Err(HospitalError::SlotWrite(_))));
        assert_eq!(observer.contents().as_deref(), Some("v1"));
        assert_eq!(observer.writes(), 1);
    }
}
