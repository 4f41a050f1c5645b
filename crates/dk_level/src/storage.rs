//! Level persistence.
//!
//! `LevelStore` is the port the editor and game-start code talk to. It never
//! fails loudly: a save that cannot be written is logged and dropped, and a
//! slot that is missing or unreadable loads as `None` so the caller can fall
//! back to the default level.
//!
//! The text itself lives in a named slot of a `SlotBackend`. The desktop build
//! keeps one JSON file per slot; tests use the in-memory backend.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::LevelData;

/// Well-known slot holding the one editable level.
pub const LEVEL_SLOT: &str = "dadkin_level";

pub trait LevelStore {
    fn save(&mut self, level: &LevelData);
    fn load(&self) -> Option<LevelData>;
}

/// Raw key-value text slots.
pub trait SlotBackend {
    fn read(&self, key: &str) -> Result<Option<String>, String>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), String>;
}

#[derive(Debug, Clone)]
pub struct FileSlots {
    dir: PathBuf,
}

impl FileSlots {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SlotBackend for FileSlots {
    fn read(&self, key: &str) -> Result<Option<String>, String> {
        let path = self.slot_path(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), String> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| format!("Failed to create {}: {e}", self.dir.display()))?;
        let path = self.slot_path(key);
        // Write-then-rename so a crash mid-write never leaves a truncated slot.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| format!("Failed to write {}: {e}", tmp.display()))?;
        fs::rename(&tmp, &path).map_err(|e| {
            format!(
                "Failed to move {} to {}: {e}",
                tmp.display(),
                path.display()
            )
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemorySlots {
    slots: HashMap<String, String>,
}

impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.slots.get(key).map(String::as_str)
    }
}

impl SlotBackend for MemorySlots {
    fn read(&self, key: &str) -> Result<Option<String>, String> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), String> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Stores `LevelData` as JSON in a single slot.
#[derive(Debug, Clone)]
pub struct JsonLevelStore<B> {
    backend: B,
    slot: String,
}

impl<B: SlotBackend> JsonLevelStore<B> {
    pub fn new(backend: B) -> Self {
        Self::with_slot(backend, LEVEL_SLOT)
    }

    pub fn with_slot(backend: B, slot: &str) -> Self {
        Self {
            backend,
            slot: slot.to_string(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    fn try_save(&mut self, level: &LevelData) -> Result<(), String> {
        let text = serde_json::to_string(level)
            .map_err(|e| format!("Failed to serialize level '{}': {e}", level.name))?;
        self.backend.write(&self.slot, &text)
    }

    fn try_load(&self) -> Result<Option<LevelData>, String> {
        let Some(text) = self.backend.read(&self.slot)? else {
            return Ok(None);
        };
        if text.trim().is_empty() {
            return Ok(None);
        }
        let level: LevelData = serde_json::from_str(&text)
            .map_err(|e| format!("Failed to parse level slot '{}': {e}", self.slot))?;
        level.validate()?;
        Ok(Some(level))
    }
}

impl JsonLevelStore<FileSlots> {
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(FileSlots::new(dir))
    }
}

impl<B: SlotBackend> LevelStore for JsonLevelStore<B> {
    fn save(&mut self, level: &LevelData) {
        if let Err(err) = self.try_save(level) {
            log::warn!("Could not save level: {err}");
        }
    }

    fn load(&self) -> Option<LevelData> {
        match self.try_load() {
            Ok(level) => level,
            Err(err) => {
                log::warn!("Could not load level: {err}");
                None
            }
        }
    }
}
