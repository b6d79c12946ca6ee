use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Keeps every slot as `<key>.json` under a base directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        Path::new(&self.base_path).join(format!("{}.json", key))
    }
}

impl Storage for LocalStorage {
    fn read_slot(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.slot_path(key)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_slot(&self, key: &str, data: &[u8]) -> Result<()> {
        let full_path = self.slot_path(key);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}

/// In-process slots. Writes can be made to fail to simulate a full disk.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: RefCell<HashMap<String, Vec<u8>>>,
    fail_writes: Cell<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot(key: &str, data: impl Into<Vec<u8>>) -> Self {
        let storage = Self::new();
        storage.slots.borrow_mut().insert(key.to_string(), data.into());
        storage
    }

    pub fn slot(&self, key: &str) -> Option<Vec<u8>> {
        self.slots.borrow().get(key).cloned()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

impl Storage for MemoryStorage {
    fn read_slot(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.slot(key))
    }

    fn write_slot(&self, key: &str, data: &[u8]) -> Result<()> {
        if self.fail_writes.get() {
            return Err(std::io::Error::other("storage quota exceeded").into());
        }
        self.slots.borrow_mut().insert(key.to_string(), data.to_vec());
        Ok(())
    }
}
