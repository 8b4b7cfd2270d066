use super::{SlotStorage, StorageResult};
use std::cell::RefCell;
use std::collections::HashMap;

/// Process-local slot storage. Contents vanish with the value.
#[derive(Debug, Default)]
pub struct MemorySlotStorage {
    slots: RefCell<HashMap<String, String>>,
}

impl MemorySlotStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates storage pre-populated with one slot.
    pub fn with_item(key: impl Into<String>, value: impl Into<String>) -> Self {
        let storage = Self::default();
        storage.slots.borrow_mut().insert(key.into(), value.into());
        storage
    }
}

impl SlotStorage for MemorySlotStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.slots.borrow_mut().remove(key);
        Ok(())
    }
}
