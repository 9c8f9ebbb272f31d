use crate::engine::LevelIndex;
use anyhow::{anyhow, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use web_sys::Storage;

/// Synchronous string key/value store that survives page reloads
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

impl KeyValueStore for Storage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Storage::get_item(self, key)
            .map_err(|err| anyhow!("Error reading '{}' from storage : {:#?}", key, err))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        Storage::set_item(self, key, value)
            .map_err(|err| anyhow!("Error writing '{}' to storage : {:#?}", key, err))
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }
}

/// Session only store, used when localStorage is unavailable
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Persisted "current level", stored as a decimal string under one key
///
/// ┌─────────── lifecycle ────────────┐
/// │ bootstrap   : read()  → resume   │
/// │ every frame : sync(engine level) │
/// └──────────────────────────────────┘
pub struct LevelStore<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> LevelStore<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        LevelStore {
            store,
            key: key.into(),
        }
    }

    /// Persisted level, 0 when absent, unreadable or not a number
    pub fn read(&self) -> LevelIndex {
        match self.store.get_item(&self.key) {
            Ok(Some(value)) => parse_level(&value),
            Ok(None) => 0,
            Err(err) => {
                warn!("{:#}, starting from level 0", err);
                0
            }
        }
    }

    pub fn write(&self, level: LevelIndex) -> Result<()> {
        self.store.set_item(&self.key, &level.to_string())
    }

    /// Mirrors the engine's level into storage
    /// - writes only when the stored value differs
    /// - returns whether a write happened
    pub fn sync(&self, level: LevelIndex) -> Result<bool> {
        if self.read() == level {
            return Ok(false);
        }
        self.write(level)?;
        Ok(true)
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Leading decimal digits, the rest is ignored ("7abc" is 7, "1.5" is 1)
/// - no digits, a sign, or a value past LevelIndex::MAX give 0
fn parse_level(value: &str) -> LevelIndex {
    let value = value.trim_start();
    let digits = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    value[..digits].parse().unwrap_or(0)
}
