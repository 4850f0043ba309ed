//! Shared key-value storage for one flow run.

use std::{collections::HashMap, sync::Arc};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::{
    error::{FlowError, Result},
    token::Token,
};

static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("storage name pattern"));

/// Whether the string is a valid storage item name: non-empty, starting
/// with a letter or underscore, followed by letters, digits or
/// underscores.
pub fn is_valid_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

/// Named value store shared by all actors of one run.
///
/// Values are untyped from storage's perspective; interpreting them is the
/// caller's responsibility. Entries persist across tokens within a run.
#[derive(Clone, Debug, Default)]
pub struct Storage {
    items: HashMap<String, Token>,
}

impl Storage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an item is stored under the name.
    pub fn has(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    /// The stored value, if any.
    pub fn get(&self, name: &str) -> Option<&Token> {
        self.items.get(name)
    }

    /// Store a value under the name. Invalid names are rejected; actors
    /// are expected to have validated names at setup already.
    pub fn set(&mut self, name: &str, value: impl Serialize) -> Result<()> {
        if !is_valid_name(name) {
            return Err(FlowError::configuration(format!(
                "not a valid storage name: {name:?}"
            )));
        }
        self.items.insert(name.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    /// Remove the item, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<Token> {
        self.items.remove(name)
    }

    /// Names of all stored items.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.items.keys()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Remove all items.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Shared handle to a run's storage. Actors hold a clone of the handle,
/// never the storage itself; writes go through the lock one at a time.
pub type StorageHandle = Arc<RwLock<Storage>>;

/// Create a handle to a fresh, empty storage.
pub fn new_handle() -> StorageHandle {
    Arc::new(RwLock::new(Storage::new()))
}
