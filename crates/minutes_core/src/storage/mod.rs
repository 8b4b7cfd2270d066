//! Durable key-value slot storage.
//!
//! # Responsibility
//! - Define the persistence port the meeting store mirrors its state into.
//! - Provide SQLite-backed and in-memory slot implementations.
//!
//! # Invariants
//! - A slot holds one opaque string value per key; last write wins.
//! - Storage never interprets slot contents; see `envelope` for the format.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod envelope;
mod memory;
mod sqlite;

pub use memory::MemorySlotStorage;
pub use sqlite::SqliteSlotStorage;

pub type StorageResult<T> = Result<T, StorageError>;

/// Transport failure while reading or writing a slot.
#[derive(Debug)]
pub enum StorageError {
    Db(DbError),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "slot storage failure: {err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence port: a namespaced key-value slot store.
pub trait SlotStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove_item(&self, key: &str) -> StorageResult<()>;
}

impl<S: SlotStorage + ?Sized> SlotStorage for &S {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        (**self).remove_item(key)
    }
}
