//! SQLite-backed slot storage over the `storage_slots` table.

use super::{SlotStorage, StorageResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Slot storage that keeps each key as one row in `storage_slots`.
///
/// The connection must come from `db::open_db*` so the table exists.
pub struct SqliteSlotStorage<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSlotStorage<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SlotStorage for SqliteSlotStorage<'_> {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM storage_slots WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO storage_slots (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM storage_slots WHERE key = ?1;", [key])?;
        Ok(())
    }
}
