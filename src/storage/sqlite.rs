use crate::model::StorageError;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// String-keyed store for configuration objects such as favorite dealers.
/// Values are opaque strings; the `*_json` helpers serialize through serde.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens the database file and creates the table if needed.
    pub fn new(db_path: &str) -> Result<Self, StorageError> {
        Self::init(Connection::open(db_path)?)
    }

    /// Store that lives only as long as the value.
    pub fn in_memory() -> Result<Self, StorageError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "
        )?;
        Ok(Self { conn })
    }

    /// Inserts or overwrites the value stored under `key`.
    pub fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self.conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// When the value under `key` was last written.
    pub fn updated_at(&self, key: &str) -> Result<Option<DateTime<Utc>>, StorageError> {
        let stamp = self.conn
            .query_row(
                "SELECT updated_at FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(stamp.and_then(|s| DateTime::parse_from_rfc3339(&s).ok().map(|dt| dt.with_timezone(&Utc))))
    }

    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let text = serde_json::to_string(value)?;
        self.set_item(key, &text)
    }

    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.get_item(key)? {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Dealer;

    fn dealers() -> Vec<Dealer> {
        vec![
            Dealer { name: "Dealabs".into(), url: "https://www.dealabs.com/groupe/lego".into() },
            Dealer {
                name: "Avenue de la brique".into(),
                url: "https://www.avenuedelabrique.com/promotions-et-bons-plans-lego".into(),
            },
        ]
    }

    #[test]
    fn test_json_round_trip() {
        let storage = SqliteStorage::in_memory().unwrap();
        storage.set_json("MY_FAVORITE_DEALERS", &dealers()).unwrap();
        let loaded: Option<Vec<Dealer>> = storage.get_json("MY_FAVORITE_DEALERS").unwrap();
        assert_eq!(loaded, Some(dealers()));
        assert!(storage.updated_at("MY_FAVORITE_DEALERS").unwrap().is_some());
    }

    #[test]
    fn test_overwrite_keeps_last_value() {
        let storage = SqliteStorage::in_memory().unwrap();
        assert_eq!(storage.get_item("theme").unwrap(), None);
        assert_eq!(storage.updated_at("theme").unwrap(), None);
        storage.set_item("theme", "dark").unwrap();
        storage.set_item("theme", "light").unwrap();
        assert_eq!(storage.get_item("theme").unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn test_corrupt_json_is_an_error() {
        let storage = SqliteStorage::in_memory().unwrap();
        storage.set_item("MY_FAVORITE_DEALERS", "{not json").unwrap();
        let result: Result<Option<Vec<Dealer>>, _> = storage.get_json("MY_FAVORITE_DEALERS");
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }
}
