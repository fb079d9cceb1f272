//! Local record store for garagelog.
//!
//! This module provides `SQLite`-based durable storage for the four named
//! records (config, notes, trips, maintlog). Each record is held as one JSON
//! document and rewritten whole on every mutation; log entry ids are assigned
//! from a monotonic per-record counter that is persisted alongside the data.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension, Transaction};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::records::{ConfigRecord, Entry, LogKind, Snapshot, CONFIG_RECORD};

const PUT_RECORD: &str = "INSERT OR REPLACE INTO records (name, body) VALUES (?1, ?2)";
const PUT_COUNTER: &str = "INSERT OR REPLACE INTO counters (record, next_id) VALUES (?1, ?2)";

/// Durable store holding the four named records.
///
/// All mutating operations perform a full read-modify-write of the affected
/// record inside a transaction, so a reader can never observe a half-written
/// document.
#[derive(Debug)]
pub struct Store {
    /// Path to the store file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Store {
    /// Open or create a store at the given path.
    ///
    /// Creates the parent directories and store file if they don't exist,
    /// initializes the schema, and seeds any missing record with its default
    /// value. Existing records are never overwritten.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened or initialized.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening store at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::StoreOpen {
            path: path.clone(),
            source,
        })?;

        // Enable WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        let mut store = Self { path, conn };
        store.initialize()?;

        info!("Store opened at {}", store.path.display());
        Ok(store)
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory store cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::StoreOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        let mut store = Self {
            path: PathBuf::from(":memory:"),
            conn,
        };
        store.initialize()?;
        Ok(store)
    }

    /// Get the path to the store file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Seed any missing record with its default value.
    ///
    /// Idempotent: records that already exist are left untouched. `open`
    /// calls this automatically; it only needs to be called again if records
    /// were removed out of band.
    ///
    /// # Errors
    ///
    /// Returns an error if a default record cannot be written.
    pub fn initialize(&mut self) -> Result<()> {
        let default_config = serde_json::to_string(&ConfigRecord::default())?;

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT OR IGNORE INTO records (name, body) VALUES (?1, ?2)",
            params![CONFIG_RECORD, default_config],
        )?;
        for kind in LogKind::ALL {
            tx.execute(
                "INSERT OR IGNORE INTO records (name, body) VALUES (?1, ?2)",
                params![kind.as_str(), "[]"],
            )?;
            tx.execute(
                "INSERT OR IGNORE INTO counters (record, next_id) VALUES (?1, 0)",
                [kind.as_str()],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Get the vehicle configuration record, or its default if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or the record body is
    /// not valid JSON.
    pub fn config(&self) -> Result<ConfigRecord> {
        match self.record_body(CONFIG_RECORD)? {
            Some(body) => Ok(serde_json::from_str(&body)?),
            None => Ok(ConfigRecord::default()),
        }
    }

    /// Set one configuration field and write the record back whole.
    ///
    /// Last writer wins: the record is re-read, patched, and rewritten.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn set_config_field(&mut self, key: &str, value: Value) -> Result<()> {
        let mut config = self.config()?;
        config.set(key, value);
        let body = serde_json::to_string(&config)?;
        self.conn.execute(PUT_RECORD, params![CONFIG_RECORD, body])?;
        debug!("config field '{key}' updated");
        Ok(())
    }

    /// Get the entries of a log record, or an empty sequence if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or the record body is
    /// not valid JSON.
    pub fn entries(&self, kind: LogKind) -> Result<Vec<Entry>> {
        match self.record_body(kind.as_str())? {
            Some(body) => Ok(serde_json::from_str(&body)?),
            None => Ok(Vec::new()),
        }
    }

    /// Append an entry to a log record and return its assigned id.
    ///
    /// Ids come from the record's persisted counter, so they stay unique
    /// even after an import brought in a non-contiguous sequence. An `id`
    /// key inside `fields` is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn append(&mut self, kind: LogKind, fields: Map<String, Value>) -> Result<i64> {
        let tx = self.conn.transaction()?;

        let mut entries = Self::entries_in(&tx, kind)?;
        let counter: Option<i64> = tx
            .query_row(
                "SELECT next_id FROM counters WHERE record = ?1",
                [kind.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        // Missing counter row: fall back to the highest id already present.
        let last = counter.unwrap_or_else(|| entries.iter().map(|e| e.id).max().unwrap_or(0));
        let id = last + 1;

        entries.push(Entry::new(id, fields));
        let body = serde_json::to_string(&entries)?;
        tx.execute(PUT_RECORD, params![kind.as_str(), body])?;
        tx.execute(PUT_COUNTER, params![kind.as_str(), id])?;
        tx.commit()?;

        debug!("appended entry {id} to {kind}");
        Ok(id)
    }

    /// Merge a patch into the entry with the given id.
    ///
    /// Returns `true` if an entry matched; `false` (and no write) otherwise.
    /// Only the matched entry is modified.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn update_by_id(
        &mut self,
        kind: LogKind,
        id: i64,
        patch: &Map<String, Value>,
    ) -> Result<bool> {
        let tx = self.conn.transaction()?;

        let mut entries = Self::entries_in(&tx, kind)?;
        let Some(entry) = entries.iter_mut().find(|e| e.id == id) else {
            return Ok(false);
        };
        entry.apply(patch);

        let body = serde_json::to_string(&entries)?;
        tx.execute(PUT_RECORD, params![kind.as_str(), body])?;
        tx.commit()?;

        debug!("updated entry {id} in {kind}");
        Ok(true)
    }

    /// Read all four records into a snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if any record cannot be read.
    pub fn snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot {
            config: self.config()?,
            notes: self.entries(LogKind::Notes)?,
            trips: self.entries(LogKind::Trips)?,
            maintlog: self.entries(LogKind::MaintLog)?,
        })
    }

    /// Atomically replace every record with the contents of `snapshot`.
    ///
    /// All four records and their id counters are swapped in one
    /// transaction; on failure nothing changes. Each counter is reset to the
    /// highest id present in the incoming sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn replace_all(&mut self, snapshot: &Snapshot) -> Result<()> {
        let tx = self.conn.transaction()?;

        let config_body = serde_json::to_string(&snapshot.config)?;
        tx.execute(PUT_RECORD, params![CONFIG_RECORD, config_body])?;

        for kind in LogKind::ALL {
            let entries = snapshot.sequence(kind);
            let body = serde_json::to_string(entries)?;
            let max_id = entries.iter().map(|e| e.id).max().unwrap_or(0);
            tx.execute(PUT_RECORD, params![kind.as_str(), body])?;
            tx.execute(PUT_COUNTER, params![kind.as_str(), max_id])?;
        }

        tx.commit()?;
        info!("all records replaced from snapshot");
        Ok(())
    }

    /// Raw bytes of the on-disk store file.
    ///
    /// Used by the backup codec to bundle a forensic copy of the store into
    /// the archive. The WAL is checkpointed first so the main file is
    /// complete on its own.
    ///
    /// # Errors
    ///
    /// Returns an error for an in-memory store or if the file cannot be read.
    pub fn raw_bytes(&self) -> Result<Vec<u8>> {
        if self.path.to_string_lossy() == ":memory:" {
            return Err(Error::StoreUnavailable {
                message: "in-memory store has no backing file".to_string(),
            });
        }
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(std::fs::read(&self.path)?)
    }

    /// Read a record body by name.
    fn record_body(&self, name: &str) -> Result<Option<String>> {
        let body = self
            .conn
            .query_row("SELECT body FROM records WHERE name = ?1", [name], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(body)
    }

    /// Read a log record's entries inside an open transaction.
    fn entries_in(tx: &Transaction<'_>, kind: LogKind) -> Result<Vec<Entry>> {
        let body: Option<String> = tx
            .query_row(
                "SELECT body FROM records WHERE name = ?1",
                [kind.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        match body {
            Some(body) => Ok(serde_json::from_str(&body)?),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_test_store() -> Store {
        Store::open_in_memory().expect("failed to create test store")
    }

    fn fields(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_open_in_memory() {
        let store = Store::open_in_memory();
        assert!(store.is_ok());
    }

    #[test]
    fn test_defaults_after_open() {
        let store = create_test_store();

        let config = store.config().unwrap();
        assert_eq!(config.mkm, "0");
        assert_eq!(config.idate, "");
        assert_eq!(config.insdate, "");

        for kind in LogKind::ALL {
            assert!(store.entries(kind).unwrap().is_empty());
        }
    }

    #[test]
    fn test_initialize_idempotent() {
        let mut store = create_test_store();

        store
            .set_config_field("mkm", json!("45210"))
            .expect("set failed");
        store.append(LogKind::Trips, Map::new()).expect("append failed");

        store.initialize().expect("re-initialize failed");

        assert_eq!(store.config().unwrap().mkm, "45210");
        assert_eq!(store.entries(LogKind::Trips).unwrap().len(), 1);
    }

    #[test]
    fn test_append_assigns_sequential_ids() {
        let mut store = create_test_store();

        for n in 1..=5 {
            let id = store
                .append(LogKind::Trips, fields(&[("dest", json!("Vũng Tàu"))]))
                .unwrap();
            assert_eq!(id, n);
        }

        let entries = store.entries(LogKind::Trips).unwrap();
        let ids: Vec<i64> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_append_ignores_id_field() {
        let mut store = create_test_store();

        let id = store
            .append(LogKind::Notes, fields(&[("id", json!(99)), ("note", json!("oil"))]))
            .unwrap();
        assert_eq!(id, 1);

        let entries = store.entries(LogKind::Notes).unwrap();
        assert_eq!(entries[0].id, 1);
        assert!(entries[0].field("id").is_none());
    }

    #[test]
    fn test_sequences_count_independently() {
        let mut store = create_test_store();

        store.append(LogKind::Trips, Map::new()).unwrap();
        store.append(LogKind::Trips, Map::new()).unwrap();
        let note_id = store.append(LogKind::Notes, Map::new()).unwrap();

        assert_eq!(note_id, 1);
    }

    #[test]
    fn test_update_by_id_patches_matching_entry() {
        let mut store = create_test_store();

        store
            .append(LogKind::Trips, fields(&[("dest", json!("Hà Nội"))]))
            .unwrap();
        store
            .append(LogKind::Trips, fields(&[("dest", json!("Huế"))]))
            .unwrap();

        let patch = fields(&[("end_km", json!(45900))]);
        let found = store.update_by_id(LogKind::Trips, 2, &patch).unwrap();
        assert!(found);

        let entries = store.entries(LogKind::Trips).unwrap();
        assert!(entries[0].field("end_km").is_none());
        assert_eq!(entries[1].field("end_km"), Some(&json!(45900)));
        assert_eq!(entries[1].field("dest"), Some(&json!("Huế")));
    }

    #[test]
    fn test_update_by_id_missing_is_noop() {
        let mut store = create_test_store();
        store
            .append(LogKind::Trips, fields(&[("dest", json!("Cần Thơ"))]))
            .unwrap();
        let before = store.entries(LogKind::Trips).unwrap();

        let patch = fields(&[("dest", json!("elsewhere"))]);
        let found = store.update_by_id(LogKind::Trips, 42, &patch).unwrap();
        assert!(!found);

        assert_eq!(store.entries(LogKind::Trips).unwrap(), before);
    }

    #[test]
    fn test_set_config_field_known_and_extra() {
        let mut store = create_test_store();

        store.set_config_field("mkm", json!("45210")).unwrap();
        store.set_config_field("plate", json!("51C-123.45")).unwrap();

        let config = store.config().unwrap();
        assert_eq!(config.mkm, "45210");
        assert_eq!(config.extra.get("plate"), Some(&json!("51C-123.45")));
    }

    #[test]
    fn test_set_config_field_last_writer_wins() {
        let mut store = create_test_store();

        store.set_config_field("idate", json!("2026-01-01")).unwrap();
        store.set_config_field("idate", json!("2026-06-01")).unwrap();

        assert_eq!(store.config().unwrap().idate, "2026-06-01");
    }

    #[test]
    fn test_snapshot_reflects_contents() {
        let mut store = create_test_store();

        store.set_config_field("mkm", json!("100")).unwrap();
        store
            .append(LogKind::MaintLog, fields(&[("work", json!("thay dầu"))]))
            .unwrap();

        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.config.mkm, "100");
        assert_eq!(snapshot.maintlog.len(), 1);
        assert!(snapshot.trips.is_empty());
    }

    #[test]
    fn test_replace_all_swaps_everything() {
        let mut store = create_test_store();
        store.append(LogKind::Notes, fields(&[("note", json!("old"))])).unwrap();

        let mut incoming = Snapshot::default();
        incoming.config.mkm = "90000".to_string();
        incoming.trips.push(Entry::new(3, fields(&[("dest", json!("Đà Nẵng"))])));
        incoming.trips.push(Entry::new(9, Map::new()));

        store.replace_all(&incoming).unwrap();

        assert_eq!(store.config().unwrap().mkm, "90000");
        assert!(store.entries(LogKind::Notes).unwrap().is_empty());
        assert_eq!(store.entries(LogKind::Trips).unwrap().len(), 2);
    }

    #[test]
    fn test_replace_all_resets_counters_from_max_id() {
        let mut store = create_test_store();

        let mut incoming = Snapshot::default();
        incoming.trips.push(Entry::new(3, Map::new()));
        incoming.trips.push(Entry::new(9, Map::new()));
        store.replace_all(&incoming).unwrap();

        let id = store.append(LogKind::Trips, Map::new()).unwrap();
        assert_eq!(id, 10);
    }

    #[test]
    fn test_append_after_empty_replace_starts_at_one() {
        let mut store = create_test_store();
        store.append(LogKind::Trips, Map::new()).unwrap();

        store.replace_all(&Snapshot::default()).unwrap();

        let id = store.append(LogKind::Trips, Map::new()).unwrap();
        assert_eq!(id, 1);
    }

    #[test]
    fn test_raw_bytes_in_memory_fails() {
        let store = create_test_store();
        let result = store.raw_bytes();
        assert!(matches!(result, Err(Error::StoreUnavailable { .. })));
    }

    #[test]
    fn test_raw_bytes_file_backed() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::open(dir.path().join("vehicle.db")).unwrap();
        store.append(LogKind::Trips, Map::new()).unwrap();

        let bytes = store.raw_bytes().unwrap();
        assert!(bytes.starts_with(b"SQLite format 3"));
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("data/nested/vehicle.db");

        let store = Store::open(&nested).unwrap();
        assert!(nested.exists());
        assert_eq!(store.path(), nested);
    }

    #[test]
    fn test_data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vehicle.db");

        {
            let mut store = Store::open(&path).unwrap();
            store
                .append(LogKind::MaintLog, fields(&[("work", json!("brakes"))]))
                .unwrap();
            store.set_config_field("mkm", json!("500")).unwrap();
        }

        let store = Store::open(&path).unwrap();
        assert_eq!(store.config().unwrap().mkm, "500");
        let entries = store.entries(LogKind::MaintLog).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].field("work"), Some(&json!("brakes")));
    }

    #[test]
    fn test_counter_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vehicle.db");

        {
            let mut store = Store::open(&path).unwrap();
            store.append(LogKind::Notes, Map::new()).unwrap();
            store.append(LogKind::Notes, Map::new()).unwrap();
        }

        let mut store = Store::open(&path).unwrap();
        let id = store.append(LogKind::Notes, Map::new()).unwrap();
        assert_eq!(id, 3);
    }

    #[test]
    fn test_unicode_fields_round_trip() {
        let mut store = create_test_store();
        store
            .append(LogKind::Notes, fields(&[("note", json!("đổ xăng 500k ⛽"))]))
            .unwrap();

        let entries = store.entries(LogKind::Notes).unwrap();
        assert_eq!(entries[0].field("note"), Some(&json!("đổ xăng 500k ⛽")));
    }
}
