//! Core record types for garagelog.
//!
//! This module defines the typed shape of the four named records held by the
//! store: the vehicle configuration plus the three entry logs (notes, trips,
//! maintenance).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the configuration record in the store.
pub const CONFIG_RECORD: &str = "config";

/// The three entry-log records held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    /// Free-form expense and cost notes.
    Notes,
    /// Trip log entries.
    Trips,
    /// Maintenance log entries.
    MaintLog,
}

impl LogKind {
    /// All log kinds, in store order.
    pub const ALL: [Self; 3] = [Self::Notes, Self::Trips, Self::MaintLog];

    /// The record name used in the store and in backup documents.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Notes => "notes",
            Self::Trips => "trips",
            Self::MaintLog => "maintlog",
        }
    }
}

impl std::fmt::Display for LogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The vehicle configuration record.
///
/// The three well-known fields match what the settings screen edits; any
/// other key set on the record is kept in `extra` so documents with
/// additional settings survive a backup round trip unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigRecord {
    /// Current odometer reading, kept as entered (text).
    pub mkm: String,
    /// Next inspection date.
    pub idate: String,
    /// Insurance expiry date.
    pub insdate: String,
    /// Any further settings keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ConfigRecord {
    fn default() -> Self {
        Self {
            mkm: "0".to_string(),
            idate: String::new(),
            insdate: String::new(),
            extra: Map::new(),
        }
    }
}

impl ConfigRecord {
    /// Set a configuration field by key.
    ///
    /// Well-known keys update their typed field (numbers are stored in their
    /// textual form); anything else lands in `extra` with its value kept as-is.
    pub fn set(&mut self, key: &str, value: Value) {
        match key {
            "mkm" => self.mkm = value_to_text(&value),
            "idate" => self.idate = value_to_text(&value),
            "insdate" => self.insdate = value_to_text(&value),
            _ => {
                self.extra.insert(key.to_string(), value);
            }
        }
    }

    /// Get a configuration field by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        match key {
            "mkm" => Some(Value::String(self.mkm.clone())),
            "idate" => Some(Value::String(self.idate.clone())),
            "insdate" => Some(Value::String(self.insdate.clone())),
            _ => self.extra.get(key).cloned(),
        }
    }
}

/// A single entry in one of the log records.
///
/// Only the id is typed; the remaining fields are an open set so that
/// entries written by other versions of the application round-trip through
/// export and import without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Identifier, unique within its log record.
    pub id: i64,
    /// The entry's data fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Entry {
    /// Create an entry with the given id and fields.
    ///
    /// The id lives in the typed field only; an `id` key inside `fields`
    /// would shadow it on serialization and is dropped.
    #[must_use]
    pub fn new(id: i64, mut fields: Map<String, Value>) -> Self {
        fields.remove("id");
        Self { id, fields }
    }

    /// Look up a data field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Merge the given patch into this entry's fields.
    ///
    /// Existing keys are overwritten, new keys added. The id cannot be
    /// patched.
    pub fn apply(&mut self, patch: &Map<String, Value>) {
        for (key, value) in patch {
            if key == "id" {
                continue;
            }
            self.fields.insert(key.clone(), value.clone());
        }
    }
}

/// The full contents of the store: all four records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// The vehicle configuration record.
    pub config: ConfigRecord,
    /// The notes log.
    pub notes: Vec<Entry>,
    /// The trips log.
    pub trips: Vec<Entry>,
    /// The maintenance log.
    pub maintlog: Vec<Entry>,
}

impl Snapshot {
    /// The entries of the given log record.
    #[must_use]
    pub fn sequence(&self, kind: LogKind) -> &[Entry] {
        match kind {
            LogKind::Notes => &self.notes,
            LogKind::Trips => &self.trips,
            LogKind::MaintLog => &self.maintlog,
        }
    }
}

/// Render a JSON value the way a settings text field would hold it.
fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
