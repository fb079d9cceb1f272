//! `SQLite` schema definitions for the garagelog store.
//!
//! Each named record is stored as one row holding its full JSON document;
//! id counters for the log records live in their own table.

/// SQL statement to create the records table.
pub const CREATE_RECORDS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS records (
    name TEXT PRIMARY KEY,
    body TEXT NOT NULL
)
";

/// SQL statement to create the per-record id counters table.
pub const CREATE_COUNTERS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS counters (
    record TEXT PRIMARY KEY,
    next_id INTEGER NOT NULL DEFAULT 0
)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_RECORDS_TABLE,
    CREATE_COUNTERS_TABLE,
    CREATE_METADATA_TABLE,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_not_empty() {
        assert!(!SCHEMA_STATEMENTS.is_empty());
        for stmt in SCHEMA_STATEMENTS {
            assert!(!stmt.is_empty());
        }
    }

    #[test]
    fn test_create_records_table_structure() {
        assert!(CREATE_RECORDS_TABLE.contains("name TEXT PRIMARY KEY"));
        assert!(CREATE_RECORDS_TABLE.contains("body TEXT NOT NULL"));
    }

    #[test]
    fn test_create_counters_table_structure() {
        assert!(CREATE_COUNTERS_TABLE.contains("record TEXT PRIMARY KEY"));
        assert!(CREATE_COUNTERS_TABLE.contains("next_id INTEGER NOT NULL"));
    }

    #[test]
    fn test_create_metadata_table_structure() {
        assert!(CREATE_METADATA_TABLE.contains("key TEXT PRIMARY KEY"));
        assert!(CREATE_METADATA_TABLE.contains("value TEXT NOT NULL"));
    }
}
