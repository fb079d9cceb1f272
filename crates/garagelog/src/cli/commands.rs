//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use serde_json::{Map, Value};

use crate::records::LogKind;

/// Log record argument for selecting a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RecordArg {
    /// Expense and cost notes
    Notes,
    /// Trip log
    Trips,
    /// Maintenance log
    Maintlog,
}

impl From<RecordArg> for LogKind {
    fn from(arg: RecordArg) -> Self {
        match arg {
            RecordArg::Notes => Self::Notes,
            RecordArg::Trips => Self::Trips,
            RecordArg::Maintlog => Self::MaintLog,
        }
    }
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Add command arguments.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Which log record to append to
    #[arg(value_enum)]
    pub record: RecordArg,

    /// Entry fields as key=value pairs (values parsed as JSON when possible)
    #[arg(required = true, value_name = "KEY=VALUE")]
    pub fields: Vec<String>,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Which log record to list
    #[arg(value_enum)]
    pub record: RecordArg,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Update command arguments.
#[derive(Debug, Args)]
pub struct UpdateCommand {
    /// Which log record to update
    #[arg(value_enum)]
    pub record: RecordArg,

    /// Id of the entry to patch
    pub id: i64,

    /// Fields to merge into the entry, as key=value pairs
    #[arg(required = true, value_name = "KEY=VALUE")]
    pub fields: Vec<String>,
}

/// Configuration record commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the vehicle configuration record
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Set a configuration field
    Set {
        /// Field key (e.g. mkm, idate, insdate)
        key: String,
        /// Field value
        value: String,
    },
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Output path; the `.zip` suffix is enforced.
    /// Defaults to a timestamped name under the backup directory.
    pub output: Option<PathBuf>,
}

/// Import command arguments.
#[derive(Debug, Args)]
pub struct ImportCommand {
    /// Path to the backup archive to restore from
    pub archive: PathBuf,
}

/// Parse `key=value` arguments into entry fields.
///
/// Values that parse as JSON keep their type (numbers, booleans, null);
/// everything else is taken as a plain string.
///
/// # Errors
///
/// Returns a message describing the first pair that is not `key=value`.
pub fn parse_fields(pairs: &[String]) -> std::result::Result<Map<String, Value>, String> {
    let mut fields = Map::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(format!("expected KEY=VALUE, got '{pair}'"));
        };
        if key.is_empty() {
            return Err(format!("empty key in '{pair}'"));
        }
        let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
        fields.insert(key.to_string(), value);
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_arg_conversion() {
        assert_eq!(LogKind::from(RecordArg::Notes), LogKind::Notes);
        assert_eq!(LogKind::from(RecordArg::Trips), LogKind::Trips);
        assert_eq!(LogKind::from(RecordArg::Maintlog), LogKind::MaintLog);
    }

    #[test]
    fn test_parse_fields_strings_and_numbers() {
        let fields = parse_fields(&[
            "dest=Đà Lạt".to_string(),
            "start_km=45100".to_string(),
            "done=true".to_string(),
        ])
        .unwrap();

        assert_eq!(fields.get("dest"), Some(&json!("Đà Lạt")));
        assert_eq!(fields.get("start_km"), Some(&json!(45100)));
        assert_eq!(fields.get("done"), Some(&json!(true)));
    }

    #[test]
    fn test_parse_fields_value_may_contain_equals() {
        let fields = parse_fields(&["note=a=b".to_string()]).unwrap();
        assert_eq!(fields.get("note"), Some(&json!("a=b")));
    }

    #[test]
    fn test_parse_fields_rejects_bare_word() {
        let result = parse_fields(&["novalue".to_string()]);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("novalue"));
    }

    #[test]
    fn test_parse_fields_rejects_empty_key() {
        assert!(parse_fields(&["=5".to_string()]).is_err());
    }

    #[test]
    fn test_parse_fields_empty_value_is_empty_string() {
        let fields = parse_fields(&["note=".to_string()]).unwrap();
        assert_eq!(fields.get("note"), Some(&json!("")));
    }

    #[test]
    fn test_status_command_debug() {
        let cmd = StatusCommand { json: true };
        assert!(format!("{cmd:?}").contains("json"));
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        assert!(format!("{cmd:?}").contains("Show"));
    }
}
