//! Backup export and import for garagelog.
//!
//! This module serializes the full store into a portable ZIP archive and
//! restores store state from one. An archive holds exactly two entries:
//! `backup.json`, the authoritative JSON snapshot that import trusts, and
//! `vehicle.db`, a raw copy of the store file carried along as a forensic
//! fallback that import never reads.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{Error, Result};
use crate::records::{ConfigRecord, Entry, Snapshot};
use crate::store::Store;

/// Name of the JSON snapshot entry inside a backup archive.
pub const BACKUP_ENTRY: &str = "backup.json";

/// Name of the raw store file entry inside a backup archive.
pub const RAW_STORE_ENTRY: &str = "vehicle.db";

/// The JSON document stored in the `backup.json` archive entry.
///
/// All five keys must be present for a document to be accepted on import;
/// unknown extra keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupDocument {
    /// The vehicle configuration record.
    pub config: ConfigRecord,
    /// The notes log.
    pub notes: Vec<Entry>,
    /// The trips log.
    pub trips: Vec<Entry>,
    /// The maintenance log.
    pub maintlog: Vec<Entry>,
    /// ISO-8601 timestamp of the export instant (local time).
    pub export_date: String,
}

impl BackupDocument {
    /// Build a document from a store snapshot and an export timestamp.
    #[must_use]
    pub fn from_snapshot(snapshot: Snapshot, export_date: String) -> Self {
        Self {
            config: snapshot.config,
            notes: snapshot.notes,
            trips: snapshot.trips,
            maintlog: snapshot.maintlog,
            export_date,
        }
    }

    /// Extract the store records, discarding the export timestamp.
    #[must_use]
    pub fn into_snapshot(self) -> Snapshot {
        Snapshot {
            config: self.config,
            notes: self.notes,
            trips: self.trips,
            maintlog: self.maintlog,
        }
    }
}

/// Extension point for pushing a finished archive to a remote backend.
///
/// No implementation ships with this crate; the cloud upload of the
/// original application was never more than a placeholder. Implementors
/// receive the path of an archive that [`export_all`] has already written.
pub trait RemoteTarget {
    /// Human-readable name of the backend, used in log output.
    fn name(&self) -> &'static str;

    /// Upload the archive at `archive` to the remote backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload fails; the local archive is kept
    /// either way.
    fn upload(&self, archive: &Path) -> Result<()>;
}

/// Export the entire store to a ZIP archive and return the path written.
///
/// The caller proposes a filename; its extension is replaced with `.zip`
/// (the stem is kept), so a proposed `backup_20240101.json` becomes
/// `backup_20240101.zip`. The archive is deflate-compressed and contains
/// `backup.json` (pretty-printed, non-ASCII preserved literally) and
/// `vehicle.db` (the raw store file).
///
/// # Errors
///
/// Returns an error if the store cannot be read or the archive cannot be
/// written. The store itself is never modified.
pub fn export_all(store: &Store, proposed: impl AsRef<Path>) -> Result<PathBuf> {
    let archive_path = normalize_archive_path(proposed.as_ref());

    let snapshot = store.snapshot()?;
    let raw = store.raw_bytes()?;
    let document = BackupDocument::from_snapshot(snapshot, Local::now().to_rfc3339());
    // serde_json writes UTF-8 without escaping non-ASCII characters
    let json = serde_json::to_string_pretty(&document)?;

    if let Some(parent) = archive_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let file = File::create(&archive_path)?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    writer.start_file(BACKUP_ENTRY, options)?;
    writer.write_all(json.as_bytes())?;
    writer.start_file(RAW_STORE_ENTRY, options)?;
    writer.write_all(&raw)?;
    writer.finish()?;

    info!("exported backup to {}", archive_path.display());
    Ok(archive_path)
}

/// Restore the store from a backup archive.
///
/// The archive must contain an entry literally named `backup.json`; any
/// other shape is rejected as not a valid backup. The document is parsed
/// and validated in full before the store is touched, and all four records
/// are then replaced in a single transaction, so a failing import leaves
/// the store exactly as it was.
///
/// # Errors
///
/// Returns [`Error::InvalidArchive`] if the archive is unreadable, not a
/// ZIP container, or lacks the `backup.json` entry, and
/// [`Error::MalformedDocument`] if the entry is not a valid backup
/// document.
pub fn import_from(store: &mut Store, archive_path: impl AsRef<Path>) -> Result<()> {
    let archive_path = archive_path.as_ref();

    let file = File::open(archive_path)
        .map_err(|e| Error::invalid_archive(archive_path, e.to_string()))?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| Error::invalid_archive(archive_path, e.to_string()))?;

    let mut json = String::new();
    {
        let mut entry = match archive.by_name(BACKUP_ENTRY) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => {
                return Err(Error::invalid_archive(
                    archive_path,
                    format!("missing {BACKUP_ENTRY} entry"),
                ));
            }
            Err(e) => return Err(Error::invalid_archive(archive_path, e.to_string())),
        };
        entry
            .read_to_string(&mut json)
            .map_err(|e| Error::invalid_archive(archive_path, e.to_string()))?;
    }

    // Stage and validate the whole document before touching the store, so a
    // bad backup can never leave it partially replaced.
    let document: BackupDocument =
        serde_json::from_str(&json).map_err(|e| Error::malformed(e.to_string()))?;
    debug!(export_date = %document.export_date, "backup document parsed");

    store.replace_all(&document.into_snapshot())?;
    info!("store restored from {}", archive_path.display());
    Ok(())
}

/// Export the store and hand the finished archive to a remote target.
///
/// # Errors
///
/// Returns an error if the export or the upload fails. A failed upload
/// leaves the local archive in place.
pub fn export_and_upload(
    store: &Store,
    proposed: impl AsRef<Path>,
    target: &dyn RemoteTarget,
) -> Result<PathBuf> {
    let archive_path = export_all(store, proposed)?;
    info!("uploading {} via {}", archive_path.display(), target.name());
    target.upload(&archive_path)?;
    Ok(archive_path)
}

/// Force the `.zip` suffix on a caller-proposed archive filename.
fn normalize_archive_path(proposed: &Path) -> PathBuf {
    proposed.with_extension("zip")
}
