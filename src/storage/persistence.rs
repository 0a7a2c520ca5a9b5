// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use crate::records::RecordStore;
use crate::storage::codec;
use crate::storage::PersistenceError;
use crate::store::VectorStore;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};

pub const DEFAULT_INDEX_FILE: &str = "vector_index.bin";
pub const DEFAULT_RECORDS_FILE: &str = "vector_records.json";

const TMP_SUFFIX: &str = ".tmp";
const BACKUP_SUFFIX: &str = ".bak";

/// Where the two artifacts of one store live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLocation {
    dir: PathBuf,
    index_file: String,
    records_file: String,
}

impl StoreLocation {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_file_names(dir, DEFAULT_INDEX_FILE, DEFAULT_RECORDS_FILE)
    }

    pub fn with_file_names(
        dir: impl Into<PathBuf>,
        index_file: impl Into<String>,
        records_file: impl Into<String>,
    ) -> Self {
        Self {
            dir: dir.into(),
            index_file: index_file.into(),
            records_file: records_file.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn index_path(&self) -> PathBuf {
        self.dir.join(&self.index_file)
    }

    pub fn records_path(&self) -> PathBuf {
        self.dir.join(&self.records_file)
    }
}

impl Default for StoreLocation {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Saves and loads the index and records of a store as one matched pair.
#[derive(Debug, Clone)]
pub struct StorePersister {
    location: StoreLocation,
}

impl StorePersister {
    pub fn new(location: StoreLocation) -> Self {
        Self { location }
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    /// Write both artifacts, replacing any earlier save.
    ///
    /// Both files are written and synced to temporary siblings before either
    /// is renamed into place, so a failure while writing leaves the previous
    /// pair untouched. The previous records are kept as a backup until the
    /// index rename succeeds and are put back if it fails.
    pub async fn save(&self, store: &VectorStore) -> Result<(), PersistenceError> {
        let records_bytes = codec::encode_records(store.records())?;
        let index_bytes = codec::encode_index(store.index(), &records_bytes)?;

        fs::create_dir_all(self.location.dir()).await?;

        let records_path = self.location.records_path();
        let index_path = self.location.index_path();
        let records_tmp = sibling(&records_path, TMP_SUFFIX);
        let index_tmp = sibling(&index_path, TMP_SUFFIX);
        let backup = sibling(&records_path, BACKUP_SUFFIX);

        let staged = async {
            stage(&records_tmp, &records_bytes).await?;
            stage(&index_tmp, &index_bytes).await
        }
        .await;
        if let Err(e) = staged {
            warn!("Staging save in {} failed: {}", self.location.dir().display(), e);
            discard(&[&records_tmp, &index_tmp]).await;
            return Err(e.into());
        }

        let had_records = match fs::copy(&records_path, &backup).await {
            Ok(_) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => {
                warn!("Backup of {} failed: {}", records_path.display(), e);
                discard(&[&records_tmp, &index_tmp, &backup]).await;
                return Err(e.into());
            }
        };

        if let Err(e) = fs::rename(&records_tmp, &records_path).await {
            warn!("Rename into {} failed: {}", records_path.display(), e);
            discard(&[&records_tmp, &index_tmp, &backup]).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&index_tmp, &index_path).await {
            warn!("Rename into {} failed: {}", index_path.display(), e);
            restore_records(&records_path, &backup, had_records).await;
            discard(&[&index_tmp]).await;
            return Err(e.into());
        }

        discard(&[&backup]).await;

        info!(
            "Saved store: {} records, dim {:?} ({} index bytes, {} record bytes, digest {})",
            store.len(),
            store.dimension(),
            index_bytes.len(),
            records_bytes.len(),
            hex::encode(&blake3::hash(&records_bytes).as_bytes()[..8])
        );
        Ok(())
    }

    /// Read both artifacts back.
    ///
    /// `NotFound` when neither exists; `Corrupt` when only one exists or the
    /// pair fails any consistency check.
    pub async fn load(&self) -> Result<VectorStore, PersistenceError> {
        let index_path = self.location.index_path();
        let records_path = self.location.records_path();

        let index_raw = read_optional(&index_path).await?;
        let records_raw = read_optional(&records_path).await?;

        let (index_raw, records_raw) = match (index_raw, records_raw) {
            (None, None) => {
                return Err(PersistenceError::NotFound(self.location.dir().to_path_buf()))
            }
            (Some(_), None) => {
                return Err(PersistenceError::Corrupt(format!(
                    "index {} exists but records {} is missing",
                    index_path.display(),
                    records_path.display()
                )))
            }
            (None, Some(_)) => {
                return Err(PersistenceError::Corrupt(format!(
                    "records {} exists but index {} is missing",
                    records_path.display(),
                    index_path.display()
                )))
            }
            (Some(i), Some(r)) => (i, r),
        };

        let (header, index) = codec::decode_index(&index_raw)?;
        codec::verify_records(&header, &records_raw)?;
        let records = codec::decode_records(&records_raw)?;

        if records.len() as u64 != header.count {
            return Err(PersistenceError::Corrupt(format!(
                "{} records but {} vectors",
                records.len(),
                header.count
            )));
        }

        let records = RecordStore::from_records(records)
            .map_err(|e| PersistenceError::Corrupt(e.to_string()))?;
        let store = VectorStore::from_parts(index, records)
            .map_err(|e| PersistenceError::Corrupt(e.to_string()))?;

        info!(
            "Loaded store with {} entries (dim {:?}) from {}",
            store.len(),
            store.dimension(),
            self.location.dir().display()
        );
        Ok(store)
    }

    /// `load`, starting an empty store when nothing has been saved yet.
    pub async fn load_or_empty(&self) -> Result<VectorStore, PersistenceError> {
        match self.load().await {
            Err(PersistenceError::NotFound(dir)) => {
                info!("No store in {}, starting empty", dir.display());
                Ok(VectorStore::new())
            }
            other => other,
        }
    }
}

async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, PersistenceError> {
    match fs::read(path).await {
        Ok(bytes) => {
            debug!("Read {} bytes from {}", bytes.len(), path.display());
            Ok(Some(bytes))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

async fn stage(tmp: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(tmp).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

async fn discard<P: AsRef<Path>>(paths: &[P]) {
    for path in paths {
        let path = path.as_ref();
        match fs::remove_file(path).await {
            Ok(()) => debug!("Removed {}", path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => debug!("Could not remove {}: {}", path.display(), e),
        }
    }
}

/// Put the records that matched the on-disk index back in place.
async fn restore_records(records_path: &Path, backup: &Path, had_records: bool) {
    let result = if had_records {
        fs::rename(backup, records_path).await
    } else {
        fs::remove_file(records_path).await
    };
    if let Err(e) = result {
        error!(
            "Could not restore {} after a failed save: {}",
            records_path.display(),
            e
        );
    }
}
