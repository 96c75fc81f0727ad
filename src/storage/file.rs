/// File-backed key-value backend
use crate::{
    error::{ClinicError, ClinicResult},
    storage::KeyValueStore,
};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::warn;

/// File storage backend
///
/// Stores each key in its own file under the base directory:
/// `{base}/{key}.json`. Writes land in a sibling temp file first and are
/// renamed into place, so a reader sees either the old or the new value.
#[derive(Debug, Clone)]
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Create a new file store, creating the directory if needed
    pub fn new(base_path: impl Into<PathBuf>) -> ClinicResult<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).map_err(|e| {
            ClinicError::Storage(format!(
                "Failed to create storage directory {:?}: {}",
                base_path, e
            ))
        })?;
        Ok(Self { base_path })
    }

    /// Get the file path for a key
    fn key_path(&self, key: &str) -> ClinicResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(ClinicError::Storage(format!("Invalid storage key: {:?}", key)));
        }
        Ok(self.base_path.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> ClinicResult<Option<String>> {
        let path = self.key_path(key)?;

        match fs::read(&path) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(data) => Ok(Some(data)),
                // Handed on lossily so the codec can reject it as malformed
                Err(e) => {
                    warn!("Stored {} is not valid UTF-8", key);
                    Ok(Some(String::from_utf8_lossy(e.as_bytes()).into_owned()))
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ClinicError::Storage(format!("Failed to read {}: {}", key, e))),
        }
    }

    fn set(&self, key: &str, value: &str) -> ClinicResult<()> {
        let path = self.key_path(key)?;
        let tmp_path = path.with_extension("json.tmp");

        fs::write(&tmp_path, value)
            .map_err(|e| ClinicError::Storage(format!("Failed to write {}: {}", key, e)))?;
        fs::rename(&tmp_path, &path)
            .map_err(|e| ClinicError::Storage(format!("Failed to commit {}: {}", key, e)))?;

        Ok(())
    }

    fn remove(&self, key: &str) -> ClinicResult<()> {
        let path = self.key_path(key)?;

        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClinicError::Storage(format!("Failed to remove {}: {}", key, e))),
        }
    }
}
