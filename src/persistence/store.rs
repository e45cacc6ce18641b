use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("score store I/O failed at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("score store {path:?} is corrupt: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Integer key-value storage for best scores
pub trait ScoreStore {
    /// `Ok(None)` when nothing was ever stored under `key`
    fn get(&self, key: &str) -> Result<Option<u32>, StoreError>;

    fn set(&mut self, key: &str, value: u32) -> Result<(), StoreError>;
}

/// Process-local store, forgotten on exit
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, u32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<u32>, StoreError> {
        Ok(self.values.get(key).copied())
    }

    fn set(&mut self, key: &str, value: u32) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ScoreFile {
    scores: BTreeMap<String, u32>,
}

/// Scores kept in a single JSON document on disk.
///
/// The file is re-read on every access, so several boards can share it.
/// Writes go to a sibling temp file first and are renamed into place.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/wrap_snake/best_scores.json`, falling back to the working directory
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .map(|dir| dir.join("wrap_snake"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("best_scores.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read(&self) -> Result<ScoreFile, StoreError> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ScoreFile::default());
            }
            Err(err) => return Err(self.io_error(err)),
        };

        serde_json::from_str(&json).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn write(&self, file: &ScoreFile) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
            }
        }

        let json = serde_json::to_string_pretty(file).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json).map_err(|err| self.io_error(err))?;
        std::fs::rename(&tmp_path, &self.path).map_err(|err| self.io_error(err))?;
        Ok(())
    }
}

impl ScoreStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<u32>, StoreError> {
        Ok(self.read()?.scores.get(key).copied())
    }

    fn set(&mut self, key: &str, value: u32) -> Result<(), StoreError> {
        let mut file = self.read()?;
        file.scores.insert(key.to_string(), value);
        self.write(&file)
    }
}
