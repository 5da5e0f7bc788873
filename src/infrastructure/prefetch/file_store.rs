//! JSON file persistence for prefetch state

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;

use crate::domain::prefetch::{PrefetchSnapshot, PrefetchStore};
use crate::domain::DomainError;

/// Stores the snapshot as a single JSON file
///
/// Writes go to a sibling temp file which is then renamed over the target,
/// so a crash mid-write leaves the previous snapshot intact.
#[derive(Debug)]
pub struct FilePrefetchStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FilePrefetchStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "prefetch".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl PrefetchStore for FilePrefetchStore {
    async fn load(&self) -> Result<Option<PrefetchSnapshot>, DomainError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DomainError::storage(format!(
                    "Failed to read '{}': {}",
                    self.path.display(),
                    e
                )));
            }
        };

        serde_json::from_str(&contents).map(Some).map_err(|e| {
            DomainError::storage(format!(
                "Corrupt prefetch state in '{}': {}",
                self.path.display(),
                e
            ))
        })
    }

    async fn save(&self, snapshot: &PrefetchSnapshot) -> Result<(), DomainError> {
        let json = serde_json::to_vec(snapshot)
            .map_err(|e| DomainError::storage(format!("Failed to serialize snapshot: {}", e)))?;

        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                DomainError::storage(format!("Failed to create '{}': {}", parent.display(), e))
            })?;
        }

        let temp_path = self.temp_path();
        fs::write(&temp_path, json).await.map_err(|e| {
            DomainError::storage(format!("Failed to write '{}': {}", temp_path.display(), e))
        })?;

        if let Err(e) = fs::rename(&temp_path, &self.path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(DomainError::storage(format!(
                "Failed to replace '{}': {}",
                self.path.display(),
                e
            )));
        }

        Ok(())
    }

    async fn clear(&self) -> Result<(), DomainError> {
        let _guard = self.write_lock.lock().await;

        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::storage(format!(
                "Failed to remove '{}': {}",
                self.path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::prefetch::{SequenceLink, WordCategory, LookupEvent};
    use chrono::Utc;

    fn snapshot() -> PrefetchSnapshot {
        PrefetchSnapshot {
            patterns: vec![LookupEvent {
                word: "run".to_string(),
                timestamp: Utc::now(),
                related_words: vec!["sprint".to_string()],
                category: WordCategory::General,
            }],
            relationships: Vec::new(),
            sequences: vec![SequenceLink {
                from_word: "run".to_string(),
                to_words: vec!["race".to_string()],
                last_seen: Utc::now(),
            }],
        }
    }

    #[tokio::test]
    async fn test_load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePrefetchStore::new(dir.path().join("state.json"));

        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePrefetchStore::new(dir.path().join("nested/state.json"));

        let saved = snapshot();
        store.save(&saved).await.unwrap();

        assert_eq!(store.load().await.unwrap(), Some(saved));
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn test_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePrefetchStore::new(dir.path().join("state.json"));

        store.save(&snapshot()).await.unwrap();
        store.clear().await.unwrap();
        store.clear().await.unwrap();

        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();

        let result = FilePrefetchStore::new(path).load().await;
        assert!(matches!(result, Err(DomainError::Storage { .. })));
    }
}
