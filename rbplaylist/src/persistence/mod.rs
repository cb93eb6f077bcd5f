//! Persistance des sauvegardes dans un fichier JSON

use crate::snapshot::Snapshot;
use crate::{Error, Result, DEFAULT_QUEUE};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Fichier de sauvegarde de la radio
///
/// L'écriture passe par un fichier temporaire renommé ensuite : une
/// sauvegarde interrompue ne corrompt pas la précédente.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
    default_queue: String,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            default_queue: DEFAULT_QUEUE.to_string(),
        }
    }

    /// File recevant une liste `playlist` anonyme au chargement
    pub fn with_default_queue(mut self, queue: impl Into<String>) -> Self {
        self.default_queue = queue.into();
        self
    }

    pub fn default_queue(&self) -> &str {
        &self.default_queue
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lit la sauvegarde ; `None` si le fichier n'existe pas encore
    pub async fn load(&self) -> Result<Option<Snapshot>> {
        let json = match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No snapshot at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(Error::PersistenceError(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        Snapshot::from_json_with_default(&json, &self.default_queue).map(Some)
    }

    /// Écrit la sauvegarde
    pub async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let json = snapshot.to_json()?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::PersistenceError(format!("Failed to create directory: {}", e))
            })?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(|e| {
            Error::PersistenceError(format!("Failed to write {}: {}", tmp.display(), e))
        })?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            Error::PersistenceError(format!(
                "Failed to move snapshot into {}: {}",
                self.path.display(),
                e
            ))
        })?;

        debug!("Snapshot written to {}", self.path.display());
        Ok(())
    }
}
