//! Rendered sticker PDFs on local disk.
//!
//! Every render gets its own [`ArtifactId`] and file, so concurrent prints
//! never overwrite each other. Files are written to a `.part` sibling and
//! renamed into place; only complete files are ever registered.
//!
//! The id → file index lives in memory. Only the newest `retention` artifacts
//! are kept: older ones are evicted (index entry and file) as new ones are
//! stored, and files left over from a previous process are swept on open.
//! Artifacts are visible only to the user who printed them.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use labelforge_core::{ArtifactId, UserId};


/// Artifacts kept on disk when no retention is configured.
pub const DEFAULT_RETENTION: usize = 200;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact not found")]
    NotFound,
    #[error("artifact io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ArtifactError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A rendered PDF registered with the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StickerArtifact {
    pub id: ArtifactId,
    pub path: PathBuf,
    pub owner: UserId,
    pub sticker_count: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Index {
    by_id: HashMap<ArtifactId, StickerArtifact>,
    /// Registration order, oldest first.
    order: VecDeque<ArtifactId>,
}

impl Index {
    fn remove(&mut self, id: ArtifactId) -> Option<StickerArtifact> {
        self.order.retain(|o| *o != id);
        self.by_id.remove(&id)
    }
}

#[derive(Debug)]
pub struct ArtifactStore {
    dir: PathBuf,
    retention: usize,
    index: RwLock<Index>,
}

impl ArtifactStore {
    /// Open (creating if needed) the output directory, keeping at most
    /// `retention` artifacts.
    ///
    /// Artifact files from an earlier process can never be served again and
    /// are removed.
    pub async fn open(dir: impl Into<PathBuf>, retention: usize) -> Result<Self, ArtifactError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| ArtifactError::io(&dir, e))?;

        let swept = sweep_orphans(&dir).await?;
        if swept > 0 {
            tracing::info!(dir = %dir.display(), swept, "removed artifacts from a previous run");
        }

        Ok(Self {
            dir,
            retention: retention.max(1),
            index: RwLock::new(Index::default()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `pdf` to a fresh file and register it as `owner`'s latest
    /// artifact, evicting the oldest artifacts beyond the retention limit.
    pub async fn store(
        &self,
        owner: UserId,
        sticker_count: usize,
        pdf: Vec<u8>,
    ) -> Result<StickerArtifact, ArtifactError> {
        let id = ArtifactId::new();
        let path = self.dir.join(format!("{id}.pdf"));
        let partial = self.dir.join(format!("{id}.pdf.part"));

        if let Err(e) = tokio::fs::write(&partial, &pdf).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(ArtifactError::io(&partial, e));
        }
        if let Err(e) = tokio::fs::rename(&partial, &path).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(ArtifactError::io(&path, e));
        }

        let artifact = StickerArtifact {
            id,
            path,
            owner,
            sticker_count,
            created_at: Utc::now(),
        };

        let (evicted, retained) = {
            let mut index = self.index.write().unwrap_or_else(|e| e.into_inner());
            index.by_id.insert(id, artifact.clone());
            index.order.push_back(id);

            let mut evicted = Vec::new();
            while index.order.len() > self.retention {
                if let Some(old) = index.order.pop_front() {
                    evicted.extend(index.by_id.remove(&old));
                }
            }
            (evicted, index.order.len())
        };

        for old in evicted {
            if let Err(e) = remove_file(&old.path).await {
                tracing::warn!(artifact_id = %old.id, "failed to remove evicted artifact: {e}");
            }
        }

        tracing::debug!(artifact_id = %id, bytes = pdf.len(), retained, "stored sticker artifact");
        Ok(artifact)
    }

    /// Artifact `id`, if it exists and belongs to `owner`.
    pub fn get(&self, owner: UserId, id: ArtifactId) -> Option<StickerArtifact> {
        let index = self.index.read().unwrap_or_else(|e| e.into_inner());
        index.by_id.get(&id).filter(|a| a.owner == owner).cloned()
    }

    /// Most recent artifact printed by `owner`.
    pub fn latest_for(&self, owner: UserId) -> Option<StickerArtifact> {
        let index = self.index.read().unwrap_or_else(|e| e.into_inner());
        index
            .order
            .iter()
            .rev()
            .filter_map(|id| index.by_id.get(id))
            .find(|a| a.owner == owner)
            .cloned()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.index.read().unwrap_or_else(|e| e.into_inner()).by_id.len()
    }

    /// Read the PDF bytes of a registered artifact.
    pub async fn read(&self, artifact: &StickerArtifact) -> Result<Vec<u8>, ArtifactError> {
        match tokio::fs::read(&artifact.path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ArtifactError::NotFound),
            Err(e) => Err(ArtifactError::io(&artifact.path, e)),
        }
    }

    /// Unregister an artifact and delete its file.
    pub async fn discard(&self, id: ArtifactId) -> Result<(), ArtifactError> {
        let removed = self.index.write().unwrap_or_else(|e| e.into_inner()).remove(id);
        match removed {
            Some(artifact) => remove_file(&artifact.path).await,
            None => Err(ArtifactError::NotFound),
        }
    }
}

async fn remove_file(path: &Path) -> Result<(), ArtifactError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ArtifactError::io(path, e)),
    }
}

/// Delete `{artifact_id}.pdf` and `{artifact_id}.pdf.part` files in `dir`.
async fn sweep_orphans(dir: &Path) -> Result<usize, ArtifactError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| ArtifactError::io(dir, e))?;

    let mut swept = 0;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ArtifactError::io(dir, e))?
    {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let stem = name
            .strip_suffix(".pdf.part")
            .or_else(|| name.strip_suffix(".pdf"));
        if stem.is_some_and(|s| s.parse::<ArtifactId>().is_ok()) {
            remove_file(&entry.path()).await?;
            swept += 1;
        }
    }
    Ok(swept)
}
