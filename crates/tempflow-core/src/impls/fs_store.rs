//! LocalArtifactStore - one file per artifact in a single directory.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use ulid::Ulid;

use crate::domain::{ArtifactId, PipelineError};
use crate::ports::ArtifactStore;

/// Stores artifacts as plain files under `root`.
///
/// Writes go to a hidden temporary file in the same directory and are renamed
/// into place once flushed, so a crash mid-write never leaves a file under the
/// artifact's name. Artifact names starting with `.` are rejected, which keeps
/// temporaries out of the artifact namespace.
pub struct LocalArtifactStore {
    root: PathBuf,
}

impl LocalArtifactStore {
    /// The directory is created lazily on the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, artifact: &ArtifactId) -> Result<PathBuf, PipelineError> {
        let name = artifact.as_str();
        let flat = !name.is_empty()
            && !name.starts_with('.')
            && !name.contains(['/', '\\'])
            && Path::new(name).file_name().is_some_and(|f| f == name);
        if !flat {
            return Err(PipelineError::InvalidArtifactName(name.to_string()));
        }
        Ok(self.root.join(name))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> PipelineError {
    PipelineError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    async fn exists(&self, artifact: &ArtifactId) -> Result<bool, PipelineError> {
        let path = self.path_for(artifact)?;
        tokio::fs::try_exists(&path)
            .await
            .map_err(|e| io_error(&path, e))
    }

    async fn get(&self, artifact: &ArtifactId) -> Result<String, PipelineError> {
        let path = self.path_for(artifact)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == IoErrorKind::NotFound => {
                Err(PipelineError::ArtifactMissing(artifact.clone()))
            }
            Err(e) => Err(io_error(&path, e)),
        }
    }

    async fn put(&self, artifact: &ArtifactId, content: &str) -> Result<(), PipelineError> {
        let path = self.path_for(artifact)?;
        if self.exists(artifact).await? {
            return Err(PipelineError::ArtifactExists(artifact.clone()));
        }

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| io_error(&self.root, e))?;

        let tmp = self
            .root
            .join(format!(".{}.{}.tmp", artifact.as_str(), Ulid::new()));

        let written = async {
            let mut file = tokio::fs::File::create(&tmp).await?;
            file.write_all(content.as_bytes()).await?;
            file.sync_all().await?;
            tokio::fs::rename(&tmp, &path).await
        }
        .await;

        if let Err(e) = written {
            // best effort: the temporary is invisible to readers either way
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_error(&path, e));
        }

        debug!(artifact = %artifact, path = %path.display(), bytes = content.len(), "artifact written");
        Ok(())
    }

    fn locate(&self, artifact: &ArtifactId) -> String {
        self.root.join(artifact.as_str()).display().to_string()
    }
}
