use super::{AttemptFailure, AttemptStage, GalleryError, GallerySettings, SaveOutcome, SavedMedia};
use crate::io::{self, IoError};
use crate::registrar::{GalleryRegistrar, MediaHandle};
use shootsolo_config::CollisionPolicy;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Copies recordings into the first candidate root that will take them.
///
/// Candidates are tried strictly in order, one at a time. A candidate counts
/// only once the media index has confirmed the file; the first confirmed
/// candidate ends the save and later ones are never touched.
pub struct GallerySaveService {
    registrar: Arc<dyn GalleryRegistrar>,
    roots: Vec<PathBuf>,
    settings: GallerySettings,
}

impl GallerySaveService {
    pub fn new(
        registrar: Arc<dyn GalleryRegistrar>,
        roots: Vec<PathBuf>,
        settings: GallerySettings,
    ) -> Self {
        Self {
            registrar,
            roots,
            settings,
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn settings(&self) -> &GallerySettings {
        &self.settings
    }

    pub async fn save(&self, source: &str) -> SaveOutcome {
        if source.trim().is_empty() {
            return Err(GalleryError::InvalidArgument);
        }
        let source = PathBuf::from(source);

        match tokio::fs::metadata(&source).await {
            Ok(metadata) if metadata.is_file() => {}
            _ => {
                log::warn!("Recording {} does not exist", source.display());
                return Err(GalleryError::FileNotFound(source));
            }
        }

        self.registrar.authorize().await.map_err(|e| {
            log::warn!("Media library authorization failed: {e}");
            GalleryError::PermissionDenied
        })?;

        log::info!(
            "Saving {} to gallery, {} candidate(s)",
            source.display(),
            self.roots.len()
        );

        let mut failures = Vec::new();
        for (index, root) in self.roots.iter().enumerate() {
            match self.attempt(&source, root).await {
                Ok((path, handle)) => {
                    log::info!("Added {} to gallery as {handle}", path.display());
                    return Ok(SavedMedia {
                        path,
                        handle,
                        attempt: index + 1,
                    });
                }
                Err(failure) => {
                    log::warn!("Gallery candidate {} rejected: {failure}", index + 1);
                    failures.push(failure);
                }
            }
        }

        log::error!(
            "Could not add {} to gallery; all {} candidate(s) failed",
            source.display(),
            failures.len()
        );
        Err(GalleryError::Failed { attempts: failures })
    }

    async fn attempt(
        &self,
        source: &Path,
        root: &Path,
    ) -> Result<(PathBuf, MediaHandle), AttemptFailure> {
        let folder = root.join(&self.settings.subfolder);
        let source = source.to_path_buf();
        let collision = self.settings.collision;
        let cleanup = self.settings.cleanup_on_failure;

        let (destination, created) = tokio::task::spawn_blocking(move || {
            copy_into(&source, &folder, collision, cleanup)
        })
        .await
        .map_err(|e| failure(root, AttemptStage::Copy, e))?
        .map_err(|(stage, e)| failure(root, stage, e))?;

        match self
            .registrar
            .register(&destination, &self.settings.mime_type)
            .await
        {
            Ok(handle) => Ok((destination, handle)),
            Err(e) => {
                // Only remove a file this attempt created
                if cleanup && created {
                    let orphan = destination.clone();
                    // Cleanup problems are logged by discard()
                    let _ = tokio::task::spawn_blocking(move || discard(&orphan)).await;
                }
                Err(failure(root, AttemptStage::Register, e))
            }
        }
    }
}

/// Create the subfolder and copy the source into it. Runs on the blocking pool.
///
/// Returns the destination and whether this call created the file there.
/// A file that was already in place is replaced whole or not at all.
fn copy_into(
    source: &Path,
    folder: &Path,
    collision: CollisionPolicy,
    cleanup: bool,
) -> Result<(PathBuf, bool), (AttemptStage, IoError)> {
    io::ensure_dir(folder).map_err(|e| (AttemptStage::CreateDirectory, e))?;
    let destination =
        io::destination_for(folder, source, collision).map_err(|e| (AttemptStage::Copy, e))?;

    // Copying a file onto itself would truncate it
    if io::is_same_file(source, &destination) {
        log::debug!("{} is already in {}", source.display(), folder.display());
        return Ok((destination, false));
    }

    let existed = io::exists(&destination);
    log::debug!("Copying {} to {}", source.display(), destination.display());
    let copied = if existed {
        io::replace_file(source, &destination)
    } else {
        io::copy_file(source, &destination)
    };
    match copied {
        Ok(bytes) => {
            log::debug!("Copied {bytes} bytes to {}", destination.display());
            Ok((destination, !existed))
        }
        Err(e) => {
            if cleanup && !existed && e.left_partial_file() {
                discard(&destination);
            }
            Err((AttemptStage::Copy, e))
        }
    }
}

fn discard(orphan: &Path) {
    match io::remove_file(orphan) {
        Ok(()) => log::debug!("Removed orphaned {}", orphan.display()),
        Err(e) => log::warn!("Could not remove orphaned {}: {e}", orphan.display()),
    }
}

fn failure(root: &Path, stage: AttemptStage, reason: impl ToString) -> AttemptFailure {
    AttemptFailure {
        root: root.to_path_buf(),
        stage,
        reason: reason.to_string(),
    }
}
