//! Saving finished recordings into the shared media gallery.

mod service;

pub use service::GallerySaveService;

use crate::error::ErrorCode;
use crate::registrar::MediaHandle;
use shootsolo_config::{CollisionPolicy, GalleryConfig};
use std::fmt;
use std::path::PathBuf;

/// Knobs for one gallery service, taken from [`GalleryConfig`]
#[derive(Debug, Clone, PartialEq)]
pub struct GallerySettings {
    /// Folder created under every candidate root
    pub subfolder: String,
    /// MIME hint passed to the media index
    pub mime_type: String,
    pub collision: CollisionPolicy,
    /// Remove the destination file when copy or registration fails
    pub cleanup_on_failure: bool,
}

impl Default for GallerySettings {
    fn default() -> Self {
        Self::from(&GalleryConfig::default())
    }
}

impl From<&GalleryConfig> for GallerySettings {
    fn from(config: &GalleryConfig) -> Self {
        Self {
            subfolder: config.subfolder.clone(),
            mime_type: config.mime_type.clone(),
            collision: config.collision,
            cleanup_on_failure: config.cleanup_on_failure,
        }
    }
}

/// A recording that made it into the gallery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedMedia {
    pub path: PathBuf,
    pub handle: MediaHandle,
    /// 1-based position of the candidate root that took the file
    pub attempt: usize,
}

impl SavedMedia {
    /// Confirmation text shown to the user
    pub fn confirmation(&self) -> String {
        format!("Video added to gallery at: {}", self.path.display())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptStage {
    CreateDirectory,
    Copy,
    Register,
}

impl fmt::Display for AttemptStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AttemptStage::CreateDirectory => "creating directory",
            AttemptStage::Copy => "copying",
            AttemptStage::Register => "registering",
        })
    }
}

/// Why one candidate root did not take the file
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{stage} under {} failed: {reason}", .root.display())]
pub struct AttemptFailure {
    pub root: PathBuf,
    pub stage: AttemptStage,
    pub reason: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GalleryError {
    #[error("Path is required")]
    InvalidArgument,
    #[error("The specified file does not exist: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("Permission to add to the media library was denied")]
    PermissionDenied,
    #[error("Failed to add video to gallery after {} attempt(s)", .attempts.len())]
    Failed { attempts: Vec<AttemptFailure> },
}

impl GalleryError {
    pub fn code(&self) -> ErrorCode {
        match self {
            GalleryError::InvalidArgument => ErrorCode::InvalidArgument,
            GalleryError::FileNotFound(_) => ErrorCode::FileNotFound,
            GalleryError::PermissionDenied => ErrorCode::PermissionDenied,
            GalleryError::Failed { .. } => ErrorCode::Failed,
        }
    }
}

/// Result of a gallery save: the one destination that worked, or why none did
pub type SaveOutcome = Result<SavedMedia, GalleryError>;
