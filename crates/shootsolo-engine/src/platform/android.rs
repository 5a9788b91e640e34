//! Android shared-storage layout
//!
//! Mirrors `Environment.getExternalStoragePublicDirectory` for the primary
//! volume. Hosts that need a different volume override the directories in
//! the config file.

use super::DirectoryResolver;
use shootsolo_config::MediaCategory;
use std::path::PathBuf;

const PRIMARY_SHARED_STORAGE: &str = "/storage/emulated/0";

#[derive(Debug, Default, Clone, Copy)]
pub struct StandardDirectories;

impl DirectoryResolver for StandardDirectories {
    fn resolve(&self, category: MediaCategory) -> Option<PathBuf> {
        let dir = match category {
            MediaCategory::Camera => "DCIM",
            MediaCategory::Movies => "Movies",
            MediaCategory::Pictures => "Pictures",
        };
        Some(PathBuf::from(PRIMARY_SHARED_STORAGE).join(dir))
    }
}

/// The app's private data directory is only known to the host (`Context.getFilesDir()`).
pub fn default_data_dir() -> Option<PathBuf> {
    None
}
