//! Desktop and iOS directory lookup via the `dirs` crate
//!
//! Desktops have no camera roll, so recordings go to the user's videos
//! directory first. On iOS `dirs` resolves inside the app sandbox; the photo
//! library itself is reached through the registrar, not a directory.

use super::DirectoryResolver;
use shootsolo_config::MediaCategory;
use std::path::PathBuf;

#[derive(Debug, Default, Clone, Copy)]
pub struct StandardDirectories;

impl DirectoryResolver for StandardDirectories {
    #[cfg(not(target_os = "ios"))]
    fn resolve(&self, category: MediaCategory) -> Option<PathBuf> {
        match category {
            MediaCategory::Camera | MediaCategory::Movies => dirs::video_dir(),
            MediaCategory::Pictures => dirs::picture_dir(),
        }
    }

    #[cfg(target_os = "ios")]
    fn resolve(&self, _category: MediaCategory) -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join("Documents"))
    }
}

pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("shootsolo"))
}
