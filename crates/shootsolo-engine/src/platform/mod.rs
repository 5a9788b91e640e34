//! Platform-specific directory lookup
//!
//! Resolves the public media directories a recording may be saved into, and
//! the private data directory whose volume we report free space for.

#[cfg(target_os = "android")]
mod android;
#[cfg(not(target_os = "android"))]
mod desktop;

#[cfg(target_os = "android")]
pub use android::{StandardDirectories, default_data_dir};
#[cfg(not(target_os = "android"))]
pub use desktop::{StandardDirectories, default_data_dir};

use shootsolo_config::{DirectoryOverrides, MediaCategory};
use std::path::PathBuf;

/// Maps a media category onto a root directory on this device
pub trait DirectoryResolver: Send + Sync {
    fn resolve(&self, category: MediaCategory) -> Option<PathBuf>;
}

/// Directories from the config file, falling back to another resolver for
/// categories that are not overridden.
pub struct ConfiguredDirectories<R> {
    overrides: DirectoryOverrides,
    fallback: R,
}

impl<R: DirectoryResolver> ConfiguredDirectories<R> {
    pub fn new(overrides: DirectoryOverrides, fallback: R) -> Self {
        Self {
            overrides,
            fallback,
        }
    }
}

impl<R: DirectoryResolver> DirectoryResolver for ConfiguredDirectories<R> {
    fn resolve(&self, category: MediaCategory) -> Option<PathBuf> {
        match self.overrides.get(category) {
            Some(path) => Some(path.to_path_buf()),
            None => self.fallback.resolve(category),
        }
    }
}

/// Resolve `categories` in order into candidate roots.
///
/// Categories the platform has no directory for are skipped, and a root that
/// another category already produced is only listed once.
pub fn candidate_roots(
    resolver: &dyn DirectoryResolver,
    categories: &[MediaCategory],
) -> Vec<PathBuf> {
    let mut roots: Vec<PathBuf> = Vec::with_capacity(categories.len());
    for &category in categories {
        match resolver.resolve(category) {
            Some(root) if roots.contains(&root) => {
                log::debug!("{category:?} shares {} with an earlier candidate", root.display());
            }
            Some(root) => roots.push(root),
            None => log::debug!("No {category:?} directory on this platform"),
        }
    }
    roots
}
