use super::{Completion, MediaHandle, MediaIndex};
use std::fs;
use std::path::Path;

/// Media index for desktops, which have no gallery database.
///
/// Accepts any non-empty regular file and hands back its `file://` URI.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalMediaIndex;

impl MediaIndex for LocalMediaIndex {
    fn scan(&self, path: &Path, _mime_type: &str, completion: Completion<Option<MediaHandle>>) {
        let indexed = match fs::metadata(path) {
            Ok(metadata) if metadata.is_file() && metadata.len() > 0 => {
                Some(MediaHandle(format!("file://{}", path.display())))
            }
            Ok(_) => {
                log::warn!("Refusing to index empty or non-file {}", path.display());
                None
            }
            Err(e) => {
                log::warn!("Cannot index {}: {e}", path.display());
                None
            }
        };
        completion.complete(indexed);
    }
}
