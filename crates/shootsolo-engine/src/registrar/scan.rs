use super::{GalleryRegistrar, MediaHandle, MediaIndex, RegistrationError, scan_and_wait};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Registration by index-refresh notification. No prior authorization.
pub struct ScanRegistrar {
    index: Arc<dyn MediaIndex>,
}

impl ScanRegistrar {
    pub fn new(index: Arc<dyn MediaIndex>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl GalleryRegistrar for ScanRegistrar {
    async fn register(
        &self,
        path: &Path,
        mime_type: &str,
    ) -> Result<MediaHandle, RegistrationError> {
        log::debug!("Requesting media scan of {}", path.display());
        scan_and_wait(self.index.as_ref(), path, mime_type).await
    }
}
