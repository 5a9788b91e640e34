use super::{
    AuthorizationGatekeeper, AuthorizationStatus, Completion, GalleryRegistrar, MediaHandle,
    MediaIndex, RegistrationError, scan_and_wait,
};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Registration that needs the library gatekeeper's permission first.
pub struct AuthorizedRegistrar {
    gatekeeper: Arc<dyn AuthorizationGatekeeper>,
    index: Arc<dyn MediaIndex>,
}

impl AuthorizedRegistrar {
    pub fn new(gatekeeper: Arc<dyn AuthorizationGatekeeper>, index: Arc<dyn MediaIndex>) -> Self {
        Self { gatekeeper, index }
    }
}

#[async_trait]
impl GalleryRegistrar for AuthorizedRegistrar {
    async fn authorize(&self) -> Result<(), RegistrationError> {
        let (completion, receiver) = Completion::channel();
        self.gatekeeper.request_authorization(completion);

        match receiver.await {
            Ok(AuthorizationStatus::Granted) => Ok(()),
            Ok(AuthorizationStatus::Denied) => Err(RegistrationError::Denied),
            Err(_) => Err(RegistrationError::Abandoned("authorization")),
        }
    }

    async fn register(
        &self,
        path: &Path,
        mime_type: &str,
    ) -> Result<MediaHandle, RegistrationError> {
        log::debug!("Adding {} to the media library", path.display());
        scan_and_wait(self.index.as_ref(), path, mime_type).await
    }
}
