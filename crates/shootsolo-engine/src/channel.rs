//! Method-channel entry point for the host UI.
//!
//! The UI sends `(channel, method, arguments)` triples over two named
//! channels, `<prefix>/storage` and `<prefix>/media`, and gets back a success
//! value, a coded error, or "not implemented".

use crate::error::ErrorCode;
use crate::gallery::{GalleryError, GallerySaveService, GallerySettings};
use crate::platform::{ConfiguredDirectories, DirectoryResolver, candidate_roots};
use crate::registrar::GalleryRegistrar;
use crate::storage::StorageInfoService;
use serde_json::{Value, json};
use shootsolo_config::{Config, Orientation};
use std::path::PathBuf;
use std::sync::Arc;

pub const GET_AVAILABLE_STORAGE: &str = "getAvailableStorage";
pub const ADD_TO_GALLERY: &str = "addToGallery";

#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub method: String,
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    /// String argument from a map-shaped argument list
    pub fn argument(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MethodResponse {
    Success(Value),
    Error {
        code: ErrorCode,
        message: String,
        details: Option<String>,
    },
    NotImplemented,
}

impl MethodResponse {
    fn error(code: ErrorCode, message: &str, details: Option<String>) -> Self {
        MethodResponse::Error {
            code,
            message: message.to_string(),
            details,
        }
    }
}

impl From<&GalleryError> for MethodResponse {
    fn from(error: &GalleryError) -> Self {
        match error {
            GalleryError::InvalidArgument => {
                MethodResponse::error(error.code(), "Path is required", None)
            }
            GalleryError::FileNotFound(path) => MethodResponse::error(
                error.code(),
                "The specified file does not exist.",
                Some(path.display().to_string()),
            ),
            GalleryError::PermissionDenied => MethodResponse::error(
                error.code(),
                "Permission to add to the media library was denied.",
                None,
            ),
            GalleryError::Failed { attempts } => MethodResponse::error(
                error.code(),
                "Failed to add video to gallery.",
                Some(
                    attempts
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join("; "),
                ),
            ),
        }
    }
}

/// Owns both services and answers channel calls.
pub struct Bridge {
    storage_channel: String,
    media_channel: String,
    storage: StorageInfoService,
    gallery: GallerySaveService,
    orientation_lock: Option<Orientation>,
}

impl Bridge {
    pub fn new(config: &Config, storage: StorageInfoService, gallery: GallerySaveService) -> Self {
        Self {
            storage_channel: config.storage_channel(),
            media_channel: config.media_channel(),
            storage,
            gallery,
            orientation_lock: config.orientation_lock,
        }
    }

    /// Build the bridge for a device.
    ///
    /// `registrar` decides how files reach the media index; `platform_dirs`
    /// supplies public directories the config file does not override.
    pub fn compose(
        config: &Config,
        data_dir: PathBuf,
        registrar: Arc<dyn GalleryRegistrar>,
        platform_dirs: impl DirectoryResolver,
    ) -> Self {
        let resolver = ConfiguredDirectories::new(config.directories.clone(), platform_dirs);
        let roots = candidate_roots(&resolver, &config.gallery.candidates);
        log::info!(
            "Gallery candidates: {}",
            roots
                .iter()
                .map(|r| r.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let storage = StorageInfoService::for_data_dir(data_dir);
        let gallery =
            GallerySaveService::new(registrar, roots, GallerySettings::from(&config.gallery));
        Self::new(config, storage, gallery)
    }

    pub fn storage(&self) -> &StorageInfoService {
        &self.storage
    }

    pub fn gallery(&self) -> &GallerySaveService {
        &self.gallery
    }

    pub fn orientation_lock(&self) -> Option<Orientation> {
        self.orientation_lock
    }

    pub fn storage_channel(&self) -> &str {
        &self.storage_channel
    }

    pub fn media_channel(&self) -> &str {
        &self.media_channel
    }

    pub async fn handle(&self, channel: &str, call: &MethodCall) -> MethodResponse {
        let response = if channel == self.storage_channel {
            match call.method.as_str() {
                GET_AVAILABLE_STORAGE => self.get_available_storage().await,
                _ => MethodResponse::NotImplemented,
            }
        } else if channel == self.media_channel {
            match call.method.as_str() {
                ADD_TO_GALLERY => self.add_to_gallery(call).await,
                _ => MethodResponse::NotImplemented,
            }
        } else {
            MethodResponse::NotImplemented
        };

        if response == MethodResponse::NotImplemented {
            log::warn!("No handler for {}#{}", channel, call.method);
        }
        response
    }

    async fn get_available_storage(&self) -> MethodResponse {
        match self.storage.available_bytes().await {
            Ok(bytes) => MethodResponse::Success(json!(bytes)),
            Err(e) => MethodResponse::error(
                e.code(),
                "Could not get available storage.",
                Some(e.to_string()),
            ),
        }
    }

    async fn add_to_gallery(&self, call: &MethodCall) -> MethodResponse {
        let Some(path) = call.argument("path") else {
            return MethodResponse::from(&GalleryError::InvalidArgument);
        };

        match self.gallery.save(path).await {
            Ok(saved) => MethodResponse::Success(json!({
                "message": saved.confirmation(),
                "path": saved.path.display().to_string(),
                "handle": saved.handle.0,
            })),
            Err(e) => MethodResponse::from(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registrar::{AuthorizedRegistrar, ScanRegistrar};
    use crate::storage::{FsStats, FsStatsProvider};
    use crate::tests::{FixedGatekeeper, ScriptedIndex, create_test_dir, create_test_file};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use shootsolo_config::MediaCategory;
    use std::io;
    use std::path::Path;
    use tempfile::TempDir;

    struct UnderDir(PathBuf);

    impl DirectoryResolver for UnderDir {
        fn resolve(&self, category: MediaCategory) -> Option<PathBuf> {
            Some(self.0.join(format!("{category:?}")))
        }
    }

    struct BrokenStats;

    impl FsStatsProvider for BrokenStats {
        fn stats(&self, _path: &Path) -> io::Result<FsStats> {
            Err(io::Error::other("no statvfs here"))
        }
    }

    fn scan_bridge(dir: &TempDir) -> Bridge {
        Bridge::compose(
            &Config::default(),
            dir.path().to_path_buf(),
            Arc::new(ScanRegistrar::new(Arc::new(ScriptedIndex::default()))),
            UnderDir(dir.path().to_path_buf()),
        )
    }

    fn add_to_gallery(path: &str) -> MethodCall {
        MethodCall::new(ADD_TO_GALLERY, json!({ "path": path }))
    }

    #[tokio::test]
    async fn test_compose_uses_config_channels_and_candidates() {
        let dir = create_test_dir();
        let bridge = scan_bridge(&dir);

        assert_eq!(bridge.storage_channel(), "com.example.videorecord/storage");
        assert_eq!(bridge.media_channel(), "com.example.videorecord/media");
        assert_eq!(
            bridge.gallery().roots(),
            &[
                dir.path().join("Camera"),
                dir.path().join("Movies"),
                dir.path().join("Pictures"),
            ]
        );
        assert_eq!(bridge.orientation_lock(), None);
    }

    #[tokio::test]
    async fn test_compose_applies_overrides_and_orientation() {
        let dir = create_test_dir();
        let mut config = Config::default();
        config.directories.camera = Some(dir.path().join("sdcard-dcim"));
        config.gallery.candidates = vec![MediaCategory::Camera, MediaCategory::Pictures];
        config.orientation_lock = Some(Orientation::Portrait);

        let bridge = Bridge::compose(
            &config,
            dir.path().to_path_buf(),
            Arc::new(ScanRegistrar::new(Arc::new(ScriptedIndex::default()))),
            UnderDir(dir.path().to_path_buf()),
        );

        assert_eq!(
            bridge.gallery().roots(),
            &[dir.path().join("sdcard-dcim"), dir.path().join("Pictures")]
        );
        assert_eq!(bridge.orientation_lock(), Some(Orientation::Portrait));
    }

    #[tokio::test]
    async fn test_get_available_storage_success() {
        let dir = create_test_dir();
        let bridge = scan_bridge(&dir);

        let response = bridge
            .handle(
                "com.example.videorecord/storage",
                &MethodCall::new(GET_AVAILABLE_STORAGE, Value::Null),
            )
            .await;

        assert!(matches!(response, MethodResponse::Success(Value::Number(_))));
    }

    #[tokio::test]
    async fn test_get_available_storage_unavailable() {
        let dir = create_test_dir();
        let config = Config::default();
        let bridge = Bridge::new(
            &config,
            StorageInfoService::new(Arc::new(BrokenStats), dir.path().to_path_buf()),
            GallerySaveService::new(
                Arc::new(ScanRegistrar::new(Arc::new(ScriptedIndex::default()))),
                vec![],
                GallerySettings::default(),
            ),
        );

        let response = bridge
            .handle(
                &config.storage_channel(),
                &MethodCall::new(GET_AVAILABLE_STORAGE, Value::Null),
            )
            .await;

        match response {
            MethodResponse::Error { code, message, .. } => {
                assert_eq!(code, ErrorCode::Unavailable);
                assert_eq!(message, "Could not get available storage.");
            }
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_add_to_gallery_success_payload() {
        let dir = create_test_dir();
        let source = create_test_file(&dir, "clip.mp4", b"frames");
        let bridge = scan_bridge(&dir);

        let response = bridge
            .handle(
                "com.example.videorecord/media",
                &add_to_gallery(&source.to_string_lossy()),
            )
            .await;

        let expected_path = dir.path().join("Camera").join("Camera").join("clip.mp4");
        assert_eq!(
            response,
            MethodResponse::Success(json!({
                "message": format!("Video added to gallery at: {}", expected_path.display()),
                "path": expected_path.display().to_string(),
                "handle": "content://media/external/video/media/1",
            }))
        );
    }

    #[rstest]
    #[case::missing_argument(json!({}), ErrorCode::InvalidArgument, "Path is required")]
    #[case::wrong_type(json!({ "path": 42 }), ErrorCode::InvalidArgument, "Path is required")]
    #[case::empty_path(json!({ "path": "" }), ErrorCode::InvalidArgument, "Path is required")]
    #[case::missing_file(
        json!({ "path": "/no/such/recording.mp4" }),
        ErrorCode::FileNotFound,
        "The specified file does not exist."
    )]
    #[tokio::test]
    async fn test_add_to_gallery_errors(
        #[case] arguments: Value,
        #[case] code: ErrorCode,
        #[case] message: &str,
    ) {
        let dir = create_test_dir();
        let bridge = scan_bridge(&dir);

        let response = bridge
            .handle(
                "com.example.videorecord/media",
                &MethodCall::new(ADD_TO_GALLERY, arguments),
            )
            .await;

        match response {
            MethodResponse::Error {
                code: actual_code,
                message: actual_message,
                ..
            } => {
                assert_eq!(actual_code, code);
                assert_eq!(actual_message, message);
            }
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_add_to_gallery_permission_denied() {
        let dir = create_test_dir();
        let source = create_test_file(&dir, "clip.mp4", b"frames");
        let bridge = Bridge::compose(
            &Config::default(),
            dir.path().to_path_buf(),
            Arc::new(AuthorizedRegistrar::new(
                Arc::new(FixedGatekeeper::denying()),
                Arc::new(ScriptedIndex::default()),
            )),
            UnderDir(dir.path().to_path_buf()),
        );

        let response = bridge
            .handle(
                "com.example.videorecord/media",
                &add_to_gallery(&source.to_string_lossy()),
            )
            .await;

        assert!(matches!(
            response,
            MethodResponse::Error {
                code: ErrorCode::PermissionDenied,
                ..
            }
        ));
    }

    #[test]
    fn test_failed_details_list_every_attempt() {
        let error = GalleryError::Failed {
            attempts: vec![
                crate::gallery::AttemptFailure {
                    root: PathBuf::from("/sdcard/DCIM"),
                    stage: crate::gallery::AttemptStage::CreateDirectory,
                    reason: "read-only".to_string(),
                },
                crate::gallery::AttemptFailure {
                    root: PathBuf::from("/sdcard/Movies"),
                    stage: crate::gallery::AttemptStage::Register,
                    reason: "not indexed".to_string(),
                },
            ],
        };

        assert_eq!(
            MethodResponse::from(&error),
            MethodResponse::Error {
                code: ErrorCode::Failed,
                message: "Failed to add video to gallery.".to_string(),
                details: Some(
                    "creating directory under /sdcard/DCIM failed: read-only; \
                     registering under /sdcard/Movies failed: not indexed"
                        .to_string()
                ),
            }
        );
    }

    #[rstest]
    #[case::unknown_method("com.example.videorecord/media", "deleteFromGallery")]
    #[case::method_on_wrong_channel("com.example.videorecord/storage", ADD_TO_GALLERY)]
    #[case::unknown_channel("com.example.videorecord/camera", GET_AVAILABLE_STORAGE)]
    #[tokio::test]
    async fn test_not_implemented(#[case] channel: &str, #[case] method: &str) {
        let dir = create_test_dir();
        let bridge = scan_bridge(&dir);

        let response = bridge
            .handle(channel, &MethodCall::new(method, Value::Null))
            .await;

        assert_eq!(response, MethodResponse::NotImplemented);
    }
}
