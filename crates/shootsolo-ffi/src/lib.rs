//! UniFFI bindings for the ShootSolo mobile apps
//!
//! Exposes the storage and gallery bridge to Kotlin and Swift. The host app
//! supplies the media index (and on iOS the photo-library authorization
//! prompt) as foreign callbacks; everything else runs in Rust.

use shootsolo_config::Config;
use shootsolo_engine::{
    AuthorizationGatekeeper, AuthorizationStatus, AuthorizedRegistrar, Bridge, Completion,
    ErrorCode, GalleryError, GalleryRegistrar, MediaHandle, MediaIndex, MethodCall,
    MethodResponse, Orientation, ScanRegistrar, StandardDirectories,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

uniffi::setup_scaffolding!();

// ============ Errors ============

/// Errors that can cross the FFI boundary, one per channel error code
/// Note: Field is named `reason` not `message` to avoid conflict with Throwable.message in Kotlin
#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum FfiError {
    #[error("Unavailable: {reason}")]
    Unavailable { reason: String },
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },
    #[error("File not found: {reason}")]
    FileNotFound { reason: String },
    #[error("Permission denied: {reason}")]
    PermissionDenied { reason: String },
    #[error("Failed: {reason}")]
    Failed { reason: String },
}

impl FfiError {
    fn new(code: ErrorCode, reason: String) -> Self {
        match code {
            ErrorCode::Unavailable => FfiError::Unavailable { reason },
            ErrorCode::InvalidArgument => FfiError::InvalidArgument { reason },
            ErrorCode::FileNotFound => FfiError::FileNotFound { reason },
            ErrorCode::PermissionDenied => FfiError::PermissionDenied { reason },
            ErrorCode::Failed => FfiError::Failed { reason },
        }
    }
}

impl From<GalleryError> for FfiError {
    fn from(error: GalleryError) -> Self {
        let reason = match &error {
            GalleryError::Failed { attempts } if !attempts.is_empty() => format!(
                "{error}: {}",
                attempts
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ")
            ),
            _ => error.to_string(),
        };
        FfiError::new(error.code(), reason)
    }
}

// ============ Foreign callbacks ============

/// The platform media index (MediaScannerConnection, PHPhotoLibrary, ...).
///
/// `scan` must return promptly; the answer goes through `completion`.
#[uniffi::export(with_foreign)]
pub trait MediaIndexCallback: Send + Sync {
    fn scan(&self, path: String, mime_type: String, completion: Arc<ScanCompletion>);
}

/// Asks the user for permission to add to the photo library.
#[uniffi::export(with_foreign)]
pub trait AuthorizationCallback: Send + Sync {
    fn request(&self, completion: Arc<AuthorizationCompletion>);
}

/// Single-use answer to a [`MediaIndexCallback::scan`].
///
/// Dropping it without calling `complete` counts as a failed registration.
#[derive(uniffi::Object)]
pub struct ScanCompletion {
    inner: Completion<Option<MediaHandle>>,
}

#[uniffi::export]
impl ScanCompletion {
    /// Report the handle the index assigned, or `None` if it refused the file.
    /// Returns false if this completion was already used.
    pub fn complete(&self, handle: Option<String>) -> bool {
        self.inner.complete(handle.map(MediaHandle))
    }
}

/// Single-use answer to an [`AuthorizationCallback::request`].
#[derive(uniffi::Object)]
pub struct AuthorizationCompletion {
    inner: Completion<AuthorizationStatus>,
}

#[uniffi::export]
impl AuthorizationCompletion {
    pub fn complete(&self, granted: bool) -> bool {
        let status = if granted {
            AuthorizationStatus::Granted
        } else {
            AuthorizationStatus::Denied
        };
        self.inner.complete(status)
    }
}

struct ForeignMediaIndex(Arc<dyn MediaIndexCallback>);

impl MediaIndex for ForeignMediaIndex {
    fn scan(&self, path: &Path, mime_type: &str, completion: Completion<Option<MediaHandle>>) {
        self.0.scan(
            path.display().to_string(),
            mime_type.to_string(),
            Arc::new(ScanCompletion { inner: completion }),
        );
    }
}

struct ForeignGatekeeper(Arc<dyn AuthorizationCallback>);

impl AuthorizationGatekeeper for ForeignGatekeeper {
    fn request_authorization(&self, completion: Completion<AuthorizationStatus>) {
        self.0
            .request(Arc::new(AuthorizationCompletion { inner: completion }));
    }
}

// ============ Bridge Handle ============

/// The storage and gallery bridge for one app instance.
#[derive(uniffi::Object)]
pub struct BridgeHandle {
    inner: Bridge,
}

#[uniffi::export(async_runtime = "tokio")]
impl BridgeHandle {
    /// Build the bridge.
    ///
    /// `data_dir` is the app's private storage directory. Without a
    /// `config_path` the defaults are used. Passing a `gatekeeper` makes every
    /// save ask for library permission first.
    #[uniffi::constructor]
    pub fn new(
        data_dir: String,
        config_path: Option<String>,
        index: Arc<dyn MediaIndexCallback>,
        gatekeeper: Option<Arc<dyn AuthorizationCallback>>,
    ) -> Result<Self, FfiError> {
        let config = match config_path {
            Some(path) => {
                Config::load_or_default(&path).map_err(|e| FfiError::InvalidArgument {
                    reason: e.to_string(),
                })?
            }
            None => Config::default(),
        };

        let index: Arc<dyn MediaIndex> = Arc::new(ForeignMediaIndex(index));
        let registrar: Arc<dyn GalleryRegistrar> = match gatekeeper {
            Some(gatekeeper) => Arc::new(AuthorizedRegistrar::new(
                Arc::new(ForeignGatekeeper(gatekeeper)),
                index,
            )),
            None => Arc::new(ScanRegistrar::new(index)),
        };

        Ok(Self {
            inner: Bridge::compose(
                &config,
                PathBuf::from(data_dir),
                registrar,
                StandardDirectories,
            ),
        })
    }

    pub fn storage_channel(&self) -> String {
        self.inner.storage_channel().to_string()
    }

    pub fn media_channel(&self) -> String {
        self.inner.media_channel().to_string()
    }

    /// Orientation the recording screen should be locked to, if any.
    pub fn orientation_lock(&self) -> Option<OrientationDto> {
        self.inner.orientation_lock().map(OrientationDto::from)
    }

    /// Free bytes on the filesystem holding the data directory.
    pub async fn get_available_storage(&self) -> Result<u64, FfiError> {
        self.inner
            .storage()
            .available_bytes()
            .await
            .map_err(|e| FfiError::new(e.code(), e.to_string()))
    }

    /// Copy a finished recording into the gallery and register it.
    pub async fn add_to_gallery(&self, path: String) -> Result<GallerySaveDto, FfiError> {
        let saved = self.inner.gallery().save(&path).await?;
        Ok(GallerySaveDto {
            message: saved.confirmation(),
            path: saved.path.display().to_string(),
            handle: saved.handle.0,
        })
    }

    /// Generic method-channel entry point.
    ///
    /// `arguments_json` is a JSON object such as `{"path": "..."}`; an empty
    /// string means no arguments.
    pub async fn handle_method_call(
        &self,
        channel: String,
        method: String,
        arguments_json: String,
    ) -> MethodResultDto {
        let arguments = if arguments_json.trim().is_empty() {
            serde_json::Value::Null
        } else {
            match serde_json::from_str(&arguments_json) {
                Ok(value) => value,
                Err(e) => {
                    log::warn!("Bad arguments for {channel}#{method}: {e}");
                    return MethodResultDto::Error {
                        code: ErrorCode::InvalidArgument.as_str().to_string(),
                        message: "Arguments are not valid JSON".to_string(),
                        details: Some(e.to_string()),
                    };
                }
            }
        };

        let call = MethodCall::new(method, arguments);
        MethodResultDto::from(self.inner.handle(&channel, &call).await)
    }
}

// ============ DTOs ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum OrientationDto {
    Portrait,
    Landscape,
}

impl From<Orientation> for OrientationDto {
    fn from(orientation: Orientation) -> Self {
        match orientation {
            Orientation::Portrait => OrientationDto::Portrait,
            Orientation::Landscape => OrientationDto::Landscape,
        }
    }
}

/// A recording that reached the gallery.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct GallerySaveDto {
    /// Confirmation text for the user
    pub message: String,
    /// Where the copy ended up
    pub path: String,
    /// Identifier the media index assigned
    pub handle: String,
}

/// Outcome of a method-channel call.
#[derive(Debug, Clone, PartialEq, uniffi::Enum)]
pub enum MethodResultDto {
    /// Result value encoded as JSON
    Success { value_json: String },
    Error {
        code: String,
        message: String,
        details: Option<String>,
    },
    NotImplemented,
}

impl From<MethodResponse> for MethodResultDto {
    fn from(response: MethodResponse) -> Self {
        match response {
            MethodResponse::Success(value) => MethodResultDto::Success {
                value_json: value.to_string(),
            },
            MethodResponse::Error {
                code,
                message,
                details,
            } => MethodResultDto::Error {
                code: code.as_str().to_string(),
                message,
                details,
            },
            MethodResponse::NotImplemented => MethodResultDto::NotImplemented,
        }
    }
}

// ============ Standalone Functions ============

/// Install the platform log backend. Safe to call more than once.
#[uniffi::export]
pub fn init_logging() {
    #[cfg(target_os = "android")]
    {
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(log::LevelFilter::Debug)
                .with_tag("ShootSolo"),
        );
    }

    #[cfg(not(target_os = "android"))]
    {
        // Already installed on repeat calls
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .try_init();
    }
}
