pub mod channel;
pub mod error;
pub mod gallery;
pub mod io;
pub mod platform;
pub mod registrar;
pub mod storage;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use channel::{Bridge, MethodCall, MethodResponse};
pub use error::ErrorCode;
pub use gallery::{
    AttemptFailure, AttemptStage, GalleryError, GallerySaveService, GallerySettings, SaveOutcome,
    SavedMedia,
};
pub use platform::{DirectoryResolver, StandardDirectories};
pub use registrar::{
    AuthorizationGatekeeper, AuthorizationStatus, AuthorizedRegistrar, Completion,
    GalleryRegistrar, LocalMediaIndex, MediaHandle, MediaIndex, RegistrationError, ScanRegistrar,
};
pub use shootsolo_config::{CollisionPolicy, MediaCategory, Orientation};
pub use storage::{FsStats, FsStatsProvider, StatvfsProvider, StorageError, StorageInfoService};
