//! Media-index registration.
//!
//! A copied file is not visible to gallery apps until the platform's media
//! index knows about it. Platforms differ in how that happens, so the gallery
//! service talks to a [`GalleryRegistrar`] chosen when the bridge is built:
//!
//! - [`ScanRegistrar`]: fire an index refresh for the file (Android media scanner)
//! - [`AuthorizedRegistrar`]: ask the library gatekeeper first, then register
//!   (iOS photo library)
//!
//! Platform collaborators report back through a [`Completion`], a single-shot
//! channel the foreign side fires exactly once.

mod authorized;
mod local;
mod scan;

pub use authorized::AuthorizedRegistrar;
pub use local::LocalMediaIndex;
pub use scan::ScanRegistrar;

use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::oneshot;

/// Addressable handle the media index hands back for a registered file
/// (content URI, asset identifier, or `file://` URI).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaHandle(pub String);

impl fmt::Display for MediaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    Granted,
    Denied,
}

/// Sending half of a one-shot result.
///
/// Can be fired through a shared reference so it survives being handed to
/// foreign code as a refcounted object. Only the first call delivers.
pub struct Completion<T> {
    sender: Mutex<Option<oneshot::Sender<T>>>,
}

impl<T> Completion<T> {
    pub fn channel() -> (Self, oneshot::Receiver<T>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                sender: Mutex::new(Some(tx)),
            },
            rx,
        )
    }

    /// Deliver the result. Returns `false` if it was already delivered or
    /// nobody is waiting any more.
    pub fn complete(&self, value: T) -> bool {
        // Recover from poisoned mutex (another thread panicked while holding lock)
        let sender = self.sender.lock().unwrap_or_else(|e| e.into_inner()).take();
        match sender {
            Some(tx) => tx.send(value).is_ok(),
            None => {
                log::warn!("Completion fired more than once; ignoring");
                false
            }
        }
    }
}

impl<T> fmt::Debug for Completion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pending = self
            .sender
            .lock()
            .map(|s| s.is_some())
            .unwrap_or(false);
        f.debug_struct("Completion").field("pending", &pending).finish()
    }
}

/// Platform media index (gallery database).
pub trait MediaIndex: Send + Sync {
    /// Index `path`. Must fire `completion` once with the file's handle, or
    /// `None` if the index rejected it. May complete from any thread.
    fn scan(&self, path: &Path, mime_type: &str, completion: Completion<Option<MediaHandle>>);
}

/// Platform subsystem that grants or denies writes into the shared media library.
pub trait AuthorizationGatekeeper: Send + Sync {
    /// May prompt the user; fires `completion` once the user has answered.
    fn request_authorization(&self, completion: Completion<AuthorizationStatus>);
}

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("Access to the media library was denied")]
    Denied,
    #[error("Media index did not accept {0}")]
    NotIndexed(PathBuf),
    #[error("Platform dropped the {0} callback without answering")]
    Abandoned(&'static str),
}

/// Capability that makes a copied file discoverable by gallery apps.
#[async_trait]
pub trait GalleryRegistrar: Send + Sync {
    /// Called once per save, before any destination is touched.
    async fn authorize(&self) -> Result<(), RegistrationError> {
        Ok(())
    }

    /// Register `path` and wait for the index to answer.
    async fn register(&self, path: &Path, mime_type: &str)
    -> Result<MediaHandle, RegistrationError>;
}

/// Hand `path` to the index and wait for its completion.
pub(crate) async fn scan_and_wait(
    index: &dyn MediaIndex,
    path: &Path,
    mime_type: &str,
) -> Result<MediaHandle, RegistrationError> {
    let (completion, receiver) = Completion::channel();
    index.scan(path, mime_type, completion);

    match receiver.await {
        Ok(Some(handle)) => Ok(handle),
        Ok(None) => Err(RegistrationError::NotIndexed(path.to_path_buf())),
        Err(_) => Err(RegistrationError::Abandoned("media scan")),
    }
}
