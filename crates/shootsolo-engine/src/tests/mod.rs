use crate::registrar::{
    AuthorizationGatekeeper, AuthorizationStatus, Completion, MediaHandle, MediaIndex,
};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

pub fn create_test_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

pub fn create_test_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let file_path = dir.path().join(name);
    fs::write(&file_path, content).expect("Failed to write test file");
    file_path
}

/// How a [`ScriptedIndex`] answers one scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanBehaviour {
    Index,
    Reject,
    Drop,
}

#[derive(Debug, Clone)]
pub struct ScanCall {
    pub path: PathBuf,
    pub mime_type: String,
    /// Size of the file when the index was asked about it
    pub size_at_scan: Option<u64>,
}

/// Media index that answers scans from a script, then indexes everything.
#[derive(Default)]
pub struct ScriptedIndex {
    behaviours: Mutex<VecDeque<ScanBehaviour>>,
    calls: Mutex<Vec<ScanCall>>,
}

impl ScriptedIndex {
    pub fn with(behaviours: Vec<ScanBehaviour>) -> Self {
        Self {
            behaviours: Mutex::new(behaviours.into()),
            calls: Mutex::default(),
        }
    }

    pub fn calls(&self) -> Vec<ScanCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn scanned(&self) -> Vec<PathBuf> {
        self.calls().into_iter().map(|c| c.path).collect()
    }

    pub fn mime_types(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.mime_type).collect()
    }
}

impl MediaIndex for ScriptedIndex {
    fn scan(&self, path: &Path, mime_type: &str, completion: Completion<Option<MediaHandle>>) {
        let call_number = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(ScanCall {
                path: path.to_path_buf(),
                mime_type: mime_type.to_string(),
                size_at_scan: fs::metadata(path).ok().map(|m| m.len()),
            });
            calls.len()
        };
        let behaviour = self
            .behaviours
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ScanBehaviour::Index);

        match behaviour {
            ScanBehaviour::Index => {
                completion.complete(Some(MediaHandle(format!(
                    "content://media/external/video/media/{call_number}"
                ))));
            }
            ScanBehaviour::Reject => {
                completion.complete(None);
            }
            ScanBehaviour::Drop => drop(completion),
        }
    }
}

/// Gatekeeper with a canned answer; `None` drops the completion unanswered.
pub struct FixedGatekeeper {
    status: Option<AuthorizationStatus>,
    requests: AtomicUsize,
}

impl FixedGatekeeper {
    pub fn granting() -> Self {
        Self::answering(Some(AuthorizationStatus::Granted))
    }

    pub fn denying() -> Self {
        Self::answering(Some(AuthorizationStatus::Denied))
    }

    pub fn silent() -> Self {
        Self::answering(None)
    }

    fn answering(status: Option<AuthorizationStatus>) -> Self {
        Self {
            status,
            requests: AtomicUsize::new(0),
        }
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl AuthorizationGatekeeper for FixedGatekeeper {
    fn request_authorization(&self, completion: Completion<AuthorizationStatus>) {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.status {
            // Answer from another thread, like a permission dialog would
            std::thread::spawn(move || {
                completion.complete(status);
            });
        }
    }
}
