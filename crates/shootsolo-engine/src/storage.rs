//! Free-space reporting for the volume holding the app's private data.

use crate::error::ErrorCode;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One filesystem-statistics reading.
///
/// Both fields come from the same query so they always describe the same
/// moment; never assemble one from two separate calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsStats {
    pub available_blocks: u64,
    pub block_size: u64,
}

impl FsStats {
    pub fn available_bytes(&self) -> Option<u64> {
        self.available_blocks.checked_mul(self.block_size)
    }
}

/// Source of filesystem statistics for a path
pub trait FsStatsProvider: Send + Sync {
    fn stats(&self, path: &Path) -> io::Result<FsStats>;
}

/// `statvfs(3)` backed provider. Available on every Unix, Android and iOS included.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatvfsProvider;

#[cfg(unix)]
impl FsStatsProvider for StatvfsProvider {
    fn stats(&self, path: &Path) -> io::Result<FsStats> {
        let stat = nix::sys::statvfs::statvfs(path).map_err(io::Error::from)?;
        // f_bavail is counted in f_frsize units
        Ok(FsStats {
            available_blocks: stat.blocks_available() as u64,
            block_size: stat.fragment_size() as u64,
        })
    }
}

#[cfg(not(unix))]
impl FsStatsProvider for StatvfsProvider {
    fn stats(&self, _path: &Path) -> io::Result<FsStats> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "filesystem statistics are not available on this platform",
        ))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Could not get available storage for {path}: {source}")]
    Unavailable { path: PathBuf, source: io::Error },
    #[error("Available storage for {path} does not fit in 64 bits")]
    Overflow { path: PathBuf },
}

impl StorageError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::Unavailable
    }
}

/// Reports free bytes on the filesystem containing `data_dir`.
#[derive(Clone)]
pub struct StorageInfoService {
    provider: Arc<dyn FsStatsProvider>,
    data_dir: PathBuf,
}

impl StorageInfoService {
    pub fn new(provider: Arc<dyn FsStatsProvider>, data_dir: PathBuf) -> Self {
        Self { provider, data_dir }
    }

    /// Service backed by the real filesystem
    pub fn for_data_dir(data_dir: PathBuf) -> Self {
        Self::new(Arc::new(StatvfsProvider), data_dir)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Free bytes available to the app. The query runs on the blocking pool.
    pub async fn available_bytes(&self) -> Result<u64, StorageError> {
        let provider = Arc::clone(&self.provider);
        let path = self.data_dir.clone();

        let stats = tokio::task::spawn_blocking(move || provider.stats(&path))
            .await
            .map_err(|e| StorageError::Unavailable {
                path: self.data_dir.clone(),
                source: io::Error::other(e),
            })?
            .map_err(|source| {
                log::error!(
                    "Filesystem statistics query failed for {}: {source}",
                    self.data_dir.display()
                );
                StorageError::Unavailable {
                    path: self.data_dir.clone(),
                    source,
                }
            })?;

        let bytes = stats.available_bytes().ok_or_else(|| StorageError::Overflow {
            path: self.data_dir.clone(),
        })?;
        log::debug!("{} bytes available under {}", bytes, self.data_dir.display());
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::create_test_dir;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    struct FixedStats(io::Result<FsStats>);

    impl FsStatsProvider for FixedStats {
        fn stats(&self, _path: &Path) -> io::Result<FsStats> {
            match &self.0 {
                Ok(stats) => Ok(*stats),
                Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
            }
        }
    }

    /// Records which paths were queried
    #[derive(Default)]
    struct RecordingStats {
        queried: Mutex<Vec<PathBuf>>,
    }

    impl FsStatsProvider for RecordingStats {
        fn stats(&self, path: &Path) -> io::Result<FsStats> {
            self.queried.lock().unwrap().push(path.to_path_buf());
            Ok(FsStats {
                available_blocks: 10,
                block_size: 4096,
            })
        }
    }

    #[tokio::test]
    async fn test_available_bytes_is_blocks_times_block_size() {
        let service = StorageInfoService::new(
            Arc::new(FixedStats(Ok(FsStats {
                available_blocks: 1_000,
                block_size: 4_096,
            }))),
            PathBuf::from("/data/user/0/com.example.videorecord"),
        );

        assert_eq!(service.available_bytes().await.unwrap(), 4_096_000);
    }

    #[tokio::test]
    async fn test_queries_the_configured_data_dir() {
        let provider = Arc::new(RecordingStats::default());
        let service = StorageInfoService::new(provider.clone(), PathBuf::from("/private/data"));

        service.available_bytes().await.unwrap();

        assert_eq!(
            *provider.queried.lock().unwrap(),
            vec![PathBuf::from("/private/data")]
        );
    }

    #[tokio::test]
    async fn test_query_error_is_unavailable_not_zero() {
        let service = StorageInfoService::new(
            Arc::new(FixedStats(Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "statvfs refused",
            )))),
            PathBuf::from("/data"),
        );

        let err = service.available_bytes().await.unwrap_err();

        assert!(matches!(err, StorageError::Unavailable { .. }));
        assert_eq!(err.code(), ErrorCode::Unavailable);
    }

    #[tokio::test]
    async fn test_overflow_is_unavailable() {
        let service = StorageInfoService::new(
            Arc::new(FixedStats(Ok(FsStats {
                available_blocks: u64::MAX,
                block_size: 2,
            }))),
            PathBuf::from("/data"),
        );

        let err = service.available_bytes().await.unwrap_err();

        assert!(matches!(err, StorageError::Overflow { .. }));
        assert_eq!(err.code(), ErrorCode::Unavailable);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_real_filesystem_reports_a_count() {
        let dir = create_test_dir();
        let service = StorageInfoService::for_data_dir(dir.path().to_path_buf());

        assert!(service.available_bytes().await.is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_data_dir_is_unavailable() {
        let dir = create_test_dir();
        let service = StorageInfoService::for_data_dir(dir.path().join("does-not-exist"));

        let err = service.available_bytes().await.unwrap_err();

        assert!(matches!(err, StorageError::Unavailable { .. }));
    }
}
