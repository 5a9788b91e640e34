use shootsolo_config::CollisionPolicy;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Short copy to {path}: wrote {written} of {expected} bytes")]
    ShortCopy {
        path: PathBuf,
        written: u64,
        expected: u64,
    },
    #[error("Failed writing {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Source has no file name: {0}")]
    NoFileName(PathBuf),
}

impl IoError {
    /// Whether the failed operation may have left a partial file behind
    pub fn left_partial_file(&self) -> bool {
        matches!(self, IoError::Write { .. } | IoError::ShortCopy { .. })
    }
}

/// Create a directory and its parents, treating an existing directory as success
pub fn ensure_dir(dir: &Path) -> Result<(), IoError> {
    fs::create_dir_all(dir).map_err(IoError::Io)
}

/// Work out where `source` lands inside `folder`.
///
/// The name is always the source's base name; with [`CollisionPolicy::Version`]
/// an existing file is left alone and ` (n)` is inserted before the extension.
pub fn destination_for(
    folder: &Path,
    source: &Path,
    policy: CollisionPolicy,
) -> Result<PathBuf, IoError> {
    let file_name = source
        .file_name()
        .ok_or_else(|| IoError::NoFileName(source.to_path_buf()))?;
    let destination = folder.join(file_name);

    if policy == CollisionPolicy::Overwrite || !destination.exists() {
        return Ok(destination);
    }

    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().into_owned());

    let mut n = 1u32;
    loop {
        let candidate_name = match &extension {
            Some(ext) => format!("{stem} ({n}).{ext}"),
            None => format!("{stem} ({n})"),
        };
        let candidate = folder.join(candidate_name);
        if !candidate.exists() {
            return Ok(candidate);
        }
        n += 1;
    }
}

/// Copy every byte of `source` into `destination`, truncating any existing file.
///
/// Returns the number of bytes written. A copy that ends early is an error.
pub fn copy_file(source: &Path, destination: &Path) -> Result<u64, IoError> {
    let expected = fs::metadata(source)?.len();

    let mut input = File::open(source)?;
    let mut output = File::create(destination)?;
    let written = std::io::copy(&mut input, &mut output)
        .and_then(|n| output.sync_all().map(|()| n))
        .map_err(|source| IoError::Write {
            path: destination.to_path_buf(),
            source,
        })?;

    if written != expected {
        return Err(IoError::ShortCopy {
            path: destination.to_path_buf(),
            written,
            expected,
        });
    }
    Ok(written)
}

/// Whether anything, even a dangling symlink, sits at `path`
pub fn exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Replace an existing `destination` with a copy of `source`.
///
/// The bytes go to a hidden sibling first and are renamed over the old file
/// only once complete, so a failed copy leaves `destination` as it was.
pub fn replace_file(source: &Path, destination: &Path) -> Result<u64, IoError> {
    let file_name = destination
        .file_name()
        .ok_or_else(|| IoError::NoFileName(destination.to_path_buf()))?;
    let staging =
        destination.with_file_name(format!(".{}.partial", file_name.to_string_lossy()));

    let result = copy_file(source, &staging).and_then(|written| {
        fs::rename(&staging, destination)?;
        Ok(written)
    });
    if result.is_err()
        && let Err(e) = remove_file(&staging)
    {
        log::warn!("Could not remove {}: {e}", staging.display());
    }
    result
}

/// Whether both paths name the same existing file
pub fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Remove a file, treating "already gone" as success
pub fn remove_file(path: &Path) -> Result<(), IoError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(IoError::Io(e)),
    }
}
