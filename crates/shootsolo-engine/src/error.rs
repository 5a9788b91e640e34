use std::fmt;

/// Error codes reported to the UI layer.
///
/// These strings are part of the channel contract and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Storage statistics could not be read
    Unavailable,
    /// A required argument was missing or empty
    InvalidArgument,
    /// The source recording does not exist
    FileNotFound,
    /// The media library refused access
    PermissionDenied,
    /// Copy or registration failed for every destination
    Failed,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Unavailable => "UNAVAILABLE",
            ErrorCode::InvalidArgument => "INVALID_ARGUMENT",
            ErrorCode::FileNotFound => "FILE_NOT_FOUND",
            ErrorCode::PermissionDenied => "PERMISSION_DENIED",
            ErrorCode::Failed => "FAILED",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
