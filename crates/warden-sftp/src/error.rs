use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Native filesystem failure, reduced to the kinds the status translator
/// distinguishes. Anything else lands in [`FsErrorKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FsErrorKind {
    /// `ENOENT`
    NotFound,
    /// `ENOTDIR`
    NotADirectory,
    /// `ENOTEMPTY`
    DirectoryNotEmpty,
    /// `EACCES` / `EPERM`
    PermissionDenied,
    /// `EEXIST`
    AlreadyExists,
    /// `EISDIR`
    IsADirectory,
    /// Any other failure.
    Other,
}

impl FsErrorKind {
    /// Classify a native I/O error.
    #[must_use]
    pub fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::NotADirectory => Self::NotADirectory,
            io::ErrorKind::DirectoryNotEmpty => Self::DirectoryNotEmpty,
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            io::ErrorKind::AlreadyExists => Self::AlreadyExists,
            io::ErrorKind::IsADirectory => Self::IsADirectory,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for FsErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::NotFound => "not found",
            Self::NotADirectory => "not a directory",
            Self::DirectoryNotEmpty => "directory not empty",
            Self::PermissionDenied => "permission denied",
            Self::AlreadyExists => "already exists",
            Self::IsADirectory => "is a directory",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// Error reported by a [`Filesystem`](crate::Filesystem) primitive.
#[derive(Debug, Error)]
#[error("{kind}: {source}")]
pub struct FsError {
    /// Classified kind, used for status translation.
    pub kind: FsErrorKind,
    /// Underlying OS error.
    #[source]
    pub source: io::Error,
}

impl FsError {
    /// Build an error of an explicit kind.
    pub fn new(kind: FsErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            source: io::Error::other(message.into()),
        }
    }
}

impl From<io::Error> for FsError {
    fn from(source: io::Error) -> Self {
        Self {
            kind: FsErrorKind::from_io(&source),
            source,
        }
    }
}

/// Convenience result type for filesystem primitives.
pub type FsResult<T> = Result<T, FsError>;

/// Errors raised while constructing a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The configured root is relative.
    #[error("session root must be an absolute path: {}", .0.display())]
    RelativeRoot(PathBuf),

    /// The configured root does not exist or is not a directory.
    #[error("session root is not a directory: {}", .0.display())]
    RootNotDirectory(PathBuf),

    /// The configured root could not be inspected.
    #[error("cannot inspect session root {}: {source}", path.display())]
    RootUnreadable {
        /// Root as configured.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: FsError,
    },
}

/// Convenience result type for session construction.
pub type SessionResult<T> = Result<T, SessionError>;
