use serde::{Deserialize, Serialize};

use crate::error::FsErrorKind;

/// SFTP v3 status codes (`SSH_FX_*`).
///
/// The session only ever emits the first five; the rest belong to the
/// transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u32)]
pub enum StatusCode {
    /// `SSH_FX_OK`
    Ok = 0,
    /// `SSH_FX_EOF`
    Eof = 1,
    /// `SSH_FX_NO_SUCH_FILE`
    NoSuchFile = 2,
    /// `SSH_FX_PERMISSION_DENIED`
    PermissionDenied = 3,
    /// `SSH_FX_FAILURE`
    Failure = 4,
    /// `SSH_FX_BAD_MESSAGE`
    BadMessage = 5,
    /// `SSH_FX_NO_CONNECTION`
    NoConnection = 6,
    /// `SSH_FX_CONNECTION_LOST`
    ConnectionLost = 7,
    /// `SSH_FX_OP_UNSUPPORTED`
    OpUnsupported = 8,
}

impl StatusCode {
    /// Convert from the wire value.
    #[must_use]
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Ok),
            1 => Some(Self::Eof),
            2 => Some(Self::NoSuchFile),
            3 => Some(Self::PermissionDenied),
            4 => Some(Self::Failure),
            5 => Some(Self::BadMessage),
            6 => Some(Self::NoConnection),
            7 => Some(Self::ConnectionLost),
            8 => Some(Self::OpUnsupported),
            _ => None,
        }
    }

    /// Wire value.
    #[must_use]
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Default human-readable message sent alongside the code.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Ok => "Success",
            Self::Eof => "End of file",
            Self::NoSuchFile => "No such file or directory",
            Self::PermissionDenied => "Permission denied",
            Self::Failure => "Failure",
            Self::BadMessage => "Bad message",
            Self::NoConnection => "No connection",
            Self::ConnectionLost => "Connection lost",
            Self::OpUnsupported => "Operation not supported",
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message(), self.as_u32())
    }
}

impl From<FsErrorKind> for StatusCode {
    fn from(kind: FsErrorKind) -> Self {
        translate(kind)
    }
}

/// Map a native failure onto the status vocabulary.
#[must_use]
pub fn translate(kind: FsErrorKind) -> StatusCode {
    match kind {
        FsErrorKind::NotFound | FsErrorKind::NotADirectory | FsErrorKind::DirectoryNotEmpty => {
            StatusCode::NoSuchFile
        },
        FsErrorKind::PermissionDenied | FsErrorKind::AlreadyExists | FsErrorKind::IsADirectory => {
            StatusCode::PermissionDenied
        },
        FsErrorKind::Other => StatusCode::Failure,
    }
}
