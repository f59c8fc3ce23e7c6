//! Protocol-level value types shared by requests and replies.

use serde::{Deserialize, Serialize};

/// `SSH_FXF_*` open flags, combinable as a bitset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpenFlags(pub u32);

impl OpenFlags {
    /// `SSH_FXF_READ`
    pub const READ: u32 = 0x0000_0001;
    /// `SSH_FXF_WRITE`
    pub const WRITE: u32 = 0x0000_0002;
    /// `SSH_FXF_APPEND`
    pub const APPEND: u32 = 0x0000_0004;
    /// `SSH_FXF_CREAT`
    pub const CREAT: u32 = 0x0000_0008;
    /// `SSH_FXF_TRUNC`
    pub const TRUNC: u32 = 0x0000_0010;
    /// `SSH_FXF_EXCL`
    pub const EXCL: u32 = 0x0000_0020;

    /// True if every bit of `flag` is set.
    #[must_use]
    pub fn contains(self, flag: u32) -> bool {
        self.0 & flag == flag
    }

    /// The access intent the session opens with.
    #[must_use]
    pub fn intent(self) -> OpenIntent {
        if self.contains(Self::READ) {
            OpenIntent::Read
        } else {
            OpenIntent::Write
        }
    }
}

impl From<u32> for OpenFlags {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

/// Read intent (READ bit present) or write intent (READ bit absent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpenIntent {
    /// Open an existing entry for reading.
    Read,
    /// Open for writing, creating the entry when it is absent.
    Write,
}

/// SFTP v3 file attributes.
///
/// Every field is optional on the wire; an absent field is not transmitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttributes {
    /// Size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Numeric owner id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<u32>,
    /// Numeric group id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gid: Option<u32>,
    /// Full `st_mode`, including the file type bits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<u32>,
    /// Access time, seconds since the UNIX epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atime: Option<u32>,
    /// Modification time, seconds since the UNIX epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtime: Option<u32>,
}

impl FileAttributes {
    /// Creates empty attributes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// One entry of a `SSH_FXP_NAME` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameEntry {
    /// Bare file name (or, for REALPATH, the normalized path).
    pub filename: String,
    /// `ls -l` style listing line; empty when not applicable.
    pub longname: String,
    /// Attributes, absent when the entry could not be stated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<FileAttributes>,
}

impl NameEntry {
    /// An entry carrying only a name.
    pub fn bare(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            longname: String::new(),
            attrs: None,
        }
    }
}

/// Opaque handle token handed to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(pub String);

#[allow(clippy::new_without_default)]
impl Handle {
    /// Draw a fresh random handle.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Token bytes as transmitted in `SSH_FXP_HANDLE`.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Handle {
    fn from(token: &str) -> Self {
        Self(token.to_owned())
    }
}
