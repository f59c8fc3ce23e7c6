use crate::protocol::{FileAttributes, Handle, OpenFlags};

/// A decoded client request, one variant per supported verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `SSH_FXP_REALPATH`
    RealPath {
        /// Path to normalize.
        path: String,
    },
    /// `SSH_FXP_OPENDIR`
    OpenDir {
        /// Directory to open.
        path: String,
    },
    /// `SSH_FXP_OPEN`
    Open {
        /// File to open.
        path: String,
        /// `SSH_FXF_*` bitset.
        flags: OpenFlags,
        /// Initial attributes; accepted but not applied.
        attrs: FileAttributes,
    },
    /// `SSH_FXP_READDIR`
    ReadDir {
        /// Directory handle.
        handle: Handle,
    },
    /// `SSH_FXP_WRITE`
    Write {
        /// File handle.
        handle: Handle,
        /// Absolute byte offset.
        offset: u64,
        /// Bytes to write.
        data: Vec<u8>,
    },
    /// `SSH_FXP_CLOSE`
    Close {
        /// Handle to release.
        handle: Handle,
    },
    /// `SSH_FXP_READ`
    Read {
        /// File handle.
        handle: Handle,
        /// Absolute byte offset.
        offset: u64,
        /// Maximum number of bytes wanted.
        len: u32,
    },
    /// `SSH_FXP_REMOVE`
    Remove {
        /// File to unlink.
        path: String,
    },
    /// `SSH_FXP_RMDIR`
    RmDir {
        /// Directory to remove.
        path: String,
    },
    /// `SSH_FXP_MKDIR`
    MkDir {
        /// Directory to create.
        path: String,
        /// Initial attributes; accepted but not applied.
        attrs: FileAttributes,
    },
    /// `SSH_FXP_RENAME`
    Rename {
        /// Existing path.
        from: String,
        /// New path.
        to: String,
    },
    /// `SSH_FXP_STAT`
    Stat {
        /// Path to stat, following symlinks.
        path: String,
    },
    /// `SSH_FXP_LSTAT`
    LStat {
        /// Path to stat, not following a final symlink.
        path: String,
    },
    /// `SSH_FXP_FSTAT`
    FStat {
        /// Open handle.
        handle: Handle,
    },
}

impl Request {
    /// Verb name, for logging.
    #[must_use]
    pub fn op(&self) -> &'static str {
        match self {
            Self::RealPath { .. } => "realpath",
            Self::OpenDir { .. } => "opendir",
            Self::Open { .. } => "open",
            Self::ReadDir { .. } => "readdir",
            Self::Write { .. } => "write",
            Self::Close { .. } => "close",
            Self::Read { .. } => "read",
            Self::Remove { .. } => "remove",
            Self::RmDir { .. } => "rmdir",
            Self::MkDir { .. } => "mkdir",
            Self::Rename { .. } => "rename",
            Self::Stat { .. } => "stat",
            Self::LStat { .. } => "lstat",
            Self::FStat { .. } => "fstat",
        }
    }
}
