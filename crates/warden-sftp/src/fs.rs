//! The filesystem primitives a session is built on.

use std::ffi::OsString;
use std::path::Path;

use crate::error::FsResult;
use crate::protocol::{OpenFlags, OpenIntent};

/// Metadata snapshot of one filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FsMetadata {
    /// True if the entry is a directory.
    pub is_dir: bool,
    /// Full `st_mode` (type and permission bits).
    pub mode: u32,
    /// Numeric owner id.
    pub uid: u32,
    /// Numeric group id.
    pub gid: u32,
    /// Hard-link count.
    pub nlink: u64,
    /// Size in bytes.
    pub size: u64,
    /// Access time in seconds since the UNIX epoch.
    pub atime: i64,
    /// Modification time in seconds since the UNIX epoch.
    pub mtime: i64,
}

/// Synchronous filesystem primitives.
///
/// Implementations report failures as [`FsError`](crate::FsError), whose
/// kind drives status translation. Each call is blocking; a session issues
/// them one at a time.
pub trait Filesystem {
    /// An open file or directory descriptor.
    type File;

    /// Stat, following symlinks.
    fn stat(&self, path: &Path) -> FsResult<FsMetadata>;

    /// Stat without following a final symlink.
    fn lstat(&self, path: &Path) -> FsResult<FsMetadata>;

    /// Whether `path` names an existing entry (following symlinks).
    fn exists(&self, path: &Path) -> bool;

    /// Open `path`. `intent` picks the access mode; finer-grained flag
    /// semantics are left to the implementation.
    fn open(&self, path: &Path, intent: OpenIntent, flags: OpenFlags) -> FsResult<Self::File>;

    /// Read into `buf` at `offset`, returning the number of bytes read.
    fn read_at(&self, file: &Self::File, buf: &mut [u8], offset: u64) -> FsResult<usize>;

    /// Write all of `data` at `offset`.
    fn write_at(&self, file: &Self::File, data: &[u8], offset: u64) -> FsResult<()>;

    /// Release a descriptor.
    fn close(&self, file: Self::File) -> FsResult<()>;

    /// Names of the entries of a directory, excluding `.` and `..`. Names
    /// are returned as the OS reports them, which need not be UTF-8.
    fn read_dir(&self, path: &Path) -> FsResult<Vec<OsString>>;

    /// Remove a file.
    fn unlink(&self, path: &Path) -> FsResult<()>;

    /// Remove an empty directory.
    fn rmdir(&self, path: &Path) -> FsResult<()>;

    /// Create a directory. The parent must exist.
    fn mkdir(&self, path: &Path) -> FsResult<()>;

    /// Rename `from` to `to`.
    fn rename(&self, from: &Path, to: &Path) -> FsResult<()>;
}
