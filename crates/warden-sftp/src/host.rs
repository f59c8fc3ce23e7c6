use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::os::fd::IntoRawFd;
use std::os::unix::fs::{FileExt, MetadataExt};
use std::path::Path;

use crate::error::{FsError, FsResult};
use crate::fs::{Filesystem, FsMetadata};
use crate::protocol::{OpenFlags, OpenIntent};

/// An implementation of [`Filesystem`] backed by the physical host filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostFs;

impl HostFs {
    /// Create a new host filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl From<fs::Metadata> for FsMetadata {
    fn from(meta: fs::Metadata) -> Self {
        Self {
            is_dir: meta.is_dir(),
            mode: meta.mode(),
            uid: meta.uid(),
            gid: meta.gid(),
            nlink: meta.nlink(),
            size: meta.size(),
            atime: meta.atime(),
            mtime: meta.mtime(),
        }
    }
}

impl Filesystem for HostFs {
    type File = File;

    fn stat(&self, path: &Path) -> FsResult<FsMetadata> {
        Ok(fs::metadata(path)?.into())
    }

    fn lstat(&self, path: &Path) -> FsResult<FsMetadata> {
        Ok(fs::symlink_metadata(path)?.into())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn open(&self, path: &Path, intent: OpenIntent, flags: OpenFlags) -> FsResult<File> {
        let mut options = OpenOptions::new();
        match intent {
            OpenIntent::Read => {
                options.read(true).write(flags.contains(OpenFlags::WRITE));
            },
            OpenIntent::Write => {
                options.write(true);
                if flags.contains(OpenFlags::EXCL) {
                    options.create_new(true);
                } else {
                    options.create(true);
                }
                if flags.contains(OpenFlags::APPEND) {
                    options.append(true);
                } else {
                    options.truncate(true);
                }
            },
        }
        Ok(options.open(path)?)
    }

    fn read_at(&self, file: &File, buf: &mut [u8], offset: u64) -> FsResult<usize> {
        Ok(file.read_at(buf, offset)?)
    }

    fn write_at(&self, file: &File, data: &[u8], offset: u64) -> FsResult<()> {
        Ok(file.write_all_at(data, offset)?)
    }

    fn close(&self, file: File) -> FsResult<()> {
        // Dropping a File swallows close(2) errors; close explicitly to report them.
        nix::unistd::close(file.into_raw_fd())
            .map_err(|errno| FsError::from(std::io::Error::from(errno)))
    }

    fn read_dir(&self, path: &Path) -> FsResult<Vec<OsString>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(path)? {
            names.push(entry?.file_name());
        }
        Ok(names)
    }

    fn unlink(&self, path: &Path) -> FsResult<()> {
        Ok(fs::remove_file(path)?)
    }

    fn rmdir(&self, path: &Path) -> FsResult<()> {
        Ok(fs::remove_dir(path)?)
    }

    fn mkdir(&self, path: &Path) -> FsResult<()> {
        Ok(fs::create_dir(path)?)
    }

    fn rename(&self, from: &Path, to: &Path) -> FsResult<()> {
        Ok(fs::rename(from, to)?)
    }
}
