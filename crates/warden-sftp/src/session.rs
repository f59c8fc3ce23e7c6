//! Per-session request dispatch.
//!
//! A [`Session`] owns the confinement root and the handle registry of one
//! SFTP session. Requests are handled strictly one at a time through
//! `&mut self`; every request yields exactly one [`Reply`].

use std::fmt::Display;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::attrs::{file_attributes, format_entry};
use crate::error::{FsError, SessionError, SessionResult};
use crate::fs::Filesystem;
use crate::identity::IdentityLookup;
use crate::path::{confine, normalize, normalize_virtual, resolve_path};
use crate::protocol::{FileAttributes, Handle, NameEntry, OpenFlags, OpenIntent};
use crate::registry::{HandleRegistry, OpenHandle};
use crate::reply::{Reply, ReplySink};
use crate::request::Request;
use crate::status::{StatusCode, translate};

/// Default cap on open handles per session.
pub const DEFAULT_MAX_OPEN_HANDLES: usize = 64;

/// Default cap on bytes returned by one READ.
pub const DEFAULT_MAX_READ_LEN: u32 = 262_144;

/// Per-session limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Maximum number of simultaneously open handles.
    pub max_open_handles: usize,
    /// Maximum number of bytes returned by one READ.
    pub max_read_len: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            max_open_handles: DEFAULT_MAX_OPEN_HANDLES,
            max_read_len: DEFAULT_MAX_READ_LEN,
        }
    }
}

/// One SFTP session confined to a root directory.
pub struct Session<F: Filesystem, I: IdentityLookup> {
    root: PathBuf,
    fs: F,
    identity: I,
    registry: HandleRegistry<F::File>,
    options: SessionOptions,
}

impl<F: Filesystem, I: IdentityLookup> Session<F, I> {
    /// Open a session confined to `root`.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if `root` is relative or is not an existing
    /// directory.
    pub fn new(
        root: impl Into<PathBuf>,
        fs: F,
        identity: I,
        options: SessionOptions,
    ) -> SessionResult<Self> {
        let root = root.into();
        if !root.is_absolute() {
            return Err(SessionError::RelativeRoot(root));
        }
        let root = normalize(&root);
        match fs.stat(&root) {
            Ok(meta) if meta.is_dir => {},
            Ok(_) => return Err(SessionError::RootNotDirectory(root)),
            Err(source) => return Err(SessionError::RootUnreadable { path: root, source }),
        }

        info!(root = %root.display(), "SFTP session opened");
        Ok(Self {
            root,
            fs,
            identity,
            registry: HandleRegistry::new(options.max_open_handles),
            options,
        })
    }

    /// The confinement root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of currently open handles.
    #[must_use]
    pub fn open_handles(&self) -> usize {
        self.registry.len()
    }

    /// Confine a client path to the session root.
    #[must_use]
    pub fn resolve(&self, requested: &str) -> PathBuf {
        resolve_path(&self.root, requested)
    }

    /// Handle `request` and emit its reply through `sink`.
    pub fn dispatch<S: ReplySink + ?Sized>(&mut self, id: u32, request: Request, sink: &mut S) {
        debug!(id, op = request.op(), "dispatching request");
        let reply = self.handle(request);
        reply.emit(id, sink);
    }

    /// Handle `request`, returning its reply.
    pub fn handle(&mut self, request: Request) -> Reply {
        match request {
            Request::RealPath { path } => self.realpath(&path),
            Request::OpenDir { path } => self.opendir(&path),
            Request::Open { path, flags, .. } => self.open(&path, flags),
            Request::ReadDir { handle } => self.readdir(&handle),
            Request::Write {
                handle,
                offset,
                data,
            } => self.write(&handle, offset, &data),
            Request::Close { handle } => self.close(&handle),
            Request::Read {
                handle,
                offset,
                len,
            } => self.read(&handle, offset, len),
            Request::Remove { path } => self.remove(&path),
            Request::RmDir { path } => self.rmdir(&path),
            Request::MkDir { path, attrs } => self.mkdir(&path, &attrs),
            Request::Rename { from, to } => self.rename(&from, &to),
            Request::Stat { path } => self.stat(&path),
            Request::LStat { path } => self.lstat(&path),
            Request::FStat { handle } => self.fstat(&handle),
        }
    }

    /// REALPATH: lexical normalization against the virtual root `/`. The
    /// entry carries the filename only.
    #[must_use]
    pub fn realpath(&self, path: &str) -> Reply {
        Reply::Name(vec![NameEntry::bare(normalize_virtual(path))])
    }

    /// OPENDIR: open `path` for listing if it is a directory.
    pub fn opendir(&mut self, path: &str) -> Reply {
        let target = self.resolve(path);
        match self.fs.stat(&target) {
            Ok(meta) if meta.is_dir => self.open_resolved(target, OpenFlags(OpenFlags::READ)),
            Ok(_) => {
                debug!(path = %target.display(), "opendir on a non-directory");
                Reply::Status(StatusCode::Failure)
            },
            Err(e) => failure("opendir", target.display(), &e),
        }
    }

    /// OPEN: open `path` and register a handle for it.
    pub fn open(&mut self, path: &str, flags: OpenFlags) -> Reply {
        let target = self.resolve(path);
        self.open_resolved(target, flags)
    }

    fn open_resolved(&mut self, target: PathBuf, flags: OpenFlags) -> Reply {
        let intent = flags.intent();
        if intent == OpenIntent::Read && !self.fs.exists(&target) {
            debug!(path = %target.display(), "open for read on a missing path");
            return Reply::Status(StatusCode::NoSuchFile);
        }
        if !self.registry.has_capacity() {
            warn!(
                path = %target.display(),
                limit = self.options.max_open_handles,
                "open handle limit reached"
            );
            return Reply::Status(StatusCode::Failure);
        }

        let file = match self.fs.open(&target, intent, flags) {
            Ok(file) => file,
            Err(e) => return failure("open", target.display(), &e),
        };
        let snapshot = match self.fs.stat(&target) {
            Ok(meta) => meta,
            Err(e) => {
                self.release(file, &target);
                return failure("open", target.display(), &e);
            },
        };

        match self
            .registry
            .insert(OpenHandle::new(target, flags, snapshot, file))
        {
            Ok(handle) => {
                debug!(%handle, "handle opened");
                Reply::Handle(handle)
            },
            Err(state) => {
                self.release(state.file, &state.path);
                Reply::Status(StatusCode::Failure)
            },
        }
    }

    /// READDIR: the full listing on the first call, EOF afterwards.
    pub fn readdir(&mut self, handle: &Handle) -> Reply {
        let Some(entry) = self.registry.get_mut(handle) else {
            return unknown_handle("readdir", handle);
        };
        if entry.listing_consumed {
            return Reply::Status(StatusCode::Eof);
        }

        let mut names = match self.fs.read_dir(&entry.path) {
            Ok(names) => names,
            Err(e) => return failure("readdir", entry.path.display(), &e),
        };
        names.push(".".into());
        names.push("..".into());

        let listing = names
            .iter()
            .map(|name| {
                // Stat through the raw name; only the reported filename is lossy.
                // ".." of the root must not report the real parent.
                let confined = confine(&self.root, &entry.path.join(name));
                format_entry(&self.fs, &self.identity, &name.to_string_lossy(), &confined)
            })
            .collect();

        entry.listing_consumed = true;
        Reply::Name(listing)
    }

    /// WRITE: positioned write through an open handle.
    pub fn write(&mut self, handle: &Handle, offset: u64, data: &[u8]) -> Reply {
        let Some(entry) = self.registry.get(handle) else {
            return unknown_handle("write", handle);
        };
        match self.fs.write_at(&entry.file, data, offset) {
            Ok(()) => Reply::Status(StatusCode::Ok),
            Err(e) => failure("write", entry.path.display(), &e),
        }
    }

    /// CLOSE: release the handle. It is unregistered even if the close
    /// primitive reports an error.
    pub fn close(&mut self, handle: &Handle) -> Reply {
        let Some(entry) = self.registry.remove(handle) else {
            return unknown_handle("close", handle);
        };
        match self.fs.close(entry.file) {
            Ok(()) => {
                debug!(%handle, "handle closed");
                Reply::Status(StatusCode::Ok)
            },
            Err(e) => failure("close", entry.path.display(), &e),
        }
    }

    /// READ: up to `len` bytes at `offset`.
    ///
    /// The size seen at open is a byte budget for the handle: each chunk is
    /// bounded by what remains of it after earlier reads, whatever offsets
    /// they used. An exhausted budget reads as EOF.
    pub fn read(&mut self, handle: &Handle, offset: u64, len: u32) -> Reply {
        let Some(entry) = self.registry.get_mut(handle) else {
            return unknown_handle("read", handle);
        };
        if offset >= entry.snapshot.size {
            return Reply::Status(StatusCode::Eof);
        }

        let remaining = entry.snapshot.size.saturating_sub(entry.cursor);
        let wanted = len.min(self.options.max_read_len);
        let chunk = u32::try_from(remaining).map_or(wanted, |r| r.min(wanted));
        if chunk == 0 {
            return Reply::Status(StatusCode::Eof);
        }
        let mut buf = vec![0u8; chunk as usize];
        let read = match self.fs.read_at(&entry.file, &mut buf, offset) {
            Ok(read) => read,
            Err(e) => return failure("read", entry.path.display(), &e),
        };
        if read == 0 {
            // The file shrank since it was opened.
            return Reply::Status(StatusCode::Eof);
        }

        buf.truncate(read);
        entry.cursor = entry.cursor.saturating_add(read as u64);
        Reply::Data(buf)
    }

    /// REMOVE: unlink a file.
    pub fn remove(&mut self, path: &str) -> Reply {
        let target = self.resolve(path);
        status_of("remove", &target, self.fs.unlink(&target))
    }

    /// RMDIR: remove an empty directory.
    pub fn rmdir(&mut self, path: &str) -> Reply {
        let target = self.resolve(path);
        status_of("rmdir", &target, self.fs.rmdir(&target))
    }

    /// MKDIR: create a directory. `attrs` is accepted but not applied.
    pub fn mkdir(&mut self, path: &str, _attrs: &FileAttributes) -> Reply {
        let target = self.resolve(path);
        status_of("mkdir", &target, self.fs.mkdir(&target))
    }

    /// RENAME: both paths are confined independently.
    pub fn rename(&mut self, from: &str, to: &str) -> Reply {
        let source = self.resolve(from);
        let dest = self.resolve(to);
        match self.fs.rename(&source, &dest) {
            Ok(()) => Reply::Status(StatusCode::Ok),
            Err(e) => failure(
                "rename",
                format_args!("{} -> {}", source.display(), dest.display()),
                &e,
            ),
        }
    }

    /// STAT: attributes, following symlinks.
    #[must_use]
    pub fn stat(&self, path: &str) -> Reply {
        let target = self.resolve(path);
        match self.fs.stat(&target) {
            Ok(meta) => Reply::Attrs(file_attributes(&meta)),
            Err(e) => failure("stat", target.display(), &e),
        }
    }

    /// LSTAT: attributes of the entry itself, not a symlink's target.
    #[must_use]
    pub fn lstat(&self, path: &str) -> Reply {
        let target = self.resolve(path);
        match self.fs.lstat(&target) {
            Ok(meta) => Reply::Attrs(file_attributes(&meta)),
            Err(e) => failure("lstat", target.display(), &e),
        }
    }

    /// FSTAT: fresh attributes of the path behind an open handle.
    #[must_use]
    pub fn fstat(&self, handle: &Handle) -> Reply {
        let Some(entry) = self.registry.get(handle) else {
            return unknown_handle("fstat", handle);
        };
        match self.fs.stat(&entry.path) {
            Ok(meta) => Reply::Attrs(file_attributes(&meta)),
            Err(e) => failure("fstat", entry.path.display(), &e),
        }
    }

    fn release(&self, file: F::File, path: &Path) {
        if let Err(e) = self.fs.close(file) {
            warn!(path = %path.display(), error = %e, "failed to release descriptor");
        }
    }
}

impl<F: Filesystem, I: IdentityLookup> Drop for Session<F, I> {
    fn drop(&mut self) {
        let open: Vec<_> = self.registry.drain().collect();
        if !open.is_empty() {
            debug!(count = open.len(), "closing handles left open at session end");
        }
        for (_, entry) in open {
            self.release(entry.file, &entry.path);
        }
    }
}

impl<F, I> std::fmt::Debug for Session<F, I>
where
    F: Filesystem,
    I: IdentityLookup,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("root", &self.root)
            .field("open_handles", &self.registry.len())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn status_of(op: &'static str, target: &Path, result: Result<(), FsError>) -> Reply {
    match result {
        Ok(()) => Reply::Status(StatusCode::Ok),
        Err(e) => failure(op, target.display(), &e),
    }
}

fn failure(op: &'static str, target: impl Display, err: &FsError) -> Reply {
    let code = translate(err.kind);
    if code == StatusCode::Failure {
        warn!(op, target = %target, error = %err, "filesystem operation failed");
    } else {
        debug!(op, target = %target, error = %err, status = %code, "filesystem operation refused");
    }
    Reply::Status(code)
}

fn unknown_handle(op: &'static str, handle: &Handle) -> Reply {
    debug!(op, %handle, "unknown handle");
    Reply::Status(StatusCode::NoSuchFile)
}
