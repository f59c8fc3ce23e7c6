use std::collections::HashMap;
use std::path::PathBuf;

use crate::fs::FsMetadata;
use crate::protocol::{Handle, OpenFlags};

/// State behind one open handle.
#[derive(Debug)]
pub struct OpenHandle<T> {
    /// Absolute, root-confined path the handle was opened on.
    pub path: PathBuf,
    /// Flags the client opened with.
    pub flags: OpenFlags,
    /// Metadata captured at open time; bounds reads.
    pub snapshot: FsMetadata,
    /// Bytes handed out by READ so far. `snapshot.size - cursor` bounds the
    /// next chunk.
    pub cursor: u64,
    /// Directory handles only: the listing has already been sent.
    pub listing_consumed: bool,
    /// Open descriptor.
    pub file: T,
}

impl<T> OpenHandle<T> {
    /// Fresh state for a just-opened descriptor.
    pub fn new(path: PathBuf, flags: OpenFlags, snapshot: FsMetadata, file: T) -> Self {
        Self {
            path,
            flags,
            snapshot,
            cursor: 0,
            listing_consumed: false,
            file,
        }
    }

    /// True if the handle was opened on a directory.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.snapshot.is_dir
    }
}

/// Table of open handles owned by a single session.
#[derive(Debug)]
pub struct HandleRegistry<T> {
    open: HashMap<Handle, OpenHandle<T>>,
    capacity: usize,
}

impl<T> HandleRegistry<T> {
    /// Create a registry holding at most `capacity` handles.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            open: HashMap::new(),
            capacity,
        }
    }

    /// True if another handle can be registered.
    #[must_use]
    pub fn has_capacity(&self) -> bool {
        self.open.len() < self.capacity
    }

    /// Register state under a fresh handle.
    ///
    /// Hands the state back if the registry is full.
    pub fn insert(&mut self, state: OpenHandle<T>) -> Result<Handle, OpenHandle<T>> {
        if !self.has_capacity() {
            return Err(state);
        }
        let mut handle = Handle::new();
        while self.open.contains_key(&handle) {
            handle = Handle::new();
        }
        self.open.insert(handle.clone(), state);
        Ok(handle)
    }

    /// Look up an open handle.
    #[must_use]
    pub fn get(&self, handle: &Handle) -> Option<&OpenHandle<T>> {
        self.open.get(handle)
    }

    /// Look up an open handle for mutation.
    pub fn get_mut(&mut self, handle: &Handle) -> Option<&mut OpenHandle<T>> {
        self.open.get_mut(handle)
    }

    /// Unregister a handle, returning its state.
    pub fn remove(&mut self, handle: &Handle) -> Option<OpenHandle<T>> {
        self.open.remove(handle)
    }

    /// Number of open handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.open.len()
    }

    /// True if nothing is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    /// Unregister every handle, yielding their states.
    pub fn drain(&mut self) -> impl Iterator<Item = (Handle, OpenHandle<T>)> + '_ {
        self.open.drain()
    }
}
