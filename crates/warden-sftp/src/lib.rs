//! Warden SFTP filesystem adapter.
//!
//! Serves the filesystem half of an SFTP session: every client path is
//! lexically confined to a configured root, open files and directories are
//! tracked behind opaque handles, and each request is answered with exactly
//! one reply. Wire encoding and transport belong to the caller, which plugs
//! in through [`ReplySink`].

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

/// Attribute records and `ls -l` style longnames.
pub mod attrs;
/// Filesystem and session error types.
pub mod error;
/// The filesystem capability the session is written against.
pub mod fs;
/// Host-backed filesystem implementation.
pub mod host;
/// Owner and group name lookup.
pub mod identity;
/// Path confinement.
pub mod path;
/// Protocol value types shared by requests and replies.
pub mod protocol;
/// Open handle table.
pub mod registry;
/// Replies and the sink they are emitted through.
pub mod reply;
/// Decoded client requests.
pub mod request;
/// Per-session request dispatch.
pub mod session;
/// SFTP status codes and error translation.
pub mod status;

pub use error::{FsError, FsErrorKind, FsResult, SessionError, SessionResult};
pub use fs::{Filesystem, FsMetadata};
pub use host::HostFs;
pub use identity::{IdentityLookup, NumericIdentity, SystemIdentity};
pub use path::{normalize_virtual, resolve_path};
pub use protocol::{FileAttributes, Handle, NameEntry, OpenFlags, OpenIntent};
pub use reply::{Reply, ReplySink};
pub use request::Request;
pub use session::{Session, SessionOptions};
pub use status::{StatusCode, translate};
