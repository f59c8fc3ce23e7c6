use crate::protocol::{FileAttributes, Handle, NameEntry};
use crate::status::StatusCode;

/// The one reply a request produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `SSH_FXP_STATUS`
    Status(StatusCode),
    /// `SSH_FXP_HANDLE`
    Handle(Handle),
    /// `SSH_FXP_DATA`
    Data(Vec<u8>),
    /// `SSH_FXP_NAME`
    Name(Vec<NameEntry>),
    /// `SSH_FXP_ATTRS`
    Attrs(FileAttributes),
}

impl Reply {
    /// Hand the reply to `sink` under request `id`.
    pub fn emit<S: ReplySink + ?Sized>(&self, id: u32, sink: &mut S) {
        match self {
            Self::Status(code) => sink.status(id, *code),
            Self::Handle(handle) => sink.handle(id, handle),
            Self::Data(data) => sink.data(id, data),
            Self::Name(entries) => sink.name(id, entries),
            Self::Attrs(attrs) => sink.attrs(id, attrs),
        }
    }

    /// The status code, if this is a status reply.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status(code) => Some(*code),
            _ => None,
        }
    }
}

impl From<StatusCode> for Reply {
    fn from(code: StatusCode) -> Self {
        Self::Status(code)
    }
}

/// Encodes and sends replies on behalf of a session.
///
/// Implemented by the protocol layer; exactly one method is invoked per
/// request.
pub trait ReplySink {
    /// Send `SSH_FXP_STATUS`.
    fn status(&mut self, id: u32, code: StatusCode);

    /// Send `SSH_FXP_HANDLE`.
    fn handle(&mut self, id: u32, handle: &Handle);

    /// Send `SSH_FXP_DATA`.
    fn data(&mut self, id: u32, data: &[u8]);

    /// Send `SSH_FXP_NAME`.
    fn name(&mut self, id: u32, entries: &[NameEntry]);

    /// Send `SSH_FXP_ATTRS`.
    fn attrs(&mut self, id: u32, attrs: &FileAttributes);
}

/// Collects replies in order, keyed by request id.
impl ReplySink for Vec<(u32, Reply)> {
    fn status(&mut self, id: u32, code: StatusCode) {
        self.push((id, Reply::Status(code)));
    }

    fn handle(&mut self, id: u32, handle: &Handle) {
        self.push((id, Reply::Handle(handle.clone())));
    }

    fn data(&mut self, id: u32, data: &[u8]) {
        self.push((id, Reply::Data(data.to_vec())));
    }

    fn name(&mut self, id: u32, entries: &[NameEntry]) {
        self.push((id, Reply::Name(entries.to_vec())));
    }

    fn attrs(&mut self, id: u32, attrs: &FileAttributes) {
        self.push((id, Reply::Attrs(attrs.clone())));
    }
}
