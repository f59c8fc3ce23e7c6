//! JSON-lines request/reply mapping used by `warden serve`.
//!
//! One request object per input line, one reply object per output line.
//! Binary payloads travel as standard base64.

use std::io::{self, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use warden_sftp::{
    FileAttributes, Handle, NameEntry, OpenFlags, ReplySink, Request, StatusCode,
};

/// A request line: the id plus the verb-specific body.
#[derive(Debug, Deserialize)]
pub(crate) struct WireRequest {
    /// Request id echoed in the reply.
    pub(crate) id: u32,
    #[serde(flatten)]
    op: WireOp,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum WireOp {
    RealPath {
        path: String,
    },
    OpenDir {
        path: String,
    },
    Open {
        path: String,
        flags: u32,
        #[serde(default)]
        attrs: FileAttributes,
    },
    ReadDir {
        handle: Handle,
    },
    Write {
        handle: Handle,
        offset: u64,
        data: String,
    },
    Close {
        handle: Handle,
    },
    Read {
        handle: Handle,
        offset: u64,
        len: u32,
    },
    Remove {
        path: String,
    },
    RmDir {
        path: String,
    },
    MkDir {
        path: String,
        #[serde(default)]
        attrs: FileAttributes,
    },
    Rename {
        from: String,
        to: String,
    },
    Stat {
        path: String,
    },
    LStat {
        path: String,
    },
    FStat {
        handle: Handle,
    },
}

/// Why a line could not be turned into a [`Request`].
#[derive(Debug)]
pub(crate) struct Malformed {
    /// The id, if it could be recovered; replies use 0 otherwise.
    pub(crate) id: u32,
    /// Human-readable reason, for logging.
    pub(crate) reason: String,
}

/// Decode one input line.
pub(crate) fn decode_line(line: &str) -> Result<(u32, Request), Malformed> {
    let value: serde_json::Value = serde_json::from_str(line).map_err(|e| Malformed {
        id: 0,
        reason: e.to_string(),
    })?;
    let id = value
        .get("id")
        .and_then(serde_json::Value::as_u64)
        .and_then(|id| u32::try_from(id).ok())
        .unwrap_or(0);

    let wire: WireRequest = serde_json::from_value(value).map_err(|e| Malformed {
        id,
        reason: e.to_string(),
    })?;
    let request = wire.op.into_request().map_err(|reason| Malformed { id, reason })?;
    Ok((wire.id, request))
}

impl WireOp {
    fn into_request(self) -> Result<Request, String> {
        Ok(match self {
            Self::RealPath { path } => Request::RealPath { path },
            Self::OpenDir { path } => Request::OpenDir { path },
            Self::Open { path, flags, attrs } => Request::Open {
                path,
                flags: OpenFlags(flags),
                attrs,
            },
            Self::ReadDir { handle } => Request::ReadDir { handle },
            Self::Write {
                handle,
                offset,
                data,
            } => Request::Write {
                handle,
                offset,
                data: STANDARD
                    .decode(data)
                    .map_err(|e| format!("write.data is not base64: {e}"))?,
            },
            Self::Close { handle } => Request::Close { handle },
            Self::Read {
                handle,
                offset,
                len,
            } => Request::Read {
                handle,
                offset,
                len,
            },
            Self::Remove { path } => Request::Remove { path },
            Self::RmDir { path } => Request::RmDir { path },
            Self::MkDir { path, attrs } => Request::MkDir { path, attrs },
            Self::Rename { from, to } => Request::Rename { from, to },
            Self::Stat { path } => Request::Stat { path },
            Self::LStat { path } => Request::LStat { path },
            Self::FStat { handle } => Request::FStat { handle },
        })
    }
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum WireReply<'a> {
    Status {
        id: u32,
        code: u32,
        message: &'static str,
    },
    Handle {
        id: u32,
        handle: &'a Handle,
    },
    Data {
        id: u32,
        data: String,
    },
    Name {
        id: u32,
        entries: &'a [NameEntry],
    },
    Attrs {
        id: u32,
        attrs: &'a FileAttributes,
    },
}

/// Writes each reply as one JSON line.
///
/// [`ReplySink`] methods cannot fail, so the first write error is kept and
/// surfaced through [`JsonLineSink::take_error`].
pub(crate) struct JsonLineSink<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> JsonLineSink<W> {
    pub(crate) fn new(out: W) -> Self {
        Self { out, error: None }
    }

    /// The first write error since the last call, if any.
    pub(crate) fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }

    fn send(&mut self, reply: &WireReply<'_>) {
        if self.error.is_some() {
            return;
        }
        let result = serde_json::to_writer(&mut self.out, reply)
            .map_err(io::Error::from)
            .and_then(|()| self.out.write_all(b"\n"))
            .and_then(|()| self.out.flush());
        if let Err(e) = result {
            self.error = Some(e);
        }
    }
}

impl<W: Write> ReplySink for JsonLineSink<W> {
    fn status(&mut self, id: u32, code: StatusCode) {
        self.send(&WireReply::Status {
            id,
            code: code.as_u32(),
            message: code.message(),
        });
    }

    fn handle(&mut self, id: u32, handle: &Handle) {
        self.send(&WireReply::Handle { id, handle });
    }

    fn data(&mut self, id: u32, data: &[u8]) {
        self.send(&WireReply::Data {
            id,
            data: STANDARD.encode(data),
        });
    }

    fn name(&mut self, id: u32, entries: &[NameEntry]) {
        self.send(&WireReply::Name { id, entries });
    }

    fn attrs(&mut self, id: u32, attrs: &FileAttributes) {
        self.send(&WireReply::Attrs { id, attrs });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(sink: JsonLineSink<Vec<u8>>) -> Vec<serde_json::Value> {
        String::from_utf8(sink.into_inner())
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_decode_open() {
        let (id, request) =
            decode_line(r#"{"id":7,"op":"open","path":"a.txt","flags":26}"#).unwrap();
        assert_eq!(id, 7);
        assert_eq!(
            request,
            Request::Open {
                path: "a.txt".to_owned(),
                flags: OpenFlags(26),
                attrs: FileAttributes::new(),
            }
        );
    }

    #[test]
    fn test_decode_verb_names() {
        for (op, expected) in [
            ("realpath", "realpath"),
            ("opendir", "opendir"),
            ("rmdir", "rmdir"),
            ("lstat", "lstat"),
        ] {
            let line = format!(r#"{{"id":1,"op":"{op}","path":"x"}}"#);
            let (_, request) = decode_line(&line).unwrap();
            assert_eq!(request.op(), expected);
        }
    }

    #[test]
    fn test_decode_write_base64() {
        let (_, request) =
            decode_line(r#"{"id":2,"op":"write","handle":"h","offset":4,"data":"aGk="}"#)
                .unwrap();
        assert_eq!(
            request,
            Request::Write {
                handle: Handle::from("h"),
                offset: 4,
                data: b"hi".to_vec(),
            }
        );
    }

    #[test]
    fn test_malformed_keeps_id_when_possible() {
        let err = decode_line(r#"{"id":9,"op":"teleport"}"#).unwrap_err();
        assert_eq!(err.id, 9);

        let err = decode_line(r#"{"id":3,"op":"write","handle":"h","offset":0,"data":"!!"}"#)
            .unwrap_err();
        assert_eq!(err.id, 3);

        let err = decode_line("not json").unwrap_err();
        assert_eq!(err.id, 0);

        let err = decode_line(r#"{"id":-4,"op":"stat","path":"x"}"#).unwrap_err();
        assert_eq!(err.id, 0);
    }

    #[test]
    fn test_sink_writes_one_line_per_reply() {
        let mut sink = JsonLineSink::new(Vec::new());
        sink.status(1, StatusCode::NoSuchFile);
        sink.data(2, b"hi");
        sink.name(3, &[NameEntry::bare("/b")]);
        assert!(sink.take_error().is_none());

        let out = lines(sink);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0]["type"], "status");
        assert_eq!(out[0]["id"], 1);
        assert_eq!(out[0]["code"], 2);
        assert_eq!(out[1]["type"], "data");
        assert_eq!(out[1]["data"], "aGk=");
        assert_eq!(out[2]["entries"][0]["filename"], "/b");
    }
}
