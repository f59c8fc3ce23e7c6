//! `warden serve`: answer JSON-lines requests on stdin.

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};
use warden_sftp::{
    Filesystem, HostFs, IdentityLookup, ReplySink, Session, SessionOptions, StatusCode,
    SystemIdentity,
};

use crate::wire::{JsonLineSink, Malformed, decode_line};

/// Counters reported when the input stream ends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ServeStats {
    pub(crate) handled: u64,
    pub(crate) malformed: u64,
}

/// Serve stdin/stdout against the host filesystem until stdin closes.
pub(crate) fn run_serve(root: &Path, options: SessionOptions) -> Result<()> {
    let mut session = Session::new(root, HostFs::new(), SystemIdentity, options)
        .with_context(|| format!("cannot serve {}", root.display()))?;

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let stats = serve_stream(&mut session, stdin.lock(), stdout.lock())?;

    info!(
        handled = stats.handled,
        malformed = stats.malformed,
        open_handles = session.open_handles(),
        "input closed, ending session"
    );
    Ok(())
}

/// Answer every line of `input` on `output`, one reply line per request line.
///
/// Blank lines are skipped. A line that is not UTF-8 or does not decode gets
/// a `BAD_MESSAGE` status and the session carries on.
pub(crate) fn serve_stream<F, I, R, W>(
    session: &mut Session<F, I>,
    mut input: R,
    output: W,
) -> Result<ServeStats>
where
    F: Filesystem,
    I: IdentityLookup,
    R: BufRead,
    W: Write,
{
    let mut sink = JsonLineSink::new(output);
    let mut stats = ServeStats::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = input
            .read_until(b'\n', &mut buf)
            .context("failed to read request")?;
        if read == 0 {
            break;
        }

        let decoded = match std::str::from_utf8(&buf) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => decode_line(line),
            Err(e) => Err(Malformed {
                id: 0,
                reason: format!("request is not UTF-8: {e}"),
            }),
        };

        match decoded {
            Ok((id, request)) => {
                session.dispatch(id, request, &mut sink);
                stats.handled = stats.handled.saturating_add(1);
            },
            Err(bad) => {
                warn!(id = bad.id, reason = %bad.reason, "malformed request");
                sink.status(bad.id, StatusCode::BadMessage);
                stats.malformed = stats.malformed.saturating_add(1);
            },
        }

        if let Some(e) = sink.take_error() {
            return Err(e).context("failed to write reply");
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_sftp::NumericIdentity;

    fn session(dir: &tempfile::TempDir) -> Session<HostFs, NumericIdentity> {
        Session::new(
            dir.path(),
            HostFs::new(),
            NumericIdentity,
            SessionOptions::default(),
        )
        .unwrap()
    }

    fn feed(
        session: &mut Session<HostFs, NumericIdentity>,
        input: &str,
    ) -> (ServeStats, Vec<serde_json::Value>) {
        let mut out = Vec::new();
        let stats = serve_stream(session, input.as_bytes(), &mut out).unwrap();
        let replies = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        (stats, replies)
    }

    #[test]
    fn test_one_reply_per_line() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hello.txt"), b"hi there").unwrap();

        let input = concat!(
            r#"{"id":1,"op":"realpath","path":"/a/../b"}"#,
            "\n\n",
            r#"{"id":2,"op":"stat","path":"hello.txt"}"#,
            "\n",
            r#"{"id":3,"op":"open","path":"missing","flags":1}"#,
            "\n",
            "garbage\n",
            r#"{"id":5,"op":"nope"}"#,
            "\n",
        );
        let (stats, replies) = feed(&mut session(&dir), input);

        assert_eq!(stats, ServeStats { handled: 3, malformed: 2 });
        assert_eq!(replies.len(), 5);

        assert_eq!(replies[0]["type"], "name");
        assert_eq!(replies[0]["entries"][0]["filename"], "/b");

        assert_eq!(replies[1]["type"], "attrs");
        assert_eq!(replies[1]["attrs"]["size"], 8);

        assert_eq!(replies[2]["type"], "status");
        assert_eq!(replies[2]["code"], 2);

        assert_eq!(replies[3]["id"], 0);
        assert_eq!(replies[3]["code"], 5);
        assert_eq!(replies[4]["id"], 5);
        assert_eq!(replies[4]["code"], 5);
    }

    #[test]
    fn test_handles_persist_across_lines() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f"), b"payload").unwrap();
        let mut session = session(&dir);

        let (_, replies) = feed(&mut session, "{\"id\":1,\"op\":\"open\",\"path\":\"f\",\"flags\":1}\n");
        assert_eq!(replies[0]["type"], "handle");
        let handle = replies[0]["handle"].as_str().unwrap().to_owned();

        let input = format!(
            "{{\"id\":2,\"op\":\"read\",\"handle\":\"{handle}\",\"offset\":0,\"len\":64}}\n\
             {{\"id\":3,\"op\":\"read\",\"handle\":\"{handle}\",\"offset\":7,\"len\":64}}\n\
             {{\"id\":4,\"op\":\"close\",\"handle\":\"{handle}\"}}\n"
        );
        let (stats, replies) = feed(&mut session, &input);
        assert_eq!(stats.handled, 3);
        // base64("payload")
        assert_eq!(replies[0]["data"], "cGF5bG9hZA==");
        assert_eq!(replies[1]["code"], 1);
        assert_eq!(replies[2]["code"], 0);
        assert_eq!(session.open_handles(), 0);
    }

    #[test]
    fn test_non_utf8_line_is_bad_message() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f"), b"abc").unwrap();
        let mut session = session(&dir);

        let mut input = b"\xff\xfe not text\n".to_vec();
        input.extend_from_slice(br#"{"id":2,"op":"stat","path":"f"}"#);
        input.push(b'\n');

        let mut out = Vec::new();
        let stats = serve_stream(&mut session, input.as_slice(), &mut out).unwrap();
        assert_eq!(stats, ServeStats { handled: 1, malformed: 1 });

        let replies: Vec<serde_json::Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0]["id"], 0);
        assert_eq!(replies[0]["code"], 5);
        assert_eq!(replies[1]["type"], "attrs");
        assert_eq!(replies[1]["attrs"]["size"], 3);
    }
}
