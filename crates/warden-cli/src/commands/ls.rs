//! `warden ls`: list a directory through a confined session.

use std::path::Path;

use anyhow::{Result, bail};
use tracing::warn;
use warden_sftp::{
    Filesystem, HostFs, IdentityLookup, NameEntry, Reply, Session, SessionOptions, StatusCode,
    SystemIdentity,
};

use crate::theme::Theme;

/// Print the `ls -l` style listing of `path` under `root`.
pub(crate) fn run_ls(root: &Path, options: SessionOptions, path: &str) -> Result<()> {
    let mut session = Session::new(root, HostFs::new(), SystemIdentity, options)?;
    let entries = list(&mut session, path)?;

    println!("{}", Theme::header(&format!("{path}:")));
    for entry in &entries {
        println!("{}", entry.longname);
    }
    println!("{}", Theme::dimmed(&format!("{} entries", entries.len())));
    Ok(())
}

/// OPENDIR, READDIR and CLOSE, returning entries sorted by name.
pub(crate) fn list<F, I>(session: &mut Session<F, I>, path: &str) -> Result<Vec<NameEntry>>
where
    F: Filesystem,
    I: IdentityLookup,
{
    let handle = match session.opendir(path) {
        Reply::Handle(handle) => handle,
        other => bail!("cannot open {path}: {}", describe(&other)),
    };

    let listing = session.readdir(&handle);
    let closed = session.close(&handle);

    let mut entries = match listing {
        Reply::Name(entries) => entries,
        other => bail!("cannot list {path}: {}", describe(&other)),
    };
    if let Some(code) = closed.status().filter(|c| *c != StatusCode::Ok) {
        warn!(path, status = %code, "close after listing failed");
    }

    entries.sort_by(|a, b| a.filename.cmp(&b.filename));
    Ok(entries)
}

fn describe(reply: &Reply) -> String {
    match reply.status() {
        Some(code) => code.to_string(),
        None => "unexpected reply".to_owned(),
    }
}
