//! Translation of native metadata into SFTP attributes and `ls -l` lines.

use std::path::Path;

use chrono::{DateTime, Local};
use tracing::debug;

use crate::fs::{Filesystem, FsMetadata};
use crate::identity::IdentityLookup;
use crate::protocol::{FileAttributes, NameEntry};

const PERMISSION_GROUPS: [&str; 8] = ["---", "--x", "-w-", "-wx", "r--", "r-x", "rw-", "rwx"];

/// Longname prefix used when an entry cannot be stated.
const UNKNOWN_LONGNAME: &str = "?????????? ? ? ? ? ? ? ?";

/// Wire attributes for a metadata snapshot. Times are whole seconds.
#[must_use]
pub fn file_attributes(meta: &FsMetadata) -> FileAttributes {
    FileAttributes {
        size: Some(meta.size),
        uid: Some(meta.uid),
        gid: Some(meta.gid),
        permissions: Some(meta.mode),
        atime: Some(clamp_secs(meta.atime)),
        mtime: Some(clamp_secs(meta.mtime)),
    }
}

/// The nine-character `rwxrwxrwx` string for the low permission bits.
#[must_use]
pub fn permission_string(mode: u32) -> String {
    [6u32, 3, 0]
        .iter()
        .map(|&shift| PERMISSION_GROUPS[(mode.checked_shr(shift).unwrap_or(0) & 0o7) as usize])
        .collect()
}

/// `ls -l` style line for one entry.
pub fn longname(
    filename: &str,
    meta: &FsMetadata,
    identity: &impl IdentityLookup,
) -> String {
    let kind = if meta.is_dir { 'd' } else { '-' };
    let owner = identity
        .user_name(meta.uid)
        .unwrap_or_else(|| meta.uid.to_string());
    let group = identity
        .group_name(meta.gid)
        .unwrap_or_else(|| meta.gid.to_string());
    format!(
        "{kind}{} {} {owner} {group} {} {} {filename}",
        permission_string(meta.mode),
        meta.nlink,
        meta.size,
        format_mtime(meta.mtime),
    )
}

/// Build the `SSH_FXP_NAME` entry for `filename`, stating `path`.
///
/// A failed stat degrades the entry to a placeholder longname without
/// attributes rather than failing.
pub fn format_entry<F, I>(fs: &F, identity: &I, filename: &str, path: &Path) -> NameEntry
where
    F: Filesystem,
    I: IdentityLookup,
{
    match fs.stat(path) {
        Ok(meta) => NameEntry {
            filename: filename.to_owned(),
            longname: longname(filename, &meta, identity),
            attrs: Some(file_attributes(&meta)),
        },
        Err(e) => {
            debug!(path = %path.display(), error = %e, "listing entry could not be stated");
            NameEntry {
                filename: filename.to_owned(),
                longname: format!("{UNKNOWN_LONGNAME} {filename}"),
                attrs: None,
            }
        },
    }
}

/// Month, day, hour and minute in local time, always 12 characters wide.
fn format_mtime(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .unwrap_or_default()
        .with_timezone(&Local)
        .format("%b %d %H:%M")
        .to_string()
}

fn clamp_secs(secs: i64) -> u32 {
    u32::try_from(secs.max(0)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::NumericIdentity;

    struct Named;

    impl IdentityLookup for Named {
        fn user_name(&self, _uid: u32) -> Option<String> {
            Some("alice".to_owned())
        }

        fn group_name(&self, _gid: u32) -> Option<String> {
            Some("staff".to_owned())
        }
    }

    fn sample() -> FsMetadata {
        FsMetadata {
            is_dir: false,
            mode: 0o100_644,
            uid: 1000,
            gid: 50,
            nlink: 1,
            size: 4096,
            atime: 1_700_000_000,
            mtime: 1_700_000_123,
        }
    }

    #[test]
    fn test_permission_strings() {
        assert_eq!(permission_string(0o755), "rwxr-xr-x");
        assert_eq!(permission_string(0o100_644), "rw-r--r--");
        assert_eq!(permission_string(0o040_700), "rwx------");
        assert_eq!(permission_string(0o044), "---r--r--");
        assert_eq!(permission_string(0), "---------");
    }

    #[test]
    fn test_attributes_carry_real_gid() {
        let attrs = file_attributes(&sample());
        assert_eq!(attrs.uid, Some(1000));
        assert_eq!(attrs.gid, Some(50));
        assert_eq!(attrs.size, Some(4096));
        assert_eq!(attrs.permissions, Some(0o100_644));
        assert_eq!(attrs.mtime, Some(1_700_000_123));
    }

    #[test]
    fn test_negative_times_clamp_to_zero() {
        let mut meta = sample();
        meta.atime = -5;
        assert_eq!(file_attributes(&meta).atime, Some(0));
    }

    #[test]
    fn test_longname_layout() {
        let line = longname("report.txt", &sample(), &Named);
        assert!(line.starts_with("-rw-r--r-- 1 alice staff 4096 "), "{line}");
        assert!(line.ends_with(" report.txt"), "{line}");
        // type+perms, nlink, owner, group, size, month, day, hh:mm, name
        assert_eq!(line.split(' ').count(), 9, "{line}");
    }

    #[test]
    fn test_longname_directory_numeric_fallback() {
        let mut meta = sample();
        meta.is_dir = true;
        meta.mode = 0o040_755;
        meta.nlink = 3;
        let line = longname("docs", &meta, &NumericIdentity);
        assert!(line.starts_with("drwxr-xr-x 3 1000 50 4096 "), "{line}");
    }

    #[test]
    fn test_mtime_fixed_width() {
        assert_eq!(format_mtime(0).len(), 12);
        assert_eq!(format_mtime(1_700_000_000).len(), 12);
    }

    #[test]
    fn test_unstatable_entry_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("ghost");
        let entry = format_entry(&crate::HostFs, &NumericIdentity, "ghost", &missing);
        assert_eq!(entry.filename, "ghost");
        assert_eq!(entry.longname, "?????????? ? ? ? ? ? ? ? ghost");
        assert!(entry.attrs.is_none());
    }
}
