use std::path::{Component, Path, PathBuf};

/// Lexically resolves a client path against the session root.
///
/// A request already rooted at `root` is taken as-is; anything else,
/// absolute-looking paths included, is joined onto `root`. The joined path is
/// normalized and, if it would land outside `root`, collapses to `root`
/// itself. Does NOT touch the filesystem.
///
/// `root` is expected to be absolute and normalized.
#[must_use]
pub fn resolve_path(root: &Path, requested: &str) -> PathBuf {
    let req = Path::new(requested);
    let relative = req.strip_prefix(root).unwrap_or(req);

    let mut joined = root.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => joined.push(part),
            Component::ParentDir => joined.push(".."),
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {},
        }
    }

    confine(root, &joined)
}

/// Normalizes an already-joined host path and clamps it to `root`.
pub(crate) fn confine(root: &Path, path: &Path) -> PathBuf {
    let normalized = normalize(path);
    if normalized.starts_with(root) {
        normalized
    } else {
        root.to_path_buf()
    }
}

/// Normalizes a client path against the virtual root `/`.
///
/// This is the REALPATH view of the namespace: purely lexical, independent of
/// the real root and of whether the path exists. `..` never climbs above `/`.
#[must_use]
pub fn normalize_virtual(requested: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in requested.split('/') {
        match part {
            "" | "." => {},
            ".." => {
                parts.pop();
            },
            name => parts.push(name),
        }
    }
    format!("/{}", parts.join("/"))
}

/// Collapse `.` and `..` without consulting the filesystem.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                out.push(component);
            },
            Component::CurDir => {},
            Component::ParentDir => {
                // Popping at "/" is a no-op, matching the kernel's view of "/..".
                out.pop();
            },
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path_joined() {
        let root = Path::new("/var/sandbox");
        assert_eq!(
            resolve_path(root, "src/main.rs"),
            Path::new("/var/sandbox/src/main.rs")
        );
    }

    #[test]
    fn test_traversal_clamped_to_root() {
        let root = Path::new("/srv/data");
        assert_eq!(resolve_path(root, "../../etc/passwd"), root);
        assert_eq!(resolve_path(root, "src/../../etc/passwd"), root);
        assert_eq!(resolve_path(root, "../../../../../../.."), root);
    }

    #[test]
    fn test_absolute_request_joined_onto_root() {
        let root = Path::new("/srv/data");
        assert_eq!(
            resolve_path(root, "/etc/passwd"),
            Path::new("/srv/data/etc/passwd")
        );
        assert_eq!(resolve_path(root, "/"), root);
    }

    #[test]
    fn test_already_rooted_request_kept() {
        let root = Path::new("/srv/data");
        assert_eq!(
            resolve_path(root, "/srv/data/docs/a.txt"),
            Path::new("/srv/data/docs/a.txt")
        );
        assert_eq!(resolve_path(root, "/srv/data"), root);
    }

    #[test]
    fn test_already_rooted_request_cannot_escape() {
        let root = Path::new("/srv/data");
        assert_eq!(resolve_path(root, "/srv/data/../../etc"), root);
    }

    #[test]
    fn test_sibling_prefix_is_not_rooted() {
        // "/srv/database" shares a string prefix with the root but is not under it.
        let root = Path::new("/srv/data");
        assert_eq!(
            resolve_path(root, "/srv/database"),
            Path::new("/srv/data/srv/database")
        );
    }

    #[test]
    fn test_inner_parent_segments_collapse() {
        let root = Path::new("/srv/data");
        assert_eq!(resolve_path(root, "a/b/../c/./d"), Path::new("/srv/data/a/c/d"));
        assert_eq!(
            resolve_path(root, "../data/file"),
            Path::new("/srv/data/file")
        );
        assert_eq!(resolve_path(root, "."), root);
        assert_eq!(resolve_path(root, ""), root);
    }

    #[test]
    fn test_resolution_is_idempotent_and_confined() {
        let root = Path::new("/srv/data");
        let samples = [
            "",
            ".",
            "..",
            "a",
            "/a/b",
            "a/../../b",
            "../../etc/passwd",
            "/srv/data/x/../y",
            "/srv/data/../data/z",
            "./a/./b/../../../../c",
            "//double//slash",
        ];
        for sample in samples {
            let once = resolve_path(root, sample);
            assert!(once.starts_with(root), "{sample} escaped to {}", once.display());
            let twice = resolve_path(root, once.to_str().unwrap());
            assert_eq!(once, twice, "not idempotent for {sample}");
        }
    }

    #[test]
    fn test_confine_clamps_parent_of_root() {
        let root = Path::new("/srv/data");
        assert_eq!(confine(root, &root.join("..")), root);
        assert_eq!(confine(root, &root.join("sub/..")), root);
        assert_eq!(confine(root, &root.join("sub/.")), Path::new("/srv/data/sub"));
    }

    #[test]
    fn test_realpath_normalization() {
        assert_eq!(normalize_virtual("/a/../b"), "/b");
        assert_eq!(normalize_virtual("."), "/");
        assert_eq!(normalize_virtual(""), "/");
        assert_eq!(normalize_virtual("../../.."), "/");
        assert_eq!(normalize_virtual("docs//notes/./a.txt"), "/docs/notes/a.txt");
        assert_eq!(normalize_virtual("/x/y/"), "/x/y");
    }
}
