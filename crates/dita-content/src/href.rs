//! Href splitting
//!
//! An href is `[dir/]file[#fragment]`, relative to the folder of the
//! document holding it. Renames only ever touch the file part.

use std::path::{Component, Path, PathBuf};

/// Split an href into directory prefix (with trailing `/`), file name and
/// fragment (with leading `#`)
#[must_use]
pub fn split_href(href: &str) -> (&str, &str, &str) {
    let (path, fragment) = match href.find('#') {
        Some(at) => href.split_at(at),
        None => (href, ""),
    };
    match path.rfind('/') {
        Some(at) => (&path[..=at], &path[at + 1..], fragment),
        None => ("", path, fragment),
    }
}

/// File name part of an href
#[must_use]
pub fn href_file_name(href: &str) -> &str {
    split_href(href).1
}

/// Replace the file part of an href, keeping directory and fragment
#[must_use]
pub fn replace_href_file(href: &str, file_name: &str) -> String {
    let (dir, _, fragment) = split_href(href);
    format!("{dir}{file_name}{fragment}")
}

/// Lexically normalize a path: `.` dropped, `..` folded into its parent
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// File an href points at, resolved against the folder of the document
/// holding it. The fragment is ignored.
#[must_use]
pub fn resolve_href(base_dir: &Path, href: &str) -> PathBuf {
    let path = href.split('#').next().unwrap_or_default();
    normalize_path(&base_dir.join(path))
}

/// True when `href`, held by a document in `base_dir`, points at `target`
#[must_use]
pub fn href_targets(base_dir: &Path, href: &str, target: &Path) -> bool {
    !href_file_name(href).is_empty() && resolve_href(base_dir, href) == normalize_path(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_normalize_lexically() {
        assert_eq!(normalize_path(Path::new("./p/sub/../a.dita")), PathBuf::from("p/a.dita"));
        assert_eq!(normalize_path(Path::new("../x/./a.dita")), PathBuf::from("../x/a.dita"));
        assert_eq!(normalize_path(Path::new("/p/../../a")), PathBuf::from("/a"));
        assert_eq!(normalize_path(Path::new(".")), PathBuf::from("."));
    }

    #[test]
    fn hrefs_resolve_against_their_document() {
        let root = Path::new("/p");
        let sub = Path::new("/p/sub");
        assert!(href_targets(root, "a.dita#t", Path::new("/p/a.dita")));
        assert!(!href_targets(root, "sub/a.dita", Path::new("/p/a.dita")));
        assert!(!href_targets(sub, "a.dita", Path::new("/p/a.dita")));
        assert!(href_targets(sub, "../a.dita", Path::new("/p/./a.dita")));
        assert!(!href_targets(root, "#local", Path::new("/p")));
    }

    #[test]
    fn splits_all_parts() {
        assert_eq!(split_href("sub/dir/a.dita#t1/p2"), ("sub/dir/", "a.dita", "#t1/p2"));
        assert_eq!(split_href("a.dita"), ("", "a.dita", ""));
        assert_eq!(split_href("#local"), ("", "", "#local"));
    }

    #[test]
    fn replace_keeps_prefix_and_fragment() {
        assert_eq!(replace_href_file("../x/old.dita#top", "new.dita"), "../x/new.dita#top");
    }
}
