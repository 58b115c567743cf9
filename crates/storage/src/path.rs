//! Lexical path utilities.
//!
//! Nothing in here touches the filesystem: symbolic links are **not**
//! resolved, which is exactly what we want when displaying paths back to the
//! user in a plan.

use std::path::{Component, Path, PathBuf};

/// Lexically normalizes a path: removes `.` components and duplicate
/// separators, and resolves `..` against the preceding component.
///
/// Leading `..` components of relative paths are kept (there is nothing to
/// resolve them against), while `..` at the root of an absolute path stays at
/// the root. An empty result normalizes to `.`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use ifs_storage::normalize;
/// assert_eq!(normalize("a/./b//c/../d"), Path::new("a/b/d"));
/// assert_eq!(normalize("/../etc"), Path::new("/etc"));
/// assert_eq!(normalize("../x/.."), Path::new(".."));
/// assert_eq!(normalize("a/.."), Path::new("."));
/// ```
pub fn normalize(path: impl AsRef<Path>) -> PathBuf {
    let mut components: Vec<Component> = Vec::new();
    for component in path.as_ref().components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                },
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {},
                _ => components.push(component),
            },
            other => components.push(other),
        }
    }
    match components.is_empty() {
        true => PathBuf::from("."),
        false => components.into_iter().collect(),
    }
}

/// Splits a path into its directory and base name, in the manner of
/// `dirname`/`basename`. A bare file name has an empty directory.
///
/// ```
/// use std::path::Path;
/// use ifs_storage::split_path;
/// assert_eq!(split_path("music/a.mp3"), (Path::new("music").into(), Path::new("a.mp3").into()));
/// assert_eq!(split_path("a.mp3"), (Path::new("").into(), Path::new("a.mp3").into()));
/// ```
pub fn split(path: impl AsRef<Path>) -> (PathBuf, PathBuf) {
    let path = path.as_ref();
    let directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let base = path.file_name().map(PathBuf::from).unwrap_or_default();
    (directory, base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a/b/c/file.mp3", "a/b/c/file.mp3")]
    #[case("simple.mp3", "simple.mp3")]
    #[case("a//b//c", "a/b/c")]
    #[case("a/./b/./c", "a/b/c")]
    #[case("a/b/..", "a")]
    #[case("wrong/../still-wrong/.././correct//./path.mp3/", "correct/path.mp3")]
    #[case("../outside", "../outside")]
    #[case("../../x", "../../x")]
    #[case(".", ".")]
    #[case("./", ".")]
    #[case("", ".")]
    fn test_normalize_relative(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input), Path::new(expected));
    }

    #[cfg(unix)]
    #[rstest]
    #[case("/a/b/../c", "/a/c")]
    #[case("/..", "/")]
    #[case("/../../etc/passwd", "/etc/passwd")]
    #[case("//", "/")]
    fn test_normalize_absolute(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input), Path::new(expected));
    }

    #[rstest]
    #[case("dir/file.txt", "dir", "file.txt")]
    #[case("a/b/c.txt", "a/b", "c.txt")]
    #[case("file.txt", "", "file.txt")]
    #[cfg_attr(unix, case("/file.txt", "/", "file.txt"))]
    fn test_split(#[case] input: &str, #[case] directory: &str, #[case] base: &str) {
        let (d, b) = split(input);
        assert_eq!(d, Path::new(directory));
        assert_eq!(b, Path::new(base));
    }
}
