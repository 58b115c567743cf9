use ifs_storage::split_path;
use std::path::Path;

/// Kind of file operation that produces a new path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Transfer {
    Move,
    Copy,
    Link,
}

/// The question asked before `current` is transferred to `target`.
///
/// The wording is shortest when only the base name or only the directory
/// changes.
pub(crate) fn confirmation(transfer: Transfer, current: &Path, target: &Path, overwriting: bool) -> String {
    let (current_dir, current_base) = split_path(current);
    let (target_dir, target_base) = split_path(target);
    let (current, target) = (current.display(), target.display());

    let mut message = if current_dir == target_dir {
        let (from, to) = (current_base.display(), target_base.display());
        let place = if current_dir.as_os_str().is_empty() {
            String::new()
        } else {
            format!(" in \"{}\"", current_dir.display())
        };
        match transfer {
            Transfer::Move => format!("Rename \"{from}\" to \"{to}\"{place}?"),
            Transfer::Copy => format!("Make a copy of \"{from}\" as \"{to}\"{place}?"),
            Transfer::Link => format!("Create a link to \"{from}\" as \"{to}\"{place}?"),
        }
    } else if current_base == target_base {
        let dir = if target_dir.as_os_str().is_empty() { Path::new(".").display() } else { target_dir.display() };
        match transfer {
            Transfer::Move => format!("Move \"{current}\" to \"{dir}\"?"),
            Transfer::Copy => format!("Make a copy of \"{current}\" in \"{dir}\"?"),
            Transfer::Link => format!("Create a link to \"{current}\" in \"{dir}\"?"),
        }
    } else {
        match transfer {
            Transfer::Move => format!("Move \"{current}\" to \"{target}\"?"),
            Transfer::Copy => format!("Make a copy of \"{current}\" as \"{target}\"?"),
            Transfer::Link => format!("Create a link to \"{current}\" as \"{target}\"?"),
        }
    };
    if overwriting {
        message.push_str(" Destination file will be overwritten!");
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Transfer::Move, "music/a.mp3", "music/b.mp3", "Rename \"a.mp3\" to \"b.mp3\" in \"music\"?")]
    #[case(Transfer::Copy, "music/a.mp3", "music/b.mp3", "Make a copy of \"a.mp3\" as \"b.mp3\" in \"music\"?")]
    #[case(Transfer::Link, "music/a.mp3", "music/b.mp3", "Create a link to \"a.mp3\" as \"b.mp3\" in \"music\"?")]
    #[case(Transfer::Move, "a.mp3", "b.mp3", "Rename \"a.mp3\" to \"b.mp3\"?")]
    #[case(Transfer::Move, "music/a.mp3", "backup/a.mp3", "Move \"music/a.mp3\" to \"backup\"?")]
    #[case(Transfer::Copy, "music/a.mp3", "backup/a.mp3", "Make a copy of \"music/a.mp3\" in \"backup\"?")]
    #[case(Transfer::Link, "music/a.mp3", "backup/a.mp3", "Create a link to \"music/a.mp3\" in \"backup\"?")]
    #[case(Transfer::Move, "music/a.mp3", "a.mp3", "Move \"music/a.mp3\" to \".\"?")]
    #[case(Transfer::Move, "music/a.mp3", "backup/b.mp3", "Move \"music/a.mp3\" to \"backup/b.mp3\"?")]
    #[case(Transfer::Copy, "music/a.mp3", "backup/b.mp3", "Make a copy of \"music/a.mp3\" as \"backup/b.mp3\"?")]
    fn test_confirmation(
        #[case] transfer: Transfer,
        #[case] current: &str,
        #[case] target: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(confirmation(transfer, Path::new(current), Path::new(target), false), expected);
    }

    #[test]
    fn test_overwrite_warning() {
        let message = confirmation(Transfer::Move, Path::new("a"), Path::new("b"), true);
        assert!(message.ends_with("? Destination file will be overwritten!"));
    }
}
