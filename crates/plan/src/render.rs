use crate::escape::escape_path;
use ifs_index::{Entry, FileIndex, Metadata};
use std::fmt::Write;

/// Delimiter of multi-line metadata values.
pub const HEREDOC: &str = "<<END";

/// Serialize the index into an editable plan.
///
/// With groups registered, each non-empty group gets a `# group <id>`
/// section and the remaining entries follow under `# ungrouped`. Otherwise
/// every entry is listed flat, in index order.
pub fn render(index: &FileIndex) -> String {
    let mut out = String::new();
    if index.groups().is_empty() {
        for entry in index.iter() {
            write_entry(&mut out, entry);
        }
        return out;
    }
    let (grouped, ungrouped) = index.files_by_group();
    for (group, entries) in grouped.into_iter().filter(|(_, entries)| !entries.is_empty()) {
        let _ = writeln!(out, "# group {group}");
        for entry in entries {
            write_entry(&mut out, entry);
        }
        out.push('\n');
    }
    if !ungrouped.is_empty() {
        out.push_str("# ungrouped\n");
        for entry in ungrouped {
            write_entry(&mut out, entry);
        }
    }
    out
}

fn write_entry(out: &mut String, entry: &Entry) {
    for remark in entry.remarks() {
        // A remark spanning lines must not leak uncommented text into the plan.
        for line in remark.lines() {
            let _ = writeln!(out, "# {line}");
        }
    }
    for target in entry.targets() {
        let _ = writeln!(out, "{} {}   {}", entry.id(), target.action, escape_path(&target.path));
    }
    write_metadata(out, entry.metadata());
}

fn write_metadata(out: &mut String, metadata: &Metadata) {
    let width = metadata.iter().map(|(key, _)| key.chars().count()).max().unwrap_or_default();
    for (key, value) in metadata.iter() {
        // Leading blanks would be taken for the separator on a single line.
        if value.contains('\n') || value.starts_with([' ', '\t']) {
            let _ = writeln!(out, "{key:<width$} = {HEREDOC}\n{value}\n{HEREDOC}");
        } else {
            let _ = writeln!(out, "{key:<width$} = {value}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifs_index::{Action, IndexSettings, Pipeline};
    use ifs_storage::backend::MockBackend;
    use std::sync::Arc;

    fn index(files: &[&str]) -> FileIndex {
        let mut index = FileIndex::new(Arc::new(MockBackend::default()), Pipeline::default(), IndexSettings::default());
        for file in files {
            index.insert(*file, Action::Rename);
        }
        index
    }

    #[test]
    fn test_flat() {
        let mut index = index(&["a.txt", "dir/b c.txt"]);
        let ids = index.ids();
        index.get_mut(ids[1]).unwrap().add_target("copy.txt", Action::Copy);
        assert_eq!(
            render(&index),
            "00000001 r   a.txt\n00000002 r   dir/b c.txt\n00000002 c   copy.txt\n"
        );
    }

    #[test]
    fn test_empty() {
        assert_eq!(render(&index(&[])), "");
    }

    #[test]
    fn test_remarks_come_first() {
        let mut index = index(&["a.txt"]);
        let id = index.ids()[0];
        let entry = index.get_mut(id).unwrap();
        entry.add_remark("Could not delete \"a.txt\": permission denied");
        entry.add_remark("two\nlines");
        assert_eq!(
            render(&index),
            "# Could not delete \"a.txt\": permission denied\n# two\n# lines\n00000001 r   a.txt\n"
        );
    }

    #[test]
    fn test_groups() {
        let mut index = index(&["a", "b", "c", "d"]);
        let ids = index.ids();
        index.assign_to_group(ids[1], "beef");
        index.assign_to_group(ids[3], "beef");
        index.assign_to_group(ids[0], "cafe");
        index.register_group("empty");
        let expected = "\
# group beef
00000002 r   b
00000004 r   d

# group cafe
00000001 r   a

# ungrouped
00000003 r   c
";
        assert_eq!(render(&index), expected);
    }

    #[test]
    fn test_paths_are_escaped() {
        let index = index(&["notes.txt ", "evil\n00000001 d   keep.txt", "keep.txt"]);
        assert_eq!(
            render(&index),
            "00000001 r   notes.txt\\x20\n00000002 r   evil\\n00000001 d   keep.txt\n00000003 r   keep.txt\n"
        );
    }

    #[test]
    fn test_metadata_alignment_counts_characters() {
        let mut index = index(&["song.mp3"]);
        let id = index.ids()[0];
        index.get_mut(id).unwrap().metadata_mut().load([
            ("année".to_string(), "1999".to_string()),
            ("artiste".to_string(), "Zaz".to_string()),
            ("note".to_string(), "  indented".to_string()),
        ]);
        let expected = "\
00000001 r   song.mp3
année   = 1999
artiste = Zaz
note    = <<END
  indented
<<END
";
        assert_eq!(render(&index), expected);
    }

    #[test]
    fn test_metadata_alignment() {
        let mut index = index(&["song.mp3"]);
        let id = index.ids()[0];
        index.get_mut(id).unwrap().metadata_mut().load([
            ("title".to_string(), "Song".to_string()),
            ("tracknumber".to_string(), "7".to_string()),
            ("lyrics".to_string(), "la la\nla".to_string()),
        ]);
        let expected = "\
00000001 r   song.mp3
lyrics      = <<END
la la
la
<<END
title       = Song
tracknumber = 7
";
        assert_eq!(render(&index), expected);
    }
}
